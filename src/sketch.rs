//! Sketch Geometry
//!
//! 2D sketch entities (lines, circles, arcs, points) and the constraints
//! between them. Segment order is insertion order; it matters for display
//! only, never for solving.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::feature::FeatureCommon;
use crate::reference::Reference;

/// Geometry of a single sketch entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SegmentGeometry {
    Line {
        start: DVec3,
        end: DVec3,
    },
    Circle {
        center: DVec3,
        radius: f64,
    },
    Arc {
        center: DVec3,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
        clockwise: bool,
    },
    Point {
        position: DVec3,
    },
}

impl SegmentGeometry {
    /// Tag used by the persisted document.
    pub fn type_name(&self) -> &'static str {
        match self {
            SegmentGeometry::Line { .. } => "Line",
            SegmentGeometry::Circle { .. } => "Circle",
            SegmentGeometry::Arc { .. } => "Arc",
            SegmentGeometry::Point { .. } => "Point",
        }
    }
}

/// One entity in a sketch.
///
/// The `local_id` is unique only within the owning sketch; construction
/// geometry participates in constraints but not in profiles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SketchSegment {
    pub local_id: String,
    #[serde(default)]
    pub construction: bool,
    pub geometry: SegmentGeometry,
}

impl SketchSegment {
    pub fn new(local_id: impl Into<String>, geometry: SegmentGeometry) -> Self {
        Self {
            local_id: local_id.into(),
            construction: false,
            geometry,
        }
    }
}

/// Constraint category.
///
/// Persisted as its numeric discriminant by the human-readable codec, so
/// the order here is wire format and must not be rearranged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConstraintKind {
    Horizontal,
    Vertical,
    Coincident,
    Concentric,
    Tangent,
    Equal,
    Parallel,
    Perpendicular,
    Dimensional,
}

impl ConstraintKind {
    /// Numeric wire value.
    pub fn index(self) -> i32 {
        self as i32
    }

    /// Decode the numeric wire value.
    pub fn from_index(index: i32) -> Option<Self> {
        use ConstraintKind::*;
        match index {
            0 => Some(Horizontal),
            1 => Some(Vertical),
            2 => Some(Coincident),
            3 => Some(Concentric),
            4 => Some(Tangent),
            5 => Some(Equal),
            6 => Some(Parallel),
            7 => Some(Perpendicular),
            8 => Some(Dimensional),
            _ => None,
        }
    }
}

/// A geometric or dimensional constraint between sketch entities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    pub kind: ConstraintKind,
    /// Local IDs of the participating entities.
    pub entities: Vec<String>,
    /// Numeric value for dimensional constraints.
    #[serde(default)]
    pub dimension: Option<f64>,
}

impl Constraint {
    pub fn new(kind: ConstraintKind, entities: Vec<String>) -> Self {
        Self {
            kind,
            entities,
            dimension: None,
        }
    }

    pub fn dimensional(kind: ConstraintKind, entities: Vec<String>, value: f64) -> Self {
        Self {
            kind,
            entities,
            dimension: Some(value),
        }
    }
}

/// A sketch feature: a reference plane, ordered segments and constraints.
///
/// `reference_plane` is required for a valid rebuild but may be `None`
/// while the sketch is under incremental construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sketch {
    pub common: FeatureCommon,
    pub reference_plane: Option<Reference>,
    pub segments: Vec<SketchSegment>,
    pub constraints: Vec<Constraint>,
}

impl Sketch {
    pub fn new(common: FeatureCommon) -> Self {
        Self {
            common,
            reference_plane: None,
            segments: Vec::new(),
            constraints: Vec::new(),
        }
    }

    /// Find a segment by its sketch-local ID.
    pub fn segment(&self, local_id: &str) -> Option<&SketchSegment> {
        self.segments.iter().find(|s| s.local_id == local_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constraint_kind_wire_values_round_trip() {
        for index in 0..=8 {
            let kind = ConstraintKind::from_index(index).unwrap();
            assert_eq!(kind.index(), index);
        }
        assert_eq!(ConstraintKind::from_index(42), None);
    }

    #[test]
    fn test_segment_lookup() {
        let mut sketch = Sketch::new(FeatureCommon::new("F1", "Sketch1"));
        sketch.segments.push(SketchSegment::new(
            "L1",
            SegmentGeometry::Line {
                start: DVec3::ZERO,
                end: DVec3::X,
            },
        ));
        assert!(sketch.segment("L1").is_some());
        assert!(sketch.segment("L2").is_none());
    }
}
