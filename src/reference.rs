//! Topological References
//!
//! A reference is a typed, relocatable pointer to another feature or to a
//! sub-piece of solid geometry (a face, an edge, a vertex) that only
//! exists inside a specific CAD kernel. Alongside the target identifier
//! each variant caches a geometric fingerprint (normals, centroids,
//! midpoints, basis vectors) so a receiving system can approximately
//! re-resolve the reference without a live kernel.
//!
//! The variant determines exactly which fields exist; there is no
//! "unknown variant" state in memory.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::geom::{self, standard};

/// Discriminant of a [`Reference`] variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RefKind {
    DatumPlane,
    DatumAxis,
    DatumPoint,
    /// A whole sketch feature.
    Sketch,
    Face,
    Edge,
    Vertex,
    SketchSegment,
}

/// Right-handed orthogonal frame cached with a datum plane reference.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PlaneFrame {
    pub origin: DVec3,
    pub x_dir: DVec3,
    pub y_dir: DVec3,
    pub normal: DVec3,
}

impl PlaneFrame {
    /// Build a frame from its normal and primary axis, deriving the
    /// secondary axis from the right-handed orthogonal-frame invariant.
    ///
    /// Degenerate inputs yield a zero secondary axis rather than NaN.
    pub fn from_normal_and_x(origin: DVec3, x_dir: DVec3, normal: DVec3) -> Self {
        Self {
            origin,
            x_dir,
            y_dir: derived_y_dir(normal, x_dir),
            normal,
        }
    }

    /// Canonical frame of the XY datum plane.
    pub fn xy() -> Self {
        Self {
            origin: DVec3::ZERO,
            x_dir: DVec3::X,
            y_dir: DVec3::Y,
            normal: DVec3::Z,
        }
    }

    /// Canonical frame of the YZ datum plane.
    pub fn yz() -> Self {
        Self {
            origin: DVec3::ZERO,
            x_dir: DVec3::Y,
            y_dir: DVec3::Z,
            normal: DVec3::X,
        }
    }

    /// Canonical frame of the ZX datum plane.
    pub fn zx() -> Self {
        Self {
            origin: DVec3::ZERO,
            x_dir: DVec3::Z,
            y_dir: DVec3::X,
            normal: DVec3::Y,
        }
    }
}

/// Secondary in-plane axis: `normalize(cross(normal, x_dir))`.
pub fn derived_y_dir(normal: DVec3, x_dir: DVec3) -> DVec3 {
    geom::try_normalize(normal.cross(x_dir)).unwrap_or(DVec3::ZERO)
}

/// A typed pointer to a feature or to geometry owned by a feature.
///
/// Feature-family variants target another feature by ID; topology-family
/// variants target a sub-piece of a feature's geometry by
/// `(parent feature ID, topology index)` plus a fingerprint.
#[derive(Debug, Clone, PartialEq)]
pub enum Reference {
    /// A datum plane, with its cached frame.
    DatumPlane { target_id: String, frame: PlaneFrame },
    /// A datum axis.
    DatumAxis { target_id: String },
    /// A datum point.
    DatumPoint { target_id: String },
    /// A whole sketch feature.
    Sketch { target_id: String },
    /// A face of a solid, fingerprinted by normal, centroid and the
    /// surface parameter directions.
    Face {
        parent_id: String,
        topology_index: i32,
        normal: DVec3,
        centroid: DVec3,
        u_dir: DVec3,
        v_dir: DVec3,
    },
    /// An edge of a solid, fingerprinted by its midpoint and optionally
    /// its endpoints.
    Edge {
        parent_id: String,
        topology_index: i32,
        mid_point: DVec3,
        start_point: Option<DVec3>,
        end_point: Option<DVec3>,
    },
    /// A vertex of a solid.
    Vertex {
        parent_id: String,
        topology_index: i32,
        position: DVec3,
    },
    /// A single segment inside a sketch, by its sketch-local ID.
    SketchSegment {
        parent_id: String,
        topology_index: i32,
        segment_local_id: String,
    },
}

impl Reference {
    /// The variant discriminant.
    pub fn kind(&self) -> RefKind {
        match self {
            Reference::DatumPlane { .. } => RefKind::DatumPlane,
            Reference::DatumAxis { .. } => RefKind::DatumAxis,
            Reference::DatumPoint { .. } => RefKind::DatumPoint,
            Reference::Sketch { .. } => RefKind::Sketch,
            Reference::Face { .. } => RefKind::Face,
            Reference::Edge { .. } => RefKind::Edge,
            Reference::Vertex { .. } => RefKind::Vertex,
            Reference::SketchSegment { .. } => RefKind::SketchSegment,
        }
    }

    /// Target feature ID for feature-family references.
    pub fn target_feature_id(&self) -> Option<&str> {
        match self {
            Reference::DatumPlane { target_id, .. }
            | Reference::DatumAxis { target_id }
            | Reference::DatumPoint { target_id }
            | Reference::Sketch { target_id } => Some(target_id),
            _ => None,
        }
    }

    /// Parent feature ID for topology-family references.
    pub fn parent_feature_id(&self) -> Option<&str> {
        match self {
            Reference::Face { parent_id, .. }
            | Reference::Edge { parent_id, .. }
            | Reference::Vertex { parent_id, .. }
            | Reference::SketchSegment { parent_id, .. } => Some(parent_id),
            _ => None,
        }
    }

    /// The feature ID this reference depends on, whichever family it is.
    pub fn referenced_feature_id(&self) -> &str {
        match self {
            Reference::DatumPlane { target_id, .. }
            | Reference::DatumAxis { target_id }
            | Reference::DatumPoint { target_id }
            | Reference::Sketch { target_id } => target_id,
            Reference::Face { parent_id, .. }
            | Reference::Edge { parent_id, .. }
            | Reference::Vertex { parent_id, .. }
            | Reference::SketchSegment { parent_id, .. } => parent_id,
        }
    }

    /// The canonical XY datum plane.
    pub fn xy_plane() -> Self {
        Reference::DatumPlane {
            target_id: standard::PLANE_XY.to_string(),
            frame: PlaneFrame::xy(),
        }
    }

    /// The canonical YZ datum plane.
    pub fn yz_plane() -> Self {
        Reference::DatumPlane {
            target_id: standard::PLANE_YZ.to_string(),
            frame: PlaneFrame::yz(),
        }
    }

    /// The canonical ZX datum plane.
    pub fn zx_plane() -> Self {
        Reference::DatumPlane {
            target_id: standard::PLANE_ZX.to_string(),
            frame: PlaneFrame::zx(),
        }
    }

    /// A datum plane reference, canonicalized when the normal matches a
    /// standard plane (in either sign).
    pub fn datum_plane(target_id: impl Into<String>, frame: PlaneFrame) -> Self {
        let mut target_id = target_id.into();
        if let Some(std_id) = standard::match_plane(frame.normal) {
            target_id = std_id.to_string();
        }
        Reference::DatumPlane { target_id, frame }
    }

    /// A datum axis reference by feature ID.
    pub fn datum_axis(target_id: impl Into<String>) -> Self {
        Reference::DatumAxis {
            target_id: target_id.into(),
        }
    }

    /// A datum axis reference, canonicalized from its direction when it
    /// matches a principal axis.
    pub fn datum_axis_with_direction(target_id: impl Into<String>, direction: DVec3) -> Self {
        let target_id = match standard::match_axis(direction) {
            Some(std_id) => std_id.to_string(),
            None => target_id.into(),
        };
        Reference::DatumAxis { target_id }
    }

    /// A datum point reference by feature ID.
    pub fn datum_point(target_id: impl Into<String>) -> Self {
        Reference::DatumPoint {
            target_id: target_id.into(),
        }
    }

    /// A whole-sketch reference by feature ID.
    pub fn sketch(target_id: impl Into<String>) -> Self {
        Reference::Sketch {
            target_id: target_id.into(),
        }
    }

    /// A face reference with its full fingerprint.
    pub fn face(
        parent_id: impl Into<String>,
        topology_index: i32,
        normal: DVec3,
        centroid: DVec3,
    ) -> Self {
        Reference::Face {
            parent_id: parent_id.into(),
            topology_index,
            normal,
            centroid,
            u_dir: DVec3::X,
            v_dir: DVec3::Y,
        }
    }

    /// An edge reference fingerprinted by its midpoint.
    pub fn edge(parent_id: impl Into<String>, topology_index: i32, mid_point: DVec3) -> Self {
        Reference::Edge {
            parent_id: parent_id.into(),
            topology_index,
            mid_point,
            start_point: None,
            end_point: None,
        }
    }

    /// A vertex reference fingerprinted by its position.
    pub fn vertex(parent_id: impl Into<String>, topology_index: i32, position: DVec3) -> Self {
        Reference::Vertex {
            parent_id: parent_id.into(),
            topology_index,
            position,
        }
    }

    /// A reference to one segment of a sketch.
    pub fn sketch_segment(parent_id: impl Into<String>, segment_local_id: impl Into<String>) -> Self {
        Reference::SketchSegment {
            parent_id: parent_id.into(),
            topology_index: -1,
            segment_local_id: segment_local_id.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::points_coincident;

    #[test]
    fn test_datum_plane_canonicalizes_standard_normal() {
        let frame = PlaneFrame::from_normal_and_x(DVec3::ZERO, DVec3::X, DVec3::new(0.0, 0.0, -1.0));
        let r = Reference::datum_plane("SW-Plane17", frame);
        assert_eq!(r.target_feature_id(), Some(standard::PLANE_XY));
    }

    #[test]
    fn test_datum_plane_keeps_nonstandard_id() {
        let frame =
            PlaneFrame::from_normal_and_x(DVec3::ZERO, DVec3::X, DVec3::new(0.0, 1.0, 1.0));
        let r = Reference::datum_plane("SW-Plane17", frame);
        assert_eq!(r.target_feature_id(), Some("SW-Plane17"));
    }

    #[test]
    fn test_derived_y_dir_is_orthogonal() {
        let y = derived_y_dir(DVec3::Z, DVec3::X);
        assert!(points_coincident(y, DVec3::Y));
        // Degenerate frame collapses to zero instead of NaN.
        assert_eq!(derived_y_dir(DVec3::Z, DVec3::Z), DVec3::ZERO);
    }

    #[test]
    fn test_referenced_feature_id_both_families() {
        let face = Reference::face("F3", 0, DVec3::Z, DVec3::ZERO);
        assert_eq!(face.referenced_feature_id(), "F3");
        assert_eq!(face.target_feature_id(), None);
        let sketch = Reference::sketch("F1");
        assert_eq!(sketch.referenced_feature_id(), "F1");
        assert_eq!(sketch.parent_feature_id(), None);
    }
}
