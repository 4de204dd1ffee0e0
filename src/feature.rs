//! Feature Model
//!
//! The entries of the parametric CAD history: sketches, extrusions and
//! revolutions. Features are pure data; geometry evaluation is the
//! receiving kernel's job. Profile sketches are referenced by feature ID
//! and resolved through the owning [`Model`](crate::model::Model) at the
//! point of use, never through a second ownership path.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::reference::Reference;
use crate::sketch::Sketch;

/// Fields shared by every feature variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCommon {
    /// Globally unique identifier, assigned at construction.
    pub id: String,
    /// Display name; not unique.
    pub name: String,
    /// Persistent ID in a foreign system, if known.
    #[serde(default)]
    pub external_id: Option<String>,
    /// Suppressed features are stored but excluded from rebuilds.
    #[serde(default)]
    pub suppressed: bool,
}

impl FeatureCommon {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            external_id: None,
            suppressed: false,
        }
    }
}

/// How a feature combines with the existing body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BooleanOp {
    /// Add material as a new body.
    #[default]
    Boss,
    /// Remove material.
    Cut,
    /// Merge with the existing body.
    Merge,
}

impl BooleanOp {
    pub fn as_str(self) -> &'static str {
        match self {
            BooleanOp::Boss => "BOSS",
            BooleanOp::Cut => "Cut",
            BooleanOp::Merge => "Merge",
        }
    }

    /// Case-insensitive decode.
    pub fn parse(text: &str) -> Option<Self> {
        match text.to_ascii_lowercase().as_str() {
            "boss" => Some(BooleanOp::Boss),
            "cut" => Some(BooleanOp::Cut),
            "merge" => Some(BooleanOp::Merge),
            _ => None,
        }
    }
}

/// Rule terminating an extrusion in one direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EndType {
    #[default]
    Blind,
    ThroughAll,
    UpToNext,
    UpToFace,
    UpToVertex,
    MidPlane,
    ThroughAllBothSides,
}

impl EndType {
    pub fn as_str(self) -> &'static str {
        match self {
            EndType::Blind => "Blind",
            EndType::ThroughAll => "ThroughAll",
            EndType::UpToNext => "UpToNext",
            EndType::UpToFace => "UpToFace",
            EndType::UpToVertex => "UpToVertex",
            EndType::MidPlane => "MidPlane",
            EndType::ThroughAllBothSides => "ThroughAllBothSides",
        }
    }

    /// Case-insensitive decode.
    pub fn parse(text: &str) -> Option<Self> {
        match text.to_ascii_lowercase().as_str() {
            "blind" => Some(EndType::Blind),
            "throughall" => Some(EndType::ThroughAll),
            "uptonext" => Some(EndType::UpToNext),
            "uptoface" => Some(EndType::UpToFace),
            "uptovertex" => Some(EndType::UpToVertex),
            "midplane" => Some(EndType::MidPlane),
            "throughallbothsides" => Some(EndType::ThroughAllBothSides),
            _ => None,
        }
    }
}

/// One end condition of an extrusion.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EndCondition {
    pub kind: EndType,
    pub depth: f64,
    pub offset: f64,
    pub has_offset: bool,
    /// Reverse the extrusion direction for this end.
    pub flip: bool,
    /// Reverse which side of the boundary keeps material.
    pub flip_material_side: bool,
    /// Target entity for `UpToFace` / `UpToVertex`.
    pub reference: Option<Reference>,
}

impl EndCondition {
    /// Fixed depth.
    pub fn blind(depth: f64) -> Self {
        Self {
            kind: EndType::Blind,
            depth,
            ..Self::default()
        }
    }

    pub fn through_all() -> Self {
        Self {
            kind: EndType::ThroughAll,
            ..Self::default()
        }
    }

    pub fn through_all_both_sides() -> Self {
        Self {
            kind: EndType::ThroughAllBothSides,
            ..Self::default()
        }
    }

    pub fn up_to_next() -> Self {
        Self {
            kind: EndType::UpToNext,
            ..Self::default()
        }
    }

    /// Up to a referenced face or datum plane, optionally offset from it.
    pub fn up_to_face(reference: Reference, offset: f64) -> Self {
        Self {
            kind: EndType::UpToFace,
            offset,
            has_offset: offset.abs() > 1e-9,
            reference: Some(reference),
            ..Self::default()
        }
    }

    /// Up to a referenced vertex or datum point, optionally offset.
    pub fn up_to_vertex(reference: Reference, offset: f64) -> Self {
        Self {
            kind: EndType::UpToVertex,
            offset,
            has_offset: offset.abs() > 1e-9,
            reference: Some(reference),
            ..Self::default()
        }
    }

    /// Centered on the sketch plane with the given total depth.
    pub fn mid_plane(depth: f64) -> Self {
        Self {
            kind: EndType::MidPlane,
            depth,
            ..Self::default()
        }
    }
}

/// Draft applied to the extrusion walls.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Draft {
    /// Draft angle in degrees, non-negative.
    pub angle: f64,
    pub outward: bool,
}

/// Thin-wall option turning a profile into a shelled extrusion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThinWall {
    /// Wall thickness, strictly positive.
    pub thickness: f64,
    pub one_sided: bool,
    pub covered: bool,
}

/// An extrusion of a sketch profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Extrude {
    pub common: FeatureCommon,
    /// ID of the profile sketch, resolved through the model index.
    pub profile_sketch_id: String,
    /// Extrusion direction, stored normalized.
    pub direction: DVec3,
    pub operation: BooleanOp,
    pub end1: EndCondition,
    /// Second direction for two-directional extrusion.
    #[serde(default)]
    pub end2: Option<EndCondition>,
    #[serde(default)]
    pub draft: Option<Draft>,
    #[serde(default)]
    pub thin_wall: Option<ThinWall>,
}

impl Extrude {
    pub fn new(common: FeatureCommon) -> Self {
        Self {
            common,
            profile_sketch_id: String::new(),
            direction: DVec3::Z,
            operation: BooleanOp::Boss,
            end1: EndCondition::default(),
            end2: None,
            draft: None,
            thin_wall: None,
        }
    }
}

/// How the revolve axis is specified; exactly one of the three.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RevolveAxis {
    /// A line segment of the profile sketch, by local ID.
    SketchLine { local_id: String },
    /// An explicit origin and direction.
    Explicit { origin: DVec3, direction: DVec3 },
    /// A referenced entity (datum axis, edge).
    Entity(Reference),
}

impl Default for RevolveAxis {
    fn default() -> Self {
        RevolveAxis::Explicit {
            origin: DVec3::ZERO,
            direction: DVec3::ZERO,
        }
    }
}

impl RevolveAxis {
    /// Numeric wire value of the axis kind.
    pub fn kind_index(&self) -> i32 {
        match self {
            RevolveAxis::SketchLine { .. } => 0,
            RevolveAxis::Explicit { .. } => 1,
            RevolveAxis::Entity(_) => 2,
        }
    }
}

/// Angular sweep rule of a revolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AngleKind {
    #[default]
    Single,
    TwoWay,
    Symmetric,
}

impl AngleKind {
    pub fn index(self) -> i32 {
        self as i32
    }

    pub fn from_index(index: i32) -> Option<Self> {
        match index {
            0 => Some(AngleKind::Single),
            1 => Some(AngleKind::TwoWay),
            2 => Some(AngleKind::Symmetric),
            _ => None,
        }
    }
}

/// A revolution of a sketch profile around an axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Revolve {
    pub common: FeatureCommon,
    /// ID of the profile sketch, resolved through the model index.
    pub profile_sketch_id: String,
    pub axis: RevolveAxis,
    pub angle_kind: AngleKind,
    /// Angle in degrees; the only angle for `Single`, the first for
    /// `TwoWay`, the total for `Symmetric`.
    pub primary_angle: f64,
    /// Second angle for `TwoWay`.
    pub secondary_angle: f64,
}

impl Revolve {
    pub fn new(common: FeatureCommon) -> Self {
        Self {
            common,
            profile_sketch_id: String::new(),
            axis: RevolveAxis::default(),
            angle_kind: AngleKind::Single,
            primary_angle: 0.0,
            secondary_angle: 0.0,
        }
    }
}

/// An entry in the CAD feature history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Feature {
    Sketch(Sketch),
    Extrude(Extrude),
    Revolve(Revolve),
}

impl Feature {
    /// Shared header fields.
    pub fn common(&self) -> &FeatureCommon {
        match self {
            Feature::Sketch(s) => &s.common,
            Feature::Extrude(e) => &e.common,
            Feature::Revolve(r) => &r.common,
        }
    }

    /// Mutable shared header fields.
    pub fn common_mut(&mut self) -> &mut FeatureCommon {
        match self {
            Feature::Sketch(s) => &mut s.common,
            Feature::Extrude(e) => &mut e.common,
            Feature::Revolve(r) => &mut r.common,
        }
    }

    pub fn id(&self) -> &str {
        &self.common().id
    }

    pub fn name(&self) -> &str {
        &self.common().name
    }

    pub fn external_id(&self) -> Option<&str> {
        self.common().external_id.as_deref()
    }

    pub fn is_suppressed(&self) -> bool {
        self.common().suppressed
    }

    pub fn set_suppressed(&mut self, value: bool) {
        self.common_mut().suppressed = value;
    }

    /// Tag used by the persisted documents.
    pub fn type_name(&self) -> &'static str {
        match self {
            Feature::Sketch(_) => "Sketch",
            Feature::Extrude(_) => "Extrude",
            Feature::Revolve(_) => "Revolve",
        }
    }

    pub fn as_sketch(&self) -> Option<&Sketch> {
        match self {
            Feature::Sketch(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_extrude(&self) -> Option<&Extrude> {
        match self {
            Feature::Extrude(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_revolve(&self) -> Option<&Revolve> {
        match self {
            Feature::Revolve(r) => Some(r),
            _ => None,
        }
    }

    /// ID of the profile sketch for features that consume one.
    pub fn profile_sketch_id(&self) -> Option<&str> {
        match self {
            Feature::Extrude(e) => Some(e.profile_sketch_id.as_str()),
            Feature::Revolve(r) => Some(r.profile_sketch_id.as_str()),
            Feature::Sketch(_) => None,
        }
    }

    /// Every reference embedded in this feature, for integrity sweeps.
    pub fn references(&self) -> Vec<&Reference> {
        match self {
            Feature::Sketch(s) => s.reference_plane.iter().collect(),
            Feature::Extrude(e) => e
                .end1
                .reference
                .iter()
                .chain(e.end2.iter().filter_map(|c| c.reference.as_ref()))
                .collect(),
            Feature::Revolve(r) => match &r.axis {
                RevolveAxis::Entity(reference) => vec![reference],
                _ => Vec::new(),
            },
        }
    }
}
