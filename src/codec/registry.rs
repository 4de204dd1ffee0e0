//! Typed-Reference Codec Registry
//!
//! One fixed table with an entry per reference variant: the canonical
//! tag name, an encode function producing the variant's attribute set,
//! and a decode function rebuilding the variant from one. This is the
//! single place that knows the attribute layout per variant; both
//! serialization backends plug into it for the reference subtree.
//!
//! Encode is total over a well-formed reference. Decode is defensive:
//! cross-system files routinely omit attributes the origin system never
//! populated, so a missing attribute yields the zero value of its type,
//! never an error. Unknown tags fall back to a generic feature reference
//! (target ID only) with a warning.

use glam::DVec3;

use crate::reference::{PlaneFrame, RefKind, Reference, derived_y_dir};

/// A typed attribute value.
///
/// The variant set mirrors what reference fingerprints are made of;
/// backends render these natively (reflection) or as text (XML), where
/// points and vectors are formatted as `(x,y,z)` triples.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Str(String),
    Int(i32),
    Float(f64),
    Bool(bool),
    Point(DVec3),
    Vector(DVec3),
}

/// Format a point or vector as the `(x,y,z)` wire form.
pub fn format_triple(v: DVec3) -> String {
    format!("({},{},{})", v.x, v.y, v.z)
}

/// Parse the `(x,y,z)` wire form; the parentheses are optional.
pub fn parse_triple(text: &str) -> Option<DVec3> {
    let trimmed = text.trim();
    let inner = trimmed
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
        .unwrap_or(trimmed);
    let mut parts = inner.splitn(3, ',');
    let x = parts.next()?.trim().parse().ok()?;
    let y = parts.next()?.trim().parse().ok()?;
    let z = parts.next()?.trim().parse().ok()?;
    Some(DVec3::new(x, y, z))
}

/// An ordered attribute set exchanged with the registry.
///
/// Getters are total: a missing or mistyped attribute yields the zero
/// value of the requested type. `*_opt` getters exist for the few
/// attributes whose absence is meaningful (a plane's stored Y direction,
/// an edge's endpoints).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttrMap {
    entries: Vec<(String, AttrValue)>,
}

impl AttrMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: &str, value: AttrValue) {
        self.entries.push((key.to_string(), value));
    }

    pub fn set_str(&mut self, key: &str, value: &str) {
        self.set(key, AttrValue::Str(value.to_string()));
    }

    pub fn set_int(&mut self, key: &str, value: i32) {
        self.set(key, AttrValue::Int(value));
    }

    pub fn set_point(&mut self, key: &str, value: DVec3) {
        self.set(key, AttrValue::Point(value));
    }

    pub fn set_vector(&mut self, key: &str, value: DVec3) {
        self.set(key, AttrValue::Vector(value));
    }

    pub fn get(&self, key: &str) -> Option<&AttrValue> {
        self.entries
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn str_or_default(&self, key: &str) -> String {
        match self.get(key) {
            Some(AttrValue::Str(s)) => s.clone(),
            _ => String::new(),
        }
    }

    pub fn int_or_default(&self, key: &str) -> i32 {
        match self.get(key) {
            Some(AttrValue::Int(i)) => *i,
            Some(AttrValue::Float(f)) => *f as i32,
            Some(AttrValue::Str(s)) => s.trim().parse().unwrap_or(0),
            _ => 0,
        }
    }

    pub fn float_or_default(&self, key: &str) -> f64 {
        match self.get(key) {
            Some(AttrValue::Float(f)) => *f,
            Some(AttrValue::Int(i)) => *i as f64,
            Some(AttrValue::Str(s)) => s.trim().parse().unwrap_or(0.0),
            _ => 0.0,
        }
    }

    pub fn bool_or_default(&self, key: &str) -> bool {
        match self.get(key) {
            Some(AttrValue::Bool(b)) => *b,
            Some(AttrValue::Int(i)) => *i != 0,
            Some(AttrValue::Str(s)) => matches!(s.trim(), "true" | "True" | "1"),
            _ => false,
        }
    }

    fn triple(&self, key: &str) -> Option<DVec3> {
        match self.get(key)? {
            AttrValue::Point(p) | AttrValue::Vector(p) => Some(*p),
            AttrValue::Str(s) => parse_triple(s),
            _ => None,
        }
    }

    pub fn point_or_default(&self, key: &str) -> DVec3 {
        self.triple(key).unwrap_or(DVec3::ZERO)
    }

    pub fn vector_or_default(&self, key: &str) -> DVec3 {
        self.triple(key).unwrap_or(DVec3::ZERO)
    }

    /// A triple whose absence is meaningful to the caller.
    pub fn vector_opt(&self, key: &str) -> Option<DVec3> {
        self.triple(key)
    }
}

/// One registry entry: the canonical tag plus the variant's codec pair.
pub struct RefEntry {
    pub kind: RefKind,
    pub tag: &'static str,
    pub encode: fn(&Reference, &mut AttrMap),
    pub decode: fn(&AttrMap) -> Reference,
}

fn encode_plane(reference: &Reference, attrs: &mut AttrMap) {
    if let Reference::DatumPlane { target_id, frame } = reference {
        attrs.set_str("TargetFeatureID", target_id);
        attrs.set_point("Origin", frame.origin);
        attrs.set_vector("XDir", frame.x_dir);
        attrs.set_vector("YDir", frame.y_dir);
        attrs.set_vector("Normal", frame.normal);
    }
}

fn decode_plane(attrs: &AttrMap) -> Reference {
    let normal = attrs.vector_or_default("Normal");
    let x_dir = attrs.vector_or_default("XDir");
    // Older writers omit the secondary in-plane axis; the right-handed
    // orthogonal-frame invariant lets us rebuild it on every decode.
    let y_dir = attrs
        .vector_opt("YDir")
        .unwrap_or_else(|| derived_y_dir(normal, x_dir));
    Reference::DatumPlane {
        target_id: attrs.str_or_default("TargetFeatureID"),
        frame: PlaneFrame {
            origin: attrs.point_or_default("Origin"),
            x_dir,
            y_dir,
            normal,
        },
    }
}

fn encode_target_only(reference: &Reference, attrs: &mut AttrMap) {
    attrs.set_str(
        "TargetFeatureID",
        reference.target_feature_id().unwrap_or_default(),
    );
}

fn decode_axis(attrs: &AttrMap) -> Reference {
    Reference::DatumAxis {
        target_id: attrs.str_or_default("TargetFeatureID"),
    }
}

fn decode_point(attrs: &AttrMap) -> Reference {
    Reference::DatumPoint {
        target_id: attrs.str_or_default("TargetFeatureID"),
    }
}

fn decode_sketch(attrs: &AttrMap) -> Reference {
    Reference::Sketch {
        target_id: attrs.str_or_default("TargetFeatureID"),
    }
}

fn encode_face(reference: &Reference, attrs: &mut AttrMap) {
    if let Reference::Face {
        parent_id,
        topology_index,
        normal,
        centroid,
        u_dir,
        v_dir,
    } = reference
    {
        attrs.set_str("ParentFeatureID", parent_id);
        attrs.set_int("TopologyIndex", *topology_index);
        attrs.set_vector("U", *u_dir);
        attrs.set_vector("V", *v_dir);
        attrs.set_vector("Normal", *normal);
        attrs.set_point("Center", *centroid);
    }
}

fn decode_face(attrs: &AttrMap) -> Reference {
    Reference::Face {
        parent_id: attrs.str_or_default("ParentFeatureID"),
        topology_index: attrs.int_or_default("TopologyIndex"),
        normal: attrs.vector_or_default("Normal"),
        centroid: attrs.point_or_default("Center"),
        u_dir: attrs.vector_or_default("U"),
        v_dir: attrs.vector_or_default("V"),
    }
}

fn encode_edge(reference: &Reference, attrs: &mut AttrMap) {
    if let Reference::Edge {
        parent_id,
        topology_index,
        mid_point,
        start_point,
        end_point,
    } = reference
    {
        attrs.set_str("ParentFeatureID", parent_id);
        attrs.set_int("TopologyIndex", *topology_index);
        attrs.set_point("MidPoint", *mid_point);
        if let Some(start) = start_point {
            attrs.set_point("Start", *start);
        }
        if let Some(end) = end_point {
            attrs.set_point("End", *end);
        }
    }
}

fn decode_edge(attrs: &AttrMap) -> Reference {
    Reference::Edge {
        parent_id: attrs.str_or_default("ParentFeatureID"),
        topology_index: attrs.int_or_default("TopologyIndex"),
        mid_point: attrs.point_or_default("MidPoint"),
        start_point: attrs.vector_opt("Start"),
        end_point: attrs.vector_opt("End"),
    }
}

fn encode_vertex(reference: &Reference, attrs: &mut AttrMap) {
    if let Reference::Vertex {
        parent_id,
        topology_index,
        position,
    } = reference
    {
        attrs.set_str("ParentFeatureID", parent_id);
        attrs.set_int("TopologyIndex", *topology_index);
        attrs.set_point("Position", *position);
    }
}

fn decode_vertex(attrs: &AttrMap) -> Reference {
    Reference::Vertex {
        parent_id: attrs.str_or_default("ParentFeatureID"),
        topology_index: attrs.int_or_default("TopologyIndex"),
        position: attrs.point_or_default("Position"),
    }
}

fn encode_sketch_segment(reference: &Reference, attrs: &mut AttrMap) {
    if let Reference::SketchSegment {
        parent_id,
        topology_index,
        segment_local_id,
    } = reference
    {
        attrs.set_str("ParentFeatureID", parent_id);
        attrs.set_int("TopologyIndex", *topology_index);
        if !segment_local_id.is_empty() {
            attrs.set_str("SegmentLocalID", segment_local_id);
        }
    }
}

fn decode_sketch_segment(attrs: &AttrMap) -> Reference {
    Reference::SketchSegment {
        parent_id: attrs.str_or_default("ParentFeatureID"),
        topology_index: attrs.int_or_default("TopologyIndex"),
        segment_local_id: attrs.str_or_default("SegmentLocalID"),
    }
}

/// The process-wide registry: one entry per variant, immutable for the
/// process lifetime.
pub static REF_ENTRIES: &[RefEntry] = &[
    RefEntry {
        kind: RefKind::DatumPlane,
        tag: "Plane",
        encode: encode_plane,
        decode: decode_plane,
    },
    RefEntry {
        kind: RefKind::DatumAxis,
        tag: "Axis",
        encode: encode_target_only,
        decode: decode_axis,
    },
    RefEntry {
        kind: RefKind::DatumPoint,
        tag: "Point",
        encode: encode_target_only,
        decode: decode_point,
    },
    RefEntry {
        kind: RefKind::Sketch,
        tag: "Sketch",
        encode: encode_target_only,
        decode: decode_sketch,
    },
    RefEntry {
        kind: RefKind::Face,
        tag: "Face",
        encode: encode_face,
        decode: decode_face,
    },
    RefEntry {
        kind: RefKind::Edge,
        tag: "Edge",
        encode: encode_edge,
        decode: decode_edge,
    },
    RefEntry {
        kind: RefKind::Vertex,
        tag: "Vertex",
        encode: encode_vertex,
        decode: decode_vertex,
    },
    RefEntry {
        kind: RefKind::SketchSegment,
        tag: "SketchSeg",
        encode: encode_sketch_segment,
        decode: decode_sketch_segment,
    },
];

/// Look up the entry for a variant.
pub fn entry_for_kind(kind: RefKind) -> &'static RefEntry {
    REF_ENTRIES
        .iter()
        .find(|e| e.kind == kind)
        .expect("every reference variant has a registry entry")
}

/// Look up an entry by its canonical tag, case-insensitively.
pub fn entry_for_tag(tag: &str) -> Option<&'static RefEntry> {
    REF_ENTRIES.iter().find(|e| e.tag.eq_ignore_ascii_case(tag))
}

/// Encode a reference through its registry entry.
pub fn encode_reference(reference: &Reference) -> (&'static str, AttrMap) {
    let entry = entry_for_kind(reference.kind());
    let mut attrs = AttrMap::new();
    (entry.encode)(reference, &mut attrs);
    (entry.tag, attrs)
}

/// Decode a reference from a tag and attribute set.
///
/// `Feature` is the one documented legacy tag older writers used for
/// every reference; it decodes as a bare feature reference. Any other
/// unrecognized tag also degrades to a bare feature reference, with a
/// warning, so a file is never rejected over a tag this build does not
/// know.
pub fn decode_reference(tag: &str, attrs: &AttrMap) -> Reference {
    if let Some(entry) = entry_for_tag(tag) {
        return (entry.decode)(attrs);
    }

    if !tag.is_empty() && !tag.eq_ignore_ascii_case("feature") {
        tracing::warn!(tag, "unrecognized reference variant, decoding as feature reference");
    }

    Reference::DatumPlane {
        target_id: attrs.str_or_default("TargetFeatureID"),
        frame: PlaneFrame::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::points_coincident;

    #[test]
    fn test_triple_wire_form() {
        let v = DVec3::new(50.0, 25.0, 20.0);
        assert_eq!(parse_triple(&format_triple(v)), Some(v));
        assert_eq!(parse_triple("1,2,3"), Some(DVec3::new(1.0, 2.0, 3.0)));
        assert_eq!(parse_triple("(1,2)"), None);
        assert_eq!(parse_triple("nonsense"), None);
    }

    #[test]
    fn test_face_round_trip_through_registry() {
        let face = Reference::Face {
            parent_id: "F2".into(),
            topology_index: 0,
            normal: DVec3::new(0.0, 0.0, 1.0),
            centroid: DVec3::new(50.0, 25.0, 20.0),
            u_dir: DVec3::X,
            v_dir: DVec3::Y,
        };
        let (tag, attrs) = encode_reference(&face);
        assert_eq!(tag, "Face");
        let decoded = decode_reference(tag, &attrs);
        assert_eq!(decoded, face);
    }

    #[test]
    fn test_plane_missing_y_dir_is_reconstructed() {
        let mut attrs = AttrMap::new();
        attrs.set_str("TargetFeatureID", "STD_DATUM_XY");
        attrs.set_point("Origin", DVec3::ZERO);
        attrs.set_vector("XDir", DVec3::X);
        attrs.set_vector("Normal", DVec3::Z);
        let decoded = decode_reference("Plane", &attrs);
        match decoded {
            Reference::DatumPlane { frame, .. } => {
                assert!(points_coincident(frame.y_dir, DVec3::Y));
            }
            _ => panic!("expected a datum plane"),
        }
    }

    #[test]
    fn test_missing_attributes_decode_to_zero_values() {
        let attrs = AttrMap::new();
        let decoded = decode_reference("Edge", &attrs);
        assert_eq!(
            decoded,
            Reference::Edge {
                parent_id: String::new(),
                topology_index: 0,
                mid_point: DVec3::ZERO,
                start_point: None,
                end_point: None,
            }
        );
    }

    #[test]
    fn test_legacy_feature_tag_decodes_as_feature_reference() {
        let mut attrs = AttrMap::new();
        attrs.set_str("TargetFeatureID", "F7");
        let decoded = decode_reference("Feature", &attrs);
        assert_eq!(decoded.target_feature_id(), Some("F7"));
        assert_eq!(decoded.kind(), RefKind::DatumPlane);
    }

    #[test]
    fn test_unknown_tag_degrades_to_feature_reference() {
        let mut attrs = AttrMap::new();
        attrs.set_str("TargetFeatureID", "F7");
        let decoded = decode_reference("Loop", &attrs);
        assert_eq!(decoded.target_feature_id(), Some("F7"));
    }

    #[test]
    fn test_attrs_parse_string_typed_values() {
        let mut attrs = AttrMap::new();
        attrs.set_str("TopologyIndex", "3");
        attrs.set_str("MidPoint", "(1,2,3)");
        attrs.set_str("ParentFeatureID", "F2");
        let decoded = decode_reference("edge", &attrs);
        assert_eq!(
            decoded,
            Reference::Edge {
                parent_id: "F2".into(),
                topology_index: 3,
                mid_point: DVec3::new(1.0, 2.0, 3.0),
                start_point: None,
                end_point: None,
            }
        );
    }
}
