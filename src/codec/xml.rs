//! Human-Readable Codec
//!
//! Hand-written XML backend. The writer emits a tagged element per
//! feature in authoring order; the reader mirrors the tree and is
//! deliberately lenient: feature dispatch is by an explicit `Type`
//! attribute, missing optional attributes fall back to per-field
//! defaults, and legacy reference tags are accepted instead of rejected.
//! Only a structurally broken document (no root element) is an error.

use std::fmt::Write as _;
use std::path::Path;

use glam::DVec3;

use crate::feature::{
    AngleKind, BooleanOp, Draft, EndCondition, EndType, Extrude, Feature, FeatureCommon, Revolve,
    RevolveAxis, ThinWall,
};
use crate::model::{Model, UnitSystem};
use crate::reference::Reference;
use crate::sketch::{Constraint, ConstraintKind, SegmentGeometry, Sketch, SketchSegment};

use super::registry::{self, AttrValue, format_triple, parse_triple};
use super::{CodecError, CodecResult};

// =================================================================
// Encode
// =================================================================

pub fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

fn attr_text(value: &AttrValue) -> String {
    match value {
        AttrValue::Str(s) => xml_escape(s),
        AttrValue::Int(i) => i.to_string(),
        AttrValue::Float(f) => f.to_string(),
        AttrValue::Bool(b) => b.to_string(),
        AttrValue::Point(v) | AttrValue::Vector(v) => format_triple(*v),
    }
}

/// Render a model as a human-readable document.
pub fn write_xml_string(model: &Model) -> String {
    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\"?>\n");
    let _ = writeln!(
        out,
        "<UnifiedModel UnitSystem=\"{}\" ModelName=\"{}\" FeatureCount=\"{}\">",
        model.unit.as_str(),
        xml_escape(&model.name),
        model.len()
    );

    for feature in model.features() {
        write_feature(&mut out, feature);
    }

    out.push_str("</UnifiedModel>\n");
    out
}

fn common_attrs(common: &FeatureCommon) -> String {
    format!(
        "ID=\"{}\" Name=\"{}\" Suppressed=\"{}\"",
        xml_escape(&common.id),
        xml_escape(&common.name),
        common.suppressed
    )
}

fn write_feature(out: &mut String, feature: &Feature) {
    match feature {
        Feature::Sketch(sketch) => {
            let _ = writeln!(
                out,
                "  <Feature Type=\"Sketch\" {}>",
                common_attrs(&sketch.common)
            );
            write_sketch(out, sketch);
        }
        Feature::Extrude(extrude) => {
            let _ = writeln!(
                out,
                "  <Feature Type=\"Extrude\" {} Operation=\"{}\">",
                common_attrs(&extrude.common),
                extrude.operation.as_str()
            );
            write_extrude(out, extrude);
        }
        Feature::Revolve(revolve) => {
            let _ = writeln!(
                out,
                "  <Feature Type=\"Revolve\" {} ProfileSketchID=\"{}\" AngleKind=\"{}\" PrimaryAngle=\"{}\" SecondaryAngle=\"{}\">",
                common_attrs(&revolve.common),
                xml_escape(&revolve.profile_sketch_id),
                revolve.angle_kind.index(),
                revolve.primary_angle,
                revolve.secondary_angle
            );
            write_revolve(out, revolve);
        }
    }
    out.push_str("  </Feature>\n");
}

/// Emit a reference element named after its role, tagged with the
/// registry's canonical variant name.
fn write_reference(out: &mut String, indent: usize, role: &str, reference: &Reference) {
    let (tag, attrs) = registry::encode_reference(reference);
    let pad = " ".repeat(indent);
    let _ = write!(out, "{pad}<{role} Type=\"{tag}\"");
    for (key, value) in attrs.iter() {
        let _ = write!(out, " {key}=\"{}\"", attr_text(value));
    }
    out.push_str("/>\n");
}

fn write_sketch(out: &mut String, sketch: &Sketch) {
    if let Some(reference) = &sketch.reference_plane {
        write_reference(out, 4, "ReferencePlane", reference);
    }

    out.push_str("    <Segments>\n");
    for segment in &sketch.segments {
        write_segment(out, segment);
    }
    out.push_str("    </Segments>\n");

    out.push_str("    <Constraints>\n");
    for constraint in &sketch.constraints {
        write_constraint(out, constraint);
    }
    out.push_str("    </Constraints>\n");
}

fn write_segment(out: &mut String, segment: &SketchSegment) {
    let _ = write!(out, "      <Segment LocalID=\"{}\"", xml_escape(&segment.local_id));
    // Construction has no meaning for bare points; older readers never
    // look for it there.
    if !matches!(segment.geometry, SegmentGeometry::Point { .. }) {
        let _ = write!(out, " Construction=\"{}\"", segment.construction);
    }
    match &segment.geometry {
        SegmentGeometry::Line { start, end } => {
            let _ = write!(
                out,
                " Type=\"Line\" Start=\"{}\" End=\"{}\"",
                format_triple(*start),
                format_triple(*end)
            );
        }
        SegmentGeometry::Circle { center, radius } => {
            let _ = write!(
                out,
                " Type=\"Circle\" Center=\"{}\" Radius=\"{}\"",
                format_triple(*center),
                radius
            );
        }
        SegmentGeometry::Arc {
            center,
            radius,
            start_angle,
            end_angle,
            clockwise,
        } => {
            let _ = write!(
                out,
                " Type=\"Arc\" Center=\"{}\" Radius=\"{}\" StartAngle=\"{}\" EndAngle=\"{}\" Clockwise=\"{}\"",
                format_triple(*center),
                radius,
                start_angle,
                end_angle,
                clockwise
            );
        }
        SegmentGeometry::Point { position } => {
            let _ = write!(out, " Type=\"Point\" Position=\"{}\"", format_triple(*position));
        }
    }
    out.push_str("/>\n");
}

fn write_constraint(out: &mut String, constraint: &Constraint) {
    let _ = write!(
        out,
        "      <Constraint Type=\"{}\" Entities=\"{}\"",
        constraint.kind.index(),
        xml_escape(&constraint.entities.join(","))
    );
    if let Some(dimension) = constraint.dimension {
        let _ = write!(out, " Dimension=\"{dimension}\"");
    }
    out.push_str("/>\n");
}

fn write_end_condition(out: &mut String, name: &str, cond: &EndCondition) {
    let _ = write!(
        out,
        "    <{name} Type=\"{}\" Depth=\"{}\" Offset=\"{}\" HasOffset=\"{}\" Flip=\"{}\" FlipMaterialSide=\"{}\"",
        cond.kind.as_str(),
        cond.depth,
        cond.offset,
        cond.has_offset,
        cond.flip,
        cond.flip_material_side
    );
    match &cond.reference {
        Some(reference) => {
            out.push_str(">\n");
            write_reference(out, 6, "ReferenceEntity", reference);
            let _ = writeln!(out, "    </{name}>");
        }
        None => out.push_str("/>\n"),
    }
}

fn write_extrude(out: &mut String, extrude: &Extrude) {
    if !extrude.profile_sketch_id.is_empty() {
        let _ = writeln!(
            out,
            "    <ProfileSketchID Value=\"{}\"/>",
            xml_escape(&extrude.profile_sketch_id)
        );
    }
    let _ = writeln!(
        out,
        "    <Direction Value=\"{}\"/>",
        format_triple(extrude.direction)
    );

    write_end_condition(out, "EndCondition1", &extrude.end1);
    if let Some(end2) = &extrude.end2 {
        write_end_condition(out, "EndCondition2", end2);
    }

    if let Some(draft) = &extrude.draft {
        let _ = writeln!(
            out,
            "    <Draft Angle=\"{}\" Outward=\"{}\"/>",
            draft.angle, draft.outward
        );
    }
    if let Some(thin_wall) = &extrude.thin_wall {
        let _ = writeln!(
            out,
            "    <ThinWall Thickness=\"{}\" OneSided=\"{}\" Covered=\"{}\"/>",
            thin_wall.thickness, thin_wall.one_sided, thin_wall.covered
        );
    }
}

fn write_revolve(out: &mut String, revolve: &Revolve) {
    let (kind, local_id, origin, direction, reference) = match &revolve.axis {
        RevolveAxis::SketchLine { local_id } => {
            (0, local_id.as_str(), DVec3::ZERO, DVec3::ZERO, None)
        }
        RevolveAxis::Explicit { origin, direction } => (1, "", *origin, *direction, None),
        RevolveAxis::Entity(reference) => (2, "", DVec3::ZERO, DVec3::ZERO, Some(reference)),
    };

    let _ = write!(
        out,
        "    <Axis Kind=\"{kind}\" RefLocalID=\"{}\" Origin=\"{}\" Direction=\"{}\"",
        xml_escape(local_id),
        format_triple(origin),
        format_triple(direction)
    );
    match reference {
        Some(reference) => {
            out.push_str(">\n");
            write_reference(out, 6, "ReferenceEntity", reference);
            out.push_str("    </Axis>\n");
        }
        None => out.push_str("/>\n"),
    }
}

/// Write a model to a file.
pub fn save(model: &Model, path: impl AsRef<Path>) -> CodecResult<()> {
    std::fs::write(path, write_xml_string(model)).map_err(|e| CodecError::Io(e.to_string()))
}

// =================================================================
// Decode
// =================================================================

/// Minimal element tree: the document format is attribute-driven, so
/// text nodes are irrelevant.
#[derive(Debug, Default)]
struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Element>,
}

impl Element {
    fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.children.iter().filter(move |c| c.name == name)
    }

    fn f64_attr(&self, name: &str) -> f64 {
        self.attr(name)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(0.0)
    }

    fn i32_attr(&self, name: &str) -> i32 {
        self.attr(name)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(0)
    }

    fn bool_attr(&self, name: &str) -> bool {
        matches!(self.attr(name).map(str::trim), Some("true" | "True" | "1"))
    }

    fn triple_attr(&self, name: &str) -> DVec3 {
        self.attr(name)
            .and_then(parse_triple)
            .unwrap_or(DVec3::ZERO)
    }
}

fn element_from_event(event: &quick_xml::events::BytesStart) -> CodecResult<Element> {
    let name = String::from_utf8_lossy(event.name().as_ref()).into_owned();
    let mut attributes = Vec::new();
    for attribute in event.attributes() {
        let attribute = attribute.map_err(|e| CodecError::Malformed(e.to_string()))?;
        let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
        let value = attribute
            .unescape_value()
            .map_err(|e| CodecError::Malformed(e.to_string()))?
            .into_owned();
        attributes.push((key, value));
    }
    Ok(Element {
        name,
        attributes,
        children: Vec::new(),
    })
}

fn parse_document(xml: &str) -> CodecResult<Vec<Element>> {
    use quick_xml::Reader;
    use quick_xml::events::Event;

    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Element> = Vec::new();
    let mut roots: Vec<Element> = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref event)) => {
                stack.push(element_from_event(event)?);
            }
            Ok(Event::Empty(ref event)) => {
                let element = element_from_event(event)?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None => roots.push(element),
                }
            }
            Ok(Event::End(_)) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| CodecError::Malformed("unbalanced closing tag".into()))?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None => roots.push(element),
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(CodecError::Malformed(e.to_string())),
        }
    }

    if !stack.is_empty() {
        return Err(CodecError::Malformed("unclosed element".into()));
    }
    Ok(roots)
}

/// Parse a human-readable document into a model.
pub fn parse_xml_str(xml: &str) -> CodecResult<Model> {
    let roots = parse_document(xml)?;
    let root = roots
        .iter()
        .find(|e| e.name == "UnifiedModel")
        .ok_or_else(|| CodecError::Malformed("missing UnifiedModel root element".into()))?;

    let mut model = Model::new();
    if let Some(unit) = root.attr("UnitSystem").and_then(UnitSystem::parse) {
        model.unit = unit;
    }
    if let Some(name) = root.attr("ModelName") {
        model.name = name.to_string();
    }

    for element in root.children_named("Feature") {
        if let Some(feature) = decode_feature(element) {
            model.add_feature(feature);
        }
    }

    Ok(model)
}

/// Read a model from a file.
pub fn load(path: impl AsRef<Path>) -> CodecResult<Model> {
    let content =
        std::fs::read_to_string(path).map_err(|e| CodecError::Io(e.to_string()))?;
    parse_xml_str(&content)
}

fn decode_common(element: &Element) -> FeatureCommon {
    let mut common = FeatureCommon::new(
        element.attr("ID").unwrap_or_default(),
        element.attr("Name").unwrap_or_default(),
    );
    common.suppressed = element.bool_attr("Suppressed");
    common
}

fn decode_feature(element: &Element) -> Option<Feature> {
    let kind = match element.attr("Type") {
        Some(kind) => kind,
        None => {
            tracing::warn!("feature element without Type attribute, skipping");
            return None;
        }
    };
    let common = decode_common(element);

    match kind {
        "Sketch" => Some(Feature::Sketch(decode_sketch(element, common))),
        "Extrude" => Some(Feature::Extrude(decode_extrude(element, common))),
        "Revolve" => Some(Feature::Revolve(decode_revolve(element, common))),
        other => {
            tracing::warn!(feature_type = other, "unknown feature type, skipping");
            None
        }
    }
}

/// Find the reference child for a role, falling back to the legacy
/// generic `Reference` element name used by older writers.
fn reference_child<'a>(element: &'a Element, role: &str) -> Option<&'a Element> {
    element.child(role).or_else(|| element.child("Reference"))
}

/// Decode a nested reference element via the registry.
///
/// An element without a `Type` attribute still decodes as a generic
/// feature reference when it carries a target ID; dropping it silently
/// would lose the one field that can be re-resolved.
fn decode_reference_element(element: &Element) -> Option<Reference> {
    let tag = match element.attr("Type") {
        Some(tag) => tag,
        None => {
            if element.attr("TargetFeatureID").is_none() {
                return None;
            }
            tracing::warn!(
                element = element.name.as_str(),
                "reference element without Type attribute, decoding as feature reference"
            );
            ""
        }
    };
    let mut attrs = registry::AttrMap::new();
    for (key, value) in &element.attributes {
        if key != "Type" {
            attrs.set_str(key, value);
        }
    }
    Some(registry::decode_reference(tag, &attrs))
}

fn decode_sketch(element: &Element, common: FeatureCommon) -> Sketch {
    let mut sketch = Sketch::new(common);
    sketch.reference_plane =
        reference_child(element, "ReferencePlane").and_then(decode_reference_element);

    if let Some(segments) = element.child("Segments") {
        for segment in segments.children_named("Segment") {
            if let Some(segment) = decode_segment(segment) {
                sketch.segments.push(segment);
            }
        }
    }

    if let Some(constraints) = element.child("Constraints") {
        for constraint in constraints.children_named("Constraint") {
            if let Some(constraint) = decode_constraint(constraint) {
                sketch.constraints.push(constraint);
            }
        }
    }

    sketch
}

fn decode_segment(element: &Element) -> Option<SketchSegment> {
    let geometry = match element.attr("Type") {
        Some("Line") => SegmentGeometry::Line {
            start: element.triple_attr("Start"),
            end: element.triple_attr("End"),
        },
        Some("Circle") => SegmentGeometry::Circle {
            center: element.triple_attr("Center"),
            radius: element.f64_attr("Radius"),
        },
        Some("Arc") => SegmentGeometry::Arc {
            center: element.triple_attr("Center"),
            radius: element.f64_attr("Radius"),
            start_angle: element.f64_attr("StartAngle"),
            end_angle: element.f64_attr("EndAngle"),
            clockwise: element.bool_attr("Clockwise"),
        },
        Some("Point") => SegmentGeometry::Point {
            position: element.triple_attr("Position"),
        },
        other => {
            tracing::warn!(segment_type = ?other, "unknown sketch segment type, skipping");
            return None;
        }
    };

    let mut segment = SketchSegment::new(element.attr("LocalID").unwrap_or_default(), geometry);
    segment.construction = element.bool_attr("Construction");
    Some(segment)
}

fn decode_constraint(element: &Element) -> Option<Constraint> {
    let kind = match ConstraintKind::from_index(element.i32_attr("Type")) {
        Some(kind) => kind,
        None => {
            tracing::warn!(value = element.i32_attr("Type"), "unknown constraint type, skipping");
            return None;
        }
    };
    let entities = element
        .attr("Entities")
        .unwrap_or_default()
        .split(',')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    Some(Constraint {
        kind,
        entities,
        dimension: element.attr("Dimension").and_then(|v| v.trim().parse().ok()),
    })
}

fn decode_end_condition(element: &Element) -> EndCondition {
    EndCondition {
        kind: element
            .attr("Type")
            .and_then(EndType::parse)
            .unwrap_or_default(),
        depth: element.f64_attr("Depth"),
        offset: element.f64_attr("Offset"),
        has_offset: element.bool_attr("HasOffset"),
        flip: element.bool_attr("Flip"),
        flip_material_side: element.bool_attr("FlipMaterialSide"),
        reference: reference_child(element, "ReferenceEntity").and_then(decode_reference_element),
    }
}

fn decode_extrude(element: &Element, common: FeatureCommon) -> Extrude {
    let mut extrude = Extrude::new(common);

    if let Some(profile) = element.child("ProfileSketchID")
        && let Some(value) = profile.attr("Value")
    {
        extrude.profile_sketch_id = value.to_string();
    }
    if let Some(direction) = element.child("Direction") {
        extrude.direction = direction.triple_attr("Value");
    }
    if let Some(operation) = element.attr("Operation").and_then(BooleanOp::parse) {
        extrude.operation = operation;
    }

    if let Some(end1) = element.child("EndCondition1") {
        extrude.end1 = decode_end_condition(end1);
    }
    extrude.end2 = element.child("EndCondition2").map(decode_end_condition);

    extrude.draft = element.child("Draft").map(|draft| Draft {
        angle: draft.f64_attr("Angle"),
        outward: draft.bool_attr("Outward"),
    });
    extrude.thin_wall = element.child("ThinWall").map(|thin_wall| ThinWall {
        thickness: thin_wall.f64_attr("Thickness"),
        one_sided: thin_wall.bool_attr("OneSided"),
        covered: thin_wall.bool_attr("Covered"),
    });

    extrude
}

fn decode_revolve(element: &Element, common: FeatureCommon) -> Revolve {
    let mut revolve = Revolve::new(common);
    revolve.profile_sketch_id = element.attr("ProfileSketchID").unwrap_or_default().to_string();
    revolve.angle_kind = AngleKind::from_index(element.i32_attr("AngleKind")).unwrap_or_default();
    revolve.primary_angle = element.f64_attr("PrimaryAngle");
    revolve.secondary_angle = element.f64_attr("SecondaryAngle");

    if let Some(axis) = element.child("Axis") {
        revolve.axis = match axis.i32_attr("Kind") {
            0 => RevolveAxis::SketchLine {
                local_id: axis.attr("RefLocalID").unwrap_or_default().to_string(),
            },
            2 => match reference_child(axis, "ReferenceEntity").and_then(decode_reference_element) {
                Some(reference) => RevolveAxis::Entity(reference),
                // A reference axis without its reference still carries
                // the explicit fields; keep what is there.
                None => RevolveAxis::Explicit {
                    origin: axis.triple_attr("Origin"),
                    direction: axis.triple_attr("Direction"),
                },
            },
            _ => RevolveAxis::Explicit {
                origin: axis.triple_attr("Origin"),
                direction: axis.triple_attr("Direction"),
            },
        };
    }

    revolve
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::points_coincident;

    fn sample_model() -> Model {
        use crate::builder::{ExtrudeBuilder, SketchBuilder};
        use crate::id::CounterIdGenerator;

        let mut model = Model::with_unit(UnitSystem::Millimeter, "Part1");
        let ids = CounterIdGenerator::new();

        let mut sb = SketchBuilder::new(&mut model, &ids, "Sketch1");
        sb.set_reference_plane(Reference::xy_plane()).unwrap();
        let l1 = sb.add_line(DVec3::ZERO, DVec3::new(100.0, 0.0, 0.0));
        sb.add_line(DVec3::new(100.0, 0.0, 0.0), DVec3::new(100.0, 50.0, 0.0));
        sb.add_horizontal(&l1).unwrap();
        let sketch_id = sb.finish();

        let mut eb = ExtrudeBuilder::new(&mut model, &ids, "Extrude1");
        eb.set_profile(&sketch_id).unwrap();
        eb.set_direction(DVec3::Z).unwrap();
        eb.set_end_condition(EndCondition::blind(20.0)).unwrap();
        eb.finish().unwrap();
        model
    }

    #[test]
    fn test_round_trip_preserves_feature_headers() {
        let model = sample_model();
        let xml = write_xml_string(&model);
        let decoded = parse_xml_str(&xml).unwrap();

        assert_eq!(decoded.len(), model.len());
        assert_eq!(decoded.unit, UnitSystem::Millimeter);
        assert_eq!(decoded.name, "Part1");
        for (a, b) in model.features().iter().zip(decoded.features()) {
            assert_eq!(a.id(), b.id());
            assert_eq!(a.name(), b.name());
            assert_eq!(a.type_name(), b.type_name());
            assert_eq!(a.is_suppressed(), b.is_suppressed());
        }
    }

    #[test]
    fn test_round_trip_preserves_extrude_fields() {
        let model = sample_model();
        let decoded = parse_xml_str(&write_xml_string(&model)).unwrap();
        let extrude = decoded
            .features()
            .iter()
            .find_map(Feature::as_extrude)
            .unwrap();
        assert_eq!(extrude.profile_sketch_id, "F1");
        assert_eq!(extrude.end1.kind, EndType::Blind);
        assert_eq!(extrude.end1.depth, 20.0);
        assert_eq!(extrude.operation, BooleanOp::Boss);
        assert!(points_coincident(extrude.direction, DVec3::Z));
    }

    #[test]
    fn test_missing_root_is_hard_failure() {
        let result = parse_xml_str("<?xml version=\"1.0\"?><SomethingElse/>");
        assert!(matches!(result, Err(CodecError::Malformed(_))));
    }

    #[test]
    fn test_plane_without_y_dir_reconstructs_it() {
        let xml = r#"<?xml version="1.0"?>
<UnifiedModel UnitSystem="Millimeter" ModelName="Old" FeatureCount="1">
  <Feature Type="Sketch" ID="F1" Name="Sketch1" Suppressed="false">
    <ReferencePlane Type="Plane" TargetFeatureID="STD_DATUM_XY" Origin="(0,0,0)" XDir="(1,0,0)" Normal="(0,0,1)"/>
    <Segments></Segments>
    <Constraints></Constraints>
  </Feature>
</UnifiedModel>"#;
        let model = parse_xml_str(xml).unwrap();
        let sketch = model.sketch("F1").unwrap();
        match sketch.reference_plane.as_ref().unwrap() {
            Reference::DatumPlane { frame, .. } => {
                assert!(points_coincident(frame.y_dir, DVec3::Y));
            }
            other => panic!("expected datum plane, got {other:?}"),
        }
    }

    #[test]
    fn test_legacy_reference_tag_is_accepted() {
        let xml = r#"<?xml version="1.0"?>
<UnifiedModel UnitSystem="Meter" ModelName="Legacy" FeatureCount="1">
  <Feature Type="Sketch" ID="F1" Name="Sketch1" Suppressed="false">
    <ReferencePlane Type="Feature" TargetFeatureID="OldPlane7"/>
  </Feature>
</UnifiedModel>"#;
        let model = parse_xml_str(xml).unwrap();
        let sketch = model.sketch("F1").unwrap();
        let reference = sketch.reference_plane.as_ref().unwrap();
        assert_eq!(reference.target_feature_id(), Some("OldPlane7"));
    }

    #[test]
    fn test_legacy_reference_element_name_is_accepted() {
        let xml = r#"<?xml version="1.0"?>
<UnifiedModel UnitSystem="Meter" ModelName="Legacy" FeatureCount="1">
  <Feature Type="Sketch" ID="F1" Name="Sketch1" Suppressed="false">
    <Reference Type="Plane" TargetFeatureID="STD_DATUM_XY" Origin="(0,0,0)" XDir="(1,0,0)" Normal="(0,0,1)"/>
  </Feature>
</UnifiedModel>"#;
        let model = parse_xml_str(xml).unwrap();
        let sketch = model.sketch("F1").unwrap();
        assert_eq!(
            sketch.reference_plane.as_ref().unwrap().target_feature_id(),
            Some("STD_DATUM_XY")
        );
    }

    #[test]
    fn test_unknown_feature_type_is_skipped() {
        let xml = r#"<?xml version="1.0"?>
<UnifiedModel UnitSystem="Meter" ModelName="M" FeatureCount="2">
  <Feature Type="Loft" ID="F1" Name="Loft1" Suppressed="false"/>
  <Feature Type="Sketch" ID="F2" Name="Sketch1" Suppressed="false"/>
</UnifiedModel>"#;
        let model = parse_xml_str(xml).unwrap();
        assert_eq!(model.len(), 1);
        assert!(model.sketch("F2").is_some());
    }

    #[test]
    fn test_revolve_round_trip() {
        use crate::builder::{RevolveBuilder, SketchBuilder};
        use crate::id::CounterIdGenerator;

        let mut model = Model::with_unit(UnitSystem::Millimeter, "RevolvePart");
        let ids = CounterIdGenerator::new();
        let mut sb = SketchBuilder::new(&mut model, &ids, "Profile");
        sb.set_reference_plane(Reference::zx_plane()).unwrap();
        let axis_line = sb.add_line(DVec3::ZERO, DVec3::new(0.0, 30.0, 0.0));
        sb.add_line(DVec3::new(10.0, 0.0, 0.0), DVec3::new(10.0, 30.0, 0.0));
        let sketch_id = sb.finish();

        let mut rb = RevolveBuilder::new(&mut model, &ids, "Revolve1");
        rb.set_profile(&sketch_id).unwrap();
        rb.set_axis_from_sketch_line(axis_line.clone());
        rb.set_symmetric_angle(180.0);
        let revolve_id = rb.finish().unwrap();

        let decoded = parse_xml_str(&write_xml_string(&model)).unwrap();
        let revolve = decoded.revolve(&revolve_id).unwrap();
        assert_eq!(revolve.angle_kind, AngleKind::Symmetric);
        assert_eq!(revolve.primary_angle, 180.0);
        assert_eq!(
            revolve.axis,
            RevolveAxis::SketchLine {
                local_id: axis_line
            }
        );
    }

    #[test]
    fn test_end_condition_reference_round_trip() {
        let mut model = sample_model();
        {
            let feature = model.feature_mut("F2").unwrap();
            if let Feature::Extrude(extrude) = feature {
                extrude.end1 = EndCondition::up_to_face(
                    Reference::face("F1", 0, DVec3::Z, DVec3::new(50.0, 25.0, 20.0)),
                    1.5,
                );
            }
        }
        let decoded = parse_xml_str(&write_xml_string(&model)).unwrap();
        let extrude = decoded.extrude("F2").unwrap();
        assert_eq!(extrude.end1.kind, EndType::UpToFace);
        assert!(extrude.end1.has_offset);
        match extrude.end1.reference.as_ref().unwrap() {
            Reference::Face { centroid, .. } => {
                assert!(points_coincident(*centroid, DVec3::new(50.0, 25.0, 20.0)));
            }
            other => panic!("expected face reference, got {other:?}"),
        }
    }
}
