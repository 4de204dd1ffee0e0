//! Reflection-Style Codec
//!
//! The second, independent persistence path: every feature and segment
//! variant declares its field list once through serde derive, and the
//! polymorphic reference subtree routes through the typed-reference
//! registry so both backends share one source of per-variant attribute
//! truth. Variant dispatch happens through the registry table plus
//! serde's tagged enum encoding; the table is a `static`, initialized
//! before first use and immutable for the process lifetime.

use std::fmt;
use std::path::Path;

use glam::DVec3;
use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::feature::Feature;
use crate::model::{Model, UnitSystem};
use crate::reference::Reference;

use super::registry::{self, AttrMap, AttrValue};
use super::{CodecError, CodecResult};

// =================================================================
// Reference <-> attribute map bridging
// =================================================================

impl Serialize for Reference {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let (tag, attrs) = registry::encode_reference(self);
        let mut map = serializer.serialize_map(Some(attrs.iter().count() + 1))?;
        map.serialize_entry("Type", tag)?;
        for (key, value) in attrs.iter() {
            match value {
                AttrValue::Str(s) => map.serialize_entry(key, s)?,
                AttrValue::Int(i) => map.serialize_entry(key, i)?,
                AttrValue::Float(f) => map.serialize_entry(key, f)?,
                AttrValue::Bool(b) => map.serialize_entry(key, b)?,
                AttrValue::Point(v) | AttrValue::Vector(v) => {
                    map.serialize_entry(key, &[v.x, v.y, v.z])?
                }
            }
        }
        map.end()
    }
}

/// Attribute value as it arrives from a self-describing document.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawAttr {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Triple([f64; 3]),
}

impl From<RawAttr> for AttrValue {
    fn from(raw: RawAttr) -> Self {
        match raw {
            RawAttr::Bool(b) => AttrValue::Bool(b),
            RawAttr::Int(i) => AttrValue::Int(i as i32),
            RawAttr::Float(f) => AttrValue::Float(f),
            RawAttr::Str(s) => AttrValue::Str(s),
            RawAttr::Triple([x, y, z]) => AttrValue::Vector(DVec3::new(x, y, z)),
        }
    }
}

impl<'de> Deserialize<'de> for Reference {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct RefVisitor;

        impl<'de> Visitor<'de> for RefVisitor {
            type Value = Reference;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a reference attribute map with a Type entry")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Reference, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut tag: Option<String> = None;
                let mut attrs = AttrMap::new();
                while let Some(key) = access.next_key::<String>()? {
                    if key == "Type" {
                        tag = Some(access.next_value()?);
                    } else {
                        let value: RawAttr = access.next_value()?;
                        attrs.set(&key, value.into());
                    }
                }
                let tag = tag.ok_or_else(|| de::Error::missing_field("Type"))?;
                Ok(registry::decode_reference(&tag, &attrs))
            }
        }

        deserializer.deserialize_map(RefVisitor)
    }
}

// =================================================================
// Model document
// =================================================================

fn default_version() -> u32 {
    1
}

/// On-disk shape of a model; the lookup indices are derived state and
/// are rebuilt on load.
#[derive(Serialize, Deserialize)]
struct ModelData {
    #[serde(default = "default_version")]
    version: u32,
    unit: UnitSystem,
    name: String,
    features: Vec<Feature>,
}

impl From<ModelData> for Model {
    fn from(data: ModelData) -> Self {
        let mut model = Model::with_unit(data.unit, data.name);
        for feature in data.features {
            model.add_feature(feature);
        }
        model
    }
}

impl Serialize for Model {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let data = ModelData {
            version: default_version(),
            unit: self.unit,
            name: self.name.clone(),
            features: self.features().to_vec(),
        };
        data.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Model {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let data = ModelData::deserialize(deserializer)?;
        Ok(Model::from(data))
    }
}

// =================================================================
// Entry points
// =================================================================

/// Render a model as a reflection-style document.
pub fn to_ron_string(model: &Model) -> CodecResult<String> {
    ::ron::ser::to_string_pretty(model, ::ron::ser::PrettyConfig::default())
        .map_err(|e| CodecError::Serialize(e.to_string()))
}

/// Parse a reflection-style document into a model.
pub fn from_ron_str(content: &str) -> CodecResult<Model> {
    ::ron::from_str(content).map_err(|e| CodecError::Deserialize(e.to_string()))
}

/// Write a model to a file.
pub fn save(model: &Model, path: impl AsRef<Path>) -> CodecResult<()> {
    let content = to_ron_string(model)?;
    std::fs::write(path, content).map_err(|e| CodecError::Io(e.to_string()))
}

/// Read a model from a file.
pub fn load(path: impl AsRef<Path>) -> CodecResult<Model> {
    let content =
        std::fs::read_to_string(path).map_err(|e| CodecError::Io(e.to_string()))?;
    from_ron_str(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{ExtrudeBuilder, SketchBuilder};
    use crate::feature::{EndCondition, EndType};
    use crate::geom::points_coincident;
    use crate::id::CounterIdGenerator;

    fn sample_model() -> Model {
        let mut model = Model::with_unit(UnitSystem::Inch, "RonPart");
        let ids = CounterIdGenerator::new();

        let mut sb = SketchBuilder::new(&mut model, &ids, "Sketch1");
        sb.set_reference_plane(Reference::xy_plane()).unwrap();
        sb.add_line(DVec3::ZERO, DVec3::new(4.0, 0.0, 0.0));
        sb.add_circle(DVec3::new(2.0, 1.0, 0.0), 0.5).unwrap();
        let sketch_id = sb.finish();

        let mut eb = ExtrudeBuilder::new(&mut model, &ids, "Extrude1");
        eb.set_profile(&sketch_id).unwrap();
        eb.set_direction(DVec3::Z).unwrap();
        eb.set_end_condition(EndCondition::up_to_face(
            Reference::face("F1", 2, DVec3::Z, DVec3::new(2.0, 1.0, 3.0)),
            0.0,
        ))
        .unwrap();
        eb.finish().unwrap();
        model
    }

    #[test]
    fn test_round_trip_preserves_feature_headers() {
        let model = sample_model();
        let text = to_ron_string(&model).unwrap();
        let decoded = from_ron_str(&text).unwrap();

        assert_eq!(decoded.len(), model.len());
        assert_eq!(decoded.unit, UnitSystem::Inch);
        assert_eq!(decoded.name, "RonPart");
        for (a, b) in model.features().iter().zip(decoded.features()) {
            assert_eq!(a.id(), b.id());
            assert_eq!(a.name(), b.name());
            assert_eq!(a.type_name(), b.type_name());
            assert_eq!(a.is_suppressed(), b.is_suppressed());
        }
    }

    #[test]
    fn test_reference_survives_reflection_round_trip() {
        let model = sample_model();
        let decoded = from_ron_str(&to_ron_string(&model).unwrap()).unwrap();
        let extrude = decoded.extrude("F2").unwrap();
        assert_eq!(extrude.end1.kind, EndType::UpToFace);
        match extrude.end1.reference.as_ref().unwrap() {
            Reference::Face {
                centroid, normal, ..
            } => {
                assert!(points_coincident(*centroid, DVec3::new(2.0, 1.0, 3.0)));
                assert!(points_coincident(*normal, DVec3::Z));
            }
            other => panic!("expected face reference, got {other:?}"),
        }
    }

    #[test]
    fn test_indices_rebuilt_after_load() {
        let model = sample_model();
        let decoded = from_ron_str(&to_ron_string(&model).unwrap()).unwrap();
        assert!(decoded.sketch("F1").is_some());
        assert_eq!(decoded.feature_id_by_name("Extrude1"), Some("F2"));
    }

    #[test]
    fn test_garbage_is_deserialize_error() {
        assert!(matches!(
            from_ron_str("not a model"),
            Err(CodecError::Deserialize(_))
        ));
    }

    #[test]
    fn test_shared_profile_ids_stay_shared() {
        let mut model = sample_model();
        let ids = CounterIdGenerator::starting_at("F", 3);
        let mut eb = ExtrudeBuilder::new(&mut model, &ids, "Extrude2");
        eb.set_profile("F1").unwrap();
        eb.set_direction(DVec3::Z).unwrap();
        eb.set_end_condition(EndCondition::blind(5.0)).unwrap();
        eb.finish().unwrap();

        let decoded = from_ron_str(&to_ron_string(&model).unwrap()).unwrap();
        let first = decoded.extrude("F2").unwrap();
        let second = decoded.extrude("F3").unwrap();
        assert_eq!(first.profile_sketch_id, second.profile_sketch_id);
        assert!(decoded.sketch(&first.profile_sketch_id).is_some());
    }
}
