//! Model Container
//!
//! Owns the ordered feature list plus two derived lookup indices (by
//! feature ID and by external ID). The list is the source of truth;
//! indices are rebuilt whenever the list is mutated directly.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::feature::{Extrude, Feature, Revolve, RevolveAxis};
use crate::geom::{self, standard};
use crate::sketch::Sketch;

/// Unit system the model's coordinates are expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum UnitSystem {
    #[default]
    Meter,
    Centimeter,
    Millimeter,
    Inch,
    Foot,
}

impl UnitSystem {
    pub fn as_str(self) -> &'static str {
        match self {
            UnitSystem::Meter => "Meter",
            UnitSystem::Centimeter => "Centimeter",
            UnitSystem::Millimeter => "Millimeter",
            UnitSystem::Inch => "Inch",
            UnitSystem::Foot => "Foot",
        }
    }

    /// Case-insensitive decode.
    pub fn parse(text: &str) -> Option<Self> {
        match text.to_ascii_lowercase().as_str() {
            "meter" => Some(UnitSystem::Meter),
            "centimeter" => Some(UnitSystem::Centimeter),
            "millimeter" => Some(UnitSystem::Millimeter),
            "inch" => Some(UnitSystem::Inch),
            "foot" => Some(UnitSystem::Foot),
            _ => None,
        }
    }
}

/// Result of a model integrity sweep.
///
/// Violations are collected, never fail-fast: one call reports everything
/// found in a single pass.
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    fn error(&mut self, message: String) {
        self.valid = false;
        self.errors.push(message);
    }

    fn warning(&mut self, message: String) {
        self.warnings.push(message);
    }
}

/// Container for a feature history.
///
/// Feature order is authoring order and serves as the default rebuild
/// order for downstream consumers.
#[derive(Debug, Clone, Default)]
pub struct Model {
    pub unit: UnitSystem,
    pub name: String,
    features: Vec<Feature>,
    index: HashMap<String, usize>,
    external_index: HashMap<String, usize>,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_unit(unit: UnitSystem, name: impl Into<String>) -> Self {
        Self {
            unit,
            name: name.into(),
            ..Self::default()
        }
    }

    /// Number of features.
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Register a feature and update both indices.
    ///
    /// Re-adding an ID already present overwrites the existing entry in
    /// place: the list keeps one entry at its original position, so list
    /// iteration and index lookups can never disagree. External IDs are
    /// not unique-enforced; the latest insertion wins in that index.
    pub fn add_feature(&mut self, feature: Feature) {
        let id = feature.id().to_string();
        let external_id = feature.external_id().map(str::to_string);

        let position = match self.index.get(&id) {
            Some(&existing) => {
                if let Some(old_external) = self.features[existing].external_id()
                    && self.external_index.get(old_external) == Some(&existing)
                {
                    let old_external = old_external.to_string();
                    self.external_index.remove(&old_external);
                }
                self.features[existing] = feature;
                existing
            }
            None => {
                self.features.push(feature);
                let position = self.features.len() - 1;
                self.index.insert(id, position);
                position
            }
        };

        if let Some(external_id) = external_id {
            self.external_index.insert(external_id, position);
        }
    }

    /// Look up a feature by ID.
    pub fn feature(&self, id: &str) -> Option<&Feature> {
        self.index.get(id).map(|&position| &self.features[position])
    }

    /// Mutable lookup by ID.
    ///
    /// Changing the feature's ID through this handle stales the indices;
    /// call [`rebuild_indices`](Self::rebuild_indices) afterwards.
    pub fn feature_mut(&mut self, id: &str) -> Option<&mut Feature> {
        let position = *self.index.get(id)?;
        Some(&mut self.features[position])
    }

    /// Look up a feature by its foreign-system persistent ID.
    pub fn feature_by_external_id(&self, external_id: &str) -> Option<&Feature> {
        self.external_index
            .get(external_id)
            .map(|&position| &self.features[position])
    }

    /// Find the ID of the first feature with the given display name.
    pub fn feature_id_by_name(&self, name: &str) -> Option<&str> {
        self.features
            .iter()
            .find(|f| f.name() == name)
            .map(|f| f.id())
    }

    /// Position of a feature in authoring order.
    pub fn feature_index_by_id(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// All features in authoring order.
    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    /// Direct mutable access to the feature list.
    ///
    /// Callers that change IDs, external IDs or list membership must call
    /// [`rebuild_indices`](Self::rebuild_indices) before the next lookup.
    pub fn features_mut(&mut self) -> &mut Vec<Feature> {
        &mut self.features
    }

    /// Rebuild both lookup indices from the list.
    ///
    /// When direct mutation introduced duplicate IDs, the last occurrence
    /// wins, matching [`add_feature`](Self::add_feature) semantics.
    pub fn rebuild_indices(&mut self) {
        self.index.clear();
        self.external_index.clear();
        for (position, feature) in self.features.iter().enumerate() {
            self.index.insert(feature.id().to_string(), position);
            if let Some(external_id) = feature.external_id() {
                self.external_index.insert(external_id.to_string(), position);
            }
        }
    }

    /// Typed lookup: the sketch with the given ID, if any.
    pub fn sketch(&self, id: &str) -> Option<&Sketch> {
        self.feature(id).and_then(Feature::as_sketch)
    }

    /// Typed lookup: the extrude with the given ID, if any.
    pub fn extrude(&self, id: &str) -> Option<&Extrude> {
        self.feature(id).and_then(Feature::as_extrude)
    }

    /// Typed lookup: the revolve with the given ID, if any.
    pub fn revolve(&self, id: &str) -> Option<&Revolve> {
        self.feature(id).and_then(Feature::as_revolve)
    }

    /// Remove all features and reset both indices.
    pub fn clear(&mut self) {
        self.features.clear();
        self.index.clear();
        self.external_index.clear();
    }

    /// Integrity sweep over the feature list.
    ///
    /// Errors: empty or duplicate feature IDs, missing or mistyped
    /// profile sketches, degenerate extrude/revolve directions.
    /// Warnings: reference targets absent from the model — fingerprints
    /// let the receiver re-resolve those approximately, so they do not
    /// invalidate the model.
    pub fn validate(&self) -> ValidationReport {
        let mut report = ValidationReport {
            valid: true,
            ..ValidationReport::default()
        };
        let mut seen_ids: HashSet<&str> = HashSet::new();

        for feature in &self.features {
            let id = feature.id();
            let label = if feature.name().is_empty() {
                feature.type_name().to_string()
            } else {
                format!("{} '{}'", feature.type_name(), feature.name())
            };

            if id.is_empty() {
                report.error(format!("{label}: feature has an empty ID"));
            } else if !seen_ids.insert(id) {
                report.error(format!("{label}: duplicate feature ID '{id}'"));
            }

            if let Some(profile_id) = feature.profile_sketch_id() {
                if profile_id.is_empty() {
                    report.error(format!("{label}: missing profile sketch"));
                } else if self.feature(profile_id).is_none() {
                    report.error(format!(
                        "{label}: profile sketch '{profile_id}' not found in model"
                    ));
                } else if self.sketch(profile_id).is_none() {
                    report.error(format!(
                        "{label}: profile feature '{profile_id}' is not a sketch"
                    ));
                }
            }

            match feature {
                Feature::Extrude(extrude) => {
                    if geom::try_normalize(extrude.direction).is_none() {
                        report.error(format!("{label}: extrude direction is zero-length"));
                    }
                }
                Feature::Revolve(revolve) => {
                    if let RevolveAxis::Explicit { direction, .. } = &revolve.axis
                        && geom::try_normalize(*direction).is_none()
                    {
                        report.error(format!("{label}: revolve axis direction is zero-length"));
                    }
                }
                Feature::Sketch(_) => {}
            }

            for reference in feature.references() {
                let target = reference.referenced_feature_id();
                if !target.is_empty()
                    && !standard::is_standard_id(target)
                    && self.feature(target).is_none()
                {
                    report.warning(format!(
                        "{label}: reference target '{target}' not found in model"
                    ));
                }
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::FeatureCommon;
    use glam::DVec3;

    fn sketch(id: &str, name: &str) -> Feature {
        Feature::Sketch(Sketch::new(FeatureCommon::new(id, name)))
    }

    #[test]
    fn test_add_and_lookup() {
        let mut model = Model::new();
        model.add_feature(sketch("F1", "Sketch1"));
        assert_eq!(model.len(), 1);
        assert_eq!(model.feature("F1").unwrap().name(), "Sketch1");
        assert_eq!(model.feature_id_by_name("Sketch1"), Some("F1"));
        assert!(model.feature("F2").is_none());
    }

    #[test]
    fn test_external_id_last_insertion_wins() {
        let mut model = Model::new();
        let mut a = sketch("F1", "A");
        a.common_mut().external_id = Some("SW-1".into());
        let mut b = sketch("F2", "B");
        b.common_mut().external_id = Some("SW-1".into());
        model.add_feature(a);
        model.add_feature(b);
        assert_eq!(model.feature_by_external_id("SW-1").unwrap().id(), "F2");
    }

    #[test]
    fn test_duplicate_id_overwrites_in_place() {
        let mut model = Model::new();
        model.add_feature(sketch("F1", "First"));
        model.add_feature(sketch("F2", "Second"));
        model.add_feature(sketch("F1", "Replacement"));
        assert_eq!(model.len(), 2);
        assert_eq!(model.feature_index_by_id("F1"), Some(0));
        assert_eq!(model.feature("F1").unwrap().name(), "Replacement");
    }

    #[test]
    fn test_validate_empty_id() {
        let mut model = Model::new();
        model.add_feature(sketch("F1", "Sketch1"));
        model.feature_mut("F1").unwrap().common_mut().id = String::new();
        let report = model.validate();
        assert!(!report.valid);
        assert!(!report.errors.is_empty());
    }

    #[test]
    fn test_validate_missing_profile() {
        let mut model = Model::new();
        let mut extrude = Extrude::new(FeatureCommon::new("F2", "Extrude1"));
        extrude.profile_sketch_id = "F99".into();
        extrude.direction = DVec3::Z;
        model.add_feature(Feature::Extrude(extrude));
        let report = model.validate();
        assert!(!report.valid);
        assert!(report.errors.iter().any(|e| e.contains("F99")));
    }

    #[test]
    fn test_validate_collects_all_violations() {
        let mut model = Model::new();
        let mut extrude = Extrude::new(FeatureCommon::new("F2", "Extrude1"));
        extrude.profile_sketch_id = "F99".into();
        extrude.direction = DVec3::ZERO;
        model.add_feature(Feature::Extrude(extrude));
        let report = model.validate();
        assert!(report.errors.len() >= 2);
    }

    #[test]
    fn test_validate_unresolved_reference_is_warning() {
        let mut model = Model::new();
        let mut s = Sketch::new(FeatureCommon::new("F1", "Sketch1"));
        s.reference_plane = Some(crate::reference::Reference::face(
            "F42",
            0,
            DVec3::Z,
            DVec3::ZERO,
        ));
        model.add_feature(Feature::Sketch(s));
        let report = model.validate();
        assert!(report.valid);
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn test_standard_plane_reference_is_not_flagged() {
        let mut model = Model::new();
        let mut s = Sketch::new(FeatureCommon::new("F1", "Sketch1"));
        s.reference_plane = Some(crate::reference::Reference::xy_plane());
        model.add_feature(Feature::Sketch(s));
        let report = model.validate();
        assert!(report.valid);
        assert!(report.warnings.is_empty());
    }
}
