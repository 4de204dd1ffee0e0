//! Fluent Construction Layer
//!
//! Builders that assemble features with validated parameters and
//! register them into a [`Model`]. Invalid parameters (negative depth,
//! zero-length directions, profiles absent from the model) fail hard at
//! the offending call instead of surfacing later during persistence.

use glam::DVec3;
use thiserror::Error;

use crate::feature::{
    AngleKind, BooleanOp, Draft, EndCondition, EndType, Extrude, Feature, FeatureCommon, Revolve,
    RevolveAxis, ThinWall,
};
use crate::geom::{self, standard};
use crate::id::IdGenerator;
use crate::model::Model;
use crate::reference::Reference;
use crate::sketch::{Constraint, ConstraintKind, SegmentGeometry, Sketch, SketchSegment};

/// Construction-time errors.
#[derive(Debug, Clone, Error)]
pub enum BuildError {
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("sketch profile not found: {0}")]
    ProfileNotFound(String),

    #[error("feature is not a sketch: {0}")]
    NotASketch(String),

    #[error("reference target not found in model: {0}")]
    ReferenceNotFound(String),

    #[error("feature not found by name: {0}")]
    NameNotFound(String),

    #[error("feature not found by external ID: {0}")]
    ExternalIdNotFound(String),
}

/// Result type for construction calls.
pub type BuildResult<T> = Result<T, BuildError>;

/// A feature reference is valid when it targets a standard datum or a
/// feature already registered in the model. Topology references are not
/// checked: their parent may arrive later in the exchange.
fn validate_reference(model: &Model, reference: &Reference) -> BuildResult<()> {
    if let Some(target) = reference.target_feature_id()
        && !target.is_empty()
        && !standard::is_standard_id(target)
        && model.feature(target).is_none()
    {
        return Err(BuildError::ReferenceNotFound(target.to_string()));
    }
    Ok(())
}

fn find_sketch_id(model: &Model, sketch_id: &str) -> BuildResult<()> {
    match model.feature(sketch_id) {
        None => Err(BuildError::ProfileNotFound(sketch_id.to_string())),
        Some(feature) if feature.as_sketch().is_none() => {
            Err(BuildError::NotASketch(sketch_id.to_string()))
        }
        Some(_) => Ok(()),
    }
}

fn validate_end_condition(cond: &EndCondition) -> BuildResult<()> {
    match cond.kind {
        EndType::Blind | EndType::MidPlane if cond.depth <= 0.0 => Err(
            BuildError::InvalidParameter(format!("end condition depth must be positive, got {}", cond.depth)),
        ),
        EndType::UpToFace | EndType::UpToVertex if cond.reference.is_none() => Err(
            BuildError::InvalidParameter("up-to end condition requires a reference entity".into()),
        ),
        _ => Ok(()),
    }
}

/// Builds a sketch feature, generating segment local IDs and validating
/// constraints as they are added.
pub struct SketchBuilder<'a> {
    model: &'a mut Model,
    sketch: Sketch,
    local_counter: u32,
}

impl<'a> SketchBuilder<'a> {
    pub fn new(model: &'a mut Model, ids: &dyn IdGenerator, name: impl Into<String>) -> Self {
        let common = FeatureCommon::new(ids.next_id(), name);
        Self {
            model,
            sketch: Sketch::new(common),
            local_counter: 0,
        }
    }

    /// ID assigned to the sketch under construction.
    pub fn id(&self) -> &str {
        &self.sketch.common.id
    }

    pub fn set_external_id(&mut self, external_id: impl Into<String>) -> &mut Self {
        self.sketch.common.external_id = Some(external_id.into());
        self
    }

    pub fn set_suppressed(&mut self, suppressed: bool) -> &mut Self {
        self.sketch.common.suppressed = suppressed;
        self
    }

    /// Set the plane the sketch lives on.
    ///
    /// Accepts standard datums, datum planes registered in the model, or
    /// a face of an existing solid.
    pub fn set_reference_plane(&mut self, reference: Reference) -> BuildResult<&mut Self> {
        validate_reference(self.model, &reference)?;
        self.sketch.reference_plane = Some(reference);
        Ok(self)
    }

    fn next_local_id(&mut self, prefix: &str) -> String {
        self.local_counter += 1;
        format!("{}{}", prefix, self.local_counter)
    }

    /// Add any segment; radii must be positive.
    pub fn add_segment(
        &mut self,
        geometry: SegmentGeometry,
        construction: bool,
    ) -> BuildResult<String> {
        let prefix = match &geometry {
            SegmentGeometry::Line { .. } => "L",
            SegmentGeometry::Circle { radius, .. } | SegmentGeometry::Arc { radius, .. } => {
                if *radius <= 0.0 {
                    return Err(BuildError::InvalidParameter(format!(
                        "radius must be positive, got {radius}"
                    )));
                }
                match &geometry {
                    SegmentGeometry::Circle { .. } => "C",
                    _ => "A",
                }
            }
            SegmentGeometry::Point { .. } => "P",
        };
        let local_id = self.next_local_id(prefix);
        let mut segment = SketchSegment::new(local_id.clone(), geometry);
        segment.construction = construction;
        self.sketch.segments.push(segment);
        Ok(local_id)
    }

    /// Add a line; returns its local ID for use in constraints.
    pub fn add_line(&mut self, start: DVec3, end: DVec3) -> String {
        let local_id = self.next_local_id("L");
        self.sketch
            .segments
            .push(SketchSegment::new(local_id.clone(), SegmentGeometry::Line { start, end }));
        local_id
    }

    /// Add a circle; returns its local ID.
    pub fn add_circle(&mut self, center: DVec3, radius: f64) -> BuildResult<String> {
        self.add_segment(SegmentGeometry::Circle { center, radius }, false)
    }

    /// Add an arc; angles in radians, returns its local ID.
    pub fn add_arc(
        &mut self,
        center: DVec3,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
        clockwise: bool,
    ) -> BuildResult<String> {
        self.add_segment(
            SegmentGeometry::Arc {
                center,
                radius,
                start_angle,
                end_angle,
                clockwise,
            },
            false,
        )
    }

    /// Add a point; returns its local ID.
    pub fn add_point(&mut self, position: DVec3) -> String {
        let local_id = self.next_local_id("P");
        self.sketch
            .segments
            .push(SketchSegment::new(local_id.clone(), SegmentGeometry::Point { position }));
        local_id
    }

    /// Add a geometric constraint between existing entities.
    pub fn add_constraint(&mut self, kind: ConstraintKind, entities: &[&str]) -> BuildResult<&mut Self> {
        for entity in entities {
            if self.sketch.segment(entity).is_none() {
                return Err(BuildError::InvalidParameter(format!(
                    "constraint references unknown entity '{entity}'"
                )));
            }
        }
        self.sketch.constraints.push(Constraint::new(
            kind,
            entities.iter().map(|s| s.to_string()).collect(),
        ));
        Ok(self)
    }

    /// Add a dimensional constraint with its numeric value.
    pub fn add_dimension(
        &mut self,
        entities: &[&str],
        value: f64,
    ) -> BuildResult<&mut Self> {
        for entity in entities {
            if self.sketch.segment(entity).is_none() {
                return Err(BuildError::InvalidParameter(format!(
                    "constraint references unknown entity '{entity}'"
                )));
            }
        }
        self.sketch.constraints.push(Constraint::dimensional(
            ConstraintKind::Dimensional,
            entities.iter().map(|s| s.to_string()).collect(),
            value,
        ));
        Ok(self)
    }

    pub fn add_coincident(&mut self, a: &str, b: &str) -> BuildResult<&mut Self> {
        self.add_constraint(ConstraintKind::Coincident, &[a, b])
    }

    pub fn add_horizontal(&mut self, line: &str) -> BuildResult<&mut Self> {
        self.add_constraint(ConstraintKind::Horizontal, &[line])
    }

    pub fn add_vertical(&mut self, line: &str) -> BuildResult<&mut Self> {
        self.add_constraint(ConstraintKind::Vertical, &[line])
    }

    /// Register the sketch into the model and return its feature ID.
    pub fn finish(self) -> String {
        let id = self.sketch.common.id.clone();
        self.model.add_feature(Feature::Sketch(self.sketch));
        id
    }
}

/// Builds an extrude feature over a profile sketch already in the model.
pub struct ExtrudeBuilder<'a> {
    model: &'a mut Model,
    extrude: Extrude,
}

impl<'a> ExtrudeBuilder<'a> {
    pub fn new(model: &'a mut Model, ids: &dyn IdGenerator, name: impl Into<String>) -> Self {
        let common = FeatureCommon::new(ids.next_id(), name);
        Self {
            model,
            extrude: Extrude::new(common),
        }
    }

    pub fn id(&self) -> &str {
        &self.extrude.common.id
    }

    pub fn set_external_id(&mut self, external_id: impl Into<String>) -> &mut Self {
        self.extrude.common.external_id = Some(external_id.into());
        self
    }

    pub fn set_suppressed(&mut self, suppressed: bool) -> &mut Self {
        self.extrude.common.suppressed = suppressed;
        self
    }

    /// Set the profile sketch by feature ID; the sketch must exist.
    pub fn set_profile(&mut self, sketch_id: &str) -> BuildResult<&mut Self> {
        find_sketch_id(self.model, sketch_id)?;
        self.extrude.profile_sketch_id = sketch_id.to_string();
        Ok(self)
    }

    /// Set the profile by display name, useful when converting features
    /// named by another system.
    pub fn set_profile_by_name(&mut self, name: &str) -> BuildResult<&mut Self> {
        let id = self
            .model
            .feature_id_by_name(name)
            .ok_or_else(|| BuildError::NameNotFound(name.to_string()))?
            .to_string();
        self.set_profile(&id)
    }

    /// Set the profile by foreign-system persistent ID.
    pub fn set_profile_by_external_id(&mut self, external_id: &str) -> BuildResult<&mut Self> {
        let id = self
            .model
            .feature_by_external_id(external_id)
            .ok_or_else(|| BuildError::ExternalIdNotFound(external_id.to_string()))?
            .id()
            .to_string();
        self.set_profile(&id)
    }

    /// Set the extrusion direction; normalized on the way in.
    pub fn set_direction(&mut self, direction: DVec3) -> BuildResult<&mut Self> {
        let normalized = geom::try_normalize(direction).ok_or_else(|| {
            BuildError::InvalidParameter("direction vector is near zero".into())
        })?;
        self.extrude.direction = normalized;
        Ok(self)
    }

    pub fn set_operation(&mut self, operation: BooleanOp) -> &mut Self {
        self.extrude.operation = operation;
        self
    }

    /// First (required) end condition.
    pub fn set_end_condition(&mut self, cond: EndCondition) -> BuildResult<&mut Self> {
        validate_end_condition(&cond)?;
        self.extrude.end1 = cond;
        Ok(self)
    }

    /// Optional second end condition for two-directional extrusion.
    pub fn set_second_end_condition(&mut self, cond: EndCondition) -> BuildResult<&mut Self> {
        validate_end_condition(&cond)?;
        self.extrude.end2 = Some(cond);
        Ok(self)
    }

    pub fn set_draft(&mut self, angle: f64, outward: bool) -> BuildResult<&mut Self> {
        if angle < 0.0 {
            return Err(BuildError::InvalidParameter(format!(
                "draft angle must be non-negative, got {angle}"
            )));
        }
        self.extrude.draft = Some(Draft { angle, outward });
        Ok(self)
    }

    pub fn set_thin_wall(
        &mut self,
        thickness: f64,
        one_sided: bool,
        covered: bool,
    ) -> BuildResult<&mut Self> {
        if thickness <= 0.0 {
            return Err(BuildError::InvalidParameter(format!(
                "thin wall thickness must be positive, got {thickness}"
            )));
        }
        self.extrude.thin_wall = Some(ThinWall {
            thickness,
            one_sided,
            covered,
        });
        Ok(self)
    }

    /// Register the extrude into the model and return its feature ID.
    ///
    /// Fails when no profile was set: an extrude without a profile can
    /// never rebuild.
    pub fn finish(self) -> BuildResult<String> {
        if self.extrude.profile_sketch_id.is_empty() {
            return Err(BuildError::InvalidParameter(
                "extrude has no profile sketch".into(),
            ));
        }
        let id = self.extrude.common.id.clone();
        self.model.add_feature(Feature::Extrude(self.extrude));
        Ok(id)
    }
}

/// Builds a revolve feature over a profile sketch already in the model.
pub struct RevolveBuilder<'a> {
    model: &'a mut Model,
    revolve: Revolve,
}

impl<'a> RevolveBuilder<'a> {
    pub fn new(model: &'a mut Model, ids: &dyn IdGenerator, name: impl Into<String>) -> Self {
        let common = FeatureCommon::new(ids.next_id(), name);
        Self {
            model,
            revolve: Revolve::new(common),
        }
    }

    pub fn id(&self) -> &str {
        &self.revolve.common.id
    }

    pub fn set_external_id(&mut self, external_id: impl Into<String>) -> &mut Self {
        self.revolve.common.external_id = Some(external_id.into());
        self
    }

    pub fn set_suppressed(&mut self, suppressed: bool) -> &mut Self {
        self.revolve.common.suppressed = suppressed;
        self
    }

    /// Set the profile sketch by feature ID; the sketch must exist.
    pub fn set_profile(&mut self, sketch_id: &str) -> BuildResult<&mut Self> {
        find_sketch_id(self.model, sketch_id)?;
        self.revolve.profile_sketch_id = sketch_id.to_string();
        Ok(self)
    }

    /// Set the profile by foreign-system persistent ID.
    pub fn set_profile_by_external_id(&mut self, external_id: &str) -> BuildResult<&mut Self> {
        let id = self
            .model
            .feature_by_external_id(external_id)
            .ok_or_else(|| BuildError::ExternalIdNotFound(external_id.to_string()))?
            .id()
            .to_string();
        self.set_profile(&id)
    }

    /// Revolve around a line segment of the profile sketch.
    pub fn set_axis_from_sketch_line(&mut self, line_local_id: impl Into<String>) -> &mut Self {
        self.revolve.axis = RevolveAxis::SketchLine {
            local_id: line_local_id.into(),
        };
        self
    }

    /// Revolve around an explicit origin and direction.
    pub fn set_axis(&mut self, origin: DVec3, direction: DVec3) -> BuildResult<&mut Self> {
        let direction = geom::try_normalize(direction).ok_or_else(|| {
            BuildError::InvalidParameter("axis direction vector is near zero".into())
        })?;
        self.revolve.axis = RevolveAxis::Explicit { origin, direction };
        Ok(self)
    }

    /// Revolve around a referenced entity (datum axis, edge).
    pub fn set_axis_reference(&mut self, reference: Reference) -> BuildResult<&mut Self> {
        validate_reference(self.model, &reference)?;
        self.revolve.axis = RevolveAxis::Entity(reference);
        Ok(self)
    }

    /// Single sweep angle in degrees.
    pub fn set_angle(&mut self, angle: f64) -> &mut Self {
        self.revolve.angle_kind = AngleKind::Single;
        self.revolve.primary_angle = angle;
        self.revolve.secondary_angle = 0.0;
        self
    }

    /// Independent sweep angles in both directions.
    pub fn set_two_way_angle(&mut self, first: f64, second: f64) -> &mut Self {
        self.revolve.angle_kind = AngleKind::TwoWay;
        self.revolve.primary_angle = first;
        self.revolve.secondary_angle = second;
        self
    }

    /// Total angle swept symmetrically about the sketch plane.
    pub fn set_symmetric_angle(&mut self, total: f64) -> &mut Self {
        self.revolve.angle_kind = AngleKind::Symmetric;
        self.revolve.primary_angle = total;
        self.revolve.secondary_angle = total;
        self
    }

    /// Register the revolve into the model and return its feature ID.
    pub fn finish(self) -> BuildResult<String> {
        if self.revolve.profile_sketch_id.is_empty() {
            return Err(BuildError::InvalidParameter(
                "revolve has no profile sketch".into(),
            ));
        }
        let id = self.revolve.common.id.clone();
        self.model.add_feature(Feature::Revolve(self.revolve));
        Ok(id)
    }
}
