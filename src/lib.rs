//! CAD Feature History Interchange
//!
//! This crate provides:
//! - A unified in-memory model for parametric CAD feature history
//!   (sketches, extrusions, revolutions)
//! - Typed, relocatable references with cached geometric fingerprints
//!   for cross-kernel re-resolution
//! - A fluent construction layer with validated parameters
//! - Two independent serialization backends: a human-readable,
//!   backward-compatible XML codec and a reflection-style RON codec
//!
//! Features point at each other by ID only; the [`model::Model`]
//! container resolves IDs to features at the point of use.

pub mod builder;
pub mod codec;
pub mod feature;
pub mod geom;
pub mod id;
pub mod model;
pub mod reference;
pub mod sketch;

// Re-exports for convenience
pub use builder::{BuildError, BuildResult, ExtrudeBuilder, RevolveBuilder, SketchBuilder};
pub use codec::{CodecError, CodecResult, Format, load_model, save_model};
pub use feature::{
    AngleKind, BooleanOp, Draft, EndCondition, EndType, Extrude, Feature, FeatureCommon, Revolve,
    RevolveAxis, ThinWall,
};
pub use id::{CounterIdGenerator, IdGenerator, UuidIdGenerator};
pub use model::{Model, UnitSystem, ValidationReport};
pub use reference::{PlaneFrame, RefKind, Reference};
pub use sketch::{Constraint, ConstraintKind, SegmentGeometry, Sketch, SketchSegment};
