//! Serialization Codecs
//!
//! Two independent backends encode and decode the same model:
//!
//! - [`Format::Xml`] — human-readable, hand-written, backward compatible
//!   with documents from older writers;
//! - [`Format::Ron`] — reflection-style, driven by the declared field
//!   list of every variant.
//!
//! A file must be read with the format it was written with; there is no
//! auto-detection. Both backends delegate the polymorphic reference
//! subtree to the [`registry`].

pub mod registry;
pub mod ron;
pub mod xml;

use std::path::Path;

use thiserror::Error;

use crate::model::Model;

/// Codec-layer errors.
///
/// These are values, never panics: a malformed document or an unreadable
/// path comes back as an `Err` across the codec boundary.
#[derive(Debug, Clone, Error)]
pub enum CodecError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("malformed document: {0}")]
    Malformed(String),

    #[error("serialization error: {0}")]
    Serialize(String),

    #[error("deserialization error: {0}")]
    Deserialize(String),
}

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Serialization backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Human-readable tagged-element document.
    Xml,
    /// Reflection-style document.
    Ron,
}

/// Write a model to a file using the chosen backend.
pub fn save_model(model: &Model, path: impl AsRef<Path>, format: Format) -> CodecResult<()> {
    match format {
        Format::Xml => xml::save(model, path),
        Format::Ron => ron::save(model, path),
    }
}

/// Read a model from a file using the chosen backend.
///
/// Decoding a structurally broken document fails; semantically
/// incomplete documents degrade to per-field defaults. After the tree is
/// rebuilt, profile references are resolved against the loaded features
/// and misses are reported as warnings (the model stays loadable; the
/// same condition is an error under [`Model::validate`]).
pub fn load_model(path: impl AsRef<Path>, format: Format) -> CodecResult<Model> {
    let model = match format {
        Format::Xml => xml::load(path)?,
        Format::Ron => ron::load(path)?,
    };
    warn_unresolved_profiles(&model);
    Ok(model)
}

/// Second resolution pass after every feature has been loaded: each
/// profile ID must name a sketch that actually arrived.
pub(crate) fn warn_unresolved_profiles(model: &Model) {
    for feature in model.features() {
        if let Some(profile_id) = feature.profile_sketch_id()
            && !profile_id.is_empty()
            && model.sketch(profile_id).is_none()
        {
            tracing::warn!(
                feature = feature.id(),
                profile = profile_id,
                "profile sketch not resolved after load"
            );
        }
    }
}
