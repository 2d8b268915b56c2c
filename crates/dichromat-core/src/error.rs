//! Error type for the core engine.

use thiserror::Error;

use crate::domain::DeficiencyType;

/// Errors raised by core operations.
///
/// Clamping of out-of-gamut values is never an error; these cover only
/// inputs the engine cannot act on.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A plate index outside `1..=10`.
    #[error("image index {0} is out of range (expected 1..=10)")]
    ImageIndexOutOfRange(u32),

    /// A catalog pool is too small to draw a session from.
    #[error("catalog has {available} {deficiency_type} image(s), a session needs {required}")]
    CatalogInsufficient {
        /// The short pool.
        deficiency_type: DeficiencyType,
        /// Entries a session draws from it.
        required: usize,
        /// Entries the catalog holds.
        available: usize,
    },

    /// A catalog version this crate does not understand.
    #[error("unsupported catalog version {version:?}")]
    UnsupportedFormat {
        /// The version found.
        version: String,
    },

    /// Malformed catalog JSON.
    #[error("malformed catalog: {0}")]
    CatalogParse(#[from] serde_json::Error),

    /// Two catalog entries share an id.
    #[error("malformed catalog: image id {0} listed more than once")]
    DuplicateEntryId(u32),

    /// A caller-supplied parameter outside its accepted range or syntax.
    #[error("invalid {parameter}: {value}")]
    InvalidParameter {
        /// Parameter name.
        parameter: String,
        /// Offending value, with the accepted range when there is one.
        value: String,
    },

    /// A deficiency type name that is not recognized.
    #[error("unknown deficiency type {0:?}")]
    UnknownDeficiencyType(String),

    /// Image encoding failed.
    #[error("failed to encode image: {0}")]
    Encode(#[from] image::ImageError),
}

/// Result alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
