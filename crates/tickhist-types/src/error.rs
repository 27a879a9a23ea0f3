//! Error types for the extraction data model.

use thiserror::Error;

/// Result type alias for model encode/decode operations.
pub type Result<T> = std::result::Result<T, ModelError>;

/// Errors raised while encoding or decoding wire representations.
#[derive(Error, Debug)]
pub enum ModelError {
    /// An enumeration name outside the closed set was encountered.
    #[error("unknown {kind} value '{value}'")]
    UnknownEnumValue {
        /// The enumeration being decoded (e.g. "TickHistorySort").
        kind: &'static str,
        /// The offending name, verbatim.
        value: String,
    },

    /// A body did not match the expected shape.
    #[error("failed to decode field '{path}': {source}")]
    Decode {
        /// Path of the offending field (e.g. `Condition.NumberOfLevels`).
        path: String,
        /// The underlying JSON error.
        source: serde_json::Error,
    },

    /// A value could not be serialized.
    #[error("failed to encode: {0}")]
    Encode(#[from] serde_json::Error),
}

impl ModelError {
    /// Returns the field path for decode errors, if any.
    #[must_use]
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::Decode { path, .. } => Some(path),
            Self::UnknownEnumValue { .. } | Self::Encode(_) => None,
        }
    }
}
