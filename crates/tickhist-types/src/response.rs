//! Response bodies returned by the extraction service.

use serde::{Deserialize, Serialize};

use crate::wire::{self, nullable};
use crate::{InstrumentIdentifier, Result};

/// Bearer token returned by `Authentication/RequestToken`.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct AuthToken {
    /// OData metadata context, if the service sent one.
    #[serde(rename = "@odata.context", default)]
    pub context: Option<String>,
    /// The opaque bearer value.
    #[serde(rename = "Value", alias = "value", default)]
    pub value: String,
}

impl AuthToken {
    /// Decodes a token response body.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Decode`](crate::ModelError::Decode) if the body
    /// is not a token response.
    pub fn from_slice(body: &[u8]) -> Result<Self> {
        wire::decode(body)
    }

    /// Value of the `Authorization` header for authenticated calls.
    #[must_use]
    pub fn authorization(&self) -> String {
        format!("Token {}", self.value)
    }

    /// Returns true if the service handed back an empty bearer value.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}

impl std::fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthToken")
            .field("context", &self.context)
            .field("value", &"[REDACTED]")
            .finish()
    }
}

/// A per-instrument problem reported alongside a successful extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct IdentifierValidationError {
    /// OData metadata context, if present.
    #[serde(rename = "@odata.context", default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    /// The instrument the message refers to.
    #[serde(default)]
    pub identifier: InstrumentIdentifier,
    /// Human readable reason.
    #[serde(default)]
    pub message: String,
}

/// A completed extraction job, as returned by `Extractions/ExtractRaw`.
///
/// Validation errors do not make the job a failure: the service extracts what
/// it can and reports the rest here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct JobHandle {
    /// OData metadata context, if present.
    #[serde(rename = "@odata.context", default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    /// Job identifier, the key of the raw result resource.
    #[serde(alias = "JobID")]
    pub job_id: String,
    /// Server notes about the extraction.
    #[serde(default, deserialize_with = "nullable")]
    pub notes: Vec<String>,
    /// Per-identifier problems.
    #[serde(default, deserialize_with = "nullable")]
    pub identifier_validation_errors: Vec<IdentifierValidationError>,
}

impl JobHandle {
    /// Decodes a completed job body.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Decode`](crate::ModelError::Decode) if the body
    /// does not describe a job.
    pub fn from_slice(body: &[u8]) -> Result<Self> {
        wire::decode(body)
    }

    /// Returns true if any identifier failed validation.
    #[must_use]
    pub fn has_validation_errors(&self) -> bool {
        !self.identifier_validation_errors.is_empty()
    }
}
