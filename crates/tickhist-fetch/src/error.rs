//! Errors raised while running an extraction.

use std::time::Duration;
use thiserror::Error;
use tickhist_types::ModelError;

use crate::{JobPhase, TransportError};

/// Errors that abort an extraction run.
///
/// None of these are retried. Status-carrying variants keep the response body
/// verbatim for diagnostics.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// The token exchange returned a non-success status.
    #[error("authentication failed with status {status}: {body}")]
    Auth {
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },

    /// The token exchange succeeded but carried no bearer value.
    #[error("authentication response contained an empty token")]
    EmptyToken,

    /// Submission returned an unexpected status.
    #[error("extraction submit failed with status {status}: {body}")]
    Submit {
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },

    /// A poll returned an unexpected status.
    #[error("extraction poll failed with status {status}: {body}")]
    Poll {
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },

    /// The raw result download returned an unexpected status.
    #[error("result fetch failed with status {status}: {body}")]
    Fetch {
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },

    /// The service accepted the job asynchronously but gave no poll URL.
    #[error("server accepted the extraction without a Location header")]
    MissingLocation,

    /// An operation was attempted from the wrong phase.
    #[error("cannot {operation} while the job is {phase}")]
    InvalidTransition {
        /// The attempted operation.
        operation: &'static str,
        /// The phase the job was in.
        phase: JobPhase,
    },

    /// The job was still running when the configured wait ran out.
    #[error("extraction still running after {0:?}")]
    PollTimeout(Duration),

    /// The run was cancelled.
    #[error("extraction cancelled")]
    Cancelled,

    /// Transport failure.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A body could not be encoded or decoded.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Local I/O failure while writing the result.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExtractionError {
    /// HTTP status for status-carrying variants.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Auth { status, .. }
            | Self::Submit { status, .. }
            | Self::Poll { status, .. }
            | Self::Fetch { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Response body for status-carrying variants.
    #[must_use]
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::Auth { body, .. }
            | Self::Submit { body, .. }
            | Self::Poll { body, .. }
            | Self::Fetch { body, .. } => Some(body),
            _ => None,
        }
    }
}

/// Result type alias for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;
