//! HTTP client and job orchestration for the tick history extraction API.
//!
//! This crate provides the extraction pipeline:
//!
//! - [`ExtractionClient::request_token`] - Credential to bearer token exchange
//! - [`JobController`] - Submit, poll and fetch state machine
//! - [`Downloader`] - Streaming result copy with progress reporting
//! - [`HttpTransport`] - Transport seam, implemented by [`ReqwestTransport`]
//! - [`url`] - Endpoint construction

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/tickhist/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod client;
mod download;
mod error;
mod job;
mod progress;
mod transport;
pub mod url;

#[cfg(test)]
mod testing;

pub use client::{ClientConfig, ExtractionClient, ExtractionOutcome};
pub use download::Downloader;
pub use error::{ExtractionError, Result};
pub use job::{JobController, JobPhase, RawResult};
pub use progress::{
    DownloadState, LogObserver, ProgressObserver, ProgressReport, ProgressReporter, percent,
};
pub use transport::{
    ByteStream, HttpRequest, HttpResponse, HttpTransport, Method, ReqwestTransport,
    TransportError,
};
pub use tokio_util::sync::CancellationToken;
