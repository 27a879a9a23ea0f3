//! Client library for the tick history asynchronous extraction API.
//!
//! This is a facade crate that re-exports functionality from the tickhist
//! workspace crates for convenient access.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::path::Path;
//! use tickhist_lib::prelude::*;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ExtractionClient::with_defaults()?;
//! let token = client.request_token(&Credential::new("user", "secret")).await?;
//!
//! let request = ExtractionRequestBuilder::new()
//!     .fields(["Bid Price", "Ask Price"])
//!     .ric("IBM.N")
//!     .view(MarketDepthView::NormalizedLl2)
//!     .build();
//!
//! let cancel = CancellationToken::new();
//! let mut job = client.job(&token);
//! job.submit(&request, &cancel).await?;
//! job.wait(&cancel).await?;
//! let result = job.fetch(&cancel).await?;
//!
//! let downloader = Downloader::new(client.config().progress_interval);
//! downloader
//!     .download_to_file(result, Path::new("output.csv.gz"), &cancel)
//!     .await?;
//! # Ok(())
//! # }
//! ```

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/tickhist/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export the request and response model
pub use tickhist_types::*;

// Re-export the extraction pipeline
#[cfg(feature = "fetch")]
pub use tickhist_fetch::{
    ByteStream, CancellationToken, ClientConfig, DownloadState, Downloader, ExtractionClient,
    ExtractionError, ExtractionOutcome, HttpRequest, HttpResponse, HttpTransport, JobController,
    JobPhase, LogObserver, Method, ProgressObserver, ProgressReport, ProgressReporter, RawResult,
    ReqwestTransport, TransportError, percent, url,
};

/// Prelude module for convenient imports.
///
/// ```
/// use tickhist_lib::prelude::*;
/// ```
pub mod prelude {
    pub use tickhist_types::{
        AuthToken, Credential, ExtractByMode, ExtractionRequest, ExtractionRequestBuilder,
        InstrumentIdentifier, JobHandle, MarketDepthCondition, MarketDepthView, ModelError,
        ODataType, PreviewMode, ReportDateRangeType, TickHistorySort, TimestampZone,
        ValidationOptions,
    };

    #[cfg(feature = "fetch")]
    pub use tickhist_fetch::{
        CancellationToken, ClientConfig, Downloader, ExtractionClient, ExtractionError,
        ExtractionOutcome, JobController, JobPhase, ProgressObserver, ProgressReport,
    };
}
