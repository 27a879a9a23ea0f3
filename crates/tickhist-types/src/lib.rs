//! Request and response model for the tick history extraction API.
//!
//! This crate provides the data structures exchanged with the service:
//!
//! - [`ExtractionRequest`] - Market depth extraction request and its parts
//! - [`ExtractionRequestBuilder`] - Fluent request construction
//! - [`Credential`] - Login for the token exchange
//! - [`AuthToken`] / [`JobHandle`] - Decoded response bodies
//! - [`MarketDepthView`] and friends - Closed enumerations sent by name
//! - [`ModelError`] - Encode/decode failures

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/tickhist/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod builder;
mod credential;
mod enums;
mod error;
mod request;
mod response;
mod wire;

pub use builder::ExtractionRequestBuilder;
pub use credential::Credential;
pub use enums::{
    ExtractByMode, MarketDepthView, PreviewMode, ReportDateRangeType, TickHistorySort,
    TimestampZone,
};
pub use error::{ModelError, Result};
pub use request::{
    ExtractionRequest, InstrumentIdentifier, InstrumentIdentifierList, MarketDepthCondition,
    ODataType, ValidationOptions,
};
pub use response::{AuthToken, IdentifierValidationError, JobHandle};
