//! Market depth extraction request model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    ExtractByMode, MarketDepthView, PreviewMode, ReportDateRangeType, Result, TickHistorySort,
    TimestampZone, wire,
};

/// An entity carrying an `@odata.type` discriminator in its wire form.
///
/// Each implementor maps to one fixed canonical tag. When the in-memory tag is
/// empty, the encoder emits [`ODataType::ODATA_TYPE`] instead; the value itself
/// is left untouched.
pub trait ODataType {
    /// The canonical discriminator for this type.
    const ODATA_TYPE: &'static str;

    /// The caller-supplied discriminator, possibly empty.
    fn odata_type(&self) -> &str;

    /// The discriminator that will appear on the wire.
    fn effective_odata_type(&self) -> &str {
        let tag = self.odata_type();
        if tag.is_empty() { Self::ODATA_TYPE } else { tag }
    }
}

/// A single instrument reference.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InstrumentIdentifier {
    /// The identifier value, e.g. `IBM.N`.
    pub identifier: String,
    /// The identifier scheme, e.g. `Ric`.
    pub identifier_type: String,
}

impl InstrumentIdentifier {
    /// Identifier scheme for Reuters instrument codes.
    pub const RIC: &'static str = "Ric";

    /// Creates an identifier with an explicit scheme.
    pub fn new(identifier: impl Into<String>, identifier_type: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            identifier_type: identifier_type.into(),
        }
    }

    /// Creates a RIC identifier.
    pub fn ric(identifier: impl Into<String>) -> Self {
        Self::new(identifier, Self::RIC)
    }
}

/// Instrument validation switches.
///
/// A switch left `false` is omitted from the request, letting the service
/// apply its own default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
#[allow(clippy::struct_excessive_bools)]
pub struct ValidationOptions {
    /// Allow open access instruments.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub allow_open_access_instruments: bool,
    /// Allow instruments that are no longer active.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub allow_historical_instruments: bool,
    /// Exclude FINRA as a pricing source for bonds.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub exclude_finr_as_pricing_source_for_bonds: bool,
    /// Use the exchange code instead of Lipper.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub use_exchange_code_instead_of_lipper: bool,
    /// Prefer US quotes over Canadian ones.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub use_us_quote_instead_of_canadian: bool,
    /// Use the consolidated quote source for US instruments.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub use_consolidated_quote_source_for_usa: bool,
    /// Use the consolidated quote source for Canadian instruments.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub use_consolidated_quote_source_for_canada: bool,
    /// Prefer debt over equity.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub use_debt_over_equity: bool,
}

/// The list of instruments an extraction covers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InstrumentIdentifierList {
    /// `@odata.type` discriminator; empty means the canonical tag.
    pub odata_type: String,
    /// Instruments, in request order.
    pub instrument_identifiers: Vec<InstrumentIdentifier>,
    /// Explicit validation options.
    pub validation_options: Option<ValidationOptions>,
    /// Use the stored user preferences instead of explicit options.
    pub use_user_preferences_for_validation_options: bool,
}

impl ODataType for InstrumentIdentifierList {
    const ODATA_TYPE: &'static str =
        "#ThomsonReuters.Dss.Api.Extractions.ExtractionRequests.InstrumentIdentifierList";

    fn odata_type(&self) -> &str {
        &self.odata_type
    }
}

/// Filtering and formatting options for a market depth extraction.
///
/// `days_ago` and the `query_start_date`/`query_end_date` pair are alternatives
/// selected by `report_date_range_type`; the model does not enforce that only
/// one of them is set. A `number_of_levels` or `days_ago` of zero counts as
/// unset.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MarketDepthCondition {
    /// Depth representation.
    pub view: MarketDepthView,
    /// Number of price levels.
    pub number_of_levels: Option<u32>,
    /// Row ordering.
    pub sort_by: TickHistorySort,
    /// Timestamp timezone.
    pub message_time_stamp_in: TimestampZone,
    /// Date window interpretation.
    pub report_date_range_type: ReportDateRangeType,
    /// Window start, used with [`ReportDateRangeType::Range`].
    pub query_start_date: Option<DateTime<Utc>>,
    /// Window end, used with [`ReportDateRangeType::Range`].
    pub query_end_date: Option<DateTime<Utc>>,
    /// Relative window in days.
    pub days_ago: Option<u32>,
    /// Preview behaviour.
    pub preview: PreviewMode,
    /// Instrument resolution mode.
    pub extract_by: ExtractByMode,
    /// Include the source RIC column.
    pub display_source_ric: bool,
}

/// A tick history market depth extraction request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExtractionRequest {
    /// `@odata.type` discriminator; empty means the canonical tag.
    pub odata_type: String,
    /// Columns to extract, in output order.
    pub content_field_names: Vec<String>,
    /// Instruments to extract.
    pub identifier_list: InstrumentIdentifierList,
    /// Extraction condition.
    pub condition: MarketDepthCondition,
}

impl ODataType for ExtractionRequest {
    const ODATA_TYPE: &'static str = "#ThomsonReuters.Dss.Api.Extractions.ExtractionRequests.TickHistoryMarketDepthExtractionRequest";

    fn odata_type(&self) -> &str {
        &self.odata_type
    }
}

impl ExtractionRequest {
    /// Encodes the request as JSON, filling any empty discriminators.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&wire::ExtractionRequest::from(self))?)
    }

    /// Encodes the submission body, `{"ExtractionRequest": {...}}`.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_submission(&self) -> Result<Vec<u8>> {
        let body = wire::Submission {
            extraction_request: wire::ExtractionRequest::from(self),
        };
        Ok(serde_json::to_vec(&body)?)
    }

    /// Decodes a request from its JSON form.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Decode`](crate::ModelError::Decode) on a shape
    /// mismatch and [`ModelError::UnknownEnumValue`](crate::ModelError::UnknownEnumValue)
    /// for an enumeration name outside its closed set.
    pub fn from_json(json: &str) -> Result<Self> {
        wire::decode::<wire::ExtractionRequest>(json.as_bytes())?.try_into()
    }
}
