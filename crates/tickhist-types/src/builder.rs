//! Fluent construction of extraction requests.

use chrono::{DateTime, Utc};

use crate::{
    ExtractionRequest, InstrumentIdentifier, InstrumentIdentifierList, MarketDepthCondition,
    ReportDateRangeType, ValidationOptions,
};

/// Assembles an [`ExtractionRequest`] from caller parameters.
///
/// Building never fails and performs no I/O. Discriminators are left empty so
/// the encoder supplies the canonical tags.
///
/// # Example
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use tickhist_types::{ExtractionRequestBuilder, MarketDepthView};
///
/// let request = ExtractionRequestBuilder::new()
///     .fields(["Ask Price", "Bid Price"])
///     .ric("IBM.N")
///     .view(MarketDepthView::NormalizedLl2)
///     .levels(10)
///     .date_range(
///         Utc.with_ymd_and_hms(2016, 8, 29, 9, 0, 0).unwrap(),
///         Utc.with_ymd_and_hms(2016, 9, 29, 12, 0, 0).unwrap(),
///     )
///     .build();
///
/// assert_eq!(request.identifier_list.instrument_identifiers.len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
#[must_use]
pub struct ExtractionRequestBuilder {
    fields: Vec<String>,
    identifiers: Vec<InstrumentIdentifier>,
    validation: Option<ValidationOptions>,
    use_user_preferences: bool,
    condition: MarketDepthCondition,
}

impl ExtractionRequestBuilder {
    /// Creates an empty builder with a default condition.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends content field names.
    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields.extend(fields.into_iter().map(Into::into));
        self
    }

    /// Appends an instrument identifier.
    pub fn identifier(mut self, identifier: InstrumentIdentifier) -> Self {
        self.identifiers.push(identifier);
        self
    }

    /// Appends a RIC identifier.
    pub fn ric(self, ric: impl Into<String>) -> Self {
        self.identifier(InstrumentIdentifier::ric(ric))
    }

    /// Sets explicit validation options.
    pub const fn validation_options(mut self, options: ValidationOptions) -> Self {
        self.validation = Some(options);
        self
    }

    /// Sends an empty validation options object so the service applies its
    /// default validation.
    pub fn default_validation(mut self) -> Self {
        self.validation = Some(ValidationOptions::default());
        self
    }

    /// Uses the account's stored validation preferences.
    pub const fn use_user_preferences(mut self, enabled: bool) -> Self {
        self.use_user_preferences = enabled;
        self
    }

    /// Replaces the whole condition.
    pub fn condition(mut self, condition: MarketDepthCondition) -> Self {
        self.condition = condition;
        self
    }

    /// Sets the depth view.
    pub const fn view(mut self, view: crate::MarketDepthView) -> Self {
        self.condition.view = view;
        self
    }

    /// Sets the number of levels.
    pub const fn levels(mut self, levels: u32) -> Self {
        self.condition.number_of_levels = Some(levels);
        self
    }

    /// Uses an explicit start/end window.
    pub const fn date_range(mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.condition.report_date_range_type = ReportDateRangeType::Range;
        self.condition.query_start_date = Some(start);
        self.condition.query_end_date = Some(end);
        self
    }

    /// Produces the request.
    pub fn build(self) -> ExtractionRequest {
        ExtractionRequest {
            odata_type: String::new(),
            content_field_names: self.fields,
            identifier_list: InstrumentIdentifierList {
                odata_type: String::new(),
                instrument_identifiers: self.identifiers,
                validation_options: self.validation,
                use_user_preferences_for_validation_options: self.use_user_preferences,
            },
            condition: self.condition,
        }
    }
}
