//! JSON wire layer.
//!
//! The service speaks flat OData-style objects: PascalCase keys, an
//! `@odata.type` string on polymorphic entities and enumerations as names.
//! These structs mirror that shape exactly; the public model converts to and
//! from them so that discriminator defaulting and enum name checks happen in
//! one place.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

use crate::request::{self, ODataType};
use crate::{InstrumentIdentifier, ModelError, Result, ValidationOptions};

/// Decodes a JSON body, reporting the path of the first offending field.
pub(crate) fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    let mut de = serde_json::Deserializer::from_slice(bytes);
    let value = serde_path_to_error::deserialize(&mut de).map_err(|err| ModelError::Decode {
        path: err.path().to_string(),
        source: err.into_inner(),
    })?;
    de.end().map_err(|source| ModelError::Decode {
        path: ".".to_string(),
        source,
    })?;
    Ok(value)
}

/// Treats an explicit `null` like a missing field.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

const fn is_false(value: &bool) -> bool {
    !*value
}

fn nonzero(value: Option<u32>) -> Option<u32> {
    value.filter(|n| *n != 0)
}

fn parse_enum<T>(name: Option<String>) -> Result<T>
where
    T: std::str::FromStr<Err = ModelError> + Default,
{
    name.map_or_else(|| Ok(T::default()), |name| name.parse())
}

/// `{"ExtractionRequest": {...}}`, the body of `Extractions/ExtractRaw`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct Submission {
    pub(crate) extraction_request: ExtractionRequest,
}

/// `{"Credentials": {...}}`, the body of `Authentication/RequestToken`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct TokenRequest<'a> {
    pub(crate) credentials: Credentials<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct Credentials<'a> {
    pub(crate) username: &'a str,
    pub(crate) password: &'a str,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct ExtractionRequest {
    #[serde(rename = "@odata.type", default)]
    odata_type: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    content_field_names: Vec<String>,
    #[serde(default)]
    identifier_list: IdentifierList,
    #[serde(default)]
    condition: Condition,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct IdentifierList {
    #[serde(rename = "@odata.type", default)]
    odata_type: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    instrument_identifiers: Vec<InstrumentIdentifier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    validation_options: Option<ValidationOptions>,
    #[serde(default, skip_serializing_if = "is_false")]
    use_user_preferences_for_validation_options: bool,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Condition {
    view: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    number_of_levels: Option<u32>,
    sort_by: Option<String>,
    message_time_stamp_in: Option<String>,
    report_date_range_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    query_start_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    query_end_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    days_ago: Option<u32>,
    preview: Option<String>,
    extract_by: Option<String>,
    #[serde(rename = "DisplaySourceRIC", default)]
    display_source_ric: bool,
}

impl From<&request::ExtractionRequest> for ExtractionRequest {
    fn from(request: &request::ExtractionRequest) -> Self {
        Self {
            odata_type: request.effective_odata_type().to_string(),
            content_field_names: request.content_field_names.clone(),
            identifier_list: IdentifierList::from(&request.identifier_list),
            condition: Condition::from(&request.condition),
        }
    }
}

impl From<&request::InstrumentIdentifierList> for IdentifierList {
    fn from(list: &request::InstrumentIdentifierList) -> Self {
        Self {
            odata_type: list.effective_odata_type().to_string(),
            instrument_identifiers: list.instrument_identifiers.clone(),
            validation_options: list.validation_options,
            use_user_preferences_for_validation_options: list
                .use_user_preferences_for_validation_options,
        }
    }
}

impl From<&request::MarketDepthCondition> for Condition {
    fn from(condition: &request::MarketDepthCondition) -> Self {
        Self {
            view: Some(condition.view.as_str().to_string()),
            number_of_levels: nonzero(condition.number_of_levels),
            sort_by: Some(condition.sort_by.as_str().to_string()),
            message_time_stamp_in: Some(condition.message_time_stamp_in.as_str().to_string()),
            report_date_range_type: Some(condition.report_date_range_type.as_str().to_string()),
            query_start_date: condition.query_start_date,
            query_end_date: condition.query_end_date,
            days_ago: nonzero(condition.days_ago),
            preview: Some(condition.preview.as_str().to_string()),
            extract_by: Some(condition.extract_by.as_str().to_string()),
            display_source_ric: condition.display_source_ric,
        }
    }
}

impl TryFrom<ExtractionRequest> for request::ExtractionRequest {
    type Error = ModelError;

    fn try_from(wire: ExtractionRequest) -> Result<Self> {
        Ok(Self {
            odata_type: wire.odata_type,
            content_field_names: wire.content_field_names,
            identifier_list: request::InstrumentIdentifierList {
                odata_type: wire.identifier_list.odata_type,
                instrument_identifiers: wire.identifier_list.instrument_identifiers,
                validation_options: wire.identifier_list.validation_options,
                use_user_preferences_for_validation_options: wire
                    .identifier_list
                    .use_user_preferences_for_validation_options,
            },
            condition: wire.condition.try_into()?,
        })
    }
}

impl TryFrom<Condition> for request::MarketDepthCondition {
    type Error = ModelError;

    fn try_from(wire: Condition) -> Result<Self> {
        Ok(Self {
            view: parse_enum(wire.view)?,
            number_of_levels: nonzero(wire.number_of_levels),
            sort_by: parse_enum(wire.sort_by)?,
            message_time_stamp_in: parse_enum(wire.message_time_stamp_in)?,
            report_date_range_type: parse_enum(wire.report_date_range_type)?,
            query_start_date: wire.query_start_date,
            query_end_date: wire.query_end_date,
            days_ago: nonzero(wire.days_ago),
            preview: parse_enum(wire.preview)?,
            extract_by: parse_enum(wire.extract_by)?,
            display_source_ric: wire.display_source_ric,
        })
    }
}
