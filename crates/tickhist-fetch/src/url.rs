//! Extraction API endpoint construction.

/// Default base URL of the hosted REST API.
pub const DEFAULT_BASE_URL: &str = "https://hosted.datascopeapi.reuters.com/RestApi/v1/";

/// Token exchange endpoint, relative to the base URL.
pub const REQUEST_TOKEN_PATH: &str = "Authentication/RequestToken";

/// Raw extraction submission endpoint, relative to the base URL.
pub const EXTRACT_RAW_PATH: &str = "Extractions/ExtractRaw";

/// Joins a base URL and a relative path with exactly one slash.
///
/// # Example
///
/// ```
/// use tickhist_fetch::url::endpoint;
///
/// assert_eq!(
///     endpoint("https://host/RestApi/v1", "Extractions/ExtractRaw"),
///     "https://host/RestApi/v1/Extractions/ExtractRaw"
/// );
/// ```
#[must_use]
pub fn endpoint(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Builds the URL of a job's raw result file.
///
/// URL format: `{BASE}/Extractions/RawExtractionResults('{JOB_ID}')/$value`
///
/// # Example
///
/// ```
/// use tickhist_fetch::url::raw_result_url;
///
/// let url = raw_result_url("https://host/RestApi/v1/", "0x05a0");
/// assert_eq!(url, "https://host/RestApi/v1/Extractions/RawExtractionResults('0x05a0')/$value");
/// ```
#[must_use]
pub fn raw_result_url(base: &str, job_id: &str) -> String {
    endpoint(
        base,
        &format!("Extractions/RawExtractionResults('{job_id}')/$value"),
    )
}

/// Upgrades an `http:` poll location to `https:`.
///
/// The service has been seen returning insecure monitor URLs behind its TLS
/// front end. Anything else is returned unchanged.
#[must_use]
pub fn secure_location(location: &str) -> String {
    location.strip_prefix("http:").map_or_else(
        || location.to_string(),
        |rest| format!("https:{rest}"),
    )
}
