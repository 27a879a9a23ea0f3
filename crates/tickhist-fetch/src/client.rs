//! Extraction API client.

use std::path::{Path, PathBuf};
use std::time::Duration;
use tickhist_types::{AuthToken, Credential, ExtractionRequest, JobHandle};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::url::{self, DEFAULT_BASE_URL, REQUEST_TOKEN_PATH};
use crate::{
    Downloader, ExtractionError, HttpRequest, HttpTransport, JobController, Method,
    ReqwestTransport, Result, TransportError,
};

/// Configuration for the extraction client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the REST API.
    pub base_url: String,
    /// Timeout for token, submit and poll requests. Result downloads have none.
    pub timeout: Duration,
    /// TCP connect timeout.
    pub connect_timeout: Duration,
    /// Delay before each poll of a running job.
    pub poll_interval: Duration,
    /// Upper bound on total polling time; `None` waits indefinitely.
    pub max_poll_wait: Option<Duration>,
    /// Interval between download progress reports.
    pub progress_interval: Duration,
    /// User agent string.
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(60),
            connect_timeout: Duration::from_secs(10),
            poll_interval: Duration::from_secs(3),
            max_poll_wait: None,
            progress_interval: Duration::from_secs(5),
            user_agent: format!("tickhist/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Outcome of a complete extraction run.
#[derive(Debug, Clone)]
pub struct ExtractionOutcome {
    /// The completed job, including notes and validation errors.
    pub job: JobHandle,
    /// Where the result was written.
    pub path: PathBuf,
    /// Bytes written to `path`.
    pub bytes_written: u64,
}

/// Client for the asynchronous extraction API.
///
/// Holds the transport and configuration; per-job state lives in
/// [`JobController`].
#[derive(Debug, Clone)]
pub struct ExtractionClient<T = ReqwestTransport> {
    transport: T,
    config: ClientConfig,
}

impl ExtractionClient<ReqwestTransport> {
    /// Creates a client backed by `reqwest`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: ClientConfig) -> std::result::Result<Self, TransportError> {
        let transport = ReqwestTransport::new(config.connect_timeout, &config.user_agent)?;
        Ok(Self { transport, config })
    }

    /// Creates a client with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn with_defaults() -> std::result::Result<Self, TransportError> {
        Self::new(ClientConfig::default())
    }
}

impl<T: HttpTransport> ExtractionClient<T> {
    /// Creates a client over an arbitrary transport.
    pub const fn with_transport(transport: T, config: ClientConfig) -> Self {
        Self { transport, config }
    }

    /// Returns the client configuration.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Returns the transport.
    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Builds a request carrying the headers every API call sends.
    pub(crate) fn api_request(
        &self,
        method: Method,
        url: impl Into<String>,
        token: Option<&AuthToken>,
    ) -> HttpRequest {
        let mut request = HttpRequest::new(method, url)
            .header("Content-Type", "application/json")
            .header("Prefer", "respond-async");
        if let Some(token) = token {
            request = request.header("Authorization", token.authorization());
        }
        request
    }

    /// Sends a request, tracing both directions.
    pub(crate) async fn send(&self, request: HttpRequest) -> Result<crate::HttpResponse> {
        debug!(method = %request.method, url = %request.url, "sending request");
        let response = self.transport.send(request).await?;
        debug!(status = response.status, headers = ?response.headers, "received response");
        Ok(response)
    }

    /// Exchanges a credential for a bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractionError::Auth`] for a non-200 status and
    /// [`ExtractionError::EmptyToken`] if the body holds no token.
    pub async fn request_token(&self, credential: &Credential) -> Result<AuthToken> {
        let url = url::endpoint(&self.config.base_url, REQUEST_TOKEN_PATH);
        let request = self
            .api_request(Method::Post, url, None)
            .body(credential.to_request_body()?)
            .timeout(Some(self.config.timeout));

        let response = self.send(request).await?;
        let status = response.status;
        let body = response.bytes().await?;
        if status != 200 {
            return Err(ExtractionError::Auth {
                status,
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        let token = AuthToken::from_slice(&body)?;
        if token.is_empty() {
            return Err(ExtractionError::EmptyToken);
        }
        info!(context = ?token.context, "obtained bearer token");
        Ok(token)
    }

    /// Starts a job controller authenticated with `token`.
    pub fn job<'a>(&'a self, token: &'a AuthToken) -> JobController<'a, T> {
        JobController::new(self, token)
    }

    /// Runs a full extraction: token, submit, poll, fetch and download.
    ///
    /// A partially written file is left in place if the download fails.
    ///
    /// # Errors
    ///
    /// Returns the first error of any step.
    pub async fn extract_to_file(
        &self,
        credential: &Credential,
        request: &ExtractionRequest,
        path: impl AsRef<Path>,
        downloader: &Downloader,
        cancel: &CancellationToken,
    ) -> Result<ExtractionOutcome> {
        let path = path.as_ref();
        let token = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(ExtractionError::Cancelled),
            token = self.request_token(credential) => token?,
        };

        let mut job = self.job(&token);
        job.submit(request, cancel).await?;
        job.wait(cancel).await?;
        let result = job.fetch(cancel).await?;
        let handle = result.job.clone();
        let bytes_written = downloader.download_to_file(result, path, cancel).await?;

        Ok(ExtractionOutcome {
            job: handle,
            path: path.to_path_buf(),
            bytes_written,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::testing::{ScriptedTransport, response};
    use tickhist_types::ExtractionRequestBuilder;

    pub(crate) fn test_config() -> ClientConfig {
        ClientConfig {
            base_url: "https://api.test/RestApi/v1/".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_client_config_default() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.poll_interval, Duration::from_secs(3));
        assert_eq!(config.progress_interval, Duration::from_secs(5));
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert!(config.max_poll_wait.is_none());
        assert!(config.user_agent.starts_with("tickhist/"));
    }

    #[tokio::test]
    async fn test_client_creation() {
        let client = ExtractionClient::with_defaults();
        assert!(client.is_ok());
    }

    #[tokio::test]
    async fn test_request_token_success() {
        let transport = ScriptedTransport::new(vec![response(
            200,
            &[],
            r#"{"@odata.context":"ctx","Value":"tok"}"#,
        )]);
        let client = ExtractionClient::with_transport(transport, test_config());

        let token = client
            .request_token(&Credential::new("user", "pass"))
            .await
            .unwrap();
        assert_eq!(token.value, "tok");

        let sent = client.transport().requests();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].method, Method::Post);
        assert_eq!(
            sent[0].url,
            "https://api.test/RestApi/v1/Authentication/RequestToken"
        );
        assert_eq!(sent[0].header_value("content-type"), Some("application/json"));
        assert!(sent[0].header_value("authorization").is_none());
        let body: serde_json::Value =
            serde_json::from_slice(sent[0].body.as_ref().unwrap()).unwrap();
        assert_eq!(body["Credentials"]["Username"], "user");
    }

    #[tokio::test]
    async fn test_request_token_rejected() {
        let transport = ScriptedTransport::new(vec![response(401, &[], "Invalid username")]);
        let client = ExtractionClient::with_transport(transport, test_config());

        let err = client
            .request_token(&Credential::new("user", "bad"))
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractionError::Auth { status: 401, .. }));
        assert_eq!(err.body(), Some("Invalid username"));
        assert_eq!(client.transport().requests().len(), 1);
    }

    #[tokio::test]
    async fn test_request_token_empty() {
        let transport = ScriptedTransport::new(vec![response(200, &[], r#"{"Value":""}"#)]);
        let client = ExtractionClient::with_transport(transport, test_config());

        let err = client
            .request_token(&Credential::new("user", "pass"))
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractionError::EmptyToken));
    }

    #[tokio::test]
    async fn test_request_token_malformed() {
        let transport = ScriptedTransport::new(vec![response(200, &[], "<html>")]);
        let client = ExtractionClient::with_transport(transport, test_config());

        let err = client
            .request_token(&Credential::new("user", "pass"))
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractionError::Model(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_extract_to_file_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("output.csv.gz");
        let transport = ScriptedTransport::new(vec![
            response(200, &[], r#"{"Value":"tok"}"#),
            response(202, &[("Location", "http://api.test/Monitor('1')")], ""),
            response(200, &[], r#"{"JobId":"J1","Notes":["ok"]}"#),
            response(200, &[("Content-Length", "6")], &b"\x1f\x8bdata"[..]),
        ]);
        let client = ExtractionClient::with_transport(transport, test_config());
        let request = ExtractionRequestBuilder::new().ric("IBM.N").build();
        let downloader = Downloader::new(Duration::from_secs(5));

        let outcome = client
            .extract_to_file(
                &Credential::new("user", "pass"),
                &request,
                &path,
                &downloader,
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(outcome.job.job_id, "J1");
        assert_eq!(outcome.bytes_written, 6);
        assert_eq!(std::fs::read(&path).unwrap(), b"\x1f\x8bdata");

        let sent = client.transport().requests();
        assert_eq!(sent.len(), 4);
        assert_eq!(sent[1].header_value("authorization"), Some("Token tok"));
        assert_eq!(sent[2].url, "https://api.test/Monitor('1')");
        assert_eq!(
            sent[3].url,
            "https://api.test/RestApi/v1/Extractions/RawExtractionResults('J1')/$value"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_extract_to_file_cancelled_during_fetch() {
        let transport = ScriptedTransport::stalling(vec![
            response(200, &[], r#"{"Value":"tok"}"#),
            response(200, &[], r#"{"JobId":"J2"}"#),
        ]);
        let client = ExtractionClient::with_transport(transport, test_config());
        let request = ExtractionRequestBuilder::new().ric("IBM.N").build();
        let downloader = Downloader::new(Duration::from_secs(5));
        let credential = Credential::new("user", "pass");

        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            trigger.cancel();
        });

        let path = "unused.csv.gz";
        let run = client.extract_to_file(&credential, &request, path, &downloader, &cancel);
        let outcome = tokio::time::timeout(Duration::from_secs(3600), run).await;
        assert!(matches!(outcome, Ok(Err(ExtractionError::Cancelled))));
        // Token, submit and the stalled fetch.
        assert_eq!(client.transport().requests().len(), 3);
    }

    #[tokio::test]
    async fn test_extract_to_file_cancelled_before_start() {
        let transport = ScriptedTransport::new(Vec::new());
        let client = ExtractionClient::with_transport(transport, test_config());
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = client
            .extract_to_file(
                &Credential::new("user", "pass"),
                &ExtractionRequest::default(),
                "unused.csv.gz",
                &Downloader::new(Duration::from_secs(5)),
                &cancel,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractionError::Cancelled));
        assert!(client.transport().requests().is_empty());
    }
}
