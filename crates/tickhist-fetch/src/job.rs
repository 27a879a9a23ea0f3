//! Extraction job state machine.
//!
//! A job moves `Built → Submitted → Polling → Completed → Fetched`, or to
//! `Failed` from any phase. Transitions are driven purely by HTTP status.

use tickhist_types::{AuthToken, ExtractionRequest, JobHandle};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::url::{self, EXTRACT_RAW_PATH};
use crate::{
    ByteStream, ExtractionClient, ExtractionError, HttpRequest, HttpResponse, HttpTransport,
    Method, Result,
};

/// Phase of an extraction job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum JobPhase {
    /// Request assembled, nothing sent yet.
    #[default]
    Built,
    /// Request sent, response pending.
    Submitted,
    /// Accepted asynchronously; the poll location is known.
    Polling,
    /// The job finished and its handle is available.
    Completed,
    /// The raw result stream has been opened.
    Fetched,
    /// A step failed.
    Failed,
}

impl JobPhase {
    /// Returns true for `Fetched` and `Failed`.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Fetched | Self::Failed)
    }

    /// Returns the phase as a string identifier.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Built => "built",
            Self::Submitted => "submitted",
            Self::Polling => "polling",
            Self::Completed => "completed",
            Self::Fetched => "fetched",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for JobPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The opened result of a completed job.
pub struct RawResult {
    /// The completed job.
    pub job: JobHandle,
    /// Declared `Content-Length` of the result, if sent.
    pub content_length: Option<u64>,
    /// The gzip-compressed result body, unread.
    pub body: ByteStream,
}

impl std::fmt::Debug for RawResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawResult")
            .field("job", &self.job)
            .field("content_length", &self.content_length)
            .finish_non_exhaustive()
    }
}

/// Drives one extraction job through its phases.
///
/// Created by [`ExtractionClient::job`]. Every call checks the current phase
/// first and returns [`ExtractionError::InvalidTransition`] without side
/// effects when it does not apply. Any other error, cancellation included,
/// moves the job to [`JobPhase::Failed`].
#[derive(Debug)]
pub struct JobController<'a, T> {
    client: &'a ExtractionClient<T>,
    token: &'a AuthToken,
    phase: JobPhase,
    location: Option<String>,
    job: Option<JobHandle>,
    history: Vec<JobPhase>,
}

impl<'a, T: HttpTransport> JobController<'a, T> {
    pub(crate) fn new(client: &'a ExtractionClient<T>, token: &'a AuthToken) -> Self {
        Self {
            client,
            token,
            phase: JobPhase::Built,
            location: None,
            job: None,
            history: vec![JobPhase::Built],
        }
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> JobPhase {
        self.phase
    }

    /// Every phase entered so far, starting with `Built`.
    #[must_use]
    pub fn history(&self) -> &[JobPhase] {
        &self.history
    }

    /// The poll location, once the job was accepted asynchronously.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    /// The completed job handle, once available.
    #[must_use]
    pub const fn job(&self) -> Option<&JobHandle> {
        self.job.as_ref()
    }

    /// Submits `request`.
    ///
    /// Returns `Completed` when the service answers synchronously and
    /// `Polling` when it accepts the job for later.
    ///
    /// # Errors
    ///
    /// [`ExtractionError::Submit`] for an unexpected status,
    /// [`ExtractionError::MissingLocation`] for a 202 without a poll URL,
    /// [`ExtractionError::Cancelled`] if `cancel` fires first.
    pub async fn submit(
        &mut self,
        request: &ExtractionRequest,
        cancel: &CancellationToken,
    ) -> Result<JobPhase> {
        self.require(JobPhase::Built, "submit")?;
        let outcome = self.try_submit(request, cancel).await;
        self.settle(outcome)
    }

    /// Polls the job once.
    ///
    /// # Errors
    ///
    /// [`ExtractionError::Poll`] for a status other than 200 or 202,
    /// [`ExtractionError::Cancelled`] if `cancel` fires first.
    pub async fn poll(&mut self, cancel: &CancellationToken) -> Result<JobPhase> {
        self.require(JobPhase::Polling, "poll")?;
        let outcome = self.try_poll(cancel).await;
        self.settle(outcome)
    }

    /// Polls until the job completes.
    ///
    /// Sleeps the configured poll interval before every poll. Stops early
    /// when `cancel` fires. With a maximum wait configured, no poll is sent
    /// once it has elapsed and a poll still in flight at that point is
    /// abandoned.
    ///
    /// # Errors
    ///
    /// [`ExtractionError::Cancelled`], [`ExtractionError::PollTimeout`], or
    /// any error from [`poll`](Self::poll).
    pub async fn wait(&mut self, cancel: &CancellationToken) -> Result<&JobHandle> {
        let config = self.client.config();
        let interval = config.poll_interval;
        let deadline = config
            .max_poll_wait
            .map(|limit| (limit, Instant::now() + limit));

        while self.phase == JobPhase::Polling {
            if let Some((limit, deadline)) = deadline
                && Instant::now() >= deadline
            {
                return Err(self.fail(ExtractionError::PollTimeout(limit)));
            }

            let next = Instant::now() + interval;
            let wake = deadline.map_or(next, |(_, deadline)| next.min(deadline));
            tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(self.fail(ExtractionError::Cancelled)),
                () = tokio::time::sleep_until(wake) => {}
            }

            match deadline {
                Some((_, deadline)) => {
                    if Instant::now() < deadline
                        && let Ok(polled) =
                            tokio::time::timeout_at(deadline, self.poll(cancel)).await
                    {
                        polled?;
                    }
                }
                None => {
                    self.poll(cancel).await?;
                }
            }
        }

        self.require(JobPhase::Completed, "wait")?;
        self.job.as_ref().ok_or(ExtractionError::InvalidTransition {
            operation: "wait",
            phase: self.phase,
        })
    }

    /// Opens the raw result stream of the completed job.
    ///
    /// The request carries no overall timeout; results can be large.
    ///
    /// # Errors
    ///
    /// [`ExtractionError::Fetch`] for a status other than 200,
    /// [`ExtractionError::Cancelled`] if `cancel` fires first.
    pub async fn fetch(&mut self, cancel: &CancellationToken) -> Result<RawResult> {
        self.require(JobPhase::Completed, "fetch")?;
        let outcome = self.try_fetch(cancel).await;
        self.settle(outcome)
    }

    async fn try_submit(
        &mut self,
        request: &ExtractionRequest,
        cancel: &CancellationToken,
    ) -> Result<JobPhase> {
        let config = self.client.config();
        let http = self
            .client
            .api_request(
                Method::Post,
                url::endpoint(&config.base_url, EXTRACT_RAW_PATH),
                Some(self.token),
            )
            .body(request.to_submission()?)
            .timeout(Some(config.timeout));

        self.transition(JobPhase::Submitted);
        let response = self.send(http, cancel).await?;
        match response.status {
            200 | 201 => {
                let body = response.bytes().await?;
                self.complete(&body)
            }
            202 => {
                let location = response
                    .location()
                    .map(url::secure_location)
                    .ok_or(ExtractionError::MissingLocation)?;
                info!(%location, "extraction accepted, polling");
                self.location = Some(location);
                self.transition(JobPhase::Polling);
                Ok(JobPhase::Polling)
            }
            status => Err(ExtractionError::Submit {
                status,
                body: response.text().await?,
            }),
        }
    }

    async fn try_poll(&mut self, cancel: &CancellationToken) -> Result<JobPhase> {
        let location = self
            .location
            .clone()
            .ok_or(ExtractionError::MissingLocation)?;
        let http = self
            .client
            .api_request(Method::Get, location, Some(self.token))
            .timeout(Some(self.client.config().timeout));

        let response = self.send(http, cancel).await?;
        match response.status {
            202 => {
                if let Some(next) = response.location() {
                    self.location = Some(url::secure_location(next));
                }
                self.transition(JobPhase::Polling);
                Ok(JobPhase::Polling)
            }
            200 => {
                let body = response.bytes().await?;
                self.complete(&body)
            }
            status => Err(ExtractionError::Poll {
                status,
                body: response.text().await?,
            }),
        }
    }

    async fn try_fetch(&mut self, cancel: &CancellationToken) -> Result<RawResult> {
        let job = self.job.clone().ok_or(ExtractionError::InvalidTransition {
            operation: "fetch",
            phase: self.phase,
        })?;
        let http = self.client.api_request(
            Method::Get,
            url::raw_result_url(&self.client.config().base_url, &job.job_id),
            Some(self.token),
        );

        let response = self.send(http, cancel).await?;
        if response.status != 200 {
            return Err(ExtractionError::Fetch {
                status: response.status,
                body: response.text().await?,
            });
        }

        let content_length = response.content_length();
        self.transition(JobPhase::Fetched);
        Ok(RawResult {
            job,
            content_length,
            body: response.into_body(),
        })
    }

    async fn send(&self, http: HttpRequest, cancel: &CancellationToken) -> Result<HttpResponse> {
        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(ExtractionError::Cancelled),
            response = self.client.send(http) => response,
        }
    }

    fn complete(&mut self, body: &[u8]) -> Result<JobPhase> {
        let job = JobHandle::from_slice(body)?;
        for note in &job.notes {
            info!(job_id = %job.job_id, "{note}");
        }
        for error in &job.identifier_validation_errors {
            warn!(
                job_id = %job.job_id,
                identifier = %error.identifier.identifier,
                "identifier validation error: {}",
                error.message
            );
        }
        self.job = Some(job);
        self.transition(JobPhase::Completed);
        Ok(JobPhase::Completed)
    }

    fn require(&self, expected: JobPhase, operation: &'static str) -> Result<()> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(ExtractionError::InvalidTransition {
                operation,
                phase: self.phase,
            })
        }
    }

    fn settle<R>(&mut self, outcome: Result<R>) -> Result<R> {
        if outcome.is_err() {
            self.transition(JobPhase::Failed);
        }
        outcome
    }

    fn fail(&mut self, err: ExtractionError) -> ExtractionError {
        self.transition(JobPhase::Failed);
        err
    }

    fn transition(&mut self, phase: JobPhase) {
        info!(from = %self.phase, to = %phase, "job phase changed");
        self.phase = phase;
        self.history.push(phase);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::tests::test_config;
    use crate::testing::{ScriptedTransport, response};
    use crate::{ClientConfig, TransportError};
    use bytes::Bytes;
    use futures::stream::{self, StreamExt};
    use std::time::Duration;
    use tickhist_types::{ExtractionRequestBuilder, ODataType};

    const MONITOR: &str = "https://api.test/RestApi/v1/Monitor/ExtractRawResult(ExtractionId='0x1')";

    fn client(responses: Vec<HttpResponse>) -> ExtractionClient<ScriptedTransport> {
        client_with(responses, test_config())
    }

    fn client_with(
        responses: Vec<HttpResponse>,
        config: ClientConfig,
    ) -> ExtractionClient<ScriptedTransport> {
        ExtractionClient::with_transport(ScriptedTransport::new(responses), config)
    }

    fn token() -> AuthToken {
        serde_json::from_str(r#"{"Value":"tok"}"#).unwrap()
    }

    fn request() -> ExtractionRequest {
        ExtractionRequestBuilder::new()
            .fields(["Bid Price"])
            .ric("IBM.N")
            .build()
    }

    fn live() -> CancellationToken {
        CancellationToken::new()
    }

    fn accepted(location: &str) -> HttpResponse {
        response(202, &[("Location", location)], "")
    }

    fn still_running() -> HttpResponse {
        response(202, &[], "")
    }

    #[test]
    fn test_job_phase_display() {
        assert_eq!(JobPhase::default(), JobPhase::Built);
        assert_eq!(JobPhase::Polling.to_string(), "polling");
        assert!(JobPhase::Fetched.is_terminal());
        assert!(JobPhase::Failed.is_terminal());
        assert!(!JobPhase::Completed.is_terminal());
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_until_complete() {
        let client = client(vec![
            accepted(MONITOR),
            still_running(),
            still_running(),
            response(200, &[], r#"{"JobId":"0x1","Notes":["done"]}"#),
        ]);
        let token = token();
        let mut job = client.job(&token);

        assert_eq!(job.submit(&request(), &live()).await.unwrap(), JobPhase::Polling);
        assert_eq!(job.location(), Some(MONITOR));
        let handle = job.wait(&CancellationToken::new()).await.unwrap();
        assert_eq!(handle.job_id, "0x1");
        assert_eq!(handle.notes, vec!["done".to_string()]);

        assert_eq!(
            job.history(),
            &[
                JobPhase::Built,
                JobPhase::Submitted,
                JobPhase::Polling,
                JobPhase::Polling,
                JobPhase::Polling,
                JobPhase::Completed,
            ]
        );

        let sent = client.transport().requests();
        assert_eq!(sent.len(), 4);
        assert_eq!(sent[0].method, Method::Post);
        assert_eq!(
            sent[0].url,
            "https://api.test/RestApi/v1/Extractions/ExtractRaw"
        );
        assert_eq!(sent[0].header_value("prefer"), Some("respond-async"));
        assert_eq!(sent[0].header_value("authorization"), Some("Token tok"));
        for poll in &sent[1..] {
            assert_eq!(poll.method, Method::Get);
            assert_eq!(poll.url, MONITOR);
            assert_eq!(poll.header_value("authorization"), Some("Token tok"));
        }

        let submitted: serde_json::Value =
            serde_json::from_slice(sent[0].body.as_ref().unwrap()).unwrap();
        assert_eq!(
            submitted["ExtractionRequest"]["@odata.type"],
            ExtractionRequest::ODATA_TYPE
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_waits_between_attempts() {
        let client = client(vec![
            accepted(MONITOR),
            still_running(),
            response(200, &[], r#"{"JobId":"0x1"}"#),
        ]);
        let token = token();
        let mut job = client.job(&token);
        job.submit(&request(), &live()).await.unwrap();

        let started = Instant::now();
        job.wait(&CancellationToken::new()).await.unwrap();
        assert!(started.elapsed() >= Duration::from_secs(6));
    }

    #[tokio::test]
    async fn test_synchronous_completion() {
        for status in [200, 201] {
            let client = client(vec![response(status, &[], r#"{"JobID":"0x2"}"#)]);
            let token = token();
            let mut job = client.job(&token);

            assert_eq!(job.submit(&request(), &live()).await.unwrap(), JobPhase::Completed);
            assert!(job.location().is_none());
            let handle = job.wait(&CancellationToken::new()).await.unwrap();
            assert_eq!(handle.job_id, "0x2");
            assert_eq!(client.transport().requests().len(), 1);
        }
    }

    #[tokio::test]
    async fn test_validation_errors_are_not_faults() {
        let body = r#"{
            "JobId": "0x3",
            "Notes": [],
            "IdentifierValidationErrors": [
                {"Identifier": {"Identifier": "BAD.X", "IdentifierType": "Ric"}, "Message": "Not found"}
            ]
        }"#;
        let client = client(vec![
            response(200, &[], body),
            response(200, &[("Content-Length", "3")], "abc"),
        ]);
        let token = token();
        let mut job = client.job(&token);

        job.submit(&request(), &live()).await.unwrap();
        let result = job.fetch(&live()).await.unwrap();

        assert_eq!(job.phase(), JobPhase::Fetched);
        assert!(result.job.has_validation_errors());
        let error = &result.job.identifier_validation_errors[0];
        assert_eq!(error.identifier.identifier, "BAD.X");
        assert_eq!(error.message, "Not found");
        assert_eq!(result.content_length, Some(3));
    }

    #[tokio::test]
    async fn test_fetch_requests_raw_result() {
        let client = client(vec![
            response(200, &[], r#"{"JobId":"0x4"}"#),
            HttpResponse::new(
                200,
                Vec::new(),
                stream::iter(vec![Ok(Bytes::from_static(b"ab")), Ok(Bytes::from_static(b"c"))])
                    .boxed(),
            ),
        ]);
        let token = token();
        let mut job = client.job(&token);
        job.submit(&request(), &live()).await.unwrap();

        let result = job.fetch(&live()).await.unwrap();
        assert!(result.content_length.is_none());
        let chunks: Vec<_> = result.body.collect().await;
        assert_eq!(chunks.len(), 2);

        let sent = client.transport().requests();
        assert_eq!(
            sent[1].url,
            "https://api.test/RestApi/v1/Extractions/RawExtractionResults('0x4')/$value"
        );
        assert!(sent[1].timeout.is_none());
    }

    #[tokio::test]
    async fn test_submit_unexpected_status() {
        let client = client(vec![response(400, &[], r#"{"error":{"message":"bad field"}}"#)]);
        let token = token();
        let mut job = client.job(&token);

        let err = job.submit(&request(), &live()).await.unwrap_err();
        assert!(matches!(err, ExtractionError::Submit { status: 400, .. }));
        assert_eq!(err.body(), Some(r#"{"error":{"message":"bad field"}}"#));
        assert_eq!(job.phase(), JobPhase::Failed);
        assert_eq!(
            job.history(),
            &[JobPhase::Built, JobPhase::Submitted, JobPhase::Failed]
        );
    }

    #[tokio::test]
    async fn test_submit_accepted_without_location() {
        let client = client(vec![still_running()]);
        let token = token();
        let mut job = client.job(&token);

        let err = job.submit(&request(), &live()).await.unwrap_err();
        assert!(matches!(err, ExtractionError::MissingLocation));
        assert_eq!(job.phase(), JobPhase::Failed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_unexpected_status() {
        let client = client(vec![accepted(MONITOR), response(500, &[], "Internal error")]);
        let token = token();
        let mut job = client.job(&token);
        job.submit(&request(), &live()).await.unwrap();

        let err = job.wait(&CancellationToken::new()).await.unwrap_err();
        assert_eq!(err.status(), Some(500));
        assert_eq!(err.body(), Some("Internal error"));
        assert!(matches!(err, ExtractionError::Poll { .. }));
        assert_eq!(job.phase(), JobPhase::Failed);
    }

    #[tokio::test]
    async fn test_fetch_unexpected_status() {
        let client = client(vec![
            response(200, &[], r#"{"JobId":"0x5"}"#),
            response(404, &[], "No such result"),
        ]);
        let token = token();
        let mut job = client.job(&token);
        job.submit(&request(), &live()).await.unwrap();

        let err = job.fetch(&live()).await.unwrap_err();
        assert!(matches!(err, ExtractionError::Fetch { status: 404, .. }));
        assert_eq!(err.body(), Some("No such result"));
        assert_eq!(job.phase(), JobPhase::Failed);
    }

    #[tokio::test]
    async fn test_completed_body_must_decode() {
        let client = client(vec![response(200, &[], r#"{"JobId": 7}"#)]);
        let token = token();
        let mut job = client.job(&token);

        let err = job.submit(&request(), &live()).await.unwrap_err();
        assert!(matches!(err, ExtractionError::Model(_)));
        assert_eq!(job.phase(), JobPhase::Failed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_insecure_locations_are_upgraded() {
        let client = client(vec![
            accepted("http://api.test/Monitor('1')"),
            accepted("http://api.test/Monitor('2')"),
            response(200, &[], r#"{"JobId":"0x6"}"#),
        ]);
        let token = token();
        let mut job = client.job(&token);

        job.submit(&request(), &live()).await.unwrap();
        assert_eq!(job.location(), Some("https://api.test/Monitor('1')"));
        job.poll(&live()).await.unwrap();
        assert_eq!(job.location(), Some("https://api.test/Monitor('2')"));
        job.poll(&live()).await.unwrap();

        let sent = client.transport().requests();
        assert_eq!(sent[1].url, "https://api.test/Monitor('1')");
        assert_eq!(sent[2].url, "https://api.test/Monitor('2')");
    }

    #[tokio::test]
    async fn test_invalid_transitions() {
        let client = client(vec![response(200, &[], r#"{"JobId":"0x7"}"#)]);
        let token = token();
        let mut job = client.job(&token);

        let err = job.poll(&live()).await.unwrap_err();
        assert!(matches!(
            err,
            ExtractionError::InvalidTransition {
                operation: "poll",
                phase: JobPhase::Built
            }
        ));
        assert!(matches!(
            job.fetch(&live()).await,
            Err(ExtractionError::InvalidTransition { .. })
        ));
        // A rejected call leaves the phase untouched.
        assert_eq!(job.phase(), JobPhase::Built);

        job.submit(&request(), &live()).await.unwrap();
        assert!(matches!(
            job.submit(&request(), &live()).await,
            Err(ExtractionError::InvalidTransition {
                operation: "submit",
                phase: JobPhase::Completed
            })
        ));
        assert_eq!(client.transport().requests().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_cancelled() {
        let client = client(vec![accepted(MONITOR), still_running(), still_running()]);
        let token = token();
        let mut job = client.job(&token);
        job.submit(&request(), &live()).await.unwrap();

        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(7)).await;
            trigger.cancel();
        });

        let err = job.wait(&cancel).await.unwrap_err();
        assert!(matches!(err, ExtractionError::Cancelled));
        assert_eq!(job.phase(), JobPhase::Failed);
        // Polls at 3s and 6s, cancelled during the third sleep.
        assert_eq!(client.transport().requests().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_times_out() {
        let config = ClientConfig {
            max_poll_wait: Some(Duration::from_secs(10)),
            ..test_config()
        };
        let responses = std::iter::once(accepted(MONITOR))
            .chain(std::iter::repeat_with(still_running).take(10))
            .collect();
        let client = client_with(responses, config);
        let token = token();
        let mut job = client.job(&token);
        job.submit(&request(), &live()).await.unwrap();

        let started = Instant::now();
        let err = job.wait(&live()).await.unwrap_err();
        assert!(matches!(
            err,
            ExtractionError::PollTimeout(limit) if limit == Duration::from_secs(10)
        ));
        assert_eq!(started.elapsed(), Duration::from_secs(10));
        assert_eq!(job.phase(), JobPhase::Failed);
        // Polls at 3s, 6s and 9s; nothing is sent once the limit is reached.
        assert_eq!(client.transport().requests().len(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_limit_shorter_than_interval() {
        let config = ClientConfig {
            max_poll_wait: Some(Duration::from_secs(1)),
            ..test_config()
        };
        let client = client_with(vec![accepted(MONITOR), still_running()], config);
        let token = token();
        let mut job = client.job(&token);
        job.submit(&request(), &live()).await.unwrap();

        let started = Instant::now();
        let err = job.wait(&live()).await.unwrap_err();
        assert!(matches!(err, ExtractionError::PollTimeout(_)));
        assert_eq!(started.elapsed(), Duration::from_secs(1));
        assert_eq!(client.transport().requests().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_abandons_stalled_poll_at_limit() {
        let config = ClientConfig {
            max_poll_wait: Some(Duration::from_secs(10)),
            ..test_config()
        };
        let transport = ScriptedTransport::stalling(vec![accepted(MONITOR)]);
        let client = ExtractionClient::with_transport(transport, config);
        let token = token();
        let mut job = client.job(&token);
        job.submit(&request(), &live()).await.unwrap();

        let started = Instant::now();
        let err = job.wait(&live()).await.unwrap_err();
        assert!(matches!(err, ExtractionError::PollTimeout(_)));
        assert_eq!(started.elapsed(), Duration::from_secs(10));
        assert_eq!(job.phase(), JobPhase::Failed);
        assert_eq!(client.transport().requests().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_cancelled_in_flight() {
        let transport = ScriptedTransport::stalling(Vec::new());
        let client = ExtractionClient::with_transport(transport, test_config());
        let token = token();
        let mut job = client.job(&token);

        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            trigger.cancel();
        });

        let err = job.submit(&request(), &cancel).await.unwrap_err();
        assert!(matches!(err, ExtractionError::Cancelled));
        assert_eq!(
            job.history(),
            &[JobPhase::Built, JobPhase::Submitted, JobPhase::Failed]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_cancelled_while_stalled() {
        let completed = response(200, &[], r#"{"JobId":"0x8"}"#);
        let transport = ScriptedTransport::stalling(vec![completed]);
        let client = ExtractionClient::with_transport(transport, test_config());
        let token = token();
        let mut job = client.job(&token);
        job.submit(&request(), &live()).await.unwrap();

        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            trigger.cancel();
        });

        let outcome = tokio::time::timeout(Duration::from_secs(3600), job.fetch(&cancel)).await;
        assert!(matches!(outcome, Ok(Err(ExtractionError::Cancelled))));
        assert_eq!(job.phase(), JobPhase::Failed);
        assert_eq!(client.transport().requests().len(), 2);
    }

    #[tokio::test]
    async fn test_transport_failure_fails_job() {
        let client = client(Vec::new());
        let token = token();
        let mut job = client.job(&token);

        let err = job.submit(&request(), &live()).await.unwrap_err();
        assert!(matches!(
            err,
            ExtractionError::Transport(TransportError::Stream(_))
        ));
        assert_eq!(job.phase(), JobPhase::Failed);
    }
}
