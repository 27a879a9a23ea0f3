//! Scripted in-memory transport for unit tests.

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::{HttpRequest, HttpResponse, HttpTransport, TransportError};

/// Replays canned responses in order and records every request.
///
/// Once the script runs out, requests fail, or never complete when the
/// transport was built with [`stalling`](Self::stalling).
#[derive(Debug, Default)]
pub(crate) struct ScriptedTransport {
    responses: Mutex<VecDeque<HttpResponse>>,
    requests: Mutex<Vec<HttpRequest>>,
    stall: bool,
}

impl ScriptedTransport {
    pub(crate) fn new(responses: Vec<HttpResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
            stall: false,
        }
    }

    pub(crate) fn stalling(responses: Vec<HttpResponse>) -> Self {
        Self {
            stall: true,
            ..Self::new(responses)
        }
    }

    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().unwrap().push(request);
        let next = self.responses.lock().unwrap().pop_front();
        match next {
            Some(response) => Ok(response),
            None if self.stall => std::future::pending().await,
            None => Err(TransportError::Stream("script exhausted".into())),
        }
    }
}

/// Builds a buffered response.
pub(crate) fn response(
    status: u16,
    headers: &[(&str, &str)],
    body: impl Into<Bytes>,
) -> HttpResponse {
    let headers = headers
        .iter()
        .map(|(name, value)| ((*name).to_string(), (*value).to_string()))
        .collect();
    HttpResponse::from_bytes(status, headers, body)
}
