//! Transport and sleeper seams for [`crate::http::RetryingClient`].
//!
//! [`ReqwestTransport`] is the production transport; [`TokioSleeper`] waits
//! on the tokio timer.  Both are traits so the retry loop can be driven by
//! scripted doubles in tests ([`ScriptedTransport`], [`RecordingSleeper`],
//! available under `#[cfg(test)]`).

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use super::request::{HttpRequest, HttpResponse};

// ---------------------------------------------------------------------------
// TransportError
// ---------------------------------------------------------------------------

/// A request that never produced an HTTP response.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// The per-request timeout elapsed.
    #[error("request timed out")]
    Timeout,

    /// The connection could not be established.
    #[error("connection failed: {0}")]
    Connect(String),

    /// Any other transport-level failure (TLS, body read, invalid URL …).
    #[error("transport error: {0}")]
    Other(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TransportError::Timeout
        } else if e.is_connect() {
            TransportError::Connect(e.to_string())
        } else {
            TransportError::Other(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// Transport trait
// ---------------------------------------------------------------------------

/// Sends one HTTP request and returns the complete response.
///
/// Implementors must be `Send + Sync` so a client can be shared across tasks.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

// ---------------------------------------------------------------------------
// ReqwestTransport
// ---------------------------------------------------------------------------

/// [`Transport`] backed by a pooled `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Build a transport whose requests time out after `timeout`.
    ///
    /// A default (no-timeout) client is used if the builder fails.
    pub fn new(timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = self
            .client
            .request(request.method().clone(), request.url());

        for (name, value) in request.headers() {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder.body(request.body().to_vec()).send().await?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response.bytes().await?.to_vec();

        Ok(HttpResponse::new(status, headers, body))
    }
}

// ---------------------------------------------------------------------------
// Sleeper
// ---------------------------------------------------------------------------

/// Waits between retry attempts.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// [`Sleeper`] using `tokio::time::sleep`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

// ---------------------------------------------------------------------------
// Test doubles  (test-only)
// ---------------------------------------------------------------------------

/// Replays a fixed script of outcomes, one per call, and counts attempts.
/// Once the script runs out the last entry repeats.
#[cfg(test)]
pub struct ScriptedTransport {
    script: std::sync::Mutex<std::collections::VecDeque<Result<HttpResponse, TransportError>>>,
    last: std::sync::Mutex<Option<Result<HttpResponse, TransportError>>>,
    calls: std::sync::atomic::AtomicUsize,
    seen: std::sync::Mutex<Vec<HttpRequest>>,
}

#[cfg(test)]
impl ScriptedTransport {
    pub fn new(script: Vec<Result<HttpResponse, TransportError>>) -> Self {
        Self {
            script: std::sync::Mutex::new(script.into()),
            last: std::sync::Mutex::new(None),
            calls: std::sync::atomic::AtomicUsize::new(0),
            seen: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Every call answers with `status` and an empty body.
    pub fn always(status: u16) -> Self {
        Self::new(vec![Ok(HttpResponse::new(status, Vec::new(), Vec::new()))])
    }

    /// Answer with the given statuses in order (empty bodies).
    pub fn statuses(statuses: &[u16]) -> Self {
        Self::new(
            statuses
                .iter()
                .map(|&s| Ok(HttpResponse::new(s, Vec::new(), Vec::new())))
                .collect(),
        )
    }

    /// A single 200 response carrying `body` as JSON.
    pub fn json(body: &serde_json::Value) -> Self {
        Self::new(vec![Ok(HttpResponse::new(
            200,
            vec![("content-type".into(), "application/json".into())],
            body.to_string().into_bytes(),
        ))])
    }

    pub fn calls(&self) -> usize {
        self.calls.load(std::sync::atomic::Ordering::SeqCst)
    }

    /// Requests received so far, in order.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.seen.lock().unwrap().clone()
    }
}

#[cfg(test)]
#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        self.seen.lock().unwrap().push(request.clone());

        let next = self.script.lock().unwrap().pop_front();
        let mut last = self.last.lock().unwrap();
        match next {
            Some(outcome) => {
                *last = Some(outcome.clone());
                outcome
            }
            None => last
                .clone()
                .unwrap_or_else(|| Err(TransportError::Other("empty script".into()))),
        }
    }
}

/// Records every requested delay instead of sleeping.
#[cfg(test)]
#[derive(Default)]
pub struct RecordingSleeper {
    delays: std::sync::Mutex<Vec<Duration>>,
}

#[cfg(test)]
impl RecordingSleeper {
    pub fn delays(&self) -> Vec<Duration> {
        self.delays.lock().unwrap().clone()
    }
}

#[cfg(test)]
#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.delays.lock().unwrap().push(duration);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
