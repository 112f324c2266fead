//! Retrying HTTP client.
//!
//! [`RetryingClient::execute`] sends a request up to
//! [`RetryPolicy::max_attempts`] times.  Status 429, any status ≥ 500 and
//! transport errors are retried after an exponential backoff with jitter.
//! Successful responses and every other status are returned on the spot;
//! callers must check [`HttpResponse::is_success`] themselves.

use thiserror::Error;

use super::policy::RetryPolicy;
use super::request::{HttpRequest, HttpResponse, ResponseClass};
use super::transport::{Sleeper, TokioSleeper, Transport, TransportError};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why a single attempt counted as a transient failure.
#[derive(Debug, Clone, Error)]
pub enum TransientFailure {
    /// The server answered 429 or 5xx.
    #[error("server responded with status {status}")]
    Status { status: u16 },

    /// No response was received.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Failure of a whole retried call.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// Every allowed attempt failed transiently.  `last` is the failure of
    /// the final attempt.
    #[error("request failed after {attempts} attempt(s): {last}")]
    ExhaustedRetries {
        attempts: u32,
        #[source]
        last: TransientFailure,
    },
}

// ---------------------------------------------------------------------------
// RetryingClient
// ---------------------------------------------------------------------------

/// Wraps a [`Transport`] with the retry loop.
///
/// Attempts for one call never overlap: each waits for the previous one and
/// for the backoff delay.
pub struct RetryingClient<T, S = TokioSleeper> {
    transport: T,
    sleeper: S,
    policy: RetryPolicy,
}

impl<T: Transport> RetryingClient<T> {
    /// Client that sleeps on the tokio timer.
    pub fn new(transport: T, policy: RetryPolicy) -> Self {
        Self::with_sleeper(transport, TokioSleeper, policy)
    }
}

impl<T: Transport, S: Sleeper> RetryingClient<T, S> {
    pub fn with_sleeper(transport: T, sleeper: S, policy: RetryPolicy) -> Self {
        Self {
            transport,
            sleeper,
            policy,
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn sleeper(&self) -> &S {
        &self.sleeper
    }

    /// Send `request`, retrying transient failures.
    ///
    /// Returns the first response that is not retryable, or
    /// [`FetchError::ExhaustedRetries`] when the last allowed attempt also
    /// failed transiently.
    pub async fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, FetchError> {
        let attempts = self.policy.max_attempts();
        let mut attempt: u32 = 0;

        loop {
            let failure = match self.transport.send(request).await {
                Ok(response) => match response.classify() {
                    ResponseClass::Retryable => TransientFailure::Status {
                        status: response.status(),
                    },
                    ResponseClass::Success | ResponseClass::Terminal => {
                        log::debug!(
                            "{} {} -> {} (attempt {}/{})",
                            request.method(),
                            request.url(),
                            response.status(),
                            attempt + 1,
                            attempts
                        );
                        return Ok(response);
                    }
                },
                Err(e) => TransientFailure::Transport(e),
            };

            if attempt + 1 >= attempts {
                log::error!(
                    "{} {} failed after {} attempt(s): {failure}",
                    request.method(),
                    request.url(),
                    attempts
                );
                return Err(FetchError::ExhaustedRetries {
                    attempts,
                    last: failure,
                });
            }

            let delay = self.policy.delay_for(attempt);
            log::warn!(
                "attempt {}/{} failed ({failure}); retrying in {} ms",
                attempt + 1,
                attempts,
                delay.as_millis()
            );
            self.sleeper.sleep(delay).await;
            attempt += 1;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::http::transport::{RecordingSleeper, ScriptedTransport};

    fn client(
        transport: ScriptedTransport,
        policy: RetryPolicy,
    ) -> RetryingClient<ScriptedTransport, RecordingSleeper> {
        RetryingClient::with_sleeper(transport, RecordingSleeper::default(), policy)
    }

    fn request() -> HttpRequest {
        HttpRequest::get("http://test.invalid/v1")
    }

    #[tokio::test]
    async fn always_500_exhausts_after_max_attempts() {
        let c = client(ScriptedTransport::always(500), RetryPolicy::default());

        let err = c.execute(&request()).await.unwrap_err();

        assert_eq!(c.transport().calls(), 3);
        assert_eq!(c.sleeper().delays().len(), 2);
        match err {
            FetchError::ExhaustedRetries { attempts, last } => {
                assert_eq!(attempts, 3);
                assert!(matches!(last, TransientFailure::Status { status: 500 }));
            }
        }
    }

    #[tokio::test]
    async fn client_error_is_returned_without_retry() {
        let c = client(ScriptedTransport::always(400), RetryPolicy::default());

        let response = c.execute(&request()).await.expect("400 is returned");

        assert_eq!(response.status(), 400);
        assert_eq!(c.transport().calls(), 1);
        assert!(c.sleeper().delays().is_empty());
    }

    #[tokio::test]
    async fn rate_limit_then_success() {
        let c = client(
            ScriptedTransport::statuses(&[429, 503, 200]),
            RetryPolicy::default(),
        );

        let response = c.execute(&request()).await.expect("third attempt succeeds");

        assert_eq!(response.status(), 200);
        assert_eq!(c.transport().calls(), 3);
    }

    #[tokio::test]
    async fn transport_error_is_retried() {
        let c = client(
            ScriptedTransport::new(vec![
                Err(TransportError::Timeout),
                Ok(HttpResponse::new(204, Vec::new(), Vec::new())),
            ]),
            RetryPolicy::default(),
        );

        let response = c.execute(&request()).await.expect("retry succeeds");
        assert_eq!(response.status(), 204);
        assert_eq!(c.transport().calls(), 2);
    }

    #[tokio::test]
    async fn last_transport_error_is_surfaced() {
        let c = client(
            ScriptedTransport::new(vec![Err(TransportError::Connect("refused".into()))]),
            RetryPolicy::new(2, Duration::from_millis(1), Duration::ZERO),
        );

        let err = c.execute(&request()).await.unwrap_err();
        let FetchError::ExhaustedRetries { attempts, last } = err;
        assert_eq!(attempts, 2);
        assert!(matches!(
            last,
            TransientFailure::Transport(TransportError::Connect(_))
        ));
    }

    #[tokio::test]
    async fn delays_grow_exponentially() {
        let policy = RetryPolicy::new(
            5,
            Duration::from_millis(1_000),
            Duration::from_millis(500),
        );
        let c = client(ScriptedTransport::always(502), policy);

        let _ = c.execute(&request()).await;

        let delays = c.sleeper().delays();
        assert_eq!(delays.len(), 4);
        for (k, delay) in delays.iter().enumerate() {
            let floor = Duration::from_millis(1_000) * 2_u32.pow(k as u32);
            assert!(*delay >= floor, "delay {k} = {delay:?} < {floor:?}");
            assert!(
                *delay < floor + Duration::from_millis(500),
                "delay {k} = {delay:?} exceeds jitter window"
            );
        }
    }

    #[tokio::test]
    async fn single_attempt_policy_never_sleeps() {
        let c = client(ScriptedTransport::always(503), RetryPolicy::no_retry());

        assert!(c.execute(&request()).await.is_err());
        assert_eq!(c.transport().calls(), 1);
        assert!(c.sleeper().delays().is_empty());
    }

    #[tokio::test]
    async fn same_request_is_sent_on_every_attempt() {
        let c = client(ScriptedTransport::statuses(&[500, 200]), RetryPolicy::default());
        let req = HttpRequest::post_json("http://test.invalid/x", &serde_json::json!({"n": 1}))
            .unwrap();

        c.execute(&req).await.unwrap();

        let seen = c.transport().requests();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].body(), seen[1].body());
        assert_eq!(seen[0].url(), seen[1].url());
    }

    #[test]
    fn exhausted_error_message_names_attempts() {
        let err = FetchError::ExhaustedRetries {
            attempts: 3,
            last: TransientFailure::Status { status: 503 },
        };
        let msg = err.to_string();
        assert!(msg.contains("3 attempt"), "{msg}");
        assert!(msg.contains("503"), "{msg}");
    }
}
