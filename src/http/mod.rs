//! Resilient HTTP layer: request/response types, transports and the
//! retrying client.
//!
//! # Architecture
//!
//! ```text
//! HttpRequest ──▶ RetryingClient::execute()
//!                   │
//!                   ├─ Transport::send()      (reqwest in production)
//!                   │    ├─ 2xx / other 4xx ──▶ return HttpResponse
//!                   │    └─ 429 / 5xx / error ─▶ TransientFailure
//!                   │
//!                   ├─ Sleeper::sleep(2^k × base + jitter)
//!                   └─ last attempt failed ──▶ FetchError::ExhaustedRetries
//! ```
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use studio_assist::http::{HttpRequest, ReqwestTransport, RetryPolicy, RetryingClient};
//!
//! #[tokio::main]
//! async fn main() {
//!     let transport = ReqwestTransport::new(Duration::from_secs(30));
//!     let client = RetryingClient::new(transport, RetryPolicy::default());
//!
//!     let request = HttpRequest::get("https://example.com/health");
//!     let response = client.execute(&request).await.unwrap();
//!     println!("status {}", response.status());
//! }
//! ```

pub mod policy;
pub mod request;
pub mod retry;
pub mod transport;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use policy::RetryPolicy;
pub use request::{HttpRequest, HttpResponse, ResponseClass};
pub use retry::{FetchError, RetryingClient, TransientFailure};
pub use transport::{ReqwestTransport, Sleeper, TokioSleeper, Transport, TransportError};

#[cfg(test)]
pub use transport::{RecordingSleeper, ScriptedTransport};
