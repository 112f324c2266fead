//! Error taxonomy for the Gemini clients.

use thiserror::Error;

use crate::audio::PcmError;
use crate::http::FetchError;

/// Errors that can occur during a brainstorm or speech call.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The goal / text to send was empty after trimming.
    #[error("nothing to send: input is empty")]
    EmptyInput,

    /// The request payload could not be serialised.
    #[error("failed to serialise request: {0}")]
    Serialize(String),

    /// Every attempt failed with 429, 5xx or a transport error.
    #[error(transparent)]
    ExhaustedRetries(#[from] FetchError),

    /// The API answered with a non-retryable, non-success status.
    #[error("API rejected the request with status {status}: {message}")]
    ClientRequest { status: u16, message: String },

    /// The response did not have the expected shape.
    #[error("malformed API response: {0}")]
    MalformedResponse(String),
}

impl From<PcmError> for ApiError {
    fn from(e: PcmError) -> Self {
        ApiError::MalformedResponse(e.to_string())
    }
}

impl ApiError {
    /// `true` for failures the retry layer already retried.
    pub fn is_transient(&self) -> bool {
        matches!(self, ApiError::ExhaustedRetries(_))
    }
}
