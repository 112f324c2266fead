//! `ProposalGenerator` / `SpeechSynthesizer` traits and the Gemini-backed
//! [`GeminiClient`].
//!
//! All connection details come from [`ApiConfig`]; the API key is sent in the
//! `x-goog-api-key` header and never appears in a URL.

use async_trait::async_trait;

use super::brainstorm::{self, Proposal};
use super::envelope::{error_message, GenerateContentRequest, GenerateContentResponse};
use super::error::ApiError;
use super::speech::{self, SpeechAudio};
use crate::config::{ApiConfig, AppConfig, SpeechConfig};
use crate::http::{
    HttpRequest, ReqwestTransport, RetryingClient, Sleeper, TokioSleeper, Transport,
};

/// Header carrying the API key.
pub const API_KEY_HEADER: &str = "x-goog-api-key";

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// Turns a business goal into project proposals.
#[async_trait]
pub trait ProposalGenerator: Send + Sync {
    async fn brainstorm(&self, goal: &str) -> Result<Vec<Proposal>, ApiError>;
}

/// Turns text into playable speech.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, text: &str) -> Result<SpeechAudio, ApiError>;
}

// ---------------------------------------------------------------------------
// GeminiClient
// ---------------------------------------------------------------------------

/// Calls `{base_url}/v1beta/models/{model}:generateContent` through a
/// [`RetryingClient`].
pub struct GeminiClient<T = ReqwestTransport, S = TokioSleeper> {
    http: RetryingClient<T, S>,
    api: ApiConfig,
    speech: SpeechConfig,
}

impl GeminiClient {
    /// Build a production client from application config.
    ///
    /// The API key is taken from `GEMINI_API_KEY` when set, else from
    /// `config.api.api_key`.
    pub fn from_config(config: &AppConfig) -> Self {
        let transport =
            ReqwestTransport::new(std::time::Duration::from_secs(config.api.timeout_secs));
        let http = RetryingClient::new(transport, config.retry.to_policy());

        let mut api = config.api.clone();
        api.api_key = config.api.resolved_api_key();
        if api.api_key.is_none() {
            log::warn!("no API key configured; requests will likely be rejected");
        }

        Self::new(http, api, config.speech.clone())
    }
}

impl<T: Transport, S: Sleeper> GeminiClient<T, S> {
    /// Build a client over an existing retrying HTTP client.  `api.api_key`
    /// is used as-is.
    pub fn new(http: RetryingClient<T, S>, api: ApiConfig, speech: SpeechConfig) -> Self {
        Self { http, api, speech }
    }

    pub fn http(&self) -> &RetryingClient<T, S> {
        &self.http
    }

    /// Full `generateContent` URL for `model`.
    pub fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.api.base_url.trim_end_matches('/'),
            model
        )
    }

    /// POST `request` to `model` and decode the envelope.
    ///
    /// Non-success statuses that the retry layer hands back become
    /// [`ApiError::ClientRequest`].
    pub async fn generate(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, ApiError> {
        let mut http_request = HttpRequest::post_json(self.endpoint(model), request)
            .map_err(|e| ApiError::Serialize(e.to_string()))?;

        if let Some(key) = self.api.api_key.as_deref().filter(|k| !k.is_empty()) {
            http_request = http_request.with_header(API_KEY_HEADER, key);
        }

        let response = self.http.execute(&http_request).await?;

        if !response.is_success() {
            let status = response.status();
            let message = error_message(&response.into_text());
            log::warn!("{model} rejected the request ({status}): {message}");
            return Err(ApiError::ClientRequest { status, message });
        }

        response.json::<GenerateContentResponse>().map_err(|e| {
            ApiError::MalformedResponse(format!("body is not a generateContent response: {e}"))
        })
    }
}

#[async_trait]
impl<T: Transport, S: Sleeper> ProposalGenerator for GeminiClient<T, S> {
    /// Ask the text model for proposals for `goal`.
    async fn brainstorm(&self, goal: &str) -> Result<Vec<Proposal>, ApiError> {
        let goal = goal.trim();
        if goal.is_empty() {
            return Err(ApiError::EmptyInput);
        }

        let request = brainstorm::build_request(goal);
        let response = self.generate(&self.api.text_model, &request).await?;
        let proposals = brainstorm::parse_proposals(&response)?;

        log::info!("brainstorm returned {} proposal(s)", proposals.len());
        Ok(proposals)
    }
}

#[async_trait]
impl<T: Transport, S: Sleeper> SpeechSynthesizer for GeminiClient<T, S> {
    /// Ask the speech model to read `text` with the configured voice.
    async fn synthesize(&self, text: &str) -> Result<SpeechAudio, ApiError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ApiError::EmptyInput);
        }

        let request = speech::build_request(text, &self.speech.voice, &self.api.tts_model);
        let response = self.generate(&self.api.tts_model, &request).await?;
        let audio = speech::extract_audio(&response, self.speech.default_sample_rate)?;

        log::info!(
            "synthesized {:.1}s of speech @ {} Hz",
            audio.duration().as_secs_f32(),
            audio.sample_rate
        );
        Ok(audio)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
