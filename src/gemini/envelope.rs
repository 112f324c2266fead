//! Wire types for the `models/{model}:generateContent` endpoint.
//!
//! Requests are built from these structs and serialised with `serde`;
//! responses are deserialised into [`GenerateContentResponse`] and walked
//! with explicit checks, so a missing field surfaces as
//! [`ApiError::MalformedResponse`] instead of an absent value.

use serde::{Deserialize, Serialize};

use super::error::ApiError;

// ---------------------------------------------------------------------------
// Shared content types
// ---------------------------------------------------------------------------

/// One turn of content: an optional role and its parts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    /// A single text part with no role.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            role: None,
            parts: vec![Part::text(text)],
        }
    }
}

/// A text or inline-data part.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<InlineData>,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            inline_data: None,
        }
    }
}

/// Base64 payload with its MIME type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// Body of a `generateContent` call.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// Output controls.  Only the fields this crate uses are modelled.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_mime_type: Option<String>,
    /// OpenAPI-style schema the JSON output must follow.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_schema: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_modalities: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speech_config: Option<SpeechOptions>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeechOptions {
    pub voice_config: VoiceOptions,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceOptions {
    pub prebuilt_voice_config: PrebuiltVoice,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrebuiltVoice {
    pub voice_name: String,
}

impl SpeechOptions {
    pub fn voice(name: impl Into<String>) -> Self {
        Self {
            voice_config: VoiceOptions {
                prebuilt_voice_config: PrebuiltVoice {
                    voice_name: name.into(),
                },
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Response
// ---------------------------------------------------------------------------

/// Body of a successful `generateContent` response.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Present when the prompt itself was blocked.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    #[serde(default)]
    pub block_reason: Option<String>,
}

impl GenerateContentResponse {
    /// The first part of the first candidate.
    pub fn first_part(&self) -> Result<&Part, ApiError> {
        let candidate = self.candidates.first().ok_or_else(|| {
            let reason = self
                .prompt_feedback
                .as_ref()
                .and_then(|f| f.block_reason.as_deref());
            match reason {
                Some(reason) => {
                    ApiError::MalformedResponse(format!("no candidates (prompt blocked: {reason})"))
                }
                None => ApiError::MalformedResponse("no candidates".into()),
            }
        })?;

        let content = candidate.content.as_ref().ok_or_else(|| {
            ApiError::MalformedResponse(format!(
                "candidate has no content (finish reason: {})",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            ))
        })?;

        content
            .parts
            .first()
            .ok_or_else(|| ApiError::MalformedResponse("candidate content has no parts".into()))
    }

    /// Text of the first part, which must be present and non-blank.
    pub fn first_text(&self) -> Result<&str, ApiError> {
        self.first_part()?
            .text
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| ApiError::MalformedResponse("first part carries no text".into()))
    }
}

// ---------------------------------------------------------------------------
// Error body
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<String>,
}

/// Human-readable message from an error response body.
///
/// Uses `error.message` (and `error.status`) when the body is the API's JSON
/// error envelope, otherwise the trimmed raw text.
pub fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(ErrorEnvelope { error }) => match error.status {
            Some(status) => format!("{status}: {}", error.message),
            None => error.message,
        },
        Err(_) => body.trim().to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_serialises_camel_case_and_skips_none() {
        let req = GenerateContentRequest {
            contents: vec![Content::text("hi")],
            generation_config: Some(GenerationConfig {
                response_modalities: Some(vec!["AUDIO".into()]),
                speech_config: Some(SpeechOptions::voice("Charon")),
                ..Default::default()
            }),
            ..Default::default()
        };

        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(
            value,
            json!({
                "contents": [{ "parts": [{ "text": "hi" }] }],
                "generationConfig": {
                    "responseModalities": ["AUDIO"],
                    "speechConfig": {
                        "voiceConfig": { "prebuiltVoiceConfig": { "voiceName": "Charon" } }
                    }
                }
            })
        );
    }

    #[test]
    fn first_text_walks_the_envelope() {
        let resp: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": "[]" }] },
                "finishReason": "STOP"
            }]
        }))
        .unwrap();
        assert_eq!(resp.first_text().unwrap(), "[]");
    }

    #[test]
    fn inline_data_is_deserialised() {
        let resp: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": { "parts": [{
                    "inlineData": { "mimeType": "audio/L16;rate=24000", "data": "AAA=" }
                }] }
            }]
        }))
        .unwrap();
        let inline = resp.first_part().unwrap().inline_data.as_ref().unwrap();
        assert_eq!(inline.mime_type, "audio/L16;rate=24000");
        assert_eq!(inline.data, "AAA=");
    }

    #[test]
    fn empty_candidates_is_malformed() {
        let resp: GenerateContentResponse = serde_json::from_value(json!({})).unwrap();
        assert!(matches!(resp.first_part(), Err(ApiError::MalformedResponse(_))));
    }

    #[test]
    fn blocked_prompt_reason_is_reported() {
        let resp: GenerateContentResponse = serde_json::from_value(json!({
            "promptFeedback": { "blockReason": "SAFETY" }
        }))
        .unwrap();
        let err = resp.first_part().unwrap_err().to_string();
        assert!(err.contains("SAFETY"), "{err}");
    }

    #[test]
    fn missing_content_reports_finish_reason() {
        let resp: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{ "finishReason": "MAX_TOKENS" }]
        }))
        .unwrap();
        let err = resp.first_part().unwrap_err().to_string();
        assert!(err.contains("MAX_TOKENS"), "{err}");
    }

    #[test]
    fn blank_text_is_malformed() {
        let resp: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{ "content": { "parts": [{ "text": "  " }] } }]
        }))
        .unwrap();
        assert!(resp.first_text().is_err());
    }

    #[test]
    fn error_message_prefers_api_envelope() {
        let body = r#"{"error":{"code":400,"message":"API key not valid.","status":"INVALID_ARGUMENT"}}"#;
        assert_eq!(error_message(body), "INVALID_ARGUMENT: API key not valid.");
        assert_eq!(error_message("  plain text \n"), "plain text");
    }
}
