//! Speech synthesis: text → inline L16 audio → WAV.

use std::time::Duration;

use super::envelope::{
    Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig, SpeechOptions,
};
use super::error::ApiError;
use crate::audio::{decode_base64_pcm, encode_wav, parse_l16_mime_or, WAV_MIME};

// ---------------------------------------------------------------------------
// SpeechAudio
// ---------------------------------------------------------------------------

/// Decoded speech ready for playback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechAudio {
    /// Samples per second reported by the API.
    pub sample_rate: u32,
    /// Mono 16-bit samples.
    pub samples: Vec<i16>,
    /// `samples` wrapped in a RIFF/WAVE container.
    pub wav: Vec<u8>,
}

impl SpeechAudio {
    /// Encode `samples` and bundle them with their container.
    pub fn new(samples: Vec<i16>, sample_rate: u32) -> Self {
        let wav = encode_wav(&samples, sample_rate);
        Self {
            sample_rate,
            samples,
            wav,
        }
    }

    /// MIME type of [`wav`](Self::wav).
    pub fn mime_type(&self) -> &'static str {
        WAV_MIME
    }

    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.samples.len() as f64 / self.sample_rate as f64)
    }
}

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// Instruction wrapping the text to speak.
pub fn speech_prompt(text: &str, voice: &str) -> String {
    format!("Speak the following text in a clear, informative voice using the '{voice}' voice: \"{text}\"")
}

/// Build the `generateContent` body asking `model` to read `text` aloud.
pub fn build_request(text: &str, voice: &str, model: &str) -> GenerateContentRequest {
    GenerateContentRequest {
        contents: vec![Content::text(speech_prompt(text, voice))],
        system_instruction: None,
        generation_config: Some(GenerationConfig {
            response_modalities: Some(vec!["AUDIO".into()]),
            speech_config: Some(SpeechOptions::voice(voice)),
            ..Default::default()
        }),
        model: Some(model.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Response
// ---------------------------------------------------------------------------

/// Pull the inline audio out of `response` and convert it to WAV.
///
/// The first part must carry `inlineData` with non-empty data and an
/// `audio/L16` MIME type.  The sample rate comes from the MIME `rate=`
/// parameter, or `default_rate` when that is absent or unusable.
pub fn extract_audio(
    response: &GenerateContentResponse,
    default_rate: u32,
) -> Result<SpeechAudio, ApiError> {
    let part = response.first_part()?;
    let inline = part
        .inline_data
        .as_ref()
        .ok_or_else(|| ApiError::MalformedResponse("first part carries no inline audio".into()))?;

    if inline.data.trim().is_empty() {
        return Err(ApiError::MalformedResponse(format!(
            "inline audio is empty (MIME type {:?})",
            inline.mime_type
        )));
    }

    let sample_rate = parse_l16_mime_or(&inline.mime_type, default_rate)?;
    let samples = decode_base64_pcm(&inline.data)?;

    log::debug!(
        "decoded {} samples @ {} Hz from {:?}",
        samples.len(),
        sample_rate,
        inline.mime_type
    );

    Ok(SpeechAudio::new(samples, sample_rate))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
