//! Inline PCM payload helpers.
//!
//! The speech endpoint returns audio as base64 text tagged with a MIME type
//! such as `audio/L16;codec=pcm;rate=24000`.  [`decode_base64_pcm`] turns the
//! text into little-endian `i16` samples and [`parse_l16_mime`] recovers the
//! sample rate.

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine as _;
use thiserror::Error;

/// Sample rate assumed when the MIME type does not carry a usable `rate=`.
pub const DEFAULT_SAMPLE_RATE: u32 = 24_000;

/// MIME prefix of 16-bit linear PCM.
pub const L16_MIME_PREFIX: &str = "audio/L16";

/// Standard alphabet, padding optional.
const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

// ---------------------------------------------------------------------------
// PcmError
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PcmError {
    #[error("invalid base64 audio payload: {0}")]
    Base64(String),

    /// 16-bit samples need an even number of bytes.
    #[error("PCM payload has odd length {0}")]
    OddLength(usize),

    #[error("unsupported audio MIME type {0:?}")]
    UnsupportedMime(String),
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Decode base64 text into 16-bit little-endian samples.
///
/// ASCII whitespace anywhere in `data` is ignored and trailing `=` padding
/// is optional.
///
/// ```rust
/// use studio_assist::audio::decode_base64_pcm;
///
/// // 0x0001, 0xFFFF → [1, -1]
/// assert_eq!(decode_base64_pcm("AQD//w==").unwrap(), vec![1, -1]);
/// ```
pub fn decode_base64_pcm(data: &str) -> Result<Vec<i16>, PcmError> {
    let compact: String = data.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = PAYLOAD_ENGINE
        .decode(compact)
        .map_err(|e| PcmError::Base64(e.to_string()))?;
    pcm16_from_le_bytes(&bytes)
}

/// Reinterpret raw bytes as 16-bit little-endian samples.
pub fn pcm16_from_le_bytes(bytes: &[u8]) -> Result<Vec<i16>, PcmError> {
    if bytes.len() % 2 != 0 {
        return Err(PcmError::OddLength(bytes.len()));
    }
    Ok(bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect())
}

// ---------------------------------------------------------------------------
// MIME
// ---------------------------------------------------------------------------

/// Validate an `audio/L16` MIME type and return its sample rate.
///
/// The `rate=` parameter may appear anywhere among the `;`-separated
/// parameters.  A missing, unparsable or zero rate falls back to
/// [`DEFAULT_SAMPLE_RATE`].
///
/// ```rust
/// use studio_assist::audio::parse_l16_mime;
///
/// assert_eq!(parse_l16_mime("audio/L16;codec=pcm;rate=24000").unwrap(), 24_000);
/// assert_eq!(parse_l16_mime("audio/L16").unwrap(), 24_000);
/// assert!(parse_l16_mime("audio/mpeg").is_err());
/// ```
pub fn parse_l16_mime(mime: &str) -> Result<u32, PcmError> {
    parse_l16_mime_or(mime, DEFAULT_SAMPLE_RATE)
}

/// [`parse_l16_mime`] with a caller-chosen fallback rate.
pub fn parse_l16_mime_or(mime: &str, default_rate: u32) -> Result<u32, PcmError> {
    let mime = mime.trim();
    if !mime.starts_with(L16_MIME_PREFIX) {
        return Err(PcmError::UnsupportedMime(mime.to_string()));
    }

    let rate = mime
        .split(';')
        .skip(1)
        .filter_map(|param| param.trim().strip_prefix("rate="))
        .find_map(|value| leading_digits(value).parse::<u32>().ok())
        .filter(|&rate| rate > 0)
        .unwrap_or(default_rate);

    Ok(rate)
}

fn leading_digits(value: &str) -> &str {
    let end = value
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(value.len());
    &value[..end]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::STANDARD;

    #[test]
    fn decodes_little_endian_pairs() {
        let encoded = STANDARD.encode([0x00, 0x00, 0xff, 0x7f, 0x00, 0x80, 0x64, 0x00]);
        assert_eq!(
            decode_base64_pcm(&encoded).unwrap(),
            vec![0, 32767, -32768, 100]
        );
    }

    #[test]
    fn unpadded_payload_is_accepted() {
        // "AQD//w==" without its padding
        assert_eq!(decode_base64_pcm("AQD//w").unwrap(), vec![1, -1]);
    }

    #[test]
    fn whitespace_inside_payload_is_ignored() {
        assert_eq!(decode_base64_pcm(" AQD/\n/w==\r\n").unwrap(), vec![1, -1]);
        assert_eq!(
            decode_base64_pcm("AAD/ fwCA\tZAA=").unwrap(),
            vec![0, 32767, -32768, 100]
        );
    }

    #[test]
    fn empty_payload_is_empty_buffer() {
        assert!(decode_base64_pcm("").unwrap().is_empty());
    }

    #[test]
    fn odd_byte_count_is_rejected() {
        let encoded = STANDARD.encode([1, 2, 3]);
        assert_eq!(decode_base64_pcm(&encoded), Err(PcmError::OddLength(3)));
    }

    #[test]
    fn invalid_base64_is_rejected() {
        assert!(matches!(
            decode_base64_pcm("not base64!!"),
            Err(PcmError::Base64(_))
        ));
    }

    #[test]
    fn rate_is_parsed() {
        assert_eq!(parse_l16_mime("audio/L16;rate=16000").unwrap(), 16_000);
        assert_eq!(parse_l16_mime("audio/L16; rate=44100").unwrap(), 44_100);
        assert_eq!(
            parse_l16_mime("audio/L16;codec=pcm;rate=24000").unwrap(),
            24_000
        );
    }

    #[test]
    fn missing_or_bad_rate_defaults() {
        assert_eq!(parse_l16_mime("audio/L16").unwrap(), DEFAULT_SAMPLE_RATE);
        assert_eq!(parse_l16_mime("audio/L16;rate=").unwrap(), DEFAULT_SAMPLE_RATE);
        assert_eq!(parse_l16_mime("audio/L16;rate=abc").unwrap(), DEFAULT_SAMPLE_RATE);
        assert_eq!(parse_l16_mime("audio/L16;rate=0").unwrap(), DEFAULT_SAMPLE_RATE);
    }

    #[test]
    fn custom_fallback_rate() {
        assert_eq!(parse_l16_mime_or("audio/L16", 16_000).unwrap(), 16_000);
        assert_eq!(parse_l16_mime_or("audio/L16;rate=8000", 16_000).unwrap(), 8_000);
    }

    #[test]
    fn other_mime_types_are_rejected() {
        assert_eq!(
            parse_l16_mime("audio/wav"),
            Err(PcmError::UnsupportedMime("audio/wav".into()))
        );
        assert!(parse_l16_mime("").is_err());
    }
}
