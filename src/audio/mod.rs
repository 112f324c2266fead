//! Audio pipeline: inline PCM payload → WAV container → device playback.
//!
//! # Pipeline
//!
//! ```text
//! base64 text ─▶ decode_base64_pcm ─▶ Vec<i16> ─▶ encode_wav ─▶ WAV bytes
//!                                                              │
//! PlaybackHandle::start ─▶ AudioSink::play ─▶ decode_wav ─▶ pcm16_to_f32
//!                          ─▶ resample_linear ─▶ mono_to_interleaved ─▶ cpal
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use studio_assist::audio::{decode_base64_pcm, encode_wav, parse_l16_mime};
//!
//! let rate = parse_l16_mime("audio/L16;codec=pcm;rate=24000").unwrap();
//! let samples = decode_base64_pcm("AAD/fwCAZAA=").unwrap();
//! assert_eq!(samples, vec![0, 32767, -32768, 100]);
//!
//! let wav = encode_wav(&samples, rate);
//! assert_eq!(wav.len(), 52);
//! ```

pub mod pcm;
pub mod playback;
pub mod resample;
pub mod wav;

pub use pcm::{
    decode_base64_pcm, parse_l16_mime, parse_l16_mime_or, pcm16_from_le_bytes, PcmError, DEFAULT_SAMPLE_RATE,
    L16_MIME_PREFIX,
};
pub use playback::{
    AbortFlag, AudioSink, CpalSink, PlaybackError, PlaybackHandle, PlaybackOutcome,
};
pub use resample::{mono_to_interleaved, pcm16_to_f32, resample_linear};
pub use wav::{decode_wav, encode_wav, WavError, WavHeader, WAV_HEADER_LEN, WAV_MIME};

#[cfg(test)]
pub use playback::MockSink;
