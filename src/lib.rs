//! Studio assistant: project brainstorming and spoken summaries backed by
//! the Gemini `generateContent` API.
//!
//! * [`http`]: retrying HTTP client with exponential backoff and jitter.
//! * [`audio`]: L16 PCM decoding, WAV encoding and device playback.
//! * [`gemini`]: request/response envelopes and the API client.
//! * [`pipeline`]: the listen-to-summary toggle.
//! * [`config`]: TOML settings under the user's config directory.

pub mod audio;
pub mod config;
pub mod gemini;
pub mod http;
pub mod pipeline;
