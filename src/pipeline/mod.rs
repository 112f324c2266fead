//! Listen-to-summary pipeline: the user-facing toggle over speech synthesis
//! and audio playback.
//!
//! # Architecture
//!
//! ```text
//! SummaryPlayer::toggle(text)
//!        │
//!        ├─ clip playing → PlaybackHandle::stop_and_wait  → Idle
//!        │
//!        └─ nothing playing
//!              │
//!              ├─ SpeechSynthesizer::synthesize(text)      → Generating
//!              │     (GeminiClient → RetryingClient → L16 → WAV)
//!              └─ PlaybackHandle::start(AudioSink, wav)    → Playing
//!
//! ListenState ←─── read by the caller after each step
//! ```
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use studio_assist::audio::CpalSink;
//! use studio_assist::config::AppConfig;
//! use studio_assist::gemini::GeminiClient;
//! use studio_assist::pipeline::SummaryPlayer;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = AppConfig::default();
//!     let client = GeminiClient::from_config(&config);
//!     let mut player = SummaryPlayer::new(client, Arc::new(CpalSink::new()));
//!
//!     player.toggle(&config.speech.summary).await?;
//!     player.wait().await?;
//!     Ok(())
//! }
//! ```

pub mod listen;
pub mod state;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use listen::{ListenError, SummaryPlayer, Toggle};
pub use state::ListenState;
