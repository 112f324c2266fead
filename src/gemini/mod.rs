//! Gemini `generateContent` clients for the two site features.
//!
//! This module provides:
//! * [`ProposalGenerator`] / [`SpeechSynthesizer`]: async traits at the seam
//!   between the features and the network.
//! * [`GeminiClient`]: implements both over a retrying HTTP client.
//! * [`Proposal`]: one structured project idea.
//! * [`SpeechAudio`]: decoded speech plus its WAV container.
//! * [`ApiError`]: error variants for API operations.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use studio_assist::config::AppConfig;
//! use studio_assist::gemini::{render_proposals, GeminiClient, ProposalGenerator};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = AppConfig::default();
//!     let client = GeminiClient::from_config(&config);
//!
//!     let proposals = client.brainstorm("Reduce onboarding time").await.unwrap();
//!     println!("{}", render_proposals(&proposals));
//! }
//! ```

pub mod brainstorm;
pub mod client;
pub mod envelope;
pub mod error;
pub mod speech;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use brainstorm::{render_proposals, Proposal, DELIVERABLES_PER_PROPOSAL, PROPOSAL_COUNT};
pub use client::{GeminiClient, ProposalGenerator, SpeechSynthesizer, API_KEY_HEADER};
pub use envelope::{GenerateContentRequest, GenerateContentResponse};
pub use error::ApiError;
pub use speech::SpeechAudio;
