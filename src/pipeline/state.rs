//! State machine of the "listen to summary" feature.
//!
//! ```text
//! Idle ──toggle──▶ Generating ──speech ready──▶ Playing ──clip ends──▶ Idle
//! Playing ──toggle──▶ Idle                     (stop)
//! Generating / Playing ──failure──▶ Error ──toggle──▶ Generating
//! ```

/// Phase of a [`crate::pipeline::SummaryPlayer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListenState {
    /// Nothing generating or playing.
    #[default]
    Idle,

    /// The speech request is in flight.
    Generating,

    /// A clip is playing.
    Playing,

    /// The last request or playback failed.  The next toggle starts over.
    Error,
}

impl ListenState {
    /// Label for the toggle control in this state.
    pub fn label(&self) -> &'static str {
        match self {
            ListenState::Idle => "Listen to Summary",
            ListenState::Generating => "Generating...",
            ListenState::Playing => "Stop Listening",
            ListenState::Error => "Error!",
        }
    }
}
