//! "Listen to summary" session: synthesize then play, with toggle-to-stop.
//!
//! [`SummaryPlayer`] owns the single playback slot.  Its methods take
//! `&mut self`, so two toggles cannot race: a toggle while a clip is playing
//! stops that clip instead of starting a second one.
//!
//! # Flow
//!
//! ```text
//! toggle(text)
//!   ├─ clip playing  → stop, wait            → Toggle::Stopped   [Idle]
//!   │                   (playback error)                          [Error]
//!   └─ otherwise     → synthesize            [Generating]
//!                      ├─ Ok  → PlaybackHandle::start → Toggle::Started [Playing]
//!                      └─ Err → record message                          [Error]
//! ```

use std::sync::Arc;

use thiserror::Error;

use crate::audio::{AbortFlag, AudioSink, PlaybackError, PlaybackHandle, PlaybackOutcome};
use crate::gemini::{ApiError, SpeechAudio, SpeechSynthesizer};

use super::state::ListenState;

// ---------------------------------------------------------------------------
// ListenError / Toggle
// ---------------------------------------------------------------------------

/// Failure of a listen session step.
#[derive(Debug, Error)]
pub enum ListenError {
    #[error("speech synthesis failed: {0}")]
    Api(#[from] ApiError),

    #[error("playback failed: {0}")]
    Playback(#[from] PlaybackError),
}

/// What a [`SummaryPlayer::toggle`] call did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Toggle {
    /// New speech was synthesized and playback started.
    Started(SpeechAudio),
    /// The playing clip was stopped.
    Stopped,
}

// ---------------------------------------------------------------------------
// SummaryPlayer
// ---------------------------------------------------------------------------

/// Toggle-style speech playback with at most one clip playing at a time.
pub struct SummaryPlayer<S> {
    synthesizer: S,
    sink: Arc<dyn AudioSink>,
    active: Option<PlaybackHandle>,
    state: ListenState,
    last_error: Option<String>,
}

impl<S: SpeechSynthesizer> SummaryPlayer<S> {
    pub fn new(synthesizer: S, sink: Arc<dyn AudioSink>) -> Self {
        Self {
            synthesizer,
            sink,
            active: None,
            state: ListenState::Idle,
            last_error: None,
        }
    }

    /// Current phase.  A clip that ended on its own reports
    /// [`ListenState::Idle`] even before it is collected by
    /// [`wait`](Self::wait) or [`toggle`](Self::toggle).
    pub fn state(&self) -> ListenState {
        if self.state == ListenState::Playing && !self.is_playing() {
            return ListenState::Idle;
        }
        self.state
    }

    /// Message of the most recent failure, cleared by the next successful
    /// start.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// `true` while a clip is still playing.
    pub fn is_playing(&self) -> bool {
        self.active.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Flag that stops the current clip when raised, e.g. from a signal
    /// handler.  `None` when nothing is playing.
    pub fn stop_signal(&self) -> Option<AbortFlag> {
        self.active.as_ref().map(PlaybackHandle::abort_flag)
    }

    /// Stop the current clip if one is playing, otherwise synthesize `text`
    /// and start playing it.
    pub async fn toggle(&mut self, text: &str) -> Result<Toggle, ListenError> {
        self.settle().await;

        if let Some(handle) = self.active.take() {
            match handle.stop_and_wait().await {
                Ok(outcome) => log::info!("playback stopped ({outcome:?})"),
                Err(e) => return Err(self.fail(e.into())),
            }
            self.state = ListenState::Idle;
            return Ok(Toggle::Stopped);
        }

        self.state = ListenState::Generating;
        let audio = match self.synthesizer.synthesize(text).await {
            Ok(audio) => audio,
            Err(e) => return Err(self.fail(e.into())),
        };

        self.active = Some(PlaybackHandle::start(
            Arc::clone(&self.sink),
            audio.wav.clone(),
        ));
        self.state = ListenState::Playing;
        self.last_error = None;
        Ok(Toggle::Started(audio))
    }

    /// Wait for the current clip to end.
    ///
    /// Returns `Ok(None)` when nothing was playing.
    pub async fn wait(&mut self) -> Result<Option<PlaybackOutcome>, ListenError> {
        let Some(handle) = self.active.take() else {
            return Ok(None);
        };
        self.finish(handle).await.map(Some)
    }

    /// Stop the current clip, if any, and wait for it to end.
    pub async fn stop(&mut self) -> Result<Option<PlaybackOutcome>, ListenError> {
        if let Some(handle) = &self.active {
            handle.stop();
        }
        self.wait().await
    }

    /// Collect a clip that ended on its own so its result is not lost.
    async fn settle(&mut self) {
        if self.active.as_ref().is_some_and(PlaybackHandle::is_finished) {
            if let Some(handle) = self.active.take() {
                if let Err(e) = self.finish(handle).await {
                    log::warn!("previous playback failed: {e}");
                }
            }
        }
    }

    async fn finish(&mut self, handle: PlaybackHandle) -> Result<PlaybackOutcome, ListenError> {
        match handle.wait().await {
            Ok(outcome) => {
                log::debug!("playback finished ({outcome:?})");
                self.state = ListenState::Idle;
                Ok(outcome)
            }
            Err(e) => Err(self.fail(e.into())),
        }
    }

    fn fail(&mut self, error: ListenError) -> ListenError {
        log::error!("listen to summary failed: {error}");
        self.state = ListenState::Error;
        self.last_error = Some(error.to_string());
        error
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::audio::MockSink;

    /// Returns a short clip, or fails, and counts calls.
    struct FakeSynth {
        fail: bool,
        calls: AtomicUsize,
    }

    impl FakeSynth {
        fn ok() -> Self {
            Self {
                fail: false,
                calls: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl SpeechSynthesizer for FakeSynth {
        async fn synthesize(&self, text: &str) -> Result<SpeechAudio, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(ApiError::MalformedResponse("no audio".into()));
            }
            if text.trim().is_empty() {
                return Err(ApiError::EmptyInput);
            }
            Ok(SpeechAudio::new(vec![0, 1, 2, 3], 24_000))
        }
    }

    #[tokio::test]
    async fn first_toggle_starts_second_stops() {
        let sink = Arc::new(MockSink::until_stopped());
        let mut player = SummaryPlayer::new(FakeSynth::ok(), sink.clone());

        let first = player.toggle("summary").await.unwrap();
        assert!(matches!(first, Toggle::Started(ref a) if a.sample_rate == 24_000));
        assert_eq!(player.state(), ListenState::Playing);
        assert!(player.is_playing());

        let second = player.toggle("summary").await.unwrap();
        assert_eq!(second, Toggle::Stopped);
        assert_eq!(player.state(), ListenState::Idle);
        assert!(!player.is_playing());

        // Stopping never triggers another synthesis.
        assert_eq!(player.synthesizer.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn finished_clip_lets_toggle_start_again() {
        let sink = Arc::new(MockSink::instant());
        let mut player = SummaryPlayer::new(FakeSynth::ok(), sink.clone());

        player.toggle("summary").await.unwrap();
        assert_eq!(player.wait().await.unwrap(), Some(PlaybackOutcome::Completed));
        assert_eq!(player.state(), ListenState::Idle);

        let again = player.toggle("summary").await.unwrap();
        assert!(matches!(again, Toggle::Started(_)));
        player.wait().await.unwrap();

        assert_eq!(sink.plays(), 2);
    }

    #[tokio::test]
    async fn synthesis_failure_sets_error_state() {
        let sink = Arc::new(MockSink::instant());
        let mut player = SummaryPlayer::new(FakeSynth::failing(), sink.clone());

        let err = player.toggle("summary").await.unwrap_err();
        assert!(matches!(err, ListenError::Api(ApiError::MalformedResponse(_))));
        assert_eq!(player.state(), ListenState::Error);
        assert!(player.last_error().unwrap().contains("no audio"));
        assert_eq!(sink.plays(), 0);
        assert!(player.stop_signal().is_none());
    }

    #[tokio::test]
    async fn stop_signal_ends_playback() {
        let sink = Arc::new(MockSink::until_stopped());
        let mut player = SummaryPlayer::new(FakeSynth::ok(), sink);

        player.toggle("summary").await.unwrap();
        player.stop_signal().expect("playing").raise();

        assert_eq!(player.wait().await.unwrap(), Some(PlaybackOutcome::Stopped));
        assert_eq!(player.state(), ListenState::Idle);
    }

    /// Holds until stopped, then reports a device failure.
    struct BrokenSink;

    impl AudioSink for BrokenSink {
        fn play(&self, _wav: &[u8], abort: &AbortFlag) -> Result<PlaybackOutcome, PlaybackError> {
            while !abort.is_raised() {
                std::thread::sleep(std::time::Duration::from_millis(1));
            }
            Err(PlaybackError::NoDevice)
        }
    }

    #[tokio::test]
    async fn clip_ending_on_its_own_reports_idle() {
        let mut player = SummaryPlayer::new(FakeSynth::ok(), Arc::new(MockSink::instant()));

        player.toggle("summary").await.unwrap();
        while player.is_playing() {
            tokio::time::sleep(std::time::Duration::from_millis(1)).await;
        }

        assert_eq!(player.state(), ListenState::Idle);
        assert_eq!(player.state().label(), "Listen to Summary");
    }

    #[tokio::test]
    async fn failure_while_stopping_sets_error_state() {
        let mut player = SummaryPlayer::new(FakeSynth::ok(), Arc::new(BrokenSink));

        player.toggle("summary").await.unwrap();
        let err = player.toggle("summary").await.unwrap_err();

        assert!(matches!(err, ListenError::Playback(PlaybackError::NoDevice)));
        assert_eq!(player.state(), ListenState::Error);
        assert!(player.last_error().unwrap().contains("no output device"));
        assert!(!player.is_playing());
    }

    #[tokio::test]
    async fn stop_without_playback_is_noop() {
        let mut player = SummaryPlayer::new(FakeSynth::ok(), Arc::new(MockSink::instant()));
        assert_eq!(player.stop().await.unwrap(), None);
        assert_eq!(player.state(), ListenState::Idle);
    }

    #[tokio::test]
    async fn started_clip_is_what_the_sink_receives() {
        let sink = Arc::new(MockSink::instant());
        let mut player = SummaryPlayer::new(FakeSynth::ok(), sink.clone());

        let Toggle::Started(audio) = player.toggle("summary").await.unwrap() else {
            panic!("expected start");
        };
        player.wait().await.unwrap();

        assert_eq!(sink.last_len(), audio.wav.len());
        assert_eq!(audio.mime_type(), "audio/wav");
    }
}
