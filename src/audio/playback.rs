//! Audio output via `cpal`.
//!
//! Playback is blocking work: an [`AudioSink`] plays one WAV clip to the end
//! or until its [`AbortFlag`] is raised.  [`PlaybackHandle::start`] runs the
//! sink on tokio's blocking pool and hands back a handle the caller owns;
//! [`PlaybackHandle::wait`] is the completion signal and
//! [`PlaybackHandle::stop`] requests an early end.
//!
//! [`CpalSink`] builds the `cpal::Stream` on the blocking thread and drops it
//! there, so the stream never crosses threads.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SizedSample};
use thiserror::Error;

use super::resample::{mono_to_interleaved, pcm16_to_f32, resample_linear};
use super::wav::{decode_wav, WavError};

/// How often the sink checks for completion or abort.
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Extra time given to the device to flush its last buffer.
const DRAIN_TAIL: Duration = Duration::from_millis(150);

// ---------------------------------------------------------------------------
// AbortFlag
// ---------------------------------------------------------------------------

/// Shared "stop requested" flag.  Cloning shares the same flag.
#[derive(Debug, Clone, Default)]
pub struct AbortFlag(Arc<AtomicBool>);

impl AbortFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

// ---------------------------------------------------------------------------
// PlaybackError / PlaybackOutcome
// ---------------------------------------------------------------------------

/// Errors that can occur while setting up or running audio output.
#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("no output device found on the default audio host")]
    NoDevice,

    #[error("failed to query default output config: {0}")]
    DefaultConfig(#[from] cpal::DefaultStreamConfigError),

    #[error("failed to build output stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error("failed to start audio stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),

    #[error("unsupported device sample format: {0}")]
    SampleFormat(String),

    #[error("invalid WAV clip: {0}")]
    InvalidWav(#[from] WavError),

    /// The blocking playback task panicked or was cancelled.
    #[error("playback task failed: {0}")]
    Join(String),
}

/// How a playback ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackOutcome {
    /// Every sample was played.
    Completed,
    /// The abort flag was raised first.
    Stopped,
}

// ---------------------------------------------------------------------------
// AudioSink trait
// ---------------------------------------------------------------------------

/// Plays a WAV clip, blocking the calling thread.
///
/// Implementations must check `abort` at least every few tens of
/// milliseconds and return [`PlaybackOutcome::Stopped`] once it is raised.
pub trait AudioSink: Send + Sync {
    fn play(&self, wav: &[u8], abort: &AbortFlag) -> Result<PlaybackOutcome, PlaybackError>;
}

// ---------------------------------------------------------------------------
// CpalSink
// ---------------------------------------------------------------------------

/// Plays clips on the system default output device.
#[derive(Debug, Clone, Copy, Default)]
pub struct CpalSink;

impl CpalSink {
    pub fn new() -> Self {
        Self
    }
}

impl AudioSink for CpalSink {
    fn play(&self, wav: &[u8], abort: &AbortFlag) -> Result<PlaybackOutcome, PlaybackError> {
        let (header, samples) = decode_wav(wav)?;

        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(PlaybackError::NoDevice)?;

        let supported = device.default_output_config()?;
        let sample_format = supported.sample_format();
        let channels = supported.channels();
        let device_rate = supported.sample_rate().0;
        let config: cpal::StreamConfig = supported.into();

        log::debug!(
            "playing {} samples @ {} Hz on {} ch @ {} Hz ({:?})",
            samples.len(),
            header.sample_rate,
            channels,
            device_rate,
            sample_format
        );

        let mono = resample_linear(&pcm16_to_f32(&samples), header.sample_rate, device_rate);
        let frames = Arc::new(mono_to_interleaved(&mono, channels));
        let cursor = Arc::new(AtomicUsize::new(0));
        let total = frames.len();

        let stream = match sample_format {
            cpal::SampleFormat::F32 => {
                build_stream::<f32>(&device, &config, Arc::clone(&frames), Arc::clone(&cursor))?
            }
            cpal::SampleFormat::I16 => {
                build_stream::<i16>(&device, &config, Arc::clone(&frames), Arc::clone(&cursor))?
            }
            cpal::SampleFormat::U16 => {
                build_stream::<u16>(&device, &config, Arc::clone(&frames), Arc::clone(&cursor))?
            }
            other => return Err(PlaybackError::SampleFormat(format!("{other:?}"))),
        };

        stream.play()?;

        loop {
            if abort.is_raised() {
                log::debug!("playback stopped by request");
                return Ok(PlaybackOutcome::Stopped);
            }
            if cursor.load(Ordering::Relaxed) >= total {
                std::thread::sleep(DRAIN_TAIL);
                return Ok(PlaybackOutcome::Completed);
            }
            std::thread::sleep(POLL_INTERVAL);
        }
    }
}

/// Output stream that copies `frames` into the device buffer, padding with
/// silence once the clip is exhausted.
fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    frames: Arc<Vec<f32>>,
    cursor: Arc<AtomicUsize>,
) -> Result<cpal::Stream, cpal::BuildStreamError>
where
    T: SizedSample + FromSample<f32>,
{
    device.build_output_stream(
        config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
            let start = cursor.load(Ordering::Relaxed);
            for (i, out) in data.iter_mut().enumerate() {
                let sample = frames.get(start + i).copied().unwrap_or(0.0);
                *out = <T as Sample>::from_sample(sample);
            }
            cursor.store(start + data.len(), Ordering::Relaxed);
        },
        |err: cpal::StreamError| {
            log::error!("cpal output stream error: {err}");
        },
        None,
    )
}

// ---------------------------------------------------------------------------
// PlaybackHandle
// ---------------------------------------------------------------------------

/// An in-flight playback owned by the caller.
///
/// Dropping the handle does not stop playback; call [`stop`](Self::stop).
pub struct PlaybackHandle {
    abort: AbortFlag,
    task: tokio::task::JoinHandle<Result<PlaybackOutcome, PlaybackError>>,
}

impl PlaybackHandle {
    /// Start playing `wav` on `sink` from tokio's blocking pool.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(sink: Arc<dyn AudioSink>, wav: Vec<u8>) -> Self {
        let abort = AbortFlag::new();
        let flag = abort.clone();
        let task = tokio::task::spawn_blocking(move || sink.play(&wav, &flag));
        Self { abort, task }
    }

    /// Ask the sink to stop.  Returns immediately; use [`wait`](Self::wait)
    /// to observe the end.
    pub fn stop(&self) {
        self.abort.raise();
    }

    /// A clone of the flag [`stop`](Self::stop) raises.
    pub fn abort_flag(&self) -> AbortFlag {
        self.abort.clone()
    }

    /// `true` once the sink has returned.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the sink to return.
    pub async fn wait(self) -> Result<PlaybackOutcome, PlaybackError> {
        self.task
            .await
            .map_err(|e| PlaybackError::Join(e.to_string()))?
    }

    /// Stop and wait.
    pub async fn stop_and_wait(self) -> Result<PlaybackOutcome, PlaybackError> {
        self.stop();
        self.wait().await
    }
}

// ---------------------------------------------------------------------------
// MockSink  (test-only)
// ---------------------------------------------------------------------------

/// A sink that plays nothing.
///
/// [`MockSink::instant`] completes at once; [`MockSink::until_stopped`] blocks
/// until the abort flag is raised.
#[cfg(test)]
pub struct MockSink {
    hold: bool,
    plays: AtomicUsize,
    last_len: AtomicUsize,
}

#[cfg(test)]
impl MockSink {
    pub fn instant() -> Self {
        Self {
            hold: false,
            plays: AtomicUsize::new(0),
            last_len: AtomicUsize::new(0),
        }
    }

    pub fn until_stopped() -> Self {
        Self {
            hold: true,
            ..Self::instant()
        }
    }

    /// Number of `play` calls so far.
    pub fn plays(&self) -> usize {
        self.plays.load(Ordering::SeqCst)
    }

    /// Byte length of the most recent clip.
    pub fn last_len(&self) -> usize {
        self.last_len.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
impl AudioSink for MockSink {
    fn play(&self, wav: &[u8], abort: &AbortFlag) -> Result<PlaybackOutcome, PlaybackError> {
        super::wav::WavHeader::parse(wav)?;
        self.plays.fetch_add(1, Ordering::SeqCst);
        self.last_len.store(wav.len(), Ordering::SeqCst);

        if !self.hold {
            return Ok(PlaybackOutcome::Completed);
        }
        while !abort.is_raised() {
            std::thread::sleep(Duration::from_millis(1));
        }
        Ok(PlaybackOutcome::Stopped)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
