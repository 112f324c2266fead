//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across tasks.
//! Every section is `#[serde(default)]`, so a settings file only needs the
//! keys the user wants to change.

use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;
use crate::http::RetryPolicy;

/// Environment variable that overrides [`ApiConfig::api_key`].
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

// ---------------------------------------------------------------------------
// ApiConfig
// ---------------------------------------------------------------------------

/// Connection settings for the hosted generative-language API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the API, without a trailing `/v1beta`.
    pub base_url: String,
    /// API key sent as the `x-goog-api-key` header.  `None` means the key
    /// must come from the `GEMINI_API_KEY` environment variable.
    pub api_key: Option<String>,
    /// Model used for the brainstorm (structured JSON) request.
    pub text_model: String,
    /// Model used for speech synthesis.
    pub tts_model: String,
    /// Per-request timeout in seconds.  A timeout counts as a transport
    /// failure and is retried.
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com".into(),
            api_key: None,
            text_model: "gemini-2.5-flash-preview-09-2025".into(),
            tts_model: "gemini-2.5-flash-preview-tts".into(),
            timeout_secs: 30,
        }
    }
}

impl ApiConfig {
    /// The key to send, preferring the environment over the settings file.
    ///
    /// Empty strings are treated as "no key".
    pub fn resolved_api_key(&self) -> Option<String> {
        self.api_key_with_env(std::env::var(API_KEY_ENV).ok())
    }

    /// [`resolved_api_key`](Self::resolved_api_key) with the environment
    /// value passed in.  A blank `env` falls through to the file key.
    fn api_key_with_env(&self, env: Option<String>) -> Option<String> {
        let non_blank = |k: &String| !k.trim().is_empty();
        env.filter(non_blank)
            .or_else(|| self.api_key.clone().filter(non_blank))
    }
}

// ---------------------------------------------------------------------------
// RetryConfig
// ---------------------------------------------------------------------------

/// Backoff settings applied to every API call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts per call, including the first one.
    pub max_attempts: u32,
    /// Delay unit in milliseconds; attempt `k` waits `2^k` units.
    pub base_delay_ms: u64,
    /// Upper bound of the random jitter added to each delay, in milliseconds.
    pub max_jitter_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 1_000,
            max_jitter_ms: 500,
        }
    }
}

impl RetryConfig {
    /// Convert to the policy consumed by [`crate::http::RetryingClient`].
    pub fn to_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.max_attempts,
            Duration::from_millis(self.base_delay_ms),
            Duration::from_millis(self.max_jitter_ms),
        )
    }
}

// ---------------------------------------------------------------------------
// SpeechConfig
// ---------------------------------------------------------------------------

/// Text-to-speech settings for the "listen to summary" feature.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    /// Prebuilt voice name requested from the speech model.
    pub voice: String,
    /// Paragraph spoken by `studio-assist speak` when no `--text` is given.
    pub summary: String,
    /// Sample rate assumed when the returned MIME type carries no usable
    /// `rate=` parameter.
    pub default_sample_rate: u32,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            voice: "Charon".into(),
            summary: "We design, build and operate custom software for growing \
                      businesses: cloud-native web platforms, data pipelines and \
                      AI-assisted workflows, delivered by a senior team that \
                      stays with you from the first workshop to production."
                .into(),
            default_sample_rate: crate::audio::DEFAULT_SAMPLE_RATE,
        }
    }
}

// ---------------------------------------------------------------------------
// PlaybackConfig
// ---------------------------------------------------------------------------

/// Local audio output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Play synthesized audio on the default output device.
    pub enabled: bool,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// # Persistence
///
/// ```rust,no_run
/// use studio_assist::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
///
/// // Modify and save to an explicit path
/// config.save_to(std::path::Path::new("settings.toml")).unwrap();
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// API endpoint and credential settings.
    pub api: ApiConfig,
    /// Retry / backoff settings.
    pub retry: RetryConfig,
    /// Speech synthesis settings.
    pub speech: SpeechConfig,
    /// Audio output settings.
    pub playback: PlaybackConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path.
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
