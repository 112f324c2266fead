//! Configuration module for studio-assist.
//!
//! Provides `AppConfig` (top-level settings), sub-configs for the API,
//! retry, speech and playback layers, `AppPaths` for the platform config
//! directory, and TOML persistence via `AppConfig::load` / `AppConfig::save`.

pub mod paths;
pub mod settings;

pub use paths::AppPaths;
pub use settings::{
    ApiConfig, AppConfig, PlaybackConfig, RetryConfig, SpeechConfig, API_KEY_ENV,
};
