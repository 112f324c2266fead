//! Application entry point for `studio-assist`.
//!
//! # Startup sequence
//!
//! 1. Parse the command line.
//! 2. Initialise logging.
//! 3. Load [`AppConfig`] from `--config` or the platform settings file
//!    (defaults on first run).
//! 4. Create the [`tokio`] runtime (multi-thread, 2 workers).
//! 5. Build the [`GeminiClient`] from config and run the subcommand.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use studio_assist::{
    audio::CpalSink,
    config::AppConfig,
    gemini::{render_proposals, GeminiClient, ProposalGenerator, SpeechAudio, SpeechSynthesizer},
    pipeline::{SummaryPlayer, Toggle},
};

// ---------------------------------------------------------------------------
// Command line
// ---------------------------------------------------------------------------

#[derive(Debug, Parser)]
#[command(name = "studio-assist", version, about = "Project brainstorming and spoken summaries")]
struct Cli {
    /// Settings file to use instead of the platform default.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Turn a business goal into three project proposals.
    Brainstorm {
        /// The business goal, e.g. "reduce customer churn by 10%".
        #[arg(required = true, num_args = 1..)]
        goal: Vec<String>,
    },

    /// Read the studio summary (or custom text) aloud.
    Speak {
        /// Text to speak instead of the configured summary.
        #[arg(long)]
        text: Option<String>,

        /// Also write the synthesized audio to this WAV file.
        #[arg(long, value_name = "PATH")]
        save: Option<PathBuf>,

        /// Synthesize without playing.
        #[arg(long)]
        no_play: bool,
    },
}

// ---------------------------------------------------------------------------
// Subcommands
// ---------------------------------------------------------------------------

async fn brainstorm(config: &AppConfig, goal: &str) -> Result<()> {
    let client = GeminiClient::from_config(config);
    let proposals = client
        .brainstorm(goal)
        .await
        .context("brainstorm request failed")?;

    println!("{}", render_proposals(&proposals));
    Ok(())
}

async fn speak(
    config: &AppConfig,
    text: Option<String>,
    save: Option<PathBuf>,
    no_play: bool,
) -> Result<()> {
    let text = text.unwrap_or_else(|| config.speech.summary.clone());
    let client = GeminiClient::from_config(config);

    if no_play || !config.playback.enabled {
        let audio = client
            .synthesize(&text)
            .await
            .context("speech synthesis failed")?;
        report(&audio);
        if let Some(path) = save {
            write_wav(&path, &audio)?;
        }
        return Ok(());
    }

    let mut player = SummaryPlayer::new(client, Arc::new(CpalSink::new()));
    match player.toggle(&text).await.context("could not start speech")? {
        Toggle::Started(audio) => {
            report(&audio);
            if let Some(path) = save {
                write_wav(&path, &audio)?;
            }
        }
        Toggle::Stopped => return Ok(()),
    }

    if let Some(abort) = player.stop_signal() {
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                log::info!("Ctrl-C received, stopping playback");
                abort.raise();
            }
        });
    }

    let outcome = player.wait().await.context("playback failed")?;
    log::info!("playback ended: {outcome:?} ({})", player.state().label());
    Ok(())
}

fn report(audio: &SpeechAudio) {
    println!(
        "{:.1}s of speech @ {} Hz ({} bytes {})",
        audio.duration().as_secs_f32(),
        audio.sample_rate,
        audio.wav.len(),
        audio.mime_type()
    );
}

fn write_wav(path: &Path, audio: &SpeechAudio) -> Result<()> {
    std::fs::write(path, &audio.wav)
        .with_context(|| format!("failed to write {}", path.display()))?;
    log::info!("wrote {}", path.display());
    Ok(())
}

fn load_config(path: Option<&Path>) -> AppConfig {
    let result = match path {
        Some(path) => AppConfig::load_from(path),
        None => AppConfig::load(),
    };
    result.unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        AppConfig::default()
    })
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    // 1. Command line
    let cli = Cli::parse();

    // 2. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::debug!("studio-assist starting up");

    // 3. Configuration
    let config = load_config(cli.config.as_deref());

    // 4. Tokio runtime
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .context("failed to create tokio runtime")?;

    // 5. Run
    rt.block_on(async {
        match cli.command {
            Command::Brainstorm { goal } => brainstorm(&config, &goal.join(" ")).await,
            Command::Speak {
                text,
                save,
                no_play,
            } => speak(&config, text, save, no_play).await,
        }
    })
}
