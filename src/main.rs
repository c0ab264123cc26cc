use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use shortstory::{storage, CaptureSession, Config, ProviderClient, RecorderError, SessionConfig};

/// Delay before automatically restarting after an empty capture.
const NO_AUDIO_RETRY_DELAY: Duration = Duration::from_secs(3);

#[derive(Parser)]
#[command(
    name = "shortstory",
    about = "Record a voice session, then transcribe and summarize it"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Record a session and run it through transcription and summarization
    Record,
    /// Print the active configuration
    Config,
    /// Store the provider API key
    SetKey { key: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command.unwrap_or(Command::Record) {
        Command::Record => record(config).await,
        Command::Config => {
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(())
        }
        Command::SetKey { key } => {
            let mut config = config;
            config.openai_api_key = key;
            config.save()?;
            info!("API key saved");
            Ok(())
        }
    }
}

async fn record(config: Config) -> Result<()> {
    if !config.has_valid_token() {
        bail!("no API key configured; run `shortstory set-key <key>` first");
    }

    let output_dir = PathBuf::from(&config.save_location);

    loop {
        let session_config = SessionConfig {
            staging_dir: output_dir.join("recordings"),
            ..SessionConfig::default()
        };
        let mut session = CaptureSession::new(session_config);

        session.start().await?;
        println!("Recording... press Enter to stop.");

        let mut enter = tokio::spawn(wait_for_enter());
        loop {
            tokio::select! {
                res = &mut enter => {
                    res.context("stdin task panicked")??;
                    break;
                }
                _ = tokio::time::sleep(Duration::from_secs(1)) => {
                    let stats = session.stats();
                    info!(
                        "Recording: {:.0}s, {} KiB captured",
                        stats.elapsed_secs,
                        stats.bytes_captured / 1024
                    );
                }
            }
        }

        session.stop().await?;

        let artifact = match session.save_and_encode().await {
            Ok(artifact) => artifact,
            Err(RecorderError::NoAudioCaptured) => {
                warn!(
                    "No audio captured, restarting in {}s",
                    NO_AUDIO_RETRY_DELAY.as_secs()
                );
                tokio::time::sleep(NO_AUDIO_RETRY_DELAY).await;
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        let provider = ProviderClient::new(config.openai_api_key.clone());
        let transcript = provider
            .transcribe(&artifact.path, &config.language, &config.model)
            .await?;
        let summary = provider.summarize(&transcript).await?;

        let started_local = session.started_at().with_timezone(&Local);
        let persisted = storage::persist_session(
            &output_dir,
            &summary.title,
            started_local,
            &artifact,
            &transcript,
            &summary.summary,
        )?;

        println!("\n{}\n", summary.title);
        println!("{}", storage::unescape_newlines(&summary.summary));
        println!("\nSaved to {}", persisted.dir.display());
        return Ok(());
    }
}

async fn wait_for_enter() -> Result<()> {
    let mut line = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut line)
        .await
        .context("failed to read stdin")?;
    Ok(())
}
