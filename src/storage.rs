//! Persistence of a titled session: directory naming, artifact placement,
//! transcript and summary files.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use tracing::{info, warn};

use crate::audio::AudioArtifact;

const AUDIO_STEM: &str = "recording";
const TRANSCRIPT_FILE: &str = "transcript.txt";
const SUMMARY_FILE: &str = "summary.txt";

/// Characters replaced with `_` so a title can name a directory anywhere.
const RESERVED: &[char] = &['/', '\\', ':', '*', '?', '|', '<', '>', '"'];

/// Files written for one completed session.
#[derive(Debug)]
pub struct PersistedSession {
    pub dir: PathBuf,
    pub audio_path: PathBuf,
    /// `None` when the transcript could not be written (non-fatal).
    pub transcript_path: Option<PathBuf>,
    pub summary_path: PathBuf,
}

/// Directory name for a titled session: the sanitized title suffixed with
/// the session's start timestamp.
pub fn session_dir_name(title: &str, started_at: DateTime<Local>) -> String {
    let clean: String = title
        .chars()
        .map(|c| if RESERVED.contains(&c) { '_' } else { c })
        .collect();
    format!("{}_{}", clean, started_at.format("%Y-%m-%d_%H-%M-%S"))
}

/// Move the artifact into its titled session directory and write the
/// transcript and summary files next to it.
///
/// A failed artifact move is fatal; a failed transcript write is logged
/// and skipped so the audio and summary still land.
pub fn persist_session(
    output_dir: &Path,
    title: &str,
    started_at: DateTime<Local>,
    artifact: &AudioArtifact,
    transcript: &str,
    summary: &str,
) -> Result<PersistedSession> {
    let dir = output_dir.join(session_dir_name(title, started_at));
    fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create session directory {}", dir.display()))?;

    let extension = artifact
        .path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("wav");
    let audio_path = dir.join(format!("{AUDIO_STEM}.{extension}"));
    fs::rename(&artifact.path, &audio_path)
        .with_context(|| format!("failed to move audio file to {}", audio_path.display()))?;

    let transcript_path = dir.join(TRANSCRIPT_FILE);
    let transcript_path = match fs::write(&transcript_path, transcript) {
        Ok(()) => Some(transcript_path),
        Err(e) => {
            warn!("Failed to save transcript: {}", e);
            None
        }
    };

    let summary_path = dir.join(SUMMARY_FILE);
    let content = format!(
        "Meeting: {}\nDate: {}\n\n{}",
        title,
        started_at.format("%Y-%m-%d %H:%M:%S"),
        unescape_newlines(summary)
    );
    fs::write(&summary_path, content).context("failed to save summary")?;

    info!("Session persisted to {}", dir.display());

    Ok(PersistedSession {
        dir,
        audio_path,
        transcript_path,
        summary_path,
    })
}

/// Summaries arrive with literal `\n` escape sequences inside the
/// provider's JSON string; turn them into real line breaks before display
/// or storage.
pub fn unescape_newlines(summary: &str) -> String {
    summary.replace("\\n", "\n")
}
