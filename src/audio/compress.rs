use std::fs;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use anyhow::{bail, Context, Result};
use tokio::process::Command;
use tracing::info;

use super::capture::is_command_available;

/// Sample rate of the transcoded upload artifact.
pub const UPLOAD_SAMPLE_RATE: u32 = 16_000;

/// Transcode a WAV into a small mono MP3 sized for network upload while
/// staying intelligible for transcription.
///
/// On success the source WAV is deleted and the MP3 path returned, so the
/// two are never both retained. Callers treat any error as "keep the WAV":
/// compression is strictly best-effort and must never fail the session.
pub async fn compress_for_upload(input: &Path) -> Result<PathBuf> {
    compress_with(input, is_command_available).await
}

pub async fn compress_with(input: &Path, available: impl Fn(&str) -> bool) -> Result<PathBuf> {
    let output = compressed_path(input);

    let rate = UPLOAD_SAMPLE_RATE.to_string();
    let mut command = if available("ffmpeg") {
        let mut c = Command::new("ffmpeg");
        c.arg("-i")
            .arg(input)
            .args(["-codec:a", "libmp3lame", "-b:a", "64k", "-ac", "1", "-ar", &rate, "-y"])
            .arg(&output);
        c
    } else if available("sox") {
        let mut c = Command::new("sox");
        c.arg(input)
            .args(["-C", "64", "-r", &rate, "-c", "1"])
            .arg(&output);
        c
    } else {
        bail!("no compression tool available (ffmpeg or sox required)");
    };

    let status = command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .context("failed to run compression tool")?;

    if !status.success() {
        let _ = fs::remove_file(&output);
        bail!("compression tool exited with {status}");
    }

    let compressed = fs::metadata(&output).context("failed to stat compressed file")?;
    if compressed.len() == 0 {
        let _ = fs::remove_file(&output);
        bail!("compression produced an empty file");
    }
    let original = fs::metadata(input).context("failed to stat original file")?;

    info!(
        "Audio compressed: {:.1} MB -> {:.1} MB ({:.1}x reduction)",
        megabytes(original.len()),
        megabytes(compressed.len()),
        original.len() as f64 / compressed.len() as f64
    );

    fs::remove_file(input).context("failed to remove uncompressed file")?;
    Ok(output)
}

fn compressed_path(input: &Path) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    input.with_file_name(format!("{stem}_compressed.mp3"))
}

fn megabytes(bytes: u64) -> f64 {
    bytes as f64 / 1024.0 / 1024.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compressed_path_sits_next_to_the_input() {
        let path = compressed_path(Path::new("/tmp/staging/session-1.wav"));
        assert_eq!(path, Path::new("/tmp/staging/session-1_compressed.mp3"));
    }
}
