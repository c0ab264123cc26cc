// Integration tests for session directory naming and persistence.

use anyhow::Result;
use chrono::{Local, TimeZone};
use shortstory::audio::{ArtifactFormat, AudioArtifact};
use shortstory::storage::{persist_session, session_dir_name, unescape_newlines};
use tempfile::TempDir;

fn fixed_timestamp() -> chrono::DateTime<Local> {
    Local.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()
}

fn artifact_at(path: std::path::PathBuf, format: ArtifactFormat) -> AudioArtifact {
    AudioArtifact {
        path,
        size_bytes: 8,
        format,
        sample_rate_hz: 44100,
        channels: 1,
    }
}

#[test]
fn dir_name_sanitizes_and_appends_timestamp() {
    assert_eq!(
        session_dir_name("Q3 Plan/Review", fixed_timestamp()),
        "Q3 Plan_Review_2024-01-02_03-04-05"
    );
}

#[test]
fn every_reserved_character_is_replaced() {
    assert_eq!(
        session_dir_name(r#"a/b\c:d*e?f|g<h>i"j"#, fixed_timestamp()),
        "a_b_c_d_e_f_g_h_i_j_2024-01-02_03-04-05"
    );
}

#[test]
fn persist_moves_artifact_and_writes_files() -> Result<()> {
    let staging = TempDir::new()?;
    let output = TempDir::new()?;

    let artifact_path = staging.path().join("session.wav");
    std::fs::write(&artifact_path, b"RIFFdata")?;
    let artifact = artifact_at(artifact_path.clone(), ArtifactFormat::Wav);

    let persisted = persist_session(
        output.path(),
        "Weekly Sync",
        fixed_timestamp(),
        &artifact,
        "hello transcript",
        "line one\\nline two",
    )?;

    assert!(!artifact_path.exists(), "artifact should have been moved");

    let expected_dir = output.path().join("Weekly Sync_2024-01-02_03-04-05");
    assert_eq!(persisted.dir, expected_dir);
    assert_eq!(persisted.audio_path, expected_dir.join("recording.wav"));
    assert_eq!(std::fs::read(&persisted.audio_path)?, b"RIFFdata");

    let transcript_path = persisted.transcript_path.expect("transcript written");
    assert_eq!(std::fs::read_to_string(transcript_path)?, "hello transcript");

    assert_eq!(
        std::fs::read_to_string(&persisted.summary_path)?,
        "Meeting: Weekly Sync\nDate: 2024-01-02 03:04:05\n\nline one\nline two"
    );

    Ok(())
}

#[test]
fn compressed_artifact_keeps_its_extension() -> Result<()> {
    let staging = TempDir::new()?;
    let output = TempDir::new()?;

    let artifact_path = staging.path().join("session_compressed.mp3");
    std::fs::write(&artifact_path, b"ID3.data")?;
    let artifact = artifact_at(artifact_path, ArtifactFormat::Compressed);

    let persisted = persist_session(
        output.path(),
        "Standup",
        fixed_timestamp(),
        &artifact,
        "t",
        "s",
    )?;

    assert_eq!(
        persisted.audio_path,
        output
            .path()
            .join("Standup_2024-01-02_03-04-05")
            .join("recording.mp3")
    );

    Ok(())
}

#[test]
fn unescape_turns_literal_sequences_into_line_breaks() {
    assert_eq!(unescape_newlines("a\\nb\\nc"), "a\nb\nc");
    assert_eq!(unescape_newlines("no escapes"), "no escapes");
}
