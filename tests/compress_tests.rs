// Integration tests for the best-effort compression stage.

use anyhow::Result;
use shortstory::audio::compress::compress_with;
use shortstory::audio::encoder::write_wav;
use tempfile::TempDir;

#[tokio::test]
async fn missing_tool_keeps_wav_untouched() -> Result<()> {
    let dir = TempDir::new()?;
    let wav = dir.path().join("session.wav");

    let pcm: Vec<u8> = (0..=255).collect();
    write_wav(&wav, &pcm)?;
    let original = std::fs::read(&wav)?;

    let result = compress_with(&wav, |_| false).await;
    assert!(result.is_err());

    // The uncompressed artifact is retained, byte for byte, and no
    // compressed sibling appears.
    assert_eq!(std::fs::read(&wav)?, original);
    assert_eq!(std::fs::read_dir(dir.path())?.count(), 1);

    Ok(())
}
