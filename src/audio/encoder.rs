use std::path::Path;

use hound::{SampleFormat, WavSpec, WavWriter};
use tracing::info;

use super::{BITS_PER_SAMPLE, CHANNELS, SAMPLE_RATE};
use crate::error::RecorderError;

/// Write raw little-endian 16-bit mono PCM bytes as a WAV file, returning
/// the number of samples written.
///
/// Consecutive byte pairs become one signed 16-bit sample; a trailing odd
/// byte carries half a sample and is dropped. The write is all-or-nothing:
/// on any error the file at `path` must be treated as invalid.
pub fn write_wav(path: &Path, pcm: &[u8]) -> Result<usize, RecorderError> {
    let spec = WavSpec {
        channels: CHANNELS,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: BITS_PER_SAMPLE,
        sample_format: SampleFormat::Int,
    };

    let mut writer = WavWriter::create(path, spec)?;
    for pair in pcm.chunks_exact(2) {
        writer.write_sample(i16::from_le_bytes([pair[0], pair[1]]))?;
    }
    writer.finalize()?;

    let samples = pcm.len() / 2;
    info!(
        "Wrote {} samples ({:.2}s) to {}",
        samples,
        samples as f64 / SAMPLE_RATE as f64,
        path.display()
    );

    Ok(samples)
}
