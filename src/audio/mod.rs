pub mod buffer;
pub mod capture;
pub mod compress;
pub mod encoder;

pub use buffer::CaptureBuffer;
pub use capture::{CaptureCommand, CaptureProcess, CaptureTool, CAPTURE_TOOLS};
pub use compress::compress_for_upload;
pub use encoder::write_wav;

use std::path::PathBuf;

use serde::Serialize;

/// Capture format every tool in the preference list is configured to emit:
/// signed 16-bit little-endian mono PCM.
pub const SAMPLE_RATE: u32 = 44_100;
pub const CHANNELS: u16 = 1;
pub const BITS_PER_SAMPLE: u16 = 16;

/// The audio file a finished session produced.
///
/// Ownership of the file transfers with the value: once the session is
/// titled, the artifact is moved into its permanent session directory.
#[derive(Debug, Clone, Serialize)]
pub struct AudioArtifact {
    pub path: PathBuf,
    pub size_bytes: u64,
    pub format: ArtifactFormat,
    pub sample_rate_hz: u32,
    pub channels: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactFormat {
    /// Uncompressed WAV straight from the encoder.
    Wav,
    /// Lossy MP3 transcoded for upload.
    Compressed,
}
