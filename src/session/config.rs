use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::audio::capture::CaptureCommand;

/// Configuration for a capture session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Unique session identifier, used in log lines and staging filenames
    pub session_id: String,

    /// Directory receiving the artifact before the session is titled
    pub staging_dir: PathBuf,

    /// Bytes read from the capture stream per loop iteration
    pub read_chunk_bytes: usize,

    /// Transcode the WAV for upload after encoding
    pub compress: bool,

    /// Explicit capture command, bypassing tool selection. Used for
    /// non-microphone sources and tests; `None` picks the first available
    /// tool from the preference list.
    pub capture_command: Option<CaptureCommand>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            session_id: format!("session-{}", uuid::Uuid::new_v4()),
            staging_dir: PathBuf::from("recordings"),
            read_chunk_bytes: 4096,
            compress: true,
            capture_command: None,
        }
    }
}
