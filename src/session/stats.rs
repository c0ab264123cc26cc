use chrono::{DateTime, Utc};
use serde::Serialize;

use super::session::SessionState;

/// Live view of a capture session for progress display.
///
/// `elapsed_secs` and `bytes_captured` are best-effort snapshots taken
/// while the capture task may still be appending; they become exact once
/// the session has stopped.
#[derive(Debug, Clone, Serialize)]
pub struct SessionStats {
    pub state: SessionState,

    /// When the recording started
    pub started_at: DateTime<Utc>,

    /// Seconds since the recording started
    pub elapsed_secs: f64,

    /// Bytes of raw PCM captured so far
    pub bytes_captured: usize,
}
