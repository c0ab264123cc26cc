use thiserror::Error;

/// Terminal conditions for a capture session and its provider pipeline.
#[derive(Debug, Error)]
pub enum RecorderError {
    /// No capture tool installed and installation did not produce one.
    #[error("capture tool unavailable: {0}")]
    ToolUnavailable(String),

    /// No supported package manager on this OS, so nothing to install with.
    #[error("automatic tool install is not supported on {0}")]
    UnsupportedPlatform(&'static str),

    /// The capture loop exited without appending a single byte. Not a
    /// failure: callers are expected to restart a fresh session.
    #[error("no audio captured")]
    NoAudioCaptured,

    /// Non-success response from the transcription/summarization provider.
    #[error("provider returned status {status}: {body}")]
    Provider { status: u16, body: String },

    /// Filesystem or process error, fatal to the current session only.
    #[error("{stage} failed: {source}")]
    Io {
        stage: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("wav encoding failed: {0}")]
    Encode(#[from] hound::Error),
}

impl RecorderError {
    pub fn io(stage: &'static str, source: std::io::Error) -> Self {
        Self::Io { stage, source }
    }
}
