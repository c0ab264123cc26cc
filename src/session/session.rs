use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::io::AsyncReadExt;
use tokio::process::ChildStdout;
use tokio::sync::oneshot;
use tracing::{error, info, warn};

use super::config::SessionConfig;
use super::stats::SessionStats;
use crate::audio::capture::{self, CaptureProcess};
use crate::audio::{
    compress, encoder, ArtifactFormat, AudioArtifact, CaptureBuffer, CHANNELS, SAMPLE_RATE,
};
use crate::error::RecorderError;

/// Lifecycle of one capture session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    Recording,
    Stopping,
    Encoding,
    Done,
    /// The capture loop exited without producing a single byte. Terminal
    /// for this session, but callers are expected to start a fresh one.
    NoAudio,
    Failed,
}

/// One microphone capture session: owns the capture process, the PCM
/// buffer, and the state machine from start through encode.
///
/// The design supports exactly one active session. Starting a second
/// session while one is recording is a caller contract violation, not a
/// runtime condition this type recovers from.
pub struct CaptureSession {
    config: SessionConfig,
    state: SessionState,
    started_at: DateTime<Utc>,
    buffer: Arc<CaptureBuffer>,
    stop_flag: Arc<AtomicBool>,
    process: Option<CaptureProcess>,
    done_rx: Option<oneshot::Receiver<()>>,
}

impl CaptureSession {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            state: SessionState::Idle,
            started_at: Utc::now(),
            buffer: Arc::new(CaptureBuffer::new()),
            stop_flag: Arc::new(AtomicBool::new(false)),
            process: None,
            done_rx: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn session_id(&self) -> &str {
        &self.config.session_id
    }

    /// Start capturing. Requires `Idle`. Resolves the capture tool
    /// (installing one through the package manager if possible, which may
    /// block for the install's full duration), spawns the capture process
    /// and the read loop, then returns while capture continues in the
    /// background.
    pub async fn start(&mut self) -> Result<(), RecorderError> {
        if self.state != SessionState::Idle {
            warn!("start ignored: session is {:?}", self.state);
            return Ok(());
        }

        match self.spawn_capture().await {
            Ok(()) => Ok(()),
            Err(e) => {
                self.state = SessionState::Failed;
                error!("Session {} failed to start: {}", self.config.session_id, e);
                Err(e)
            }
        }
    }

    async fn spawn_capture(&mut self) -> Result<(), RecorderError> {
        let command = match &self.config.capture_command {
            Some(command) => command.clone(),
            None => {
                capture::ensure_capture_tool().await?;
                capture::select_tool()?.command()
            }
        };

        let (process, stdout) = CaptureProcess::spawn(&command)?;

        self.started_at = Utc::now();
        self.state = SessionState::Recording;

        let buffer = Arc::clone(&self.buffer);
        let stop_flag = Arc::clone(&self.stop_flag);
        let chunk_bytes = self.config.read_chunk_bytes;
        let loop_process = process.clone();
        let (done_tx, done_rx) = oneshot::channel();

        tokio::spawn(async move {
            capture_loop(stdout, buffer, stop_flag, chunk_bytes).await;
            if let Err(e) = loop_process.wait().await {
                error!("Failed to reap capture process: {}", e);
            }
            // Fires exactly once, whatever ended the loop.
            let _ = done_tx.send(());
        });

        self.process = Some(process);
        self.done_rx = Some(done_rx);

        info!("Recording started: {}", self.config.session_id);
        Ok(())
    }

    /// Stop capturing. Kills the capture process, then waits for the
    /// capture task's done signal, so no encode can ever overlap a live
    /// loop. Normally returns within the kill-then-drain latency.
    pub async fn stop(&mut self) -> Result<(), RecorderError> {
        if self.state != SessionState::Recording {
            warn!("stop ignored: session is {:?}", self.state);
            return Ok(());
        }

        self.state = SessionState::Stopping;
        self.stop_flag.store(true, Ordering::SeqCst);

        if let Some(process) = &self.process {
            process.terminate().await;
        }
        if let Some(done) = self.done_rx.take() {
            let _ = done.await;
        }

        info!(
            "Recording stopped: {} ({} bytes captured)",
            self.config.session_id,
            self.buffer.len()
        );
        Ok(())
    }

    /// Encode the captured PCM to WAV and, when enabled, compress it for
    /// upload. Only valid once `stop` has returned.
    ///
    /// An empty buffer parks the session in `NoAudio` and returns
    /// `NoAudioCaptured`; no file is created. Any I/O failure parks it in
    /// `Failed` with the cause attached.
    pub async fn save_and_encode(&mut self) -> Result<AudioArtifact, RecorderError> {
        let pcm = self.buffer.take();
        if pcm.is_empty() {
            self.state = SessionState::NoAudio;
            return Err(RecorderError::NoAudioCaptured);
        }

        self.state = SessionState::Encoding;
        match self.encode(&pcm).await {
            Ok(artifact) => {
                self.state = SessionState::Done;
                info!(
                    "Session {} done: {} ({} bytes)",
                    self.config.session_id,
                    artifact.path.display(),
                    artifact.size_bytes
                );
                Ok(artifact)
            }
            Err(e) => {
                self.state = SessionState::Failed;
                error!("Session {} failed to encode: {}", self.config.session_id, e);
                Err(e)
            }
        }
    }

    async fn encode(&self, pcm: &[u8]) -> Result<AudioArtifact, RecorderError> {
        std::fs::create_dir_all(&self.config.staging_dir)
            .map_err(|e| RecorderError::io("creating staging directory", e))?;

        let wav_path = self
            .config
            .staging_dir
            .join(format!("{}.wav", self.config.session_id));
        encoder::write_wav(&wav_path, pcm)?;

        let (path, format, sample_rate_hz) = if self.config.compress {
            match compress::compress_for_upload(&wav_path).await {
                Ok(mp3) => (mp3, ArtifactFormat::Compressed, compress::UPLOAD_SAMPLE_RATE),
                Err(e) => {
                    warn!("Compression failed, keeping WAV: {:#}", e);
                    (wav_path, ArtifactFormat::Wav, SAMPLE_RATE)
                }
            }
        } else {
            (wav_path, ArtifactFormat::Wav, SAMPLE_RATE)
        };

        let size_bytes = std::fs::metadata(&path)
            .map_err(|e| RecorderError::io("reading artifact size", e))?
            .len();

        Ok(AudioArtifact {
            path,
            size_bytes,
            format,
            sample_rate_hz,
            channels: CHANNELS,
        })
    }

    /// Elapsed time and buffer size, safe to call while the capture task is
    /// running. Values are weakly consistent until `stop` has returned.
    pub fn stats(&self) -> SessionStats {
        let elapsed = Utc::now().signed_duration_since(self.started_at);
        SessionStats {
            state: self.state,
            started_at: self.started_at,
            elapsed_secs: elapsed.num_milliseconds() as f64 / 1000.0,
            bytes_captured: self.buffer.len(),
        }
    }
}

/// Read fixed-size chunks from the capture stream into the buffer until
/// the stop flag is set, the stream ends, or a read fails. Partial data
/// from an errored stream is kept, not discarded.
async fn capture_loop(
    mut stdout: ChildStdout,
    buffer: Arc<CaptureBuffer>,
    stop_flag: Arc<AtomicBool>,
    chunk_bytes: usize,
) {
    let mut chunk = vec![0u8; chunk_bytes];
    loop {
        if stop_flag.load(Ordering::SeqCst) {
            break;
        }
        match stdout.read(&mut chunk).await {
            Ok(0) => break,
            Ok(n) => buffer.append(&chunk[..n]),
            Err(e) => {
                error!("Error reading capture stream: {}", e);
                break;
            }
        }
    }
}
