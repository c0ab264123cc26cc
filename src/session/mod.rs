//! Capture session management
//!
//! This module provides the `CaptureSession` abstraction that manages:
//! - The external capture process and its PCM stream
//! - The background capture loop filling the session buffer
//! - The Idle → Recording → Stopping → Encoding state machine
//! - Encoding and best-effort compression of the captured audio
//! - Live session statistics for progress display

mod config;
mod session;
mod stats;

pub use config::SessionConfig;
pub use session::{CaptureSession, SessionState};
pub use stats::SessionStats;
