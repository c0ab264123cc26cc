use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::process::{Child, ChildStdout, Command};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::RecorderError;

/// An invocable capture command: program plus the arguments that make it
/// emit raw s16le mono 44.1 kHz PCM on stdout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl CaptureCommand {
    pub fn new(program: impl Into<String>, args: &[&str]) -> Self {
        Self {
            program: program.into(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }
}

/// One entry in the capture tool preference list.
#[derive(Debug, Clone, Copy)]
pub struct CaptureTool {
    pub name: &'static str,
    program: &'static str,
    args: &'static [&'static str],
}

impl CaptureTool {
    pub fn command(&self) -> CaptureCommand {
        CaptureCommand::new(self.program, self.args)
    }
}

#[cfg(target_os = "macos")]
const FFMPEG_CAPTURE_ARGS: &[&str] = &[
    "-f", "avfoundation", "-i", ":0", "-ar", "44100", "-ac", "1", "-f", "s16le", "-",
];
#[cfg(not(target_os = "macos"))]
const FFMPEG_CAPTURE_ARGS: &[&str] = &[
    "-f", "alsa", "-i", "default", "-ar", "44100", "-ac", "1", "-f", "s16le", "-",
];

/// Preference order: dedicated recorder first, its `rec` alias, then the
/// general-purpose ffmpeg fallback.
pub const CAPTURE_TOOLS: &[CaptureTool] = &[
    CaptureTool {
        name: "sox",
        program: "sox",
        args: &[
            "-d", "-t", "raw", "-b", "16", "-e", "signed-integer", "-r", "44100", "-c", "1", "-",
        ],
    },
    CaptureTool {
        name: "rec",
        program: "rec",
        args: &[
            "-t", "raw", "-b", "16", "-e", "signed-integer", "-r", "44100", "-c", "1", "-",
        ],
    },
    CaptureTool {
        name: "ffmpeg",
        program: "ffmpeg",
        args: FFMPEG_CAPTURE_ARGS,
    },
];

/// First tool from the preference list whose binary is installed.
pub fn select_tool() -> Result<&'static CaptureTool, RecorderError> {
    select_tool_with(is_command_available)
}

pub fn select_tool_with(
    available: impl Fn(&str) -> bool,
) -> Result<&'static CaptureTool, RecorderError> {
    CAPTURE_TOOLS
        .iter()
        .find(|tool| available(tool.program))
        .ok_or_else(|| {
            let names: Vec<&str> = CAPTURE_TOOLS.iter().map(|t| t.name).collect();
            RecorderError::ToolUnavailable(format!("none of {} is installed", names.join(", ")))
        })
}

pub fn is_command_available(program: &str) -> bool {
    std::process::Command::new("which")
        .arg(program)
        .output()
        .map(|out| out.status.success())
        .unwrap_or(false)
}

/// A running capture process whose stdout carries the PCM stream.
///
/// The handle is shared between the session controller (which terminates)
/// and the capture task (which reaps after the stream drains).
#[derive(Clone)]
pub struct CaptureProcess {
    program: String,
    child: Arc<Mutex<Child>>,
}

impl CaptureProcess {
    /// Spawn the capture command with stdout piped. stderr is discarded so
    /// tool chatter does not interleave with operator output.
    pub fn spawn(command: &CaptureCommand) -> Result<(Self, ChildStdout), RecorderError> {
        let mut child = Command::new(&command.program)
            .args(&command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| RecorderError::io("spawning capture process", e))?;

        let stdout = child.stdout.take().ok_or_else(|| {
            RecorderError::io(
                "capturing process stdout",
                std::io::Error::new(std::io::ErrorKind::Other, "stdout was not piped"),
            )
        })?;

        info!("Capture process started: {}", command.program);

        Ok((
            Self {
                program: command.program.clone(),
                child: Arc::new(Mutex::new(child)),
            },
            stdout,
        ))
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Kill the process if it is still running. A process that has already
    /// exited makes this a no-op.
    pub async fn terminate(&self) {
        let mut child = self.child.lock().await;
        if let Err(e) = child.start_kill() {
            debug!("Capture process already exited: {}", e);
        }
    }

    /// Reap the process once its output stream has drained.
    pub async fn wait(&self) -> std::io::Result<std::process::ExitStatus> {
        let mut child = self.child.lock().await;
        child.wait().await
    }
}

/// Make sure at least one capture tool is installed, installing one through
/// the platform package manager when none is found. An install blocks for
/// its full duration.
pub async fn ensure_capture_tool() -> Result<(), RecorderError> {
    if CAPTURE_TOOLS
        .iter()
        .any(|tool| is_command_available(tool.program))
    {
        return Ok(());
    }

    warn!("No capture tool found, attempting install");
    install_capture_tool().await
}

async fn install_capture_tool() -> Result<(), RecorderError> {
    match std::env::consts::OS {
        "macos" => install_with_brew().await,
        "linux" => install_with_package_manager().await,
        os => Err(RecorderError::UnsupportedPlatform(os)),
    }
}

const BREW_PATHS: &[&str] = &["/opt/homebrew/bin/brew", "/usr/local/bin/brew"];

async fn install_with_brew() -> Result<(), RecorderError> {
    let brew = BREW_PATHS
        .iter()
        .find(|path| Path::new(**path).exists())
        .ok_or_else(|| {
            RecorderError::ToolUnavailable(
                "Homebrew is required to install a capture tool (https://brew.sh)".to_string(),
            )
        })?;

    if run_installer(brew, &["install", "sox"]).await? {
        return Ok(());
    }
    warn!("Failed to install sox, trying ffmpeg");
    if run_installer(brew, &["install", "ffmpeg"]).await? {
        return Ok(());
    }

    Err(RecorderError::ToolUnavailable(
        "brew could not install sox or ffmpeg".to_string(),
    ))
}

async fn install_with_package_manager() -> Result<(), RecorderError> {
    let manager = ["apt-get", "yum", "dnf"]
        .into_iter()
        .find(|manager| is_command_available(manager))
        .ok_or(RecorderError::UnsupportedPlatform(
            "this Linux distribution",
        ))?;

    if manager == "apt-get" && !run_installer("sudo", &["apt-get", "update"]).await? {
        warn!("apt-get update failed, continuing anyway");
    }

    if run_installer("sudo", &[manager, "install", "-y", "sox"]).await? {
        return Ok(());
    }
    warn!("Failed to install sox, trying ffmpeg");
    if run_installer("sudo", &[manager, "install", "-y", "ffmpeg"]).await? {
        return Ok(());
    }

    Err(RecorderError::ToolUnavailable(format!(
        "{manager} could not install sox or ffmpeg"
    )))
}

/// Run an installer with inherited stdio so the operator sees the package
/// manager's own progress output. Blocks until it exits.
async fn run_installer(program: &str, args: &[&str]) -> Result<bool, RecorderError> {
    info!("Running installer: {} {}", program, args.join(" "));
    let status = Command::new(program)
        .args(args)
        .status()
        .await
        .map_err(|e| RecorderError::io("running installer", e))?;
    Ok(status.success())
}
