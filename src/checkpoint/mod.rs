//! Checkpoint Module
//!
//! Triggers a process snapshot through a host-provided runtime and
//! classifies what came back.
//!
//! A successful snapshot suspends the whole process and resumes it later, so
//! from the caller's side [`CheckpointTrigger::trigger`] normally never
//! returns. When it does, the result is a [`CheckpointOutcome`].

use std::io::ErrorKind;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;
use tracing::{error, info, warn};

// == Snapshot Runtime ==
/// Why a snapshot attempt did not suspend the process.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    /// The runtime tried and failed
    #[error("{0}")]
    Checkpoint(String),

    /// The runtime cannot snapshot at all
    #[error("{0}")]
    Unsupported(String),
}

/// Host facility that can snapshot and later restore this process.
#[async_trait]
pub trait SnapshotRuntime: Send + Sync {
    /// Snapshot the process. Returning `Ok` means the process was not suspended.
    async fn checkpoint_restore(&self) -> Result<(), SnapshotError>;
}

/// Runtime used when no snapshot facility is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnsupportedRuntime;

#[async_trait]
impl SnapshotRuntime for UnsupportedRuntime {
    async fn checkpoint_restore(&self) -> Result<(), SnapshotError> {
        Err(SnapshotError::Unsupported(
            "no snapshot runtime configured for this process".to_string(),
        ))
    }
}

// == Command Runtime ==
/// Placeholder in a command line replaced by the current process id.
pub const PID_PLACEHOLDER: &str = "{pid}";

/// Delegates the snapshot to an external command (a CRIU wrapper, say).
///
/// The command line is split on whitespace; [`PID_PLACEHOLDER`] in any
/// argument is replaced by this process's id.
#[derive(Debug, Clone)]
pub struct CommandRuntime {
    program: String,
    args: Vec<String>,
}

impl CommandRuntime {
    /// Parses a command line; `None` when it is blank.
    pub fn parse(command_line: &str) -> Option<Self> {
        let mut parts = command_line.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self {
            program,
            args: parts.collect(),
        })
    }
}

#[async_trait]
impl SnapshotRuntime for CommandRuntime {
    async fn checkpoint_restore(&self) -> Result<(), SnapshotError> {
        let pid = std::process::id().to_string();
        let args: Vec<String> = self
            .args
            .iter()
            .map(|arg| arg.replace(PID_PLACEHOLDER, &pid))
            .collect();

        info!("Running snapshot command: {} {:?}", self.program, args);
        let output = Command::new(&self.program)
            .args(&args)
            .output()
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound | ErrorKind::PermissionDenied => SnapshotError::Unsupported(
                    format!("snapshot command '{}' unavailable: {}", self.program, e),
                ),
                _ => SnapshotError::Checkpoint(e.to_string()),
            })?;

        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let message = if stderr.is_empty() {
            format!("snapshot command exited with {}", output.status)
        } else {
            stderr
        };
        Err(SnapshotError::Checkpoint(message))
    }
}

// == Checkpoint Trigger ==
/// How a checkpoint request ended, given that it returned at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckpointOutcome {
    /// The runtime reported a failed snapshot
    Failed(String),
    /// Snapshots are not available here
    Unsupported(String),
    /// The runtime returned without suspending the process
    UnexpectedReturn,
}

/// Entry point for the admin checkpoint operation.
///
/// Owns the configured [`SnapshotRuntime`] and maps whatever it returns to a
/// [`CheckpointOutcome`].
pub struct CheckpointTrigger {
    runtime: Arc<dyn SnapshotRuntime>,
}

impl CheckpointTrigger {
    /// Creates a trigger over an explicit runtime.
    pub fn new(runtime: Arc<dyn SnapshotRuntime>) -> Self {
        Self { runtime }
    }

    /// Uses [`CommandRuntime`] when a command is configured, else [`UnsupportedRuntime`].
    pub fn from_command(command_line: Option<&str>) -> Self {
        match command_line.and_then(CommandRuntime::parse) {
            Some(runtime) => Self::new(Arc::new(runtime)),
            None => Self::new(Arc::new(UnsupportedRuntime)),
        }
    }

    /// Asks the runtime to snapshot the process.
    ///
    /// Only returns when the snapshot did not happen: a normal return is
    /// [`CheckpointOutcome::UnexpectedReturn`] and is logged as a warning.
    pub async fn trigger(&self) -> CheckpointOutcome {
        info!("Initiating checkpoint...");
        match self.runtime.checkpoint_restore().await {
            Ok(()) => {
                warn!("Checkpoint returned unexpectedly - the process was not suspended");
                CheckpointOutcome::UnexpectedReturn
            }
            Err(SnapshotError::Checkpoint(message)) => {
                error!("Checkpoint failed: {}", message);
                CheckpointOutcome::Failed(message)
            }
            Err(SnapshotError::Unsupported(message)) => {
                warn!("Checkpoint not supported in current environment: {}", message);
                CheckpointOutcome::Unsupported(message)
            }
        }
    }
}
