//! babeld supervision
//!
//! Stops and starts the single babeld instance, waiting a fixed settle
//! timeout after each step, and verifies the result through the PID file
//! and the process filesystem. Signal delivery and the existence check are
//! best-effort; a process can exit between the two.

use crate::config::{BabeldConfig, DaemonConfig};
use crate::process::{DryRunProcessControl, ProcessControl, SystemProcessControl};
use meshconf_common::{Error, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Error shown when babeld is not alive after a start attempt
pub const NOT_RUNNING_MESSAGE: &str =
    "ERROR: babeld is not running!  Did it crash during or after startup?";

/// Result of checking a PID against the process filesystem
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    Running { pid: u32, message: String },
    NotRunning { message: String },
}

impl Verification {
    pub fn is_running(&self) -> bool {
        matches!(self, Verification::Running { .. })
    }

    pub fn message(&self) -> &str {
        match self {
            Verification::Running { message, .. } | Verification::NotRunning { message } => message,
        }
    }
}

/// Supervisor for the babeld process
pub struct Supervisor {
    babeld: BabeldConfig,
    proc_root: PathBuf,
    control: Arc<dyn ProcessControl>,
    shutdown: CancellationToken,
}

impl Supervisor {
    pub fn new(
        babeld: BabeldConfig,
        proc_root: impl Into<PathBuf>,
        control: Arc<dyn ProcessControl>,
    ) -> Self {
        Self {
            babeld,
            proc_root: proc_root.into(),
            control,
            shutdown: CancellationToken::new(),
        }
    }

    /// Build a supervisor from configuration, honouring `dry_run`
    pub fn from_config(config: &DaemonConfig) -> Self {
        let control: Arc<dyn ProcessControl> = if config.dry_run {
            info!("Dry-run mode: babeld will not be signalled or started");
            Arc::new(DryRunProcessControl::new())
        } else {
            Arc::new(SystemProcessControl)
        };
        Self::new(config.babeld.clone(), config.proc_root.clone(), control)
    }

    pub fn babeld(&self) -> &BabeldConfig {
        &self.babeld
    }

    /// Token that aborts any settle wait in progress, and all later ones
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Read the PID of babeld from its PID file.
    ///
    /// Returns `None` if the file does not exist or does not start with a
    /// decimal PID in `1..=i32::MAX`.
    pub fn current_pid(&self) -> Option<u32> {
        read_pid_file(&self.babeld.pid_file)
    }

    /// Terminate the running instance, if any, and wait for it to settle.
    ///
    /// Returns the PID that was signalled.
    pub async fn stop(&self) -> Result<Option<u32>> {
        let pid = self.current_pid();
        if let Some(pid) = pid {
            if let Err(e) = self.control.terminate(pid).await {
                warn!("Could not stop babeld: {}", e);
            }
            self.settle().await?;
        } else {
            debug!("babeld has no PID file, nothing to stop");
        }
        Ok(pid)
    }

    /// Launch `command` and wait for it to settle
    pub async fn start(&self, command: &[String]) -> Result<()> {
        info!("Restarting babeld");
        if let Err(e) = self.control.spawn(command).await {
            error!("Could not start babeld: {}", e);
        }
        self.settle().await
    }

    /// Stop the old instance and launch `command`
    pub async fn restart(&self, command: &[String]) -> Result<()> {
        self.apply(command, true).await
    }

    /// Stop the old instance, then launch `command` only when `launch` is set
    pub async fn apply(&self, command: &[String], launch: bool) -> Result<()> {
        self.stop().await?;
        if launch {
            self.start(command).await?;
        } else {
            info!("No interfaces left to route, leaving babeld stopped");
        }
        Ok(())
    }

    /// Check that `pid` belongs to a live process
    pub fn verify(&self, pid: u32) -> Verification {
        let proc_dir = self.proc_root.join(pid.to_string());
        if proc_dir.is_dir() {
            let message = format!(
                "{} has been successfully started with PID {}.",
                self.babeld.binary(),
                pid
            );
            info!("{}", message);
            Verification::Running { pid, message }
        } else {
            warn!("babeld PID {} has no entry in {:?}", pid, self.proc_root);
            Verification::NotRunning {
                message: NOT_RUNNING_MESSAGE.to_string(),
            }
        }
    }

    async fn settle(&self) -> Result<()> {
        let timeout = self.babeld.settle_timeout();
        debug!("Waiting {:?} for babeld to settle", timeout);
        tokio::select! {
            _ = tokio::time::sleep(timeout) => Ok(()),
            _ = self.shutdown.cancelled() => {
                warn!("Settle wait cancelled");
                Err(Error::Cancelled)
            }
        }
    }
}

fn read_pid_file(path: &Path) -> Option<u32> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
        Err(e) => {
            warn!("Could not read PID file {:?}: {}", path, e);
            return None;
        }
    };

    debug!("Reading PID of babeld");
    let line = content.lines().next().unwrap_or_default().trim();
    match line.parse::<i32>() {
        Ok(pid) if pid > 0 => {
            debug!("PID of babeld: {}", pid);
            Some(pid as u32)
        }
        _ => {
            warn!("PID file {:?} does not hold a PID: {:?}", path, line);
            None
        }
    }
}
