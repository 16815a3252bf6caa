//! Process control for the routing daemon
//!
//! Signal delivery and spawning sit behind [`ProcessControl`] so the
//! supervisor can run against a real babeld or in dry-run mode.

use async_trait::async_trait;
use meshconf_common::{Error, Result};
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use parking_lot::Mutex;
use std::process::Stdio;
use tracing::{debug, info};

/// Side effects the supervisor performs on the daemon process
#[async_trait]
pub trait ProcessControl: Send + Sync {
    /// Ask the process to exit
    async fn terminate(&self, pid: u32) -> Result<()>;

    /// Launch `command` in the background. `command[0]` is the program.
    async fn spawn(&self, command: &[String]) -> Result<()>;
}

/// Signals and launches real processes
#[derive(Debug, Default)]
pub struct SystemProcessControl;

#[async_trait]
impl ProcessControl for SystemProcessControl {
    async fn terminate(&self, pid: u32) -> Result<()> {
        // Zero and negative PIDs address process groups
        let raw = match i32::try_from(pid) {
            Ok(raw) if raw > 0 => raw,
            _ => {
                return Err(Error::Signal {
                    pid,
                    reason: "not a valid process id".to_string(),
                })
            }
        };

        info!("Killing babeld (PID {})", pid);
        kill(Pid::from_raw(raw), Signal::SIGTERM).map_err(|e| Error::Signal {
            pid,
            reason: e.to_string(),
        })
    }

    async fn spawn(&self, command: &[String]) -> Result<()> {
        let (program, args) = command
            .split_first()
            .ok_or_else(|| Error::Internal("empty daemon command".to_string()))?;

        info!("Starting {}", program);

        // babeld daemonizes itself; the runtime reaps the dropped child.
        let child = tokio::process::Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| Error::Spawn {
                program: program.clone(),
                reason: e.to_string(),
            })?;

        debug!("Spawned {} with launcher PID {:?}", program, child.id());
        Ok(())
    }
}

/// An action a [`DryRunProcessControl`] pretended to perform
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessAction {
    Terminate(u32),
    Spawn(Vec<String>),
}

/// Logs and records actions without touching any process
#[derive(Debug, Default)]
pub struct DryRunProcessControl {
    actions: Mutex<Vec<ProcessAction>>,
}

impl DryRunProcessControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Actions recorded so far, oldest first
    pub fn actions(&self) -> Vec<ProcessAction> {
        self.actions.lock().clone()
    }

    pub fn spawned(&self) -> Vec<Vec<String>> {
        self.actions
            .lock()
            .iter()
            .filter_map(|a| match a {
                ProcessAction::Spawn(command) => Some(command.clone()),
                ProcessAction::Terminate(_) => None,
            })
            .collect()
    }
}

#[async_trait]
impl ProcessControl for DryRunProcessControl {
    async fn terminate(&self, pid: u32) -> Result<()> {
        debug!("Pretending to kill babeld (PID {})", pid);
        self.actions.lock().push(ProcessAction::Terminate(pid));
        Ok(())
    }

    async fn spawn(&self, command: &[String]) -> Result<()> {
        debug!("Pretending to start babeld: {}", command.join(" "));
        self.actions.lock().push(ProcessAction::Spawn(command.to_vec()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_dry_run_records_in_order() {
        let control = DryRunProcessControl::new();
        control.terminate(4242).await.unwrap();
        control
            .spawn(&["babeld".to_string(), "wlan0".to_string()])
            .await
            .unwrap();

        assert_eq!(
            control.actions(),
            vec![
                ProcessAction::Terminate(4242),
                ProcessAction::Spawn(vec!["babeld".to_string(), "wlan0".to_string()]),
            ]
        );
        assert_eq!(control.spawned().len(), 1);
    }

    #[tokio::test]
    async fn test_system_terminate_rejects_out_of_range_pid() {
        for pid in [0, u32::MAX, 3_000_000_000] {
            let err = SystemProcessControl.terminate(pid).await.unwrap_err();
            assert!(matches!(err, Error::Signal { pid: p, .. } if p == pid));
        }
    }

    #[tokio::test]
    async fn test_system_spawn_rejects_empty_command() {
        let err = SystemProcessControl.spawn(&[]).await.unwrap_err();
        assert!(matches!(err, Error::Internal(_)));
    }

    #[tokio::test]
    async fn test_system_spawn_missing_binary() {
        let err = SystemProcessControl
            .spawn(&["/nonexistent/babeld".to_string()])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("/nonexistent/babeld"));
    }
}
