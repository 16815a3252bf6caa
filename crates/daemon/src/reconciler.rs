//! Mesh membership reconciliation
//!
//! Combines the membership store, the command builder and the supervisor
//! into the enable and disable workflows, and decides what gets persisted.
//! Callers must not run two workflows at once; see [`crate::service`].

use crate::config::DaemonConfig;
use crate::registry::{InterfaceRegistry, NetworkRegistry};
use crate::state::MeshState;
use crate::supervisor::{Supervisor, Verification, NOT_RUNNING_MESSAGE};
use meshconf_common::{
    Enabled, InterfaceEntry, InterfaceState, MeshOverview, MeshRequest, Outcome,
    OutcomeStatus, Protocol, Result,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Output of a disable that leaves no interface routed
pub const OFFLINE_MESSAGE: &str = "Mesh node offline.";

/// Overview error when the inventory has no wireless interfaces
pub const NO_WIRELESS_MESSAGE: &str =
    "ERROR: No wireless network interfaces have been configured yet.";

/// Reconciler that keeps babeld's command line and the membership store in step
pub struct Reconciler {
    state: MeshState,
    registry: Arc<dyn InterfaceRegistry>,
    supervisor: Supervisor,
}

impl Reconciler {
    pub fn new(
        state: MeshState,
        registry: Arc<dyn InterfaceRegistry>,
        supervisor: Supervisor,
    ) -> Self {
        Self {
            state,
            registry,
            supervisor,
        }
    }

    /// Open both databases and build the supervisor from configuration
    pub fn from_config(config: &DaemonConfig) -> Result<Self> {
        let state = MeshState::open(config.mesh_db_path())?;
        let registry = NetworkRegistry::open(config.network_db_path())?;
        Ok(Self::new(
            state,
            Arc::new(registry),
            Supervisor::from_config(config),
        ))
    }

    pub fn state(&self) -> &MeshState {
        &self.state
    }

    pub fn supervisor(&self) -> &Supervisor {
        &self.supervisor
    }

    /// Classify every known wireless interface, creating a disabled
    /// membership record for configured interfaces that have none.
    pub fn survey(&self) -> Result<MeshOverview> {
        let wireless = self.registry.wireless_interfaces()?;
        if wireless.is_empty() {
            warn!("No wireless interfaces configured");
            return Ok(MeshOverview {
                error: Some(NO_WIRELESS_MESSAGE.to_string()),
                interfaces: Vec::new(),
            });
        }

        let mut interfaces = Vec::with_capacity(wireless.len());
        for w in wireless {
            let state = if w.enabled.is_yes() {
                match self.state.get(&w.mesh_interface)? {
                    None => {
                        info!("Adding mesh record for {}", w.mesh_interface);
                        self.state.ensure_record(&w.mesh_interface, Protocol::Babel)?;
                        InterfaceState::Available
                    }
                    Some(record) if record.enabled.is_yes() => InterfaceState::Active,
                    Some(_) => InterfaceState::Available,
                }
            } else {
                InterfaceState::Unconfigured
            };

            interfaces.push(InterfaceEntry {
                interface: w.mesh_interface,
                state,
            });
        }

        Ok(MeshOverview {
            error: None,
            interfaces,
        })
    }

    /// Context for adding `interface` to the mesh
    pub fn prepare_enable(&self, interface: &str) -> MeshRequest {
        MeshRequest::new(interface, Enabled::No)
    }

    /// Context for removing `interface` from the mesh
    pub fn prepare_disable(&self, interface: &str) -> MeshRequest {
        MeshRequest::new(interface, Enabled::Yes)
    }

    /// Restart babeld with `request.interface` added to the routed set.
    ///
    /// The record is switched to `yes` only once babeld is verified running.
    pub async fn enable(&self, request: &MeshRequest) -> Result<Outcome> {
        info!("Enabling {} on {}", request.protocol, request.interface);

        let mut interfaces = self.state.routed_interfaces(request.protocol)?;
        if interfaces.contains(&request.interface) {
            warn!("{} is already routed, not adding it twice", request.interface);
        } else {
            interfaces.push(request.interface.clone());
        }

        let command = self.supervisor.babeld().command_for(&interfaces);
        let mut outcome = new_outcome(request, command);

        if let Err(e) = self.supervisor.restart(&outcome.command).await {
            outcome.error = Some(e.to_string());
            return Ok(outcome);
        }

        outcome.pid = self.supervisor.current_pid();
        match outcome.pid.map(|pid| self.supervisor.verify(pid)) {
            Some(Verification::Running { message, .. }) => {
                self.state
                    .set_enabled(&request.interface, request.protocol, Enabled::Yes)?;
                outcome.status = OutcomeStatus::Success;
                outcome.output = Some(message);
                outcome.committed = Some(Enabled::Yes);
            }
            Some(Verification::NotRunning { message }) => {
                outcome.error = Some(message);
            }
            None => {
                warn!("babeld left no PID file after restart");
                outcome.error = Some(NOT_RUNNING_MESSAGE.to_string());
            }
        }

        Ok(outcome)
    }

    /// Restart babeld without `request.interface`, or leave it stopped when
    /// nothing else is routed.
    ///
    /// The record is switched to `no` only when no PID file is left after the
    /// change. If babeld was relaunched for other interfaces and left no PID
    /// file, the commit still happens but the outcome is `Failed`. A PID that
    /// fails verification is reported without touching the store, and a
    /// verified restart leaves the record as it was.
    pub async fn disable(&self, request: &MeshRequest) -> Result<Outcome> {
        info!("Disabling {} on {}", request.protocol, request.interface);

        let interfaces: Vec<String> = self
            .state
            .routed_interfaces(request.protocol)?
            .into_iter()
            .filter(|i| *i != request.interface)
            .collect();

        let command = self.supervisor.babeld().command_for(&interfaces);
        let mut outcome = new_outcome(request, command);

        if interfaces.is_empty() {
            outcome.output = Some(OFFLINE_MESSAGE.to_string());
        } else {
            debug!("Remaining mesh interfaces: {}", interfaces.join(" "));
        }

        if let Err(e) = self
            .supervisor
            .apply(&outcome.command, !interfaces.is_empty())
            .await
        {
            outcome.error = Some(e.to_string());
            return Ok(outcome);
        }

        outcome.pid = self.supervisor.current_pid();
        match outcome.pid {
            Some(pid) => match self.supervisor.verify(pid) {
                Verification::Running { message, .. } => {
                    outcome.status = OutcomeStatus::Success;
                    outcome.output = Some(message);
                }
                Verification::NotRunning { message } => {
                    outcome.error = Some(message);
                }
            },
            None => {
                self.state
                    .set_enabled(&request.interface, request.protocol, Enabled::No)?;
                outcome.committed = Some(Enabled::No);

                if interfaces.is_empty() {
                    outcome.status = OutcomeStatus::Offline;
                } else {
                    // The interface is out of the mesh, but the rest are not routed
                    warn!(
                        "babeld left no PID file while {} interface(s) remain",
                        interfaces.len()
                    );
                    outcome.error = Some(NOT_RUNNING_MESSAGE.to_string());
                }
            }
        }

        Ok(outcome)
    }
}

fn new_outcome(request: &MeshRequest, command: Vec<String>) -> Outcome {
    Outcome {
        status: OutcomeStatus::Failed,
        interface: request.interface.clone(),
        protocol: request.protocol,
        output: None,
        error: None,
        pid: None,
        command,
        committed: None,
    }
}
