//! Core types for meshconf

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Whether an interface is switched on, stored as `yes`/`no`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Enabled {
    Yes,
    No,
}

impl Default for Enabled {
    fn default() -> Self {
        Self::No
    }
}

impl Enabled {
    pub fn as_str(&self) -> &'static str {
        match self {
            Enabled::Yes => "yes",
            Enabled::No => "no",
        }
    }

    pub fn is_yes(&self) -> bool {
        matches!(self, Enabled::Yes)
    }
}

impl std::fmt::Display for Enabled {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Enabled {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "yes" => Ok(Enabled::Yes),
            "no" => Ok(Enabled::No),
            other => Err(Error::InvalidValue {
                field: "enabled".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

/// Mesh routing protocol. Only babel is supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Protocol {
    Babel,
}

impl Default for Protocol {
    fn default() -> Self {
        Self::Babel
    }
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Babel => "babel",
        }
    }
}

impl std::fmt::Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Protocol {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "babel" => Ok(Protocol::Babel),
            other => Err(Error::InvalidValue {
                field: "protocol".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

/// Persisted membership of one wireless interface in the mesh
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeshInterfaceRecord {
    pub interface: String,
    pub protocol: Protocol,
    pub enabled: Enabled,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Filter for listing membership records. `None` fields match anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MeshFilter {
    pub interface: Option<String>,
    pub protocol: Option<Protocol>,
    pub enabled: Option<Enabled>,
}

impl MeshFilter {
    /// Records the daemon is supposed to be routing right now
    pub fn routed(protocol: Protocol) -> Self {
        Self {
            interface: None,
            protocol: Some(protocol),
            enabled: Some(Enabled::Yes),
        }
    }

    pub fn interface(name: impl Into<String>) -> Self {
        Self {
            interface: Some(name.into()),
            ..Default::default()
        }
    }
}

/// A wireless interface as reported by the network configuration store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WirelessInterface {
    /// Client-facing interface name
    pub interface: String,
    /// Name of the interface used for mesh routing
    pub mesh_interface: String,
    /// Whether the network configuration has been applied
    pub enabled: Enabled,
}

/// Request-scoped context for a single enable or disable operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeshRequest {
    pub interface: String,
    pub protocol: Protocol,
    /// Membership state of the interface when the request was prepared
    pub enabled: Enabled,
}

impl MeshRequest {
    pub fn new(interface: impl Into<String>, enabled: Enabled) -> Self {
        Self {
            interface: interface.into(),
            protocol: Protocol::Babel,
            enabled,
        }
    }
}

/// Overall result of an enable or disable workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    /// The daemon was verified running
    Success,
    /// babeld was left stopped with no interface to route
    Offline,
    /// The daemon could not be verified
    Failed,
}

impl std::fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutcomeStatus::Success => write!(f, "success"),
            OutcomeStatus::Offline => write!(f, "offline"),
            OutcomeStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Structured result handed to whatever presents it to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub status: OutcomeStatus,
    pub interface: String,
    pub protocol: Protocol,
    /// Informational or success message
    pub output: Option<String>,
    /// Error message, set when `status` is `Failed`
    pub error: Option<String>,
    /// PID read back from the PID file after the restart
    pub pid: Option<u32>,
    /// Daemon command line that was (or would have been) launched
    pub command: Vec<String>,
    /// Value written to the membership store, if any
    pub committed: Option<Enabled>,
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        self.status != OutcomeStatus::Failed
    }

    /// The message a caller should show: the error if any, else the output
    pub fn message(&self) -> &str {
        self.error
            .as_deref()
            .or(self.output.as_deref())
            .unwrap_or_default()
    }
}

/// How an interface shows up in the mesh overview
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterfaceState {
    /// Currently routed by the daemon
    Active,
    /// Configured and ready to join the mesh
    Available,
    /// Detected but its network configuration is not applied yet
    Unconfigured,
}

impl std::fmt::Display for InterfaceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InterfaceState::Active => write!(f, "active"),
            InterfaceState::Available => write!(f, "available"),
            InterfaceState::Unconfigured => write!(f, "unconfigured"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceEntry {
    pub interface: String,
    pub state: InterfaceState,
}

/// Snapshot of mesh membership across all known wireless interfaces
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeshOverview {
    pub error: Option<String>,
    pub interfaces: Vec<InterfaceEntry>,
}

impl MeshOverview {
    pub fn with_state(&self, state: InterfaceState) -> impl Iterator<Item = &InterfaceEntry> {
        self.interfaces.iter().filter(move |e| e.state == state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enabled_parse_and_display() {
        assert_eq!("yes".parse::<Enabled>().unwrap(), Enabled::Yes);
        assert_eq!("no".parse::<Enabled>().unwrap(), Enabled::No);
        assert!("Yes".parse::<Enabled>().is_err());
        assert_eq!(Enabled::Yes.to_string(), "yes");
        assert_eq!(Enabled::default(), Enabled::No);
    }

    #[test]
    fn test_protocol_rejects_unknown() {
        assert_eq!("babel".parse::<Protocol>().unwrap(), Protocol::Babel);
        let err = "olsr".parse::<Protocol>().unwrap_err();
        assert!(err.to_string().contains("olsr"));
    }

    #[test]
    fn test_routed_filter() {
        let filter = MeshFilter::routed(Protocol::Babel);
        assert_eq!(filter.enabled, Some(Enabled::Yes));
        assert_eq!(filter.interface, None);
        assert_eq!(MeshFilter::interface("wlan0").enabled, None);
    }

    #[test]
    fn test_outcome_message_prefers_error() {
        let mut outcome = Outcome {
            status: OutcomeStatus::Offline,
            interface: "wlan0".to_string(),
            protocol: Protocol::Babel,
            output: Some("offline".to_string()),
            error: None,
            pid: None,
            command: Vec::new(),
            committed: None,
        };
        assert!(outcome.is_success());
        assert_eq!(outcome.message(), "offline");

        outcome.status = OutcomeStatus::Failed;
        outcome.error = Some("not running".to_string());
        assert!(!outcome.is_success());
        assert_eq!(outcome.message(), "not running");
    }

    #[test]
    fn test_overview_with_state() {
        let overview = MeshOverview {
            error: None,
            interfaces: vec![
                InterfaceEntry {
                    interface: "wlan0".to_string(),
                    state: InterfaceState::Active,
                },
                InterfaceEntry {
                    interface: "wlan1".to_string(),
                    state: InterfaceState::Available,
                },
            ],
        };
        let active: Vec<_> = overview.with_state(InterfaceState::Active).collect();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].interface, "wlan0");
    }
}
