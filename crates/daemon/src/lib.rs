//! meshconf core
//!
//! Supervises the babeld routing daemon and keeps the set of mesh interfaces
//! on its command line in step with the persisted membership store.

pub mod command;
pub mod config;
pub mod process;
pub mod reconciler;
pub mod registry;
pub mod service;
pub mod state;
pub mod supervisor;

pub use command::build_command;
pub use config::{BabeldConfig, DaemonConfig};
pub use process::{DryRunProcessControl, ProcessAction, ProcessControl, SystemProcessControl};
pub use reconciler::{Reconciler, NO_WIRELESS_MESSAGE, OFFLINE_MESSAGE};
pub use registry::{InterfaceRegistry, NetworkRegistry};
pub use service::MeshService;
pub use state::MeshState;
pub use supervisor::{Supervisor, Verification, NOT_RUNNING_MESSAGE};
