//! meshconf Common Library
//!
//! Shared types, errors and SQLite persistence for the mesh membership store
//! and the wireless interface inventory.

pub mod db;
pub mod error;
pub mod types;

pub use db::Database;
pub use error::{Error, Result};
pub use types::*;

/// Environment variable overriding the store directory
pub const STORE_ENV: &str = "MESHCONF_HOME";

/// Default store path
pub fn default_store_path() -> std::path::PathBuf {
    std::env::var_os(STORE_ENV)
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|| std::path::PathBuf::from("/var/lib/meshconf"))
}
