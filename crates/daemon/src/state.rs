//! Mesh membership state

use meshconf_common::{
    Database, Enabled, MeshFilter, MeshInterfaceRecord, Protocol, Result,
};
use std::path::Path;
use tracing::{debug, warn};

/// Membership store adapter over the `meshes` table
#[derive(Clone)]
pub struct MeshState {
    db: Database,
}

impl MeshState {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(Database::open(path)?))
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn list(&self, filter: &MeshFilter) -> Result<Vec<MeshInterfaceRecord>> {
        self.db.list_meshes(filter)
    }

    pub fn get(&self, interface: &str) -> Result<Option<MeshInterfaceRecord>> {
        self.db.get_mesh(interface)
    }

    /// Interfaces babeld should currently be routing, in insertion order
    pub fn routed_interfaces(&self, protocol: Protocol) -> Result<Vec<String>> {
        let interfaces: Vec<String> = self
            .db
            .list_meshes(&MeshFilter::routed(protocol))?
            .into_iter()
            .map(|r| r.interface)
            .collect();
        for interface in &interfaces {
            debug!("Adding interface: {}", interface);
        }
        Ok(interfaces)
    }

    /// Create the default disabled record for `interface` if it has none.
    ///
    /// Returns `true` if a record was created.
    pub fn ensure_record(&self, interface: &str, protocol: Protocol) -> Result<bool> {
        self.db.insert_mesh_if_absent(interface, protocol, Enabled::No)
    }

    /// Persist the membership of `interface`, creating the record if it is
    /// missing.
    pub fn set_enabled(&self, interface: &str, protocol: Protocol, enabled: Enabled) -> Result<()> {
        if !self.db.set_mesh_enabled(interface, enabled)? {
            warn!(
                "No mesh record for {}, creating one with enabled={}",
                interface, enabled
            );
            self.db.insert_mesh_if_absent(interface, protocol, enabled)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_routed_interfaces_only_enabled() {
        let state = MeshState::new(Database::open_memory().unwrap());
        state.ensure_record("wlan0", Protocol::Babel).unwrap();
        state.ensure_record("wlan1", Protocol::Babel).unwrap();
        state.set_enabled("wlan1", Protocol::Babel, Enabled::Yes).unwrap();

        assert_eq!(state.routed_interfaces(Protocol::Babel).unwrap(), vec!["wlan1"]);
    }

    #[test]
    fn test_set_enabled_heals_missing_record() {
        let state = MeshState::new(Database::open_memory().unwrap());
        state.set_enabled("wlan3", Protocol::Babel, Enabled::Yes).unwrap();

        let record = state.get("wlan3").unwrap().unwrap();
        assert_eq!(record.enabled, Enabled::Yes);
        assert_eq!(record.protocol, Protocol::Babel);
    }

    #[test]
    fn test_ensure_record_does_not_overwrite() {
        let state = MeshState::new(Database::open_memory().unwrap());
        state.set_enabled("wlan0", Protocol::Babel, Enabled::Yes).unwrap();

        assert!(!state.ensure_record("wlan0", Protocol::Babel).unwrap());
        assert_eq!(state.get("wlan0").unwrap().unwrap().enabled, Enabled::Yes);
    }
}
