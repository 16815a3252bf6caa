//! Wireless interface inventory

use meshconf_common::{Database, Result, WirelessInterface};
use std::path::Path;

/// Read-only source of the wireless interfaces known to the node
pub trait InterfaceRegistry: Send + Sync {
    fn wireless_interfaces(&self) -> Result<Vec<WirelessInterface>>;
}

/// Registry backed by the network configuration database
#[derive(Clone)]
pub struct NetworkRegistry {
    db: Database,
}

impl NetworkRegistry {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(Database::open(path)?))
    }

    pub fn db(&self) -> &Database {
        &self.db
    }
}

impl InterfaceRegistry for NetworkRegistry {
    fn wireless_interfaces(&self) -> Result<Vec<WirelessInterface>> {
        self.db.list_wireless()
    }
}

impl InterfaceRegistry for Vec<WirelessInterface> {
    fn wireless_interfaces(&self) -> Result<Vec<WirelessInterface>> {
        Ok(self.clone())
    }
}
