//! SQLite database for mesh membership and interface inventory

use crate::types::{Enabled, MeshFilter, MeshInterfaceRecord, Protocol, WirelessInterface};
use crate::Result;
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Database wrapper for state persistence
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open or create database at path
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path.as_ref())?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };

        db.init_schema()?;

        info!("Opened database at {:?}", path.as_ref());
        Ok(db)
    }

    /// Open in-memory database (for testing)
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.init_schema()?;
        Ok(db)
    }

    /// Initialize database schema
    fn init_schema(&self) -> Result<()> {
        let conn = self.conn.lock();

        conn.execute_batch(
            r#"
            -- Mesh membership, one row per interface
            CREATE TABLE IF NOT EXISTS meshes (
                interface TEXT PRIMARY KEY,
                protocol TEXT NOT NULL,
                enabled TEXT NOT NULL DEFAULT 'no',
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_meshes_enabled ON meshes(enabled, protocol);

            -- Wireless inventory written by the network configuration tool
            CREATE TABLE IF NOT EXISTS wireless (
                interface TEXT PRIMARY KEY,
                mesh_interface TEXT NOT NULL,
                enabled TEXT NOT NULL DEFAULT 'no'
            );
            "#,
        )?;

        debug!("Database schema initialized");
        Ok(())
    }

    // ========================================================================
    // Mesh membership
    // ========================================================================

    /// List membership records matching `filter`, in insertion order
    pub fn list_meshes(&self, filter: &MeshFilter) -> Result<Vec<MeshInterfaceRecord>> {
        let conn = self.conn.lock();

        let mut stmt = conn.prepare(
            "SELECT interface, protocol, enabled, created_at, updated_at
             FROM meshes
             WHERE (?1 IS NULL OR interface = ?1)
               AND (?2 IS NULL OR protocol = ?2)
               AND (?3 IS NULL OR enabled = ?3)
             ORDER BY rowid ASC",
        )?;

        let rows = stmt.query_map(
            params![
                filter.interface.as_deref(),
                filter.protocol.map(|p| p.as_str()),
                filter.enabled.map(|e| e.as_str()),
            ],
            |row| {
                Ok(RawMeshRow {
                    interface: row.get(0)?,
                    protocol: row.get(1)?,
                    enabled: row.get(2)?,
                    created_at: row.get(3)?,
                    updated_at: row.get(4)?,
                })
            },
        )?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row?.parse()?);
        }

        Ok(results)
    }

    /// Get the membership record for one interface
    pub fn get_mesh(&self, interface: &str) -> Result<Option<MeshInterfaceRecord>> {
        let conn = self.conn.lock();

        let row = conn
            .query_row(
                "SELECT interface, protocol, enabled, created_at, updated_at
                 FROM meshes WHERE interface = ?1",
                params![interface],
                |row| {
                    Ok(RawMeshRow {
                        interface: row.get(0)?,
                        protocol: row.get(1)?,
                        enabled: row.get(2)?,
                        created_at: row.get(3)?,
                        updated_at: row.get(4)?,
                    })
                },
            )
            .optional()?;

        match row {
            Some(raw) => Ok(Some(raw.parse()?)),
            None => Ok(None),
        }
    }

    /// Insert a membership record unless one already exists.
    ///
    /// Returns `true` if a row was inserted.
    pub fn insert_mesh_if_absent(
        &self,
        interface: &str,
        protocol: Protocol,
        enabled: Enabled,
    ) -> Result<bool> {
        let conn = self.conn.lock();
        let now = chrono::Utc::now().timestamp();

        let rows = conn.execute(
            "INSERT OR IGNORE INTO meshes (interface, protocol, enabled, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![interface, protocol.as_str(), enabled.as_str(), now, now],
        )?;

        if rows > 0 {
            debug!("Inserted mesh record for {} ({})", interface, enabled);
        }

        Ok(rows > 0)
    }

    /// Replace the `enabled` value of the record keyed by `interface`.
    ///
    /// Returns `false` when no record matched. The row keeps its position in
    /// insertion order.
    pub fn set_mesh_enabled(&self, interface: &str, enabled: Enabled) -> Result<bool> {
        let conn = self.conn.lock();
        let now = chrono::Utc::now().timestamp();

        let rows = conn.execute(
            "UPDATE meshes SET enabled = ?1, updated_at = ?2 WHERE interface = ?3",
            params![enabled.as_str(), now, interface],
        )?;

        if rows > 0 {
            debug!("Updated mesh record for {}: enabled={}", interface, enabled);
        }

        Ok(rows > 0)
    }

    // ========================================================================
    // Wireless inventory
    // ========================================================================

    /// List wireless interfaces in the order they were registered
    pub fn list_wireless(&self) -> Result<Vec<WirelessInterface>> {
        let conn = self.conn.lock();

        let mut stmt = conn.prepare(
            "SELECT interface, mesh_interface, enabled FROM wireless ORDER BY rowid ASC",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;

        let mut results = Vec::new();
        for row in rows {
            let (interface, mesh_interface, enabled) = row?;
            let enabled = enabled.parse().unwrap_or_else(|_| {
                warn!(
                    "Wireless interface {} has unrecognised enabled value {:?}, treating as no",
                    interface, enabled
                );
                Enabled::No
            });
            results.push(WirelessInterface {
                interface,
                mesh_interface,
                enabled,
            });
        }

        Ok(results)
    }

    /// Insert or update a wireless interface row
    pub fn upsert_wireless(&self, wireless: &WirelessInterface) -> Result<()> {
        let conn = self.conn.lock();

        conn.execute(
            "INSERT INTO wireless (interface, mesh_interface, enabled) VALUES (?1, ?2, ?3)
             ON CONFLICT(interface) DO UPDATE SET
                mesh_interface = excluded.mesh_interface,
                enabled = excluded.enabled",
            params![
                wireless.interface,
                wireless.mesh_interface,
                wireless.enabled.as_str()
            ],
        )?;

        debug!("Upserted wireless interface {}", wireless.interface);
        Ok(())
    }
}

/// Raw database row before parsing
struct RawMeshRow {
    interface: String,
    protocol: String,
    enabled: String,
    created_at: i64,
    updated_at: i64,
}

impl RawMeshRow {
    fn parse(self) -> Result<MeshInterfaceRecord> {
        Ok(MeshInterfaceRecord {
            protocol: self.protocol.parse()?,
            enabled: self.enabled.parse()?,
            interface: self.interface,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
