//! Daemon configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DaemonConfig {
    /// Store directory path
    pub store_path: PathBuf,

    /// Mesh membership database, defaults to `<store_path>/mesh.sqlite`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mesh_db: Option<PathBuf>,

    /// Network configuration database, defaults to `<store_path>/network.sqlite`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_db: Option<PathBuf>,

    /// Root of the process filesystem used to verify PIDs
    pub proc_root: PathBuf,

    /// Skip signalling and spawning, still wait and verify
    pub dry_run: bool,

    /// babeld configuration
    pub babeld: BabeldConfig,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            store_path: meshconf_common::default_store_path(),
            mesh_db: None,
            network_db: None,
            proc_root: PathBuf::from("/proc"),
            dry_run: false,
            babeld: BabeldConfig::default(),
        }
    }
}

/// babeld-specific configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BabeldConfig {
    /// Path to the babeld binary
    pub binary_path: PathBuf,

    /// PID file babeld writes when daemonized
    pub pid_file: PathBuf,

    /// Wait after every stop and every start before the PID is trusted
    pub settle_timeout_ms: u64,

    /// Multicast group (`-m`)
    pub multicast_address: String,

    /// Protocol port (`-p`)
    pub port: u16,

    /// Local configuration port (`-g`)
    pub group_port: u16,

    /// babeld configuration file (`-c`)
    pub config_file: PathBuf,

    /// Extra flags placed after the common options
    pub unique_opts: Vec<String>,
}

impl Default for BabeldConfig {
    fn default() -> Self {
        Self {
            binary_path: PathBuf::from("/usr/local/bin/babeld"),
            pid_file: PathBuf::from("/var/run/babeld.pid"),
            settle_timeout_ms: 3000,
            multicast_address: "ff02:0:0:0:0:0:1:6".to_string(),
            port: 6696,
            group_port: 33123,
            config_file: PathBuf::from("/etc/babeld.conf"),
            unique_opts: Vec::new(),
        }
    }
}

impl BabeldConfig {
    pub fn settle_timeout(&self) -> Duration {
        Duration::from_millis(self.settle_timeout_ms)
    }

    /// Flags passed to every babeld invocation
    pub fn common_opts(&self) -> Vec<String> {
        vec![
            "-m".to_string(),
            self.multicast_address.clone(),
            "-p".to_string(),
            self.port.to_string(),
            "-D".to_string(),
            "-g".to_string(),
            self.group_port.to_string(),
            "-c".to_string(),
            self.config_file.to_string_lossy().to_string(),
        ]
    }

    pub fn binary(&self) -> String {
        self.binary_path.to_string_lossy().to_string()
    }
}

impl DaemonConfig {
    /// Load configuration from file
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to file
    pub fn save(&self, path: &std::path::Path) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the mesh membership database path
    pub fn mesh_db_path(&self) -> PathBuf {
        self.mesh_db
            .clone()
            .unwrap_or_else(|| self.store_path.join("mesh.sqlite"))
    }

    /// Get the network configuration database path
    pub fn network_db_path(&self) -> PathBuf {
        self.network_db
            .clone()
            .unwrap_or_else(|| self.store_path.join("network.sqlite"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_common_opts() {
        let babeld = BabeldConfig::default();
        assert_eq!(
            babeld.common_opts(),
            vec![
                "-m",
                "ff02:0:0:0:0:0:1:6",
                "-p",
                "6696",
                "-D",
                "-g",
                "33123",
                "-c",
                "/etc/babeld.conf"
            ]
        );
        assert_eq!(babeld.settle_timeout(), Duration::from_secs(3));
        assert!(babeld.unique_opts.is_empty());
    }

    #[test]
    fn test_load_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("meshconf.toml");
        std::fs::write(
            &path,
            r#"
            store_path = "/tmp/mesh"
            dry_run = true

            [babeld]
            settle_timeout_ms = 250
            unique_opts = ["-d", "1"]
            "#,
        )
        .unwrap();

        let config = DaemonConfig::load(&path).unwrap();
        assert!(config.dry_run);
        assert_eq!(config.mesh_db_path(), PathBuf::from("/tmp/mesh/mesh.sqlite"));
        assert_eq!(config.babeld.settle_timeout(), Duration::from_millis(250));
        assert_eq!(config.babeld.unique_opts, vec!["-d", "1"]);
        assert_eq!(config.babeld.port, 6696);
        assert_eq!(config.proc_root, PathBuf::from("/proc"));
    }

    #[test]
    fn test_load_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = DaemonConfig::load(&dir.path().join("absent.toml")).unwrap();
        assert!(!config.dry_run);
        assert_eq!(config.babeld.binary(), "/usr/local/bin/babeld");
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("meshconf.toml");

        let mut config = DaemonConfig::default();
        config.network_db = Some(PathBuf::from("/srv/network.sqlite"));
        config.babeld.group_port = 40000;
        config.save(&path).unwrap();

        let loaded = DaemonConfig::load(&path).unwrap();
        assert_eq!(loaded.network_db_path(), PathBuf::from("/srv/network.sqlite"));
        assert_eq!(loaded.babeld.group_port, 40000);
    }
}
