//! Node configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::logging::LogFormat;
use crate::NodeError;

/// Configuration for an IQ oracle node.
///
/// Can be loaded from a TOML file via [`NodeConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Directory holding the LMDB environment.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Maximum size of the LMDB memory map, in bytes.
    #[serde(default = "default_lmdb_map_size")]
    pub lmdb_map_size: usize,

    #[serde(default = "default_lmdb_max_dbs")]
    pub lmdb_max_dbs: u32,

    /// Genesis file, relative to the node home unless absolute.
    #[serde(default = "default_genesis_file")]
    pub genesis_file: PathBuf,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_data_dir() -> PathBuf {
    PathBuf::from("./iq_data")
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_lmdb_map_size() -> usize {
    1 << 30
}

fn default_lmdb_max_dbs() -> u32 {
    16
}

fn default_genesis_file() -> PathBuf {
    PathBuf::from("genesis.json")
}

// ── Impl ───────────────────────────────────────────────────────────────

impl NodeConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &Path) -> Result<Self, NodeError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| NodeError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, NodeError> {
        toml::from_str(s).map_err(|e| NodeError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, NodeError> {
        toml::to_string_pretty(self).map_err(|e| NodeError::Config(e.to_string()))
    }

    pub fn log_format(&self) -> Result<LogFormat, NodeError> {
        self.log_format.parse()
    }

    /// The genesis file resolved against `home`.
    pub fn genesis_path(&self, home: &Path) -> PathBuf {
        if self.genesis_file.is_absolute() {
            self.genesis_file.clone()
        } else {
            home.join(&self.genesis_file)
        }
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_format: default_log_format(),
            log_level: default_log_level(),
            lmdb_map_size: default_lmdb_map_size(),
            lmdb_max_dbs: default_lmdb_max_dbs(),
            genesis_file: default_genesis_file(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = NodeConfig::default();
        let toml_str = config.to_toml_string().unwrap();
        let parsed = NodeConfig::from_toml_str(&toml_str).expect("should parse");
        assert_eq!(parsed, config);
    }

    #[test]
    fn minimal_toml_uses_defaults() {
        let config = NodeConfig::from_toml_str("").expect("empty toml should use defaults");
        assert_eq!(config.lmdb_max_dbs, 16);
        assert_eq!(config.log_format, "human");
        assert_eq!(config.log_format().unwrap(), LogFormat::Human);
    }

    #[test]
    fn partial_toml_overrides() {
        let toml = r#"
            log_format = "json"
            lmdb_map_size = 1048576
        "#;
        let config = NodeConfig::from_toml_str(toml).expect("should parse");
        assert_eq!(config.lmdb_map_size, 1_048_576);
        assert_eq!(config.log_format().unwrap(), LogFormat::Json);
        assert_eq!(config.log_level, "info"); // default
    }

    #[test]
    fn unknown_log_format_rejected() {
        let config = NodeConfig::from_toml_str(r#"log_format = "xml""#).unwrap();
        assert!(matches!(config.log_format(), Err(NodeError::Config(_))));
    }

    #[test]
    fn genesis_path_resolution() {
        let home = Path::new("/srv/iq");
        let mut config = NodeConfig::default();
        assert_eq!(config.genesis_path(home), PathBuf::from("/srv/iq/genesis.json"));
        config.genesis_file = PathBuf::from("/etc/iq/genesis.json");
        assert_eq!(config.genesis_path(home), PathBuf::from("/etc/iq/genesis.json"));
    }

    #[test]
    fn missing_file_returns_config_error() {
        let result = NodeConfig::from_toml_file(Path::new("/nonexistent/iq.toml"));
        assert!(matches!(result, Err(NodeError::Config(_))));
    }
}
