//! IQ oracle node: wires the oracle to storage, configuration and logging.
//!
//! The node is the host the oracle runs in:
//! - Loads TOML configuration and the application genesis
//! - Opens the LMDB store
//! - Drives [`OracleApp`] through the block lifecycle
//! - Initialises structured logging

pub mod app;
pub mod config;
pub mod error;
pub mod genesis;
pub mod logging;

pub use app::OracleApp;
pub use config::NodeConfig;
pub use error::NodeError;
pub use genesis::AppGenesis;
pub use logging::{init_logging, LogFormat};

use std::path::Path;

use iq_store_lmdb::integrity::IntegrityReport;
use iq_store_lmdb::LmdbEnvironment;

/// Open the LMDB environment under `home` as configured.
///
/// Every database is checked before the environment is handed out, so a
/// corrupted store is refused before the first block is applied.
pub fn open_store(home: &Path, config: &NodeConfig) -> Result<LmdbEnvironment, NodeError> {
    let data_dir = if config.data_dir.is_absolute() {
        config.data_dir.clone()
    } else {
        home.join(&config.data_dir)
    };
    let env = LmdbEnvironment::open(&data_dir, config.lmdb_max_dbs, config.lmdb_map_size)?;
    let report = env.check_integrity()?;
    ensure_healthy(&report)?;
    tracing::info!(
        path = %data_dir.display(),
        databases = report.databases_checked,
        entries = report.total_entries,
        "store opened"
    );
    Ok(env)
}

fn ensure_healthy(report: &IntegrityReport) -> Result<(), NodeError> {
    if report.is_healthy() {
        return Ok(());
    }
    for error in &report.errors {
        tracing::error!(%error, "integrity check failed");
    }
    Err(NodeError::Integrity(report.errors.join("; ")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_in(dir: &Path) -> NodeConfig {
        NodeConfig {
            data_dir: dir.join("data"),
            lmdb_map_size: 1 << 20,
            ..NodeConfig::default()
        }
    }

    #[test]
    fn fresh_store_passes_integrity_check() {
        let dir = tempfile::tempdir().unwrap();
        let env = open_store(dir.path(), &config_in(dir.path())).unwrap();
        assert!(env.check_integrity().unwrap().is_healthy());
    }

    #[test]
    fn unhealthy_report_refused() {
        let report = IntegrityReport {
            databases_checked: 8,
            total_entries: 12,
            errors: vec!["database 'meta' is missing".to_string()],
        };
        let err = ensure_healthy(&report).unwrap_err();
        assert!(matches!(err, NodeError::Integrity(msg) if msg.contains("meta")));
    }

    #[test]
    fn foreign_data_dir_refused() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("data");
        std::fs::create_dir_all(&data).unwrap();
        std::fs::write(data.join("notes.txt"), b"not a database").unwrap();
        assert!(open_store(dir.path(), &config_in(dir.path())).is_err());
    }
}
