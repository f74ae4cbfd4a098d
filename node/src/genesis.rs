//! Application genesis file.
//!
//! On disk the file is `{"chain_id": ..., "app_state": {"oracle": ..., "market": ...}}`.
//! Sections are looked up by module name; a missing section takes its
//! module's default.

use std::path::Path;

use iq_market::MarketGenesis;
use iq_oracle::GenesisState;
use iq_store::{BatchStore, OracleStore, StagingStore};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::NodeError;

pub const ORACLE_MODULE: &str = "oracle";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppGenesis {
    pub chain_id: String,
    pub oracle: GenesisState,
    pub market: MarketGenesis,
}

#[derive(Serialize, Deserialize)]
struct RawGenesis {
    chain_id: String,
    #[serde(default)]
    app_state: Map<String, Value>,
}

impl AppGenesis {
    /// Default module state under `chain_id`.
    pub fn new(chain_id: impl Into<String>) -> Self {
        Self {
            chain_id: chain_id.into(),
            oracle: GenesisState::default(),
            market: MarketGenesis::default(),
        }
    }

    pub fn validate(&self) -> Result<(), NodeError> {
        if self.chain_id.trim().is_empty() {
            return Err(NodeError::Genesis("chain_id is empty".into()));
        }
        self.oracle.validate()?;
        self.market.validate()?;
        Ok(())
    }

    pub fn from_json_str(s: &str) -> Result<Self, NodeError> {
        let raw: RawGenesis = serde_json::from_str(s)?;
        let oracle = match raw.app_state.get(ORACLE_MODULE) {
            Some(section) => GenesisState::deserialize(section)?,
            None => GenesisState::default(),
        };
        let market = MarketGenesis::from_app_state(&raw.app_state)?;
        Ok(Self {
            chain_id: raw.chain_id,
            oracle,
            market,
        })
    }

    pub fn from_json_file(path: &Path) -> Result<Self, NodeError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| NodeError::Genesis(format!("{}: {e}", path.display())))?;
        Self::from_json_str(&content)
    }

    pub fn to_json_string(&self) -> Result<String, NodeError> {
        let mut app_state = Map::new();
        app_state.insert(ORACLE_MODULE.to_string(), serde_json::to_value(&self.oracle)?);
        app_state.insert(
            iq_market::MODULE_NAME.to_string(),
            serde_json::to_value(&self.market)?,
        );
        let raw = RawGenesis {
            chain_id: self.chain_id.clone(),
            app_state,
        };
        Ok(serde_json::to_string_pretty(&raw)?)
    }

    /// Load the oracle state into `store` in one batch and mark height 0 as
    /// committed. Nothing is written if validation fails.
    pub fn commit_to<S: OracleStore + BatchStore>(&self, store: &S) -> Result<(), NodeError> {
        self.validate()?;
        let staging = StagingStore::new(store);
        iq_oracle::init_genesis(&staging, &self.oracle)?;
        store.write_batch(&staging.into_ops(), Some(0))?;
        Ok(())
    }
}
