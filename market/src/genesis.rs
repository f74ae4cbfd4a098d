//! Market genesis state.

use iq_types::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{MarketError, MarketParams, MODULE_NAME};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketGenesis {
    /// Signed deviation of the IQ pool from its base size.
    #[serde(default)]
    pub iq_pool_delta: Decimal,
    #[serde(default)]
    pub params: MarketParams,
}

impl MarketGenesis {
    pub fn new(iq_pool_delta: Decimal, params: MarketParams) -> Self {
        Self {
            iq_pool_delta,
            params,
        }
    }

    pub fn validate(&self) -> Result<(), MarketError> {
        self.params.validate()
    }

    /// Extract the market section from an application genesis.
    ///
    /// A missing section yields the default genesis.
    pub fn from_app_state(app_state: &Map<String, Value>) -> Result<Self, MarketError> {
        match app_state.get(MODULE_NAME) {
            Some(section) => Ok(Self::deserialize(section)?),
            None => Ok(Self::default()),
        }
    }
}
