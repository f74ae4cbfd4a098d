//! Oracle genesis import and export.

use iq_store::OracleStore;
use iq_types::{
    AccAddress, AggregateExchangeRatePrevote, AggregateExchangeRateVote, Decimal, OracleParams,
    ValAddress,
};
use serde::{Deserialize, Serialize};

use crate::OracleError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeederDelegation {
    pub validator: ValAddress,
    pub feeder: AccAddress,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeRateEntry {
    pub denom: String,
    pub exchange_rate: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissCounter {
    pub validator: ValAddress,
    pub miss_counter: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TobinTax {
    pub denom: String,
    pub tobin_tax: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisState {
    pub params: OracleParams,
    #[serde(default)]
    pub feeder_delegations: Vec<FeederDelegation>,
    #[serde(default)]
    pub exchange_rates: Vec<ExchangeRateEntry>,
    #[serde(default)]
    pub miss_counters: Vec<MissCounter>,
    #[serde(default)]
    pub aggregate_exchange_rate_prevotes: Vec<AggregateExchangeRatePrevote>,
    #[serde(default)]
    pub aggregate_exchange_rate_votes: Vec<AggregateExchangeRateVote>,
    #[serde(default)]
    pub tobin_taxes: Vec<TobinTax>,
}

impl Default for GenesisState {
    fn default() -> Self {
        Self::new(OracleParams::default())
    }
}

impl GenesisState {
    /// A genesis with `params` and no other state.
    pub fn new(params: OracleParams) -> Self {
        Self {
            params,
            feeder_delegations: Vec::new(),
            exchange_rates: Vec::new(),
            miss_counters: Vec::new(),
            aggregate_exchange_rate_prevotes: Vec::new(),
            aggregate_exchange_rate_votes: Vec::new(),
            tobin_taxes: Vec::new(),
        }
    }

    /// Genesis must satisfy the same constraints as a runtime parameter update.
    pub fn validate(&self) -> Result<(), OracleError> {
        self.params
            .validate()
            .map_err(|e| OracleError::InvalidGenesis(e.to_string()))?;
        for rate in &self.exchange_rates {
            if rate.exchange_rate < Decimal::ZERO {
                return Err(OracleError::InvalidGenesis(format!(
                    "negative exchange rate for {}",
                    rate.denom
                )));
            }
        }
        for vote in &self.aggregate_exchange_rate_votes {
            let mut seen = std::collections::BTreeSet::new();
            for tuple in &vote.exchange_rate_tuples {
                if !seen.insert(tuple.denom.as_str()) {
                    return Err(OracleError::InvalidGenesis(format!(
                        "duplicate denom {} in vote of {}",
                        tuple.denom, vote.voter
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Load a genesis state into an empty store.
///
/// An empty tobin-tax list means "seed the table from the whitelist".
pub fn init_genesis(store: &impl OracleStore, genesis: &GenesisState) -> Result<(), OracleError> {
    genesis.validate()?;
    store.put_params(&genesis.params)?;

    for d in &genesis.feeder_delegations {
        store.put_feeder_delegation(&d.validator, &d.feeder)?;
    }
    for r in &genesis.exchange_rates {
        store.put_exchange_rate(&r.denom, r.exchange_rate)?;
    }
    for m in &genesis.miss_counters {
        store.put_miss_counter(&m.validator, m.miss_counter)?;
    }
    for p in &genesis.aggregate_exchange_rate_prevotes {
        store.put_prevote(p)?;
    }
    for v in &genesis.aggregate_exchange_rate_votes {
        store.put_vote(v)?;
    }

    if genesis.tobin_taxes.is_empty() {
        for denom in &genesis.params.whitelist {
            store.put_tobin_tax(&denom.name, denom.tobin_tax)?;
        }
    } else {
        for t in &genesis.tobin_taxes {
            store.put_tobin_tax(&t.denom, t.tobin_tax)?;
        }
    }

    tracing::info!(
        whitelist = genesis.params.whitelist.len(),
        rates = genesis.exchange_rates.len(),
        "oracle genesis loaded"
    );
    Ok(())
}

/// Snapshot the store as a genesis state. Every list is key-sorted.
pub fn export_genesis(store: &impl OracleStore) -> Result<GenesisState, OracleError> {
    Ok(GenesisState {
        params: store.get_params()?,
        feeder_delegations: store
            .iter_feeder_delegations()?
            .into_iter()
            .map(|(validator, feeder)| FeederDelegation { validator, feeder })
            .collect(),
        exchange_rates: store
            .iter_exchange_rates()?
            .into_iter()
            .map(|(denom, exchange_rate)| ExchangeRateEntry {
                denom,
                exchange_rate,
            })
            .collect(),
        miss_counters: store
            .iter_miss_counters()?
            .into_iter()
            .map(|(validator, miss_counter)| MissCounter {
                validator,
                miss_counter,
            })
            .collect(),
        aggregate_exchange_rate_prevotes: store.iter_prevotes()?,
        aggregate_exchange_rate_votes: store.iter_votes()?,
        tobin_taxes: store
            .iter_tobin_taxes()?
            .into_iter()
            .map(|(denom, tobin_tax)| TobinTax { denom, tobin_tax })
            .collect(),
    })
}
