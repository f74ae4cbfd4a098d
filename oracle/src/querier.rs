//! Read-only, route-dispatched queries.
//!
//! Requests and responses are JSON. Queries only read persisted state; they
//! never tally.

use iq_store::OracleStore;
use iq_types::{Decimal, Denom, DenomList, ValAddress};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::OracleError;

pub const QUERY_PARAMETERS: &str = "parameters";
pub const QUERY_EXCHANGE_RATE: &str = "exchangeRate";
pub const QUERY_EXCHANGE_RATES: &str = "exchangeRates";
pub const QUERY_ACTIVES: &str = "actives";
pub const QUERY_FEEDER_DELEGATION: &str = "feederDelegation";
pub const QUERY_AGGREGATE_PREVOTE: &str = "aggregatePrevote";
pub const QUERY_AGGREGATE_PREVOTES: &str = "aggregatePrevotes";
pub const QUERY_AGGREGATE_VOTE: &str = "aggregateVote";
pub const QUERY_AGGREGATE_VOTES: &str = "aggregateVotes";
pub const QUERY_VOTE_TARGETS: &str = "voteTargets";
pub const QUERY_TOBIN_TAXES: &str = "tobinTaxes";
pub const QUERY_TOBIN_TAX: &str = "tobinTax";
pub const QUERY_MISS_COUNTER: &str = "missCounter";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryDenomParams {
    pub denom: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryValidatorParams {
    pub validator: ValAddress,
}

/// A denomination paired with a decimal amount.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecCoin {
    pub denom: String,
    pub amount: Decimal,
}

pub struct Querier<'a, S> {
    store: &'a S,
}

impl<'a, S: OracleStore> Querier<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Answer the query at `route` with JSON-encoded `data` as parameters.
    pub fn query(&self, route: &str, data: &[u8]) -> Result<Vec<u8>, OracleError> {
        match route {
            QUERY_PARAMETERS => respond(&self.store.get_params()?),
            QUERY_EXCHANGE_RATE => {
                let p: QueryDenomParams = parse(data)?;
                let rate = self
                    .store
                    .get_exchange_rate(&p.denom)?
                    .ok_or_else(|| OracleError::NotFound(format!("exchange rate for {}", p.denom)))?;
                respond(&rate)
            }
            QUERY_EXCHANGE_RATES => {
                let rates: Vec<DecCoin> = self
                    .store
                    .iter_exchange_rates()?
                    .into_iter()
                    .map(|(denom, amount)| DecCoin { denom, amount })
                    .collect();
                respond(&rates)
            }
            QUERY_ACTIVES => {
                let denoms: Vec<String> = self
                    .store
                    .iter_exchange_rates()?
                    .into_iter()
                    .map(|(denom, _)| denom)
                    .collect();
                respond(&denoms)
            }
            QUERY_FEEDER_DELEGATION => {
                let p: QueryValidatorParams = parse(data)?;
                respond(&crate::msg_server::feeder_for(self.store, &p.validator)?)
            }
            QUERY_AGGREGATE_PREVOTE => {
                let p: QueryValidatorParams = parse(data)?;
                let prevote = self.store.get_prevote(&p.validator)?.ok_or_else(|| {
                    OracleError::NotFound(format!("aggregate prevote of {}", p.validator))
                })?;
                respond(&prevote)
            }
            QUERY_AGGREGATE_PREVOTES => respond(&self.store.iter_prevotes()?),
            QUERY_AGGREGATE_VOTE => {
                let p: QueryValidatorParams = parse(data)?;
                let vote = self.store.get_vote(&p.validator)?.ok_or_else(|| {
                    OracleError::NotFound(format!("aggregate vote of {}", p.validator))
                })?;
                respond(&vote)
            }
            QUERY_AGGREGATE_VOTES => respond(&self.store.iter_votes()?),
            QUERY_VOTE_TARGETS => {
                let targets: Vec<String> = self
                    .store
                    .iter_tobin_taxes()?
                    .into_iter()
                    .map(|(denom, _)| denom)
                    .collect();
                respond(&targets)
            }
            QUERY_TOBIN_TAXES => {
                let list: DenomList = self
                    .store
                    .iter_tobin_taxes()?
                    .into_iter()
                    .map(|(name, tax)| Denom::new(name, tax))
                    .collect();
                respond(&list)
            }
            QUERY_TOBIN_TAX => {
                let p: QueryDenomParams = parse(data)?;
                let tax = self
                    .store
                    .get_tobin_tax(&p.denom)?
                    .ok_or_else(|| OracleError::NotFound(format!("tobin tax for {}", p.denom)))?;
                respond(&tax)
            }
            QUERY_MISS_COUNTER => {
                let p: QueryValidatorParams = parse(data)?;
                respond(&self.store.get_miss_counter(&p.validator)?)
            }
            other => Err(OracleError::UnknownQuery(other.to_string())),
        }
    }
}

fn parse<T: DeserializeOwned>(data: &[u8]) -> Result<T, OracleError> {
    Ok(serde_json::from_slice(data)?)
}

fn respond<T: Serialize>(value: &T) -> Result<Vec<u8>, OracleError> {
    Ok(serde_json::to_vec(value)?)
}
