//! Nullable store - thread-safe in-memory oracle storage for testing.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use iq_store::{
    BatchStore, ExchangeRateStore, FeederStore, MissCounterStore, ParamStore, PrevoteStore, StoreError,
    TobinTaxStore, VoteStore, WriteOp,
};
use iq_types::{
    AccAddress, AggregateExchangeRatePrevote, AggregateExchangeRateVote, BlockHeight, Decimal,
    OracleParams, ValAddress,
};

#[derive(Default)]
struct State {
    params: Option<OracleParams>,
    exchange_rates: BTreeMap<String, Decimal>,
    feeders: BTreeMap<ValAddress, AccAddress>,
    prevotes: BTreeMap<ValAddress, AggregateExchangeRatePrevote>,
    votes: BTreeMap<ValAddress, AggregateExchangeRateVote>,
    tobin_taxes: BTreeMap<String, Decimal>,
    miss_counters: BTreeMap<ValAddress, u64>,
    committed_height: Option<BlockHeight>,
    writes: u64,
    fail_writes: bool,
}

/// An in-memory oracle store.
///
/// Counts every mutation so tests can assert that an operation wrote
/// nothing, and can be told to fail every write to exercise error paths.
#[derive(Default)]
pub struct NullOracleStore {
    state: Mutex<State>,
}

impl NullOracleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-loaded with parameters and the matching tobin-tax table.
    pub fn with_params(params: OracleParams) -> Self {
        let store = Self::new();
        if let Ok(mut state) = store.state.lock() {
            state.tobin_taxes = params.whitelist.to_map();
            state.params = Some(params);
        }
        store
    }

    /// Number of mutations applied so far.
    pub fn writes(&self) -> u64 {
        self.lock().map(|s| s.writes).unwrap_or(0)
    }

    /// Make every subsequent mutation fail with a backend error.
    pub fn set_fail_writes(&self, fail: bool) {
        if let Ok(mut state) = self.lock() {
            state.fail_writes = fail;
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, StoreError> {
        self.state
            .lock()
            .map_err(|_| StoreError::Backend("null store lock poisoned".into()))
    }

    fn write<R>(&self, f: impl FnOnce(&mut State) -> R) -> Result<R, StoreError> {
        let mut state = self.lock()?;
        if state.fail_writes {
            return Err(StoreError::Backend("null store: writes disabled".into()));
        }
        state.writes += 1;
        Ok(f(&mut state))
    }

    fn read<R>(&self, f: impl FnOnce(&State) -> R) -> Result<R, StoreError> {
        let state = self.lock()?;
        Ok(f(&state))
    }
}

impl State {
    fn apply(&mut self, op: &WriteOp) {
        match op {
            WriteOp::PutParams(params) => self.params = Some(params.clone()),
            WriteOp::PutExchangeRate(denom, rate) => {
                self.exchange_rates.insert(denom.clone(), *rate);
            }
            WriteOp::DeleteExchangeRate(denom) => {
                self.exchange_rates.remove(denom);
            }
            WriteOp::PutFeederDelegation(validator, feeder) => {
                self.feeders.insert(validator.clone(), feeder.clone());
            }
            WriteOp::PutPrevote(prevote) => {
                self.prevotes.insert(prevote.voter.clone(), prevote.clone());
            }
            WriteOp::DeletePrevote(validator) => {
                self.prevotes.remove(validator);
            }
            WriteOp::PutVote(vote) => {
                self.votes.insert(vote.voter.clone(), vote.clone());
            }
            WriteOp::DeleteVote(validator) => {
                self.votes.remove(validator);
            }
            WriteOp::PutTobinTax(denom, tax) => {
                self.tobin_taxes.insert(denom.clone(), *tax);
            }
            WriteOp::ClearTobinTaxes => self.tobin_taxes.clear(),
            WriteOp::PutMissCounter(validator, count) => {
                self.miss_counters.insert(validator.clone(), *count);
            }
            WriteOp::DeleteMissCounter(validator) => {
                self.miss_counters.remove(validator);
            }
        }
    }
}

/// Applies the whole batch under one lock. A disabled store rejects the
/// batch before touching any state.
impl BatchStore for NullOracleStore {
    fn write_batch(
        &self,
        ops: &[WriteOp],
        committed_height: Option<BlockHeight>,
    ) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        if state.fail_writes {
            return Err(StoreError::Backend("null store: writes disabled".into()));
        }
        for op in ops {
            state.apply(op);
        }
        state.writes += ops.len() as u64;
        if committed_height.is_some() {
            state.committed_height = committed_height;
        }
        Ok(())
    }

    fn committed_height(&self) -> Result<Option<BlockHeight>, StoreError> {
        self.read(|s| s.committed_height)
    }
}

impl ParamStore for NullOracleStore {
    fn get_params(&self) -> Result<OracleParams, StoreError> {
        self.read(|s| s.params.clone())?
            .ok_or_else(|| StoreError::NotFound("oracle params".into()))
    }

    fn put_params(&self, params: &OracleParams) -> Result<(), StoreError> {
        self.write(|s| s.params = Some(params.clone()))
    }
}

impl ExchangeRateStore for NullOracleStore {
    fn get_exchange_rate(&self, denom: &str) -> Result<Option<Decimal>, StoreError> {
        self.read(|s| s.exchange_rates.get(denom).copied())
    }

    fn put_exchange_rate(&self, denom: &str, rate: Decimal) -> Result<(), StoreError> {
        self.write(|s| {
            s.exchange_rates.insert(denom.to_string(), rate);
        })
    }

    fn delete_exchange_rate(&self, denom: &str) -> Result<(), StoreError> {
        self.write(|s| {
            s.exchange_rates.remove(denom);
        })
    }

    fn iter_exchange_rates(&self) -> Result<Vec<(String, Decimal)>, StoreError> {
        self.read(|s| {
            s.exchange_rates
                .iter()
                .map(|(denom, rate)| (denom.clone(), *rate))
                .collect()
        })
    }
}

impl FeederStore for NullOracleStore {
    fn get_feeder_delegation(
        &self,
        validator: &ValAddress,
    ) -> Result<Option<AccAddress>, StoreError> {
        self.read(|s| s.feeders.get(validator).cloned())
    }

    fn put_feeder_delegation(
        &self,
        validator: &ValAddress,
        feeder: &AccAddress,
    ) -> Result<(), StoreError> {
        self.write(|s| {
            s.feeders.insert(validator.clone(), feeder.clone());
        })
    }

    fn iter_feeder_delegations(&self) -> Result<Vec<(ValAddress, AccAddress)>, StoreError> {
        self.read(|s| {
            s.feeders
                .iter()
                .map(|(v, f)| (v.clone(), f.clone()))
                .collect()
        })
    }
}

impl PrevoteStore for NullOracleStore {
    fn get_prevote(
        &self,
        validator: &ValAddress,
    ) -> Result<Option<AggregateExchangeRatePrevote>, StoreError> {
        self.read(|s| s.prevotes.get(validator).cloned())
    }

    fn put_prevote(&self, prevote: &AggregateExchangeRatePrevote) -> Result<(), StoreError> {
        self.write(|s| {
            s.prevotes.insert(prevote.voter.clone(), prevote.clone());
        })
    }

    fn delete_prevote(&self, validator: &ValAddress) -> Result<(), StoreError> {
        self.write(|s| {
            s.prevotes.remove(validator);
        })
    }

    fn iter_prevotes(&self) -> Result<Vec<AggregateExchangeRatePrevote>, StoreError> {
        self.read(|s| s.prevotes.values().cloned().collect())
    }
}

impl VoteStore for NullOracleStore {
    fn get_vote(
        &self,
        validator: &ValAddress,
    ) -> Result<Option<AggregateExchangeRateVote>, StoreError> {
        self.read(|s| s.votes.get(validator).cloned())
    }

    fn put_vote(&self, vote: &AggregateExchangeRateVote) -> Result<(), StoreError> {
        self.write(|s| {
            s.votes.insert(vote.voter.clone(), vote.clone());
        })
    }

    fn delete_vote(&self, validator: &ValAddress) -> Result<(), StoreError> {
        self.write(|s| {
            s.votes.remove(validator);
        })
    }

    fn iter_votes(&self) -> Result<Vec<AggregateExchangeRateVote>, StoreError> {
        self.read(|s| s.votes.values().cloned().collect())
    }
}

impl TobinTaxStore for NullOracleStore {
    fn get_tobin_tax(&self, denom: &str) -> Result<Option<Decimal>, StoreError> {
        self.read(|s| s.tobin_taxes.get(denom).copied())
    }

    fn put_tobin_tax(&self, denom: &str, tax: Decimal) -> Result<(), StoreError> {
        self.write(|s| {
            s.tobin_taxes.insert(denom.to_string(), tax);
        })
    }

    fn iter_tobin_taxes(&self) -> Result<Vec<(String, Decimal)>, StoreError> {
        self.read(|s| {
            s.tobin_taxes
                .iter()
                .map(|(denom, tax)| (denom.clone(), *tax))
                .collect()
        })
    }

    fn clear_tobin_taxes(&self) -> Result<(), StoreError> {
        self.write(|s| s.tobin_taxes.clear())
    }
}

impl MissCounterStore for NullOracleStore {
    fn get_miss_counter(&self, validator: &ValAddress) -> Result<u64, StoreError> {
        self.read(|s| s.miss_counters.get(validator).copied().unwrap_or(0))
    }

    fn put_miss_counter(&self, validator: &ValAddress, count: u64) -> Result<(), StoreError> {
        self.write(|s| {
            s.miss_counters.insert(validator.clone(), count);
        })
    }

    fn delete_miss_counter(&self, validator: &ValAddress) -> Result<(), StoreError> {
        self.write(|s| {
            s.miss_counters.remove(validator);
        })
    }

    fn iter_miss_counters(&self) -> Result<Vec<(ValAddress, u64)>, StoreError> {
        self.read(|s| {
            s.miss_counters
                .iter()
                .map(|(v, c)| (v.clone(), *c))
                .collect()
        })
    }
}
