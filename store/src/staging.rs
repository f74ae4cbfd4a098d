//! An in-memory overlay that stages one block's writes.
//!
//! [`StagingStore`] reads through to its base store and keeps every write
//! to itself. Dropping it discards the writes; [`StagingStore::into_ops`]
//! yields the mutations in the order they were made, ready for
//! [`BatchStore::write_batch`](crate::BatchStore::write_batch).
//!
//! The staged state lives in a [`PendingWrites`] that can be taken out and
//! put back, so a block's writes accumulate across several stagings and a
//! failed one can be thrown away without losing the rest.

use std::cell::RefCell;
use std::collections::BTreeMap;

use iq_types::{
    AccAddress, AggregateExchangeRatePrevote, AggregateExchangeRateVote, Decimal, OracleParams,
    ValAddress,
};

use crate::{
    ExchangeRateStore, FeederStore, MissCounterStore, OracleStore, ParamStore, PrevoteStore,
    StoreError, TobinTaxStore, VoteStore, WriteOp,
};

/// Staged entries. `None` marks a delete.
#[derive(Clone, Debug, Default)]
pub struct PendingWrites {
    params: Option<OracleParams>,
    exchange_rates: BTreeMap<String, Option<Decimal>>,
    feeders: BTreeMap<ValAddress, AccAddress>,
    prevotes: BTreeMap<ValAddress, Option<AggregateExchangeRatePrevote>>,
    votes: BTreeMap<ValAddress, Option<AggregateExchangeRateVote>>,
    tobin_taxes_cleared: bool,
    tobin_taxes: BTreeMap<String, Decimal>,
    miss_counters: BTreeMap<ValAddress, Option<u64>>,
    ops: Vec<WriteOp>,
}

pub struct StagingStore<'a, S> {
    base: &'a S,
    overlay: RefCell<PendingWrites>,
}

impl PendingWrites {
    pub fn ops(&self) -> &[WriteOp] {
        &self.ops
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn into_ops(self) -> Vec<WriteOp> {
        self.ops
    }
}

impl<'a, S: OracleStore> StagingStore<'a, S> {
    pub fn new(base: &'a S) -> Self {
        Self::with_pending(base, PendingWrites::default())
    }

    /// Continue staging on top of earlier writes.
    pub fn with_pending(base: &'a S, pending: PendingWrites) -> Self {
        Self {
            base,
            overlay: RefCell::new(pending),
        }
    }

    /// Whether nothing has been staged.
    pub fn is_empty(&self) -> bool {
        self.overlay.borrow().is_empty()
    }

    pub fn into_pending(self) -> PendingWrites {
        self.overlay.into_inner()
    }

    /// The staged mutations, oldest first.
    pub fn into_ops(self) -> Vec<WriteOp> {
        self.into_pending().into_ops()
    }

    fn stage(&self, op: WriteOp, f: impl FnOnce(&mut PendingWrites)) {
        let mut overlay = self.overlay.borrow_mut();
        f(&mut overlay);
        overlay.ops.push(op);
    }
}

/// Merge staged entries over a sorted base listing.
fn merge<K: Ord, V>(
    base: Vec<(K, V)>,
    staged: impl Iterator<Item = (K, Option<V>)>,
) -> Vec<(K, V)> {
    let mut merged: BTreeMap<K, V> = base.into_iter().collect();
    for (key, value) in staged {
        match value {
            Some(value) => {
                merged.insert(key, value);
            }
            None => {
                merged.remove(&key);
            }
        }
    }
    merged.into_iter().collect()
}

impl<S: OracleStore> ParamStore for StagingStore<'_, S> {
    fn get_params(&self) -> Result<OracleParams, StoreError> {
        if let Some(params) = &self.overlay.borrow().params {
            return Ok(params.clone());
        }
        self.base.get_params()
    }

    fn put_params(&self, params: &OracleParams) -> Result<(), StoreError> {
        self.stage(WriteOp::PutParams(params.clone()), |o| {
            o.params = Some(params.clone())
        });
        Ok(())
    }
}

impl<S: OracleStore> ExchangeRateStore for StagingStore<'_, S> {
    fn get_exchange_rate(&self, denom: &str) -> Result<Option<Decimal>, StoreError> {
        if let Some(staged) = self.overlay.borrow().exchange_rates.get(denom) {
            return Ok(*staged);
        }
        self.base.get_exchange_rate(denom)
    }

    fn put_exchange_rate(&self, denom: &str, rate: Decimal) -> Result<(), StoreError> {
        self.stage(WriteOp::PutExchangeRate(denom.to_string(), rate), |o| {
            o.exchange_rates.insert(denom.to_string(), Some(rate));
        });
        Ok(())
    }

    fn delete_exchange_rate(&self, denom: &str) -> Result<(), StoreError> {
        self.stage(WriteOp::DeleteExchangeRate(denom.to_string()), |o| {
            o.exchange_rates.insert(denom.to_string(), None);
        });
        Ok(())
    }

    fn iter_exchange_rates(&self) -> Result<Vec<(String, Decimal)>, StoreError> {
        let base = self.base.iter_exchange_rates()?;
        let overlay = self.overlay.borrow();
        Ok(merge(
            base,
            overlay.exchange_rates.iter().map(|(k, v)| (k.clone(), *v)),
        ))
    }
}

impl<S: OracleStore> FeederStore for StagingStore<'_, S> {
    fn get_feeder_delegation(
        &self,
        validator: &ValAddress,
    ) -> Result<Option<AccAddress>, StoreError> {
        if let Some(feeder) = self.overlay.borrow().feeders.get(validator) {
            return Ok(Some(feeder.clone()));
        }
        self.base.get_feeder_delegation(validator)
    }

    fn put_feeder_delegation(
        &self,
        validator: &ValAddress,
        feeder: &AccAddress,
    ) -> Result<(), StoreError> {
        let op = WriteOp::PutFeederDelegation(validator.clone(), feeder.clone());
        self.stage(op, |o| {
            o.feeders.insert(validator.clone(), feeder.clone());
        });
        Ok(())
    }

    fn iter_feeder_delegations(&self) -> Result<Vec<(ValAddress, AccAddress)>, StoreError> {
        let base = self.base.iter_feeder_delegations()?;
        let overlay = self.overlay.borrow();
        Ok(merge(
            base,
            overlay
                .feeders
                .iter()
                .map(|(v, f)| (v.clone(), Some(f.clone()))),
        ))
    }
}

impl<S: OracleStore> PrevoteStore for StagingStore<'_, S> {
    fn get_prevote(
        &self,
        validator: &ValAddress,
    ) -> Result<Option<AggregateExchangeRatePrevote>, StoreError> {
        if let Some(staged) = self.overlay.borrow().prevotes.get(validator) {
            return Ok(staged.clone());
        }
        self.base.get_prevote(validator)
    }

    fn put_prevote(&self, prevote: &AggregateExchangeRatePrevote) -> Result<(), StoreError> {
        self.stage(WriteOp::PutPrevote(prevote.clone()), |o| {
            o.prevotes
                .insert(prevote.voter.clone(), Some(prevote.clone()));
        });
        Ok(())
    }

    fn delete_prevote(&self, validator: &ValAddress) -> Result<(), StoreError> {
        self.stage(WriteOp::DeletePrevote(validator.clone()), |o| {
            o.prevotes.insert(validator.clone(), None);
        });
        Ok(())
    }

    fn iter_prevotes(&self) -> Result<Vec<AggregateExchangeRatePrevote>, StoreError> {
        let base = self
            .base
            .iter_prevotes()?
            .into_iter()
            .map(|p| (p.voter.clone(), p))
            .collect();
        let overlay = self.overlay.borrow();
        Ok(merge(
            base,
            overlay.prevotes.iter().map(|(v, p)| (v.clone(), p.clone())),
        )
        .into_iter()
        .map(|(_, p)| p)
        .collect())
    }
}

impl<S: OracleStore> VoteStore for StagingStore<'_, S> {
    fn get_vote(
        &self,
        validator: &ValAddress,
    ) -> Result<Option<AggregateExchangeRateVote>, StoreError> {
        if let Some(staged) = self.overlay.borrow().votes.get(validator) {
            return Ok(staged.clone());
        }
        self.base.get_vote(validator)
    }

    fn put_vote(&self, vote: &AggregateExchangeRateVote) -> Result<(), StoreError> {
        self.stage(WriteOp::PutVote(vote.clone()), |o| {
            o.votes.insert(vote.voter.clone(), Some(vote.clone()));
        });
        Ok(())
    }

    fn delete_vote(&self, validator: &ValAddress) -> Result<(), StoreError> {
        self.stage(WriteOp::DeleteVote(validator.clone()), |o| {
            o.votes.insert(validator.clone(), None);
        });
        Ok(())
    }

    fn iter_votes(&self) -> Result<Vec<AggregateExchangeRateVote>, StoreError> {
        let base = self
            .base
            .iter_votes()?
            .into_iter()
            .map(|v| (v.voter.clone(), v))
            .collect();
        let overlay = self.overlay.borrow();
        Ok(merge(
            base,
            overlay.votes.iter().map(|(k, v)| (k.clone(), v.clone())),
        )
        .into_iter()
        .map(|(_, v)| v)
        .collect())
    }
}

impl<S: OracleStore> TobinTaxStore for StagingStore<'_, S> {
    fn get_tobin_tax(&self, denom: &str) -> Result<Option<Decimal>, StoreError> {
        let overlay = self.overlay.borrow();
        if let Some(tax) = overlay.tobin_taxes.get(denom) {
            return Ok(Some(*tax));
        }
        if overlay.tobin_taxes_cleared {
            return Ok(None);
        }
        self.base.get_tobin_tax(denom)
    }

    fn put_tobin_tax(&self, denom: &str, tax: Decimal) -> Result<(), StoreError> {
        self.stage(WriteOp::PutTobinTax(denom.to_string(), tax), |o| {
            o.tobin_taxes.insert(denom.to_string(), tax);
        });
        Ok(())
    }

    fn iter_tobin_taxes(&self) -> Result<Vec<(String, Decimal)>, StoreError> {
        let cleared = self.overlay.borrow().tobin_taxes_cleared;
        let base = if cleared {
            Vec::new()
        } else {
            self.base.iter_tobin_taxes()?
        };
        let overlay = self.overlay.borrow();
        Ok(merge(
            base,
            overlay.tobin_taxes.iter().map(|(k, v)| (k.clone(), Some(*v))),
        ))
    }

    fn clear_tobin_taxes(&self) -> Result<(), StoreError> {
        self.stage(WriteOp::ClearTobinTaxes, |o| {
            o.tobin_taxes.clear();
            o.tobin_taxes_cleared = true;
        });
        Ok(())
    }
}

impl<S: OracleStore> MissCounterStore for StagingStore<'_, S> {
    fn get_miss_counter(&self, validator: &ValAddress) -> Result<u64, StoreError> {
        if let Some(staged) = self.overlay.borrow().miss_counters.get(validator) {
            return Ok(staged.unwrap_or(0));
        }
        self.base.get_miss_counter(validator)
    }

    fn put_miss_counter(&self, validator: &ValAddress, count: u64) -> Result<(), StoreError> {
        self.stage(WriteOp::PutMissCounter(validator.clone(), count), |o| {
            o.miss_counters.insert(validator.clone(), Some(count));
        });
        Ok(())
    }

    fn delete_miss_counter(&self, validator: &ValAddress) -> Result<(), StoreError> {
        self.stage(WriteOp::DeleteMissCounter(validator.clone()), |o| {
            o.miss_counters.insert(validator.clone(), None);
        });
        Ok(())
    }

    fn iter_miss_counters(&self) -> Result<Vec<(ValAddress, u64)>, StoreError> {
        let base = self.base.iter_miss_counters()?;
        let overlay = self.overlay.borrow();
        Ok(merge(
            base,
            overlay.miss_counters.iter().map(|(k, v)| (k.clone(), *v)),
        ))
    }
}
