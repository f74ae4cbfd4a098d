//! LMDB implementation of the oracle storage traits.
//!
//! A direct mutation runs in its own write transaction and commits before
//! returning. Block processing goes through
//! [`write_batch`](iq_store::BatchStore::write_batch) instead, which applies
//! a whole block in one transaction.

use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env};

use iq_store::{
    ExchangeRateStore, FeederStore, MissCounterStore, ParamStore, PrevoteStore, StoreError,
    TobinTaxStore, VoteStore,
};
use iq_types::{
    AccAddress, AggregateExchangeRatePrevote, AggregateExchangeRateVote, Decimal, OracleParams,
    ValAddress,
};

use crate::codec::{decode, decode_str, decode_u64, decode_validator, encode};
use crate::LmdbError;

pub(crate) const PARAMS_KEY: &[u8] = b"oracle";

#[derive(Clone, Copy)]
pub(crate) struct OracleDatabases {
    pub(crate) params: Database<Bytes, Bytes>,
    pub(crate) exchange_rates: Database<Bytes, Bytes>,
    pub(crate) feeders: Database<Bytes, Bytes>,
    pub(crate) prevotes: Database<Bytes, Bytes>,
    pub(crate) votes: Database<Bytes, Bytes>,
    pub(crate) tobin_taxes: Database<Bytes, Bytes>,
    pub(crate) miss_counters: Database<Bytes, Bytes>,
}

#[derive(Clone)]
pub struct LmdbOracleStore {
    pub(crate) env: Arc<Env>,
    pub(crate) dbs: OracleDatabases,
    pub(crate) meta_db: Database<Bytes, Bytes>,
}

impl LmdbOracleStore {
    fn put_raw(&self, db: Database<Bytes, Bytes>, key: &[u8], val: &[u8]) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        db.put(&mut wtxn, key, val).map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn get_raw(&self, db: Database<Bytes, Bytes>, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let val = db.get(&rtxn, key).map_err(LmdbError::from)?;
        Ok(val.map(<[u8]>::to_vec))
    }

    fn delete_raw(&self, db: Database<Bytes, Bytes>, key: &[u8]) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        db.delete(&mut wtxn, key).map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    /// All entries in key order.
    fn iter_raw(&self, db: Database<Bytes, Bytes>) -> Result<Vec<(Vec<u8>, Vec<u8>)>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let iter = db.iter(&rtxn).map_err(LmdbError::from)?;
        let mut results = Vec::new();
        for entry in iter {
            let (key, val) = entry.map_err(LmdbError::from)?;
            results.push((key.to_vec(), val.to_vec()));
        }
        Ok(results)
    }
}

// ── Params ──────────────────────────────────────────────────────────────

impl ParamStore for LmdbOracleStore {
    fn get_params(&self) -> Result<OracleParams, StoreError> {
        match self.get_raw(self.dbs.params, PARAMS_KEY)? {
            Some(bytes) => decode(&bytes),
            None => Err(StoreError::NotFound("oracle params".into())),
        }
    }

    fn put_params(&self, params: &OracleParams) -> Result<(), StoreError> {
        self.put_raw(self.dbs.params, PARAMS_KEY, &encode(params)?)
    }
}

// ── Exchange rates ──────────────────────────────────────────────────────

impl ExchangeRateStore for LmdbOracleStore {
    fn get_exchange_rate(&self, denom: &str) -> Result<Option<Decimal>, StoreError> {
        self.get_raw(self.dbs.exchange_rates, denom.as_bytes())?
            .map(|bytes| decode(&bytes))
            .transpose()
    }

    fn put_exchange_rate(&self, denom: &str, rate: Decimal) -> Result<(), StoreError> {
        self.put_raw(self.dbs.exchange_rates, denom.as_bytes(), &encode(&rate)?)
    }

    fn delete_exchange_rate(&self, denom: &str) -> Result<(), StoreError> {
        self.delete_raw(self.dbs.exchange_rates, denom.as_bytes())
    }

    fn iter_exchange_rates(&self) -> Result<Vec<(String, Decimal)>, StoreError> {
        self.iter_raw(self.dbs.exchange_rates)?
            .into_iter()
            .map(|(key, val)| Ok((decode_str(&key)?, decode(&val)?)))
            .collect()
    }
}

// ── Feeder delegations ──────────────────────────────────────────────────

impl FeederStore for LmdbOracleStore {
    fn get_feeder_delegation(
        &self,
        validator: &ValAddress,
    ) -> Result<Option<AccAddress>, StoreError> {
        self.get_raw(self.dbs.feeders, validator.as_str().as_bytes())?
            .map(|bytes| decode(&bytes))
            .transpose()
    }

    fn put_feeder_delegation(
        &self,
        validator: &ValAddress,
        feeder: &AccAddress,
    ) -> Result<(), StoreError> {
        self.put_raw(self.dbs.feeders, validator.as_str().as_bytes(), &encode(feeder)?)
    }

    fn iter_feeder_delegations(&self) -> Result<Vec<(ValAddress, AccAddress)>, StoreError> {
        self.iter_raw(self.dbs.feeders)?
            .into_iter()
            .map(|(key, val)| Ok((decode_validator(&key)?, decode(&val)?)))
            .collect()
    }
}

// ── Prevotes ────────────────────────────────────────────────────────────

impl PrevoteStore for LmdbOracleStore {
    fn get_prevote(
        &self,
        validator: &ValAddress,
    ) -> Result<Option<AggregateExchangeRatePrevote>, StoreError> {
        self.get_raw(self.dbs.prevotes, validator.as_str().as_bytes())?
            .map(|bytes| decode(&bytes))
            .transpose()
    }

    fn put_prevote(&self, prevote: &AggregateExchangeRatePrevote) -> Result<(), StoreError> {
        self.put_raw(
            self.dbs.prevotes,
            prevote.voter.as_str().as_bytes(),
            &encode(prevote)?,
        )
    }

    fn delete_prevote(&self, validator: &ValAddress) -> Result<(), StoreError> {
        self.delete_raw(self.dbs.prevotes, validator.as_str().as_bytes())
    }

    fn iter_prevotes(&self) -> Result<Vec<AggregateExchangeRatePrevote>, StoreError> {
        self.iter_raw(self.dbs.prevotes)?
            .into_iter()
            .map(|(_, val)| decode(&val))
            .collect()
    }
}

// ── Votes ───────────────────────────────────────────────────────────────

impl VoteStore for LmdbOracleStore {
    fn get_vote(
        &self,
        validator: &ValAddress,
    ) -> Result<Option<AggregateExchangeRateVote>, StoreError> {
        self.get_raw(self.dbs.votes, validator.as_str().as_bytes())?
            .map(|bytes| decode(&bytes))
            .transpose()
    }

    fn put_vote(&self, vote: &AggregateExchangeRateVote) -> Result<(), StoreError> {
        self.put_raw(self.dbs.votes, vote.voter.as_str().as_bytes(), &encode(vote)?)
    }

    fn delete_vote(&self, validator: &ValAddress) -> Result<(), StoreError> {
        self.delete_raw(self.dbs.votes, validator.as_str().as_bytes())
    }

    fn iter_votes(&self) -> Result<Vec<AggregateExchangeRateVote>, StoreError> {
        self.iter_raw(self.dbs.votes)?
            .into_iter()
            .map(|(_, val)| decode(&val))
            .collect()
    }
}

// ── Tobin taxes ─────────────────────────────────────────────────────────

impl TobinTaxStore for LmdbOracleStore {
    fn get_tobin_tax(&self, denom: &str) -> Result<Option<Decimal>, StoreError> {
        self.get_raw(self.dbs.tobin_taxes, denom.as_bytes())?
            .map(|bytes| decode(&bytes))
            .transpose()
    }

    fn put_tobin_tax(&self, denom: &str, tax: Decimal) -> Result<(), StoreError> {
        self.put_raw(self.dbs.tobin_taxes, denom.as_bytes(), &encode(&tax)?)
    }

    fn iter_tobin_taxes(&self) -> Result<Vec<(String, Decimal)>, StoreError> {
        self.iter_raw(self.dbs.tobin_taxes)?
            .into_iter()
            .map(|(key, val)| Ok((decode_str(&key)?, decode(&val)?)))
            .collect()
    }

    fn clear_tobin_taxes(&self) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.dbs
            .tobin_taxes
            .clear(&mut wtxn)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }
}

// ── Miss counters ───────────────────────────────────────────────────────

impl MissCounterStore for LmdbOracleStore {
    fn get_miss_counter(&self, validator: &ValAddress) -> Result<u64, StoreError> {
        match self.get_raw(self.dbs.miss_counters, validator.as_str().as_bytes())? {
            Some(bytes) => decode_u64(&bytes),
            None => Ok(0),
        }
    }

    fn put_miss_counter(&self, validator: &ValAddress, count: u64) -> Result<(), StoreError> {
        self.put_raw(
            self.dbs.miss_counters,
            validator.as_str().as_bytes(),
            &count.to_be_bytes(),
        )
    }

    fn delete_miss_counter(&self, validator: &ValAddress) -> Result<(), StoreError> {
        self.delete_raw(self.dbs.miss_counters, validator.as_str().as_bytes())
    }

    fn iter_miss_counters(&self) -> Result<Vec<(ValAddress, u64)>, StoreError> {
        self.iter_raw(self.dbs.miss_counters)?
            .into_iter()
            .map(|(key, val)| Ok((decode_validator(&key)?, decode_u64(&val)?)))
            .collect()
    }
}
