//! Write batching: applies a block's mutations in a single LMDB write
//! transaction, together with the block's height.
//!
//! If the batch is dropped without calling [`WriteBatch::commit`], every
//! operation is rolled back (the underlying LMDB transaction is aborted).

use heed::types::Bytes;
use heed::{Database, RwTxn};

use iq_store::{BatchStore, StoreError, WriteOp};
use iq_types::BlockHeight;

use crate::codec::{decode_u64, encode};
use crate::oracle::{LmdbOracleStore, PARAMS_KEY};
use crate::LmdbError;

const LAST_HEIGHT_KEY: &[u8] = b"last_height";

pub struct WriteBatch<'a> {
    txn: RwTxn<'a>,
    store: &'a LmdbOracleStore,
    ops: usize,
}

impl<'a> WriteBatch<'a> {
    pub(crate) fn new(store: &'a LmdbOracleStore) -> Result<Self, StoreError> {
        let txn = store.env.write_txn().map_err(LmdbError::from)?;
        Ok(Self { txn, store, ops: 0 })
    }

    fn put(
        &mut self,
        db: Database<Bytes, Bytes>,
        key: &[u8],
        val: &[u8],
    ) -> Result<(), StoreError> {
        db.put(&mut self.txn, key, val).map_err(LmdbError::from)?;
        Ok(())
    }

    fn delete(&mut self, db: Database<Bytes, Bytes>, key: &[u8]) -> Result<(), StoreError> {
        db.delete(&mut self.txn, key).map_err(LmdbError::from)?;
        Ok(())
    }

    /// Stage one mutation in the open transaction.
    pub fn apply(&mut self, op: &WriteOp) -> Result<(), StoreError> {
        let dbs = self.store.dbs;
        match op {
            WriteOp::PutParams(params) => self.put(dbs.params, PARAMS_KEY, &encode(params)?)?,
            WriteOp::PutExchangeRate(denom, rate) => {
                self.put(dbs.exchange_rates, denom.as_bytes(), &encode(rate)?)?
            }
            WriteOp::DeleteExchangeRate(denom) => {
                self.delete(dbs.exchange_rates, denom.as_bytes())?
            }
            WriteOp::PutFeederDelegation(validator, feeder) => {
                self.put(dbs.feeders, validator.as_str().as_bytes(), &encode(feeder)?)?
            }
            WriteOp::PutPrevote(prevote) => {
                self.put(dbs.prevotes, prevote.voter.as_str().as_bytes(), &encode(prevote)?)?
            }
            WriteOp::DeletePrevote(validator) => {
                self.delete(dbs.prevotes, validator.as_str().as_bytes())?
            }
            WriteOp::PutVote(vote) => {
                self.put(dbs.votes, vote.voter.as_str().as_bytes(), &encode(vote)?)?
            }
            WriteOp::DeleteVote(validator) => {
                self.delete(dbs.votes, validator.as_str().as_bytes())?
            }
            WriteOp::PutTobinTax(denom, tax) => {
                self.put(dbs.tobin_taxes, denom.as_bytes(), &encode(tax)?)?
            }
            WriteOp::ClearTobinTaxes => {
                dbs.tobin_taxes
                    .clear(&mut self.txn)
                    .map_err(LmdbError::from)?;
            }
            WriteOp::PutMissCounter(validator, count) => self.put(
                dbs.miss_counters,
                validator.as_str().as_bytes(),
                &count.to_be_bytes(),
            )?,
            WriteOp::DeleteMissCounter(validator) => {
                self.delete(dbs.miss_counters, validator.as_str().as_bytes())?
            }
        }
        self.ops += 1;
        Ok(())
    }

    /// Record `height` as the last committed block.
    pub fn set_committed_height(&mut self, height: BlockHeight) -> Result<(), StoreError> {
        let meta = self.store.meta_db;
        self.put(meta, LAST_HEIGHT_KEY, &height.to_be_bytes())
    }

    /// Commit all staged operations atomically.
    pub fn commit(self) -> Result<(), StoreError> {
        let ops = self.ops;
        self.txn.commit().map_err(LmdbError::from)?;
        tracing::debug!(ops, "write batch committed");
        Ok(())
    }
}

impl LmdbOracleStore {
    /// Begin a write batch. Nothing is visible to readers until it commits.
    pub fn begin_batch(&self) -> Result<WriteBatch<'_>, StoreError> {
        WriteBatch::new(self)
    }
}

impl BatchStore for LmdbOracleStore {
    fn write_batch(
        &self,
        ops: &[WriteOp],
        committed_height: Option<BlockHeight>,
    ) -> Result<(), StoreError> {
        let mut batch = self.begin_batch()?;
        for op in ops {
            batch.apply(op)?;
        }
        if let Some(height) = committed_height {
            batch.set_committed_height(height)?;
        }
        batch.commit()
    }

    fn committed_height(&self) -> Result<Option<BlockHeight>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let val = self
            .meta_db
            .get(&rtxn, LAST_HEIGHT_KEY)
            .map_err(LmdbError::from)?;
        val.map(decode_u64).transpose()
    }
}
