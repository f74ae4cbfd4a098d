//! Block-level write batches.
//!
//! A block's mutations are collected as [`WriteOp`]s and handed to the
//! backend in one call, which applies all of them together with the block
//! height or none of them.

use iq_types::{
    AccAddress, AggregateExchangeRatePrevote, AggregateExchangeRateVote, BlockHeight, Decimal,
    OracleParams, ValAddress,
};

use crate::StoreError;

/// One oracle store mutation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WriteOp {
    PutParams(OracleParams),
    PutExchangeRate(String, Decimal),
    DeleteExchangeRate(String),
    PutFeederDelegation(ValAddress, AccAddress),
    PutPrevote(AggregateExchangeRatePrevote),
    DeletePrevote(ValAddress),
    PutVote(AggregateExchangeRateVote),
    DeleteVote(ValAddress),
    PutTobinTax(String, Decimal),
    ClearTobinTaxes,
    PutMissCounter(ValAddress, u64),
    DeleteMissCounter(ValAddress),
}

/// A backend that can apply a batch of mutations atomically.
pub trait BatchStore {
    /// Apply `ops` in order. When `committed_height` is given it is
    /// recorded as the last committed block in the same transaction.
    fn write_batch(
        &self,
        ops: &[WriteOp],
        committed_height: Option<BlockHeight>,
    ) -> Result<(), StoreError>;

    /// Height of the last committed block, `None` before genesis.
    fn committed_height(&self) -> Result<Option<BlockHeight>, StoreError>;
}
