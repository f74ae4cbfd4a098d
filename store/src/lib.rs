//! Abstract storage traits for the IQ oracle.
//!
//! Every storage backend (LMDB, in-memory for testing) implements these
//! traits. The oracle depends only on the traits.
//!
//! A block's writes are staged in a [`StagingStore`] and reach the backend
//! through [`BatchStore::write_batch`] only once the block has succeeded.
//!
//! Iteration methods return entries sorted by key. Tallying, miss counting
//! and slashing walk these collections, and every node has to walk them in
//! the same order.

pub mod batch;
pub mod error;
pub mod exchange_rate;
pub mod feeder;
pub mod meta;
pub mod miss_counter;
pub mod params;
pub mod prevote;
pub mod staging;
pub mod tobin_tax;
pub mod vote;

pub use batch::{BatchStore, WriteOp};
pub use error::StoreError;
pub use exchange_rate::ExchangeRateStore;
pub use feeder::FeederStore;
pub use meta::MetaStore;
pub use miss_counter::MissCounterStore;
pub use params::ParamStore;
pub use prevote::PrevoteStore;
pub use staging::{PendingWrites, StagingStore};
pub use tobin_tax::TobinTaxStore;
pub use vote::VoteStore;

/// Everything the oracle module persists.
pub trait OracleStore:
    ParamStore
    + ExchangeRateStore
    + FeederStore
    + PrevoteStore
    + VoteStore
    + TobinTaxStore
    + MissCounterStore
{
}

impl<T> OracleStore for T where
    T: ParamStore
        + ExchangeRateStore
        + FeederStore
        + PrevoteStore
        + VoteStore
        + TobinTaxStore
        + MissCounterStore
{
}
