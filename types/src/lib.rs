//! Fundamental types for the IQ oracle.
//!
//! This crate defines the types shared across every other crate in the workspace:
//! validator and account addresses, coins, denominations, exchange-rate vote
//! records, the commit hash, oracle parameters and voting-period arithmetic.
//!
//! All rates and fractions are [`Decimal`] values. Nothing in this workspace
//! touches floating point: every node must reach bit-identical results.

pub mod address;
pub mod coin;
pub mod denom;
pub mod error;
pub mod exchange_rate;
pub mod hash;
pub mod params;
pub mod period;

pub use address::{AccAddress, ValAddress};
pub use coin::Coin;
pub use denom::{Denom, DenomList, DenomMetadata, DenomUnit};
pub use error::TypesError;
pub use exchange_rate::{
    parse_exchange_rate_tuples, AggregateExchangeRatePrevote, AggregateExchangeRateVote,
    ExchangeRateTuple,
};
pub use hash::AggregateVoteHash;
pub use params::OracleParams;
pub use period::{is_period_last_block, voting_period_of, BlockHeight};
pub use rust_decimal::Decimal;
