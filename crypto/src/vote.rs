//! Prevote commitments.
//!
//! A validator commits to `SHA256("{salt}:{exchange_rates}:{validator}")[..20]`
//! one period before revealing `salt` and `exchange_rates`. The rates string
//! is hashed exactly as submitted, so `1.0uusd` and `1uusd` commit differently.

use iq_types::{AggregateVoteHash, ValAddress};

use crate::hash::sha256_truncated;

/// Compute the commitment for a vote payload.
pub fn aggregate_vote_hash(
    salt: &str,
    exchange_rates: &str,
    validator: &ValAddress,
) -> AggregateVoteHash {
    let source = format!("{salt}:{exchange_rates}:{validator}");
    AggregateVoteHash::new(sha256_truncated(source.as_bytes()))
}

/// Whether a revealed payload matches a commitment.
pub fn verify_aggregate_vote_hash(
    expected: &AggregateVoteHash,
    salt: &str,
    exchange_rates: &str,
    validator: &ValAddress,
) -> bool {
    aggregate_vote_hash(salt, exchange_rates, validator) == *expected
}
