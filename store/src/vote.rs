//! Aggregate vote storage trait.

use crate::StoreError;
use iq_types::{AggregateExchangeRateVote, ValAddress};

/// At most one revealed vote per validator for the current period.
pub trait VoteStore {
    fn get_vote(&self, validator: &ValAddress)
        -> Result<Option<AggregateExchangeRateVote>, StoreError>;

    /// Insert or replace the validator's vote.
    fn put_vote(&self, vote: &AggregateExchangeRateVote) -> Result<(), StoreError>;

    fn delete_vote(&self, validator: &ValAddress) -> Result<(), StoreError>;

    /// All votes, sorted by voter.
    fn iter_votes(&self) -> Result<Vec<AggregateExchangeRateVote>, StoreError>;
}
