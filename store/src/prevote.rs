//! Aggregate prevote storage trait.

use crate::StoreError;
use iq_types::{AggregateExchangeRatePrevote, ValAddress};

/// At most one outstanding prevote per validator.
pub trait PrevoteStore {
    fn get_prevote(
        &self,
        validator: &ValAddress,
    ) -> Result<Option<AggregateExchangeRatePrevote>, StoreError>;

    /// Insert or replace the validator's prevote.
    fn put_prevote(&self, prevote: &AggregateExchangeRatePrevote) -> Result<(), StoreError>;

    fn delete_prevote(&self, validator: &ValAddress) -> Result<(), StoreError>;

    /// All prevotes, sorted by voter.
    fn iter_prevotes(&self) -> Result<Vec<AggregateExchangeRatePrevote>, StoreError>;
}
