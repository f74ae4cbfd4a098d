//! Feeder delegation storage trait.

use crate::StoreError;
use iq_types::{AccAddress, ValAddress};

/// Which account may submit votes on behalf of a validator.
///
/// A validator without an entry is fed by its own operator account.
pub trait FeederStore {
    fn get_feeder_delegation(&self, validator: &ValAddress)
        -> Result<Option<AccAddress>, StoreError>;

    fn put_feeder_delegation(
        &self,
        validator: &ValAddress,
        feeder: &AccAddress,
    ) -> Result<(), StoreError>;

    /// All explicit delegations, sorted by validator.
    fn iter_feeder_delegations(&self) -> Result<Vec<(ValAddress, AccAddress)>, StoreError>;
}
