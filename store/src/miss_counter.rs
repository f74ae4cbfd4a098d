//! Miss counter storage trait.

use crate::StoreError;
use iq_types::ValAddress;

/// Periods missed by each validator within the current slash window.
///
/// A validator without an entry has missed zero periods.
pub trait MissCounterStore {
    fn get_miss_counter(&self, validator: &ValAddress) -> Result<u64, StoreError>;

    fn put_miss_counter(&self, validator: &ValAddress, count: u64) -> Result<(), StoreError>;

    fn delete_miss_counter(&self, validator: &ValAddress) -> Result<(), StoreError>;

    /// All non-zero counters, sorted by validator.
    fn iter_miss_counters(&self) -> Result<Vec<(ValAddress, u64)>, StoreError>;
}
