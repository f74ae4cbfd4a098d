//! Tobin tax storage trait.
//!
//! The key set of this table is the set of vote targets.

use crate::StoreError;
use iq_types::Decimal;

pub trait TobinTaxStore {
    fn get_tobin_tax(&self, denom: &str) -> Result<Option<Decimal>, StoreError>;

    fn put_tobin_tax(&self, denom: &str, tax: Decimal) -> Result<(), StoreError>;

    /// All entries, sorted by denomination.
    fn iter_tobin_taxes(&self) -> Result<Vec<(String, Decimal)>, StoreError>;

    /// Remove every entry.
    fn clear_tobin_taxes(&self) -> Result<(), StoreError>;
}
