//! Exchange-rate storage trait.

use crate::StoreError;
use iq_types::Decimal;

/// The latest agreed rate per denomination.
pub trait ExchangeRateStore {
    fn get_exchange_rate(&self, denom: &str) -> Result<Option<Decimal>, StoreError>;

    fn put_exchange_rate(&self, denom: &str, rate: Decimal) -> Result<(), StoreError>;

    fn delete_exchange_rate(&self, denom: &str) -> Result<(), StoreError>;

    /// All rates, sorted by denomination.
    fn iter_exchange_rates(&self) -> Result<Vec<(String, Decimal)>, StoreError>;
}
