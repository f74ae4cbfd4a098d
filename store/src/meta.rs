//! Metadata storage trait.

use crate::StoreError;

/// Internal bookkeeping that doesn't belong in any domain store.
pub trait MetaStore {
    fn put_meta(&self, key: &str, value: &[u8]) -> Result<(), StoreError>;

    fn get_meta(&self, key: &str) -> Result<Vec<u8>, StoreError>;

    /// Get the database schema version (convenience wrapper).
    fn get_schema_version(&self) -> Result<u32, StoreError>;

    fn set_schema_version(&self, version: u32) -> Result<(), StoreError>;
}
