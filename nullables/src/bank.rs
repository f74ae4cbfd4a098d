//! Nullable bank keeper - in-memory denomination metadata.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use iq_keepers::BankKeeper;
use iq_types::DenomMetadata;

#[derive(Default)]
pub struct NullBankKeeper {
    metadata: Mutex<BTreeMap<String, DenomMetadata>>,
    writes: Mutex<u64>,
}

impl NullBankKeeper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `set_denom_metadata` calls so far.
    pub fn writes(&self) -> u64 {
        *self.writes.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn all_metadata(&self) -> Vec<DenomMetadata> {
        self.lock().values().cloned().collect()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, DenomMetadata>> {
        self.metadata.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl BankKeeper for NullBankKeeper {
    fn denom_metadata(&self, base: &str) -> Option<DenomMetadata> {
        self.lock().get(base).cloned()
    }

    fn set_denom_metadata(&self, metadata: DenomMetadata) {
        *self.writes.lock().unwrap_or_else(PoisonError::into_inner) += 1;
        self.lock().insert(metadata.base.clone(), metadata);
    }
}
