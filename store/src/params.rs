//! Oracle parameter storage trait.

use crate::StoreError;
use iq_types::OracleParams;

/// The single stored parameter set.
pub trait ParamStore {
    /// Current parameters. `NotFound` before genesis has been applied.
    fn get_params(&self) -> Result<OracleParams, StoreError>;

    fn put_params(&self, params: &OracleParams) -> Result<(), StoreError>;
}
