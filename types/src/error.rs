//! Error type for parsing and validating the fundamental types.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypesError {
    #[error("invalid address {address}: expected prefix {expected_prefix}")]
    InvalidAddress {
        address: String,
        expected_prefix: &'static str,
    },

    #[error("invalid denom: {0}")]
    InvalidDenom(String),

    #[error("invalid coin: {0}")]
    InvalidCoin(String),

    #[error("invalid decimal: {0}")]
    InvalidDecimal(String),

    #[error("invalid exchange rate tuple: {0}")]
    InvalidExchangeRate(String),

    #[error("duplicated denom {0}")]
    DuplicateDenom(String),

    #[error("invalid vote hash: {0}")]
    InvalidHash(String),

    #[error("invalid oracle params: {0}")]
    InvalidParams(String),
}
