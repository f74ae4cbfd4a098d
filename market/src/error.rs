use iq_types::TypesError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MarketError {
    #[error("malformed market payload: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("{0}")]
    UnknownVariant(&'static str),

    #[error("invalid market message: {0}")]
    InvalidMsg(String),

    #[error("invalid market params: {0}")]
    InvalidParams(String),

    #[error(transparent)]
    Types(#[from] TypesError),
}
