use iq_types::BlockHeight;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NodeError {
    #[error("oracle error: {0}")]
    Oracle(#[from] iq_oracle::OracleError),

    #[error("market error: {0}")]
    Market(#[from] iq_market::MarketError),

    #[error("store error: {0}")]
    Store(#[from] iq_store::StoreError),

    #[error("lmdb error: {0}")]
    Lmdb(#[from] iq_store_lmdb::LmdbError),

    #[error("store failed integrity check: {0}")]
    Integrity(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("invalid genesis: {0}")]
    Genesis(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("logging error: {0}")]
    Logging(String),

    #[error("expected block {expected}, got {got}")]
    UnexpectedHeight { expected: BlockHeight, got: BlockHeight },

    #[error("no block in progress")]
    NoBlockInProgress,

    #[error("chain not initialized")]
    NotInitialized,

    #[error("node halted: {0}")]
    Halted(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
