use thiserror::Error;

#[derive(Debug, Error)]
pub enum LmdbError {
    #[error("LMDB error: {0}")]
    Heed(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("key not found: {0}")]
    NotFound(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("unsupported schema: {0}")]
    Schema(String),

    #[error(transparent)]
    Store(#[from] iq_store::StoreError),
}

impl From<heed::Error> for LmdbError {
    fn from(e: heed::Error) -> Self {
        LmdbError::Heed(e.to_string())
    }
}

impl From<LmdbError> for iq_store::StoreError {
    fn from(e: LmdbError) -> Self {
        match e {
            LmdbError::NotFound(key) => iq_store::StoreError::NotFound(key),
            LmdbError::Serialization(msg) => iq_store::StoreError::Serialization(msg),
            LmdbError::Store(inner) => inner,
            other => iq_store::StoreError::Backend(other.to_string()),
        }
    }
}
