use thiserror::Error;

/// Failure of an oracle storage backend.
///
/// Every variant is fatal to the block being applied; the node halts rather
/// than committing partial state.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A record the caller requires (such as the parameter set) is absent.
    #[error("missing record: {0}")]
    NotFound(String),

    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("cannot encode or decode record: {0}")]
    Serialization(String),

    /// A stored key or value does not decode to its expected shape.
    #[error("corrupted record: {0}")]
    Corruption(String),
}
