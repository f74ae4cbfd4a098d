use iq_store::StoreError;
use iq_types::{AccAddress, TypesError, ValAddress};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OracleError {
    // ── Rejected submissions (no state change) ──
    #[error("invalid message: {0}")]
    InvalidMsg(String),

    #[error(transparent)]
    Types(#[from] TypesError),

    #[error("validator {0} does not exist")]
    ValidatorNotFound(ValAddress),

    #[error("feeder {feeder} is not allowed to vote for {validator}")]
    NoVotingPermission {
        feeder: AccAddress,
        validator: ValAddress,
    },

    #[error("no aggregate prevote from {0}")]
    NoAggregatePrevote(ValAddress),

    #[error("reveal period of submitted vote does not match the prevote's (prevote at {submit_block}, vote at {height})")]
    RevealPeriodMissMatch { submit_block: u64, height: u64 },

    #[error("unknown denom {0}")]
    UnknownDenom(String),

    #[error("vote does not match prevote hash: expected {expected}, got {actual}")]
    VerificationFailed { expected: String, actual: String },

    // ── Queries ──
    #[error("unknown query route: {0}")]
    UnknownQuery(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid query payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid genesis: {0}")]
    InvalidGenesis(String),

    // ── Fatal ──
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("arithmetic overflow: {0}")]
    Overflow(&'static str),
}

impl OracleError {
    /// Whether the node must halt rather than reject the input.
    pub fn is_fatal(&self) -> bool {
        matches!(self, OracleError::Store(_) | OracleError::Overflow(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_and_overflow_are_fatal() {
        assert!(OracleError::Store(StoreError::Backend("disk".into())).is_fatal());
        assert!(OracleError::Overflow("claim weight").is_fatal());
        assert!(!OracleError::UnknownDenom("ufoo".into()).is_fatal());
        assert!(!OracleError::InvalidMsg("empty salt".into()).is_fatal());
    }
}
