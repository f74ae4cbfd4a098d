//! The prevote commitment.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::TypesError;

/// A 20-byte commitment over `salt:exchange_rates:validator`.
///
/// Serialized as lowercase hex.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AggregateVoteHash([u8; 20]);

impl AggregateVoteHash {
    pub const LEN: usize = 20;

    pub fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == [0u8; 20]
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, TypesError> {
        let arr: [u8; 20] = bytes.try_into().map_err(|_| {
            TypesError::InvalidHash(format!("expected {} bytes, got {}", Self::LEN, bytes.len()))
        })?;
        Ok(Self(arr))
    }
}

impl fmt::Debug for AggregateVoteHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AggregateVoteHash({})", hex::encode(&self.0[..4]))
    }
}

impl fmt::Display for AggregateVoteHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl FromStr for AggregateVoteHash {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s).map_err(|e| TypesError::InvalidHash(e.to_string()))?;
        Self::from_slice(&bytes)
    }
}

impl TryFrom<String> for AggregateVoteHash {
    type Error = TypesError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<AggregateVoteHash> for String {
    fn from(hash: AggregateVoteHash) -> Self {
        hash.to_string()
    }
}
