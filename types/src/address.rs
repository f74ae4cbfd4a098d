//! Validator operator and account addresses.
//!
//! Both are bech32-style strings sharing one payload: a validator operator
//! `iqvaloper1<payload>` controls the account `iq1<payload>`. The payload is
//! restricted to lowercase ASCII alphanumerics so that string order equals
//! byte order, which the ballot tie-break relies on.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::TypesError;

fn valid_payload(payload: &str) -> bool {
    !payload.is_empty()
        && payload
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
}

/// A validator operator address, always prefixed with `iqvaloper1`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ValAddress(String);

impl ValAddress {
    pub const PREFIX: &'static str = "iqvaloper1";

    /// Parse a validator address, rejecting a wrong prefix or an empty payload.
    pub fn new(raw: impl Into<String>) -> Result<Self, TypesError> {
        let s = raw.into();
        match s.strip_prefix(Self::PREFIX) {
            Some(payload) if valid_payload(payload) => Ok(Self(s)),
            _ => Err(TypesError::InvalidAddress {
                address: s,
                expected_prefix: Self::PREFIX,
            }),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The part after the human-readable prefix.
    pub fn payload(&self) -> &str {
        &self.0[Self::PREFIX.len()..]
    }

    /// The operator's own account. This is the default price feeder.
    pub fn account(&self) -> AccAddress {
        AccAddress(format!("{}{}", AccAddress::PREFIX, self.payload()))
    }
}

impl fmt::Display for ValAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ValAddress {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for ValAddress {
    type Error = TypesError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<ValAddress> for String {
    fn from(addr: ValAddress) -> Self {
        addr.0
    }
}

/// An account address, always prefixed with `iq1`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccAddress(String);

impl AccAddress {
    pub const PREFIX: &'static str = "iq1";

    pub fn new(raw: impl Into<String>) -> Result<Self, TypesError> {
        let s = raw.into();
        match s.strip_prefix(Self::PREFIX) {
            Some(payload) if valid_payload(payload) => Ok(Self(s)),
            _ => Err(TypesError::InvalidAddress {
                address: s,
                expected_prefix: Self::PREFIX,
            }),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn payload(&self) -> &str {
        &self.0[Self::PREFIX.len()..]
    }
}

impl fmt::Display for AccAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for AccAddress {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for AccAddress {
    type Error = TypesError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<AccAddress> for String {
    fn from(addr: AccAddress) -> Self {
        addr.0
    }
}
