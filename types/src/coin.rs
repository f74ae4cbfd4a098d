//! Integer token amounts.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::denom::validate_denom;
use crate::TypesError;

/// An amount of a single denomination in its smallest unit.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coin {
    pub denom: String,
    pub amount: u128,
}

impl Coin {
    pub fn new(denom: impl Into<String>, amount: u128) -> Result<Self, TypesError> {
        let denom = denom.into();
        validate_denom(&denom)?;
        Ok(Self { denom, amount })
    }

    pub fn is_positive(&self) -> bool {
        self.amount > 0
    }

    /// Check the denom; `serde` does not run the constructor.
    pub fn validate(&self) -> Result<(), TypesError> {
        validate_denom(&self.denom)
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

/// Parses `<amount><denom>`, e.g. `1000ukrw`.
impl FromStr for Coin {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let split = s
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(|| TypesError::InvalidCoin(s.to_string()))?;
        let (amount, denom) = s.split_at(split);
        if amount.is_empty() {
            return Err(TypesError::InvalidCoin(s.to_string()));
        }
        let amount = amount
            .parse::<u128>()
            .map_err(|e| TypesError::InvalidCoin(format!("{s}: {e}")))?;
        Coin::new(denom, amount)
    }
}
