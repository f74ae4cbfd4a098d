//! Votable denominations, their tobin tax, and bank display metadata.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::TypesError;

/// Validate a denomination name: a letter followed by 2..=127 characters
/// from `[a-zA-Z0-9/:._-]`.
pub fn validate_denom(denom: &str) -> Result<(), TypesError> {
    let bytes = denom.as_bytes();
    let well_formed = (3..=128).contains(&bytes.len())
        && bytes[0].is_ascii_alphabetic()
        && bytes[1..]
            .iter()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'/' | b':' | b'.' | b'_' | b'-'));
    if well_formed {
        Ok(())
    } else {
        Err(TypesError::InvalidDenom(denom.to_string()))
    }
}

/// A whitelisted denomination and the tobin tax charged on swaps into it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Denom {
    pub name: String,
    pub tobin_tax: Decimal,
}

impl Denom {
    pub fn new(name: impl Into<String>, tobin_tax: Decimal) -> Self {
        Self {
            name: name.into(),
            tobin_tax,
        }
    }
}

/// The `whitelist` parameter: every denomination validators may vote on.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DenomList(pub Vec<Denom>);

impl DenomList {
    pub fn new(denoms: Vec<Denom>) -> Self {
        Self(denoms)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Denom> {
        self.0.iter()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|d| d.name == name)
    }

    /// Name → tobin tax. Later duplicates win; params validation rejects duplicates.
    pub fn to_map(&self) -> BTreeMap<String, Decimal> {
        self.0
            .iter()
            .map(|d| (d.name.clone(), d.tobin_tax))
            .collect()
    }
}

impl<'a> IntoIterator for &'a DenomList {
    type Item = &'a Denom;
    type IntoIter = std::slice::Iter<'a, Denom>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<Denom> for DenomList {
    fn from_iter<I: IntoIterator<Item = Denom>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// One unit of a denomination's display ladder (micro, milli, whole).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DenomUnit {
    pub denom: String,
    pub exponent: u32,
    pub aliases: Vec<String>,
}

/// Display metadata registered with the bank for a denomination.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DenomMetadata {
    pub description: String,
    pub denom_units: Vec<DenomUnit>,
    pub base: String,
    pub display: String,
    pub name: String,
    pub symbol: String,
}
