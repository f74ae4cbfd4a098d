//! Exchange-rate observations and the per-validator vote records.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::denom::validate_denom;
use crate::{AggregateVoteHash, BlockHeight, TypesError, ValAddress};

/// One observed rate for one denomination.
///
/// A rate of zero (or below) is an abstention.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeRateTuple {
    pub denom: String,
    pub exchange_rate: Decimal,
}

impl ExchangeRateTuple {
    pub fn new(denom: impl Into<String>, exchange_rate: Decimal) -> Self {
        Self {
            denom: denom.into(),
            exchange_rate,
        }
    }

    pub fn is_abstain(&self) -> bool {
        self.exchange_rate <= Decimal::ZERO
    }
}

impl fmt::Display for ExchangeRateTuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.exchange_rate, self.denom)
    }
}

/// Parses `<decimal><denom>`, e.g. `1234.5ukrw`. Signs are not accepted.
impl FromStr for ExchangeRateTuple {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let split = s
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .ok_or_else(|| TypesError::InvalidExchangeRate(format!("{s}: missing denom")))?;
        let (amount, denom) = s.split_at(split);
        if amount.is_empty() || amount.matches('.').count() > 1 || !amount.contains(char::is_numeric)
        {
            return Err(TypesError::InvalidExchangeRate(format!(
                "{s}: malformed amount"
            )));
        }
        let exchange_rate = Decimal::from_str(amount)
            .map_err(|e| TypesError::InvalidDecimal(format!("{amount}: {e}")))?;
        validate_denom(denom)?;
        Ok(Self::new(denom, exchange_rate))
    }
}

/// Parse a comma-separated list of tuples, rejecting duplicate denoms.
pub fn parse_exchange_rate_tuples(s: &str) -> Result<Vec<ExchangeRateTuple>, TypesError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(TypesError::InvalidExchangeRate("empty".to_string()));
    }

    let mut seen = BTreeSet::new();
    let mut tuples = Vec::new();
    for part in s.split(',') {
        let tuple: ExchangeRateTuple = part.parse()?;
        if !seen.insert(tuple.denom.clone()) {
            return Err(TypesError::DuplicateDenom(tuple.denom));
        }
        tuples.push(tuple);
    }
    Ok(tuples)
}

/// A validator's commitment to a not-yet-revealed vote.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateExchangeRatePrevote {
    pub hash: AggregateVoteHash,
    pub voter: ValAddress,
    pub submit_block: BlockHeight,
}

impl AggregateExchangeRatePrevote {
    pub fn new(hash: AggregateVoteHash, voter: ValAddress, submit_block: BlockHeight) -> Self {
        Self {
            hash,
            voter,
            submit_block,
        }
    }

    /// Whether this prevote is past its reveal window at `height`.
    pub fn is_expired(&self, height: BlockHeight, vote_period: u64) -> bool {
        height > self.submit_block.saturating_add(vote_period)
    }
}

/// A revealed vote: one rate per denomination.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateExchangeRateVote {
    pub exchange_rate_tuples: Vec<ExchangeRateTuple>,
    pub voter: ValAddress,
}

impl AggregateExchangeRateVote {
    pub fn new(exchange_rate_tuples: Vec<ExchangeRateTuple>, voter: ValAddress) -> Self {
        Self {
            exchange_rate_tuples,
            voter,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn parse_single_tuple() {
        let t: ExchangeRateTuple = "1234.5ukrw".parse().unwrap();
        assert_eq!(t.denom, "ukrw");
        assert_eq!(t.exchange_rate, dec!(1234.5));
        assert!(!t.is_abstain());
    }

    #[test]
    fn zero_rate_is_abstain() {
        let t: ExchangeRateTuple = "0.0uusd".parse().unwrap();
        assert!(t.is_abstain());
    }

    #[test]
    fn parse_list() {
        let tuples = parse_exchange_rate_tuples("1.5uusd,1200ukrw,0usdr").unwrap();
        assert_eq!(tuples.len(), 3);
        assert_eq!(tuples[1], ExchangeRateTuple::new("ukrw", dec!(1200)));
        assert!(tuples[2].is_abstain());
    }

    #[test]
    fn parse_rejects_bad_input() {
        assert!(parse_exchange_rate_tuples("").is_err());
        assert!(parse_exchange_rate_tuples("1.5").is_err());
        assert!(parse_exchange_rate_tuples("uusd").is_err());
        assert!(parse_exchange_rate_tuples("-1.5uusd").is_err());
        assert!(parse_exchange_rate_tuples("1..5uusd").is_err());
        assert!(parse_exchange_rate_tuples("1.5uusd,").is_err());
        assert!(parse_exchange_rate_tuples(".uusd").is_err());
    }

    #[test]
    fn parse_rejects_duplicate_denom() {
        let err = parse_exchange_rate_tuples("1.5uusd,2uusd").unwrap_err();
        assert_eq!(err, TypesError::DuplicateDenom("uusd".to_string()));
    }

    #[test]
    fn prevote_expiry_is_strictly_after_window() {
        let voter = ValAddress::new("iqvaloper1a").unwrap();
        let prevote = AggregateExchangeRatePrevote::new(AggregateVoteHash::default(), voter, 10);
        assert!(!prevote.is_expired(15, 5));
        assert!(prevote.is_expired(16, 5));
    }
}
