//! Oracle transaction messages and their stateless validation.

use iq_types::{parse_exchange_rate_tuples, AccAddress, AggregateVoteHash, ValAddress};
use serde::{Deserialize, Serialize};

use crate::OracleError;

/// Longest accepted salt, in characters.
pub const MAX_SALT_LEN: usize = 4;

/// Longest accepted exchange-rate string, in bytes.
pub const MAX_EXCHANGE_RATES_LEN: usize = 4096;

/// Commit to a vote to be revealed next period.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgAggregateExchangeRatePrevote {
    pub hash: AggregateVoteHash,
    pub feeder: AccAddress,
    pub validator: ValAddress,
}

/// Reveal the vote committed last period.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgAggregateExchangeRateVote {
    pub salt: String,
    /// Comma-separated `<decimal><denom>` list, hashed exactly as given.
    pub exchange_rates: String,
    pub feeder: AccAddress,
    pub validator: ValAddress,
}

/// Let `delegate` submit votes on the operator's behalf.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgDelegateFeedConsent {
    pub operator: ValAddress,
    pub delegate: AccAddress,
}

/// Every message the oracle accepts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OracleMsg {
    AggregateExchangeRatePrevote(MsgAggregateExchangeRatePrevote),
    AggregateExchangeRateVote(MsgAggregateExchangeRateVote),
    DelegateFeedConsent(MsgDelegateFeedConsent),
}

impl MsgAggregateExchangeRatePrevote {
    pub fn validate_basic(&self) -> Result<(), OracleError> {
        if self.hash.is_empty() {
            return Err(OracleError::InvalidMsg("prevote hash is empty".into()));
        }
        Ok(())
    }
}

impl MsgAggregateExchangeRateVote {
    pub fn validate_basic(&self) -> Result<(), OracleError> {
        let salt_len = self.salt.chars().count();
        if salt_len == 0 || salt_len > MAX_SALT_LEN {
            return Err(OracleError::InvalidMsg(format!(
                "salt must be 1 to {MAX_SALT_LEN} characters, got {salt_len}"
            )));
        }
        if self.exchange_rates.is_empty() {
            return Err(OracleError::InvalidMsg("exchange rates are empty".into()));
        }
        if self.exchange_rates.len() > MAX_EXCHANGE_RATES_LEN {
            return Err(OracleError::InvalidMsg(format!(
                "exchange rates exceed {MAX_EXCHANGE_RATES_LEN} bytes"
            )));
        }
        parse_exchange_rate_tuples(&self.exchange_rates)?;
        Ok(())
    }
}

impl MsgDelegateFeedConsent {
    pub fn validate_basic(&self) -> Result<(), OracleError> {
        Ok(())
    }
}

impl OracleMsg {
    pub fn validate_basic(&self) -> Result<(), OracleError> {
        match self {
            OracleMsg::AggregateExchangeRatePrevote(msg) => msg.validate_basic(),
            OracleMsg::AggregateExchangeRateVote(msg) => msg.validate_basic(),
            OracleMsg::DelegateFeedConsent(msg) => msg.validate_basic(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vote(salt: &str, rates: &str) -> MsgAggregateExchangeRateVote {
        MsgAggregateExchangeRateVote {
            salt: salt.into(),
            exchange_rates: rates.into(),
            feeder: AccAddress::new("iq1feeder").unwrap(),
            validator: ValAddress::new("iqvaloper1val").unwrap(),
        }
    }

    #[test]
    fn salt_length_bounds() {
        assert!(vote("", "1uusd").validate_basic().is_err());
        assert!(vote("a", "1uusd").validate_basic().is_ok());
        assert!(vote("abcd", "1uusd").validate_basic().is_ok());
        assert!(vote("abcde", "1uusd").validate_basic().is_err());
    }

    #[test]
    fn rates_must_parse() {
        assert!(vote("ab", "").validate_basic().is_err());
        assert!(vote("ab", "-1uusd").validate_basic().is_err());
        assert!(vote("ab", "1uusd,2uusd").validate_basic().is_err());
        assert!(vote("ab", &"1uusd,".repeat(1000)).validate_basic().is_err());
        assert!(vote("ab", "0uusd,1.5ukrw").validate_basic().is_ok());
    }

    #[test]
    fn empty_prevote_hash_rejected() {
        let msg = MsgAggregateExchangeRatePrevote {
            hash: AggregateVoteHash::default(),
            feeder: AccAddress::new("iq1feeder").unwrap(),
            validator: ValAddress::new("iqvaloper1val").unwrap(),
        };
        assert!(msg.validate_basic().is_err());
    }

    #[test]
    fn msg_enum_is_externally_tagged() {
        let msg = OracleMsg::DelegateFeedConsent(MsgDelegateFeedConsent {
            operator: ValAddress::new("iqvaloper1val").unwrap(),
            delegate: AccAddress::new("iq1feeder").unwrap(),
        });
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.starts_with(r#"{"delegate_feed_consent":"#));
        let back: OracleMsg = serde_json::from_str(&json).unwrap();
        assert_eq!(back, msg);
    }
}
