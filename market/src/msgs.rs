//! Swap messages and their stateless checks.

use iq_types::denom::validate_denom;
use iq_types::{AccAddress, Coin};
use serde::{Deserialize, Serialize};

use crate::MarketError;

/// Swap `offer_coin` into `ask_denom` for the trader's own account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgSwap {
    pub trader: AccAddress,
    pub offer_coin: Coin,
    pub ask_denom: String,
}

/// Swap and send the proceeds to `to_address`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgSwapSend {
    pub from_address: AccAddress,
    pub to_address: AccAddress,
    pub offer_coin: Coin,
    pub ask_denom: String,
}

fn check_swap(offer_coin: &Coin, ask_denom: &str) -> Result<(), MarketError> {
    offer_coin.validate()?;
    if !offer_coin.is_positive() {
        return Err(MarketError::InvalidMsg(format!(
            "offer coin must be positive, got {offer_coin}"
        )));
    }
    validate_denom(ask_denom)?;
    if offer_coin.denom == ask_denom {
        return Err(MarketError::InvalidMsg(format!(
            "recursive swap: offer and ask denom are both {ask_denom}"
        )));
    }
    Ok(())
}

impl MsgSwap {
    pub fn validate_basic(&self) -> Result<(), MarketError> {
        check_swap(&self.offer_coin, &self.ask_denom)
    }
}

impl MsgSwapSend {
    pub fn validate_basic(&self) -> Result<(), MarketError> {
        check_swap(&self.offer_coin, &self.ask_denom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn swap(offer: &str, ask: &str) -> MsgSwap {
        MsgSwap {
            trader: AccAddress::new("iq1trader").unwrap(),
            offer_coin: offer.parse().unwrap(),
            ask_denom: ask.into(),
        }
    }

    #[test]
    fn valid_swap() {
        swap("1000ukrw", "uusd").validate_basic().unwrap();
    }

    #[test]
    fn zero_offer_rejected() {
        assert!(matches!(
            swap("0ukrw", "uusd").validate_basic(),
            Err(MarketError::InvalidMsg(_))
        ));
    }

    #[test]
    fn recursive_swap_rejected() {
        assert!(swap("5uusd", "uusd").validate_basic().is_err());
    }

    #[test]
    fn bad_ask_denom_rejected() {
        assert!(matches!(
            swap("5uusd", "u").validate_basic(),
            Err(MarketError::Types(_))
        ));
    }
}
