//! Contract custom-message and custom-query parsing.
//!
//! Contracts send `{"swap": {...}}` or `{"swap_send": {...}}`. The sender
//! fields are never taken from the payload: the calling contract is the
//! trader.

use iq_types::{AccAddress, Coin};
use serde::{Deserialize, Serialize};

use crate::{MarketError, MsgSwap, MsgSwapSend};

/// A parsed, validated market message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketMsg {
    Swap(MsgSwap),
    SwapSend(MsgSwapSend),
}

#[derive(Debug, Deserialize)]
struct SwapPayload {
    offer_coin: Coin,
    ask_denom: String,
}

#[derive(Debug, Deserialize)]
struct SwapSendPayload {
    to_address: AccAddress,
    offer_coin: Coin,
    ask_denom: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum CustomMsg {
    Swap(SwapPayload),
    SwapSend(SwapSendPayload),
}

/// serde reports an unrecognized enum tag as a data error whose message
/// starts with "unknown variant"; anything else is a malformed payload.
fn decode<T: serde::de::DeserializeOwned>(
    data: &[u8],
    unknown: &'static str,
) -> Result<T, MarketError> {
    serde_json::from_slice(data).map_err(|e| {
        if e.is_data() && e.to_string().starts_with("unknown variant") {
            MarketError::UnknownVariant(unknown)
        } else {
            MarketError::Malformed(e)
        }
    })
}

/// Decode a contract's custom message, with `contract` as the sender.
///
/// The payload must carry exactly one variant key.
pub fn parse_custom(contract: &AccAddress, data: &[u8]) -> Result<MarketMsg, MarketError> {
    let msg = match decode(data, "unknown variant of market")? {
        CustomMsg::Swap(p) => {
            let msg = MsgSwap {
                trader: contract.clone(),
                offer_coin: p.offer_coin,
                ask_denom: p.ask_denom,
            };
            msg.validate_basic()?;
            MarketMsg::Swap(msg)
        }
        CustomMsg::SwapSend(p) => {
            let msg = MsgSwapSend {
                from_address: contract.clone(),
                to_address: p.to_address,
                offer_coin: p.offer_coin,
                ask_denom: p.ask_denom,
            };
            msg.validate_basic()?;
            MarketMsg::SwapSend(msg)
        }
    };
    Ok(msg)
}

/// Parameters of a swap simulation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuerySwapParams {
    pub offer_coin: Coin,
    pub ask_denom: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketQuery {
    Swap(QuerySwapParams),
}

/// Decode a contract's custom query.
pub fn parse_custom_query(data: &[u8]) -> Result<MarketQuery, MarketError> {
    decode(data, "unknown market variant")
}
