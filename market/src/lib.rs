//! The market module's state surface.
//!
//! Swap pricing itself lives outside this workspace. What is here is what
//! the rest of the chain needs to agree on: market parameters, the market
//! genesis, swap messages with their stateless checks, and the parser that
//! turns a contract's custom JSON payload into one of those messages.

pub mod error;
pub mod genesis;
pub mod msgs;
pub mod params;
pub mod wasm;

pub use error::MarketError;
pub use genesis::MarketGenesis;
pub use msgs::{MsgSwap, MsgSwapSend};
pub use params::MarketParams;
pub use wasm::{parse_custom, parse_custom_query, MarketMsg, MarketQuery, QuerySwapParams};

/// Key of the market section in an application genesis.
pub const MODULE_NAME: &str = "market";
