//! The IQ price oracle.
//!
//! Validators commit to a set of exchange rates with a prevote, reveal them
//! one voting period later, and at the end of each period the revealed votes
//! are tallied into one stake-weighted median rate per whitelisted
//! denomination.
//!
//! ## Module overview
//!
//! - [`msg`], [`msg_server`]: prevote, vote and feeder-delegation messages.
//! - [`lifecycle`]: per-validator `NoPrevote → Prevoted → Voted` state machine.
//! - [`claim`]: per-tally validator claims built from the bonded set.
//! - [`ballot`]: groups revealed votes into sorted per-denomination ballots.
//! - [`tally`]: quorum check, weighted median, reward-band winners.
//! - [`slashing`]: miss counting, slashing and jailing.
//! - [`whitelist`]: keeps the tobin-tax table in step with the whitelist.
//! - [`abci`]: the end-of-block driver tying it all together.
//! - [`querier`], [`genesis`]: read-only queries, state import and export.
//!
//! All arithmetic is on [`iq_types::Decimal`] and integers, and every
//! collection that drives a decision is iterated in key order.

pub mod abci;
pub mod ballot;
pub mod claim;
pub mod error;
pub mod genesis;
pub mod lifecycle;
pub mod msg;
pub mod msg_server;
pub mod querier;
pub mod slashing;
pub mod tally;
pub mod whitelist;

pub use abci::{clear_ballots, end_blocker, EndBlockOutcome};
pub use ballot::{organize_ballot_by_denom, ExchangeRateBallot, VoteForTally};
pub use claim::{build_claim_map, ClaimMap, ValidatorClaim};
pub use error::OracleError;
pub use genesis::{export_genesis, init_genesis, GenesisState};
pub use lifecycle::{VoterLifecycle, VoterPhase};
pub use msg::{
    MsgAggregateExchangeRatePrevote, MsgAggregateExchangeRateVote, MsgDelegateFeedConsent,
    OracleMsg,
};
pub use msg_server::handle_msg;
pub use querier::Querier;
pub use slashing::{count_misses, slash_and_reset_miss_counters};
pub use tally::{ballot_is_passing, tally, TallyResult};
pub use whitelist::{apply_whitelist, denom_metadata_for};
