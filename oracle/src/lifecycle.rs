//! Per-validator submission lifecycle.
//!
//! ```text
//! NoPrevote ──commit──▶ Prevoted ──reveal──▶ Voted
//!     ▲                                        │
//!     └──────────── period boundary ───────────┘
//! ```
//!
//! A validator may hold a fresh prevote for the next period alongside this
//! period's revealed vote, so the phase is `Voted` whenever a vote exists.
//! `NoPrevote` and `Prevoted` are both miss states at the boundary.

use iq_crypto::aggregate_vote_hash;
use iq_store::{PrevoteStore, VoteStore};
use iq_types::{
    voting_period_of, AggregateExchangeRatePrevote, AggregateExchangeRateVote, AggregateVoteHash,
    BlockHeight, ExchangeRateTuple, ValAddress,
};
use serde::{Deserialize, Serialize};

use crate::OracleError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum VoterPhase {
    /// Nothing committed or revealed this period.
    NoPrevote,
    /// Committed, not yet revealed.
    Prevoted,
    /// Revealed a vote that matched its commitment. Terminal until the
    /// period boundary consumes it.
    Voted,
}

/// One validator's prevote and vote, loaded together.
#[derive(Clone, Debug)]
pub struct VoterLifecycle {
    validator: ValAddress,
    prevote: Option<AggregateExchangeRatePrevote>,
    vote: Option<AggregateExchangeRateVote>,
}

impl VoterLifecycle {
    pub fn load(
        store: &(impl PrevoteStore + VoteStore),
        validator: &ValAddress,
    ) -> Result<Self, OracleError> {
        Ok(Self {
            validator: validator.clone(),
            prevote: store.get_prevote(validator)?,
            vote: store.get_vote(validator)?,
        })
    }

    pub fn validator(&self) -> &ValAddress {
        &self.validator
    }

    pub fn prevote(&self) -> Option<&AggregateExchangeRatePrevote> {
        self.prevote.as_ref()
    }

    pub fn vote(&self) -> Option<&AggregateExchangeRateVote> {
        self.vote.as_ref()
    }

    pub fn phase(&self) -> VoterPhase {
        match (&self.vote, &self.prevote) {
            (Some(_), _) => VoterPhase::Voted,
            (None, Some(_)) => VoterPhase::Prevoted,
            (None, None) => VoterPhase::NoPrevote,
        }
    }

    /// Whether this validator counts as silent for the current period.
    pub fn is_miss(&self) -> bool {
        self.phase() != VoterPhase::Voted
    }

    /// Record a commitment. A later commitment replaces an earlier one.
    pub fn commit(&mut self, hash: AggregateVoteHash, height: BlockHeight) {
        self.prevote = Some(AggregateExchangeRatePrevote::new(
            hash,
            self.validator.clone(),
            height,
        ));
    }

    /// Reveal the committed vote.
    ///
    /// The reveal must land in the period right after the commitment and
    /// hash to the committed value. On success the prevote is consumed.
    pub fn reveal(
        &mut self,
        salt: &str,
        exchange_rates: &str,
        tuples: Vec<ExchangeRateTuple>,
        height: BlockHeight,
        vote_period: u64,
    ) -> Result<(), OracleError> {
        let prevote = self
            .prevote
            .as_ref()
            .ok_or_else(|| OracleError::NoAggregatePrevote(self.validator.clone()))?;

        let elapsed = voting_period_of(height, vote_period)
            .checked_sub(voting_period_of(prevote.submit_block, vote_period));
        if elapsed != Some(1) {
            return Err(OracleError::RevealPeriodMissMatch {
                submit_block: prevote.submit_block,
                height,
            });
        }

        let actual = aggregate_vote_hash(salt, exchange_rates, &self.validator);
        if actual != prevote.hash {
            return Err(OracleError::VerificationFailed {
                expected: prevote.hash.to_string(),
                actual: actual.to_string(),
            });
        }

        self.vote = Some(AggregateExchangeRateVote::new(tuples, self.validator.clone()));
        self.prevote = None;
        Ok(())
    }

    /// Write the current prevote and vote back, deleting absent records.
    pub fn save(&self, store: &(impl PrevoteStore + VoteStore)) -> Result<(), OracleError> {
        match &self.prevote {
            Some(prevote) => store.put_prevote(prevote)?,
            None => store.delete_prevote(&self.validator)?,
        }
        match &self.vote {
            Some(vote) => store.put_vote(vote)?,
            None => store.delete_vote(&self.validator)?,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use iq_nullables::NullOracleStore;
    use iq_types::parse_exchange_rate_tuples;

    fn val() -> ValAddress {
        ValAddress::new("iqvaloper1alice").unwrap()
    }

    #[test]
    fn full_cycle() {
        let store = NullOracleStore::new();
        let mut lc = VoterLifecycle::load(&store, &val()).unwrap();
        assert_eq!(lc.phase(), VoterPhase::NoPrevote);
        assert!(lc.is_miss());

        let rates = "1.5uusd";
        lc.commit(aggregate_vote_hash("ab", rates, &val()), 3);
        assert_eq!(lc.phase(), VoterPhase::Prevoted);
        assert!(lc.is_miss());

        let tuples = parse_exchange_rate_tuples(rates).unwrap();
        lc.reveal("ab", rates, tuples, 7, 5).unwrap();
        assert_eq!(lc.phase(), VoterPhase::Voted);
        assert!(!lc.is_miss());

        lc.save(&store).unwrap();
        let reloaded = VoterLifecycle::load(&store, &val()).unwrap();
        assert_eq!(reloaded.phase(), VoterPhase::Voted);
        assert!(reloaded.prevote().is_none());
    }

    #[test]
    fn reveal_without_prevote_rejected() {
        let store = NullOracleStore::new();
        let mut lc = VoterLifecycle::load(&store, &val()).unwrap();
        let err = lc.reveal("ab", "1uusd", vec![], 7, 5).unwrap_err();
        assert!(matches!(err, OracleError::NoAggregatePrevote(_)));
    }

    #[test]
    fn reveal_in_wrong_period_rejected() {
        let store = NullOracleStore::new();
        let mut lc = VoterLifecycle::load(&store, &val()).unwrap();
        lc.commit(aggregate_vote_hash("ab", "1uusd", &val()), 3);

        // Same period.
        let err = lc.reveal("ab", "1uusd", vec![], 4, 5).unwrap_err();
        assert!(matches!(err, OracleError::RevealPeriodMissMatch { .. }));
        // Two periods later.
        let err = lc.reveal("ab", "1uusd", vec![], 10, 5).unwrap_err();
        assert!(matches!(err, OracleError::RevealPeriodMissMatch { .. }));
        assert_eq!(lc.phase(), VoterPhase::Prevoted);
    }

    #[test]
    fn reveal_with_wrong_salt_rejected() {
        let store = NullOracleStore::new();
        let mut lc = VoterLifecycle::load(&store, &val()).unwrap();
        lc.commit(aggregate_vote_hash("ab", "1uusd", &val()), 3);
        let err = lc.reveal("ac", "1uusd", vec![], 5, 5).unwrap_err();
        assert!(matches!(err, OracleError::VerificationFailed { .. }));
    }

    #[test]
    fn new_prevote_alongside_vote_is_still_voted() {
        let store = NullOracleStore::new();
        let mut lc = VoterLifecycle::load(&store, &val()).unwrap();
        lc.commit(aggregate_vote_hash("ab", "1uusd", &val()), 3);
        lc.reveal("ab", "1uusd", vec![], 5, 5).unwrap();
        lc.commit(aggregate_vote_hash("cd", "2uusd", &val()), 5);
        assert_eq!(lc.phase(), VoterPhase::Voted);
    }
}
