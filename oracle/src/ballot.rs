//! Ballot construction.
//!
//! Every stored vote from a claimed validator is split into one entry per
//! denomination. Abstentions keep their slot but carry no power.

use std::collections::BTreeMap;

use iq_store::VoteStore;
use iq_types::{Decimal, ValAddress};
use serde::{Deserialize, Serialize};

use crate::claim::ClaimMap;
use crate::OracleError;

/// One validator's rate for one denomination, weighted for the tally.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteForTally {
    pub denom: String,
    pub exchange_rate: Decimal,
    pub voter: ValAddress,
    /// Claim power, or 0 for an abstention.
    pub power: u64,
}

impl VoteForTally {
    pub fn is_abstain(&self) -> bool {
        self.exchange_rate <= Decimal::ZERO
    }
}

/// All entries for one denomination, sorted by rate then voter.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExchangeRateBallot(Vec<VoteForTally>);

impl ExchangeRateBallot {
    /// Build a ballot from unordered entries.
    pub fn new(mut entries: Vec<VoteForTally>) -> Self {
        entries.sort_by(|a, b| {
            a.exchange_rate
                .cmp(&b.exchange_rate)
                .then_with(|| a.voter.cmp(&b.voter))
        });
        Self(entries)
    }

    pub fn entries(&self) -> &[VoteForTally] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Total power across all entries.
    pub fn power(&self) -> u128 {
        self.0.iter().map(|v| u128::from(v.power)).sum()
    }

    /// Rate of the first entry at which cumulative power reaches half the
    /// total. `None` for an empty ballot.
    pub fn weighted_median(&self) -> Option<Decimal> {
        let total = self.power();
        let mut cumulative: u128 = 0;
        for entry in &self.0 {
            cumulative += u128::from(entry.power);
            if cumulative * 2 >= total {
                return Some(entry.exchange_rate);
            }
        }
        None
    }
}

/// Group every claimed validator's vote into per-denomination ballots.
///
/// Pure read: nothing in the store changes.
pub fn organize_ballot_by_denom(
    store: &impl VoteStore,
    claims: &ClaimMap,
) -> Result<BTreeMap<String, ExchangeRateBallot>, OracleError> {
    let mut entries: BTreeMap<String, Vec<VoteForTally>> = BTreeMap::new();

    for vote in store.iter_votes()? {
        let Some(claim) = claims.get(&vote.voter) else {
            continue;
        };
        for tuple in vote.exchange_rate_tuples {
            let power = if tuple.is_abstain() { 0 } else { claim.power };
            entries
                .entry(tuple.denom.clone())
                .or_default()
                .push(VoteForTally {
                    denom: tuple.denom,
                    exchange_rate: tuple.exchange_rate,
                    voter: vote.voter.clone(),
                    power,
                });
        }
    }

    Ok(entries
        .into_iter()
        .map(|(denom, votes)| (denom, ExchangeRateBallot::new(votes)))
        .collect())
}
