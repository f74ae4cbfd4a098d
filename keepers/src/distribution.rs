//! Reward distribution collaborator.

use std::collections::BTreeMap;

use iq_types::{Decimal, ValAddress};
use serde::{Deserialize, Serialize};

/// A validator whose rate fell inside the reward band.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Winner {
    pub validator: ValAddress,
    pub power: u64,
}

/// Per-denomination winners of one voting period.
pub type BallotWinners = BTreeMap<String, Vec<Winner>>;

pub trait RewardDistributor {
    /// Pay `distribution_ratio` of the reward pool out to `winners`, in
    /// proportion to their winning power.
    fn distribute(&self, winners: &BallotWinners, distribution_ratio: Decimal);
}
