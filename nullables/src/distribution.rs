//! Nullable reward distributor - records every payout request.

use std::sync::{Mutex, PoisonError};

use iq_keepers::{BallotWinners, RewardDistributor};
use iq_types::Decimal;

#[derive(Default)]
pub struct NullRewardDistributor {
    calls: Mutex<Vec<(BallotWinners, Decimal)>>,
}

impl NullRewardDistributor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `distribute` call, oldest first.
    pub fn calls(&self) -> Vec<(BallotWinners, Decimal)> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl RewardDistributor for NullRewardDistributor {
    fn distribute(&self, winners: &BallotWinners, distribution_ratio: Decimal) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((winners.clone(), distribution_ratio));
    }
}
