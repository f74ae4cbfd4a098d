//! Oracle parameters.
//!
//! Immutable between governance updates. Every update, and genesis, goes
//! through [`OracleParams::validate`].

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::denom::validate_denom;
use crate::{Denom, DenomList, TypesError};

/// Blocks per day at ~6s blocks.
pub const BLOCKS_PER_DAY: u64 = 14_400;

/// Denominations whitelisted at genesis.
pub const MICRO_KRW_DENOM: &str = "ukrw";
pub const MICRO_SDR_DENOM: &str = "usdr";
pub const MICRO_USD_DENOM: &str = "uusd";
pub const MICRO_MNT_DENOM: &str = "umnt";

/// All oracle parameters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleParams {
    /// Length of a voting period, in blocks.
    pub vote_period: u64,

    /// Minimum fraction of total bonded power a ballot needs to be tallied.
    pub vote_threshold: Decimal,

    /// Full width of the reward band around the median, relative to the median.
    pub reward_band: Decimal,

    /// Window, in blocks, over which a reward pool is paid out.
    pub reward_distribution_window: u64,

    /// Votable denominations and their tobin tax.
    pub whitelist: DenomList,

    /// Fraction of stake slashed for missing too many periods.
    pub slash_fraction: Decimal,

    /// Length of the miss-counting window, in voting periods.
    pub slash_window: u64,

    /// Minimum fraction of periods in a window with a valid vote.
    pub min_valid_per_window: Decimal,
}

impl OracleParams {
    /// Mainnet defaults.
    pub fn iq_defaults() -> Self {
        let vote_period = 5;
        Self {
            vote_period,
            vote_threshold: Decimal::new(50, 2),   // 50%
            reward_band: Decimal::new(2, 2),       // 2%
            reward_distribution_window: BLOCKS_PER_DAY * 365, // 1 year
            whitelist: DenomList::new(vec![
                Denom::new(MICRO_KRW_DENOM, Decimal::new(25, 4)),
                Denom::new(MICRO_SDR_DENOM, Decimal::new(25, 4)),
                Denom::new(MICRO_USD_DENOM, Decimal::new(25, 4)),
                Denom::new(MICRO_MNT_DENOM, Decimal::new(2, 2)),
            ]),
            slash_fraction: Decimal::new(1, 4), // 0.01%
            slash_window: BLOCKS_PER_DAY * 7 / vote_period, // 1 week of periods
            min_valid_per_window: Decimal::new(5, 2), // 5%
        }
    }

    /// Blocks in one slash window.
    pub fn slash_window_blocks(&self) -> u64 {
        self.slash_window.saturating_mul(self.vote_period)
    }

    /// Fraction of a reward pool paid out per voting period.
    pub fn distribution_ratio(&self) -> Decimal {
        if self.reward_distribution_window == 0 {
            return Decimal::ZERO;
        }
        Decimal::from(self.vote_period) / Decimal::from(self.reward_distribution_window)
    }

    pub fn validate(&self) -> Result<(), TypesError> {
        if self.vote_period == 0 {
            return Err(invalid("vote_period must be > 0"));
        }
        if self.vote_threshold <= Decimal::new(33, 2) || self.vote_threshold > Decimal::ONE {
            return Err(invalid(format!(
                "vote_threshold must be in (0.33, 1], is {}",
                self.vote_threshold
            )));
        }
        check_unit_interval("reward_band", self.reward_band)?;
        if self.reward_distribution_window < self.vote_period {
            return Err(invalid(format!(
                "reward_distribution_window ({}) must be >= vote_period ({})",
                self.reward_distribution_window, self.vote_period
            )));
        }
        check_unit_interval("slash_fraction", self.slash_fraction)?;
        if self.slash_window == 0 {
            return Err(invalid("slash_window must be > 0"));
        }
        check_unit_interval("min_valid_per_window", self.min_valid_per_window)?;

        let mut seen = BTreeSet::new();
        for denom in &self.whitelist {
            validate_denom(&denom.name)
                .map_err(|e| invalid(format!("whitelist: {e}")))?;
            check_unit_interval("whitelist tobin_tax", denom.tobin_tax)?;
            if !seen.insert(denom.name.as_str()) {
                return Err(invalid(format!("whitelist: duplicated denom {}", denom.name)));
            }
        }
        Ok(())
    }
}

impl Default for OracleParams {
    fn default() -> Self {
        Self::iq_defaults()
    }
}

fn invalid(msg: impl Into<String>) -> TypesError {
    TypesError::InvalidParams(msg.into())
}

fn check_unit_interval(name: &str, value: Decimal) -> Result<(), TypesError> {
    if value < Decimal::ZERO || value > Decimal::ONE {
        return Err(invalid(format!("{name} must be in [0, 1], is {value}")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn defaults_are_valid() {
        let params = OracleParams::default();
        params.validate().expect("defaults must validate");
        assert_eq!(params.slash_window_blocks(), BLOCKS_PER_DAY * 7);
    }

    #[test]
    fn zero_vote_period_rejected() {
        let params = OracleParams {
            vote_period: 0,
            ..OracleParams::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn vote_threshold_must_exceed_a_third() {
        let mut params = OracleParams::default();
        params.vote_threshold = dec!(0.33);
        assert!(params.validate().is_err());
        params.vote_threshold = dec!(0.34);
        assert!(params.validate().is_ok());
        params.vote_threshold = dec!(1.01);
        assert!(params.validate().is_err());
    }

    #[test]
    fn fractions_bounded() {
        let mut params = OracleParams::default();
        params.reward_band = dec!(-0.1);
        assert!(params.validate().is_err());

        let mut params = OracleParams::default();
        params.slash_fraction = dec!(1.5);
        assert!(params.validate().is_err());

        let mut params = OracleParams::default();
        params.min_valid_per_window = dec!(2);
        assert!(params.validate().is_err());
    }

    #[test]
    fn distribution_window_not_shorter_than_period() {
        let mut params = OracleParams::default();
        params.reward_distribution_window = params.vote_period - 1;
        assert!(params.validate().is_err());
    }

    #[test]
    fn whitelist_checked() {
        let mut params = OracleParams::default();
        params.whitelist = DenomList::new(vec![Denom::new("uusd", dec!(1.2))]);
        assert!(params.validate().is_err());

        params.whitelist = DenomList::new(vec![
            Denom::new("uusd", dec!(0.1)),
            Denom::new("uusd", dec!(0.2)),
        ]);
        assert!(params.validate().is_err());

        params.whitelist = DenomList::new(vec![Denom::new("u", dec!(0.1))]);
        assert!(params.validate().is_err());
    }

    #[test]
    fn distribution_ratio() {
        let mut params = OracleParams::default();
        params.vote_period = 5;
        params.reward_distribution_window = 50;
        assert_eq!(params.distribution_ratio(), dec!(0.1));
    }
}
