//! Market parameters.

use iq_types::params::BLOCKS_PER_DAY;
use iq_types::Decimal;
use serde::{Deserialize, Serialize};

use crate::MarketError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketParams {
    /// Size of the virtual liquidity pool, in micro units.
    pub base_pool: Decimal,
    /// Blocks for the pool delta to decay back to zero.
    pub pool_recovery_period: u64,
    pub min_stability_spread: Decimal,
}

impl Default for MarketParams {
    fn default() -> Self {
        Self {
            base_pool: Decimal::from(1_000_000_000_000u64),
            pool_recovery_period: BLOCKS_PER_DAY,
            min_stability_spread: Decimal::new(2, 2),
        }
    }
}

impl MarketParams {
    pub fn validate(&self) -> Result<(), MarketError> {
        if self.base_pool < Decimal::ZERO {
            return Err(MarketError::InvalidParams(format!(
                "base_pool must be >= 0, is {}",
                self.base_pool
            )));
        }
        if self.pool_recovery_period == 0 {
            return Err(MarketError::InvalidParams(
                "pool_recovery_period must be > 0".into(),
            ));
        }
        if self.min_stability_spread < Decimal::ZERO || self.min_stability_spread > Decimal::ONE {
            return Err(MarketError::InvalidParams(format!(
                "min_stability_spread must be in [0, 1], is {}",
                self.min_stability_spread
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn defaults_validate() {
        let params = MarketParams::default();
        params.validate().unwrap();
        assert_eq!(params.base_pool, dec!(1000000000000));
    }

    #[test]
    fn bounds_enforced() {
        let mut p = MarketParams::default();
        p.base_pool = dec!(-1);
        assert!(p.validate().is_err());

        let mut p = MarketParams::default();
        p.pool_recovery_period = 0;
        assert!(p.validate().is_err());

        let mut p = MarketParams::default();
        p.min_stability_spread = dec!(1.01);
        assert!(p.validate().is_err());
        p.min_stability_spread = dec!(1);
        assert!(p.validate().is_ok());
    }
}
