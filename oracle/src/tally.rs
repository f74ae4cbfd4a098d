//! Weighted median tally and reward-band winner selection.

use iq_keepers::Winner;
use iq_types::Decimal;

use crate::ballot::ExchangeRateBallot;
use crate::claim::ClaimMap;
use crate::OracleError;

/// Result of tallying one passing ballot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TallyResult {
    pub median: Decimal,
    pub winners: Vec<Winner>,
}

/// Whether a ballot carries enough power to update its rate.
///
/// Requires non-zero power of at least `vote_threshold × total_bonded_power`.
pub fn ballot_is_passing(
    ballot: &ExchangeRateBallot,
    vote_threshold: Decimal,
    total_bonded_power: u64,
) -> Result<bool, OracleError> {
    let power = ballot.power();
    if power == 0 {
        return Ok(false);
    }
    let threshold = vote_threshold
        .checked_mul(Decimal::from(total_bonded_power))
        .ok_or(OracleError::Overflow("vote threshold"))?;
    let power = u64::try_from(power).map_err(|_| OracleError::Overflow("ballot power"))?;
    Ok(Decimal::from(power) >= threshold)
}

/// Tally a passing ballot: compute its weighted median and credit every
/// voter whose positive rate lies within `median ± median × reward_band / 2`.
///
/// Returns `None` for an empty ballot.
pub fn tally(
    ballot: &ExchangeRateBallot,
    reward_band: Decimal,
    claims: &mut ClaimMap,
) -> Result<Option<TallyResult>, OracleError> {
    let Some(median) = ballot.weighted_median() else {
        return Ok(None);
    };

    let spread = median
        .checked_mul(reward_band)
        .and_then(|v| v.checked_div(Decimal::TWO))
        .ok_or(OracleError::Overflow("reward spread"))?;
    let lower = median
        .checked_sub(spread)
        .ok_or(OracleError::Overflow("reward band lower bound"))?;
    let upper = median
        .checked_add(spread)
        .ok_or(OracleError::Overflow("reward band upper bound"))?;

    let mut winners = Vec::new();
    for entry in ballot.entries() {
        if entry.is_abstain() || entry.exchange_rate < lower || entry.exchange_rate > upper {
            continue;
        }
        if let Some(claim) = claims.get_mut(&entry.voter) {
            claim.record_win(entry.power)?;
        }
        winners.push(Winner {
            validator: entry.voter.clone(),
            power: entry.power,
        });
    }

    Ok(Some(TallyResult { median, winners }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ballot::VoteForTally;
    use crate::claim::ValidatorClaim;
    use iq_types::ValAddress;
    use rust_decimal_macros::dec;

    fn val(payload: &str) -> ValAddress {
        ValAddress::new(format!("iqvaloper1{payload}")).unwrap()
    }

    fn ballot(entries: &[(&str, Decimal, u64)]) -> ExchangeRateBallot {
        ExchangeRateBallot::new(
            entries
                .iter()
                .map(|(v, rate, power)| VoteForTally {
                    denom: "uusd".into(),
                    exchange_rate: *rate,
                    voter: val(v),
                    power: *power,
                })
                .collect(),
        )
    }

    fn claims(entries: &[(&str, u64)]) -> ClaimMap {
        entries
            .iter()
            .map(|(v, p)| (val(v), ValidatorClaim::new(val(v), *p)))
            .collect()
    }

    #[test]
    fn passing_requires_threshold_share() {
        let b = ballot(&[("a", dec!(1), 50)]);
        assert!(ballot_is_passing(&b, dec!(0.5), 100).unwrap());
        assert!(!ballot_is_passing(&b, dec!(0.5), 101).unwrap());
    }

    #[test]
    fn zero_power_ballot_never_passes() {
        let b = ballot(&[("a", dec!(0), 0)]);
        assert!(!ballot_is_passing(&b, dec!(0.5), 0).unwrap());
    }

    #[test]
    fn winners_inside_band_only() {
        // Median 100, band 10% → [95, 105].
        let b = ballot(&[
            ("a", dec!(94), 10),
            ("b", dec!(95), 10),
            ("c", dec!(100), 30),
            ("d", dec!(105), 10),
            ("e", dec!(106), 10),
        ]);
        let mut claims = claims(&[("a", 10), ("b", 10), ("c", 30), ("d", 10), ("e", 10)]);

        let result = tally(&b, dec!(0.1), &mut claims).unwrap().unwrap();
        assert_eq!(result.median, dec!(100));
        let winners: Vec<_> = result.winners.iter().map(|w| w.validator.clone()).collect();
        assert_eq!(winners, vec![val("b"), val("c"), val("d")]);

        assert_eq!(claims[&val("c")].weight, 30);
        assert_eq!(claims[&val("c")].win_count, 1);
        assert_eq!(claims[&val("a")].win_count, 0);
    }

    #[test]
    fn abstainers_never_win() {
        let b = ballot(&[("a", dec!(0), 0), ("b", dec!(2), 10)]);
        let mut claims = claims(&[("a", 10), ("b", 10)]);
        let result = tally(&b, dec!(1), &mut claims).unwrap().unwrap();
        assert_eq!(result.winners.len(), 1);
        assert_eq!(result.winners[0].validator, val("b"));
    }

    #[test]
    fn documented_example_median() {
        let b = ballot(&[("x", dec!(100), 10), ("y", dec!(110), 20), ("z", dec!(1000), 5)]);
        let mut claims = claims(&[("x", 10), ("y", 20), ("z", 5)]);
        let result = tally(&b, dec!(0.02), &mut claims).unwrap().unwrap();
        assert_eq!(result.median, dec!(110));
        assert_eq!(result.winners.len(), 1);
    }

    #[test]
    fn empty_ballot_tallies_to_none() {
        let mut claims = ClaimMap::new();
        assert!(tally(&ExchangeRateBallot::default(), dec!(0.02), &mut claims)
            .unwrap()
            .is_none());
    }
}
