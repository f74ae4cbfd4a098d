use proptest::prelude::*;

use iq_nullables::{NullOracleStore, NullStakingKeeper};
use iq_oracle::{build_claim_map, organize_ballot_by_denom, tally, ExchangeRateBallot, VoteForTally};
use iq_store::VoteStore;
use iq_types::{AggregateExchangeRateVote, Decimal, ExchangeRateTuple, ValAddress};

fn val(i: usize) -> ValAddress {
    ValAddress::new(format!("iqvaloper1v{i:03}")).unwrap()
}

fn ballot_from(entries: &[(u32, u64)]) -> ExchangeRateBallot {
    ExchangeRateBallot::new(
        entries
            .iter()
            .enumerate()
            .map(|(i, (rate, power))| VoteForTally {
                denom: "uusd".into(),
                exchange_rate: Decimal::from(*rate),
                voter: val(i),
                power: *power,
            })
            .collect(),
    )
}

proptest! {
    /// The median is the smallest rate whose cumulative power reaches half the total.
    #[test]
    fn weighted_median_is_minimal_half_point(
        entries in prop::collection::vec((1u32..10_000, 1u64..1_000), 1..40),
    ) {
        let ballot = ballot_from(&entries);
        let median = ballot.weighted_median().unwrap();
        let total = ballot.power();

        let at_or_below: u128 = ballot
            .entries()
            .iter()
            .filter(|e| e.exchange_rate <= median)
            .map(|e| e.power as u128)
            .sum();
        let strictly_below: u128 = ballot
            .entries()
            .iter()
            .filter(|e| e.exchange_rate < median)
            .map(|e| e.power as u128)
            .sum();
        prop_assert!(2 * at_or_below >= total);
        prop_assert!(2 * strictly_below < total);
    }

    /// The median is always one of the submitted rates.
    #[test]
    fn weighted_median_is_a_submitted_rate(
        entries in prop::collection::vec((1u32..10_000, 1u64..1_000), 1..40),
    ) {
        let ballot = ballot_from(&entries);
        let median = ballot.weighted_median().unwrap();
        prop_assert!(ballot.entries().iter().any(|e| e.exchange_rate == median));
    }

    /// Winners always lie within the reward band around the median.
    #[test]
    fn winners_lie_inside_reward_band(
        entries in prop::collection::vec((1u32..10_000, 1u64..1_000), 1..40),
        band_bp in 0i64..5_000,
    ) {
        let ballot = ballot_from(&entries);
        let band = Decimal::new(band_bp, 4);
        let result = tally(&ballot, band, &mut Default::default()).unwrap().unwrap();
        let spread = result.median * band / Decimal::TWO;

        for winner in &result.winners {
            let entry = ballot.entries().iter().find(|e| e.voter == winner.validator).unwrap();
            prop_assert!(entry.exchange_rate >= result.median - spread);
            prop_assert!(entry.exchange_rate <= result.median + spread);
        }
    }

    /// Abstaining votes join the ballot with zero power.
    #[test]
    fn abstain_votes_carry_no_power(
        powers in prop::collection::vec(1u64..1_000, 1..20),
        abstain_mask in prop::collection::vec(any::<bool>(), 20),
    ) {
        let store = NullOracleStore::new();
        let staking = NullStakingKeeper::new();
        let mut expected: u128 = 0;
        for (i, power) in powers.iter().enumerate() {
            staking.add_validator(val(i), *power);
            let rate = if abstain_mask[i] { Decimal::ZERO } else { Decimal::ONE };
            if !abstain_mask[i] {
                expected += *power as u128;
            }
            store
                .put_vote(&AggregateExchangeRateVote::new(
                    vec![ExchangeRateTuple::new("uusd", rate)],
                    val(i),
                ))
                .unwrap();
        }

        let claims = build_claim_map(&staking);
        let ballots = organize_ballot_by_denom(&store, &claims).unwrap();
        let ballot = &ballots["uusd"];
        prop_assert_eq!(ballot.len(), powers.len());
        prop_assert_eq!(ballot.power(), expected);
    }
}
