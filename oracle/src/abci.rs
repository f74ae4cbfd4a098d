//! End-of-block processing.
//!
//! At the last block of every voting period:
//!
//! 1. build claims from the bonded validator set
//! 2. organize ballots from revealed votes
//! 3. per vote target: check quorum, tally, persist the median
//! 4. hand the period's winners to reward distribution
//! 5. count misses
//! 6. clear votes and expired prevotes
//! 7. reconcile the whitelist
//!
//! At the last block of every slash window, slash and reset miss counters.

use std::collections::BTreeMap;

use iq_keepers::{BallotWinners, BankKeeper, RewardDistributor, StakingKeeper};
use iq_store::{OracleStore, PrevoteStore, VoteStore};
use iq_types::{is_period_last_block, BlockHeight, Decimal, ValAddress};

use crate::ballot::organize_ballot_by_denom;
use crate::claim::build_claim_map;
use crate::slashing::{count_misses, slash_and_reset_miss_counters};
use crate::tally::{ballot_is_passing, tally};
use crate::whitelist::apply_whitelist;
use crate::OracleError;

/// Everything one end-block call changed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EndBlockOutcome {
    pub period_ended: bool,
    /// Denominations whose rate was updated, with the new rate.
    pub updated_rates: BTreeMap<String, Decimal>,
    pub winners: BallotWinners,
    /// Validators whose miss counter was incremented.
    pub missed: Vec<ValAddress>,
    /// Validators slashed at a slash-window boundary.
    pub slashed: Vec<ValAddress>,
    pub whitelist_updated: bool,
}

/// Delete every vote and every prevote whose reveal window has passed.
pub fn clear_ballots<S>(store: &S, vote_period: u64, height: BlockHeight) -> Result<(), OracleError>
where
    S: PrevoteStore + VoteStore,
{
    for prevote in store.iter_prevotes()? {
        if prevote.is_expired(height, vote_period) {
            store.delete_prevote(&prevote.voter)?;
        }
    }
    for vote in store.iter_votes()? {
        store.delete_vote(&vote.voter)?;
    }
    Ok(())
}

/// Run the oracle's end-of-block logic at `height`.
///
/// Errors are fatal: the caller must halt rather than commit the block.
pub fn end_blocker<S, K, B, D>(
    store: &S,
    staking: &K,
    bank: &B,
    distributor: &D,
    height: BlockHeight,
) -> Result<EndBlockOutcome, OracleError>
where
    S: OracleStore,
    K: StakingKeeper,
    B: BankKeeper,
    D: RewardDistributor,
{
    let params = store.get_params()?;
    let mut outcome = EndBlockOutcome::default();

    if is_period_last_block(height, params.vote_period) {
        outcome.period_ended = true;

        let mut claims = build_claim_map(staking);
        let ballots = organize_ballot_by_denom(store, &claims)?;
        let total_bonded_power = staking.total_bonded_power();

        for (denom, _) in store.iter_tobin_taxes()? {
            let Some(ballot) = ballots.get(&denom) else {
                tracing::debug!(%denom, "no ballot this period");
                continue;
            };
            if !ballot_is_passing(ballot, params.vote_threshold, total_bonded_power)? {
                tracing::debug!(
                    %denom,
                    power = %ballot.power(),
                    total_bonded_power,
                    "ballot below threshold, keeping previous rate"
                );
                continue;
            }
            let Some(result) = tally(ballot, params.reward_band, &mut claims)? else {
                continue;
            };

            store.put_exchange_rate(&denom, result.median)?;
            tracing::info!(
                %denom,
                rate = %result.median,
                winners = result.winners.len(),
                "exchange rate updated"
            );

            outcome.updated_rates.insert(denom.clone(), result.median);
            outcome.winners.insert(denom, result.winners);
        }

        distributor.distribute(&outcome.winners, params.distribution_ratio());

        outcome.missed = count_misses(store, &claims)?;
        clear_ballots(store, params.vote_period, height)?;
        outcome.whitelist_updated = apply_whitelist(store, bank, &params.whitelist)?;
    }

    if is_period_last_block(height, params.slash_window_blocks()) {
        outcome.slashed = slash_and_reset_miss_counters(store, staking, &params, height)?;
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use iq_nullables::{NullBankKeeper, NullOracleStore, NullRewardDistributor, NullStakingKeeper};
    use iq_store::{ExchangeRateStore, MissCounterStore, ParamStore, TobinTaxStore};
    use iq_types::{
        AggregateExchangeRatePrevote, AggregateExchangeRateVote, AggregateVoteHash, Denom,
        DenomList, ExchangeRateTuple, OracleParams,
    };
    use rust_decimal_macros::dec;

    fn val(payload: &str) -> ValAddress {
        ValAddress::new(format!("iqvaloper1{payload}")).unwrap()
    }

    fn params() -> OracleParams {
        OracleParams {
            vote_period: 5,
            vote_threshold: dec!(0.5),
            reward_band: dec!(0.02),
            reward_distribution_window: 50,
            whitelist: DenomList::new(vec![Denom::new("uusd", dec!(0.01))]),
            slash_fraction: dec!(0.01),
            slash_window: 2,
            min_valid_per_window: dec!(0.5),
        }
    }

    struct Env {
        store: NullOracleStore,
        staking: NullStakingKeeper,
        bank: NullBankKeeper,
        distributor: NullRewardDistributor,
    }

    impl Env {
        fn new() -> Self {
            let env = Self {
                store: NullOracleStore::with_params(params()),
                staking: NullStakingKeeper::new(),
                bank: NullBankKeeper::new(),
                distributor: NullRewardDistributor::new(),
            };
            env.staking.add_validator(val("a"), 10);
            env.staking.add_validator(val("b"), 20);
            env.staking.add_validator(val("c"), 5);
            env
        }

        fn vote(&self, voter: &str, rate: Decimal) {
            self.store
                .put_vote(&AggregateExchangeRateVote::new(
                    vec![ExchangeRateTuple::new("uusd", rate)],
                    val(voter),
                ))
                .unwrap();
        }

        fn end_block(&self, height: BlockHeight) -> EndBlockOutcome {
            end_blocker(&self.store, &self.staking, &self.bank, &self.distributor, height).unwrap()
        }
    }

    #[test]
    fn mid_period_block_does_nothing() {
        let env = Env::new();
        env.vote("a", dec!(100));
        let outcome = env.end_block(2);
        assert!(!outcome.period_ended);
        assert_eq!(env.store.iter_votes().unwrap().len(), 1);
        assert!(env.distributor.calls().is_empty());
    }

    #[test]
    fn period_end_tallies_and_clears() {
        let env = Env::new();
        env.vote("a", dec!(100));
        env.vote("b", dec!(110));
        env.vote("c", dec!(1000));

        let outcome = env.end_block(4);
        assert!(outcome.period_ended);
        assert_eq!(outcome.updated_rates.get("uusd"), Some(&dec!(110)));
        assert_eq!(env.store.get_exchange_rate("uusd").unwrap(), Some(dec!(110)));
        assert_eq!(outcome.winners["uusd"].len(), 1);
        assert!(outcome.missed.is_empty());
        assert!(env.store.iter_votes().unwrap().is_empty());

        let calls = env.distributor.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1, dec!(0.1));
    }

    #[test]
    fn below_threshold_keeps_previous_rate() {
        let env = Env::new();
        env.store.put_exchange_rate("uusd", dec!(1.5)).unwrap();
        env.vote("c", dec!(2.0));

        let outcome = env.end_block(4);
        assert!(outcome.updated_rates.is_empty());
        assert_eq!(env.store.get_exchange_rate("uusd").unwrap(), Some(dec!(1.5)));
        assert_eq!(outcome.missed, vec![val("a"), val("b")]);
        // The vote is consumed anyway.
        assert!(env.store.iter_votes().unwrap().is_empty());
    }

    #[test]
    fn votes_for_non_target_denoms_ignored() {
        let env = Env::new();
        for voter in ["a", "b", "c"] {
            env.store
                .put_vote(&AggregateExchangeRateVote::new(
                    vec![ExchangeRateTuple::new("ukrw", dec!(1200))],
                    val(voter),
                ))
                .unwrap();
        }
        let outcome = env.end_block(4);
        assert!(outcome.updated_rates.is_empty());
        assert_eq!(env.store.get_exchange_rate("ukrw").unwrap(), None);
    }

    #[test]
    fn abstention_counts_as_participation() {
        let env = Env::new();
        env.vote("a", dec!(0));
        env.vote("b", dec!(110));
        env.vote("c", dec!(110));
        let outcome = env.end_block(4);
        assert!(outcome.missed.is_empty());
    }

    #[test]
    fn clear_ballots_keeps_fresh_prevotes() {
        let store = NullOracleStore::new();
        for (voter, submit_block) in [("old", 3), ("edge", 4), ("new", 9)] {
            let prevote = AggregateExchangeRatePrevote::new(
                AggregateVoteHash::new([1; 20]),
                val(voter),
                submit_block,
            );
            store.put_prevote(&prevote).unwrap();
        }
        store
            .put_vote(&AggregateExchangeRateVote::new(vec![], val("x")))
            .unwrap();

        clear_ballots(&store, 5, 9).unwrap();

        let remaining: Vec<_> = store
            .iter_prevotes()
            .unwrap()
            .into_iter()
            .map(|p| p.voter)
            .collect();
        assert_eq!(remaining, vec![val("edge"), val("new")]);
        assert!(store.iter_votes().unwrap().is_empty());
    }

    #[test]
    fn slash_window_boundary_slashes_silent_validator() {
        let env = Env::new();
        // Window = 2 periods = 10 blocks; "c" never votes.
        for period_end in [4, 9] {
            env.vote("a", dec!(1));
            env.vote("b", dec!(1));
            let outcome = env.end_block(period_end);
            assert_eq!(outcome.missed, vec![val("c")]);
            if period_end == 9 {
                assert_eq!(outcome.slashed, vec![val("c")]);
            } else {
                assert!(outcome.slashed.is_empty());
            }
        }
        assert_eq!(env.staking.slashes()[0].infraction_height, 7);
        assert!(env.store.iter_miss_counters().unwrap().is_empty());
        assert!(env.staking.validator(&val("c")).unwrap().jailed);
    }

    #[test]
    fn whitelist_change_applied_at_period_end() {
        let env = Env::new();
        let mut p = params();
        p.whitelist = DenomList::new(vec![
            Denom::new("uusd", dec!(0.01)),
            Denom::new("ukrw", dec!(0.02)),
        ]);
        env.store.put_params(&p).unwrap();

        assert!(!env.end_block(3).whitelist_updated);
        assert!(env.end_block(4).whitelist_updated);
        assert_eq!(env.store.iter_tobin_taxes().unwrap().len(), 2);
        assert!(!env.end_block(9).whitelist_updated);
    }

    #[test]
    fn store_failure_is_fatal() {
        let env = Env::new();
        env.vote("a", dec!(100));
        env.vote("b", dec!(100));
        env.store.set_fail_writes(true);
        let err = end_blocker(&env.store, &env.staking, &env.bank, &env.distributor, 4).unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn silent_period_counts_one_miss_each() {
        let env = Env::new();
        env.end_block(4);
        env.end_block(5);
        for v in ["a", "b", "c"] {
            assert_eq!(env.store.get_miss_counter(&val(v)).unwrap(), 1);
        }
    }
}
