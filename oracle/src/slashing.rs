//! Miss counting and slashing.
//!
//! Every period, each claimed validator that did not reveal a vote has its
//! miss counter bumped by one. At the end of a slash window, validators whose
//! valid-vote rate fell below `min_valid_per_window` are slashed and jailed,
//! and every counter is reset.

use iq_keepers::StakingKeeper;
use iq_store::{MissCounterStore, PrevoteStore, VoteStore};
use iq_types::{BlockHeight, Decimal, OracleParams, ValAddress};

use crate::claim::ClaimMap;
use crate::lifecycle::VoterLifecycle;
use crate::OracleError;

/// Blocks between the infraction and the block that evaluates it.
const VALIDATOR_UPDATE_DELAY: u64 = 2;

/// Increment the miss counter of every claimed validator that has not
/// voted this period. Returns the validators that missed, sorted.
pub fn count_misses<S>(store: &S, claims: &ClaimMap) -> Result<Vec<ValAddress>, OracleError>
where
    S: MissCounterStore + PrevoteStore + VoteStore,
{
    let mut missed = Vec::new();
    for validator in claims.keys() {
        let lifecycle = VoterLifecycle::load(store, validator)?;
        if !lifecycle.is_miss() {
            continue;
        }
        let count = store
            .get_miss_counter(validator)?
            .checked_add(1)
            .ok_or(OracleError::Overflow("miss counter"))?;
        store.put_miss_counter(validator, count)?;
        missed.push(validator.clone());
    }
    Ok(missed)
}

/// The fraction of a window's periods in which a validator voted.
pub fn valid_vote_rate(slash_window: u64, misses: u64) -> Option<Decimal> {
    let voted = Decimal::from(slash_window.saturating_sub(misses));
    voted.checked_div(Decimal::from(slash_window))
}

/// Slash and jail every counted validator whose valid-vote rate is below
/// the minimum, then delete all miss counters.
///
/// Staking failures are logged and skipped. Returns the validators slashed.
pub fn slash_and_reset_miss_counters<S, K>(
    store: &S,
    staking: &K,
    params: &OracleParams,
    height: BlockHeight,
) -> Result<Vec<ValAddress>, OracleError>
where
    S: MissCounterStore,
    K: StakingKeeper,
{
    let infraction_height = height.saturating_sub(VALIDATOR_UPDATE_DELAY);
    let counters = store.iter_miss_counters()?;
    let mut slashed = Vec::new();

    for (validator, misses) in &counters {
        let Some(rate) = valid_vote_rate(params.slash_window, *misses) else {
            continue;
        };
        if rate >= params.min_valid_per_window {
            continue;
        }

        let Some(info) = staking.validator(validator) else {
            tracing::debug!(%validator, "skipping slash: validator no longer exists");
            continue;
        };
        if !info.bonded || info.jailed {
            tracing::debug!(%validator, "skipping slash: validator not bonded or already jailed");
            continue;
        }

        if let Err(e) =
            staking.slash(validator, infraction_height, info.power, params.slash_fraction)
        {
            tracing::debug!(%validator, error = %e, "slash failed, ignoring");
            continue;
        }
        if let Err(e) = staking.jail(validator) {
            tracing::debug!(%validator, error = %e, "jail failed, ignoring");
        }

        tracing::info!(
            %validator,
            misses,
            valid_rate = %rate,
            infraction_height,
            fraction = %params.slash_fraction,
            "validator slashed for missing oracle votes"
        );
        slashed.push(validator.clone());
    }

    for (validator, _) in &counters {
        store.delete_miss_counter(validator)?;
    }

    Ok(slashed)
}
