//! Stateful message handling.
//!
//! A rejected message leaves the store untouched: every check runs before
//! the first write.

use iq_keepers::StakingKeeper;
use iq_store::{FeederStore, OracleStore};
use iq_types::{parse_exchange_rate_tuples, AccAddress, BlockHeight, ValAddress};

use crate::lifecycle::VoterLifecycle;
use crate::msg::{
    MsgAggregateExchangeRatePrevote, MsgAggregateExchangeRateVote, MsgDelegateFeedConsent,
    OracleMsg,
};
use crate::OracleError;

/// Dispatch one message at `height`.
pub fn handle_msg<S, K>(
    store: &S,
    staking: &K,
    height: BlockHeight,
    msg: &OracleMsg,
) -> Result<(), OracleError>
where
    S: OracleStore,
    K: StakingKeeper,
{
    match msg {
        OracleMsg::AggregateExchangeRatePrevote(msg) => {
            aggregate_exchange_rate_prevote(store, staking, height, msg)
        }
        OracleMsg::AggregateExchangeRateVote(msg) => {
            aggregate_exchange_rate_vote(store, staking, height, msg)
        }
        OracleMsg::DelegateFeedConsent(msg) => delegate_feed_consent(store, staking, msg),
    }
}

/// The account allowed to vote for `validator`: its delegate if one was
/// registered, otherwise its own operator account.
pub fn feeder_for(
    store: &impl FeederStore,
    validator: &ValAddress,
) -> Result<AccAddress, OracleError> {
    Ok(store
        .get_feeder_delegation(validator)?
        .unwrap_or_else(|| validator.account()))
}

fn check_feeder<S, K>(
    store: &S,
    staking: &K,
    feeder: &AccAddress,
    validator: &ValAddress,
) -> Result<(), OracleError>
where
    S: FeederStore,
    K: StakingKeeper,
{
    if staking.validator(validator).is_none() {
        return Err(OracleError::ValidatorNotFound(validator.clone()));
    }
    if feeder_for(store, validator)? != *feeder {
        return Err(OracleError::NoVotingPermission {
            feeder: feeder.clone(),
            validator: validator.clone(),
        });
    }
    Ok(())
}

pub fn aggregate_exchange_rate_prevote<S, K>(
    store: &S,
    staking: &K,
    height: BlockHeight,
    msg: &MsgAggregateExchangeRatePrevote,
) -> Result<(), OracleError>
where
    S: OracleStore,
    K: StakingKeeper,
{
    msg.validate_basic()?;
    check_feeder(store, staking, &msg.feeder, &msg.validator)?;

    let mut lifecycle = VoterLifecycle::load(store, &msg.validator)?;
    lifecycle.commit(msg.hash, height);
    lifecycle.save(store)?;

    tracing::debug!(validator = %msg.validator, height, "aggregate prevote stored");
    Ok(())
}

pub fn aggregate_exchange_rate_vote<S, K>(
    store: &S,
    staking: &K,
    height: BlockHeight,
    msg: &MsgAggregateExchangeRateVote,
) -> Result<(), OracleError>
where
    S: OracleStore,
    K: StakingKeeper,
{
    msg.validate_basic()?;
    check_feeder(store, staking, &msg.feeder, &msg.validator)?;

    let params = store.get_params()?;
    let tuples = parse_exchange_rate_tuples(&msg.exchange_rates)?;
    for tuple in &tuples {
        if store.get_tobin_tax(&tuple.denom)?.is_none() {
            return Err(OracleError::UnknownDenom(tuple.denom.clone()));
        }
    }

    let mut lifecycle = VoterLifecycle::load(store, &msg.validator)?;
    lifecycle.reveal(
        &msg.salt,
        &msg.exchange_rates,
        tuples,
        height,
        params.vote_period,
    )?;
    lifecycle.save(store)?;

    tracing::debug!(validator = %msg.validator, height, "aggregate vote stored");
    Ok(())
}

pub fn delegate_feed_consent<S, K>(
    store: &S,
    staking: &K,
    msg: &MsgDelegateFeedConsent,
) -> Result<(), OracleError>
where
    S: FeederStore,
    K: StakingKeeper,
{
    msg.validate_basic()?;
    if staking.validator(&msg.operator).is_none() {
        return Err(OracleError::ValidatorNotFound(msg.operator.clone()));
    }
    store.put_feeder_delegation(&msg.operator, &msg.delegate)?;

    tracing::debug!(operator = %msg.operator, delegate = %msg.delegate, "feeder delegated");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use iq_crypto::aggregate_vote_hash;
    use iq_nullables::{NullOracleStore, NullStakingKeeper};
    use iq_store::{PrevoteStore, VoteStore};
    use iq_types::{AggregateVoteHash, OracleParams};

    struct Fixture {
        store: NullOracleStore,
        staking: NullStakingKeeper,
        validator: ValAddress,
    }

    fn fixture() -> Fixture {
        let store = NullOracleStore::with_params(OracleParams::default());
        let staking = NullStakingKeeper::new();
        let validator = ValAddress::new("iqvaloper1alice").unwrap();
        staking.add_validator(validator.clone(), 100);
        Fixture {
            store,
            staking,
            validator,
        }
    }

    fn prevote(f: &Fixture, salt: &str, rates: &str, height: BlockHeight) {
        let msg = MsgAggregateExchangeRatePrevote {
            hash: aggregate_vote_hash(salt, rates, &f.validator),
            feeder: f.validator.account(),
            validator: f.validator.clone(),
        };
        aggregate_exchange_rate_prevote(&f.store, &f.staking, height, &msg).unwrap();
    }

    fn vote_msg(f: &Fixture, salt: &str, rates: &str) -> MsgAggregateExchangeRateVote {
        MsgAggregateExchangeRateVote {
            salt: salt.into(),
            exchange_rates: rates.into(),
            feeder: f.validator.account(),
            validator: f.validator.clone(),
        }
    }

    #[test]
    fn prevote_then_vote_next_period() {
        let f = fixture();
        prevote(&f, "1234", "1.5uusd,1200ukrw", 2);
        assert_eq!(f.store.get_prevote(&f.validator).unwrap().unwrap().submit_block, 2);

        let msg = vote_msg(&f, "1234", "1.5uusd,1200ukrw");
        aggregate_exchange_rate_vote(&f.store, &f.staking, 6, &msg).unwrap();

        let stored = f.store.get_vote(&f.validator).unwrap().unwrap();
        assert_eq!(stored.exchange_rate_tuples.len(), 2);
        assert!(f.store.get_prevote(&f.validator).unwrap().is_none());
    }

    #[test]
    fn unknown_validator_rejected() {
        let f = fixture();
        let stranger = ValAddress::new("iqvaloper1stranger").unwrap();
        let msg = MsgAggregateExchangeRatePrevote {
            hash: AggregateVoteHash::new([1; 20]),
            feeder: stranger.account(),
            validator: stranger,
        };
        let err = aggregate_exchange_rate_prevote(&f.store, &f.staking, 1, &msg).unwrap_err();
        assert!(matches!(err, OracleError::ValidatorNotFound(_)));
    }

    #[test]
    fn feeder_must_match_delegation() {
        let f = fixture();
        let delegate = AccAddress::new("iq1bot").unwrap();
        let msg = MsgAggregateExchangeRatePrevote {
            hash: AggregateVoteHash::new([1; 20]),
            feeder: delegate.clone(),
            validator: f.validator.clone(),
        };
        let err = aggregate_exchange_rate_prevote(&f.store, &f.staking, 1, &msg).unwrap_err();
        assert!(matches!(err, OracleError::NoVotingPermission { .. }));

        delegate_feed_consent(
            &f.store,
            &f.staking,
            &MsgDelegateFeedConsent {
                operator: f.validator.clone(),
                delegate,
            },
        )
        .unwrap();
        aggregate_exchange_rate_prevote(&f.store, &f.staking, 1, &msg).unwrap();

        // The operator account lost its right once a delegate was named.
        let own = MsgAggregateExchangeRatePrevote {
            feeder: f.validator.account(),
            ..msg
        };
        assert!(aggregate_exchange_rate_prevote(&f.store, &f.staking, 1, &own).is_err());
    }

    #[test]
    fn vote_without_prevote_rejected() {
        let f = fixture();
        let err = aggregate_exchange_rate_vote(&f.store, &f.staking, 6, &vote_msg(&f, "1", "1uusd"))
            .unwrap_err();
        assert!(matches!(err, OracleError::NoAggregatePrevote(_)));
    }

    #[test]
    fn vote_for_unknown_denom_rejected_without_state_change() {
        let f = fixture();
        prevote(&f, "1", "1ueur", 2);
        let writes = f.store.writes();
        let err = aggregate_exchange_rate_vote(&f.store, &f.staking, 6, &vote_msg(&f, "1", "1ueur"))
            .unwrap_err();
        assert!(matches!(err, OracleError::UnknownDenom(d) if d == "ueur"));
        assert_eq!(f.store.writes(), writes);
        assert!(f.store.get_prevote(&f.validator).unwrap().is_some());
    }

    #[test]
    fn vote_with_mismatched_hash_rejected() {
        let f = fixture();
        prevote(&f, "1", "1uusd", 2);
        let err = aggregate_exchange_rate_vote(&f.store, &f.staking, 6, &vote_msg(&f, "1", "2uusd"))
            .unwrap_err();
        assert!(matches!(err, OracleError::VerificationFailed { .. }));
    }

    #[test]
    fn vote_in_same_period_rejected() {
        let f = fixture();
        prevote(&f, "1", "1uusd", 2);
        let err = aggregate_exchange_rate_vote(&f.store, &f.staking, 3, &vote_msg(&f, "1", "1uusd"))
            .unwrap_err();
        assert!(matches!(err, OracleError::RevealPeriodMissMatch { .. }));
    }

    #[test]
    fn delegate_for_unknown_operator_rejected() {
        let f = fixture();
        let msg = MsgDelegateFeedConsent {
            operator: ValAddress::new("iqvaloper1ghost").unwrap(),
            delegate: AccAddress::new("iq1bot").unwrap(),
        };
        assert!(matches!(
            delegate_feed_consent(&f.store, &f.staking, &msg),
            Err(OracleError::ValidatorNotFound(_))
        ));
    }
}
