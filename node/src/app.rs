//! The block-driven oracle application.
//!
//! [`OracleApp`] owns the store and the collaborator keepers and drives the
//! oracle through the block lifecycle:
//!
//! ```text
//! init_chain ─▶ begin_block(h) ─▶ deliver(msg)* ─▶ end_block() ─▶ begin_block(h+1) ─▶ ...
//! ```
//!
//! Heights must be strictly sequential. A block's writes are staged in
//! memory and reach the store in one batch, together with the block height,
//! when `end_block` succeeds. Reward payouts are made only after that batch
//! commits. A fatal error halts the app: the block's staged writes are
//! dropped, every later call returns [`NodeError::Halted`] and nothing more
//! is written.

use std::cell::RefCell;

use iq_keepers::{BallotWinners, BankKeeper, RewardDistributor, StakingKeeper};
use iq_oracle::{end_blocker, handle_msg, EndBlockOutcome, OracleError, OracleMsg, Querier};
use iq_store::{BatchStore, OracleStore, PendingWrites, StagingStore, WriteOp};
use iq_types::{BlockHeight, Decimal, OracleParams};
use tracing::info_span;

use crate::genesis::AppGenesis;
use crate::NodeError;

/// Holds payout requests until the block that produced them is committed.
#[derive(Default)]
struct DeferredPayouts {
    calls: RefCell<Vec<(BallotWinners, Decimal)>>,
}

impl RewardDistributor for DeferredPayouts {
    fn distribute(&self, winners: &BallotWinners, distribution_ratio: Decimal) {
        self.calls
            .borrow_mut()
            .push((winners.clone(), distribution_ratio));
    }
}

impl DeferredPayouts {
    fn pay(self, distributor: &impl RewardDistributor) {
        for (winners, ratio) in self.calls.into_inner() {
            distributor.distribute(&winners, ratio);
        }
    }
}

pub struct OracleApp<S, K, B, D> {
    store: S,
    staking: K,
    bank: B,
    distributor: D,
    chain_id: Option<String>,
    last_height: BlockHeight,
    current_height: Option<BlockHeight>,
    pending: PendingWrites,
    halted: Option<String>,
}

impl<S, K, B, D> OracleApp<S, K, B, D>
where
    S: OracleStore + BatchStore,
    K: StakingKeeper,
    B: BankKeeper,
    D: RewardDistributor,
{
    pub fn new(store: S, staking: K, bank: B, distributor: D) -> Self {
        Self {
            store,
            staking,
            bank,
            distributor,
            chain_id: None,
            last_height: 0,
            current_height: None,
            pending: PendingWrites::default(),
            halted: None,
        }
    }

    /// Resume a chain from the last height its store committed.
    pub fn resume(mut self, chain_id: impl Into<String>) -> Result<Self, NodeError> {
        let last_height = self
            .store
            .committed_height()?
            .ok_or(NodeError::NotInitialized)?;
        let chain_id = chain_id.into();
        tracing::info!(%chain_id, last_height, "resuming chain");
        self.chain_id = Some(chain_id);
        self.last_height = last_height;
        Ok(self)
    }

    /// Load genesis into the store. The first block is then height 1.
    pub fn init_chain(&mut self, genesis: &AppGenesis) -> Result<(), NodeError> {
        self.check_running()?;
        genesis.commit_to(&self.store)?;
        self.chain_id = Some(genesis.chain_id.clone());
        self.last_height = 0;
        tracing::info!(chain_id = %genesis.chain_id, "chain initialized");
        Ok(())
    }

    pub fn begin_block(&mut self, height: BlockHeight) -> Result<(), NodeError> {
        self.check_running()?;
        if self.chain_id.is_none() {
            return Err(NodeError::NotInitialized);
        }
        let expected = self.last_height + 1;
        if self.current_height.is_some() || height != expected {
            return Err(NodeError::UnexpectedHeight {
                expected,
                got: height,
            });
        }
        self.current_height = Some(height);
        self.pending = PendingWrites::default();
        Ok(())
    }

    /// Execute one oracle message in the current block.
    ///
    /// A rejected message is returned to the sender and leaves no writes
    /// behind; the rest of the block is unaffected.
    pub fn deliver(&mut self, msg: &OracleMsg) -> Result<(), NodeError> {
        self.check_running()?;
        let height = self.current_height.ok_or(NodeError::NoBlockInProgress)?;

        let staging = StagingStore::with_pending(&self.store, self.pending.clone());
        let result = handle_msg(&staging, &self.staking, height, msg);
        let staged = staging.into_pending();
        match result {
            Ok(()) => {
                self.pending = staged;
                Ok(())
            }
            Err(e) if e.is_fatal() => Err(self.halt(e.into())),
            Err(e) => Err(e.into()),
        }
    }

    /// Run end-of-block processing and commit the block.
    pub fn end_block(&mut self) -> Result<EndBlockOutcome, NodeError> {
        self.check_running()?;
        let height = self.current_height.ok_or(NodeError::NoBlockInProgress)?;
        let span = info_span!("end_block", height);
        let _enter = span.enter();

        let payouts = DeferredPayouts::default();
        let staging = StagingStore::with_pending(&self.store, std::mem::take(&mut self.pending));
        let result = end_blocker(&staging, &self.staking, &self.bank, &payouts, height);
        let ops = staging.into_ops();

        let outcome = match result {
            Ok(outcome) => outcome,
            Err(e) => return Err(self.halt(e.into())),
        };
        if let Err(e) = self.commit(&ops, height) {
            return Err(self.halt(e));
        }
        payouts.pay(&self.distributor);

        if !outcome.slashed.is_empty() {
            tracing::info!(count = outcome.slashed.len(), "validators slashed");
        }
        self.last_height = height;
        self.current_height = None;
        Ok(outcome)
    }

    /// Replace oracle parameters, as a passed governance proposal would.
    pub fn set_params(&mut self, params: &OracleParams) -> Result<(), NodeError> {
        self.check_running()?;
        params.validate().map_err(OracleError::from)?;
        self.store.put_params(params)?;
        tracing::info!(vote_period = params.vote_period, "oracle params updated");
        Ok(())
    }

    pub fn query(&self, route: &str, data: &[u8]) -> Result<Vec<u8>, NodeError> {
        Ok(Querier::new(&self.store).query(route, data)?)
    }

    pub fn export_genesis(&self) -> Result<AppGenesis, NodeError> {
        let chain_id = self.chain_id.clone().ok_or(NodeError::NotInitialized)?;
        Ok(AppGenesis {
            chain_id,
            oracle: iq_oracle::export_genesis(&self.store)?,
            market: iq_market::MarketGenesis::default(),
        })
    }

    pub fn last_height(&self) -> BlockHeight {
        self.last_height
    }

    pub fn is_halted(&self) -> bool {
        self.halted.is_some()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn staking(&self) -> &K {
        &self.staking
    }

    pub fn distributor(&self) -> &D {
        &self.distributor
    }

    fn commit(&self, ops: &[WriteOp], height: BlockHeight) -> Result<(), NodeError> {
        self.store.write_batch(ops, Some(height))?;
        tracing::debug!(ops = ops.len(), "block committed");
        Ok(())
    }

    /// Stop the app for good and drop whatever the current block staged.
    fn halt(&mut self, error: NodeError) -> NodeError {
        tracing::error!(%error, "block failed, halting");
        self.pending = PendingWrites::default();
        self.halted = Some(error.to_string());
        error
    }

    fn check_running(&self) -> Result<(), NodeError> {
        match &self.halted {
            Some(reason) => Err(NodeError::Halted(reason.clone())),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use iq_nullables::{NullBankKeeper, NullOracleStore, NullRewardDistributor, NullStakingKeeper};
    use iq_oracle::MsgDelegateFeedConsent;
    use iq_store::FeederStore;
    use iq_types::{AccAddress, ValAddress};

    type TestApp =
        OracleApp<NullOracleStore, NullStakingKeeper, NullBankKeeper, NullRewardDistributor>;

    fn app() -> TestApp {
        let staking = NullStakingKeeper::new();
        staking.add_validator(ValAddress::new("iqvaloper1alice").unwrap(), 10);
        let mut app = OracleApp::new(
            NullOracleStore::new(),
            staking,
            NullBankKeeper::new(),
            NullRewardDistributor::new(),
        );
        app.init_chain(&AppGenesis::new("iq-test")).unwrap();
        app
    }

    #[test]
    fn heights_must_be_sequential() {
        let mut app = app();
        assert!(matches!(
            app.begin_block(2),
            Err(NodeError::UnexpectedHeight { expected: 1, got: 2 })
        ));
        app.begin_block(1).unwrap();
        assert!(app.begin_block(2).is_err());
        app.end_block().unwrap();
        app.begin_block(2).unwrap();
        assert_eq!(app.last_height(), 1);
    }

    #[test]
    fn begin_before_init_rejected() {
        let mut app = OracleApp::new(
            NullOracleStore::new(),
            NullStakingKeeper::new(),
            NullBankKeeper::new(),
            NullRewardDistributor::new(),
        );
        assert!(matches!(app.begin_block(1), Err(NodeError::NotInitialized)));
    }

    #[test]
    fn deliver_needs_open_block() {
        let mut app = app();
        let msg = OracleMsg::DelegateFeedConsent(MsgDelegateFeedConsent {
            operator: ValAddress::new("iqvaloper1alice").unwrap(),
            delegate: AccAddress::new("iq1bot").unwrap(),
        });
        assert!(matches!(app.deliver(&msg), Err(NodeError::NoBlockInProgress)));
        app.begin_block(1).unwrap();
        app.deliver(&msg).unwrap();
    }

    #[test]
    fn fatal_end_block_halts() {
        let mut app = app();
        app.begin_block(1).unwrap();
        app.store().set_fail_writes(true);
        assert!(app.end_block().is_err());
        assert!(app.is_halted());
        assert_eq!(app.last_height(), 0);
        assert!(matches!(app.begin_block(2), Err(NodeError::Halted(_))));
    }

    #[test]
    fn halted_block_commits_nothing() {
        let mut app = app();
        let alice = ValAddress::new("iqvaloper1alice").unwrap();
        app.begin_block(1).unwrap();
        app.deliver(&OracleMsg::DelegateFeedConsent(MsgDelegateFeedConsent {
            operator: alice.clone(),
            delegate: AccAddress::new("iq1bot").unwrap(),
        }))
        .unwrap();
        // Staged, not yet visible in the store.
        assert_eq!(app.store().get_feeder_delegation(&alice).unwrap(), None);

        app.store().set_fail_writes(true);
        assert!(app.end_block().is_err());
        app.store().set_fail_writes(false);
        assert_eq!(app.store().get_feeder_delegation(&alice).unwrap(), None);
        assert_eq!(app.store().committed_height().unwrap(), Some(0));
    }

    #[test]
    fn block_commits_with_its_height() {
        let mut app = app();
        let alice = ValAddress::new("iqvaloper1alice").unwrap();
        let bot = AccAddress::new("iq1bot").unwrap();
        app.begin_block(1).unwrap();
        app.deliver(&OracleMsg::DelegateFeedConsent(MsgDelegateFeedConsent {
            operator: alice.clone(),
            delegate: bot.clone(),
        }))
        .unwrap();
        app.end_block().unwrap();
        assert_eq!(app.store().get_feeder_delegation(&alice).unwrap(), Some(bot));
        assert_eq!(app.store().committed_height().unwrap(), Some(1));
    }

    #[test]
    fn resume_reads_committed_height() {
        let fresh = OracleApp::new(
            NullOracleStore::new(),
            NullStakingKeeper::new(),
            NullBankKeeper::new(),
            NullRewardDistributor::new(),
        );
        assert!(matches!(fresh.resume("iq-test"), Err(NodeError::NotInitialized)));

        let store = NullOracleStore::new();
        store.write_batch(&[], Some(7)).unwrap();
        let app = OracleApp::new(
            store,
            NullStakingKeeper::new(),
            NullBankKeeper::new(),
            NullRewardDistributor::new(),
        )
        .resume("iq-test")
        .unwrap();
        assert_eq!(app.last_height(), 7);
    }

    #[test]
    fn set_params_validates() {
        let mut app = app();
        let mut params = OracleParams::default();
        params.vote_period = 0;
        assert!(app.set_params(&params).is_err());
        params.vote_period = 10;
        params.reward_distribution_window = 100;
        app.set_params(&params).unwrap();
    }

    #[test]
    fn export_after_init() {
        let app = app();
        let exported = app.export_genesis().unwrap();
        assert_eq!(exported.chain_id, "iq-test");
        assert_eq!(exported.oracle.params, OracleParams::default());
    }
}
