//! The auction engine: one instance per auction.
//!
//! Owns the configuration, bid ledger, running winner state, and accounting.
//! The four controllers live in their own modules as `impl AuctionEngine`
//! blocks:
//!
//! | Module          | Entry point(s)                               |
//! |-----------------|----------------------------------------------|
//! | `commit`        | [`AuctionEngine::commit`]                    |
//! | `reveal`        | [`AuctionEngine::reveal`]                    |
//! | `settlement`    | [`AuctionEngine::end_auction`]               |
//! | `withdrawal`    | [`AuctionEngine::withdraw_collateral`], [`AuctionEngine::withdraw_proceeds`] |
//!
//! Each entry point runs to completion; the only suspension points are the
//! outward calls into [`PaymentRail`] / [`AssetCustody`](crate::AssetCustody),
//! and those run with the reentrancy guard held.

use chrono::{DateTime, Utc};
use sealbid_types::{
    AccountId, Amount, AuctionConfig, AuctionError, AuctionEvent, AuctionPhase, BidRecord,
    RefundKind, Result,
};
use serde::{Deserialize, Serialize};

use crate::accounting::CollateralAccounting;
use crate::collaborators::PaymentRail;
use crate::ledger::BidLedger;
use crate::reentrancy::ReentrancyGuard;
use crate::strategy::{Strategy, WinnerSelectionStrategy};

/// Mutable auction-wide state outside the ledger and strategy.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuctionState {
    /// Incremented on an account's first commit, decremented once per reveal.
    pub num_unrevealed_bids: u64,
    /// One-way settlement latch.
    pub finalized: bool,
    /// Owed to the seller and not yet paid out.
    pub seller_proceeds: Amount,
    /// Winner excess whose refund failed.
    pub unclaimed: Amount,
}

/// Everything that must survive between calls.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuctionSnapshot {
    pub config: AuctionConfig,
    pub ledger: BidLedger,
    pub state: AuctionState,
    pub strategy: Strategy,
    pub accounting: CollateralAccounting,
}

impl AuctionSnapshot {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// A single sealed-bid auction.
#[derive(Debug)]
pub struct AuctionEngine {
    pub(crate) config: AuctionConfig,
    pub(crate) ledger: BidLedger,
    pub(crate) state: AuctionState,
    pub(crate) strategy: Strategy,
    pub(crate) accounting: CollateralAccounting,
    pub(crate) guard: ReentrancyGuard,
    events: Vec<AuctionEvent>,
}

impl AuctionEngine {
    /// Create an auction from a validated config.
    ///
    /// # Errors
    /// Returns `InvalidConfig` if the deadlines are out of order.
    pub fn new(config: AuctionConfig) -> Result<Self> {
        config.validate()?;
        let strategy = Strategy::new(config.pricing, config.reserve_price);
        tracing::info!(
            auction = %config.auction_id,
            seller = %config.seller,
            pricing = ?config.pricing,
            reserve = config.reserve_price,
            width = %config.commitment_width,
            "Auction created"
        );
        Ok(Self {
            config,
            ledger: BidLedger::new(),
            state: AuctionState::default(),
            strategy,
            accounting: CollateralAccounting::new(),
            guard: ReentrancyGuard::new(),
            events: Vec::new(),
        })
    }

    /// Rebuild an engine from persisted state.
    ///
    /// The guard starts released and the event outbox starts empty.
    ///
    /// # Errors
    /// - `InvalidConfig` if the config is invalid or disagrees with the strategy
    /// - `AccountingViolation` if the snapshot does not balance
    pub fn restore(snapshot: AuctionSnapshot) -> Result<Self> {
        let AuctionSnapshot {
            config,
            ledger,
            state,
            strategy,
            accounting,
        } = snapshot;
        config.validate()?;
        if strategy.rule() != config.pricing {
            return Err(AuctionError::InvalidConfig(format!(
                "snapshot strategy {:?} does not match configured {:?}",
                strategy.rule(),
                config.pricing
            )));
        }
        if usize::try_from(state.num_unrevealed_bids).ok() != Some(ledger.unrevealed_count()) {
            return Err(AuctionError::AccountingViolation {
                reason: format!(
                    "unrevealed counter {} != {} active commitments",
                    state.num_unrevealed_bids,
                    ledger.unrevealed_count()
                ),
            });
        }
        let engine = Self {
            config,
            ledger,
            state,
            strategy,
            accounting,
            guard: ReentrancyGuard::new(),
            events: Vec::new(),
        };
        engine.verify_accounting()?;
        Ok(engine)
    }

    /// Capture the durable state.
    #[must_use]
    pub fn snapshot(&self) -> AuctionSnapshot {
        AuctionSnapshot {
            config: self.config.clone(),
            ledger: self.ledger.clone(),
            state: self.state.clone(),
            strategy: self.strategy.clone(),
            accounting: self.accounting,
        }
    }

    // ---------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------

    #[must_use]
    pub fn config(&self) -> &AuctionConfig {
        &self.config
    }

    #[must_use]
    pub fn phase_at(&self, now: DateTime<Utc>) -> AuctionPhase {
        self.config.phase_at(now, self.state.finalized)
    }

    #[must_use]
    pub fn bid(&self, account: AccountId) -> BidRecord {
        self.ledger.get(account)
    }

    #[must_use]
    pub fn ledger(&self) -> &BidLedger {
        &self.ledger
    }

    #[must_use]
    pub fn state(&self) -> &AuctionState {
        &self.state
    }

    #[must_use]
    pub fn num_unrevealed_bids(&self) -> u64 {
        self.state.num_unrevealed_bids
    }

    #[must_use]
    pub fn current_winner(&self) -> Option<AccountId> {
        self.strategy.winner()
    }

    #[must_use]
    pub fn highest_bid(&self) -> Amount {
        self.strategy.highest_bid()
    }

    #[must_use]
    pub fn second_highest_bid(&self) -> Option<Amount> {
        self.strategy.second_highest_bid()
    }

    /// Clearing price as of now. Fixed once finalized.
    #[must_use]
    pub fn final_price(&self) -> Amount {
        self.strategy.final_price()
    }

    #[must_use]
    pub fn is_finalized(&self) -> bool {
        self.state.finalized
    }

    #[must_use]
    pub fn seller_proceeds(&self) -> Amount {
        self.state.seller_proceeds
    }

    #[must_use]
    pub fn unclaimed(&self) -> Amount {
        self.state.unclaimed
    }

    #[must_use]
    pub fn accounting(&self) -> &CollateralAccounting {
        &self.accounting
    }

    /// Whether a guarded call is in progress.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.guard.is_locked()
    }

    /// Check that every deposited unit is accounted for.
    pub fn verify_accounting(&self) -> Result<()> {
        let held = self
            .ledger
            .total_collateral()
            .saturating_add(self.state.seller_proceeds)
            .saturating_add(self.state.unclaimed);
        self.accounting.verify(held)
    }

    /// Drain the event outbox.
    pub fn take_events(&mut self) -> Vec<AuctionEvent> {
        std::mem::take(&mut self.events)
    }

    #[must_use]
    pub fn pending_events(&self) -> &[AuctionEvent] {
        &self.events
    }

    // ---------------------------------------------------------------------
    // Internals shared by the controllers
    // ---------------------------------------------------------------------

    pub(crate) fn emit(&mut self, event: AuctionEvent) {
        self.events.push(event);
    }

    pub(crate) fn phase_error(&self, operation: &'static str, now: DateTime<Utc>) -> AuctionError {
        AuctionError::PhaseViolation {
            operation,
            phase: self.phase_at(now),
        }
    }

    /// Run `op` with the reentrancy guard held, releasing it on every path.
    pub(crate) fn guarded<T>(&mut self, op: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        self.guard.enter()?;
        let result = op(self);
        self.guard.exit();
        result
    }

    /// Send a refund without letting its failure escape.
    ///
    /// The caller must already have removed `amount` from wherever it was
    /// held. On failure the amount is parked: an outbid bidder gets it back
    /// as withdrawable collateral, winner excess goes to `unclaimed`.
    /// Returns whether the transfer went through.
    pub(crate) fn refund_best_effort<P: PaymentRail + ?Sized>(
        &mut self,
        rail: &mut P,
        account: AccountId,
        amount: Amount,
        kind: RefundKind,
    ) -> Result<bool> {
        if amount == 0 {
            return Ok(true);
        }

        self.accounting.record_payout(amount);
        match rail.transfer(self, account, amount) {
            Ok(()) => {
                tracing::debug!(account = %account, amount, kind = %kind, "Refund issued");
                self.emit(AuctionEvent::RefundIssued {
                    account,
                    amount,
                    kind,
                });
                Ok(true)
            }
            Err(err) => {
                self.accounting.reverse_payout(amount);
                match kind {
                    RefundKind::Outbid => self.ledger.restore_collateral(account, amount)?,
                    RefundKind::WinnerExcess => {
                        self.state.unclaimed = self
                            .state
                            .unclaimed
                            .checked_add(amount)
                            .ok_or(AuctionError::AmountOverflow)?;
                    }
                }
                tracing::warn!(
                    account = %account,
                    amount,
                    kind = %kind,
                    reason = %err,
                    "Best-effort refund failed"
                );
                self.emit(AuctionEvent::RefundFailed {
                    account,
                    amount,
                    kind,
                    reason: err.reason,
                });
                Ok(false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use sealbid_types::{Commitment, CommitmentWidth, PricingRule};

    fn config() -> AuctionConfig {
        AuctionConfig::new(
            AccountId::new(),
            DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
            Duration::seconds(100),
            Duration::seconds(100),
        )
        .with_reserve(10)
        .with_pricing(PricingRule::SecondPrice)
    }

    #[test]
    fn new_rejects_invalid_config() {
        let mut cfg = config();
        cfg.reveal_deadline = cfg.start_time;
        assert!(matches!(
            AuctionEngine::new(cfg),
            Err(AuctionError::InvalidConfig(_))
        ));
    }

    #[test]
    fn fresh_engine_state() {
        let engine = AuctionEngine::new(config()).unwrap();
        assert_eq!(engine.num_unrevealed_bids(), 0);
        assert!(!engine.is_finalized());
        assert_eq!(engine.current_winner(), None);
        assert_eq!(engine.highest_bid(), 10);
        assert_eq!(engine.second_highest_bid(), Some(10));
        assert_eq!(engine.final_price(), 0);
        assert!(engine.verify_accounting().is_ok());
        assert!(!engine.is_locked());
    }

    #[test]
    fn snapshot_roundtrip_through_json() {
        let mut engine = AuctionEngine::new(config()).unwrap();
        let cfg = engine.config().clone();
        let (_, c) = Commitment::sealed(50, CommitmentWidth::Truncated160);
        engine.commit(AccountId::new(), c, 60, cfg.start_time).unwrap();

        let json = engine.snapshot().to_json().unwrap();
        let restored = AuctionEngine::restore(AuctionSnapshot::from_json(&json).unwrap()).unwrap();
        assert_eq!(restored.snapshot(), engine.snapshot());
        assert_eq!(restored.num_unrevealed_bids(), 1);
        assert!(restored.pending_events().is_empty());
    }

    #[test]
    fn restore_rejects_mismatched_strategy() {
        let engine = AuctionEngine::new(config()).unwrap();
        let mut snap = engine.snapshot();
        snap.config.pricing = PricingRule::FirstPrice;
        assert!(matches!(
            AuctionEngine::restore(snap),
            Err(AuctionError::InvalidConfig(_))
        ));
    }

    #[test]
    fn restore_rejects_unbalanced_accounting() {
        let mut engine = AuctionEngine::new(config()).unwrap();
        let cfg = engine.config().clone();
        let (_, c) = Commitment::sealed(50, CommitmentWidth::Truncated160);
        engine.commit(AccountId::new(), c, 60, cfg.start_time).unwrap();

        let mut snap = engine.snapshot();
        snap.state.unclaimed = 1;
        assert!(matches!(
            AuctionEngine::restore(snap),
            Err(AuctionError::AccountingViolation { .. })
        ));
    }

    #[test]
    fn restore_rejects_counter_drift() {
        let engine = AuctionEngine::new(config()).unwrap();
        let mut snap = engine.snapshot();
        snap.state.num_unrevealed_bids = 3;
        assert!(matches!(
            AuctionEngine::restore(snap),
            Err(AuctionError::AccountingViolation { .. })
        ));
    }

    #[test]
    fn guarded_releases_on_error() {
        let mut engine = AuctionEngine::new(config()).unwrap();
        let result: Result<()> = engine.guarded(|_| Err(AuctionError::NotReadyToEnd));
        assert!(result.is_err());
        assert!(!engine.is_locked());
    }

    #[test]
    fn guarded_rejects_nesting() {
        let mut engine = AuctionEngine::new(config()).unwrap();
        let result = engine.guarded(|inner| inner.guarded(|_| Ok(())));
        assert!(matches!(result, Err(AuctionError::Reentrant)));
        assert!(!engine.is_locked());
    }
}
