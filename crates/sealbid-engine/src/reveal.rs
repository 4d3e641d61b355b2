//! Reveal phase: open a sealed bid and fold it into the running winner.

use chrono::{DateTime, Utc};
use sealbid_types::{AccountId, Amount, AuctionError, AuctionEvent, RefundKind, Result, Salt};

use crate::AuctionEngine;
use crate::collaborators::PaymentRail;
use crate::strategy::{RevealOutcome, WinnerSelectionStrategy};

impl AuctionEngine {
    /// Reveal `account`'s sealed bid.
    ///
    /// All checks run before any state changes. A bid that cannot win has
    /// its whole collateral refunded at once through `rail`. That refund is
    /// best-effort: if it fails, the collateral stays in the ledger for a
    /// later `withdraw_collateral`, and the reveal still succeeds.
    ///
    /// # Errors
    /// - `Reentrant` while an outward transfer is in progress
    /// - `AlreadyFinalized` once settled
    /// - `PhaseViolation` outside `(commit_deadline, reveal_deadline]`
    /// - `NoBidCommitted` if there is nothing to reveal
    /// - `InsufficientCollateral` if the collateral is below `amount`
    /// - `InvalidCommitment` if `(salt, amount)` does not match
    pub fn reveal<P: PaymentRail + ?Sized>(
        &mut self,
        account: AccountId,
        salt: &Salt,
        amount: Amount,
        now: DateTime<Utc>,
        rail: &mut P,
    ) -> Result<RevealOutcome> {
        self.guarded(|engine| engine.reveal_locked(account, salt, amount, now, rail))
    }

    fn reveal_locked<P: PaymentRail + ?Sized>(
        &mut self,
        account: AccountId,
        salt: &Salt,
        amount: Amount,
        now: DateTime<Utc>,
        rail: &mut P,
    ) -> Result<RevealOutcome> {
        if self.state.finalized {
            return Err(AuctionError::AlreadyFinalized);
        }
        if !self.config.in_reveal_window(now) {
            return Err(self.phase_error("reveal", now));
        }

        let record = self.ledger.get(account);
        let commitment = record.commitment.ok_or(AuctionError::NoBidCommitted)?;
        if record.collateral < amount {
            return Err(AuctionError::InsufficientCollateral {
                given: record.collateral,
                required: amount,
            });
        }
        if !commitment.verify(salt, amount, self.config.commitment_width) {
            tracing::debug!(account = %account, "Reveal does not match commitment");
            return Err(AuctionError::InvalidCommitment);
        }

        self.ledger.clear_commitment(account);
        self.state.num_unrevealed_bids = self
            .state
            .num_unrevealed_bids
            .checked_sub(1)
            .ok_or_else(|| AuctionError::AccountingViolation {
                reason: "unrevealed counter underflow".into(),
            })?;

        let outcome = self.strategy.on_reveal(account, amount);
        self.emit(AuctionEvent::BidRevealed { account, amount });

        match outcome {
            RevealOutcome::Leading { previous } => {
                tracing::info!(
                    account = %account,
                    amount,
                    displaced = ?previous,
                    "New leading bid"
                );
                self.emit(AuctionEvent::LeaderChanged {
                    account,
                    amount,
                    previous,
                });
            }
            RevealOutcome::Outbid => {
                tracing::debug!(account = %account, amount, "Bid cannot win, refunding");
                let refund = self.ledger.take_collateral(account);
                self.refund_best_effort(rail, account, refund, RefundKind::Outbid)?;
            }
        }

        Ok(outcome)
    }
}
