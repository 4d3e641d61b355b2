//! Withdrawals: losing bidders reclaim collateral, the seller pulls
//! escrowed proceeds.
//!
//! The winner never withdraws here; it is settled only by `end_auction`.
//! Everyone else passes through a [`WithdrawalGate`]. The configured
//! [`WithdrawalPolicy`] is the default gate; [`AuctionEngine::withdraw_collateral_with`]
//! accepts any other.
//!
//! A failed withdrawal transfer is fatal for that call: every effect is
//! undone and the caller gets `TransferFailed`.

use sealbid_types::{
    AccountId, Amount, AuctionError, AuctionEvent, BidRecord, Result, WithdrawalPolicy,
    constants,
};

use crate::AuctionEngine;
use crate::collaborators::PaymentRail;
use crate::strategy::WinnerSelectionStrategy;

/// How much a permitted withdrawal pays out and how much it forfeits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Withdrawal {
    pub payout: Amount,
    pub forfeited: Amount,
}

/// Decides whether a non-winning account may withdraw.
pub trait WithdrawalGate {
    /// # Errors
    /// - `NothingToWithdraw` if the account holds no collateral
    /// - `UnrevealedBid` if the account's bid is still sealed and the gate
    ///   does not release it
    fn check_withdrawal(
        &self,
        account: AccountId,
        record: &BidRecord,
        finalized: bool,
    ) -> Result<Withdrawal>;
}

impl WithdrawalGate for WithdrawalPolicy {
    fn check_withdrawal(
        &self,
        _account: AccountId,
        record: &BidRecord,
        finalized: bool,
    ) -> Result<Withdrawal> {
        if record.collateral == 0 {
            return Err(AuctionError::NothingToWithdraw);
        }
        let full = Withdrawal {
            payout: record.collateral,
            forfeited: 0,
        };
        if !record.is_unrevealed() {
            return Ok(full);
        }

        match *self {
            Self::RequireReveal => Err(AuctionError::UnrevealedBid),
            Self::ReleaseAfterSettlement | Self::PenalizeUnrevealed { .. } if !finalized => {
                Err(AuctionError::UnrevealedBid)
            }
            Self::ReleaseAfterSettlement => Ok(full),
            Self::PenalizeUnrevealed { penalty_bps } => {
                let forfeited = penalty(record.collateral, penalty_bps);
                Ok(Withdrawal {
                    payout: record.collateral - forfeited,
                    forfeited,
                })
            }
        }
    }
}

/// `collateral * bps / 10_000`, rounded down, without overflowing.
/// `bps` is capped at 100%.
fn penalty(collateral: Amount, bps: u16) -> Amount {
    let bps = Amount::from(bps.min(constants::MAX_PENALTY_BPS));
    let denom = constants::BPS_DENOMINATOR;
    (collateral / denom) * bps + (collateral % denom) * bps / denom
}

impl AuctionEngine {
    /// Withdraw `account`'s collateral under the configured policy.
    ///
    /// # Errors
    /// - `Reentrant` while an outward transfer is in progress
    /// - `CannotWithdraw` for the current winner
    /// - `UnrevealedBid` / `NothingToWithdraw` from the gate
    /// - `TransferFailed` if the payout transfer fails; nothing changes
    pub fn withdraw_collateral<P: PaymentRail + ?Sized>(
        &mut self,
        account: AccountId,
        rail: &mut P,
    ) -> Result<Withdrawal> {
        let policy = self.config.withdrawal_policy;
        self.withdraw_collateral_with(account, &policy, rail)
    }

    /// Withdraw `account`'s collateral under a caller-supplied gate.
    ///
    /// # Errors
    /// Same as [`withdraw_collateral`](Self::withdraw_collateral).
    pub fn withdraw_collateral_with<G, P>(
        &mut self,
        account: AccountId,
        gate: &G,
        rail: &mut P,
    ) -> Result<Withdrawal>
    where
        G: WithdrawalGate + ?Sized,
        P: PaymentRail + ?Sized,
    {
        self.guarded(|engine| engine.withdraw_collateral_locked(account, gate, rail))
    }

    fn withdraw_collateral_locked<G, P>(
        &mut self,
        account: AccountId,
        gate: &G,
        rail: &mut P,
    ) -> Result<Withdrawal>
    where
        G: WithdrawalGate + ?Sized,
        P: PaymentRail + ?Sized,
    {
        let record = self.ledger.get(account);
        let withdrawal = self.strategy.check_withdrawal(
            account,
            &record,
            self.state.finalized,
            &GateRef(gate),
        )?;
        let proceeds_before = self.state.seller_proceeds;
        let proceeds_after = proceeds_before
            .checked_add(withdrawal.forfeited)
            .ok_or(AuctionError::AmountOverflow)?;

        let taken = self.ledger.take_collateral(account);
        if withdrawal.payout.checked_add(withdrawal.forfeited) != Some(taken) {
            self.ledger.put(account, record);
            return Err(AuctionError::AccountingViolation {
                reason: format!(
                    "withdrawal {} + forfeit {} != collateral {taken}",
                    withdrawal.payout, withdrawal.forfeited
                ),
            });
        }
        // A released sealed bid can no longer be revealed.
        let was_sealed = record.is_unrevealed();
        if was_sealed {
            self.ledger.clear_commitment(account);
            self.state.num_unrevealed_bids = self.state.num_unrevealed_bids.saturating_sub(1);
        }
        self.state.seller_proceeds = proceeds_after;

        if withdrawal.payout > 0 {
            self.accounting.record_payout(withdrawal.payout);
            if let Err(err) = rail.transfer(self, account, withdrawal.payout) {
                self.accounting.reverse_payout(withdrawal.payout);
                self.state.seller_proceeds = proceeds_before;
                self.ledger.put(account, record);
                if was_sealed {
                    self.state.num_unrevealed_bids += 1;
                }
                tracing::warn!(
                    account = %account,
                    amount = withdrawal.payout,
                    reason = %err,
                    "Withdrawal transfer failed"
                );
                return Err(AuctionError::TransferFailed {
                    to: account,
                    amount: withdrawal.payout,
                    reason: err.reason,
                });
            }
        }

        tracing::info!(
            account = %account,
            amount = withdrawal.payout,
            forfeited = withdrawal.forfeited,
            "Collateral withdrawn"
        );
        self.emit(AuctionEvent::CollateralWithdrawn {
            account,
            amount: withdrawal.payout,
            forfeited: withdrawal.forfeited,
        });
        Ok(withdrawal)
    }

    /// Pay escrowed proceeds to the seller.
    ///
    /// # Errors
    /// - `Reentrant` while an outward transfer is in progress
    /// - `NothingToWithdraw` if nothing is owed
    /// - `TransferFailed` if the transfer fails; the proceeds stay owed
    pub fn withdraw_proceeds<P: PaymentRail + ?Sized>(&mut self, rail: &mut P) -> Result<Amount> {
        self.guarded(|engine| engine.withdraw_proceeds_locked(rail))
    }

    fn withdraw_proceeds_locked<P: PaymentRail + ?Sized>(&mut self, rail: &mut P) -> Result<Amount> {
        let amount = std::mem::take(&mut self.state.seller_proceeds);
        if amount == 0 {
            return Err(AuctionError::NothingToWithdraw);
        }
        let seller = self.config.seller;

        self.accounting.record_payout(amount);
        if let Err(err) = rail.pay_seller(self, seller, amount) {
            self.accounting.reverse_payout(amount);
            self.state.seller_proceeds = amount;
            tracing::warn!(seller = %seller, amount, reason = %err, "Proceeds withdrawal failed");
            return Err(AuctionError::TransferFailed {
                to: seller,
                amount,
                reason: err.reason,
            });
        }

        tracing::info!(seller = %seller, amount, "Proceeds withdrawn");
        self.emit(AuctionEvent::ProceedsWithdrawn { seller, amount });
        Ok(amount)
    }
}

/// Adapts a possibly unsized gate to `&dyn WithdrawalGate`.
struct GateRef<'a, G: ?Sized>(&'a G);

impl<G: WithdrawalGate + ?Sized> WithdrawalGate for GateRef<'_, G> {
    fn check_withdrawal(
        &self,
        account: AccountId,
        record: &BidRecord,
        finalized: bool,
    ) -> Result<Withdrawal> {
        self.0.check_withdrawal(account, record, finalized)
    }
}
