//! Settlement: close the auction, deliver the asset, pay the seller, and
//! return the winner's excess collateral.
//!
//! The whole call runs with the reentrancy guard held and sets `finalized`
//! before the first outward call. Order of outward calls:
//!
//! 1. asset to winner (or back to seller when there is no winner)
//! 2. clearing price to seller, subject to [`SellerPaymentPolicy`]
//! 3. winner excess, best-effort
//!
//! Under `Push`, a failed seller payment aborts with `TransferFailed`. The
//! auction stays finalized and the winner's collateral goes back into the
//! ledger, where nobody can withdraw it. That stranding is an accepted
//! risk; `Escrow` avoids it by crediting proceeds for a later pull.

use chrono::{DateTime, Utc};
use sealbid_types::{
    AccountId, Amount, AuctionError, AuctionEvent, RefundKind, Result, SellerPaymentPolicy,
};

use crate::AuctionEngine;
use crate::collaborators::{AssetCustody, PaymentRail};
use crate::strategy::WinnerSelectionStrategy;

/// Result of a completed `end_auction` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settlement {
    pub winner: Option<AccountId>,
    pub final_price: Amount,
    /// Winner collateral above the clearing price, returned best-effort.
    pub excess: Amount,
    /// Whether the seller was paid directly rather than escrowed.
    pub seller_paid: bool,
}

impl AuctionEngine {
    /// Whether `end_auction` would pass its timing precondition at `now`.
    ///
    /// Ready once the reveal deadline has passed, or earlier once the commit
    /// window is closed and every committed bid has been revealed.
    #[must_use]
    pub fn ready_to_end(&self, now: DateTime<Utc>) -> bool {
        now > self.config.reveal_deadline
            || (now > self.config.commit_deadline && self.state.num_unrevealed_bids == 0)
    }

    /// Settle the auction.
    ///
    /// # Errors
    /// - `Reentrant` while an outward transfer is in progress
    /// - `AlreadyFinalized` on a second call
    /// - `NotReadyToEnd` before the timing precondition holds
    /// - `TransferFailed` if the seller payment fails under `Push`
    pub fn end_auction<A, P>(
        &mut self,
        now: DateTime<Utc>,
        custody: &mut A,
        rail: &mut P,
    ) -> Result<Settlement>
    where
        A: AssetCustody + ?Sized,
        P: PaymentRail + ?Sized,
    {
        self.guarded(|engine| engine.end_auction_locked(now, custody, rail))
    }

    fn end_auction_locked<A, P>(
        &mut self,
        now: DateTime<Utc>,
        custody: &mut A,
        rail: &mut P,
    ) -> Result<Settlement>
    where
        A: AssetCustody + ?Sized,
        P: PaymentRail + ?Sized,
    {
        if self.state.finalized {
            return Err(AuctionError::AlreadyFinalized);
        }
        if !self.ready_to_end(now) {
            return Err(AuctionError::NotReadyToEnd);
        }
        self.state.finalized = true;

        let seller = self.config.seller;
        let winner = self.strategy.winner();
        let final_price = self.strategy.final_price();

        let Some(winner_id) = winner else {
            custody.return_asset_to_seller(self, seller);
            tracing::info!(
                auction = %self.config.auction_id,
                "Auction ended without a winner"
            );
            self.emit(AuctionEvent::AuctionEnded {
                auction_id: self.config.auction_id,
                winner: None,
                final_price: 0,
            });
            return Ok(Settlement {
                winner: None,
                final_price: 0,
                excess: 0,
                seller_paid: false,
            });
        };

        let collateral = self.ledger.take_collateral(winner_id);
        let excess = collateral.checked_sub(final_price).ok_or_else(|| {
            AuctionError::AccountingViolation {
                reason: format!(
                    "winner collateral {collateral} below clearing price {final_price}"
                ),
            }
        })?;

        custody.transfer_asset_to_winner(self, winner_id);

        let seller_paid = self.pay_seller(rail, winner_id, collateral, final_price)?;
        self.refund_best_effort(rail, winner_id, excess, RefundKind::WinnerExcess)?;

        tracing::info!(
            auction = %self.config.auction_id,
            winner = %winner_id,
            final_price,
            excess,
            seller_paid,
            "Auction ended"
        );
        self.emit(AuctionEvent::AuctionEnded {
            auction_id: self.config.auction_id,
            winner: Some(winner_id),
            final_price,
        });

        Ok(Settlement {
            winner: Some(winner_id),
            final_price,
            excess,
            seller_paid,
        })
    }

    /// Pay the clearing price out of the winner's (already taken) collateral.
    ///
    /// Returns `true` if paid directly, `false` if escrowed.
    fn pay_seller<P: PaymentRail + ?Sized>(
        &mut self,
        rail: &mut P,
        winner: AccountId,
        winner_collateral: Amount,
        price: Amount,
    ) -> Result<bool> {
        if price == 0 {
            return Ok(true);
        }
        let seller = self.config.seller;

        self.accounting.record_payout(price);
        let Err(err) = rail.pay_seller(self, seller, price) else {
            tracing::debug!(seller = %seller, amount = price, "Seller paid");
            self.emit(AuctionEvent::SellerPaid {
                seller,
                amount: price,
            });
            return Ok(true);
        };
        self.accounting.reverse_payout(price);

        match self.config.seller_payment {
            SellerPaymentPolicy::Push => {
                self.ledger.restore_collateral(winner, winner_collateral)?;
                tracing::warn!(
                    seller = %seller,
                    amount = price,
                    reason = %err,
                    "Seller payment failed, settlement aborted"
                );
                Err(AuctionError::TransferFailed {
                    to: seller,
                    amount: price,
                    reason: err.reason,
                })
            }
            SellerPaymentPolicy::Escrow => {
                self.state.seller_proceeds = self
                    .state
                    .seller_proceeds
                    .checked_add(price)
                    .ok_or(AuctionError::AmountOverflow)?;
                tracing::warn!(
                    seller = %seller,
                    amount = price,
                    reason = %err,
                    "Seller payment failed, proceeds escrowed"
                );
                self.emit(AuctionEvent::SellerPaymentDeferred {
                    seller,
                    amount: price,
                    reason: err.reason,
                });
                Ok(false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use sealbid_types::{AuctionConfig, Commitment, PricingRule, Salt};

    use super::*;
    use crate::testing::{MockCustody, MockRail};

    fn engine(pricing: PricingRule, reserve: Amount, payment: SellerPaymentPolicy) -> AuctionEngine {
        let start = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let config = AuctionConfig::new(
            AccountId::new(),
            start,
            Duration::seconds(100),
            Duration::seconds(100),
        )
        .with_pricing(pricing)
        .with_reserve(reserve)
        .with_seller_payment(payment);
        AuctionEngine::new(config).unwrap()
    }

    fn commit(e: &mut AuctionEngine, amount: Amount, deposit: Amount) -> (AccountId, Salt) {
        let account = AccountId::new();
        let (salt, c) = Commitment::sealed(amount, e.config().commitment_width);
        let start = e.config().start_time;
        e.commit(account, c, deposit, start).unwrap();
        (account, salt)
    }

    fn reveal_at(e: &AuctionEngine) -> DateTime<Utc> {
        e.config().commit_deadline + Duration::seconds(1)
    }

    fn after_reveal(e: &AuctionEngine) -> DateTime<Utc> {
        e.config().reveal_deadline + Duration::seconds(1)
    }

    #[test]
    fn first_price_settlement() {
        let mut e = engine(PricingRule::FirstPrice, 100, SellerPaymentPolicy::Push);
        let (x, salt) = commit(&mut e, 150, 200);
        let mut rail = MockRail::new();
        let mut custody = MockCustody::new();
        let at = reveal_at(&e);
        e.reveal(x, &salt, 150, at, &mut rail).unwrap();

        let end = after_reveal(&e);
        let s = e.end_auction(end, &mut custody, &mut rail).unwrap();
        assert_eq!(s.winner, Some(x));
        assert_eq!(s.final_price, 150);
        assert_eq!(s.excess, 50);
        assert!(s.seller_paid);
        assert_eq!(custody.delivered_to, vec![x]);
        assert_eq!(rail.seller_payments, vec![(e.config().seller, 150)]);
        assert_eq!(rail.transfers, vec![(x, 50)]);
        assert_eq!(e.bid(x).collateral, 0);
        assert!(e.is_finalized());
        assert!(!e.is_locked());
        e.verify_accounting().unwrap();
    }

    #[test]
    fn no_winner_returns_asset() {
        let mut e = engine(PricingRule::FirstPrice, 100, SellerPaymentPolicy::Push);
        let (x, salt) = commit(&mut e, 80, 80);
        let mut rail = MockRail::new();
        let mut custody = MockCustody::new();
        let at = reveal_at(&e);
        e.reveal(x, &salt, 80, at, &mut rail).unwrap();

        let s = e.end_auction(at, &mut custody, &mut rail).unwrap();
        assert_eq!(s.winner, None);
        assert_eq!(s.final_price, 0);
        assert_eq!(custody.returned_to, vec![e.config().seller]);
        assert!(custody.delivered_to.is_empty());
        assert!(rail.seller_payments.is_empty());
        e.verify_accounting().unwrap();
    }

    #[test]
    fn early_end_once_all_revealed() {
        let mut e = engine(PricingRule::FirstPrice, 0, SellerPaymentPolicy::Push);
        let (x, salt) = commit(&mut e, 10, 10);
        let mut rail = MockRail::new();
        let mut custody = MockCustody::new();
        let at = reveal_at(&e);

        assert!(matches!(
            e.end_auction(at, &mut custody, &mut rail),
            Err(AuctionError::NotReadyToEnd)
        ));
        e.reveal(x, &salt, 10, at, &mut rail).unwrap();
        assert!(e.ready_to_end(at));
        e.end_auction(at, &mut custody, &mut rail).unwrap();
    }

    #[test]
    fn cannot_end_during_commit_window() {
        let mut e = engine(PricingRule::FirstPrice, 0, SellerPaymentPolicy::Push);
        let start = e.config().start_time;
        let err = e
            .end_auction(start, &mut MockCustody::new(), &mut MockRail::new())
            .unwrap_err();
        assert!(matches!(err, AuctionError::NotReadyToEnd));
        assert!(!e.is_finalized());
    }

    #[test]
    fn second_call_is_already_finalized() {
        let mut e = engine(PricingRule::FirstPrice, 0, SellerPaymentPolicy::Push);
        let end = after_reveal(&e);
        let mut rail = MockRail::new();
        let mut custody = MockCustody::new();
        e.end_auction(end, &mut custody, &mut rail).unwrap();
        assert!(matches!(
            e.end_auction(end, &mut custody, &mut rail),
            Err(AuctionError::AlreadyFinalized)
        ));
        assert_eq!(custody.returned_to.len(), 1);
    }

    #[test]
    fn push_seller_failure_aborts_but_stays_finalized() {
        let mut e = engine(PricingRule::FirstPrice, 0, SellerPaymentPolicy::Push);
        let seller = e.config().seller;
        let (x, salt) = commit(&mut e, 60, 100);
        let mut rail = MockRail::new().rejecting(seller);
        let mut custody = MockCustody::new();
        let at = reveal_at(&e);
        e.reveal(x, &salt, 60, at, &mut rail).unwrap();

        let err = e.end_auction(at, &mut custody, &mut rail).unwrap_err();
        assert!(matches!(
            err,
            AuctionError::TransferFailed { to, amount: 60, .. } if to == seller
        ));
        assert!(e.is_finalized());
        assert!(!e.is_locked());
        assert_eq!(e.bid(x).collateral, 100);
        assert!(rail.transfers.is_empty());
        e.verify_accounting().unwrap();

        rail.accept(seller);
        assert!(matches!(
            e.end_auction(at, &mut custody, &mut rail),
            Err(AuctionError::AlreadyFinalized)
        ));
    }

    #[test]
    fn escrow_seller_failure_defers_payment() {
        let mut e = engine(PricingRule::FirstPrice, 0, SellerPaymentPolicy::Escrow);
        let seller = e.config().seller;
        let (x, salt) = commit(&mut e, 60, 100);
        let mut rail = MockRail::new().rejecting(seller);
        let mut custody = MockCustody::new();
        let at = reveal_at(&e);
        e.reveal(x, &salt, 60, at, &mut rail).unwrap();

        let s = e.end_auction(at, &mut custody, &mut rail).unwrap();
        assert!(!s.seller_paid);
        assert_eq!(e.seller_proceeds(), 60);
        assert_eq!(rail.transfers, vec![(x, 40)]);
        assert!(e.take_events().iter().any(|ev| matches!(
            ev,
            AuctionEvent::SellerPaymentDeferred { amount: 60, .. }
        )));
        e.verify_accounting().unwrap();
    }

    #[test]
    fn failed_excess_refund_goes_to_unclaimed() {
        let mut e = engine(PricingRule::SecondPrice, 10, SellerPaymentPolicy::Push);
        let (x, salt) = commit(&mut e, 60, 100);
        let mut rail = MockRail::new().rejecting(x);
        let mut custody = MockCustody::new();
        let at = reveal_at(&e);
        e.reveal(x, &salt, 60, at, &mut rail).unwrap();

        let s = e.end_auction(at, &mut custody, &mut rail).unwrap();
        assert_eq!(s.final_price, 10);
        assert_eq!(s.excess, 90);
        assert_eq!(e.unclaimed(), 90);
        assert_eq!(e.bid(x).collateral, 0);
        e.verify_accounting().unwrap();
    }

    #[test]
    fn exact_collateral_has_no_excess_transfer() {
        let mut e = engine(PricingRule::FirstPrice, 0, SellerPaymentPolicy::Push);
        let (x, salt) = commit(&mut e, 70, 70);
        let mut rail = MockRail::new();
        let at = reveal_at(&e);
        e.reveal(x, &salt, 70, at, &mut rail).unwrap();
        let s = e.end_auction(at, &mut MockCustody::new(), &mut rail).unwrap();
        assert_eq!(s.excess, 0);
        assert!(rail.transfers.is_empty());
    }
}
