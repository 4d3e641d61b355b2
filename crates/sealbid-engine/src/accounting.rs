//! Collateral conservation checker.
//!
//! Invariant, holding between any two entry-point calls:
//! ```text
//! Σ collateral + seller_proceeds + unclaimed == Σ deposits - Σ payouts
//! ```
//!
//! Every unit that entered through a commit is either still held for a
//! bidder, owed to the seller, parked after a failed refund, or has left
//! through a successful transfer. Nothing else is possible.

use sealbid_types::{Amount, AuctionError, Result};
use serde::{Deserialize, Serialize};

/// Running inflow/outflow totals for one auction.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CollateralAccounting {
    deposited: Amount,
    paid_out: Amount,
}

impl CollateralAccounting {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record value entering through a commit.
    ///
    /// # Errors
    /// Returns `AmountOverflow` if the running total would overflow.
    pub fn record_deposit(&mut self, amount: Amount) -> Result<()> {
        self.deposited = self
            .deposited
            .checked_add(amount)
            .ok_or(AuctionError::AmountOverflow)?;
        Ok(())
    }

    /// Undo [`record_deposit`](Self::record_deposit) when the commit was rejected.
    pub fn reverse_deposit(&mut self, amount: Amount) {
        self.deposited = self.deposited.saturating_sub(amount);
    }

    /// Record value leaving through an outward transfer.
    pub fn record_payout(&mut self, amount: Amount) {
        self.paid_out = self.paid_out.saturating_add(amount);
    }

    /// Undo [`record_payout`](Self::record_payout) after the transfer failed.
    pub fn reverse_payout(&mut self, amount: Amount) {
        self.paid_out = self.paid_out.saturating_sub(amount);
    }

    /// Value that should still be in the auction's custody.
    #[must_use]
    pub fn expected_held(&self) -> Amount {
        self.deposited.saturating_sub(self.paid_out)
    }

    /// Compare what the auction actually holds against what it should hold.
    ///
    /// # Errors
    /// Returns [`AuctionError::AccountingViolation`] if they differ.
    pub fn verify(&self, actual_held: Amount) -> Result<()> {
        let expected = self.expected_held();
        if actual_held != expected || self.paid_out > self.deposited {
            return Err(AuctionError::AccountingViolation {
                reason: format!(
                    "held {actual_held} != expected {expected} \
                     (deposited={}, paid_out={})",
                    self.deposited, self.paid_out
                ),
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn total_deposited(&self) -> Amount {
        self.deposited
    }

    #[must_use]
    pub fn total_paid_out(&self) -> Amount {
        self.paid_out
    }
}
