//! Contract points implemented by the embedding application.
//!
//! The engine decides *who* gets *what*; these traits perform the actual
//! movement of the traded asset and of the payment medium.
//!
//! Every callback receives the engine itself. This is deliberate modelling
//! of the fact that a transfer runs code the engine does not control, and
//! that code may call back in. While a callback runs the engine's
//! reentrancy guard is held, so any mutating call made through the handle
//! fails with `Reentrant`.

use sealbid_types::{AccountId, Amount};
use thiserror::Error;

use crate::AuctionEngine;

/// Why an outward transfer did not go through.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct TransferError {
    pub reason: String,
}

impl TransferError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Moves the payment medium out of the auction's custody.
pub trait PaymentRail {
    /// Send `amount` to `to`. Used for refunds and collateral withdrawals.
    fn transfer(
        &mut self,
        engine: &mut AuctionEngine,
        to: AccountId,
        amount: Amount,
    ) -> Result<(), TransferError>;

    /// Pay the clearing price to the seller.
    fn pay_seller(
        &mut self,
        engine: &mut AuctionEngine,
        seller: AccountId,
        amount: Amount,
    ) -> Result<(), TransferError> {
        self.transfer(engine, seller, amount)
    }
}

/// Custody of the traded asset. Neither call may fail.
pub trait AssetCustody {
    /// Called once per settlement that has a winner.
    fn transfer_asset_to_winner(&mut self, engine: &mut AuctionEngine, winner: AccountId);

    /// Called once per settlement without a winner.
    fn return_asset_to_seller(&mut self, engine: &mut AuctionEngine, seller: AccountId);
}
