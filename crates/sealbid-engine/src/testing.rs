//! In-memory collaborators for tests and local simulation.
//!
//! `MockRail` records every transfer and can be told to reject specific
//! receivers. `MockCustody` records where the asset went.

use std::collections::BTreeSet;

use sealbid_types::{AccountId, Amount};

use crate::AuctionEngine;
use crate::collaborators::{AssetCustody, PaymentRail, TransferError};

/// Payment rail that always succeeds unless the receiver was marked as
/// rejecting.
#[derive(Debug, Default)]
pub struct MockRail {
    pub transfers: Vec<(AccountId, Amount)>,
    pub seller_payments: Vec<(AccountId, Amount)>,
    rejecting: BTreeSet<AccountId>,
}

impl MockRail {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every transfer to `account` fail.
    #[must_use]
    pub fn rejecting(mut self, account: AccountId) -> Self {
        self.rejecting.insert(account);
        self
    }

    /// Start accepting transfers to `account` again.
    pub fn accept(&mut self, account: AccountId) {
        self.rejecting.remove(&account);
    }

    /// Total successfully sent to `account`, seller payments included.
    #[must_use]
    pub fn received(&self, account: AccountId) -> Amount {
        self.transfers
            .iter()
            .chain(&self.seller_payments)
            .filter(|(to, _)| *to == account)
            .map(|(_, amount)| amount)
            .sum()
    }

    fn check(&self, to: AccountId) -> Result<(), TransferError> {
        if self.rejecting.contains(&to) {
            return Err(TransferError::new(format!("{to} rejects transfers")));
        }
        Ok(())
    }
}

impl PaymentRail for MockRail {
    fn transfer(
        &mut self,
        _engine: &mut AuctionEngine,
        to: AccountId,
        amount: Amount,
    ) -> Result<(), TransferError> {
        self.check(to)?;
        self.transfers.push((to, amount));
        Ok(())
    }

    fn pay_seller(
        &mut self,
        _engine: &mut AuctionEngine,
        seller: AccountId,
        amount: Amount,
    ) -> Result<(), TransferError> {
        self.check(seller)?;
        self.seller_payments.push((seller, amount));
        Ok(())
    }
}

/// Asset custody that records each hand-off.
#[derive(Debug, Default)]
pub struct MockCustody {
    pub delivered_to: Vec<AccountId>,
    pub returned_to: Vec<AccountId>,
}

impl MockCustody {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl AssetCustody for MockCustody {
    fn transfer_asset_to_winner(&mut self, _engine: &mut AuctionEngine, winner: AccountId) {
        self.delivered_to.push(winner);
    }

    fn return_asset_to_seller(&mut self, _engine: &mut AuctionEngine, seller: AccountId) {
        self.returned_to.push(seller);
    }
}
