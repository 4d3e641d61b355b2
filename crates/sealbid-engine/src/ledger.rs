//! Bid ledger: one [`BidRecord`] per account.
//!
//! Holds each account's active commitment and the collateral backing it.
//! Every mutation either fully applies or leaves the record unchanged.

use std::collections::BTreeMap;

use sealbid_types::{AccountId, Amount, AuctionError, BidRecord, Commitment, Result};
use serde::{Deserialize, Serialize};

/// Per-account commitment and collateral storage.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BidLedger {
    records: BTreeMap<AccountId, BidRecord>,
}

impl BidLedger {
    /// Create an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: BTreeMap::new(),
        }
    }

    /// Overwrite the account's commitment and add `deposit` to its collateral.
    ///
    /// Returns `true` if the account had no active commitment before, i.e.
    /// this commit opens a new unrevealed bid.
    ///
    /// # Errors
    /// Returns `AmountOverflow` if the collateral would overflow; the record
    /// is left untouched.
    pub fn record_commit(
        &mut self,
        account: AccountId,
        commitment: Commitment,
        deposit: Amount,
    ) -> Result<bool> {
        let entry = self.records.entry(account).or_default();
        let collateral = entry
            .collateral
            .checked_add(deposit)
            .ok_or(AuctionError::AmountOverflow)?;

        let opens_bid = entry.commitment.is_none();
        entry.commitment = Some(commitment);
        entry.collateral = collateral;
        Ok(opens_bid)
    }

    /// Mark the account's bid as revealed.
    pub fn clear_commitment(&mut self, account: AccountId) {
        if let Some(entry) = self.records.get_mut(&account) {
            entry.commitment = None;
        }
    }

    /// Zero the account's collateral and return what it held.
    pub fn take_collateral(&mut self, account: AccountId) -> Amount {
        self.records
            .get_mut(&account)
            .map_or(0, |entry| std::mem::take(&mut entry.collateral))
    }

    /// Put collateral back after an outward transfer failed.
    ///
    /// # Errors
    /// Returns `AmountOverflow` if the collateral would overflow.
    pub fn restore_collateral(&mut self, account: AccountId, amount: Amount) -> Result<()> {
        let entry = self.records.entry(account).or_default();
        entry.collateral = entry
            .collateral
            .checked_add(amount)
            .ok_or(AuctionError::AmountOverflow)?;
        Ok(())
    }

    /// Replace a record wholesale. Used to undo a failed withdrawal.
    pub fn put(&mut self, account: AccountId, record: BidRecord) {
        self.records.insert(account, record);
    }

    /// Get the record for an account (empty if never seen).
    #[must_use]
    pub fn get(&self, account: AccountId) -> BidRecord {
        self.records.get(&account).copied().unwrap_or_default()
    }

    /// Sum of all collateral held.
    #[must_use]
    pub fn total_collateral(&self) -> Amount {
        self.records.values().map(|r| r.collateral).sum()
    }

    /// Number of accounts with an active commitment.
    #[must_use]
    pub fn unrevealed_count(&self) -> usize {
        self.records.values().filter(|r| r.is_unrevealed()).count()
    }

    /// Number of accounts ever seen.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AccountId, &BidRecord)> {
        self.records.iter()
    }
}
