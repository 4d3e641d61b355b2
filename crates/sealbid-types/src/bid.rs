//! Per-account bid state.
//!
//! Each account holds at most one active commitment plus the collateral it
//! has deposited across all of its commits.

use serde::{Deserialize, Serialize};

use crate::Commitment;

/// Monetary amount in the payment medium's smallest unit.
pub type Amount = u128;

/// A single account's bid record.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct BidRecord {
    /// The active (unrevealed) commitment, if any.
    pub commitment: Option<Commitment>,
    /// Value deposited by this account and still held by the auction.
    pub collateral: Amount,
}

impl BidRecord {
    /// Whether the account still owes a reveal.
    #[must_use]
    pub fn is_unrevealed(&self) -> bool {
        self.commitment.is_some()
    }

    /// Whether this record carries neither a bid nor funds.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commitment.is_none() && self.collateral == 0
    }
}
