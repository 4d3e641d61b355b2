//! Notifications emitted by the auction engine.
//!
//! Every state change appends one [`AuctionEvent`] to the engine's outbox.
//! The embedding application drains and publishes them.

use serde::{Deserialize, Serialize};

use crate::{AccountId, Amount, AuctionId, Commitment};

/// Why an outward refund was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RefundKind {
    /// A revealed bid that cannot win, released at reveal time.
    Outbid,
    /// The winner's collateral above the clearing price.
    WinnerExcess,
}

impl std::fmt::Display for RefundKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Outbid => write!(f, "OUTBID"),
            Self::WinnerExcess => write!(f, "WINNER_EXCESS"),
        }
    }
}

/// A state change worth telling the outside world about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuctionEvent {
    /// A commitment was recorded or overwritten.
    CommitRecorded {
        account: AccountId,
        commitment: Commitment,
        deposited: Amount,
    },
    /// A commitment was opened successfully.
    BidRevealed { account: AccountId, amount: Amount },
    /// A revealed bid took the lead.
    LeaderChanged {
        account: AccountId,
        amount: Amount,
        previous: Option<AccountId>,
    },
    /// A best-effort refund succeeded.
    RefundIssued {
        account: AccountId,
        amount: Amount,
        kind: RefundKind,
    },
    /// A best-effort refund failed; the caller's operation still succeeded.
    RefundFailed {
        account: AccountId,
        amount: Amount,
        kind: RefundKind,
        reason: String,
    },
    /// Collateral was withdrawn through the withdrawal gate.
    CollateralWithdrawn {
        account: AccountId,
        amount: Amount,
        forfeited: Amount,
    },
    /// The seller received the clearing price.
    SellerPaid { seller: AccountId, amount: Amount },
    /// Seller payment failed and was escrowed for a later pull.
    SellerPaymentDeferred {
        seller: AccountId,
        amount: Amount,
        reason: String,
    },
    /// The seller pulled escrowed proceeds.
    ProceedsWithdrawn { seller: AccountId, amount: Amount },
    /// Settlement completed.
    AuctionEnded {
        auction_id: AuctionId,
        winner: Option<AccountId>,
        final_price: Amount,
    },
}

impl AuctionEvent {
    /// Stable upper-case name for logs and metrics labels.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CommitRecorded { .. } => "COMMIT_RECORDED",
            Self::BidRevealed { .. } => "BID_REVEALED",
            Self::LeaderChanged { .. } => "LEADER_CHANGED",
            Self::RefundIssued { .. } => "REFUND_ISSUED",
            Self::RefundFailed { .. } => "REFUND_FAILED",
            Self::CollateralWithdrawn { .. } => "COLLATERAL_WITHDRAWN",
            Self::SellerPaid { .. } => "SELLER_PAID",
            Self::SellerPaymentDeferred { .. } => "SELLER_PAYMENT_DEFERRED",
            Self::ProceedsWithdrawn { .. } => "PROCEEDS_WITHDRAWN",
            Self::AuctionEnded { .. } => "AUCTION_ENDED",
        }
    }
}
