//! Error types for the sealbid auction engine.
//!
//! All errors use the `SB_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by class:
//! - 1xx: Phase errors (operation outside its time window; retry later)
//! - 2xx: Validation errors (caller supplied bad input; never retried)
//! - 3xx: State errors (precondition on auction state not met)
//! - 4xx: Transfer errors (an outward value transfer failed)
//! - 9xx: General / internal errors

use thiserror::Error;

use crate::{AccountId, Amount, AuctionId, AuctionPhase};

/// Central error enum for all auction operations.
#[derive(Debug, Error)]
pub enum AuctionError {
    // =================================================================
    // Phase Errors (1xx)
    // =================================================================
    /// The operation is not valid in the auction's current time window.
    #[error("SB_ERR_100: {operation} not allowed during {phase}")]
    PhaseViolation {
        operation: &'static str,
        phase: AuctionPhase,
    },

    // =================================================================
    // Validation Errors (2xx)
    // =================================================================
    /// Zero commitment, commitment wider than the configured width, or a
    /// reveal whose (salt, amount) does not hash to the stored commitment.
    #[error("SB_ERR_200: Invalid commitment")]
    InvalidCommitment,

    /// The account has no active commitment to reveal.
    #[error("SB_ERR_201: No bid committed")]
    NoBidCommitted,

    /// Deposited collateral does not cover the revealed bid.
    #[error("SB_ERR_202: Insufficient collateral: given {given}, required {required}")]
    InsufficientCollateral { given: Amount, required: Amount },

    /// Collateral accumulation overflowed the amount type.
    #[error("SB_ERR_203: Amount overflow")]
    AmountOverflow,

    // =================================================================
    // State Errors (3xx)
    // =================================================================
    /// The auction has already been settled.
    #[error("SB_ERR_300: Auction already finalized")]
    AlreadyFinalized,

    /// Neither the reveal deadline has passed nor have all bids been revealed.
    #[error("SB_ERR_301: Auction not ready to end")]
    NotReadyToEnd,

    /// The current winner is settled only through `end_auction`.
    #[error("SB_ERR_302: Current winner cannot withdraw collateral")]
    CannotWithdraw,

    /// The withdrawal gate rejected an account that never revealed.
    #[error("SB_ERR_303: Bid not revealed")]
    UnrevealedBid,

    /// The account holds no collateral (or the seller no proceeds).
    #[error("SB_ERR_304: Nothing to withdraw")]
    NothingToWithdraw,

    /// A guarded entry point was invoked while the guard was held.
    #[error("SB_ERR_305: Reentrant call rejected")]
    Reentrant,

    // =================================================================
    // Transfer Errors (4xx)
    // =================================================================
    /// A fatal outward transfer failed.
    #[error("SB_ERR_400: Transfer of {amount} to {to} failed: {reason}")]
    TransferFailed {
        to: AccountId,
        amount: Amount,
        reason: String,
    },

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Configuration error (deadline ordering, penalty bounds, etc.).
    #[error("SB_ERR_900: Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Serialization / deserialization error.
    #[error("SB_ERR_901: Serialization error: {0}")]
    Serialization(String),

    /// I/O error (snapshot store).
    #[error("SB_ERR_902: I/O error: {0}")]
    Io(String),

    /// Collateral accounting no longer balances. Critical.
    #[error("SB_ERR_903: Accounting invariant violation: {reason}")]
    AccountingViolation { reason: String },

    /// No snapshot stored for this auction.
    #[error("SB_ERR_904: Auction not found: {0}")]
    AuctionNotFound(AuctionId),
}

impl AuctionError {
    /// Phase errors are the only class a caller can resolve by retrying later.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::PhaseViolation { .. } | Self::NotReadyToEnd)
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, AuctionError>;

impl From<std::io::Error> for AuctionError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for AuctionError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
