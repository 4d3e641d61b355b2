//! # sealbid-engine
//!
//! Sealed-bid commit-reveal auction engine.
//!
//! - [`AuctionEngine`]: one auction, driven through four entry points
//!   (`commit`, `reveal`, `end_auction`, `withdraw_collateral`)
//! - [`BidLedger`]: per-account commitment and collateral
//! - [`WinnerSelectionStrategy`]: [`FirstPrice`] or [`SecondPrice`]
//! - [`ReentrancyGuard`]: latch held across every outward transfer
//! - [`CollateralAccounting`]: conservation check over deposits and payouts
//! - [`PaymentRail`] / [`AssetCustody`]: supplied by the embedding application
//! - [`AuctionStore`]: snapshot persistence
//!
//! ## Lifecycle
//!
//! ```text
//! ┌─────────┐ start ┌────────────┐ commit_deadline ┌───────────┐
//! │ CREATED │──────▶│ COMMITTING │────────────────▶│ REVEALING │
//! └─────────┘       └────────────┘                 └─────┬─────┘
//!                                                        │ reveal_deadline,
//!                                                        │ or all revealed
//!                                                        ▼
//!                             ┌───────┐  end_auction ┌─────────────────────┐
//!                             │ ENDED │◀─────────────│ AWAITING_SETTLEMENT │
//!                             └───────┘              └─────────────────────┘
//! ```
//!
//! Phases follow the caller-supplied clock; nothing runs in the background.
//!
//! ## Residual risk
//!
//! Under the default [`CommitmentWidth::Truncated160`](sealbid_types::CommitmentWidth)
//! a bidder able to find a second preimage of a 160-bit hash prefix could
//! open the same commitment at two amounts. This is accepted, not mitigated.
//! Use `Full256` to remove the trade-off.

pub mod accounting;
pub mod collaborators;
pub mod commit;
pub mod engine;
pub mod first_price;
pub mod ledger;
pub mod reentrancy;
pub mod reveal;
pub mod second_price;
pub mod settlement;
pub mod store;
pub mod strategy;
pub mod withdrawal;

#[cfg(any(test, feature = "test-helpers"))]
pub mod testing;

pub use accounting::CollateralAccounting;
pub use collaborators::{AssetCustody, PaymentRail, TransferError};
pub use engine::{AuctionEngine, AuctionSnapshot, AuctionState};
pub use first_price::FirstPrice;
pub use ledger::BidLedger;
pub use reentrancy::ReentrancyGuard;
pub use second_price::SecondPrice;
pub use settlement::Settlement;
pub use store::{AuctionStore, JsonFileStore, MemoryStore};
pub use strategy::{RevealOutcome, Strategy, WinnerSelectionStrategy};
pub use withdrawal::{Withdrawal, WithdrawalGate};
