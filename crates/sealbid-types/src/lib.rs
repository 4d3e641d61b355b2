//! # sealbid-types
//!
//! Shared types, errors, and configuration for the **sealbid** auction engine.
//!
//! This crate is the leaf dependency of the workspace. It defines:
//!
//! - **Identifiers**: [`AccountId`], [`AuctionId`]
//! - **Commitments**: [`Commitment`], [`Salt`], [`CommitmentWidth`]
//! - **Bid model**: [`BidRecord`], [`Amount`]
//! - **Lifecycle**: [`AuctionPhase`]
//! - **Configuration**: [`AuctionConfig`], [`PricingRule`], [`WithdrawalPolicy`], [`SellerPaymentPolicy`]
//! - **Events**: [`AuctionEvent`], [`RefundKind`]
//! - **Errors**: [`AuctionError`] with `SB_ERR_` prefix codes
//! - **Constants**: system-wide limits and defaults

pub mod bid;
pub mod commitment;
pub mod config;
pub mod constants;
pub mod error;
pub mod event;
pub mod ids;
pub mod phase;

pub use bid::*;
pub use commitment::*;
pub use config::*;
pub use error::*;
pub use event::*;
pub use ids::*;
pub use phase::*;

// Constants are accessed via `sealbid_types::constants::FOO`.
