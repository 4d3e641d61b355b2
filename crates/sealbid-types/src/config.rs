//! Auction configuration, fixed at creation.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::{AccountId, Amount, AuctionError, AuctionId, AuctionPhase, CommitmentWidth, Result, constants};

/// Which clearing price the winner pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PricingRule {
    /// Winner pays their own bid.
    #[default]
    FirstPrice,
    /// Winner pays the runner-up's bid (Vickrey).
    SecondPrice,
}

/// Gate applied by `withdraw_collateral` to non-winning accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WithdrawalPolicy {
    /// Only accounts that revealed may withdraw. Unrevealed collateral is
    /// locked for good.
    #[default]
    RequireReveal,
    /// Unrevealed collateral becomes withdrawable once the auction has ended.
    ReleaseAfterSettlement,
    /// Like `ReleaseAfterSettlement`, but `penalty_bps` of unrevealed
    /// collateral is forfeited to the seller.
    PenalizeUnrevealed { penalty_bps: u16 },
}

/// What happens when paying the seller fails during settlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SellerPaymentPolicy {
    /// Failure aborts `end_auction`. The auction stays finalized and the
    /// winner's collateral stays in custody with no path out.
    #[default]
    Push,
    /// Failure credits the seller's proceeds for a later
    /// `withdraw_proceeds` call.
    Escrow,
}

/// Immutable parameters of one auction.
///
/// Invariant: `start_time < commit_deadline < reveal_deadline`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuctionConfig {
    pub auction_id: AuctionId,
    pub seller: AccountId,
    pub start_time: DateTime<Utc>,
    /// Last instant (inclusive) at which commits are accepted.
    pub commit_deadline: DateTime<Utc>,
    /// Last instant (inclusive) at which reveals are accepted.
    pub reveal_deadline: DateTime<Utc>,
    /// Bids at or below this never win.
    pub reserve_price: Amount,
    pub pricing: PricingRule,
    pub commitment_width: CommitmentWidth,
    pub withdrawal_policy: WithdrawalPolicy,
    pub seller_payment: SellerPaymentPolicy,
}

impl AuctionConfig {
    /// Build a config whose commit window opens at `start`.
    ///
    /// Remaining fields take their defaults; adjust with the `with_*` setters.
    #[must_use]
    pub fn new(
        seller: AccountId,
        start: DateTime<Utc>,
        commit_window: Duration,
        reveal_window: Duration,
    ) -> Self {
        Self {
            auction_id: AuctionId::new(),
            seller,
            start_time: start,
            commit_deadline: start + commit_window,
            reveal_deadline: start + commit_window + reveal_window,
            reserve_price: 0,
            pricing: PricingRule::default(),
            commitment_width: CommitmentWidth::default(),
            withdrawal_policy: WithdrawalPolicy::default(),
            seller_payment: SellerPaymentPolicy::default(),
        }
    }

    /// Config with the default one-day commit and reveal windows.
    #[must_use]
    pub fn with_default_windows(seller: AccountId, start: DateTime<Utc>) -> Self {
        Self::new(
            seller,
            start,
            Duration::seconds(constants::DEFAULT_COMMIT_WINDOW_SECS),
            Duration::seconds(constants::DEFAULT_REVEAL_WINDOW_SECS),
        )
    }

    #[must_use]
    pub fn with_reserve(mut self, reserve_price: Amount) -> Self {
        self.reserve_price = reserve_price;
        self
    }

    #[must_use]
    pub fn with_pricing(mut self, pricing: PricingRule) -> Self {
        self.pricing = pricing;
        self
    }

    #[must_use]
    pub fn with_commitment_width(mut self, width: CommitmentWidth) -> Self {
        self.commitment_width = width;
        self
    }

    #[must_use]
    pub fn with_withdrawal_policy(mut self, policy: WithdrawalPolicy) -> Self {
        self.withdrawal_policy = policy;
        self
    }

    #[must_use]
    pub fn with_seller_payment(mut self, policy: SellerPaymentPolicy) -> Self {
        self.seller_payment = policy;
        self
    }

    /// Check deadline ordering and policy bounds.
    pub fn validate(&self) -> Result<()> {
        if self.start_time >= self.commit_deadline {
            return Err(AuctionError::InvalidConfig(format!(
                "start {} must precede commit deadline {}",
                self.start_time, self.commit_deadline
            )));
        }
        if self.commit_deadline >= self.reveal_deadline {
            return Err(AuctionError::InvalidConfig(format!(
                "commit deadline {} must precede reveal deadline {}",
                self.commit_deadline, self.reveal_deadline
            )));
        }
        if let WithdrawalPolicy::PenalizeUnrevealed { penalty_bps } = self.withdrawal_policy {
            if penalty_bps > constants::MAX_PENALTY_BPS {
                return Err(AuctionError::InvalidConfig(format!(
                    "penalty {penalty_bps} bps exceeds {}",
                    constants::MAX_PENALTY_BPS
                )));
            }
        }
        Ok(())
    }

    /// `start <= now <= commit_deadline`.
    #[must_use]
    pub fn in_commit_window(&self, now: DateTime<Utc>) -> bool {
        self.start_time <= now && now <= self.commit_deadline
    }

    /// `commit_deadline < now <= reveal_deadline`.
    #[must_use]
    pub fn in_reveal_window(&self, now: DateTime<Utc>) -> bool {
        self.commit_deadline < now && now <= self.reveal_deadline
    }

    /// Phase at `now`, given whether settlement has run.
    #[must_use]
    pub fn phase_at(&self, now: DateTime<Utc>, finalized: bool) -> AuctionPhase {
        if finalized {
            AuctionPhase::Ended
        } else if now < self.start_time {
            AuctionPhase::Created
        } else if now <= self.commit_deadline {
            AuctionPhase::Committing
        } else if now <= self.reveal_deadline {
            AuctionPhase::Revealing
        } else {
            AuctionPhase::AwaitingSettlement
        }
    }
}
