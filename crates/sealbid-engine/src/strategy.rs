//! Winner selection: the pluggable half of the reveal and settlement paths.
//!
//! The engine verifies a reveal, then hands `(account, amount)` to the
//! active strategy. The strategy owns its running winner state and decides
//! whether the bid leads or is out of the running. The engine performs any
//! resulting refund; strategies never move value.

use sealbid_types::{AccountId, Amount, AuctionError, BidRecord, PricingRule, Result};
use serde::{Deserialize, Serialize};

use crate::first_price::FirstPrice;
use crate::second_price::SecondPrice;
use crate::withdrawal::{Withdrawal, WithdrawalGate};

/// What a single reveal did to the running winner state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealOutcome {
    /// The bid took the lead, displacing `previous` if there was one.
    Leading { previous: Option<AccountId> },
    /// The bid cannot win. Its collateral is released immediately.
    Outbid,
}

/// Running winner state plus the clearing-price rule.
pub trait WinnerSelectionStrategy {
    /// Fold one verified reveal into the running state.
    fn on_reveal(&mut self, account: AccountId, amount: Amount) -> RevealOutcome;

    /// The account currently holding the lead, if any bid beat the reserve.
    fn winner(&self) -> Option<AccountId>;

    /// Highest revealed bid, or the reserve if none beat it.
    fn highest_bid(&self) -> Amount;

    /// Price the winner pays. Zero when there is no winner.
    fn final_price(&self) -> Amount;

    /// Decide whether `account` may withdraw and how much.
    ///
    /// The winner is always refused: it is settled only by `end_auction`.
    /// Everyone else is judged by `gate`.
    fn check_withdrawal(
        &self,
        account: AccountId,
        record: &BidRecord,
        finalized: bool,
        gate: &dyn WithdrawalGate,
    ) -> Result<Withdrawal> {
        if self.winner() == Some(account) {
            return Err(AuctionError::CannotWithdraw);
        }
        gate.check_withdrawal(account, record, finalized)
    }
}

/// The strategy variant selected at construction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum Strategy {
    FirstPrice(FirstPrice),
    SecondPrice(SecondPrice),
}

impl Strategy {
    /// Seed the strategy for `rule` with the reserve price.
    #[must_use]
    pub fn new(rule: PricingRule, reserve_price: Amount) -> Self {
        match rule {
            PricingRule::FirstPrice => Self::FirstPrice(FirstPrice::new(reserve_price)),
            PricingRule::SecondPrice => Self::SecondPrice(SecondPrice::new(reserve_price)),
        }
    }

    #[must_use]
    pub fn rule(&self) -> PricingRule {
        match self {
            Self::FirstPrice(_) => PricingRule::FirstPrice,
            Self::SecondPrice(_) => PricingRule::SecondPrice,
        }
    }

    /// Runner-up bid under second-price; `None` under first-price.
    #[must_use]
    pub fn second_highest_bid(&self) -> Option<Amount> {
        match self {
            Self::FirstPrice(_) => None,
            Self::SecondPrice(s) => Some(s.second_highest_bid()),
        }
    }

    fn inner(&self) -> &dyn WinnerSelectionStrategy {
        match self {
            Self::FirstPrice(s) => s,
            Self::SecondPrice(s) => s,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn WinnerSelectionStrategy {
        match self {
            Self::FirstPrice(s) => s,
            Self::SecondPrice(s) => s,
        }
    }
}

impl WinnerSelectionStrategy for Strategy {
    fn on_reveal(&mut self, account: AccountId, amount: Amount) -> RevealOutcome {
        self.inner_mut().on_reveal(account, amount)
    }

    fn winner(&self) -> Option<AccountId> {
        self.inner().winner()
    }

    fn highest_bid(&self) -> Amount {
        self.inner().highest_bid()
    }

    fn final_price(&self) -> Amount {
        self.inner().final_price()
    }
}
