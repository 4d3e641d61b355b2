//! Second-price (Vickrey) rule: the winner pays the runner-up's bid.
//!
//! Because the winner's payment does not depend on their own stated value,
//! bidding one's true value is the dominant strategy.

use sealbid_types::{AccountId, Amount};
use serde::{Deserialize, Serialize};

use crate::strategy::{RevealOutcome, WinnerSelectionStrategy};

/// Tracks the highest and second-highest revealed bids.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SecondPrice {
    current_winner: Option<AccountId>,
    highest_bid: Amount,
    second_highest_bid: Amount,
}

impl SecondPrice {
    /// Both running bids start at the reserve price.
    #[must_use]
    pub fn new(reserve_price: Amount) -> Self {
        Self {
            current_winner: None,
            highest_bid: reserve_price,
            second_highest_bid: reserve_price,
        }
    }

    #[must_use]
    pub fn second_highest_bid(&self) -> Amount {
        self.second_highest_bid
    }
}

impl WinnerSelectionStrategy for SecondPrice {
    fn on_reveal(&mut self, account: AccountId, amount: Amount) -> RevealOutcome {
        if amount > self.highest_bid {
            self.second_highest_bid = self.highest_bid;
            self.highest_bid = amount;
            let previous = self.current_winner.replace(account);
            RevealOutcome::Leading { previous }
        } else {
            if amount > self.second_highest_bid {
                self.second_highest_bid = amount;
            }
            RevealOutcome::Outbid
        }
    }

    fn winner(&self) -> Option<AccountId> {
        self.current_winner
    }

    fn highest_bid(&self) -> Amount {
        self.highest_bid
    }

    fn final_price(&self) -> Amount {
        if self.current_winner.is_some() {
            self.second_highest_bid
        } else {
            0
        }
    }
}
