//! First-price rule: the winner pays their own bid.

use sealbid_types::{AccountId, Amount};
use serde::{Deserialize, Serialize};

use crate::strategy::{RevealOutcome, WinnerSelectionStrategy};

/// Tracks the single highest revealed bid.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FirstPrice {
    current_winner: Option<AccountId>,
    /// Seeded with the reserve price.
    highest_bid: Amount,
}

impl FirstPrice {
    #[must_use]
    pub fn new(reserve_price: Amount) -> Self {
        Self {
            current_winner: None,
            highest_bid: reserve_price,
        }
    }
}

impl WinnerSelectionStrategy for FirstPrice {
    fn on_reveal(&mut self, account: AccountId, amount: Amount) -> RevealOutcome {
        // Strictly greater: an equal later bid never displaces the leader.
        if amount > self.highest_bid {
            let previous = self.current_winner.replace(account);
            self.highest_bid = amount;
            RevealOutcome::Leading { previous }
        } else {
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
            self.highest_bid
        } else {
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bid_above_reserve_leads() {
        let mut fp = FirstPrice::new(100);
        let x = AccountId::new();
        assert_eq!(fp.on_reveal(x, 150), RevealOutcome::Leading { previous: None });
        assert_eq!(fp.winner(), Some(x));
        assert_eq!(fp.final_price(), 150);
    }

    #[test]
    fn bid_at_reserve_is_outbid() {
        let mut fp = FirstPrice::new(100);
        assert_eq!(fp.on_reveal(AccountId::new(), 100), RevealOutcome::Outbid);
        assert_eq!(fp.winner(), None);
        assert_eq!(fp.final_price(), 0);
        assert_eq!(fp.highest_bid(), 100);
    }

    #[test]
    fn higher_bid_displaces_leader() {
        let mut fp = FirstPrice::new(0);
        let x = AccountId::new();
        let y = AccountId::new();
        fp.on_reveal(x, 50);
        assert_eq!(
            fp.on_reveal(y, 80),
            RevealOutcome::Leading { previous: Some(x) }
        );
        assert_eq!(fp.winner(), Some(y));
        assert_eq!(fp.final_price(), 80);
    }

    #[test]
    fn equal_bid_keeps_earliest_revealer() {
        let mut fp = FirstPrice::new(0);
        let x = AccountId::new();
        let y = AccountId::new();
        fp.on_reveal(x, 70);
        assert_eq!(fp.on_reveal(y, 70), RevealOutcome::Outbid);
        assert_eq!(fp.winner(), Some(x));
    }

    #[test]
    fn lower_bid_is_outbid() {
        let mut fp = FirstPrice::new(0);
        fp.on_reveal(AccountId::new(), 70);
        assert_eq!(fp.on_reveal(AccountId::new(), 10), RevealOutcome::Outbid);
        assert_eq!(fp.final_price(), 70);
    }
}
