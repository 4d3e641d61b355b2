//! Auction lifecycle phases.
//!
//! ```text
//! CREATED ──start──▶ COMMITTING ──commit deadline──▶ REVEALING
//!                                                        │
//!                     reveal deadline (or all revealed)  ▼
//!                  ENDED ◀──end_auction── AWAITING_SETTLEMENT
//! ```
//!
//! Phase boundaries are wall-clock deadlines, evaluated lazily against the
//! caller-supplied time on each call. Only `ENDED` is latched: it is entered
//! by `end_auction` and never left.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The phase an auction is in at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuctionPhase {
    /// Before the start time. Nothing is accepted.
    Created,
    /// `[start, commit_deadline]`: commitments accepted.
    Committing,
    /// `(commit_deadline, reveal_deadline]`: reveals accepted.
    Revealing,
    /// Reveal window closed, settlement not yet run.
    AwaitingSettlement,
    /// Settled. Terminal.
    Ended,
}

impl AuctionPhase {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Ended)
    }
}

impl fmt::Display for AuctionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => write!(f, "CREATED"),
            Self::Committing => write!(f, "COMMITTING"),
            Self::Revealing => write!(f, "REVEALING"),
            Self::AwaitingSettlement => write!(f, "AWAITING_SETTLEMENT"),
            Self::Ended => write!(f, "ENDED"),
        }
    }
}
