//! Commit phase: sealed bids go in, collateral accumulates.

use chrono::{DateTime, Utc};
use sealbid_types::{AccountId, Amount, AuctionError, AuctionEvent, Commitment, Result};

use crate::AuctionEngine;

impl AuctionEngine {
    /// Record (or replace) `account`'s sealed bid and add `deposit` to its
    /// collateral.
    ///
    /// A later commit overwrites the earlier commitment. Only the latest
    /// `(salt, amount)` pair can ever be revealed; deposits are never reset.
    ///
    /// # Errors
    /// - `Reentrant` while an outward transfer is in progress
    /// - `AlreadyFinalized` once settled
    /// - `PhaseViolation` outside `[start_time, commit_deadline]`
    /// - `InvalidCommitment` for a zero commitment or one wider than the
    ///   configured width
    /// - `AmountOverflow` if the collateral would overflow
    pub fn commit(
        &mut self,
        account: AccountId,
        commitment: Commitment,
        deposit: Amount,
        now: DateTime<Utc>,
    ) -> Result<()> {
        self.guard.check()?;
        if self.state.finalized {
            return Err(AuctionError::AlreadyFinalized);
        }
        if !self.config.in_commit_window(now) {
            return Err(self.phase_error("commit", now));
        }
        if commitment.is_zero() || !commitment.fits(self.config.commitment_width) {
            return Err(AuctionError::InvalidCommitment);
        }

        self.accounting.record_deposit(deposit)?;
        let opens_bid = match self.ledger.record_commit(account, commitment, deposit) {
            Ok(opens_bid) => opens_bid,
            Err(err) => {
                self.accounting.reverse_deposit(deposit);
                return Err(err);
            }
        };
        if opens_bid {
            self.state.num_unrevealed_bids += 1;
        }

        tracing::info!(
            account = %account,
            commitment = %commitment,
            deposited = deposit,
            new_bid = opens_bid,
            "Commit recorded"
        );
        self.emit(AuctionEvent::CommitRecorded {
            account,
            commitment,
            deposited: deposit,
        });
        Ok(())
    }
}
