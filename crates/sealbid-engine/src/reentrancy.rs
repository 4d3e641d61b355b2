//! Reentrancy guard for entry points that move value outward.
//!
//! Outward transfers hand control to code the engine does not own, which
//! may call straight back into the engine. The guard is a single latch:
//! held for the span of every outward transfer, and checked first by every
//! mutating entry point. A nested call while it is held fails with
//! [`AuctionError::Reentrant`] before touching any state.
//!
//! The latch is released explicitly on every exit path. It is not
//! persisted: a restored engine always starts released.

use sealbid_types::{AuctionError, Result};

/// Single-flag mutual exclusion latch.
#[derive(Debug, Default)]
pub struct ReentrancyGuard {
    locked: bool,
}

impl ReentrancyGuard {
    /// Create a released guard.
    #[must_use]
    pub fn new() -> Self {
        Self { locked: false }
    }

    /// Fail if the latch is held.
    ///
    /// # Errors
    /// Returns [`AuctionError::Reentrant`] while held.
    pub fn check(&self) -> Result<()> {
        if self.locked {
            tracing::warn!("Reentrant call rejected");
            return Err(AuctionError::Reentrant);
        }
        Ok(())
    }

    /// Take the latch.
    ///
    /// # Errors
    /// Returns [`AuctionError::Reentrant`] if already held.
    pub fn enter(&mut self) -> Result<()> {
        self.check()?;
        self.locked = true;
        Ok(())
    }

    /// Release the latch.
    pub fn exit(&mut self) {
        self.locked = false;
    }

    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.locked
    }
}
