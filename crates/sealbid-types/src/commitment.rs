//! # Bid commitments
//!
//! A bidder hides a bid by publishing
//!
//! ```text
//! commitment = truncate(SHA-256(domain || salt[32] || amount_be[32]), width)
//! ```
//!
//! and later opens it by disclosing `(salt, amount)`. The amount is encoded
//! as a 32-byte big-endian integer so the preimage has a fixed layout.
//!
//! ## Width and residual risk
//!
//! [`CommitmentWidth::Truncated160`] keeps only the first 20 bytes of the
//! digest. This halves stored commitment size at the cost of a smaller
//! collision margin: a bidder who can find two `(salt, amount)` pairs with the
//! same 160-bit prefix could choose their bid after the commit phase. Finding
//! such a pair takes roughly 2^80 hash evaluations. This forgery risk is known
//! and unmitigated under the truncated width.
//! [`CommitmentWidth::Full256`] stores the whole digest and removes the
//! trade-off; switching an existing deployment changes which commitments
//! verify, so it is an explicit configuration choice.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{Amount, constants};

/// How many digest bytes a commitment retains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CommitmentWidth {
    /// 160-bit prefix of the SHA-256 digest.
    #[default]
    Truncated160,
    /// The full 256-bit digest.
    Full256,
}

impl CommitmentWidth {
    /// Number of digest bytes retained.
    #[must_use]
    pub fn byte_len(self) -> usize {
        match self {
            Self::Truncated160 => constants::TRUNCATED_COMMITMENT_LEN,
            Self::Full256 => constants::FULL_COMMITMENT_LEN,
        }
    }

    #[must_use]
    pub fn bits(self) -> usize {
        self.byte_len() * 8
    }
}

impl fmt::Display for CommitmentWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-bit", self.bits())
    }
}

// ---------------------------------------------------------------------------
// Salt
// ---------------------------------------------------------------------------

/// Bidder-chosen randomness that blinds the committed amount.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Salt(pub [u8; constants::SALT_LEN]);

impl Salt {
    #[must_use]
    pub fn from_bytes(bytes: [u8; constants::SALT_LEN]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; constants::SALT_LEN] {
        &self.0
    }
}

// Salts are secrets until reveal; keep them out of debug logs.
impl fmt::Debug for Salt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Salt(..)")
    }
}

// ---------------------------------------------------------------------------
// Commitment
// ---------------------------------------------------------------------------

/// A (possibly truncated) hash commitment to a bid.
///
/// Stored in a fixed 32-byte buffer; under the truncated width the trailing
/// 12 bytes are zero.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Commitment(pub [u8; constants::FULL_COMMITMENT_LEN]);

impl Commitment {
    /// Commit to `amount` blinded by `salt` at the given width.
    #[must_use]
    pub fn compute(salt: &Salt, amount: Amount, width: CommitmentWidth) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(constants::COMMITMENT_DOMAIN);
        hasher.update(salt.as_bytes());
        hasher.update(amount_be32(amount));
        let digest = hasher.finalize();

        let keep = width.byte_len();
        let mut bytes = [0u8; constants::FULL_COMMITMENT_LEN];
        bytes[..keep].copy_from_slice(&digest[..keep]);
        Self(bytes)
    }

    /// Check an opening against this commitment.
    #[must_use]
    pub fn verify(&self, salt: &Salt, amount: Amount, width: CommitmentWidth) -> bool {
        Self::compute(salt, amount, width) == *self
    }

    /// The all-zero value, which never denotes a bid.
    #[must_use]
    pub fn zero() -> Self {
        Self([0u8; constants::FULL_COMMITMENT_LEN])
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }

    /// Whether every byte past `width` is zero.
    #[must_use]
    pub fn fits(&self, width: CommitmentWidth) -> bool {
        self.0[width.byte_len()..].iter().all(|b| *b == 0)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; constants::FULL_COMMITMENT_LEN] {
        &self.0
    }

    /// Parse a hex string of 40 (truncated) or 64 (full) characters.
    pub fn from_hex(s: &str) -> crate::Result<Self> {
        let raw = hex::decode(s.trim_start_matches("0x"))
            .map_err(|e| crate::AuctionError::Serialization(e.to_string()))?;
        if raw.len() != constants::TRUNCATED_COMMITMENT_LEN
            && raw.len() != constants::FULL_COMMITMENT_LEN
        {
            return Err(crate::AuctionError::InvalidCommitment);
        }
        let mut bytes = [0u8; constants::FULL_COMMITMENT_LEN];
        bytes[..raw.len()].copy_from_slice(&raw);
        Ok(Self(bytes))
    }

    /// Hex of the significant bytes under `width`.
    #[must_use]
    pub fn to_hex(&self, width: CommitmentWidth) -> String {
        hex::encode(&self.0[..width.byte_len()])
    }
}

impl fmt::Display for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Commitment({})", hex::encode(&self.0[..8]))
    }
}

fn amount_be32(amount: Amount) -> [u8; 32] {
    let mut out = [0u8; 32];
    out[16..].copy_from_slice(&amount.to_be_bytes());
    out
}

/// Test helpers.
#[cfg(any(test, feature = "test-helpers"))]
impl Salt {
    /// A fresh random salt.
    pub fn random() -> Self {
        use rand::RngCore;
        let mut bytes = [0u8; constants::SALT_LEN];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes)
    }
}

/// Test helpers.
#[cfg(any(test, feature = "test-helpers"))]
impl Commitment {
    /// Fresh salt plus the matching commitment for `amount`.
    pub fn sealed(amount: Amount, width: CommitmentWidth) -> (Salt, Self) {
        let salt = Salt::random();
        let commitment = Self::compute(&salt, amount, width);
        (salt, commitment)
    }
}
