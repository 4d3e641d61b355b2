//! System-wide constants for the sealbid auction engine.

/// Domain separator mixed into every bid commitment.
pub const COMMITMENT_DOMAIN: &[u8] = b"sealbid:commitment:v1:";

/// Length of a bid salt in bytes.
pub const SALT_LEN: usize = 32;

/// Full SHA-256 digest length in bytes.
pub const FULL_COMMITMENT_LEN: usize = 32;

/// Retained prefix of the digest under the truncated (160-bit) width.
pub const TRUNCATED_COMMITMENT_LEN: usize = 20;

/// Default commit window in seconds (one day).
pub const DEFAULT_COMMIT_WINDOW_SECS: i64 = 86_400;

/// Default reveal window in seconds (one day).
pub const DEFAULT_REVEAL_WINDOW_SECS: i64 = 86_400;

/// Basis-point denominator for withdrawal penalties.
pub const BPS_DENOMINATOR: u128 = 10_000;

/// Upper bound for a configured withdrawal penalty (100%).
pub const MAX_PENALTY_BPS: u16 = 10_000;

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "sealbid";
