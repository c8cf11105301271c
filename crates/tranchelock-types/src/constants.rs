//! System-wide constants for the Tranchelock ledger.

/// Seconds in one day.
pub const SECS_PER_DAY: u64 = 86_400;

/// Default maturity of the short tranche (30 days).
pub const DEFAULT_SHORT_DURATION_SECS: u64 = 30 * SECS_PER_DAY;

/// Default maturity of the long tranche (180 days).
pub const DEFAULT_LONG_DURATION_SECS: u64 = 180 * SECS_PER_DAY;

/// Default share of a reward routed to the short tranche, in percent.
pub const DEFAULT_SHORT_FRACTION_PCT: i64 = 25;

/// Default share of a reward routed to the long tranche, in percent.
pub const DEFAULT_LONG_FRACTION_PCT: i64 = 75;

/// Domain separator for audit log record hashes.
pub const AUDIT_HASH_DOMAIN: &[u8] = b"tranchelock:audit:v1:";

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Ledger name.
pub const LEDGER_NAME: &str = "Tranchelock";
