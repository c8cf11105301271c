//! # tranchelock-ledger
//!
//! The **Lockup Ledger**: time-locked two-tranche reward custody with
//! claim-once release.
//!
//! ## Architecture
//!
//! 1. **RateRegistry**: administrator-owned maturity durations and split fractions
//! 2. **LockupLedger**: per-user lockup records, creation, and claims
//! 3. **ReentrancyGuard**: rejects nested calls into state-mutating operations
//! 4. **AuditLog**: hash-chained record of every emitted event
//! 5. **Clock**: time source (system or manual)
//!
//! ## Lockup Flow
//!
//! ```text
//! distributor → create_lockup(user, short, long)
//!     → Lockup { short: unlock now + short_duration, long: unlock now + long_duration }
//!     → transfer_from(user → custody) ×2 → LockupCreated
//!
//! user → claim_short / claim_long(index)
//!     → checks (index, claimed, matured, caller) → zero tranche
//!     → transfer(custody → user) → ShortUnlocked / LongUnlocked
//! ```

pub mod audit;
pub mod clock;
pub mod ledger;
pub mod reentrancy;
pub mod registry;

pub use audit::{AuditLog, EventRecord};
pub use clock::{Clock, ManualClock, SystemClock};
pub use ledger::LockupLedger;
pub use reentrancy::ReentrancyGuard;
pub use registry::RateRegistry;
