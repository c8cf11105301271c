//! Error types for the Tranchelock ledger.
//!
//! All errors use the `TL_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Authorization errors
//! - 2xx: Lockup errors
//! - 3xx: Custody / audit errors
//! - 9xx: General / internal errors
//!
//! Every variant is a deterministic precondition failure: the operation that
//! produced it left no state behind.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::{AccountId, LockupIndex, TrancheKind};

/// Central error enum for all Tranchelock operations.
#[derive(Debug, Error)]
pub enum TranchelockError {
    // =================================================================
    // Authorization Errors (1xx)
    // =================================================================
    /// A registry write was attempted by someone other than the administrator.
    #[error("TL_ERR_100: Unauthorized: {caller} is not the administrator")]
    Unauthorized { caller: AccountId },

    /// The originating identity of a lockup creation is not the beneficiary.
    #[error("TL_ERR_101: Not user: origin {origin} cannot create lockups for {user}")]
    NotUser { origin: AccountId, user: AccountId },

    /// A claim was submitted by someone other than the lockup owner.
    #[error("TL_ERR_102: Not authorized: {caller} cannot claim for {user}")]
    NotAuthorized { caller: AccountId, user: AccountId },

    /// A state-mutating operation was entered while another one was running.
    #[error("TL_ERR_103: Re-entrant call rejected")]
    Reentrancy,

    // =================================================================
    // Lockup Errors (2xx)
    // =================================================================
    /// The lockup index is 0 or beyond the user's lockup count.
    #[error("TL_ERR_200: Invalid lockup index {index} for {user} (count {count})")]
    InvalidIndex {
        user: AccountId,
        index: LockupIndex,
        count: u64,
    },

    /// The tranche has already been claimed.
    #[error("TL_ERR_201: {tranche} tranche of {index} already claimed")]
    AlreadyClaimed {
        index: LockupIndex,
        tranche: TrancheKind,
    },

    /// The tranche has not matured yet.
    #[error("TL_ERR_202: {tranche} tranche too early: unlocks at {unlock_time}, now {now}")]
    TooEarly {
        tranche: TrancheKind,
        unlock_time: DateTime<Utc>,
        now: DateTime<Utc>,
    },

    /// A tranche amount was negative.
    #[error("TL_ERR_203: Invalid amount: {amount}")]
    InvalidAmount { amount: Decimal },

    // =================================================================
    // Custody / Audit Errors (3xx)
    // =================================================================
    /// The source account does not hold enough of the asset.
    #[error("TL_ERR_300: Insufficient balance: need {needed}, have {available}")]
    InsufficientBalance { needed: Decimal, available: Decimal },

    /// The spender has not been approved for enough of the owner's funds.
    #[error("TL_ERR_301: Insufficient allowance: need {needed}, approved {approved}")]
    InsufficientAllowance { needed: Decimal, approved: Decimal },

    /// Custody no longer matches the amounts the ledger has accounted for.
    #[error("TL_ERR_303: Custody invariant violation: {reason}")]
    CustodyInvariantViolation { reason: String },

    /// The audit log hash chain does not verify.
    #[error("TL_ERR_304: Audit chain broken at sequence {sequence}")]
    AuditChainBroken { sequence: u64 },

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Serialization / deserialization error.
    #[error("TL_ERR_901: Serialization error: {0}")]
    Serialization(String),

    /// Configuration error (invalid config document, conflicting fields, etc.).
    #[error("TL_ERR_902: Configuration error: {0}")]
    Configuration(String),

    /// An amount or timestamp computation left its representable range.
    #[error("TL_ERR_903: Arithmetic overflow: {0}")]
    ArithmeticOverflow(String),
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, TranchelockError>;

impl From<serde_json::Error> for TranchelockError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
