//! Identifiers used throughout Tranchelock.
//!
//! Accounts (users, the administrator, the ledger's custody account) share a
//! single UUIDv7-backed identifier. Lockups are addressed per user by a
//! 1-based [`LockupIndex`].

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// AccountId
// ---------------------------------------------------------------------------

/// Identity of any party the ledger deals with. Compared by equality only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct AccountId(pub Uuid);

impl AccountId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Deterministic id for tests and fixtures.
    #[cfg(any(test, feature = "test-helpers"))]
    #[must_use]
    pub fn dummy(n: u128) -> Self {
        Self(Uuid::from_u128(n))
    }
}

impl Default for AccountId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// LockupIndex
// ---------------------------------------------------------------------------

/// Per-user lockup index.
///
/// Indices start at 1. Index 0 is reserved so that a lockup count of 0 means
/// "no lockups" without colliding with a real record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct LockupIndex(pub u64);

impl LockupIndex {
    /// The reserved sentinel. Never addresses a lockup.
    pub const RESERVED: Self = Self(0);

    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }

    #[must_use]
    pub fn is_reserved(self) -> bool {
        self == Self::RESERVED
    }
}

impl fmt::Display for LockupIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "lockup #{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// CallContext
// ---------------------------------------------------------------------------

/// Who is invoking an operation.
///
/// `caller` is the direct invoker (for example a rewards distributor relaying
/// a request). `origin` is the identity that started the call chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallContext {
    pub caller: AccountId,
    pub origin: AccountId,
}

impl CallContext {
    /// A call made directly by `account`, with no intermediary.
    #[must_use]
    pub fn direct(account: AccountId) -> Self {
        Self {
            caller: account,
            origin: account,
        }
    }

    /// A call started by `origin` and forwarded through `relay`.
    #[must_use]
    pub fn relayed(relay: AccountId, origin: AccountId) -> Self {
        Self {
            caller: relay,
            origin,
        }
    }

    #[must_use]
    pub fn is_relayed(&self) -> bool {
        self.caller != self.origin
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_id_uniqueness() {
        let a = AccountId::new();
        let b = AccountId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn dummy_ids_are_stable() {
        assert_eq!(AccountId::dummy(42), AccountId::dummy(42));
        assert_ne!(AccountId::dummy(1), AccountId::dummy(2));
    }

    #[test]
    fn lockup_index_reserved_and_next() {
        assert!(LockupIndex::RESERVED.is_reserved());
        assert_eq!(LockupIndex::RESERVED.next(), LockupIndex(1));
        assert!(!LockupIndex(1).is_reserved());
        assert_eq!(format!("{}", LockupIndex(3)), "lockup #3");
    }

    #[test]
    fn call_context_relay_detection() {
        let user = AccountId::dummy(1);
        let relay = AccountId::dummy(2);
        assert!(!CallContext::direct(user).is_relayed());
        let ctx = CallContext::relayed(relay, user);
        assert!(ctx.is_relayed());
        assert_eq!(ctx.caller, relay);
        assert_eq!(ctx.origin, user);
    }

    #[test]
    fn serde_roundtrips() {
        let id = AccountId::new();
        let json = serde_json::to_string(&id).unwrap();
        let back: AccountId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);

        let idx = LockupIndex(9);
        let json = serde_json::to_string(&idx).unwrap();
        assert_eq!(json, "9");
    }
}
