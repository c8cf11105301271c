//! Notifications emitted by the ledger.
//!
//! Events are observable output only; nothing inside the ledger consumes
//! them. The ledger appends each one to its audit log.

use std::time::Duration;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{AccountId, LockupIndex, TrancheKind};

/// Everything the ledger reports to the outside world.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LedgerEvent {
    /// A new lockup was recorded and funded.
    LockupCreated {
        user: AccountId,
        index: LockupIndex,
        short_amount: Decimal,
        long_amount: Decimal,
    },
    /// The short tranche of a lockup was paid out.
    ShortUnlocked {
        user: AccountId,
        index: LockupIndex,
        amount: Decimal,
    },
    /// The long tranche of a lockup was paid out.
    LongUnlocked {
        user: AccountId,
        index: LockupIndex,
        amount: Decimal,
    },
    ShortDurationChanged { value: Duration },
    LongDurationChanged { value: Duration },
    ShortFractionChanged { value: Decimal },
    LongFractionChanged { value: Decimal },
}

impl LedgerEvent {
    /// The unlock event for a tranche kind.
    #[must_use]
    pub fn unlocked(
        kind: TrancheKind,
        user: AccountId,
        index: LockupIndex,
        amount: Decimal,
    ) -> Self {
        match kind {
            TrancheKind::Short => Self::ShortUnlocked {
                user,
                index,
                amount,
            },
            TrancheKind::Long => Self::LongUnlocked {
                user,
                index,
                amount,
            },
        }
    }

    /// Stable name used in logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::LockupCreated { .. } => "LOCKUP_CREATED",
            Self::ShortUnlocked { .. } => "SHORT_UNLOCKED",
            Self::LongUnlocked { .. } => "LONG_UNLOCKED",
            Self::ShortDurationChanged { .. } => "SHORT_DURATION_CHANGED",
            Self::LongDurationChanged { .. } => "LONG_DURATION_CHANGED",
            Self::ShortFractionChanged { .. } => "SHORT_FRACTION_CHANGED",
            Self::LongFractionChanged { .. } => "LONG_FRACTION_CHANGED",
        }
    }

    /// The user this event concerns, if any.
    #[must_use]
    pub fn user(&self) -> Option<AccountId> {
        match self {
            Self::LockupCreated { user, .. }
            | Self::ShortUnlocked { user, .. }
            | Self::LongUnlocked { user, .. } => Some(*user),
            _ => None,
        }
    }
}

impl std::fmt::Display for LedgerEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
