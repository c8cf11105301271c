//! # Lockups and tranches
//!
//! A [`Lockup`] holds two independent [`Tranche`]s, short and long. Each
//! tranche has its own maturity and its own one-way claim flag:
//!
//! ```text
//!   ┌───────────┐  now > unlock_time + claim   ┌─────────┐
//!   │ UNCLAIMED ├─────────────────────────────▶│ CLAIMED │
//!   └───────────┘                              └─────────┘
//! ```
//!
//! `CLAIMED` is terminal: the flag never reverts and the amount stays zero.
//! Unlock times are fixed at creation.
//!
//! A [`UserAccount`] is the append-only list of one user's lockups plus the
//! running `total_locked` aggregate.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{AccountId, LockupIndex, Rates, Result, TranchelockError};

/// Which of the two tranches of a lockup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrancheKind {
    Short,
    Long,
}

impl fmt::Display for TrancheKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Short => write!(f, "SHORT"),
            Self::Long => write!(f, "LONG"),
        }
    }
}

// ---------------------------------------------------------------------------
// Tranche
// ---------------------------------------------------------------------------

/// One portion of a reward with its own maturity and claim state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tranche {
    amount: Decimal,
    unlock_time: DateTime<Utc>,
    claimed: bool,
}

impl Tranche {
    #[must_use]
    pub fn new(amount: Decimal, unlock_time: DateTime<Utc>) -> Self {
        Self {
            amount,
            unlock_time,
            claimed: false,
        }
    }

    /// Amount still held for this tranche. Zero once claimed.
    #[must_use]
    pub fn amount(&self) -> Decimal {
        self.amount
    }

    #[must_use]
    pub fn unlock_time(&self) -> DateTime<Utc> {
        self.unlock_time
    }

    #[must_use]
    pub fn is_claimed(&self) -> bool {
        self.claimed
    }

    /// Maturity is strict: the unlock instant itself is still too early.
    #[must_use]
    pub fn is_mature_at(&self, now: DateTime<Utc>) -> bool {
        now > self.unlock_time
    }

    /// Check the tranche-local claim preconditions (claim state, then maturity).
    pub fn check_claimable(
        &self,
        index: LockupIndex,
        kind: TrancheKind,
        now: DateTime<Utc>,
    ) -> Result<()> {
        if self.claimed {
            return Err(TranchelockError::AlreadyClaimed {
                index,
                tranche: kind,
            });
        }
        if !self.is_mature_at(now) {
            return Err(TranchelockError::TooEarly {
                tranche: kind,
                unlock_time: self.unlock_time,
                now,
            });
        }
        Ok(())
    }

    /// Mark claimed and zero the amount, returning what was held.
    ///
    /// # Errors
    /// Returns `AlreadyClaimed` if the tranche was claimed before.
    pub fn release(&mut self, index: LockupIndex, kind: TrancheKind) -> Result<Decimal> {
        if self.claimed {
            return Err(TranchelockError::AlreadyClaimed {
                index,
                tranche: kind,
            });
        }
        let amount = self.amount;
        self.claimed = true;
        self.amount = Decimal::ZERO;
        Ok(amount)
    }
}

// ---------------------------------------------------------------------------
// Lockup
// ---------------------------------------------------------------------------

/// A two-tranche lockup record. Created once, never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lockup {
    short: Tranche,
    long: Tranche,
    created_at: DateTime<Utc>,
}

impl Lockup {
    /// Build a lockup created at `now`, with unlock times taken from the
    /// rates in effect right now.
    pub fn new(
        short_amount: Decimal,
        long_amount: Decimal,
        now: DateTime<Utc>,
        rates: &Rates,
    ) -> Result<Self> {
        Ok(Self {
            short: Tranche::new(short_amount, unlock_at(now, rates.short_duration)?),
            long: Tranche::new(long_amount, unlock_at(now, rates.long_duration)?),
            created_at: now,
        })
    }

    #[must_use]
    pub fn short(&self) -> &Tranche {
        &self.short
    }

    #[must_use]
    pub fn long(&self) -> &Tranche {
        &self.long
    }

    #[must_use]
    pub fn tranche(&self, kind: TrancheKind) -> &Tranche {
        match kind {
            TrancheKind::Short => &self.short,
            TrancheKind::Long => &self.long,
        }
    }

    fn tranche_mut(&mut self, kind: TrancheKind) -> &mut Tranche {
        match kind {
            TrancheKind::Short => &mut self.short,
            TrancheKind::Long => &mut self.long,
        }
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Sum of both tranches' remaining amounts.
    #[must_use]
    pub fn unclaimed_total(&self) -> Decimal {
        self.short.amount + self.long.amount
    }
}

fn unlock_at(now: DateTime<Utc>, after: std::time::Duration) -> Result<DateTime<Utc>> {
    let delta = chrono::Duration::from_std(after).map_err(|_| {
        TranchelockError::ArithmeticOverflow(format!("duration {after:?} out of range"))
    })?;
    now.checked_add_signed(delta).ok_or_else(|| {
        TranchelockError::ArithmeticOverflow(format!("{now} + {after:?} out of range"))
    })
}

// ---------------------------------------------------------------------------
// UserAccount
// ---------------------------------------------------------------------------

/// All lockups of one user, addressed by 1-based [`LockupIndex`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    /// Lockup `i` lives at position `i - 1`.
    lockups: Vec<Lockup>,
    /// Sum of all unclaimed tranche amounts.
    total_locked: Decimal,
}

impl UserAccount {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of lockups ever created; also the highest valid index.
    #[must_use]
    pub fn lockup_count(&self) -> u64 {
        self.lockups.len() as u64
    }

    #[must_use]
    pub fn total_locked(&self) -> Decimal {
        self.total_locked
    }

    /// Look up a lockup. The reserved index 0 never resolves.
    #[must_use]
    pub fn lockup(&self, index: LockupIndex) -> Option<&Lockup> {
        if index.is_reserved() {
            return None;
        }
        let pos = usize::try_from(index.0 - 1).ok()?;
        self.lockups.get(pos)
    }

    /// Iterate `(index, lockup)` pairs in creation order.
    pub fn iter(&self) -> impl Iterator<Item = (LockupIndex, &Lockup)> {
        self.lockups
            .iter()
            .enumerate()
            .map(|(pos, lockup)| (LockupIndex(pos as u64).next(), lockup))
    }

    /// Recompute the unclaimed sum from the records themselves.
    #[must_use]
    pub fn unclaimed_sum(&self) -> Decimal {
        self.lockups.iter().map(Lockup::unclaimed_total).sum()
    }

    /// Append a lockup and return its index.
    pub fn append(&mut self, lockup: Lockup) -> Result<LockupIndex> {
        let total_locked = self
            .total_locked
            .checked_add(lockup.unclaimed_total())
            .ok_or_else(|| {
                TranchelockError::ArithmeticOverflow(format!(
                    "total locked {} + {}",
                    self.total_locked,
                    lockup.unclaimed_total()
                ))
            })?;
        let index = LockupIndex(self.lockup_count()).next();
        self.total_locked = total_locked;
        self.lockups.push(lockup);
        Ok(index)
    }

    /// Validate a claim without touching state and return the claimable amount.
    ///
    /// Checks, in order: index in range, tranche unclaimed, tranche mature.
    pub fn check_claim(
        &self,
        user: AccountId,
        index: LockupIndex,
        kind: TrancheKind,
        now: DateTime<Utc>,
    ) -> Result<Decimal> {
        let lockup = self
            .lockup(index)
            .ok_or(TranchelockError::InvalidIndex {
                user,
                index,
                count: self.lockup_count(),
            })?;
        let tranche = lockup.tranche(kind);
        tranche.check_claimable(index, kind, now)?;
        Ok(tranche.amount())
    }

    /// Release a tranche: flag it claimed, zero it, and deduct it from
    /// `total_locked`. Maturity is the caller's concern (see [`Self::check_claim`]).
    pub fn release(
        &mut self,
        user: AccountId,
        index: LockupIndex,
        kind: TrancheKind,
    ) -> Result<Decimal> {
        let count = self.lockup_count();
        let pos = (!index.is_reserved())
            .then(|| usize::try_from(index.0 - 1).ok())
            .flatten()
            .filter(|p| *p < self.lockups.len())
            .ok_or(TranchelockError::InvalidIndex { user, index, count })?;
        let amount = self.lockups[pos].tranche_mut(kind).release(index, kind)?;
        self.total_locked -= amount;
        Ok(amount)
    }
}
