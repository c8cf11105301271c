//! Custody conservation invariant checker.
//!
//! Invariant enforced after every ledger operation:
//! ```text
//! custody balance == Σ(pulled) - Σ(released) == Σ(total_locked over users)
//! ```
//!
//! If this ever breaks, funds left custody without being accounted for (or
//! were accounted for without arriving).

use rust_decimal::Decimal;
use tranchelock_types::{Result, TranchelockError};

/// Running totals of funds pulled into and released from custody.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustodyConservation {
    pulled: Decimal,
    released: Decimal,
}

impl CustodyConservation {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check that `amount` can be recorded as pulled without overflowing.
    ///
    /// The ledger runs this before moving any funds so that the later
    /// [`Self::record_pull`] cannot fail.
    pub fn check_pull(&self, amount: Decimal) -> Result<()> {
        checked_total("pulled", self.pulled, amount).map(drop)
    }

    /// Record funds pulled into custody at lockup creation.
    ///
    /// # Errors
    /// Returns [`TranchelockError::ArithmeticOverflow`] and records nothing
    /// if the running total would overflow.
    pub fn record_pull(&mut self, amount: Decimal) -> Result<()> {
        self.pulled = checked_total("pulled", self.pulled, amount)?;
        Ok(())
    }

    /// Record funds released from custody at claim.
    ///
    /// # Errors
    /// Returns [`TranchelockError::ArithmeticOverflow`] and records nothing
    /// if the running total would overflow.
    pub fn record_release(&mut self, amount: Decimal) -> Result<()> {
        self.released = checked_total("released", self.released, amount)?;
        Ok(())
    }

    /// Amount custody should currently hold.
    #[must_use]
    pub fn expected(&self) -> Decimal {
        self.pulled - self.released
    }

    #[must_use]
    pub fn total_pulled(&self) -> Decimal {
        self.pulled
    }

    #[must_use]
    pub fn total_released(&self) -> Decimal {
        self.released
    }

    /// Verify an observed custody amount against the running totals.
    ///
    /// # Errors
    /// Returns [`TranchelockError::CustodyInvariantViolation`] if actual ≠ expected.
    pub fn verify(&self, what: &str, actual: Decimal) -> Result<()> {
        let expected = self.expected();
        if actual != expected {
            return Err(TranchelockError::CustodyInvariantViolation {
                reason: format!(
                    "{what} {actual} != expected {expected} \
                     (pulled={}, released={})",
                    self.pulled, self.released
                ),
            });
        }
        Ok(())
    }
}

fn checked_total(what: &str, total: Decimal, amount: Decimal) -> Result<Decimal> {
    total.checked_add(amount).ok_or_else(|| {
        TranchelockError::ArithmeticOverflow(format!("{what} total {total} + {amount}"))
    })
}
