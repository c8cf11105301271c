//! Rate registry: the administrator-owned lockup parameters.
//!
//! Reads are open to anyone. Writes require the administrator identity and
//! overwrite unconditionally; each successful write yields the change event
//! for the caller to publish.

use std::time::Duration;

use rust_decimal::Decimal;
use tranchelock_types::{AccountId, LedgerEvent, Rates, Result, TranchelockError};

/// Holds the current [`Rates`] and the identity allowed to change them.
#[derive(Debug, Clone)]
pub struct RateRegistry {
    admin: AccountId,
    rates: Rates,
}

impl RateRegistry {
    #[must_use]
    pub fn new(admin: AccountId, rates: Rates) -> Self {
        Self { admin, rates }
    }

    #[must_use]
    pub fn admin(&self) -> AccountId {
        self.admin
    }

    /// Snapshot of all four parameters.
    #[must_use]
    pub fn rates(&self) -> Rates {
        self.rates
    }

    #[must_use]
    pub fn short_duration(&self) -> Duration {
        self.rates.short_duration
    }

    #[must_use]
    pub fn long_duration(&self) -> Duration {
        self.rates.long_duration
    }

    #[must_use]
    pub fn short_fraction(&self) -> Decimal {
        self.rates.short_fraction
    }

    #[must_use]
    pub fn long_fraction(&self) -> Decimal {
        self.rates.long_fraction
    }

    pub fn set_short_duration(
        &mut self,
        caller: AccountId,
        value: Duration,
    ) -> Result<LedgerEvent> {
        self.ensure_admin(caller)?;
        self.rates.short_duration = value;
        Ok(LedgerEvent::ShortDurationChanged { value })
    }

    pub fn set_long_duration(
        &mut self,
        caller: AccountId,
        value: Duration,
    ) -> Result<LedgerEvent> {
        self.ensure_admin(caller)?;
        self.rates.long_duration = value;
        Ok(LedgerEvent::LongDurationChanged { value })
    }

    pub fn set_short_fraction(
        &mut self,
        caller: AccountId,
        value: Decimal,
    ) -> Result<LedgerEvent> {
        self.ensure_admin(caller)?;
        self.rates.short_fraction = value;
        Ok(LedgerEvent::ShortFractionChanged { value })
    }

    pub fn set_long_fraction(
        &mut self,
        caller: AccountId,
        value: Decimal,
    ) -> Result<LedgerEvent> {
        self.ensure_admin(caller)?;
        self.rates.long_fraction = value;
        Ok(LedgerEvent::LongFractionChanged { value })
    }

    fn ensure_admin(&self, caller: AccountId) -> Result<()> {
        if caller != self.admin {
            tracing::warn!(%caller, "Rate change rejected: caller is not the administrator");
            return Err(TranchelockError::Unauthorized { caller });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> (RateRegistry, AccountId) {
        let admin = AccountId::dummy(100);
        (RateRegistry::new(admin, Rates::default()), admin)
    }

    #[test]
    fn reads_reflect_initial_rates() {
        let (reg, admin) = registry();
        assert_eq!(reg.admin(), admin);
        assert_eq!(reg.rates(), Rates::default());
        assert_eq!(reg.short_duration(), Rates::default().short_duration);
        assert_eq!(reg.long_fraction(), Rates::default().long_fraction);
    }

    #[test]
    fn admin_writes_overwrite_and_emit() {
        let (mut reg, admin) = registry();

        let ev = reg.set_short_duration(admin, Duration::from_secs(10)).unwrap();
        assert_eq!(ev, LedgerEvent::ShortDurationChanged { value: Duration::from_secs(10) });
        assert_eq!(reg.short_duration(), Duration::from_secs(10));

        let ev = reg.set_long_duration(admin, Duration::from_secs(20)).unwrap();
        assert!(matches!(ev, LedgerEvent::LongDurationChanged { .. }));
        assert_eq!(reg.long_duration(), Duration::from_secs(20));

        reg.set_short_fraction(admin, Decimal::new(4, 1)).unwrap();
        reg.set_long_fraction(admin, Decimal::new(9, 1)).unwrap();
        // No sum invariant: 0.4 + 0.9 is accepted.
        assert_eq!(reg.short_fraction(), Decimal::new(4, 1));
        assert_eq!(reg.long_fraction(), Decimal::new(9, 1));
    }

    #[test]
    fn latest_write_wins() {
        let (mut reg, admin) = registry();
        reg.set_long_duration(admin, Duration::from_secs(1)).unwrap();
        reg.set_long_duration(admin, Duration::from_secs(2)).unwrap();
        assert_eq!(reg.long_duration(), Duration::from_secs(2));
    }

    #[test]
    fn non_admin_writes_rejected() {
        let (mut reg, _) = registry();
        let intruder = AccountId::dummy(1);
        let before = reg.rates();

        let errs = [
            reg.set_short_duration(intruder, Duration::ZERO).unwrap_err(),
            reg.set_long_duration(intruder, Duration::ZERO).unwrap_err(),
            reg.set_short_fraction(intruder, Decimal::ZERO).unwrap_err(),
            reg.set_long_fraction(intruder, Decimal::ZERO).unwrap_err(),
        ];
        for err in errs {
            assert!(
                matches!(err, TranchelockError::Unauthorized { caller } if caller == intruder),
                "Expected Unauthorized, got: {err:?}"
            );
        }
        assert_eq!(reg.rates(), before);
    }
}
