//! Configuration types for a Tranchelock deployment.

use std::time::Duration;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{AccountId, Result, TranchelockError, constants};

/// The four administrator-adjustable lockup parameters.
///
/// No invariant ties the two fractions together; keeping them meaningful is
/// the administrator's job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rates {
    /// Time from creation until the short tranche unlocks.
    pub short_duration: Duration,
    /// Time from creation until the long tranche unlocks.
    pub long_duration: Duration,
    /// Share of a reward meant for the short tranche.
    pub short_fraction: Decimal,
    /// Share of a reward meant for the long tranche.
    pub long_fraction: Decimal,
}

impl Default for Rates {
    fn default() -> Self {
        Self {
            short_duration: Duration::from_secs(constants::DEFAULT_SHORT_DURATION_SECS),
            long_duration: Duration::from_secs(constants::DEFAULT_LONG_DURATION_SECS),
            short_fraction: Decimal::new(constants::DEFAULT_SHORT_FRACTION_PCT, 2),
            long_fraction: Decimal::new(constants::DEFAULT_LONG_FRACTION_PCT, 2),
        }
    }
}

impl Rates {
    /// Split a total reward into `(short, long)` tranche amounts using the
    /// configured fractions.
    ///
    /// The ledger itself never calls this: tranche amounts arrive
    /// pre-computed. It exists for the upstream distributor.
    pub fn split(&self, total: Decimal) -> Result<(Decimal, Decimal)> {
        let short = total.checked_mul(self.short_fraction).ok_or_else(|| {
            TranchelockError::ArithmeticOverflow(format!(
                "{total} * short fraction {}",
                self.short_fraction
            ))
        })?;
        let long = total.checked_mul(self.long_fraction).ok_or_else(|| {
            TranchelockError::ArithmeticOverflow(format!(
                "{total} * long fraction {}",
                self.long_fraction
            ))
        })?;
        Ok((short, long))
    }
}

/// Deployment configuration for one ledger instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// The only identity allowed to change [`Rates`].
    pub admin: AccountId,
    /// The account that holds locked funds between creation and claim.
    pub custody: AccountId,
    /// Initial rate parameters.
    #[serde(default)]
    pub rates: Rates,
}

impl LedgerConfig {
    /// Create a config with default rates.
    #[must_use]
    pub fn new(admin: AccountId, custody: AccountId) -> Self {
        Self {
            admin,
            custody,
            rates: Rates::default(),
        }
    }

    /// Parse and validate a JSON config document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(json)
            .map_err(|e| TranchelockError::Configuration(format!("invalid config: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject configurations the ledger cannot operate with.
    pub fn validate(&self) -> Result<()> {
        if self.admin == self.custody {
            return Err(TranchelockError::Configuration(
                "admin and custody must be distinct accounts".into(),
            ));
        }
        if self.rates.short_fraction.is_sign_negative()
            || self.rates.long_fraction.is_sign_negative()
        {
            return Err(TranchelockError::Configuration(format!(
                "fractions must be non-negative (short {}, long {})",
                self.rates.short_fraction, self.rates.long_fraction
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rates_defaults() {
        let rates = Rates::default();
        assert_eq!(rates.short_duration.as_secs(), 30 * 86_400);
        assert_eq!(rates.long_duration.as_secs(), 180 * 86_400);
        assert_eq!(rates.short_fraction, Decimal::new(25, 2));
        assert_eq!(rates.long_fraction, Decimal::new(75, 2));
    }

    #[test]
    fn split_applies_fractions() {
        let rates = Rates::default();
        let (short, long) = rates.split(Decimal::new(1000, 0)).unwrap();
        assert_eq!(short, Decimal::new(250, 0));
        assert_eq!(long, Decimal::new(750, 0));
    }

    #[test]
    fn split_overflow_is_reported() {
        let rates = Rates {
            short_fraction: Decimal::new(2, 0),
            ..Rates::default()
        };
        let err = rates.split(Decimal::MAX).unwrap_err();
        assert!(matches!(err, TranchelockError::ArithmeticOverflow(_)));
    }

    #[test]
    fn config_json_roundtrip() {
        let cfg = LedgerConfig::new(AccountId::dummy(1), AccountId::dummy(2));
        let json = cfg.to_json().unwrap();
        let back = LedgerConfig::from_json_str(&json).unwrap();
        assert_eq!(cfg, back);
    }

    #[test]
    fn config_missing_rates_uses_defaults() {
        let json = format!(
            r#"{{"admin":"{}","custody":"{}"}}"#,
            AccountId::dummy(1),
            AccountId::dummy(2)
        );
        let cfg = LedgerConfig::from_json_str(&json).unwrap();
        assert_eq!(cfg.rates, Rates::default());
    }

    #[test]
    fn config_rejects_shared_admin_custody() {
        let cfg = LedgerConfig::new(AccountId::dummy(1), AccountId::dummy(1));
        let err = cfg.validate().unwrap_err();
        assert!(matches!(err, TranchelockError::Configuration(_)));
    }

    #[test]
    fn config_rejects_negative_fraction() {
        let mut cfg = LedgerConfig::new(AccountId::dummy(1), AccountId::dummy(2));
        cfg.rates.long_fraction = Decimal::NEGATIVE_ONE;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn config_rejects_garbage() {
        let err = LedgerConfig::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, TranchelockError::Configuration(_)));
    }
}
