//! The asset-transfer capability consumed by the ledger.

use std::sync::Arc;

use rust_decimal::Decimal;
use tranchelock_types::{AccountId, Result};

/// A generic fungible-asset move interface.
///
/// Every call is synchronous and all-or-nothing: on `Err` no balance has
/// changed. Implementations may be untrusted and may call back into the
/// ledger from inside a transfer; the ledger guards against that, not the
/// implementation.
pub trait AssetTransfer: Send + Sync {
    /// Pull `amount` from `owner` into `destination`.
    ///
    /// `destination` acts as the spender and must hold an allowance from
    /// `owner` covering `amount`.
    ///
    /// # Errors
    /// `InsufficientBalance` or `InsufficientAllowance`.
    fn transfer_from(
        &self,
        owner: AccountId,
        destination: AccountId,
        amount: Decimal,
    ) -> Result<()>;

    /// Push `amount` held by `holder` (the ledger's custody account) to
    /// `destination`.
    ///
    /// # Errors
    /// `InsufficientBalance` if `holder` does not hold `amount`.
    fn transfer(&self, holder: AccountId, destination: AccountId, amount: Decimal) -> Result<()>;

    /// Current balance of `account`.
    fn balance_of(&self, account: AccountId) -> Decimal;
}

impl<T: AssetTransfer + ?Sized> AssetTransfer for Arc<T> {
    fn transfer_from(
        &self,
        owner: AccountId,
        destination: AccountId,
        amount: Decimal,
    ) -> Result<()> {
        (**self).transfer_from(owner, destination, amount)
    }

    fn transfer(&self, holder: AccountId, destination: AccountId, amount: Decimal) -> Result<()> {
        (**self).transfer(holder, destination, amount)
    }

    fn balance_of(&self, account: AccountId) -> Decimal {
        (**self).balance_of(account)
    }
}
