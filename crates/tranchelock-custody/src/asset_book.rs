//! In-memory fungible asset.
//!
//! Tracks per-account balances and per-(owner, spender) allowances. All
//! mutations are atomic: either the full operation succeeds or nothing
//! changes. State sits behind a mutex so one book can be shared between the
//! ledger and whoever funds users.

use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard, PoisonError},
};

use rust_decimal::Decimal;
use tranchelock_types::{AccountId, Result, TranchelockError};

use crate::transfer::AssetTransfer;

#[derive(Debug, Default)]
struct BookState {
    balances: HashMap<AccountId, Decimal>,
    /// Keyed by (owner, spender).
    allowances: HashMap<(AccountId, AccountId), Decimal>,
    minted: Decimal,
}

/// An in-memory asset implementing [`AssetTransfer`].
#[derive(Debug)]
pub struct AssetBook {
    symbol: String,
    state: Mutex<BookState>,
}

impl AssetBook {
    /// Create an empty book for the given asset symbol.
    #[must_use]
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            state: Mutex::new(BookState::default()),
        }
    }

    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    // Every mutation below either completes or returns before writing, so a
    // poisoned lock still guards consistent data.
    fn state(&self) -> MutexGuard<'_, BookState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Create new units in `account`.
    pub fn mint(&self, account: AccountId, amount: Decimal) -> Result<()> {
        ensure_non_negative(amount)?;
        let mut state = self.state();
        let balance = state.balances.get(&account).copied().unwrap_or_default();
        let new_balance = checked_add(balance, amount)?;
        let minted = checked_add(state.minted, amount)?;
        state.balances.insert(account, new_balance);
        state.minted = minted;
        tracing::debug!(asset = %self.symbol, %account, %amount, "Minted");
        Ok(())
    }

    /// Let `spender` pull up to `amount` from `owner`. Overwrites any
    /// previous allowance.
    pub fn approve(&self, owner: AccountId, spender: AccountId, amount: Decimal) -> Result<()> {
        ensure_non_negative(amount)?;
        self.state().allowances.insert((owner, spender), amount);
        Ok(())
    }

    #[must_use]
    pub fn allowance(&self, owner: AccountId, spender: AccountId) -> Decimal {
        self.state()
            .allowances
            .get(&(owner, spender))
            .copied()
            .unwrap_or_default()
    }

    /// Total units ever minted. Transfers never change it.
    #[must_use]
    pub fn total_supply(&self) -> Decimal {
        self.state().minted
    }

    /// Sum of all balances. Equals [`Self::total_supply`] at all times.
    #[must_use]
    pub fn circulating(&self) -> Decimal {
        self.state().balances.values().copied().sum()
    }
}

impl BookState {
    fn balance(&self, account: AccountId) -> Decimal {
        self.balances.get(&account).copied().unwrap_or_default()
    }

    fn move_funds(&mut self, from: AccountId, to: AccountId, amount: Decimal) -> Result<()> {
        let available = self.balance(from);
        if available < amount {
            return Err(TranchelockError::InsufficientBalance {
                needed: amount,
                available,
            });
        }
        if from == to {
            return Ok(());
        }
        let credited = checked_add(self.balance(to), amount)?;
        self.balances.insert(from, available - amount);
        self.balances.insert(to, credited);
        Ok(())
    }
}

impl AssetTransfer for AssetBook {
    fn transfer_from(
        &self,
        owner: AccountId,
        destination: AccountId,
        amount: Decimal,
    ) -> Result<()> {
        ensure_non_negative(amount)?;
        let mut state = self.state();
        let approved = state
            .allowances
            .get(&(owner, destination))
            .copied()
            .unwrap_or_default();
        if approved < amount {
            return Err(TranchelockError::InsufficientAllowance {
                needed: amount,
                approved,
            });
        }
        state.move_funds(owner, destination, amount)?;
        state
            .allowances
            .insert((owner, destination), approved - amount);
        tracing::debug!(asset = %self.symbol, %owner, %destination, %amount, "transfer_from");
        Ok(())
    }

    fn transfer(&self, holder: AccountId, destination: AccountId, amount: Decimal) -> Result<()> {
        ensure_non_negative(amount)?;
        self.state().move_funds(holder, destination, amount)?;
        tracing::debug!(asset = %self.symbol, %holder, %destination, %amount, "transfer");
        Ok(())
    }

    fn balance_of(&self, account: AccountId) -> Decimal {
        self.state().balance(account)
    }
}

fn ensure_non_negative(amount: Decimal) -> Result<()> {
    if amount < Decimal::ZERO {
        return Err(TranchelockError::InvalidAmount { amount });
    }
    Ok(())
}

fn checked_add(a: Decimal, b: Decimal) -> Result<Decimal> {
    a.checked_add(b)
        .ok_or_else(|| TranchelockError::ArithmeticOverflow(format!("{a} + {b}")))
}
