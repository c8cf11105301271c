//! # tranchelock-types
//!
//! Shared types, errors, and configuration for the **Tranchelock** rewards
//! ledger.
//!
//! This crate is the leaf dependency of the workspace. Every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`AccountId`], [`LockupIndex`], [`CallContext`]
//! - **Lockup model**: [`Lockup`], [`Tranche`], [`TrancheKind`], [`UserAccount`]
//! - **Configuration**: [`Rates`], [`LedgerConfig`]
//! - **Events**: [`LedgerEvent`]
//! - **Errors**: [`TranchelockError`] with `TL_ERR_` prefix codes
//! - **Constants**: defaults and domain separators

pub mod config;
pub mod constants;
pub mod error;
pub mod event;
pub mod ids;
pub mod lockup;

// Re-export all primary types at crate root for ergonomic imports:
//   use tranchelock_types::{AccountId, Lockup, TrancheKind, ...};

pub use config::*;
pub use error::*;
pub use event::*;
pub use ids::*;
pub use lockup::*;

// Constants are accessed via `tranchelock_types::constants::FOO`.
