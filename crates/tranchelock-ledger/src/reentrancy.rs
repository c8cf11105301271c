//! Non-reentrant guard for state-mutating ledger operations.
//!
//! The ledger calls out to an untrusted asset implementation while an
//! operation is in flight. If that implementation calls back into any
//! guarded operation on the same thread, the nested call is rejected with
//! [`TranchelockError::Reentrancy`] instead of running against a
//! half-finished operation.
//!
//! Calls from other threads are ordinary contention, not nesting: they block
//! until the running operation (external call included) has finished and
//! then take their turn. The slot mutex itself is only held while the owner
//! is read or written, never across the guarded section.
//!
//! The guard is released when the returned [`Entered`] token is dropped, on
//! both the success and the error path.

use std::{
    sync::{Condvar, Mutex, MutexGuard, PoisonError},
    thread::{self, ThreadId},
};

use tranchelock_types::{Result, TranchelockError};

/// One-operation-at-a-time gate around every state-mutating entry point.
#[derive(Debug, Default)]
pub struct ReentrancyGuard {
    /// Thread currently inside the guarded section.
    owner: Mutex<Option<ThreadId>>,
    released: Condvar,
}

impl ReentrancyGuard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // The slot is a single `Option` assignment, so a poisoned lock still
    // holds a meaningful value.
    fn slot(&self) -> MutexGuard<'_, Option<ThreadId>> {
        self.owner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Enter the guarded section, waiting for another thread's operation to
    /// finish if necessary.
    ///
    /// # Errors
    /// Returns [`TranchelockError::Reentrancy`] if the calling thread is
    /// already inside the section.
    pub fn enter(&self) -> Result<Entered<'_>> {
        let me = thread::current().id();
        let mut owner = self.slot();
        loop {
            match *owner {
                None => {
                    *owner = Some(me);
                    return Ok(Entered { guard: self });
                }
                Some(holder) if holder == me => return Err(TranchelockError::Reentrancy),
                Some(_) => {
                    owner = self
                        .released
                        .wait(owner)
                        .unwrap_or_else(PoisonError::into_inner);
                }
            }
        }
    }

    /// Whether a guarded operation is currently running on any thread.
    #[must_use]
    pub fn is_entered(&self) -> bool {
        self.slot().is_some()
    }
}

/// Proof of having entered a [`ReentrancyGuard`]. Releases it on drop.
#[derive(Debug)]
#[must_use = "the guard is released as soon as this token is dropped"]
pub struct Entered<'a> {
    guard: &'a ReentrancyGuard,
}

impl Drop for Entered<'_> {
    fn drop(&mut self) {
        *self.guard.slot() = None;
        self.guard.released.notify_one();
    }
}
