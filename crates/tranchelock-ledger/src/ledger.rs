//! The lockup ledger.
//!
//! Owns every user's lockups, the rate registry, the custody bookkeeping and
//! the audit log. Each state-mutating entry point runs the same sequence:
//!
//! 1. Enter the [`ReentrancyGuard`] (nested calls fail with `Reentrancy`,
//!    calls from other threads wait their turn)
//! 2. Check every precondition (no state touched on failure)
//! 3. Mutate internal state and release the state lock
//! 4. Call the external [`AssetTransfer`]
//! 5. Record custody movement and append the event to the audit log
//!
//! A failure in step 4 restores the account snapshot taken in step 3 and,
//! for lockup creation, returns any tranche already pulled. Operations are
//! therefore all-or-nothing as seen from outside.
//!
//! The state lock is never held across step 4, so an asset implementation
//! that reads the ledger mid-transfer sees fully updated state.

use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tranchelock_custody::{AssetTransfer, CustodyConservation};
use tranchelock_types::{
    AccountId, CallContext, LedgerConfig, LedgerEvent, Lockup, LockupIndex, Rates, Result,
    TrancheKind, TranchelockError, UserAccount, constants,
};

use crate::{
    audit::{AuditLog, EventRecord},
    clock::{Clock, SystemClock},
    reentrancy::ReentrancyGuard,
    registry::RateRegistry,
};

/// Everything guarded by the state lock.
#[derive(Debug)]
struct LedgerState {
    registry: RateRegistry,
    accounts: HashMap<AccountId, UserAccount>,
    conservation: CustodyConservation,
    audit: AuditLog,
}

/// Time-locked two-tranche rewards ledger.
///
/// `A` moves the underlying asset; `C` supplies the current time.
#[derive(Debug)]
pub struct LockupLedger<A, C = SystemClock> {
    custody: AccountId,
    state: Mutex<LedgerState>,
    guard: ReentrancyGuard,
    asset: A,
    clock: C,
}

impl<A: AssetTransfer> LockupLedger<A, SystemClock> {
    /// Create a ledger that reads the system wall clock.
    pub fn with_system_clock(config: LedgerConfig, asset: A) -> Result<Self> {
        Self::new(config, asset, SystemClock)
    }
}

impl<A: AssetTransfer, C: Clock> LockupLedger<A, C> {
    /// Create a ledger from a validated config.
    pub fn new(config: LedgerConfig, asset: A, clock: C) -> Result<Self> {
        config.validate()?;
        tracing::info!(
            ledger = constants::LEDGER_NAME,
            version = constants::VERSION,
            admin = %config.admin,
            custody = %config.custody,
            short_duration = ?config.rates.short_duration,
            long_duration = ?config.rates.long_duration,
            "Lockup ledger initialized"
        );
        Ok(Self {
            custody: config.custody,
            state: Mutex::new(LedgerState {
                registry: RateRegistry::new(config.admin, config.rates),
                accounts: HashMap::new(),
                conservation: CustodyConservation::new(),
                audit: AuditLog::new(),
            }),
            guard: ReentrancyGuard::new(),
            asset,
            clock,
        })
    }

    // Mutations under this lock never panic midway and failed operations
    // restore their snapshot, so a poisoned lock still holds consistent state.
    fn state(&self) -> MutexGuard<'_, LedgerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // =================================================================
    // Lockup creation
    // =================================================================

    /// Lock `short_amount + long_amount` for `user`, pulling the funds from
    /// the user's balance into custody.
    ///
    /// The originating identity must be `user` itself; a relay cannot make
    /// itself (or anyone else) the beneficiary.
    ///
    /// # Errors
    /// - `Reentrancy` if called from inside another ledger operation
    /// - `NotUser` if `ctx.origin != user`
    /// - `InvalidAmount` for a negative amount
    /// - `ArithmeticOverflow` if amounts or unlock times overflow
    /// - any error from the asset transfer (state is rolled back)
    pub fn create_lockup(
        &self,
        ctx: CallContext,
        user: AccountId,
        short_amount: Decimal,
        long_amount: Decimal,
    ) -> Result<LockupIndex> {
        let _entered = self.enter()?;

        if ctx.origin != user {
            tracing::warn!(
                origin = %ctx.origin,
                caller = %ctx.caller,
                %user,
                "Lockup creation rejected: origin is not the beneficiary"
            );
            return Err(TranchelockError::NotUser {
                origin: ctx.origin,
                user,
            });
        }
        ensure_non_negative(short_amount)?;
        ensure_non_negative(long_amount)?;
        let total = short_amount.checked_add(long_amount).ok_or_else(|| {
            TranchelockError::ArithmeticOverflow(format!("{short_amount} + {long_amount}"))
        })?;

        let now = self.clock.now();
        let (index, snapshot) = {
            let mut state = self.state();
            let lockup = Lockup::new(short_amount, long_amount, now, &state.registry.rates())?;
            state.conservation.check_pull(total)?;
            let snapshot = state.accounts.get(&user).cloned();
            let index = state.accounts.entry(user).or_default().append(lockup)?;
            (index, snapshot)
        };

        if let Err(err) = self.asset.transfer_from(user, self.custody, short_amount) {
            tracing::debug!(%user, %index, error = %err, "Short pull failed, rolling back");
            self.restore(user, snapshot);
            return Err(err);
        }
        if let Err(err) = self.asset.transfer_from(user, self.custody, long_amount) {
            tracing::debug!(%user, %index, error = %err, "Long pull failed, rolling back");
            if let Err(refund_err) = self.asset.transfer(self.custody, user, short_amount) {
                tracing::error!(
                    %user,
                    %index,
                    amount = %short_amount,
                    error = %refund_err,
                    "Refund of short tranche failed during rollback"
                );
            }
            self.restore(user, snapshot);
            return Err(err);
        }

        self.commit(
            LedgerEvent::LockupCreated {
                user,
                index,
                short_amount,
                long_amount,
            },
            now,
            |c| c.record_pull(total),
        )?;
        tracing::info!(
            %user,
            %index,
            short = %short_amount,
            long = %long_amount,
            relayed = ctx.is_relayed(),
            "Lockup created"
        );
        Ok(index)
    }

    // =================================================================
    // Claims
    // =================================================================

    /// Claim the short tranche of lockup `index`. Returns the amount paid.
    pub fn claim_short(
        &self,
        ctx: CallContext,
        user: AccountId,
        index: LockupIndex,
    ) -> Result<Decimal> {
        self.claim(ctx, user, index, TrancheKind::Short)
    }

    /// Claim the long tranche of lockup `index`. Returns the amount paid.
    pub fn claim_long(
        &self,
        ctx: CallContext,
        user: AccountId,
        index: LockupIndex,
    ) -> Result<Decimal> {
        self.claim(ctx, user, index, TrancheKind::Long)
    }

    /// Claim one tranche of lockup `index` for `user`.
    ///
    /// Preconditions, checked in this order:
    /// 1. `index` names an existing lockup (`InvalidIndex`; 0 never does)
    /// 2. the tranche is unclaimed (`AlreadyClaimed`)
    /// 3. now is strictly after the unlock time (`TooEarly`)
    /// 4. the direct caller is `user` (`NotAuthorized`)
    pub fn claim(
        &self,
        ctx: CallContext,
        user: AccountId,
        index: LockupIndex,
        kind: TrancheKind,
    ) -> Result<Decimal> {
        let _entered = self.enter()?;
        let now = self.clock.now();

        let (amount, snapshot) = {
            let mut state = self.state();
            let account = state
                .accounts
                .get_mut(&user)
                .ok_or(TranchelockError::InvalidIndex {
                    user,
                    index,
                    count: 0,
                })
                .inspect_err(|err| tracing::debug!(%user, %index, error = %err, "Claim rejected"))?;
            account
                .check_claim(user, index, kind, now)
                .inspect_err(|err| match err {
                    TranchelockError::AlreadyClaimed { .. } => {
                        tracing::warn!(%user, %index, tranche = %kind, "Repeat claim rejected");
                    }
                    _ => tracing::debug!(
                        %user,
                        %index,
                        tranche = %kind,
                        error = %err,
                        "Claim rejected"
                    ),
                })?;
            if ctx.caller != user {
                tracing::warn!(
                    caller = %ctx.caller,
                    %user,
                    %index,
                    tranche = %kind,
                    "Claim rejected: caller is not the lockup owner"
                );
                return Err(TranchelockError::NotAuthorized {
                    caller: ctx.caller,
                    user,
                });
            }
            let snapshot = account.clone();
            let amount = account.release(user, index, kind)?;
            (amount, snapshot)
        };

        if let Err(err) = self.asset.transfer(self.custody, user, amount) {
            tracing::debug!(
                %user,
                %index,
                tranche = %kind,
                error = %err,
                "Payout failed, rolling back"
            );
            self.restore(user, Some(snapshot));
            return Err(err);
        }

        self.commit(LedgerEvent::unlocked(kind, user, index, amount), now, |c| {
            c.record_release(amount)
        })?;
        tracing::info!(%user, %index, tranche = %kind, %amount, "Tranche claimed");
        Ok(amount)
    }

    // =================================================================
    // Rate registry (administrator writes, open reads)
    // =================================================================

    pub fn set_short_duration(&self, caller: AccountId, value: Duration) -> Result<()> {
        self.update_rates(|reg| reg.set_short_duration(caller, value))
    }

    pub fn set_long_duration(&self, caller: AccountId, value: Duration) -> Result<()> {
        self.update_rates(|reg| reg.set_long_duration(caller, value))
    }

    pub fn set_short_fraction(&self, caller: AccountId, value: Decimal) -> Result<()> {
        self.update_rates(|reg| reg.set_short_fraction(caller, value))
    }

    pub fn set_long_fraction(&self, caller: AccountId, value: Decimal) -> Result<()> {
        self.update_rates(|reg| reg.set_long_fraction(caller, value))
    }

    fn update_rates(
        &self,
        write: impl FnOnce(&mut RateRegistry) -> Result<LedgerEvent>,
    ) -> Result<()> {
        let _entered = self.enter()?;
        let now = self.clock.now();
        let mut state = self.state();
        let event = write(&mut state.registry)?;
        tracing::info!(event = %event, "Rates updated");
        state.audit.append(event, now);
        Ok(())
    }

    #[must_use]
    pub fn rates(&self) -> Rates {
        self.state().registry.rates()
    }

    #[must_use]
    pub fn short_duration(&self) -> Duration {
        self.state().registry.short_duration()
    }

    #[must_use]
    pub fn long_duration(&self) -> Duration {
        self.state().registry.long_duration()
    }

    #[must_use]
    pub fn short_fraction(&self) -> Decimal {
        self.state().registry.short_fraction()
    }

    #[must_use]
    pub fn long_fraction(&self) -> Decimal {
        self.state().registry.long_fraction()
    }

    #[must_use]
    pub fn admin(&self) -> AccountId {
        self.state().registry.admin()
    }

    // =================================================================
    // Reads
    // =================================================================

    /// The account holding locked funds.
    #[must_use]
    pub fn custody(&self) -> AccountId {
        self.custody
    }

    /// Number of lockups ever created for `user`; also the latest index.
    #[must_use]
    pub fn lockup_count(&self, user: AccountId) -> u64 {
        self.state()
            .accounts
            .get(&user)
            .map_or(0, UserAccount::lockup_count)
    }

    /// Sum of `user`'s unclaimed tranche amounts.
    #[must_use]
    pub fn total_locked(&self, user: AccountId) -> Decimal {
        self.state()
            .accounts
            .get(&user)
            .map_or(Decimal::ZERO, UserAccount::total_locked)
    }

    #[must_use]
    pub fn lockup(&self, user: AccountId, index: LockupIndex) -> Option<Lockup> {
        self.state()
            .accounts
            .get(&user)
            .and_then(|account| account.lockup(index).cloned())
    }

    #[must_use]
    pub fn account(&self, user: AccountId) -> Option<UserAccount> {
        self.state().accounts.get(&user).cloned()
    }

    /// Snapshot of the audit log.
    #[must_use]
    pub fn events(&self) -> Vec<EventRecord> {
        self.state().audit.records().to_vec()
    }

    #[must_use]
    pub fn custody_totals(&self) -> CustodyConservation {
        self.state().conservation.clone()
    }

    /// Whether a guarded operation is running right now.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.guard.is_entered()
    }

    // =================================================================
    // Invariants
    // =================================================================

    /// Check that custody holds exactly what the ledger has accounted for:
    /// the custody balance and the sum of every user's `total_locked` both
    /// equal pulled minus released.
    ///
    /// Waits for any running operation so the check sees settled state.
    /// Assumes the custody account is dedicated to this ledger.
    pub fn verify_custody(&self) -> Result<()> {
        let _entered = self.enter()?;
        self.check_custody()
    }

    /// Check every ledger invariant: per-user `total_locked` equals the sum
    /// of unclaimed tranches, custody conservation, and the audit chain.
    pub fn verify_invariants(&self) -> Result<()> {
        let _entered = self.enter()?;
        {
            let state = self.state();
            for (user, account) in &state.accounts {
                let sum = account.unclaimed_sum();
                if account.total_locked() != sum {
                    return Err(TranchelockError::CustodyInvariantViolation {
                        reason: format!(
                            "user {user}: total locked {} != unclaimed sum {sum}",
                            account.total_locked()
                        ),
                    });
                }
            }
            state.audit.verify()?;
        }
        self.check_custody()
    }

    fn check_custody(&self) -> Result<()> {
        let balance = self.asset.balance_of(self.custody);
        let state = self.state();
        let locked = state
            .accounts
            .values()
            .try_fold(Decimal::ZERO, |sum, account| {
                sum.checked_add(account.total_locked()).ok_or_else(|| {
                    TranchelockError::ArithmeticOverflow(format!(
                        "sum of total locked {sum} + {}",
                        account.total_locked()
                    ))
                })
            })?;
        state.conservation.verify("total locked", locked)?;
        state.conservation.verify("custody balance", balance)
    }

    // =================================================================
    // Internals
    // =================================================================

    fn enter(&self) -> Result<crate::reentrancy::Entered<'_>> {
        self.guard.enter().inspect_err(|_| {
            tracing::warn!("Re-entrant ledger call rejected");
        })
    }

    fn restore(&self, user: AccountId, snapshot: Option<UserAccount>) {
        let mut state = self.state();
        match snapshot {
            Some(account) => {
                state.accounts.insert(user, account);
            }
            None => {
                state.accounts.remove(&user);
            }
        }
    }

    // Pulls are checked in the precondition phase and releases never exceed
    // what was pulled, so `record` does not fail once a transfer went through.
    fn commit(
        &self,
        event: LedgerEvent,
        now: DateTime<Utc>,
        record: impl FnOnce(&mut CustodyConservation) -> Result<()>,
    ) -> Result<()> {
        let mut state = self.state();
        record(&mut state.conservation)?;
        let appended = state.audit.append(event, now);
        tracing::debug!(
            sequence = appended.sequence,
            hash = %appended.hash_hex(),
            "Event recorded"
        );
        Ok(())
    }
}

fn ensure_non_negative(amount: Decimal) -> Result<()> {
    if amount < Decimal::ZERO {
        return Err(TranchelockError::InvalidAmount { amount });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use chrono::TimeZone;
    use std::sync::Arc;
    use tranchelock_custody::AssetBook;

    const DAY: u64 = 86_400;

    fn dec(n: i64) -> Decimal {
        Decimal::new(n, 0)
    }

    struct Fixture {
        ledger: LockupLedger<Arc<AssetBook>, ManualClock>,
        book: Arc<AssetBook>,
        clock: ManualClock,
        admin: AccountId,
        user: AccountId,
    }

    fn setup() -> Fixture {
        let admin = AccountId::dummy(100);
        let custody = AccountId::dummy(200);
        let user = AccountId::dummy(1);
        let mut config = LedgerConfig::new(admin, custody);
        config.rates.short_duration = Duration::from_secs(10 * DAY);
        config.rates.long_duration = Duration::from_secs(100 * DAY);

        let book = Arc::new(AssetBook::new("RWD"));
        book.mint(user, dec(10_000)).unwrap();
        book.approve(user, custody, dec(10_000)).unwrap();

        let clock = ManualClock::new(Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap());
        let ledger = LockupLedger::new(config, Arc::clone(&book), clock.clone()).unwrap();
        Fixture {
            ledger,
            book,
            clock,
            admin,
            user,
        }
    }

    #[test]
    fn create_records_lockup_and_pulls_funds() {
        let f = setup();
        let ctx = CallContext::direct(f.user);
        let index = f.ledger.create_lockup(ctx, f.user, dec(100), dec(200)).unwrap();

        assert_eq!(index, LockupIndex(1));
        assert_eq!(f.ledger.lockup_count(f.user), 1);
        assert_eq!(f.ledger.total_locked(f.user), dec(300));
        assert_eq!(f.book.balance_of(f.ledger.custody()), dec(300));
        assert_eq!(f.book.balance_of(f.user), dec(9_700));

        let lockup = f.ledger.lockup(f.user, index).unwrap();
        let now = f.clock.now();
        assert_eq!(lockup.short().unlock_time(), now + chrono::Duration::days(10));
        assert_eq!(lockup.long().unlock_time(), now + chrono::Duration::days(100));
        f.ledger.verify_invariants().unwrap();
    }

    #[test]
    fn relayed_creation_with_user_origin_is_accepted() {
        let f = setup();
        let relay = AccountId::dummy(7);
        let ctx = CallContext::relayed(relay, f.user);
        f.ledger.create_lockup(ctx, f.user, dec(1), dec(1)).unwrap();
        assert_eq!(f.ledger.lockup_count(f.user), 1);
    }

    #[test]
    fn create_for_someone_else_is_not_user() {
        let f = setup();
        let relay = AccountId::dummy(7);
        let err = f
            .ledger
            .create_lockup(CallContext::direct(relay), f.user, dec(1), dec(1))
            .unwrap_err();
        assert!(matches!(err, TranchelockError::NotUser { .. }));
        assert_eq!(f.ledger.lockup_count(f.user), 0);
        assert!(f.ledger.events().is_empty());
    }

    #[test]
    fn negative_amount_rejected() {
        let f = setup();
        let err = f
            .ledger
            .create_lockup(CallContext::direct(f.user), f.user, dec(-1), dec(5))
            .unwrap_err();
        assert!(matches!(err, TranchelockError::InvalidAmount { .. }));
        assert!(f.ledger.account(f.user).is_none());
    }

    #[test]
    fn failed_pull_rolls_back_everything() {
        let f = setup();
        // More than the user approved: the long pull fails after the short one succeeded.
        let err = f
            .ledger
            .create_lockup(CallContext::direct(f.user), f.user, dec(6_000), dec(6_000))
            .unwrap_err();
        assert!(matches!(err, TranchelockError::InsufficientAllowance { .. }));
        assert_eq!(f.ledger.lockup_count(f.user), 0);
        assert!(f.ledger.account(f.user).is_none());
        assert_eq!(f.book.balance_of(f.user), dec(10_000));
        assert_eq!(f.book.balance_of(f.ledger.custody()), Decimal::ZERO);
        assert!(f.ledger.events().is_empty());
        f.ledger.verify_invariants().unwrap();
    }

    #[test]
    fn custody_total_overflow_rejected_before_any_transfer() {
        let f = setup();
        let whale = AccountId::dummy(2);
        // Twice this exceeds `Decimal::MAX`.
        let big = Decimal::from_i128_with_scale(1 << 95, 0);
        f.book.mint(whale, big).unwrap();
        let ctx = CallContext::direct(whale);

        f.book.approve(whale, f.ledger.custody(), big).unwrap();
        let index = f.ledger.create_lockup(ctx, whale, big, Decimal::ZERO).unwrap();
        f.clock.advance(Duration::from_secs(10 * DAY + 1));
        assert_eq!(f.ledger.claim_short(ctx, whale, index).unwrap(), big);

        // Nothing is locked any more, but the running pulled total is.
        f.book.approve(whale, f.ledger.custody(), big).unwrap();
        let err = f
            .ledger
            .create_lockup(ctx, whale, big, Decimal::ZERO)
            .unwrap_err();
        assert!(matches!(err, TranchelockError::ArithmeticOverflow(_)));

        assert_eq!(f.ledger.lockup_count(whale), 1);
        assert_eq!(f.book.balance_of(whale), big);
        assert_eq!(f.book.allowance(whale, f.ledger.custody()), big);
        assert_eq!(f.book.balance_of(f.ledger.custody()), Decimal::ZERO);
        assert_eq!(f.ledger.events().len(), 2);
        assert!(!f.ledger.is_busy());
        f.ledger.verify_invariants().unwrap();
    }

    #[test]
    fn failed_pull_keeps_earlier_lockups() {
        let f = setup();
        let ctx = CallContext::direct(f.user);
        f.ledger.create_lockup(ctx, f.user, dec(100), dec(100)).unwrap();
        f.ledger
            .create_lockup(ctx, f.user, dec(20_000), dec(0))
            .unwrap_err();
        assert_eq!(f.ledger.lockup_count(f.user), 1);
        assert_eq!(f.ledger.total_locked(f.user), dec(200));
        f.ledger.verify_invariants().unwrap();
    }

    #[test]
    fn claim_short_after_maturity() {
        let f = setup();
        let ctx = CallContext::direct(f.user);
        let index = f.ledger.create_lockup(ctx, f.user, dec(100), dec(200)).unwrap();

        f.clock.advance(Duration::from_secs(10 * DAY + 1));
        let paid = f.ledger.claim_short(ctx, f.user, index).unwrap();
        assert_eq!(paid, dec(100));
        assert_eq!(f.ledger.total_locked(f.user), dec(200));
        assert_eq!(f.book.balance_of(f.user), dec(9_800));

        let lockup = f.ledger.lockup(f.user, index).unwrap();
        assert!(lockup.short().is_claimed());
        assert_eq!(lockup.short().amount(), Decimal::ZERO);
        assert!(!lockup.long().is_claimed());
        f.ledger.verify_invariants().unwrap();
    }

    #[test]
    fn claim_exactly_at_unlock_is_too_early() {
        let f = setup();
        let ctx = CallContext::direct(f.user);
        let index = f.ledger.create_lockup(ctx, f.user, dec(100), dec(200)).unwrap();
        f.clock.advance(Duration::from_secs(10 * DAY));
        let err = f.ledger.claim_short(ctx, f.user, index).unwrap_err();
        assert!(matches!(err, TranchelockError::TooEarly { .. }));
    }

    #[test]
    fn claim_by_other_caller_not_authorized() {
        let f = setup();
        let ctx = CallContext::direct(f.user);
        let index = f.ledger.create_lockup(ctx, f.user, dec(100), dec(200)).unwrap();
        f.clock.advance(Duration::from_secs(200 * DAY));

        let thief = AccountId::dummy(66);
        // Originating from the user but relayed: claims need the direct caller.
        for ctx in [CallContext::direct(thief), CallContext::relayed(thief, f.user)] {
            let err = f.ledger.claim_long(ctx, f.user, index).unwrap_err();
            assert!(matches!(err, TranchelockError::NotAuthorized { .. }));
        }
        assert_eq!(f.ledger.total_locked(f.user), dec(300));
        assert_eq!(f.book.balance_of(thief), Decimal::ZERO);
    }

    #[test]
    fn precondition_order_index_then_claimed_then_time_then_caller() {
        let f = setup();
        let ctx = CallContext::direct(f.user);
        let stranger = CallContext::direct(AccountId::dummy(9));
        let index = f.ledger.create_lockup(ctx, f.user, dec(1), dec(1)).unwrap();

        // Bad index wins over everything.
        let err = f.ledger.claim_short(stranger, f.user, LockupIndex(2)).unwrap_err();
        assert!(matches!(err, TranchelockError::InvalidIndex { .. }));
        // Too early wins over bad caller.
        let err = f.ledger.claim_short(stranger, f.user, index).unwrap_err();
        assert!(matches!(err, TranchelockError::TooEarly { .. }));

        f.clock.advance(Duration::from_secs(11 * DAY));
        f.ledger.claim_short(ctx, f.user, index).unwrap();
        // Already claimed wins over bad caller.
        let err = f.ledger.claim_short(stranger, f.user, index).unwrap_err();
        assert!(matches!(err, TranchelockError::AlreadyClaimed { .. }));
    }

    #[test]
    fn unknown_user_has_no_valid_index() {
        let f = setup();
        let nobody = AccountId::dummy(55);
        let err = f
            .ledger
            .claim_short(CallContext::direct(nobody), nobody, LockupIndex(1))
            .unwrap_err();
        assert!(matches!(err, TranchelockError::InvalidIndex { count: 0, .. }));
    }

    #[test]
    fn failed_payout_restores_tranche() {
        let f = setup();
        let ctx = CallContext::direct(f.user);
        let index = f.ledger.create_lockup(ctx, f.user, dec(100), dec(200)).unwrap();
        // Drain custody behind the ledger's back so the payout cannot succeed.
        f.book
            .transfer(f.ledger.custody(), AccountId::dummy(999), dec(300))
            .unwrap();

        f.clock.advance(Duration::from_secs(11 * DAY));
        let err = f.ledger.claim_short(ctx, f.user, index).unwrap_err();
        assert!(matches!(err, TranchelockError::InsufficientBalance { .. }));

        let lockup = f.ledger.lockup(f.user, index).unwrap();
        assert!(!lockup.short().is_claimed());
        assert_eq!(lockup.short().amount(), dec(100));
        assert_eq!(f.ledger.total_locked(f.user), dec(300));
        assert_eq!(f.ledger.events().len(), 1);
        assert!(matches!(
            f.ledger.verify_custody().unwrap_err(),
            TranchelockError::CustodyInvariantViolation { .. }
        ));
    }

    #[test]
    fn rate_setters_require_admin_and_log_events() {
        let f = setup();
        f.ledger
            .set_short_duration(f.admin, Duration::from_secs(5))
            .unwrap();
        f.ledger.set_long_fraction(f.admin, dec(1)).unwrap();
        assert_eq!(f.ledger.short_duration(), Duration::from_secs(5));
        assert_eq!(f.ledger.long_fraction(), dec(1));

        let err = f
            .ledger
            .set_long_duration(f.user, Duration::from_secs(1))
            .unwrap_err();
        assert!(matches!(err, TranchelockError::Unauthorized { .. }));
        assert_eq!(f.ledger.long_duration(), Duration::from_secs(100 * DAY));

        let names: Vec<_> = f.ledger.events().iter().map(|r| r.event.name()).collect();
        assert_eq!(names, vec!["SHORT_DURATION_CHANGED", "LONG_FRACTION_CHANGED"]);
        assert!(!f.ledger.is_busy());
    }

    #[test]
    fn with_system_clock_rejects_bad_config() {
        let admin = AccountId::dummy(1);
        let err = LockupLedger::with_system_clock(
            LedgerConfig::new(admin, admin),
            AssetBook::new("RWD"),
        )
        .unwrap_err();
        assert!(matches!(err, TranchelockError::Configuration(_)));
    }
}
