//! Membership Ledger: member registration, membership lifecycle, deposits.
//!
//! The ledger is the only component with business rules:
//! - A member has at most one active membership at any instant
//! - Deposits are only accepted against the active membership
//! - Deleting a member removes its deposits and memberships in the same
//!   store operation as the member row
//!
//! # Lifecycle
//!
//! ```text
//! new() → initialize() → operations… → shutdown() → initialize() …
//! ```
//!
//! Every operation other than `initialize`/`shutdown` fails with
//! `LedgerError::NotInitialized` while the ledger is not initialized.
//!
//! # Membership state machine (per member)
//!
//! ```text
//! no active membership ──join──▶ active ──cancel──▶ no active membership
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use cashdesk_domain::{
    Amount, Clock, Deposit, DepositStatistics, Member, MemberId, Membership, NewDeposit,
    NewMember, NewMembership, PersonName, SystemClock,
};
use cashdesk_store::{Store, StoreError};

use crate::config::LedgerConfig;
use crate::error::{LedgerError, LedgerResult};
use crate::locks::MemberLocks;

// =============================================================================
// Ledger
// =============================================================================

/// Membership ledger over a store.
pub struct Ledger<S: Store + 'static> {
    /// Store for persistence
    store: Arc<S>,
    /// Source of "now" for every activity check
    clock: Arc<dyn Clock>,
    config: LedgerConfig,
    initialized: AtomicBool,
    /// Serializes initialize/shutdown
    lifecycle: Mutex<()>,
    locks: MemberLocks,
}

impl<S: Store + 'static> Ledger<S> {
    /// Create an uninitialized ledger.
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>, config: LedgerConfig) -> Self {
        Self {
            store,
            clock,
            config,
            initialized: AtomicBool::new(false),
            lifecycle: Mutex::new(()),
            locks: MemberLocks::new(),
        }
    }

    /// Create an uninitialized ledger reading wall-clock time.
    pub fn with_system_clock(store: Arc<S>, config: LedgerConfig) -> Self {
        Self::new(store, Arc::new(SystemClock), config)
    }

    /// Underlying store.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Active configuration.
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Check whether `initialize` has succeeded and `shutdown` has not run since.
    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Prepare the store for use.
    pub async fn initialize(&self) -> LedgerResult<()> {
        let _lifecycle = self.lifecycle.lock().await;

        if self.is_initialized() {
            return Err(LedgerError::AlreadyInitialized);
        }

        self.store.open().await?;
        self.initialized.store(true, Ordering::SeqCst);

        info!(environment = %self.config.environment, "Ledger initialized");
        Ok(())
    }

    /// Release store resources.
    ///
    /// Safe to call repeatedly. Failures while closing the store are logged
    /// and otherwise ignored.
    pub async fn shutdown(&self) {
        let _lifecycle = self.lifecycle.lock().await;

        if !self.initialized.swap(false, Ordering::SeqCst) {
            debug!("Ledger shutdown requested while not initialized");
            return;
        }

        // Member locks survive shutdown; in-flight operations may still hold them.
        if let Err(e) = self.store.close().await {
            warn!(error = %e, "Failed to release store during shutdown");
        }

        info!("Ledger shut down");
    }

    fn ensure_initialized(&self) -> LedgerResult<()> {
        if self.is_initialized() {
            Ok(())
        } else {
            Err(LedgerError::NotInitialized)
        }
    }

    // =========================================================================
    // Members
    // =========================================================================

    /// Register a member and return its id.
    pub async fn add_member(
        &self,
        first_name: &str,
        last_name: &str,
        birthday: NaiveDate,
    ) -> LedgerResult<MemberId> {
        self.ensure_initialized()?;

        let first_name = PersonName::with_max_length(first_name, self.config.max_name_length)?;
        let last_name = PersonName::with_max_length(last_name, self.config.max_name_length)?;

        let draft = NewMember {
            first_name,
            last_name,
            birthday,
        };

        let member = match self.store.members().insert(draft).await {
            Ok(member) => member,
            Err(StoreError::Duplicate { key, .. }) => {
                warn!(last_name = %key, "Rejected member with duplicate last name");
                return Err(LedgerError::DuplicateName(key));
            },
            Err(e) => return Err(e.into()),
        };

        info!(member_id = member.id, last_name = %member.last_name, "Member added");
        Ok(member.id)
    }

    /// Delete a member together with its memberships and deposits.
    ///
    /// Deposits, memberships and the member row go in one store call, so a
    /// failure leaves every row of the member in place.
    pub async fn delete_member(&self, member_id: MemberId) -> LedgerResult<()> {
        self.ensure_initialized()?;

        let guard = self.locks.acquire(member_id).await;
        self.require_member(member_id).await?;

        let removed = match self.store.members().delete_cascade(member_id).await {
            Ok(removed) => removed,
            Err(e) => {
                warn!(member_id, error = %e, "Member delete failed");
                return Err(e.into());
            },
        };

        drop(guard);
        self.locks.forget(member_id);

        info!(
            member_id,
            memberships = removed.memberships,
            deposits = removed.deposits,
            "Member deleted"
        );
        Ok(())
    }

    /// Look up a member.
    pub async fn get_member(&self, member_id: MemberId) -> LedgerResult<Member> {
        self.ensure_initialized()?;
        self.require_member(member_id).await
    }

    /// All members, ordered by id.
    pub async fn list_members(&self) -> LedgerResult<Vec<Member>> {
        self.ensure_initialized()?;
        Ok(self.store.members().list().await?)
    }

    async fn require_member(&self, member_id: MemberId) -> LedgerResult<Member> {
        self.store
            .members()
            .find_by_id(member_id)
            .await?
            .ok_or(LedgerError::NotFound(member_id))
    }

    // =========================================================================
    // Memberships
    // =========================================================================

    /// Start an open-ended membership beginning now.
    pub async fn join_member(&self, member_id: MemberId) -> LedgerResult<Membership> {
        self.ensure_initialized()?;

        let _guard = self.locks.acquire(member_id).await;
        self.require_member(member_id).await?;

        let now = self.clock.now();
        if let Some(active) = self.store.memberships().find_active(member_id, now).await? {
            warn!(member_id, membership_id = active.id, "Join rejected: membership active");
            return Err(LedgerError::AlreadyMember(member_id));
        }

        let membership = self
            .store
            .memberships()
            .insert(NewMembership {
                member_id,
                begin: now,
            })
            .await?;

        info!(member_id, membership_id = membership.id, begin = %membership.begin, "Member joined");
        Ok(membership)
    }

    /// End the active membership now and return the closed record.
    ///
    /// Cancelling again at the instant the membership was closed returns the
    /// closed record unchanged.
    pub async fn cancel_membership(&self, member_id: MemberId) -> LedgerResult<Membership> {
        self.ensure_initialized()?;

        let _guard = self.locks.acquire(member_id).await;

        let now = self.clock.now();
        let mut membership = self
            .store
            .memberships()
            .find_active(member_id, now)
            .await?
            .ok_or(LedgerError::NotMember(member_id))?;

        if membership.end == Some(now) {
            debug!(
                member_id,
                membership_id = membership.id,
                "Membership already cancelled at this instant"
            );
            return Ok(membership);
        }

        membership.close(now)?;
        self.store.memberships().update(&membership).await?;

        info!(member_id, membership_id = membership.id, end = %now, "Membership cancelled");
        Ok(membership)
    }

    /// The membership active right now, if any.
    pub async fn active_membership(&self, member_id: MemberId) -> LedgerResult<Option<Membership>> {
        self.ensure_initialized()?;
        let now = self.clock.now();
        Ok(self.store.memberships().find_active(member_id, now).await?)
    }

    /// Membership history of a member, ordered by begin.
    pub async fn memberships(&self, member_id: MemberId) -> LedgerResult<Vec<Membership>> {
        self.ensure_initialized()?;
        self.require_member(member_id).await?;
        Ok(self.store.memberships().find_by_member(member_id).await?)
    }

    // =========================================================================
    // Deposits
    // =========================================================================

    /// Record a deposit against the member's active membership.
    pub async fn deposit(&self, member_id: MemberId, amount: Decimal) -> LedgerResult<Deposit> {
        self.ensure_initialized()?;

        let amount = Amount::new(amount)?;

        let _guard = self.locks.acquire(member_id).await;
        self.require_member(member_id).await?;

        let now = self.clock.now();
        let membership = self
            .store
            .memberships()
            .find_active(member_id, now)
            .await?
            .ok_or(LedgerError::NotMember(member_id))?;

        let deposit = self
            .store
            .deposits()
            .insert(NewDeposit {
                membership_id: membership.id,
                amount,
            })
            .await?;

        info!(
            member_id,
            membership_id = membership.id,
            deposit_id = deposit.id,
            amount = %deposit.amount,
            "Deposit recorded"
        );
        Ok(deposit)
    }

    // =========================================================================
    // Statistics
    // =========================================================================

    /// One entry per membership with deposits, ordered by member id and
    /// membership begin.
    pub async fn deposit_statistics(&self) -> LedgerResult<Vec<DepositStatistics>> {
        self.ensure_initialized()?;

        let mut statistics = Vec::new();

        for member in self.store.members().list().await? {
            for membership in self.store.memberships().find_by_member(member.id).await? {
                let deposits = self.store.deposits().find_by_membership(membership.id).await?;
                if let Some(entry) = DepositStatistics::from_deposits(&member, &membership, &deposits)
                {
                    statistics.push(entry);
                }
            }
        }

        debug!(entries = statistics.len(), "Deposit statistics computed");
        Ok(statistics)
    }
}

// =============================================================================
// Tests
// =============================================================================
