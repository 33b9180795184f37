//! In-memory store implementation
//!
//! Used by the ledger when no external database is wired in, and by tests.
//! Thread-safe using RwLock for concurrent access.
//!
//! Locks are always taken in table order (members, memberships, deposits) so
//! that referential checks and the writes they guard happen atomically. A
//! cascading delete holds all three write locks before touching any row.

use crate::error::StoreError;
use crate::repository::{
    CascadeCount, DepositRepository, MemberRepository, MembershipRepository, Store,
};
use async_trait::async_trait;
use cashdesk_domain::{
    Deposit, DepositId, Member, MemberId, Membership, MembershipId, NewDeposit, NewMember,
    NewMembership,
};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

/// In-memory store
pub struct MemoryStore {
    members: RwLock<BTreeMap<MemberId, Member>>,
    memberships: RwLock<BTreeMap<MembershipId, Membership>>,
    deposits: RwLock<BTreeMap<DepositId, Deposit>>,
    member_seq: AtomicI64,
    membership_seq: AtomicI64,
    deposit_seq: AtomicI64,
}

fn read<T>(lock: &RwLock<T>) -> Result<RwLockReadGuard<'_, T>, StoreError> {
    lock.read()
        .map_err(|e| StoreError::Unavailable(format!("lock poisoned: {}", e)))
}

fn write<T>(lock: &RwLock<T>) -> Result<RwLockWriteGuard<'_, T>, StoreError> {
    lock.write()
        .map_err(|e| StoreError::Unavailable(format!("lock poisoned: {}", e)))
}

impl MemoryStore {
    /// Create a new empty in-memory store
    pub fn new() -> Self {
        Self {
            members: RwLock::new(BTreeMap::new()),
            memberships: RwLock::new(BTreeMap::new()),
            deposits: RwLock::new(BTreeMap::new()),
            member_seq: AtomicI64::new(0),
            membership_seq: AtomicI64::new(0),
            deposit_seq: AtomicI64::new(0),
        }
    }

    /// Get the number of members
    pub fn member_count(&self) -> usize {
        read(&self.members).map(|m| m.len()).unwrap_or_default()
    }

    /// Get the number of memberships
    pub fn membership_count(&self) -> usize {
        read(&self.memberships).map(|m| m.len()).unwrap_or_default()
    }

    /// Get the number of deposits
    pub fn deposit_count(&self) -> usize {
        read(&self.deposits).map(|d| d.len()).unwrap_or_default()
    }

    /// Clear all data
    ///
    /// Id sequences keep counting, so an id handed out before the clear is
    /// never reused.
    pub fn clear(&self) -> Result<(), StoreError> {
        let mut members = write(&self.members)?;
        let mut memberships = write(&self.memberships)?;
        let mut deposits = write(&self.deposits)?;

        members.clear();
        memberships.clear();
        deposits.clear();
        Ok(())
    }

    fn next_id(seq: &AtomicI64) -> i64 {
        seq.fetch_add(1, Ordering::SeqCst) + 1
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Member Repository Implementation
// =============================================================================

#[async_trait]
impl MemberRepository for MemoryStore {
    async fn insert(&self, member: NewMember) -> Result<Member, StoreError> {
        let mut members = write(&self.members)?;

        if members.values().any(|m| m.last_name == member.last_name) {
            return Err(StoreError::duplicate("member", member.last_name.as_str()));
        }

        let member = member.into_member(Self::next_id(&self.member_seq));
        members.insert(member.id, member.clone());
        Ok(member)
    }

    async fn find_by_id(&self, id: MemberId) -> Result<Option<Member>, StoreError> {
        let members = read(&self.members)?;
        Ok(members.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<Member>, StoreError> {
        let members = read(&self.members)?;
        Ok(members.values().cloned().collect())
    }

    async fn delete_cascade(&self, id: MemberId) -> Result<CascadeCount, StoreError> {
        let mut members = write(&self.members)?;
        let mut memberships = write(&self.memberships)?;
        let mut deposits = write(&self.deposits)?;

        if !members.contains_key(&id) {
            return Err(StoreError::not_found("member", id));
        }

        let owned: BTreeSet<MembershipId> = memberships
            .values()
            .filter(|m| m.member_id == id)
            .map(|m| m.id)
            .collect();

        // Children first: deposits, memberships, then the member row.
        let before = deposits.len();
        deposits.retain(|_, d| !owned.contains(&d.membership_id));
        let removed_deposits = before - deposits.len();

        memberships.retain(|membership_id, _| !owned.contains(membership_id));
        members.remove(&id);

        let count = CascadeCount {
            memberships: owned.len(),
            deposits: removed_deposits,
        };
        debug!(
            member_id = id,
            memberships = count.memberships,
            deposits = count.deposits,
            "Member rows removed"
        );
        Ok(count)
    }
}

// =============================================================================
// Membership Repository Implementation
// =============================================================================

#[async_trait]
impl MembershipRepository for MemoryStore {
    async fn insert(&self, membership: NewMembership) -> Result<Membership, StoreError> {
        let members = read(&self.members)?;
        let mut memberships = write(&self.memberships)?;

        if !members.contains_key(&membership.member_id) {
            return Err(StoreError::constraint(format!(
                "membership references unknown member {}",
                membership.member_id
            )));
        }

        let membership = membership.into_membership(Self::next_id(&self.membership_seq));
        memberships.insert(membership.id, membership.clone());
        Ok(membership)
    }

    async fn find_by_member(&self, member_id: MemberId) -> Result<Vec<Membership>, StoreError> {
        let memberships = read(&self.memberships)?;
        let mut found: Vec<Membership> =
            memberships.values().filter(|m| m.member_id == member_id).cloned().collect();
        found.sort_by_key(|m| (m.begin, m.id));
        Ok(found)
    }

    async fn find_active(
        &self,
        member_id: MemberId,
        at: DateTime<Utc>,
    ) -> Result<Option<Membership>, StoreError> {
        let memberships = read(&self.memberships)?;
        Ok(memberships
            .values()
            .find(|m| m.member_id == member_id && m.is_active_at(at))
            .cloned())
    }

    async fn update(&self, membership: &Membership) -> Result<(), StoreError> {
        let mut memberships = write(&self.memberships)?;

        let stored = memberships
            .get_mut(&membership.id)
            .ok_or_else(|| StoreError::not_found("membership", membership.id))?;

        if stored.member_id != membership.member_id || stored.begin != membership.begin {
            return Err(StoreError::constraint(format!(
                "membership {} owner and begin are immutable",
                membership.id
            )));
        }

        stored.end = membership.end;
        Ok(())
    }
}

// =============================================================================
// Deposit Repository Implementation
// =============================================================================

#[async_trait]
impl DepositRepository for MemoryStore {
    async fn insert(&self, deposit: NewDeposit) -> Result<Deposit, StoreError> {
        let memberships = read(&self.memberships)?;
        let mut deposits = write(&self.deposits)?;

        if !memberships.contains_key(&deposit.membership_id) {
            return Err(StoreError::constraint(format!(
                "deposit references unknown membership {}",
                deposit.membership_id
            )));
        }

        let deposit = deposit.into_deposit(Self::next_id(&self.deposit_seq));
        deposits.insert(deposit.id, deposit.clone());
        Ok(deposit)
    }

    async fn find_by_membership(
        &self,
        membership_id: MembershipId,
    ) -> Result<Vec<Deposit>, StoreError> {
        let deposits = read(&self.deposits)?;
        Ok(deposits.values().filter(|d| d.membership_id == membership_id).cloned().collect())
    }
}

// =============================================================================
// Store Implementation
// =============================================================================

#[async_trait]
impl Store for MemoryStore {
    fn members(&self) -> &dyn MemberRepository {
        self
    }

    fn memberships(&self) -> &dyn MembershipRepository {
        self
    }

    fn deposits(&self) -> &dyn DepositRepository {
        self
    }

    /// Releasing an in-memory store drops its contents.
    async fn close(&self) -> Result<(), StoreError> {
        self.clear()
    }
}

// =============================================================================
// Tests
// =============================================================================
