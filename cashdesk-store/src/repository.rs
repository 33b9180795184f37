//! Repository trait definitions (Ports)
//!
//! These traits define the storage interface for the domain.
//! Implementations assign identifiers, enforce last-name uniqueness and keep
//! parent/child references intact. Child rows only go away through
//! `MemberRepository::delete_cascade`.

use crate::error::StoreError;
use async_trait::async_trait;
use cashdesk_domain::{
    Deposit, Member, MemberId, Membership, MembershipId, NewDeposit, NewMember, NewMembership,
};
use chrono::{DateTime, Utc};

/// Rows removed by a cascading member delete
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CascadeCount {
    /// Memberships removed
    pub memberships: usize,
    /// Deposits removed
    pub deposits: usize,
}

/// Repository for Member entities
#[async_trait]
pub trait MemberRepository: Send + Sync {
    /// Insert a member and return it with its assigned id
    ///
    /// Fails with `StoreError::Duplicate` if the last name is taken.
    async fn insert(&self, member: NewMember) -> Result<Member, StoreError>;

    /// Find a member by ID
    async fn find_by_id(&self, id: MemberId) -> Result<Option<Member>, StoreError>;

    /// All members, ordered by id
    async fn list(&self) -> Result<Vec<Member>, StoreError>;

    /// Delete a member with its deposits and memberships as one unit
    ///
    /// Returns the number of memberships and deposits removed. Either all
    /// rows of the member are gone afterwards or none are.
    async fn delete_cascade(&self, id: MemberId) -> Result<CascadeCount, StoreError>;
}

/// Repository for Membership entities
#[async_trait]
pub trait MembershipRepository: Send + Sync {
    /// Insert an open membership for an existing member
    async fn insert(&self, membership: NewMembership) -> Result<Membership, StoreError>;

    /// All memberships of a member, ordered by begin
    async fn find_by_member(&self, member_id: MemberId) -> Result<Vec<Membership>, StoreError>;

    /// The membership of `member_id` whose interval contains `at`
    async fn find_active(
        &self,
        member_id: MemberId,
        at: DateTime<Utc>,
    ) -> Result<Option<Membership>, StoreError>;

    /// Persist a changed end state
    ///
    /// The owner and begin of a membership are immutable.
    async fn update(&self, membership: &Membership) -> Result<(), StoreError>;
}

/// Repository for Deposit entities (append-only)
#[async_trait]
pub trait DepositRepository: Send + Sync {
    /// Record a deposit against an existing membership
    async fn insert(&self, deposit: NewDeposit) -> Result<Deposit, StoreError>;

    /// All deposits of a membership, in insertion order
    async fn find_by_membership(
        &self,
        membership_id: MembershipId,
    ) -> Result<Vec<Deposit>, StoreError>;
}

/// Combined store interface
#[async_trait]
pub trait Store: Send + Sync {
    /// Get member repository
    fn members(&self) -> &dyn MemberRepository;

    /// Get membership repository
    fn memberships(&self) -> &dyn MembershipRepository;

    /// Get deposit repository
    fn deposits(&self) -> &dyn DepositRepository;

    /// Prepare the store for use
    async fn open(&self) -> Result<(), StoreError> {
        Ok(())
    }

    /// Release store resources
    async fn close(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
