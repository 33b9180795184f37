//! Store wrapper that fails chosen writes on request.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use cashdesk_domain::{
    Deposit, Member, MemberId, Membership, MembershipId, NewDeposit, NewMember, NewMembership,
};
use cashdesk_store::{
    CascadeCount, DepositRepository, MemberRepository, MembershipRepository, MemoryStore, Store,
    StoreError,
};
use chrono::{DateTime, Utc};

/// Store write that [`FailingStore`] can be told to reject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailPoint {
    /// `MemberRepository::insert`
    MemberInsert,
    /// `MemberRepository::delete_cascade`
    MemberDelete,
    /// `MembershipRepository::insert`
    MembershipInsert,
    /// `MembershipRepository::update`
    MembershipUpdate,
    /// `DepositRepository::insert`
    DepositInsert,
}

/// [`MemoryStore`] whose armed writes fail with `StoreError::Unavailable`
/// before touching any data. Reads always go through.
#[derive(Default)]
pub struct FailingStore {
    inner: MemoryStore,
    armed: Mutex<HashSet<FailPoint>>,
}

impl FailingStore {
    /// Empty store with nothing armed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every later call at `point` fail.
    pub fn fail_on(&self, point: FailPoint) {
        self.armed.lock().unwrap_or_else(PoisonError::into_inner).insert(point);
    }

    /// Let calls at `point` through again.
    pub fn recover(&self, point: FailPoint) {
        self.armed.lock().unwrap_or_else(PoisonError::into_inner).remove(&point);
    }

    /// The wrapped store, for row counts.
    pub fn inner(&self) -> &MemoryStore {
        &self.inner
    }

    fn check(&self, point: FailPoint) -> Result<(), StoreError> {
        let armed = self.armed.lock().unwrap_or_else(PoisonError::into_inner);
        if armed.contains(&point) {
            Err(StoreError::Unavailable(format!("injected failure at {:?}", point)))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl MemberRepository for FailingStore {
    async fn insert(&self, member: NewMember) -> Result<Member, StoreError> {
        self.check(FailPoint::MemberInsert)?;
        MemberRepository::insert(&self.inner, member).await
    }

    async fn find_by_id(&self, id: MemberId) -> Result<Option<Member>, StoreError> {
        MemberRepository::find_by_id(&self.inner, id).await
    }

    async fn list(&self) -> Result<Vec<Member>, StoreError> {
        self.inner.list().await
    }

    async fn delete_cascade(&self, id: MemberId) -> Result<CascadeCount, StoreError> {
        self.check(FailPoint::MemberDelete)?;
        self.inner.delete_cascade(id).await
    }
}

#[async_trait]
impl MembershipRepository for FailingStore {
    async fn insert(&self, membership: NewMembership) -> Result<Membership, StoreError> {
        self.check(FailPoint::MembershipInsert)?;
        MembershipRepository::insert(&self.inner, membership).await
    }

    async fn find_by_member(&self, member_id: MemberId) -> Result<Vec<Membership>, StoreError> {
        self.inner.find_by_member(member_id).await
    }

    async fn find_active(
        &self,
        member_id: MemberId,
        at: DateTime<Utc>,
    ) -> Result<Option<Membership>, StoreError> {
        self.inner.find_active(member_id, at).await
    }

    async fn update(&self, membership: &Membership) -> Result<(), StoreError> {
        self.check(FailPoint::MembershipUpdate)?;
        self.inner.update(membership).await
    }
}

#[async_trait]
impl DepositRepository for FailingStore {
    async fn insert(&self, deposit: NewDeposit) -> Result<Deposit, StoreError> {
        self.check(FailPoint::DepositInsert)?;
        DepositRepository::insert(&self.inner, deposit).await
    }

    async fn find_by_membership(
        &self,
        membership_id: MembershipId,
    ) -> Result<Vec<Deposit>, StoreError> {
        self.inner.find_by_membership(membership_id).await
    }
}

#[async_trait]
impl Store for FailingStore {
    fn members(&self) -> &dyn MemberRepository {
        self
    }

    fn memberships(&self) -> &dyn MembershipRepository {
        self
    }

    fn deposits(&self) -> &dyn DepositRepository {
        self
    }

    async fn close(&self) -> Result<(), StoreError> {
        Store::close(&self.inner).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cashdesk_domain::PersonName;

    fn new_member() -> NewMember {
        NewMember {
            first_name: PersonName::new("Grace").unwrap(),
            last_name: PersonName::new("Hopper").unwrap(),
            birthday: crate::birthday(),
        }
    }

    #[tokio::test]
    async fn test_armed_point_fails_until_recovered() {
        let store = FailingStore::new();
        store.fail_on(FailPoint::MemberInsert);

        let result = store.members().insert(new_member()).await;
        assert!(matches!(result, Err(StoreError::Unavailable(_))));
        assert_eq!(store.inner().member_count(), 0);

        store.recover(FailPoint::MemberInsert);
        let member = store.members().insert(new_member()).await.unwrap();
        assert_eq!(store.members().find_by_id(member.id).await.unwrap(), Some(member));
    }
}
