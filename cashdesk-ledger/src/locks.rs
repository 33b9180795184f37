//! Per-member serialization of check-then-act sequences.

use cashdesk_domain::MemberId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// One async lock per member id.
///
/// Holding the guard for a member means no other ledger operation on that
/// member can read-then-write until it is dropped. Operations on different
/// members never contend beyond the short map lookup.
#[derive(Default)]
pub(crate) struct MemberLocks {
    locks: Mutex<HashMap<MemberId, Arc<AsyncMutex<()>>>>,
}

impl MemberLocks {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `member_id`.
    pub(crate) async fn acquire(&self, member_id: MemberId) -> OwnedMutexGuard<()> {
        let lock = {
            // The map holds no invariant a panicking holder could break.
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            locks.entry(member_id).or_default().clone()
        };
        lock.lock_owned().await
    }

    /// Drop the lock entry of a deleted member.
    pub(crate) fn forget(&self, member_id: MemberId) {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        locks.remove(&member_id);
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_member_is_serialized() {
        let locks = Arc::new(MemberLocks::new());
        let guard = locks.acquire(1).await;

        let contender = {
            let locks = Arc::clone(&locks);
            tokio::spawn(async move {
                let _guard = locks.acquire(1).await;
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!contender.is_finished());

        drop(guard);
        tokio::time::timeout(Duration::from_secs(1), contender)
            .await
            .expect("contender should acquire after release")
            .unwrap();
    }

    #[tokio::test]
    async fn test_different_members_do_not_contend() {
        let locks = MemberLocks::new();
        let _first = locks.acquire(1).await;

        let second = tokio::time::timeout(Duration::from_millis(100), locks.acquire(2)).await;
        assert!(second.is_ok());
        assert_eq!(locks.len(), 2);
    }

    #[tokio::test]
    async fn test_forget_drops_only_that_member() {
        let locks = MemberLocks::new();
        drop(locks.acquire(1).await);
        drop(locks.acquire(2).await);

        locks.forget(1);
        assert_eq!(locks.len(), 1);

        locks.forget(2);
        assert_eq!(locks.len(), 0);
    }
}
