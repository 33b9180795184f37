//! Test helper functions for clock control and seeding.

use std::sync::{Mutex, PoisonError};

use anyhow::Result;
use cashdesk_domain::{Clock, MemberId, Membership};
use cashdesk_ledger::Ledger;
use cashdesk_store::Store;
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};

/// Clock that only moves when told to.
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    /// Clock frozen at `now`.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now: Mutex::new(now) }
    }

    /// Jump to an absolute instant (may go backwards).
    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) = now;
    }

    /// Move forward by `by`.
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Instant the manual clock of `setup_ledger` starts at.
pub fn start_instant() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 15, 9, 30, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

/// A fixed, valid birthday.
pub fn birthday() -> NaiveDate {
    NaiveDate::from_ymd_opt(1990, 4, 1).unwrap_or_default()
}

/// Register a member with first name "Test" and the given last name.
pub async fn seed_member<S: Store + 'static>(
    ledger: &Ledger<S>,
    last_name: &str,
) -> Result<MemberId> {
    Ok(ledger.add_member("Test", last_name, birthday()).await?)
}

/// Register a member and open a membership for it.
pub async fn seed_member_with_membership<S: Store + 'static>(
    ledger: &Ledger<S>,
    last_name: &str,
) -> Result<(MemberId, Membership)> {
    let member_id = seed_member(ledger, last_name).await?;
    let membership = ledger.join_member(member_id).await?;
    Ok((member_id, membership))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_moves_only_on_request() {
        let clock = ManualClock::new(start_instant());
        assert_eq!(clock.now(), start_instant());

        clock.advance(Duration::minutes(5));
        assert_eq!(clock.now(), start_instant() + Duration::minutes(5));

        clock.set(start_instant());
        assert_eq!(clock.now(), start_instant());
    }

    #[tokio::test]
    async fn test_setup_ledger_seeds_members() {
        let (ledger, _) = crate::setup_ledger().await.unwrap();
        let (member_id, membership) = seed_member_with_membership(&ledger, "Hamilton").await.unwrap();

        assert_eq!(membership.member_id, member_id);
        assert_eq!(membership.begin, start_instant());
        assert_eq!(ledger.get_member(member_id).await.unwrap().birthday, birthday());
    }
}
