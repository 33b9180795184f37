//! Domain Entities for CashDesk
//!
//! Members, their membership periods and the deposits recorded against them.
//! Identifiers are assigned by the store when a `New*` draft is inserted.

use crate::value_objects::{Amount, DomainError, PersonName};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// =============================================================================
// Identifiers
// =============================================================================

/// Store-assigned identifier of a Member
pub type MemberId = i64;

/// Store-assigned identifier of a Membership
pub type MembershipId = i64;

/// Store-assigned identifier of a Deposit
pub type DepositId = i64;

// =============================================================================
// Member
// =============================================================================

/// A registered club member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    pub first_name: PersonName,
    /// Unique across all members
    pub last_name: PersonName,
    pub birthday: NaiveDate,
}

/// Member registration data, before the store assigns an id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMember {
    pub first_name: PersonName,
    pub last_name: PersonName,
    pub birthday: NaiveDate,
}

impl NewMember {
    /// Attach the id assigned by the store
    pub fn into_member(self, id: MemberId) -> Member {
        Member {
            id,
            first_name: self.first_name,
            last_name: self.last_name,
            birthday: self.birthday,
        }
    }
}

// =============================================================================
// Membership
// =============================================================================

/// A membership period of one member
///
/// `end == None` means the membership is open and stays active until it is
/// cancelled. A closed membership covers the closed interval `[begin, end]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    pub id: MembershipId,
    pub member_id: MemberId,
    pub begin: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
}

impl Membership {
    /// Check whether `at` falls inside `[begin, end]`
    pub fn is_active_at(&self, at: DateTime<Utc>) -> bool {
        if at < self.begin {
            return false;
        }
        match self.end {
            None => true,
            Some(end) => at <= end,
        }
    }

    /// Check whether the membership has not been cancelled
    pub fn is_open(&self) -> bool {
        self.end.is_none()
    }

    /// Calendar year (UTC) in which the membership began
    pub fn year(&self) -> i32 {
        self.begin.year()
    }

    /// Close the membership at `at`
    ///
    /// # Errors
    /// Returns `DomainError::InvalidStateTransition` if the membership is
    /// already closed or `at` lies before `begin`
    pub fn close(&mut self, at: DateTime<Utc>) -> Result<(), DomainError> {
        if let Some(end) = self.end {
            return Err(DomainError::InvalidStateTransition(format!(
                "Membership {} already closed at {}",
                self.id, end
            )));
        }
        if at < self.begin {
            return Err(DomainError::InvalidStateTransition(format!(
                "Membership {} cannot end at {} before it began at {}",
                self.id, at, self.begin
            )));
        }
        self.end = Some(at);
        Ok(())
    }
}

/// Open-ended membership draft
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMembership {
    pub member_id: MemberId,
    pub begin: DateTime<Utc>,
}

impl NewMembership {
    /// Attach the id assigned by the store
    pub fn into_membership(self, id: MembershipId) -> Membership {
        Membership {
            id,
            member_id: self.member_id,
            begin: self.begin,
            end: None,
        }
    }
}

// =============================================================================
// Deposit
// =============================================================================

/// Money paid in during a membership
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deposit {
    pub id: DepositId,
    pub membership_id: MembershipId,
    pub amount: Amount,
}

/// Deposit draft
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDeposit {
    pub membership_id: MembershipId,
    pub amount: Amount,
}

impl NewDeposit {
    /// Attach the id assigned by the store
    pub fn into_deposit(self, id: DepositId) -> Deposit {
        Deposit {
            id,
            membership_id: self.membership_id,
            amount: self.amount,
        }
    }
}

// =============================================================================
// Deposit Statistics
// =============================================================================

/// Total deposited during one membership, attributed to the year it began
///
/// Derived on demand, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositStatistics {
    pub member: Member,
    pub membership_id: MembershipId,
    pub year: i32,
    pub total_amount: Decimal,
}

impl DepositStatistics {
    /// Aggregate the deposits of `membership`
    ///
    /// Returns `None` when there are no deposits, since memberships without
    /// deposits produce no statistics entry. Deposits that belong to another
    /// membership are ignored.
    pub fn from_deposits(
        member: &Member,
        membership: &Membership,
        deposits: &[Deposit],
    ) -> Option<Self> {
        let mut own = deposits.iter().filter(|d| d.membership_id == membership.id).peekable();
        own.peek()?;

        let total_amount = own.map(|d| d.amount.as_decimal()).sum();

        Some(Self {
            member: member.clone(),
            membership_id: membership.id,
            year: membership.year(),
            total_amount,
        })
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use rust_decimal_macros::dec;

    fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap()
    }

    fn member() -> Member {
        NewMember {
            first_name: PersonName::new("Grace").unwrap(),
            last_name: PersonName::new("Hopper").unwrap(),
            birthday: NaiveDate::from_ymd_opt(1906, 12, 9).unwrap(),
        }
        .into_member(7)
    }

    fn open_membership(begin: DateTime<Utc>) -> Membership {
        NewMembership { member_id: 7, begin }.into_membership(1)
    }

    fn deposit(id: DepositId, membership_id: MembershipId, amount: Decimal) -> Deposit {
        NewDeposit {
            membership_id,
            amount: Amount::new(amount).unwrap(),
        }
        .into_deposit(id)
    }

    #[test]
    fn test_new_member_keeps_fields() {
        let member = member();
        assert_eq!(member.id, 7);
        assert_eq!(member.first_name.as_str(), "Grace");
        assert_eq!(member.last_name.as_str(), "Hopper");
        assert_eq!(member.birthday, NaiveDate::from_ymd_opt(1906, 12, 9).unwrap());
    }

    #[test]
    fn test_open_membership_is_active_from_begin() {
        let begin = at(2024, 3, 1);
        let membership = open_membership(begin);

        assert!(membership.is_open());
        assert!(!membership.is_active_at(begin - Duration::seconds(1)));
        assert!(membership.is_active_at(begin));
        assert!(membership.is_active_at(at(2090, 1, 1)));
    }

    #[test]
    fn test_closed_membership_interval_is_inclusive() {
        let begin = at(2024, 3, 1);
        let end = at(2024, 6, 1);
        let mut membership = open_membership(begin);
        membership.close(end).unwrap();

        assert!(!membership.is_open());
        assert!(membership.is_active_at(end));
        assert!(!membership.is_active_at(end + Duration::milliseconds(1)));
    }

    #[test]
    fn test_close_twice_fails() {
        let mut membership = open_membership(at(2024, 3, 1));
        membership.close(at(2024, 4, 1)).unwrap();

        let result = membership.close(at(2024, 5, 1));
        assert!(matches!(result, Err(DomainError::InvalidStateTransition(_))));
        assert_eq!(membership.end, Some(at(2024, 4, 1)));
    }

    #[test]
    fn test_close_before_begin_fails() {
        let mut membership = open_membership(at(2024, 3, 1));
        let result = membership.close(at(2024, 2, 1));
        assert!(result.is_err());
        assert!(membership.is_open());
    }

    #[test]
    fn test_close_at_begin_is_allowed() {
        let begin = at(2024, 3, 1);
        let mut membership = open_membership(begin);
        membership.close(begin).unwrap();
        assert_eq!(membership.end, Some(begin));
    }

    #[test]
    fn test_statistics_sum_own_deposits() {
        let member = member();
        let membership = open_membership(at(2023, 12, 31));
        let deposits = vec![
            deposit(1, membership.id, dec!(50.00)),
            deposit(2, membership.id, dec!(25.00)),
            deposit(3, membership.id + 1, dec!(1000)),
        ];

        let stats = DepositStatistics::from_deposits(&member, &membership, &deposits).unwrap();
        assert_eq!(stats.year, 2023);
        assert_eq!(stats.total_amount, dec!(75.00));
        assert_eq!(stats.membership_id, membership.id);
        assert_eq!(stats.member, member);
    }

    #[test]
    fn test_statistics_none_without_deposits() {
        let member = member();
        let membership = open_membership(at(2024, 1, 1));
        let foreign = vec![deposit(1, membership.id + 1, dec!(10))];

        assert!(DepositStatistics::from_deposits(&member, &membership, &[]).is_none());
        assert!(DepositStatistics::from_deposits(&member, &membership, &foreign).is_none());
    }

    #[test]
    fn test_statistics_with_zero_deposit() {
        let member = member();
        let membership = open_membership(at(2024, 1, 1));
        let deposits = vec![deposit(1, membership.id, Decimal::ZERO)];

        let stats = DepositStatistics::from_deposits(&member, &membership, &deposits).unwrap();
        assert_eq!(stats.total_amount, Decimal::ZERO);
    }

    #[test]
    fn test_open_membership_serializes_null_end() {
        let membership = open_membership(at(2024, 1, 1));
        let json = serde_json::to_value(&membership).unwrap();
        assert!(json["end"].is_null());
    }
}
