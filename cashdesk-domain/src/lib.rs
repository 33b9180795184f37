//! CashDesk Domain Layer
//!
//! Pure domain logic with zero I/O dependencies.
//! Contains the member, membership and deposit entities, validated value
//! objects, and the clock port used for all temporal decisions.

#![warn(missing_docs)]
#![warn(clippy::all)]

// Public modules
pub mod clock;
pub mod entities;
pub mod value_objects;

// Re-export commonly used types
pub use clock::{Clock, SystemClock};
pub use entities::{
    Deposit, DepositId, DepositStatistics, Member, MemberId, Membership, MembershipId,
    NewDeposit, NewMember, NewMembership,
};
pub use value_objects::{Amount, DomainError, PersonName};
