//! CashDesk Storage Layer
//!
//! Provides persistence for members, memberships, and deposits.
//!
//! # Architecture
//!
//! - **Repository traits**: Define the storage interface (ports)
//! - **In-memory store**: Implementation with generated ids, last-name
//!   uniqueness and referential integrity between the three tables
//!
//! # Usage
//!
//! ```rust
//! use cashdesk_domain::{NewMember, PersonName};
//! use cashdesk_store::{MemoryStore, Store};
//! use chrono::NaiveDate;
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = MemoryStore::new();
//!
//!     let member = store
//!         .members()
//!         .insert(NewMember {
//!             first_name: PersonName::new("Ada").unwrap(),
//!             last_name: PersonName::new("Lovelace").unwrap(),
//!             birthday: NaiveDate::from_ymd_opt(1815, 12, 10).unwrap(),
//!         })
//!         .await
//!         .unwrap();
//!
//!     let found = store.members().find_by_id(member.id).await.unwrap();
//!     assert!(found.is_some());
//! }
//! ```

#![warn(clippy::all)]

// Modules
mod error;
mod memory;
mod repository;

// Re-exports
pub use error::StoreError;
pub use memory::MemoryStore;
pub use repository::{
    CascadeCount, DepositRepository, MemberRepository, MembershipRepository, Store,
};
