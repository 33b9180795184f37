//! CashDesk Membership Ledger
//!
//! Business rules for club members, their membership periods and deposits.
//!
//! # Architecture
//!
//! ```text
//! caller → Ledger ──(per-member lock)──▶ Store (members, memberships, deposits)
//!             │
//!             └── Clock (decides which membership is active "now")
//! ```
//!
//! # Example
//!
//! ```rust
//! use cashdesk_ledger::{Ledger, LedgerConfig};
//! use cashdesk_store::MemoryStore;
//! use chrono::NaiveDate;
//! use rust_decimal::Decimal;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), cashdesk_ledger::LedgerError> {
//!     let ledger = Ledger::with_system_clock(Arc::new(MemoryStore::new()), LedgerConfig::default());
//!     ledger.initialize().await?;
//!
//!     let birthday = NaiveDate::from_ymd_opt(1815, 12, 10).unwrap();
//!     let id = ledger.add_member("Ada", "Lovelace", birthday).await?;
//!     ledger.join_member(id).await?;
//!     ledger.deposit(id, Decimal::new(5000, 2)).await?;
//!
//!     let stats = ledger.deposit_statistics().await?;
//!     assert_eq!(stats[0].total_amount, Decimal::new(5000, 2));
//!
//!     ledger.shutdown().await;
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod ledger;
mod locks;

// Re-exports for convenience
pub use config::{Environment, LedgerConfig};
pub use error::{ErrorKind, LedgerError, LedgerResult};
pub use ledger::Ledger;
