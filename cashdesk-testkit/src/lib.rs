//! Test helpers for CashDesk ledger tests.
//!
//! Provides a controllable clock, tracing setup, seeding helpers for
//! members and memberships, and a store that fails on request.

mod failing;
mod helpers;

pub use failing::{FailPoint, FailingStore};
pub use helpers::{ManualClock, birthday, seed_member, seed_member_with_membership, start_instant};

use std::sync::{Arc, Once};

use anyhow::Result;
use cashdesk_ledger::{Ledger, LedgerConfig};
use cashdesk_store::MemoryStore;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static TRACING: Once = Once::new();

/// Install a tracing subscriber that writes through the test harness.
///
/// Honors `RUST_LOG`; defaults to `cashdesk_ledger=debug`. Safe to call
/// from every test.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("cashdesk_ledger=debug"));

        let _ = tracing_subscriber::registry()
            .with(fmt::layer().with_test_writer())
            .with(filter)
            .try_init();
    });
}

/// Initialized ledger over a fresh in-memory store, driven by a manual clock
/// that starts at [`start_instant`].
pub async fn setup_ledger() -> Result<(Ledger<MemoryStore>, Arc<ManualClock>)> {
    init_tracing();

    let clock = Arc::new(ManualClock::new(start_instant()));
    let ledger = Ledger::new(Arc::new(MemoryStore::new()), clock.clone(), LedgerConfig::test());
    ledger.initialize().await?;

    Ok((ledger, clock))
}

/// Initialized ledger over a [`FailingStore`] with nothing armed yet.
pub async fn setup_failing_ledger() -> Result<(Ledger<FailingStore>, Arc<ManualClock>)> {
    init_tracing();

    let clock = Arc::new(ManualClock::new(start_instant()));
    let ledger = Ledger::new(Arc::new(FailingStore::new()), clock.clone(), LedgerConfig::test());
    ledger.initialize().await?;

    Ok((ledger, clock))
}
