//! Failed store writes leave the ledger exactly as it was.
//!
//! Run with: `cargo test -p cashdesk-ledger --test store_failures`

use cashdesk_ledger::ErrorKind;
use cashdesk_testkit::{
    birthday, seed_member, seed_member_with_membership, setup_failing_ledger, FailPoint,
};
use chrono::Duration;
use rust_decimal_macros::dec;

#[tokio::test]
async fn test_failed_delete_keeps_member_memberships_and_deposits() -> anyhow::Result<()> {
    let (ledger, clock) = setup_failing_ledger().await?;
    let (id, _) = seed_member_with_membership(&ledger, "Turing").await?;
    ledger.deposit(id, dec!(50)).await?;
    clock.advance(Duration::days(1));
    ledger.cancel_membership(id).await?;
    clock.advance(Duration::days(1));
    ledger.join_member(id).await?;
    ledger.deposit(id, dec!(5)).await?;

    let memberships_before = ledger.memberships(id).await?;
    let stats_before = ledger.deposit_statistics().await?;

    ledger.store().fail_on(FailPoint::MemberDelete);
    let err = ledger.delete_member(id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Store);

    let store = ledger.store().inner();
    assert_eq!(store.member_count(), 1);
    assert_eq!(store.membership_count(), 2);
    assert_eq!(store.deposit_count(), 2);
    assert_eq!(ledger.memberships(id).await?, memberships_before);
    assert_eq!(ledger.deposit_statistics().await?, stats_before);

    ledger.store().recover(FailPoint::MemberDelete);
    ledger.delete_member(id).await?;
    assert_eq!(store.member_count(), 0);
    assert_eq!(store.membership_count(), 0);
    assert_eq!(store.deposit_count(), 0);
    Ok(())
}

#[tokio::test]
async fn test_failed_registration_leaves_name_free() -> anyhow::Result<()> {
    let (ledger, _) = setup_failing_ledger().await?;

    ledger.store().fail_on(FailPoint::MemberInsert);
    let err = ledger.add_member("Alan", "Turing", birthday()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Store);
    assert!(ledger.list_members().await?.is_empty());

    ledger.store().recover(FailPoint::MemberInsert);
    ledger.add_member("Alan", "Turing", birthday()).await?;
    assert_eq!(ledger.store().inner().member_count(), 1);
    Ok(())
}

#[tokio::test]
async fn test_failed_join_creates_no_membership() -> anyhow::Result<()> {
    let (ledger, _) = setup_failing_ledger().await?;
    let id = seed_member(&ledger, "Turing").await?;

    ledger.store().fail_on(FailPoint::MembershipInsert);
    assert_eq!(ledger.join_member(id).await.unwrap_err().kind(), ErrorKind::Store);
    assert_eq!(ledger.store().inner().membership_count(), 0);
    assert!(ledger.active_membership(id).await?.is_none());

    ledger.store().recover(FailPoint::MembershipInsert);
    ledger.join_member(id).await?;
    assert_eq!(ledger.store().inner().membership_count(), 1);
    Ok(())
}

#[tokio::test]
async fn test_failed_cancel_keeps_membership_open() -> anyhow::Result<()> {
    let (ledger, clock) = setup_failing_ledger().await?;
    let (id, joined) = seed_member_with_membership(&ledger, "Turing").await?;
    clock.advance(Duration::hours(2));

    ledger.store().fail_on(FailPoint::MembershipUpdate);
    assert_eq!(ledger.cancel_membership(id).await.unwrap_err().kind(), ErrorKind::Store);

    let active = ledger.active_membership(id).await?;
    assert_eq!(active, Some(joined));
    assert!(ledger.memberships(id).await?.iter().all(|m| m.is_open()));
    Ok(())
}

#[tokio::test]
async fn test_failed_deposit_records_nothing() -> anyhow::Result<()> {
    let (ledger, _) = setup_failing_ledger().await?;
    let (id, _) = seed_member_with_membership(&ledger, "Turing").await?;
    ledger.deposit(id, dec!(10)).await?;

    ledger.store().fail_on(FailPoint::DepositInsert);
    assert_eq!(ledger.deposit(id, dec!(90)).await.unwrap_err().kind(), ErrorKind::Store);

    assert_eq!(ledger.store().inner().deposit_count(), 1);
    let stats = ledger.deposit_statistics().await?;
    assert_eq!(stats.len(), 1);
    assert_eq!(stats[0].total_amount, dec!(10));
    Ok(())
}
