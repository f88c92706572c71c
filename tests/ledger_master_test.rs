//! Tests for the chart-of-accounts master data: groups and ledgers,
//! uniqueness checks, guarded deletion.

mod common;

use chrono::NaiveDate;
use ledger_rs::contracts::journal_voucher_v1::{JournalVoucherV1, VoucherLine};
use ledger_rs::repos::group_repo::GroupType;
use ledger_rs::repos::ledger_repo::BalanceSide;
use ledger_rs::services::account_group_service::{self, GroupServiceError};
use ledger_rs::services::ledger_service::{self, LedgerServiceError, NewLedger};
use ledger_rs::services::posting_service;
use serial_test::serial;
use uuid::Uuid;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn new_ledger(code: &str, group_id: Uuid) -> NewLedger {
    NewLedger {
        code: code.to_string(),
        name: format!("Ledger {}", code),
        group_id,
        opening_balance: 0.0,
        opening_balance_type: BalanceSide::Debit,
        address: None,
        contact_info: None,
    }
}

#[tokio::test]
#[serial]
#[ignore = "requires a PostgreSQL instance (set DATABASE_URL)"]
async fn test_create_ledger_with_opening_balance() {
    let pool = common::get_test_pool().await;
    common::cleanup_all(&pool).await;

    let group = account_group_service::create(&pool, "AST", "Assets", GroupType::Asset, None)
        .await
        .unwrap();

    let created = ledger_service::create(
        &pool,
        NewLedger {
            code: "BANK-01".to_string(),
            name: "Main bank account".to_string(),
            group_id: group.id,
            opening_balance: 1500.50,
            opening_balance_type: BalanceSide::Debit,
            address: None,
            contact_info: Some("bank@example.com".to_string()),
        },
    )
    .await
    .unwrap();

    assert_eq!(created.opening_balance_minor, 150_050);
    assert_eq!(created.signed_opening_minor(), 150_050);
    assert!(created.is_active);
}

#[tokio::test]
#[serial]
#[ignore = "requires a PostgreSQL instance (set DATABASE_URL)"]
async fn test_duplicate_ledger_code_rejected() {
    let pool = common::get_test_pool().await;
    common::cleanup_all(&pool).await;

    let group = account_group_service::create(&pool, "AST", "Assets", GroupType::Asset, None)
        .await
        .unwrap();

    ledger_service::create(&pool, new_ledger("CASH-01", group.id))
        .await
        .unwrap();

    let dup = ledger_service::create(&pool, new_ledger("CASH-01", group.id)).await;
    assert!(matches!(dup, Err(LedgerServiceError::DuplicateCode(_))));
}

#[tokio::test]
#[serial]
#[ignore = "requires a PostgreSQL instance (set DATABASE_URL)"]
async fn test_ledger_creation_requires_existing_group() {
    let pool = common::get_test_pool().await;
    common::cleanup_all(&pool).await;

    let ghost_group = Uuid::new_v4();
    let result = ledger_service::create(&pool, new_ledger("CASH-01", ghost_group)).await;
    assert!(matches!(
        result,
        Err(LedgerServiceError::GroupNotFound(id)) if id == ghost_group
    ));
}

#[tokio::test]
#[serial]
#[ignore = "requires a PostgreSQL instance (set DATABASE_URL)"]
async fn test_ledger_with_journal_lines_cannot_be_deleted() {
    let pool = common::get_test_pool().await;
    common::cleanup_all(&pool).await;

    let group = account_group_service::create(&pool, "AST", "Assets", GroupType::Asset, None)
        .await
        .unwrap();
    let cash = ledger_service::create(&pool, new_ledger("CASH-01", group.id))
        .await
        .unwrap();
    let sales = ledger_service::create(&pool, new_ledger("SALES-01", group.id))
        .await
        .unwrap();
    common::setup_test_year(&pool, "FY 2024-25", d(2024, 4, 1), d(2025, 3, 31), true).await;

    let payload = JournalVoucherV1 {
        entry_date: "2024-06-01".to_string(),
        reference: None,
        description: None,
        lines: vec![
            VoucherLine {
                ledger_id: cash.id,
                debit: 100.0,
                credit: 0.0,
                memo: None,
            },
            VoucherLine {
                ledger_id: sales.id,
                debit: 0.0,
                credit: 100.0,
                memo: None,
            },
        ],
    };
    posting_service::post_journal(&pool, &payload, "tester")
        .await
        .unwrap();

    let blocked = ledger_service::delete(&pool, cash.id).await;
    assert!(matches!(
        blocked,
        Err(LedgerServiceError::HasTransactions(id)) if id == cash.id
    ));

    // Still active after the refused delete
    let refreshed = ledger_service::find(&pool, cash.id).await.unwrap().unwrap();
    assert!(refreshed.is_active);
}

#[tokio::test]
#[serial]
#[ignore = "requires a PostgreSQL instance (set DATABASE_URL)"]
async fn test_unused_ledger_delete_deactivates() {
    let pool = common::get_test_pool().await;
    common::cleanup_all(&pool).await;

    let group = account_group_service::create(&pool, "AST", "Assets", GroupType::Asset, None)
        .await
        .unwrap();
    let ledger = ledger_service::create(&pool, new_ledger("TEMP-01", group.id))
        .await
        .unwrap();

    ledger_service::delete(&pool, ledger.id).await.unwrap();

    let refreshed = ledger_service::find(&pool, ledger.id).await.unwrap().unwrap();
    assert!(!refreshed.is_active);
}

#[tokio::test]
#[serial]
#[ignore = "requires a PostgreSQL instance (set DATABASE_URL)"]
async fn test_group_with_active_ledgers_cannot_be_deleted() {
    let pool = common::get_test_pool().await;
    common::cleanup_all(&pool).await;

    let group = account_group_service::create(&pool, "AST", "Assets", GroupType::Asset, None)
        .await
        .unwrap();
    let ledger = ledger_service::create(&pool, new_ledger("CASH-01", group.id))
        .await
        .unwrap();

    let blocked = account_group_service::delete(&pool, group.id).await;
    assert!(matches!(
        blocked,
        Err(GroupServiceError::HasLedgers(id)) if id == group.id
    ));

    // Deactivating the ledger unblocks the group
    ledger_service::delete(&pool, ledger.id).await.unwrap();
    account_group_service::delete(&pool, group.id).await.unwrap();

    let refreshed = account_group_service::find(&pool, group.id)
        .await
        .unwrap()
        .unwrap();
    assert!(!refreshed.is_active);
}

#[tokio::test]
#[serial]
#[ignore = "requires a PostgreSQL instance (set DATABASE_URL)"]
async fn test_duplicate_group_code_rejected() {
    let pool = common::get_test_pool().await;
    common::cleanup_all(&pool).await;

    account_group_service::create(&pool, "AST", "Assets", GroupType::Asset, None)
        .await
        .unwrap();

    let dup =
        account_group_service::create(&pool, "AST", "Assets again", GroupType::Asset, None).await;
    assert!(matches!(dup, Err(GroupServiceError::DuplicateCode(_))));
}
