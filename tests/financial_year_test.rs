//! Tests for the financial year registry: single-active invariant,
//! terminal close, closed-period posting refusal.

mod common;

use chrono::NaiveDate;
use ledger_rs::contracts::journal_voucher_v1::{JournalVoucherV1, VoucherLine};
use ledger_rs::services::financial_year_service::{self, FinancialYearError, NewFinancialYear};
use ledger_rs::services::posting_service;
use ledger_rs::PostingError;
use serial_test::serial;
use uuid::Uuid;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn new_year(name: &str, start: NaiveDate, end: NaiveDate, is_active: bool) -> NewFinancialYear {
    NewFinancialYear {
        year_name: name.to_string(),
        start_date: start,
        end_date: end,
        is_active,
        notes: None,
        created_by: Some("tester".to_string()),
    }
}

#[tokio::test]
#[serial]
#[ignore = "requires a PostgreSQL instance (set DATABASE_URL)"]
async fn test_creating_active_year_deactivates_previous() {
    let pool = common::get_test_pool().await;
    common::cleanup_all(&pool).await;

    let first = financial_year_service::create(
        &pool,
        new_year("FY 2023-24", d(2023, 4, 1), d(2024, 3, 31), true),
    )
    .await
    .unwrap();
    assert!(first.is_active);

    let second = financial_year_service::create(
        &pool,
        new_year("FY 2024-25", d(2024, 4, 1), d(2025, 3, 31), true),
    )
    .await
    .unwrap();
    assert!(second.is_active);

    let active = financial_year_service::get_active(&pool).await.unwrap();
    assert_eq!(active.map(|y| y.id), Some(second.id));

    let refreshed = financial_year_service::find(&pool, first.id)
        .await
        .unwrap()
        .unwrap();
    assert!(!refreshed.is_active);
}

#[tokio::test]
#[serial]
#[ignore = "requires a PostgreSQL instance (set DATABASE_URL)"]
async fn test_duplicate_year_name_rejected() {
    let pool = common::get_test_pool().await;
    common::cleanup_all(&pool).await;

    financial_year_service::create(
        &pool,
        new_year("FY 2024-25", d(2024, 4, 1), d(2025, 3, 31), true),
    )
    .await
    .unwrap();

    let dup = financial_year_service::create(
        &pool,
        new_year("FY 2024-25", d(2025, 4, 1), d(2026, 3, 31), false),
    )
    .await;
    assert!(matches!(dup, Err(FinancialYearError::DuplicateName(_))));
}

#[tokio::test]
#[serial]
#[ignore = "requires a PostgreSQL instance (set DATABASE_URL)"]
async fn test_set_active_switches_and_rejects_unknown_id() {
    let pool = common::get_test_pool().await;
    common::cleanup_all(&pool).await;

    financial_year_service::create(
        &pool,
        new_year("FY 2023-24", d(2023, 4, 1), d(2024, 3, 31), true),
    )
    .await
    .unwrap();
    let second = financial_year_service::create(
        &pool,
        new_year("FY 2024-25", d(2024, 4, 1), d(2025, 3, 31), false),
    )
    .await
    .unwrap();

    financial_year_service::set_active(&pool, second.id)
        .await
        .unwrap();

    let active = financial_year_service::get_active(&pool).await.unwrap();
    assert_eq!(active.map(|y| y.id), Some(second.id));

    // Unknown id rolls back, the current active flag survives
    let missing = financial_year_service::set_active(&pool, Uuid::new_v4()).await;
    assert!(matches!(missing, Err(FinancialYearError::NotFound(_))));

    let still_active = financial_year_service::get_active(&pool).await.unwrap();
    assert_eq!(still_active.map(|y| y.id), Some(second.id));
}

#[tokio::test]
#[serial]
#[ignore = "requires a PostgreSQL instance (set DATABASE_URL)"]
async fn test_closed_year_refuses_postings() {
    let pool = common::get_test_pool().await;
    common::cleanup_all(&pool).await;

    let assets = common::setup_test_group(&pool, "AST", "asset").await;
    let cash = common::setup_test_ledger(&pool, assets, "CASH-01", 0, "debit").await;
    let sales = common::setup_test_ledger(&pool, assets, "SALES-01", 0, "credit").await;

    let closed_year = financial_year_service::create(
        &pool,
        new_year("FY 2023-24", d(2023, 4, 1), d(2024, 3, 31), false),
    )
    .await
    .unwrap();
    financial_year_service::create(
        &pool,
        new_year("FY 2024-25", d(2024, 4, 1), d(2025, 3, 31), true),
    )
    .await
    .unwrap();

    financial_year_service::close(&pool, closed_year.id)
        .await
        .unwrap();

    let payload = JournalVoucherV1 {
        entry_date: "2023-06-01".to_string(),
        reference: None,
        description: None,
        lines: vec![
            VoucherLine {
                ledger_id: cash,
                debit: 100.0,
                credit: 0.0,
                memo: None,
            },
            VoucherLine {
                ledger_id: sales,
                debit: 0.0,
                credit: 100.0,
                memo: None,
            },
        ],
    };

    let result = posting_service::post_journal(&pool, &payload, "tester").await;
    assert!(matches!(result, Err(PostingError::YearClosed(id)) if id == closed_year.id));
}

#[tokio::test]
#[serial]
#[ignore = "requires a PostgreSQL instance (set DATABASE_URL)"]
async fn test_close_unknown_year_not_found() {
    let pool = common::get_test_pool().await;
    common::cleanup_all(&pool).await;

    let missing = financial_year_service::close(&pool, Uuid::new_v4()).await;
    assert!(matches!(missing, Err(FinancialYearError::NotFound(_))));
}
