//! Tests for voucher numbering: counter tier, fallback tier, admin
//! override.

mod common;

use chrono::NaiveDate;
use ledger_rs::contracts::journal_voucher_v1::{JournalVoucherV1, VoucherLine};
use ledger_rs::contracts::voucher_type::VoucherType;
use ledger_rs::services::{numbering_service, posting_service};
use serial_test::serial;
use uuid::Uuid;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn balanced_payload(debit_ledger: Uuid, credit_ledger: Uuid, date: &str) -> JournalVoucherV1 {
    JournalVoucherV1 {
        entry_date: date.to_string(),
        reference: None,
        description: None,
        lines: vec![
            VoucherLine {
                ledger_id: debit_ledger,
                debit: 100.0,
                credit: 0.0,
                memo: None,
            },
            VoucherLine {
                ledger_id: credit_ledger,
                debit: 0.0,
                credit: 100.0,
                memo: None,
            },
        ],
    }
}

#[tokio::test]
#[serial]
#[ignore = "requires a PostgreSQL instance (set DATABASE_URL)"]
async fn test_counter_tier_issues_sequential_numbers() {
    let pool = common::get_test_pool().await;
    common::cleanup_all(&pool).await;

    let assets = common::setup_test_group(&pool, "AST", "asset").await;
    let cash = common::setup_test_ledger(&pool, assets, "CASH-01", 0, "debit").await;
    let sales = common::setup_test_ledger(&pool, assets, "SALES-01", 0, "credit").await;
    common::setup_test_year(&pool, "FY 2024-25", d(2024, 4, 1), d(2025, 3, 31), true).await;

    let payload = balanced_payload(cash, sales, "2024-06-01");

    let mut numbers = Vec::new();
    for _ in 0..3 {
        let posted = posting_service::post_journal(&pool, &payload, "tester")
            .await
            .unwrap();
        numbers.push(posted.entry_number);
    }

    assert_eq!(numbers, vec!["JRN-0001", "JRN-0002", "JRN-0003"]);
}

#[tokio::test]
#[serial]
#[ignore = "requires a PostgreSQL instance (set DATABASE_URL)"]
async fn test_counters_are_independent_per_voucher_type() {
    let pool = common::get_test_pool().await;
    common::cleanup_all(&pool).await;

    let assets = common::setup_test_group(&pool, "AST", "asset").await;
    let bank = common::setup_test_ledger(&pool, assets, "BANK-01", 0, "debit").await;
    let cash = common::setup_test_ledger(&pool, assets, "CASH-01", 0, "debit").await;
    let sales = common::setup_test_ledger(&pool, assets, "SALES-01", 0, "credit").await;
    common::setup_test_year(&pool, "FY 2024-25", d(2024, 4, 1), d(2025, 3, 31), true).await;

    let journal = posting_service::post_journal(
        &pool,
        &balanced_payload(cash, sales, "2024-06-01"),
        "tester",
    )
    .await
    .unwrap();
    assert_eq!(journal.entry_number, "JRN-0001");

    let contra = posting_service::post_contra(
        &pool,
        &ledger_rs::contracts::cash_vouchers_v1::ContraVoucherV1 {
            voucher_date: "2024-06-01".to_string(),
            reference: None,
            narration: None,
            to_ledger_id: bank,
            from_ledger_id: cash,
            amount: 50.0,
        },
        "tester",
    )
    .await
    .unwrap();
    assert_eq!(contra.entry_number, "CNT-0001");
}

#[tokio::test]
#[serial]
#[ignore = "requires a PostgreSQL instance (set DATABASE_URL)"]
async fn test_fallback_numbering_without_financial_year() {
    let pool = common::get_test_pool().await;
    common::cleanup_all(&pool).await;

    let assets = common::setup_test_group(&pool, "AST", "asset").await;
    let cash = common::setup_test_ledger(&pool, assets, "CASH-01", 0, "debit").await;
    let sales = common::setup_test_ledger(&pool, assets, "SALES-01", 0, "credit").await;
    // No financial year seeded: numbering degrades to the entry-scan tier

    let first = posting_service::post_journal(
        &pool,
        &balanced_payload(cash, sales, "2024-06-01"),
        "tester",
    )
    .await
    .unwrap();
    assert_eq!(first.entry_number, "JRN-000001");

    let second = posting_service::post_journal(
        &pool,
        &balanced_payload(cash, sales, "2024-06-02"),
        "tester",
    )
    .await
    .unwrap();
    assert_eq!(second.entry_number, "JRN-000002");
}

#[tokio::test]
#[serial]
#[ignore = "requires a PostgreSQL instance (set DATABASE_URL)"]
async fn test_counter_override_changes_prefix_and_resumes() {
    let pool = common::get_test_pool().await;
    common::cleanup_all(&pool).await;

    let assets = common::setup_test_group(&pool, "AST", "asset").await;
    let cash = common::setup_test_ledger(&pool, assets, "CASH-01", 0, "debit").await;
    let sales = common::setup_test_ledger(&pool, assets, "SALES-01", 0, "credit").await;
    let year =
        common::setup_test_year(&pool, "FY 2024-25", d(2024, 4, 1), d(2025, 3, 31), true).await;

    numbering_service::set_counter(&pool, VoucherType::Journal, year, "GEN", 99, None)
        .await
        .unwrap();

    let posted = posting_service::post_journal(
        &pool,
        &balanced_payload(cash, sales, "2024-06-01"),
        "tester",
    )
    .await
    .unwrap();
    assert_eq!(posted.entry_number, "GEN-0100");
}

#[tokio::test]
#[serial]
#[ignore = "requires a PostgreSQL instance (set DATABASE_URL)"]
async fn test_counter_override_with_suffix_switches_format() {
    let pool = common::get_test_pool().await;
    common::cleanup_all(&pool).await;

    let assets = common::setup_test_group(&pool, "AST", "asset").await;
    let cash = common::setup_test_ledger(&pool, assets, "CASH-01", 0, "debit").await;
    let sales = common::setup_test_ledger(&pool, assets, "SALES-01", 0, "credit").await;
    let year =
        common::setup_test_year(&pool, "FY 2024-25", d(2024, 4, 1), d(2025, 3, 31), true).await;

    numbering_service::set_counter(&pool, VoucherType::Journal, year, "JRN", 0, Some("24"))
        .await
        .unwrap();

    let posted = posting_service::post_journal(
        &pool,
        &balanced_payload(cash, sales, "2024-06-01"),
        "tester",
    )
    .await
    .unwrap();
    assert_eq!(posted.entry_number, "JRN-0001-24");
}
