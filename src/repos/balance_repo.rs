//! Repository for per-ledger, per-date balance snapshots
//!
//! Each row is a cumulative balance as of its date, not a daily movement.
//! Snapshots are materialized lazily on first posting for a date, inheriting
//! from the nearest earlier snapshot (or the ledger's opening balance).
//! Read-modify-write paths take `FOR UPDATE` row locks so concurrent postings
//! against the same ledger serialize instead of losing updates.

use chrono::NaiveDate;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use thiserror::Error;
use uuid::Uuid;

use crate::repos::ledger_repo::BalanceSide;

/// Ledger balance snapshot: cumulative as of balance_date
#[derive(Debug, Clone, FromRow)]
pub struct LedgerBalance {
    pub id: Uuid,
    pub ledger_id: Uuid,
    pub balance_date: NaiveDate,
    pub debit_balance_minor: i64,
    pub credit_balance_minor: i64,
    pub net_balance_minor: i64,
    pub balance_type: BalanceSide,
}

/// Errors that can occur during balance repository operations
#[derive(Debug, Error)]
pub enum BalanceError {
    #[error("Ledger not found: {0}")]
    LedgerNotFound(Uuid),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

const SELECT_COLS: &str = "id, ledger_id, balance_date, debit_balance_minor, \
     credit_balance_minor, net_balance_minor, balance_type";

/// Take the per-ledger posting lock on the ledgers row
///
/// The snapshot-row locks below only serialize postings when a row exists to
/// lock. On an empty series two concurrent first postings would both see no
/// snapshot and race into `insert_snapshot`, so the loser would hit the
/// (ledger_id, balance_date) unique index. Locking the ledgers row itself
/// serializes them regardless of snapshot state.
pub async fn lock_ledger(
    tx: &mut Transaction<'_, Postgres>,
    ledger_id: Uuid,
) -> Result<(), BalanceError> {
    sqlx::query("SELECT id FROM ledgers WHERE id = $1 FOR UPDATE")
        .bind(ledger_id)
        .execute(&mut **tx)
        .await?;

    Ok(())
}

/// Locked lookup of the snapshot for an exact (ledger, date)
pub async fn find_for_update(
    tx: &mut Transaction<'_, Postgres>,
    ledger_id: Uuid,
    date: NaiveDate,
) -> Result<Option<LedgerBalance>, BalanceError> {
    let balance = sqlx::query_as::<_, LedgerBalance>(&format!(
        "SELECT {SELECT_COLS} FROM ledger_balances \
         WHERE ledger_id = $1 AND balance_date = $2 \
         FOR UPDATE"
    ))
    .bind(ledger_id)
    .bind(date)
    .fetch_optional(&mut **tx)
    .await?;

    Ok(balance)
}

/// Locked lookup of the nearest snapshot strictly before `date`
pub async fn find_latest_before_for_update(
    tx: &mut Transaction<'_, Postgres>,
    ledger_id: Uuid,
    date: NaiveDate,
) -> Result<Option<LedgerBalance>, BalanceError> {
    let balance = sqlx::query_as::<_, LedgerBalance>(&format!(
        "SELECT {SELECT_COLS} FROM ledger_balances \
         WHERE ledger_id = $1 AND balance_date < $2 \
         ORDER BY balance_date DESC \
         LIMIT 1 \
         FOR UPDATE"
    ))
    .bind(ledger_id)
    .bind(date)
    .fetch_optional(&mut **tx)
    .await?;

    Ok(balance)
}

/// Latest snapshot on or before `date` (point-in-time balance lookup)
pub async fn find_latest_on_or_before(
    pool: &PgPool,
    ledger_id: Uuid,
    date: NaiveDate,
) -> Result<Option<LedgerBalance>, BalanceError> {
    let balance = sqlx::query_as::<_, LedgerBalance>(&format!(
        "SELECT {SELECT_COLS} FROM ledger_balances \
         WHERE ledger_id = $1 AND balance_date <= $2 \
         ORDER BY balance_date DESC \
         LIMIT 1"
    ))
    .bind(ledger_id)
    .bind(date)
    .fetch_optional(pool)
    .await?;

    Ok(balance)
}

/// Insert a snapshot with the given cumulative totals
///
/// Net and balance type are derived in SQL so the stored row can never
/// disagree with its own totals.
pub async fn insert_snapshot(
    tx: &mut Transaction<'_, Postgres>,
    ledger_id: Uuid,
    date: NaiveDate,
    debit_balance_minor: i64,
    credit_balance_minor: i64,
) -> Result<LedgerBalance, BalanceError> {
    let balance = sqlx::query_as::<_, LedgerBalance>(&format!(
        "INSERT INTO ledger_balances \
             (ledger_id, balance_date, debit_balance_minor, credit_balance_minor, \
              net_balance_minor, balance_type) \
         VALUES ($1, $2, $3, $4, $3 - $4, \
                 CASE WHEN $3 - $4 >= 0 \
                      THEN 'debit'::balance_side ELSE 'credit'::balance_side END) \
         RETURNING {SELECT_COLS}"
    ))
    .bind(ledger_id)
    .bind(date)
    .bind(debit_balance_minor)
    .bind(credit_balance_minor)
    .fetch_one(&mut **tx)
    .await?;

    Ok(balance)
}

/// Add deltas to a single snapshot's running totals
pub async fn add_to_snapshot(
    tx: &mut Transaction<'_, Postgres>,
    snapshot_id: Uuid,
    debit_delta_minor: i64,
    credit_delta_minor: i64,
) -> Result<LedgerBalance, BalanceError> {
    let balance = sqlx::query_as::<_, LedgerBalance>(&format!(
        "UPDATE ledger_balances \
         SET debit_balance_minor = debit_balance_minor + $2, \
             credit_balance_minor = credit_balance_minor + $3, \
             net_balance_minor = (debit_balance_minor + $2) - (credit_balance_minor + $3), \
             balance_type = CASE \
                 WHEN (debit_balance_minor + $2) - (credit_balance_minor + $3) >= 0 \
                 THEN 'debit'::balance_side ELSE 'credit'::balance_side END \
         WHERE id = $1 \
         RETURNING {SELECT_COLS}"
    ))
    .bind(snapshot_id)
    .bind(debit_delta_minor)
    .bind(credit_delta_minor)
    .fetch_one(&mut **tx)
    .await?;

    Ok(balance)
}

/// Ripple a delta forward through every materialized snapshot after `date`
///
/// Snapshots are cumulative, so a back-dated posting must shift every later
/// snapshot by the same delta. The uniform delta makes a single set-based
/// UPDATE equivalent to ascending date-order application.
pub async fn propagate_forward(
    tx: &mut Transaction<'_, Postgres>,
    ledger_id: Uuid,
    after_date: NaiveDate,
    debit_delta_minor: i64,
    credit_delta_minor: i64,
) -> Result<u64, BalanceError> {
    let result = sqlx::query(
        r#"
        UPDATE ledger_balances
        SET debit_balance_minor = debit_balance_minor + $3,
            credit_balance_minor = credit_balance_minor + $4,
            net_balance_minor = (debit_balance_minor + $3) - (credit_balance_minor + $4),
            balance_type = CASE
                WHEN (debit_balance_minor + $3) - (credit_balance_minor + $4) >= 0
                THEN 'debit'::balance_side ELSE 'credit'::balance_side END
        WHERE ledger_id = $1 AND balance_date > $2
        "#,
    )
    .bind(ledger_id)
    .bind(after_date)
    .bind(debit_delta_minor)
    .bind(credit_delta_minor)
    .execute(&mut **tx)
    .await?;

    Ok(result.rows_affected())
}

/// All snapshots of a ledger in date order (rebuild tool, tests)
pub async fn list_for_ledger(
    pool: &PgPool,
    ledger_id: Uuid,
) -> Result<Vec<LedgerBalance>, BalanceError> {
    let balances = sqlx::query_as::<_, LedgerBalance>(&format!(
        "SELECT {SELECT_COLS} FROM ledger_balances \
         WHERE ledger_id = $1 \
         ORDER BY balance_date"
    ))
    .bind(ledger_id)
    .fetch_all(pool)
    .await?;

    Ok(balances)
}

/// Drop a ledger's snapshot series (rebuild tool)
pub async fn delete_for_ledger(
    tx: &mut Transaction<'_, Postgres>,
    ledger_id: Uuid,
) -> Result<u64, BalanceError> {
    let result = sqlx::query("DELETE FROM ledger_balances WHERE ledger_id = $1")
        .bind(ledger_id)
        .execute(&mut **tx)
        .await?;

    Ok(result.rows_affected())
}
