//! Repository for financial year operations
//!
//! The registry holds a single addressable "active year" record: at most one
//! year may be active and open at a time, enforced by the service-level
//! deactivate-all-then-activate transaction.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use thiserror::Error;
use uuid::Uuid;

/// Financial year model: the accounting period scoping voucher numbering
#[derive(Debug, Clone, FromRow)]
pub struct FinancialYear {
    pub id: Uuid,
    pub year_name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub is_active: bool,
    pub is_closed: bool,
    pub notes: Option<String>,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Errors that can occur during financial year repository operations
#[derive(Debug, Error)]
pub enum YearError {
    #[error("Financial year not found: {0}")]
    NotFound(Uuid),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

const SELECT_COLS: &str =
    "id, year_name, start_date, end_date, is_active, is_closed, notes, created_by, created_at";

/// Fetch the single active, open year (if any)
pub async fn find_active(pool: &PgPool) -> Result<Option<FinancialYear>, YearError> {
    let year = sqlx::query_as::<_, FinancialYear>(&format!(
        "SELECT {SELECT_COLS} FROM financial_years \
         WHERE is_active = TRUE AND is_closed = FALSE \
         LIMIT 1"
    ))
    .fetch_optional(pool)
    .await?;

    Ok(year)
}

pub async fn find_active_tx(
    tx: &mut Transaction<'_, Postgres>,
) -> Result<Option<FinancialYear>, YearError> {
    let year = sqlx::query_as::<_, FinancialYear>(&format!(
        "SELECT {SELECT_COLS} FROM financial_years \
         WHERE is_active = TRUE AND is_closed = FALSE \
         LIMIT 1"
    ))
    .fetch_optional(&mut **tx)
    .await?;

    Ok(year)
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<FinancialYear>, YearError> {
    let year = sqlx::query_as::<_, FinancialYear>(&format!(
        "SELECT {SELECT_COLS} FROM financial_years WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(year)
}

pub async fn find_by_name(pool: &PgPool, year_name: &str) -> Result<Option<FinancialYear>, YearError> {
    let year = sqlx::query_as::<_, FinancialYear>(&format!(
        "SELECT {SELECT_COLS} FROM financial_years WHERE year_name = $1"
    ))
    .bind(year_name)
    .fetch_optional(pool)
    .await?;

    Ok(year)
}

/// Find the year whose [start_date, end_date] range contains the given date
pub async fn find_containing_date_tx(
    tx: &mut Transaction<'_, Postgres>,
    date: NaiveDate,
) -> Result<Option<FinancialYear>, YearError> {
    let year = sqlx::query_as::<_, FinancialYear>(&format!(
        "SELECT {SELECT_COLS} FROM financial_years \
         WHERE start_date <= $1 AND end_date >= $1 \
         LIMIT 1"
    ))
    .bind(date)
    .fetch_optional(&mut **tx)
    .await?;

    Ok(year)
}

pub async fn find_containing_date(
    pool: &PgPool,
    date: NaiveDate,
) -> Result<Option<FinancialYear>, YearError> {
    let year = sqlx::query_as::<_, FinancialYear>(&format!(
        "SELECT {SELECT_COLS} FROM financial_years \
         WHERE start_date <= $1 AND end_date >= $1 \
         LIMIT 1"
    ))
    .bind(date)
    .fetch_optional(pool)
    .await?;

    Ok(year)
}

/// List all years, most recent first
pub async fn list(pool: &PgPool) -> Result<Vec<FinancialYear>, YearError> {
    let years = sqlx::query_as::<_, FinancialYear>(&format!(
        "SELECT {SELECT_COLS} FROM financial_years ORDER BY start_date DESC"
    ))
    .fetch_all(pool)
    .await?;

    Ok(years)
}

pub async fn insert_tx(
    tx: &mut Transaction<'_, Postgres>,
    year_name: &str,
    start_date: NaiveDate,
    end_date: NaiveDate,
    is_active: bool,
    notes: Option<&str>,
    created_by: Option<&str>,
) -> Result<FinancialYear, YearError> {
    let year = sqlx::query_as::<_, FinancialYear>(&format!(
        "INSERT INTO financial_years \
             (year_name, start_date, end_date, is_active, notes, created_by) \
         VALUES ($1, $2, $3, $4, $5, $6) \
         RETURNING {SELECT_COLS}"
    ))
    .bind(year_name)
    .bind(start_date)
    .bind(end_date)
    .bind(is_active)
    .bind(notes)
    .bind(created_by)
    .fetch_one(&mut **tx)
    .await?;

    Ok(year)
}

/// Deactivate every year (first half of the set-active transaction)
pub async fn deactivate_all_tx(tx: &mut Transaction<'_, Postgres>) -> Result<u64, YearError> {
    let result = sqlx::query("UPDATE financial_years SET is_active = FALSE")
        .execute(&mut **tx)
        .await?;

    Ok(result.rows_affected())
}

/// Activate a single year; returns the number of rows touched (0 = not found)
pub async fn activate_tx(tx: &mut Transaction<'_, Postgres>, id: Uuid) -> Result<u64, YearError> {
    let result = sqlx::query("UPDATE financial_years SET is_active = TRUE WHERE id = $1")
        .bind(id)
        .execute(&mut **tx)
        .await?;

    Ok(result.rows_affected())
}

/// Close a year: terminal, also clears the active flag
pub async fn close(pool: &PgPool, id: Uuid) -> Result<u64, YearError> {
    let result =
        sqlx::query("UPDATE financial_years SET is_closed = TRUE, is_active = FALSE WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

    Ok(result.rows_affected())
}
