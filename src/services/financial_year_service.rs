//! Financial period registry
//!
//! Tracks financial years, which one is active, and closed state. At most
//! one year is active and open at a time; activation deactivates the rest
//! inside one transaction. Closing is terminal.

use chrono::NaiveDate;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::repos::financial_year_repo::{self, FinancialYear, YearError};

/// Errors that can occur during financial year operations
#[derive(Debug, Error)]
pub enum FinancialYearError {
    #[error("Financial year not found: {0}")]
    NotFound(Uuid),

    #[error("Financial year name already exists: {0}")]
    DuplicateName(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<YearError> for FinancialYearError {
    fn from(err: YearError) -> Self {
        match err {
            YearError::NotFound(id) => Self::NotFound(id),
            YearError::Database(e) => Self::Database(e),
        }
    }
}

/// Fields for creating a financial year
#[derive(Debug, Clone)]
pub struct NewFinancialYear {
    pub year_name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub is_active: bool,
    pub notes: Option<String>,
    pub created_by: Option<String>,
}

/// The single active, open year (if any)
pub async fn get_active(pool: &PgPool) -> Result<Option<FinancialYear>, FinancialYearError> {
    Ok(financial_year_repo::find_active(pool).await?)
}

pub async fn find(pool: &PgPool, id: Uuid) -> Result<Option<FinancialYear>, FinancialYearError> {
    Ok(financial_year_repo::find_by_id(pool, id).await?)
}

/// All years, most recent first
pub async fn list(pool: &PgPool) -> Result<Vec<FinancialYear>, FinancialYearError> {
    Ok(financial_year_repo::list(pool).await?)
}

/// The year whose date range contains `date`
pub async fn year_for_date(
    pool: &PgPool,
    date: NaiveDate,
) -> Result<Option<FinancialYear>, FinancialYearError> {
    Ok(financial_year_repo::find_containing_date(pool, date).await?)
}

/// Create a financial year
///
/// The name-uniqueness precondition is a check, not a hard constraint, so a
/// concurrent create of the same name can still race past it.
pub async fn create(
    pool: &PgPool,
    year: NewFinancialYear,
) -> Result<FinancialYear, FinancialYearError> {
    if financial_year_repo::find_by_name(pool, &year.year_name)
        .await?
        .is_some()
    {
        return Err(FinancialYearError::DuplicateName(year.year_name));
    }

    let mut tx = pool.begin().await?;

    if year.is_active {
        financial_year_repo::deactivate_all_tx(&mut tx).await?;
    }

    let created = financial_year_repo::insert_tx(
        &mut tx,
        &year.year_name,
        year.start_date,
        year.end_date,
        year.is_active,
        year.notes.as_deref(),
        year.created_by.as_deref(),
    )
    .await?;

    tx.commit().await?;

    tracing::info!(
        financial_year_id = %created.id,
        year_name = %created.year_name,
        is_active = created.is_active,
        "Financial year created"
    );

    Ok(created)
}

/// Make `id` the single active year
///
/// Deactivate-all then activate, in one transaction; an unknown id rolls the
/// deactivation back and returns NotFound so the active flag never vanishes.
/// Does not check the closed flag, so a closed year can be reactivated.
pub async fn set_active(pool: &PgPool, id: Uuid) -> Result<(), FinancialYearError> {
    let mut tx = pool.begin().await?;

    financial_year_repo::deactivate_all_tx(&mut tx).await?;
    let touched = financial_year_repo::activate_tx(&mut tx, id).await?;

    if touched == 0 {
        tx.rollback().await?;
        return Err(FinancialYearError::NotFound(id));
    }

    tx.commit().await?;

    tracing::info!(financial_year_id = %id, "Financial year activated");

    Ok(())
}

/// Close a year: terminal, clears the active flag
pub async fn close(pool: &PgPool, id: Uuid) -> Result<(), FinancialYearError> {
    let touched = financial_year_repo::close(pool, id).await?;

    if touched == 0 {
        return Err(FinancialYearError::NotFound(id));
    }

    tracing::info!(financial_year_id = %id, "Financial year closed");

    Ok(())
}
