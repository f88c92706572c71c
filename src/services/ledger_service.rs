//! Ledger master data the posting engine depends on
//!
//! Creation with code-uniqueness checks and the two-path delete: a ledger
//! referenced by any journal line cannot be removed; an unreferenced one is
//! deactivated. Snapshots are NOT seeded here; the balance store materializes
//! them lazily on first posting.

use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::repos::ledger_repo::{self, BalanceSide, Ledger, LedgerError};
use crate::repos::{group_repo, journal_repo};
use crate::services::balance_deltas::to_minor;

/// Errors that can occur during ledger master-data operations
#[derive(Debug, Error)]
pub enum LedgerServiceError {
    #[error("Ledger not found: {0}")]
    NotFound(Uuid),

    #[error("Ledger code already exists: {0}")]
    DuplicateCode(String),

    #[error("Account group not found: {0}")]
    GroupNotFound(Uuid),

    #[error("Ledger has journal lines and cannot be deleted: {0}")]
    HasTransactions(Uuid),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<LedgerError> for LedgerServiceError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::NotFound(id) | LedgerError::Inactive(id) => Self::NotFound(id),
            LedgerError::Database(e) => Self::Database(e),
        }
    }
}

impl From<group_repo::GroupError> for LedgerServiceError {
    fn from(err: group_repo::GroupError) -> Self {
        match err {
            group_repo::GroupError::NotFound(id) => Self::GroupNotFound(id),
            group_repo::GroupError::Database(e) => Self::Database(e),
        }
    }
}

/// Fields for creating a ledger
#[derive(Debug, Clone)]
pub struct NewLedger {
    pub code: String,
    pub name: String,
    pub group_id: Uuid,
    /// Opening balance magnitude in currency units
    pub opening_balance: f64,
    pub opening_balance_type: BalanceSide,
    pub address: Option<String>,
    pub contact_info: Option<String>,
}

pub async fn find(pool: &PgPool, id: Uuid) -> Result<Option<Ledger>, LedgerServiceError> {
    Ok(ledger_repo::find_by_id(pool, id).await?)
}

pub async fn find_by_code(pool: &PgPool, code: &str) -> Result<Option<Ledger>, LedgerServiceError> {
    Ok(ledger_repo::find_by_code(pool, code).await?)
}

pub async fn list_in_group(
    pool: &PgPool,
    group_id: Uuid,
) -> Result<Vec<Ledger>, LedgerServiceError> {
    Ok(ledger_repo::list_active_in_group(pool, group_id).await?)
}

/// Create a ledger under an existing group
pub async fn create(pool: &PgPool, ledger: NewLedger) -> Result<Ledger, LedgerServiceError> {
    if ledger_repo::find_by_code(pool, &ledger.code).await?.is_some() {
        return Err(LedgerServiceError::DuplicateCode(ledger.code));
    }

    if group_repo::find_by_id(pool, ledger.group_id).await?.is_none() {
        return Err(LedgerServiceError::GroupNotFound(ledger.group_id));
    }

    let created = ledger_repo::insert(
        pool,
        &ledger.code,
        &ledger.name,
        ledger.group_id,
        to_minor(ledger.opening_balance),
        ledger.opening_balance_type,
        ledger.address.as_deref(),
        ledger.contact_info.as_deref(),
    )
    .await?;

    tracing::info!(
        ledger_id = %created.id,
        code = %created.code,
        "Ledger created"
    );

    Ok(created)
}

/// Update mutable ledger fields, re-checking uniqueness on a code change
pub async fn update(pool: &PgPool, updated: Ledger) -> Result<(), LedgerServiceError> {
    let existing = ledger_repo::find_by_id(pool, updated.id)
        .await?
        .ok_or(LedgerServiceError::NotFound(updated.id))?;

    if existing.code != updated.code
        && ledger_repo::find_by_code(pool, &updated.code).await?.is_some()
    {
        return Err(LedgerServiceError::DuplicateCode(updated.code));
    }

    ledger_repo::update(
        pool,
        updated.id,
        &updated.code,
        &updated.name,
        updated.group_id,
        updated.address.as_deref(),
        updated.contact_info.as_deref(),
        updated.is_active,
    )
    .await?;

    Ok(())
}

/// Delete a ledger: rejected while journal lines reference it, otherwise
/// deactivated (the row stays for referential integrity)
pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), LedgerServiceError> {
    if ledger_repo::find_by_id(pool, id).await?.is_none() {
        return Err(LedgerServiceError::NotFound(id));
    }

    if journal_repo::ledger_has_lines(pool, id).await? {
        return Err(LedgerServiceError::HasTransactions(id));
    }

    ledger_repo::deactivate(pool, id).await?;

    tracing::info!(ledger_id = %id, "Ledger deactivated");

    Ok(())
}
