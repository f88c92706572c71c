//! Account group master data
//!
//! Classification tree for ledgers. The group type is fixed at creation;
//! deletion is refused while active ledgers reference the group.

use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::repos::group_repo::{self, AccountGroup, GroupError, GroupType};
use crate::repos::ledger_repo;

/// Errors that can occur during account group operations
#[derive(Debug, Error)]
pub enum GroupServiceError {
    #[error("Account group not found: {0}")]
    NotFound(Uuid),

    #[error("Group code already exists: {0}")]
    DuplicateCode(String),

    #[error("Group has active ledgers and cannot be deleted: {0}")]
    HasLedgers(Uuid),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<GroupError> for GroupServiceError {
    fn from(err: GroupError) -> Self {
        match err {
            GroupError::NotFound(id) => Self::NotFound(id),
            GroupError::Database(e) => Self::Database(e),
        }
    }
}

impl From<ledger_repo::LedgerError> for GroupServiceError {
    fn from(err: ledger_repo::LedgerError) -> Self {
        match err {
            ledger_repo::LedgerError::Database(e) => Self::Database(e),
            // Ledger lookups here are counts; id variants cannot surface
            ledger_repo::LedgerError::NotFound(id) | ledger_repo::LedgerError::Inactive(id) => {
                Self::NotFound(id)
            }
        }
    }
}

pub async fn find(pool: &PgPool, id: Uuid) -> Result<Option<AccountGroup>, GroupServiceError> {
    Ok(group_repo::find_by_id(pool, id).await?)
}

pub async fn list(pool: &PgPool) -> Result<Vec<AccountGroup>, GroupServiceError> {
    Ok(group_repo::list_active(pool).await?)
}

pub async fn list_by_type(
    pool: &PgPool,
    group_type: GroupType,
) -> Result<Vec<AccountGroup>, GroupServiceError> {
    Ok(group_repo::list_by_type(pool, group_type).await?)
}

/// Create a group with a code-uniqueness precondition check
pub async fn create(
    pool: &PgPool,
    code: &str,
    name: &str,
    group_type: GroupType,
    parent_group_id: Option<Uuid>,
) -> Result<AccountGroup, GroupServiceError> {
    if group_repo::find_by_code(pool, code).await?.is_some() {
        return Err(GroupServiceError::DuplicateCode(code.to_string()));
    }

    let created = group_repo::insert(pool, code, name, group_type, parent_group_id).await?;

    tracing::info!(group_id = %created.id, code = %created.code, "Account group created");

    Ok(created)
}

/// Update mutable group fields, re-checking uniqueness on a code change
pub async fn update(
    pool: &PgPool,
    id: Uuid,
    code: &str,
    name: &str,
    parent_group_id: Option<Uuid>,
    is_active: bool,
) -> Result<(), GroupServiceError> {
    let existing = group_repo::find_by_id(pool, id)
        .await?
        .ok_or(GroupServiceError::NotFound(id))?;

    if existing.code != code && group_repo::find_by_code(pool, code).await?.is_some() {
        return Err(GroupServiceError::DuplicateCode(code.to_string()));
    }

    group_repo::update(pool, id, code, name, parent_group_id, is_active).await?;

    Ok(())
}

/// Delete a group: refused while active ledgers reference it
pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), GroupServiceError> {
    if group_repo::find_by_id(pool, id).await?.is_none() {
        return Err(GroupServiceError::NotFound(id));
    }

    if ledger_repo::count_active_in_group(pool, id).await? > 0 {
        return Err(GroupServiceError::HasLedgers(id));
    }

    group_repo::deactivate(pool, id).await?;

    tracing::info!(group_id = %id, "Account group deactivated");

    Ok(())
}
