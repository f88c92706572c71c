use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use thiserror::Error;
use uuid::Uuid;

/// Group classification enum matching database group_type
#[derive(Debug, Clone, Copy, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "group_type", rename_all = "lowercase")]
pub enum GroupType {
    Asset,
    Liability,
    Equity,
    Income,
    Expense,
}

/// Account group model: a classification node in the chart of accounts tree
#[derive(Debug, Clone, FromRow)]
pub struct AccountGroup {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub group_type: GroupType,
    pub parent_group_id: Option<Uuid>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Errors that can occur during group repository operations
#[derive(Debug, Error)]
pub enum GroupError {
    #[error("Account group not found: {0}")]
    NotFound(Uuid),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<AccountGroup>, GroupError> {
    let group = sqlx::query_as::<_, AccountGroup>(
        r#"
        SELECT id, code, name, group_type, parent_group_id, is_active, created_at
        FROM account_groups
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(group)
}

pub async fn find_by_code(pool: &PgPool, code: &str) -> Result<Option<AccountGroup>, GroupError> {
    let group = sqlx::query_as::<_, AccountGroup>(
        r#"
        SELECT id, code, name, group_type, parent_group_id, is_active, created_at
        FROM account_groups
        WHERE code = $1
        "#,
    )
    .bind(code)
    .fetch_optional(pool)
    .await?;

    Ok(group)
}

/// List active groups ordered by code
pub async fn list_active(pool: &PgPool) -> Result<Vec<AccountGroup>, GroupError> {
    let groups = sqlx::query_as::<_, AccountGroup>(
        r#"
        SELECT id, code, name, group_type, parent_group_id, is_active, created_at
        FROM account_groups
        WHERE is_active = TRUE
        ORDER BY code
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(groups)
}

pub async fn list_by_type(
    pool: &PgPool,
    group_type: GroupType,
) -> Result<Vec<AccountGroup>, GroupError> {
    let groups = sqlx::query_as::<_, AccountGroup>(
        r#"
        SELECT id, code, name, group_type, parent_group_id, is_active, created_at
        FROM account_groups
        WHERE group_type = $1 AND is_active = TRUE
        ORDER BY code
        "#,
    )
    .bind(group_type)
    .fetch_all(pool)
    .await?;

    Ok(groups)
}

pub async fn insert(
    pool: &PgPool,
    code: &str,
    name: &str,
    group_type: GroupType,
    parent_group_id: Option<Uuid>,
) -> Result<AccountGroup, GroupError> {
    let group = sqlx::query_as::<_, AccountGroup>(
        r#"
        INSERT INTO account_groups (code, name, group_type, parent_group_id)
        VALUES ($1, $2, $3, $4)
        RETURNING id, code, name, group_type, parent_group_id, is_active, created_at
        "#,
    )
    .bind(code)
    .bind(name)
    .bind(group_type)
    .bind(parent_group_id)
    .fetch_one(pool)
    .await?;

    Ok(group)
}

/// Update mutable group fields; the group type is fixed at creation
pub async fn update(
    pool: &PgPool,
    id: Uuid,
    code: &str,
    name: &str,
    parent_group_id: Option<Uuid>,
    is_active: bool,
) -> Result<u64, GroupError> {
    let result = sqlx::query(
        r#"
        UPDATE account_groups
        SET code = $2, name = $3, parent_group_id = $4, is_active = $5
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(code)
    .bind(name)
    .bind(parent_group_id)
    .bind(is_active)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

/// Soft-delete a group
pub async fn deactivate(pool: &PgPool, id: Uuid) -> Result<u64, GroupError> {
    let result = sqlx::query("UPDATE account_groups SET is_active = FALSE WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}
