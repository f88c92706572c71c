use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use thiserror::Error;
use uuid::Uuid;

/// Debit/credit side enum matching database balance_side
#[derive(Debug, Clone, Copy, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "balance_side", rename_all = "lowercase")]
pub enum BalanceSide {
    Debit,
    Credit,
}

/// Ledger model: a named account in the chart of accounts
#[derive(Debug, Clone, FromRow)]
pub struct Ledger {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub group_id: Uuid,
    pub opening_balance_minor: i64,
    pub opening_balance_type: BalanceSide,
    pub is_active: bool,
    pub address: Option<String>,
    pub contact_info: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Ledger {
    /// Opening balance under the debit-positive sign convention
    pub fn signed_opening_minor(&self) -> i64 {
        match self.opening_balance_type {
            BalanceSide::Debit => self.opening_balance_minor,
            BalanceSide::Credit => -self.opening_balance_minor,
        }
    }
}

/// Errors that can occur during ledger repository operations
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Ledger not found: {0}")]
    NotFound(Uuid),

    #[error("Ledger is inactive: {0}")]
    Inactive(Uuid),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

const SELECT_COLS: &str = "id, code, name, group_id, opening_balance_minor, \
     opening_balance_type, is_active, address, contact_info, created_at";

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Ledger>, LedgerError> {
    let ledger = sqlx::query_as::<_, Ledger>(&format!(
        "SELECT {SELECT_COLS} FROM ledgers WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(ledger)
}

pub async fn find_by_id_tx(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
) -> Result<Option<Ledger>, LedgerError> {
    let ledger = sqlx::query_as::<_, Ledger>(&format!(
        "SELECT {SELECT_COLS} FROM ledgers WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(&mut **tx)
    .await?;

    Ok(ledger)
}

pub async fn find_by_code(pool: &PgPool, code: &str) -> Result<Option<Ledger>, LedgerError> {
    let ledger = sqlx::query_as::<_, Ledger>(&format!(
        "SELECT {SELECT_COLS} FROM ledgers WHERE code = $1"
    ))
    .bind(code)
    .fetch_optional(pool)
    .await?;

    Ok(ledger)
}

/// Find an active ledger within a transaction
/// Returns an error if the ledger doesn't exist or is inactive
pub async fn find_active_by_id_tx(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
) -> Result<Ledger, LedgerError> {
    let ledger = find_by_id_tx(tx, id).await?;

    match ledger {
        Some(l) if l.is_active => Ok(l),
        Some(_) => Err(LedgerError::Inactive(id)),
        None => Err(LedgerError::NotFound(id)),
    }
}

/// List active ledgers of a group ordered by code
pub async fn list_active_in_group(
    pool: &PgPool,
    group_id: Uuid,
) -> Result<Vec<Ledger>, LedgerError> {
    let ledgers = sqlx::query_as::<_, Ledger>(&format!(
        "SELECT {SELECT_COLS} FROM ledgers \
         WHERE group_id = $1 AND is_active = TRUE ORDER BY code"
    ))
    .bind(group_id)
    .fetch_all(pool)
    .await?;

    Ok(ledgers)
}

pub async fn count_active_in_group(pool: &PgPool, group_id: Uuid) -> Result<i64, LedgerError> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM ledgers WHERE group_id = $1 AND is_active = TRUE",
    )
    .bind(group_id)
    .fetch_one(pool)
    .await?;

    Ok(count)
}

#[allow(clippy::too_many_arguments)]
pub async fn insert(
    pool: &PgPool,
    code: &str,
    name: &str,
    group_id: Uuid,
    opening_balance_minor: i64,
    opening_balance_type: BalanceSide,
    address: Option<&str>,
    contact_info: Option<&str>,
) -> Result<Ledger, LedgerError> {
    let ledger = sqlx::query_as::<_, Ledger>(&format!(
        "INSERT INTO ledgers \
             (code, name, group_id, opening_balance_minor, opening_balance_type, \
              address, contact_info) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) \
         RETURNING {SELECT_COLS}"
    ))
    .bind(code)
    .bind(name)
    .bind(group_id)
    .bind(opening_balance_minor)
    .bind(opening_balance_type)
    .bind(address)
    .bind(contact_info)
    .fetch_one(pool)
    .await?;

    Ok(ledger)
}

/// Update mutable ledger fields; the opening balance is fixed at creation
#[allow(clippy::too_many_arguments)]
pub async fn update(
    pool: &PgPool,
    id: Uuid,
    code: &str,
    name: &str,
    group_id: Uuid,
    address: Option<&str>,
    contact_info: Option<&str>,
    is_active: bool,
) -> Result<u64, LedgerError> {
    let result = sqlx::query(
        r#"
        UPDATE ledgers
        SET code = $2, name = $3, group_id = $4, address = $5,
            contact_info = $6, is_active = $7
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(code)
    .bind(name)
    .bind(group_id)
    .bind(address)
    .bind(contact_info)
    .bind(is_active)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

/// Soft-delete a ledger
pub async fn deactivate(pool: &PgPool, id: Uuid) -> Result<u64, LedgerError> {
    let result = sqlx::query("UPDATE ledgers SET is_active = FALSE WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}
