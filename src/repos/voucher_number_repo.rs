//! Repository for voucher number counters
//!
//! One counter row per (voucher_type, financial_year_id). The increment is an
//! atomic upsert so two concurrent postings can never be handed the same
//! number; a rollback after the increment leaves a gap, which is tolerated.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::contracts::voucher_type::VoucherType;

/// Voucher number counter state
#[derive(Debug, Clone, FromRow)]
pub struct VoucherNumber {
    pub id: Uuid,
    pub voucher_type: VoucherType,
    pub financial_year_id: Uuid,
    pub prefix: String,
    pub current_number: i32,
    pub suffix: Option<String>,
    pub format: String,
    pub created_at: DateTime<Utc>,
    pub modified_at: Option<DateTime<Utc>>,
}

const SELECT_COLS: &str = "id, voucher_type, financial_year_id, prefix, current_number, \
     suffix, format, created_at, modified_at";

/// Atomically claim the next number for (voucher_type, financial_year_id)
///
/// Creates the counter with the given default prefix on first use (the first
/// claimed number is 1). The increment happens in one statement so concurrent
/// postings serialize on the row and never observe the same value.
pub async fn increment_and_fetch(
    tx: &mut Transaction<'_, Postgres>,
    voucher_type: VoucherType,
    financial_year_id: Uuid,
    default_prefix: &str,
) -> Result<VoucherNumber, sqlx::Error> {
    sqlx::query_as::<_, VoucherNumber>(&format!(
        "INSERT INTO voucher_numbers (voucher_type, financial_year_id, prefix, current_number) \
         VALUES ($1, $2, $3, 1) \
         ON CONFLICT (voucher_type, financial_year_id) \
         DO UPDATE SET \
             current_number = voucher_numbers.current_number + 1, \
             modified_at = NOW() \
         RETURNING {SELECT_COLS}"
    ))
    .bind(voucher_type)
    .bind(financial_year_id)
    .bind(default_prefix)
    .fetch_one(&mut **tx)
    .await
}

pub async fn find(
    pool: &PgPool,
    voucher_type: VoucherType,
    financial_year_id: Uuid,
) -> Result<Option<VoucherNumber>, sqlx::Error> {
    sqlx::query_as::<_, VoucherNumber>(&format!(
        "SELECT {SELECT_COLS} FROM voucher_numbers \
         WHERE voucher_type = $1 AND financial_year_id = $2"
    ))
    .bind(voucher_type)
    .bind(financial_year_id)
    .fetch_optional(pool)
    .await
}

/// Administrative override: create or rewrite the counter row
///
/// Supplying a suffix switches the format template to the suffixed form.
pub async fn upsert_counter(
    pool: &PgPool,
    voucher_type: VoucherType,
    financial_year_id: Uuid,
    prefix: &str,
    current_number: i32,
    suffix: Option<&str>,
) -> Result<VoucherNumber, sqlx::Error> {
    let format_template = match suffix {
        Some(_) => "{Prefix}-{Number}-{Suffix}",
        None => "{Prefix}-{Number}",
    };

    sqlx::query_as::<_, VoucherNumber>(&format!(
        "INSERT INTO voucher_numbers \
             (voucher_type, financial_year_id, prefix, current_number, suffix, format) \
         VALUES ($1, $2, $3, $4, $5, $6) \
         ON CONFLICT (voucher_type, financial_year_id) \
         DO UPDATE SET \
             prefix = EXCLUDED.prefix, \
             current_number = EXCLUDED.current_number, \
             suffix = COALESCE(EXCLUDED.suffix, voucher_numbers.suffix), \
             format = CASE WHEN EXCLUDED.suffix IS NULL \
                           THEN voucher_numbers.format \
                           ELSE EXCLUDED.format END, \
             modified_at = NOW() \
         RETURNING {SELECT_COLS}"
    ))
    .bind(voucher_type)
    .bind(financial_year_id)
    .bind(prefix)
    .bind(current_number)
    .bind(suffix)
    .bind(format_template)
    .fetch_one(pool)
    .await
}
