use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::contracts::voucher_type::VoucherType;

/// Journal entry header (for reading from DB)
#[derive(Debug, Clone, FromRow)]
pub struct JournalEntry {
    pub id: Uuid,
    pub entry_number: String,
    pub entry_date: NaiveDate,
    pub voucher_type: VoucherType,
    pub financial_year_id: Option<Uuid>,
    pub reference: Option<String>,
    pub description: Option<String>,
    pub total_debit_minor: i64,
    pub total_credit_minor: i64,
    pub is_posted: bool,
    pub is_cancelled: bool,
    pub cancellation_reason: Option<String>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

/// Journal line joined with its ledger's code and name (for reports)
#[derive(Debug, Clone, FromRow)]
pub struct JournalLine {
    pub id: Uuid,
    pub entry_id: Uuid,
    pub ledger_id: Uuid,
    pub ledger_code: String,
    pub ledger_name: String,
    pub debit_minor: i64,
    pub credit_minor: i64,
    pub memo: Option<String>,
    pub line_no: i32,
}

/// Struct for inserting a journal line
#[derive(Debug, Clone)]
pub struct JournalLineInsert {
    pub id: Uuid,
    pub ledger_id: Uuid,
    pub debit_minor: i64,
    pub credit_minor: i64,
    pub memo: Option<String>,
    pub line_no: i32,
}

/// Filter for journal entry scans (all fields optional)
#[derive(Debug, Clone, Default)]
pub struct EntryFilter {
    pub voucher_type: Option<VoucherType>,
    pub is_posted: Option<bool>,
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
}

const ENTRY_COLS: &str = "id, entry_number, entry_date, voucher_type, financial_year_id, \
     reference, description, total_debit_minor, total_credit_minor, \
     is_posted, is_cancelled, cancellation_reason, created_by, created_at";

/// Insert a journal entry header within the posting transaction
#[allow(clippy::too_many_arguments)]
pub async fn insert_entry(
    tx: &mut Transaction<'_, Postgres>,
    entry_id: Uuid,
    entry_number: &str,
    entry_date: NaiveDate,
    voucher_type: VoucherType,
    financial_year_id: Option<Uuid>,
    reference: Option<&str>,
    description: Option<&str>,
    total_debit_minor: i64,
    total_credit_minor: i64,
    created_by: &str,
) -> Result<Uuid, sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO journal_entries
            (id, entry_number, entry_date, voucher_type, financial_year_id,
             reference, description, total_debit_minor, total_credit_minor,
             is_posted, created_by)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, TRUE, $10)
        "#,
    )
    .bind(entry_id)
    .bind(entry_number)
    .bind(entry_date)
    .bind(voucher_type)
    .bind(financial_year_id)
    .bind(reference)
    .bind(description)
    .bind(total_debit_minor)
    .bind(total_credit_minor)
    .bind(created_by)
    .execute(&mut **tx)
    .await?;

    Ok(entry_id)
}

/// Bulk insert journal lines for an entry
pub async fn bulk_insert_lines(
    tx: &mut Transaction<'_, Postgres>,
    entry_id: Uuid,
    lines: Vec<JournalLineInsert>,
) -> Result<(), sqlx::Error> {
    for line in lines {
        sqlx::query(
            r#"
            INSERT INTO journal_entry_lines
                (id, entry_id, ledger_id, debit_minor, credit_minor, memo, line_no)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(line.id)
        .bind(entry_id)
        .bind(line.ledger_id)
        .bind(line.debit_minor)
        .bind(line.credit_minor)
        .bind(&line.memo)
        .bind(line.line_no)
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}

pub async fn fetch_entry(pool: &PgPool, entry_id: Uuid) -> Result<Option<JournalEntry>, sqlx::Error> {
    sqlx::query_as::<_, JournalEntry>(&format!(
        "SELECT {ENTRY_COLS} FROM journal_entries WHERE id = $1"
    ))
    .bind(entry_id)
    .fetch_optional(pool)
    .await
}

/// Fetch a journal entry by ID with its lines (ledger names joined)
pub async fn fetch_entry_with_lines(
    pool: &PgPool,
    entry_id: Uuid,
) -> Result<Option<(JournalEntry, Vec<JournalLine>)>, sqlx::Error> {
    let Some(entry) = fetch_entry(pool, entry_id).await? else {
        return Ok(None);
    };

    let lines = sqlx::query_as::<_, JournalLine>(
        r#"
        SELECT jl.id, jl.entry_id, jl.ledger_id, l.code AS ledger_code,
               l.name AS ledger_name, jl.debit_minor, jl.credit_minor,
               jl.memo, jl.line_no
        FROM journal_entry_lines jl
        INNER JOIN ledgers l ON l.id = jl.ledger_id
        WHERE jl.entry_id = $1
        ORDER BY jl.line_no
        "#,
    )
    .bind(entry_id)
    .fetch_all(pool)
    .await?;

    Ok(Some((entry, lines)))
}

/// Filtered scan over journal entries for report assembly
pub async fn find_entries(
    pool: &PgPool,
    filter: &EntryFilter,
) -> Result<Vec<JournalEntry>, sqlx::Error> {
    sqlx::query_as::<_, JournalEntry>(&format!(
        "SELECT {ENTRY_COLS} FROM journal_entries \
         WHERE ($1::voucher_type IS NULL OR voucher_type = $1) \
           AND ($2::BOOLEAN IS NULL OR is_posted = $2) \
           AND ($3::DATE IS NULL OR entry_date >= $3) \
           AND ($4::DATE IS NULL OR entry_date <= $4) \
         ORDER BY entry_date, created_at"
    ))
    .bind(filter.voucher_type)
    .bind(filter.is_posted)
    .bind(filter.from_date)
    .bind(filter.to_date)
    .fetch_all(pool)
    .await
}

/// Latest entry number of a voucher type (fallback numbering scheme)
pub async fn last_entry_number_for_type(
    tx: &mut Transaction<'_, Postgres>,
    voucher_type: VoucherType,
) -> Result<Option<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>(
        r#"
        SELECT entry_number
        FROM journal_entries
        WHERE voucher_type = $1
        ORDER BY created_at DESC, id DESC
        LIMIT 1
        "#,
    )
    .bind(voucher_type)
    .fetch_optional(&mut **tx)
    .await
}

/// Flag a posted entry as cancelled; balances are not reversed
pub async fn mark_cancelled(
    pool: &PgPool,
    entry_id: Uuid,
    reason: Option<&str>,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE journal_entries
        SET is_cancelled = TRUE, cancellation_reason = $2
        WHERE id = $1
        "#,
    )
    .bind(entry_id)
    .bind(reason)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

/// Whether any journal line references the ledger (deletion guard)
pub async fn ledger_has_lines(pool: &PgPool, ledger_id: Uuid) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS (SELECT 1 FROM journal_entry_lines WHERE ledger_id = $1)",
    )
    .bind(ledger_id)
    .fetch_one(pool)
    .await
}
