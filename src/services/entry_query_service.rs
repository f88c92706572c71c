//! Read side of the journal entry ledger
//!
//! Returns entries shaped for reporting: amounts back in currency units,
//! lines carrying the joined ledger code and name.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::contracts::voucher_type::VoucherType;
use crate::repos::journal_repo::{self, EntryFilter, JournalEntry, JournalLine};

#[derive(Debug, thiserror::Error)]
pub enum EntryQueryError {
    #[error("Journal entry not found: {0}")]
    NotFound(Uuid),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Journal entry view with amounts in currency units
#[derive(Debug, Clone, serde::Serialize)]
pub struct EntryView {
    pub id: Uuid,
    pub entry_number: String,
    pub entry_date: NaiveDate,
    pub voucher_type: VoucherType,
    pub reference: Option<String>,
    pub description: Option<String>,
    pub total_debit: f64,
    pub total_credit: f64,
    pub is_posted: bool,
    pub is_cancelled: bool,
    pub cancellation_reason: Option<String>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct EntryLineView {
    pub ledger_id: Uuid,
    pub ledger_code: String,
    pub ledger_name: String,
    pub debit: f64,
    pub credit: f64,
    pub memo: Option<String>,
    pub line_no: i32,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct EntryWithLines {
    #[serde(flatten)]
    pub entry: EntryView,
    pub lines: Vec<EntryLineView>,
}

/// Fetch one entry with its lines
pub async fn get_entry(pool: &PgPool, entry_id: Uuid) -> Result<EntryWithLines, EntryQueryError> {
    let (entry, lines) = journal_repo::fetch_entry_with_lines(pool, entry_id)
        .await?
        .ok_or(EntryQueryError::NotFound(entry_id))?;

    Ok(EntryWithLines {
        entry: to_view(entry),
        lines: lines.into_iter().map(to_line_view).collect(),
    })
}

/// List entries matching the filter, ordered by entry date
pub async fn find_entries(
    pool: &PgPool,
    filter: &EntryFilter,
) -> Result<Vec<EntryView>, EntryQueryError> {
    let entries = journal_repo::find_entries(pool, filter).await?;
    Ok(entries.into_iter().map(to_view).collect())
}

fn to_view(entry: JournalEntry) -> EntryView {
    EntryView {
        id: entry.id,
        entry_number: entry.entry_number,
        entry_date: entry.entry_date,
        voucher_type: entry.voucher_type,
        reference: entry.reference,
        description: entry.description,
        total_debit: to_major(entry.total_debit_minor),
        total_credit: to_major(entry.total_credit_minor),
        is_posted: entry.is_posted,
        is_cancelled: entry.is_cancelled,
        cancellation_reason: entry.cancellation_reason,
        created_by: entry.created_by,
        created_at: entry.created_at,
    }
}

fn to_line_view(line: JournalLine) -> EntryLineView {
    EntryLineView {
        ledger_id: line.ledger_id,
        ledger_code: line.ledger_code,
        ledger_name: line.ledger_name,
        debit: to_major(line.debit_minor),
        credit: to_major(line.credit_minor),
        memo: line.memo,
        line_no: line.line_no,
    }
}

fn to_major(minor: i64) -> f64 {
    minor as f64 / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_major_converts_cents() {
        assert_eq!(to_major(123_456), 1234.56);
        assert_eq!(to_major(-50), -0.5);
        assert_eq!(to_major(0), 0.0);
    }
}
