//! Double-entry posting engine
//!
//! Turns a voucher payload into a posted journal entry: validate, issue a
//! voucher number, write the entry and its lines, and apply the balance
//! deltas, all in one transaction. Any failure rolls the whole posting
//! back; a half-posted voucher is never visible.

use std::collections::HashMap;

use chrono::NaiveDate;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::contracts::cash_vouchers_v1::{ContraVoucherV1, PaymentVoucherV1, ReceiptVoucherV1};
use crate::contracts::journal_voucher_v1::JournalVoucherV1;
use crate::contracts::voucher_type::VoucherType;
use crate::repos::balance_repo::BalanceError;
use crate::repos::journal_repo::{self, JournalLineInsert};
use crate::repos::ledger_repo::{self, Ledger, LedgerError};
use crate::repos::financial_year_repo;
use crate::services::balance_deltas::{self, to_minor, DeltaError, LineAmounts};
use crate::services::{balance_service, numbering_service};
use crate::validation::{self, ValidationError};

/// Errors that can occur while posting or cancelling a voucher
#[derive(Debug, thiserror::Error)]
pub enum PostingError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Invalid voucher date: {0}")]
    InvalidDate(String),

    #[error("Voucher amount must be positive, got {0}")]
    InvalidAmount(f64),

    #[error("Ledger not found: {0}")]
    LedgerNotFound(Uuid),

    #[error("Ledger is inactive: {0}")]
    LedgerInactive(Uuid),

    #[error("Financial year is closed: {0}")]
    YearClosed(Uuid),

    #[error("Journal entry not found: {0}")]
    EntryNotFound(Uuid),

    #[error("Journal entry is not posted: {0}")]
    NotPosted(Uuid),

    #[error("Journal entry is already cancelled: {0}")]
    AlreadyCancelled(Uuid),

    #[error("Delta computation failed: {0}")]
    Delta(#[from] DeltaError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<LedgerError> for PostingError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::NotFound(id) => Self::LedgerNotFound(id),
            LedgerError::Inactive(id) => Self::LedgerInactive(id),
            LedgerError::Database(e) => Self::Database(e),
        }
    }
}

impl From<BalanceError> for PostingError {
    fn from(err: BalanceError) -> Self {
        match err {
            BalanceError::LedgerNotFound(id) => Self::LedgerNotFound(id),
            BalanceError::Database(e) => Self::Database(e),
        }
    }
}

impl From<financial_year_repo::YearError> for PostingError {
    fn from(err: financial_year_repo::YearError) -> Self {
        match err {
            financial_year_repo::YearError::NotFound(_) => {
                // Year lookups in postings are by date, not id
                Self::Database(sqlx::Error::RowNotFound)
            }
            financial_year_repo::YearError::Database(e) => Self::Database(e),
        }
    }
}

/// Result of a successful posting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostedEntry {
    pub entry_id: Uuid,
    pub entry_number: String,
}

/// Post a journal voucher with caller-supplied lines
pub async fn post_journal(
    pool: &PgPool,
    payload: &JournalVoucherV1,
    created_by: &str,
) -> Result<PostedEntry, PostingError> {
    validation::validate_lines(&payload.lines)?;

    let amounts: Vec<LineAmounts> = payload
        .lines
        .iter()
        .map(|line| LineAmounts {
            ledger_id: line.ledger_id,
            debit_minor: to_minor(line.debit),
            credit_minor: to_minor(line.credit),
        })
        .collect();

    // The stored totals must balance exactly, not just within the epsilon
    validation::validate_minor_totals(
        amounts.iter().map(|a| a.debit_minor).sum(),
        amounts.iter().map(|a| a.credit_minor).sum(),
    )?;

    let entry_date = parse_date(&payload.entry_date)?;

    let mut tx = pool.begin().await?;

    let year = resolve_years(&mut tx, entry_date).await?;

    let mut ledgers: HashMap<Uuid, Ledger> = HashMap::new();
    for line in &payload.lines {
        if !ledgers.contains_key(&line.ledger_id) {
            let ledger = ledger_repo::find_active_by_id_tx(&mut tx, line.ledger_id).await?;
            ledgers.insert(ledger.id, ledger);
        }
    }

    let lines: Vec<JournalLineInsert> = payload
        .lines
        .iter()
        .zip(&amounts)
        .enumerate()
        .map(|(idx, (line, amount))| JournalLineInsert {
            id: Uuid::new_v4(),
            ledger_id: line.ledger_id,
            debit_minor: amount.debit_minor,
            credit_minor: amount.credit_minor,
            memo: line.memo.clone(),
            line_no: (idx + 1) as i32,
        })
        .collect();

    let entry = commit_posting(
        &mut tx,
        VoucherType::Journal,
        entry_date,
        year,
        payload.reference.as_deref(),
        payload.description.as_deref(),
        lines,
        &amounts,
        &ledgers,
        created_by,
    )
    .await?;

    tx.commit().await?;

    tracing::info!(
        entry_id = %entry.entry_id,
        entry_number = %entry.entry_number,
        line_count = payload.lines.len(),
        created_by = %created_by,
        "Journal voucher posted"
    );

    Ok(entry)
}

/// Post a receipt voucher: debit the cash/bank ledger, credit the party
pub async fn post_receipt(
    pool: &PgPool,
    payload: &ReceiptVoucherV1,
    created_by: &str,
) -> Result<PostedEntry, PostingError> {
    post_two_line(
        pool,
        VoucherType::Receipt,
        &payload.voucher_date,
        payload.reference.as_deref(),
        payload.narration.as_deref(),
        payload.received_in_ledger_id,
        payload.received_from_ledger_id,
        payload.amount,
        created_by,
    )
    .await
}

/// Post a payment voucher: debit the party, credit the cash/bank ledger
pub async fn post_payment(
    pool: &PgPool,
    payload: &PaymentVoucherV1,
    created_by: &str,
) -> Result<PostedEntry, PostingError> {
    post_two_line(
        pool,
        VoucherType::Payment,
        &payload.voucher_date,
        payload.reference.as_deref(),
        payload.narration.as_deref(),
        payload.paid_to_ledger_id,
        payload.paid_from_ledger_id,
        payload.amount,
        created_by,
    )
    .await
}

/// Post a contra voucher: transfer between two cash/bank ledgers
pub async fn post_contra(
    pool: &PgPool,
    payload: &ContraVoucherV1,
    created_by: &str,
) -> Result<PostedEntry, PostingError> {
    post_two_line(
        pool,
        VoucherType::Contra,
        &payload.voucher_date,
        payload.reference.as_deref(),
        payload.narration.as_deref(),
        payload.to_ledger_id,
        payload.from_ledger_id,
        payload.amount,
        created_by,
    )
    .await
}

/// Flag a posted entry as cancelled
///
/// Cancellation does not reverse the balance snapshots; the entry stays in
/// the ledger with its flag set.
pub async fn cancel_entry(
    pool: &PgPool,
    entry_id: Uuid,
    reason: Option<&str>,
) -> Result<(), PostingError> {
    let entry = journal_repo::fetch_entry(pool, entry_id)
        .await?
        .ok_or(PostingError::EntryNotFound(entry_id))?;

    if !entry.is_posted {
        return Err(PostingError::NotPosted(entry_id));
    }

    if entry.is_cancelled {
        return Err(PostingError::AlreadyCancelled(entry_id));
    }

    journal_repo::mark_cancelled(pool, entry_id, reason).await?;

    tracing::info!(
        entry_id = %entry_id,
        entry_number = %entry.entry_number,
        "Journal entry cancelled"
    );

    Ok(())
}

/// Shared pipeline for the two-line voucher kinds
#[allow(clippy::too_many_arguments)]
async fn post_two_line(
    pool: &PgPool,
    voucher_type: VoucherType,
    voucher_date: &str,
    reference: Option<&str>,
    narration: Option<&str>,
    debit_ledger_id: Uuid,
    credit_ledger_id: Uuid,
    amount: f64,
    created_by: &str,
) -> Result<PostedEntry, PostingError> {
    if amount <= 0.0 {
        return Err(PostingError::InvalidAmount(amount));
    }

    let entry_date = parse_date(voucher_date)?;
    let amount_minor = to_minor(amount);

    let mut tx = pool.begin().await?;

    let year = resolve_years(&mut tx, entry_date).await?;

    let debit_ledger = ledger_repo::find_active_by_id_tx(&mut tx, debit_ledger_id).await?;
    let credit_ledger = ledger_repo::find_active_by_id_tx(&mut tx, credit_ledger_id).await?;

    // Two equal-amount lines are balanced by construction
    let (debit_memo, credit_memo) = match voucher_type {
        VoucherType::Receipt => (
            format!("Received from {}", credit_ledger.code),
            format!("Received in {}", debit_ledger.code),
        ),
        VoucherType::Payment => (
            format!("Paid from {}", credit_ledger.code),
            format!("Paid to {}", debit_ledger.code),
        ),
        _ => (
            format!("Transferred from {}", credit_ledger.code),
            format!("Transferred to {}", debit_ledger.code),
        ),
    };

    let amounts = vec![
        LineAmounts {
            ledger_id: debit_ledger.id,
            debit_minor: amount_minor,
            credit_minor: 0,
        },
        LineAmounts {
            ledger_id: credit_ledger.id,
            debit_minor: 0,
            credit_minor: amount_minor,
        },
    ];

    let lines = vec![
        JournalLineInsert {
            id: Uuid::new_v4(),
            ledger_id: debit_ledger.id,
            debit_minor: amount_minor,
            credit_minor: 0,
            memo: Some(debit_memo),
            line_no: 1,
        },
        JournalLineInsert {
            id: Uuid::new_v4(),
            ledger_id: credit_ledger.id,
            debit_minor: 0,
            credit_minor: amount_minor,
            memo: Some(credit_memo),
            line_no: 2,
        },
    ];

    let mut ledgers = HashMap::new();
    ledgers.insert(debit_ledger.id, debit_ledger);
    ledgers.insert(credit_ledger.id, credit_ledger);

    let entry = commit_posting(
        &mut tx,
        voucher_type,
        entry_date,
        year,
        reference,
        narration,
        lines,
        &amounts,
        &ledgers,
        created_by,
    )
    .await?;

    tx.commit().await?;

    tracing::info!(
        entry_id = %entry.entry_id,
        entry_number = %entry.entry_number,
        voucher_type = %voucher_type,
        amount_minor,
        created_by = %created_by,
        "Voucher posted"
    );

    Ok(entry)
}

/// Commit sequence shared by all voucher kinds: issue number, write entry
/// and lines, apply balance deltas. Runs on the caller's transaction.
#[allow(clippy::too_many_arguments)]
async fn commit_posting(
    tx: &mut Transaction<'_, Postgres>,
    voucher_type: VoucherType,
    entry_date: NaiveDate,
    year: ResolvedYears,
    reference: Option<&str>,
    description: Option<&str>,
    lines: Vec<JournalLineInsert>,
    amounts: &[LineAmounts],
    ledgers: &HashMap<Uuid, Ledger>,
    created_by: &str,
) -> Result<PostedEntry, PostingError> {
    let entry_number = numbering_service::issue_next(tx, voucher_type, year.numbering).await?;

    let total_debit: i64 = amounts.iter().map(|a| a.debit_minor).sum();
    let total_credit: i64 = amounts.iter().map(|a| a.credit_minor).sum();

    let entry_id = Uuid::new_v4();
    journal_repo::insert_entry(
        tx,
        entry_id,
        &entry_number,
        entry_date,
        voucher_type,
        year.entry_scope,
        reference,
        description,
        total_debit,
        total_credit,
        created_by,
    )
    .await?;

    journal_repo::bulk_insert_lines(tx, entry_id, lines).await?;

    for delta in balance_deltas::compute_deltas(amounts)? {
        let ledger = ledgers
            .get(&delta.ledger_id)
            .ok_or(PostingError::LedgerNotFound(delta.ledger_id))?;

        balance_service::apply_delta(
            tx,
            ledger,
            delta.debit_delta_minor,
            delta.credit_delta_minor,
            entry_date,
        )
        .await?;
    }

    Ok(PostedEntry {
        entry_id,
        entry_number,
    })
}

/// Financial years a posting resolves against
#[derive(Debug, Clone, Copy)]
struct ResolvedYears {
    /// Year scoping the voucher number counter (the active year)
    numbering: Option<Uuid>,
    /// Year recorded on the entry for reporting
    entry_scope: Option<Uuid>,
}

/// Resolve the posting's financial years and refuse closed-period dates
async fn resolve_years(
    tx: &mut Transaction<'_, Postgres>,
    entry_date: NaiveDate,
) -> Result<ResolvedYears, PostingError> {
    let containing = financial_year_repo::find_containing_date_tx(tx, entry_date).await?;

    if let Some(year) = &containing {
        if year.is_closed {
            return Err(PostingError::YearClosed(year.id));
        }
    }

    let active = financial_year_repo::find_active_tx(tx).await?;

    let numbering = active.map(|y| y.id);
    let entry_scope = numbering.or(containing.map(|y| y.id));

    Ok(ResolvedYears {
        numbering,
        entry_scope,
    })
}

fn parse_date(raw: &str) -> Result<NaiveDate, PostingError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|e| PostingError::InvalidDate(format!("{}: {}", raw, e)))
}
