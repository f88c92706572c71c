//! Journal voucher payload
//!
//! A caller-supplied set of debit/credit lines. The engine validates the
//! double-entry invariant before committing.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Payload for posting a journal voucher
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JournalVoucherV1 {
    /// Accounting date for the entry (YYYY-MM-DD)
    pub entry_date: String,

    /// Optional external reference (cheque number, invoice, ...)
    pub reference: Option<String>,

    /// Human-readable narration for the entry
    pub description: Option<String>,

    /// Journal lines (must have at least 2 items)
    pub lines: Vec<VoucherLine>,
}

/// A single line in a journal voucher
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VoucherLine {
    /// Ledger the line posts to
    pub ledger_id: Uuid,

    /// Debit amount (>= 0; exactly one of debit/credit must be nonzero)
    pub debit: f64,

    /// Credit amount (>= 0; exactly one of debit/credit must be nonzero)
    pub credit: f64,

    /// Optional line memo
    pub memo: Option<String>,
}
