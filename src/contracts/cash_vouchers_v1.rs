//! Receipt, payment and contra voucher payloads
//!
//! These carry two ledger references and a single amount; the engine
//! synthesizes the balanced two-line entry, so no independent balance
//! validation is needed.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Money received into a cash/bank ledger from a party ledger
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReceiptVoucherV1 {
    /// Voucher date (YYYY-MM-DD)
    pub voucher_date: String,
    pub reference: Option<String>,
    pub narration: Option<String>,
    /// Cash/bank ledger that is debited
    pub received_in_ledger_id: Uuid,
    /// Party ledger that is credited
    pub received_from_ledger_id: Uuid,
    /// Amount in currency units (> 0)
    pub amount: f64,
}

/// Money paid out of a cash/bank ledger to a party ledger
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentVoucherV1 {
    /// Voucher date (YYYY-MM-DD)
    pub voucher_date: String,
    pub reference: Option<String>,
    pub narration: Option<String>,
    /// Party ledger that is debited
    pub paid_to_ledger_id: Uuid,
    /// Cash/bank ledger that is credited
    pub paid_from_ledger_id: Uuid,
    /// Amount in currency units (> 0)
    pub amount: f64,
}

/// Transfer between two cash/bank ledgers
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContraVoucherV1 {
    /// Voucher date (YYYY-MM-DD)
    pub voucher_date: String,
    pub reference: Option<String>,
    pub narration: Option<String>,
    /// Ledger the funds move into (debited)
    pub to_ledger_id: Uuid,
    /// Ledger the funds move out of (credited)
    pub from_ledger_id: Uuid,
    /// Amount in currency units (> 0)
    pub amount: f64,
}
