//! Double-entry validation for voucher lines
//!
//! Validates a caller-supplied line set before anything is written:
//! at least two lines, debits equal credits within the currency epsilon,
//! and every line carries exactly one of debit/credit.

use crate::contracts::journal_voucher_v1::VoucherLine;
use thiserror::Error;

/// Penny precision for the f64 amounts at the contract boundary
const EPSILON: f64 = 0.01;

/// Validation errors for voucher line sets
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("Lines must have at least 2 items, got {0}")]
    InsufficientLines(usize),

    #[error("Line {0}: debit must be non-negative, got {1}")]
    NegativeDebit(usize, f64),

    #[error("Line {0}: credit must be non-negative, got {1}")]
    NegativeCredit(usize, f64),

    #[error("Line {0}: debit and credit cannot both be nonzero")]
    BothAmountsSet(usize),

    #[error("Line {0}: one of debit or credit must be nonzero")]
    NoAmountSet(usize),

    #[error("Total debits ({0}) must equal total credits ({1})")]
    UnbalancedEntry(f64, f64),

    #[error("Totals differ after rounding to minor units: {0} vs {1}")]
    RoundedTotalsMismatch(i64, i64),
}

/// Validate a voucher line set against the double-entry rules
///
/// # Validation Rules
///
/// - at least 2 lines
/// - every line: debit >= 0, credit >= 0
/// - every line: exactly one of debit/credit nonzero
/// - total debits equal total credits within 0.01
pub fn validate_lines(lines: &[VoucherLine]) -> Result<(), ValidationError> {
    if lines.len() < 2 {
        return Err(ValidationError::InsufficientLines(lines.len()));
    }

    let mut total_debits = 0.0;
    let mut total_credits = 0.0;

    for (idx, line) in lines.iter().enumerate() {
        validate_line(line, idx)?;
        total_debits += line.debit;
        total_credits += line.credit;
    }

    if (total_debits - total_credits).abs() > EPSILON {
        return Err(ValidationError::UnbalancedEntry(total_debits, total_credits));
    }

    Ok(())
}

/// Require exact equality of the minor-unit totals that will be stored
///
/// The epsilon check tolerates sub-penny float drift, but drift of more than
/// half a cent survives `to_minor` rounding and would commit unequal stored
/// totals. Stored totals must balance exactly, so the converted sums get a
/// second, exact check.
pub fn validate_minor_totals(
    total_debit_minor: i64,
    total_credit_minor: i64,
) -> Result<(), ValidationError> {
    if total_debit_minor != total_credit_minor {
        return Err(ValidationError::RoundedTotalsMismatch(
            total_debit_minor,
            total_credit_minor,
        ));
    }

    Ok(())
}

fn validate_line(line: &VoucherLine, index: usize) -> Result<(), ValidationError> {
    if line.debit < 0.0 {
        return Err(ValidationError::NegativeDebit(index, line.debit));
    }

    if line.credit < 0.0 {
        return Err(ValidationError::NegativeCredit(index, line.credit));
    }

    if line.debit > 0.0 && line.credit > 0.0 {
        return Err(ValidationError::BothAmountsSet(index));
    }

    if line.debit == 0.0 && line.credit == 0.0 {
        return Err(ValidationError::NoAmountSet(index));
    }

    Ok(())
}
