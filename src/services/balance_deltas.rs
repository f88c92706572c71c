//! Balance delta computation from journal lines
//!
//! Deterministically groups a posting's lines into one (debit, credit) delta
//! per ledger, so each snapshot is touched exactly once per posting.

use std::collections::HashMap;
use thiserror::Error;
use uuid::Uuid;

/// Balance delta for a single ledger
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerDelta {
    pub ledger_id: Uuid,
    pub debit_delta_minor: i64,
    pub credit_delta_minor: i64,
}

/// Errors that can occur during delta computation
#[derive(Debug, Error)]
pub enum DeltaError {
    #[error("Empty journal lines: cannot compute deltas from empty line set")]
    EmptyLines,
}

/// Input journal line for delta computation
#[derive(Debug, Clone)]
pub struct LineAmounts {
    pub ledger_id: Uuid,
    pub debit_minor: i64,
    pub credit_minor: i64,
}

/// Compute per-ledger balance deltas from journal lines
///
/// Multiple lines against the same ledger are summed. The result is sorted
/// by ledger id for deterministic lock acquisition order and testing.
pub fn compute_deltas(lines: &[LineAmounts]) -> Result<Vec<LedgerDelta>, DeltaError> {
    if lines.is_empty() {
        return Err(DeltaError::EmptyLines);
    }

    let mut delta_map: HashMap<Uuid, (i64, i64)> = HashMap::new();

    for line in lines {
        let (debit_sum, credit_sum) = delta_map.entry(line.ledger_id).or_insert((0, 0));
        *debit_sum += line.debit_minor;
        *credit_sum += line.credit_minor;
    }

    let mut deltas: Vec<LedgerDelta> = delta_map
        .into_iter()
        .map(|(ledger_id, (debit_delta_minor, credit_delta_minor))| LedgerDelta {
            ledger_id,
            debit_delta_minor,
            credit_delta_minor,
        })
        .collect();

    deltas.sort_by(|a, b| a.ledger_id.cmp(&b.ledger_id));

    Ok(deltas)
}

/// Convert a contract-boundary amount (currency units) to minor units
pub fn to_minor(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(ledger_id: Uuid, debit: i64, credit: i64) -> LineAmounts {
        LineAmounts {
            ledger_id,
            debit_minor: debit,
            credit_minor: credit,
        }
    }

    #[test]
    fn test_single_ledger() {
        let id = Uuid::new_v4();
        let deltas = compute_deltas(&[line(id, 10000, 0)]).unwrap();

        assert_eq!(deltas.len(), 1);
        assert_eq!(deltas[0].ledger_id, id);
        assert_eq!(deltas[0].debit_delta_minor, 10000);
        assert_eq!(deltas[0].credit_delta_minor, 0);
    }

    #[test]
    fn test_two_ledgers() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let deltas = compute_deltas(&[line(a, 50000, 0), line(b, 0, 50000)]).unwrap();

        assert_eq!(deltas.len(), 2);
        let da = deltas.iter().find(|d| d.ledger_id == a).unwrap();
        let db = deltas.iter().find(|d| d.ledger_id == b).unwrap();
        assert_eq!((da.debit_delta_minor, da.credit_delta_minor), (50000, 0));
        assert_eq!((db.debit_delta_minor, db.credit_delta_minor), (0, 50000));
    }

    #[test]
    fn test_same_ledger_lines_are_summed() {
        let id = Uuid::new_v4();
        let deltas =
            compute_deltas(&[line(id, 10000, 0), line(id, 5000, 0), line(id, 0, 3000)]).unwrap();

        assert_eq!(deltas.len(), 1);
        assert_eq!(deltas[0].debit_delta_minor, 15000);
        assert_eq!(deltas[0].credit_delta_minor, 3000);
    }

    #[test]
    fn test_empty_lines_rejected() {
        assert!(matches!(compute_deltas(&[]), Err(DeltaError::EmptyLines)));
    }

    #[test]
    fn test_deterministic_ordering() {
        let mut ids = vec![Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4()];
        let lines: Vec<LineAmounts> = ids.iter().map(|id| line(*id, 100, 0)).collect();

        let deltas = compute_deltas(&lines).unwrap();
        ids.sort();

        let ordered: Vec<Uuid> = deltas.iter().map(|d| d.ledger_id).collect();
        assert_eq!(ordered, ids);
    }

    #[test]
    fn test_to_minor_rounds() {
        assert_eq!(to_minor(500.0), 50000);
        assert_eq!(to_minor(0.1), 10);
        assert_eq!(to_minor(10.005), 1001);
    }
}
