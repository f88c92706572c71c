//! Ledger balance store
//!
//! Point-in-time balance lookup and the core snapshot mutation. `apply_delta`
//! must run inside the posting transaction so a reader never observes entry
//! lines without the corresponding balance update, or vice versa.

use chrono::NaiveDate;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::repos::balance_repo::{self, BalanceError};
use crate::repos::ledger_repo::{self, Ledger};

/// Net balance of a ledger as of a date, in minor units
///
/// Returns the net of the latest snapshot dated on or before `as_of`; if the
/// ledger has no snapshot yet, the signed opening balance (debit-positive,
/// credit-negative).
pub async fn get_balance_minor(
    pool: &PgPool,
    ledger_id: Uuid,
    as_of: NaiveDate,
) -> Result<i64, BalanceError> {
    if let Some(snapshot) = balance_repo::find_latest_on_or_before(pool, ledger_id, as_of).await? {
        return Ok(snapshot.net_balance_minor);
    }

    let ledger = ledger_repo::find_by_id(pool, ledger_id)
        .await
        .map_err(|e| match e {
            ledger_repo::LedgerError::Database(e) => BalanceError::Database(e),
            _ => BalanceError::LedgerNotFound(ledger_id),
        })?
        .ok_or(BalanceError::LedgerNotFound(ledger_id))?;

    Ok(ledger.signed_opening_minor())
}

/// Net balance as of a date, in currency units
pub async fn get_balance(
    pool: &PgPool,
    ledger_id: Uuid,
    as_of: NaiveDate,
) -> Result<f64, BalanceError> {
    let minor = get_balance_minor(pool, ledger_id, as_of).await?;
    Ok(minor as f64 / 100.0)
}

/// Apply a posting's delta to a ledger's snapshot series
///
/// Locates or lazily materializes the snapshot for `date` (inheriting the
/// cumulative totals of the nearest earlier snapshot, or the opening
/// balance), adds the deltas, then ripples the same deltas forward through
/// every already-materialized later snapshot.
///
/// Runs on the caller's transaction; the ledger-row lock taken first
/// serializes concurrent postings that touch the same ledger, including
/// first-time materialization when no snapshot row exists to lock yet.
pub async fn apply_delta(
    tx: &mut Transaction<'_, Postgres>,
    ledger: &Ledger,
    debit_delta_minor: i64,
    credit_delta_minor: i64,
    date: NaiveDate,
) -> Result<(), BalanceError> {
    balance_repo::lock_ledger(tx, ledger.id).await?;

    let snapshot = match balance_repo::find_for_update(tx, ledger.id, date).await? {
        Some(existing) => existing,
        None => {
            // First posting on this date: inherit from the nearest earlier
            // snapshot, or the opening balance when the series is empty
            let (prev_debit, prev_credit) =
                match balance_repo::find_latest_before_for_update(tx, ledger.id, date).await? {
                    Some(prev) => (prev.debit_balance_minor, prev.credit_balance_minor),
                    None => match ledger.opening_balance_type {
                        ledger_repo::BalanceSide::Debit => (ledger.opening_balance_minor, 0),
                        ledger_repo::BalanceSide::Credit => (0, ledger.opening_balance_minor),
                    },
                };

            balance_repo::insert_snapshot(tx, ledger.id, date, prev_debit, prev_credit).await?
        }
    };

    let updated =
        balance_repo::add_to_snapshot(tx, snapshot.id, debit_delta_minor, credit_delta_minor)
            .await?;

    let propagated =
        balance_repo::propagate_forward(tx, ledger.id, date, debit_delta_minor, credit_delta_minor)
            .await?;

    tracing::debug!(
        ledger_id = %ledger.id,
        balance_date = %date,
        debit_delta_minor,
        credit_delta_minor,
        net_balance_minor = updated.net_balance_minor,
        propagated_snapshots = propagated,
        "Applied balance delta"
    );

    Ok(())
}
