//! Rebuild balances tool
//!
//! Admin-only tool that deterministically recomputes ledger balance
//! snapshots from the journal. Journal entries are the source of truth;
//! the ledger_balances table is a materialized rollup that this tool can
//! drop and rebuild at any time (audit recovery, migration repair).
//!
//! # Usage
//! ```bash
//! ./rebuild_balances             # rebuild every ledger
//! ./rebuild_balances --ledger CASH-01
//! ```
//!
//! Each ledger is rebuilt in its own transaction: delete the snapshot
//! series, then reinsert one cumulative snapshot per activity date from
//! the opening balance and the posted journal lines. Cancelled entries
//! stay in the sums because cancellation does not reverse balances.

use std::env;

use chrono::NaiveDate;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use ledger_rs::config::Config;
use ledger_rs::db;
use ledger_rs::repos::balance_repo;
use ledger_rs::repos::ledger_repo::{BalanceSide, Ledger};

/// Parse command-line arguments manually (no external crate needed)
struct Args {
    ledger_code: Option<String>,
}

impl Args {
    fn parse() -> Result<Self, String> {
        let args: Vec<String> = env::args().collect();

        let mut ledger_code = None;

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--ledger" => {
                    if i + 1 < args.len() {
                        ledger_code = Some(args[i + 1].clone());
                        i += 2;
                    } else {
                        return Err("--ledger requires a value".to_string());
                    }
                }
                _ => {
                    return Err(format!(
                        "Unknown argument: {} (usage: rebuild_balances [--ledger CODE])",
                        args[i]
                    ))
                }
            }
        }

        Ok(Args { ledger_code })
    }
}

/// Daily debit/credit activity for one ledger
#[derive(Debug, Clone)]
struct DailyActivity {
    entry_date: NaiveDate,
    debit_minor: i64,
    credit_minor: i64,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = match Args::parse() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let config = Config::from_env().expect("Configuration error");

    let pool = db::init_pool(&config)
        .await
        .expect("Failed to connect to database");

    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    let ledgers = fetch_ledgers(&pool, args.ledger_code.as_deref()).await;

    if ledgers.is_empty() {
        tracing::warn!(
            ledger_code = args.ledger_code.as_deref().unwrap_or("<all>"),
            "No ledgers matched; nothing to rebuild"
        );
        return;
    }

    tracing::info!("Rebuilding balances for {} ledgers", ledgers.len());

    let mut total_snapshots = 0;
    for ledger in &ledgers {
        match rebuild_ledger_balances(&pool, ledger).await {
            Ok(count) => {
                tracing::info!(
                    "Rebuilt {} snapshots for ledger {} ({})",
                    count,
                    ledger.code,
                    ledger.id
                );
                total_snapshots += count;
            }
            Err(e) => {
                tracing::error!(
                    "Failed to rebuild balances for ledger {}: {}",
                    ledger.code,
                    e
                );
                std::process::exit(1);
            }
        }
    }

    tracing::info!(
        "Balance rebuild complete: {} snapshots across {} ledgers",
        total_snapshots,
        ledgers.len()
    );
}

/// Fetch the ledgers to rebuild, optionally narrowed to one code
async fn fetch_ledgers(pool: &PgPool, ledger_code: Option<&str>) -> Vec<Ledger> {
    sqlx::query_as::<_, Ledger>(
        r#"
        SELECT id, code, name, group_id, opening_balance_minor,
               opening_balance_type, is_active, address, contact_info,
               created_at
        FROM ledgers
        WHERE ($1::TEXT IS NULL OR code = $1)
        ORDER BY code
        "#,
    )
    .bind(ledger_code)
    .fetch_all(pool)
    .await
    .expect("Failed to fetch ledgers")
}

/// Rebuild one ledger's snapshot series in a single transaction
///
/// Deletes the existing series, then walks the posted journal activity in
/// date order accumulating cumulative totals from the opening balance and
/// inserting one snapshot per activity date.
async fn rebuild_ledger_balances(
    pool: &PgPool,
    ledger: &Ledger,
) -> Result<usize, Box<dyn std::error::Error>> {
    let mut tx = pool.begin().await?;

    let deleted = balance_repo::delete_for_ledger(&mut tx, ledger.id).await?;
    if deleted > 0 {
        tracing::debug!(
            ledger_code = %ledger.code,
            deleted,
            "Deleted existing snapshot rows"
        );
    }

    let activity = fetch_daily_activity(&mut tx, ledger.id).await?;

    let (mut debit_cum, mut credit_cum) = match ledger.opening_balance_type {
        BalanceSide::Debit => (ledger.opening_balance_minor, 0),
        BalanceSide::Credit => (0, ledger.opening_balance_minor),
    };

    let mut inserted = 0;
    for day in &activity {
        debit_cum += day.debit_minor;
        credit_cum += day.credit_minor;

        balance_repo::insert_snapshot(&mut tx, ledger.id, day.entry_date, debit_cum, credit_cum)
            .await?;
        inserted += 1;
    }

    tx.commit().await?;

    Ok(inserted)
}

/// Per-date debit/credit sums over the ledger's posted journal lines
async fn fetch_daily_activity(
    tx: &mut Transaction<'_, Postgres>,
    ledger_id: Uuid,
) -> Result<Vec<DailyActivity>, sqlx::Error> {
    let rows = sqlx::query_as::<_, (NaiveDate, i64, i64)>(
        r#"
        SELECT je.entry_date,
               COALESCE(SUM(jl.debit_minor), 0),
               COALESCE(SUM(jl.credit_minor), 0)
        FROM journal_entry_lines jl
        INNER JOIN journal_entries je ON je.id = jl.entry_id
        WHERE jl.ledger_id = $1
          AND je.is_posted = TRUE
        GROUP BY je.entry_date
        ORDER BY je.entry_date
        "#,
    )
    .bind(ledger_id)
    .fetch_all(&mut **tx)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(entry_date, debit_minor, credit_minor)| DailyActivity {
            entry_date,
            debit_minor,
            credit_minor,
        })
        .collect())
}
