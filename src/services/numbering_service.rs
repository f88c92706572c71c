//! Voucher numbering authority
//!
//! Issues unique, monotonically increasing formatted voucher numbers scoped
//! to (voucher type, financial year). Two tiers: the counter-backed scheme
//! when a financial year resolves, and a weaker last-entry scan otherwise.
//! Numbers are never reused; gaps from rolled-back postings are tolerated.

use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::contracts::voucher_type::VoucherType;
use crate::repos::{journal_repo, voucher_number_repo};
use crate::services::number_format;

/// Issue the next formatted voucher number
///
/// With a financial year the counter row is atomically incremented (created
/// with the type-derived default prefix on first use) and rendered through
/// its format template. Without one, numbering degrades to incrementing the
/// trailing number of the latest entry of that type. Both tiers run on the
/// caller's posting transaction, so a rollback discards the claim (leaving a
/// gap in the counter tier).
pub async fn issue_next(
    tx: &mut Transaction<'_, Postgres>,
    voucher_type: VoucherType,
    financial_year_id: Option<Uuid>,
) -> Result<String, sqlx::Error> {
    let prefix = number_format::default_prefix(voucher_type);

    let Some(year_id) = financial_year_id else {
        // Fallback tier: no financial year to scope a counter to
        let last = journal_repo::last_entry_number_for_type(tx, voucher_type).await?;
        let number = number_format::fallback_number(prefix, last.as_deref());

        tracing::warn!(
            voucher_type = %voucher_type,
            number = %number,
            "No financial year resolvable; issued fallback voucher number"
        );

        return Ok(number);
    };

    let counter =
        voucher_number_repo::increment_and_fetch(tx, voucher_type, year_id, prefix).await?;

    let formatted = number_format::render(
        &counter.format,
        &counter.prefix,
        counter.current_number,
        counter.suffix.as_deref(),
    );

    tracing::debug!(
        voucher_type = %voucher_type,
        financial_year_id = %year_id,
        current_number = counter.current_number,
        number = %formatted,
        "Issued voucher number"
    );

    Ok(formatted)
}

/// Administrative override of a counter row (created if absent)
pub async fn set_counter(
    pool: &PgPool,
    voucher_type: VoucherType,
    financial_year_id: Uuid,
    prefix: &str,
    current_number: i32,
    suffix: Option<&str>,
) -> Result<(), sqlx::Error> {
    let counter = voucher_number_repo::upsert_counter(
        pool,
        voucher_type,
        financial_year_id,
        prefix,
        current_number,
        suffix,
    )
    .await?;

    tracing::info!(
        voucher_type = %voucher_type,
        financial_year_id = %financial_year_id,
        prefix = %counter.prefix,
        current_number = counter.current_number,
        "Voucher counter overridden"
    );

    Ok(())
}
