//! Voucher number formatting
//!
//! Pure helpers shared by both numbering tiers: the counter-backed primary
//! scheme ({Prefix}-{Number} with a 4-digit pad) and the last-entry fallback
//! (PREFIX-NNNNNN with a 6-digit pad).

use crate::contracts::voucher_type::VoucherType;

/// Default counter prefix per voucher type
pub fn default_prefix(voucher_type: VoucherType) -> &'static str {
    match voucher_type {
        VoucherType::Receipt => "RCP",
        VoucherType::Payment => "PAY",
        VoucherType::Journal => "JRN",
        VoucherType::Contra => "CNT",
    }
}

/// Render a counter state through its format template
///
/// Substitutes `{Prefix}`, `{Number}` (zero-padded to 4 digits) and
/// `{Suffix}` (empty string when absent).
pub fn render(format: &str, prefix: &str, number: i32, suffix: Option<&str>) -> String {
    format
        .replace("{Prefix}", prefix)
        .replace("{Number}", &format!("{:04}", number))
        .replace("{Suffix}", suffix.unwrap_or(""))
}

/// Derive the next fallback number from the latest entry of the type
///
/// Strips `PREFIX-` from the previous entry number and increments its
/// trailing integer; anything unparseable restarts at 1. Weaker than the
/// counter scheme (not atomic), used only when no financial year resolves.
pub fn fallback_number(prefix: &str, last_entry_number: Option<&str>) -> String {
    let mut next = 1;

    if let Some(last) = last_entry_number {
        let tail = last.replace(&format!("{}-", prefix), "");
        if let Ok(num) = tail.parse::<i32>() {
            next = num + 1;
        }
    }

    format!("{}-{:06}", prefix, next)
}
