use serde::{Deserialize, Serialize};

/// Voucher kinds accepted by the posting engine
///
/// Each kind maps to its own numbering counter per financial year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "PascalCase")]
#[sqlx(type_name = "voucher_type", rename_all = "lowercase")]
pub enum VoucherType {
    Journal,
    Receipt,
    Payment,
    Contra,
}

impl VoucherType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Journal => "Journal",
            Self::Receipt => "Receipt",
            Self::Payment => "Payment",
            Self::Contra => "Contra",
        }
    }
}

impl std::fmt::Display for VoucherType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
