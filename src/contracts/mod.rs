//! Contract types for voucher posting requests
//!
//! These are the payload shapes the controller layer submits to the posting
//! engine. Amounts are expressed in currency units (f64) and converted to
//! minor units at the persistence boundary.

pub mod cash_vouchers_v1;
pub mod journal_voucher_v1;
pub mod voucher_type;

pub use cash_vouchers_v1::*;
pub use journal_voucher_v1::*;
pub use voucher_type::*;
