pub mod account_group_service;
pub mod balance_deltas;
pub mod balance_service;
pub mod entry_query_service;
pub mod financial_year_service;
pub mod ledger_service;
pub mod number_format;
pub mod numbering_service;
pub mod posting_service;
