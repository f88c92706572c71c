pub mod balance_repo;
pub mod financial_year_repo;
pub mod group_repo;
pub mod journal_repo;
pub mod ledger_repo;
pub mod voucher_number_repo;
