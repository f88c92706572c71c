pub mod config;
pub mod contracts;
pub mod db;
pub mod repos;
pub mod services;
pub mod validation;

pub use services::posting_service::{PostedEntry, PostingError};
