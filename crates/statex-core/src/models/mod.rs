//! Data models.

pub mod config;
pub mod transaction;

pub use config::StatexConfig;
pub use transaction::{AccountTransaction, ExtractedItem, TransactionType};
