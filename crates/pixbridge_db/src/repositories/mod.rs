//! Repository modules for database access

pub mod transaction;
pub mod transaction_sql;

pub use transaction::{format_timestamp, parse_timestamp, TRANSACTIONS_SCHEMA};
pub use transaction_sql::SqlTransactionStore;
