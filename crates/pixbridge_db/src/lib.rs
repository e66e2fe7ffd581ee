//! Database integration for pixbridge
//!
//! Persists issued charges and exposes them to the reconciler through the
//! [`pixbridge_common::TransactionStore`] contract. SQLx's `Any` driver keeps
//! the store database agnostic; SQLite is the default backend.
//!
//! # Example
//!
//! ```rust,no_run
//! use pixbridge_db::{DbClient, SqlTransactionStore};
//!
//! async fn setup() -> Result<SqlTransactionStore, Box<dyn std::error::Error>> {
//!     let client = DbClient::from_url("sqlite://data/pixbridge.db").await?;
//!     let store = SqlTransactionStore::new(client);
//!     store.init_schema().await?;
//!     Ok(store)
//! }
//! ```

pub mod client;
pub mod error;
pub mod repositories;

pub use client::DbClient;
pub use error::DbError;
pub use repositories::SqlTransactionStore;
