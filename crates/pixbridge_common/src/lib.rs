// --- File: crates/pixbridge_common/src/lib.rs ---

pub mod error; // Error handling
pub mod http; // HTTP utilities
pub mod logging; // Logging utilities
pub mod models; // Domain records shared by every crate
pub mod services; // Service abstractions

// Re-export error types and utilities for easier access
pub use error::{
    external_service_error, internal_error, not_found, validation_error, HttpStatusCode,
    PixbridgeError,
};

// Re-export HTTP utilities for easier access
pub use http::client::client_builder;

pub use models::{
    ChargeState, NewTransaction, SettlementRecord, StoredTransaction, TransactionStatus,
    WebhookPayload,
};
pub use services::{BoxFuture, PixProvider, TransactionStore, WebhookNotifier};
