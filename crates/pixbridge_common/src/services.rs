// --- File: crates/pixbridge_common/src/services.rs ---
//! Service abstractions for the external collaborators of the reconciler.
//!
//! The payment rail, the persistence layer and the integrator's webhook sink
//! are all reached through these traits so that the reconciler can be driven
//! against in-memory doubles in tests.

use chrono::{DateTime, Utc};
use std::future::Future;
use std::pin::Pin;

use crate::models::{
    ChargeState, NewTransaction, SettlementRecord, StoredTransaction, TransactionStatus,
    WebhookPayload,
};

/// Type alias for a boxed future that returns a Result
pub type BoxFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;

/// Charge operations against the payment rail.
///
/// Every call carries a valid bearer credential; implementations fail with
/// their provider error on non-success responses.
pub trait PixProvider: Send + Sync {
    /// Error type returned by provider operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Issue an immediate charge under `txid` for `amount` (decimal string).
    fn create_charge(&self, txid: &str, amount: &str) -> BoxFuture<'_, ChargeState, Self::Error>;

    /// Fetch the authoritative state of a charge.
    fn get_charge(&self, txid: &str) -> BoxFuture<'_, ChargeState, Self::Error>;

    /// List received payments for `txid` between `from` and `to`.
    fn get_settlements(
        &self,
        txid: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> BoxFuture<'_, Vec<SettlementRecord>, Self::Error>;
}

/// Read/write contract over persisted transactions, keyed by `txid`.
///
/// Updates are single-row and atomic.
pub trait TransactionStore: Send + Sync {
    /// Error type returned by store operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Persist a freshly issued charge.
    fn insert(&self, transaction: NewTransaction) -> BoxFuture<'_, StoredTransaction, Self::Error>;

    /// Look a transaction up by its provider id.
    fn find_by_txid(&self, txid: &str) -> BoxFuture<'_, Option<StoredTransaction>, Self::Error>;

    /// `ACTIVE` transactions created at or after `since`, newest first.
    fn list_active_since(
        &self,
        since: DateTime<Utc>,
    ) -> BoxFuture<'_, Vec<StoredTransaction>, Self::Error>;

    /// Move a transaction that is still `ACTIVE` to `status`.
    ///
    /// Returns `false` when the row was not `ACTIVE` anymore (or does not
    /// exist), in which case nothing was written.
    fn update_status(
        &self,
        txid: &str,
        status: TransactionStatus,
    ) -> BoxFuture<'_, bool, Self::Error>;

    /// Record the payer's tax id. Rows no longer `ACTIVE` are left as they are.
    fn update_tax_id(&self, txid: &str, tax_id: &str) -> BoxFuture<'_, (), Self::Error>;
}

/// Outbound notification to the integrator.
pub trait WebhookNotifier: Send + Sync {
    /// Error type returned when delivery fails.
    type Error: std::error::Error + Send + Sync + 'static;

    /// POST `payload` to `callback_url`. A single attempt, no retries.
    fn notify(&self, callback_url: &str, payload: &WebhookPayload)
        -> BoxFuture<'_, (), Self::Error>;
}
