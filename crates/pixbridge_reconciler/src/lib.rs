//! Reconciliation of in-flight Pix charges and completion webhooks.

pub mod poller;
pub mod webhook;

pub use poller::{
    Clock, PassReport, Reconciler, ReconcilerHandle, ReconcilerSettings, SystemClock,
};
pub use webhook::{sign_payload, DeliveryError, HttpWebhookNotifier, SIGNATURE_HEADER};
