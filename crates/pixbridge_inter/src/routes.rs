// --- File: crates/pixbridge_inter/src/routes.rs ---
use crate::client::InterClient;
use crate::handlers::{
    authorize_recurring_charge_handler, create_charge_handler, create_recurring_charge_handler,
    get_charge_handler, get_recurring_charge_handler, InterState,
};
use axum::{
    routing::{get, post},
    Router,
};
use pixbridge_common::{PixbridgeError, TransactionStore};
use std::sync::Arc;

/// Creates a router containing all charge routes.
pub fn routes<S>(client: Arc<InterClient>, store: Arc<S>) -> Router
where
    S: TransactionStore + 'static,
    PixbridgeError: From<S::Error>,
{
    let inter_state = Arc::new(InterState { client, store });

    Router::new()
        .route("/charge", post(create_charge_handler::<S>))
        .route("/charge/{txid}", get(get_charge_handler::<S>))
        .route(
            "/recurring-charge",
            post(create_recurring_charge_handler::<S>),
        )
        .route(
            "/recurring-charge/{txid}",
            get(get_recurring_charge_handler::<S>),
        )
        .route(
            "/recurring-charge/{txid}/authorize",
            post(authorize_recurring_charge_handler::<S>),
        )
        .with_state(inter_state)
}
