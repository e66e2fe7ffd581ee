// --- File: crates/pixbridge_inter/src/handlers.rs ---
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use pixbridge_common::{
    validation_error, NewTransaction, PixbridgeError, TransactionStore,
};
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

use crate::client::InterClient;
use crate::mappers::{
    authorization_to_public, charge_to_public, recurring_charge_to_public,
    recurring_request_to_wire,
};
use crate::models::{
    AuthorizeRecurringChargeResponse, ChargeResponse, CreateChargeRequest,
    CreateRecurringChargeRequest, RecurringChargeResponse,
};

// --- State for Inter Handlers ---
pub struct InterState<S> {
    pub client: Arc<InterClient>,
    pub store: Arc<S>,
}

/// Issues an immediate charge and records it as an `ACTIVE` transaction.
pub async fn create_charge_handler<S>(
    State(state): State<Arc<InterState<S>>>,
    Json(payload): Json<CreateChargeRequest>,
) -> Result<(StatusCode, Json<ChargeResponse>), PixbridgeError>
where
    S: TransactionStore + 'static,
    PixbridgeError: From<S::Error>,
{
    validate_charge_request(&payload)?;

    // Inter accepts 26 to 35 alphanumerics
    let txid = Uuid::new_v4().simple().to_string();
    let amount = format!("{:.2}", payload.value);

    let charge = state.client.create_charge(&txid, &amount).await?;
    let response = charge_to_public(charge)?;

    let stored = state
        .store
        .insert(NewTransaction {
            txid: response.txid.clone(),
            internal_id: payload.internal_id,
            tax_id: payload.tax_id,
            status: response.status,
            callback_url: payload.callback_url,
            amount: response.value.original.clone(),
            pix_copy_paste: response.pix_copy_paste.clone(),
        })
        .await
        .map_err(|e| {
            error!("Charge {} issued but not recorded: {}", response.txid, e);
            PixbridgeError::from(e)
        })?;

    info!(
        txid = %stored.txid,
        internal_id = %stored.internal_id,
        "Charge issued for {}",
        stored.amount
    );
    Ok((StatusCode::CREATED, Json(response)))
}

fn validate_charge_request(payload: &CreateChargeRequest) -> Result<(), PixbridgeError> {
    if !payload.value.is_finite() || payload.value <= 0.0 {
        return Err(validation_error("value must be a positive number"));
    }
    if payload.internal_id.trim().is_empty() {
        return Err(validation_error("internalId is required"));
    }
    if let Some(callback_url) = &payload.callback_url {
        let url = reqwest::Url::parse(callback_url)
            .map_err(|e| validation_error(format!("callbackUrl is not a URL: {}", e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(validation_error("callbackUrl must be http or https"));
        }
    }
    Ok(())
}

pub async fn get_charge_handler<S>(
    State(state): State<Arc<InterState<S>>>,
    Path(txid): Path<String>,
) -> Result<Json<ChargeResponse>, PixbridgeError>
where
    S: TransactionStore + 'static,
{
    let charge = state.client.get_charge(&txid).await?;
    Ok(Json(charge_to_public(charge)?))
}

pub async fn create_recurring_charge_handler<S>(
    State(state): State<Arc<InterState<S>>>,
    Json(payload): Json<CreateRecurringChargeRequest>,
) -> Result<(StatusCode, Json<RecurringChargeResponse>), PixbridgeError>
where
    S: TransactionStore + 'static,
{
    if payload.debtor.name.trim().is_empty() {
        return Err(validation_error("debtor.name is required"));
    }
    let body = recurring_request_to_wire(payload, &state.client.config().pix_key);
    let charge = state.client.create_recurring_charge(&body).await?;
    Ok((StatusCode::CREATED, Json(recurring_charge_to_public(charge)?)))
}

pub async fn get_recurring_charge_handler<S>(
    State(state): State<Arc<InterState<S>>>,
    Path(txid): Path<String>,
) -> Result<Json<RecurringChargeResponse>, PixbridgeError>
where
    S: TransactionStore + 'static,
{
    let charge = state.client.get_recurring_charge(&txid).await?;
    Ok(Json(recurring_charge_to_public(charge)?))
}

pub async fn authorize_recurring_charge_handler<S>(
    State(state): State<Arc<InterState<S>>>,
    Path(txid): Path<String>,
) -> Result<Json<AuthorizeRecurringChargeResponse>, PixbridgeError>
where
    S: TransactionStore + 'static,
{
    let response = state.client.authorize_recurring_charge(&txid).await?;
    Ok(Json(authorization_to_public(response)?))
}
