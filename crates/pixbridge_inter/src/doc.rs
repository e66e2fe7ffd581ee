// --- File: crates/pixbridge_inter/src/doc.rs ---
#![allow(dead_code)]
#![cfg(feature = "openapi")]
use utoipa::OpenApi;

use crate::models::{
    AdditionalInfo, AuthorizationStatus, AuthorizeRecurringChargeResponse, ChargeCalendar,
    ChargeDebtor, ChargeLocation, ChargeResponse, ChargeValue, CreateChargeRequest,
    CreateRecurringChargeRequest, RecurringCalendar, RecurringChargeResponse,
    RecurringChargeStatus, RecurringDebtor, RecurringReceiver, RecurringValue,
};
use pixbridge_common::TransactionStatus;

#[utoipa::path(
    post,
    path = "/charge",
    request_body(content = CreateChargeRequest, example = json!({
        "value": 10.5,
        "internalId": "order-1234",
        "callbackUrl": "https://merchant.example/pix-hook"
    })),
    responses(
        (status = 201, description = "Charge issued and recorded as ACTIVE", body = ChargeResponse),
        (status = 400, description = "Invalid amount, internalId or callbackUrl"),
        (status = 502, description = "Inter rejected the request or returned an unknown status")
    ),
    tag = "Pix"
)]
fn doc_create_charge_handler() {}

#[utoipa::path(
    get,
    path = "/charge/{txid}",
    params(("txid" = String, Path, description = "Provider transaction id")),
    responses(
        (status = 200, description = "Current provider view of the charge", body = ChargeResponse),
        (status = 404, description = "Unknown txid"),
        (status = 502, description = "Inter unavailable")
    ),
    tag = "Pix"
)]
fn doc_get_charge_handler() {}

#[utoipa::path(
    post,
    path = "/recurring-charge",
    request_body = CreateRecurringChargeRequest,
    responses(
        (status = 201, description = "Due-date charge issued", body = RecurringChargeResponse),
        (status = 400, description = "Bad Request"),
        (status = 502, description = "Inter unavailable")
    ),
    tag = "Pix Recurring"
)]
fn doc_create_recurring_charge_handler() {}

#[utoipa::path(
    get,
    path = "/recurring-charge/{txid}",
    params(("txid" = String, Path, description = "Provider transaction id")),
    responses(
        (status = 200, description = "Due-date charge", body = RecurringChargeResponse),
        (status = 404, description = "Unknown txid")
    ),
    tag = "Pix Recurring"
)]
fn doc_get_recurring_charge_handler() {}

#[utoipa::path(
    post,
    path = "/recurring-charge/{txid}/authorize",
    params(("txid" = String, Path, description = "Provider transaction id")),
    responses(
        (status = 200, description = "Authorization outcome", body = AuthorizeRecurringChargeResponse),
        (status = 404, description = "Unknown txid")
    ),
    tag = "Pix Recurring"
)]
fn doc_authorize_recurring_charge_handler() {}

#[derive(OpenApi)]
#[openapi(
    paths(
        doc_create_charge_handler,
        doc_get_charge_handler,
        doc_create_recurring_charge_handler,
        doc_get_recurring_charge_handler,
        doc_authorize_recurring_charge_handler
    ),
    components(
        schemas(
            CreateChargeRequest, ChargeResponse, ChargeCalendar, ChargeLocation, ChargeDebtor,
            ChargeValue, TransactionStatus,
            CreateRecurringChargeRequest, RecurringChargeResponse, RecurringCalendar,
            RecurringDebtor, RecurringReceiver, RecurringValue, RecurringChargeStatus,
            AdditionalInfo, AuthorizeRecurringChargeResponse, AuthorizationStatus
        )
    ),
    tags(
        (name = "Pix", description = "Immediate Pix charges"),
        (name = "Pix Recurring", description = "Due-date Pix charges")
    )
)]
pub struct InterApiDoc;
