// --- File: crates/pixbridge_inter/src/models.rs ---
//! Public (English) request and response bodies of the charge endpoints.

use pixbridge_common::TransactionStatus;
use serde::{Deserialize, Serialize};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// Request to issue an immediate charge.
#[derive(Debug, Clone, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct CreateChargeRequest {
    /// Amount in BRL, e.g. 10.5
    #[cfg_attr(feature = "openapi", schema(example = 10.5))]
    pub value: f64,
    /// Merchant-side order reference echoed in the completion webhook
    #[cfg_attr(feature = "openapi", schema(example = "order-1234"))]
    pub internal_id: String,
    #[cfg_attr(feature = "openapi", schema(example = "https://merchant.example/pix-hook"))]
    pub callback_url: Option<String>,
    pub tax_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct ChargeCalendar {
    pub creation: Option<String>,
    pub expiration: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ChargeLocation {
    pub id: i64,
    pub location: String,
    pub charge_type: String,
    pub creation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct ChargeDebtor {
    pub cpf: Option<String>,
    pub cnpj: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct ChargeValue {
    pub original: String,
}

/// An immediate charge as exposed to integrators.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ChargeResponse {
    pub calendar: ChargeCalendar,
    pub txid: String,
    pub revision: Option<u32>,
    pub location: Option<ChargeLocation>,
    pub status: TransactionStatus,
    pub debtor: Option<ChargeDebtor>,
    pub value: ChargeValue,
    pub key: Option<String>,
    pub payer_request: Option<String>,
    pub pix_copy_paste: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct RecurringCalendar {
    /// Due date, `YYYY-MM-DD`
    #[cfg_attr(feature = "openapi", schema(example = "2025-08-01"))]
    pub due_date: String,
    /// Days the charge stays payable after the due date
    pub validity_after_due: Option<u32>,
    #[serde(default, skip_deserializing)]
    pub creation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct RecurringDebtor {
    pub cpf: Option<String>,
    pub cnpj: Option<String>,
    pub name: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct RecurringReceiver {
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub cnpj: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct RecurringValue {
    #[cfg_attr(feature = "openapi", schema(example = "150.00"))]
    pub original: String,
    /// Whether the payer may change the amount (0 = no, 1 = yes)
    pub change_mode: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct AdditionalInfo {
    pub name: String,
    pub value: String,
}

/// Request to issue a due-date charge.
#[derive(Debug, Clone, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct CreateRecurringChargeRequest {
    pub calendar: RecurringCalendar,
    pub debtor: RecurringDebtor,
    pub value: RecurringValue,
    /// Pix key receiving the payment; the configured key when absent
    pub key: Option<String>,
    pub payer_request: Option<String>,
    pub additional_info: Option<Vec<AdditionalInfo>>,
}

/// Lifecycle of a due-date charge; it has one state more than an immediate
/// charge while the provider is still registering it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecurringChargeStatus {
    Processing,
    Active,
    Completed,
    RemovedByUser,
    RemovedByPsp,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct RecurringChargeResponse {
    pub calendar: RecurringCalendar,
    pub txid: Option<String>,
    pub revision: Option<u32>,
    pub location: Option<ChargeLocation>,
    pub status: Option<RecurringChargeStatus>,
    pub debtor: RecurringDebtor,
    pub receiver: Option<RecurringReceiver>,
    pub value: RecurringValue,
    pub key: String,
    pub payer_request: Option<String>,
    pub additional_info: Option<Vec<AdditionalInfo>>,
    pub pix_copy_paste: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthorizationStatus {
    Authorized,
    Denied,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct AuthorizeRecurringChargeResponse {
    pub txid: String,
    pub status: AuthorizationStatus,
    pub revision: Option<u32>,
}
