// --- File: crates/pixbridge_common/src/models.rs ---
//! Domain records shared between the provider client, the store and the
//! reconciler.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle of a Pix charge as stored locally.
///
/// `ACTIVE` is the only non-terminal state; once a transaction leaves it,
/// nothing moves it again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    Active,
    Completed,
    RemovedByUser,
    RemovedByPsp,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Active => "ACTIVE",
            TransactionStatus::Completed => "COMPLETED",
            TransactionStatus::RemovedByUser => "REMOVED_BY_USER",
            TransactionStatus::RemovedByPsp => "REMOVED_BY_PSP",
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ACTIVE" => Ok(TransactionStatus::Active),
            "COMPLETED" => Ok(TransactionStatus::Completed),
            "REMOVED_BY_USER" => Ok(TransactionStatus::RemovedByUser),
            "REMOVED_BY_PSP" => Ok(TransactionStatus::RemovedByPsp),
            other => Err(format!("unknown transaction status: {}", other)),
        }
    }
}

/// A persisted transaction, keyed by the provider-assigned `txid`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct StoredTransaction {
    pub id: String,
    pub txid: String,
    pub internal_id: String,
    pub tax_id: Option<String>,
    pub status: TransactionStatus,
    pub callback_url: Option<String>,
    /// Decimal amount with two places, e.g. "10.50".
    pub amount: String,
    pub pix_copy_paste: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied when a charge is first issued.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub txid: String,
    pub internal_id: String,
    pub tax_id: Option<String>,
    pub status: TransactionStatus,
    pub callback_url: Option<String>,
    pub amount: String,
    pub pix_copy_paste: Option<String>,
}

/// Provider view of a charge, reduced to what reconciliation needs.
#[derive(Debug, Clone, PartialEq)]
pub struct ChargeState {
    pub txid: String,
    pub status: TransactionStatus,
    pub amount: String,
    pub pix_copy_paste: Option<String>,
}

/// One received Pix as reported by the provider.
#[derive(Debug, Clone, PartialEq)]
pub struct SettlementRecord {
    pub end_to_end_id: String,
    pub txid: Option<String>,
    pub amount: String,
    pub paid_at: Option<DateTime<Utc>>,
    /// CPF or CNPJ of the payer, when the provider discloses it.
    pub payer_tax_id: Option<String>,
}

/// Body POSTed to the integrator's `callbackUrl` on completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookPayload {
    pub status: TransactionStatus,
    pub tax_id: Option<String>,
    pub internal_id: String,
}
