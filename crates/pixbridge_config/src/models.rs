// --- File: crates/pixbridge_config/src/models.rs ---

use serde::{Deserialize, Serialize};
use std::time::Duration;

// --- General Server Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

// --- Database Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DatabaseConfig {
    pub url: String, // e.g. sqlite://data/pixbridge.db, via PIXBRIDGE__DATABASE__URL
}

// --- Banco Inter Config ---
// Non-secret Inter settings. The client secret is usually "secret_from_env"
// and resolved from INTER_CLIENT_SECRET at load time.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct InterConfig {
    #[serde(default = "default_inter_base_url")]
    pub base_url: String,
    pub client_id: String,
    pub client_secret: String,
    /// PEM certificate issued by Inter for mutual TLS.
    pub cert_path: Option<String>,
    /// PEM private key matching `cert_path`.
    pub key_path: Option<String>,
    /// Pix key that receives the charges.
    pub pix_key: String,
    pub scope: Option<String>,
    #[serde(default = "default_token_safety_margin_secs")]
    pub token_safety_margin_secs: u64,
    #[serde(default = "default_charge_expiration_secs")]
    pub charge_expiration_secs: u64,
    pub payer_request: Option<String>,
}

impl InterConfig {
    pub fn token_safety_margin(&self) -> Duration {
        Duration::from_secs(self.token_safety_margin_secs)
    }

    pub fn scope(&self) -> &str {
        self.scope
            .as_deref()
            .unwrap_or("cob.read cob.write cobv.read cobv.write pix.read")
    }
}

fn default_inter_base_url() -> String {
    "https://cdpj.partners.bancointer.com.br".to_string()
}

fn default_token_safety_margin_secs() -> u64 {
    300
}

fn default_charge_expiration_secs() -> u64 {
    3600
}

// --- Reconciler Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ReconcilerConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    /// ACTIVE transactions older than this are presumed abandoned.
    #[serde(default = "default_recency_window_minutes")]
    pub recency_window_minutes: i64,
    /// How far back the settlement lookup searches for the payer's tax id.
    #[serde(default = "default_settlement_lookback_hours")]
    pub settlement_lookback_hours: i64,
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            poll_interval_secs: default_poll_interval_secs(),
            recency_window_minutes: default_recency_window_minutes(),
            settlement_lookback_hours: default_settlement_lookback_hours(),
            max_concurrency: default_max_concurrency(),
        }
    }
}

impl ReconcilerConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }

    pub fn recency_window(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.recency_window_minutes)
    }

    pub fn settlement_lookback(&self) -> chrono::Duration {
        chrono::Duration::hours(self.settlement_lookback_hours)
    }
}

fn default_true() -> bool {
    true
}

fn default_poll_interval_secs() -> u64 {
    30
}

fn default_recency_window_minutes() -> i64 {
    40
}

fn default_settlement_lookback_hours() -> i64 {
    48
}

fn default_max_concurrency() -> usize {
    8
}

// --- Outbound Webhook Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct WebhookConfig {
    #[serde(default = "default_webhook_timeout_secs")]
    pub timeout_secs: u64,
    /// When set, outbound bodies are signed with HMAC-SHA256.
    pub signing_secret: Option<String>,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_webhook_timeout_secs(),
            signing_secret: None,
        }
    }
}

impl WebhookConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_webhook_timeout_secs() -> u64 {
    5
}

// --- Unified App Configuration ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    // Server config is mandatory
    pub server: ServerConfig,

    #[serde(default)]
    pub database: Option<DatabaseConfig>,
    #[serde(default)]
    pub inter: Option<InterConfig>,
    #[serde(default)]
    pub reconciler: ReconcilerConfig,
    #[serde(default)]
    pub webhook: WebhookConfig,
}
