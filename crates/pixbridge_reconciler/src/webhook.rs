//! Outbound completion notifications to the integrator's `callbackUrl`.

use hmac::{Hmac, Mac};
use pixbridge_common::{client_builder, BoxFuture, WebhookNotifier, WebhookPayload};
use pixbridge_config::WebhookConfig;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use sha2::Sha256;
use thiserror::Error;
use tracing::{debug, warn};

pub const SIGNATURE_HEADER: &str = "X-Pixbridge-Signature";

type HmacSha256 = Hmac<Sha256>;

#[derive(Error, Debug)]
pub enum DeliveryError {
    /// Transport failure or timeout
    #[error("webhook request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The receiver answered with a non-success status
    #[error("webhook rejected with status {status}")]
    Rejected { status: u16 },

    #[error("webhook payload could not be encoded: {0}")]
    Encode(String),
}

/// `sha256=<hex HMAC-SHA256 of body>`
pub fn sign_payload(secret: &str, body: &[u8]) -> Result<String, DeliveryError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| DeliveryError::Encode("invalid signing secret".to_string()))?;
    mac.update(body);
    Ok(format!("sha256={}", hex::encode(mac.finalize().into_bytes())))
}

/// Single-attempt JSON POST with a bounded timeout.
#[derive(Debug, Clone)]
pub struct HttpWebhookNotifier {
    http: Client,
    signing_secret: Option<String>,
}

impl HttpWebhookNotifier {
    pub fn new(config: &WebhookConfig) -> Result<Self, DeliveryError> {
        let http = client_builder(config.timeout(), false).build()?;
        Ok(Self {
            http,
            signing_secret: config.signing_secret.clone().filter(|s| !s.is_empty()),
        })
    }

    async fn deliver(&self, callback_url: &str, payload: &WebhookPayload) -> Result<(), DeliveryError> {
        let body =
            serde_json::to_vec(payload).map_err(|e| DeliveryError::Encode(e.to_string()))?;

        let mut request = self
            .http
            .post(callback_url)
            .header(CONTENT_TYPE, "application/json");
        if let Some(secret) = &self.signing_secret {
            request = request.header(SIGNATURE_HEADER, sign_payload(secret, &body)?);
        }

        let response = request.body(body).send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!("Webhook {} answered {}", callback_url, status);
            return Err(DeliveryError::Rejected {
                status: status.as_u16(),
            });
        }

        debug!("Webhook delivered to {}", callback_url);
        Ok(())
    }
}

impl WebhookNotifier for HttpWebhookNotifier {
    type Error = DeliveryError;

    fn notify(&self, callback_url: &str, payload: &WebhookPayload) -> BoxFuture<'_, (), DeliveryError> {
        let callback_url = callback_url.to_string();
        let payload = payload.clone();
        Box::pin(async move { self.deliver(&callback_url, &payload).await })
    }
}
