// --- File: crates/pixbridge_inter/src/client.rs ---
use chrono::{DateTime, SecondsFormat, Utc};
use pixbridge_common::client_builder;
use pixbridge_config::InterConfig;
use reqwest::{Client, Identity, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

use crate::auth::{CredentialCache, InterTokenSource};
use crate::error::InterError;
use crate::wire;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Authenticated client for the Inter Pix API.
///
/// Every request carries a bearer token from the [`CredentialCache`]. A `401`
/// drops the cached token and the request is replayed once with a fresh one.
#[derive(Debug, Clone)]
pub struct InterClient {
    http: Client,
    base_url: String,
    config: Arc<InterConfig>,
    credentials: CredentialCache,
}

impl InterClient {
    /// Builds the mTLS client from `cert_path`/`key_path` when both are set.
    pub fn new(config: &InterConfig) -> Result<Self, InterError> {
        let mut builder = client_builder(REQUEST_TIMEOUT, false);
        match (&config.cert_path, &config.key_path) {
            (Some(cert_path), Some(key_path)) => {
                builder = builder.identity(load_identity(cert_path, key_path)?);
            }
            (None, None) => {
                warn!("Inter client built without a TLS client certificate");
            }
            _ => {
                return Err(InterError::ConfigError(
                    "cert_path and key_path must be set together".to_string(),
                ))
            }
        }
        let http = builder.build()?;

        let source = Arc::new(InterTokenSource::new(http.clone(), config));
        let credentials = CredentialCache::new(source, config.token_safety_margin());
        Ok(Self::with_credentials(http, config, credentials))
    }

    /// Assembles a client around an existing HTTP client and credential cache.
    pub fn with_credentials(
        http: Client,
        config: &InterConfig,
        credentials: CredentialCache,
    ) -> Self {
        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            config: Arc::new(config.clone()),
            credentials,
        }
    }

    pub fn config(&self) -> &InterConfig {
        &self.config
    }

    pub fn credentials(&self) -> &CredentialCache {
        &self.credentials
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `PUT /pix/v2/cob/{txid}`
    pub async fn create_charge(&self, txid: &str, amount: &str) -> Result<wire::Cob, InterError> {
        let body = wire::CobRequest {
            calendario: wire::CobCalendarioRequest {
                expiracao: self.config.charge_expiration_secs,
            },
            valor: wire::Valor {
                original: amount.to_string(),
            },
            chave: self.config.pix_key.clone(),
            solicitacao_pagador: self.config.payer_request.clone(),
        };
        let url = self.url(&format!("/pix/v2/cob/{}", txid));
        debug!("Creating Inter charge {}", txid);
        self.send(|http| http.put(&url).json(&body)).await
    }

    /// `GET /pix/v2/cob/{txid}`
    pub async fn get_charge(&self, txid: &str) -> Result<wire::Cob, InterError> {
        let url = self.url(&format!("/pix/v2/cob/{}", txid));
        self.send(|http| http.get(&url)).await
    }

    /// `GET /pix/v2/pix` filtered to one txid and a time window.
    pub async fn list_received(
        &self,
        txid: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<wire::PixRecebidos, InterError> {
        let url = self.url("/pix/v2/pix");
        let query = [
            ("inicio", from.to_rfc3339_opts(SecondsFormat::Secs, true)),
            ("fim", to.to_rfc3339_opts(SecondsFormat::Secs, true)),
            ("txid", txid.to_string()),
        ];
        self.send(|http| http.get(&url).query(&query)).await
    }

    /// `POST /pix/v2/cobv`
    pub async fn create_recurring_charge(
        &self,
        body: &wire::CobvRequest,
    ) -> Result<wire::Cobv, InterError> {
        let url = self.url("/pix/v2/cobv");
        self.send(|http| http.post(&url).json(body)).await
    }

    /// `GET /pix/v2/cobv/{txid}`
    pub async fn get_recurring_charge(&self, txid: &str) -> Result<wire::Cobv, InterError> {
        let url = self.url(&format!("/pix/v2/cobv/{}", txid));
        self.send(|http| http.get(&url)).await
    }

    /// `POST /pix/v2/cobv/{txid}/autorizar`
    pub async fn authorize_recurring_charge(
        &self,
        txid: &str,
    ) -> Result<wire::AutorizacaoResponse, InterError> {
        let url = self.url(&format!("/pix/v2/cobv/{}/autorizar", txid));
        let body = wire::AutorizacaoRequest {
            txid: txid.to_string(),
        };
        self.send(|http| http.post(&url).json(&body)).await
    }

    async fn send<T, F>(&self, build: F) -> Result<T, InterError>
    where
        T: DeserializeOwned,
        F: Fn(&Client) -> RequestBuilder,
    {
        let credential = self.credentials.get_token().await?;
        let mut response = build(&self.http)
            .bearer_auth(&credential.token)
            .send()
            .await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            warn!("Inter rejected the bearer token, refreshing and retrying once");
            self.credentials.invalidate();
            let credential = self.credentials.get_token().await?;
            response = build(&self.http)
                .bearer_auth(&credential.token)
                .send()
                .await?;
        }

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            error!("Inter API error ({}): {}", status, body);
            return Err(InterError::ApiError {
                status_code: status.as_u16(),
                body,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

fn load_identity(cert_path: &str, key_path: &str) -> Result<Identity, InterError> {
    let mut pem = std::fs::read(cert_path).map_err(|e| {
        InterError::ConfigError(format!("cannot read certificate {}: {}", cert_path, e))
    })?;
    let key = std::fs::read(key_path)
        .map_err(|e| InterError::ConfigError(format!("cannot read key {}: {}", key_path, e)))?;
    pem.push(b'\n');
    pem.extend_from_slice(&key);
    Identity::from_pem(&pem)
        .map_err(|e| InterError::ConfigError(format!("invalid client identity: {}", e)))
}
