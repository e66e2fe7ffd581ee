// --- File: crates/pixbridge_inter/src/auth.rs ---
//! OAuth2 client-credentials handling for the Inter API.
//!
//! [`CredentialCache`] owns the bearer token. Callers ask it for a token on
//! every request; it answers from the cache while the token is still valid
//! (safety margin already subtracted) and otherwise starts exactly one
//! refresh, which every concurrent caller awaits.

use futures::future::{BoxFuture, FutureExt, Shared};
use pixbridge_config::InterConfig;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, info, warn};

pub const TOKEN_PATH: &str = "/oauth/v2/token";

/// Failure to obtain a credential. Cloned to every caller waiting on the
/// same refresh.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AuthenticationError {
    #[error("token request failed: {0}")]
    Request(String),

    #[error("token endpoint returned {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("invalid token response: {0}")]
    InvalidResponse(String),
}

/// A bearer token and the instant after which it must not be handed out.
#[derive(Debug, Clone, PartialEq)]
pub struct Credential {
    pub token: String,
    pub expires_at: Instant,
}

impl Credential {
    pub fn is_valid_at(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// A token as issued by the authorization server.
#[derive(Debug, Clone, PartialEq)]
pub struct IssuedToken {
    pub access_token: String,
    pub expires_in: Duration,
}

/// Where fresh tokens come from.
pub trait TokenSource: Send + Sync + 'static {
    fn fetch(&self) -> BoxFuture<'static, Result<IssuedToken, AuthenticationError>>;
}

type RefreshFuture = Shared<BoxFuture<'static, Result<Credential, AuthenticationError>>>;

struct Inner {
    source: Arc<dyn TokenSource>,
    safety_margin: Duration,
    cached: Mutex<Option<Credential>>,
    inflight: Mutex<Option<RefreshFuture>>,
}

/// Single-flight credential cache, cheap to clone.
#[derive(Clone)]
pub struct CredentialCache {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for CredentialCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialCache")
            .field("safety_margin", &self.inner.safety_margin)
            .finish_non_exhaustive()
    }
}

// The guarded values stay consistent even if a holder panicked.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl CredentialCache {
    pub fn new(source: Arc<dyn TokenSource>, safety_margin: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                source,
                safety_margin,
                cached: Mutex::new(None),
                inflight: Mutex::new(None),
            }),
        }
    }

    /// Returns a credential that is valid for at least the safety margin.
    pub async fn get_token(&self) -> Result<Credential, AuthenticationError> {
        if let Some(credential) = self.cached_valid() {
            return Ok(credential);
        }

        let refresh = {
            let mut inflight = lock(&self.inner.inflight);
            // a refresh may have landed between the first check and the lock
            if let Some(credential) = self.cached_valid() {
                return Ok(credential);
            }
            match inflight.as_ref() {
                Some(refresh) => {
                    debug!("Joining in-flight token refresh");
                    refresh.clone()
                }
                None => {
                    let refresh = self.start_refresh();
                    *inflight = Some(refresh.clone());
                    refresh
                }
            }
        };

        refresh.await
    }

    /// Drops the cached credential so the next call refreshes.
    pub fn invalidate(&self) {
        debug!("Invalidating cached credential");
        lock(&self.inner.cached).take();
    }

    fn cached_valid(&self) -> Option<Credential> {
        lock(&self.inner.cached)
            .as_ref()
            .filter(|credential| credential.is_valid_at(Instant::now()))
            .cloned()
    }

    fn start_refresh(&self) -> RefreshFuture {
        let inner = Arc::clone(&self.inner);
        async move {
            info!("Requesting new Inter access token");
            let result = inner
                .source
                .fetch()
                .await
                .and_then(|issued| credential_from(issued, inner.safety_margin));

            match &result {
                Ok(credential) => {
                    *lock(&inner.cached) = Some(credential.clone());
                }
                Err(e) => warn!("Token refresh failed: {}", e),
            }
            // cleared after the cache is written so late callers hit the cache
            lock(&inner.inflight).take();
            result
        }
        .boxed()
        .shared()
    }
}

fn credential_from(
    issued: IssuedToken,
    safety_margin: Duration,
) -> Result<Credential, AuthenticationError> {
    if issued.expires_in <= safety_margin {
        return Err(AuthenticationError::InvalidResponse(format!(
            "token lifetime {}s does not exceed the {}s safety margin",
            issued.expires_in.as_secs(),
            safety_margin.as_secs()
        )));
    }
    Ok(Credential {
        token: issued.access_token,
        expires_at: Instant::now() + (issued.expires_in - safety_margin),
    })
}

#[derive(Debug, Serialize)]
struct TokenRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    grant_type: &'a str,
    scope: &'a str,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    expires_in: Option<u64>,
}

/// Fetches tokens from Inter's `/oauth/v2/token` endpoint.
#[derive(Debug, Clone)]
pub struct InterTokenSource {
    http: reqwest::Client,
    token_url: String,
    client_id: String,
    client_secret: String,
    scope: String,
}

impl InterTokenSource {
    /// `http` must carry the mTLS identity Inter issued for this account.
    pub fn new(http: reqwest::Client, config: &InterConfig) -> Self {
        Self {
            http,
            token_url: format!("{}{}", config.base_url.trim_end_matches('/'), TOKEN_PATH),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            scope: config.scope().to_string(),
        }
    }

    async fn request_token(&self) -> Result<IssuedToken, AuthenticationError> {
        let form = serde_urlencoded::to_string(TokenRequest {
            client_id: &self.client_id,
            client_secret: &self.client_secret,
            grant_type: "client_credentials",
            scope: &self.scope,
        })
        .map_err(|e| AuthenticationError::Request(e.to_string()))?;

        let response = self
            .http
            .post(&self.token_url)
            .header(
                reqwest::header::CONTENT_TYPE,
                "application/x-www-form-urlencoded",
            )
            .body(form)
            .send()
            .await
            .map_err(|e| AuthenticationError::Request(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AuthenticationError::Request(e.to_string()))?;

        if !status.is_success() {
            return Err(AuthenticationError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| AuthenticationError::InvalidResponse(e.to_string()))?;
        let access_token = parsed
            .access_token
            .filter(|token| !token.is_empty())
            .ok_or_else(|| AuthenticationError::InvalidResponse("missing access_token".into()))?;
        let expires_in = parsed
            .expires_in
            .ok_or_else(|| AuthenticationError::InvalidResponse("missing expires_in".into()))?;

        Ok(IssuedToken {
            access_token,
            expires_in: Duration::from_secs(expires_in),
        })
    }
}

impl TokenSource for InterTokenSource {
    fn fetch(&self) -> BoxFuture<'static, Result<IssuedToken, AuthenticationError>> {
        let source = self.clone();
        async move { source.request_token().await }.boxed()
    }
}
