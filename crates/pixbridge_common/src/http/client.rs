// --- File: crates/pixbridge_common/src/http/client.rs ---
use reqwest::{Client, ClientBuilder};
use std::time::Duration;

/// Returns a client builder with the timeout and redirect policy applied.
///
/// Callers that need extra settings (TLS identity, default headers) continue
/// from here before calling `build()`.
pub fn client_builder(timeout: Duration, follow_redirects: bool) -> ClientBuilder {
    Client::builder()
        .timeout(timeout)
        .redirect(if follow_redirects {
            reqwest::redirect::Policy::default()
        } else {
            reqwest::redirect::Policy::none()
        })
}
