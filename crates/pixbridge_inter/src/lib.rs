// --- File: crates/pixbridge_inter/src/lib.rs ---
//! Banco Inter Pix integration: credential handling, the authenticated API
//! client, schema translation and the charge endpoints.

pub mod auth;
pub mod client;
pub mod doc;
pub mod error;
pub mod handlers;
pub mod mappers;
pub mod models;
pub mod routes;
pub mod service;
pub mod wire;

// Re-export for main backend
pub use auth::{AuthenticationError, Credential, CredentialCache, InterTokenSource, TokenSource};
pub use client::InterClient;
pub use error::InterError;
pub use handlers::InterState;
pub use routes::routes;
pub use service::InterPixService;
