// --- File: crates/services/pixbridge_backend/src/lib.rs ---
pub mod app;

pub use app::{build_router, AppState, StartupError};
