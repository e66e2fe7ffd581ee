//! Logging utilities for pixbridge.
//!
//! Every binary calls [`init`] once at startup; library crates only use the
//! `tracing` macros.

use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber at INFO.
///
/// ```
/// use pixbridge_common::logging;
///
/// logging::init();
/// ```
pub fn init() {
    init_with_level(Level::INFO);
}

/// Initialize the tracing subscriber with a specific level for the pixbridge
/// crates. `RUST_LOG` directives are honoured on top of it.
pub fn init_with_level(level: Level) {
    let mut filter = EnvFilter::from_default_env();
    for krate in [
        "pixbridge_backend",
        "pixbridge_common",
        "pixbridge_db",
        "pixbridge_inter",
        "pixbridge_reconciler",
    ] {
        if let Ok(directive) = format!("{}={}", krate, level).parse() {
            filter = filter.add_directive(directive);
        }
    }

    // try_init: a global subscriber may already be installed (tests)
    let result = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_thread_ids(true),
        )
        .with(filter)
        .try_init();

    if result.is_ok() {
        info!("Logging initialized at level: {}", level);
    }
}
