//! Chat relay server binary.
//!
//! Loads configuration, initializes tracing, and runs the relay until the
//! process is terminated.

use std::sync::Arc;

use dotenvy::dotenv;
use mimalloc::MiMalloc;

use chat_relay::config::{self, AppConfig};
use chat_relay::{server, telemetry};

/// Global allocator for improved performance (M-MIMALLOC-APPS).
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() {
    // Initialize tracing (M-LOG-STRUCTURED)
    telemetry::init();

    // Load .env (if present)
    let _ = dotenv();

    let config = match AppConfig::load() {
        Ok(config) => Arc::new(config),
        Err(err) => {
            eprintln!("Configuration error: {err}");
            std::process::exit(1);
        }
    };

    let settings = match config::load_completion_settings() {
        Ok(settings) => settings,
        Err(msg) => {
            eprintln!("Configuration error: {msg}");
            std::process::exit(1);
        }
    };

    if let Err(err) = server::start_server(config, settings).await {
        eprintln!("Server error: {err:?}");
        std::process::exit(1);
    }
}
