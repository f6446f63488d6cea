//! Interaction Logger
//!
//! Accepts question/response interactions over HTTP, optionally grades them
//! with a language model, and traces each one to LangSmith.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client ──POST /api/logging──▶ http::handlers
//!                                      │ validate (request.rs)
//!                                      ▼
//!                               recorder::InteractionRecorder
//!                                 │            │
//!                    health::ConnectivityProbe │
//!                                              ▼
//!                               trace::TraceScope("storeInteraction")
//!                                              │
//!                                              ▼ (optional)
//!                               trace::TraceScope("completion")
//!                                 → completion::OpenAiClient ──▶ completion service
//!                                              │
//!                                              ▼
//!                               trace exporter ──▶ LangSmith /runs
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use interaction_logger::config::loader::{apply_env_overrides, load_config, ConfigError};
use interaction_logger::config::validation::validate_config;
use interaction_logger::config::AppConfig;
use interaction_logger::observability::{logging, metrics};
use interaction_logger::{HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "interaction-logger")]
#[command(about = "Records and traces question/response interactions", long_about = None)]
struct Args {
    /// Path to a TOML config file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    validate_config(&config).map_err(ConfigError::Validation)?;

    logging::init_logging(&config.observability);

    tracing::info!("interaction-logger v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        tracing_enabled = config.langsmith.tracing_enabled,
        project = %config.langsmith.project,
        completion_enabled = config.completion.enabled,
        require_user_id = config.validation.require_user_id,
        "Configuration loaded"
    );

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    if config.observability.metrics_enabled {
        // validate_config already checked this address
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        }
    }

    let server = HttpServer::new(config)?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    shutdown.trigger_on_signal();

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
