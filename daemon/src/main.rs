//! Vouch daemon: runs a guarantor node with its WebSocket server.

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use vouch_node::{GuarantorService, NodeConfig};
use vouch_store::MemoryStore;
use vouch_websocket::WebSocketServer;

#[derive(Parser)]
#[command(name = "vouch-daemon", about = "Vouch guarantor credential node")]
struct Cli {
    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Shared HMAC secret for credential and token signing.
    #[arg(long, env = "VOUCH_SECRET")]
    secret: Option<String>,

    /// WebSocket server port.
    #[arg(long, env = "VOUCH_WS_PORT")]
    ws_port: Option<u16>,

    /// Reject scanned credentials whose tracked status is no longer active.
    #[arg(long, env = "VOUCH_STRICT_VALIDATION")]
    strict_validation: Option<bool>,

    /// Maximum audit events kept in memory before the oldest are dropped.
    #[arg(long, env = "VOUCH_AUDIT_CAPACITY")]
    audit_capacity: Option<usize>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "VOUCH_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "VOUCH_LOG_FORMAT")]
    log_format: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let base = match cli.config {
        Some(ref path) => NodeConfig::from_toml_file(path)?,
        None => NodeConfig::default(),
    };
    let config = NodeConfig {
        secret: cli.secret.unwrap_or(base.secret),
        websocket_port: cli.ws_port.unwrap_or(base.websocket_port),
        strict_validation: cli.strict_validation.unwrap_or(base.strict_validation),
        audit_capacity: cli.audit_capacity.unwrap_or(base.audit_capacity),
        log_level: cli.log_level.unwrap_or(base.log_level),
        log_format: cli.log_format.unwrap_or(base.log_format),
    };

    vouch_utils::init_tracing(&config.log_level, config.log_format == "json");
    if let Some(ref path) = cli.config {
        tracing::info!("loaded config from {}", path.display());
    }
    if config.secret == NodeConfig::default().secret {
        tracing::warn!("running with the built-in development secret; set VOUCH_SECRET");
    }

    let service = Arc::new(GuarantorService::new(
        &config.secret,
        Arc::new(MemoryStore::new()),
        config.audit_capacity,
        config.strict_validation,
    ));

    tracing::info!(
        port = config.websocket_port,
        strict = config.strict_validation,
        "starting vouch node"
    );

    let server = WebSocketServer::new(config.websocket_port, service.hub());
    server
        .run(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutdown signal received, stopping node");
        })
        .await?;

    let stats = service.stats();
    tracing::info!(
        credentials = stats.stored,
        audited = stats.audit.recorded,
        "vouch daemon exited cleanly"
    );
    Ok(())
}
