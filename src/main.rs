//! MemberPress webhook receiver
//!
//! Receives MemberPress lifecycle webhooks, classifies them offline from a
//! file, or checks a member's subscription over the REST API.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use memberpress_webhooks::client::MemberpressClient;
use memberpress_webhooks::config::MemberpressConfig;
use memberpress_webhooks::events::classify_slice;
use memberpress_webhooks::webhook::{router, AppState, JsonLinesEventLog};
use tracing_subscriber::EnvFilter;

/// MemberPress webhook receiver
#[derive(Parser, Debug)]
#[command(name = "mp-webhooks")]
#[command(version)]
#[command(about = "Receive, classify and validate MemberPress webhooks")]
struct Args {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the webhook receiver
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8000")]
        port: u16,

        /// Host to bind to
        #[arg(short = 'H', long, default_value = "127.0.0.1")]
        host: String,

        /// Append the delivery audit log to this JSON-lines file instead of
        /// keeping it in memory
        #[arg(long)]
        event_log: Option<PathBuf>,
    },

    /// Classify a webhook payload stored in a JSON file
    Classify {
        /// Path to the payload
        file: PathBuf,
    },

    /// Check whether a member holds an active subscription
    CheckMember {
        /// WordPress username
        username: String,
    },
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    match args.command {
        Command::Classify { file } => classify_file(&file),
        Command::Serve {
            port,
            host,
            event_log,
        } => {
            let config = MemberpressConfig::from_env().context("loading configuration")?;
            tokio::runtime::Runtime::new()?.block_on(serve(config, &host, port, event_log))
        }
        Command::CheckMember { username } => {
            let config = MemberpressConfig::from_env().context("loading configuration")?;
            tokio::runtime::Runtime::new()?.block_on(check_member(config, &username))
        }
    }
}

fn classify_file(file: &Path) -> anyhow::Result<()> {
    let body = std::fs::read(file).with_context(|| format!("reading {}", file.display()))?;
    let event = classify_slice(&body)?;

    let report = serde_json::json!({
        "event": event.event(),
        "received_event": event.received_event_name(),
        "type": event.event_type(),
        "is_valid": event.is_valid(),
        "error": event.validation_error().map(ToString::to_string),
        "has_member": event.has_member(),
        "has_membership": event.has_membership(),
        "has_subscription": event.has_subscription(),
        "has_transaction": event.has_transaction(),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

async fn serve(
    config: MemberpressConfig,
    host: &str,
    port: u16,
    event_log: Option<PathBuf>,
) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .with_context(|| format!("invalid listen address {host}:{port}"))?;

    let state = match event_log {
        Some(path) => {
            tracing::info!(path = %path.display(), "Recording deliveries to file");
            AppState::new(
                Arc::new(JsonLinesEventLog::new(path)),
                config.sensitive_keys.clone(),
            )
        }
        None => AppState::from_config(&config),
    };
    let state = Arc::new(state);
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!("MemberPress webhook receiver listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("MemberPress webhook receiver stopped");
    Ok(())
}

async fn check_member(config: MemberpressConfig, username: &str) -> anyhow::Result<()> {
    let client = MemberpressClient::new(config)?;
    let member = client.get_member(username).await?;
    let active = client.is_active_subscription(username).await;

    println!(
        "{} (id {}): {}",
        member.username().unwrap_or(username),
        member.id().map(|id| id.to_string()).unwrap_or_else(|| "?".to_string()),
        if active { "active subscription" } else { "no active subscription" }
    );
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
    }
}
