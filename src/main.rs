#![forbid(unsafe_code)]

//! `crash-relay`: Slack Events API relay binary.
//!
//! Loads configuration and credentials, builds the Slack and webhook
//! clients, and serves the events endpoint until Ctrl-C or SIGTERM.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use crash_relay::config::RelayConfig;
use crash_relay::forward::webhook::WebhookForwarder;
use crash_relay::server::{self, ServerState};
use crash_relay::slack::client::SlackService;
use crash_relay::slack::events::EventDispatcher;
use crash_relay::slack::signature::SignatureVerifier;
use crash_relay::{AppError, Result};

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "crash-relay", about = "Slack event relay", version, long_about = None)]
struct Cli {
    /// Optional TOML configuration file; defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log output format (text or json).
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.log_format)?;
    info!("crash-relay bootstrap");

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| AppError::Config(format!("failed to build tokio runtime: {err}")))?
        .block_on(run(args))
}

async fn run(args: Cli) -> Result<()> {
    // ── Load configuration ──────────────────────────────
    let mut config = match args.config {
        Some(path) => RelayConfig::load_from_path(path)?,
        None => RelayConfig::default(),
    };
    config.load_credentials()?;
    info!("configuration loaded");

    // ── Build outbound clients ──────────────────────────
    let slack = SlackService::new(&config.credentials.bot_token).map_err(|err| {
        error!(%err, "slack client init failed");
        err
    })?;
    let webhook =
        WebhookForwarder::new(config.credentials.webhook_url.clone(), config.outbound_timeout())?;

    let dispatcher =
        EventDispatcher::new(Arc::new(slack), Arc::new(webhook), config.outbound_timeout());
    let state = Arc::new(ServerState {
        dispatcher,
        verifier: SignatureVerifier::new(
            config.credentials.signing_secret.clone(),
            config.signature_tolerance_seconds,
        ),
    });

    // ── Start HTTP endpoint ─────────────────────────────
    let bind = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .map_err(|err| AppError::Config(format!("failed to bind {bind}: {err}")))?;

    let ct = CancellationToken::new();
    let server_ct = ct.clone();
    let router = server::router(&config.events_path, state);
    let server_handle = tokio::spawn(async move {
        if let Err(err) = server::serve(listener, router, server_ct).await {
            error!(%err, "http server failed");
        }
    });

    info!(events_path = %config.events_path, "relay ready");

    // ── Wait for shutdown signal ────────────────────────
    shutdown_signal().await;
    info!("shutdown signal received");
    ct.cancel();

    if let Err(err) = server::join_server(server_handle).await {
        error!(%err, "http server task ended abnormally");
    }
    info!("crash-relay shut down");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => {}
                    _ = sigterm.recv() => {}
                }
            }
            Err(err) => {
                tracing::warn!(%err, "failed to register SIGTERM handler, using ctrl-c only");
                let _ = ctrl_c.await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(err) = ctrl_c.await {
            tracing::error!(%err, "ctrl-c signal handler failed");
        }
    }
}

fn init_tracing(log_format: LogFormat) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = fmt().with_env_filter(env_filter);

    match log_format {
        LogFormat::Text => subscriber
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
        LogFormat::Json => subscriber
            .json()
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
    }

    Ok(())
}
