use std::net::SocketAddr;

use anyhow::Context;
use axum::{extract::Request, ServiceExt};
use clap::Args;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::database::manager;
use crate::state::AppState;

#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    #[arg(long, help = "Port to listen on (overrides PORT)")]
    pub port: Option<u16>,

    #[arg(long, help = "Keep data in process memory instead of Postgres")]
    pub in_memory: bool,
}

pub async fn handle(args: ServeArgs) -> anyhow::Result<()> {
    let mut config = AppConfig::from_env()?;
    if let Some(port) = args.port {
        config.port = port;
    }
    config.jwt_secret()?;

    info!("Starting storefront API in {:?} mode", config.environment);

    let port = config.port;
    let state = if args.in_memory {
        warn!("Using the in-memory store; data is lost on shutdown");
        AppState::in_memory(config)
    } else {
        let url = config.database_url()?.to_string();
        let pool = manager::connect(&url, &config.database)
            .await
            .with_context(|| format!("failed to connect to {}", manager::redact_url(&url)))?;
        manager::migrate(&pool).await.context("failed to apply schema")?;
        AppState::postgres(pool, config)
    };

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    info!("Server running on port {}", port);

    let service = crate::service(state);
    axum::serve(listener, ServiceExt::<Request>::into_make_service(service))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
