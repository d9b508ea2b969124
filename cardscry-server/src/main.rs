//! Cardscry Server
//!
//! REST API for trading-card identification by perceptual fingerprints.
//!
//! Endpoints:
//! - POST /scry - identify a card from an uploaded photo
//! - GET /health - service health report
//! - GET /ready - readiness probe
//! - GET /docs - Swagger UI

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use cardscry_core::PgCatalog;
use cardscry_server::{create_router_with_config, AppState, Config};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cardscry_server=info,tower_http=info".into()),
        )
        .init();

    let config = Config::from_env();

    let pg_catalog = match &config.database_url {
        Some(url) => {
            match PgCatalog::connect_with_limits(
                url,
                config.database_max_connections,
                config.database_min_connections,
            )
            .await
            {
                Ok(catalog) => Some(Arc::new(catalog)),
                Err(e) => {
                    tracing::error!(error = %e, "failed to connect to card catalog");
                    std::process::exit(1);
                }
            }
        }
        None => {
            tracing::warn!("DATABASE_URL not set; /scry will answer 503");
            None
        }
    };

    let state = match &pg_catalog {
        Some(catalog) => AppState::with_catalog(catalog.clone()),
        None => AppState::new(),
    }
    .with_config(&config);

    let app = create_router_with_config(state, &config);

    let addr = config.socket_addr();
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(error = %e, %addr, "failed to bind listen address");
            std::process::exit(1);
        }
    };

    tracing::info!(%addr, "cardscry-server listening");

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %e, "server error");
    }

    if let Some(catalog) = pg_catalog {
        catalog.close().await;
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install ctrl-c handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => tracing::error!(error = %e, "failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
