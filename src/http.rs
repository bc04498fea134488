//! HTTP transport for celebration-rsvp
//!
//! Axum server hosting the JSON API plus plain health and info endpoints.
//! CORS is open unless `RSVP_ALLOWED_ORIGIN` pins a single origin.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderValue, Method, header},
    response::IntoResponse,
    routing::get,
};
use serde_json::json;
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::{Config, redact_url};
use crate::routes::{AppState, api_router};
use crate::sheets::{Sheet, SheetClient};

/// Health check endpoint
pub async fn health_handler() -> impl IntoResponse {
    "ok"
}

/// Info endpoint
pub async fn info_handler(State(state): State<AppState>) -> impl IntoResponse {
    let upstream = &state.config.upstream;
    let sheets: serde_json::Map<String, serde_json::Value> = Sheet::ALL
        .iter()
        .map(|sheet| {
            let value = upstream
                .endpoint(*sheet)
                .map(|url| json!(redact_url(url)))
                .unwrap_or(serde_json::Value::Null);
            (sheet.as_str().to_string(), value)
        })
        .collect();

    Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "sheets": sheets,
        "upstream": {
            "timeout_ms": upstream.timeout_ms,
            "read_retries": upstream.read_retries
        },
        "admin": {
            "enabled": state.sessions.enabled()
        },
        "server": {
            "bind": state.config.runtime.http_bind.to_string()
        }
    }))
}

fn cors_layer(config: &Config) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);
    match config
        .runtime
        .allowed_origin
        .as_deref()
        .map(HeaderValue::from_str)
    {
        Some(Ok(origin)) => base.allow_origin(origin),
        Some(Err(e)) => {
            tracing::warn!("Invalid RSVP_ALLOWED_ORIGIN ({e}); allowing any origin");
            base.allow_origin(Any)
        }
        None => base.allow_origin(Any),
    }
}

/// Full application router with shared state applied.
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config);
    Router::new()
        .route("/health", get(health_handler))
        .route("/info", get(info_handler))
        .merge(api_router())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server
pub async fn start_http_server(config: Arc<Config>, sheets: SheetClient) -> anyhow::Result<()> {
    let bind = config.runtime.http_bind;
    if config.runtime.admin_passcode.is_none() {
        tracing::info!("RSVP_ADMIN_PASSCODE not set; admin endpoints disabled");
    }
    let app = build_router(AppState::new(config, sheets));

    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind HTTP listener: {}", e))?;

    tracing::info!("Starting HTTP server on {}", bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("HTTP server error: {}", e))?;

    tracing::info!("HTTP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
        tracing::info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
                tracing::info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {e}");
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
}
