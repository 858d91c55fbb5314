//! Algoan Bridge Connector
//!
//! Receives Algoan webhooks and synchronizes Bridge bank accounts and
//! transactions into Algoan.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{middleware, Router};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use algoan_bridge_connector::api::{self, AppState};
use algoan_bridge_connector::clients::{AlgoanHttpClient, BridgeHttpClient};
use algoan_bridge_connector::{Config, InMemoryRegistry, WebhookHandler};

/// Initialize tracing/logging. Production emits one JSON object per line.
fn init_tracing(json: bool) {
    let json_layer = json.then(|| tracing_subscriber::fmt::layer().json());
    let text_layer = (!json).then(tracing_subscriber::fmt::layer);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "algoan_bridge_connector=debug,tower_http=debug".into()),
        )
        .with(json_layer)
        .with(text_layer)
        .init();
}

/// Build the application router
fn build_router(state: AppState) -> Router {
    // Layers run bottom-up: request id is set before logging sees the request
    let hooks = api::create_router()
        .layer(middleware::from_fn(api::middleware::logging_middleware))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid));

    Router::new()
        // Health check
        .route("/health", axum::routing::get(health_check))
        .merge(hooks)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    init_tracing(config.is_production());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    tracing::info!(environment = %config.environment, "Starting Algoan Bridge connector");

    let algoan = Arc::new(AlgoanHttpClient::new(
        config.algoan_base_url.clone(),
        config.algoan_client_id.clone(),
        config.algoan_client_secret.clone(),
        config.http_timeout,
    )?);
    let bridge = Arc::new(BridgeHttpClient::new(
        config.bridge_base_url.clone(),
        config.bridge_password_salt.clone(),
        config.http_timeout,
    )?);

    tracing::info!("Loading service accounts from Algoan...");
    let registry = InMemoryRegistry::bootstrap(
        &*algoan,
        config.hooks_target_url.as_deref(),
        &config.hooks_secret,
    )
    .await?;
    if registry.service_accounts().is_empty() {
        tracing::warn!("No service account configured, every webhook will be rejected");
    }

    let webhook = WebhookHandler::new(Arc::new(registry), algoan, bridge);
    let app = build_router(AppState::new(webhook));

    tracing::info!("Listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shut down. Goodbye!");

    Ok(())
}

/// Shutdown signal handler for graceful shutdown
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}
