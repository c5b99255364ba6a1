//! HTTP API for the wallet server.
//!
//! # Modules
//!
//! - [`wallets`]: wallet lookup, creation and balance operations
//! - [`middleware`]: request IDs, request logging and HTTP metrics
//!
//! # Endpoints Overview
//!
//! ```text
//! GET  /health                               - Health check
//! GET  /api/v1/wallets/{uuid}                - Wallet balance
//! POST /api/v1/wallets/create                - Create empty wallet
//! POST /api/v1/wallets/{uuid}/operation      - Deposit or withdraw
//! ```
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use wl_server::api::{create_router, AppState};
//! use wallet_ledger::wallet::WalletManager;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let state = AppState {
//!     wallet_manager: Arc::new(WalletManager::in_memory()),
//! };
//!
//! let app = create_router(state);
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

pub mod middleware;
pub mod wallets;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use wallet_ledger::wallet::WalletManager;

/// Application state shared across all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub wallet_manager: Arc<WalletManager>,
}

/// Create the complete API router with all endpoints and middleware.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", create_v1_router())
        .layer(axum::middleware::from_fn(
            middleware::request_context_middleware,
        ))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn create_v1_router() -> Router<AppState> {
    Router::new()
        .route("/wallets/create", post(wallets::create_wallet))
        .route("/wallets/{uuid}", get(wallets::get_wallet))
        .route("/wallets/{uuid}/operation", post(wallets::wallet_operation))
}

/// Health check endpoint for monitoring and load balancers.
///
/// Returns `200 OK` when the wallet store answers, `503 Service Unavailable`
/// otherwise.
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let store_healthy = state.wallet_manager.store().health_check().await.is_ok();

    let status_code = if store_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = json!({
        "status": if store_healthy { "healthy" } else { "unhealthy" },
        "version": env!("CARGO_PKG_VERSION"),
        "store": store_healthy,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    (status_code, Json(response))
}
