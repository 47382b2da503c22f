//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store selection and engine/dispatcher wiring
//! - `routes/`: HTTP routes + handlers (one file per role area)
//! - `dto.rs`: request/response DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{routing::get, Extension, Router};

use corpcredit_auth::Hs256TokenCodec;
use corpcredit_ledger::LedgerStore;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router with the env-selected store
/// (public entrypoint used by `main.rs`).
pub async fn build_app(jwt_secret: String) -> anyhow::Result<Router> {
    let store = services::store_from_env().await?;
    Ok(build_app_with_store(&jwt_secret, store))
}

/// Build the router over an explicit store (tests inject an in-memory one).
pub fn build_app_with_store(jwt_secret: &str, store: Arc<dyn LedgerStore>) -> Router {
    let codec = Arc::new(Hs256TokenCodec::new(jwt_secret.as_bytes()));
    let services = Arc::new(services::AppServices::new(store, codec.clone()));
    let auth_state = middleware::AuthState { codec };

    // Protected routes: bearer token required.
    let protected = routes::router()
        .layer(Extension(services.clone()))
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::auth_middleware,
        ));

    // The socket authenticates via its first frame, not the bearer middleware.
    Router::new()
        .route("/health", get(routes::system::health))
        .route("/ws", get(routes::ws::notifications_socket))
        .layer(Extension(services))
        .merge(protected)
}
