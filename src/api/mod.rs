//! API module
//!
//! HTTP JSON surface over the ledger.

pub mod extract;
pub mod middleware;
pub mod routes;

use axum::{middleware::from_fn, routing::get, Router};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::ledger::Ledger;

pub use routes::create_router;

/// Build the application router
pub fn app(ledger: Ledger) -> Router {
    let api_router = create_router().layer(from_fn(middleware::logging_middleware));

    Router::new()
        // Health check
        .route("/health", get(health_check))
        .nest("/api/v1", api_router)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(ledger)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
