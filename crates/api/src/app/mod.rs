//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store selection and shared handler state
//! - `routes/`: HTTP routes + handlers
//! - `dto.rs`: request DTOs and response helpers
//! - `errors.rs`: mapping of catalog errors to JSON responses

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;

use catalog_infra::CatalogConfig;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router from configuration (used by `main.rs`).
pub async fn build_app(config: &CatalogConfig) -> anyhow::Result<Router> {
    let services = services::build_services(config).await?;
    Ok(build_router(services))
}

/// Router over already-built services; tests use this with their own store.
pub fn build_router(services: services::AppServices) -> Router {
    let catalog = routes::router().layer(Extension(Arc::new(services)));

    Router::new()
        .route("/health", get(routes::system::health))
        .nest(dto::CATALOG_BASE_PATH, catalog)
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(middleware::request_context))
                .layer(middleware::cors_layer()),
        )
}
