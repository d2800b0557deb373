use std::sync::Arc;

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};

use crate::app::errors;
use crate::app::services::AppServices;

/// `GET /catalogtypes`
pub async fn list_types(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.catalog.list_types().await {
        Ok(types) => (StatusCode::OK, Json(types)).into_response(),
        Err(e) => errors::catalog_error_to_response(e, services.diagnostics),
    }
}
