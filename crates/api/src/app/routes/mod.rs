use axum::{routing::delete, routing::get, Router};

pub mod items;
pub mod system;
pub mod types;

/// Router for everything under the catalog base path.
pub fn router() -> Router {
    Router::new()
        .nest("/items", items::router())
        .route("/catalogtypes", get(types::list_types))
        .route("/:id", delete(items::delete_item))
}
