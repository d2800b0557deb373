use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Extension, Path, Query,
    },
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use catalog_core::{ItemId, ItemTypeId};
use catalog_items::PageRequest;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_items).post(create_item).put(update_item))
        .route("/:id", get(get_item))
        .route("/withname/:name", get(list_by_name))
        .route("/type/all", get(list_all_types_items))
        .route("/type/all/:type_id", get(list_by_type))
}

fn page_from(query: &dto::ItemsQuery) -> Result<PageRequest, axum::response::Response> {
    PageRequest::from_query(query.page_size, query.page_index)
        .map_err(|e| errors::catalog_error_to_response(e, false))
}

fn bad_query(rejection: QueryRejection) -> axum::response::Response {
    errors::json_error(StatusCode::BAD_REQUEST, "invalid_argument", rejection.body_text())
}

/// `GET /items?pageSize&pageIndex` or `GET /items?ids=1,2,3`.
pub async fn list_items(
    Extension(services): Extension<Arc<AppServices>>,
    query: Result<Query<dto::ItemsQuery>, QueryRejection>,
) -> axum::response::Response {
    let Query(query) = match query {
        Ok(q) => q,
        Err(e) => return bad_query(e),
    };

    if let Some(ids) = query.ids.as_deref() {
        return match services.catalog.list_by_ids(ids).await {
            Ok(items) => (StatusCode::OK, Json(items)).into_response(),
            Err(e) => errors::catalog_error_to_response(e, services.diagnostics),
        };
    }

    let page = match page_from(&query) {
        Ok(p) => p,
        Err(res) => return res,
    };
    match services.catalog.list_paged(page).await {
        Ok(envelope) => (StatusCode::OK, Json(envelope)).into_response(),
        Err(e) => errors::catalog_error_to_response(e, services.diagnostics),
    }
}

pub async fn get_item(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: i64 = match id.trim().parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_argument", "invalid item id")
        }
    };
    match services.catalog.get_by_id(id).await {
        Ok(item) => (StatusCode::OK, Json(item)).into_response(),
        Err(e) => errors::catalog_error_to_response(e, services.diagnostics),
    }
}

pub async fn list_by_name(
    Extension(services): Extension<Arc<AppServices>>,
    Path(name): Path<String>,
    query: Result<Query<dto::ItemsQuery>, QueryRejection>,
) -> axum::response::Response {
    let Query(query) = match query {
        Ok(q) => q,
        Err(e) => return bad_query(e),
    };
    if name.is_empty() {
        return errors::json_error(StatusCode::BAD_REQUEST, "invalid_argument", "name prefix is required");
    }
    let page = match page_from(&query) {
        Ok(p) => p,
        Err(res) => return res,
    };
    match services.catalog.list_by_name_prefix(&name, page).await {
        Ok(envelope) => (StatusCode::OK, Json(envelope)).into_response(),
        Err(e) => errors::catalog_error_to_response(e, services.diagnostics),
    }
}

/// `GET /items/type/all`: every item, native order.
pub async fn list_all_types_items(
    Extension(services): Extension<Arc<AppServices>>,
    query: Result<Query<dto::ItemsQuery>, QueryRejection>,
) -> axum::response::Response {
    let Query(query) = match query {
        Ok(q) => q,
        Err(e) => return bad_query(e),
    };
    type_listing(&services, None, &query).await
}

/// `GET /items/type/all/{typeId}`
pub async fn list_by_type(
    Extension(services): Extension<Arc<AppServices>>,
    Path(type_id): Path<String>,
    query: Result<Query<dto::ItemsQuery>, QueryRejection>,
) -> axum::response::Response {
    let Query(query) = match query {
        Ok(q) => q,
        Err(e) => return bad_query(e),
    };
    let type_id: ItemTypeId = match type_id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_argument", "invalid type id")
        }
    };
    type_listing(&services, Some(type_id), &query).await
}

async fn type_listing(
    services: &AppServices,
    type_id: Option<ItemTypeId>,
    query: &dto::ItemsQuery,
) -> axum::response::Response {
    let page = match page_from(query) {
        Ok(p) => p,
        Err(res) => return res,
    };
    match services.catalog.list_by_type(type_id, page).await {
        Ok(envelope) => (StatusCode::OK, Json(envelope)).into_response(),
        Err(e) => errors::catalog_error_to_response(e, services.diagnostics),
    }
}

pub async fn create_item(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::CreateItemRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(e) => return errors::body_rejection_to_response(e, services.diagnostics),
    };
    match services.catalog.create_item(body.into_new_item()).await {
        Ok(id) => created(id),
        Err(e) => errors::catalog_error_to_response(e, services.diagnostics),
    }
}

/// `PUT /items`: the body carries the id of the item to replace.
pub async fn update_item(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::UpdateItemRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(e) => return errors::body_rejection_to_response(e, services.diagnostics),
    };
    match services.catalog.update_item(body.into_item()).await {
        Ok(id) => created(id),
        Err(e) => errors::catalog_error_to_response(e, services.diagnostics),
    }
}

/// `DELETE /{id}` (mounted at the catalog root, not under `/items`).
pub async fn delete_item(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: i64 = match id.trim().parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_argument", "invalid item id")
        }
    };
    match services.catalog.delete_item(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::catalog_error_to_response(e, services.diagnostics),
    }
}

fn created(id: ItemId) -> axum::response::Response {
    (
        StatusCode::CREATED,
        [(header::LOCATION, dto::item_location(id))],
        Json(dto::created_json(id)),
    )
        .into_response()
}
