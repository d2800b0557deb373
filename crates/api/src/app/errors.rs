use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use catalog_core::CatalogError;

/// Generic message returned for every 5xx; the real cause goes to the log.
pub const SERVER_ERROR_MESSAGE: &str = "an error occurred";

pub fn catalog_error_to_response(err: CatalogError, diagnostics: bool) -> axum::response::Response {
    match err {
        CatalogError::InvalidArgument(msg) => {
            json_error(StatusCode::BAD_REQUEST, "invalid_argument", msg)
        }
        CatalogError::EmptyResult => json_error(
            StatusCode::BAD_REQUEST,
            "empty_result",
            "none of the requested ids exist",
        ),
        CatalogError::ConstraintViolation(detail) => {
            tracing::warn!(%detail, "catalog constraint violated");
            json_error(
                StatusCode::BAD_REQUEST,
                "constraint_violation",
                "the item breaks a catalog constraint",
            )
        }
        CatalogError::NotFound(what) => {
            json_error(StatusCode::NOT_FOUND, "not_found", format!("{what} not found"))
        }
        CatalogError::StoreUnavailable(detail) => server_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "store_unavailable",
            detail,
            diagnostics,
        ),
    }
}

/// Map an unreadable request body; axum picks the status (400, 415, 422...).
pub fn body_rejection_to_response(rejection: JsonRejection, diagnostics: bool) -> axum::response::Response {
    let status = rejection.status();
    if status.is_server_error() {
        return server_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal_error",
            rejection.body_text(),
            diagnostics,
        );
    }
    json_error(status, "invalid_body", rejection.body_text())
}

/// 5xx body: fixed message, internal detail only in diagnostic mode.
pub fn server_error(
    status: StatusCode,
    code: &'static str,
    detail: impl Into<String>,
    diagnostics: bool,
) -> axum::response::Response {
    let detail = detail.into();
    tracing::error!(code, %detail, status = status.as_u16(), "request failed");

    let body = if diagnostics {
        json!({ "error": code, "message": SERVER_ERROR_MESSAGE, "detail": detail })
    } else {
        json!({ "error": code, "message": SERVER_ERROR_MESSAGE })
    };
    (status, axum::Json(body)).into_response()
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_map_to_4xx() {
        let cases = [
            (CatalogError::invalid_argument("bad"), StatusCode::BAD_REQUEST),
            (CatalogError::EmptyResult, StatusCode::BAD_REQUEST),
            (CatalogError::constraint("fk"), StatusCode::BAD_REQUEST),
            (CatalogError::not_found("item 9"), StatusCode::NOT_FOUND),
        ];
        for (err, status) in cases {
            assert_eq!(catalog_error_to_response(err, false).status(), status);
        }
    }

    #[test]
    fn unavailable_store_is_503() {
        let res = catalog_error_to_response(CatalogError::unavailable("pool closed"), false);
        assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    async fn body(res: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn server_error_hides_detail_unless_diagnostics() {
        let quiet = body(server_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", "boom", false)).await;
        assert_eq!(quiet["message"], SERVER_ERROR_MESSAGE);
        assert!(quiet.get("detail").is_none());

        let loud = body(server_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", "boom", true)).await;
        assert_eq!(loud["error"], "internal_error");
        assert_eq!(loud["detail"], "boom");
    }
}
