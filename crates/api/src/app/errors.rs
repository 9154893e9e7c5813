use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use stockroom_core::{DomainError, FieldViolation};

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::InvalidScope(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_scope", msg),
        DomainError::Validation(violations) => validation_error(violations),
        DomainError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
        DomainError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        DomainError::Constraint(msg) => {
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "constraint_violation", msg)
        }
        DomainError::Unavailable(msg) => {
            json_error(StatusCode::SERVICE_UNAVAILABLE, "unavailable", msg)
        }
    }
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

/// 400 carrying the per-field detail, so clients can highlight inputs.
fn validation_error(violations: Vec<FieldViolation>) -> axum::response::Response {
    (
        StatusCode::BAD_REQUEST,
        axum::Json(json!({
            "error": "validation_failed",
            "violations": violations,
        })),
    )
        .into_response()
}
