use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use pantry_core::DomainError;
use pantry_infra::LedgerError;

pub fn ledger_error_to_response(err: LedgerError) -> axum::response::Response {
    match err {
        LedgerError::Domain(DomainError::Validation(msg)) => {
            json_error(StatusCode::BAD_REQUEST, "validation_error", msg)
        }
        LedgerError::Domain(DomainError::InvariantViolation(msg)) => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "invariant_violation", msg)
        }
        LedgerError::Upload(e) => json_error(StatusCode::BAD_GATEWAY, "upload_failed", e.to_string()),
        LedgerError::Store(e) => {
            tracing::error!(error = %e, "document store failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", e.to_string())
        }
        e @ LedgerError::Decode { .. } => {
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "decode_error", e.to_string())
        }
    }
}

/// Malformed request bodies share the `{error, message}` shape of every other failure.
pub fn json_rejection_to_response(rejection: JsonRejection) -> axum::response::Response {
    match rejection {
        JsonRejection::JsonDataError(_) | JsonRejection::JsonSyntaxError(_) => {
            json_error(StatusCode::BAD_REQUEST, "validation_error", rejection.body_text())
        }
        other => json_error(other.status(), "invalid_body", other.body_text()),
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
