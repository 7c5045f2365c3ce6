use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;
use tracing::error;

use lablink_core::DomainError;
use lablink_infra::LendingError;

pub fn lending_error_to_response(err: LendingError) -> axum::response::Response {
    match err {
        LendingError::Domain(e) => domain_error_to_response(e),
        LendingError::Store(e) => {
            error!(error = %e, "persisting lab state failed");
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "store_error",
                "could not save changes",
            )
        }
        LendingError::Poisoned => {
            error!("lab state lock poisoned");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", "internal error")
        }
    }
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    let message = err.to_string();
    match err {
        DomainError::NotFound(_) => json_error(StatusCode::NOT_FOUND, "not_found", message),
        DomainError::Validation(_) | DomainError::InvalidId(_) => {
            json_error(StatusCode::BAD_REQUEST, "invalid_input", message)
        }
        DomainError::OutOfStock(_) => json_error(StatusCode::CONFLICT, "out_of_stock", message),
        DomainError::Conflict(_) => json_error(StatusCode::CONFLICT, "conflict", message),
        DomainError::InvariantViolation(_) => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "invariant_violation", message)
        }
    }
}

/// Malformed JSON bodies get the same error shape as everything else.
pub fn json_rejection_to_response(rejection: JsonRejection) -> axum::response::Response {
    json_error(StatusCode::BAD_REQUEST, "invalid_input", rejection.body_text())
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "success": false,
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
    fn domain_errors_map_to_expected_statuses() {
        let cases = [
            (DomainError::not_found("request"), StatusCode::NOT_FOUND),
            (DomainError::validation("qty is required"), StatusCode::BAD_REQUEST),
            (DomainError::invalid_id("item id `x`"), StatusCode::BAD_REQUEST),
            (DomainError::out_of_stock("ESP32"), StatusCode::CONFLICT),
        ];
        for (err, status) in cases {
            assert_eq!(domain_error_to_response(err).status(), status);
        }
    }

    #[test]
    fn poisoned_lock_is_a_server_error() {
        let res = lending_error_to_response(LendingError::Poisoned);
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
