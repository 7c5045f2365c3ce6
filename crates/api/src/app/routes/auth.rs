use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

/// Check the admin login. The token is opaque and not checked anywhere else.
pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::LoginRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };

    if !services.admin().matches(&body.email, &body.password) {
        warn!(email = %body.email.trim(), "admin login failed");
        return errors::json_error(StatusCode::UNAUTHORIZED, "unauthorized", "Invalid credentials");
    }

    info!(email = %body.email.trim(), "admin logged in");
    Json(dto::LoginResponse {
        success: true,
        token: Uuid::new_v4().simple().to_string(),
    })
    .into_response()
}
