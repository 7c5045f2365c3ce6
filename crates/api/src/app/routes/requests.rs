use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Query, rejection::JsonRejection},
    response::IntoResponse,
};

use lablink_infra::NewRequest;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub async fn list_pending(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.run(|engine| engine.list_pending()).await {
        Ok(records) => Json(records).into_response(),
        Err(res) => res,
    }
}

pub async fn list_loans(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.run(|engine| engine.list_active_loans()).await {
        Ok(records) => Json(records).into_response(),
        Err(res) => res,
    }
}

pub async fn list_rejected(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.run(|engine| engine.list_rejected()).await {
        Ok(records) => Json(records).into_response(),
        Err(res) => res,
    }
}

pub async fn submit(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::SubmitRequestBody>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };

    let parsed = dto::parse_item_id(&body.item_id)
        .and_then(|item_id| Ok((item_id, dto::parse_return_date(&body.return_date)?)));
    let (item_id, return_date) = match parsed {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let new = NewRequest {
        item_id,
        student_name: body.student_name,
        reg_no: body.reg_no,
        return_date,
    };

    match services.run(move |engine| engine.submit(new)).await {
        Ok(request) => Json(dto::RequestCreatedResponse {
            success: true,
            message: "Request sent".to_string(),
            request,
        })
        .into_response(),
        Err(res) => res,
    }
}

pub async fn handle_request(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::HandleRequestBody>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };

    let parsed = dto::parse_request_id(&body.request_id)
        .and_then(|request_id| Ok((request_id, dto::parse_decision(&body.action)?)));
    let (request_id, decision) = match parsed {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.run(move |engine| engine.decide(request_id, decision)).await {
        Ok(outcome) => {
            let message = format!("Request {}", outcome.decision().past_tense());
            Json(dto::MessageResponse::ok(message)).into_response()
        }
        Err(res) => res,
    }
}

pub async fn student_history(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::HistoryQuery>,
) -> axum::response::Response {
    match services.run(move |engine| engine.history(&query.reg_no)).await {
        Ok(history) => Json(history).into_response(),
        Err(res) => res,
    }
}
