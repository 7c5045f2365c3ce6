use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Path, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};

use lablink_infra::NewItem;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub async fn list_items(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.run(|engine| engine.list_items()).await {
        Ok(items) => Json(items).into_response(),
        Err(res) => res,
    }
}

pub async fn add_item(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::AddItemRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };

    let qty = match dto::parse_qty(&body.qty) {
        Ok(q) => q,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let new = NewItem {
        name: body.name,
        category: body.category,
        qty,
    };

    match services.run(move |engine| engine.add_item(new)).await {
        Ok(item) => (
            StatusCode::CREATED,
            Json(dto::ItemCreatedResponse {
                success: true,
                message: "Item added".to_string(),
                item,
            }),
        )
            .into_response(),
        Err(res) => res,
    }
}

pub async fn delete_item(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let item_id = match dto::parse_item_id(&id) {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.run(move |engine| engine.delete_item(item_id)).await {
        Ok(_) => Json(dto::MessageResponse::ok("Item deleted")).into_response(),
        Err(res) => res,
    }
}
