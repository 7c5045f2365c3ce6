use axum::{
    Router,
    routing::{delete, get, post},
};

pub mod auth;
pub mod inventory;
pub mod requests;
pub mod system;

/// Router for everything under `/api`.
pub fn router() -> Router {
    Router::new()
        .route("/components", get(inventory::list_items))
        .route("/add", post(inventory::add_item))
        .route("/delete-item/:id", delete(inventory::delete_item))
        .route("/requests", get(requests::list_pending))
        .route("/loans", get(requests::list_loans))
        .route("/rejected", get(requests::list_rejected))
        .route("/request", post(requests::submit))
        .route("/handle-request", post(requests::handle_request))
        .route("/student-history", get(requests::student_history))
        .route("/login", post(auth::login))
}
