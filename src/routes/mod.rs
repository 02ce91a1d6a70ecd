mod api;
mod pages;

pub use api::*;
pub use pages::*;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::view::upload::MAX_UPLOAD_BYTES;

/// Largest accepted document plus room for multipart framing.
const UPLOAD_BODY_LIMIT: usize = MAX_UPLOAD_BYTES as usize + 1024 * 1024;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/history", get(history))
        .route("/history/delete", post(delete_history))
        .route("/upload", get(upload_page).post(upload_handler))
        .route("/check/:check_id", get(check_page))
        .route("/health", get(health))
        .route("/api/check", post(submit_check))
        .route("/api/check/:check_id", get(check_details))
        .route("/api/checks", get(list_checks).delete(delete_all_checks))
        .route("/api/key/details", get(key_details))
        .route("/api/report/ai/:check_id", get(ai_report))
        .route("/api/report/plagiarism/:check_id", get(plagiarism_report))
        .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT))
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}
