use axum::{
    extract::{multipart::MultipartRejection, Multipart, Path, State},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tracing::warn;

use crate::error::ProxyError;
use crate::models::ReportKind;
use crate::proxy::ProxyReply;
use crate::state::AppState;
use crate::upstream::UploadedFile;

fn respond(result: Result<ProxyReply, ProxyError>) -> Response {
    match result {
        Ok(reply) => reply.into_response(),
        Err(e) => e.into_response(),
    }
}

/// Pull the `file` field out of an upload form. A malformed form counts as
/// having no file.
pub(crate) async fn read_file_field(mut multipart: Multipart) -> Option<UploadedFile> {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => return None,
            Err(e) => {
                warn!("Unreadable upload form: {}", e);
                return None;
            }
        };
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().unwrap_or("upload").to_string();
        let content_type = field.content_type().map(str::to_string);
        return match field.bytes().await {
            Ok(bytes) => Some(UploadedFile {
                file_name,
                content_type,
                bytes,
            }),
            Err(e) => {
                warn!("Could not read uploaded file {}: {}", file_name, e);
                None
            }
        };
    }
}

pub async fn submit_check(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    if !state.config.has_api_key() {
        return ProxyError::ApiKeyMissing.into_response();
    }

    let upload = match multipart {
        Ok(multipart) => read_file_field(multipart).await,
        Err(rejection) => {
            warn!("Rejected upload body: {}", rejection);
            None
        }
    };
    respond(state.proxy.submit_check(upload).await)
}

pub async fn check_details(
    State(state): State<Arc<AppState>>,
    Path(check_id): Path<String>,
) -> Response {
    respond(state.proxy.check_details(&check_id).await)
}

pub async fn list_checks(State(state): State<Arc<AppState>>) -> Response {
    respond(state.proxy.list_checks().await)
}

pub async fn delete_all_checks(State(state): State<Arc<AppState>>) -> Response {
    respond(state.proxy.delete_all().await)
}

pub async fn key_details(State(state): State<Arc<AppState>>) -> Response {
    respond(state.proxy.key_details().await)
}

pub async fn ai_report(
    State(state): State<Arc<AppState>>,
    Path(check_id): Path<String>,
) -> Response {
    respond(state.proxy.report(ReportKind::Ai, &check_id).await)
}

pub async fn plagiarism_report(
    State(state): State<Arc<AppState>>,
    Path(check_id): Path<String>,
) -> Response {
    respond(state.proxy.report(ReportKind::Plagiarism, &check_id).await)
}

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "healthy": true,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
