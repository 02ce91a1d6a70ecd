use axum::{
    extract::{Multipart, Path, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use std::sync::Arc;
use tera::Context;

use crate::error::ProxyError;
use crate::models::CheckSummary;
use crate::proxy::{view_result, ProxyReply};
use crate::state::AppState;
use crate::view::detail::CheckDetailView;
use crate::view::listing::{DashboardView, HistoryView, StatusFilter};
use crate::view::poll::{CheckSource, POLL_INTERVAL};
use crate::view::upload::{
    accept_file, submit_outcome, DocumentKind, SubmitOutcome, MAX_UPLOAD_BYTES, PROGRESS_CAP,
    PROGRESS_STEP, PROGRESS_TICK,
};

use super::api::read_file_field;

const DASHBOARD_FALLBACK: &str = "Failed to load dashboard data";

pub async fn index(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let (key, checks) = tokio::join!(state.proxy.key_details(), state.proxy.list_checks());
    let view = DashboardView::from_outcomes(
        view_result(key, DASHBOARD_FALLBACK),
        check_list(checks, DASHBOARD_FALLBACK),
    );

    let mut ctx = Context::new();
    ctx.insert("key", &view.key_panel());
    ctx.insert("checks", &view.rows());
    ctx.insert("completed_count", &view.completed_count());
    ctx.insert("in_progress_count", &view.in_progress_count());
    ctx.insert("error", &view.error);
    render_template("dashboard.html", ctx)
}

#[derive(Deserialize)]
pub struct HistoryQuery {
    filter: Option<String>,
}

pub async fn history(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HistoryQuery>,
) -> impl IntoResponse {
    let filter = query
        .filter
        .as_deref()
        .map(StatusFilter::from_name)
        .unwrap_or_default();
    let view = HistoryView::from_outcome(
        check_list(state.proxy.list_checks().await, "Failed to fetch checks"),
        filter,
    );
    render_history(&view)
}

pub async fn delete_history(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let deleted = state.proxy.delete_all().await;

    let view = match deleted {
        Ok(reply) if reply.is_success() => {
            let mut view = HistoryView::default();
            view.clear();
            view
        }
        other => {
            let message = match other {
                Ok(reply) => reply.error_message("Failed to delete checks"),
                Err(e) => e.to_string(),
            };
            let mut view = HistoryView::from_outcome(
                check_list(state.proxy.list_checks().await, "Failed to fetch checks"),
                StatusFilter::All,
            );
            view.error = Some(message);
            view
        }
    };
    render_history(&view)
}

fn check_list(
    result: Result<ProxyReply, ProxyError>,
    fallback: &str,
) -> Result<Vec<CheckSummary>, String> {
    view_result::<Vec<serde_json::Value>>(result, fallback).map(CheckSummary::decode_all)
}

fn render_history(view: &HistoryView) -> Html<String> {
    let rows = view.rows();
    let mut ctx = Context::new();
    ctx.insert("total", &view.checks().len());
    ctx.insert("filter", view.filter.as_str());
    ctx.insert("tabs", &view.tabs());
    ctx.insert("checks", &rows);
    ctx.insert("error", &view.error);
    render_template("history.html", ctx)
}

fn upload_context(error: Option<String>) -> Context {
    let mut ctx = Context::new();
    let accepted: Vec<&str> = DocumentKind::ALL.iter().map(|k| k.mime()).collect();
    let labels: Vec<&str> = DocumentKind::ALL.iter().map(|k| k.label()).collect();
    ctx.insert("accepted_mimes", &accepted);
    ctx.insert("labels", &labels);
    ctx.insert("max_bytes", &MAX_UPLOAD_BYTES);
    ctx.insert("progress_step", &PROGRESS_STEP);
    ctx.insert("progress_cap", &PROGRESS_CAP);
    ctx.insert("progress_tick_ms", &(PROGRESS_TICK.as_millis() as u64));
    ctx.insert("error", &error);
    ctx
}

pub async fn upload_page() -> impl IntoResponse {
    render_template("upload.html", upload_context(None))
}

pub async fn upload_handler(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Response {
    let upload = match read_file_field(multipart).await {
        Some(upload) => upload,
        None => {
            let ctx = upload_context(Some(ProxyError::MissingFile.to_string()));
            return render_template("upload.html", ctx).into_response();
        }
    };

    let declared = upload.content_type.as_deref().unwrap_or_default();
    let file = match accept_file(&upload.file_name, declared, upload.bytes) {
        Ok((_, file)) => file,
        Err(rejection) => {
            let ctx = upload_context(Some(rejection.to_string()));
            return render_template("upload.html", ctx).into_response();
        }
    };

    match submit_outcome(state.proxy.submit_check(Some(file)).await) {
        SubmitOutcome::Created { check_id, location } => {
            tracing::info!("Submitted check {}", check_id);
            Redirect::to(&location).into_response()
        }
        SubmitOutcome::Rejected(message) => {
            render_template("upload.html", upload_context(Some(message))).into_response()
        }
    }
}

pub async fn check_page(
    State(state): State<Arc<AppState>>,
    Path(check_id): Path<String>,
) -> impl IntoResponse {
    let mut view = CheckDetailView::new(&check_id);
    view.apply(state.proxy.fetch_check(&check_id).await);

    let mut ctx = Context::new();
    ctx.insert("check_id", &check_id);
    ctx.insert("check", &view.snapshot());
    ctx.insert(
        "error",
        &match view.phase() {
            crate::view::detail::DetailPhase::Failed(message) => Some(message),
            _ => None,
        },
    );
    // The page keeps refreshing while open, whatever the status.
    ctx.insert("poll_ms", &(POLL_INTERVAL.as_millis() as u64));
    render_template("check.html", ctx)
}

fn render_template(name: &str, ctx: Context) -> Html<String> {
    let tera = crate::templates::get_tera();
    let rendered = tera.render(name, &ctx).unwrap_or_else(|e| {
        tracing::error!("Template {} failed to render: {:?}", name, e);
        format!("Template error: {}", name)
    });
    Html(rendered)
}
