//! Fixtures shared by the unit tests: a fake detection API served by axum on
//! an ephemeral port, canned payloads, and a helper to run the dashboard
//! itself against that fake.

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::config::Config;
use crate::proxy::Proxy;
use crate::state::AppState;

pub const FAKE_PDF: &[u8] = b"%PDF-1.4\n% fake report\n%%EOF";

pub fn check_json(check_id: &str, status: &str) -> Value {
    json!({
        "_id": format!("db-{check_id}"),
        "checkId": check_id,
        "userId": "user-1",
        "fileId": {
            "_id": "file-1",
            "originalFileName": "essay.txt",
            "storedFileName": "stored-essay.txt",
            "fileSize": 2.0,
            "fileType": "txt"
        },
        "status": status,
        "priority": "normal",
        "planType": "standard",
        "deliveryTime": "2024-01-01T00:00:00Z",
        "createdAt": "2023-12-31T12:00:00Z",
        "updatedAt": "2023-12-31T12:00:00Z"
    })
}

pub fn summary_json(check_id: &str, status: &str, created_at: &str) -> Value {
    let mut value = check_json(check_id, status);
    value["createdAt"] = json!(created_at);
    if let Some(obj) = value.as_object_mut() {
        obj.remove("updatedAt");
    }
    value
}

pub fn key_json(total: u64, used: u64, remaining: u64) -> Value {
    json!({
        "id": "key-1",
        "userId": "user-1",
        "name": "Production",
        "totalChecks": total,
        "checksUsed": used,
        "checksRemaining": remaining,
        "status": "active",
        "expiresAt": "2025-06-30T00:00:00Z",
        "permissions": ["check", "report"],
        "createdAt": "2024-01-01T00:00:00Z",
        "updatedAt": "2024-01-01T00:00:00Z"
    })
}

/// Status and body the fake API answers with, per endpoint.
#[derive(Clone)]
pub struct Canned {
    pub submit: (StatusCode, String),
    pub check: (StatusCode, String),
    pub list: (StatusCode, String),
    pub delete_all: (StatusCode, String),
    pub key: (StatusCode, String),
    /// Error status and body for both report kinds; `None` serves [`FAKE_PDF`].
    pub report_error: Option<(StatusCode, String)>,
}

impl Default for Canned {
    fn default() -> Self {
        Self {
            submit: (
                StatusCode::OK,
                json!({"checkId": "abc123", "deliveryTime": "2024-01-01T00:00:00Z"}).to_string(),
            ),
            check: (StatusCode::OK, check_json("abc123", "pending").to_string()),
            list: (
                StatusCode::OK,
                json!([
                    summary_json("older", "completed", "2024-01-01T00:00:00Z"),
                    summary_json("newer", "processing", "2024-02-01T00:00:00Z"),
                ])
                .to_string(),
            ),
            delete_all: (StatusCode::OK, "All checks deleted successfully".into()),
            key: (StatusCode::OK, key_json(100, 40, 60).to_string()),
            report_error: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SeenRequest {
    pub path: String,
    pub api_key: Option<String>,
    pub check_id: Option<String>,
    pub file_name: Option<String>,
    pub file_len: usize,
}

struct FakeState {
    canned: Canned,
    hits: AtomicUsize,
    seen: Mutex<Vec<SeenRequest>>,
}

impl FakeState {
    fn record(&self, request: SeenRequest) {
        self.hits.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(request);
    }
}

pub struct FakeUpstream {
    pub addr: SocketAddr,
    state: Arc<FakeState>,
}

impl FakeUpstream {
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn hits(&self) -> usize {
        self.state.hits.load(Ordering::SeqCst)
    }

    pub fn seen(&self) -> Vec<SeenRequest> {
        self.state.seen.lock().unwrap().clone()
    }
}

fn canned((status, body): &(StatusCode, String)) -> impl IntoResponse {
    (*status, body.clone())
}

fn seen_from_query(path: &str, query: &HashMap<String, String>) -> SeenRequest {
    SeenRequest {
        path: path.to_string(),
        api_key: query.get("apiKey").cloned(),
        check_id: query.get("checkId").cloned(),
        ..SeenRequest::default()
    }
}

async fn fake_submit(State(state): State<Arc<FakeState>>, mut multipart: Multipart) -> impl IntoResponse {
    let mut seen = SeenRequest {
        path: "/api/check".into(),
        ..SeenRequest::default()
    };
    while let Ok(Some(field)) = multipart.next_field().await {
        match field.name().unwrap_or("") {
            "apiKey" => seen.api_key = field.text().await.ok(),
            "file" => {
                seen.file_name = field.file_name().map(str::to_string);
                seen.file_len = field.bytes().await.map(|b| b.len()).unwrap_or(0);
            }
            _ => {}
        }
    }
    state.record(seen);
    canned(&state.canned.submit)
}

async fn fake_check(
    State(state): State<Arc<FakeState>>,
    Query(query): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    state.record(seen_from_query("/api/check/by-id", &query));
    canned(&state.canned.check)
}

async fn fake_list(
    State(state): State<Arc<FakeState>>,
    Query(query): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    state.record(seen_from_query("/api/checks", &query));
    canned(&state.canned.list)
}

async fn fake_delete_all(State(state): State<Arc<FakeState>>, Json(body): Json<Value>) -> impl IntoResponse {
    state.record(SeenRequest {
        path: "/api/deleteAll".into(),
        api_key: body["apiKey"].as_str().map(str::to_string),
        ..SeenRequest::default()
    });
    canned(&state.canned.delete_all)
}

async fn fake_key(
    State(state): State<Arc<FakeState>>,
    Query(query): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    state.record(seen_from_query("/api/key/details", &query));
    canned(&state.canned.key)
}

async fn fake_report(
    State(state): State<Arc<FakeState>>,
    Path(kind): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> axum::response::Response {
    state.record(seen_from_query(&format!("/api/report/{kind}"), &query));
    match &state.canned.report_error {
        Some(error) => canned(error).into_response(),
        None => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/pdf")],
            FAKE_PDF.to_vec(),
        )
            .into_response(),
    }
}

pub async fn fake_upstream(canned: Canned) -> FakeUpstream {
    let state = Arc::new(FakeState {
        canned,
        hits: AtomicUsize::new(0),
        seen: Mutex::new(Vec::new()),
    });

    let app = Router::new()
        .route("/api/check", post(fake_submit))
        .route("/api/check/by-id", get(fake_check))
        .route("/api/checks", get(fake_list))
        .route("/api/deleteAll", post(fake_delete_all))
        .route("/api/key/details", get(fake_key))
        .route("/api/report/:kind", get(fake_report))
        .layer(DefaultBodyLimit::disable())
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind fake upstream");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move { axum::serve(listener, app).await.expect("serve fake upstream") });

    FakeUpstream { addr, state }
}

pub fn config_for(upstream: &FakeUpstream, api_key: Option<&str>) -> Config {
    Config::new(upstream.base_url(), api_key.map(str::to_string))
}

pub fn proxy_for(upstream: &FakeUpstream, api_key: Option<&str>) -> Proxy {
    Proxy::new(Arc::new(config_for(upstream, api_key))).expect("build proxy")
}

/// Run the dashboard router against `upstream`; returns its base URL.
pub async fn spawn_app(upstream: &FakeUpstream, api_key: Option<&str>) -> String {
    let state = AppState::new(Arc::new(config_for(upstream, api_key))).expect("app state");
    let app = crate::routes::router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind app");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move { axum::serve(listener, app).await.expect("serve app") });

    format!("http://{addr}")
}

/// A client that does not follow redirects, so tests can see `Location`.
pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("http client")
}
