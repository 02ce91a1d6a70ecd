//! The proxy contract: one operation per detection API endpoint.
//!
//! Operations return a [`ProxyReply`] that routes turn into HTTP responses
//! and pages read back into view models, so the reshaping rules live here
//! and nowhere else.

use async_trait::async_trait;
use axum::{
    body::{Body, Bytes},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, warn};

use crate::config::Config;
use crate::error::ProxyError;
use crate::models::{CheckDetails, ReportKind};
use crate::upstream::{decode_body, DetectionClient, RawResponse, UploadedFile};
use crate::view::poll::CheckSource;

const UNRECOGNIZED_RESPONSE: &str = "Unrecognized response from detection service";

#[derive(Debug, Clone)]
pub enum ReplyBody {
    Json(Value),
    Pdf { bytes: Bytes, filename: String },
}

#[derive(Debug, Clone)]
pub struct ProxyReply {
    pub status: StatusCode,
    pub body: ReplyBody,
}

impl ProxyReply {
    fn json(status: StatusCode, value: Value) -> Self {
        Self {
            status,
            body: ReplyBody::Json(value),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn json_body(&self) -> Option<&Value> {
        match &self.body {
            ReplyBody::Json(value) => Some(value),
            ReplyBody::Pdf { .. } => None,
        }
    }

    /// Best available message: `error`, then `message`, then `fallback`.
    pub fn error_message(&self, fallback: &str) -> String {
        self.json_body()
            .and_then(|v| {
                ["error", "message"]
                    .iter()
                    .filter_map(|k| v.get(*k).and_then(Value::as_str))
                    .find(|s| !s.is_empty())
            })
            .unwrap_or(fallback)
            .to_string()
    }

    pub fn parse<T: DeserializeOwned>(&self, fallback: &str) -> Result<T, String> {
        if !self.is_success() {
            return Err(self.error_message(fallback));
        }
        let value = self.json_body().ok_or_else(|| fallback.to_string())?;
        serde_json::from_value(value.clone()).map_err(|e| {
            warn!("Could not read upstream payload: {}", e);
            UNRECOGNIZED_RESPONSE.to_string()
        })
    }
}

impl IntoResponse for ProxyReply {
    fn into_response(self) -> Response {
        match self.body {
            ReplyBody::Json(value) => (self.status, Json(value)).into_response(),
            ReplyBody::Pdf { bytes, filename } => Response::builder()
                .status(self.status)
                .header(header::CONTENT_TYPE, "application/pdf")
                .header(
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", filename),
                )
                .body(Body::from(bytes))
                .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response()),
        }
    }
}

/// Collapse a proxy outcome into what a view needs: a typed record or a
/// user-facing message.
pub fn view_result<T: DeserializeOwned>(
    result: Result<ProxyReply, ProxyError>,
    fallback: &str,
) -> Result<T, String> {
    match result {
        Ok(reply) => reply.parse(fallback),
        Err(e) => Err(e.to_string()),
    }
}

#[derive(Clone)]
pub struct Proxy {
    config: Arc<Config>,
    client: DetectionClient,
}

impl Proxy {
    pub fn new(config: Arc<Config>) -> Result<Self, reqwest::Error> {
        let client = DetectionClient::new(&config.api_base_url, config.request_timeout)?;
        Ok(Self { config, client })
    }

    fn api_key(&self) -> Result<&str, ProxyError> {
        self.config
            .api_key
            .as_deref()
            .ok_or(ProxyError::ApiKeyMissing)
    }

    pub async fn submit_check(&self, upload: Option<UploadedFile>) -> Result<ProxyReply, ProxyError> {
        let api_key = self.api_key()?;
        let upload = upload.ok_or(ProxyError::MissingFile)?;
        let raw = self
            .client
            .submit_check(api_key, upload)
            .await
            .map_err(transport("submit check"))?;
        Ok(json_reply(raw))
    }

    pub async fn check_details(&self, check_id: &str) -> Result<ProxyReply, ProxyError> {
        let api_key = self.api_key()?;
        let raw = self
            .client
            .check_by_id(api_key, check_id)
            .await
            .map_err(transport("fetch check details"))?;
        Ok(json_reply(raw))
    }

    pub async fn list_checks(&self) -> Result<ProxyReply, ProxyError> {
        let api_key = self.api_key()?;
        let raw = self
            .client
            .list_checks(api_key)
            .await
            .map_err(transport("fetch checks"))?;
        Ok(json_reply(raw))
    }

    pub async fn delete_all(&self) -> Result<ProxyReply, ProxyError> {
        let api_key = self.api_key()?;
        let raw = self
            .client
            .delete_all(api_key)
            .await
            .map_err(transport("delete checks"))?;

        if raw.is_success() {
            let body = decode_body(&raw.body).into_message_envelope();
            return Ok(ProxyReply::json(StatusCode::OK, body));
        }
        // Failures carry the raw upstream text, JSON or not.
        let text = String::from_utf8_lossy(&raw.body).into_owned();
        Ok(ProxyReply::json(raw.status, serde_json::json!({ "error": text })))
    }

    pub async fn key_details(&self) -> Result<ProxyReply, ProxyError> {
        let api_key = self.api_key()?;
        let raw = self
            .client
            .key_details(api_key)
            .await
            .map_err(transport("fetch API key details"))?;
        Ok(json_reply(raw))
    }

    pub async fn report(&self, kind: ReportKind, check_id: &str) -> Result<ProxyReply, ProxyError> {
        let api_key = self.api_key()?;
        let action = match kind {
            ReportKind::Ai => "fetch AI report",
            ReportKind::Plagiarism => "fetch plagiarism report",
        };
        let raw = self
            .client
            .report(api_key, kind, check_id)
            .await
            .map_err(transport(action))?;

        if !raw.is_success() {
            return Ok(json_reply(raw));
        }
        Ok(ProxyReply {
            status: StatusCode::OK,
            body: ReplyBody::Pdf {
                bytes: raw.body,
                filename: kind.attachment_name(check_id),
            },
        })
    }
}

#[async_trait]
impl CheckSource for Proxy {
    async fn fetch_check(&self, check_id: &str) -> Result<CheckDetails, String> {
        view_result(self.check_details(check_id).await, "Failed to fetch check details")
    }
}

/// Successful answers become 200 with the decoded body; failures keep the
/// upstream status.
fn json_reply(raw: RawResponse) -> ProxyReply {
    let status = if raw.is_success() {
        StatusCode::OK
    } else {
        raw.status
    };
    ProxyReply::json(status, decode_body(&raw.body).into_error_envelope())
}

fn transport(action: &'static str) -> impl FnOnce(reqwest::Error) -> ProxyError {
    move |source| {
        // Query strings carry the credential; strip the URL before logging.
        let source = source.without_url();
        error!("Error trying to {}: {}", action, source);
        ProxyError::Transport { action, source }
    }
}
