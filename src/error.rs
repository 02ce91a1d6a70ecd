use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

/// Failures a proxy operation reports before or instead of an upstream answer.
///
/// Upstream non-2xx answers are not errors here: they are forwarded as
/// ordinary replies with their original status code.
#[derive(Error, Debug)]
pub enum ProxyError {
    /// No credential configured for this deployment
    #[error("API key not configured")]
    ApiKeyMissing,

    /// The inbound upload carried no usable `file` field
    #[error("No file uploaded")]
    MissingFile,

    /// The upstream could not be reached or its body could not be read
    #[error("Failed to {action}")]
    Transport {
        action: &'static str,
        #[source]
        source: reqwest::Error,
    },
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::ApiKeyMissing => StatusCode::INTERNAL_SERVER_ERROR,
            ProxyError::MissingFile => StatusCode::BAD_REQUEST,
            ProxyError::Transport { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        // Display never includes the transport source; that stays in the logs.
        let body = serde_json::json!({ "error": self.to_string() });
        (self.status(), Json(body)).into_response()
    }
}
