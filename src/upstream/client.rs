use axum::body::Bytes;
use reqwest::{multipart, Client, StatusCode};
use std::time::Duration;
use tracing::{debug, warn};

use crate::models::ReportKind;

/// A file received from the browser, ready to be forwarded.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

/// Status and untouched body of one upstream answer.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub body: Bytes,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

/// Thin client for the remote detection API.
///
/// Every call is attempted exactly once; the credential is passed per call so
/// the client itself holds no secret.
#[derive(Clone)]
pub struct DetectionClient {
    client: Client,
    base_url: String,
}

impl DetectionClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn submit_check(
        &self,
        api_key: &str,
        upload: UploadedFile,
    ) -> Result<RawResponse, reqwest::Error> {
        debug!(
            "Submitting {} ({} bytes) for analysis",
            upload.file_name,
            upload.bytes.len()
        );

        let mut part = multipart::Part::bytes(upload.bytes.to_vec()).file_name(upload.file_name);
        if let Some(ref content_type) = upload.content_type {
            part = part.mime_str(content_type)?;
        }
        let form = multipart::Form::new()
            .text("apiKey", api_key.to_string())
            .part("file", part);

        let response = self
            .client
            .post(self.url("/api/check"))
            .multipart(form)
            .send()
            .await?;
        Self::read(response).await
    }

    pub async fn check_by_id(
        &self,
        api_key: &str,
        check_id: &str,
    ) -> Result<RawResponse, reqwest::Error> {
        let response = self
            .client
            .get(self.url("/api/check/by-id"))
            .query(&[("apiKey", api_key), ("checkId", check_id)])
            .send()
            .await?;
        Self::read(response).await
    }

    pub async fn list_checks(&self, api_key: &str) -> Result<RawResponse, reqwest::Error> {
        let response = self
            .client
            .get(self.url("/api/checks"))
            .query(&[("apiKey", api_key)])
            .send()
            .await?;
        Self::read(response).await
    }

    pub async fn delete_all(&self, api_key: &str) -> Result<RawResponse, reqwest::Error> {
        let response = self
            .client
            .post(self.url("/api/deleteAll"))
            .json(&serde_json::json!({ "apiKey": api_key }))
            .send()
            .await?;
        Self::read(response).await
    }

    pub async fn key_details(&self, api_key: &str) -> Result<RawResponse, reqwest::Error> {
        let response = self
            .client
            .get(self.url("/api/key/details"))
            .query(&[("apiKey", api_key)])
            .send()
            .await?;
        Self::read(response).await
    }

    pub async fn report(
        &self,
        api_key: &str,
        kind: ReportKind,
        check_id: &str,
    ) -> Result<RawResponse, reqwest::Error> {
        let path = format!("/api/report/{}", kind.upstream_segment());
        let response = self
            .client
            .get(self.url(&path))
            .query(&[("apiKey", api_key), ("checkId", check_id)])
            .send()
            .await?;
        Self::read(response).await
    }

    async fn read(response: reqwest::Response) -> Result<RawResponse, reqwest::Error> {
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            warn!("Detection API answered {} ({} bytes)", status, body.len());
        }

        Ok(RawResponse { status, body })
    }
}
