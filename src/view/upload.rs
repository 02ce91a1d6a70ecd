//! Upload checks done before a document is sent anywhere, and the cosmetic
//! progress shown while it is.

use axum::body::Bytes;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

use crate::error::ProxyError;
use crate::models::SubmitCheckResponse;
use crate::proxy::{view_result, ProxyReply};
use crate::upstream::UploadedFile;

pub const MAX_UPLOAD_BYTES: u64 = 100 * 1024 * 1024;

pub const PROGRESS_TICK: Duration = Duration::from_millis(200);
pub const PROGRESS_STEP: u8 = 10;
pub const PROGRESS_CAP: u8 = 90;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Doc,
    Docx,
    Txt,
}

impl DocumentKind {
    pub const ALL: [DocumentKind; 4] = [
        DocumentKind::Pdf,
        DocumentKind::Doc,
        DocumentKind::Docx,
        DocumentKind::Txt,
    ];

    pub fn mime(self) -> &'static str {
        match self {
            DocumentKind::Pdf => "application/pdf",
            DocumentKind::Doc => "application/msword",
            DocumentKind::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            DocumentKind::Txt => "text/plain",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DocumentKind::Pdf => "PDF",
            DocumentKind::Doc => "DOC",
            DocumentKind::Docx => "DOCX",
            DocumentKind::Txt => "TXT",
        }
    }

    pub fn from_mime(mime: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.mime() == mime)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum UploadRejection {
    #[error("File type not supported. Please upload PDF, DOC, DOCX, or TXT files.")]
    UnsupportedType,
    #[error("File size exceeds 100MB limit.")]
    TooLarge,
}

pub fn validate_upload(mime: &str, size: u64) -> Result<DocumentKind, UploadRejection> {
    let kind = DocumentKind::from_mime(mime).ok_or(UploadRejection::UnsupportedType)?;
    if size > MAX_UPLOAD_BYTES {
        return Err(UploadRejection::TooLarge);
    }
    Ok(kind)
}

/// Type inferred from a local file name, for files that arrive without a
/// declared type.
pub fn guess_mime(file_name: &str) -> String {
    mime_guess::from_path(file_name)
        .first_raw()
        .unwrap_or("application/octet-stream")
        .to_string()
}

/// Validate a picked file against `mime` and hold it ready for submission.
pub fn accept_file(
    file_name: &str,
    mime: &str,
    bytes: Bytes,
) -> Result<(DocumentKind, UploadedFile), UploadRejection> {
    let kind = validate_upload(mime, bytes.len() as u64)?;
    Ok((
        kind,
        UploadedFile {
            file_name: file_name.to_string(),
            content_type: Some(mime.to_string()),
            bytes,
        },
    ))
}

/// Percentage shown while an upload is in flight. Not tied to bytes sent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UploadProgress(u8);

impl UploadProgress {
    pub fn percent(self) -> u8 {
        self.0
    }

    pub fn tick(&mut self) {
        self.0 = self.0.saturating_add(PROGRESS_STEP).min(PROGRESS_CAP);
    }

    pub fn complete(&mut self) {
        self.0 = 100;
    }

    pub fn fail(&mut self) {
        self.0 = 0;
    }
}

/// Drive `request` to completion, advancing `progress` every tick.
pub async fn with_simulated_progress<F, T>(
    request: F,
    progress: &mut UploadProgress,
    mut report: impl FnMut(u8),
) -> T
where
    F: Future<Output = T>,
{
    let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + PROGRESS_TICK, PROGRESS_TICK);
    tokio::pin!(request);

    loop {
        tokio::select! {
            outcome = &mut request => return outcome,
            _ = ticker.tick() => {
                progress.tick();
                report(progress.percent());
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Created { check_id: String, location: String },
    Rejected(String),
}

pub fn submit_outcome(result: Result<ProxyReply, ProxyError>) -> SubmitOutcome {
    match view_result::<SubmitCheckResponse>(result, "Failed to submit check") {
        Ok(created) => SubmitOutcome::Created {
            location: format!("/check/{}", created.check_id),
            check_id: created.check_id,
        },
        Err(message) => SubmitOutcome::Rejected(message),
    }
}
