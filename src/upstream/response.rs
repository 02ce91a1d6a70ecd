use serde_json::{json, Value};

/// What an upstream body turned out to be once we tried to read it as JSON.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedUpstreamResponse {
    Json(Value),
    PlainText(String),
}

/// Shared decoder for every upstream body.
///
/// Anything `serde_json` accepts is kept as-is; everything else (plain text
/// like `Invalid API key`, an empty body, non-UTF-8 bytes) becomes text.
pub fn decode_body(body: &[u8]) -> ParsedUpstreamResponse {
    match serde_json::from_slice::<Value>(body) {
        Ok(value) => ParsedUpstreamResponse::Json(value),
        Err(_) => ParsedUpstreamResponse::PlainText(String::from_utf8_lossy(body).into_owned()),
    }
}

impl ParsedUpstreamResponse {
    /// JSON passes through; text is wrapped as `{error: text}`.
    pub fn into_error_envelope(self) -> Value {
        match self {
            ParsedUpstreamResponse::Json(value) => value,
            ParsedUpstreamResponse::PlainText(text) => json!({ "error": text }),
        }
    }

    /// JSON passes through; text is wrapped as `{message: text}`.
    pub fn into_message_envelope(self) -> Value {
        match self {
            ParsedUpstreamResponse::Json(value) => value,
            ParsedUpstreamResponse::PlainText(text) => json!({ "message": text }),
        }
    }
}
