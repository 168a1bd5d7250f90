//! HTTP seam and response classification.

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::{Result, SummaryError};

pub const SPREADSHEET_MIME: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const ACCEPT_HEADER: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet, application/json";

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const BINARY_CONTENT_TYPES: &[&str] = &[
    SPREADSHEET_MIME,
    "application/octet-stream",
    "application/zip",
    "application/vnd.ms-excel",
];

/// One GET to the generation endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub accept: &'static str,
    /// Sent as `Authorization: Bearer <token>` when present.
    pub bearer_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HttpResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Media type without parameters, lowercased.
    fn media_type(&self) -> Option<String> {
        self.content_type.as_deref().map(|ct| {
            ct.split(';')
                .next()
                .unwrap_or_default()
                .trim()
                .to_ascii_lowercase()
        })
    }
}

/// Performs the HTTP round trip. Status codes are not interpreted here.
#[async_trait]
pub trait SheetTransport: Send + Sync {
    /// # Errors
    /// Returns `Transport` when no response could be obtained.
    async fn get(&self, request: &HttpRequest) -> Result<HttpResponse>;
}

/// `{ success, message, timestamp }` error envelope returned by the API.
#[derive(Debug, Deserialize)]
struct Envelope {
    success: Option<bool>,
    message: Option<String>,
    timestamp: Option<String>,
}

fn envelope(body: &[u8]) -> Option<Envelope> {
    serde_json::from_slice::<serde_json::Value>(body)
        .ok()
        .filter(serde_json::Value::is_object)
        .and_then(|v| serde_json::from_value(v).ok())
}

/// Decide whether a response carries the spreadsheet payload.
///
/// # Errors
/// - `ServerRejection` for an error envelope (any status)
/// - `Transport` for other non-2xx responses
/// - `UnexpectedContent` for empty bodies, non-error JSON, or bodies that are
///   neither JSON nor a spreadsheet
pub fn classify_response(response: HttpResponse) -> Result<Vec<u8>> {
    if !response.is_success() {
        return Err(match envelope(&response.body) {
            Some(Envelope {
                message: Some(message),
                timestamp,
                ..
            }) if !message.trim().is_empty() => SummaryError::ServerRejection { message, timestamp },
            _ => SummaryError::Transport {
                message: format!("HTTP {}", response.status),
                status: Some(response.status),
            },
        });
    }

    if response.body.is_empty() {
        return Err(SummaryError::UnexpectedContent("empty response body".into()));
    }

    let media_type = response.media_type();
    let json_declared = media_type.as_deref().is_some_and(|m| m.contains("json"));
    if json_declared || !response.body.starts_with(ZIP_MAGIC) {
        if let Some(env) = envelope(&response.body) {
            return Err(match env {
                Envelope {
                    success: Some(false),
                    message,
                    timestamp,
                } => SummaryError::ServerRejection {
                    message: message.unwrap_or_default(),
                    timestamp,
                },
                _ => SummaryError::UnexpectedContent("JSON response instead of a spreadsheet".into()),
            });
        }
        if json_declared {
            return Err(SummaryError::UnexpectedContent("malformed JSON response".into()));
        }
    }

    let binary_declared = media_type
        .as_deref()
        .is_some_and(|m| BINARY_CONTENT_TYPES.contains(&m));
    if binary_declared || response.body.starts_with(ZIP_MAGIC) {
        Ok(response.body)
    } else {
        Err(SummaryError::UnexpectedContent(format!(
            "unsupported content type {}",
            media_type.as_deref().unwrap_or("(none)")
        )))
    }
}

/// [`SheetTransport`] backed by a shared `reqwest::Client`.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

#[cfg(not(target_arch = "wasm32"))]
impl ReqwestTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[cfg(not(target_arch = "wasm32"))]
#[async_trait]
impl SheetTransport for ReqwestTransport {
    async fn get(&self, request: &HttpRequest) -> Result<HttpResponse> {
        use reqwest::header::{ACCEPT, CONTENT_TYPE};

        let mut builder = self.client.get(&request.url).header(ACCEPT, request.accept);
        if let Some(token) = &request.bearer_token {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await.map_err(transport_error)?;
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await.map_err(transport_error)?.to_vec();

        Ok(HttpResponse {
            status,
            content_type,
            body,
        })
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn transport_error(e: reqwest::Error) -> SummaryError {
    SummaryError::Transport {
        message: e.to_string(),
        status: e.status().map(|s| s.as_u16()),
    }
}
