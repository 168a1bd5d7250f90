//! The summary-sheet client: one request, two delivery paths.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SummaryError};

use super::config::{summary_filename, ClientConfig};
use super::saver::FileSaver;
use super::token::TokenProvider;
use super::transport::{classify_response, HttpRequest, SheetTransport, ACCEPT_HEADER};

/// Raw payload returned for the preview path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryPayload {
    pub bytes: Vec<u8>,
    pub filename: String,
}

/// Outcome of the direct-download path. Failures are carried here rather
/// than returned as errors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_size: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl DownloadResult {
    #[must_use]
    pub fn succeeded(file_name: impl Into<String>, file_size: usize) -> Self {
        Self {
            success: true,
            file_name: Some(file_name.into()),
            file_size: Some(file_size),
            message: None,
        }
    }

    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            ..Self::default()
        }
    }
}

/// Fetch seam used by the preview controller.
#[async_trait]
pub trait SummarySource: Send + Sync {
    /// # Errors
    /// Returns the fetch-phase error unchanged.
    async fn fetch_for_preview(
        &self,
        academic_year_id: &str,
        group_id: Option<&str>,
    ) -> Result<SummaryPayload>;

    async fn download(&self, academic_year_id: &str, group_id: Option<&str>) -> DownloadResult;
}

pub struct SummarySheetClient<T, K, F> {
    config: ClientConfig,
    transport: T,
    tokens: K,
    saver: F,
}

impl<T, K, F> SummarySheetClient<T, K, F>
where
    T: SheetTransport,
    K: TokenProvider,
    F: FileSaver,
{
    pub const fn new(config: ClientConfig, transport: T, tokens: K, saver: F) -> Self {
        Self {
            config,
            transport,
            tokens,
            saver,
        }
    }

    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub const fn transport(&self) -> &T {
        &self.transport
    }

    pub const fn saver(&self) -> &F {
        &self.saver
    }

    /// Fetch the sheet and hand it to the file saver.
    ///
    /// Never fails: every error becomes `DownloadResult::failed` with the
    /// banner text.
    pub async fn request_summary_sheet(
        &self,
        academic_year_id: &str,
        group_id: Option<&str>,
    ) -> DownloadResult {
        let outcome = async {
            let payload = self.fetch(academic_year_id, group_id).await?;
            self.saver.save(&payload.bytes, &payload.filename)?;
            Ok::<_, SummaryError>(payload)
        }
        .await;

        match outcome {
            Ok(payload) => {
                tracing::info!(
                    filename = %payload.filename,
                    bytes = payload.bytes.len(),
                    "summary sheet downloaded"
                );
                DownloadResult::succeeded(payload.filename, payload.bytes.len())
            }
            Err(e) => {
                tracing::warn!(error = %e, "summary sheet download failed");
                DownloadResult::failed(e.user_message())
            }
        }
    }

    /// Fetch the sheet for in-app preview.
    ///
    /// # Errors
    /// Propagates every fetch-phase error.
    pub async fn request_summary_sheet_for_preview(
        &self,
        academic_year_id: &str,
        group_id: Option<&str>,
    ) -> Result<SummaryPayload> {
        self.fetch(academic_year_id, group_id).await
    }

    async fn fetch(&self, academic_year_id: &str, group_id: Option<&str>) -> Result<SummaryPayload> {
        let year = academic_year_id.trim();
        if year.is_empty() {
            return Err(SummaryError::InvalidRequest(
                "Academic year is required".to_string(),
            ));
        }
        let group = self.config.resolve_group(group_id);
        let request = HttpRequest {
            url: self.config.endpoint_url(year, group),
            accept: ACCEPT_HEADER,
            bearer_token: self.tokens.token(),
        };
        tracing::info!(
            url = %request.url,
            authenticated = request.bearer_token.is_some(),
            "requesting summary sheet"
        );

        let response = with_deadline(self.config.timeout, self.transport.get(&request)).await?;
        let status = response.status;
        let bytes = classify_response(response).inspect_err(|e| {
            tracing::warn!(status, error = %e, "summary sheet request rejected");
        })?;
        tracing::debug!(status, bytes = bytes.len(), "summary sheet received");

        Ok(SummaryPayload {
            bytes,
            filename: summary_filename(year, group),
        })
    }
}

#[async_trait]
impl<T, K, F> SummarySource for SummarySheetClient<T, K, F>
where
    T: SheetTransport,
    K: TokenProvider,
    F: FileSaver,
{
    async fn fetch_for_preview(
        &self,
        academic_year_id: &str,
        group_id: Option<&str>,
    ) -> Result<SummaryPayload> {
        self.request_summary_sheet_for_preview(academic_year_id, group_id)
            .await
    }

    async fn download(&self, academic_year_id: &str, group_id: Option<&str>) -> DownloadResult {
        self.request_summary_sheet(academic_year_id, group_id).await
    }
}

/// Bound the round trip by `after`.
#[cfg(not(target_arch = "wasm32"))]
async fn with_deadline<O>(after: Duration, fut: impl Future<Output = Result<O>>) -> Result<O> {
    tokio::time::timeout(after, fut)
        .await
        .map_err(|_| SummaryError::Timeout { after })?
}

/// The browser host enforces its own fetch deadline.
#[cfg(target_arch = "wasm32")]
async fn with_deadline<O>(_after: Duration, fut: impl Future<Output = Result<O>>) -> Result<O> {
    fut.await
}
