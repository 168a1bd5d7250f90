//! Structured error types for xlsummary.
//!
//! One taxonomy covers the whole pipeline: fetching the generated sheet,
//! decoding it, and delivering it to the user.

use std::time::Duration;

/// Banner text used when no server-provided message is available.
pub const GENERIC_FAILURE_MESSAGE: &str = "Failed to generate summary sheet";

/// All errors that can occur while fetching, parsing or saving a summary sheet.
#[derive(Debug, thiserror::Error)]
pub enum SummaryError {
    /// Network or HTTP failure reaching the generation endpoint.
    #[error("Transport error: {message}")]
    Transport {
        message: String,
        /// HTTP status, when a response was received.
        status: Option<u16>,
    },

    /// Endpoint reachable but reported `success: false` in its JSON envelope.
    #[error("Server rejected request: {message}")]
    ServerRejection {
        message: String,
        timestamp: Option<String>,
    },

    /// Payload received but could not be decoded as a spreadsheet.
    #[error("Failed to parse {filename}: {reason}")]
    Parse { filename: String, reason: String },

    /// Round trip exceeded the fixed deadline.
    #[error("Request timed out after {}s", .after.as_secs_f64())]
    Timeout { after: Duration },

    /// 2xx response whose body is neither a spreadsheet nor an error envelope.
    #[error("Unexpected response content: {0}")]
    UnexpectedContent(String),

    /// Caller passed unusable identifiers.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The file saver could not deliver the payload.
    #[error("Could not save {filename}: {reason}")]
    Save { filename: String, reason: String },

    /// XML parsing error from quick-xml.
    #[error("XML parsing: {0}")]
    Xml(#[from] quick_xml::Error),

    /// ZIP archive error.
    #[error("ZIP archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SummaryError>;

impl SummaryError {
    /// Text shown to the user in the error banner or toast.
    ///
    /// Server-provided messages are passed through verbatim; everything
    /// else collapses to the generic fallback.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::ServerRejection { message, .. } if !message.trim().is_empty() => message.clone(),
            Self::Transport { message, .. } if !message.trim().is_empty() => message.clone(),
            Self::Timeout { .. } => format!("{GENERIC_FAILURE_MESSAGE}: the request timed out"),
            Self::InvalidRequest(reason) => reason.clone(),
            _ => GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }

    /// True for failures that happened before any payload was decoded.
    #[must_use]
    pub const fn is_fetch_phase(&self) -> bool {
        matches!(
            self,
            Self::Transport { .. }
                | Self::ServerRejection { .. }
                | Self::Timeout { .. }
                | Self::UnexpectedContent(_)
                | Self::InvalidRequest(_)
        )
    }

    pub(crate) fn parse(filename: &str, reason: impl std::fmt::Display) -> Self {
        Self::Parse {
            filename: filename.to_string(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(target_arch = "wasm32")]
impl From<SummaryError> for wasm_bindgen::JsValue {
    fn from(e: SummaryError) -> Self {
        wasm_bindgen::JsValue::from_str(&e.to_string())
    }
}
