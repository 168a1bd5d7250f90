//! Summary-sheet client
//!
//! Fetches the generated workbook for an (academic year, group) pair and
//! either saves it or returns the bytes for preview. HTTP, token lookup and
//! file delivery are injected so each can be swapped per platform.

mod config;
mod saver;
mod summary;
mod token;
mod transport;

pub use config::{
    parse_timeout_secs, summary_filename, ClientConfig, DEFAULT_GROUP_ID, DEFAULT_PROXY_BASE,
    DEFAULT_TIMEOUT, ENV_DEFAULT_GROUP, ENV_PROXY_BASE, ENV_TIMEOUT_SECS,
};
pub use saver::{AnchorDownloadSaver, DirectorySaver, DownloadHost, FileSaver};
pub use summary::{DownloadResult, SummaryPayload, SummarySheetClient, SummarySource};
pub use token::{FileTokenStore, NoToken, StaticToken, TokenProvider};
pub use transport::{
    classify_response, HttpRequest, HttpResponse, SheetTransport, ACCEPT_HEADER, SPREADSHEET_MIME,
};

#[cfg(not(target_arch = "wasm32"))]
pub use transport::ReqwestTransport;

#[cfg(target_arch = "wasm32")]
pub use saver::BrowserDownloadHost;
#[cfg(target_arch = "wasm32")]
pub use token::LocalStorageToken;
