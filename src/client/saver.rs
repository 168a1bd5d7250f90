//! Delivery of a downloaded payload to the user.

use std::path::{Path, PathBuf};

use crate::error::{Result, SummaryError};

use super::transport::SPREADSHEET_MIME;

pub trait FileSaver: Send + Sync {
    /// # Errors
    /// Returns `Save` when the payload could not be delivered.
    fn save(&self, bytes: &[u8], filename: &str) -> Result<()>;
}

fn save_error(filename: &str, reason: impl std::fmt::Display) -> SummaryError {
    SummaryError::Save {
        filename: filename.to_string(),
        reason: reason.to_string(),
    }
}

/// Writes files into a directory, creating it if needed.
#[derive(Debug, Clone)]
pub struct DirectorySaver {
    dir: PathBuf,
}

impl DirectorySaver {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Destination for `filename`; names that would escape the directory
    /// are rejected.
    ///
    /// # Errors
    /// Returns `Save` for empty names or names with path components.
    pub fn path_for(&self, filename: &str) -> Result<PathBuf> {
        let plain = !filename.is_empty()
            && filename != "."
            && filename != ".."
            && !filename.contains(['/', '\\']);
        if !plain {
            return Err(save_error(filename, "not a plain file name"));
        }
        Ok(self.dir.join(filename))
    }
}

impl FileSaver for DirectorySaver {
    fn save(&self, bytes: &[u8], filename: &str) -> Result<()> {
        let path = self.path_for(filename)?;
        std::fs::create_dir_all(&self.dir).map_err(|e| save_error(filename, e))?;
        std::fs::write(&path, bytes).map_err(|e| save_error(filename, e))?;
        tracing::info!(path = %path.display(), bytes = bytes.len(), "saved summary sheet");
        Ok(())
    }
}

/// Browser primitives used by [`AnchorDownloadSaver`].
pub trait DownloadHost: Send + Sync {
    /// # Errors
    /// Returns an error when the object URL could not be created.
    fn create_object_url(&self, bytes: &[u8], mime: &str) -> Result<String>;
    /// Click a synthetic `<a download>` pointing at `url`.
    ///
    /// # Errors
    /// Returns an error when the anchor could not be created or clicked.
    fn click_download(&self, url: &str, filename: &str) -> Result<()>;
    fn revoke_object_url(&self, url: &str);
}

/// Object URL, synthetic anchor click, then revoke.
#[derive(Debug, Clone, Default)]
pub struct AnchorDownloadSaver<H> {
    host: H,
}

impl<H: DownloadHost> AnchorDownloadSaver<H> {
    pub const fn new(host: H) -> Self {
        Self { host }
    }

    pub const fn host(&self) -> &H {
        &self.host
    }
}

impl<H: DownloadHost> FileSaver for AnchorDownloadSaver<H> {
    fn save(&self, bytes: &[u8], filename: &str) -> Result<()> {
        let url = self.host.create_object_url(bytes, SPREADSHEET_MIME)?;
        let clicked = self.host.click_download(&url, filename);
        // Revoked on both paths, exactly once.
        self.host.revoke_object_url(&url);
        clicked
    }
}

#[cfg(target_arch = "wasm32")]
pub use browser::BrowserDownloadHost;

#[cfg(target_arch = "wasm32")]
mod browser {
    use js_sys::{Array, Uint8Array};
    use wasm_bindgen::{JsCast, JsValue};
    use web_sys::{Blob, BlobPropertyBag, HtmlAnchorElement, Url};

    use super::{save_error, DownloadHost};
    use crate::error::Result;

    /// `DownloadHost` over the DOM of the current window.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct BrowserDownloadHost;

    fn js_reason(e: &JsValue) -> String {
        e.as_string().unwrap_or_else(|| format!("{e:?}"))
    }

    impl DownloadHost for BrowserDownloadHost {
        fn create_object_url(&self, bytes: &[u8], mime: &str) -> Result<String> {
            let parts = Array::new();
            parts.push(&Uint8Array::from(bytes));
            let options = BlobPropertyBag::new();
            options.set_type(mime);
            let blob = Blob::new_with_u8_array_sequence_and_options(&parts, &options)
                .map_err(|e| save_error("blob", js_reason(&e)))?;
            Url::create_object_url_with_blob(&blob).map_err(|e| save_error("blob", js_reason(&e)))
        }

        fn click_download(&self, url: &str, filename: &str) -> Result<()> {
            let document = web_sys::window()
                .and_then(|w| w.document())
                .ok_or_else(|| save_error(filename, "no document"))?;
            let body = document
                .body()
                .ok_or_else(|| save_error(filename, "no document body"))?;
            let anchor: HtmlAnchorElement = document
                .create_element("a")
                .map_err(|e| save_error(filename, js_reason(&e)))?
                .dyn_into()
                .map_err(|_| save_error(filename, "anchor element unavailable"))?;
            anchor.set_href(url);
            anchor.set_download(filename);
            body.append_child(&anchor)
                .map_err(|e| save_error(filename, js_reason(&e)))?;
            anchor.click();
            anchor.remove();
            Ok(())
        }

        fn revoke_object_url(&self, url: &str) {
            if let Err(e) = Url::revoke_object_url(url) {
                tracing::warn!(error = %js_reason(&e), "failed to revoke object url");
            }
        }
    }
}
