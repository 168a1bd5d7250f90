//! Bearer token sources. The token is read at request time; a missing
//! token is not an error, the request simply goes out unauthenticated.

use std::path::PathBuf;

pub trait TokenProvider: Send + Sync {
    fn token(&self) -> Option<String>;
}

impl<T: TokenProvider + ?Sized> TokenProvider for Box<T> {
    fn token(&self) -> Option<String> {
        (**self).token()
    }
}

/// Never supplies a token.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoToken;

impl TokenProvider for NoToken {
    fn token(&self) -> Option<String> {
        None
    }
}

#[derive(Debug, Clone)]
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl TokenProvider for StaticToken {
    fn token(&self) -> Option<String> {
        clean(&self.0)
    }
}

/// Reads a token file on every request, so a rotated token is picked up
/// without restarting.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TokenProvider for FileTokenStore {
    fn token(&self) -> Option<String> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => clean(&contents),
            Err(e) => {
                tracing::debug!(path = %self.path.display(), error = %e, "no token file");
                None
            }
        }
    }
}

/// Reads `localStorage[key]` (default `"token"`) in the browser.
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone)]
pub struct LocalStorageToken {
    key: String,
}

#[cfg(target_arch = "wasm32")]
impl Default for LocalStorageToken {
    fn default() -> Self {
        Self {
            key: "token".to_string(),
        }
    }
}

#[cfg(target_arch = "wasm32")]
impl LocalStorageToken {
    pub fn with_key(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

#[cfg(target_arch = "wasm32")]
impl TokenProvider for LocalStorageToken {
    fn token(&self) -> Option<String> {
        let storage = web_sys::window()?.local_storage().ok()??;
        let value = storage.get_item(&self.key).ok()??;
        clean(&value)
    }
}

fn clean(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
