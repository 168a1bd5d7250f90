//! Async glue between the client, the parser and a preview session.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::client::{DownloadResult, SummarySource};
use crate::parser::DocumentParser;

use super::session::{PreviewSession, PreviewState};

/// Drives one preview view.
///
/// Loads may overlap; the session's tickets make sure only the latest one
/// lands. Tab switching and expand toggling never reach the source or parser.
pub struct PreviewController<S, P> {
    source: S,
    parser: P,
    session: Mutex<PreviewSession>,
}

impl<S: SummarySource, P: DocumentParser> PreviewController<S, P> {
    pub fn new(source: S, parser: P) -> Self {
        Self {
            source,
            parser,
            session: Mutex::new(PreviewSession::new()),
        }
    }

    pub const fn source(&self) -> &S {
        &self.source
    }

    pub const fn parser(&self) -> &P {
        &self.parser
    }

    fn session(&self) -> MutexGuard<'_, PreviewSession> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fetch, then parse, then show. Returns `true` if the result was
    /// applied, `false` if a newer load superseded it.
    pub async fn load(&self, academic_year_id: &str, group_id: Option<&str>) -> bool {
        let ticket = self.session().begin_request();
        let outcome = match self.source.fetch_for_preview(academic_year_id, group_id).await {
            Ok(payload) => self.parser.parse(&payload.bytes, &payload.filename),
            Err(e) => Err(e),
        };
        self.session().apply_result(ticket, outcome)
    }

    /// Direct download with the in-flight flag set for its duration.
    pub async fn download(&self, academic_year_id: &str, group_id: Option<&str>) -> DownloadResult {
        self.session().set_downloading(true);
        let result = self.source.download(academic_year_id, group_id).await;
        self.session().set_downloading(false);
        result
    }

    pub fn select_sheet(&self, index: usize) {
        self.session().select_sheet(index);
    }

    pub fn toggle_expanded(&self) {
        self.session().toggle_expanded();
    }

    /// Back to `NoData`; a load still in flight is discarded when it lands.
    pub fn clear(&self) {
        self.session().clear();
    }

    #[must_use]
    pub fn state(&self) -> PreviewState {
        self.session().state().clone()
    }

    #[must_use]
    pub fn is_downloading(&self) -> bool {
        self.session().is_downloading()
    }

    /// HTML for the current state, or `None` after a failed load.
    #[must_use]
    pub fn render(&self) -> Option<String> {
        self.session().render()
    }

    /// Run `f` against the session without holding the lock across an await.
    pub fn with_session<R>(&self, f: impl FnOnce(&PreviewSession) -> R) -> R {
        f(&self.session())
    }
}
