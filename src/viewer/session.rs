//! Per-view preview state.
//!
//! A session owns at most one document. Loads are ticketed: only the
//! result of the most recently issued ticket may replace what is shown.

use crate::error::Result;
use crate::render::{render_preview, RenderOptions};
use crate::types::SheetDocument;

/// Identifies one load request; later tickets compare greater.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LoadTicket(u64);

/// What the preview is currently showing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewState {
    /// Nothing loaded yet, or the document was cleared.
    NoData,
    Viewing {
        sheet_index: usize,
        expanded: bool,
    },
    /// The last load failed; `message` is the banner text.
    Failed { message: String },
}

#[derive(Debug)]
pub struct PreviewSession {
    state: PreviewState,
    document: Option<SheetDocument>,
    latest_ticket: u64,
    downloading: bool,
}

impl Default for PreviewSession {
    fn default() -> Self {
        Self::new()
    }
}

impl PreviewSession {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: PreviewState::NoData,
            document: None,
            latest_ticket: 0,
            downloading: false,
        }
    }

    #[must_use]
    pub const fn state(&self) -> &PreviewState {
        &self.state
    }

    #[must_use]
    pub const fn document(&self) -> Option<&SheetDocument> {
        self.document.as_ref()
    }

    #[must_use]
    pub const fn is_downloading(&self) -> bool {
        self.downloading
    }

    /// Issue a ticket for a new load. Any older ticket becomes stale.
    pub fn begin_request(&mut self) -> LoadTicket {
        self.latest_ticket = self.latest_ticket.saturating_add(1);
        LoadTicket(self.latest_ticket)
    }

    #[must_use]
    pub const fn is_current(&self, ticket: LoadTicket) -> bool {
        ticket.0 == self.latest_ticket
    }

    /// Apply the outcome of a load.
    ///
    /// Returns `false` when the ticket is stale; the session is left untouched.
    /// A successful load shows sheet 0 and keeps the expanded flag; a failure
    /// drops any previous document.
    pub fn apply_result(&mut self, ticket: LoadTicket, outcome: Result<SheetDocument>) -> bool {
        if !self.is_current(ticket) {
            tracing::debug!(
                ticket = ticket.0,
                latest = self.latest_ticket,
                "dropping stale preview result"
            );
            return false;
        }
        match outcome {
            Ok(doc) => self.replace_document(doc),
            Err(e) => {
                tracing::warn!(error = %e, fetch_phase = e.is_fetch_phase(), "preview failed");
                self.document = None;
                self.state = PreviewState::Failed {
                    message: e.user_message(),
                };
            }
        }
        true
    }

    /// Show `doc` from its first sheet.
    pub fn replace_document(&mut self, doc: SheetDocument) {
        let expanded = self.is_expanded();
        self.document = Some(doc);
        self.state = PreviewState::Viewing {
            sheet_index: 0,
            expanded,
        };
    }

    /// Drop the document. Loads still in flight become stale.
    pub fn clear(&mut self) {
        self.latest_ticket = self.latest_ticket.saturating_add(1);
        self.document = None;
        self.state = PreviewState::NoData;
    }

    /// Switch tabs. The index is clamped to the last sheet; nothing else changes.
    pub fn select_sheet(&mut self, index: usize) {
        let clamped = self
            .document
            .as_ref()
            .and_then(|d| d.clamp_index(index))
            .unwrap_or(0);
        if let PreviewState::Viewing { sheet_index, .. } = &mut self.state {
            *sheet_index = clamped;
        }
    }

    pub fn toggle_expanded(&mut self) {
        if let PreviewState::Viewing { expanded, .. } = &mut self.state {
            *expanded = !*expanded;
        }
    }

    pub fn set_downloading(&mut self, downloading: bool) {
        self.downloading = downloading;
    }

    fn is_expanded(&self) -> bool {
        matches!(self.state, PreviewState::Viewing { expanded: true, .. })
    }

    /// Options for rendering the current state.
    #[must_use]
    pub fn render_options(&self) -> RenderOptions {
        match self.state {
            PreviewState::Viewing {
                sheet_index,
                expanded,
            } => RenderOptions {
                sheet_index,
                expanded,
                downloading: self.downloading,
            },
            _ => RenderOptions {
                downloading: self.downloading,
                ..RenderOptions::default()
            },
        }
    }

    /// HTML for the current state. `None` when the last load failed; the
    /// caller shows `PreviewState::Failed::message` instead.
    #[must_use]
    pub fn render(&self) -> Option<String> {
        match &self.state {
            PreviewState::Failed { .. } => None,
            _ => {
                let empty = SheetDocument::default();
                let doc = self.document.as_ref().unwrap_or(&empty);
                Some(render_preview(doc, &self.render_options()))
            }
        }
    }
}
