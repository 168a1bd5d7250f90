//! HTML emission for the sheet preview.
//!
//! Produces one self-contained fragment: toolbar (tabs, expand toggle,
//! download control) followed by the grid. The grid markup does not depend
//! on the expanded flag; only the container around it does.

use std::fmt::Write as _;

use crate::layout::{GridLayout, Placement};
use crate::types::{Cell, CellValue, SheetDocument, SheetTab};

use super::css::{cell_css, escape_html};

/// Shown when there is no document, or it has no sheets.
pub const NO_DATA_LABEL: &str = "No data available";
pub const DOWNLOAD_LABEL: &str = "Download Excel";
pub const DOWNLOADING_LABEL: &str = "Downloading...";

const INLINE_CONTAINER_STYLE: &str = "max-height: 480px; overflow: auto";
const OVERLAY_CONTAINER_STYLE: &str =
    "position: fixed; inset: 0; z-index: 1000; overflow: auto; background: #ffffff";

/// View state the caller passes in for one render.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Requested sheet; clamped to the last sheet when out of range.
    pub sheet_index: usize,
    /// Full-viewport overlay instead of the bounded inline container.
    pub expanded: bool,
    /// A direct download is in flight; the download control is disabled.
    pub downloading: bool,
}

/// Render the preview fragment for `doc`.
pub fn render_preview(doc: &SheetDocument, options: &RenderOptions) -> String {
    let Some(tab) = doc.sheet(options.sheet_index) else {
        return render_placeholder();
    };
    let active = doc.clamp_index(options.sheet_index).unwrap_or(0);

    let mut html = String::with_capacity(4096);
    let mut class = String::from("xls-preview");
    if options.expanded {
        class.push_str(" xls-preview--expanded");
    }
    let _ = write!(html, r#"<div class="{class}" data-expanded="{}">"#, options.expanded);

    html.push_str(r#"<div class="xls-preview__toolbar">"#);
    if doc.len() > 1 {
        render_tabs(&mut html, doc, active);
    }
    render_controls(&mut html, options);
    html.push_str("</div>");

    let container_style = if options.expanded {
        OVERLAY_CONTAINER_STYLE
    } else {
        INLINE_CONTAINER_STYLE
    };
    let _ = write!(
        html,
        r#"<div class="xls-preview__scroll" style="{container_style}">"#
    );
    render_grid(&mut html, tab);
    html.push_str("</div></div>");
    html
}

fn render_placeholder() -> String {
    format!(
        r#"<div class="xls-preview xls-preview--empty"><p class="xls-preview__placeholder">{}</p></div>"#,
        escape_html(NO_DATA_LABEL)
    )
}

fn render_tabs(html: &mut String, doc: &SheetDocument, active: usize) {
    html.push_str(r#"<div class="xls-preview__tabs" role="tablist">"#);
    for (index, sheet) in doc.sheets.iter().enumerate() {
        let selected = index == active;
        let _ = write!(
            html,
            r#"<button type="button" role="tab" class="xls-preview__tab{}" aria-selected="{selected}" data-sheet-index="{index}">{} <span class="xls-preview__row-count">({})</span></button>"#,
            if selected { " is-active" } else { "" },
            escape_html(&sheet.sheet_name),
            row_count_label(sheet.total_rows),
        );
    }
    html.push_str("</div>");
}

fn row_count_label(rows: u32) -> String {
    if rows == 1 {
        "1 row".to_string()
    } else {
        format!("{rows} rows")
    }
}

fn render_controls(html: &mut String, options: &RenderOptions) {
    let (expand_label, expanded) = if options.expanded {
        ("Collapse", "true")
    } else {
        ("Expand", "false")
    };
    let _ = write!(
        html,
        r#"<button type="button" class="xls-preview__expand" data-action="toggle-expand" aria-expanded="{expanded}">{expand_label}</button>"#
    );
    if options.downloading {
        let _ = write!(
            html,
            r#"<button type="button" class="xls-preview__download" data-action="download" disabled aria-busy="true">{DOWNLOADING_LABEL}</button>"#
        );
    } else {
        let _ = write!(
            html,
            r#"<button type="button" class="xls-preview__download" data-action="download">{DOWNLOAD_LABEL}</button>"#
        );
    }
}

/// Emit the `<table>` for one sheet.
///
/// Covered merge positions produce no `<td>`; origins carry `rowspan` and
/// `colspan` when larger than one and are always centered.
pub fn render_grid(html: &mut String, tab: &SheetTab) {
    let layout = GridLayout::build(tab);
    if layout.ignored_merges > 0 || layout.truncated {
        tracing::debug!(
            sheet = %tab.sheet_name,
            ignored = layout.ignored_merges,
            truncated = layout.truncated,
            "rendering a partial grid"
        );
    }

    let _ = write!(
        html,
        r#"<table class="xls-preview__grid" data-sheet="{}"><tbody>"#,
        escape_html(&tab.sheet_name)
    );
    for row in 1..=layout.height {
        let _ = write!(html, r#"<tr data-row="{row}">"#);
        for (col, placement) in layout.row_placements(row) {
            match placement {
                Placement::Plain(cell) => render_cell(html, row, col, cell, None),
                Placement::Origin {
                    cell,
                    row_span,
                    col_span,
                } => render_cell(html, row, col, cell, Some((row_span, col_span))),
                Placement::Covered => {}
            }
        }
        html.push_str("</tr>");
    }
    html.push_str("</tbody></table>");
}

/// `spans` is `Some` for a merge origin, even a 1x1 one.
fn render_cell(
    html: &mut String,
    row: u32,
    col: u32,
    cell: Option<&Cell>,
    spans: Option<(u32, u32)>,
) {
    let _ = write!(html, r#"<td data-row="{row}" data-col="{col}""#);
    let (row_span, col_span) = spans.unwrap_or((1, 1));
    if row_span > 1 {
        let _ = write!(html, r#" rowspan="{row_span}""#);
    }
    if col_span > 1 {
        let _ = write!(html, r#" colspan="{col_span}""#);
    }
    let style = cell_css(cell, spans.is_some());
    if !style.is_empty() {
        let _ = write!(html, r#" style="{}""#, escape_html(&style));
    }
    html.push('>');
    html.push_str(&cell_text(cell.map_or(&CellValue::Empty, |c| &c.value)));
    html.push_str("</td>");
}

fn cell_text(value: &CellValue) -> String {
    let text = value.display_text();
    if text.is_empty() {
        "&nbsp;".to_string()
    } else {
        escape_html(&text)
    }
}
