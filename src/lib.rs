//! xlsummary - year summary sheets for the registrar console
//!
//! Fetches the generated Excel summary for an (academic year, group) pair,
//! parses it into a sheet model and renders it as an HTML grid:
//! - Shared, inline and rich-text strings, booleans, errors, dates
//! - Fonts, solid fills, borders, alignment, theme and indexed colours
//! - Merged cells resolved into row and column spans
//! - Multiple sheets as tabs, inline or full-viewport preview
//!
//! # Usage (JavaScript)
//!
//! ```javascript
//! import init, { parse_summary_sheet, render_summary_preview } from 'xlsummary';
//! await init();
//! const doc = parse_summary_sheet(bytes, 'year-summary-2025A-group-g.xlsx');
//! container.innerHTML = render_summary_preview(doc, 0, false, false);
//! ```

pub mod cell_ref;
pub mod client;
pub mod color;
pub mod error;
pub mod layout;
pub mod numfmt;
pub mod parser;
pub mod render;
pub mod styles;
pub mod types;
pub mod viewer;
pub mod xml_helpers;

use wasm_bindgen::prelude::*;

pub use error::{Result, SummaryError, GENERIC_FAILURE_MESSAGE};
pub use types::*;

use render::RenderOptions;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
}

fn js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Parse a summary workbook and return the document as a `JsValue`
///
/// # Errors
/// Returns an error if the payload is not a readable workbook.
#[wasm_bindgen]
pub fn parse_summary_sheet(data: &[u8], filename: &str) -> std::result::Result<JsValue, JsValue> {
    let doc = parser::parse(data, filename).map_err(js_error)?;
    serde_wasm_bindgen::to_value(&doc)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {e}")))
}

/// Parse a summary workbook and return the document as a JSON string
///
/// # Errors
/// Returns an error if the payload is not a readable workbook.
#[wasm_bindgen]
pub fn parse_summary_sheet_json(
    data: &[u8],
    filename: &str,
) -> std::result::Result<String, JsValue> {
    let doc = parser::parse(data, filename).map_err(js_error)?;
    doc.to_json().map_err(js_error)
}

/// Render a document (as returned by `parse_summary_sheet`) to preview HTML
///
/// Plain cells (`"x"`, `1`, `true`, `null`) and structured cells
/// (`{ value, styling }`) are both accepted.
///
/// # Errors
/// Returns an error if `document` does not have the document shape.
#[wasm_bindgen]
pub fn render_summary_preview(
    document: JsValue,
    sheet_index: usize,
    expanded: bool,
    downloading: bool,
) -> std::result::Result<String, JsValue> {
    let doc: SheetDocument = serde_wasm_bindgen::from_value(document)
        .map_err(|e| JsValue::from_str(&format!("Invalid document: {e}")))?;
    render_document(&doc, sheet_index, expanded, downloading).map_err(js_error)
}

/// Same as `render_summary_preview`, taking the document as JSON
///
/// # Errors
/// Returns an error if `json` is not a valid document.
#[wasm_bindgen]
pub fn render_summary_preview_json(
    json: &str,
    sheet_index: usize,
    expanded: bool,
    downloading: bool,
) -> std::result::Result<String, JsValue> {
    let doc = SheetDocument::from_json(json).map_err(js_error)?;
    render_document(&doc, sheet_index, expanded, downloading).map_err(js_error)
}

fn render_document(
    doc: &SheetDocument,
    sheet_index: usize,
    expanded: bool,
    downloading: bool,
) -> Result<String> {
    doc.validate()?;
    Ok(render::render_preview(
        doc,
        &RenderOptions {
            sheet_index,
            expanded,
            downloading,
        },
    ))
}

/// Get the library version
#[must_use]
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
