//! XLSX parser
//!
//! Decodes a summary workbook from the ZIP archive into a `SheetDocument`.
//! Parts are streamed with quick-xml; styles are resolved once per workbook.

mod relationships;
mod styles;
mod worksheet;

use std::io::Cursor;

use zip::ZipArchive;

use crate::error::{Result, SummaryError};
use crate::types::SheetDocument;

use relationships::{
    get_sheet_info, parse_shared_strings, parse_stylesheet, parse_theme,
    parse_workbook_relationships,
};
use styles::StyleTable;
use worksheet::{parse_sheet, SheetContext};

/// Parse seam used by the preview controller.
pub trait DocumentParser {
    /// Decode `bytes` into a document. `filename` is carried on errors.
    ///
    /// # Errors
    /// Returns `SummaryError::Parse` if the payload is not a readable workbook.
    fn parse(&self, bytes: &[u8], filename: &str) -> Result<SheetDocument>;
}

/// The XLSX implementation of [`DocumentParser`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SpreadsheetParser;

impl SpreadsheetParser {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl DocumentParser for SpreadsheetParser {
    fn parse(&self, bytes: &[u8], filename: &str) -> Result<SheetDocument> {
        parse(bytes, filename)
    }
}

/// Parse an XLSX payload.
///
/// Every failure is reported as `SummaryError::Parse` naming `filename`; a
/// partial document is never returned.
///
/// # Errors
/// Returns an error if the payload is not a ZIP archive, lacks
/// `xl/workbook.xml`, or a required part is malformed.
pub fn parse(bytes: &[u8], filename: &str) -> Result<SheetDocument> {
    match parse_internal(bytes) {
        Ok(doc) => {
            tracing::debug!(
                filename,
                sheets = doc.sheets.len(),
                cells = doc.sheets.iter().map(|s| s.cell_count()).sum::<usize>(),
                merges = doc.sheets.iter().map(|s| s.merged_cells.len()).sum::<usize>(),
                "parsed summary sheet"
            );
            Ok(doc)
        }
        Err(SummaryError::Parse { reason, .. }) => Err(SummaryError::parse(filename, reason)),
        Err(e) => {
            tracing::warn!(filename, error = %e, "summary sheet could not be parsed");
            Err(SummaryError::parse(filename, e))
        }
    }
}

fn parse_internal(bytes: &[u8]) -> Result<SheetDocument> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;

    let relationships = parse_workbook_relationships(&mut archive)?;
    let theme = parse_theme(&mut archive, relationships.theme.as_deref());
    let shared_strings =
        parse_shared_strings(&mut archive, relationships.shared_strings.as_deref())?;
    let stylesheet = parse_stylesheet(&mut archive, relationships.styles.as_deref())?;
    let (sheet_info, date1904) = get_sheet_info(&mut archive, &relationships.worksheets)?;

    let styles = StyleTable::build(&stylesheet, &theme);
    tracing::trace!(
        shared_strings = shared_strings.len(),
        cell_formats = styles.len(),
        date1904,
        "workbook parts loaded"
    );

    let ctx = SheetContext {
        shared_strings: &shared_strings,
        styles: &styles,
        date1904,
    };

    let mut sheets = Vec::with_capacity(sheet_info.len());
    for info in &sheet_info {
        sheets.push(parse_sheet(&mut archive, info, &ctx)?);
    }

    let doc = SheetDocument::new(sheets);
    doc.validate()?;
    Ok(doc)
}
