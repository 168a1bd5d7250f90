use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::{Cell, CellValue};
use crate::error::{Result, SummaryError};

/// A merged region. Coordinates are 1-indexed and inclusive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeRange {
    pub start_row: u32,
    pub start_col: u32,
    pub end_row: u32,
    pub end_col: u32,
    /// Value of the top-left cell of the region.
    #[serde(default)]
    pub value: CellValue,
}

impl MergeRange {
    #[must_use]
    pub fn new(start_row: u32, start_col: u32, end_row: u32, end_col: u32) -> Self {
        Self {
            start_row,
            start_col,
            end_row,
            end_col,
            value: CellValue::Empty,
        }
    }

    #[must_use]
    pub fn with_value(mut self, value: impl Into<CellValue>) -> Self {
        self.value = value.into();
        self
    }

    /// Non-zero coordinates and end not before start.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.start_row >= 1
            && self.start_col >= 1
            && self.end_row >= self.start_row
            && self.end_col >= self.start_col
    }

    #[must_use]
    pub const fn row_span(&self) -> u32 {
        self.end_row.saturating_sub(self.start_row).saturating_add(1)
    }

    #[must_use]
    pub const fn col_span(&self) -> u32 {
        self.end_col.saturating_sub(self.start_col).saturating_add(1)
    }

    #[must_use]
    pub const fn contains(&self, row: u32, col: u32) -> bool {
        row >= self.start_row && row <= self.end_row && col >= self.start_col && col <= self.end_col
    }

    #[must_use]
    pub const fn overlaps(&self, other: &Self) -> bool {
        self.start_row <= other.end_row
            && other.start_row <= self.end_row
            && self.start_col <= other.end_col
            && other.start_col <= self.end_col
    }

    /// `[start_row, start_col, end_row, end_col]`, the form carried on cell styling.
    #[must_use]
    pub const fn as_array(&self) -> [u32; 4] {
        [self.start_row, self.start_col, self.end_row, self.end_col]
    }
}

/// One worksheet of a summary document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetTab {
    pub sheet_name: String,
    pub total_rows: u32,
    /// Row-major grid. Rows may be short; missing trailing cells are empty.
    #[serde(default)]
    pub rows: Vec<Vec<Cell>>,
    #[serde(default)]
    pub merged_cells: Vec<MergeRange>,
}

impl SheetTab {
    #[must_use]
    pub fn new(sheet_name: impl Into<String>, rows: Vec<Vec<Cell>>) -> Self {
        let total_rows = u32::try_from(rows.len()).unwrap_or(u32::MAX);
        Self {
            sheet_name: sheet_name.into(),
            total_rows,
            rows,
            merged_cells: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_merges(mut self, merges: Vec<MergeRange>) -> Self {
        self.merged_cells = merges;
        self
    }

    /// Cell at a 1-indexed position, if present in `rows`.
    #[must_use]
    pub fn cell(&self, row: u32, col: u32) -> Option<&Cell> {
        let r = usize::try_from(row.checked_sub(1)?).ok()?;
        let c = usize::try_from(col.checked_sub(1)?).ok()?;
        self.rows.get(r)?.get(c)
    }

    /// Length of the longest row.
    #[must_use]
    pub fn max_row_len(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.rows.iter().map(Vec::len).sum()
    }
}

/// A parsed summary workbook, sheets in display order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SheetDocument {
    #[serde(default)]
    pub sheets: Vec<SheetTab>,
}

impl SheetDocument {
    #[must_use]
    pub fn new(sheets: Vec<SheetTab>) -> Self {
        Self { sheets }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    /// Index clamped to the last sheet; `None` when there are no sheets.
    #[must_use]
    pub fn clamp_index(&self, index: usize) -> Option<usize> {
        self.sheets.len().checked_sub(1).map(|last| index.min(last))
    }

    /// Sheet at `index`, clamped to the last sheet.
    #[must_use]
    pub fn sheet(&self, index: usize) -> Option<&SheetTab> {
        self.clamp_index(index).and_then(|i| self.sheets.get(i))
    }

    /// Sheet names must be unique within a document.
    ///
    /// # Errors
    /// Returns `InvalidRequest` naming the first duplicate.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for tab in &self.sheets {
            if !seen.insert(tab.sheet_name.as_str()) {
                return Err(SummaryError::InvalidRequest(format!(
                    "duplicate sheet name '{}'",
                    tab.sheet_name
                )));
            }
        }
        Ok(())
    }

    /// Decode the JSON interchange form, accepting legacy bare-scalar cells.
    ///
    /// # Errors
    /// Returns an error if the JSON is malformed or sheet names repeat.
    pub fn from_json(json: &str) -> Result<Self> {
        let doc: Self = serde_json::from_str(json)?;
        doc.validate()?;
        Ok(doc)
    }

    /// # Errors
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
