//! Logical grid of a sheet tab with merges resolved into spans.
//!
//! The layout is computed once per displayed sheet; the renderer asks it
//! what to emit at each position. Only merge origins are indexed, so the
//! cost of a layout follows the positions it emits rather than the area
//! its merges cover.

use std::collections::HashMap;

use crate::types::{Cell, MergeRange, SheetTab};

/// Widest grid laid out for preview.
pub const MAX_GRID_COLS: u32 = 1_024;
/// Most positions (rows x columns) laid out for preview; taller grids are
/// cut to fit.
pub const MAX_GRID_POSITIONS: u32 = 1_000_000;
/// Merges beyond this many are ignored.
pub const MAX_GRID_MERGES: usize = 4_096;

/// Clamp a `(height, width)` extent to the preview limits.
#[must_use]
pub fn clamp_extent(height: u32, width: u32) -> (u32, u32) {
    let width = width.min(MAX_GRID_COLS);
    let max_height = MAX_GRID_POSITIONS / width.max(1);
    (height.min(max_height), width)
}

/// One accepted merge, with spans clipped to the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeInfo {
    pub origin_row: u32,
    pub origin_col: u32,
    pub row_span: u32,
    pub col_span: u32,
}

impl MergeInfo {
    #[must_use]
    pub const fn end_row(&self) -> u32 {
        self.origin_row + self.row_span - 1
    }

    #[must_use]
    pub const fn end_col(&self) -> u32 {
        self.origin_col + self.col_span - 1
    }

    #[must_use]
    pub const fn is_origin(&self, row: u32, col: u32) -> bool {
        row == self.origin_row && col == self.origin_col
    }

    #[must_use]
    pub const fn contains(&self, row: u32, col: u32) -> bool {
        row >= self.origin_row
            && row <= self.end_row()
            && col >= self.origin_col
            && col <= self.end_col()
    }

    const fn spans_row(&self, row: u32) -> bool {
        row >= self.origin_row && row <= self.end_row()
    }
}

/// What the renderer emits at one grid position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Placement<'a> {
    /// An ordinary cell; `None` when the row is shorter than the grid.
    Plain(Option<&'a Cell>),
    /// Top-left of a merge, spanning `row_span` x `col_span` positions.
    Origin {
        cell: Option<&'a Cell>,
        row_span: u32,
        col_span: u32,
    },
    /// Inside a merge but not its origin; nothing is emitted.
    Covered,
}

/// Grid dimensions plus the merge lookup for one sheet.
#[derive(Debug, Clone)]
pub struct GridLayout<'a> {
    tab: &'a SheetTab,
    /// Number of grid rows: max of `rows.len()` and merge end rows, clamped.
    pub height: u32,
    /// Number of grid columns: max of the longest row and merge end columns,
    /// clamped.
    pub width: u32,
    /// Accepted merges in listing order.
    merges: Vec<MergeInfo>,
    /// Origin position to index into `merges`.
    origins: HashMap<(u32, u32), usize>,
    /// Merges dropped as invalid, overlapping or over the merge limit.
    pub ignored_merges: usize,
    /// The sheet was larger than the preview limits and was cut.
    pub truncated: bool,
}

impl<'a> GridLayout<'a> {
    /// Build the layout. Invalid merges are ignored with a warning; when two
    /// merges overlap the one listed first wins.
    pub fn build(tab: &'a SheetTab) -> Self {
        let mut accepted: Vec<&MergeRange> = Vec::new();
        let mut ignored_merges = 0;

        for merge in &tab.merged_cells {
            if accepted.len() >= MAX_GRID_MERGES {
                ignored_merges += 1;
                continue;
            }
            if !merge.is_valid() {
                tracing::warn!(
                    sheet = %tab.sheet_name,
                    start_row = merge.start_row,
                    start_col = merge.start_col,
                    end_row = merge.end_row,
                    end_col = merge.end_col,
                    "ignoring invalid merge"
                );
                ignored_merges += 1;
                continue;
            }
            if accepted.iter().any(|m| m.overlaps(merge)) {
                tracing::warn!(
                    sheet = %tab.sheet_name,
                    start_row = merge.start_row,
                    start_col = merge.start_col,
                    "ignoring merge that overlaps an earlier one"
                );
                ignored_merges += 1;
                continue;
            }
            accepted.push(merge);
        }
        if tab.merged_cells.len() > MAX_GRID_MERGES {
            tracing::warn!(
                sheet = %tab.sheet_name,
                merges = tab.merged_cells.len(),
                limit = MAX_GRID_MERGES,
                "too many merges, ignoring the rest"
            );
        }

        let row_count = u32::try_from(tab.rows.len()).unwrap_or(u32::MAX);
        let longest_row = u32::try_from(tab.max_row_len()).unwrap_or(u32::MAX);
        let full_height = accepted.iter().map(|m| m.end_row).fold(row_count, u32::max);
        let full_width = accepted.iter().map(|m| m.end_col).fold(longest_row, u32::max);
        let (height, width) = clamp_extent(full_height, full_width);
        let truncated = (height, width) != (full_height, full_width);
        if truncated {
            tracing::warn!(
                sheet = %tab.sheet_name,
                rows = full_height,
                cols = full_width,
                shown_rows = height,
                shown_cols = width,
                "sheet exceeds preview limits, truncating"
            );
        }

        let mut merges = Vec::with_capacity(accepted.len());
        let mut origins = HashMap::with_capacity(accepted.len());
        for m in accepted {
            // Origin cut off by truncation: nothing of it is shown.
            if m.start_row > height || m.start_col > width {
                continue;
            }
            origins.insert((m.start_row, m.start_col), merges.len());
            merges.push(MergeInfo {
                origin_row: m.start_row,
                origin_col: m.start_col,
                row_span: m.end_row.min(height) - m.start_row + 1,
                col_span: m.end_col.min(width) - m.start_col + 1,
            });
        }

        Self {
            tab,
            height,
            width,
            merges,
            origins,
            ignored_merges,
            truncated,
        }
    }

    /// The merge covering a 1-indexed position, if any.
    #[must_use]
    pub fn merge_at(&self, row: u32, col: u32) -> Option<&MergeInfo> {
        if let Some(&i) = self.origins.get(&(row, col)) {
            return self.merges.get(i);
        }
        self.merges.iter().find(|m| m.contains(row, col))
    }

    /// Placement at a 1-indexed position.
    #[must_use]
    pub fn placement(&self, row: u32, col: u32) -> Placement<'a> {
        let cell = self.tab.cell(row, col);
        match self.merge_at(row, col) {
            Some(info) if info.is_origin(row, col) => Placement::Origin {
                cell,
                row_span: info.row_span,
                col_span: info.col_span,
            },
            Some(_) => Placement::Covered,
            None => Placement::Plain(cell),
        }
    }

    /// Positions of one row that produce output, in column order.
    ///
    /// Covered runs are skipped whole, so a wide merge costs one step.
    pub fn row_placements(&self, row: u32) -> impl Iterator<Item = (u32, Placement<'a>)> {
        let mut spans: Vec<&MergeInfo> = self.merges.iter().filter(|m| m.spans_row(row)).collect();
        spans.sort_unstable_by_key(|m| m.origin_col);

        let mut out = Vec::new();
        let mut spans = spans.into_iter().peekable();
        let mut col = 1;
        while col <= self.width {
            match spans.next_if(|m| m.origin_col <= col) {
                Some(m) => {
                    if m.is_origin(row, col) {
                        out.push((
                            col,
                            Placement::Origin {
                                cell: self.tab.cell(row, col),
                                row_span: m.row_span,
                                col_span: m.col_span,
                            },
                        ));
                    }
                    col = m.end_col().max(col) + 1;
                }
                None => {
                    out.push((col, Placement::Plain(self.tab.cell(row, col))));
                    col += 1;
                }
            }
        }
        out.into_iter()
    }
}
