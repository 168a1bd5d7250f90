//! Worksheet parsing: streams one sheet part into a dense `SheetTab`.

use std::io::{BufReader, Read, Seek};

use quick_xml::events::{BytesStart, Event};
use zip::ZipArchive;

use crate::cell_ref::{parse_cell_range, parse_cell_ref_bytes};
use crate::error::Result;
use crate::layout::clamp_extent;
use crate::numfmt::format_serial;
use crate::types::{Cell, CellValue, MergeRange, SheetTab};
use crate::xml_helpers::{text_content, xml_reader};

use super::relationships::SheetInfo;
use super::styles::StyleTable;

/// Cell type tag from the `t` attribute of a `<c>` element.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum CellTypeTag {
    Shared,
    Inline,
    FormulaStr,
    Bool,
    Error,
    IsoDate,
    Number,
}

fn parse_cell_type_tag(value: &[u8]) -> CellTypeTag {
    match value {
        b"s" => CellTypeTag::Shared,
        b"inlineStr" => CellTypeTag::Inline,
        b"str" => CellTypeTag::FormulaStr,
        b"b" => CellTypeTag::Bool,
        b"e" => CellTypeTag::Error,
        b"d" => CellTypeTag::IsoDate,
        _ => CellTypeTag::Number,
    }
}

fn parse_u32_bytes(value: &[u8]) -> Option<u32> {
    std::str::from_utf8(value).ok()?.trim().parse().ok()
}

/// A `<c>` element whose children are still being read.
#[derive(Debug)]
struct PendingCell {
    row: u32,
    col: u32,
    kind: CellTypeTag,
    style: Option<u32>,
    raw: String,
    has_value: bool,
}

/// Shared inputs for decoding every sheet of a workbook.
pub(super) struct SheetContext<'a> {
    pub shared_strings: &'a [String],
    pub styles: &'a StyleTable,
    pub date1904: bool,
}

impl SheetContext<'_> {
    fn decode(&self, pending: &PendingCell) -> CellValue {
        if !pending.has_value {
            return CellValue::Empty;
        }
        let raw = pending.raw.as_str();
        match pending.kind {
            CellTypeTag::Shared => raw
                .trim()
                .parse::<usize>()
                .ok()
                .and_then(|i| self.shared_strings.get(i))
                .map_or(CellValue::Empty, |s| CellValue::Text(s.clone())),
            CellTypeTag::Inline | CellTypeTag::FormulaStr | CellTypeTag::Error => {
                CellValue::Text(raw.to_string())
            }
            CellTypeTag::IsoDate => CellValue::Text(raw.trim().to_string()),
            CellTypeTag::Bool => CellValue::Bool(matches!(raw.trim(), "1" | "true")),
            CellTypeTag::Number => match raw.trim().parse::<f64>() {
                Ok(n) => {
                    let kind = self.styles.get(pending.style).and_then(|x| x.date_kind);
                    match kind.and_then(|k| format_serial(n, k, self.date1904)) {
                        Some(text) => CellValue::Text(text),
                        None => CellValue::Number(n),
                    }
                }
                Err(_) if raw.trim().is_empty() => CellValue::Empty,
                Err(_) => CellValue::Text(raw.to_string()),
            },
        }
    }

    fn finish(&self, pending: &PendingCell) -> Option<(u32, u32, Cell)> {
        let value = self.decode(pending);
        let styling = self
            .styles
            .get(pending.style)
            .and_then(|x| x.style.clone());
        if value.is_empty() && styling.is_none() {
            return None;
        }
        Some((pending.row, pending.col, Cell { value, styling }))
    }
}

fn start_cell(e: &BytesStart, row: u32, next_col: u32) -> PendingCell {
    let mut pending = PendingCell {
        row,
        col: next_col,
        kind: CellTypeTag::Number,
        style: None,
        raw: String::new(),
        has_value: false,
    };
    for attr in e.attributes().flatten() {
        match attr.key.as_ref() {
            b"r" => {
                if let Some((r, c)) = parse_cell_ref_bytes(&attr.value) {
                    pending.row = r;
                    pending.col = c;
                }
            }
            b"t" => pending.kind = parse_cell_type_tag(&attr.value),
            b"s" => pending.style = parse_u32_bytes(&attr.value),
            _ => {}
        }
    }
    pending
}

/// Parse a single worksheet into a dense grid with merges applied.
pub(super) fn parse_sheet<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    info: &SheetInfo,
    ctx: &SheetContext<'_>,
) -> Result<SheetTab> {
    let file = archive.by_name(&info.path)?;
    let mut xml = xml_reader(BufReader::new(file));
    let mut buf = Vec::new();

    let mut cells: Vec<(u32, u32, Cell)> = Vec::new();
    let mut merges: Vec<MergeRange> = Vec::new();
    let mut current_row: u32 = 0;
    let mut next_col: u32 = 1;
    let mut pending: Option<PendingCell> = None;
    let mut in_inline = false;
    let mut in_phonetic = false;
    let mut in_text = false;

    loop {
        match xml.read_event_into(&mut buf)? {
            ref event @ (Event::Start(ref e) | Event::Empty(ref e)) => {
                let is_empty = matches!(event, Event::Empty(_));
                match e.local_name().as_ref() {
                    b"row" => {
                        current_row = e
                            .attributes()
                            .flatten()
                            .find(|a| a.key.as_ref() == b"r")
                            .and_then(|a| parse_u32_bytes(&a.value))
                            .unwrap_or_else(|| current_row.saturating_add(1));
                        next_col = 1;
                    }
                    b"c" => {
                        let row = current_row.max(1);
                        let cell = start_cell(e, row, next_col);
                        next_col = cell.col.saturating_add(1);
                        if is_empty {
                            cells.extend(ctx.finish(&cell));
                        } else {
                            pending = Some(cell);
                        }
                    }
                    b"v" if !is_empty && pending.is_some() => in_text = true,
                    b"is" if !is_empty => in_inline = true,
                    b"rPh" if !is_empty => in_phonetic = true,
                    b"t" if !is_empty && in_inline && !in_phonetic => in_text = true,
                    b"mergeCell" => {
                        let range = e
                            .attributes()
                            .flatten()
                            .find(|a| a.key.as_ref() == b"ref")
                            .and_then(|a| {
                                std::str::from_utf8(&a.value)
                                    .ok()
                                    .and_then(parse_cell_range)
                            });
                        match range {
                            Some((r1, c1, r2, c2)) => merges.push(MergeRange::new(
                                r1.min(r2),
                                c1.min(c2),
                                r1.max(r2),
                                c1.max(c2),
                            )),
                            None => {
                                tracing::warn!(sheet = %info.name, "ignoring unparseable mergeCell");
                            }
                        }
                    }
                    _ => {}
                }
            }
            Event::Text(ref t) if in_text => {
                if let Some(p) = pending.as_mut() {
                    p.raw.push_str(&text_content(t));
                    p.has_value = true;
                }
            }
            Event::End(ref e) => match e.local_name().as_ref() {
                b"v" | b"t" => {
                    in_text = false;
                    // `<v></v>` or `<t/>`-only inline strings still count as present.
                    if let Some(p) = pending.as_mut() {
                        if p.kind == CellTypeTag::Inline || p.kind == CellTypeTag::FormulaStr {
                            p.has_value = true;
                        }
                    }
                }
                b"is" => in_inline = false,
                b"rPh" => in_phonetic = false,
                b"c" => {
                    if let Some(p) = pending.take() {
                        cells.extend(ctx.finish(&p));
                    }
                    in_text = false;
                    in_inline = false;
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(build_grid(&info.name, cells, merges))
}

/// Lay the decoded cells into a dense row-major grid and apply merges.
///
/// The grid is clamped to the preview limits; cells past them are dropped
/// and merges only clear the positions that exist. Merge metadata keeps
/// the workbook's coordinates.
fn build_grid(
    sheet_name: &str,
    cells: Vec<(u32, u32, Cell)>,
    merges: Vec<MergeRange>,
) -> SheetTab {
    let max_row = cells
        .iter()
        .map(|(r, _, _)| *r)
        .chain(merges.iter().map(|m| m.end_row))
        .max()
        .unwrap_or(0);
    let max_col = cells
        .iter()
        .map(|(_, c, _)| *c)
        .chain(merges.iter().map(|m| m.end_col))
        .max()
        .unwrap_or(0);

    let (height, width) = clamp_extent(max_row, max_col);
    if (height, width) != (max_row, max_col) {
        tracing::warn!(
            sheet = %sheet_name,
            rows = max_row,
            cols = max_col,
            kept_rows = height,
            kept_cols = width,
            "sheet exceeds preview limits, truncating"
        );
    }

    let mut rows: Vec<Vec<Cell>> = (0..height)
        .map(|_| vec![Cell::empty(); usize::try_from(width).unwrap_or(0)])
        .collect();

    for (r, c, cell) in cells {
        if let Some(slot) = grid_slot(&mut rows, r, c) {
            *slot = cell;
        }
    }

    let mut applied: Vec<MergeRange> = Vec::with_capacity(merges.len());
    for mut merge in merges {
        if applied.iter().any(|m| m.overlaps(&merge)) {
            tracing::warn!(
                sheet = %sheet_name,
                start_row = merge.start_row,
                start_col = merge.start_col,
                "overlapping merge left unapplied"
            );
            applied.push(merge);
            continue;
        }

        let range = merge.as_array();
        if let Some(origin) = grid_slot(&mut rows, merge.start_row, merge.start_col) {
            merge.value = origin.value.clone();
            let styling = origin.styling.get_or_insert_with(Default::default);
            styling.merged = Some(true);
            styling.merge_range = Some(range);
        }
        for r in merge.start_row..=merge.end_row.min(height) {
            for c in merge.start_col..=merge.end_col.min(width) {
                if (r, c) == (merge.start_row, merge.start_col) {
                    continue;
                }
                if let Some(slot) = grid_slot(&mut rows, r, c) {
                    *slot = Cell::empty();
                }
            }
        }
        applied.push(merge);
    }

    SheetTab::new(sheet_name, rows).with_merges(applied)
}

fn grid_slot(rows: &mut [Vec<Cell>], row: u32, col: u32) -> Option<&mut Cell> {
    let r = usize::try_from(row.checked_sub(1)?).ok()?;
    let c = usize::try_from(col.checked_sub(1)?).ok()?;
    rows.get_mut(r)?.get_mut(c)
}
