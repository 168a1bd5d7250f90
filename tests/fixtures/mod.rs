//! Test fixtures for generating valid XLSX files in memory.
//!
//! This module provides builders for creating summary workbooks
//! programmatically, useful for testing the xlsummary parser with known inputs.
//!
//! # Example
//!
//! ```rust,ignore
//! use fixtures::{XlsxBuilder, StyleBuilder};
//!
//! let xlsx = XlsxBuilder::new()
//!     .add_sheet("Sheet1")
//!     .add_cell("A1", "Hello", Some(StyleBuilder::new().bold().build()))
//!     .add_cell("B1", 42.0, Some(StyleBuilder::new().number_format("#,##0").build()))
//!     .build();
//!
//! let doc = xlsummary::parser::parse(&xlsx, "test.xlsx").unwrap();
//! ```
#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic,
    clippy::cast_possible_truncation,
    clippy::cast_lossless
)]

use std::collections::{BTreeMap, HashMap};
use std::io::{Cursor, Write};
use zip::write::FileOptions;
use zip::ZipWriter;

// ============================================================================
// Style Builder
// ============================================================================

/// Builder for creating cell styles.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleBuilder {
    // Font properties
    pub font_name: Option<String>,
    pub font_size: Option<f64>,
    pub font_color: Option<String>,
    pub font_theme_color: Option<(u32, Option<f64>)>,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,

    // Fill properties
    pub bg_color: Option<String>,
    pub pattern_type: Option<String>,

    // Border properties
    pub border_top: Option<BorderSide>,
    pub border_right: Option<BorderSide>,
    pub border_bottom: Option<BorderSide>,
    pub border_left: Option<BorderSide>,

    // Alignment properties
    pub align_horizontal: Option<String>,
    pub wrap_text: bool,

    // Number format
    pub number_format: Option<String>,
}

/// A border side definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BorderSide {
    pub style: String,
    pub color: Option<String>,
}

impl BorderSide {
    #[must_use]
    pub fn new(style: &str) -> Self {
        Self {
            style: style.to_string(),
            color: None,
        }
    }

    #[must_use]
    pub fn color(mut self, color: &str) -> Self {
        self.color = Some(normalize_color(color));
        self
    }
}

impl StyleBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn font_name(mut self, name: &str) -> Self {
        self.font_name = Some(name.to_string());
        self
    }

    #[must_use]
    pub fn font_size(mut self, size: f64) -> Self {
        self.font_size = Some(size);
        self
    }

    /// Set the font color as #RRGGBB or AARRGGBB.
    #[must_use]
    pub fn font_color(mut self, color: &str) -> Self {
        self.font_color = Some(normalize_color(color));
        self
    }

    /// Set the font color from a theme slot with an optional tint.
    #[must_use]
    pub fn font_theme_color(mut self, theme: u32, tint: Option<f64>) -> Self {
        self.font_theme_color = Some((theme, tint));
        self
    }

    #[must_use]
    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    #[must_use]
    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    #[must_use]
    pub fn underline(mut self) -> Self {
        self.underline = true;
        self
    }

    /// Solid background color.
    #[must_use]
    pub fn bg_color(mut self, color: &str) -> Self {
        self.bg_color = Some(normalize_color(color));
        self
    }

    #[must_use]
    pub fn pattern(mut self, pattern_type: &str) -> Self {
        self.pattern_type = Some(pattern_type.to_string());
        self
    }

    /// Set the same border on all four sides.
    #[must_use]
    pub fn border_all(mut self, style: &str, color: Option<&str>) -> Self {
        let side = BorderSide {
            style: style.to_string(),
            color: color.map(normalize_color),
        };
        self.border_top = Some(side.clone());
        self.border_right = Some(side.clone());
        self.border_bottom = Some(side.clone());
        self.border_left = Some(side);
        self
    }

    #[must_use]
    pub fn border_top(mut self, side: BorderSide) -> Self {
        self.border_top = Some(side);
        self
    }

    #[must_use]
    pub fn border_bottom(mut self, side: BorderSide) -> Self {
        self.border_bottom = Some(side);
        self
    }

    #[must_use]
    pub fn align_horizontal(mut self, align: &str) -> Self {
        self.align_horizontal = Some(align.to_string());
        self
    }

    #[must_use]
    pub fn wrap_text(mut self) -> Self {
        self.wrap_text = true;
        self
    }

    #[must_use]
    pub fn number_format(mut self, format: &str) -> Self {
        self.number_format = Some(format.to_string());
        self
    }

    /// Build the style (returns self for use in cell creation).
    #[must_use]
    pub fn build(self) -> Self {
        self
    }
}

// ============================================================================
// Cell Value
// ============================================================================

/// Represents a cell value that can be added to a sheet.
#[derive(Debug, Clone)]
pub enum CellValue {
    /// A shared string.
    String(String),
    /// A shared string made of formatted runs.
    RichString(Vec<String>),
    Number(f64),
    Boolean(bool),
    /// An error value (e.g., "#DIV/0!").
    Error(String),
    /// An inline string (not shared).
    InlineString(String),
    /// A formula with a cached string result.
    FormulaString { formula: String, result: String },
    /// An empty cell (style only).
    Empty,
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::String(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<i32> for CellValue {
    fn from(n: i32) -> Self {
        CellValue::Number(f64::from(n))
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Boolean(b)
    }
}

// ============================================================================
// Sheet Builder
// ============================================================================

#[derive(Debug, Clone)]
pub struct CellEntry {
    pub cell_ref: String,
    pub value: CellValue,
    pub style: Option<StyleBuilder>,
}

/// Builder for a single worksheet.
#[derive(Debug, Clone)]
pub struct SheetBuilder {
    pub name: String,
    pub cells: Vec<CellEntry>,
    /// Ranges such as "A1:B2".
    pub merges: Vec<String>,
}

impl SheetBuilder {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            cells: Vec::new(),
            merges: Vec::new(),
        }
    }

    #[must_use]
    pub fn cell<V: Into<CellValue>>(
        mut self,
        cell_ref: &str,
        value: V,
        style: Option<StyleBuilder>,
    ) -> Self {
        self.cells.push(CellEntry {
            cell_ref: cell_ref.to_string(),
            value: value.into(),
            style,
        });
        self
    }

    /// Add a cell with any `CellValue` variant (error, inline, formula...).
    #[must_use]
    pub fn raw_cell(mut self, cell_ref: &str, value: CellValue, style: Option<StyleBuilder>) -> Self {
        self.cells.push(CellEntry {
            cell_ref: cell_ref.to_string(),
            value,
            style,
        });
        self
    }

    /// Add an empty cell that only carries a style.
    #[must_use]
    pub fn styled_cell(self, cell_ref: &str, style: StyleBuilder) -> Self {
        self.raw_cell(cell_ref, CellValue::Empty, Some(style))
    }

    #[must_use]
    pub fn merge(mut self, range: &str) -> Self {
        self.merges.push(range.to_string());
        self
    }
}

// ============================================================================
// XLSX Builder
// ============================================================================

/// Builder for creating complete XLSX files.
#[derive(Debug, Default)]
pub struct XlsxBuilder {
    sheets: Vec<SheetBuilder>,
    theme_colors: Option<Vec<String>>,
    date1904: bool,
}

impl XlsxBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn sheet(mut self, sheet: SheetBuilder) -> Self {
        self.sheets.push(sheet);
        self
    }

    /// Add a simple sheet by name (returns a builder for chaining).
    #[must_use]
    pub fn add_sheet(self, name: &str) -> XlsxSheetAdder {
        XlsxSheetAdder {
            builder: self,
            sheet: SheetBuilder::new(name),
        }
    }

    /// Set custom theme colors (dk1, lt1, dk2, lt2, accent1..6, hlink, folHlink).
    #[must_use]
    pub fn theme_colors(mut self, colors: Vec<String>) -> Self {
        self.theme_colors = Some(colors);
        self
    }

    /// Use the 1904 date system.
    #[must_use]
    pub fn date1904(mut self) -> Self {
        self.date1904 = true;
        self
    }

    /// Build the XLSX file as bytes.
    #[must_use]
    pub fn build(self) -> Vec<u8> {
        let cursor = Cursor::new(Vec::new());
        let mut zip = ZipWriter::new(cursor);
        let options = FileOptions::default().compression_method(zip::CompressionMethod::Deflated);

        // Collect all unique styles and shared strings
        let mut styles_collector = StylesCollector::new();
        let mut shared_strings: Vec<String> = Vec::new();
        let mut shared_index: HashMap<String, usize> = HashMap::new();

        for sheet in &self.sheets {
            for cell in &sheet.cells {
                if let Some(ref style) = cell.style {
                    styles_collector.add_style(style);
                }
                if let Some(si) = shared_string_xml(&cell.value) {
                    shared_index.entry(si.clone()).or_insert_with(|| {
                        shared_strings.push(si);
                        shared_strings.len() - 1
                    });
                }
            }
        }

        let mut put = |path: &str, contents: String| {
            zip.start_file(path, options).unwrap();
            zip.write_all(contents.as_bytes()).unwrap();
        };

        put("[Content_Types].xml", generate_content_types(self.sheets.len()));
        put("_rels/.rels", generate_rels());
        put("xl/_rels/workbook.xml.rels", generate_workbook_rels(self.sheets.len()));
        put("xl/workbook.xml", generate_workbook(&self.sheets, self.date1904));
        put("xl/styles.xml", styles_collector.generate_styles_xml());
        put("xl/sharedStrings.xml", generate_shared_strings(&shared_strings));
        put("xl/theme/theme1.xml", generate_theme(self.theme_colors.as_deref()));

        for (i, sheet) in self.sheets.iter().enumerate() {
            put(
                &format!("xl/worksheets/sheet{}.xml", i + 1),
                generate_sheet_xml(sheet, &shared_index, &styles_collector),
            );
        }

        zip.finish().expect("Failed to finish ZIP").into_inner()
    }
}

/// Helper for fluent sheet building within `XlsxBuilder`.
pub struct XlsxSheetAdder {
    builder: XlsxBuilder,
    sheet: SheetBuilder,
}

impl XlsxSheetAdder {
    #[must_use]
    pub fn add_cell<V: Into<CellValue>>(
        mut self,
        cell_ref: &str,
        value: V,
        style: Option<StyleBuilder>,
    ) -> Self {
        self.sheet = self.sheet.cell(cell_ref, value, style);
        self
    }

    #[must_use]
    pub fn add_merge(mut self, range: &str) -> Self {
        self.sheet = self.sheet.merge(range);
        self
    }

    /// Finish the current sheet and return the builder.
    #[must_use]
    pub fn done(mut self) -> XlsxBuilder {
        self.builder.sheets.push(self.sheet);
        self.builder
    }

    /// Build the XLSX directly (finishes the current sheet automatically).
    #[must_use]
    pub fn build(self) -> Vec<u8> {
        self.done().build()
    }
}

// ============================================================================
// Styles Collector
// ============================================================================

/// Collects and deduplicates styles for the XLSX file.
#[derive(Debug, Default)]
struct StylesCollector {
    fonts: Vec<FontDef>,
    fills: Vec<FillDef>,
    borders: Vec<BorderDef>,
    num_fmts: Vec<(u32, String)>,
    cell_xfs: Vec<CellXfDef>,
    style_map: Vec<(StyleBuilder, u32)>,
}

#[derive(Debug, Clone, PartialEq)]
struct FontDef {
    name: String,
    size: f64,
    color: Option<String>,
    theme_color: Option<(u32, Option<f64>)>,
    bold: bool,
    italic: bool,
    underline: bool,
}

#[derive(Debug, Clone, PartialEq)]
struct FillDef {
    pattern_type: String,
    fg_color: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
struct BorderDef {
    top: Option<BorderSide>,
    right: Option<BorderSide>,
    bottom: Option<BorderSide>,
    left: Option<BorderSide>,
}

#[derive(Debug, Clone)]
struct CellXfDef {
    font_id: u32,
    fill_id: u32,
    border_id: u32,
    num_fmt_id: Option<u32>,
    horizontal: Option<String>,
    wrap_text: bool,
}

impl StylesCollector {
    fn new() -> Self {
        let mut collector = Self::default();

        // Normal font, scheme minor like a workbook saved by Excel
        collector.fonts.push(FontDef {
            name: "Calibri".to_string(),
            size: 11.0,
            color: None,
            theme_color: None,
            bold: false,
            italic: false,
            underline: false,
        });

        // Required fills (none and gray125)
        for pattern in ["none", "gray125"] {
            collector.fills.push(FillDef {
                pattern_type: pattern.to_string(),
                fg_color: None,
            });
        }

        collector.borders.push(BorderDef {
            top: None,
            right: None,
            bottom: None,
            left: None,
        });

        collector.cell_xfs.push(CellXfDef {
            font_id: 0,
            fill_id: 0,
            border_id: 0,
            num_fmt_id: None,
            horizontal: None,
            wrap_text: false,
        });

        collector
    }

    fn add_style(&mut self, style: &StyleBuilder) -> u32 {
        if let Some(idx) = self.find_style(style) {
            return idx;
        }

        let xf = CellXfDef {
            font_id: self.add_font(style),
            fill_id: self.add_fill(style),
            border_id: self.add_border(style),
            num_fmt_id: self.add_num_fmt(style),
            horizontal: style.align_horizontal.clone(),
            wrap_text: style.wrap_text,
        };

        let idx = self.cell_xfs.len() as u32;
        self.cell_xfs.push(xf);
        self.style_map.push((style.clone(), idx));
        idx
    }

    fn find_style(&self, style: &StyleBuilder) -> Option<u32> {
        self.style_map
            .iter()
            .find(|(existing, _)| existing == style)
            .map(|(_, idx)| *idx)
    }

    fn get_style_index(&self, style: &StyleBuilder) -> u32 {
        self.find_style(style).unwrap_or(0)
    }

    fn add_font(&mut self, style: &StyleBuilder) -> u32 {
        let font = FontDef {
            name: style.font_name.clone().unwrap_or_else(|| "Calibri".to_string()),
            size: style.font_size.unwrap_or(11.0),
            color: style.font_color.clone(),
            theme_color: style.font_theme_color,
            bold: style.bold,
            italic: style.italic,
            underline: style.underline,
        };
        intern(&mut self.fonts, font)
    }

    fn add_fill(&mut self, style: &StyleBuilder) -> u32 {
        if style.bg_color.is_none() && style.pattern_type.is_none() {
            return 0;
        }
        let fill = FillDef {
            pattern_type: style
                .pattern_type
                .clone()
                .unwrap_or_else(|| "solid".to_string()),
            fg_color: style.bg_color.clone(),
        };
        intern(&mut self.fills, fill)
    }

    fn add_border(&mut self, style: &StyleBuilder) -> u32 {
        let border = BorderDef {
            top: style.border_top.clone(),
            right: style.border_right.clone(),
            bottom: style.border_bottom.clone(),
            left: style.border_left.clone(),
        };
        intern(&mut self.borders, border)
    }

    fn add_num_fmt(&mut self, style: &StyleBuilder) -> Option<u32> {
        let format = style.number_format.as_ref()?;

        if let Some(id) = get_builtin_format_id(format) {
            return Some(id);
        }
        if let Some((id, _)) = self.num_fmts.iter().find(|(_, code)| code == format) {
            return Some(*id);
        }

        // Custom formats start at 164
        let id = 164 + self.num_fmts.len() as u32;
        self.num_fmts.push((id, format.clone()));
        Some(id)
    }

    fn generate_styles_xml(&self) -> String {
        let mut xml = String::new();
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push_str(
            r#"<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
        );

        if !self.num_fmts.is_empty() {
            xml.push_str(&format!(r#"<numFmts count="{}">"#, self.num_fmts.len()));
            for (id, code) in &self.num_fmts {
                xml.push_str(&format!(
                    r#"<numFmt numFmtId="{}" formatCode="{}"/>"#,
                    id,
                    escape_xml(code)
                ));
            }
            xml.push_str("</numFmts>");
        }

        xml.push_str(&format!(r#"<fonts count="{}">"#, self.fonts.len()));
        for (i, font) in self.fonts.iter().enumerate() {
            xml.push_str("<font>");
            if font.bold {
                xml.push_str("<b/>");
            }
            if font.italic {
                xml.push_str("<i/>");
            }
            if font.underline {
                xml.push_str("<u/>");
            }
            xml.push_str(&format!(r#"<sz val="{}"/>"#, font.size));
            if let Some(ref color) = font.color {
                xml.push_str(&format!(r#"<color rgb="{}"/>"#, color));
            } else if let Some((theme, tint)) = font.theme_color {
                match tint {
                    Some(t) => xml.push_str(&format!(r#"<color theme="{theme}" tint="{t}"/>"#)),
                    None => xml.push_str(&format!(r#"<color theme="{theme}"/>"#)),
                }
            } else {
                xml.push_str(r#"<color theme="1"/>"#);
            }
            xml.push_str(&format!(r#"<name val="{}"/>"#, escape_xml(&font.name)));
            if i == 0 {
                xml.push_str(r#"<family val="2"/><scheme val="minor"/>"#);
            }
            xml.push_str("</font>");
        }
        xml.push_str("</fonts>");

        xml.push_str(&format!(r#"<fills count="{}">"#, self.fills.len()));
        for fill in &self.fills {
            xml.push_str(&format!(
                r#"<fill><patternFill patternType="{}">"#,
                fill.pattern_type
            ));
            if let Some(ref color) = fill.fg_color {
                xml.push_str(&format!(r#"<fgColor rgb="{}"/><bgColor indexed="64"/>"#, color));
            }
            xml.push_str("</patternFill></fill>");
        }
        xml.push_str("</fills>");

        xml.push_str(&format!(r#"<borders count="{}">"#, self.borders.len()));
        for border in &self.borders {
            xml.push_str("<border>");
            xml.push_str(&format_border_side("left", border.left.as_ref()));
            xml.push_str(&format_border_side("right", border.right.as_ref()));
            xml.push_str(&format_border_side("top", border.top.as_ref()));
            xml.push_str(&format_border_side("bottom", border.bottom.as_ref()));
            xml.push_str("<diagonal/></border>");
        }
        xml.push_str("</borders>");

        // Cell style formats (cellStyleXfs) - required
        xml.push_str(r#"<cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs>"#);

        xml.push_str(&format!(r#"<cellXfs count="{}">"#, self.cell_xfs.len()));
        for xf in &self.cell_xfs {
            let mut attrs = format!(
                r#"numFmtId="{}" fontId="{}" fillId="{}" borderId="{}" xfId="0""#,
                xf.num_fmt_id.unwrap_or(0),
                xf.font_id,
                xf.fill_id,
                xf.border_id
            );
            if xf.num_fmt_id.is_some() {
                attrs.push_str(r#" applyNumberFormat="1""#);
            }
            if xf.font_id > 0 {
                attrs.push_str(r#" applyFont="1""#);
            }
            if xf.fill_id > 0 {
                attrs.push_str(r#" applyFill="1""#);
            }
            if xf.border_id > 0 {
                attrs.push_str(r#" applyBorder="1""#);
            }

            if xf.horizontal.is_some() || xf.wrap_text {
                attrs.push_str(r#" applyAlignment="1""#);
                let mut align_attrs = String::new();
                if let Some(ref h) = xf.horizontal {
                    align_attrs.push_str(&format!(r#" horizontal="{}""#, h));
                }
                if xf.wrap_text {
                    align_attrs.push_str(r#" wrapText="1""#);
                }
                xml.push_str(&format!("<xf {attrs}><alignment{align_attrs}/></xf>"));
            } else {
                xml.push_str(&format!("<xf {attrs}/>"));
            }
        }
        xml.push_str("</cellXfs>");

        xml.push_str(r#"<cellStyles count="1"><cellStyle name="Normal" xfId="0" builtinId="0"/></cellStyles>"#);
        xml.push_str("</styleSheet>");
        xml
    }
}

/// Index of `item` in `items`, appending it first if absent.
fn intern<T: PartialEq>(items: &mut Vec<T>, item: T) -> u32 {
    if let Some(i) = items.iter().position(|x| x == &item) {
        return i as u32;
    }
    items.push(item);
    (items.len() - 1) as u32
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Normalize color to ARGB format (without #).
fn normalize_color(color: &str) -> String {
    let color = color.trim_start_matches('#');
    if color.len() == 8 {
        color.to_uppercase()
    } else {
        format!("FF{}", color.to_uppercase())
    }
}

fn get_builtin_format_id(format: &str) -> Option<u32> {
    match format {
        "General" => Some(0),
        "0" => Some(1),
        "0.00" => Some(2),
        "#,##0" => Some(3),
        "#,##0.00" => Some(4),
        "0%" => Some(9),
        "0.00%" => Some(10),
        "mm-dd-yy" | "m/d/yy" => Some(14),
        "d-mmm-yy" => Some(15),
        "h:mm" => Some(20),
        "h:mm:ss" => Some(21),
        "m/d/yy h:mm" => Some(22),
        "@" => Some(49),
        _ => None,
    }
}

pub fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

fn format_border_side(name: &str, side: Option<&BorderSide>) -> String {
    match side {
        Some(side) => {
            let mut xml = format!(r#"<{} style="{}">"#, name, side.style);
            if let Some(ref c) = side.color {
                xml.push_str(&format!(r#"<color rgb="{}"/>"#, c));
            }
            xml.push_str(&format!("</{}>", name));
            xml
        }
        None => format!("<{}/>", name),
    }
}

/// The `<si>` body for values stored in the shared string table.
fn shared_string_xml(value: &CellValue) -> Option<String> {
    match value {
        CellValue::String(s) => Some(format!(
            r#"<t xml:space="preserve">{}</t>"#,
            escape_xml(s)
        )),
        CellValue::RichString(runs) => Some(
            runs.iter()
                .enumerate()
                .map(|(i, run)| {
                    let props = if i % 2 == 1 { "<rPr><b/></rPr>" } else { "" };
                    format!(r#"<r>{props}<t xml:space="preserve">{}</t></r>"#, escape_xml(run))
                })
                .collect(),
        ),
        _ => None,
    }
}

fn generate_content_types(sheet_count: usize) -> String {
    let mut xml = String::new();
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    xml.push_str(r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#);
    xml.push_str(r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#);
    xml.push_str(r#"<Default Extension="xml" ContentType="application/xml"/>"#);
    xml.push_str(r#"<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>"#);
    xml.push_str(r#"<Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>"#);
    xml.push_str(r#"<Override PartName="/xl/sharedStrings.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sharedStrings+xml"/>"#);
    xml.push_str(r#"<Override PartName="/xl/theme/theme1.xml" ContentType="application/vnd.openxmlformats-officedocument.theme+xml"/>"#);
    for i in 1..=sheet_count {
        xml.push_str(&format!(
            r#"<Override PartName="/xl/worksheets/sheet{}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#,
            i
        ));
    }
    xml.push_str("</Types>");
    xml
}

fn generate_rels() -> String {
    let mut xml = String::new();
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    xml.push_str(
        r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    );
    xml.push_str(r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>"#);
    xml.push_str("</Relationships>");
    xml
}

fn generate_workbook_rels(sheet_count: usize) -> String {
    let mut xml = String::new();
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    xml.push_str(
        r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    );

    let mut rid = 1;
    for i in 1..=sheet_count {
        xml.push_str(&format!(
            r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{}.xml"/>"#,
            rid, i
        ));
        rid += 1;
    }
    for (kind, target) in [
        ("styles", "styles.xml"),
        ("sharedStrings", "sharedStrings.xml"),
        ("theme", "theme/theme1.xml"),
    ] {
        xml.push_str(&format!(
            r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/{}" Target="{}"/>"#,
            rid, kind, target
        ));
        rid += 1;
    }

    xml.push_str("</Relationships>");
    xml
}

fn generate_workbook(sheets: &[SheetBuilder], date1904: bool) -> String {
    let mut xml = String::new();
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    xml.push_str(r#"<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#);
    if date1904 {
        xml.push_str(r#"<workbookPr date1904="1"/>"#);
    }
    xml.push_str("<sheets>");
    for (i, sheet) in sheets.iter().enumerate() {
        xml.push_str(&format!(
            r#"<sheet name="{}" sheetId="{}" r:id="rId{}"/>"#,
            escape_xml(&sheet.name),
            i + 1,
            i + 1
        ));
    }
    xml.push_str("</sheets></workbook>");
    xml
}

fn generate_shared_strings(strings: &[String]) -> String {
    let mut xml = String::new();
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    xml.push_str(&format!(
        r#"<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="{}" uniqueCount="{}">"#,
        strings.len(),
        strings.len()
    ));
    for si in strings {
        xml.push_str(&format!("<si>{si}</si>"));
    }
    xml.push_str("</sst>");
    xml
}

fn generate_theme(colors: Option<&[String]>) -> String {
    let default_colors = [
        "000000", "FFFFFF", "44546A", "E7E6E6", "4472C4", "ED7D31", "A5A5A5", "FFC000", "5B9BD5",
        "70AD47", "0563C1", "954F72",
    ];
    let color_names = [
        "dk1", "lt1", "dk2", "lt2", "accent1", "accent2", "accent3", "accent4", "accent5",
        "accent6", "hlink", "folHlink",
    ];
    let colors = colors.unwrap_or(&[]);

    let mut xml = String::new();
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    xml.push_str(r#"<a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" name="Office Theme">"#);
    xml.push_str(r#"<a:themeElements><a:clrScheme name="Office">"#);
    for (i, name) in color_names.iter().enumerate() {
        let color = colors
            .get(i)
            .map_or(default_colors[i], |c| c.trim_start_matches('#'));
        xml.push_str(&format!(r#"<a:{name}><a:srgbClr val="{color}"/></a:{name}>"#));
    }
    xml.push_str("</a:clrScheme>");
    xml.push_str(r#"<a:fontScheme name="Office"><a:majorFont><a:latin typeface="Calibri Light"/></a:majorFont><a:minorFont><a:latin typeface="Calibri"/></a:minorFont></a:fontScheme>"#);
    xml.push_str("</a:themeElements></a:theme>");
    xml
}

fn generate_sheet_xml(
    sheet: &SheetBuilder,
    shared_index: &HashMap<String, usize>,
    styles: &StylesCollector,
) -> String {
    let mut xml = String::new();
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    xml.push_str(
        r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
    );
    xml.push_str("<sheetData>");

    // Group cells by row
    let mut rows: BTreeMap<u32, Vec<&CellEntry>> = BTreeMap::new();
    for cell in &sheet.cells {
        let (_, row) = parse_cell_ref(&cell.cell_ref);
        rows.entry(row).or_default().push(cell);
    }

    for (row_num, cells) in rows {
        xml.push_str(&format!(r#"<row r="{}">"#, row_num));

        for cell in cells {
            let mut cell_attrs = format!(r#"r="{}""#, cell.cell_ref);
            if let Some(ref style) = cell.style {
                let style_idx = styles.get_style_index(style);
                if style_idx > 0 {
                    cell_attrs.push_str(&format!(r#" s="{}""#, style_idx));
                }
            }

            match &cell.value {
                CellValue::String(_) | CellValue::RichString(_) => {
                    let si = shared_string_xml(&cell.value).unwrap_or_default();
                    let idx = shared_index.get(&si).copied().unwrap_or(0);
                    xml.push_str(&format!(r#"<c {} t="s"><v>{}</v></c>"#, cell_attrs, idx));
                }
                CellValue::Number(n) => {
                    xml.push_str(&format!(r#"<c {}><v>{}</v></c>"#, cell_attrs, n));
                }
                CellValue::Boolean(b) => {
                    let v = if *b { "1" } else { "0" };
                    xml.push_str(&format!(r#"<c {} t="b"><v>{}</v></c>"#, cell_attrs, v));
                }
                CellValue::Error(e) => {
                    xml.push_str(&format!(
                        r#"<c {} t="e"><v>{}</v></c>"#,
                        cell_attrs,
                        escape_xml(e)
                    ));
                }
                CellValue::InlineString(s) => {
                    xml.push_str(&format!(
                        r#"<c {} t="inlineStr"><is><t>{}</t></is></c>"#,
                        cell_attrs,
                        escape_xml(s)
                    ));
                }
                CellValue::FormulaString { formula, result } => {
                    xml.push_str(&format!(
                        r#"<c {} t="str"><f>{}</f><v>{}</v></c>"#,
                        cell_attrs,
                        escape_xml(formula),
                        escape_xml(result)
                    ));
                }
                CellValue::Empty => {
                    xml.push_str(&format!(r#"<c {}/>"#, cell_attrs));
                }
            }
        }

        xml.push_str("</row>");
    }

    xml.push_str("</sheetData>");

    if !sheet.merges.is_empty() {
        xml.push_str(&format!(r#"<mergeCells count="{}">"#, sheet.merges.len()));
        for range in &sheet.merges {
            xml.push_str(&format!(r#"<mergeCell ref="{}"/>"#, range));
        }
        xml.push_str("</mergeCells>");
    }

    xml.push_str("</worksheet>");
    xml
}

/// Parse a cell reference like "A1" into (col, row) as 1-indexed.
fn parse_cell_ref(cell_ref: &str) -> (u32, u32) {
    let mut col: u32 = 0;
    let mut row: u32 = 0;
    let mut in_letters = true;

    for c in cell_ref.chars() {
        if in_letters && c.is_ascii_alphabetic() {
            col = col * 26 + (c.to_ascii_uppercase() as u32 - 'A' as u32 + 1);
        } else {
            in_letters = false;
            if c.is_ascii_digit() {
                row = row * 10 + (c as u32 - '0' as u32);
            }
        }
    }

    (col, row)
}

/// Convert column number (1-indexed) to letter(s).
pub fn col_num_to_letter(col: u32) -> String {
    let mut result = String::new();
    let mut n = col;
    while n > 0 {
        n -= 1;
        result.insert(0, (b'A' + (n % 26) as u8) as char);
        n /= 26;
    }
    result
}

// ============================================================================
// Convenience Functions
// ============================================================================

/// Create a minimal valid XLSX with a single empty sheet.
#[must_use]
pub fn minimal_xlsx() -> Vec<u8> {
    XlsxBuilder::new().add_sheet("Sheet1").build()
}

#[must_use]
pub fn xlsx_with_text(text: &str) -> Vec<u8> {
    XlsxBuilder::new()
        .add_sheet("Sheet1")
        .add_cell("A1", text, None)
        .build()
}

#[must_use]
pub fn xlsx_with_styled_cell<V: Into<CellValue>>(value: V, style: StyleBuilder) -> Vec<u8> {
    XlsxBuilder::new()
        .add_sheet("Sheet1")
        .add_cell("A1", value, Some(style))
        .build()
}

/// A year summary the way the generation service lays it out: a merged
/// title, a styled header row, one row per student and a totals sheet.
#[must_use]
pub fn year_summary_xlsx() -> Vec<u8> {
    let title = StyleBuilder::new()
        .bold()
        .font_size(14.0)
        .align_horizontal("center");
    let header = StyleBuilder::new()
        .bold()
        .bg_color("#D9E1F2")
        .border_all("thin", Some("#000000"));
    let date = StyleBuilder::new().number_format("yyyy-mm-dd");

    let mut students = SheetBuilder::new("Group A")
        .cell("A1", "Year Summary 2025A", Some(title))
        .merge("A1:E1")
        .cell("A2", "Generated", None)
        .cell("B2", 45658.0, Some(date))
        .cell("A3", "Student", Some(header.clone()))
        .cell("B3", "Average", Some(header.clone()))
        .cell("C3", "Credits", Some(header.clone()))
        .cell("D3", "Passed", Some(header.clone()))
        .cell("E3", "Notes", Some(header));

    let rows = [
        ("Ada Lovelace", 17.5, 60, true, ""),
        ("Alan Turing", 15.25, 54, true, "Resit in June"),
        ("Grace Hopper", 9.5, 30, false, ""),
    ];
    for (i, (name, avg, credits, passed, note)) in rows.iter().enumerate() {
        let r = i + 4;
        students = students
            .cell(&format!("A{r}"), *name, None)
            .cell(&format!("B{r}"), *avg, None)
            .cell(&format!("C{r}"), *credits, None)
            .cell(&format!("D{r}"), *passed, None);
        if !note.is_empty() {
            students = students.cell(&format!("E{r}"), *note, None);
        }
    }

    let totals = SheetBuilder::new("Totals")
        .cell("A1", "Students", None)
        .cell("B1", 3, None)
        .cell("A2", "Pass rate", None)
        .cell("B2", 0.6667, Some(StyleBuilder::new().number_format("0.00%")));

    XlsxBuilder::new().sheet(students).sheet(totals).build()
}

/// A single-sheet workbook with `rows` x `cols` numeric and text cells.
#[must_use]
pub fn large_xlsx(rows: u32, cols: u32) -> Vec<u8> {
    let mut sheet = SheetBuilder::new("Large");
    for r in 1..=rows {
        for c in 1..=cols {
            let cell_ref = format!("{}{}", col_num_to_letter(c), r);
            sheet = if c % 2 == 0 {
                sheet.cell(&cell_ref, f64::from(r * c), None)
            } else {
                sheet.cell(&cell_ref, format!("R{r}C{c}"), None)
            };
        }
    }
    XlsxBuilder::new().sheet(sheet).build()
}
