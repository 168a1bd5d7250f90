use serde::{Deserialize, Serialize};

/// Horizontal text alignment carried on a cell.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Left,
    Center,
    Right,
}

impl Alignment {
    #[must_use]
    pub const fn as_css(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
        }
    }
}

/// Per-cell style metadata, as extracted from the workbook.
///
/// `merge_range` is `[start_row, start_col, end_row, end_col]`, 1-indexed on
/// both axes like every other coordinate in the document model.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CellStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub italic: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub underline: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alignment: Option<Alignment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wrap_text: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merged: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merge_range: Option<[u32; 4]>,
}

impl CellStyle {
    #[must_use]
    pub fn is_bold(&self) -> bool {
        self.bold.unwrap_or(false)
    }

    #[must_use]
    pub fn is_italic(&self) -> bool {
        self.italic.unwrap_or(false)
    }

    #[must_use]
    pub fn is_underline(&self) -> bool {
        self.underline.unwrap_or(false)
    }

    #[must_use]
    pub fn wraps(&self) -> bool {
        self.wrap_text.unwrap_or(false)
    }

    /// True when no property is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Theme colors and fonts extracted from theme1.xml
#[derive(Debug, Default)]
pub struct Theme {
    /// 12 theme colors: lt1, dk1, lt2, dk2, accent1-6, hlink, folHlink
    pub colors: Vec<String>,
    /// Major font (headings) from fontScheme
    pub major_font: Option<String>,
    /// Minor font (body) from fontScheme
    pub minor_font: Option<String>,
}

// ============================================================================
// Raw styles.xml records (resolved into CellStyle by the parser)
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct ColorSpec {
    pub rgb: Option<String>,
    pub theme: Option<u32>,
    pub tint: Option<f64>,
    pub indexed: Option<u32>,
    pub auto: bool,
}

#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Default, Clone)]
pub struct RawFont {
    pub name: Option<String>,
    pub size: Option<f64>,
    pub color: Option<ColorSpec>,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    /// Font scheme: "minor" (body) or "major" (headings)
    pub scheme: Option<String>,
}

#[derive(Debug, Default, Clone)]
pub struct RawFill {
    pub pattern_type: Option<String>,
    pub fg_color: Option<ColorSpec>,
    pub bg_color: Option<ColorSpec>,
}

#[derive(Debug, Clone)]
pub struct RawBorderSide {
    pub style: String,
    pub color: Option<ColorSpec>,
}

#[derive(Debug, Default, Clone)]
pub struct RawBorder {
    pub left: Option<RawBorderSide>,
    pub right: Option<RawBorderSide>,
    pub top: Option<RawBorderSide>,
    pub bottom: Option<RawBorderSide>,
}

impl RawBorder {
    /// Sides in CSS shorthand order.
    pub fn sides(&self) -> [Option<&RawBorderSide>; 4] {
        [
            self.top.as_ref(),
            self.right.as_ref(),
            self.bottom.as_ref(),
            self.left.as_ref(),
        ]
    }
}

#[derive(Debug, Default, Clone)]
pub struct RawAlignment {
    pub horizontal: Option<String>,
    pub wrap_text: bool,
}

/// Cell format (xf) from cellXfs or cellStyleXfs.
///
/// The apply* attributes default to true when absent.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone)]
pub struct CellXf {
    pub font_id: Option<u32>,
    pub fill_id: Option<u32>,
    pub border_id: Option<u32>,
    pub num_fmt_id: Option<u32>,
    pub alignment: Option<RawAlignment>,
    pub apply_font: bool,
    pub apply_fill: bool,
    pub apply_border: bool,
    pub apply_alignment: bool,
    /// Reference to cellStyleXfs entry (for cellXfs only)
    pub xf_id: Option<u32>,
}

impl Default for CellXf {
    fn default() -> Self {
        Self {
            font_id: None,
            fill_id: None,
            border_id: None,
            num_fmt_id: None,
            alignment: None,
            apply_font: true,
            apply_fill: true,
            apply_border: true,
            apply_alignment: true,
            xf_id: None,
        }
    }
}

/// Parsed contents of styles.xml
#[derive(Debug, Default)]
pub struct StyleSheet {
    pub fonts: Vec<RawFont>,
    pub fills: Vec<RawFill>,
    pub borders: Vec<RawBorder>,
    pub cell_xfs: Vec<CellXf>,
    pub cell_style_xfs: Vec<CellXf>,
    /// (numFmtId, formatCode)
    pub num_fmts: Vec<(u32, String)>,
    /// Custom palette from `<colors><indexedColors>`, if present
    pub indexed_colors: Option<Vec<String>>,
    /// Font of the "Normal" style (`cellStyleXfs[0]`)
    pub default_font: Option<RawFont>,
}
