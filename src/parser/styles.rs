//! Style resolution: turns raw xf records into the `CellStyle` carried on cells.
//!
//! Every cellXfs entry is resolved once up front, so per-cell work is a
//! table lookup.

use crate::color::Palette;
use crate::numfmt::{resolve_date_kind, DateKind};
use crate::types::{
    Alignment, CellStyle, CellXf, RawAlignment, RawBorder, RawBorderSide, RawFill, RawFont,
    StyleSheet, Theme,
};

/// Resolved view of one cellXfs entry.
#[derive(Debug, Clone, Default)]
pub(super) struct ResolvedXf {
    pub style: Option<CellStyle>,
    pub date_kind: Option<DateKind>,
}

/// Precomputed style table for one workbook, indexed by the cell `s` attribute.
#[derive(Debug, Default)]
pub(super) struct StyleTable {
    entries: Vec<ResolvedXf>,
}

impl StyleTable {
    pub fn build(stylesheet: &StyleSheet, theme: &Theme) -> Self {
        let palette = Palette::new(&theme.colors, stylesheet.indexed_colors.as_deref());
        let ctx = Resolver {
            stylesheet,
            theme,
            palette,
        };
        let entries = stylesheet
            .cell_xfs
            .iter()
            .map(|xf| ResolvedXf {
                style: ctx.resolve(xf),
                date_kind: xf
                    .num_fmt_id
                    .and_then(|id| resolve_date_kind(id, &stylesheet.num_fmts)),
            })
            .collect();
        Self { entries }
    }

    /// Entry for a style index; index 0 (or an unknown index) is the default.
    pub fn get(&self, idx: Option<u32>) -> Option<&ResolvedXf> {
        let idx = usize::try_from(idx.unwrap_or(0)).ok()?;
        self.entries.get(idx)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

struct Resolver<'a> {
    stylesheet: &'a StyleSheet,
    theme: &'a Theme,
    palette: Palette<'a>,
}

impl Resolver<'_> {
    fn resolve(&self, xf: &CellXf) -> Option<CellStyle> {
        let parent = xf
            .xf_id
            .and_then(|id| usize::try_from(id).ok())
            .and_then(|id| self.stylesheet.cell_style_xfs.get(id));
        let inherit = |own: Option<u32>, apply: bool, from_parent: fn(&CellXf) -> Option<u32>| {
            if apply {
                own.or_else(|| parent.and_then(from_parent))
            } else {
                parent.and_then(from_parent).or(own)
            }
        };

        let mut style = CellStyle::default();

        let font_id = inherit(xf.font_id, xf.apply_font, |p| p.font_id);
        if let Some(font) = font_id.and_then(|id| lookup(&self.stylesheet.fonts, id)) {
            self.apply_font(&mut style, font);
        }

        let fill_id = inherit(xf.fill_id, xf.apply_fill, |p| p.fill_id);
        if let Some(fill) = fill_id.and_then(|id| lookup(&self.stylesheet.fills, id)) {
            style.background_color = self.fill_color(fill);
        }

        let border_id = inherit(xf.border_id, xf.apply_border, |p| p.border_id);
        if let Some(border) = border_id.and_then(|id| lookup(&self.stylesheet.borders, id)) {
            style.border = self.border_declaration(border);
        }

        let alignment = if xf.apply_alignment {
            xf.alignment.as_ref().or_else(|| parent.and_then(|p| p.alignment.as_ref()))
        } else {
            parent.and_then(|p| p.alignment.as_ref())
        };
        if let Some(align) = alignment {
            apply_alignment(&mut style, align);
        }

        (!style.is_empty()).then_some(style)
    }

    /// Font properties that differ from the workbook's Normal font.
    fn apply_font(&self, style: &mut CellStyle, font: &RawFont) {
        let default = self.stylesheet.default_font.as_ref();

        style.bold = font.bold.then_some(true);
        style.italic = font.italic.then_some(true);
        style.underline = font.underline.then_some(true);

        let color = font.color.as_ref().and_then(|c| self.palette.resolve(c));
        let default_color = default
            .and_then(|f| f.color.as_ref())
            .and_then(|c| self.palette.resolve(c));
        if color != default_color {
            style.color = color;
        }

        let size_differs = match (font.size, default.and_then(|f| f.size)) {
            (Some(a), Some(b)) => (a - b).abs() > f64::EPSILON,
            (Some(_), None) => true,
            _ => false,
        };
        if size_differs {
            style.font_size = font.size;
        }

        let family = self.font_family(font);
        if family.is_some() && family != default.and_then(|f| self.font_family(f)) {
            style.font_family = family;
        }
    }

    /// Explicit name, or the theme font the `scheme` points at.
    fn font_family(&self, font: &RawFont) -> Option<String> {
        match font.scheme.as_deref() {
            Some("minor") => self.theme.minor_font.clone().or_else(|| font.name.clone()),
            Some("major") => self.theme.major_font.clone().or_else(|| font.name.clone()),
            _ => font.name.clone(),
        }
    }

    /// Only solid fills paint a background.
    fn fill_color(&self, fill: &RawFill) -> Option<String> {
        if fill.pattern_type.as_deref() != Some("solid") {
            return None;
        }
        fill.fg_color
            .as_ref()
            .and_then(|c| self.palette.resolve(c))
            .or_else(|| fill.bg_color.as_ref().and_then(|c| self.palette.resolve(c)))
    }

    /// Collapse the four sides into one CSS `border` value using the
    /// heaviest side present.
    fn border_declaration(&self, border: &RawBorder) -> Option<String> {
        let side = border
            .sides()
            .into_iter()
            .flatten()
            .filter_map(|s| border_weight(&s.style).map(|w| (w, s)))
            .fold(None::<(u8, &RawBorderSide)>, |best, cur| match best {
                Some(b) if b.0 >= cur.0 => Some(b),
                _ => Some(cur),
            })?;
        let (width, raw) = side;
        let color = raw
            .color
            .as_ref()
            .and_then(|c| self.palette.resolve(c))
            .unwrap_or_else(|| "#000000".to_string());
        Some(format!("{width}px {} {color}", border_css_style(&raw.style)))
    }
}

fn lookup<T>(items: &[T], id: u32) -> Option<&T> {
    usize::try_from(id).ok().and_then(|i| items.get(i))
}

fn apply_alignment(style: &mut CellStyle, align: &RawAlignment) {
    style.alignment = match align.horizontal.as_deref() {
        Some("left") => Some(Alignment::Left),
        Some("center" | "centerContinuous") => Some(Alignment::Center),
        Some("right") => Some(Alignment::Right),
        _ => None,
    };
    style.wrap_text = align.wrap_text.then_some(true);
}

/// Pixel width for an OOXML border style; `None` for unknown styles.
fn border_weight(style: &str) -> Option<u8> {
    match style {
        "hair" | "thin" | "dotted" | "dashed" | "dashDot" | "dashDotDot" => Some(1),
        "medium" | "mediumDashed" | "mediumDashDot" | "mediumDashDotDot" | "slantDashDot" => {
            Some(2)
        }
        "thick" | "double" => Some(3),
        _ => None,
    }
}

fn border_css_style(style: &str) -> &'static str {
    match style {
        "hair" | "dotted" => "dotted",
        "dashed" | "mediumDashed" | "dashDot" | "dashDotDot" | "mediumDashDot"
        | "mediumDashDotDot" | "slantDashDot" => "dashed",
        "double" => "double",
        _ => "solid",
    }
}
