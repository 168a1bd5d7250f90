//! Streaming reader for xl/styles.xml
//!
//! Collects the records a summary preview needs: number formats, fonts,
//! fills, borders, the two xf tables and an optional custom indexed palette.

use std::io::BufRead;

use quick_xml::events::{BytesStart, Event};

use crate::color::normalize_hex;
use crate::error::Result;
use crate::types::{
    CellXf, RawAlignment, RawBorder, RawBorderSide, RawFill, RawFont, StyleSheet,
};
use crate::xml_helpers::{
    attr_bool, attr_string, attr_u32, attr_val, attr_val_f64, parse_color_attrs, toggle_on,
    xml_reader,
};

/// Which top-level collection of styles.xml the reader is inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    None,
    NumFmts,
    Fonts,
    Fills,
    Borders,
    CellStyleXfs,
    CellXfs,
    IndexedColors,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BorderEdge {
    Left,
    Right,
    Top,
    Bottom,
}

impl BorderEdge {
    fn from_name(name: &[u8]) -> Option<Self> {
        match name {
            b"left" | b"start" => Some(Self::Left),
            b"right" | b"end" => Some(Self::Right),
            b"top" => Some(Self::Top),
            b"bottom" => Some(Self::Bottom),
            _ => None,
        }
    }

    fn slot(self, border: &mut RawBorder) -> &mut Option<RawBorderSide> {
        match self {
            Self::Left => &mut border.left,
            Self::Right => &mut border.right,
            Self::Top => &mut border.top,
            Self::Bottom => &mut border.bottom,
        }
    }
}

/// Parse styles.xml content
///
/// # Errors
/// Returns an error if the XML is malformed.
pub fn parse_styles<R: BufRead>(reader: R) -> Result<StyleSheet> {
    let mut xml = xml_reader(reader);
    let mut stylesheet = StyleSheet::default();
    let mut buf = Vec::new();

    let mut section = Section::None;
    let mut font: Option<RawFont> = None;
    let mut fill: Option<RawFill> = None;
    let mut border: Option<RawBorder> = None;
    let mut edge: Option<BorderEdge> = None;
    let mut xf: Option<CellXf> = None;
    let mut indexed: Vec<String> = Vec::new();

    loop {
        match xml.read_event_into(&mut buf)? {
            ref event @ (Event::Start(ref e) | Event::Empty(ref e)) => {
                let is_empty = matches!(event, Event::Empty(_));
                let name = e.local_name();

                match (section, name.as_ref()) {
                    (_, b"numFmts") => section = Section::NumFmts,
                    (_, b"fonts") => section = Section::Fonts,
                    (_, b"fills") => section = Section::Fills,
                    (_, b"borders") => section = Section::Borders,
                    (_, b"cellStyleXfs") => section = Section::CellStyleXfs,
                    (_, b"cellXfs") => section = Section::CellXfs,
                    (_, b"indexedColors") => section = Section::IndexedColors,

                    (Section::NumFmts, b"numFmt") => {
                        if let Some(id) = attr_u32(e, b"numFmtId") {
                            let code = attr_string(e, b"formatCode").unwrap_or_default();
                            stylesheet.num_fmts.push((id, code));
                        }
                    }

                    (Section::IndexedColors, b"rgbColor") => {
                        if let Some(rgb) = attr_string(e, b"rgb").and_then(|s| normalize_hex(&s)) {
                            indexed.push(rgb);
                        }
                    }

                    (Section::Fonts, b"font") => {
                        if is_empty {
                            stylesheet.fonts.push(RawFont::default());
                        } else {
                            font = Some(RawFont::default());
                        }
                    }
                    (Section::Fonts, _) => {
                        if let Some(f) = font.as_mut() {
                            apply_font_child(f, name.as_ref(), e);
                        }
                    }

                    (Section::Fills, b"fill") => {
                        if is_empty {
                            stylesheet.fills.push(RawFill::default());
                        } else {
                            fill = Some(RawFill::default());
                        }
                    }
                    (Section::Fills, b"patternFill") => {
                        if let Some(f) = fill.as_mut() {
                            f.pattern_type = attr_string(e, b"patternType");
                        }
                    }
                    (Section::Fills, b"fgColor") => {
                        if let Some(f) = fill.as_mut() {
                            f.fg_color = Some(parse_color_attrs(e));
                        }
                    }
                    (Section::Fills, b"bgColor") => {
                        if let Some(f) = fill.as_mut() {
                            f.bg_color = Some(parse_color_attrs(e));
                        }
                    }

                    (Section::Borders, b"border") => {
                        if is_empty {
                            stylesheet.borders.push(RawBorder::default());
                        } else {
                            border = Some(RawBorder::default());
                        }
                    }
                    (Section::Borders, b"color") => {
                        if let (Some(b), Some(side)) = (border.as_mut(), edge) {
                            if let Some(s) = side.slot(b).as_mut() {
                                s.color = Some(parse_color_attrs(e));
                            }
                        }
                    }
                    (Section::Borders, side_name) => {
                        if let (Some(b), Some(side)) =
                            (border.as_mut(), BorderEdge::from_name(side_name))
                        {
                            if let Some(style) = attr_string(e, b"style").filter(|s| s != "none") {
                                *side.slot(b) = Some(RawBorderSide { style, color: None });
                            }
                            if !is_empty {
                                edge = Some(side);
                            }
                        }
                    }

                    (Section::CellXfs | Section::CellStyleXfs, b"xf") => {
                        let parsed = parse_xf(e);
                        if is_empty {
                            push_xf(&mut stylesheet, section, parsed);
                        } else {
                            xf = Some(parsed);
                        }
                    }
                    (Section::CellXfs | Section::CellStyleXfs, b"alignment") => {
                        if let Some(x) = xf.as_mut() {
                            x.alignment = Some(RawAlignment {
                                horizontal: attr_string(e, b"horizontal"),
                                wrap_text: attr_bool(e, b"wrapText").unwrap_or(false),
                            });
                        }
                    }

                    _ => {}
                }
            }

            Event::End(ref e) => match e.local_name().as_ref() {
                b"font" => {
                    if let Some(f) = font.take() {
                        stylesheet.fonts.push(f);
                    }
                }
                b"fill" => {
                    if let Some(f) = fill.take() {
                        stylesheet.fills.push(f);
                    }
                }
                b"border" => {
                    if let Some(b) = border.take() {
                        stylesheet.borders.push(b);
                    }
                    edge = None;
                }
                b"left" | b"right" | b"top" | b"bottom" | b"start" | b"end" => edge = None,
                b"xf" => {
                    if let Some(x) = xf.take() {
                        push_xf(&mut stylesheet, section, x);
                    }
                }
                b"numFmts" | b"fonts" | b"fills" | b"borders" | b"cellStyleXfs" | b"cellXfs"
                | b"indexedColors" => section = Section::None,
                _ => {}
            },

            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if !indexed.is_empty() {
        stylesheet.indexed_colors = Some(indexed);
    }

    stylesheet.default_font = stylesheet
        .cell_style_xfs
        .first()
        .and_then(|xf| xf.font_id)
        .or(Some(0))
        .and_then(|id| usize::try_from(id).ok())
        .and_then(|id| stylesheet.fonts.get(id))
        .cloned();

    Ok(stylesheet)
}

fn apply_font_child(font: &mut RawFont, name: &[u8], e: &BytesStart) {
    match name {
        b"b" => font.bold = toggle_on(e),
        b"i" => font.italic = toggle_on(e),
        b"u" => font.underline = attr_val(e).map_or(true, |v| v != "none"),
        b"sz" => font.size = attr_val_f64(e),
        b"name" | b"rFont" => font.name = attr_val(e),
        b"scheme" => font.scheme = attr_val(e),
        b"color" => font.color = Some(parse_color_attrs(e)),
        _ => {}
    }
}

fn parse_xf(e: &BytesStart) -> CellXf {
    let defaults = CellXf::default();
    CellXf {
        font_id: attr_u32(e, b"fontId"),
        fill_id: attr_u32(e, b"fillId"),
        border_id: attr_u32(e, b"borderId"),
        num_fmt_id: attr_u32(e, b"numFmtId"),
        alignment: None,
        apply_font: attr_bool(e, b"applyFont").unwrap_or(defaults.apply_font),
        apply_fill: attr_bool(e, b"applyFill").unwrap_or(defaults.apply_fill),
        apply_border: attr_bool(e, b"applyBorder").unwrap_or(defaults.apply_border),
        apply_alignment: attr_bool(e, b"applyAlignment").unwrap_or(defaults.apply_alignment),
        xf_id: attr_u32(e, b"xfId"),
    }
}

fn push_xf(stylesheet: &mut StyleSheet, section: Section, xf: CellXf) {
    match section {
        Section::CellXfs => stylesheet.cell_xfs.push(xf),
        Section::CellStyleXfs => stylesheet.cell_style_xfs.push(xf),
        _ => {}
    }
}
