//! Package-level parts: workbook relationships, sheet list, theme, shared
//! strings and the stylesheet.

use std::collections::HashMap;
use std::io::{BufReader, Read, Seek};

use quick_xml::events::Event;
use zip::result::ZipError;
use zip::ZipArchive;

use crate::color::{normalize_hex, DEFAULT_THEME_COLORS};
use crate::error::Result;
use crate::styles::parse_styles;
use crate::types::{StyleSheet, Theme};
use crate::xml_helpers::{attr_string, attr_string_local, text_content, xml_reader};

/// A worksheet as listed in workbook.xml, in workbook order.
#[derive(Debug, Clone)]
pub(super) struct SheetInfo {
    pub name: String,
    pub path: String,
}

/// Targets from xl/_rels/workbook.xml.rels, as full archive paths.
#[derive(Default, Debug)]
pub(super) struct WorkbookRelationships {
    /// rId -> path, e.g. "rId1" -> "xl/worksheets/sheet1.xml"
    pub worksheets: HashMap<String, String>,
    pub shared_strings: Option<String>,
    pub styles: Option<String>,
    pub theme: Option<String>,
}

/// Resolve a relationship target against the xl/ directory.
///
/// Absolute targets ("/xl/...") are package-rooted; `..` segments are folded.
pub(super) fn resolve_target(base_dir: &str, target: &str) -> String {
    let joined = match target.strip_prefix('/') {
        Some(rooted) => rooted.to_string(),
        None => format!("{base_dir}/{target}"),
    };
    let mut parts: Vec<&str> = Vec::new();
    for segment in joined.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            s => parts.push(s),
        }
    }
    parts.join("/")
}

/// Open an archive member, mapping a missing member to `None`.
fn open_part<'a, R: Read + Seek>(
    archive: &'a mut ZipArchive<R>,
    path: &str,
) -> Result<Option<zip::read::ZipFile<'a>>> {
    match archive.by_name(path) {
        Ok(file) => Ok(Some(file)),
        Err(ZipError::FileNotFound) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Parse xl/_rels/workbook.xml.rels. A missing part yields defaults.
pub(super) fn parse_workbook_relationships<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
) -> Result<WorkbookRelationships> {
    let mut rels = WorkbookRelationships::default();
    let Some(file) = open_part(archive, "xl/_rels/workbook.xml.rels")? else {
        return Ok(rels);
    };

    let mut xml = xml_reader(BufReader::new(file));
    let mut buf = Vec::new();

    loop {
        match xml.read_event_into(&mut buf)? {
            Event::Empty(ref e) | Event::Start(ref e)
                if e.local_name().as_ref() == b"Relationship" =>
            {
                let external = attr_string(e, b"TargetMode").as_deref() == Some("External");
                if let (Some(id), Some(target), false) =
                    (attr_string(e, b"Id"), attr_string(e, b"Target"), external)
                {
                    let rel_type = attr_string(e, b"Type").unwrap_or_default();
                    let path = resolve_target("xl", &target);

                    if rel_type.ends_with("/worksheet") {
                        rels.worksheets.insert(id, path);
                    } else if rel_type.ends_with("/sharedStrings") {
                        rels.shared_strings = Some(path);
                    } else if rel_type.ends_with("/styles") {
                        rels.styles = Some(path);
                    } else if rel_type.ends_with("/theme") {
                        rels.theme = Some(path);
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(rels)
}

/// Read the sheet list and the date1904 flag from xl/workbook.xml.
///
/// The workbook part is required; its absence is a `Zip(FileNotFound)` error.
pub(super) fn get_sheet_info<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    relationships: &HashMap<String, String>,
) -> Result<(Vec<SheetInfo>, bool)> {
    let file = archive.by_name("xl/workbook.xml")?;
    let mut xml = xml_reader(BufReader::new(file));

    let mut sheets = Vec::new();
    let mut date1904 = false;
    let mut buf = Vec::new();

    loop {
        match xml.read_event_into(&mut buf)? {
            Event::Empty(ref e) | Event::Start(ref e) => match e.local_name().as_ref() {
                b"workbookPr" => {
                    date1904 = attr_string(e, b"date1904")
                        .is_some_and(|v| v == "1" || v.eq_ignore_ascii_case("true"));
                }
                b"sheet" => {
                    if let Some(name) = attr_string(e, b"name").filter(|n| !n.is_empty()) {
                        let path = attr_string_local(e, b"id")
                            .and_then(|rid| relationships.get(&rid).cloned())
                            .unwrap_or_else(|| {
                                format!("xl/worksheets/sheet{}.xml", sheets.len() + 1)
                            });
                        sheets.push(SheetInfo { name, path });
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok((sheets, date1904))
}

/// Colour scheme slot order used by `theme="N"` references.
const THEME_SLOTS: [&[u8]; 12] = [
    b"lt1", b"dk1", b"lt2", b"dk2", b"accent1", b"accent2", b"accent3", b"accent4",
    b"accent5", b"accent6", b"hlink", b"folHlink",
];

/// Theme colours and fonts. The theme is optional and decorative, so a
/// missing or malformed part falls back to the Office defaults.
pub(super) fn parse_theme<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    path: Option<&str>,
) -> Theme {
    let mut theme = Theme {
        colors: DEFAULT_THEME_COLORS.iter().map(ToString::to_string).collect(),
        major_font: None,
        minor_font: None,
    };

    let Ok(Some(file)) = open_part(archive, path.unwrap_or("xl/theme/theme1.xml")) else {
        return theme;
    };

    let mut xml = xml_reader(BufReader::new(file));
    let mut buf = Vec::new();
    let mut slot: Option<usize> = None;
    let mut font_target: Option<bool> = None; // Some(true) = major, Some(false) = minor

    loop {
        match xml.read_event_into(&mut buf) {
            Err(e) => {
                tracing::warn!(error = %e, "malformed theme part, keeping colours read so far");
                break;
            }
            Ok(Event::Start(ref e) | Event::Empty(ref e)) => {
                let name = e.local_name();
                match name.as_ref() {
                    b"majorFont" => font_target = Some(true),
                    b"minorFont" => font_target = Some(false),
                    b"srgbClr" | b"sysClr" => {
                        let raw = attr_string(e, b"lastClr").or_else(|| attr_string(e, b"val"));
                        if let (Some(idx), Some(hex)) = (slot, raw.and_then(|v| normalize_hex(&v)))
                        {
                            if let Some(c) = theme.colors.get_mut(idx) {
                                *c = hex;
                            }
                        }
                    }
                    b"latin" => {
                        let face = attr_string(e, b"typeface").filter(|f| !f.is_empty());
                        match font_target {
                            Some(true) if theme.major_font.is_none() => theme.major_font = face,
                            Some(false) if theme.minor_font.is_none() => theme.minor_font = face,
                            _ => {}
                        }
                    }
                    other => {
                        if let Some(idx) = THEME_SLOTS.iter().position(|s| *s == other) {
                            slot = Some(idx);
                        }
                    }
                }
            }
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"majorFont" | b"minorFont" => font_target = None,
                b"clrScheme" => slot = None,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Ok(_) => {}
        }
        buf.clear();
    }

    theme
}

/// Shared string table. Rich-text runs are concatenated; phonetic runs
/// (`<rPh>`) are skipped.
pub(super) fn parse_shared_strings<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    path: Option<&str>,
) -> Result<Vec<String>> {
    let Some(file) = open_part(archive, path.unwrap_or("xl/sharedStrings.xml"))? else {
        return Ok(Vec::new());
    };

    let mut xml = xml_reader(BufReader::new(file));
    let mut strings = Vec::new();
    let mut buf = Vec::new();
    let mut current = String::new();
    let mut in_si = false;
    let mut in_t = false;
    let mut in_phonetic = false;

    loop {
        match xml.read_event_into(&mut buf)? {
            Event::Start(ref e) => match e.local_name().as_ref() {
                b"si" => {
                    in_si = true;
                    current.clear();
                }
                b"rPh" => in_phonetic = true,
                b"t" if in_si && !in_phonetic => in_t = true,
                _ => {}
            },
            Event::Empty(ref e) if e.local_name().as_ref() == b"si" => strings.push(String::new()),
            Event::Text(ref t) if in_t => current.push_str(&text_content(t)),
            Event::CData(ref c) if in_t => current.push_str(&String::from_utf8_lossy(c)),
            Event::End(ref e) => match e.local_name().as_ref() {
                b"si" => {
                    strings.push(std::mem::take(&mut current));
                    in_si = false;
                }
                b"rPh" => in_phonetic = false,
                b"t" => in_t = false,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(strings)
}

/// Parse the stylesheet; a workbook without one renders unstyled.
pub(super) fn parse_stylesheet<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    path: Option<&str>,
) -> Result<StyleSheet> {
    match open_part(archive, path.unwrap_or("xl/styles.xml"))? {
        Some(file) => parse_styles(BufReader::new(file)),
        None => Ok(StyleSheet::default()),
    }
}
