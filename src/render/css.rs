//! Cell style translation to inline CSS, plus escaping helpers.

use crate::types::{Cell, CellStyle, CellValue};

/// Escape text for use in HTML content and attribute values.
pub fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Accept a CSS value only if it cannot break out of its declaration.
///
/// Declarations, blocks, escapes, comments and `url()`/`expression()` are
/// rejected outright rather than repaired.
pub fn sanitize_css_value(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    let allowed = |c: char| {
        c.is_alphanumeric() || matches!(c, ' ' | '#' | '.' | ',' | '%' | '-' | '_' | '(' | ')' | '\'')
    };
    if !trimmed.chars().all(allowed) {
        return None;
    }
    let lower = trimmed.to_ascii_lowercase();
    if lower.contains("url(") || lower.contains("expression(") {
        return None;
    }
    Some(trimmed.to_string())
}

/// Inline style for one rendered cell.
///
/// Text alignment precedence: booleans center, merge origins center, then
/// the cell's own alignment, then right-aligned monospace for numbers.
pub fn cell_css(cell: Option<&Cell>, merge_origin: bool) -> String {
    let mut decls: Vec<(&'static str, String)> = Vec::new();
    let value = cell.map_or(&CellValue::Empty, |c| &c.value);
    let style = cell.and_then(|c| c.styling.as_ref());

    if let Some(s) = style {
        push_font(&mut decls, s);
        push_sanitized(&mut decls, "color", s.color.as_deref());
        push_sanitized(&mut decls, "background-color", s.background_color.as_deref());
        push_sanitized(&mut decls, "border", s.border.as_deref());
        if s.wraps() {
            decls.push(("white-space", "pre-wrap".to_string()));
        }
    }

    let explicit = style.and_then(|s| s.alignment);
    let align = match value {
        CellValue::Bool(_) => Some("center"),
        _ if merge_origin => Some("center"),
        _ => match explicit {
            Some(a) => Some(a.as_css()),
            None if matches!(value, CellValue::Number(_)) => {
                decls.retain(|(k, _)| *k != "font-family");
                decls.push(("font-family", "monospace".to_string()));
                Some("right")
            }
            None => None,
        },
    };
    if let Some(a) = align {
        decls.push(("text-align", a.to_string()));
    }

    decls
        .iter()
        .map(|(k, v)| format!("{k}: {v}"))
        .collect::<Vec<_>>()
        .join("; ")
}

fn push_font(decls: &mut Vec<(&'static str, String)>, s: &CellStyle) {
    if s.is_bold() {
        decls.push(("font-weight", "bold".to_string()));
    }
    if s.is_italic() {
        decls.push(("font-style", "italic".to_string()));
    }
    if s.is_underline() {
        decls.push(("text-decoration", "underline".to_string()));
    }
    if let Some(size) = s.font_size.filter(|v| v.is_finite() && *v > 0.0) {
        decls.push(("font-size", format!("{size}pt")));
    }
    push_sanitized(decls, "font-family", s.font_family.as_deref());
}

fn push_sanitized(decls: &mut Vec<(&'static str, String)>, key: &'static str, value: Option<&str>) {
    match value.map(sanitize_css_value) {
        Some(Some(v)) => decls.push((key, v)),
        Some(None) => tracing::debug!(property = key, "dropping unsafe css value"),
        None => {}
    }
}
