//! Shared XML helpers for the OOXML part readers.
//!
//! Attribute lookups match on the full key; entity references in values
//! are unescaped, falling back to the raw bytes when unescaping fails.

use std::io::BufRead;

use quick_xml::events::{BytesStart, BytesText};
use quick_xml::Reader;

use crate::types::ColorSpec;

/// Extract a string attribute value by key.
///
/// Returns `None` if the attribute is missing or not valid UTF-8.
pub fn attr_string(e: &BytesStart, key: &[u8]) -> Option<String> {
    for attr in e.attributes().flatten() {
        if attr.key.as_ref() == key {
            return match attr.unescape_value() {
                Ok(v) => Some(v.into_owned()),
                Err(_) => std::str::from_utf8(&attr.value).ok().map(str::to_string),
            };
        }
    }
    None
}

/// Extract a string attribute by local name (ignoring namespace prefix).
pub fn attr_string_local(e: &BytesStart, key: &[u8]) -> Option<String> {
    for attr in e.attributes().flatten() {
        if attr.key.local_name().as_ref() == key {
            return std::str::from_utf8(&attr.value).ok().map(str::to_string);
        }
    }
    None
}

pub fn attr_u32(e: &BytesStart, key: &[u8]) -> Option<u32> {
    attr_string(e, key).and_then(|s| s.trim().parse().ok())
}

pub fn attr_f64(e: &BytesStart, key: &[u8]) -> Option<f64> {
    attr_string(e, key).and_then(|s| s.trim().parse().ok())
}

/// Recognizes `"1"` and `"true"` as true; anything else present is false.
pub fn attr_bool(e: &BytesStart, key: &[u8]) -> Option<bool> {
    attr_string(e, key).map(|s| matches!(s.as_str(), "1" | "true"))
}

/// The `val` attribute, ubiquitous in styles.xml.
pub fn attr_val(e: &BytesStart) -> Option<String> {
    attr_string(e, b"val")
}

pub fn attr_val_f64(e: &BytesStart) -> Option<f64> {
    attr_f64(e, b"val")
}

/// Boolean toggle elements like `<b/>` or `<i val="0"/>`: present means on
/// unless `val` says otherwise.
pub fn toggle_on(e: &BytesStart) -> bool {
    attr_bool(e, b"val").unwrap_or(true)
}

/// Parse `rgb`, `theme`, `tint`, `indexed` and `auto` into a `ColorSpec`.
pub fn parse_color_attrs(e: &BytesStart) -> ColorSpec {
    ColorSpec {
        rgb: attr_string(e, b"rgb"),
        theme: attr_u32(e, b"theme"),
        tint: attr_f64(e, b"tint"),
        indexed: attr_u32(e, b"indexed"),
        auto: attr_bool(e, b"auto").unwrap_or(false),
    }
}

/// Decode a text node, keeping the raw text if an entity is malformed.
pub fn text_content(t: &BytesText) -> String {
    match t.unescape() {
        Ok(s) => s.into_owned(),
        Err(_) => String::from_utf8_lossy(t).into_owned(),
    }
}

/// A reader configured the same way for every part.
pub fn xml_reader<B: BufRead>(source: B) -> Reader<B> {
    let mut reader = Reader::from_reader(source);
    reader.trim_text(false);
    reader
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp
)]
mod tests {
    use super::*;

    fn make_start(xml: &str) -> BytesStart<'_> {
        let content = xml
            .trim_start_matches('<')
            .trim_end_matches('>')
            .trim_end_matches('/')
            .trim_end();
        BytesStart::from_content(content, content.find(' ').unwrap_or(content.len()))
    }

    #[test]
    fn attr_string_unescapes_entities() {
        let e = make_start(r#"<sheet name="Marks &amp; Grades" />"#);
        assert_eq!(attr_string(&e, b"name").as_deref(), Some("Marks & Grades"));
        assert_eq!(attr_string(&e, b"missing"), None);
    }

    #[test]
    fn numeric_attrs() {
        let e = make_start(r#"<sz count="42" val="10.5" />"#);
        assert_eq!(attr_u32(&e, b"count"), Some(42));
        assert_eq!(attr_val_f64(&e), Some(10.5));
    }

    #[test]
    fn toggles_default_on() {
        assert!(toggle_on(&make_start("<b/>")));
        assert!(!toggle_on(&make_start(r#"<i val="0"/>"#)));
        assert!(toggle_on(&make_start(r#"<u val="true"/>"#)));
    }

    #[test]
    fn local_name_ignores_prefix() {
        let e = make_start(r#"<Relationship r:id="rId3" />"#);
        assert_eq!(attr_string_local(&e, b"id").as_deref(), Some("rId3"));
    }

    #[test]
    fn color_attrs() {
        let e = make_start(r#"<color rgb="FFFF0000" theme="1" tint="0.5" />"#);
        let color = parse_color_attrs(&e);
        assert_eq!(color.rgb.as_deref(), Some("FFFF0000"));
        assert_eq!(color.theme, Some(1));
        assert_eq!(color.tint, Some(0.5));
        assert!(color.indexed.is_none());
        assert!(!color.auto);
    }
}
