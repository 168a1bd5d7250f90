//! Colour resolution for styles.xml colour references.
//!
//! A `<color>` element can name an RGB/ARGB value, a theme slot with an
//! optional tint, an entry of the indexed palette, or `auto`. Everything is
//! resolved to a `#RRGGBB` string.

use crate::types::ColorSpec;

/// The legacy 64-entry indexed palette.
pub const INDEXED_COLORS: [&str; 64] = [
    "#000000", "#FFFFFF", "#FF0000", "#00FF00", "#0000FF", "#FFFF00", "#FF00FF", "#00FFFF",
    "#000000", "#FFFFFF", "#FF0000", "#00FF00", "#0000FF", "#FFFF00", "#FF00FF", "#00FFFF",
    "#800000", "#008000", "#000080", "#808000", "#800080", "#008080", "#C0C0C0", "#808080",
    "#9999FF", "#993366", "#FFFFCC", "#CCFFFF", "#660066", "#FF8080", "#0066CC", "#CCCCFF",
    "#000080", "#FF00FF", "#FFFF00", "#00FFFF", "#800080", "#800000", "#008080", "#0000FF",
    "#00CCFF", "#CCFFFF", "#CCFFCC", "#FFFF99", "#99CCFF", "#FF99CC", "#CC99FF", "#FFCC99",
    "#3366FF", "#33CCCC", "#99CC00", "#FFCC00", "#FF9900", "#FF6600", "#666699", "#969696",
    "#003366", "#339966", "#003300", "#333300", "#993300", "#993366", "#333399", "#333333",
];

/// Office theme colours, used when the workbook ships no theme part.
///
/// Slot order: lt1, dk1, lt2, dk2, accent1-6, hlink, folHlink.
pub const DEFAULT_THEME_COLORS: [&str; 12] = [
    "#FFFFFF", "#000000", "#E7E6E6", "#44546A", "#4472C4", "#ED7D31", "#A5A5A5", "#FFC000",
    "#5B9BD5", "#70AD47", "#0563C1", "#954F72",
];

/// Indexed slot 64 is the system foreground.
const SYSTEM_FOREGROUND: u32 = 64;

/// Theme and indexed colours of one workbook.
#[derive(Debug, Clone, Copy)]
pub struct Palette<'a> {
    pub theme: &'a [String],
    pub indexed: Option<&'a [String]>,
}

impl<'a> Palette<'a> {
    #[must_use]
    pub const fn new(theme: &'a [String], indexed: Option<&'a [String]>) -> Self {
        Self { theme, indexed }
    }

    /// Resolve a colour reference. Priority: rgb, theme, indexed, auto.
    ///
    /// `auto` yields `None` so the caller's default applies.
    #[must_use]
    pub fn resolve(&self, color: &ColorSpec) -> Option<String> {
        if let Some(rgb) = &color.rgb {
            return normalize_hex(rgb);
        }

        if let Some(slot) = color.theme {
            let idx = usize::try_from(slot).ok()?;
            let base = self
                .theme
                .get(idx)
                .map(String::as_str)
                .or_else(|| DEFAULT_THEME_COLORS.get(idx).copied())?;
            return match color.tint {
                Some(tint) if tint.abs() > f64::EPSILON => apply_tint(base, tint),
                _ => normalize_hex(base),
            };
        }

        if let Some(indexed) = color.indexed {
            if indexed == SYSTEM_FOREGROUND {
                return Some("#000000".to_string());
            }
            let idx = usize::try_from(indexed).ok()?;
            let custom = self.indexed.and_then(|p| p.get(idx)).map(String::as_str);
            let base = custom.or_else(|| INDEXED_COLORS.get(idx).copied())?;
            return normalize_hex(base);
        }

        None
    }
}

/// Normalize `RRGGBB`, `AARRGGBB` or `#RRGGBB` to uppercase `#RRGGBB`.
///
/// The alpha byte of ARGB values is dropped. Returns `None` for anything
/// that is not hex of one of those lengths.
#[must_use]
pub fn normalize_hex(raw: &str) -> Option<String> {
    let hex = raw.trim().trim_start_matches('#');
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let rgb = match hex.len() {
        6 => hex,
        8 => hex.get(2..)?,
        _ => return None,
    };
    Some(format!("#{}", rgb.to_ascii_uppercase()))
}

fn parse_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.trim_start_matches('#');
    let channel = |range: std::ops::Range<usize>| {
        hex.get(range)
            .and_then(|s| u8::from_str_radix(s, 16).ok())
    };
    Some((channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

/// Lighten (positive tint) or darken (negative tint) a colour in HSL space.
#[must_use]
pub fn apply_tint(hex_color: &str, tint: f64) -> Option<String> {
    let normalized = normalize_hex(hex_color)?;
    let (r, g, b) = parse_rgb(&normalized)?;
    let (h, s, l) = rgb_to_hsl(r, g, b);

    let lum = if tint < 0.0 {
        l * (1.0 + tint)
    } else {
        (1.0 - l).mul_add(tint, l)
    };

    let (r, g, b) = hsl_to_rgb(h, s, lum.clamp(0.0, 1.0));
    Some(format!("#{r:02X}{g:02X}{b:02X}"))
}

#[allow(clippy::many_single_char_names)]
fn rgb_to_hsl(r: u8, g: u8, b: u8) -> (f64, f64, f64) {
    let r = f64::from(r) / 255.0;
    let g = f64::from(g) / 255.0;
    let b = f64::from(b) / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;
    let d = max - min;

    if d.abs() < f64::EPSILON {
        return (0.0, 0.0, l);
    }

    let s = if l > 0.5 {
        d / (2.0 - max - min)
    } else {
        d / (max + min)
    };

    let h = if (max - r).abs() < f64::EPSILON {
        (g - b) / d + if g < b { 6.0 } else { 0.0 }
    } else if (max - g).abs() < f64::EPSILON {
        (b - r) / d + 2.0
    } else {
        (r - g) / d + 4.0
    };

    (h / 6.0, s, l)
}

#[allow(clippy::many_single_char_names)]
fn hsl_to_rgb(h: f64, s: f64, l: f64) -> (u8, u8, u8) {
    if s.abs() < f64::EPSILON {
        let v = to_channel(l);
        return (v, v, v);
    }

    let q = if l < 0.5 {
        l * (1.0 + s)
    } else {
        l.mul_add(-s, l + s)
    };
    let p = 2.0f64.mul_add(l, -q);

    (
        to_channel(hue_to_rgb(p, q, h + 1.0 / 3.0)),
        to_channel(hue_to_rgb(p, q, h)),
        to_channel(hue_to_rgb(p, q, h - 1.0 / 3.0)),
    )
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_channel(v: f64) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

fn hue_to_rgb(p: f64, q: f64, mut t: f64) -> f64 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        return ((q - p) * 6.0).mul_add(t, p);
    }
    if t < 0.5 {
        return q;
    }
    if t < 2.0 / 3.0 {
        return ((q - p) * (2.0 / 3.0 - t)).mul_add(6.0, p);
    }
    p
}
