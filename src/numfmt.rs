//! Date and time number formats.
//!
//! Summary sheets only need one thing from number formats: recognizing
//! that a numeric cell holds a date serial, so the grid can show a calendar
//! value instead of the raw serial. Other formats leave the number as is.

/// What a date-like number format displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateKind {
    /// Calendar date, rendered `YYYY-MM-DD`.
    Date,
    /// Date with a time of day, rendered `YYYY-MM-DD HH:MM:SS`.
    DateTime,
    /// Time of day or duration, rendered `HH:MM:SS`.
    Time,
}

/// Largest serial Excel accepts (9999-12-31).
const MAX_SERIAL: f64 = 2_958_465.0;
const SECONDS_PER_DAY: i64 = 86_400;
/// 1970-01-01 as a 1900-system serial, counting the phantom 1900-02-29.
const UNIX_EPOCH_1900: i64 = 25_569;
/// 1970-01-01 as a 1904-system serial.
const UNIX_EPOCH_1904: i64 = 24_107;

/// Classify a built-in format id (0-163) that has no custom code.
#[must_use]
pub const fn builtin_date_kind(id: u32) -> Option<DateKind> {
    match id {
        14..=17 | 27..=31 | 34..=36 | 50..=58 => Some(DateKind::Date),
        22 => Some(DateKind::DateTime),
        18..=21 | 32 | 33 | 45..=47 => Some(DateKind::Time),
        _ => None,
    }
}

/// Classify a format code by its date and time tokens.
///
/// Quoted literals, escaped characters and bracketed sections (colours,
/// locales, conditions) are skipped, except elapsed-time brackets like `[h]`.
#[must_use]
pub fn date_kind_of(format_code: &str) -> Option<DateKind> {
    let lower = format_code
        .to_ascii_lowercase()
        .replace("am/pm", "")
        .replace("a/p", "");

    let mut tokens = String::with_capacity(lower.len());
    let mut chars = lower.chars();
    let mut in_quotes = false;
    while let Some(c) = chars.next() {
        match c {
            '"' => in_quotes = !in_quotes,
            _ if in_quotes => {}
            '\\' | '_' | '*' => {
                chars.next();
            }
            '[' => {
                let inner: String = chars.by_ref().take_while(|&c| c != ']').collect();
                if !inner.is_empty() && inner.chars().all(|c| matches!(c, 'h' | 'm' | 's')) {
                    tokens.push_str(&inner);
                    tokens.push(':');
                }
            }
            _ => tokens.push(c),
        }
    }

    // Only the first section decides; later ones format negatives and text.
    let first = tokens.split(';').next().unwrap_or_default();
    let has = |c: char| first.contains(c);

    let has_time = has('h') || has('s');
    let has_date = has('y') || has('d') || (has('m') && !has_time);

    match (has_date, has_time) {
        (true, true) => Some(DateKind::DateTime),
        (true, false) => Some(DateKind::Date),
        (false, true) => Some(DateKind::Time),
        (false, false) => None,
    }
}

/// Resolve the date kind for a cell format, custom codes taking precedence.
#[must_use]
pub fn resolve_date_kind(num_fmt_id: u32, custom: &[(u32, String)]) -> Option<DateKind> {
    match custom.iter().find(|(id, _)| *id == num_fmt_id) {
        Some((_, code)) => date_kind_of(code),
        None => builtin_date_kind(num_fmt_id),
    }
}

/// Render a date serial. Returns `None` for serials outside Excel's range,
/// in which case the caller keeps the number.
#[must_use]
pub fn format_serial(serial: f64, kind: DateKind, date1904: bool) -> Option<String> {
    if !serial.is_finite() || serial < 0.0 || serial > MAX_SERIAL {
        return None;
    }

    let total_seconds = round_to_i64(serial * 86_400.0)?;
    let day_serial = total_seconds.div_euclid(SECONDS_PER_DAY);
    let secs = total_seconds.rem_euclid(SECONDS_PER_DAY);
    let time = format!(
        "{:02}:{:02}:{:02}",
        secs / 3600,
        (secs % 3600) / 60,
        secs % 60
    );

    if kind == DateKind::Time {
        return Some(time);
    }

    let date = if !date1904 && day_serial == 60 {
        // The 1900 system's phantom leap day.
        "1900-02-29".to_string()
    } else {
        let unix_days = if date1904 {
            day_serial - UNIX_EPOCH_1904
        } else if day_serial < 60 {
            day_serial - UNIX_EPOCH_1900 + 1
        } else {
            day_serial - UNIX_EPOCH_1900
        };
        let (y, m, d) = civil_from_days(unix_days);
        format!("{y:04}-{m:02}-{d:02}")
    };

    match kind {
        DateKind::DateTime => Some(format!("{date} {time}")),
        _ => Some(date),
    }
}

#[allow(clippy::cast_possible_truncation)]
fn round_to_i64(v: f64) -> Option<i64> {
    let r = v.round();
    // Range-checked above; the serial ceiling keeps this well inside i64.
    (r.abs() < 1e15).then_some(r as i64)
}

/// Days since 1970-01-01 to a proleptic Gregorian (year, month, day).
fn civil_from_days(days: i64) -> (i64, i64, i64) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = doy - (153 * mp + 2) / 5 + 1;
    let m = if mp < 10 { mp + 3 } else { mp - 9 };
    let y = yoe + era * 400 + i64::from(m <= 2);
    (y, m, d)
}
