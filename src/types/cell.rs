use serde::{Deserialize, Serialize};

use super::CellStyle;

/// A scalar cell value.
///
/// Serializes to the bare JSON scalar: `null`, a string, a number or a boolean.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Bool(bool),
    Number(f64),
    Text(String),
    #[default]
    Empty,
}

impl CellValue {
    /// True for `Empty` and for text that is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Text as shown in the grid. Booleans use spreadsheet literals.
    #[must_use]
    pub fn display_text(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Text(s) => s.clone(),
            Self::Number(n) => format_number(*n),
            Self::Bool(true) => "TRUE".to_string(),
            Self::Bool(false) => "FALSE".to_string(),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i32> for CellValue {
    fn from(n: i32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl<T: Into<Self>> From<Option<T>> for CellValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Empty, Into::into)
    }
}

/// Shortest round-trip form; integral values print without a fraction.
fn format_number(n: f64) -> String {
    if n.is_finite() {
        format!("{n}")
    } else {
        String::new()
    }
}

/// A single grid cell after normalization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawCell")]
pub struct Cell {
    pub value: CellValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub styling: Option<CellStyle>,
}

impl Cell {
    #[must_use]
    pub fn new(value: impl Into<CellValue>) -> Self {
        Self {
            value: value.into(),
            styling: None,
        }
    }

    #[must_use]
    pub fn styled(value: impl Into<CellValue>, styling: CellStyle) -> Self {
        Self {
            value: value.into(),
            styling: Some(styling),
        }
    }

    /// An empty, unstyled cell (the `null` of the legacy form).
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Wire shape of a cell: a bare scalar, or `{ value, styling? }`.
///
/// Objects are recognized by their `value` key; everything else must be a scalar.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RawCell {
    Styled {
        value: CellValue,
        #[serde(default)]
        styling: Option<CellStyle>,
    },
    Scalar(CellValue),
}

impl From<RawCell> for Cell {
    fn from(raw: RawCell) -> Self {
        match raw {
            RawCell::Styled { value, styling } => Self { value, styling },
            RawCell::Scalar(value) => Self {
                value,
                styling: None,
            },
        }
    }
}
