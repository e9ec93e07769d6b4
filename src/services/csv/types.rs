use std::collections::HashMap;
use std::fmt;

use serde::Serialize;
use smallvec::SmallVec;

pub const TOP_VALUES_LIMIT: usize = 10;

/// A single parsed cell: a number when the lenient float parse succeeds, the
/// cleaned text otherwise.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Text(String),
}

impl CellValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Text(_) => None,
        }
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Number(n) if n.is_infinite() && n.is_sign_positive() => f.write_str("Infinity"),
            CellValue::Number(n) if n.is_infinite() => f.write_str("-Infinity"),
            // -0 prints as "0", like a browser would
            CellValue::Number(n) if *n == 0.0 => f.write_str("0"),
            CellValue::Number(n) => write_number(f, *n),
            CellValue::Text(s) => f.write_str(s),
        }
    }
}

/// Finite, non-zero numbers. Magnitudes of 1e21 and up, or below 1e-6, use
/// exponent notation with an explicit sign (`1e+21`, `1.5e-7`).
fn write_number(f: &mut fmt::Formatter<'_>, n: f64) -> fmt::Result {
    let magnitude = n.abs();
    if (1e-6..1e21).contains(&magnitude) {
        return write!(f, "{}", n);
    }

    let exponential = format!("{:e}", n);
    match exponential.split_once('e') {
        Some((mantissa, exponent)) if !exponent.starts_with('-') => {
            write!(f, "{}e+{}", mantissa, exponent)
        }
        _ => f.write_str(&exponential),
    }
}

pub type Row = HashMap<String, CellValue>;

#[derive(Debug, Clone, Default, Serialize)]
pub struct ParsedCsv {
    pub rows: Vec<Row>,
    pub columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ColumnAnalysis {
    Numeric {
        min: f64,
        max: f64,
        average: f64,
        sum: f64,
    },
    Categorical {
        unique_count: usize,
        top_values: SmallVec<[CellValue; TOP_VALUES_LIMIT]>,
    },
}

impl ColumnAnalysis {
    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnAnalysis::Numeric { .. })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DatasetAnalysis {
    pub total_rows: usize,
    pub numeric_columns: Vec<String>,
    pub categorical_columns: Vec<String>,
    pub summary: HashMap<String, ColumnAnalysis>,
}
