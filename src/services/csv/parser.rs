use thiserror::Error;

use super::types::{CellValue, ParsedCsv, Row};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CsvError {
    #[error("CSV file is empty")]
    EmptyInput,
}

/// Parses comma separated text whose first line is the header.
///
/// Quotes are stripped, not honoured: a quoted field holding a comma is split
/// like any other. Lines whose field count differs from the header are
/// dropped without error.
pub fn parse(csv_text: &str) -> Result<ParsedCsv, CsvError> {
    let trimmed = trim_text(csv_text);
    if trimmed.is_empty() {
        return Err(CsvError::EmptyInput);
    }

    let mut lines = trimmed.split('\n');
    let columns: Vec<String> = match lines.next() {
        Some(header) => split_fields(header).collect(),
        None => return Err(CsvError::EmptyInput),
    };

    let mut rows = Vec::new();
    let mut skipped = 0usize;

    for (line_no, line) in lines.enumerate() {
        let values: Vec<String> = split_fields(line).collect();
        if values.len() != columns.len() {
            skipped += 1;
            tracing::debug!(
                "Dropping line {}: {} fields, header has {}",
                line_no + 2,
                values.len(),
                columns.len()
            );
            continue;
        }

        let row: Row = columns
            .iter()
            .zip(values)
            .map(|(header, value)| (header.clone(), coerce(value)))
            .collect();
        rows.push(row);
    }

    if skipped > 0 {
        tracing::debug!("Parsed {} rows, dropped {} malformed lines", rows.len(), skipped);
    }

    Ok(ParsedCsv { rows, columns })
}

fn is_trimmed_char(c: char) -> bool {
    // byte order marks trim like whitespace
    c.is_whitespace() || c == '\u{FEFF}'
}

fn trim_text(text: &str) -> &str {
    text.trim_matches(is_trimmed_char)
}

fn split_fields(line: &str) -> impl Iterator<Item = String> + '_ {
    line.split(',').map(|field| trim_text(field).replace('"', ""))
}

fn coerce(value: String) -> CellValue {
    match parse_float_prefix(&value) {
        Some(number) => CellValue::Number(number),
        None => CellValue::Text(value),
    }
}

/// Lenient float parse: skips leading whitespace and reads the longest prefix
/// that forms a decimal literal or `Infinity`. Trailing garbage is ignored, so
/// `"42abc"` yields 42.
pub fn parse_float_prefix(input: &str) -> Option<f64> {
    let s = input.trim_start_matches(is_trimmed_char);
    let bytes = s.as_bytes();
    let mut end = 0;

    let sign_len = match bytes.first() {
        Some(b'+') | Some(b'-') => 1,
        _ => 0,
    };
    end += sign_len;

    if s[end..].starts_with("Infinity") {
        let negative = bytes.first() == Some(&b'-');
        return Some(if negative { f64::NEG_INFINITY } else { f64::INFINITY });
    }

    let int_digits = count_digits(&bytes[end..]);
    end += int_digits;

    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = count_digits(&bytes[end + 1..]);
        if int_digits > 0 || frac_digits > 0 {
            end += 1 + frac_digits;
        }
    }

    if int_digits == 0 && frac_digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e') | Some(b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+') | Some(b'-')) {
            exp_end += 1;
        }
        let exp_digits = count_digits(&bytes[exp_end.min(bytes.len())..]);
        if exp_digits > 0 {
            end = exp_end + exp_digits;
        }
    }

    s[..end].parse::<f64>().ok()
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}
