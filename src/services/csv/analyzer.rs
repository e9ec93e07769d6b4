use std::collections::HashSet;

use rayon::prelude::*;
use smallvec::SmallVec;

use super::types::*;

/// Share of numeric cells a column must exceed to be treated as numeric.
const NUMERIC_THRESHOLD: f64 = 0.5;

pub struct DataAnalyzer;

impl DataAnalyzer {
    pub fn analyze(&self, rows: &[Row], columns: &[String]) -> DatasetAnalysis {
        let start = std::time::Instant::now();

        let per_column: Vec<ColumnAnalysis> = columns
            .par_iter()
            .map(|name| self.analyze_column(rows, name))
            .collect();

        let mut analysis = DatasetAnalysis {
            total_rows: rows.len(),
            ..Default::default()
        };

        for (name, column) in columns.iter().zip(per_column) {
            if column.is_numeric() {
                analysis.numeric_columns.push(name.clone());
            } else {
                analysis.categorical_columns.push(name.clone());
            }
            analysis.summary.insert(name.clone(), column);
        }

        tracing::debug!(
            "Analyzed {} rows x {} columns in {:?} ({} numeric, {} categorical)",
            analysis.total_rows,
            columns.len(),
            start.elapsed(),
            analysis.numeric_columns.len(),
            analysis.categorical_columns.len()
        );

        analysis
    }

    fn analyze_column(&self, rows: &[Row], name: &str) -> ColumnAnalysis {
        let values: Vec<&CellValue> = rows.iter().filter_map(|row| row.get(name)).collect();
        let numbers: Vec<f64> = values.iter().filter_map(|v| v.as_number()).collect();

        // 0/0 is NaN for an empty table, which never exceeds the threshold
        let numeric_ratio = numbers.len() as f64 / values.len() as f64;

        if numeric_ratio > NUMERIC_THRESHOLD {
            numeric_summary(&numbers)
        } else {
            categorical_summary(&values)
        }
    }
}

fn numeric_summary(numbers: &[f64]) -> ColumnAnalysis {
    let (min, max, sum) = numbers.iter().fold(
        (f64::INFINITY, f64::NEG_INFINITY, 0.0),
        |(min, max, sum), &n| (min.min(n), max.max(n), sum + n),
    );

    ColumnAnalysis::Numeric {
        min,
        max,
        average: sum / numbers.len() as f64,
        sum,
    }
}

fn categorical_summary(values: &[&CellValue]) -> ColumnAnalysis {
    let mut seen = HashSet::new();
    let mut top_values = SmallVec::<[CellValue; TOP_VALUES_LIMIT]>::new();

    for value in values {
        if seen.insert(DistinctKey::of(value)) && top_values.len() < TOP_VALUES_LIMIT {
            top_values.push((*value).clone());
        }
    }

    ColumnAnalysis::Categorical {
        unique_count: seen.len(),
        top_values,
    }
}

/// Hashable identity of a cell. Numbers and text never compare equal, and
/// positive and negative zero are the same value.
#[derive(Debug, Hash, PartialEq, Eq)]
enum DistinctKey<'a> {
    Number(u64),
    Text(&'a str),
}

impl<'a> DistinctKey<'a> {
    fn of(value: &'a CellValue) -> Self {
        match value {
            CellValue::Number(n) if *n == 0.0 => DistinctKey::Number(0.0f64.to_bits()),
            CellValue::Number(n) => DistinctKey::Number(n.to_bits()),
            CellValue::Text(s) => DistinctKey::Text(s),
        }
    }
}

pub fn analyze(rows: &[Row], columns: &[String]) -> DatasetAnalysis {
    DataAnalyzer.analyze(rows, columns)
}
