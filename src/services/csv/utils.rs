use serde::Serialize;

use crate::error::AppError;
use super::types::DatasetAnalysis;

pub fn ensure_csv_file_name(file_name: &str) -> Result<(), AppError> {
    if file_name.to_lowercase().ends_with(".csv") {
        Ok(())
    } else {
        tracing::warn!("Rejected upload with unsupported file name: {}", file_name);
        Err(AppError::InvalidInput("Please upload a CSV file".to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataQuality {
    Good,
    Poor,
}

/// Headline numbers shown above the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryCards {
    pub total_records: usize,
    pub numeric_columns: usize,
    pub text_columns: usize,
    pub data_quality: DataQuality,
}

impl From<&DatasetAnalysis> for SummaryCards {
    fn from(analysis: &DatasetAnalysis) -> Self {
        Self {
            total_records: analysis.total_rows,
            numeric_columns: analysis.numeric_columns.len(),
            text_columns: analysis.categorical_columns.len(),
            data_quality: if analysis.total_rows > 0 {
                DataQuality::Good
            } else {
                DataQuality::Poor
            },
        }
    }
}

/// Initial axis selection: first column on x, second on y.
pub fn default_axes(columns: &[String]) -> (String, String) {
    let x = columns.first().cloned().unwrap_or_default();
    let y = columns.get(1).cloned().unwrap_or_default();
    (x, y)
}
