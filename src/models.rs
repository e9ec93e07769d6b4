use crate::error::AppError;
use crate::services::csv::{self, utils::ensure_csv_file_name, DatasetAnalysis, ParsedCsv, Row};

/// One upload: the parsed table together with its analysis.
#[derive(Debug, Clone)]
pub struct UploadedDataset {
    pub file_name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
    pub analysis: DatasetAnalysis,
}

impl UploadedDataset {
    pub fn from_upload(file_name: &str, csv_text: &str) -> Result<Self, AppError> {
        ensure_csv_file_name(file_name)?;

        let start = std::time::Instant::now();
        let ParsedCsv { rows, columns } = csv::parse(csv_text).map_err(|e| {
            tracing::error!("Error parsing CSV {}: {}", file_name, e);
            e
        })?;
        tracing::info!(
            "Parsed {}: {} rows, {} columns in {:?}",
            file_name,
            rows.len(),
            columns.len(),
            start.elapsed()
        );

        let analysis = csv::analyze(&rows, &columns);
        tracing::info!(
            "Analysis of {} completed in {:?}. {} numeric, {} categorical columns",
            file_name,
            start.elapsed(),
            analysis.numeric_columns.len(),
            analysis.categorical_columns.len()
        );

        Ok(Self {
            file_name: file_name.to_string(),
            columns,
            rows,
            analysis,
        })
    }
}
