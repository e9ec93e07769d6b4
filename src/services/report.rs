use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::services::charts::ChartType;
use crate::services::csv::{DatasetAnalysis, Row};

const SAMPLE_ROWS: usize = 10;

static WHITESPACE_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

#[derive(Debug, Clone, Serialize)]
pub struct ChartSettings {
    pub x_axis: String,
    pub y_axis: String,
    #[serde(rename = "type")]
    pub chart_type: ChartType,
}

/// Downloadable snapshot of a dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardReport {
    pub file_name: String,
    pub upload_date: DateTime<Utc>,
    pub data_analysis: DatasetAnalysis,
    pub sample_data: Vec<Row>,
    pub charts: ChartSettings,
}

impl DashboardReport {
    pub fn build(file_name: &str, rows: &[Row], analysis: DatasetAnalysis, charts: ChartSettings) -> Self {
        Self {
            file_name: file_name.to_string(),
            upload_date: Utc::now(),
            data_analysis: analysis,
            sample_data: rows.iter().take(SAMPLE_ROWS).cloned().collect(),
            charts,
        }
    }

    pub fn download_name(&self) -> String {
        format!("{}_report.json", self.file_name.replacen(".csv", "", 1))
    }
}

/// Summary document offered next to a published report.
#[derive(Debug, Clone, Serialize)]
pub struct ReportSummary {
    pub report_name: String,
    pub generated_at: DateTime<Utc>,
    pub data_rows: usize,
    pub power_bi_url: String,
    pub summary: String,
}

impl ReportSummary {
    pub fn new(report_name: &str, embed_url: &str, data_rows: usize) -> Self {
        Self {
            report_name: report_name.to_string(),
            generated_at: Utc::now(),
            data_rows,
            power_bi_url: embed_url.to_string(),
            summary: format!("Power BI report generated from {} rows of data", data_rows),
        }
    }

    pub fn download_name(&self) -> String {
        format!("{}_powerbi_report.json", WHITESPACE_RUN.replace_all(&self.report_name, "_"))
    }
}

pub fn content_disposition(file_name: &str) -> String {
    let safe: String = file_name
        .chars()
        .filter(|c| *c != '"' && !c.is_control())
        .collect();
    format!("attachment; filename=\"{}\"", safe)
}
