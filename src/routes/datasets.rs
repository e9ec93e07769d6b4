use axum::{
    extract::Query,
    routing::post,
    Router,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use crate::{
    AppState,
    error::AppError,
    models::UploadedDataset,
    services::{
        charts::{dashboard_charts, Chart, ChartType},
        csv::{utils::{default_axes, SummaryCards}, DatasetAnalysis, Row},
    },
};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/datasets", post(upload_dataset))
        .route("/datasets/charts", post(build_charts))
        .layer(super::cors())
}

#[derive(Debug, Deserialize)]
pub struct UploadQuery {
    file_name: String,
}

#[derive(Debug, Serialize)]
pub struct DatasetResponse {
    file_name: String,
    columns: Vec<String>,
    rows: Vec<Row>,
    analysis: DatasetAnalysis,
    cards: SummaryCards,
    default_x_axis: String,
    default_y_axis: String,
}

/// CSV text plus the dashboard's current chart selection.
#[derive(Debug, Deserialize)]
pub struct DashboardRequest {
    pub file_name: String,
    pub csv: String,
    pub x_axis: Option<String>,
    pub y_axis: Option<String>,
    #[serde(default)]
    pub chart_type: ChartType,
}

impl DashboardRequest {
    pub fn axes(&self, columns: &[String]) -> (String, String) {
        let (default_x, default_y) = default_axes(columns);
        (
            self.x_axis.clone().unwrap_or(default_x),
            self.y_axis.clone().unwrap_or(default_y),
        )
    }
}

#[derive(Debug, Serialize)]
pub struct ChartsResponse {
    charts: Vec<Chart>,
}

async fn upload_dataset(
    Query(query): Query<UploadQuery>,
    body: String,
) -> Result<Json<DatasetResponse>, AppError> {
    tracing::info!("Received upload {} ({}KB)", query.file_name, body.len() / 1024);

    let dataset = UploadedDataset::from_upload(&query.file_name, &body)?;
    let (default_x_axis, default_y_axis) = default_axes(&dataset.columns);

    Ok(Json(DatasetResponse {
        cards: SummaryCards::from(&dataset.analysis),
        file_name: dataset.file_name,
        columns: dataset.columns,
        rows: dataset.rows,
        analysis: dataset.analysis,
        default_x_axis,
        default_y_axis,
    }))
}

async fn build_charts(
    Json(request): Json<DashboardRequest>,
) -> Result<Json<ChartsResponse>, AppError> {
    let dataset = UploadedDataset::from_upload(&request.file_name, &request.csv)?;
    let (x_axis, y_axis) = request.axes(&dataset.columns);

    let charts = dashboard_charts(&dataset.rows, &dataset.analysis, &x_axis, &y_axis, request.chart_type);
    tracing::info!("Built {} charts for {} ({} by {})", charts.len(), dataset.file_name, y_axis, x_axis);

    Ok(Json(ChartsResponse { charts }))
}
