use axum::{
    extract::State,
    http::header,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse,
    },
    routing::post,
    Router,
    Json,
};
use futures::stream::{Stream, StreamExt};
use serde::Deserialize;
use std::sync::Arc;
use crate::{
    AppState,
    error::AppError,
    models::UploadedDataset,
    services::{
        csv::{self, utils::ensure_csv_file_name},
        powerbi::{MockPublisher, PublishEvent, PublishedReport},
        report::{content_disposition, ChartSettings, DashboardReport},
    },
};
use super::datasets::DashboardRequest;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/reports/export", post(export_report))
        .route("/reports/publish", post(publish_report))
        .route("/reports/publish/stream", post(publish_report_stream))
        .layer(super::cors())
}

#[derive(Debug, Deserialize)]
pub struct PublishRequest {
    file_name: String,
    csv: String,
    report_name: Option<String>,
    session_id: Option<String>,
}

async fn export_report(
    Json(request): Json<DashboardRequest>,
) -> Result<impl IntoResponse, AppError> {
    let dataset = UploadedDataset::from_upload(&request.file_name, &request.csv)?;
    let (x_axis, y_axis) = request.axes(&dataset.columns);

    let report = DashboardReport::build(
        &dataset.file_name,
        &dataset.rows,
        dataset.analysis,
        ChartSettings { x_axis, y_axis, chart_type: request.chart_type },
    );
    let download_name = report.download_name();
    let body = serde_json::to_string_pretty(&report)?;
    tracing::info!("Exported report {} ({} bytes)", download_name, body.len());

    Ok((
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (header::CONTENT_DISPOSITION, content_disposition(&download_name)),
        ],
        body,
    ))
}

fn prepare_publisher(state: &AppState, request: &PublishRequest) -> Result<MockPublisher, AppError> {
    ensure_csv_file_name(&request.file_name)?;
    let timing = state.config.publish;

    match &request.session_id {
        Some(session_id) => {
            let (session, _) = state.sessions.get(session_id)?;
            let parsed = csv::parse(&request.csv)?;
            MockPublisher::for_session(&session, parsed.rows.len(), timing)
        }
        None => {
            let report_name = request
                .report_name
                .as_deref()
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .ok_or_else(|| AppError::InvalidInput("Please enter a report name".to_string()))?
                .to_string();
            let parsed = csv::parse(&request.csv)?;
            Ok(MockPublisher::generic(report_name, parsed.rows.len(), timing))
        }
    }
}

async fn publish_report(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PublishRequest>,
) -> Result<Json<PublishedReport>, AppError> {
    let publisher = prepare_publisher(&state, &request)?;
    tracing::info!("Publishing {} to {}", request.file_name, publisher.embed_url());
    Ok(Json(publisher.publish().await?))
}

async fn publish_report_stream(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PublishRequest>,
) -> Result<Sse<impl Stream<Item = Result<Event, axum::Error>>>, AppError> {
    let publisher = prepare_publisher(&state, &request)?;
    tracing::info!("Streaming publish of {} to {}", request.file_name, publisher.embed_url());

    let events = publisher.events().map(|event| {
        let name = match &event {
            PublishEvent::Step { .. } => "step",
            PublishEvent::Ready(_) => "ready",
        };
        Event::default().event(name).json_data(event)
    });

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, PublishTiming};
    use axum::body::to_bytes;
    use axum::http::StatusCode;

    fn state() -> Arc<AppState> {
        let config = Config {
            publish: PublishTiming::none(),
            ..Config::default()
        };
        Arc::new(AppState::new(config))
    }

    fn publish_request(session_id: Option<String>) -> PublishRequest {
        PublishRequest {
            file_name: "sales.csv".into(),
            csv: "region,amount\nnorth,10\nsouth,20".into(),
            report_name: Some(" Q1 Sales ".into()),
            session_id,
        }
    }

    #[tokio::test]
    async fn export_sets_attachment_name() {
        let request = DashboardRequest {
            file_name: "sales.csv".into(),
            csv: "region,amount\nnorth,10".into(),
            x_axis: None,
            y_axis: Some("amount".into()),
            chart_type: Default::default(),
        };
        let response = export_report(Json(request)).await.unwrap().into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"sales_report.json\""
        );

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["charts"]["x_axis"], "region");
        assert_eq!(json["data_analysis"]["total_rows"], 1);
        assert_eq!(json["sample_data"][0]["amount"], 10.0);
    }

    #[tokio::test]
    async fn generic_publish_uses_trimmed_report_name() {
        let Json(report) = publish_report(State(state()), Json(publish_request(None)))
            .await
            .unwrap();
        assert_eq!(report.report_name, "Q1 Sales");
        assert_eq!(report.summary_file_name, "Q1_Sales_powerbi_report.json");
        assert_eq!(report.data_rows, 2);
        assert_eq!(report.steps.len(), 6);
    }

    #[tokio::test]
    async fn generic_publish_requires_report_name() {
        for report_name in [None, Some("   ".to_string())] {
            let request = PublishRequest {
                report_name,
                ..publish_request(None)
            };
            let err = publish_report(State(state()), Json(request)).await.unwrap_err();
            assert!(matches!(err, AppError::InvalidInput(ref msg) if msg == "Please enter a report name"));
        }
    }

    #[tokio::test]
    async fn session_publish_uses_template_flow() {
        let state = state();
        let session = state.sessions.create("ana", "sales-dashboard").unwrap();
        let Json(report) = publish_report(State(state.clone()), Json(publish_request(Some(session.session_id))))
            .await
            .unwrap();
        assert_eq!(report.report_name, "Sales Performance Dashboard - ana");
        assert_eq!(report.steps.len(), 8);
    }

    #[tokio::test]
    async fn unknown_session_cannot_publish() {
        let err = publish_report(State(state()), Json(publish_request(Some("session_0_x".into()))))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn streaming_publish_emits_step_events() {
        let sse = publish_report_stream(State(state()), Json(publish_request(None)))
            .await
            .unwrap();
        let response = sse.into_response();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert_eq!(text.matches("event: step").count(), 6);
        assert_eq!(text.matches("event: ready").count(), 1);
    }
}
