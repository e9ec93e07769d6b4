use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Router,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use crate::{
    AppState,
    error::AppError,
    services::{
        session::{format_remaining, UserSession},
        templates::{ReportTemplate, TEMPLATES},
    },
};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/templates", get(list_templates))
        .route("/sessions", post(create_session))
        .route("/sessions/:session_id", get(session_status).delete(end_session))
        .layer(super::cors())
}

#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    user_id: String,
    template_id: String,
}

#[derive(Debug, Serialize)]
pub struct SessionStatus {
    #[serde(flatten)]
    session: UserSession,
    remaining_seconds: u64,
    time_remaining: String,
}

async fn list_templates() -> Json<&'static [ReportTemplate]> {
    Json(&TEMPLATES[..])
}

async fn create_session(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateSessionRequest>,
) -> Result<(StatusCode, Json<UserSession>), AppError> {
    let session = state.sessions.create(&request.user_id, &request.template_id)?;
    Ok((StatusCode::CREATED, Json(session)))
}

async fn session_status(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionStatus>, AppError> {
    let (session, remaining) = state.sessions.get(&session_id)?;
    Ok(Json(SessionStatus {
        session,
        remaining_seconds: remaining.as_secs(),
        time_remaining: format_remaining(remaining),
    }))
}

async fn end_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.sessions.end(&session_id)?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn state() -> Arc<AppState> {
        Arc::new(AppState::new(Config::default()))
    }

    #[tokio::test]
    async fn lists_four_templates() {
        let Json(templates) = list_templates().await;
        assert_eq!(templates.len(), 4);
        assert_eq!(templates[0].id, "sales-dashboard");
    }

    #[tokio::test]
    async fn session_lifecycle() {
        let state = state();
        let request = CreateSessionRequest {
            user_id: "ana".into(),
            template_id: "financial-report".into(),
        };
        let (status, Json(session)) = create_session(State(state.clone()), Json(request)).await.unwrap();
        assert_eq!(status, StatusCode::CREATED);

        let Json(current) = session_status(State(state.clone()), Path(session.session_id.clone()))
            .await
            .unwrap();
        assert_eq!(current.session.user_id, "ana");
        assert!(current.time_remaining.starts_with("2h 59m") || current.time_remaining.starts_with("3h 0m"));

        let status = end_session(State(state.clone()), Path(session.session_id.clone())).await.unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);

        let err = session_status(State(state), Path(session.session_id)).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn blank_user_is_bad_request() {
        let request = CreateSessionRequest {
            user_id: " ".into(),
            template_id: "hr-analytics".into(),
        };
        let err = create_session(State(state()), Json(request)).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }
}
