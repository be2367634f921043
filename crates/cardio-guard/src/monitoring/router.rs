use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;
use tracing::error;

use super::domain::{ReadingSubmission, SubjectId, SubjectRegistration};
use super::repository::{ReadingRepository, SubjectRepository};
use super::service::{MonitoringService, MonitoringServiceError};

/// Router builder exposing registration, ingestion and history endpoints.
pub fn monitoring_router<S, R>(service: Arc<MonitoringService<S, R>>) -> Router
where
    S: SubjectRepository + 'static,
    R: ReadingRepository + 'static,
{
    Router::new()
        .route("/api/register", post(register_handler::<S, R>))
        .route("/api/readings", post(readings_handler::<S, R>))
        .route(
            "/api/users/:subject_id/readings",
            get(history_handler::<S, R>),
        )
        .with_state(service)
}

pub(crate) async fn register_handler<S, R>(
    State(service): State<Arc<MonitoringService<S, R>>>,
    axum::Json(registration): axum::Json<SubjectRegistration>,
) -> Response
where
    S: SubjectRepository + 'static,
    R: ReadingRepository + 'static,
{
    match service.register(registration) {
        Ok(subject) => {
            let payload = json!({ "user_id": subject.id });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(err) => error_response("register", err),
    }
}

pub(crate) async fn readings_handler<S, R>(
    State(service): State<Arc<MonitoringService<S, R>>>,
    axum::Json(submission): axum::Json<ReadingSubmission>,
) -> Response
where
    S: SubjectRepository + 'static,
    R: ReadingRepository + 'static,
{
    match service.ingest(submission).await {
        Ok(receipt) => (StatusCode::OK, axum::Json(receipt)).into_response(),
        Err(err) => error_response("readings", err),
    }
}

pub(crate) async fn history_handler<S, R>(
    State(service): State<Arc<MonitoringService<S, R>>>,
    Path(subject_id): Path<String>,
) -> Response
where
    S: SubjectRepository + 'static,
    R: ReadingRepository + 'static,
{
    match service.history(&SubjectId(subject_id)) {
        Ok(readings) => {
            let payload = json!({ "readings": readings });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(err) => error_response("fetch readings", err),
    }
}

fn error_response(operation: &str, err: MonitoringServiceError) -> Response {
    match err {
        MonitoringServiceError::MissingName | MonitoringServiceError::MissingSubjectId => {
            let payload = json!({ "error": err.to_string() });
            (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response()
        }
        MonitoringServiceError::Repository(source) => {
            error!(operation, error = %source, "monitoring request failed");
            let payload = json!({ "error": "internal_server_error" });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}
