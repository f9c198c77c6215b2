use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, put},
    Router,
};
use serde_json::json;

use super::audit::AuditEvent;
use super::domain::{
    ApplicationId, ApplicationWindow, ChangeStatus, PositionQuestions, SubmitApplication,
};
use super::service::{LifecycleEngine, LifecycleError};
use super::store::{RecordStore, StoreError};

/// Router builder exposing the intake, review, and read-side endpoints.
pub fn application_router<S>(engine: Arc<LifecycleEngine<S>>) -> Router
where
    S: RecordStore + 'static,
{
    Router::new()
        .route(
            "/api/applications",
            get(list_handler::<S>).post(submit_handler::<S>),
        )
        .route("/api/applications/:application_id", get(fetch_handler::<S>))
        .route(
            "/api/applications/byEmail/:email",
            get(by_email_handler::<S>),
        )
        .route(
            "/api/applications/:application_id/status",
            put(change_status_handler::<S>),
        )
        .route("/api/statistics", get(statistics_handler::<S>))
        .route(
            "/api/logs",
            get(audit_log_handler::<S>).post(record_event_handler::<S>),
        )
        .route(
            "/api/questions",
            get(questions_handler::<S>).put(replace_questions_handler::<S>),
        )
        .route(
            "/api/settings",
            get(window_handler::<S>).put(update_window_handler::<S>),
        )
        .with_state(engine)
}

/// Best-effort client origin: first hop of `X-Forwarded-For` when present.
pub(crate) fn client_address(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn error_response(error: LifecycleError) -> Response {
    let status = match &error {
        LifecycleError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        LifecycleError::NotFound => StatusCode::NOT_FOUND,
        LifecycleError::Storage(StoreError::Conflict) => StatusCode::CONFLICT,
        LifecycleError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let payload = json!({ "error": error.to_string() });
    (status, axum::Json(payload)).into_response()
}

pub(crate) async fn submit_handler<S>(
    State(engine): State<Arc<LifecycleEngine<S>>>,
    headers: HeaderMap,
    axum::Json(mut command): axum::Json<SubmitApplication>,
) -> Response
where
    S: RecordStore + 'static,
{
    if command.source_address.is_none() {
        command.source_address = client_address(&headers);
    }

    match engine.submit(command) {
        Ok(id) => {
            let payload = json!({ "id": id, "success": true });
            (StatusCode::CREATED, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn list_handler<S>(State(engine): State<Arc<LifecycleEngine<S>>>) -> Response
where
    S: RecordStore + 'static,
{
    match engine.applications() {
        Ok(summaries) => (StatusCode::OK, axum::Json(summaries)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn fetch_handler<S>(
    State(engine): State<Arc<LifecycleEngine<S>>>,
    Path(application_id): Path<String>,
) -> Response
where
    S: RecordStore + 'static,
{
    match engine.application(&ApplicationId(application_id)) {
        Ok(application) => (StatusCode::OK, axum::Json(application)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn by_email_handler<S>(
    State(engine): State<Arc<LifecycleEngine<S>>>,
    Path(email): Path<String>,
) -> Response
where
    S: RecordStore + 'static,
{
    match engine.applications_by_email(&email) {
        Ok(summaries) => (StatusCode::OK, axum::Json(summaries)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn change_status_handler<S>(
    State(engine): State<Arc<LifecycleEngine<S>>>,
    Path(application_id): Path<String>,
    axum::Json(command): axum::Json<ChangeStatus>,
) -> Response
where
    S: RecordStore + 'static,
{
    match engine.change_status(&ApplicationId(application_id), command) {
        Ok(()) => (StatusCode::OK, axum::Json(json!({ "success": true }))).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn statistics_handler<S>(State(engine): State<Arc<LifecycleEngine<S>>>) -> Response
where
    S: RecordStore + 'static,
{
    match engine.statistics() {
        Ok(statistics) => (StatusCode::OK, axum::Json(statistics)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn audit_log_handler<S>(State(engine): State<Arc<LifecycleEngine<S>>>) -> Response
where
    S: RecordStore + 'static,
{
    match engine.audit_log() {
        Ok(entries) => (StatusCode::OK, axum::Json(entries)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn record_event_handler<S>(
    State(engine): State<Arc<LifecycleEngine<S>>>,
    headers: HeaderMap,
    axum::Json(mut event): axum::Json<AuditEvent>,
) -> Response
where
    S: RecordStore + 'static,
{
    if event.source_address.is_none() {
        event.source_address = client_address(&headers);
    }

    match engine.record_event(event) {
        Ok(id) => {
            let payload = json!({ "id": id, "success": true });
            (StatusCode::CREATED, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn questions_handler<S>(State(engine): State<Arc<LifecycleEngine<S>>>) -> Response
where
    S: RecordStore + 'static,
{
    match engine.position_questions() {
        Ok(questions) => (StatusCode::OK, axum::Json(questions)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn replace_questions_handler<S>(
    State(engine): State<Arc<LifecycleEngine<S>>>,
    axum::Json(questions): axum::Json<PositionQuestions>,
) -> Response
where
    S: RecordStore + 'static,
{
    match engine.replace_position_questions(questions) {
        Ok(()) => (StatusCode::OK, axum::Json(json!({ "success": true }))).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn window_handler<S>(State(engine): State<Arc<LifecycleEngine<S>>>) -> Response
where
    S: RecordStore + 'static,
{
    match engine.application_window() {
        Ok(window) => (StatusCode::OK, axum::Json(window)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn update_window_handler<S>(
    State(engine): State<Arc<LifecycleEngine<S>>>,
    axum::Json(window): axum::Json<ApplicationWindow>,
) -> Response
where
    S: RecordStore + 'static,
{
    match engine.update_application_window(window) {
        Ok(()) => (StatusCode::OK, axum::Json(json!({ "success": true }))).into_response(),
        Err(error) => error_response(error),
    }
}
