//! JSON surface over the store and the lifecycle scheduler.
//!
//! Handlers only translate between HTTP and the library API; no status
//! logic lives here.

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};

use crate::error::LifecycleError;
use crate::lifecycle::{LifecycleScheduler, PassReport};
use crate::store::{
    Assignment, AssignmentId, AssignmentPatch, AssignmentStore, CourseProgress, NewAssignment,
    NewTemplate, Template, TemplateId, TemplateInstance,
};

const DEFAULT_UPCOMING_LIMIT: usize = 5;

#[derive(Clone)]
pub struct ApiState {
    pub store: AssignmentStore,
    pub scheduler: Arc<LifecycleScheduler>,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for LifecycleError {
    fn into_response(self) -> Response {
        let status = match self {
            LifecycleError::Validation(_) => StatusCode::BAD_REQUEST,
            LifecycleError::NotFound(_) | LifecycleError::TemplateNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            LifecycleError::InvalidTransition { .. } => StatusCode::CONFLICT,
        };
        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

#[derive(Deserialize)]
struct UpcomingParams {
    limit: Option<usize>,
}

pub fn router(state: ApiState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(
            "/api/assignments",
            get(list_assignments_handler).post(create_assignment_handler),
        )
        .route("/api/assignments/upcoming", get(upcoming_handler))
        .route(
            "/api/assignments/{id}",
            get(get_assignment_handler).patch(update_assignment_handler),
        )
        .route(
            "/api/assignments/{id}/complete",
            post(complete_assignment_handler),
        )
        .route("/api/calendar", get(calendar_handler))
        .route(
            "/api/courses/{course_id}/progress",
            get(course_progress_handler),
        )
        .route(
            "/api/templates",
            get(list_templates_handler).post(create_template_handler),
        )
        .route("/api/templates/{id}", get(get_template_handler))
        .route(
            "/api/templates/{id}/assignments",
            post(instantiate_template_handler),
        )
        .route("/api/reconcile", post(reconcile_handler))
        .layer(cors)
        .with_state(state)
}

/// Serve the API until `shutdown` is cancelled. In-flight requests are
/// allowed to finish.
pub async fn serve(
    addr: SocketAddr,
    state: ApiState,
    shutdown: CancellationToken,
) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, "Starting HTTP server");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
}

async fn list_assignments_handler(State(state): State<ApiState>) -> Json<Vec<Assignment>> {
    Json(state.store.list().await)
}

async fn create_assignment_handler(
    State(state): State<ApiState>,
    Json(payload): Json<NewAssignment>,
) -> Result<(StatusCode, Json<Assignment>), LifecycleError> {
    let assignment = state.store.create(payload).await?;
    Ok((StatusCode::CREATED, Json(assignment)))
}

async fn get_assignment_handler(
    State(state): State<ApiState>,
    Path(id): Path<u64>,
) -> Result<Json<Assignment>, LifecycleError> {
    Ok(Json(state.store.get(AssignmentId(id)).await?))
}

async fn update_assignment_handler(
    State(state): State<ApiState>,
    Path(id): Path<u64>,
    Json(patch): Json<AssignmentPatch>,
) -> Result<Json<Assignment>, LifecycleError> {
    Ok(Json(state.store.update(AssignmentId(id), patch).await?))
}

async fn complete_assignment_handler(
    State(state): State<ApiState>,
    Path(id): Path<u64>,
) -> Result<Json<Assignment>, LifecycleError> {
    Ok(Json(state.scheduler.complete(AssignmentId(id)).await?))
}

async fn upcoming_handler(
    State(state): State<ApiState>,
    Query(params): Query<UpcomingParams>,
) -> Json<Vec<Assignment>> {
    let limit = params.limit.unwrap_or(DEFAULT_UPCOMING_LIMIT);
    Json(state.store.upcoming(limit).await)
}

async fn calendar_handler(State(state): State<ApiState>) -> Json<BTreeMap<String, Vec<String>>> {
    let calendar = state
        .store
        .due_calendar()
        .await
        .into_iter()
        .map(|(day, titles)| (day.to_string(), titles))
        .collect();
    Json(calendar)
}

async fn course_progress_handler(
    State(state): State<ApiState>,
    Path(course_id): Path<String>,
) -> Json<CourseProgress> {
    Json(state.store.course_progress(&course_id).await)
}

async fn list_templates_handler(State(state): State<ApiState>) -> Json<Vec<Template>> {
    Json(state.store.list_templates().await)
}

async fn create_template_handler(
    State(state): State<ApiState>,
    Json(payload): Json<NewTemplate>,
) -> Result<(StatusCode, Json<Template>), LifecycleError> {
    let template = state.store.create_template(payload).await?;
    Ok((StatusCode::CREATED, Json(template)))
}

async fn get_template_handler(
    State(state): State<ApiState>,
    Path(id): Path<u64>,
) -> Result<Json<Template>, LifecycleError> {
    Ok(Json(state.store.get_template(TemplateId(id)).await?))
}

async fn instantiate_template_handler(
    State(state): State<ApiState>,
    Path(id): Path<u64>,
    Json(instance): Json<TemplateInstance>,
) -> Result<(StatusCode, Json<Assignment>), LifecycleError> {
    let assignment = state
        .store
        .create_from_template(TemplateId(id), instance)
        .await?;
    Ok((StatusCode::CREATED, Json(assignment)))
}

async fn reconcile_handler(State(state): State<ApiState>) -> Json<PassReport> {
    Json(state.scheduler.run_pass().await)
}
