//! # Workflow Handlers
//!
//! HTTP handlers for workflow creation, state retrieval, event log
//! inspection, uncached rebuilds, and action submission.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::engine::WorkflowCommand;
use crate::models::snapshot::WorkflowStateSnapshot;
use crate::models::workflow_event::WorkflowEvent;
use crate::models::workflow_request::WorkflowRequest;
use crate::state_machine::states::WorkflowState;
use crate::web::errors::{ApiError, ApiResult};
use crate::web::state::AppState;

/// Response for workflow listings
#[derive(Debug, Serialize)]
pub struct WorkflowListResponse {
    pub workflows: Vec<WorkflowStateSnapshot>,
    pub total: usize,
}

/// Response for event log reads
#[derive(Debug, Serialize)]
pub struct EventListResponse {
    pub workflow_id: Uuid,
    pub events: Vec<WorkflowEvent>,
    pub count: usize,
}

/// Response for dependency-readiness queries
#[derive(Debug, Serialize)]
pub struct ReadyStepsResponse {
    pub workflow_id: Uuid,
    pub ready_steps: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub state: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SequenceQuery {
    pub as_of_sequence: Option<u64>,
}

/// Action submission body: the command plus optional tracing ids
#[derive(Debug, Deserialize)]
pub struct ActionRequest {
    #[serde(flatten)]
    pub command: WorkflowCommand,
    pub correlation_id: Option<Uuid>,
}

/// POST /v1/workflows
pub async fn create_workflow(
    State(state): State<AppState>,
    Json(request): Json<WorkflowRequest>,
) -> ApiResult<(StatusCode, Json<WorkflowStateSnapshot>)> {
    let snapshot = state.engine.create_workflow(request).await?;
    info!(workflow_id = %snapshot.workflow_id, "workflow created via API");
    Ok((StatusCode::CREATED, Json(snapshot)))
}

/// GET /v1/workflows
pub async fn list_workflows(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<WorkflowListResponse>> {
    let filter = match query.state.as_deref() {
        Some(raw) => Some(
            raw.parse::<WorkflowState>()
                .map_err(ApiError::BadRequest)?,
        ),
        None => None,
    };

    let workflows = state.engine.list_workflows(filter);
    let total = workflows.len();
    Ok(Json(WorkflowListResponse { workflows, total }))
}

/// GET /v1/workflows/:workflow_id
pub async fn get_workflow(
    State(state): State<AppState>,
    Path(workflow_id): Path<Uuid>,
) -> ApiResult<Json<WorkflowStateSnapshot>> {
    let snapshot = state.engine.snapshot(workflow_id).await?;
    Ok(Json(snapshot))
}

/// GET /v1/workflows/:workflow_id/events
pub async fn get_events(
    State(state): State<AppState>,
    Path(workflow_id): Path<Uuid>,
    Query(query): Query<SequenceQuery>,
) -> ApiResult<Json<EventListResponse>> {
    let events = state
        .engine
        .events(workflow_id, query.as_of_sequence)
        .await?;
    let count = events.len();
    Ok(Json(EventListResponse {
        workflow_id,
        events,
        count,
    }))
}

/// GET /v1/workflows/:workflow_id/rebuild
///
/// Always replays from the log, bypassing the snapshot cache.
pub async fn rebuild_workflow(
    State(state): State<AppState>,
    Path(workflow_id): Path<Uuid>,
    Query(query): Query<SequenceQuery>,
) -> ApiResult<Json<WorkflowStateSnapshot>> {
    debug!(workflow_id = %workflow_id, as_of = ?query.as_of_sequence, "uncached rebuild requested");
    let snapshot = state
        .engine
        .rebuild(workflow_id, query.as_of_sequence)
        .await?;
    Ok(Json(snapshot))
}

/// GET /v1/workflows/:workflow_id/ready-steps
pub async fn ready_steps(
    State(state): State<AppState>,
    Path(workflow_id): Path<Uuid>,
) -> ApiResult<Json<ReadyStepsResponse>> {
    let ready_steps = state.engine.ready_steps(workflow_id).await?;
    Ok(Json(ReadyStepsResponse {
        workflow_id,
        ready_steps,
    }))
}

/// POST /v1/workflows/:workflow_id/actions
pub async fn submit_action(
    State(state): State<AppState>,
    Path(workflow_id): Path<Uuid>,
    Json(request): Json<ActionRequest>,
) -> ApiResult<Json<WorkflowStateSnapshot>> {
    let snapshot = state
        .engine
        .submit(workflow_id, request.command, request.correlation_id)
        .await?;
    Ok(Json(snapshot))
}
