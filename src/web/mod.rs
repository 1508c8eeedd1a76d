//! # Web API
//!
//! REST and WebSocket surface for the workflow state service.

pub mod errors;
pub mod handlers;
pub mod state;
pub mod ws;

pub use errors::{ApiError, ApiResult};
pub use state::AppState;

use axum::routing::{get, post};
use axum::Router;

/// Build the service router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/health/detailed", get(handlers::health::detailed_health))
        .route("/v1/workflows", post(handlers::workflows::create_workflow))
        .route("/v1/workflows", get(handlers::workflows::list_workflows))
        .route(
            "/v1/workflows/:workflow_id",
            get(handlers::workflows::get_workflow),
        )
        .route(
            "/v1/workflows/:workflow_id/events",
            get(handlers::workflows::get_events),
        )
        .route(
            "/v1/workflows/:workflow_id/rebuild",
            get(handlers::workflows::rebuild_workflow),
        )
        .route(
            "/v1/workflows/:workflow_id/ready-steps",
            get(handlers::workflows::ready_steps),
        )
        .route(
            "/v1/workflows/:workflow_id/actions",
            post(handlers::workflows::submit_action),
        )
        .route("/ws/workflows", get(ws::ws_workflows))
        .with_state(state)
}
