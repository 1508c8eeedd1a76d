//! # Health Check Handlers
//!
//! Health check endpoints for monitoring and load balancing.

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use std::collections::HashMap;
use std::time::Instant;
use tracing::debug;

use crate::event_store::EventStore;
use crate::web::errors::ApiResult;
use crate::web::state::AppState;

/// Basic health check response
#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    timestamp: String,
}

/// Detailed health check response
#[derive(Serialize)]
pub struct DetailedHealthResponse {
    status: String,
    timestamp: String,
    checks: HashMap<String, HealthCheck>,
    info: HealthInfo,
}

/// Individual health check result
#[derive(Serialize)]
pub struct HealthCheck {
    status: String,
    message: Option<String>,
    duration_ms: u64,
}

/// System information for detailed health
#[derive(Serialize)]
pub struct HealthInfo {
    version: String,
    environment: String,
    uptime_seconds: i64,
    active_workflows: usize,
    event_subscribers: usize,
}

/// Basic health check endpoint: GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

/// Detailed health check endpoint: GET /health/detailed
pub async fn detailed_health(
    State(state): State<AppState>,
) -> ApiResult<Json<DetailedHealthResponse>> {
    let mut checks = HashMap::new();

    let started = Instant::now();
    let store_check = match state.engine.store().workflow_ids().await {
        Ok(ids) => HealthCheck {
            status: "ok".to_string(),
            message: Some(format!("{} workflow log(s)", ids.len())),
            duration_ms: started.elapsed().as_millis() as u64,
        },
        Err(e) => HealthCheck {
            status: "degraded".to_string(),
            message: Some(e.to_string()),
            duration_ms: started.elapsed().as_millis() as u64,
        },
    };
    let degraded = store_check.status != "ok";
    checks.insert("event_store".to_string(), store_check);

    let frame = state.engine.dashboard_frame();
    debug!(active = frame.active_workflows, "health probe");

    Ok(Json(DetailedHealthResponse {
        status: if degraded { "degraded" } else { "ok" }.to_string(),
        timestamp: Utc::now().to_rfc3339(),
        checks,
        info: HealthInfo {
            version: env!("CARGO_PKG_VERSION").to_string(),
            environment: state.environment.clone(),
            uptime_seconds: state.uptime_seconds(),
            active_workflows: frame.active_workflows,
            event_subscribers: state.engine.publisher().subscriber_count(),
        },
    }))
}
