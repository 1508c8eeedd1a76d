//! # Web API Application State
//!
//! Shared state for the web API: the engine handle, the loaded
//! configuration, and process metadata for health reporting.

use crate::config::FlowstateConfig;
use crate::engine::WorkflowEngine;
use chrono::{DateTime, Utc};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<WorkflowEngine>,
    pub config: Arc<FlowstateConfig>,
    pub environment: String,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(
        engine: Arc<WorkflowEngine>,
        config: Arc<FlowstateConfig>,
        environment: impl Into<String>,
    ) -> Self {
        Self {
            engine,
            config,
            environment: environment.into(),
            started_at: Utc::now(),
        }
    }

    /// Seconds since the server process came up
    pub fn uptime_seconds(&self) -> i64 {
        (Utc::now() - self.started_at).num_seconds()
    }
}
