//! Startup recovery: repopulate caches by replaying every stored log.
//!
//! Because rebuilds are deterministic, recovery converges to exactly the
//! state the process held before it stopped.

use super::state_cache::StateCache;
use crate::event_store::EventStore;
use crate::models::workflow_definition::WorkflowDefinition;
use crate::projection;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Summary of a recovery pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecoveryReport {
    pub workflows_recovered: usize,
    pub workflows_failed: usize,
    pub events_replayed: u64,
}

/// Rebuilds snapshots from the store at startup
pub struct RecoveryManager {
    store: Arc<dyn EventStore>,
}

impl RecoveryManager {
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self { store }
    }

    /// Replay every workflow in the store into the given caches.
    ///
    /// A workflow whose log fails to replay is logged and skipped rather
    /// than aborting recovery of the rest.
    pub async fn recover_into(
        &self,
        cache: &StateCache,
        definitions: &DashMap<Uuid, WorkflowDefinition>,
    ) -> RecoveryReport {
        let workflow_ids = match self.store.workflow_ids().await {
            Ok(ids) => ids,
            Err(e) => {
                warn!(error = %e, "🔁 RECOVERY: store scan failed");
                return RecoveryReport {
                    workflows_recovered: 0,
                    workflows_failed: 0,
                    events_replayed: 0,
                };
            }
        };

        let mut report = RecoveryReport {
            workflows_recovered: 0,
            workflows_failed: 0,
            events_replayed: 0,
        };

        for workflow_id in workflow_ids {
            let events = match self.store.load(workflow_id).await {
                Ok(events) => events,
                Err(e) => {
                    warn!(workflow_id = %workflow_id, error = %e, "🔁 RECOVERY: load failed");
                    report.workflows_failed += 1;
                    continue;
                }
            };

            match projection::rebuild(&events) {
                Ok(rebuilt) => {
                    report.events_replayed += events.len() as u64;
                    report.workflows_recovered += 1;
                    definitions.insert(workflow_id, rebuilt.definition);
                    cache.insert(rebuilt.snapshot);
                }
                Err(e) => {
                    warn!(workflow_id = %workflow_id, error = %e, "🔁 RECOVERY: replay failed");
                    report.workflows_failed += 1;
                }
            }
        }

        info!(
            workflows = report.workflows_recovered,
            failed = report.workflows_failed,
            events = report.events_replayed,
            "🔁 RECOVERY: snapshot cache rebuilt from event log"
        );
        report
    }
}
