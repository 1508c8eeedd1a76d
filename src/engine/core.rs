//! # Workflow Engine
//!
//! The operational core: validates commands against the current
//! snapshot, appends the resulting events, maintains the snapshot
//! cache, and publishes appended events to subscribers.
//!
//! Validation always happens before append, so the store never holds an
//! event that fails the transition table or its guards. Appends carry
//! the snapshot's sequence as the expected head; a racing writer
//! surfaces as a conflict, which the engine resolves once by re-reading
//! the log and re-validating.

use super::command::WorkflowCommand;
use super::errors::{EngineError, EngineResult};
use super::recovery::{RecoveryManager, RecoveryReport};
use super::state_cache::{CacheStats, StateCache};
use crate::event_store::{EventStore, EventStoreError};
use crate::events::EventPublisher;
use crate::models::snapshot::WorkflowStateSnapshot;
use crate::models::workflow_definition::WorkflowDefinition;
use crate::models::workflow_event::{EventType, NewWorkflowEvent, WorkflowEvent};
use crate::models::workflow_request::WorkflowRequest;
use crate::projection;
use crate::state_machine::states::{ExecutionSubstate, WorkflowState};
use dashmap::DashMap;
use serde::Serialize;
use serde_json::json;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// Aggregate counters pushed over the dashboard WebSocket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DashboardFrame {
    pub active_workflows: usize,
    pub active_conflicts: u64,
    pub active_coordinations: usize,
    pub cache_stats: CacheStats,
}

/// Event-sourced workflow engine
pub struct WorkflowEngine {
    store: Arc<dyn EventStore>,
    cache: StateCache,
    definitions: DashMap<Uuid, WorkflowDefinition>,
    publisher: EventPublisher,
    conflicts_detected: AtomicU64,
    conflicts_resolved: AtomicU64,
}

impl WorkflowEngine {
    pub fn new(store: Arc<dyn EventStore>, publisher: EventPublisher) -> Self {
        Self {
            store,
            cache: StateCache::new(),
            definitions: DashMap::new(),
            publisher,
            conflicts_detected: AtomicU64::new(0),
            conflicts_resolved: AtomicU64::new(0),
        }
    }

    /// Rebuild every snapshot from the store; run once at startup
    pub async fn recover(&self) -> RecoveryReport {
        RecoveryManager::new(self.store.clone())
            .recover_into(&self.cache, &self.definitions)
            .await
    }

    /// Create a workflow instance from an inbound request
    pub async fn create_workflow(
        &self,
        request: WorkflowRequest,
    ) -> EngineResult<WorkflowStateSnapshot> {
        let correlation_id = request.correlation_id;
        let definition = request.into_definition(Uuid::new_v4());
        self.create_from_definition(definition, correlation_id).await
    }

    /// Create a workflow instance from a validated definition
    pub async fn create_from_definition(
        &self,
        definition: WorkflowDefinition,
        correlation_id: Option<Uuid>,
    ) -> EngineResult<WorkflowStateSnapshot> {
        definition.validate()?;
        let workflow_id = definition.workflow_id;

        let event = NewWorkflowEvent::new(EventType::WorkflowCreated)
            .with_payload(json!({"definition": definition}))
            .with_correlation(correlation_id);

        let stored = match self.store.append(workflow_id, 0, vec![event]).await {
            Ok(stored) => stored,
            Err(EventStoreError::ConcurrentAppendConflict { .. }) => {
                return Err(EngineError::WorkflowAlreadyExists(workflow_id))
            }
            Err(e) => return Err(e.into()),
        };

        let mut snapshot = projection::creation_snapshot(&definition);
        snapshot.snapshot_sequence = stored[0].sequence_number;
        snapshot.updated_at = stored[0].timestamp;

        self.definitions.insert(workflow_id, definition);
        self.cache.insert(snapshot.clone());
        self.publish(&stored).await;

        info!(
            workflow_id = %workflow_id,
            steps = snapshot.step_states.len(),
            "📋 WORKFLOW: created"
        );
        Ok(snapshot)
    }

    /// Validate and apply a command, appending its event on success.
    ///
    /// On a concurrent append conflict the engine re-reads the log,
    /// re-validates, and retries once; a second conflict propagates.
    pub async fn submit(
        &self,
        workflow_id: Uuid,
        command: WorkflowCommand,
        correlation_id: Option<Uuid>,
    ) -> EngineResult<WorkflowStateSnapshot> {
        let event_type = command.event_type();
        let payload = command.payload();

        for attempt in 0..2 {
            let (definition, snapshot) = self.current(workflow_id).await?;

            let mut next = snapshot.clone();
            projection::apply_event(&definition, &mut next, event_type, &payload)?;

            let event = NewWorkflowEvent::new(event_type)
                .with_payload(payload.clone())
                .with_correlation(correlation_id);

            match self
                .store
                .append(workflow_id, snapshot.snapshot_sequence, vec![event])
                .await
            {
                Ok(stored) => {
                    next.snapshot_sequence = stored[0].sequence_number;
                    next.updated_at = stored[0].timestamp;
                    self.cache.insert(next.clone());
                    self.publish(&stored).await;

                    if attempt > 0 {
                        self.conflicts_resolved.fetch_add(1, Ordering::Relaxed);
                    }
                    debug!(
                        workflow_id = %workflow_id,
                        event = %event_type,
                        sequence = stored[0].sequence_number,
                        "📋 WORKFLOW: event appended"
                    );
                    return Ok(next);
                }
                Err(EventStoreError::ConcurrentAppendConflict {
                    workflow_id: wid,
                    expected,
                    actual,
                }) if attempt == 0 => {
                    self.conflicts_detected.fetch_add(1, Ordering::Relaxed);
                    debug!(
                        workflow_id = %workflow_id,
                        expected,
                        actual,
                        "📋 WORKFLOW: append conflict, re-reading log"
                    );
                    // Drop the stale cache entry and retry against the fresh head
                    self.refresh(wid).await?;
                }
                Err(e) => return Err(e.into()),
            }
        }

        unreachable!("submit retries exactly once before propagating the conflict")
    }

    /// Current snapshot, served from cache when it matches the store head
    pub async fn snapshot(&self, workflow_id: Uuid) -> EngineResult<WorkflowStateSnapshot> {
        Ok(self.current(workflow_id).await?.1)
    }

    /// Uncached rebuild, optionally truncated at `as_of_sequence`
    pub async fn rebuild(
        &self,
        workflow_id: Uuid,
        as_of_sequence: Option<u64>,
    ) -> EngineResult<WorkflowStateSnapshot> {
        let events = self.load_events(workflow_id, as_of_sequence).await?;
        let rebuilt = projection::rebuild(&events)?;
        Ok(rebuilt.snapshot)
    }

    /// Event log for a workflow, optionally truncated at `as_of_sequence`
    pub async fn events(
        &self,
        workflow_id: Uuid,
        as_of_sequence: Option<u64>,
    ) -> EngineResult<Vec<WorkflowEvent>> {
        self.load_events(workflow_id, as_of_sequence).await
    }

    /// Pending steps whose dependencies are all satisfied.
    ///
    /// Empty unless the workflow is active, since step events are only
    /// accepted in that state.
    pub async fn ready_steps(&self, workflow_id: Uuid) -> EngineResult<Vec<String>> {
        let (definition, snapshot) = self.current(workflow_id).await?;
        if !snapshot.current_state.accepts_step_events() {
            return Ok(Vec::new());
        }

        Ok(definition
            .steps
            .iter()
            .filter(|step| {
                snapshot
                    .step_status(&step.step_id)
                    .map(|status| status == crate::state_machine::states::StepStatus::Pending)
                    .unwrap_or(false)
                    && step.dependencies.iter().all(|dep| {
                        snapshot
                            .step_status(dep)
                            .map(|status| status.satisfies_dependencies())
                            .unwrap_or(false)
                    })
            })
            .map(|step| step.step_id.clone())
            .collect())
    }

    /// All known snapshots, newest first, optionally filtered by state
    pub fn list_workflows(&self, state: Option<WorkflowState>) -> Vec<WorkflowStateSnapshot> {
        let mut snapshots = self.cache.peek_all();
        if let Some(state) = state {
            snapshots.retain(|s| s.current_state == state);
        }
        snapshots.sort_by(|a, b| {
            b.updated_at
                .cmp(&a.updated_at)
                .then_with(|| a.workflow_id.cmp(&b.workflow_id))
        });
        snapshots
    }

    /// Definition for a workflow, when known
    pub fn definition(&self, workflow_id: Uuid) -> Option<WorkflowDefinition> {
        self.definitions.get(&workflow_id).map(|d| d.value().clone())
    }

    /// Counters for the dashboard WebSocket stream
    pub fn dashboard_frame(&self) -> DashboardFrame {
        let snapshots = self.cache.peek_all();
        let detected = self.conflicts_detected.load(Ordering::Relaxed);
        let resolved = self.conflicts_resolved.load(Ordering::Relaxed);

        DashboardFrame {
            active_workflows: snapshots
                .iter()
                .filter(|s| s.current_state.is_active())
                .count(),
            active_conflicts: detected.saturating_sub(resolved),
            active_coordinations: snapshots
                .iter()
                .filter(|s| s.current_substate == Some(ExecutionSubstate::Synchronizing))
                .count(),
            cache_stats: self.cache.stats(),
        }
    }

    pub fn publisher(&self) -> &EventPublisher {
        &self.publisher
    }

    pub fn store(&self) -> &Arc<dyn EventStore> {
        &self.store
    }

    /// Cached view when fresh, otherwise a rebuild from the store head
    async fn current(
        &self,
        workflow_id: Uuid,
    ) -> EngineResult<(WorkflowDefinition, WorkflowStateSnapshot)> {
        let head = self
            .store
            .head_sequence(workflow_id)
            .await?
            .ok_or(EngineError::WorkflowNotFound(workflow_id))?;

        if let (Some(snapshot), Some(definition)) = (
            self.cache.get(workflow_id),
            self.definitions.get(&workflow_id).map(|d| d.value().clone()),
        ) {
            // A stale entry is refreshed, never served
            if snapshot.snapshot_sequence == head {
                return Ok((definition, snapshot));
            }
        }

        self.refresh(workflow_id).await
    }

    /// Replay the full log and repopulate the caches
    async fn refresh(
        &self,
        workflow_id: Uuid,
    ) -> EngineResult<(WorkflowDefinition, WorkflowStateSnapshot)> {
        let events = self.load_events(workflow_id, None).await?;
        let rebuilt = projection::rebuild(&events)?;
        self.definitions
            .insert(workflow_id, rebuilt.definition.clone());
        self.cache.insert(rebuilt.snapshot.clone());
        Ok((rebuilt.definition, rebuilt.snapshot))
    }

    async fn load_events(
        &self,
        workflow_id: Uuid,
        as_of_sequence: Option<u64>,
    ) -> EngineResult<Vec<WorkflowEvent>> {
        let result = match as_of_sequence {
            Some(sequence) => self.store.load_until(workflow_id, sequence).await,
            None => self.store.load(workflow_id).await,
        };
        match result {
            Ok(events) => Ok(events),
            Err(EventStoreError::WorkflowNotFound(id)) => Err(EngineError::WorkflowNotFound(id)),
            Err(e) => Err(e.into()),
        }
    }

    async fn publish(&self, stored: &[WorkflowEvent]) {
        for event in stored {
            // Best-effort stream; the log already holds the fact
            let _ = self.publisher.publish(event.clone()).await;
        }
    }
}
