//! In-memory event store.
//!
//! Per-workflow logs live behind their own mutex, so appends to the same
//! workflow serialize while distinct workflows never contend. Suitable
//! for single-node deployments and as the test double for the trait.

use super::errors::{EventStoreError, EventStoreResult};
use super::{verify_contiguous, EventStore};
use crate::models::workflow_event::{NewWorkflowEvent, WorkflowEvent};
use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::Arc;
use uuid::Uuid;

/// DashMap of append-only logs keyed by workflow id
pub struct InMemoryEventStore {
    logs: DashMap<Uuid, Arc<Mutex<Vec<WorkflowEvent>>>>,
    max_events_per_workflow: u64,
}

impl InMemoryEventStore {
    pub fn new(max_events_per_workflow: u64) -> Self {
        Self {
            logs: DashMap::new(),
            max_events_per_workflow,
        }
    }

    fn log_for(&self, workflow_id: Uuid) -> Arc<Mutex<Vec<WorkflowEvent>>> {
        self.logs
            .entry(workflow_id)
            .or_insert_with(|| Arc::new(Mutex::new(Vec::new())))
            .clone()
    }

    fn existing_log(&self, workflow_id: Uuid) -> EventStoreResult<Arc<Mutex<Vec<WorkflowEvent>>>> {
        self.logs
            .get(&workflow_id)
            .map(|entry| entry.value().clone())
            .ok_or(EventStoreError::WorkflowNotFound(workflow_id))
    }
}

impl Default for InMemoryEventStore {
    fn default() -> Self {
        Self::new(crate::constants::defaults::MAX_EVENTS_PER_WORKFLOW)
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn append(
        &self,
        workflow_id: Uuid,
        expected_sequence: u64,
        events: Vec<NewWorkflowEvent>,
    ) -> EventStoreResult<Vec<WorkflowEvent>> {
        if events.is_empty() {
            return Err(EventStoreError::EmptyAppend);
        }

        // Do not materialize a log entry for a doomed append
        let log = match self.logs.get(&workflow_id).map(|e| e.value().clone()) {
            Some(log) => log,
            None if expected_sequence == 0 => self.log_for(workflow_id),
            None => {
                return Err(EventStoreError::ConcurrentAppendConflict {
                    workflow_id,
                    expected: expected_sequence,
                    actual: 0,
                })
            }
        };
        let mut guard = log.lock();

        let head = guard.last().map(|e| e.sequence_number).unwrap_or(0);
        if head != expected_sequence {
            return Err(EventStoreError::ConcurrentAppendConflict {
                workflow_id,
                expected: expected_sequence,
                actual: head,
            });
        }
        if head + events.len() as u64 > self.max_events_per_workflow {
            return Err(EventStoreError::EventLimitExceeded {
                workflow_id,
                limit: self.max_events_per_workflow,
            });
        }

        let mut stored = Vec::with_capacity(events.len());
        let mut sequence = head;
        for event in events {
            sequence += 1;
            let record = WorkflowEvent {
                event_id: Uuid::new_v4(),
                workflow_id,
                event_type: event.event_type,
                sequence_number: sequence,
                timestamp: Utc::now(),
                payload: event.payload,
                causation_id: event.causation_id,
                correlation_id: event.correlation_id,
            };
            guard.push(record.clone());
            stored.push(record);
        }

        Ok(stored)
    }

    async fn load(&self, workflow_id: Uuid) -> EventStoreResult<Vec<WorkflowEvent>> {
        let log = self.existing_log(workflow_id)?;
        let events = log.lock().clone();
        verify_contiguous(workflow_id, &events)?;
        Ok(events)
    }

    async fn load_until(
        &self,
        workflow_id: Uuid,
        as_of_sequence: u64,
    ) -> EventStoreResult<Vec<WorkflowEvent>> {
        let mut events = self.load(workflow_id).await?;
        events.retain(|e| e.sequence_number <= as_of_sequence);
        Ok(events)
    }

    async fn head_sequence(&self, workflow_id: Uuid) -> EventStoreResult<Option<u64>> {
        Ok(self
            .logs
            .get(&workflow_id)
            .map(|entry| entry.value().lock().last().map(|e| e.sequence_number))
            .unwrap_or(None))
    }

    async fn workflow_ids(&self) -> EventStoreResult<Vec<Uuid>> {
        let mut ids: Vec<Uuid> = self.logs.iter().map(|entry| *entry.key()).collect();
        ids.sort();
        Ok(ids)
    }
}
