//! PostgreSQL event store.
//!
//! Appends rely on a `UNIQUE (workflow_id, sequence_number)` constraint:
//! the head is read first, and a racing writer that inserts the same
//! sequence surfaces as a unique violation, which maps to
//! [`EventStoreError::ConcurrentAppendConflict`].

use super::errors::{EventStoreError, EventStoreResult};
use super::{verify_contiguous, EventStore};
use crate::models::workflow_event::{EventType, NewWorkflowEvent, WorkflowEvent};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use std::time::Duration;
use uuid::Uuid;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS flowstate_workflow_events (
    event_id        UUID PRIMARY KEY,
    workflow_id     UUID NOT NULL,
    event_type      TEXT NOT NULL,
    sequence_number BIGINT NOT NULL,
    occurred_at     TIMESTAMPTZ NOT NULL,
    payload         JSONB NOT NULL DEFAULT '{}'::jsonb,
    causation_id    UUID,
    correlation_id  UUID,
    UNIQUE (workflow_id, sequence_number)
);
CREATE INDEX IF NOT EXISTS idx_flowstate_events_workflow
    ON flowstate_workflow_events (workflow_id, sequence_number);
"#;

/// Event store backed by PostgreSQL
pub struct PgEventStore {
    pool: PgPool,
    max_events_per_workflow: u64,
}

impl PgEventStore {
    pub fn new(pool: PgPool, max_events_per_workflow: u64) -> Self {
        Self {
            pool,
            max_events_per_workflow,
        }
    }

    /// Connect and ensure the events table exists
    pub async fn connect(
        database_url: &str,
        pool_size: u32,
        connect_timeout: Duration,
        max_events_per_workflow: u64,
    ) -> EventStoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(pool_size)
            .acquire_timeout(connect_timeout)
            .connect(database_url)
            .await
            .map_err(|e| EventStoreError::Database(e.to_string()))?;

        let store = Self::new(pool, max_events_per_workflow);
        store.run_migrations().await?;
        Ok(store)
    }

    /// Apply the embedded schema, idempotently
    pub async fn run_migrations(&self) -> EventStoreResult<()> {
        for statement in SCHEMA.split(';').map(str::trim).filter(|s| !s.is_empty()) {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| EventStoreError::Database(e.to_string()))?;
        }
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn row_to_event(row: &sqlx::postgres::PgRow) -> EventStoreResult<WorkflowEvent> {
        let event_type_str: String = row
            .try_get("event_type")
            .map_err(|e| EventStoreError::Database(e.to_string()))?;
        let event_type: EventType = event_type_str
            .parse()
            .map_err(EventStoreError::Database)?;
        let sequence: i64 = row
            .try_get("sequence_number")
            .map_err(|e| EventStoreError::Database(e.to_string()))?;
        let timestamp: DateTime<Utc> = row
            .try_get("occurred_at")
            .map_err(|e| EventStoreError::Database(e.to_string()))?;

        Ok(WorkflowEvent {
            event_id: row
                .try_get("event_id")
                .map_err(|e| EventStoreError::Database(e.to_string()))?,
            workflow_id: row
                .try_get("workflow_id")
                .map_err(|e| EventStoreError::Database(e.to_string()))?,
            event_type,
            sequence_number: sequence as u64,
            timestamp,
            payload: row
                .try_get("payload")
                .map_err(|e| EventStoreError::Database(e.to_string()))?,
            causation_id: row
                .try_get("causation_id")
                .map_err(|e| EventStoreError::Database(e.to_string()))?,
            correlation_id: row
                .try_get("correlation_id")
                .map_err(|e| EventStoreError::Database(e.to_string()))?,
        })
    }

    async fn current_head(&self, workflow_id: Uuid) -> EventStoreResult<Option<u64>> {
        let row = sqlx::query(
            "SELECT MAX(sequence_number) AS head FROM flowstate_workflow_events WHERE workflow_id = $1",
        )
        .bind(workflow_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| EventStoreError::Database(e.to_string()))?;

        let head: Option<i64> = row
            .try_get("head")
            .map_err(|e| EventStoreError::Database(e.to_string()))?;
        Ok(head.map(|h| h as u64))
    }
}

#[async_trait]
impl EventStore for PgEventStore {
    async fn append(
        &self,
        workflow_id: Uuid,
        expected_sequence: u64,
        events: Vec<NewWorkflowEvent>,
    ) -> EventStoreResult<Vec<WorkflowEvent>> {
        if events.is_empty() {
            return Err(EventStoreError::EmptyAppend);
        }

        let head = self.current_head(workflow_id).await?.unwrap_or(0);
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

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| EventStoreError::Database(e.to_string()))?;

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

            let insert = sqlx::query(
                r#"
                INSERT INTO flowstate_workflow_events
                    (event_id, workflow_id, event_type, sequence_number,
                     occurred_at, payload, causation_id, correlation_id)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                "#,
            )
            .bind(record.event_id)
            .bind(record.workflow_id)
            .bind(record.event_type.as_str())
            .bind(record.sequence_number as i64)
            .bind(record.timestamp)
            .bind(&record.payload)
            .bind(record.causation_id)
            .bind(record.correlation_id)
            .execute(&mut *tx)
            .await;

            if let Err(e) = insert {
                // A unique violation on (workflow_id, sequence_number)
                // means a racing writer won between head read and insert
                if let sqlx::Error::Database(db_err) = &e {
                    if matches!(db_err.kind(), sqlx::error::ErrorKind::UniqueViolation) {
                        return Err(EventStoreError::ConcurrentAppendConflict {
                            workflow_id,
                            expected: expected_sequence,
                            actual: sequence,
                        });
                    }
                }
                return Err(EventStoreError::Database(e.to_string()));
            }

            stored.push(record);
        }

        tx.commit()
            .await
            .map_err(|e| EventStoreError::Database(e.to_string()))?;

        Ok(stored)
    }

    async fn load(&self, workflow_id: Uuid) -> EventStoreResult<Vec<WorkflowEvent>> {
        let rows = sqlx::query(
            r#"
            SELECT event_id, workflow_id, event_type, sequence_number,
                   occurred_at, payload, causation_id, correlation_id
            FROM flowstate_workflow_events
            WHERE workflow_id = $1
            ORDER BY sequence_number ASC
            "#,
        )
        .bind(workflow_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| EventStoreError::Database(e.to_string()))?;

        if rows.is_empty() {
            return Err(EventStoreError::WorkflowNotFound(workflow_id));
        }

        let events = rows
            .iter()
            .map(Self::row_to_event)
            .collect::<EventStoreResult<Vec<_>>>()?;
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
        self.current_head(workflow_id).await
    }

    async fn workflow_ids(&self) -> EventStoreResult<Vec<Uuid>> {
        let rows = sqlx::query(
            "SELECT DISTINCT workflow_id FROM flowstate_workflow_events ORDER BY workflow_id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| EventStoreError::Database(e.to_string()))?;

        rows.iter()
            .map(|row| {
                row.try_get("workflow_id")
                    .map_err(|e| EventStoreError::Database(e.to_string()))
            })
            .collect()
    }
}
