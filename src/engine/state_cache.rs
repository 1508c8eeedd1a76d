//! Snapshot cache with hit/miss accounting.
//!
//! The cache is a read optimization only. The event log remains the
//! system of record; the engine refreshes stale entries before serving
//! them.

use crate::models::snapshot::WorkflowStateSnapshot;
use dashmap::DashMap;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

/// Cache counters pushed to the dashboard stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub size: usize,
}

/// Materialized snapshots keyed by workflow id
#[derive(Debug, Default)]
pub struct StateCache {
    snapshots: DashMap<Uuid, WorkflowStateSnapshot>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl StateCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached snapshot, recording a hit or miss
    pub fn get(&self, workflow_id: Uuid) -> Option<WorkflowStateSnapshot> {
        match self.snapshots.get(&workflow_id) {
            Some(entry) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(entry.value().clone())
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Peek without touching the counters (used for listings)
    pub fn peek_all(&self) -> Vec<WorkflowStateSnapshot> {
        self.snapshots
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    pub fn insert(&self, snapshot: WorkflowStateSnapshot) {
        self.snapshots.insert(snapshot.workflow_id, snapshot);
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            size: self.snapshots.len(),
        }
    }
}
