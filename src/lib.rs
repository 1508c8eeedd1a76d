#![allow(clippy::doc_markdown)] // Allow technical terms like PostgreSQL, WebSocket in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Flowstate Core
//!
//! Event-sourced workflow state engine for automation platform
//! dashboards.
//!
//! ## Overview
//!
//! Flowstate owns workflow definitions, per-step execution state, and an
//! append-only event log, and exposes them over REST plus a WebSocket
//! stream for live dashboards. State is never stored directly: every
//! snapshot is a deterministic fold of the workflow's events, so any
//! view can be rebuilt at any sequence point.
//!
//! ## Architecture
//!
//! - Commands are validated against the current snapshot before their
//!   event is appended; an illegal edge never reaches the log.
//! - Appends are atomic per workflow with gap-free, strictly increasing
//!   sequence numbers. Racing writers surface as append conflicts and
//!   are resolved by re-reading the log.
//! - Snapshots are cached for reads and rebuilt on demand; recovery
//!   replays every log at startup.
//!
//! ## Module Organization
//!
//! - [`models`] - Definitions, events, and snapshots
//! - [`state_machine`] - Transition tables and guards
//! - [`event_store`] - Append-only persistence (memory and postgres)
//! - [`projection`] - The fold from events to snapshots
//! - [`engine`] - Command handling, caching, recovery
//! - [`events`] - Broadcast publisher feeding the dashboard stream
//! - [`web`] - REST and WebSocket surface
//! - [`config`] - YAML configuration with environment overlays
//! - [`error`] - Crate-level error handling
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use flowstate_core::engine::WorkflowEngine;
//! use flowstate_core::event_store::InMemoryEventStore;
//! use flowstate_core::events::EventPublisher;
//! use std::sync::Arc;
//!
//! # async fn example() {
//! let engine = WorkflowEngine::new(
//!     Arc::new(InMemoryEventStore::default()),
//!     EventPublisher::default(),
//! );
//! let report = engine.recover().await;
//! println!("recovered {} workflow(s)", report.workflows_recovered);
//! # }
//! ```

pub mod config;
pub mod constants;
pub mod engine;
pub mod error;
pub mod event_store;
pub mod events;
pub mod logging;
pub mod models;
pub mod projection;
pub mod state_machine;
pub mod web;

pub use config::{ConfigManager, FlowstateConfig, StoreBackend};
pub use engine::{DashboardFrame, WorkflowCommand, WorkflowEngine};
pub use error::{FlowstateError, Result};
pub use event_store::{EventStore, EventStoreError, InMemoryEventStore};
pub use models::{
    EventType, StepDefinition, StepType, WorkflowDefinition, WorkflowEvent, WorkflowRequest,
    WorkflowStateSnapshot,
};
pub use state_machine::{ExecutionSubstate, StepStatus, WorkflowState};
