//! Questboard: quest lifecycle coordination for a two-sided marketplace.
//!
//! Requesters publish quests, fulfillers claim and complete them, and
//! requesters confirm completion. This crate provides the lifecycle engine
//! that owns every state transition, keeps fulfiller availability in step
//! with assignment state, and settles concurrent claims without relying on
//! multi-row transactions.
//!
//! # Architecture
//!
//! Questboard follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for storage and notification
//! - **Adapters**: Concrete implementations of ports (in-memory, `PostgreSQL`)
//!
//! # Modules
//!
//! - [`quest`]: Entities, state machines, ports, adapters, and services
//! - [`labels`]: Display labels for statuses
//! - [`config`]: TOML configuration
//! - [`telemetry`]: Tracing subscriber setup

pub mod config;
pub mod labels;
pub mod quest;
pub mod telemetry;
