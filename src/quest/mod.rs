//! Quest lifecycle and assignment coordination.
//!
//! Requesters publish quests, fulfillers claim and complete them, and
//! requesters confirm completion. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]
//! - Notification texts in [`notice`]

pub mod adapters;
pub mod domain;
pub mod notice;
pub mod ports;
pub mod services;
