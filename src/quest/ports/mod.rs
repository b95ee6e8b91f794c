//! Port contracts for the quest lifecycle.
//!
//! Ports define infrastructure-agnostic interfaces used by guild services.

pub mod notifier;
pub mod store;

pub use notifier::{Notifier, NotifierError, NotifierResult};
pub use store::{
    AssignmentRepository, EventLogRepository, FulfillerRepository, GuildStore, QuestRepository,
    RequesterRepository, StoreError, StoreResult,
};

#[cfg(test)]
pub use notifier::MockNotifier;
