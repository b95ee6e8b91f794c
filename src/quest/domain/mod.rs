//! Domain model for the quest marketplace.
//!
//! Entities, identifiers, and the two status machines live here. Nothing in
//! this module touches storage or delivery; transitions are plain methods on
//! the aggregates and the services decide when to persist them.

mod assignment;
mod contact;
mod error;
mod event;
mod fulfiller;
mod ids;
mod quest;
mod requester;

pub use assignment::{Assignment, AssignmentStatus, PersistedAssignmentData};
pub use contact::{ContactHandle, DisplayName, NotificationTarget, Recipient};
pub use error::{
    FulfillerAction, GuildDomainError, ParseAssignmentStatusError, ParseFulfillerStatusError,
    ParseGuildEventKindError,
};
pub use event::{GuildEvent, GuildEventKind};
pub use fulfiller::{Fulfiller, FulfillerStatus, PersistedFulfillerData, StatusOutcome};
pub use ids::{AssignmentId, EventId, FulfillerId, QuestId, RequesterId};
pub use quest::{NewQuest, PersistedQuestData, Quest, QuestTitle, Reward, parse_deadline};
pub use requester::{PersistedRequesterData, Requester};
