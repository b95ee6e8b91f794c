//! Append-only audit log entries.

use super::{EventId, ParseGuildEventKindError};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of an audited guild event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuildEventKind {
    /// A fulfiller enrolled.
    FulfillerRegistered,
    /// A requester enrolled.
    RequesterRegistered,
    /// A quest was published.
    QuestPublished,
    /// A fulfiller claimed a quest.
    QuestClaimed,
    /// A fulfiller submitted their work.
    QuestSubmitted,
    /// A requester confirmed completion.
    QuestConfirmed,
    /// An ongoing assignment expired.
    AssignmentTimedOut,
    /// An active assignment was terminated administratively.
    AssignmentForceEnded,
    /// A fulfiller changed their own availability.
    FulfillerStatusChanged,
}

impl GuildEventKind {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FulfillerRegistered => "fulfiller_registered",
            Self::RequesterRegistered => "requester_registered",
            Self::QuestPublished => "quest_published",
            Self::QuestClaimed => "quest_claimed",
            Self::QuestSubmitted => "quest_submitted",
            Self::QuestConfirmed => "quest_confirmed",
            Self::AssignmentTimedOut => "assignment_timed_out",
            Self::AssignmentForceEnded => "assignment_force_ended",
            Self::FulfillerStatusChanged => "fulfiller_status_changed",
        }
    }
}

impl fmt::Display for GuildEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for GuildEventKind {
    type Error = ParseGuildEventKindError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "fulfiller_registered" => Ok(Self::FulfillerRegistered),
            "requester_registered" => Ok(Self::RequesterRegistered),
            "quest_published" => Ok(Self::QuestPublished),
            "quest_claimed" => Ok(Self::QuestClaimed),
            "quest_submitted" => Ok(Self::QuestSubmitted),
            "quest_confirmed" => Ok(Self::QuestConfirmed),
            "assignment_timed_out" => Ok(Self::AssignmentTimedOut),
            "assignment_force_ended" => Ok(Self::AssignmentForceEnded),
            "fulfiller_status_changed" => Ok(Self::FulfillerStatusChanged),
            _ => Err(ParseGuildEventKindError(value.to_owned())),
        }
    }
}

/// Immutable audit log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuildEvent {
    id: EventId,
    kind: GuildEventKind,
    detail: String,
    created_at: DateTime<Utc>,
}

impl GuildEvent {
    /// Records a new event at the current clock time.
    #[must_use]
    pub fn record(kind: GuildEventKind, detail: impl Into<String>, clock: &impl Clock) -> Self {
        Self {
            id: EventId::new(),
            kind,
            detail: detail.into(),
            created_at: clock.utc(),
        }
    }

    /// Reconstructs an event from persisted storage.
    #[must_use]
    pub const fn from_persisted(
        id: EventId,
        kind: GuildEventKind,
        detail: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            kind,
            detail,
            created_at,
        }
    }

    /// Returns the event identifier.
    #[must_use]
    pub const fn id(&self) -> EventId {
        self.id
    }

    /// Returns the event name.
    #[must_use]
    pub const fn kind(&self) -> GuildEventKind {
        self.kind
    }

    /// Returns the free-text detail.
    #[must_use]
    pub fn detail(&self) -> &str {
        &self.detail
    }

    /// Returns when the event was recorded.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
