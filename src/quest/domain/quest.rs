//! Quest aggregate and its validated scalar fields.
//!
//! A quest row carries no availability status of its own. Whether it can be
//! claimed is derived from its assignment rows, so title and reward are the
//! only things a quest ever "owns" after publication, and both are fixed.

use super::{GuildDomainError, QuestId, RequesterId};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Naive timestamp layouts accepted for deadlines, interpreted as UTC.
const NAIVE_DEADLINE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

/// Non-empty quest title.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestTitle(String);

impl QuestTitle {
    /// Creates a validated title.
    ///
    /// # Errors
    ///
    /// Returns [`GuildDomainError::EmptyQuestTitle`] when the title is blank.
    pub fn new(value: impl Into<String>) -> Result<Self, GuildDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(GuildDomainError::EmptyQuestTitle);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the title as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QuestTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque non-negative reward amount.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Reward(f64);

impl Reward {
    /// Creates a validated reward.
    ///
    /// # Errors
    ///
    /// Returns [`GuildDomainError::InvalidReward`] for negative, NaN, or
    /// infinite values.
    pub fn new(value: f64) -> Result<Self, GuildDomainError> {
        if !value.is_finite() || value < 0.0 {
            return Err(GuildDomainError::InvalidReward(value.to_string()));
        }
        Ok(Self(value))
    }

    /// Returns the zero reward.
    #[must_use]
    pub const fn zero() -> Self {
        Self(0.0)
    }

    /// Returns the numeric amount.
    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }
}

impl fmt::Display for Reward {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Parses a deadline from RFC 3339 or naive ISO-8601 text.
///
/// Naive values carry no offset and are read as UTC. A bare date means
/// midnight. Past instants are accepted; the engine only stores them.
///
/// # Errors
///
/// Returns [`GuildDomainError::InvalidDeadline`] when no layout matches.
pub fn parse_deadline(text: &str) -> Result<DateTime<Utc>, GuildDomainError> {
    let trimmed = text.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(parsed.with_timezone(&Utc));
    }

    let naive = NAIVE_DEADLINE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        });

    naive
        .map(|value| value.and_utc())
        .ok_or_else(|| GuildDomainError::InvalidDeadline(text.to_owned()))
}

/// Validated fields for a quest about to be published.
#[derive(Debug, Clone, PartialEq)]
pub struct NewQuest {
    /// Publishing requester.
    pub requester_id: RequesterId,
    /// Quest title.
    pub title: QuestTitle,
    /// Optional free-text description.
    pub description: Option<String>,
    /// Reward amount.
    pub reward: Reward,
    /// Optional deadline.
    pub deadline: Option<DateTime<Utc>>,
}

/// Quest aggregate root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quest {
    id: QuestId,
    requester_id: RequesterId,
    title: QuestTitle,
    description: Option<String>,
    reward: Reward,
    deadline: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted quest.
#[derive(Debug, Clone, PartialEq)]
pub struct PersistedQuestData {
    /// Persisted identifier.
    pub id: QuestId,
    /// Persisted owning requester.
    pub requester_id: RequesterId,
    /// Persisted title.
    pub title: QuestTitle,
    /// Persisted description.
    pub description: Option<String>,
    /// Persisted reward.
    pub reward: Reward,
    /// Persisted deadline.
    pub deadline: Option<DateTime<Utc>>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Quest {
    /// Creates a quest ready to be stored.
    #[must_use]
    pub fn publish(new_quest: NewQuest, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        let description = new_quest
            .description
            .map(|text| text.trim().to_owned())
            .filter(|text| !text.is_empty());

        Self {
            id: QuestId::new(),
            requester_id: new_quest.requester_id,
            title: new_quest.title,
            description,
            reward: new_quest.reward,
            deadline: new_quest.deadline,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Reconstructs a quest from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedQuestData) -> Self {
        Self {
            id: data.id,
            requester_id: data.requester_id,
            title: data.title,
            description: data.description,
            reward: data.reward,
            deadline: data.deadline,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the quest identifier.
    #[must_use]
    pub const fn id(&self) -> QuestId {
        self.id
    }

    /// Returns the owning requester.
    #[must_use]
    pub const fn requester_id(&self) -> RequesterId {
        self.requester_id
    }

    /// Returns the title.
    #[must_use]
    pub const fn title(&self) -> &QuestTitle {
        &self.title
    }

    /// Returns the description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the reward.
    #[must_use]
    pub const fn reward(&self) -> Reward {
        self.reward
    }

    /// Returns the deadline, if any.
    #[must_use]
    pub const fn deadline(&self) -> Option<DateTime<Utc>> {
        self.deadline
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns whether the given requester published this quest.
    #[must_use]
    pub fn is_owned_by(&self, requester_id: RequesterId) -> bool {
        self.requester_id == requester_id
    }
}
