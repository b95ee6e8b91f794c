//! Assignment aggregate and the authoritative assignment state graph.
//!
//! ```text
//! Unanswered --claim--> Ongoing --submit--> Submitted --confirm--> Confirmed
//! Ongoing --timeout--> Timeout
//! Ongoing | Submitted --force-end--> ForcedEnd
//! ```

use super::{
    AssignmentId, FulfillerId, GuildDomainError, ParseAssignmentStatusError, QuestId,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Assignment lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStatus {
    /// Published and waiting for a fulfiller.
    Unanswered,
    /// Claimed and being worked on.
    Ongoing,
    /// Work handed in, awaiting the requester.
    Submitted,
    /// Completion confirmed by the requester.
    Confirmed,
    /// Expired by an external scheduler.
    Timeout,
    /// Terminated administratively.
    ForcedEnd,
}

impl AssignmentStatus {
    /// Every status, in graph order.
    pub const ALL: [Self; 6] = [
        Self::Unanswered,
        Self::Ongoing,
        Self::Submitted,
        Self::Confirmed,
        Self::Timeout,
        Self::ForcedEnd,
    ];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unanswered => "unanswered",
            Self::Ongoing => "ongoing",
            Self::Submitted => "submitted",
            Self::Confirmed => "confirmed",
            Self::Timeout => "timeout",
            Self::ForcedEnd => "forced_end",
        }
    }

    /// Returns whether the status blocks other claims on the quest.
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Ongoing | Self::Submitted)
    }

    /// Returns whether no further transition is permitted.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Confirmed | Self::Timeout | Self::ForcedEnd)
    }

    /// Returns whether `target` is a direct edge from this status.
    #[must_use]
    pub const fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Unanswered, Self::Ongoing)
                | (Self::Ongoing, Self::Submitted | Self::Timeout | Self::ForcedEnd)
                | (Self::Submitted, Self::Confirmed | Self::ForcedEnd)
        )
    }
}

impl fmt::Display for AssignmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for AssignmentStatus {
    type Error = ParseAssignmentStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "unanswered" => Ok(Self::Unanswered),
            "ongoing" => Ok(Self::Ongoing),
            "submitted" => Ok(Self::Submitted),
            "confirmed" => Ok(Self::Confirmed),
            "timeout" => Ok(Self::Timeout),
            "forced_end" => Ok(Self::ForcedEnd),
            _ => Err(ParseAssignmentStatusError(value.to_owned())),
        }
    }
}

/// Claim record binding a fulfiller to a quest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    id: AssignmentId,
    quest_id: QuestId,
    fulfiller_id: Option<FulfillerId>,
    status: AssignmentStatus,
    created_at: DateTime<Utc>,
    claimed_at: Option<DateTime<Utc>>,
    submitted_at: Option<DateTime<Utc>>,
    confirmed_at: Option<DateTime<Utc>>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedAssignmentData {
    /// Persisted identifier.
    pub id: AssignmentId,
    /// Persisted quest reference.
    pub quest_id: QuestId,
    /// Persisted fulfiller binding.
    pub fulfiller_id: Option<FulfillerId>,
    /// Persisted status.
    pub status: AssignmentStatus,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted claim timestamp.
    pub claimed_at: Option<DateTime<Utc>>,
    /// Persisted submission timestamp.
    pub submitted_at: Option<DateTime<Utc>>,
    /// Persisted confirmation timestamp.
    pub confirmed_at: Option<DateTime<Utc>>,
    /// Persisted latest transition timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Assignment {
    /// Opens an unanswered assignment for a quest.
    #[must_use]
    pub fn open(quest_id: QuestId, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        Self {
            id: AssignmentId::new(),
            quest_id,
            fulfiller_id: None,
            status: AssignmentStatus::Unanswered,
            created_at: timestamp,
            claimed_at: None,
            submitted_at: None,
            confirmed_at: None,
            updated_at: timestamp,
        }
    }

    /// Reconstructs an assignment from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedAssignmentData) -> Self {
        Self {
            id: data.id,
            quest_id: data.quest_id,
            fulfiller_id: data.fulfiller_id,
            status: data.status,
            created_at: data.created_at,
            claimed_at: data.claimed_at,
            submitted_at: data.submitted_at,
            confirmed_at: data.confirmed_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the assignment identifier.
    #[must_use]
    pub const fn id(&self) -> AssignmentId {
        self.id
    }

    /// Returns the quest this assignment belongs to.
    #[must_use]
    pub const fn quest_id(&self) -> QuestId {
        self.quest_id
    }

    /// Returns the bound fulfiller, if claimed.
    #[must_use]
    pub const fn fulfiller_id(&self) -> Option<FulfillerId> {
        self.fulfiller_id
    }

    /// Returns the current status.
    #[must_use]
    pub const fn status(&self) -> AssignmentStatus {
        self.status
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns when the assignment was claimed.
    #[must_use]
    pub const fn claimed_at(&self) -> Option<DateTime<Utc>> {
        self.claimed_at
    }

    /// Returns when the work was submitted.
    #[must_use]
    pub const fn submitted_at(&self) -> Option<DateTime<Utc>> {
        self.submitted_at
    }

    /// Returns when completion was confirmed.
    #[must_use]
    pub const fn confirmed_at(&self) -> Option<DateTime<Utc>> {
        self.confirmed_at
    }

    /// Returns the latest transition timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns whether the given fulfiller is bound to this assignment.
    #[must_use]
    pub fn is_held_by(&self, fulfiller_id: FulfillerId) -> bool {
        self.fulfiller_id == Some(fulfiller_id)
    }

    /// Binds a fulfiller and moves `Unanswered -> Ongoing`.
    ///
    /// # Errors
    ///
    /// Returns [`GuildDomainError::InvalidAssignmentTransition`] unless the
    /// assignment is unanswered.
    pub fn claim(
        &mut self,
        fulfiller_id: FulfillerId,
        clock: &impl Clock,
    ) -> Result<(), GuildDomainError> {
        let timestamp = self.transition_to(AssignmentStatus::Ongoing, clock)?;
        self.fulfiller_id = Some(fulfiller_id);
        self.claimed_at = Some(timestamp);
        Ok(())
    }

    /// Moves `Ongoing -> Submitted`.
    ///
    /// # Errors
    ///
    /// Returns [`GuildDomainError::InvalidAssignmentTransition`] unless the
    /// assignment is ongoing.
    pub fn submit(&mut self, clock: &impl Clock) -> Result<(), GuildDomainError> {
        let timestamp = self.transition_to(AssignmentStatus::Submitted, clock)?;
        self.submitted_at = Some(timestamp);
        Ok(())
    }

    /// Moves `Submitted -> Confirmed`.
    ///
    /// # Errors
    ///
    /// Returns [`GuildDomainError::InvalidAssignmentTransition`] unless the
    /// assignment is submitted.
    pub fn confirm(&mut self, clock: &impl Clock) -> Result<(), GuildDomainError> {
        let timestamp = self.transition_to(AssignmentStatus::Confirmed, clock)?;
        self.confirmed_at = Some(timestamp);
        Ok(())
    }

    /// Moves `Ongoing -> Timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`GuildDomainError::InvalidAssignmentTransition`] unless the
    /// assignment is ongoing.
    pub fn expire(&mut self, clock: &impl Clock) -> Result<(), GuildDomainError> {
        self.transition_to(AssignmentStatus::Timeout, clock)?;
        Ok(())
    }

    /// Moves an ongoing or submitted assignment to `ForcedEnd`.
    ///
    /// # Errors
    ///
    /// Returns [`GuildDomainError::InvalidAssignmentTransition`] unless the
    /// assignment is active.
    pub fn force_end(&mut self, clock: &impl Clock) -> Result<(), GuildDomainError> {
        self.transition_to(AssignmentStatus::ForcedEnd, clock)?;
        Ok(())
    }

    fn transition_to(
        &mut self,
        target: AssignmentStatus,
        clock: &impl Clock,
    ) -> Result<DateTime<Utc>, GuildDomainError> {
        if !self.status.can_transition_to(target) {
            return Err(GuildDomainError::InvalidAssignmentTransition {
                assignment_id: self.id,
                from: self.status,
                to: target,
            });
        }
        let timestamp = clock.utc();
        self.status = target;
        self.updated_at = timestamp;
        Ok(timestamp)
    }
}
