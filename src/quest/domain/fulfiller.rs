//! Fulfiller aggregate and its availability status machine.

use super::{
    ContactHandle, DisplayName, FulfillerAction, FulfillerId, GuildDomainError,
    ParseFulfillerStatusError, Recipient,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Availability status of a fulfiller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FulfillerStatus {
    /// Available to claim quests.
    Idle,
    /// Holding exactly one active assignment.
    Working,
    /// Temporarily not taking quests.
    Resting,
    /// Left the guild; terminal.
    Departed,
}

impl FulfillerStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Working => "working",
            Self::Resting => "resting",
            Self::Departed => "departed",
        }
    }
}

impl fmt::Display for FulfillerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for FulfillerStatus {
    type Error = ParseFulfillerStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "idle" => Ok(Self::Idle),
            "working" => Ok(Self::Working),
            "resting" => Ok(Self::Resting),
            "departed" => Ok(Self::Departed),
            _ => Err(ParseFulfillerStatusError(value.to_owned())),
        }
    }
}

/// Whether a status request actually changed anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusOutcome {
    /// The status moved and must be persisted.
    Changed,
    /// The fulfiller was already in the requested status.
    Unchanged,
}

/// Fulfiller aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fulfiller {
    id: FulfillerId,
    contact: ContactHandle,
    display_name: DisplayName,
    status: FulfillerStatus,
    created_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted fulfiller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedFulfillerData {
    /// Persisted identifier.
    pub id: FulfillerId,
    /// Persisted contact handle.
    pub contact: ContactHandle,
    /// Persisted display name.
    pub display_name: DisplayName,
    /// Persisted status.
    pub status: FulfillerStatus,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Fulfiller {
    /// Registers a new idle fulfiller.
    #[must_use]
    pub fn register(display_name: DisplayName, contact: ContactHandle, clock: &impl Clock) -> Self {
        Self {
            id: FulfillerId::new(),
            contact,
            display_name,
            status: FulfillerStatus::Idle,
            created_at: clock.utc(),
        }
    }

    /// Reconstructs a fulfiller from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedFulfillerData) -> Self {
        Self {
            id: data.id,
            contact: data.contact,
            display_name: data.display_name,
            status: data.status,
            created_at: data.created_at,
        }
    }

    /// Returns the fulfiller identifier.
    #[must_use]
    pub const fn id(&self) -> FulfillerId {
        self.id
    }

    /// Returns the current status.
    #[must_use]
    pub const fn status(&self) -> FulfillerStatus {
        self.status
    }

    /// Returns the registration timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Marks the fulfiller as working on a freshly claimed quest.
    ///
    /// # Errors
    ///
    /// Returns [`GuildDomainError::FulfillerStatusRejected`] unless the
    /// fulfiller is idle.
    pub fn begin_work(&mut self) -> Result<(), GuildDomainError> {
        if self.status != FulfillerStatus::Idle {
            return Err(self.rejected(FulfillerAction::Claim));
        }
        self.status = FulfillerStatus::Working;
        Ok(())
    }

    /// Returns a working fulfiller to the idle pool.
    ///
    /// Used after confirmation and when undoing a failed claim. Any status
    /// other than working is left untouched.
    pub fn finish_work(&mut self) -> StatusOutcome {
        if self.status != FulfillerStatus::Working {
            return StatusOutcome::Unchanged;
        }
        self.status = FulfillerStatus::Idle;
        StatusOutcome::Changed
    }

    /// Moves an idle fulfiller to resting.
    ///
    /// # Errors
    ///
    /// Returns [`GuildDomainError::FulfillerStatusRejected`] when the
    /// fulfiller is working, already resting, or departed.
    pub fn rest(&mut self) -> Result<StatusOutcome, GuildDomainError> {
        if self.status != FulfillerStatus::Idle {
            return Err(self.rejected(FulfillerAction::Rest));
        }
        self.status = FulfillerStatus::Resting;
        Ok(StatusOutcome::Changed)
    }

    /// Returns the fulfiller to idle.
    ///
    /// A working fulfiller may only resume once no assignment is active for
    /// them, which covers the timeout and force-end recovery paths.
    ///
    /// # Errors
    ///
    /// Returns [`GuildDomainError::FulfillerStatusRejected`] when the
    /// fulfiller departed or still holds an active assignment.
    pub fn resume(&mut self, holds_active_assignment: bool) -> Result<StatusOutcome, GuildDomainError> {
        match self.status {
            FulfillerStatus::Idle => Ok(StatusOutcome::Unchanged),
            FulfillerStatus::Resting => {
                self.status = FulfillerStatus::Idle;
                Ok(StatusOutcome::Changed)
            }
            FulfillerStatus::Working if !holds_active_assignment => {
                self.status = FulfillerStatus::Idle;
                Ok(StatusOutcome::Changed)
            }
            FulfillerStatus::Working | FulfillerStatus::Departed => {
                Err(self.rejected(FulfillerAction::Resume))
            }
        }
    }

    /// Marks the fulfiller as departed. Idempotent.
    ///
    /// Departing does not release an active assignment.
    pub fn depart(&mut self) -> StatusOutcome {
        if self.status == FulfillerStatus::Departed {
            return StatusOutcome::Unchanged;
        }
        self.status = FulfillerStatus::Departed;
        StatusOutcome::Changed
    }

    const fn rejected(&self, action: FulfillerAction) -> GuildDomainError {
        GuildDomainError::FulfillerStatusRejected {
            fulfiller_id: self.id,
            status: self.status,
            action,
        }
    }
}

impl Recipient for Fulfiller {
    fn contact(&self) -> &ContactHandle {
        &self.contact
    }

    fn display_name(&self) -> &DisplayName {
        &self.display_name
    }
}
