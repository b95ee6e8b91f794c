//! Requester aggregate.

use super::{ContactHandle, DisplayName, Recipient, RequesterId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Member who publishes quests and confirms their completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requester {
    id: RequesterId,
    contact: ContactHandle,
    display_name: DisplayName,
    created_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted requester.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedRequesterData {
    /// Persisted identifier.
    pub id: RequesterId,
    /// Persisted contact handle.
    pub contact: ContactHandle,
    /// Persisted display name.
    pub display_name: DisplayName,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Requester {
    /// Registers a new requester.
    #[must_use]
    pub fn register(display_name: DisplayName, contact: ContactHandle, clock: &impl Clock) -> Self {
        Self {
            id: RequesterId::new(),
            contact,
            display_name,
            created_at: clock.utc(),
        }
    }

    /// Reconstructs a requester from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedRequesterData) -> Self {
        Self {
            id: data.id,
            contact: data.contact,
            display_name: data.display_name,
            created_at: data.created_at,
        }
    }

    /// Returns the requester identifier.
    #[must_use]
    pub const fn id(&self) -> RequesterId {
        self.id
    }

    /// Returns the registration timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Recipient for Requester {
    fn contact(&self) -> &ContactHandle {
        &self.contact
    }

    fn display_name(&self) -> &DisplayName {
        &self.display_name
    }
}
