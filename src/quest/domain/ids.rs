//! Identifier newtypes for guild entities.
//!
//! Every persisted row is keyed by a generated UUID. Wrapping each key in its
//! own type keeps a quest identifier from being passed where a fulfiller
//! identifier is expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! uuid_identifier {
    ($(#[$meta:meta])* $name:ident, $noun:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            #[doc = concat!("Creates a new random ", $noun, " identifier.")]
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            #[doc = concat!("Creates a ", $noun, " identifier from an existing UUID.")]
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the wrapped UUID.
            #[must_use]
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl AsRef<Uuid> for $name {
            fn as_ref(&self) -> &Uuid {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

uuid_identifier!(
    /// Unique identifier for a registered fulfiller.
    FulfillerId,
    "fulfiller"
);

uuid_identifier!(
    /// Unique identifier for a registered requester.
    RequesterId,
    "requester"
);

uuid_identifier!(
    /// Unique identifier for a published quest.
    QuestId,
    "quest"
);

uuid_identifier!(
    /// Unique identifier for an assignment row.
    AssignmentId,
    "assignment"
);

uuid_identifier!(
    /// Unique identifier for an audit log entry.
    EventId,
    "event"
);
