//! Service-level errors for guild operations.

use crate::quest::{
    domain::{AssignmentId, ContactHandle, FulfillerId, GuildDomainError, QuestId, RequesterId},
    ports::StoreError,
};
use std::fmt;
use thiserror::Error;

/// Coarse error category surfaced to the command surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Bad input or a request the current state does not permit.
    Validation,
    /// A referenced entity is absent.
    NotFound,
    /// The actor does not own or hold the referenced entity.
    Ownership,
    /// Another fulfiller won the claim race.
    AlreadyClaimed,
    /// The underlying store failed.
    Store,
}

/// Entity that a lookup failed to find.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingEntity {
    /// No fulfiller with this identifier.
    Fulfiller(FulfillerId),
    /// No requester with this identifier.
    Requester(RequesterId),
    /// No quest with this identifier.
    Quest(QuestId),
    /// No assignment with this identifier.
    Assignment(AssignmentId),
    /// The fulfiller holds no ongoing assignment.
    OngoingAssignment(FulfillerId),
    /// The quest has no submitted assignment.
    SubmittedAssignment(QuestId),
    /// The quest has no assignment row that can be claimed.
    OpenAssignment(QuestId),
}

impl fmt::Display for MissingEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fulfiller(id) => write!(f, "fulfiller {id}"),
            Self::Requester(id) => write!(f, "requester {id}"),
            Self::Quest(id) => write!(f, "quest {id}"),
            Self::Assignment(id) => write!(f, "assignment {id}"),
            Self::OngoingAssignment(id) => write!(f, "ongoing assignment for fulfiller {id}"),
            Self::SubmittedAssignment(id) => write!(f, "submitted assignment for quest {id}"),
            Self::OpenAssignment(id) => write!(f, "open assignment for quest {id}"),
        }
    }
}

/// Errors returned by guild services.
#[derive(Debug, Error)]
pub enum GuildError {
    /// Domain validation or a state transition failed.
    #[error(transparent)]
    Domain(#[from] GuildDomainError),

    /// A referenced entity does not exist.
    #[error("{0} not found")]
    NotFound(MissingEntity),

    /// The fulfiller's ongoing assignment belongs to another quest.
    #[error("fulfiller {fulfiller_id} does not hold quest {quest_id}")]
    NotQuestHolder {
        /// Submitting fulfiller.
        fulfiller_id: FulfillerId,
        /// Quest named in the request.
        quest_id: QuestId,
    },

    /// The requester did not publish the quest.
    #[error("requester {requester_id} does not own quest {quest_id}")]
    NotQuestOwner {
        /// Confirming requester.
        requester_id: RequesterId,
        /// Quest named in the request.
        quest_id: QuestId,
    },

    /// The quest already has an active assignment.
    #[error("quest {0} has already been claimed")]
    AlreadyClaimed(QuestId),

    /// The quest has been confirmed and cannot be claimed again.
    #[error("quest {0} is already completed")]
    QuestClosed(QuestId),

    /// The assignment changed between read and write.
    #[error("assignment {0} was modified concurrently, reload and retry")]
    ConcurrentAssignmentUpdate(AssignmentId),

    /// The fulfiller's status changed between read and write.
    #[error("fulfiller {0} was modified concurrently, reload and retry")]
    ConcurrentFulfillerUpdate(FulfillerId),

    /// The contact handle is already registered in either role.
    #[error("{0} is already registered")]
    AlreadyRegistered(ContactHandle),

    /// The store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl GuildError {
    /// Maps the error onto the command-surface taxonomy.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Domain(_)
            | Self::QuestClosed(_)
            | Self::ConcurrentAssignmentUpdate(_)
            | Self::ConcurrentFulfillerUpdate(_)
            | Self::AlreadyRegistered(_) => ErrorKind::Validation,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::NotQuestHolder { .. } | Self::NotQuestOwner { .. } => ErrorKind::Ownership,
            Self::AlreadyClaimed(_) => ErrorKind::AlreadyClaimed,
            Self::Store(StoreError::ActiveAssignmentExists(_)) => ErrorKind::AlreadyClaimed,
            Self::Store(_) => ErrorKind::Store,
        }
    }
}

/// Result type for guild service operations.
pub type GuildResult<T> = Result<T, GuildError>;
