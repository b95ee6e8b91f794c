//! Entity store ports for guild persistence.
//!
//! The store offers point lookups, filtered scans, inserts, and updates. It
//! never spans several rows in one transaction. The two guarantees the
//! lifecycle engine relies on instead are:
//!
//! - status updates are compare-and-set against the status the caller read;
//! - a quest never has more than one active assignment row at a time.

use crate::quest::domain::{
    Assignment, AssignmentId, AssignmentStatus, ContactHandle, Fulfiller, FulfillerId,
    FulfillerStatus, GuildEvent, Quest, QuestId, Requester, RequesterId,
};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Fulfiller persistence contract.
#[async_trait]
pub trait FulfillerRepository: Send + Sync {
    /// Stores a newly registered fulfiller.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DuplicateId`] when the identifier exists or
    /// [`StoreError::DuplicateContact`] when the contact handle is taken by
    /// any member.
    async fn insert_fulfiller(&self, fulfiller: &Fulfiller) -> StoreResult<()>;

    /// Persists a status change, provided the stored status still equals
    /// `expected`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when the fulfiller does not exist and
    /// [`StoreError::StaleStatus`] when another writer changed it first.
    async fn update_fulfiller(
        &self,
        fulfiller: &Fulfiller,
        expected: FulfillerStatus,
    ) -> StoreResult<()>;

    /// Finds a fulfiller by identifier.
    async fn find_fulfiller(&self, id: FulfillerId) -> StoreResult<Option<Fulfiller>>;

    /// Finds a fulfiller by contact handle.
    async fn find_fulfiller_by_contact(
        &self,
        contact: &ContactHandle,
    ) -> StoreResult<Option<Fulfiller>>;

    /// Lists fulfillers with the given status.
    async fn list_fulfillers_by_status(
        &self,
        status: FulfillerStatus,
    ) -> StoreResult<Vec<Fulfiller>>;
}

/// Requester persistence contract.
#[async_trait]
pub trait RequesterRepository: Send + Sync {
    /// Stores a newly registered requester.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DuplicateId`] when the identifier exists or
    /// [`StoreError::DuplicateContact`] when the contact handle is taken by
    /// any member.
    async fn insert_requester(&self, requester: &Requester) -> StoreResult<()>;

    /// Finds a requester by identifier.
    async fn find_requester(&self, id: RequesterId) -> StoreResult<Option<Requester>>;

    /// Finds a requester by contact handle.
    async fn find_requester_by_contact(
        &self,
        contact: &ContactHandle,
    ) -> StoreResult<Option<Requester>>;
}

/// Quest persistence contract. Quests are insert-only.
#[async_trait]
pub trait QuestRepository: Send + Sync {
    /// Stores a newly published quest.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DuplicateId`] when the identifier exists.
    async fn insert_quest(&self, quest: &Quest) -> StoreResult<()>;

    /// Finds a quest by identifier.
    async fn find_quest(&self, id: QuestId) -> StoreResult<Option<Quest>>;

    /// Lists every quest.
    async fn list_quests(&self) -> StoreResult<Vec<Quest>>;

    /// Lists quests published by one requester.
    async fn list_quests_by_requester(&self, requester_id: RequesterId)
    -> StoreResult<Vec<Quest>>;
}

/// Assignment persistence contract.
#[async_trait]
pub trait AssignmentRepository: Send + Sync {
    /// Stores a new assignment row.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DuplicateId`] when the identifier exists and
    /// [`StoreError::ActiveAssignmentExists`] when the row is active and the
    /// quest already has an active assignment.
    async fn insert_assignment(&self, assignment: &Assignment) -> StoreResult<()>;

    /// Persists a transition, provided the stored status still equals
    /// `expected`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when the row does not exist,
    /// [`StoreError::StaleStatus`] when another writer moved it first, and
    /// [`StoreError::ActiveAssignmentExists`] when activating it would give
    /// the quest a second active assignment.
    async fn update_assignment(
        &self,
        assignment: &Assignment,
        expected: AssignmentStatus,
    ) -> StoreResult<()>;

    /// Finds an assignment by identifier.
    async fn find_assignment(&self, id: AssignmentId) -> StoreResult<Option<Assignment>>;

    /// Lists every assignment.
    async fn list_assignments(&self) -> StoreResult<Vec<Assignment>>;

    /// Lists all assignment rows for a quest, oldest first.
    async fn list_assignments_for_quest(&self, quest_id: QuestId)
    -> StoreResult<Vec<Assignment>>;

    /// Lists assignments in the given status.
    async fn list_assignments_by_status(
        &self,
        status: AssignmentStatus,
    ) -> StoreResult<Vec<Assignment>>;

    /// Finds the assignment bound to a fulfiller in the given status.
    async fn find_assignment_for_fulfiller(
        &self,
        fulfiller_id: FulfillerId,
        status: AssignmentStatus,
    ) -> StoreResult<Option<Assignment>>;
}

/// Append-only audit log contract.
#[async_trait]
pub trait EventLogRepository: Send + Sync {
    /// Appends an entry.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Persistence`] when the write fails.
    async fn append_event(&self, event: &GuildEvent) -> StoreResult<()>;

    /// Lists all entries in append order.
    async fn list_events(&self) -> StoreResult<Vec<GuildEvent>>;
}

/// Composite store used by the guild services.
pub trait GuildStore:
    FulfillerRepository + RequesterRepository + QuestRepository + AssignmentRepository + EventLogRepository
{
}

impl<T> GuildStore for T where
    T: FulfillerRepository
        + RequesterRepository
        + QuestRepository
        + AssignmentRepository
        + EventLogRepository
{
}

/// Errors returned by store implementations.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// A row with the same identifier already exists.
    #[error("duplicate identifier: {0}")]
    DuplicateId(String),

    /// The contact handle is already registered.
    #[error("contact {0} is already registered")]
    DuplicateContact(ContactHandle),

    /// The row to update does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Entity kind.
        entity: &'static str,
        /// Row identifier.
        id: String,
    },

    /// The quest already has an assignment in an active status.
    #[error("quest {0} already has an active assignment")]
    ActiveAssignmentExists(QuestId),

    /// The stored status no longer matches what the caller read.
    #[error("{entity} {id} was modified concurrently")]
    StaleStatus {
        /// Entity kind.
        entity: &'static str,
        /// Row identifier.
        id: String,
    },

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }

    /// Builds a not-found error for an entity identifier.
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Builds a stale-status error for an entity identifier.
    pub fn stale(entity: &'static str, id: impl ToString) -> Self {
        Self::StaleStatus {
            entity,
            id: id.to_string(),
        }
    }

    /// Returns whether the error signals a lost compare-and-set or
    /// uniqueness race rather than an infrastructure failure.
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::StaleStatus { .. } | Self::ActiveAssignmentExists(_)
        )
    }
}
