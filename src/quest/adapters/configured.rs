//! Store selection from deployment configuration.

use async_trait::async_trait;

use super::{memory::InMemoryGuildStore, postgres::PostgresGuildStore};
use crate::config::StoreConfig;
use crate::quest::{
    domain::{
        Assignment, AssignmentId, AssignmentStatus, ContactHandle, Fulfiller, FulfillerId,
        FulfillerStatus, GuildEvent, Quest, QuestId, Requester, RequesterId,
    },
    ports::{
        AssignmentRepository, EventLogRepository, FulfillerRepository, QuestRepository,
        RequesterRepository, StoreResult,
    },
};

/// Guild store chosen by [`StoreConfig`].
///
/// `database_url` selects `PostgreSQL`; without it the guild runs on the
/// in-memory store.
#[derive(Debug, Clone)]
pub enum ConfiguredStore {
    /// Process-local store.
    InMemory(InMemoryGuildStore),
    /// `PostgreSQL`-backed store.
    Postgres(PostgresGuildStore),
}

impl ConfiguredStore {
    /// Opens the store described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::quest::ports::StoreError::Persistence`] when the
    /// `PostgreSQL` pool cannot be built.
    pub fn from_config(config: &StoreConfig) -> StoreResult<Self> {
        config.database_url.as_deref().map_or_else(
            || {
                tracing::info!("no database_url configured, using in-memory store");
                Ok(Self::InMemory(InMemoryGuildStore::new()))
            },
            |url| {
                tracing::info!(max_connections = config.max_connections, "using postgres store");
                PostgresGuildStore::connect(url, config.max_connections).map(Self::Postgres)
            },
        )
    }

    /// Reports whether the selected store persists outside the process.
    #[must_use]
    pub const fn is_persistent(&self) -> bool {
        matches!(self, Self::Postgres(_))
    }
}

macro_rules! dispatch {
    ($self:ident, $store:ident => $call:expr) => {
        match $self {
            Self::InMemory($store) => $call,
            Self::Postgres($store) => $call,
        }
    };
}

#[async_trait]
impl FulfillerRepository for ConfiguredStore {
    async fn insert_fulfiller(&self, fulfiller: &Fulfiller) -> StoreResult<()> {
        dispatch!(self, store => store.insert_fulfiller(fulfiller).await)
    }

    async fn update_fulfiller(
        &self,
        fulfiller: &Fulfiller,
        expected: FulfillerStatus,
    ) -> StoreResult<()> {
        dispatch!(self, store => store.update_fulfiller(fulfiller, expected).await)
    }

    async fn find_fulfiller(&self, id: FulfillerId) -> StoreResult<Option<Fulfiller>> {
        dispatch!(self, store => store.find_fulfiller(id).await)
    }

    async fn find_fulfiller_by_contact(
        &self,
        contact: &ContactHandle,
    ) -> StoreResult<Option<Fulfiller>> {
        dispatch!(self, store => store.find_fulfiller_by_contact(contact).await)
    }

    async fn list_fulfillers_by_status(
        &self,
        status: FulfillerStatus,
    ) -> StoreResult<Vec<Fulfiller>> {
        dispatch!(self, store => store.list_fulfillers_by_status(status).await)
    }
}

#[async_trait]
impl RequesterRepository for ConfiguredStore {
    async fn insert_requester(&self, requester: &Requester) -> StoreResult<()> {
        dispatch!(self, store => store.insert_requester(requester).await)
    }

    async fn find_requester(&self, id: RequesterId) -> StoreResult<Option<Requester>> {
        dispatch!(self, store => store.find_requester(id).await)
    }

    async fn find_requester_by_contact(
        &self,
        contact: &ContactHandle,
    ) -> StoreResult<Option<Requester>> {
        dispatch!(self, store => store.find_requester_by_contact(contact).await)
    }
}

#[async_trait]
impl QuestRepository for ConfiguredStore {
    async fn insert_quest(&self, quest: &Quest) -> StoreResult<()> {
        dispatch!(self, store => store.insert_quest(quest).await)
    }

    async fn find_quest(&self, id: QuestId) -> StoreResult<Option<Quest>> {
        dispatch!(self, store => store.find_quest(id).await)
    }

    async fn list_quests(&self) -> StoreResult<Vec<Quest>> {
        dispatch!(self, store => store.list_quests().await)
    }

    async fn list_quests_by_requester(
        &self,
        requester_id: RequesterId,
    ) -> StoreResult<Vec<Quest>> {
        dispatch!(self, store => store.list_quests_by_requester(requester_id).await)
    }
}

#[async_trait]
impl AssignmentRepository for ConfiguredStore {
    async fn insert_assignment(&self, assignment: &Assignment) -> StoreResult<()> {
        dispatch!(self, store => store.insert_assignment(assignment).await)
    }

    async fn update_assignment(
        &self,
        assignment: &Assignment,
        expected: AssignmentStatus,
    ) -> StoreResult<()> {
        dispatch!(self, store => store.update_assignment(assignment, expected).await)
    }

    async fn find_assignment(&self, id: AssignmentId) -> StoreResult<Option<Assignment>> {
        dispatch!(self, store => store.find_assignment(id).await)
    }

    async fn list_assignments(&self) -> StoreResult<Vec<Assignment>> {
        dispatch!(self, store => store.list_assignments().await)
    }

    async fn list_assignments_for_quest(
        &self,
        quest_id: QuestId,
    ) -> StoreResult<Vec<Assignment>> {
        dispatch!(self, store => store.list_assignments_for_quest(quest_id).await)
    }

    async fn list_assignments_by_status(
        &self,
        status: AssignmentStatus,
    ) -> StoreResult<Vec<Assignment>> {
        dispatch!(self, store => store.list_assignments_by_status(status).await)
    }

    async fn find_assignment_for_fulfiller(
        &self,
        fulfiller_id: FulfillerId,
        status: AssignmentStatus,
    ) -> StoreResult<Option<Assignment>> {
        dispatch!(self, store => store.find_assignment_for_fulfiller(fulfiller_id, status).await)
    }
}

#[async_trait]
impl EventLogRepository for ConfiguredStore {
    async fn append_event(&self, event: &GuildEvent) -> StoreResult<()> {
        dispatch!(self, store => store.append_event(event).await)
    }

    async fn list_events(&self) -> StoreResult<Vec<GuildEvent>> {
        dispatch!(self, store => store.list_events().await)
    }
}
