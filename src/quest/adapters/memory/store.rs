//! In-memory guild store for lifecycle tests and single-process use.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::quest::{
    domain::{
        Assignment, AssignmentId, AssignmentStatus, ContactHandle, Fulfiller, FulfillerId,
        FulfillerStatus, GuildEvent, Quest, QuestId, Recipient, Requester, RequesterId,
    },
    ports::{
        AssignmentRepository, EventLogRepository, FulfillerRepository, QuestRepository,
        RequesterRepository, StoreError, StoreResult,
    },
};

/// Store call that can be made to fail once for compensation tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOperation {
    /// [`FulfillerRepository::insert_fulfiller`].
    InsertFulfiller,
    /// [`FulfillerRepository::update_fulfiller`].
    UpdateFulfiller,
    /// [`FulfillerRepository::find_fulfiller`].
    FindFulfiller,
    /// [`RequesterRepository::insert_requester`].
    InsertRequester,
    /// [`QuestRepository::insert_quest`].
    InsertQuest,
    /// [`AssignmentRepository::insert_assignment`].
    InsertAssignment,
    /// [`AssignmentRepository::update_assignment`].
    UpdateAssignment,
    /// [`EventLogRepository::append_event`].
    AppendEvent,
}

/// Thread-safe in-memory guild store.
///
/// Every write takes the state lock, so the compare-and-set and the
/// one-active-assignment-per-quest check are atomic with the write itself.
#[derive(Debug, Clone, Default)]
pub struct InMemoryGuildStore {
    state: Arc<RwLock<InMemoryGuildState>>,
}

#[derive(Debug, Default)]
struct InMemoryGuildState {
    fulfillers: HashMap<FulfillerId, Fulfiller>,
    requesters: HashMap<RequesterId, Requester>,
    contacts: HashSet<ContactHandle>,
    quests: HashMap<QuestId, Quest>,
    quest_order: Vec<QuestId>,
    assignments: HashMap<AssignmentId, Assignment>,
    assignment_order: Vec<AssignmentId>,
    events: Vec<GuildEvent>,
    pending_failures: HashSet<StoreOperation>,
}

impl InMemoryGuildStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next call of `operation` fail with a persistence error.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Persistence`] when the state lock is poisoned.
    pub fn fail_next(&self, operation: StoreOperation) -> StoreResult<()> {
        self.write()?.pending_failures.insert(operation);
        Ok(())
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, InMemoryGuildState>> {
        self.state
            .read()
            .map_err(|err| StoreError::persistence(std::io::Error::other(err.to_string())))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, InMemoryGuildState>> {
        self.state
            .write()
            .map_err(|err| StoreError::persistence(std::io::Error::other(err.to_string())))
    }
}

impl InMemoryGuildState {
    fn take_failure(&mut self, operation: StoreOperation) -> StoreResult<()> {
        if self.pending_failures.remove(&operation) {
            return Err(StoreError::persistence(std::io::Error::other(format!(
                "injected failure for {operation:?}"
            ))));
        }
        Ok(())
    }

    fn claim_contact(&mut self, contact: &ContactHandle) -> StoreResult<()> {
        if !self.contacts.insert(contact.clone()) {
            return Err(StoreError::DuplicateContact(contact.clone()));
        }
        Ok(())
    }

    fn has_other_active(&self, quest_id: QuestId, except: AssignmentId) -> bool {
        self.assignments.values().any(|assignment| {
            assignment.quest_id() == quest_id
                && assignment.id() != except
                && assignment.status().is_active()
        })
    }

    fn ordered_assignments(&self) -> impl Iterator<Item = &Assignment> {
        self.assignment_order
            .iter()
            .filter_map(|id| self.assignments.get(id))
    }

    fn ordered_quests(&self) -> impl Iterator<Item = &Quest> {
        self.quest_order.iter().filter_map(|id| self.quests.get(id))
    }
}

#[async_trait]
impl FulfillerRepository for InMemoryGuildStore {
    async fn insert_fulfiller(&self, fulfiller: &Fulfiller) -> StoreResult<()> {
        let mut state = self.write()?;
        state.take_failure(StoreOperation::InsertFulfiller)?;
        if state.fulfillers.contains_key(&fulfiller.id()) {
            return Err(StoreError::DuplicateId(fulfiller.id().to_string()));
        }
        state.claim_contact(fulfiller.contact())?;
        state.fulfillers.insert(fulfiller.id(), fulfiller.clone());
        Ok(())
    }

    async fn update_fulfiller(
        &self,
        fulfiller: &Fulfiller,
        expected: FulfillerStatus,
    ) -> StoreResult<()> {
        let mut state = self.write()?;
        state.take_failure(StoreOperation::UpdateFulfiller)?;
        let stored = state
            .fulfillers
            .get_mut(&fulfiller.id())
            .ok_or_else(|| StoreError::not_found("fulfiller", fulfiller.id()))?;
        if stored.status() != expected {
            return Err(StoreError::stale("fulfiller", fulfiller.id()));
        }
        *stored = fulfiller.clone();
        Ok(())
    }

    async fn find_fulfiller(&self, id: FulfillerId) -> StoreResult<Option<Fulfiller>> {
        let mut state = self.write()?;
        state.take_failure(StoreOperation::FindFulfiller)?;
        Ok(state.fulfillers.get(&id).cloned())
    }

    async fn find_fulfiller_by_contact(
        &self,
        contact: &ContactHandle,
    ) -> StoreResult<Option<Fulfiller>> {
        let state = self.read()?;
        Ok(state
            .fulfillers
            .values()
            .find(|fulfiller| fulfiller.contact() == contact)
            .cloned())
    }

    async fn list_fulfillers_by_status(
        &self,
        status: FulfillerStatus,
    ) -> StoreResult<Vec<Fulfiller>> {
        let state = self.read()?;
        let mut fulfillers: Vec<Fulfiller> = state
            .fulfillers
            .values()
            .filter(|fulfiller| fulfiller.status() == status)
            .cloned()
            .collect();
        fulfillers.sort_by_key(Fulfiller::created_at);
        Ok(fulfillers)
    }
}

#[async_trait]
impl RequesterRepository for InMemoryGuildStore {
    async fn insert_requester(&self, requester: &Requester) -> StoreResult<()> {
        let mut state = self.write()?;
        state.take_failure(StoreOperation::InsertRequester)?;
        if state.requesters.contains_key(&requester.id()) {
            return Err(StoreError::DuplicateId(requester.id().to_string()));
        }
        state.claim_contact(requester.contact())?;
        state.requesters.insert(requester.id(), requester.clone());
        Ok(())
    }

    async fn find_requester(&self, id: RequesterId) -> StoreResult<Option<Requester>> {
        Ok(self.read()?.requesters.get(&id).cloned())
    }

    async fn find_requester_by_contact(
        &self,
        contact: &ContactHandle,
    ) -> StoreResult<Option<Requester>> {
        let state = self.read()?;
        Ok(state
            .requesters
            .values()
            .find(|requester| requester.contact() == contact)
            .cloned())
    }
}

#[async_trait]
impl QuestRepository for InMemoryGuildStore {
    async fn insert_quest(&self, quest: &Quest) -> StoreResult<()> {
        let mut state = self.write()?;
        state.take_failure(StoreOperation::InsertQuest)?;
        if state.quests.contains_key(&quest.id()) {
            return Err(StoreError::DuplicateId(quest.id().to_string()));
        }
        state.quest_order.push(quest.id());
        state.quests.insert(quest.id(), quest.clone());
        Ok(())
    }

    async fn find_quest(&self, id: QuestId) -> StoreResult<Option<Quest>> {
        Ok(self.read()?.quests.get(&id).cloned())
    }

    async fn list_quests(&self) -> StoreResult<Vec<Quest>> {
        Ok(self.read()?.ordered_quests().cloned().collect())
    }

    async fn list_quests_by_requester(
        &self,
        requester_id: RequesterId,
    ) -> StoreResult<Vec<Quest>> {
        let state = self.read()?;
        Ok(state
            .ordered_quests()
            .filter(|quest| quest.is_owned_by(requester_id))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl AssignmentRepository for InMemoryGuildStore {
    async fn insert_assignment(&self, assignment: &Assignment) -> StoreResult<()> {
        let mut state = self.write()?;
        state.take_failure(StoreOperation::InsertAssignment)?;
        if state.assignments.contains_key(&assignment.id()) {
            return Err(StoreError::DuplicateId(assignment.id().to_string()));
        }
        if assignment.status().is_active()
            && state.has_other_active(assignment.quest_id(), assignment.id())
        {
            return Err(StoreError::ActiveAssignmentExists(assignment.quest_id()));
        }
        state.assignment_order.push(assignment.id());
        state.assignments.insert(assignment.id(), assignment.clone());
        Ok(())
    }

    async fn update_assignment(
        &self,
        assignment: &Assignment,
        expected: AssignmentStatus,
    ) -> StoreResult<()> {
        let mut state = self.write()?;
        state.take_failure(StoreOperation::UpdateAssignment)?;
        let stored_status = state
            .assignments
            .get(&assignment.id())
            .map(Assignment::status)
            .ok_or_else(|| StoreError::not_found("assignment", assignment.id()))?;
        if stored_status != expected {
            return Err(StoreError::stale("assignment", assignment.id()));
        }
        if assignment.status().is_active()
            && state.has_other_active(assignment.quest_id(), assignment.id())
        {
            return Err(StoreError::ActiveAssignmentExists(assignment.quest_id()));
        }
        state.assignments.insert(assignment.id(), assignment.clone());
        Ok(())
    }

    async fn find_assignment(&self, id: AssignmentId) -> StoreResult<Option<Assignment>> {
        Ok(self.read()?.assignments.get(&id).cloned())
    }

    async fn list_assignments(&self) -> StoreResult<Vec<Assignment>> {
        Ok(self.read()?.ordered_assignments().cloned().collect())
    }

    async fn list_assignments_for_quest(
        &self,
        quest_id: QuestId,
    ) -> StoreResult<Vec<Assignment>> {
        let state = self.read()?;
        Ok(state
            .ordered_assignments()
            .filter(|assignment| assignment.quest_id() == quest_id)
            .cloned()
            .collect())
    }

    async fn list_assignments_by_status(
        &self,
        status: AssignmentStatus,
    ) -> StoreResult<Vec<Assignment>> {
        let state = self.read()?;
        Ok(state
            .ordered_assignments()
            .filter(|assignment| assignment.status() == status)
            .cloned()
            .collect())
    }

    async fn find_assignment_for_fulfiller(
        &self,
        fulfiller_id: FulfillerId,
        status: AssignmentStatus,
    ) -> StoreResult<Option<Assignment>> {
        let state = self.read()?;
        Ok(state
            .ordered_assignments()
            .find(|assignment| {
                assignment.is_held_by(fulfiller_id) && assignment.status() == status
            })
            .cloned())
    }
}

#[async_trait]
impl EventLogRepository for InMemoryGuildStore {
    async fn append_event(&self, event: &GuildEvent) -> StoreResult<()> {
        let mut state = self.write()?;
        state.take_failure(StoreOperation::AppendEvent)?;
        state.events.push(event.clone());
        Ok(())
    }

    async fn list_events(&self) -> StoreResult<Vec<GuildEvent>> {
        Ok(self.read()?.events.clone())
    }
}
