//! Read-side queries over quests, assignments, and fulfillers.

use super::{error::GuildResult, lifecycle::GuildLifecycleService};
use crate::quest::{
    domain::{
        Assignment, AssignmentStatus, Fulfiller, FulfillerId, FulfillerStatus, GuildEvent, Quest,
        QuestId, RequesterId,
    },
    ports::{GuildStore, Notifier},
};
use mockable::Clock;
use std::collections::HashSet;

impl<S, N, C> GuildLifecycleService<S, N, C>
where
    S: GuildStore,
    N: Notifier,
    C: Clock + Send + Sync,
{
    /// Lists quests that can currently be claimed.
    ///
    /// A quest qualifies when it has at least one assignment row, none of
    /// them active and none confirmed. Quests left without an assignment by
    /// a failed publication are therefore never listed.
    ///
    /// # Errors
    ///
    /// Returns [`super::GuildError::Store`] when a scan fails.
    pub async fn available_quests(&self) -> GuildResult<Vec<Quest>> {
        let quests = self.store.list_quests().await?;
        let assignments = self.store.list_assignments().await?;

        let mut with_rows = HashSet::new();
        let mut blocked = HashSet::new();
        for assignment in &assignments {
            with_rows.insert(assignment.quest_id());
            if assignment.status().is_active()
                || assignment.status() == AssignmentStatus::Confirmed
            {
                blocked.insert(assignment.quest_id());
            }
        }

        Ok(quests
            .into_iter()
            .filter(|quest| with_rows.contains(&quest.id()) && !blocked.contains(&quest.id()))
            .collect())
    }

    /// Lists fulfillers available for new quests.
    ///
    /// # Errors
    ///
    /// Returns [`super::GuildError::Store`] when the scan fails.
    pub async fn idle_fulfillers(&self) -> GuildResult<Vec<Fulfiller>> {
        Ok(self
            .store
            .list_fulfillers_by_status(FulfillerStatus::Idle)
            .await?)
    }

    /// Returns the ongoing assignment held by a fulfiller, if any.
    ///
    /// # Errors
    ///
    /// Returns [`super::GuildError::Store`] when the lookup fails.
    pub async fn active_assignment_for(
        &self,
        fulfiller_id: FulfillerId,
    ) -> GuildResult<Option<Assignment>> {
        Ok(self
            .store
            .find_assignment_for_fulfiller(fulfiller_id, AssignmentStatus::Ongoing)
            .await?)
    }

    /// Lists quests published by a requester.
    ///
    /// # Errors
    ///
    /// Returns [`super::GuildError::Store`] when the scan fails.
    pub async fn quests_for_requester(&self, requester_id: RequesterId) -> GuildResult<Vec<Quest>> {
        Ok(self.store.list_quests_by_requester(requester_id).await?)
    }

    /// Lists every assignment row recorded for a quest, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`super::GuildError::NotFound`] for an unknown quest.
    pub async fn assignments_for_quest(&self, quest_id: QuestId) -> GuildResult<Vec<Assignment>> {
        self.require_quest(quest_id).await?;
        Ok(self.store.list_assignments_for_quest(quest_id).await?)
    }

    /// Looks up a quest.
    ///
    /// # Errors
    ///
    /// Returns [`super::GuildError::Store`] when the lookup fails.
    pub async fn find_quest(&self, quest_id: QuestId) -> GuildResult<Option<Quest>> {
        Ok(self.store.find_quest(quest_id).await?)
    }

    /// Looks up a fulfiller.
    ///
    /// # Errors
    ///
    /// Returns [`super::GuildError::Store`] when the lookup fails.
    pub async fn find_fulfiller(&self, fulfiller_id: FulfillerId) -> GuildResult<Option<Fulfiller>> {
        Ok(self.store.find_fulfiller(fulfiller_id).await?)
    }

    /// Returns the audit log in append order.
    ///
    /// # Errors
    ///
    /// Returns [`super::GuildError::Store`] when the scan fails.
    pub async fn events(&self) -> GuildResult<Vec<GuildEvent>> {
        Ok(self.store.list_events().await?)
    }
}
