//! Lifecycle engine for quests and assignments.
//!
//! Every operation is an ordered list of single-row writes. Where a later
//! write fails after an earlier one succeeded, the compensation is explicit
//! and logged. Claim races are settled by the store: assignment writes are
//! compare-and-set against the status read beforehand, and the store refuses
//! a second active assignment for the same quest.

use super::error::{GuildError, GuildResult, MissingEntity};
use crate::quest::{
    domain::{
        Assignment, AssignmentId, AssignmentStatus, Fulfiller, FulfillerId, FulfillerStatus,
        GuildEvent, GuildEventKind, NewQuest, NotificationTarget, Quest, QuestId, QuestTitle,
        Recipient, RequesterId, Reward, StatusOutcome, parse_deadline,
    },
    notice::QuestNotice,
    ports::{GuildStore, Notifier, StoreError},
};
use mockable::Clock;
use std::sync::Arc;

/// Request payload for publishing a quest.
#[derive(Debug, Clone, PartialEq)]
pub struct PublishQuestRequest {
    requester_id: RequesterId,
    title: String,
    description: Option<String>,
    reward: Option<f64>,
    deadline: Option<String>,
}

impl PublishQuestRequest {
    /// Creates a request with the required fields.
    #[must_use]
    pub fn new(requester_id: RequesterId, title: impl Into<String>) -> Self {
        Self {
            requester_id,
            title: title.into(),
            description: None,
            reward: None,
            deadline: None,
        }
    }

    /// Sets the quest description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the reward. Defaults to zero.
    #[must_use]
    pub const fn with_reward(mut self, reward: f64) -> Self {
        self.reward = Some(reward);
        self
    }

    /// Sets the deadline as RFC 3339 or naive ISO-8601 text.
    #[must_use]
    pub fn with_deadline(mut self, deadline: impl Into<String>) -> Self {
        self.deadline = Some(deadline.into());
        self
    }
}

/// Result of a successful confirmation.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfirmedQuest {
    /// The confirmed quest.
    pub quest: Quest,
    /// Fulfiller who completed it.
    pub fulfiller_id: FulfillerId,
}

/// Quest lifecycle orchestration service.
#[derive(Clone)]
pub struct GuildLifecycleService<S, N, C>
where
    S: GuildStore,
    N: Notifier,
    C: Clock + Send + Sync,
{
    pub(super) store: Arc<S>,
    pub(super) notifier: Arc<N>,
    pub(super) clock: Arc<C>,
}

impl<S, N, C> GuildLifecycleService<S, N, C>
where
    S: GuildStore,
    N: Notifier,
    C: Clock + Send + Sync,
{
    /// Creates a new lifecycle service.
    #[must_use]
    pub const fn new(store: Arc<S>, notifier: Arc<N>, clock: Arc<C>) -> Self {
        Self {
            store,
            notifier,
            clock,
        }
    }

    /// Publishes a quest together with its initial unanswered assignment.
    ///
    /// If the quest row is written but the assignment row is not, the quest
    /// stays in place. It has no claimable assignment, so it never shows up
    /// as available.
    ///
    /// # Errors
    ///
    /// Returns [`GuildError::Domain`] for invalid input,
    /// [`GuildError::NotFound`] for an unknown requester, and
    /// [`GuildError::Store`] when either insert fails.
    pub async fn publish(&self, request: PublishQuestRequest) -> GuildResult<Quest> {
        let title = QuestTitle::new(request.title)?;
        let reward = request
            .reward
            .map(Reward::new)
            .transpose()?
            .unwrap_or_default();
        let deadline = request
            .deadline
            .as_deref()
            .map(parse_deadline)
            .transpose()?;

        if self
            .store
            .find_requester(request.requester_id)
            .await?
            .is_none()
        {
            return Err(GuildError::NotFound(MissingEntity::Requester(
                request.requester_id,
            )));
        }

        let quest = Quest::publish(
            NewQuest {
                requester_id: request.requester_id,
                title,
                description: request.description,
                reward,
                deadline,
            },
            &*self.clock,
        );
        self.store.insert_quest(&quest).await?;

        let assignment = Assignment::open(quest.id(), &*self.clock);
        if let Err(err) = self.store.insert_assignment(&assignment).await {
            tracing::error!(
                quest_id = %quest.id(),
                error = %err,
                "quest stored without an assignment; it will never be claimable"
            );
            return Err(err.into());
        }

        tracing::info!(
            quest_id = %quest.id(),
            requester_id = %quest.requester_id(),
            reward = %quest.reward(),
            "quest published"
        );
        self.record(
            GuildEventKind::QuestPublished,
            format!("quest {} published by requester {}", quest.id(), quest.requester_id()),
        )
        .await;
        self.announce_publication(&quest).await;
        Ok(quest)
    }

    /// Binds an idle fulfiller to a quest.
    ///
    /// The fulfiller is marked working first. If the assignment write then
    /// fails, the fulfiller is put back to idle before the error is
    /// returned. Losing the race to another fulfiller surfaces as
    /// [`GuildError::AlreadyClaimed`].
    ///
    /// # Errors
    ///
    /// Returns [`GuildError::NotFound`] for an unknown fulfiller or quest or
    /// a quest without any assignment row, [`GuildError::Domain`] when the
    /// fulfiller is not idle, [`GuildError::QuestClosed`] for a confirmed
    /// quest, [`GuildError::AlreadyClaimed`] when the quest has an active
    /// assignment, and [`GuildError::Store`] when a write fails.
    pub async fn claim(&self, fulfiller_id: FulfillerId, quest_id: QuestId) -> GuildResult<Quest> {
        let mut fulfiller = self.require_fulfiller(fulfiller_id).await?;
        let quest = self.require_quest(quest_id).await?;

        let history = self.store.list_assignments_for_quest(quest_id).await?;
        if history.iter().any(|assignment| assignment.status().is_active()) {
            tracing::debug!(%quest_id, %fulfiller_id, "claim rejected, quest already active");
            return Err(GuildError::AlreadyClaimed(quest_id));
        }
        if history
            .iter()
            .any(|assignment| assignment.status() == AssignmentStatus::Confirmed)
        {
            return Err(GuildError::QuestClosed(quest_id));
        }
        if history.is_empty() {
            return Err(GuildError::NotFound(MissingEntity::OpenAssignment(quest_id)));
        }

        let (assignment, expected) = self.prepare_claim(history, fulfiller_id, quest_id)?;
        fulfiller.begin_work()?;

        self.store
            .update_fulfiller(&fulfiller, FulfillerStatus::Idle)
            .await
            .map_err(|err| match err {
                StoreError::StaleStatus { .. } => GuildError::ConcurrentFulfillerUpdate(fulfiller_id),
                other => GuildError::Store(other),
            })?;

        let written = match expected {
            Some(status) => self.store.update_assignment(&assignment, status).await,
            None => self.store.insert_assignment(&assignment).await,
        };
        if let Err(err) = written {
            self.undo_begin_work(&mut fulfiller, &err).await;
            if err.is_conflict() {
                tracing::info!(%quest_id, %fulfiller_id, "claim lost the race");
                return Err(GuildError::AlreadyClaimed(quest_id));
            }
            return Err(err.into());
        }

        tracing::info!(
            %quest_id,
            %fulfiller_id,
            assignment_id = %assignment.id(),
            "quest claimed"
        );
        self.record(
            GuildEventKind::QuestClaimed,
            format!("quest {quest_id} claimed by fulfiller {fulfiller_id}"),
        )
        .await;
        Ok(quest)
    }

    /// Hands in the work on the quest the fulfiller currently holds.
    ///
    /// The fulfiller stays working until the requester confirms.
    ///
    /// # Errors
    ///
    /// Returns [`GuildError::NotFound`] when the fulfiller holds no ongoing
    /// assignment, [`GuildError::NotQuestHolder`] when it belongs to another
    /// quest, and [`GuildError::ConcurrentAssignmentUpdate`] when the
    /// assignment moved in the meantime.
    pub async fn submit(&self, fulfiller_id: FulfillerId, quest_id: QuestId) -> GuildResult<Quest> {
        let mut assignment = self
            .store
            .find_assignment_for_fulfiller(fulfiller_id, AssignmentStatus::Ongoing)
            .await?
            .ok_or(GuildError::NotFound(MissingEntity::OngoingAssignment(
                fulfiller_id,
            )))?;
        if assignment.quest_id() != quest_id {
            tracing::debug!(
                %fulfiller_id,
                %quest_id,
                held_quest_id = %assignment.quest_id(),
                "submit rejected, quest not held"
            );
            return Err(GuildError::NotQuestHolder {
                fulfiller_id,
                quest_id,
            });
        }
        let quest = self.require_quest(quest_id).await?;

        assignment.submit(&*self.clock)?;
        self.write_transition(&assignment, AssignmentStatus::Ongoing)
            .await?;

        tracing::info!(%quest_id, %fulfiller_id, "quest submitted");
        self.record(
            GuildEventKind::QuestSubmitted,
            format!("quest {quest_id} submitted by fulfiller {fulfiller_id}"),
        )
        .await;
        self.announce_submission(&quest, fulfiller_id).await;
        Ok(quest)
    }

    /// Confirms completion of a submitted quest and releases the fulfiller.
    ///
    /// If releasing the fulfiller fails after the assignment was confirmed,
    /// the confirmation stands and the stuck fulfiller is logged.
    ///
    /// # Errors
    ///
    /// Returns [`GuildError::NotFound`] for an unknown quest or when no
    /// assignment is submitted, [`GuildError::NotQuestOwner`] when the
    /// requester did not publish the quest, and
    /// [`GuildError::ConcurrentAssignmentUpdate`] when the assignment moved
    /// in the meantime.
    pub async fn confirm(
        &self,
        requester_id: RequesterId,
        quest_id: QuestId,
    ) -> GuildResult<ConfirmedQuest> {
        let quest = self.require_quest(quest_id).await?;
        if !quest.is_owned_by(requester_id) {
            tracing::debug!(%requester_id, %quest_id, "confirm rejected, not the owner");
            return Err(GuildError::NotQuestOwner {
                requester_id,
                quest_id,
            });
        }

        let mut assignment = self
            .store
            .list_assignments_for_quest(quest_id)
            .await?
            .into_iter()
            .find(|candidate| candidate.status() == AssignmentStatus::Submitted)
            .ok_or(GuildError::NotFound(MissingEntity::SubmittedAssignment(
                quest_id,
            )))?;
        let fulfiller_id = assignment
            .fulfiller_id()
            .ok_or(GuildError::NotFound(MissingEntity::SubmittedAssignment(
                quest_id,
            )))?;

        assignment.confirm(&*self.clock)?;
        self.write_transition(&assignment, AssignmentStatus::Submitted)
            .await?;
        tracing::info!(%quest_id, %requester_id, %fulfiller_id, "quest confirmed");
        self.record(
            GuildEventKind::QuestConfirmed,
            format!("quest {quest_id} confirmed by requester {requester_id}"),
        )
        .await;

        if let Some(released) = self.release_after_confirmation(fulfiller_id).await {
            self.deliver(
                vec![released.notification_target()],
                QuestNotice::Confirmed { quest: &quest },
            )
            .await;
        }

        Ok(ConfirmedQuest {
            quest,
            fulfiller_id,
        })
    }

    /// Expires an ongoing assignment.
    ///
    /// The bound fulfiller is left as is; resetting it is the caller's
    /// decision, for example through [`Self::resume`].
    ///
    /// # Errors
    ///
    /// Returns [`GuildError::NotFound`] for an unknown assignment and
    /// [`GuildError::Domain`] unless it is ongoing.
    pub async fn expire_assignment(&self, assignment_id: AssignmentId) -> GuildResult<Assignment> {
        let mut assignment = self.require_assignment(assignment_id).await?;
        let prior = assignment.status();
        assignment.expire(&*self.clock)?;
        self.write_transition(&assignment, prior).await?;

        tracing::info!(
            %assignment_id,
            quest_id = %assignment.quest_id(),
            "assignment timed out, fulfiller status unchanged"
        );
        self.record(
            GuildEventKind::AssignmentTimedOut,
            format!("assignment {assignment_id} timed out"),
        )
        .await;
        Ok(assignment)
    }

    /// Terminates an ongoing or submitted assignment.
    ///
    /// The bound fulfiller is left as is.
    ///
    /// # Errors
    ///
    /// Returns [`GuildError::NotFound`] for an unknown assignment and
    /// [`GuildError::Domain`] unless it is active.
    pub async fn force_end_assignment(
        &self,
        assignment_id: AssignmentId,
    ) -> GuildResult<Assignment> {
        let mut assignment = self.require_assignment(assignment_id).await?;
        let prior = assignment.status();
        assignment.force_end(&*self.clock)?;
        self.write_transition(&assignment, prior).await?;

        tracing::info!(
            %assignment_id,
            quest_id = %assignment.quest_id(),
            from = %prior,
            "assignment force-ended, fulfiller status unchanged"
        );
        self.record(
            GuildEventKind::AssignmentForceEnded,
            format!("assignment {assignment_id} force-ended from {prior}"),
        )
        .await;
        Ok(assignment)
    }

    fn prepare_claim(
        &self,
        history: Vec<Assignment>,
        fulfiller_id: FulfillerId,
        quest_id: QuestId,
    ) -> GuildResult<(Assignment, Option<AssignmentStatus>)> {
        let reusable = history
            .into_iter()
            .find(|candidate| candidate.status() == AssignmentStatus::Unanswered);
        let (mut assignment, expected) = match reusable {
            Some(open) => (open, Some(AssignmentStatus::Unanswered)),
            None => (Assignment::open(quest_id, &*self.clock), None),
        };
        assignment.claim(fulfiller_id, &*self.clock)?;
        Ok((assignment, expected))
    }

    async fn undo_begin_work(&self, fulfiller: &mut Fulfiller, cause: &StoreError) {
        fulfiller.finish_work();
        match self
            .store
            .update_fulfiller(fulfiller, FulfillerStatus::Working)
            .await
        {
            Ok(()) => tracing::warn!(
                fulfiller_id = %fulfiller.id(),
                error = %cause,
                "assignment write failed, fulfiller returned to idle"
            ),
            Err(err) => tracing::error!(
                fulfiller_id = %fulfiller.id(),
                error = %err,
                cause = %cause,
                "claim compensation failed, fulfiller left working without an assignment"
            ),
        }
    }

    async fn release_after_confirmation(&self, fulfiller_id: FulfillerId) -> Option<Fulfiller> {
        let mut fulfiller = match self.store.find_fulfiller(fulfiller_id).await {
            Ok(Some(found)) => found,
            Ok(None) => {
                tracing::error!(%fulfiller_id, "confirmed quest references a missing fulfiller");
                return None;
            }
            Err(err) => {
                tracing::error!(
                    %fulfiller_id,
                    error = %err,
                    "quest confirmed but fulfiller could not be loaded, left working"
                );
                return None;
            }
        };

        if fulfiller.finish_work() == StatusOutcome::Unchanged {
            tracing::warn!(
                %fulfiller_id,
                status = %fulfiller.status(),
                "fulfiller was not working at confirmation, no release notice sent"
            );
            return None;
        }

        match self
            .store
            .update_fulfiller(&fulfiller, FulfillerStatus::Working)
            .await
        {
            Ok(()) => Some(fulfiller),
            Err(err) => {
                tracing::error!(
                    %fulfiller_id,
                    error = %err,
                    "quest confirmed but fulfiller release failed, left working"
                );
                None
            }
        }
    }

    async fn write_transition(
        &self,
        assignment: &Assignment,
        expected: AssignmentStatus,
    ) -> GuildResult<()> {
        self.store
            .update_assignment(assignment, expected)
            .await
            .map_err(|err| match err {
                StoreError::StaleStatus { .. } => {
                    GuildError::ConcurrentAssignmentUpdate(assignment.id())
                }
                other => GuildError::Store(other),
            })
    }

    async fn announce_publication(&self, quest: &Quest) {
        match self
            .store
            .list_fulfillers_by_status(FulfillerStatus::Idle)
            .await
        {
            Ok(idle) => {
                let recipients = idle.iter().map(Recipient::notification_target).collect();
                self.deliver(recipients, QuestNotice::Published { quest })
                    .await;
            }
            Err(err) => tracing::warn!(
                quest_id = %quest.id(),
                error = %err,
                "could not list idle fulfillers for publication notice"
            ),
        }
    }

    async fn announce_submission(&self, quest: &Quest, fulfiller_id: FulfillerId) {
        let requester = match self.store.find_requester(quest.requester_id()).await {
            Ok(Some(found)) => found,
            Ok(None) => return,
            Err(err) => {
                tracing::warn!(
                    quest_id = %quest.id(),
                    error = %err,
                    "could not load requester for submission notice"
                );
                return;
            }
        };
        let fulfiller_name = match self.store.find_fulfiller(fulfiller_id).await {
            Ok(Some(fulfiller)) => fulfiller.display_name().as_str().to_owned(),
            Ok(None) => fulfiller_id.to_string(),
            Err(err) => {
                tracing::warn!(
                    quest_id = %quest.id(),
                    %fulfiller_id,
                    error = %err,
                    "could not load fulfiller name for submission notice"
                );
                fulfiller_id.to_string()
            }
        };
        self.deliver(
            vec![requester.notification_target()],
            QuestNotice::AwaitingConfirmation {
                quest,
                fulfiller: &fulfiller_name,
            },
        )
        .await;
    }

    pub(super) async fn deliver(
        &self,
        recipients: Vec<NotificationTarget>,
        notice: QuestNotice<'_>,
    ) {
        if recipients.is_empty() {
            return;
        }
        let message = match notice.render() {
            Ok(text) => text,
            Err(err) => {
                tracing::warn!(error = %err, "notice not sent");
                return;
            }
        };
        if let Err(err) = self.notifier.notify(&recipients, &message).await {
            tracing::warn!(
                notice = notice.name(),
                recipients = recipients.len(),
                error = %err,
                "notification delivery failed"
            );
        }
    }

    pub(super) async fn record(&self, kind: GuildEventKind, detail: String) {
        let event = GuildEvent::record(kind, detail, &*self.clock);
        if let Err(err) = self.store.append_event(&event).await {
            tracing::warn!(event = %kind, error = %err, "failed to append guild event");
        }
    }

    pub(super) async fn require_fulfiller(&self, id: FulfillerId) -> GuildResult<Fulfiller> {
        self.store
            .find_fulfiller(id)
            .await?
            .ok_or(GuildError::NotFound(MissingEntity::Fulfiller(id)))
    }

    pub(super) async fn require_quest(&self, id: QuestId) -> GuildResult<Quest> {
        self.store
            .find_quest(id)
            .await?
            .ok_or(GuildError::NotFound(MissingEntity::Quest(id)))
    }

    async fn require_assignment(&self, id: AssignmentId) -> GuildResult<Assignment> {
        self.store
            .find_assignment(id)
            .await?
            .ok_or(GuildError::NotFound(MissingEntity::Assignment(id)))
    }
}
