//! Fulfiller self-service availability changes.

use super::{
    error::{GuildError, GuildResult},
    lifecycle::GuildLifecycleService,
};
use crate::quest::{
    domain::{
        AssignmentStatus, Fulfiller, FulfillerId, FulfillerStatus, GuildEventKind, StatusOutcome,
    },
    ports::{GuildStore, Notifier, StoreError},
};
use mockable::Clock;

/// Result of a self-service status request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FulfillerStatusChange {
    /// The fulfiller after the request.
    pub fulfiller: Fulfiller,
    /// Whether anything changed.
    pub outcome: StatusOutcome,
}

impl<S, N, C> GuildLifecycleService<S, N, C>
where
    S: GuildStore,
    N: Notifier,
    C: Clock + Send + Sync,
{
    /// Moves an idle fulfiller to resting.
    ///
    /// # Errors
    ///
    /// Returns [`GuildError::Domain`] unless the fulfiller is idle.
    pub async fn rest(&self, fulfiller_id: FulfillerId) -> GuildResult<FulfillerStatusChange> {
        let mut fulfiller = self.require_fulfiller(fulfiller_id).await?;
        let prior = fulfiller.status();
        let outcome = fulfiller.rest()?;
        self.persist_status(fulfiller, prior, outcome).await
    }

    /// Returns a fulfiller to idle.
    ///
    /// A working fulfiller is only released once none of their assignments
    /// is ongoing or submitted, which covers recovery after a timeout, a
    /// force-end, or a failed release on confirmation.
    ///
    /// # Errors
    ///
    /// Returns [`GuildError::Domain`] when the fulfiller departed or still
    /// holds an active assignment.
    pub async fn resume(&self, fulfiller_id: FulfillerId) -> GuildResult<FulfillerStatusChange> {
        let mut fulfiller = self.require_fulfiller(fulfiller_id).await?;
        let prior = fulfiller.status();
        let holds_active = self.holds_active_assignment(fulfiller_id).await?;
        let outcome = fulfiller.resume(holds_active)?;
        self.persist_status(fulfiller, prior, outcome).await
    }

    /// Marks a fulfiller as departed. Idempotent.
    ///
    /// An assignment the fulfiller still holds is not released.
    ///
    /// # Errors
    ///
    /// Returns [`GuildError::NotFound`] for an unknown fulfiller.
    pub async fn depart(&self, fulfiller_id: FulfillerId) -> GuildResult<FulfillerStatusChange> {
        let mut fulfiller = self.require_fulfiller(fulfiller_id).await?;
        let prior = fulfiller.status();
        let outcome = fulfiller.depart();
        if outcome == StatusOutcome::Changed
            && self.holds_active_assignment(fulfiller_id).await?
        {
            tracing::warn!(%fulfiller_id, "fulfiller departed while holding an active assignment");
        }
        self.persist_status(fulfiller, prior, outcome).await
    }

    async fn holds_active_assignment(&self, fulfiller_id: FulfillerId) -> GuildResult<bool> {
        for status in [AssignmentStatus::Ongoing, AssignmentStatus::Submitted] {
            if self
                .store
                .find_assignment_for_fulfiller(fulfiller_id, status)
                .await?
                .is_some()
            {
                return Ok(true);
            }
        }
        Ok(false)
    }

    async fn persist_status(
        &self,
        fulfiller: Fulfiller,
        prior: FulfillerStatus,
        outcome: StatusOutcome,
    ) -> GuildResult<FulfillerStatusChange> {
        if outcome == StatusOutcome::Changed {
            self.store
                .update_fulfiller(&fulfiller, prior)
                .await
                .map_err(|err| match err {
                    StoreError::StaleStatus { .. } => {
                        GuildError::ConcurrentFulfillerUpdate(fulfiller.id())
                    }
                    other => GuildError::Store(other),
                })?;
            tracing::info!(
                fulfiller_id = %fulfiller.id(),
                from = %prior,
                to = %fulfiller.status(),
                "fulfiller status changed"
            );
            self.record(
                GuildEventKind::FulfillerStatusChanged,
                format!("fulfiller {}: {prior} -> {}", fulfiller.id(), fulfiller.status()),
            )
            .await;
        }
        Ok(FulfillerStatusChange { fulfiller, outcome })
    }
}
