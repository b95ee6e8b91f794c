//! Shared test helpers for in-memory lifecycle integration tests.

use std::collections::BTreeMap;
use std::sync::Arc;

use eyre::WrapErr;
use mockable::DefaultClock;
use questboard::config::NotificationConfig;
use questboard::quest::{
    adapters::memory::{InMemoryGuildStore, InMemoryNotifier},
    domain::{AssignmentStatus, FulfillerId, FulfillerStatus, QuestId, RequesterId},
    ports::{AssignmentRepository, FulfillerRepository},
    services::{
        GuildLifecycleService, PublishQuestRequest, RegisterMemberRequest, RegistrationService,
    },
};
use rstest::fixture;

/// Lifecycle service wired to in-memory adapters.
pub type TestService = GuildLifecycleService<InMemoryGuildStore, InMemoryNotifier, DefaultClock>;

/// Services and adapters sharing one in-memory store.
pub struct Guild {
    pub store: Arc<InMemoryGuildStore>,
    pub notifier: Arc<InMemoryNotifier>,
    pub service: Arc<TestService>,
    pub registration: RegistrationService<InMemoryGuildStore, DefaultClock>,
}

/// Provides a fresh guild for each test.
#[fixture]
pub fn guild() -> Guild {
    let store = Arc::new(InMemoryGuildStore::new());
    let notifier = Arc::new(InMemoryNotifier::new(NotificationConfig {
        platform_accounts: BTreeMap::from([("telegram".to_owned(), "guild-bot".to_owned())]),
    }));
    let clock = Arc::new(DefaultClock);
    let service = Arc::new(GuildLifecycleService::new(
        Arc::clone(&store),
        Arc::clone(&notifier),
        Arc::clone(&clock),
    ));
    let registration = RegistrationService::new(Arc::clone(&store), clock);
    Guild {
        store,
        notifier,
        service,
        registration,
    }
}

impl Guild {
    /// Registers a fulfiller on the telegram platform.
    ///
    /// # Errors
    ///
    /// Returns an error if registration fails.
    pub async fn fulfiller(&self, name: &str, handle: &str) -> eyre::Result<FulfillerId> {
        let fulfiller = self
            .registration
            .register_fulfiller(RegisterMemberRequest::new(name, "telegram", handle))
            .await
            .wrap_err_with(|| format!("register fulfiller {name}"))?;
        Ok(fulfiller.id())
    }

    /// Registers a requester on the telegram platform.
    ///
    /// # Errors
    ///
    /// Returns an error if registration fails.
    pub async fn requester(&self, name: &str, handle: &str) -> eyre::Result<RequesterId> {
        let requester = self
            .registration
            .register_requester(RegisterMemberRequest::new(name, "telegram", handle))
            .await
            .wrap_err_with(|| format!("register requester {name}"))?;
        Ok(requester.id())
    }

    /// Publishes a quest with a fixed reward.
    ///
    /// # Errors
    ///
    /// Returns an error if publication fails.
    pub async fn publish(&self, requester_id: RequesterId, title: &str) -> eyre::Result<QuestId> {
        let quest = self
            .service
            .publish(PublishQuestRequest::new(requester_id, title).with_reward(50.0))
            .await
            .wrap_err_with(|| format!("publish {title}"))?;
        Ok(quest.id())
    }

    /// Reads a fulfiller's stored status.
    ///
    /// # Errors
    ///
    /// Returns an error if the fulfiller is missing or the lookup fails.
    pub async fn status_of(&self, fulfiller_id: FulfillerId) -> eyre::Result<FulfillerStatus> {
        let fulfiller = self
            .store
            .find_fulfiller(fulfiller_id)
            .await?
            .ok_or_else(|| eyre::eyre!("fulfiller {fulfiller_id} missing"))?;
        Ok(fulfiller.status())
    }

    /// Lists the statuses of a quest's assignments in creation order.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup fails.
    pub async fn assignment_statuses(&self, quest_id: QuestId) -> eyre::Result<Vec<AssignmentStatus>> {
        Ok(self
            .store
            .list_assignments_for_quest(quest_id)
            .await?
            .iter()
            .map(|assignment| assignment.status())
            .collect())
    }
}
