//! Shared world state for quest lifecycle BDD scenarios.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use mockable::DefaultClock;
use questboard::config::NotificationConfig;
use questboard::quest::{
    adapters::memory::{InMemoryGuildStore, InMemoryNotifier},
    domain::{FulfillerId, QuestId, RequesterId},
    services::{GuildError, GuildLifecycleService, RegistrationService},
};
use rstest::fixture;

/// Service type used by the BDD world.
pub type TestGuildService =
    GuildLifecycleService<InMemoryGuildStore, InMemoryNotifier, DefaultClock>;

/// Scenario world for quest lifecycle behaviour tests.
pub struct QuestWorld {
    pub store: Arc<InMemoryGuildStore>,
    pub service: TestGuildService,
    pub registration: RegistrationService<InMemoryGuildStore, DefaultClock>,
    pub fulfillers: HashMap<String, FulfillerId>,
    pub requesters: HashMap<String, RequesterId>,
    pub quest: Option<QuestId>,
    pub last_result: Option<Result<(), GuildError>>,
}

impl QuestWorld {
    /// Creates a world with an empty guild.
    #[must_use]
    pub fn new() -> Self {
        let store = Arc::new(InMemoryGuildStore::new());
        let notifier = Arc::new(InMemoryNotifier::new(NotificationConfig {
            platform_accounts: BTreeMap::from([("telegram".to_owned(), "guild-bot".to_owned())]),
        }));
        let clock = Arc::new(DefaultClock);
        Self {
            service: GuildLifecycleService::new(Arc::clone(&store), notifier, Arc::clone(&clock)),
            registration: RegistrationService::new(Arc::clone(&store), clock),
            store,
            fulfillers: HashMap::new(),
            requesters: HashMap::new(),
            quest: None,
            last_result: None,
        }
    }

    /// Looks up a fulfiller registered earlier in the scenario.
    ///
    /// # Errors
    ///
    /// Returns an error if no fulfiller has that name.
    pub fn fulfiller(&self, name: &str) -> eyre::Result<FulfillerId> {
        self.fulfillers
            .get(name)
            .copied()
            .ok_or_else(|| eyre::eyre!("no fulfiller named {name} in scenario world"))
    }

    /// Looks up a requester registered earlier in the scenario.
    ///
    /// # Errors
    ///
    /// Returns an error if no requester has that name.
    pub fn requester(&self, name: &str) -> eyre::Result<RequesterId> {
        self.requesters
            .get(name)
            .copied()
            .ok_or_else(|| eyre::eyre!("no requester named {name} in scenario world"))
    }

    /// Returns the quest published in the scenario.
    ///
    /// # Errors
    ///
    /// Returns an error if nothing has been published yet.
    pub fn quest(&self) -> eyre::Result<QuestId> {
        self.quest
            .ok_or_else(|| eyre::eyre!("missing published quest in scenario world"))
    }
}

impl Default for QuestWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> QuestWorld {
    QuestWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
