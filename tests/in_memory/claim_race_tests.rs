//! Concurrent claim tests.

use std::sync::Arc;

use super::gated_store::GatedStore;
use super::helpers::{Guild, guild};
use eyre::{WrapErr, bail, ensure};
use mockable::DefaultClock;
use questboard::config::NotificationConfig;
use questboard::quest::{
    adapters::memory::InMemoryNotifier,
    domain::{AssignmentStatus, FulfillerId, FulfillerStatus, GuildEventKind, QuestId},
    ports::{AssignmentRepository, EventLogRepository, FulfillerRepository},
    services::{
        GuildError, GuildLifecycleService, PublishQuestRequest, RegisterMemberRequest,
        RegistrationService,
    },
};
use rstest::rstest;

async fn race(
    guild: &Guild,
    claimants: &[FulfillerId],
    quest_id: QuestId,
) -> eyre::Result<Vec<(FulfillerId, Result<(), GuildError>)>> {
    let handles: Vec<_> = claimants
        .iter()
        .map(|&fulfiller_id| {
            let service = Arc::clone(&guild.service);
            tokio::spawn(async move {
                let outcome = service.claim(fulfiller_id, quest_id).await.map(|_| ());
                (fulfiller_id, outcome)
            })
        })
        .collect();

    let mut outcomes = Vec::with_capacity(handles.len());
    for handle in handles {
        outcomes.push(handle.await.wrap_err("claim task panicked")?);
    }
    Ok(outcomes)
}

async fn stored_status(store: &GatedStore, fulfiller_id: FulfillerId) -> eyre::Result<FulfillerStatus> {
    store
        .find_fulfiller(fulfiller_id)
        .await?
        .map(|fulfiller| fulfiller.status())
        .ok_or_else(|| eyre::eyre!("fulfiller {fulfiller_id} missing"))
}

#[rstest]
#[case(2)]
#[case(8)]
#[tokio::test(flavor = "multi_thread")]
async fn exactly_one_concurrent_claim_wins(
    guild: Guild,
    #[case] claimant_count: usize,
) -> eyre::Result<()> {
    let requester = guild.requester("Mira", "100").await?;
    let mut claimants = Vec::with_capacity(claimant_count);
    for index in 0..claimant_count {
        claimants.push(
            guild
                .fulfiller(&format!("Fulfiller {index}"), &format!("2{index:02}"))
                .await?,
        );
    }
    let quest_id = guild.publish(requester, "Clear the well").await?;

    let outcomes = race(&guild, &claimants, quest_id).await?;

    let winners: Vec<FulfillerId> = outcomes
        .iter()
        .filter(|(_, outcome)| outcome.is_ok())
        .map(|(fulfiller_id, _)| *fulfiller_id)
        .collect();
    ensure!(winners.len() == 1, "expected one winner, got {}", winners.len());

    for (fulfiller_id, outcome) in &outcomes {
        let status = guild.status_of(*fulfiller_id).await?;
        if winners.contains(fulfiller_id) {
            ensure!(status == FulfillerStatus::Working);
            continue;
        }
        ensure!(
            matches!(outcome, Err(GuildError::AlreadyClaimed(id)) if *id == quest_id),
            "loser got {outcome:?}"
        );
        ensure!(status == FulfillerStatus::Idle, "loser left in {status}");
    }

    ensure!(guild.assignment_statuses(quest_id).await? == vec![AssignmentStatus::Ongoing]);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn concurrent_claims_on_distinct_quests_all_succeed(guild: Guild) -> eyre::Result<()> {
    let requester = guild.requester("Mira", "100").await?;
    let mut pairs = Vec::new();
    for index in 0..4 {
        let fulfiller_id = guild
            .fulfiller(&format!("Fulfiller {index}"), &format!("3{index:02}"))
            .await?;
        let quest_id = guild.publish(requester, &format!("Quest {index}")).await?;
        pairs.push((fulfiller_id, quest_id));
    }

    let handles: Vec<_> = pairs
        .iter()
        .map(|&(fulfiller_id, quest_id)| {
            let service = Arc::clone(&guild.service);
            tokio::spawn(async move { service.claim(fulfiller_id, quest_id).await.map(|_| ()) })
        })
        .collect();
    for handle in handles {
        handle.await.wrap_err("claim task panicked")??;
    }

    ensure!(guild.service.available_quests().await?.is_empty());
    for (fulfiller_id, _) in pairs {
        ensure!(guild.status_of(fulfiller_id).await? == FulfillerStatus::Working);
    }
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn claimant_losing_the_assignment_write_is_put_back_to_idle() -> eyre::Result<()> {
    let store = Arc::new(GatedStore::new(2));
    let clock = Arc::new(DefaultClock);
    let service = GuildLifecycleService::new(
        Arc::clone(&store),
        Arc::new(InMemoryNotifier::new(NotificationConfig::default())),
        Arc::clone(&clock),
    );
    let registration = RegistrationService::new(Arc::clone(&store), clock);
    let requester = registration
        .register_requester(RegisterMemberRequest::new("Mira", "telegram", "100"))
        .await?;
    let first = registration
        .register_fulfiller(RegisterMemberRequest::new("Ayla", "telegram", "200"))
        .await?
        .id();
    let second = registration
        .register_fulfiller(RegisterMemberRequest::new("Bram", "telegram", "201"))
        .await?
        .id();
    let quest_id = service
        .publish(PublishQuestRequest::new(requester.id(), "Clear the well"))
        .await?
        .id();

    store.arm();
    let (first_outcome, second_outcome) = tokio::join!(
        service.claim(first, quest_id),
        service.claim(second, quest_id)
    );
    store.disarm();

    let (winner, loser, lost) = match (first_outcome, second_outcome) {
        (Ok(_), Err(err)) => (first, second, err),
        (Err(err), Ok(_)) => (second, first, err),
        (first_result, second_result) => {
            bail!("expected one winner, got {first_result:?} and {second_result:?}")
        }
    };
    ensure!(
        matches!(lost, GuildError::AlreadyClaimed(id) if id == quest_id),
        "loser got {lost:?}"
    );

    ensure!(stored_status(&store, winner).await? == FulfillerStatus::Working);
    ensure!(stored_status(&store, loser).await? == FulfillerStatus::Idle);

    let statuses: Vec<_> = store
        .list_assignments_for_quest(quest_id)
        .await?
        .iter()
        .map(|assignment| assignment.status())
        .collect();
    ensure!(statuses == vec![AssignmentStatus::Ongoing]);
    let claimed_events = store
        .list_events()
        .await?
        .iter()
        .filter(|event| event.kind() == GuildEventKind::QuestClaimed)
        .count();
    ensure!(claimed_events == 1);
    Ok(())
}
