//! End-to-end lifecycle flows over the in-memory adapters.

use super::helpers::{Guild, guild};
use eyre::{bail, ensure};
use questboard::quest::{
    domain::{AssignmentStatus, FulfillerStatus, GuildEventKind},
    services::{ErrorKind, GuildError, MissingEntity, PublishQuestRequest},
};
use rstest::rstest;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn full_lifecycle_publish_to_confirm(guild: Guild) -> eyre::Result<()> {
    let requester = guild.requester("Mira", "100").await?;
    let first = guild.fulfiller("Ayla", "200").await?;
    let second = guild.fulfiller("Bram", "201").await?;

    let quest = guild
        .service
        .publish(PublishQuestRequest::new(requester, "Clear the well").with_reward(50.0))
        .await?;
    ensure!(guild.assignment_statuses(quest.id()).await? == vec![AssignmentStatus::Unanswered]);
    ensure!(guild.service.available_quests().await? == vec![quest.clone()]);

    guild.service.claim(first, quest.id()).await?;
    ensure!(guild.status_of(first).await? == FulfillerStatus::Working);
    ensure!(guild.assignment_statuses(quest.id()).await? == vec![AssignmentStatus::Ongoing]);
    ensure!(guild.service.available_quests().await?.is_empty());
    let late = guild.service.claim(second, quest.id()).await;
    ensure!(matches!(late, Err(GuildError::AlreadyClaimed(_))));

    guild.service.submit(first, quest.id()).await?;
    ensure!(guild.assignment_statuses(quest.id()).await? == vec![AssignmentStatus::Submitted]);
    ensure!(guild.status_of(first).await? == FulfillerStatus::Working);

    guild.service.confirm(requester, quest.id()).await?;
    ensure!(guild.assignment_statuses(quest.id()).await? == vec![AssignmentStatus::Confirmed]);
    ensure!(guild.status_of(first).await? == FulfillerStatus::Idle);

    let repeat = guild.service.confirm(requester, quest.id()).await;
    match repeat {
        Err(GuildError::NotFound(MissingEntity::SubmittedAssignment(id))) => {
            ensure!(id == quest.id());
        }
        other => bail!("expected missing submitted assignment, got {other:?}"),
    }
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn rest_is_refused_until_work_is_confirmed(guild: Guild) -> eyre::Result<()> {
    let requester = guild.requester("Mira", "100").await?;
    let fulfiller = guild.fulfiller("Ayla", "200").await?;
    let quest = guild.publish(requester, "Clear the well").await?;
    guild.service.claim(fulfiller, quest).await?;

    let busy = guild.service.rest(fulfiller).await;
    ensure!(matches!(busy, Err(ref err) if err.kind() == ErrorKind::Validation));

    guild.service.submit(fulfiller, quest).await?;
    guild.service.confirm(requester, quest).await?;
    let rested = guild.service.rest(fulfiller).await?;

    ensure!(rested.fulfiller.status() == FulfillerStatus::Resting);
    ensure!(guild.status_of(fulfiller).await? == FulfillerStatus::Resting);
    ensure!(guild.service.idle_fulfillers().await?.is_empty());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn notices_reach_each_party_in_order(guild: Guild) -> eyre::Result<()> {
    let requester = guild.requester("Mira", "100").await?;
    let fulfiller = guild.fulfiller("Ayla", "200").await?;
    let quest = guild.publish(requester, "Clear the well").await?;
    guild.service.claim(fulfiller, quest).await?;
    guild.service.submit(fulfiller, quest).await?;
    guild.service.confirm(requester, quest).await?;

    let addresses: Vec<String> = guild
        .notifier
        .deliveries()
        .into_iter()
        .map(|delivery| delivery.address)
        .collect();

    ensure!(
        addresses
            == vec![
                "guild-bot:FriendMessage:200".to_owned(),
                "guild-bot:FriendMessage:100".to_owned(),
                "guild-bot:FriendMessage:200".to_owned(),
            ]
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn audit_log_follows_the_lifecycle(guild: Guild) -> eyre::Result<()> {
    let requester = guild.requester("Mira", "100").await?;
    let fulfiller = guild.fulfiller("Ayla", "200").await?;
    let quest = guild.publish(requester, "Clear the well").await?;
    guild.service.claim(fulfiller, quest).await?;
    guild.service.submit(fulfiller, quest).await?;
    guild.service.confirm(requester, quest).await?;

    let kinds: Vec<GuildEventKind> = guild
        .service
        .events()
        .await?
        .iter()
        .map(|event| event.kind())
        .collect();

    ensure!(
        kinds
            == vec![
                GuildEventKind::RequesterRegistered,
                GuildEventKind::FulfillerRegistered,
                GuildEventKind::QuestPublished,
                GuildEventKind::QuestClaimed,
                GuildEventKind::QuestSubmitted,
                GuildEventKind::QuestConfirmed,
            ]
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn requester_sees_only_own_quests(guild: Guild) -> eyre::Result<()> {
    let mira = guild.requester("Mira", "100").await?;
    let otto = guild.requester("Otto", "101").await?;
    let first = guild.publish(mira, "First").await?;
    guild.publish(otto, "Other").await?;
    let second = guild.publish(mira, "Second").await?;

    let ids: Vec<_> = guild
        .service
        .quests_for_requester(mira)
        .await?
        .iter()
        .map(|quest| quest.id())
        .collect();

    ensure!(ids == vec![first, second]);
    ensure!(guild.service.available_quests().await?.len() == 3);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn force_ended_quest_returns_to_the_board(guild: Guild) -> eyre::Result<()> {
    let requester = guild.requester("Mira", "100").await?;
    let first = guild.fulfiller("Ayla", "200").await?;
    let second = guild.fulfiller("Bram", "201").await?;
    let quest = guild.publish(requester, "Clear the well").await?;
    guild.service.claim(first, quest).await?;
    guild.service.submit(first, quest).await?;
    let assignments = guild.service.assignments_for_quest(quest).await?;
    let Some(submitted) = assignments.first() else {
        bail!("expected an assignment row");
    };

    guild.service.force_end_assignment(submitted.id()).await?;
    ensure!(guild.service.available_quests().await?.len() == 1);
    guild.service.resume(first).await?;
    guild.service.claim(second, quest).await?;

    ensure!(
        guild.assignment_statuses(quest).await?
            == vec![AssignmentStatus::ForcedEnd, AssignmentStatus::Ongoing]
    );
    ensure!(guild.status_of(first).await? == FulfillerStatus::Idle);
    ensure!(guild.status_of(second).await? == FulfillerStatus::Working);
    Ok(())
}
