//! Cross-entity properties checked after mixed operation sequences.

use std::collections::HashMap;

use super::helpers::{Guild, guild};
use eyre::{bail, ensure};
use questboard::quest::{
    domain::{AssignmentStatus, FulfillerId, FulfillerStatus, QuestId, RequesterId},
    ports::{AssignmentRepository, FulfillerRepository},
    services::{ErrorKind, GuildError},
};
use rstest::rstest;

/// Fails if any quest has more than one ongoing or submitted assignment.
async fn assert_single_active_per_quest(guild: &Guild) -> eyre::Result<()> {
    let mut active: HashMap<QuestId, usize> = HashMap::new();
    for assignment in guild.store.list_assignments().await? {
        if assignment.status().is_active() {
            *active.entry(assignment.quest_id()).or_default() += 1;
        }
    }
    if let Some((quest_id, count)) = active.iter().find(|(_, count)| **count > 1) {
        bail!("quest {quest_id} has {count} active assignments");
    }
    Ok(())
}

/// Fails if a fulfiller is working without an active assignment or vice versa.
async fn assert_working_matches_assignments(guild: &Guild) -> eyre::Result<()> {
    let assignments = guild.store.list_assignments().await?;
    for status in [
        FulfillerStatus::Idle,
        FulfillerStatus::Working,
        FulfillerStatus::Resting,
    ] {
        for fulfiller in guild.store.list_fulfillers_by_status(status).await? {
            let holds_active = assignments.iter().any(|assignment| {
                assignment.is_held_by(fulfiller.id()) && assignment.status().is_active()
            });
            ensure!(
                (status == FulfillerStatus::Working) == holds_active,
                "fulfiller {} is {status} while holding active assignment: {holds_active}",
                fulfiller.id()
            );
        }
    }
    Ok(())
}

async fn check_all(guild: &Guild) -> eyre::Result<()> {
    assert_single_active_per_quest(guild).await?;
    assert_working_matches_assignments(guild).await
}

struct Cast {
    requester: RequesterId,
    fulfillers: Vec<FulfillerId>,
    quests: Vec<QuestId>,
}

async fn cast(guild: &Guild) -> eyre::Result<Cast> {
    let requester = guild.requester("Mira", "100").await?;
    let mut fulfillers = Vec::new();
    for (name, handle) in [("Ayla", "200"), ("Bram", "201"), ("Cato", "202")] {
        fulfillers.push(guild.fulfiller(name, handle).await?);
    }
    let mut quests = Vec::new();
    for title in ["Well", "Bridge"] {
        quests.push(guild.publish(requester, title).await?);
    }
    Ok(Cast {
        requester,
        fulfillers,
        quests,
    })
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn properties_hold_through_claim_submit_confirm(guild: Guild) -> eyre::Result<()> {
    let Cast {
        requester,
        fulfillers,
        quests,
    } = cast(&guild).await?;
    let (Some(&ayla), Some(&bram), Some(&cato)) =
        (fulfillers.first(), fulfillers.get(1), fulfillers.get(2))
    else {
        bail!("cast should have three fulfillers");
    };
    let (Some(&well), Some(&bridge)) = (quests.first(), quests.get(1)) else {
        bail!("cast should have two quests");
    };
    check_all(&guild).await?;

    guild.service.claim(ayla, well).await?;
    check_all(&guild).await?;
    let refused = guild.service.claim(bram, well).await;
    ensure!(matches!(refused, Err(GuildError::AlreadyClaimed(_))));
    check_all(&guild).await?;

    guild.service.claim(bram, bridge).await?;
    guild.service.rest(cato).await?;
    check_all(&guild).await?;

    guild.service.submit(ayla, well).await?;
    check_all(&guild).await?;
    guild.service.confirm(requester, well).await?;
    check_all(&guild).await?;

    guild.service.submit(bram, bridge).await?;
    guild.service.confirm(requester, bridge).await?;
    guild.service.resume(cato).await?;
    check_all(&guild).await?;
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn properties_hold_after_timeout_and_resume(guild: Guild) -> eyre::Result<()> {
    let Cast {
        fulfillers, quests, ..
    } = cast(&guild).await?;
    let (Some(&ayla), Some(&bram)) = (fulfillers.first(), fulfillers.get(1)) else {
        bail!("cast should have fulfillers");
    };
    let Some(&well) = quests.first() else {
        bail!("cast should have quests");
    };

    guild.service.claim(ayla, well).await?;
    let Some(held) = guild.service.active_assignment_for(ayla).await? else {
        bail!("expected an ongoing assignment");
    };
    guild.service.expire_assignment(held.id()).await?;
    guild.service.resume(ayla).await?;
    check_all(&guild).await?;

    guild.service.claim(bram, well).await?;
    check_all(&guild).await?;
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn terminal_assignments_never_move(guild: Guild) -> eyre::Result<()> {
    let Cast {
        requester,
        fulfillers,
        quests,
    } = cast(&guild).await?;
    let (Some(&ayla), Some(&bram)) = (fulfillers.first(), fulfillers.get(1)) else {
        bail!("cast should have fulfillers");
    };
    let (Some(&well), Some(&bridge)) = (quests.first(), quests.get(1)) else {
        bail!("cast should have two quests");
    };

    guild.service.claim(ayla, well).await?;
    guild.service.submit(ayla, well).await?;
    guild.service.confirm(requester, well).await?;
    guild.service.claim(bram, bridge).await?;
    let Some(ended) = guild.service.active_assignment_for(bram).await? else {
        bail!("expected an ongoing assignment");
    };
    guild.service.force_end_assignment(ended.id()).await?;
    guild.service.resume(bram).await?;

    let terminal: Vec<_> = guild
        .store
        .list_assignments()
        .await?
        .into_iter()
        .filter(|assignment| assignment.status().is_terminal())
        .collect();
    ensure!(terminal.len() == 2);

    for assignment in &terminal {
        let expire = guild.service.expire_assignment(assignment.id()).await;
        let force_end = guild.service.force_end_assignment(assignment.id()).await;
        ensure!(matches!(expire, Err(GuildError::Domain(_))));
        ensure!(matches!(force_end, Err(GuildError::Domain(_))));
    }
    let resubmit = guild.service.submit(ayla, well).await;
    let reconfirm = guild.service.confirm(requester, well).await;
    let reclaim = guild.service.claim(ayla, well).await;
    ensure!(resubmit.is_err() && reconfirm.is_err());
    ensure!(matches!(reclaim, Err(GuildError::QuestClosed(_))));

    for assignment in terminal {
        let stored = guild
            .store
            .find_assignment(assignment.id())
            .await?
            .ok_or_else(|| eyre::eyre!("assignment vanished"))?;
        ensure!(stored.status() == assignment.status());
    }
    ensure!(guild.assignment_statuses(well).await? == vec![AssignmentStatus::Confirmed]);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn ownership_is_enforced(guild: Guild) -> eyre::Result<()> {
    let Cast {
        requester,
        fulfillers,
        quests,
    } = cast(&guild).await?;
    let intruder = guild.requester("Otto", "101").await?;
    let (Some(&ayla), Some(&bram)) = (fulfillers.first(), fulfillers.get(1)) else {
        bail!("cast should have fulfillers");
    };
    let (Some(&well), Some(&bridge)) = (quests.first(), quests.get(1)) else {
        bail!("cast should have two quests");
    };
    guild.service.claim(ayla, well).await?;
    guild.service.claim(bram, bridge).await?;

    let cross_submit = guild.service.submit(bram, well).await;
    ensure!(matches!(cross_submit, Err(ref err) if err.kind() == ErrorKind::Ownership));

    guild.service.submit(ayla, well).await?;
    let foreign_confirm = guild.service.confirm(intruder, well).await;
    ensure!(matches!(foreign_confirm, Err(ref err) if err.kind() == ErrorKind::Ownership));

    guild.service.confirm(requester, well).await?;
    check_all(&guild).await?;
    Ok(())
}
