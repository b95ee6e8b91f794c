//! Then steps for quest lifecycle BDD scenarios.

use super::world::{QuestWorld, run_async};
use questboard::quest::{
    domain::{AssignmentStatus, FulfillerStatus},
    ports::{AssignmentRepository, FulfillerRepository},
    services::ErrorKind,
};
use rstest_bdd_macros::then;

fn parse_kind(kind: &str) -> Result<ErrorKind, eyre::Report> {
    match kind {
        "validation" => Ok(ErrorKind::Validation),
        "not found" => Ok(ErrorKind::NotFound),
        "ownership" => Ok(ErrorKind::Ownership),
        "already claimed" => Ok(ErrorKind::AlreadyClaimed),
        "store" => Ok(ErrorKind::Store),
        other => Err(eyre::eyre!("unknown error kind in scenario: {other}")),
    }
}

#[then("the last operation succeeds")]
fn last_operation_succeeds(world: &QuestWorld) -> Result<(), eyre::Report> {
    match world.last_result.as_ref() {
        Some(Ok(())) => Ok(()),
        Some(Err(err)) => Err(eyre::eyre!("expected success, got {err}")),
        None => Err(eyre::eyre!("no operation was recorded")),
    }
}

#[then(r#"the last operation fails with "{kind}""#)]
fn last_operation_fails_with(world: &QuestWorld, kind: String) -> Result<(), eyre::Report> {
    let expected = parse_kind(&kind)?;
    let result = world
        .last_result
        .as_ref()
        .ok_or_else(|| eyre::eyre!("no operation was recorded"))?;

    match result {
        Err(err) if err.kind() == expected => Ok(()),
        other => Err(eyre::eyre!("expected {expected:?} error, got {other:?}")),
    }
}

#[then(r#"the quest's assignment is "{status}""#)]
fn assignment_is(world: &QuestWorld, status: String) -> Result<(), eyre::Report> {
    let expected = AssignmentStatus::try_from(status.as_str())
        .map_err(|err| eyre::eyre!("invalid expected status in scenario: {err}"))?;
    let quest_id = world.quest()?;

    let assignments = run_async(world.store.list_assignments_for_quest(quest_id))?;
    let latest = assignments
        .last()
        .ok_or_else(|| eyre::eyre!("quest {quest_id} has no assignment"))?;

    if latest.status() != expected {
        return Err(eyre::eyre!(
            "expected assignment {expected}, found {}",
            latest.status()
        ));
    }
    Ok(())
}

#[then("the quest is available")]
fn quest_is_available(world: &QuestWorld) -> Result<(), eyre::Report> {
    let quest_id = world.quest()?;
    let available = run_async(world.service.available_quests())?;
    if !available.iter().any(|quest| quest.id() == quest_id) {
        return Err(eyre::eyre!("quest {quest_id} missing from available quests"));
    }
    Ok(())
}

#[then("the quest is not available")]
fn quest_is_not_available(world: &QuestWorld) -> Result<(), eyre::Report> {
    let quest_id = world.quest()?;
    let available = run_async(world.service.available_quests())?;
    if available.iter().any(|quest| quest.id() == quest_id) {
        return Err(eyre::eyre!("quest {quest_id} still listed as available"));
    }
    Ok(())
}

#[then(r#""{fulfiller}" is "{status}""#)]
fn fulfiller_is(world: &QuestWorld, fulfiller: String, status: String) -> Result<(), eyre::Report> {
    let expected = FulfillerStatus::try_from(status.as_str())
        .map_err(|err| eyre::eyre!("invalid expected status in scenario: {err}"))?;
    let fulfiller_id = world.fulfiller(&fulfiller)?;

    let stored = run_async(world.store.find_fulfiller(fulfiller_id))?
        .ok_or_else(|| eyre::eyre!("fulfiller {fulfiller} missing from store"))?;

    if stored.status() != expected {
        return Err(eyre::eyre!(
            "expected {fulfiller} to be {expected}, found {}",
            stored.status()
        ));
    }
    Ok(())
}
