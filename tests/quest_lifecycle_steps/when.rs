//! When steps for quest lifecycle BDD scenarios.

use super::world::{QuestWorld, run_async};
use questboard::quest::services::PublishQuestRequest;
use rstest_bdd_macros::when;

#[when(r#""{requester}" publishes "{title}" with reward {reward:f64}"#)]
fn publishes(
    world: &mut QuestWorld,
    requester: String,
    title: String,
    reward: f64,
) -> Result<(), eyre::Report> {
    let requester_id = world.requester(&requester)?;
    let result = run_async(
        world
            .service
            .publish(PublishQuestRequest::new(requester_id, title).with_reward(reward)),
    );
    if let Ok(ref quest) = result {
        world.quest = Some(quest.id());
    }
    world.last_result = Some(result.map(|_| ()));
    Ok(())
}

#[when(r#""{fulfiller}" claims the quest"#)]
fn claims(world: &mut QuestWorld, fulfiller: String) -> Result<(), eyre::Report> {
    let fulfiller_id = world.fulfiller(&fulfiller)?;
    let quest_id = world.quest()?;
    let result = run_async(world.service.claim(fulfiller_id, quest_id));
    world.last_result = Some(result.map(|_| ()));
    Ok(())
}

#[when(r#""{fulfiller}" submits the quest"#)]
fn submits(world: &mut QuestWorld, fulfiller: String) -> Result<(), eyre::Report> {
    let fulfiller_id = world.fulfiller(&fulfiller)?;
    let quest_id = world.quest()?;
    let result = run_async(world.service.submit(fulfiller_id, quest_id));
    world.last_result = Some(result.map(|_| ()));
    Ok(())
}

#[when(r#""{requester}" confirms the quest"#)]
fn confirms(world: &mut QuestWorld, requester: String) -> Result<(), eyre::Report> {
    let requester_id = world.requester(&requester)?;
    let quest_id = world.quest()?;
    let result = run_async(world.service.confirm(requester_id, quest_id));
    world.last_result = Some(result.map(|_| ()));
    Ok(())
}

#[when(r#""{fulfiller}" asks to rest"#)]
fn asks_to_rest(world: &mut QuestWorld, fulfiller: String) -> Result<(), eyre::Report> {
    let fulfiller_id = world.fulfiller(&fulfiller)?;
    let result = run_async(world.service.rest(fulfiller_id));
    world.last_result = Some(result.map(|_| ()));
    Ok(())
}
