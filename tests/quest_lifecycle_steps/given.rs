//! Given steps for quest lifecycle BDD scenarios.

use super::world::{QuestWorld, run_async};
use eyre::WrapErr;
use questboard::quest::services::{PublishQuestRequest, RegisterMemberRequest};
use rstest_bdd_macros::given;

#[given(r#"a requester named "{name}""#)]
fn requester_named(world: &mut QuestWorld, name: String) -> Result<(), eyre::Report> {
    let requester = run_async(world.registration.register_requester(
        RegisterMemberRequest::new(name.clone(), "telegram", name.to_ascii_lowercase()),
    ))
    .wrap_err("register requester for scenario")?;
    world.requesters.insert(name, requester.id());
    Ok(())
}

#[given(r#"a fulfiller named "{name}""#)]
fn fulfiller_named(world: &mut QuestWorld, name: String) -> Result<(), eyre::Report> {
    let fulfiller = run_async(world.registration.register_fulfiller(
        RegisterMemberRequest::new(name.clone(), "telegram", name.to_ascii_lowercase()),
    ))
    .wrap_err("register fulfiller for scenario")?;
    world.fulfillers.insert(name, fulfiller.id());
    Ok(())
}

#[given(r#""{requester}" has published "{title}""#)]
fn has_published(
    world: &mut QuestWorld,
    requester: String,
    title: String,
) -> Result<(), eyre::Report> {
    let requester_id = world.requester(&requester)?;
    let quest = run_async(
        world
            .service
            .publish(PublishQuestRequest::new(requester_id, title).with_reward(50.0)),
    )
    .wrap_err("publish quest in scenario setup")?;
    world.quest = Some(quest.id());
    Ok(())
}

#[given(r#""{fulfiller}" has claimed the quest"#)]
fn has_claimed(world: &mut QuestWorld, fulfiller: String) -> Result<(), eyre::Report> {
    let fulfiller_id = world.fulfiller(&fulfiller)?;
    let quest_id = world.quest()?;
    run_async(world.service.claim(fulfiller_id, quest_id))
        .wrap_err("claim quest in scenario setup")?;
    Ok(())
}

#[given(r#""{fulfiller}" has submitted the quest"#)]
fn has_submitted(world: &mut QuestWorld, fulfiller: String) -> Result<(), eyre::Report> {
    let fulfiller_id = world.fulfiller(&fulfiller)?;
    let quest_id = world.quest()?;
    run_async(world.service.submit(fulfiller_id, quest_id))
        .wrap_err("submit quest in scenario setup")?;
    Ok(())
}
