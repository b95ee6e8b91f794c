//! Notification texts sent through the gateway.
//!
//! Texts are `minijinja` templates rendered against a small JSON context, so
//! wording can change without touching the lifecycle service.

use crate::quest::domain::Quest;
use minijinja::Environment;
use serde_json::{Map, Value};
use thiserror::Error;

const PUBLISHED_TEMPLATE: &str = concat!(
    "New quest \"{{ title }}\" with reward {{ reward }}",
    "{% if deadline %}, due {{ deadline }}{% endif %}.",
    "{% if description %}\n{{ description }}{% endif %}",
    "\nQuest id: {{ quest_id }}",
);

const AWAITING_CONFIRMATION_TEMPLATE: &str = concat!(
    "{{ fulfiller }} submitted \"{{ title }}\". ",
    "Confirm completion with quest id {{ quest_id }}.",
);

const CONFIRMED_TEMPLATE: &str = concat!(
    "\"{{ title }}\" was confirmed by the requester. ",
    "You are idle again and can claim another quest.",
);

/// Message announcing a lifecycle change to guild members.
#[derive(Debug, Clone, Copy)]
pub enum QuestNotice<'a> {
    /// Sent to idle fulfillers after publication.
    Published {
        /// Newly published quest.
        quest: &'a Quest,
    },
    /// Sent to the requester after submission.
    AwaitingConfirmation {
        /// Submitted quest.
        quest: &'a Quest,
        /// Display name of the submitting fulfiller.
        fulfiller: &'a str,
    },
    /// Sent to the fulfiller after confirmation.
    Confirmed {
        /// Confirmed quest.
        quest: &'a Quest,
    },
}

/// Error returned when a notice template fails to render.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("failed to render {notice} notice: {reason}")]
pub struct NoticeRenderError {
    /// Notice being rendered.
    pub notice: &'static str,
    /// Renderer-supplied reason.
    pub reason: String,
}

impl QuestNotice<'_> {
    /// Returns a short name for logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Published { .. } => "published",
            Self::AwaitingConfirmation { .. } => "awaiting_confirmation",
            Self::Confirmed { .. } => "confirmed",
        }
    }

    /// Renders the notice text.
    ///
    /// # Errors
    ///
    /// Returns [`NoticeRenderError`] when the template fails to render.
    pub fn render(&self) -> Result<String, NoticeRenderError> {
        let (template, context) = match *self {
            Self::Published { quest } => (PUBLISHED_TEMPLATE, quest_context(quest)),
            Self::AwaitingConfirmation { quest, fulfiller } => {
                let mut context = quest_context(quest);
                context.insert("fulfiller".to_owned(), Value::String(fulfiller.to_owned()));
                (AWAITING_CONFIRMATION_TEMPLATE, context)
            }
            Self::Confirmed { quest } => (CONFIRMED_TEMPLATE, quest_context(quest)),
        };

        Environment::new()
            .render_str(template, context)
            .map_err(|error| NoticeRenderError {
                notice: self.name(),
                reason: error.to_string(),
            })
    }
}

fn quest_context(quest: &Quest) -> Map<String, Value> {
    let mut context = Map::new();
    context.insert("quest_id".to_owned(), Value::String(quest.id().to_string()));
    context.insert(
        "title".to_owned(),
        Value::String(quest.title().as_str().to_owned()),
    );
    context.insert("reward".to_owned(), Value::from(quest.reward().value()));
    context.insert(
        "description".to_owned(),
        quest
            .description()
            .map_or(Value::Null, |text| Value::String(text.to_owned())),
    );
    context.insert(
        "deadline".to_owned(),
        quest
            .deadline()
            .map_or(Value::Null, |deadline| Value::String(deadline.to_rfc3339())),
    );
    context
}
