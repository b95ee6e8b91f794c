//! Service layer orchestrating guild workflows.

mod error;
mod lifecycle;
mod queries;
mod registration;
mod roster;

pub use error::{ErrorKind, GuildError, GuildResult, MissingEntity};
pub use lifecycle::{ConfirmedQuest, GuildLifecycleService, PublishQuestRequest};
pub use registration::{Membership, RegisterMemberRequest, RegistrationService};
pub use roster::FulfillerStatusChange;
