//! In-memory adapters for tests and single-process deployments.

mod notifier;
mod store;

pub use notifier::{Delivery, InMemoryNotifier};
pub use store::{InMemoryGuildStore, StoreOperation};
