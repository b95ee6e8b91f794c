//! `PostgreSQL` adapters for guild persistence.

mod models;
mod repository;
mod schema;

pub use repository::{GuildPgPool, PostgresGuildStore};
