//! Diesel row models for guild persistence.

use super::schema::{assignments, fulfillers, guild_events, member_contacts, quests, requesters};
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Row for fulfiller records.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = fulfillers)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct FulfillerRow {
    /// Fulfiller identifier.
    pub id: uuid::Uuid,
    /// Messaging platform name.
    pub platform: String,
    /// Platform-specific handle.
    pub handle: String,
    /// Display name.
    pub display_name: String,
    /// Availability status.
    pub status: String,
    /// Registration timestamp.
    pub created_at: DateTime<Utc>,
}

/// Row for requester records.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = requesters)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct RequesterRow {
    /// Requester identifier.
    pub id: uuid::Uuid,
    /// Messaging platform name.
    pub platform: String,
    /// Platform-specific handle.
    pub handle: String,
    /// Display name.
    pub display_name: String,
    /// Registration timestamp.
    pub created_at: DateTime<Utc>,
}

/// Row for quest records.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = quests)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct QuestRow {
    /// Quest identifier.
    pub id: uuid::Uuid,
    /// Owning requester.
    pub requester_id: uuid::Uuid,
    /// Quest title.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Reward amount.
    pub reward: f64,
    /// Optional deadline.
    pub deadline: Option<DateTime<Utc>>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Row for assignment records.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = assignments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub struct AssignmentRow {
    /// Assignment identifier.
    pub id: uuid::Uuid,
    /// Quest reference.
    pub quest_id: uuid::Uuid,
    /// Bound fulfiller.
    pub fulfiller_id: Option<uuid::Uuid>,
    /// Assignment status.
    pub status: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Claim timestamp.
    pub claimed_at: Option<DateTime<Utc>>,
    /// Submission timestamp.
    pub submitted_at: Option<DateTime<Utc>>,
    /// Confirmation timestamp.
    pub confirmed_at: Option<DateTime<Utc>>,
    /// Latest transition timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Row claiming a contact handle for one member.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = member_contacts)]
pub struct MemberContactRow {
    /// Messaging platform name.
    pub platform: String,
    /// Platform-specific handle.
    pub handle: String,
    /// Claiming role.
    pub role: String,
}

/// Query result row for audit log entries.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = guild_events)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct GuildEventRow {
    /// Event identifier.
    pub id: uuid::Uuid,
    /// Event name.
    pub kind: String,
    /// Free-text detail.
    pub detail: String,
    /// Recording timestamp.
    pub created_at: DateTime<Utc>,
}

/// Insert model for audit log entries.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = guild_events)]
pub struct NewGuildEventRow {
    /// Event identifier.
    pub id: uuid::Uuid,
    /// Event name.
    pub kind: String,
    /// Free-text detail.
    pub detail: String,
    /// Recording timestamp.
    pub created_at: DateTime<Utc>,
}
