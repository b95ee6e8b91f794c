//! Diesel schema for guild persistence.

diesel::table! {
    /// Registered fulfillers.
    fulfillers (id) {
        /// Fulfiller identifier.
        id -> Uuid,
        /// Messaging platform name.
        #[max_length = 64]
        platform -> Varchar,
        /// Platform-specific handle.
        #[max_length = 255]
        handle -> Varchar,
        /// Display name.
        #[max_length = 255]
        display_name -> Varchar,
        /// Availability status.
        #[max_length = 32]
        status -> Varchar,
        /// Registration timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Registered requesters.
    requesters (id) {
        /// Requester identifier.
        id -> Uuid,
        /// Messaging platform name.
        #[max_length = 64]
        platform -> Varchar,
        /// Platform-specific handle.
        #[max_length = 255]
        handle -> Varchar,
        /// Display name.
        #[max_length = 255]
        display_name -> Varchar,
        /// Registration timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Published quests.
    quests (id) {
        /// Quest identifier.
        id -> Uuid,
        /// Owning requester.
        requester_id -> Uuid,
        /// Quest title.
        title -> Text,
        /// Optional description.
        description -> Nullable<Text>,
        /// Reward amount.
        reward -> Float8,
        /// Optional deadline.
        deadline -> Nullable<Timestamptz>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Claim records binding fulfillers to quests.
    assignments (id) {
        /// Assignment identifier.
        id -> Uuid,
        /// Quest reference.
        quest_id -> Uuid,
        /// Bound fulfiller, null until claimed.
        fulfiller_id -> Nullable<Uuid>,
        /// Assignment status.
        #[max_length = 32]
        status -> Varchar,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Claim timestamp.
        claimed_at -> Nullable<Timestamptz>,
        /// Submission timestamp.
        submitted_at -> Nullable<Timestamptz>,
        /// Confirmation timestamp.
        confirmed_at -> Nullable<Timestamptz>,
        /// Latest transition timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Contact handles claimed by any member, across both roles.
    member_contacts (platform, handle) {
        /// Messaging platform name.
        #[max_length = 64]
        platform -> Varchar,
        /// Platform-specific handle.
        #[max_length = 255]
        handle -> Varchar,
        /// Role that claimed the handle.
        #[max_length = 32]
        role -> Varchar,
    }
}

diesel::table! {
    /// Append-only audit log.
    guild_events (id) {
        /// Event identifier.
        id -> Uuid,
        /// Append sequence number.
        seq -> Int8,
        /// Event name.
        #[max_length = 64]
        kind -> Varchar,
        /// Free-text detail.
        detail -> Text,
        /// Recording timestamp.
        created_at -> Timestamptz,
    }
}

diesel::joinable!(quests -> requesters (requester_id));
diesel::joinable!(assignments -> quests (quest_id));

diesel::allow_tables_to_appear_in_same_query!(
    fulfillers,
    requesters,
    quests,
    assignments,
    member_contacts,
    guild_events,
);
