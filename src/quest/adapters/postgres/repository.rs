//! `PostgreSQL` store implementation for guild persistence.
//!
//! Each port call runs a single statement, or a single short transaction for
//! member registration. Concurrency between claims is settled by the
//! conditional `UPDATE ... WHERE status = $expected` and by the partial
//! unique index `idx_assignments_one_active_per_quest`.

use super::{
    models::{
        AssignmentRow, FulfillerRow, GuildEventRow, MemberContactRow, NewGuildEventRow, QuestRow,
        RequesterRow,
    },
    schema::{assignments, fulfillers, guild_events, member_contacts, quests, requesters},
};
use crate::quest::{
    domain::{
        Assignment, AssignmentId, AssignmentStatus, ContactHandle, DisplayName, EventId,
        Fulfiller, FulfillerId, FulfillerStatus, GuildEvent, GuildEventKind,
        PersistedAssignmentData, PersistedFulfillerData, PersistedQuestData,
        PersistedRequesterData, Quest, QuestId, QuestTitle, Recipient, Requester, RequesterId,
        Reward,
    },
    ports::{
        AssignmentRepository, EventLogRepository, FulfillerRepository, QuestRepository,
        RequesterRepository, StoreError, StoreResult,
    },
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL` connection pool type used by guild adapters.
pub type GuildPgPool = Pool<ConnectionManager<PgConnection>>;

const ACTIVE_ASSIGNMENT_CONSTRAINT: &str = "idx_assignments_one_active_per_quest";
const MEMBER_CONTACT_CONSTRAINT: &str = "member_contacts_pkey";

/// `PostgreSQL`-backed guild store.
#[derive(Debug, Clone)]
pub struct PostgresGuildStore {
    pool: GuildPgPool,
}

impl PostgresGuildStore {
    /// Creates a store from an existing connection pool.
    #[must_use]
    pub const fn new(pool: GuildPgPool) -> Self {
        Self { pool }
    }

    /// Builds a connection pool for `database_url` and wraps it.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Persistence`] when the pool cannot be created.
    pub fn connect(database_url: &str, max_connections: u32) -> StoreResult<Self> {
        let manager = ConnectionManager::<PgConnection>::new(database_url);
        let pool = Pool::builder()
            .max_size(max_connections)
            .build(manager)
            .map_err(StoreError::persistence)?;
        Ok(Self::new(pool))
    }

    async fn run_blocking<F, T>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&mut PgConnection) -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(StoreError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(StoreError::persistence)?
    }
}

#[async_trait]
impl FulfillerRepository for PostgresGuildStore {
    async fn insert_fulfiller(&self, fulfiller: &Fulfiller) -> StoreResult<()> {
        let row = fulfiller_to_row(fulfiller);
        let contact = fulfiller.contact().clone();
        let id = fulfiller.id().to_string();

        self.run_blocking(move |connection| {
            let claim = contact_row(&contact, "fulfiller");
            connection
                .transaction::<_, DieselError, _>(|tx| {
                    diesel::insert_into(member_contacts::table)
                        .values(&claim)
                        .execute(tx)?;
                    diesel::insert_into(fulfillers::table)
                        .values(&row)
                        .execute(tx)?;
                    Ok(())
                })
                .map_err(|err| map_member_insert_error(err, &contact, id))
        })
        .await
    }

    async fn update_fulfiller(
        &self,
        fulfiller: &Fulfiller,
        expected: FulfillerStatus,
    ) -> StoreResult<()> {
        let id = fulfiller.id();
        let status = fulfiller.status();

        self.run_blocking(move |connection| {
            let updated = diesel::update(
                fulfillers::table
                    .filter(fulfillers::id.eq(id.into_inner()))
                    .filter(fulfillers::status.eq(expected.as_str())),
            )
            .set(fulfillers::status.eq(status.as_str()))
            .execute(connection)
            .map_err(StoreError::persistence)?;
            if updated > 0 {
                return Ok(());
            }

            let exists = diesel::select(diesel::dsl::exists(
                fulfillers::table.filter(fulfillers::id.eq(id.into_inner())),
            ))
            .get_result::<bool>(connection)
            .map_err(StoreError::persistence)?;
            Err(if exists {
                StoreError::stale("fulfiller", id)
            } else {
                StoreError::not_found("fulfiller", id)
            })
        })
        .await
    }

    async fn find_fulfiller(&self, id: FulfillerId) -> StoreResult<Option<Fulfiller>> {
        self.run_blocking(move |connection| {
            let row = fulfillers::table
                .filter(fulfillers::id.eq(id.into_inner()))
                .select(FulfillerRow::as_select())
                .first::<FulfillerRow>(connection)
                .optional()
                .map_err(StoreError::persistence)?;
            row.map(row_to_fulfiller).transpose()
        })
        .await
    }

    async fn find_fulfiller_by_contact(
        &self,
        contact: &ContactHandle,
    ) -> StoreResult<Option<Fulfiller>> {
        let platform = contact.platform().to_owned();
        let handle = contact.handle().to_owned();
        self.run_blocking(move |connection| {
            let row = fulfillers::table
                .filter(fulfillers::platform.eq(platform))
                .filter(fulfillers::handle.eq(handle))
                .select(FulfillerRow::as_select())
                .first::<FulfillerRow>(connection)
                .optional()
                .map_err(StoreError::persistence)?;
            row.map(row_to_fulfiller).transpose()
        })
        .await
    }

    async fn list_fulfillers_by_status(
        &self,
        status: FulfillerStatus,
    ) -> StoreResult<Vec<Fulfiller>> {
        self.run_blocking(move |connection| {
            fulfillers::table
                .filter(fulfillers::status.eq(status.as_str()))
                .order(fulfillers::created_at.asc())
                .select(FulfillerRow::as_select())
                .load::<FulfillerRow>(connection)
                .map_err(StoreError::persistence)?
                .into_iter()
                .map(row_to_fulfiller)
                .collect()
        })
        .await
    }
}

#[async_trait]
impl RequesterRepository for PostgresGuildStore {
    async fn insert_requester(&self, requester: &Requester) -> StoreResult<()> {
        let row = requester_to_row(requester);
        let contact = requester.contact().clone();
        let id = requester.id().to_string();

        self.run_blocking(move |connection| {
            let claim = contact_row(&contact, "requester");
            connection
                .transaction::<_, DieselError, _>(|tx| {
                    diesel::insert_into(member_contacts::table)
                        .values(&claim)
                        .execute(tx)?;
                    diesel::insert_into(requesters::table)
                        .values(&row)
                        .execute(tx)?;
                    Ok(())
                })
                .map_err(|err| map_member_insert_error(err, &contact, id))
        })
        .await
    }

    async fn find_requester(&self, id: RequesterId) -> StoreResult<Option<Requester>> {
        self.run_blocking(move |connection| {
            let row = requesters::table
                .filter(requesters::id.eq(id.into_inner()))
                .select(RequesterRow::as_select())
                .first::<RequesterRow>(connection)
                .optional()
                .map_err(StoreError::persistence)?;
            row.map(row_to_requester).transpose()
        })
        .await
    }

    async fn find_requester_by_contact(
        &self,
        contact: &ContactHandle,
    ) -> StoreResult<Option<Requester>> {
        let platform = contact.platform().to_owned();
        let handle = contact.handle().to_owned();
        self.run_blocking(move |connection| {
            let row = requesters::table
                .filter(requesters::platform.eq(platform))
                .filter(requesters::handle.eq(handle))
                .select(RequesterRow::as_select())
                .first::<RequesterRow>(connection)
                .optional()
                .map_err(StoreError::persistence)?;
            row.map(row_to_requester).transpose()
        })
        .await
    }
}

#[async_trait]
impl QuestRepository for PostgresGuildStore {
    async fn insert_quest(&self, quest: &Quest) -> StoreResult<()> {
        let row = quest_to_row(quest);
        let id = quest.id();
        self.run_blocking(move |connection| {
            diesel::insert_into(quests::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        StoreError::DuplicateId(id.to_string())
                    }
                    _ => StoreError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn find_quest(&self, id: QuestId) -> StoreResult<Option<Quest>> {
        self.run_blocking(move |connection| {
            let row = quests::table
                .filter(quests::id.eq(id.into_inner()))
                .select(QuestRow::as_select())
                .first::<QuestRow>(connection)
                .optional()
                .map_err(StoreError::persistence)?;
            row.map(row_to_quest).transpose()
        })
        .await
    }

    async fn list_quests(&self) -> StoreResult<Vec<Quest>> {
        self.run_blocking(move |connection| {
            quests::table
                .order((quests::created_at.asc(), quests::id.asc()))
                .select(QuestRow::as_select())
                .load::<QuestRow>(connection)
                .map_err(StoreError::persistence)?
                .into_iter()
                .map(row_to_quest)
                .collect()
        })
        .await
    }

    async fn list_quests_by_requester(
        &self,
        requester_id: RequesterId,
    ) -> StoreResult<Vec<Quest>> {
        self.run_blocking(move |connection| {
            quests::table
                .filter(quests::requester_id.eq(requester_id.into_inner()))
                .order((quests::created_at.asc(), quests::id.asc()))
                .select(QuestRow::as_select())
                .load::<QuestRow>(connection)
                .map_err(StoreError::persistence)?
                .into_iter()
                .map(row_to_quest)
                .collect()
        })
        .await
    }
}

#[async_trait]
impl AssignmentRepository for PostgresGuildStore {
    async fn insert_assignment(&self, assignment: &Assignment) -> StoreResult<()> {
        let row = assignment_to_row(assignment);
        let id = assignment.id();
        let quest_id = assignment.quest_id();
        self.run_blocking(move |connection| {
            diesel::insert_into(assignments::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
                        if is_active_assignment_violation(info.as_ref()) =>
                    {
                        StoreError::ActiveAssignmentExists(quest_id)
                    }
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        StoreError::DuplicateId(id.to_string())
                    }
                    _ => StoreError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn update_assignment(
        &self,
        assignment: &Assignment,
        expected: AssignmentStatus,
    ) -> StoreResult<()> {
        let row = assignment_to_row(assignment);
        let id = assignment.id();
        let quest_id = assignment.quest_id();

        self.run_blocking(move |connection| {
            let updated = diesel::update(
                assignments::table
                    .filter(assignments::id.eq(id.into_inner()))
                    .filter(assignments::status.eq(expected.as_str())),
            )
            .set(&row)
            .execute(connection)
            .map_err(|err| match err {
                DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
                    if is_active_assignment_violation(info.as_ref()) =>
                {
                    StoreError::ActiveAssignmentExists(quest_id)
                }
                _ => StoreError::persistence(err),
            })?;
            if updated > 0 {
                return Ok(());
            }

            let exists = diesel::select(diesel::dsl::exists(
                assignments::table.filter(assignments::id.eq(id.into_inner())),
            ))
            .get_result::<bool>(connection)
            .map_err(StoreError::persistence)?;
            Err(if exists {
                StoreError::stale("assignment", id)
            } else {
                StoreError::not_found("assignment", id)
            })
        })
        .await
    }

    async fn find_assignment(&self, id: AssignmentId) -> StoreResult<Option<Assignment>> {
        self.run_blocking(move |connection| {
            let row = assignments::table
                .filter(assignments::id.eq(id.into_inner()))
                .select(AssignmentRow::as_select())
                .first::<AssignmentRow>(connection)
                .optional()
                .map_err(StoreError::persistence)?;
            row.map(row_to_assignment).transpose()
        })
        .await
    }

    async fn list_assignments(&self) -> StoreResult<Vec<Assignment>> {
        self.run_blocking(move |connection| {
            assignments::table
                .order((assignments::created_at.asc(), assignments::id.asc()))
                .select(AssignmentRow::as_select())
                .load::<AssignmentRow>(connection)
                .map_err(StoreError::persistence)?
                .into_iter()
                .map(row_to_assignment)
                .collect()
        })
        .await
    }

    async fn list_assignments_for_quest(
        &self,
        quest_id: QuestId,
    ) -> StoreResult<Vec<Assignment>> {
        self.run_blocking(move |connection| {
            assignments::table
                .filter(assignments::quest_id.eq(quest_id.into_inner()))
                .order((assignments::created_at.asc(), assignments::id.asc()))
                .select(AssignmentRow::as_select())
                .load::<AssignmentRow>(connection)
                .map_err(StoreError::persistence)?
                .into_iter()
                .map(row_to_assignment)
                .collect()
        })
        .await
    }

    async fn list_assignments_by_status(
        &self,
        status: AssignmentStatus,
    ) -> StoreResult<Vec<Assignment>> {
        self.run_blocking(move |connection| {
            assignments::table
                .filter(assignments::status.eq(status.as_str()))
                .order((assignments::created_at.asc(), assignments::id.asc()))
                .select(AssignmentRow::as_select())
                .load::<AssignmentRow>(connection)
                .map_err(StoreError::persistence)?
                .into_iter()
                .map(row_to_assignment)
                .collect()
        })
        .await
    }

    async fn find_assignment_for_fulfiller(
        &self,
        fulfiller_id: FulfillerId,
        status: AssignmentStatus,
    ) -> StoreResult<Option<Assignment>> {
        self.run_blocking(move |connection| {
            let row = assignments::table
                .filter(assignments::fulfiller_id.eq(fulfiller_id.into_inner()))
                .filter(assignments::status.eq(status.as_str()))
                .order(assignments::created_at.desc())
                .select(AssignmentRow::as_select())
                .first::<AssignmentRow>(connection)
                .optional()
                .map_err(StoreError::persistence)?;
            row.map(row_to_assignment).transpose()
        })
        .await
    }
}

#[async_trait]
impl EventLogRepository for PostgresGuildStore {
    async fn append_event(&self, event: &GuildEvent) -> StoreResult<()> {
        let row = NewGuildEventRow {
            id: event.id().into_inner(),
            kind: event.kind().as_str().to_owned(),
            detail: event.detail().to_owned(),
            created_at: event.created_at(),
        };
        self.run_blocking(move |connection| {
            diesel::insert_into(guild_events::table)
                .values(&row)
                .execute(connection)
                .map_err(StoreError::persistence)?;
            Ok(())
        })
        .await
    }

    async fn list_events(&self) -> StoreResult<Vec<GuildEvent>> {
        self.run_blocking(move |connection| {
            guild_events::table
                .order(guild_events::seq.asc())
                .select(GuildEventRow::as_select())
                .load::<GuildEventRow>(connection)
                .map_err(StoreError::persistence)?
                .into_iter()
                .map(row_to_event)
                .collect()
        })
        .await
    }
}

fn contact_row(contact: &ContactHandle, role: &str) -> MemberContactRow {
    MemberContactRow {
        platform: contact.platform().to_owned(),
        handle: contact.handle().to_owned(),
        role: role.to_owned(),
    }
}

fn map_member_insert_error(err: DieselError, contact: &ContactHandle, id: String) -> StoreError {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
            if is_member_contact_violation(info.as_ref()) =>
        {
            StoreError::DuplicateContact(contact.clone())
        }
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            StoreError::DuplicateId(id)
        }
        _ => StoreError::persistence(err),
    }
}

fn is_active_assignment_violation(info: &dyn DatabaseErrorInformation) -> bool {
    info.constraint_name()
        .is_some_and(|name| name == ACTIVE_ASSIGNMENT_CONSTRAINT)
}

fn is_member_contact_violation(info: &dyn DatabaseErrorInformation) -> bool {
    info.constraint_name()
        .is_some_and(|name| name == MEMBER_CONTACT_CONSTRAINT)
}

fn fulfiller_to_row(fulfiller: &Fulfiller) -> FulfillerRow {
    FulfillerRow {
        id: fulfiller.id().into_inner(),
        platform: fulfiller.contact().platform().to_owned(),
        handle: fulfiller.contact().handle().to_owned(),
        display_name: fulfiller.display_name().as_str().to_owned(),
        status: fulfiller.status().as_str().to_owned(),
        created_at: fulfiller.created_at(),
    }
}

fn row_to_fulfiller(row: FulfillerRow) -> StoreResult<Fulfiller> {
    let FulfillerRow {
        id,
        platform,
        handle,
        display_name,
        status: persisted_status,
        created_at,
    } = row;

    let data = PersistedFulfillerData {
        id: FulfillerId::from_uuid(id),
        contact: ContactHandle::new(platform, handle).map_err(StoreError::persistence)?,
        display_name: DisplayName::new(display_name).map_err(StoreError::persistence)?,
        status: FulfillerStatus::try_from(persisted_status.as_str())
            .map_err(StoreError::persistence)?,
        created_at,
    };
    Ok(Fulfiller::from_persisted(data))
}

fn requester_to_row(requester: &Requester) -> RequesterRow {
    RequesterRow {
        id: requester.id().into_inner(),
        platform: requester.contact().platform().to_owned(),
        handle: requester.contact().handle().to_owned(),
        display_name: requester.display_name().as_str().to_owned(),
        created_at: requester.created_at(),
    }
}

fn row_to_requester(row: RequesterRow) -> StoreResult<Requester> {
    let data = PersistedRequesterData {
        id: RequesterId::from_uuid(row.id),
        contact: ContactHandle::new(row.platform, row.handle).map_err(StoreError::persistence)?,
        display_name: DisplayName::new(row.display_name).map_err(StoreError::persistence)?,
        created_at: row.created_at,
    };
    Ok(Requester::from_persisted(data))
}

fn quest_to_row(quest: &Quest) -> QuestRow {
    QuestRow {
        id: quest.id().into_inner(),
        requester_id: quest.requester_id().into_inner(),
        title: quest.title().as_str().to_owned(),
        description: quest.description().map(str::to_owned),
        reward: quest.reward().value(),
        deadline: quest.deadline(),
        created_at: quest.created_at(),
        updated_at: quest.updated_at(),
    }
}

fn row_to_quest(row: QuestRow) -> StoreResult<Quest> {
    let data = PersistedQuestData {
        id: QuestId::from_uuid(row.id),
        requester_id: RequesterId::from_uuid(row.requester_id),
        title: QuestTitle::new(row.title).map_err(StoreError::persistence)?,
        description: row.description,
        reward: Reward::new(row.reward).map_err(StoreError::persistence)?,
        deadline: row.deadline,
        created_at: row.created_at,
        updated_at: row.updated_at,
    };
    Ok(Quest::from_persisted(data))
}

fn assignment_to_row(assignment: &Assignment) -> AssignmentRow {
    AssignmentRow {
        id: assignment.id().into_inner(),
        quest_id: assignment.quest_id().into_inner(),
        fulfiller_id: assignment.fulfiller_id().map(FulfillerId::into_inner),
        status: assignment.status().as_str().to_owned(),
        created_at: assignment.created_at(),
        claimed_at: assignment.claimed_at(),
        submitted_at: assignment.submitted_at(),
        confirmed_at: assignment.confirmed_at(),
        updated_at: assignment.updated_at(),
    }
}

fn row_to_assignment(row: AssignmentRow) -> StoreResult<Assignment> {
    let status =
        AssignmentStatus::try_from(row.status.as_str()).map_err(StoreError::persistence)?;
    let data = PersistedAssignmentData {
        id: AssignmentId::from_uuid(row.id),
        quest_id: QuestId::from_uuid(row.quest_id),
        fulfiller_id: row.fulfiller_id.map(FulfillerId::from_uuid),
        status,
        created_at: row.created_at,
        claimed_at: row.claimed_at,
        submitted_at: row.submitted_at,
        confirmed_at: row.confirmed_at,
        updated_at: row.updated_at,
    };
    Ok(Assignment::from_persisted(data))
}

fn row_to_event(row: GuildEventRow) -> StoreResult<GuildEvent> {
    let kind = GuildEventKind::try_from(row.kind.as_str()).map_err(StoreError::persistence)?;
    Ok(GuildEvent::from_persisted(
        EventId::from_uuid(row.id),
        kind,
        row.detail,
        row.created_at,
    ))
}
