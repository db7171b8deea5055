//! Postgres-backed club directory.
//!
//! ## Error Mapping
//!
//! | PostgreSQL Error Code | StoreError | Scenario |
//! |-----------------------|------------|----------|
//! | `23505` (unique violation) | `Conflict` | Duplicate membership, second owner, duplicate user id or email |
//! | `23503` (foreign key violation) | `NotFound` on insert, `MembershipsRemain` on club delete | Missing club or user; club still referenced |
//! | Any other | `Database` | Connection failures, pool closed, etc. |
//!
//! Constraint violations reach callers with a fixed message per operation.
//! Rows that cannot be decoded into domain types (blank user id, unknown role
//! text) surface as `Corrupt`, except in `role_of`, where an unknown role
//! grants nothing.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::{FromRow, PgPool, Postgres, Row, Transaction};
use tracing::instrument;

use clubhouse_auth::Role;
use clubhouse_core::{ClubId, EventId, UserId};

use super::model::{
    Club, ClubDetails, ClubEvent, EventDetails, Member, Membership, NewUser, User, UserClub,
};
use super::r#trait::{
    ClubEventStore, ClubStore, MembershipStore, StoreError, StoreTx, Transactional, UserStore,
};

const CLUB_COLUMNS: &str = r#"
    c.id, c.name, c.description, c.email, c.created_at, c.updated_at,
    (SELECT COUNT(*) FROM memberships m WHERE m.club_id = c.id) AS member_count
"#;

/// Club directory over a Postgres connection pool.
///
/// Memberships reference clubs and users with `ON DELETE RESTRICT`, and a
/// partial unique index allows a single `owner` row per club.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect and apply pending schema migrations.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;

        let store = Self::new(pool);
        store.migrate().await?;
        Ok(store)
    }

    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("migrate", e.into()))
    }
}

#[async_trait]
impl UserStore for PostgresStore {
    #[instrument(skip(self, user), fields(user_id = %user.id), err)]
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        let row = sqlx::query(
            r#"
            INSERT INTO users (id, first_name, last_name, email, telephone_number)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, first_name, last_name, email, telephone_number,
                      email_preferences, marketing_preferences, created_at, updated_at
            "#,
        )
        .bind(user.id.as_str())
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(&user.telephone_number)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("create_user", e))?;

        decode::<UserRow>(&row)?.try_into()
    }

    async fn user_by_id(&self, user_id: &UserId) -> Result<Option<User>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, first_name, last_name, email, telephone_number,
                   email_preferences, marketing_preferences, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("user_by_id", e))?;

        row.map(|r| decode::<UserRow>(&r).and_then(User::try_from))
            .transpose()
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, first_name, last_name, email, telephone_number,
                   email_preferences, marketing_preferences, created_at, updated_at
            FROM users
            WHERE lower(email) = lower($1)
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("user_by_email", e))?;

        row.map(|r| decode::<UserRow>(&r).and_then(User::try_from))
            .transpose()
    }
}

#[async_trait]
impl ClubStore for PostgresStore {
    async fn club(&self, club_id: ClubId) -> Result<Option<Club>, StoreError> {
        let sql = format!("SELECT {CLUB_COLUMNS} FROM clubs c WHERE c.id = $1");
        let row = sqlx::query(&sql)
            .bind(*club_id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("club", e))?;

        row.map(|r| decode::<ClubRow>(&r).map(Club::from)).transpose()
    }

    async fn list_clubs(&self) -> Result<Vec<Club>, StoreError> {
        let sql = format!("SELECT {CLUB_COLUMNS} FROM clubs c ORDER BY c.created_at DESC, c.id DESC");
        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_clubs", e))?;

        rows.iter()
            .map(|r| decode::<ClubRow>(r).map(Club::from))
            .collect()
    }

    #[instrument(skip(self, details), fields(club_id = %club_id), err)]
    async fn update_club(&self, club_id: ClubId, details: ClubDetails) -> Result<Club, StoreError> {
        let updated = sqlx::query(
            r#"
            UPDATE clubs
            SET name = $2, description = $3, email = $4, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(*club_id.as_uuid())
        .bind(&details.name)
        .bind(&details.description)
        .bind(&details.email)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_club", e))?;

        if updated.rows_affected() == 0 {
            return Err(StoreError::not_found(format!("club {club_id}")));
        }
        self.club(club_id)
            .await?
            .ok_or_else(|| StoreError::not_found(format!("club {club_id}")))
    }
}

#[async_trait]
impl MembershipStore for PostgresStore {
    async fn role_of(&self, club_id: ClubId, user_id: &UserId) -> Result<Option<Role>, StoreError> {
        let role: Option<String> =
            sqlx::query_scalar("SELECT role FROM memberships WHERE club_id = $1 AND user_id = $2")
                .bind(*club_id.as_uuid())
                .bind(user_id.as_str())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| map_sqlx_error("role_of", e))?;

        Ok(role.as_deref().and_then(granted_role))
    }

    #[instrument(skip(self), fields(club_id = %club_id, user_id = %user_id), err)]
    async fn create_membership(
        &self,
        club_id: ClubId,
        user_id: &UserId,
        role: Role,
    ) -> Result<Membership, StoreError> {
        let row = sqlx::query(
            r#"
            INSERT INTO memberships (club_id, user_id, role)
            VALUES ($1, $2, $3)
            RETURNING club_id, user_id, role, created_at, updated_at
            "#,
        )
        .bind(*club_id.as_uuid())
        .bind(user_id.as_str())
        .bind(role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("create_membership", e))?;

        decode::<MembershipRow>(&row)?.try_into()
    }

    #[instrument(skip(self), fields(club_id = %club_id, user_id = %user_id), err)]
    async fn update_membership(
        &self,
        club_id: ClubId,
        user_id: &UserId,
        role: Role,
    ) -> Result<Membership, StoreError> {
        let row = sqlx::query(
            r#"
            UPDATE memberships
            SET role = $3, updated_at = now()
            WHERE club_id = $1 AND user_id = $2
            RETURNING club_id, user_id, role, created_at, updated_at
            "#,
        )
        .bind(*club_id.as_uuid())
        .bind(user_id.as_str())
        .bind(role.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_membership", e))?
        .ok_or_else(|| StoreError::not_found(format!("membership of {user_id} in club {club_id}")))?;

        decode::<MembershipRow>(&row)?.try_into()
    }

    async fn remove_membership(&self, club_id: ClubId, user_id: &UserId) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM memberships WHERE club_id = $1 AND user_id = $2")
            .bind(*club_id.as_uuid())
            .bind(user_id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("remove_membership", e))?;
        Ok(())
    }

    async fn remove_all_memberships(&self, club_id: ClubId) -> Result<u64, StoreError> {
        let done = sqlx::query("DELETE FROM memberships WHERE club_id = $1")
            .bind(*club_id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("remove_all_memberships", e))?;
        Ok(done.rows_affected())
    }

    async fn list_by_club(&self, club_id: ClubId) -> Result<Vec<Member>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT u.id AS user_id, u.first_name, u.last_name, u.email, m.role, m.created_at AS joined_at
            FROM memberships m
            JOIN users u ON u.id = m.user_id
            WHERE m.club_id = $1
            ORDER BY m.created_at ASC, u.id ASC
            "#,
        )
        .bind(*club_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_by_club", e))?;

        rows.iter()
            .map(|r| decode::<MemberRow>(r).and_then(Member::try_from))
            .collect()
    }

    async fn list_by_user(&self, user_id: &UserId) -> Result<Vec<UserClub>, StoreError> {
        let sql = format!(
            r#"
            SELECT {CLUB_COLUMNS}, mm.role
            FROM memberships mm
            JOIN clubs c ON c.id = mm.club_id
            WHERE mm.user_id = $1
            ORDER BY c.created_at DESC, c.id DESC
            "#
        );
        let rows = sqlx::query(&sql)
            .bind(user_id.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_by_user", e))?;

        rows.iter()
            .map(|r| -> Result<UserClub, StoreError> {
                let club = Club::from(decode::<ClubRow>(r)?);
                let role: String = r
                    .try_get("role")
                    .map_err(|e| StoreError::Corrupt(format!("membership row: {e}")))?;
                Ok(UserClub {
                    club,
                    role: parse_role(&role)?,
                })
            })
            .collect()
    }
}

#[async_trait]
impl ClubEventStore for PostgresStore {
    #[instrument(skip(self, details), fields(club_id = %club_id), err)]
    async fn create_event(&self, club_id: ClubId, details: EventDetails) -> Result<ClubEvent, StoreError> {
        let row = sqlx::query(
            r#"
            INSERT INTO events (id, club_id, title, description, start_date, end_date, tags, location)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, club_id, title, description, start_date, end_date, tags, location,
                      created_at, updated_at
            "#,
        )
        .bind(*EventId::new().as_uuid())
        .bind(*club_id.as_uuid())
        .bind(&details.title)
        .bind(&details.description)
        .bind(details.start_date)
        .bind(details.end_date)
        .bind(&details.tags)
        .bind(&details.location)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("create_event", e))?;

        decode::<EventRow>(&row).map(ClubEvent::from)
    }

    async fn event(&self, club_id: ClubId, event_id: EventId) -> Result<Option<ClubEvent>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, club_id, title, description, start_date, end_date, tags, location,
                   created_at, updated_at
            FROM events
            WHERE club_id = $1 AND id = $2
            "#,
        )
        .bind(*club_id.as_uuid())
        .bind(*event_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("event", e))?;

        row.map(|r| decode::<EventRow>(&r).map(ClubEvent::from))
            .transpose()
    }

    async fn list_events(&self, club_id: ClubId) -> Result<Vec<ClubEvent>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, club_id, title, description, start_date, end_date, tags, location,
                   created_at, updated_at
            FROM events
            WHERE club_id = $1
            ORDER BY start_date DESC, id DESC
            "#,
        )
        .bind(*club_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_events", e))?;

        rows.iter()
            .map(|r| decode::<EventRow>(r).map(ClubEvent::from))
            .collect()
    }

    #[instrument(skip(self, details), fields(club_id = %club_id, event_id = %event_id), err)]
    async fn update_event(
        &self,
        club_id: ClubId,
        event_id: EventId,
        details: EventDetails,
    ) -> Result<ClubEvent, StoreError> {
        let row = sqlx::query(
            r#"
            UPDATE events
            SET title = $3, description = $4, start_date = $5, end_date = $6,
                tags = $7, location = $8, updated_at = now()
            WHERE club_id = $1 AND id = $2
            RETURNING id, club_id, title, description, start_date, end_date, tags, location,
                      created_at, updated_at
            "#,
        )
        .bind(*club_id.as_uuid())
        .bind(*event_id.as_uuid())
        .bind(&details.title)
        .bind(&details.description)
        .bind(details.start_date)
        .bind(details.end_date)
        .bind(&details.tags)
        .bind(&details.location)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_event", e))?
        .ok_or_else(|| StoreError::not_found(format!("event {event_id}")))?;

        decode::<EventRow>(&row).map(ClubEvent::from)
    }

    async fn delete_event(&self, club_id: ClubId, event_id: EventId) -> Result<(), StoreError> {
        let done = sqlx::query("DELETE FROM events WHERE club_id = $1 AND id = $2")
            .bind(*club_id.as_uuid())
            .bind(*event_id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_event", e))?;

        if done.rows_affected() == 0 {
            return Err(StoreError::not_found(format!("event {event_id}")));
        }
        Ok(())
    }
}

#[async_trait]
impl Transactional for PostgresStore {
    async fn begin(&self) -> Result<Box<dyn StoreTx>, StoreError> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;
        Ok(Box::new(PgTx { tx }))
    }
}

/// A Postgres transaction. Dropped without commit, sqlx rolls it back.
struct PgTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl StoreTx for PgTx {
    async fn insert_club(&mut self, details: ClubDetails) -> Result<Club, StoreError> {
        let row = sqlx::query(
            r#"
            INSERT INTO clubs (id, name, description, email)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, description, email, created_at, updated_at, 0::BIGINT AS member_count
            "#,
        )
        .bind(*ClubId::new().as_uuid())
        .bind(&details.name)
        .bind(&details.description)
        .bind(&details.email)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("insert_club", e))?;

        decode::<ClubRow>(&row).map(Club::from)
    }

    async fn insert_membership(
        &mut self,
        club_id: ClubId,
        user_id: &UserId,
        role: Role,
    ) -> Result<Membership, StoreError> {
        let row = sqlx::query(
            r#"
            INSERT INTO memberships (club_id, user_id, role)
            VALUES ($1, $2, $3)
            RETURNING club_id, user_id, role, created_at, updated_at
            "#,
        )
        .bind(*club_id.as_uuid())
        .bind(user_id.as_str())
        .bind(role.as_str())
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("insert_membership", e))?;

        decode::<MembershipRow>(&row)?.try_into()
    }

    async fn delete_club_events(&mut self, club_id: ClubId) -> Result<u64, StoreError> {
        let done = sqlx::query("DELETE FROM events WHERE club_id = $1")
            .bind(*club_id.as_uuid())
            .execute(&mut *self.tx)
            .await
            .map_err(|e| map_sqlx_error("delete_club_events", e))?;
        Ok(done.rows_affected())
    }

    async fn remove_all_memberships(&mut self, club_id: ClubId) -> Result<u64, StoreError> {
        let done = sqlx::query("DELETE FROM memberships WHERE club_id = $1")
            .bind(*club_id.as_uuid())
            .execute(&mut *self.tx)
            .await
            .map_err(|e| map_sqlx_error("remove_all_memberships", e))?;
        Ok(done.rows_affected())
    }

    async fn delete_club(&mut self, club_id: ClubId) -> Result<(), StoreError> {
        let done = sqlx::query("DELETE FROM clubs WHERE id = $1")
            .bind(*club_id.as_uuid())
            .execute(&mut *self.tx)
            .await
            .map_err(|e| {
                if is_foreign_key_violation(&e) {
                    StoreError::MembershipsRemain(club_id)
                } else {
                    map_sqlx_error("delete_club", e)
                }
            })?;

        if done.rows_affected() == 0 {
            return Err(StoreError::not_found(format!("club {club_id}")));
        }
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        self.tx
            .commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        self.tx
            .rollback()
            .await
            .map_err(|e| map_sqlx_error("rollback", e))
    }
}

/// Map SQLx errors to StoreError.
///
/// Constraint violations carry a fixed per-operation message; the server's
/// own text stays in the logs.
fn map_sqlx_error(operation: &'static str, err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        match db_err.code().as_deref() {
            Some("23505") => {
                tracing::debug!(operation, error = %db_err.message(), "unique violation");
                return StoreError::conflict(conflict_message(operation));
            }
            Some("23503") => {
                tracing::debug!(operation, error = %db_err.message(), "foreign key violation");
                return StoreError::not_found(missing_reference_message(operation));
            }
            _ => {}
        }
    }
    StoreError::Database {
        operation,
        source: err,
    }
}

fn conflict_message(operation: &str) -> &'static str {
    match operation {
        "create_user" => "user already registered",
        "create_membership" | "insert_membership" => "membership already exists",
        "update_membership" => "club already has an owner",
        "insert_club" => "club already exists",
        _ => "resource already exists",
    }
}

fn missing_reference_message(operation: &str) -> &'static str {
    match operation {
        "create_membership" | "insert_membership" => "club or user not found",
        "create_event" => "club not found",
        _ => "referenced record not found",
    }
}

fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().as_deref() == Some("23503"),
        _ => false,
    }
}

fn decode<'r, T>(row: &'r sqlx::postgres::PgRow) -> Result<T, StoreError>
where
    T: FromRow<'r, sqlx::postgres::PgRow>,
{
    T::from_row(row).map_err(|e| StoreError::Corrupt(format!("failed to decode row: {e}")))
}

fn parse_role(raw: &str) -> Result<Role, StoreError> {
    Role::from_str(raw).map_err(|_| StoreError::Corrupt(format!("unknown role {raw:?}")))
}

/// Role used for authorization decisions. Unrecognised text grants nothing,
/// so it resolves like an absent membership instead of a fault.
fn granted_role(raw: &str) -> Option<Role> {
    let role = Role::from_str(raw).ok();
    if role.is_none() {
        tracing::warn!(role = raw, "stored membership has an unknown role");
    }
    role
}

fn parse_user_id(raw: String) -> Result<UserId, StoreError> {
    UserId::new(raw).map_err(|e| StoreError::Corrupt(e.to_string()))
}

// SQLx row types

#[derive(Debug)]
struct UserRow {
    id: String,
    first_name: String,
    last_name: String,
    email: String,
    telephone_number: Option<String>,
    email_preferences: bool,
    marketing_preferences: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, sqlx::postgres::PgRow> for UserRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(UserRow {
            id: row.try_get("id")?,
            first_name: row.try_get("first_name")?,
            last_name: row.try_get("last_name")?,
            email: row.try_get("email")?,
            telephone_number: row.try_get("telephone_number")?,
            email_preferences: row.try_get("email_preferences")?,
            marketing_preferences: row.try_get("marketing_preferences")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: parse_user_id(row.id)?,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            telephone_number: row.telephone_number,
            email_preferences: row.email_preferences,
            marketing_preferences: row.marketing_preferences,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug)]
struct ClubRow {
    id: uuid::Uuid,
    name: String,
    description: String,
    email: String,
    member_count: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, sqlx::postgres::PgRow> for ClubRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(ClubRow {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            email: row.try_get("email")?,
            member_count: row.try_get("member_count")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl From<ClubRow> for Club {
    fn from(row: ClubRow) -> Self {
        Club {
            id: ClubId::from_uuid(row.id),
            name: row.name,
            description: row.description,
            email: row.email,
            member_count: row.member_count,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug)]
struct MembershipRow {
    club_id: uuid::Uuid,
    user_id: String,
    role: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, sqlx::postgres::PgRow> for MembershipRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(MembershipRow {
            club_id: row.try_get("club_id")?,
            user_id: row.try_get("user_id")?,
            role: row.try_get("role")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl TryFrom<MembershipRow> for Membership {
    type Error = StoreError;

    fn try_from(row: MembershipRow) -> Result<Self, Self::Error> {
        Ok(Membership {
            club_id: ClubId::from_uuid(row.club_id),
            user_id: parse_user_id(row.user_id)?,
            role: parse_role(&row.role)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug)]
struct MemberRow {
    user_id: String,
    first_name: String,
    last_name: String,
    email: String,
    role: String,
    joined_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, sqlx::postgres::PgRow> for MemberRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(MemberRow {
            user_id: row.try_get("user_id")?,
            first_name: row.try_get("first_name")?,
            last_name: row.try_get("last_name")?,
            email: row.try_get("email")?,
            role: row.try_get("role")?,
            joined_at: row.try_get("joined_at")?,
        })
    }
}

impl TryFrom<MemberRow> for Member {
    type Error = StoreError;

    fn try_from(row: MemberRow) -> Result<Self, Self::Error> {
        Ok(Member {
            user_id: parse_user_id(row.user_id)?,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            role: parse_role(&row.role)?,
            joined_at: row.joined_at,
        })
    }
}

#[derive(Debug)]
struct EventRow {
    id: uuid::Uuid,
    club_id: uuid::Uuid,
    title: String,
    description: String,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
    tags: String,
    location: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, sqlx::postgres::PgRow> for EventRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(EventRow {
            id: row.try_get("id")?,
            club_id: row.try_get("club_id")?,
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            start_date: row.try_get("start_date")?,
            end_date: row.try_get("end_date")?,
            tags: row.try_get("tags")?,
            location: row.try_get("location")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl From<EventRow> for ClubEvent {
    fn from(row: EventRow) -> Self {
        ClubEvent {
            id: EventId::from_uuid(row.id),
            club_id: ClubId::from_uuid(row.club_id),
            title: row.title,
            description: row.description,
            start_date: row.start_date,
            end_date: row.end_date,
            tags: row.tags,
            location: row.location,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
