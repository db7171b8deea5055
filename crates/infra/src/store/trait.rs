use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use clubhouse_auth::{LookupError, MembershipLookup, Role};
use clubhouse_core::{ClubId, EventId, UserId};

use super::model::{
    Club, ClubDetails, ClubEvent, EventDetails, Member, Membership, NewUser, User, UserClub,
};

/// Club directory operation error.
///
/// `NotFound`, `Conflict` and `MembershipsRemain` are outcomes the caller caused;
/// `Database` and `Corrupt` are infrastructure faults whose detail must not
/// reach API clients.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("club {0} still has memberships")]
    MembershipsRemain(ClubId),

    #[error("database error in {operation}: {source}")]
    Database {
        operation: &'static str,
        #[source]
        source: sqlx::Error,
    },

    #[error("corrupt row: {0}")]
    Corrupt(String),
}

impl StoreError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with `Conflict` if the id or email is already registered.
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError>;

    async fn user_by_id(&self, user_id: &UserId) -> Result<Option<User>, StoreError>;

    async fn user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
}

#[async_trait]
pub trait ClubStore: Send + Sync {
    async fn club(&self, club_id: ClubId) -> Result<Option<Club>, StoreError>;

    /// All clubs, newest first.
    async fn list_clubs(&self) -> Result<Vec<Club>, StoreError>;

    async fn update_club(&self, club_id: ClubId, details: ClubDetails) -> Result<Club, StoreError>;
}

/// CRUD over the (club, user, role) relation.
///
/// Club creation and teardown do not go through here: they run inside a
/// [`StoreTx`] driven by the lifecycle coordinator.
#[async_trait]
pub trait MembershipStore: Send + Sync {
    async fn role_of(&self, club_id: ClubId, user_id: &UserId) -> Result<Option<Role>, StoreError>;

    /// Fails with `Conflict` if the pair already has a membership or if a second
    /// owner would be created; `NotFound` if the club or user does not exist.
    async fn create_membership(
        &self,
        club_id: ClubId,
        user_id: &UserId,
        role: Role,
    ) -> Result<Membership, StoreError>;

    /// Fails with `NotFound` if no membership exists.
    async fn update_membership(
        &self,
        club_id: ClubId,
        user_id: &UserId,
        role: Role,
    ) -> Result<Membership, StoreError>;

    /// Idempotent.
    async fn remove_membership(&self, club_id: ClubId, user_id: &UserId) -> Result<(), StoreError>;

    /// Bulk delete. Returns the number of rows removed.
    async fn remove_all_memberships(&self, club_id: ClubId) -> Result<u64, StoreError>;

    /// Members in join order.
    async fn list_by_club(&self, club_id: ClubId) -> Result<Vec<Member>, StoreError>;

    /// Clubs the user belongs to, newest club first.
    async fn list_by_user(&self, user_id: &UserId) -> Result<Vec<UserClub>, StoreError>;
}

#[async_trait]
pub trait ClubEventStore: Send + Sync {
    async fn create_event(&self, club_id: ClubId, details: EventDetails) -> Result<ClubEvent, StoreError>;

    async fn event(&self, club_id: ClubId, event_id: EventId) -> Result<Option<ClubEvent>, StoreError>;

    /// Events of one club, latest start date first.
    async fn list_events(&self, club_id: ClubId) -> Result<Vec<ClubEvent>, StoreError>;

    async fn update_event(
        &self,
        club_id: ClubId,
        event_id: EventId,
        details: EventDetails,
    ) -> Result<ClubEvent, StoreError>;

    /// Fails with `NotFound` if the event does not exist in the club.
    async fn delete_event(&self, club_id: ClubId, event_id: EventId) -> Result<(), StoreError>;
}

/// A unit of work spanning several writes.
///
/// Dropping a transaction without calling [`StoreTx::commit`] discards every
/// staged write.
#[async_trait]
pub trait StoreTx: Send {
    async fn insert_club(&mut self, details: ClubDetails) -> Result<Club, StoreError>;

    async fn insert_membership(
        &mut self,
        club_id: ClubId,
        user_id: &UserId,
        role: Role,
    ) -> Result<Membership, StoreError>;

    async fn delete_club_events(&mut self, club_id: ClubId) -> Result<u64, StoreError>;

    async fn remove_all_memberships(&mut self, club_id: ClubId) -> Result<u64, StoreError>;

    /// Fails with `MembershipsRemain` while any membership references the club.
    async fn delete_club(&mut self, club_id: ClubId) -> Result<(), StoreError>;

    async fn commit(self: Box<Self>) -> Result<(), StoreError>;

    async fn rollback(self: Box<Self>) -> Result<(), StoreError>;
}

#[async_trait]
pub trait Transactional: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn StoreTx>, StoreError>;
}

/// Everything the HTTP layer needs from persistence, as one object.
pub trait ClubDirectory:
    UserStore + ClubStore + MembershipStore + ClubEventStore + Transactional
{
}

impl<T> ClubDirectory for T where
    T: UserStore + ClubStore + MembershipStore + ClubEventStore + Transactional
{
}

/// Adapts a [`MembershipStore`] to the authorization engine's lookup seam.
pub struct MembershipRoles<S: ?Sized>(pub Arc<S>);

#[async_trait]
impl<S> MembershipLookup for MembershipRoles<S>
where
    S: MembershipStore + ?Sized,
{
    async fn role_of(&self, club_id: ClubId, user_id: &UserId) -> Result<Option<Role>, LookupError> {
        MembershipStore::role_of(&*self.0, club_id, user_id)
            .await
            .map_err(|e| LookupError(e.to_string()))
    }
}
