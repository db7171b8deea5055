use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use clubhouse_auth::Role;
use clubhouse_core::{ClubId, EventId, UserId};

use super::model::{
    Club, ClubDetails, ClubEvent, EventDetails, Member, Membership, NewUser, User, UserClub,
};
use super::r#trait::{
    ClubEventStore, ClubStore, MembershipStore, StoreError, StoreTx, Transactional, UserStore,
};

#[derive(Debug, Default, Clone)]
struct State {
    users: BTreeMap<UserId, User>,
    clubs: BTreeMap<ClubId, Club>,
    memberships: BTreeMap<(ClubId, UserId), Membership>,
    events: BTreeMap<EventId, ClubEvent>,
}

impl State {
    fn require_club(&self, club_id: ClubId) -> Result<(), StoreError> {
        if self.clubs.contains_key(&club_id) {
            Ok(())
        } else {
            Err(StoreError::not_found(format!("club {club_id}")))
        }
    }

    fn owner_of(&self, club_id: ClubId) -> Option<&UserId> {
        self.memberships
            .values()
            .find(|m| m.club_id == club_id && m.role.is_owner())
            .map(|m| &m.user_id)
    }

    fn recount(&mut self, club_id: ClubId) {
        let count = self
            .memberships
            .keys()
            .filter(|(c, _)| *c == club_id)
            .count() as i64;
        if let Some(club) = self.clubs.get_mut(&club_id) {
            club.member_count = count;
        }
    }

    fn insert_club(&mut self, details: ClubDetails) -> Club {
        let now = Utc::now();
        let club = Club {
            id: ClubId::new(),
            name: details.name,
            description: details.description,
            email: details.email,
            member_count: 0,
            created_at: now,
            updated_at: now,
        };
        self.clubs.insert(club.id, club.clone());
        club
    }

    fn insert_membership(
        &mut self,
        club_id: ClubId,
        user_id: &UserId,
        role: Role,
    ) -> Result<Membership, StoreError> {
        self.require_club(club_id)?;
        if !self.users.contains_key(user_id) {
            return Err(StoreError::not_found(format!("user {user_id}")));
        }

        let key = (club_id, user_id.clone());
        if self.memberships.contains_key(&key) {
            return Err(StoreError::conflict(format!(
                "user {user_id} is already a member of club {club_id}"
            )));
        }
        if role.is_owner() && self.owner_of(club_id).is_some() {
            return Err(StoreError::conflict(format!("club {club_id} already has an owner")));
        }

        let now = Utc::now();
        let membership = Membership {
            club_id,
            user_id: user_id.clone(),
            role,
            created_at: now,
            updated_at: now,
        };
        self.memberships.insert(key, membership.clone());
        self.recount(club_id);
        Ok(membership)
    }

    fn update_membership(
        &mut self,
        club_id: ClubId,
        user_id: &UserId,
        role: Role,
    ) -> Result<Membership, StoreError> {
        if role.is_owner() && self.owner_of(club_id).is_some_and(|owner| owner != user_id) {
            return Err(StoreError::conflict(format!("club {club_id} already has an owner")));
        }

        let membership = self
            .memberships
            .get_mut(&(club_id, user_id.clone()))
            .ok_or_else(|| {
                StoreError::not_found(format!("membership of {user_id} in club {club_id}"))
            })?;
        membership.role = role;
        membership.updated_at = Utc::now();
        Ok(membership.clone())
    }

    fn remove_membership(&mut self, club_id: ClubId, user_id: &UserId) {
        if self.memberships.remove(&(club_id, user_id.clone())).is_some() {
            self.recount(club_id);
        }
    }

    fn remove_all_memberships(&mut self, club_id: ClubId) -> u64 {
        let before = self.memberships.len();
        self.memberships.retain(|(c, _), _| *c != club_id);
        self.recount(club_id);
        (before - self.memberships.len()) as u64
    }

    fn delete_club_events(&mut self, club_id: ClubId) -> u64 {
        let before = self.events.len();
        self.events.retain(|_, e| e.club_id != club_id);
        (before - self.events.len()) as u64
    }

    fn delete_club(&mut self, club_id: ClubId) -> Result<(), StoreError> {
        self.require_club(club_id)?;
        if self.memberships.keys().any(|(c, _)| *c == club_id) {
            return Err(StoreError::MembershipsRemain(club_id));
        }
        if self.events.values().any(|e| e.club_id == club_id) {
            return Err(StoreError::conflict(format!("club {club_id} still has events")));
        }
        self.clubs.remove(&club_id);
        Ok(())
    }
}

/// In-memory club directory.
///
/// Intended for tests/dev. One async mutex guards all state; a transaction
/// holds it for its whole lifetime and stages writes on a copy.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        let mut state = self.state.lock().await;
        if state.users.contains_key(&user.id) {
            return Err(StoreError::conflict(format!("user {} already exists", user.id)));
        }
        if state.users.values().any(|u| u.email.eq_ignore_ascii_case(&user.email)) {
            return Err(StoreError::conflict(format!("email {} already registered", user.email)));
        }

        let now = Utc::now();
        let user = User {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            telephone_number: user.telephone_number,
            email_preferences: true,
            marketing_preferences: true,
            created_at: now,
            updated_at: now,
        };
        state.users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn user_by_id(&self, user_id: &UserId) -> Result<Option<User>, StoreError> {
        Ok(self.state.lock().await.users.get(user_id).cloned())
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let state = self.state.lock().await;
        Ok(state
            .users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }
}

#[async_trait]
impl ClubStore for InMemoryStore {
    async fn club(&self, club_id: ClubId) -> Result<Option<Club>, StoreError> {
        Ok(self.state.lock().await.clubs.get(&club_id).cloned())
    }

    async fn list_clubs(&self) -> Result<Vec<Club>, StoreError> {
        let state = self.state.lock().await;
        let mut clubs: Vec<Club> = state.clubs.values().cloned().collect();
        clubs.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(clubs)
    }

    async fn update_club(&self, club_id: ClubId, details: ClubDetails) -> Result<Club, StoreError> {
        let mut state = self.state.lock().await;
        let club = state
            .clubs
            .get_mut(&club_id)
            .ok_or_else(|| StoreError::not_found(format!("club {club_id}")))?;
        club.name = details.name;
        club.description = details.description;
        club.email = details.email;
        club.updated_at = Utc::now();
        Ok(club.clone())
    }
}

#[async_trait]
impl MembershipStore for InMemoryStore {
    async fn role_of(&self, club_id: ClubId, user_id: &UserId) -> Result<Option<Role>, StoreError> {
        let state = self.state.lock().await;
        Ok(state
            .memberships
            .get(&(club_id, user_id.clone()))
            .map(|m| m.role))
    }

    async fn create_membership(
        &self,
        club_id: ClubId,
        user_id: &UserId,
        role: Role,
    ) -> Result<Membership, StoreError> {
        self.state.lock().await.insert_membership(club_id, user_id, role)
    }

    async fn update_membership(
        &self,
        club_id: ClubId,
        user_id: &UserId,
        role: Role,
    ) -> Result<Membership, StoreError> {
        self.state.lock().await.update_membership(club_id, user_id, role)
    }

    async fn remove_membership(&self, club_id: ClubId, user_id: &UserId) -> Result<(), StoreError> {
        self.state.lock().await.remove_membership(club_id, user_id);
        Ok(())
    }

    async fn remove_all_memberships(&self, club_id: ClubId) -> Result<u64, StoreError> {
        Ok(self.state.lock().await.remove_all_memberships(club_id))
    }

    async fn list_by_club(&self, club_id: ClubId) -> Result<Vec<Member>, StoreError> {
        let state = self.state.lock().await;
        let mut members: Vec<Member> = state
            .memberships
            .values()
            .filter(|m| m.club_id == club_id)
            .filter_map(|m| {
                state.users.get(&m.user_id).map(|u| Member {
                    user_id: u.id.clone(),
                    first_name: u.first_name.clone(),
                    last_name: u.last_name.clone(),
                    email: u.email.clone(),
                    role: m.role,
                    joined_at: m.created_at,
                })
            })
            .collect();
        members.sort_by(|a, b| (a.joined_at, &a.user_id).cmp(&(b.joined_at, &b.user_id)));
        Ok(members)
    }

    async fn list_by_user(&self, user_id: &UserId) -> Result<Vec<UserClub>, StoreError> {
        let state = self.state.lock().await;
        let mut clubs: Vec<UserClub> = state
            .memberships
            .values()
            .filter(|m| &m.user_id == user_id)
            .filter_map(|m| {
                state.clubs.get(&m.club_id).map(|c| UserClub {
                    club: c.clone(),
                    role: m.role,
                })
            })
            .collect();
        clubs.sort_by(|a, b| (b.club.created_at, b.club.id).cmp(&(a.club.created_at, a.club.id)));
        Ok(clubs)
    }
}

#[async_trait]
impl ClubEventStore for InMemoryStore {
    async fn create_event(&self, club_id: ClubId, details: EventDetails) -> Result<ClubEvent, StoreError> {
        let mut state = self.state.lock().await;
        state.require_club(club_id)?;

        let now = Utc::now();
        let event = ClubEvent {
            id: EventId::new(),
            club_id,
            title: details.title,
            description: details.description,
            start_date: details.start_date,
            end_date: details.end_date,
            tags: details.tags,
            location: details.location,
            created_at: now,
            updated_at: now,
        };
        state.events.insert(event.id, event.clone());
        Ok(event)
    }

    async fn event(&self, club_id: ClubId, event_id: EventId) -> Result<Option<ClubEvent>, StoreError> {
        let state = self.state.lock().await;
        Ok(state
            .events
            .get(&event_id)
            .filter(|e| e.club_id == club_id)
            .cloned())
    }

    async fn list_events(&self, club_id: ClubId) -> Result<Vec<ClubEvent>, StoreError> {
        let state = self.state.lock().await;
        let mut events: Vec<ClubEvent> = state
            .events
            .values()
            .filter(|e| e.club_id == club_id)
            .cloned()
            .collect();
        events.sort_by(|a, b| (b.start_date, b.id).cmp(&(a.start_date, a.id)));
        Ok(events)
    }

    async fn update_event(
        &self,
        club_id: ClubId,
        event_id: EventId,
        details: EventDetails,
    ) -> Result<ClubEvent, StoreError> {
        let mut state = self.state.lock().await;
        let event = state
            .events
            .get_mut(&event_id)
            .filter(|e| e.club_id == club_id)
            .ok_or_else(|| StoreError::not_found(format!("event {event_id}")))?;
        event.title = details.title;
        event.description = details.description;
        event.start_date = details.start_date;
        event.end_date = details.end_date;
        event.tags = details.tags;
        event.location = details.location;
        event.updated_at = Utc::now();
        Ok(event.clone())
    }

    async fn delete_event(&self, club_id: ClubId, event_id: EventId) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        match state.events.get(&event_id) {
            Some(e) if e.club_id == club_id => {
                state.events.remove(&event_id);
                Ok(())
            }
            _ => Err(StoreError::not_found(format!("event {event_id}"))),
        }
    }
}

/// Staged writes over a locked snapshot; published on commit.
struct InMemoryTx {
    live: OwnedMutexGuard<State>,
    staged: State,
}

#[async_trait]
impl Transactional for InMemoryStore {
    async fn begin(&self) -> Result<Box<dyn StoreTx>, StoreError> {
        let live = self.state.clone().lock_owned().await;
        let staged = live.clone();
        Ok(Box::new(InMemoryTx { live, staged }))
    }
}

#[async_trait]
impl StoreTx for InMemoryTx {
    async fn insert_club(&mut self, details: ClubDetails) -> Result<Club, StoreError> {
        Ok(self.staged.insert_club(details))
    }

    async fn insert_membership(
        &mut self,
        club_id: ClubId,
        user_id: &UserId,
        role: Role,
    ) -> Result<Membership, StoreError> {
        self.staged.insert_membership(club_id, user_id, role)
    }

    async fn delete_club_events(&mut self, club_id: ClubId) -> Result<u64, StoreError> {
        Ok(self.staged.delete_club_events(club_id))
    }

    async fn remove_all_memberships(&mut self, club_id: ClubId) -> Result<u64, StoreError> {
        Ok(self.staged.remove_all_memberships(club_id))
    }

    async fn delete_club(&mut self, club_id: ClubId) -> Result<(), StoreError> {
        self.staged.delete_club(club_id)
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let InMemoryTx { mut live, staged } = *self;
        *live = staged;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        Ok(())
    }
}
