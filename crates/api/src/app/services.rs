//! Service wiring and the request-level operations behind the routes.

use std::sync::Arc;

use clubhouse_auth::{
    guard_owner_membership, AuthorizationEngine, PermissionCatalog, Role, RoleDefinition,
};
use clubhouse_core::{EventId, UserId};
use clubhouse_infra::store::{
    Club, ClubDetails, ClubDirectory, ClubEvent, EventDetails, Membership, MembershipRoles,
    NewUser, User, UserClub,
};
use clubhouse_infra::{ClubLifecycle, Teardown};

use crate::app::dto::{self, ClubDetailsResponse};
use crate::app::errors::ApiError;
use crate::context::{AuthContext, PrincipalContext};

pub struct AppServices {
    directory: Arc<dyn ClubDirectory>,
    lifecycle: ClubLifecycle,
    engine: Arc<AuthorizationEngine>,
}

impl AppServices {
    pub fn new<S>(store: Arc<S>, catalog: Arc<PermissionCatalog>) -> Self
    where
        S: ClubDirectory + 'static,
    {
        let engine = AuthorizationEngine::new(catalog, Arc::new(MembershipRoles(store.clone())));
        Self {
            directory: store.clone(),
            lifecycle: ClubLifecycle::new(store),
            engine: Arc::new(engine),
        }
    }

    pub fn engine(&self) -> Arc<AuthorizationEngine> {
        self.engine.clone()
    }

    pub fn role_definitions(&self) -> Vec<RoleDefinition> {
        self.engine.catalog().definitions()
    }

    // -------------------------
    // Users
    // -------------------------

    pub async fn register_user(
        &self,
        principal: &PrincipalContext,
        body: dto::CreateUserRequest,
    ) -> Result<User, ApiError> {
        body.validate()?;
        let user = self
            .directory
            .create_user(NewUser {
                id: principal.user_id().clone(),
                first_name: body.first_name.trim().to_string(),
                last_name: body.last_name.trim().to_string(),
                email: body.email.trim().to_string(),
                telephone_number: body.telephone_number.filter(|t| !t.trim().is_empty()),
            })
            .await?;
        tracing::info!(user_id = %user.id, "user registered");
        Ok(user)
    }

    pub async fn clubs_of(&self, principal: &PrincipalContext) -> Result<Vec<UserClub>, ApiError> {
        Ok(self.directory.list_by_user(principal.user_id()).await?)
    }

    // -------------------------
    // Clubs
    // -------------------------

    pub async fn list_clubs(&self) -> Result<Vec<Club>, ApiError> {
        Ok(self.directory.list_clubs().await?)
    }

    pub async fn create_club(
        &self,
        principal: &PrincipalContext,
        details: ClubDetails,
    ) -> Result<Club, ApiError> {
        dto::validate_club(&details)?;
        if self.directory.user_by_id(principal.user_id()).await?.is_none() {
            return Err(ApiError::NotFound("user profile not found".to_string()));
        }
        Ok(self.lifecycle.create_club(principal.user_id(), details).await?)
    }

    pub async fn club(&self, ctx: &AuthContext) -> Result<Club, ApiError> {
        self.directory
            .club(ctx.club)
            .await?
            .ok_or_else(|| ApiError::NotFound("club not found".to_string()))
    }

    pub async fn club_details(&self, ctx: &AuthContext) -> Result<ClubDetailsResponse, ApiError> {
        let club = self.club(ctx).await?;
        let members = self.directory.list_by_club(ctx.club).await?;
        Ok(ClubDetailsResponse { club, members })
    }

    pub async fn update_club(&self, ctx: &AuthContext, details: ClubDetails) -> Result<Club, ApiError> {
        dto::validate_club(&details)?;
        Ok(self.directory.update_club(ctx.club, details).await?)
    }

    pub async fn delete_club(&self, ctx: &AuthContext) -> Result<Teardown, ApiError> {
        Ok(self.lifecycle.teardown(ctx.club).await?)
    }

    // -------------------------
    // Members
    // -------------------------

    pub async fn add_member(
        &self,
        ctx: &AuthContext,
        body: dto::AddMemberRequest,
    ) -> Result<Membership, ApiError> {
        let role = dto::parse_assignable_role(&body.role)?;
        dto::validate_email(&body.email)?;

        let user = self
            .directory
            .user_by_email(body.email.trim())
            .await?
            .ok_or_else(|| ApiError::NotFound("user not found".to_string()))?;

        let membership = self.directory.create_membership(ctx.club, &user.id, role).await?;
        tracing::info!(club_id = %ctx.club, user_id = %user.id, %role, by = %ctx.principal, "member added");
        Ok(membership)
    }

    pub async fn update_member(
        &self,
        ctx: &AuthContext,
        body: dto::UpdateMemberRequest,
    ) -> Result<Membership, ApiError> {
        let target = dto::parse_user_id(&body.user_id)?;

        // Owner row is refused before the payload role is looked at.
        let stored = self.stored_role(ctx, &target).await?;
        guard_owner_membership(&ctx.principal, &target, stored)?;
        let role = dto::parse_assignable_role(&body.role)?;

        let membership = self.directory.update_membership(ctx.club, &target, role).await?;
        tracing::info!(club_id = %ctx.club, user_id = %target, from = %stored, to = %role, by = %ctx.principal, "member role changed");
        Ok(membership)
    }

    pub async fn remove_member(
        &self,
        ctx: &AuthContext,
        body: dto::RemoveMemberRequest,
    ) -> Result<(), ApiError> {
        let target = dto::parse_user_id(&body.user_id)?;

        if let Some(stored) = self.directory.role_of(ctx.club, &target).await? {
            guard_owner_membership(&ctx.principal, &target, stored)?;
        }

        self.directory.remove_membership(ctx.club, &target).await?;
        tracing::info!(club_id = %ctx.club, user_id = %target, by = %ctx.principal, "member removed");
        Ok(())
    }

    async fn stored_role(
        &self,
        ctx: &AuthContext,
        target: &UserId,
    ) -> Result<Role, ApiError> {
        self.directory
            .role_of(ctx.club, target)
            .await?
            .ok_or_else(|| ApiError::NotFound("membership not found".to_string()))
    }

    // -------------------------
    // Events
    // -------------------------

    pub async fn create_event(&self, ctx: &AuthContext, details: EventDetails) -> Result<ClubEvent, ApiError> {
        dto::validate_event(&details)?;
        Ok(self.directory.create_event(ctx.club, details).await?)
    }

    pub async fn list_events(&self, ctx: &AuthContext) -> Result<Vec<ClubEvent>, ApiError> {
        Ok(self.directory.list_events(ctx.club).await?)
    }

    pub async fn event(&self, ctx: &AuthContext, event_id: EventId) -> Result<ClubEvent, ApiError> {
        self.directory
            .event(ctx.club, event_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("event not found".to_string()))
    }

    pub async fn update_event(
        &self,
        ctx: &AuthContext,
        event_id: EventId,
        details: EventDetails,
    ) -> Result<ClubEvent, ApiError> {
        dto::validate_event(&details)?;
        Ok(self.directory.update_event(ctx.club, event_id, details).await?)
    }

    pub async fn delete_event(&self, ctx: &AuthContext, event_id: EventId) -> Result<(), ApiError> {
        Ok(self.directory.delete_event(ctx.club, event_id).await?)
    }
}
