use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use clubhouse_core::{ClubId, UserId};

use crate::{Permission, PermissionCatalog, Role};

/// Opaque failure of the membership source (storage fault, not "not a member").
#[derive(Debug, Error)]
#[error("membership lookup failed: {0}")]
pub struct LookupError(pub String);

/// Source of truth for "which role does this user hold in this club".
///
/// `Ok(None)` means the user is not a member; it is an expected outcome.
#[async_trait]
pub trait MembershipLookup: Send + Sync {
    async fn role_of(&self, club_id: ClubId, user_id: &UserId) -> Result<Option<Role>, LookupError>;
}

#[async_trait]
impl<L> MembershipLookup for Arc<L>
where
    L: MembershipLookup + ?Sized,
{
    async fn role_of(&self, club_id: ClubId, user_id: &UserId) -> Result<Option<Role>, LookupError> {
        (**self).role_of(club_id, user_id).await
    }
}

#[derive(Debug, Error)]
pub enum AuthzError {
    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error("owner cannot change or remove their own membership")]
    OwnerSelfMutation,

    #[error("the owner membership cannot be changed or removed")]
    OwnerMembershipProtected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    NoMembership,
    InsufficientRole { role: Role, required: Permission },
}

impl core::fmt::Display for DenyReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            DenyReason::NoMembership => f.write_str("no membership"),
            DenyReason::InsufficientRole { .. } => f.write_str("insufficient role"),
        }
    }
}

/// Outcome of a permission check. `Allow` carries the resolved role for downstream use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow { role: Role },
    Deny(DenyReason),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow { .. })
    }
}

/// Resolves a user's role within a club and checks it against the catalog.
///
/// - No state of its own; the role is re-fetched on every call
/// - No caching to invalidate
pub struct AuthorizationEngine {
    catalog: Arc<PermissionCatalog>,
    memberships: Arc<dyn MembershipLookup>,
}

impl AuthorizationEngine {
    pub fn new(catalog: Arc<PermissionCatalog>, memberships: Arc<dyn MembershipLookup>) -> Self {
        Self {
            catalog,
            memberships,
        }
    }

    pub fn catalog(&self) -> &PermissionCatalog {
        &self.catalog
    }

    pub async fn decide(
        &self,
        club_id: ClubId,
        user_id: &UserId,
        required: Permission,
    ) -> Result<Decision, AuthzError> {
        let Some(role) = self.memberships.role_of(club_id, user_id).await? else {
            tracing::debug!(%club_id, %user_id, %required, "denied: no membership");
            return Ok(Decision::Deny(DenyReason::NoMembership));
        };

        if self.catalog.has_permission(role, required) {
            Ok(Decision::Allow { role })
        } else {
            tracing::debug!(%club_id, %user_id, %role, %required, "denied: insufficient role");
            Ok(Decision::Deny(DenyReason::InsufficientRole { role, required }))
        }
    }
}

/// Refuse any role change or removal of a stored owner membership.
///
/// The owner row only goes away with the club, so `club.delete` always keeps a holder.
/// `target_role` must come from the stored membership row, never from the request payload.
pub fn guard_owner_membership(
    principal: &UserId,
    target: &UserId,
    target_role: Role,
) -> Result<(), AuthzError> {
    if !target_role.is_owner() {
        return Ok(());
    }
    if principal == target {
        Err(AuthzError::OwnerSelfMutation)
    } else {
        Err(AuthzError::OwnerMembershipProtected)
    }
}
