use clubhouse_auth::Role;
use clubhouse_core::{ClubId, UserId};

/// Verified identity of the caller.
///
/// Inserted by the identity middleware; present on every `/api` route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    user_id: UserId,
}

impl PrincipalContext {
    pub fn new(user_id: UserId) -> Self {
        Self { user_id }
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }
}

/// Outcome of a successful permission check for one request.
///
/// `role` is a snapshot taken when the gate ran; a concurrent role change is
/// not observed by the handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub role: Role,
    pub principal: UserId,
    pub club: ClubId,
}
