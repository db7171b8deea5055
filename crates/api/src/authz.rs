//! Per-route permission gate.
//!
//! Runs after the identity middleware. Resolves the `club-id` header, asks the
//! [`AuthorizationEngine`] whether the caller holds the route's permission and,
//! on success, hands the handler a typed [`AuthContext`].

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use clubhouse_auth::{AuthorizationEngine, Decision, Permission};
use clubhouse_core::ClubId;

use crate::app::errors::ApiError;
use crate::context::{AuthContext, PrincipalContext};

pub const CLUB_ID_HEADER: &str = "club-id";

/// Middleware state: the engine plus the permission one route requires.
#[derive(Clone)]
pub struct Gate {
    engine: Arc<AuthorizationEngine>,
    permission: Permission,
}

impl Gate {
    pub fn new(engine: Arc<AuthorizationEngine>, permission: Permission) -> Self {
        Self { engine, permission }
    }
}

pub async fn require_permission(
    State(gate): State<Gate>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let ctx = authorize(
        &gate.engine,
        req.extensions().get::<PrincipalContext>(),
        req.headers(),
        gate.permission,
    )
    .await?;

    req.extensions_mut().insert(ctx);
    Ok(next.run(req).await)
}

/// Decide one request. Errors map directly to HTTP responses.
pub async fn authorize(
    engine: &AuthorizationEngine,
    principal: Option<&PrincipalContext>,
    headers: &HeaderMap,
    permission: Permission,
) -> Result<AuthContext, ApiError> {
    let principal = principal
        .ok_or_else(|| ApiError::Unauthenticated("unauthenticated".to_string()))?
        .user_id()
        .clone();
    let club = club_id_from_headers(headers)?;

    match engine.decide(club, &principal, permission).await? {
        Decision::Allow { role } => Ok(AuthContext {
            role,
            principal,
            club,
        }),
        Decision::Deny(reason) => Err(ApiError::Forbidden(format!(
            "{permission} denied: {reason}"
        ))),
    }
}

pub fn club_id_from_headers(headers: &HeaderMap) -> Result<ClubId, ApiError> {
    let raw = headers
        .get(CLUB_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .unwrap_or_default();
    if raw.is_empty() {
        return Err(ApiError::BadRequest("club id required".to_string()));
    }
    raw.parse()
        .map_err(|_| ApiError::BadRequest("invalid club id".to_string()))
}
