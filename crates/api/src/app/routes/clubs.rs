use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::StatusCode,
    Json,
};
use serde_json::json;

use clubhouse_infra::store::{Club, ClubDetails};

use crate::app::dto::CreatedResponse;
use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::context::{AuthContext, PrincipalContext};

pub async fn list_clubs(
    Extension(services): Extension<Arc<AppServices>>,
) -> Result<Json<Vec<Club>>, ApiError> {
    Ok(Json(services.list_clubs().await?))
}

/// Any authenticated user with a profile may create a club and becomes its owner.
pub async fn create_club(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    body: Result<Json<ClubDetails>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedResponse>), ApiError> {
    let Json(details) = body?;
    let club = services.create_club(&principal, details).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            id: club.id.to_string(),
        }),
    ))
}

pub async fn get_club(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
) -> Result<Json<Club>, ApiError> {
    Ok(Json(services.club(&ctx).await?))
}

pub async fn update_club(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
    body: Result<Json<ClubDetails>, JsonRejection>,
) -> Result<Json<Club>, ApiError> {
    let Json(details) = body?;
    Ok(Json(services.update_club(&ctx, details).await?))
}

pub async fn delete_club(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let report = services.delete_club(&ctx).await?;
    Ok(Json(json!({
        "success": true,
        "memberships_removed": report.memberships_removed,
        "events_removed": report.events_removed,
    })))
}
