use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension},
    Json,
};

use crate::app::dto::{
    AddMemberRequest, ClubDetailsResponse, RemoveMemberRequest, SuccessResponse,
    UpdateMemberRequest,
};
use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::context::AuthContext;

pub async fn club_details(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
) -> Result<Json<ClubDetailsResponse>, ApiError> {
    Ok(Json(services.club_details(&ctx).await?))
}

pub async fn add_member(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
    body: Result<Json<AddMemberRequest>, JsonRejection>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let Json(body) = body?;
    services.add_member(&ctx, body).await?;
    Ok(Json(SuccessResponse::ok()))
}

pub async fn update_member(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
    body: Result<Json<UpdateMemberRequest>, JsonRejection>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let Json(body) = body?;
    services.update_member(&ctx, body).await?;
    Ok(Json(SuccessResponse::ok()))
}

/// Idempotent: removing a non-member succeeds.
pub async fn remove_member(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
    body: Result<Json<RemoveMemberRequest>, JsonRejection>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let Json(body) = body?;
    services.remove_member(&ctx, body).await?;
    Ok(Json(SuccessResponse::ok()))
}
