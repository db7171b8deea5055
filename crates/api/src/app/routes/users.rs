use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::StatusCode,
    Json,
};

use clubhouse_infra::store::{User, UserClub};

use crate::app::dto::CreateUserRequest;
use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

/// Create the caller's profile; the id is the token subject.
pub async fn create_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    body: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let Json(body) = body?;
    let user = services.register_user(&principal, body).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn my_clubs(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> Result<Json<Vec<UserClub>>, ApiError> {
    Ok(Json(services.clubs_of(&principal).await?))
}
