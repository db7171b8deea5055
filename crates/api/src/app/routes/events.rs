use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::{HeaderMap, StatusCode},
    Json,
};

use clubhouse_core::EventId;
use clubhouse_infra::store::{ClubEvent, EventDetails};

use crate::app::dto::SuccessResponse;
use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::context::AuthContext;

pub const EVENT_ID_HEADER: &str = "event-id";

fn event_id(headers: &HeaderMap) -> Result<EventId, ApiError> {
    let raw = headers
        .get(EVENT_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .unwrap_or_default();
    if raw.is_empty() {
        return Err(ApiError::BadRequest("event id required".to_string()));
    }
    raw.parse()
        .map_err(|_| ApiError::BadRequest("invalid event id".to_string()))
}

pub async fn create_event(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
    body: Result<Json<EventDetails>, JsonRejection>,
) -> Result<(StatusCode, Json<ClubEvent>), ApiError> {
    let Json(details) = body?;
    let event = services.create_event(&ctx, details).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

pub async fn list_events(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
) -> Result<Json<Vec<ClubEvent>>, ApiError> {
    Ok(Json(services.list_events(&ctx).await?))
}

pub async fn get_event(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
    headers: HeaderMap,
) -> Result<Json<ClubEvent>, ApiError> {
    let id = event_id(&headers)?;
    Ok(Json(services.event(&ctx, id).await?))
}

pub async fn update_event(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
    headers: HeaderMap,
    body: Result<Json<EventDetails>, JsonRejection>,
) -> Result<Json<ClubEvent>, ApiError> {
    let id = event_id(&headers)?;
    let Json(details) = body?;
    Ok(Json(services.update_event(&ctx, id, details).await?))
}

pub async fn delete_event(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
    headers: HeaderMap,
) -> Result<Json<SuccessResponse>, ApiError> {
    let id = event_id(&headers)?;
    services.delete_event(&ctx, id).await?;
    Ok(Json(SuccessResponse::ok()))
}
