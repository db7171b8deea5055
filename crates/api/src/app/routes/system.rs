use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Extension, Request},
    http::StatusCode,
    middleware::Next,
    response::Response,
    Json,
};

use clubhouse_auth::RoleDefinition;

use crate::app::services::AppServices;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

/// The role catalog: each role with the permissions it grants.
pub async fn roles(Extension(services): Extension<Arc<AppServices>>) -> Json<Vec<RoleDefinition>> {
    Json(services.role_definitions())
}

/// One log line per request.
pub async fn log_requests(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(req).await;

    tracing::info!(
        %method,
        %path,
        status = response.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "request"
    );
    response
}
