//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store selection and the operations behind each route
//! - `routes/`: HTTP handlers (one file per resource)
//! - `dto.rs`: request/response DTOs and input validation
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{middleware::from_fn, middleware::from_fn_with_state, routing::get, Extension, Router};
use tower::ServiceBuilder;

use clubhouse_auth::{Hs256TokenVerifier, PermissionCatalog, TokenVerifier};
use clubhouse_infra::store::{InMemoryStore, PostgresStore, StoreError};

use crate::config::Config;
use crate::middleware::{self, AuthState};

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

use services::AppServices;

/// Build the full HTTP router, selecting the store from `config`.
pub async fn build_app(config: &Config) -> Result<Router, StoreError> {
    let catalog = Arc::new(PermissionCatalog::standard());

    let services = match &config.database_url {
        Some(url) => {
            let store = PostgresStore::connect(url, config.db_max_connections).await?;
            tracing::info!("using postgres store");
            AppServices::new(Arc::new(store), catalog)
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using in-memory store");
            AppServices::new(Arc::new(InMemoryStore::new()), catalog)
        }
    };

    let verifier = Arc::new(Hs256TokenVerifier::new(config.jwt_secret.as_bytes()));
    Ok(router(Arc::new(services), verifier))
}

/// Assemble routes and middleware around already-built services.
pub fn router(services: Arc<AppServices>, verifier: Arc<dyn TokenVerifier>) -> Router {
    let auth_state = AuthState { verifier };

    // Protected routes: require a verified bearer token.
    let protected = routes::router(services.engine())
        .layer(Extension(services))
        .layer(from_fn_with_state(auth_state, middleware::auth_middleware));

    Router::new()
        .route("/health", get(routes::system::health))
        .nest("/api", protected)
        .layer(ServiceBuilder::new().layer(from_fn(routes::system::log_requests)))
}
