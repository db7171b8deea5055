use std::sync::Arc;

use axum::{
    handler::Handler,
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};

use clubhouse_auth::{AuthorizationEngine, Permission};

use crate::authz::{self, Gate};

pub mod clubs;
pub mod events;
pub mod members;
pub mod system;
pub mod users;

/// Router for every endpoint under `/api`. Club-scoped handlers carry their
/// own permission gate.
pub fn router(engine: Arc<AuthorizationEngine>) -> Router {
    let gate = |permission: Permission| {
        from_fn_with_state(Gate::new(engine.clone(), permission), authz::require_permission)
    };

    Router::new()
        .route("/user", post(users::create_user))
        .route("/user/clubs", get(users::my_clubs))
        .route("/roles", get(system::roles))
        .route("/clubs", get(clubs::list_clubs))
        .route(
            "/club",
            post(clubs::create_club)
                .get(clubs::get_club.layer(gate(Permission::ClubRead)))
                .put(clubs::update_club.layer(gate(Permission::ClubUpdate)))
                .delete(clubs::delete_club.layer(gate(Permission::ClubDelete))),
        )
        .route(
            "/club-user/details",
            get(members::club_details.layer(gate(Permission::ClubRead))),
        )
        .route(
            "/club-user",
            get(users::my_clubs)
                .post(members::add_member.layer(gate(Permission::MemberAdd)))
                .put(members::update_member.layer(gate(Permission::MemberUpdate)))
                .delete(members::remove_member.layer(gate(Permission::MemberRemove))),
        )
        .route(
            "/event",
            post(events::create_event.layer(gate(Permission::EventWrite)))
                .get(events::get_event.layer(gate(Permission::ClubRead)))
                .put(events::update_event.layer(gate(Permission::EventUpdate)))
                .delete(events::delete_event.layer(gate(Permission::EventDelete))),
        )
        .route("/events", get(events::list_events.layer(gate(Permission::ClubRead))))
}
