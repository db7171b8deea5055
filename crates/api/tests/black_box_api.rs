use chrono::{Duration as ChronoDuration, Utc};
use clubhouse_api::config::Config;
use clubhouse_auth::TokenClaims;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::StatusCode;
use serde_json::{json, Value};

const JWT_SECRET: &str = "test-secret";

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        clubhouse_observability::init_for_tests();

        // Same router as prod (in-memory store), bound to an ephemeral port.
        let app = clubhouse_api::app::build_app(&Config::new(JWT_SECRET))
            .await
            .expect("failed to build app");
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn mint_jwt(secret: &str, sub: &str) -> String {
    let claims = TokenClaims::new(sub, Utc::now(), ChronoDuration::minutes(10));
    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("failed to encode jwt")
}

/// A caller with a registered profile.
struct Caller {
    id: String,
    email: String,
    token: String,
}

async fn register(client: &reqwest::Client, srv: &TestServer, id: &str) -> Caller {
    let token = mint_jwt(JWT_SECRET, id);
    let email = format!("{}@example.com", id.replace('|', "-"));
    let res = client
        .post(srv.url("/api/user"))
        .bearer_auth(&token)
        .json(&json!({ "first_name": "Test", "last_name": id, "email": email }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    Caller {
        id: id.to_string(),
        email,
        token,
    }
}

async fn create_club(client: &reqwest::Client, srv: &TestServer, owner: &Caller, name: &str) -> String {
    let res = client
        .post(srv.url("/api/club"))
        .bearer_auth(&owner.token)
        .json(&json!({ "name": name, "description": "weekly", "email": "club@example.com" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await.unwrap();
    body["id"].as_str().unwrap().to_string()
}

async fn add_member(
    client: &reqwest::Client,
    srv: &TestServer,
    by: &Caller,
    club: &str,
    email: &str,
    role: &str,
) -> reqwest::Response {
    client
        .post(srv.url("/api/club-user"))
        .bearer_auth(&by.token)
        .header("club-id", club)
        .json(&json!({ "email": email, "role": role }))
        .send()
        .await
        .unwrap()
}

async fn member_role(client: &reqwest::Client, srv: &TestServer, by: &Caller, club: &str, user: &str) -> Option<String> {
    let res = client
        .get(srv.url("/api/club-user/details"))
        .bearer_auth(&by.token)
        .header("club-id", club)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    body["members"]
        .as_array()
        .unwrap()
        .iter()
        .find(|m| m["user_id"] == user)
        .map(|m| m["role"].as_str().unwrap().to_string())
}

#[tokio::test]
async fn health_is_public_and_api_requires_a_token() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client.get(srv.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client.get(srv.url("/api/clubs")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "unauthenticated");

    let forged = mint_jwt("wrong-secret", "u1");
    let res = client
        .get(srv.url("/api/clubs"))
        .bearer_auth(forged)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn creator_becomes_owner_and_can_update() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let u1 = register(&client, &srv, "auth0|u1").await;

    let club = create_club(&client, &srv, &u1, "Chess").await;

    let res = client
        .get(srv.url("/api/club"))
        .bearer_auth(&u1.token)
        .header("club-id", &club)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["name"], "Chess");
    assert_eq!(body["member_count"], 1);

    let res = client
        .get(srv.url("/api/user/clubs"))
        .bearer_auth(&u1.token)
        .send()
        .await
        .unwrap();
    let clubs: Value = res.json().await.unwrap();
    assert_eq!(clubs[0]["id"], club.as_str());
    assert_eq!(clubs[0]["role"], "owner");

    // Older clients list their clubs here; no club-id needed.
    let res = client
        .get(srv.url("/api/club-user"))
        .bearer_auth(&u1.token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let alias: Value = res.json().await.unwrap();
    assert_eq!(alias, clubs);

    let res = client
        .put(srv.url("/api/club"))
        .bearer_auth(&u1.token)
        .header("club-id", &club)
        .json(&json!({ "name": "Chess & Go" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["name"], "Chess & Go");
}

#[tokio::test]
async fn creating_a_club_requires_a_profile() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(srv.url("/api/club"))
        .bearer_auth(mint_jwt(JWT_SECRET, "stranger"))
        .json(&json!({ "name": "Ghost club" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client
        .get(srv.url("/api/clubs"))
        .bearer_auth(mint_jwt(JWT_SECRET, "stranger"))
        .send()
        .await
        .unwrap();
    let clubs: Value = res.json().await.unwrap();
    assert!(clubs.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn owner_cannot_change_or_remove_own_membership() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let u1 = register(&client, &srv, "u1").await;
    let club = create_club(&client, &srv, &u1, "Chess").await;

    // Refused whatever role the payload asks for.
    for role in ["member", "owner", "bogus"] {
        let res = client
            .put(srv.url("/api/club-user"))
            .bearer_auth(&u1.token)
            .header("club-id", &club)
            .json(&json!({ "user-id": u1.id, "role": role }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::FORBIDDEN, "role {role}");
    }

    let res = client
        .delete(srv.url("/api/club-user"))
        .bearer_auth(&u1.token)
        .header("club-id", &club)
        .json(&json!({ "user-id": u1.id }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    assert_eq!(
        member_role(&client, &srv, &u1, &club, &u1.id).await.as_deref(),
        Some("owner")
    );
}

#[tokio::test]
async fn admins_cannot_demote_or_remove_the_owner() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let u1 = register(&client, &srv, "u1").await;
    let u2 = register(&client, &srv, "u2").await;
    let club = create_club(&client, &srv, &u1, "Chess").await;
    add_member(&client, &srv, &u1, &club, &u2.email, "admin").await;

    let res = client
        .put(srv.url("/api/club-user"))
        .bearer_auth(&u2.token)
        .header("club-id", &club)
        .json(&json!({ "user-id": u1.id, "role": "member" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = client
        .delete(srv.url("/api/club-user"))
        .bearer_auth(&u2.token)
        .header("club-id", &club)
        .json(&json!({ "user-id": u1.id }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    assert_eq!(
        member_role(&client, &srv, &u2, &club, &u1.id).await.as_deref(),
        Some("owner")
    );

    // The owner keeps club.delete, so teardown stays possible.
    let res = client
        .delete(srv.url("/api/club"))
        .bearer_auth(&u1.token)
        .header("club-id", &club)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn duplicate_membership_conflicts_and_keeps_first_role() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let u1 = register(&client, &srv, "u1").await;
    let u2 = register(&client, &srv, "u2").await;
    let club = create_club(&client, &srv, &u1, "Chess").await;

    let res = add_member(&client, &srv, &u1, &club, &u2.email, "admin").await;
    assert_eq!(res.status(), StatusCode::OK);

    let res = add_member(&client, &srv, &u1, &club, &u2.email, "member").await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "conflict");

    assert_eq!(
        member_role(&client, &srv, &u1, &club, &u2.id).await.as_deref(),
        Some("admin")
    );
}

#[tokio::test]
async fn member_management_validates_roles_and_targets() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let u1 = register(&client, &srv, "u1").await;
    let u2 = register(&client, &srv, "u2").await;
    let club = create_club(&client, &srv, &u1, "Chess").await;

    let res = add_member(&client, &srv, &u1, &club, &u2.email, "owner").await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = add_member(&client, &srv, &u1, &club, &u2.email, "chief").await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = add_member(&client, &srv, &u1, &club, "nobody@example.com", "member").await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client
        .post(srv.url("/api/club-user"))
        .bearer_auth(&u1.token)
        .header("club-id", &club)
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "invalid request body");

    let res = add_member(&client, &srv, &u1, &club, &u2.email, "social-admin").await;
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .put(srv.url("/api/club-user"))
        .bearer_auth(&u1.token)
        .header("club-id", &club)
        .json(&json!({ "user-id": u2.id, "role": "mail_admin" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        member_role(&client, &srv, &u1, &club, &u2.id).await.as_deref(),
        Some("mail_admin")
    );
}

#[tokio::test]
async fn removing_a_member_twice_succeeds() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let u1 = register(&client, &srv, "u1").await;
    let u2 = register(&client, &srv, "u2").await;
    let club = create_club(&client, &srv, &u1, "Chess").await;
    add_member(&client, &srv, &u1, &club, &u2.email, "member").await;

    for _ in 0..2 {
        let res = client
            .delete(srv.url("/api/club-user"))
            .bearer_auth(&u1.token)
            .header("club-id", &club)
            .json(&json!({ "user-id": u2.id }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    assert_eq!(member_role(&client, &srv, &u1, &club, &u2.id).await, None);
}

#[tokio::test]
async fn gate_rejects_bad_club_ids_and_missing_permissions() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let u1 = register(&client, &srv, "u1").await;
    let u2 = register(&client, &srv, "u2").await;
    let u3 = register(&client, &srv, "u3").await;
    let club = create_club(&client, &srv, &u1, "Chess").await;
    add_member(&client, &srv, &u1, &club, &u2.email, "member").await;

    let res = client
        .get(srv.url("/api/club"))
        .bearer_auth(&u1.token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client
        .get(srv.url("/api/club"))
        .bearer_auth(&u1.token)
        .header("club-id", "not-a-uuid")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // Not a member.
    let res = client
        .get(srv.url("/api/club"))
        .bearer_auth(&u3.token)
        .header("club-id", &club)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // Member, but lacks club.update.
    let res = client
        .get(srv.url("/api/club"))
        .bearer_auth(&u2.token)
        .header("club-id", &club)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .put(srv.url("/api/club"))
        .bearer_auth(&u2.token)
        .header("club-id", &club)
        .json(&json!({ "name": "Hijacked" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "forbidden");
}

#[tokio::test]
async fn only_the_owner_tears_a_club_down() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let u1 = register(&client, &srv, "u1").await;
    let u2 = register(&client, &srv, "u2").await;
    let club = create_club(&client, &srv, &u1, "Chess").await;
    add_member(&client, &srv, &u1, &club, &u2.email, "admin").await;

    let res = client
        .delete(srv.url("/api/club"))
        .bearer_auth(&u2.token)
        .header("club-id", &club)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = client
        .delete(srv.url("/api/club"))
        .bearer_auth(&u1.token)
        .header("club-id", &club)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["memberships_removed"], 2);

    // Memberships are gone, so the gate now denies even the former owner.
    let res = client
        .get(srv.url("/api/club"))
        .bearer_auth(&u1.token)
        .header("club-id", &club)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = client
        .get(srv.url("/api/user/clubs"))
        .bearer_auth(&u2.token)
        .send()
        .await
        .unwrap();
    let clubs: Value = res.json().await.unwrap();
    assert!(clubs.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn events_are_managed_within_one_club() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let u1 = register(&client, &srv, "u1").await;
    let club = create_club(&client, &srv, &u1, "Chess").await;
    let other = create_club(&client, &srv, &u1, "Go").await;

    let res = client
        .post(srv.url("/api/event"))
        .bearer_auth(&u1.token)
        .header("club-id", &club)
        .json(&json!({
            "title": "Blitz night",
            "start_date": "2026-03-01T18:00:00Z",
            "end_date": "2026-03-01T21:00:00Z",
            "tags": "blitz",
            "location": "Hall B"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let event: Value = res.json().await.unwrap();
    let event_id = event["id"].as_str().unwrap().to_string();

    let res = client
        .post(srv.url("/api/event"))
        .bearer_auth(&u1.token)
        .header("club-id", &club)
        .json(&json!({
            "title": "Backwards",
            "start_date": "2026-03-02T18:00:00Z",
            "end_date": "2026-03-01T18:00:00Z"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client
        .get(srv.url("/api/events"))
        .bearer_auth(&u1.token)
        .header("club-id", &club)
        .send()
        .await
        .unwrap();
    let events: Value = res.json().await.unwrap();
    assert_eq!(events.as_array().unwrap().len(), 1);

    // Scoped to the club in the header.
    let res = client
        .get(srv.url("/api/event"))
        .bearer_auth(&u1.token)
        .header("club-id", &other)
        .header("event-id", &event_id)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client
        .put(srv.url("/api/event"))
        .bearer_auth(&u1.token)
        .header("club-id", &club)
        .header("event-id", &event_id)
        .json(&json!({
            "title": "Rapid night",
            "start_date": "2026-03-01T18:00:00Z",
            "end_date": "2026-03-01T22:00:00Z"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let updated: Value = res.json().await.unwrap();
    assert_eq!(updated["title"], "Rapid night");

    for expected in [StatusCode::OK, StatusCode::NOT_FOUND] {
        let res = client
            .delete(srv.url("/api/event"))
            .bearer_auth(&u1.token)
            .header("club-id", &club)
            .header("event-id", &event_id)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), expected);
    }

    let res = client
        .get(srv.url("/api/event"))
        .bearer_auth(&u1.token)
        .header("club-id", &club)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn roles_endpoint_lists_the_catalog() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .get(srv.url("/api/roles"))
        .bearer_auth(mint_jwt(JWT_SECRET, "u1"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let roles: Value = res.json().await.unwrap();
    let roles = roles.as_array().unwrap();
    assert_eq!(roles.len(), 6);

    let holders: Vec<&str> = roles
        .iter()
        .filter(|r| {
            r["permissions"]
                .as_array()
                .unwrap()
                .iter()
                .any(|p| p == "club.delete")
        })
        .map(|r| r["name"].as_str().unwrap())
        .collect();
    assert_eq!(holders, vec!["owner"]);
}
