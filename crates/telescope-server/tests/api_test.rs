//! End-to-end API tests: real router, in-memory SurrealDB, signed
//! tokens and a scripted role authority.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde_json::{Value, json};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use telescope_auth::{AuthConfig, AuthorityError, Authenticator, RoleAuthority};
use telescope_core::models::role::Role;
use telescope_core::models::{ProjectId, UserId};
use telescope_core::repository::ProjectRepository;
use telescope_db::repository::SurrealProjectRepository;
use telescope_server::config::ServerConfig;
use telescope_server::state::AppState;
use tower::ServiceExt;

const PRIVATE_KEY: &str = include_str!("../../telescope-auth/tests/fixtures/rsa_private.pem");
const PUBLIC_KEY: &str = include_str!("../../telescope-auth/tests/fixtures/rsa_public.pem");
const OTHER_PRIVATE_KEY: &str =
    include_str!("../../telescope-auth/tests/fixtures/rsa_other_private.pem");

// ---------------------------------------------------------------------------
// Scripted authority
// ---------------------------------------------------------------------------

/// Literal role grants shared between the test and the running app.
#[derive(Clone, Default)]
struct Grants {
    held: Arc<Mutex<HashSet<(UserId, ProjectId, Role)>>>,
    probes: Arc<Mutex<Vec<(ProjectId, Role)>>>,
    down: Arc<AtomicBool>,
}

impl Grants {
    fn grant(&self, user: UserId, project: ProjectId, role: Role) {
        self.held.lock().unwrap().insert((user, project, role));
    }

    fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }

    fn probes(&self) -> Vec<(ProjectId, Role)> {
        self.probes.lock().unwrap().clone()
    }

    fn unavailable(&self) -> Result<(), AuthorityError> {
        if self.down.load(Ordering::SeqCst) {
            return Err(AuthorityError::Transport("connection refused".into()));
        }
        Ok(())
    }
}

impl RoleAuthority for Grants {
    async fn check_role(
        &self,
        user_id: UserId,
        project_id: ProjectId,
        role: Role,
    ) -> Result<bool, AuthorityError> {
        self.probes.lock().unwrap().push((project_id, role));
        self.unavailable()?;
        Ok(self
            .held
            .lock()
            .unwrap()
            .contains(&(user_id, project_id, role)))
    }

    async fn register_owner(
        &self,
        user_id: UserId,
        project_id: ProjectId,
    ) -> Result<(), AuthorityError> {
        self.unavailable()?;
        self.grant(user_id, project_id, Role::Owner);
        Ok(())
    }

    async fn user_projects(&self, user_id: UserId) -> Result<Vec<ProjectId>, AuthorityError> {
        self.unavailable()?;
        let mut ids: Vec<ProjectId> = self
            .held
            .lock()
            .unwrap()
            .iter()
            .filter(|(u, _, _)| *u == user_id)
            .map(|(_, p, _)| *p)
            .collect();
        ids.sort_unstable();
        ids.dedup();
        Ok(ids)
    }
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

struct TestApp {
    router: Router,
    grants: Grants,
    db: Surreal<Db>,
}

async fn setup() -> TestApp {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    telescope_db::run_migrations(&db).await.unwrap();

    let authenticator = Authenticator::new(&AuthConfig {
        jwt_public_key_pem: PUBLIC_KEY.into(),
        ..Default::default()
    })
    .unwrap();
    let grants = Grants::default();
    let state = AppState::new(db.clone(), authenticator, grants.clone());
    let cors = ServerConfig::default().cors_layer().unwrap();

    TestApp {
        router: telescope_server::app(state, cors),
        grants,
        db,
    }
}

/// Project 3 ⊃ Graph 9 ⊃ {Service 42, Service 43, Relation 5}.
async fn seed_hierarchy(db: &Surreal<Db>) {
    db.query(
        "CREATE project:3 SET name = 'Checkout'; \
         CREATE graph:9 SET project_id = 3, name = 'Production'; \
         CREATE service:42 SET graph_id = 9, name = 'api', x = 0.0, y = 0.0; \
         CREATE service:43 SET graph_id = 9, name = 'db', x = 100.0, y = 0.0; \
         CREATE relation:5 SET graph_id = 9, name = 'reads', \
             from_service = 42, to_service = 43;",
    )
    .await
    .unwrap()
    .check()
    .unwrap();
}

fn sign(key: &str, claims: Value) -> String {
    let key = EncodingKey::from_rsa_pem(key.as_bytes()).unwrap();
    jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &key).unwrap()
}

fn token(user_id: UserId) -> String {
    sign(
        PRIVATE_KEY,
        json!({ "user_id": user_id, "exp": Utc::now().timestamp() + 600 }),
    )
}

impl TestApp {
    async fn send(
        &self,
        method: Method,
        uri: &str,
        bearer: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(t) = bearer {
            request = request.header(header::AUTHORIZATION, format!("Bearer {t}"));
        }
        let request = match body {
            Some(b) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(b.to_string()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    async fn as_user(
        &self,
        user_id: UserId,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        self.send(method, uri, Some(&token(user_id)), body).await
    }
}

// ---------------------------------------------------------------------------
// Authentication
// ---------------------------------------------------------------------------

#[tokio::test]
async fn missing_token_is_unauthenticated() {
    let app = setup().await;
    let (status, body) = app.send(Method::GET, "/api/core/projects", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthenticated");
}

#[tokio::test]
async fn wrong_scheme_expired_and_foreign_tokens_are_unauthenticated() {
    let app = setup().await;
    seed_hierarchy(&app.db).await;
    app.grants.grant(7, 3, Role::Owner);

    let expired = sign(
        PRIVATE_KEY,
        json!({ "user_id": 7, "exp": Utc::now().timestamp() - 60 }),
    );
    let foreign = sign(
        OTHER_PRIVATE_KEY,
        json!({ "user_id": 7, "exp": Utc::now().timestamp() + 600 }),
    );

    for header_value in [
        format!("Token {}", token(7)),
        format!("Bearer {expired}"),
        format!("Bearer {foreign}"),
    ] {
        let request = Request::builder()
            .uri("/api/core/services/42")
            .header(header::AUTHORIZATION, header_value)
            .body(Body::empty())
            .unwrap();
        let response = app.router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
    assert!(app.grants.probes().is_empty());
}

#[tokio::test]
async fn preflight_skips_authentication() {
    let app = setup().await;
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/core/services/42")
        .header(header::ORIGIN, "http://localhost:3000")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "PUT")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "authorization")
        .body(Body::empty())
        .unwrap();

    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response
            .headers()
            .contains_key(header::ACCESS_CONTROL_ALLOW_METHODS)
    );
}

// ---------------------------------------------------------------------------
// Scenario: PUT /services/42 by user 7
// ---------------------------------------------------------------------------

fn renamed_service() -> Value {
    json!({ "name": "gateway", "description": "edge", "x": 10.0, "y": 20.0 })
}

#[tokio::test]
async fn editor_updates_service() {
    let app = setup().await;
    seed_hierarchy(&app.db).await;
    app.grants.grant(7, 3, Role::Editor);

    let (status, body) = app
        .as_user(7, Method::PUT, "/api/core/services/42", Some(renamed_service()))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], 42);
    assert_eq!(body["graph_id"], 9);
    assert_eq!(body["name"], "gateway");
    assert_eq!(app.grants.probes(), vec![(3, Role::Editor)]);
}

#[tokio::test]
async fn viewer_cannot_update_service() {
    let app = setup().await;
    seed_hierarchy(&app.db).await;
    app.grants.grant(7, 3, Role::Viewer);

    let (status, body) = app
        .as_user(7, Method::PUT, "/api/core/services/42", Some(renamed_service()))
        .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "forbidden");
    assert_eq!(
        app.grants.probes(),
        vec![(3, Role::Editor), (3, Role::Owner)]
    );

    let (_, service) = app.as_user(7, Method::GET, "/api/core/services/42", None).await;
    assert_eq!(service["name"], "api");
}

#[tokio::test]
async fn unavailable_authority_denies() {
    let app = setup().await;
    seed_hierarchy(&app.db).await;
    app.grants.grant(7, 3, Role::Owner);
    app.grants.set_down(true);

    let (status, _) = app.as_user(7, Method::GET, "/api/core/services/42", None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn unresolvable_graph_is_server_error_without_authority_call() {
    let app = setup().await;
    seed_hierarchy(&app.db).await;
    app.grants.grant(7, 3, Role::Owner);

    let (status, body) = app
        .as_user(7, Method::GET, "/api/core/graphs/99/services", None)
        .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "unresolved");
    assert!(app.grants.probes().is_empty());
}

#[tokio::test]
async fn relation_access_follows_its_graph() {
    let app = setup().await;
    seed_hierarchy(&app.db).await;
    app.grants.grant(7, 3, Role::Viewer);

    let (status, body) = app.as_user(7, Method::GET, "/api/core/relations/5", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["from_service"], 42);

    let (status, _) = app
        .as_user(7, Method::DELETE, "/api/core/relations/5", None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn non_numeric_id_is_bad_request() {
    let app = setup().await;
    let (status, _) = app
        .as_user(7, Method::GET, "/api/core/services/abc", None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

#[tokio::test]
async fn creator_becomes_owner() {
    let app = setup().await;

    let (status, project) = app
        .as_user(7, Method::POST, "/api/core/projects", Some(json!({ "name": "Atlas" })))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = project["id"].as_i64().unwrap();

    let (status, listed) = app.as_user(7, Method::GET, "/api/core/projects", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        listed,
        json!([{ "project": project, "role": "owner" }])
    );

    let (_, others) = app.as_user(8, Method::GET, "/api/core/projects", None).await;
    assert_eq!(others, json!([]));
    assert!(app.grants.held.lock().unwrap().contains(&(7, id, Role::Owner)));
}

#[tokio::test]
async fn failed_owner_registration_rolls_back_project() {
    let app = setup().await;
    app.grants.set_down(true);

    let (status, body) = app
        .as_user(7, Method::POST, "/api/core/projects", Some(json!({ "name": "Atlas" })))
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "authority_unavailable");

    let remaining = SurrealProjectRepository::new(app.db.clone())
        .list()
        .await
        .unwrap();
    assert!(remaining.is_empty());
}

#[tokio::test]
async fn empty_project_name_is_rejected() {
    let app = setup().await;
    let (status, body) = app
        .as_user(7, Method::POST, "/api/core/projects", Some(json!({ "name": "  " })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_request");
}

#[tokio::test]
async fn listing_reports_highest_role() {
    let app = setup().await;
    seed_hierarchy(&app.db).await;
    app.db
        .query("CREATE project:4 SET name = 'Billing'; CREATE project:5 SET name = 'Hidden';")
        .await
        .unwrap();
    app.grants.grant(7, 3, Role::Viewer);
    app.grants.grant(7, 4, Role::Viewer);
    app.grants.grant(7, 4, Role::Editor);

    let (status, listed) = app.as_user(7, Method::GET, "/api/core/projects", None).await;
    assert_eq!(status, StatusCode::OK);

    let summary: Vec<(i64, String)> = listed
        .as_array()
        .unwrap()
        .iter()
        .map(|e| {
            (
                e["project"]["id"].as_i64().unwrap(),
                e["role"].as_str().unwrap().to_string(),
            )
        })
        .collect();
    assert_eq!(
        summary,
        vec![(3, "viewer".to_string()), (4, "editor".to_string())]
    );
}

#[tokio::test]
async fn project_graphs_report_edit_rights() {
    let app = setup().await;
    seed_hierarchy(&app.db).await;

    app.grants.grant(7, 3, Role::Viewer);
    let (status, body) = app
        .as_user(7, Method::GET, "/api/core/projects/3/graphs", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["can_edit"], false);
    assert_eq!(body["graphs"][0]["id"], 9);

    app.grants.grant(8, 3, Role::Owner);
    let (_, body) = app
        .as_user(8, Method::GET, "/api/core/projects/3/graphs", None)
        .await;
    assert_eq!(body["can_edit"], true);

    let (status, _) = app
        .as_user(9, Method::GET, "/api/core/projects/3/graphs", None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn editor_deletes_project_and_contents() {
    let app = setup().await;
    seed_hierarchy(&app.db).await;
    app.grants.grant(7, 3, Role::Editor);

    let (status, _) = app
        .as_user(7, Method::DELETE, "/api/core/projects/3", None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // The service is gone, so its owning project can no longer be resolved.
    let (status, _) = app.as_user(7, Method::GET, "/api/core/services/42", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

// ---------------------------------------------------------------------------
// Graphs and bulk contents
// ---------------------------------------------------------------------------

#[tokio::test]
async fn graph_creation_requires_editor_on_body_project() {
    let app = setup().await;
    seed_hierarchy(&app.db).await;
    app.grants.grant(7, 3, Role::Viewer);

    let body = json!({ "project_id": 3, "name": "Staging" });
    let (status, _) = app
        .as_user(7, Method::POST, "/api/core/graphs", Some(body.clone()))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    app.grants.grant(7, 3, Role::Editor);
    let (status, graph) = app
        .as_user(7, Method::POST, "/api/core/graphs", Some(body))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(graph["project_id"], 3);
}

#[tokio::test]
async fn bulk_services_round_trip() {
    let app = setup().await;
    seed_hierarchy(&app.db).await;
    app.grants.grant(7, 3, Role::Editor);

    let (status, ids) = app
        .as_user(
            7,
            Method::POST,
            "/api/core/graphs/9/services",
            Some(json!([
                { "name": "cache", "x": 1.0, "y": 2.0 },
                { "name": "queue", "description": "jobs", "x": 3.0, "y": 4.0 }
            ])),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let ids: Vec<i64> = ids
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_i64().unwrap())
        .collect();
    assert_eq!(ids.len(), 2);

    let (status, _) = app
        .as_user(
            7,
            Method::PUT,
            "/api/core/graphs/9/services",
            Some(json!([{ "id": ids[0], "name": "redis", "x": 5.0, "y": 6.0 }])),
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, listed) = app
        .as_user(7, Method::GET, "/api/core/graphs/9/services", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = listed
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["name"].as_str().unwrap())
        .collect();
    // Seeded records use fixed keys; sequence-allocated ids start at 1.
    assert_eq!(names, vec!["redis", "queue", "api", "db"]);
}

#[tokio::test]
async fn bulk_update_with_foreign_service_is_not_found() {
    let app = setup().await;
    seed_hierarchy(&app.db).await;
    app.grants.grant(7, 3, Role::Editor);

    let (status, body) = app
        .as_user(
            7,
            Method::PUT,
            "/api/core/graphs/9/services",
            Some(json!([{ "id": 1000, "name": "ghost", "x": 0.0, "y": 0.0 }])),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn graph_relations_bulk_create() {
    let app = setup().await;
    seed_hierarchy(&app.db).await;
    app.grants.grant(7, 3, Role::Owner);

    let (status, ids) = app
        .as_user(
            7,
            Method::POST,
            "/api/core/graphs/9/relations",
            Some(json!([{ "name": "writes", "from_service": 42, "to_service": 43 }])),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(ids.as_array().unwrap().len(), 1);

    let (_, listed) = app
        .as_user(7, Method::GET, "/api/core/graphs/9/relations", None)
        .await;
    assert_eq!(listed.as_array().unwrap().len(), 2);
}
