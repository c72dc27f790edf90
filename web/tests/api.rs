//! End-to-end tests of the HTTP API over in-memory backends.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use axum_test::TestServer;
use chrono::Duration;
use critique_auth::TokenSigner;
use critique_auth::mocks::RecordingEmailProvider;
use critique_core::mocks::MemoryStore;
use critique_core::model::{Role, User};
use critique_core::repo::UserRepository;
use critique_web::{AppState, router};
use serde_json::{Value, json};

struct TestApp {
    server: TestServer,
    store: MemoryStore,
    email: RecordingEmailProvider,
    signer: TokenSigner,
}

fn test_app() -> TestApp {
    let store = MemoryStore::new();
    let email = RecordingEmailProvider::new();
    let signer = TokenSigner::new(b"test-secret", Duration::hours(1));
    let state = AppState::new(
        store.clone(),
        store.clone(),
        store.clone(),
        email.clone(),
        signer.clone(),
        Duration::days(1),
    );
    let server = TestServer::new(router(state)).unwrap();
    TestApp {
        server,
        store,
        email,
        signer,
    }
}

impl TestApp {
    /// Create an account directly in the store and return a bearer
    /// token for it.
    async fn token_for(&self, username: &str, role: Role) -> String {
        let mut user = User::new(username.to_string(), format!("{username}@example.com"));
        user.role = role;
        self.store.create_user(&user).await.unwrap();
        self.signer.issue(&user).unwrap()
    }

    async fn create_title(&self, admin: &str, name: &str) -> i64 {
        let response = self
            .server
            .post("/api/v1/titles/")
            .authorization_bearer(admin)
            .json(&json!({ "name": name, "year": 1999 }))
            .await;
        assert_eq!(response.status_code(), StatusCode::CREATED);
        response.json::<Value>()["id"].as_i64().unwrap()
    }

    async fn post_review(&self, token: &str, title_id: i64, score: i16) -> Value {
        self.server
            .post(&format!("/api/v1/titles/{title_id}/reviews/"))
            .authorization_bearer(token)
            .json(&json!({ "text": "opinion", "score": score }))
            .await
            .json::<Value>()
    }

    async fn rating(&self, title_id: i64) -> Value {
        self.server
            .get(&format!("/api/v1/titles/{title_id}/"))
            .await
            .json::<Value>()["rating"]
            .clone()
    }
}

#[tokio::test]
async fn test_signup_and_token_flow() {
    let app = test_app();

    let response = app
        .server
        .post("/api/v1/auth/signup/")
        .json(&json!({ "username": "alice", "email": "alice@example.com" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>()["username"], "alice");

    let code = app.email.last_code().unwrap();
    let response = app
        .server
        .post("/api/v1/auth/token/")
        .json(&json!({ "username": "alice", "confirmation_code": code }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    // The token works against an authenticated endpoint.
    let token = response.json::<Value>()["token"].as_str().unwrap().to_string();
    let me = app
        .server
        .get("/api/v1/users/me/")
        .authorization_bearer(&token)
        .await;
    assert_eq!(me.status_code(), StatusCode::OK);
    assert_eq!(me.json::<Value>()["email"], "alice@example.com");
}

#[tokio::test]
async fn test_token_error_statuses() {
    let app = test_app();

    // Unknown username: 404, not 400.
    let response = app
        .server
        .post("/api/v1/auth/token/")
        .json(&json!({ "username": "ghost", "confirmation_code": "123456" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    // Known username, wrong code: 400.
    app.server
        .post("/api/v1/auth/signup/")
        .json(&json!({ "username": "alice", "email": "alice@example.com" }))
        .await;
    let wrong = if app.email.last_code().unwrap() == "000000" {
        "000001"
    } else {
        "000000"
    };
    let response = app
        .server
        .post("/api/v1/auth/token/")
        .json(&json!({ "username": "alice", "confirmation_code": wrong }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_reserved_username_is_rejected() {
    let app = test_app();
    let response = app
        .server
        .post("/api/v1/auth/signup/")
        .json(&json!({ "username": "me", "email": "me@example.com" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_rating_follows_reviews() {
    let app = test_app();
    let admin = app.token_for("admin", Role::Admin).await;
    let alice = app.token_for("alice", Role::User).await;
    let bob = app.token_for("bob", Role::User).await;
    let title_id = app.create_title(&admin, "Dune").await;

    assert_eq!(app.rating(title_id).await, Value::Null);

    let review = app.post_review(&alice, title_id, 8).await;
    assert_eq!(app.rating(title_id).await, json!(8.0));

    app.post_review(&bob, title_id, 6).await;
    assert_eq!(app.rating(title_id).await, json!(7.0));

    let review_id = review["id"].as_i64().unwrap();
    let response = app
        .server
        .delete(&format!("/api/v1/titles/{title_id}/reviews/{review_id}/"))
        .authorization_bearer(&alice)
        .await;
    assert_eq!(response.status_code(), StatusCode::NO_CONTENT);
    assert_eq!(app.rating(title_id).await, json!(6.0));
}

#[tokio::test]
async fn test_one_review_per_author() {
    let app = test_app();
    let admin = app.token_for("admin", Role::Admin).await;
    let alice = app.token_for("alice", Role::User).await;
    let title_id = app.create_title(&admin, "Dune").await;

    let first = app
        .server
        .post(&format!("/api/v1/titles/{title_id}/reviews/"))
        .authorization_bearer(&alice)
        .json(&json!({ "text": "once", "score": 5 }))
        .await;
    assert_eq!(first.status_code(), StatusCode::CREATED);

    let second = app
        .server
        .post(&format!("/api/v1/titles/{title_id}/reviews/"))
        .authorization_bearer(&alice)
        .json(&json!({ "text": "twice", "score": 9 }))
        .await;
    assert_eq!(second.status_code(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_score_bounds() {
    let app = test_app();
    let admin = app.token_for("admin", Role::Admin).await;
    let alice = app.token_for("alice", Role::User).await;
    let title_id = app.create_title(&admin, "Dune").await;

    for score in [0, 11] {
        let response = app
            .server
            .post(&format!("/api/v1/titles/{title_id}/reviews/"))
            .authorization_bearer(&alice)
            .json(&json!({ "text": "oops", "score": score }))
            .await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn test_access_control_matrix() {
    let app = test_app();
    let user = app.token_for("user", Role::User).await;

    // Anonymous reads are open.
    let response = app.server.get("/api/v1/titles/").await;
    assert_eq!(response.status_code(), StatusCode::OK);

    // Anonymous writes are 401.
    let response = app
        .server
        .post("/api/v1/categories/")
        .json(&json!({ "name": "Films", "slug": "films" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);

    // Authenticated non-admin catalog writes are 403.
    let response = app
        .server
        .post("/api/v1/categories/")
        .authorization_bearer(&user)
        .json(&json!({ "name": "Films", "slug": "films" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);

    // User administration is admin-only.
    let response = app
        .server
        .get("/api/v1/users/")
        .authorization_bearer(&user)
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);

    // A garbage token is rejected outright.
    let response = app
        .server
        .get("/api/v1/users/me/")
        .authorization_bearer("garbage")
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_moderator_can_remove_foreign_review() {
    let app = test_app();
    let admin = app.token_for("admin", Role::Admin).await;
    let alice = app.token_for("alice", Role::User).await;
    let bob = app.token_for("bob", Role::User).await;
    let moderator = app.token_for("mod", Role::Moderator).await;
    let title_id = app.create_title(&admin, "Dune").await;

    let review = app.post_review(&alice, title_id, 8).await;
    let review_id = review["id"].as_i64().unwrap();
    let path = format!("/api/v1/titles/{title_id}/reviews/{review_id}/");

    // A stranger cannot touch it.
    let response = app
        .server
        .patch(&path)
        .authorization_bearer(&bob)
        .json(&json!({ "score": 1 }))
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);

    // A moderator can.
    let response = app.server.delete(&path).authorization_bearer(&moderator).await;
    assert_eq!(response.status_code(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_title_delete_cascades() {
    let app = test_app();
    let admin = app.token_for("admin", Role::Admin).await;
    let alice = app.token_for("alice", Role::User).await;
    let title_id = app.create_title(&admin, "Dune").await;

    let review = app.post_review(&alice, title_id, 8).await;
    let review_id = review["id"].as_i64().unwrap();
    app.server
        .post(&format!(
            "/api/v1/titles/{title_id}/reviews/{review_id}/comments/"
        ))
        .authorization_bearer(&alice)
        .json(&json!({ "text": "agreed" }))
        .await;

    let response = app
        .server
        .delete(&format!("/api/v1/titles/{title_id}/"))
        .authorization_bearer(&admin)
        .await;
    assert_eq!(response.status_code(), StatusCode::NO_CONTENT);

    let response = app
        .server
        .get(&format!("/api/v1/titles/{title_id}/reviews/{review_id}/"))
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_category_delete_keeps_titles() {
    let app = test_app();
    let admin = app.token_for("admin", Role::Admin).await;

    app.server
        .post("/api/v1/categories/")
        .authorization_bearer(&admin)
        .json(&json!({ "name": "Books", "slug": "books" }))
        .await;
    let response = app
        .server
        .post("/api/v1/titles/")
        .authorization_bearer(&admin)
        .json(&json!({ "name": "Dune", "year": 1965, "category": "books" }))
        .await;
    let title_id = response.json::<Value>()["id"].as_i64().unwrap();

    let response = app
        .server
        .delete("/api/v1/categories/books/")
        .authorization_bearer(&admin)
        .await;
    assert_eq!(response.status_code(), StatusCode::NO_CONTENT);

    let title = app
        .server
        .get(&format!("/api/v1/titles/{title_id}/"))
        .await
        .json::<Value>();
    assert_eq!(title["category"], Value::Null);
}

#[tokio::test]
async fn test_catalog_entries_are_fetchable_by_slug() {
    let app = test_app();
    let admin = app.token_for("admin", Role::Admin).await;

    app.server
        .post("/api/v1/categories/")
        .authorization_bearer(&admin)
        .json(&json!({ "name": "Films", "slug": "films" }))
        .await;
    let response = app.server.get("/api/v1/categories/films/").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>()["slug"], "films");

    app.server
        .post("/api/v1/genres/")
        .authorization_bearer(&admin)
        .json(&json!({ "name": "Drama", "slug": "drama" }))
        .await;
    let response = app.server.get("/api/v1/genres/drama/").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>()["name"], "Drama");

    let response = app.server.get("/api/v1/categories/missing/").await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_catalog_slug_is_a_validation_error() {
    let app = test_app();
    let admin = app.token_for("admin", Role::Admin).await;

    let response = app
        .server
        .post("/api/v1/titles/")
        .authorization_bearer(&admin)
        .json(&json!({ "name": "Dune", "year": 1965, "category": "nope" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_future_year_rejected() {
    let app = test_app();
    let admin = app.token_for("admin", Role::Admin).await;
    let next_year = chrono::Utc::now().format("%Y").to_string().parse::<i32>().unwrap() + 1;

    let response = app
        .server
        .post("/api/v1/titles/")
        .authorization_bearer(&admin)
        .json(&json!({ "name": "Dune II", "year": next_year }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_put_is_not_routed() {
    let app = test_app();
    let admin = app.token_for("admin", Role::Admin).await;
    let title_id = app.create_title(&admin, "Dune").await;

    let response = app
        .server
        .put(&format!("/api/v1/titles/{title_id}/"))
        .authorization_bearer(&admin)
        .json(&json!({ "name": "Replaced", "year": 2000 }))
        .await;
    assert_eq!(response.status_code(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_me_ignores_role_for_regular_users() {
    let app = test_app();
    let alice = app.token_for("alice", Role::User).await;

    let response = app
        .server
        .patch("/api/v1/users/me/")
        .authorization_bearer(&alice)
        .json(&json!({ "bio": "hi", "role": "admin" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body = response.json::<Value>();
    assert_eq!(body["bio"], "hi");
    assert_eq!(body["role"], "user");
}

#[tokio::test]
async fn test_admin_manages_accounts() {
    let app = test_app();
    let admin = app.token_for("admin", Role::Admin).await;

    let response = app
        .server
        .post("/api/v1/users/")
        .authorization_bearer(&admin)
        .json(&json!({
            "username": "carol",
            "email": "carol@example.com",
            "role": "moderator"
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);

    let response = app
        .server
        .patch("/api/v1/users/carol/")
        .authorization_bearer(&admin)
        .json(&json!({ "role": "user" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>()["role"], "user");

    let response = app
        .server
        .delete("/api/v1/users/carol/")
        .authorization_bearer(&admin)
        .await;
    assert_eq!(response.status_code(), StatusCode::NO_CONTENT);

    let response = app
        .server
        .get("/api/v1/users/carol/")
        .authorization_bearer(&admin)
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_title_filters() {
    let app = test_app();
    let admin = app.token_for("admin", Role::Admin).await;

    app.server
        .post("/api/v1/genres/")
        .authorization_bearer(&admin)
        .json(&json!({ "name": "Sci-Fi", "slug": "sci-fi" }))
        .await;
    app.server
        .post("/api/v1/titles/")
        .authorization_bearer(&admin)
        .json(&json!({ "name": "Dune", "year": 1965, "genre": ["sci-fi"] }))
        .await;
    app.server
        .post("/api/v1/titles/")
        .authorization_bearer(&admin)
        .json(&json!({ "name": "Emma", "year": 1815 }))
        .await;

    let by_genre = app
        .server
        .get("/api/v1/titles/")
        .add_query_param("genre", "sci-fi")
        .await
        .json::<Vec<Value>>();
    assert_eq!(by_genre.len(), 1);
    assert_eq!(by_genre[0]["name"], "Dune");

    let by_year = app
        .server
        .get("/api/v1/titles/")
        .add_query_param("year", 1815)
        .await
        .json::<Vec<Value>>();
    assert_eq!(by_year.len(), 1);
    assert_eq!(by_year[0]["name"], "Emma");

    let by_name = app
        .server
        .get("/api/v1/titles/")
        .add_query_param("name", "dun")
        .await
        .json::<Vec<Value>>();
    assert_eq!(by_name.len(), 1);
}
