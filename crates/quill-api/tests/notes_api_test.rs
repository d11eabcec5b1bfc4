//! In-process router tests for notes, auth, and tags.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use quill_api::auth::StaticSessions;
use quill_api::{build_router, AppState};
use quill_core::NoteRepository;
use quill_db::Database;
use quill_inference::mock::MockSummaryBackend;

const OWNER_TOKEN: &str = "owner-token";
const STRANGER_TOKEN: &str = "stranger-token";

struct TestApp {
    app: Router,
    db: Database,
    owner: Uuid,
}

fn test_app() -> TestApp {
    let owner = Uuid::now_v7();
    let sessions = StaticSessions::new()
        .with_token(OWNER_TOKEN, owner)
        .with_token(STRANGER_TOKEN, Uuid::now_v7());
    let db = Database::in_memory();
    let state = AppState::new(
        db.clone(),
        Arc::new(MockSummaryBackend::new()),
        Arc::new(sessions),
    );
    TestApp {
        app: build_router(state, vec![]),
        db,
        owner,
    }
}

fn json_request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

async fn create(app: &Router, title: &str, content: &str) -> Value {
    let (status, body) = send(
        app,
        json_request(
            Method::POST,
            "/notes",
            Some(OWNER_TOKEN),
            Some(json!({"title": title, "content": content})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Note created");
    body["note"].clone()
}

#[tokio::test]
async fn test_health_is_public() {
    let t = test_app();
    let (status, body) = send(&t.app, json_request(Method::GET, "/health", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_unauthenticated_requests_redirect_to_login() {
    let t = test_app();
    for token in [None, Some("unknown-token")] {
        let response = t
            .app
            .clone()
            .oneshot(json_request(Method::GET, "/notes", token, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/login");
    }

    let (status, body) = send(&t.app, json_request(Method::GET, "/login", None, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Authentication required");
}

#[tokio::test]
async fn test_note_crud_roundtrip() {
    let t = test_app();
    let note = create(&t.app, "Groceries", "<p>milk, eggs</p>").await;
    let id = note["id"].as_str().unwrap().to_string();
    assert_eq!(note["owner_id"], t.owner.to_string());

    let (status, fetched) = send(
        &t.app,
        json_request(Method::GET, &format!("/notes/{}", id), Some(OWNER_TOKEN), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["title"], "Groceries");
    assert_eq!(fetched["content"], "<p>milk, eggs</p>");

    let (status, updated) = send(
        &t.app,
        json_request(
            Method::PUT,
            &format!("/notes/{}", id),
            Some(OWNER_TOKEN),
            Some(json!({"title": "Groceries", "content": "<p>milk, eggs, bread</p>"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["message"], "Note updated");
    assert_eq!(updated["note"]["content"], "<p>milk, eggs, bread</p>");

    let (status, listed) = send(
        &t.app,
        json_request(Method::GET, "/notes", Some(OWNER_TOKEN), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed["notes"].as_array().unwrap().len(), 1);

    let (status, _) = send(
        &t.app,
        json_request(Method::DELETE, &format!("/notes/{}", id), Some(OWNER_TOKEN), None),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(
        &t.app,
        json_request(Method::GET, &format!("/notes/{}", id), Some(OWNER_TOKEN), None),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("not found"));
}

#[tokio::test]
async fn test_list_is_scoped_to_owner() {
    let t = test_app();
    create(&t.app, "Mine", "private").await;

    let (status, listed) = send(
        &t.app,
        json_request(Method::GET, "/notes", Some(STRANGER_TOKEN), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(listed["notes"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_non_owner_gets_forbidden_and_note_is_untouched() {
    let t = test_app();
    let note = create(&t.app, "Mine", "private").await;
    let id = note["id"].as_str().unwrap().to_string();
    let uri = format!("/notes/{}", id);

    let (status, _) = send(&t.app, json_request(Method::GET, &uri, Some(STRANGER_TOKEN), None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &t.app,
        json_request(
            Method::PUT,
            &uri,
            Some(STRANGER_TOKEN),
            Some(json!({"title": "pwned", "content": "pwned"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&t.app, json_request(Method::DELETE, &uri, Some(STRANGER_TOKEN), None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let stored = t.db.notes.fetch(id.parse().unwrap()).await.unwrap();
    assert_eq!(stored.title, "Mine");
    assert_eq!(stored.content, "private");
}

#[tokio::test]
async fn test_validation_errors_are_bad_request() {
    let t = test_app();
    let cases = [
        json!({"title": "", "content": "body"}),
        json!({"title": "x".repeat(256), "content": "body"}),
        json!({"title": "ok", "content": "   "}),
        json!({"content": "no title"}),
    ];
    for body in cases {
        let (status, response) = send(
            &t.app,
            json_request(Method::POST, "/notes", Some(OWNER_TOKEN), Some(body)),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(response["error"].is_string());
    }

    // 255 multi-byte characters is still within the limit.
    create(&t.app, &"é".repeat(255), "body").await;
}

#[tokio::test]
async fn test_tags_endpoint() {
    let t = test_app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/tags")
        .header(header::AUTHORIZATION, format!("Bearer {}", OWNER_TOKEN))
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("content=Cats+sleep.+Cats+play.+Dogs+sleep."))
        .unwrap();

    let (status, body) = send(&t.app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tags"], json!(["cats", "sleep", "play", "dogs"]));
}

#[tokio::test]
async fn test_tags_endpoint_with_only_stop_words() {
    let t = test_app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/tags")
        .header(header::AUTHORIZATION, format!("Bearer {}", OWNER_TOKEN))
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("content=the+a+an"))
        .unwrap();

    let (status, body) = send(&t.app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tags"], json!([]));
}

#[tokio::test]
async fn test_tags_endpoint_without_session() {
    let t = test_app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/tags")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("content=Rust+rust+notes"))
        .unwrap();

    let (status, body) = send(&t.app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tags"], json!(["rust", "notes"]));
}

#[tokio::test]
async fn test_tags_endpoint_rejects_non_form_body() {
    let t = test_app();
    let (status, body) = send(
        &t.app,
        json_request(
            Method::POST,
            "/tags",
            Some(OWNER_TOKEN),
            Some(json!({"content": "json is not a form"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to generate tags");
}

#[tokio::test]
async fn test_request_id_header_is_set() {
    let t = test_app();
    let response = t
        .app
        .clone()
        .oneshot(json_request(Method::GET, "/health", None, None))
        .await
        .unwrap();
    let id = response.headers()["x-request-id"].to_str().unwrap();
    assert!(quill_core::is_v7(&id.parse().unwrap()));
}
