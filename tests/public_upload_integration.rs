mod common;

use axum::{
    Form, Json, Router,
    extract::{Query, State},
    http::{StatusCode, header::COOKIE},
    routing::post,
};
use base64::{Engine, engine::general_purpose};
use common::TestApp;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

const GOOD_KEY: &str = "good-key";

type Received = Arc<Mutex<Vec<Vec<u8>>>>;

/// Stand-in for the image host: accepts `GOOD_KEY`, rejects anything else.
async fn fake_upload(
    State(received): State<Received>,
    Query(query): Query<HashMap<String, String>>,
    Form(form): Form<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    if query.get("key").map(String::as_str) != Some(GOOD_KEY) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "success": false, "error": { "message": "Invalid API v1 key." } })),
        );
    }

    let image = form.get("image").cloned().unwrap_or_default();
    let bytes = general_purpose::STANDARD.decode(image).unwrap_or_default();
    let id = {
        let mut received = received.lock().unwrap();
        received.push(bytes);
        received.len()
    };

    (
        StatusCode::OK,
        Json(json!({ "success": true, "data": { "url": format!("https://i.example/{}.jpg", id) } })),
    )
}

async fn spawn_fake_host() -> (String, Received) {
    let received: Received = Arc::default();
    let app = Router::new()
        .route("/1/upload", post(fake_upload))
        .with_state(received.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}/1/upload", addr), received)
}

async fn set_api_key(app: &TestApp, admin: &axum::http::HeaderValue, key: &str) {
    app.server
        .post("/admin/settings")
        .add_header(COOKIE, admin.clone())
        .json(&json!({ "imagebb_api_key": key }))
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn test_upload_public_returns_link() {
    let (endpoint, received) = spawn_fake_host().await;
    let app = TestApp::with_config(|config| config.public_upload.endpoint = endpoint).await;
    let admin = app.first_admin("root").await;
    app.add_photo("root", "sunset.jpg", b"sunset bytes");

    set_api_key(&app, &admin, GOOD_KEY).await;

    let response = app
        .server
        .post("/api/upload-public/sunset.jpg")
        .add_header(COOKIE, admin)
        .await;
    response.assert_status_ok();
    assert_eq!(
        response.json::<Value>()["public_link"],
        "https://i.example/1.jpg"
    );

    let received = received.lock().unwrap();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0], b"sunset bytes");
}

#[tokio::test]
async fn test_upload_public_without_key_is_unconfigured() {
    let (endpoint, received) = spawn_fake_host().await;
    let app = TestApp::with_config(|config| config.public_upload.endpoint = endpoint).await;
    let admin = app.first_admin("root").await;
    app.add_photo("root", "sunset.jpg", b"sunset");

    app.server
        .post("/api/upload-public/sunset.jpg")
        .add_header(COOKIE, admin)
        .await
        .assert_status(StatusCode::INTERNAL_SERVER_ERROR);

    assert!(received.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_upload_public_rejected_key_is_bad_gateway() {
    let (endpoint, _received) = spawn_fake_host().await;
    let app = TestApp::with_config(|config| config.public_upload.endpoint = endpoint).await;
    let admin = app.first_admin("root").await;
    app.add_photo("root", "sunset.jpg", b"sunset");

    set_api_key(&app, &admin, "wrong-key").await;

    app.server
        .post("/api/upload-public/sunset.jpg")
        .add_header(COOKIE, admin)
        .await
        .assert_status(StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_upload_public_checks_type_and_ownership() {
    let (endpoint, received) = spawn_fake_host().await;
    let app = TestApp::with_config(|config| config.public_upload.endpoint = endpoint).await;
    let admin = app.first_admin("root").await;
    let alice = app.signup("alice").await;
    app.add_video("alice", "clip.mp4", b"clip");
    app.add_photo("root", "private.jpg", b"private");

    set_api_key(&app, &admin, GOOD_KEY).await;

    app.server
        .post("/api/upload-public/clip.mp4")
        .add_header(COOKIE, alice.clone())
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    app.server
        .post("/api/upload-public/private.jpg")
        .add_header(COOKIE, alice.clone())
        .await
        .assert_status(StatusCode::FORBIDDEN);

    app.server
        .post("/api/upload-public/missing.jpg")
        .add_header(COOKIE, alice)
        .await
        .assert_status(StatusCode::NOT_FOUND);

    assert!(received.lock().unwrap().is_empty());
}
