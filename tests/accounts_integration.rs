mod common;

use axum::http::{StatusCode, header::COOKIE};
use common::{TestApp, assert_redirect, session_cookie};
use selfly::login::SessionInfo;
use serde_json::{Value, json};

#[tokio::test]
async fn test_home_redirects_by_setup_state() {
    let app = TestApp::new().await;

    assert_redirect(&app.server.get("/").await, "/first-admin-signup");

    let admin = app.first_admin("root").await;

    assert_redirect(&app.server.get("/").await, "/login");
    assert_redirect(
        &app.server.get("/").add_header(COOKIE, admin).await,
        "/dashboard",
    );
}

#[tokio::test]
async fn test_home_sends_deleted_account_to_login() {
    let app = TestApp::new().await;
    let admin = app.first_admin("root").await;
    let alice = app.signup("alice").await;

    assert_redirect(
        &app.server.get("/").add_header(COOKIE, alice.clone()).await,
        "/dashboard",
    );

    app.server
        .post("/admin/delete_user/2")
        .add_header(COOKIE, admin)
        .await
        .assert_status(StatusCode::NO_CONTENT);

    assert_redirect(
        &app.server.get("/").add_header(COOKIE, alice).await,
        "/login",
    );
}

#[tokio::test]
async fn test_first_admin_signup_only_once() {
    let app = TestApp::new().await;

    let response = app
        .server
        .post("/first-admin-signup")
        .json(&json!({ "username": "root", "password": "pw" }))
        .await;
    response.assert_status_ok();
    let info: SessionInfo = response.json();
    assert_eq!(info.username, "root");
    assert!(info.is_admin);

    let second = app
        .server
        .post("/first-admin-signup")
        .json(&json!({ "username": "mallory", "password": "pw" }))
        .await;
    assert_redirect(&second, "/login");

    app.login("mallory", "pw")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_signup_creates_member_and_directories() {
    let app = TestApp::new().await;
    app.first_admin("root").await;

    let response = app
        .server
        .post("/signup")
        .json(&json!({
            "username": "alice",
            "password": "secret",
            "photo_dir": app.photo_dir("alice"),
            "video_dir": app.video_dir("alice"),
        }))
        .await;
    response.assert_status_ok();
    let info: SessionInfo = response.json();
    assert!(!info.is_admin);

    assert!(app.photo_dir("alice").is_dir());
    assert!(app.video_dir("alice").is_dir());

    let duplicate = app
        .server
        .post("/signup")
        .json(&json!({ "username": "alice", "password": "other" }))
        .await;
    duplicate.assert_status(StatusCode::CONFLICT);

    let empty = app
        .server
        .post("/signup")
        .json(&json!({ "username": "  ", "password": "x" }))
        .await;
    empty.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_and_logout() {
    let app = TestApp::new().await;
    app.first_admin("root").await;
    app.signup("alice").await;

    app.login("alice", "wrong")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    app.login("nobody", "secret")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    let response = app.login("alice", "secret").await;
    response.assert_status_ok();
    let cookie = session_cookie(&response);

    app.server
        .get("/api/media")
        .add_header(COOKIE, cookie)
        .await
        .assert_status_ok();

    let logout = app.server.get("/logout").await;
    assert_redirect(&logout, "/login");
    let cleared = logout.header("set-cookie");
    assert!(cleared.to_str().unwrap().contains("Max-Age=0"));
}

#[tokio::test]
async fn test_tampered_session_is_rejected() {
    let app = TestApp::new().await;
    let admin = app.first_admin("root").await;

    let forged = admin.to_str().unwrap().replacen("session=1.", "session=2.", 1);
    app.server
        .get("/api/media")
        .add_header(COOKIE, forged.parse::<axum::http::HeaderValue>().unwrap())
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    app.server
        .get("/api/media")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_routes_require_admin() {
    let app = TestApp::new().await;
    app.first_admin("root").await;
    let alice = app.signup("alice").await;

    for path in ["/admin", "/admin/settings", "/admin/toggle_admin/1"] {
        app.server
            .get(path)
            .add_header(COOKIE, alice.clone())
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }

    app.server
        .get("/admin")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_dashboard_lists_users_and_media() {
    let app = TestApp::new().await;
    let admin = app.first_admin("root").await;
    app.signup("alice").await;
    app.add_photo("alice", "a.jpg", b"a");
    app.add_video("root", "r.mp4", b"r");

    let response = app.server.get("/admin").add_header(COOKIE, admin).await;
    response.assert_status_ok();
    let body: Value = response.json();

    let users = body["users"].as_array().unwrap();
    assert_eq!(users.len(), 2);
    assert!(users.iter().all(|u| u.get("password_hash").is_none()));

    let media = body["media"].as_array().unwrap();
    assert!(media.contains(&json!({"filename": "a.jpg", "kind": "photo", "username": "alice"})));
    assert!(media.contains(&json!({"filename": "r.mp4", "kind": "video", "username": "root"})));
}

#[tokio::test]
async fn test_admin_settings_round_trip() {
    let app = TestApp::new().await;
    let admin = app.first_admin("root").await;

    let initial = app
        .server
        .get("/admin/settings")
        .add_header(COOKIE, admin.clone())
        .await;
    initial.assert_status_ok();
    assert_eq!(initial.json::<Value>()["imagebb_api_key"], "");

    app.server
        .post("/admin/settings")
        .add_header(COOKIE, admin.clone())
        .json(&json!({ "imagebb_api_key": " key-123 " }))
        .await
        .assert_status_ok();

    let updated = app
        .server
        .get("/admin/settings")
        .add_header(COOKIE, admin)
        .await;
    assert_eq!(updated.json::<Value>()["imagebb_api_key"], "key-123");
}

#[tokio::test]
async fn test_admin_user_management() {
    let app = TestApp::new().await;
    let admin = app.first_admin("root").await;

    let created = app
        .server
        .post("/admin/create_user")
        .add_header(COOKIE, admin.clone())
        .json(&json!({
            "username": "bob",
            "password": "first",
            "photo_dir": app.photo_dir("bob"),
            "is_admin": false,
        }))
        .await;
    created.assert_status(StatusCode::CREATED);
    let bob: SessionInfo = created.json();
    assert!(app.photo_dir("bob").is_dir());

    app.server
        .post("/admin/create_user")
        .add_header(COOKIE, admin.clone())
        .json(&json!({ "username": "bob", "password": "again" }))
        .await
        .assert_status(StatusCode::CONFLICT);

    app.server
        .post(&format!("/admin/change_password/{}", bob.id))
        .add_header(COOKIE, admin.clone())
        .json(&json!({ "new_password": "second" }))
        .await
        .assert_status(StatusCode::NO_CONTENT);
    app.login("bob", "first")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    let bob_session = session_cookie(&app.login("bob", "second").await);

    let toggled = app
        .server
        .post(&format!("/admin/toggle_admin/{}", bob.id))
        .add_header(COOKIE, admin.clone())
        .await;
    toggled.assert_status_ok();
    assert_eq!(toggled.json::<Value>()["is_admin"], true);
    app.server
        .get("/admin")
        .add_header(COOKIE, bob_session.clone())
        .await
        .assert_status_ok();

    app.server
        .get(&format!("/admin/toggle_admin/{}", bob.id))
        .add_header(COOKIE, admin.clone())
        .await
        .assert_status_ok();
    app.server
        .get("/admin")
        .add_header(COOKIE, bob_session.clone())
        .await
        .assert_status(StatusCode::FORBIDDEN);

    app.server
        .post(&format!("/admin/delete_user/{}", bob.id))
        .add_header(COOKIE, admin.clone())
        .await
        .assert_status(StatusCode::NO_CONTENT);

    // A still-signed session for a deleted account is refused.
    app.server
        .get("/api/media")
        .add_header(COOKIE, bob_session)
        .await
        .assert_status(StatusCode::FORBIDDEN);

    app.server
        .post(&format!("/admin/delete_user/{}", bob.id))
        .add_header(COOKIE, admin.clone())
        .await
        .assert_status(StatusCode::NOT_FOUND);
    app.server
        .post("/admin/change_password/999")
        .add_header(COOKIE, admin)
        .json(&json!({ "new_password": "x" }))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admin_cannot_delete_self() {
    let app = TestApp::new().await;
    let admin = app.first_admin("root").await;

    app.server
        .get("/admin/delete_user/1")
        .add_header(COOKIE, admin.clone())
        .await
        .assert_status(StatusCode::FORBIDDEN);

    app.login("root", "admin-pass").await.assert_status_ok();
}
