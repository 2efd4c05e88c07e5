#![allow(dead_code)]

use axum::http::{HeaderValue, StatusCode};
use axum_test::{TestResponse, TestServer};
use selfly::{Config, create_app};
use serde_json::json;
use std::path::PathBuf;
use tempfile::TempDir;

pub const SECRET: &str = "integration-test-secret";

pub struct TestApp {
    pub temp_dir: TempDir,
    pub server: TestServer,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    pub async fn with_config(customize: impl FnOnce(&mut Config)) -> Self {
        let temp_dir = TempDir::new().unwrap();

        let mut config = Config::default();
        config.app.session_secret = SECRET.to_string();
        config.storage.database = temp_dir.path().join("database.toml");
        config.media.per_page = 20;
        customize(&mut config);

        let app = create_app(config).await.unwrap();
        let server = TestServer::new(app).unwrap();

        Self { temp_dir, server }
    }

    pub fn photo_dir(&self, username: &str) -> PathBuf {
        self.temp_dir.path().join(username).join("photos")
    }

    pub fn video_dir(&self, username: &str) -> PathBuf {
        self.temp_dir.path().join(username).join("videos")
    }

    fn signup_body(&self, username: &str, password: &str) -> serde_json::Value {
        json!({
            "username": username,
            "password": password,
            "photo_dir": self.photo_dir(username),
            "video_dir": self.video_dir(username),
        })
    }

    /// Creates the bootstrap admin and returns its session cookie.
    pub async fn first_admin(&self, username: &str) -> HeaderValue {
        let response = self
            .server
            .post("/first-admin-signup")
            .json(&self.signup_body(username, "admin-pass"))
            .await;
        response.assert_status_ok();
        session_cookie(&response)
    }

    /// Self-service signup; returns the new user's session cookie.
    pub async fn signup(&self, username: &str) -> HeaderValue {
        let response = self
            .server
            .post("/signup")
            .json(&self.signup_body(username, "secret"))
            .await;
        response.assert_status_ok();
        session_cookie(&response)
    }

    pub async fn login(&self, username: &str, password: &str) -> TestResponse {
        self.server
            .post("/login")
            .json(&json!({ "username": username, "password": password }))
            .await
    }

    pub fn add_photo(&self, username: &str, filename: &str, contents: &[u8]) -> PathBuf {
        let path = self.photo_dir(username).join(filename);
        std::fs::write(&path, contents).unwrap();
        path
    }

    pub fn add_video(&self, username: &str, filename: &str, contents: &[u8]) -> PathBuf {
        let path = self.video_dir(username).join(filename);
        std::fs::write(&path, contents).unwrap();
        path
    }
}

/// Turns a `Set-Cookie` response header into a `Cookie` request header value.
pub fn session_cookie(response: &TestResponse) -> HeaderValue {
    let set_cookie = response.header("set-cookie");
    let pair = set_cookie
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string();
    assert!(pair.starts_with("session="), "unexpected cookie: {}", pair);
    HeaderValue::from_str(&pair).unwrap()
}

pub fn assert_redirect(response: &TestResponse, location: &str) {
    response.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(response.header("location"), location);
}

impl TestApp {
    /// Bootstraps an unrelated admin first so `username` becomes a regular member.
    pub async fn signup_after_admin(&self, username: &str) -> HeaderValue {
        self.first_admin("root").await;
        self.signup(username).await
    }
}
