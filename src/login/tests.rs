use super::*;
use crate::store::{RecordStore, TomlRecordStore};
use tempfile::TempDir;

fn signup(username: &str, root: &std::path::Path) -> SignupRequest {
    SignupRequest {
        username: username.to_string(),
        password: "pw".to_string(),
        photo_dir: root.join(username).join("photos").to_string_lossy().to_string(),
        video_dir: root.join(username).join("videos").to_string_lossy().to_string(),
    }
}

#[test]
fn test_signup_request_validation() {
    let mut request = SignupRequest {
        username: "  ".to_string(),
        password: "pw".to_string(),
        photo_dir: String::new(),
        video_dir: "   ".to_string(),
    };
    assert!(matches!(request.validate(), Err(LoginError::InvalidInput(_))));

    request.username = "alice".to_string();
    assert!(request.validate().is_ok());
    assert!(request.photo_dir().is_none());
    assert!(request.video_dir().is_none());

    request.password = String::new();
    assert!(matches!(request.validate(), Err(LoginError::InvalidInput(_))));
}

#[tokio::test]
async fn test_register_first_admin_then_members() {
    let temp_dir = TempDir::new().unwrap();
    let store = TomlRecordStore::open(temp_dir.path().join("db.toml"))
        .await
        .unwrap();

    let admin = register_user(&store, signup("root", temp_dir.path()), Enrollment::FirstAdmin)
        .await
        .unwrap();
    assert!(admin.is_admin);
    assert!(admin.photo_dir.as_ref().unwrap().is_dir());
    assert!(admin.video_dir.as_ref().unwrap().is_dir());
    assert!(verify_password("pw", &admin.password_hash));

    let again = register_user(&store, signup("late", temp_dir.path()), Enrollment::FirstAdmin).await;
    assert!(matches!(again, Err(LoginError::AlreadyInitialized)));

    let member = register_user(
        &store,
        signup("alice", temp_dir.path()),
        Enrollment::Standard { is_admin: false },
    )
    .await
    .unwrap();
    assert!(!member.is_admin);

    let duplicate = register_user(
        &store,
        signup("alice", temp_dir.path()),
        Enrollment::Standard { is_admin: true },
    )
    .await;
    assert!(matches!(duplicate, Err(LoginError::UsernameTaken(name)) if name == "alice"));
    assert_eq!(store.count_users().await.unwrap(), 2);
}

#[tokio::test]
async fn test_register_without_directories() {
    let temp_dir = TempDir::new().unwrap();
    let store = TomlRecordStore::open(temp_dir.path().join("db.toml"))
        .await
        .unwrap();

    let request = SignupRequest {
        username: "bare".to_string(),
        password: "pw".to_string(),
        photo_dir: String::new(),
        video_dir: String::new(),
    };
    let user = register_user(&store, request, Enrollment::Standard { is_admin: false })
        .await
        .unwrap();

    assert!(user.photo_dir.is_none());
    assert!(user.video_dir.is_none());
}
