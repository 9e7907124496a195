//! User store against the mock backend.

#![allow(clippy::unwrap_used)]

use pitii_client::UserStore;
use pitii_client::api::UserPayload;
use pitii_core::{Email, UserId};
use pitii_integration_tests::{Endpoint, MockBackend};
use secrecy::SecretString;

fn payload(name: &str, email: &str, password: Option<&str>) -> UserPayload {
    UserPayload {
        name: name.to_owned(),
        email: Email::parse(email).unwrap(),
        password: password.map(SecretString::from),
    }
}

#[tokio::test]
async fn test_user_lifecycle() {
    let mock = MockBackend::start().await;
    mock.seed_user("Ana", "ana@pitii.com");

    let store = UserStore::new(mock.client());
    store.load().await.expect("load failed");
    assert_eq!(store.len().await, 1);

    let bruno = store
        .add(&payload("Bruno", "bruno@pitii.com", Some("s3cret")))
        .await
        .expect("add failed");
    assert_eq!(bruno.id, UserId::new(2));
    assert_eq!(store.len().await, 2);

    let renamed = store
        .update(bruno.id, &payload("Bruno S.", "bruno@pitii.com", None))
        .await
        .expect("update failed");
    let users = store.snapshot().await;
    assert_eq!(users[0].name, "Ana");
    assert_eq!(users[1], renamed);

    store.delete(UserId::new(1)).await.expect("delete failed");
    let users = store.snapshot().await;
    assert_eq!(users, vec![renamed]);
    assert_eq!(mock.users(), users);
}

#[tokio::test]
async fn test_rejected_add_leaves_list_unchanged() {
    let mock = MockBackend::start().await;
    mock.seed_user("Ana", "ana@pitii.com");
    let store = UserStore::new(mock.client());
    store.load().await.expect("load failed");

    // Duplicate email.
    let err = store
        .add(&payload("Ana again", "ana@pitii.com", Some("pw")))
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(409));
    assert!(err.to_string().contains("Email already registered"));
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn test_failed_update_and_delete_leave_list_unchanged() {
    let mock = MockBackend::start().await;
    let ana = mock.seed_user("Ana", "ana@pitii.com");
    let store = UserStore::new(mock.client());
    store.load().await.expect("load failed");

    mock.fail(Endpoint::UpdateUser, 503, "maintenance");
    mock.fail(Endpoint::DeleteUser, 503, "maintenance");

    assert!(
        store
            .update(ana.id, &payload("Ana Maria", "ana@pitii.com", None))
            .await
            .is_err()
    );
    assert!(store.delete(ana.id).await.is_err());
    assert_eq!(store.snapshot().await, vec![ana]);
}

#[tokio::test]
async fn test_load_failure_is_returned() {
    let mock = MockBackend::start().await;
    mock.fail(Endpoint::ListUsers, 500, "boom");

    let store = UserStore::new(mock.client());
    let err = store.load().await.unwrap_err();

    assert_eq!(err.status(), Some(500));
    assert!(store.is_empty().await);
}
