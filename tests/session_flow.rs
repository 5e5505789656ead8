//! Session lifecycle against the fake API

mod common;

use std::sync::Arc;

use campaign_client::{
    ClientConfig, ClientError, ClientState,
    constants::{messages, storage_keys},
    models::Role,
    participation,
    services::SessionState,
    storage::{KeyValueStore, MemoryStore},
};
use common::FakeApi;
use tokio_test::{assert_err, assert_ok};

#[tokio::test]
async fn test_register_then_login_keeps_volunteer_role() {
    let api = FakeApi::spawn().await;
    let client = api.client();

    let registered = assert_ok!(
        client
            .session()
            .register("Alice", "alice@x.com", "secret1", "secret1", "user")
            .await
    );
    assert_eq!(registered.role, Role::User);
    assert_ok!(client.session().logout().await);

    let user = assert_ok!(client.session().login("alice@x.com", "secret1").await);
    assert_eq!(user.role, Role::User);

    let overrides = assert_ok!(client.session().organizer_overrides().await);
    assert_eq!(participation::effective_role(&user.profile, &overrides), Role::User);
}

#[tokio::test]
async fn test_duplicate_registration_surfaces_server_message() {
    let api = FakeApi::spawn().await;
    api.seed_user("Alice", "alice@x.com", "secret1", "user");
    let client = api.client();

    let err = assert_err!(
        client
            .session()
            .register("Alice", "alice@x.com", "secret1", "secret1", "user")
            .await
    );
    assert_eq!(err.to_string(), "Email already registered");
    assert!(!client.session().state().await.is_authenticated());
}

#[tokio::test]
async fn test_wrong_password_persists_nothing() {
    let api = FakeApi::spawn().await;
    api.seed_user("Alice", "alice@x.com", "secret1", "user");
    let store = Arc::new(MemoryStore::new());
    let client = api.client_with_store(store.clone());

    let err = assert_err!(client.session().login("alice@x.com", "wrong!").await);
    assert_eq!(err.to_string(), "Invalid credentials");
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_session_survives_restart() {
    let api = FakeApi::spawn().await;
    api.seed_user("Alice", "alice@x.com", "secret1", "user");
    let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());

    let first = api.client_with_store(store.clone());
    let user = assert_ok!(first.session().login("alice@x.com", "secret1").await);

    let second = api.client_with_store(store);
    assert_eq!(second.session().state().await, SessionState::Unknown);
    let restored = second.session().restore_session().await;
    assert_eq!(restored.user().map(|u| u.id()), Some(user.id()));
    assert_eq!(second.session().last_error().await, None);
}

#[tokio::test]
async fn test_partial_session_restores_anonymous() {
    let api = FakeApi::spawn().await;
    let store = Arc::new(MemoryStore::new());
    store.set(storage_keys::TOKEN, "stale-token").await.unwrap();

    let client = api.client_with_store(store);
    assert_eq!(client.session().restore_session().await, SessionState::Anonymous);
}

#[tokio::test]
async fn test_rejected_token_clears_session() {
    let api = FakeApi::spawn().await;
    api.seed_user("Alice", "alice@x.com", "secret1", "user");
    let store = Arc::new(MemoryStore::new());
    let client = api.client_with_store(store.clone());
    assert_ok!(client.session().login("alice@x.com", "secret1").await);
    client.local().add_joined_marker("some-user", "e1").await.unwrap();

    api.revoke_tokens();
    let err = assert_err!(client.session().refresh_profile().await);
    assert_eq!(err, ClientError::Unauthorized("Invalid token".to_string()));

    assert_eq!(client.session().state().await, SessionState::Anonymous);
    assert_eq!(store.get(storage_keys::TOKEN).await.unwrap(), None);
    assert_eq!(store.get(storage_keys::USER).await.unwrap(), None);
    // Device state outlives the session
    assert!(client.local().joined_markers("some-user").await.unwrap().contains("e1"));
}

#[tokio::test]
async fn test_rejected_token_on_any_request_signs_out() {
    let api = FakeApi::spawn().await;
    api.seed_user("Alice", "alice@x.com", "secret1", "admin");
    let store = Arc::new(MemoryStore::new());
    let client = api.client_with_store(store.clone());
    assert_ok!(client.session().login("alice@x.com", "secret1").await);
    assert!(client.session().is_admin().await);

    api.revoke_tokens();
    let err = assert_err!(client.campaigns().join("any").await);
    assert_eq!(err, ClientError::Unauthorized("Invalid token".to_string()));

    assert_eq!(client.session().state().await, SessionState::Anonymous);
    assert!(!client.session().is_admin().await);
    assert_eq!(client.session().current_user().await, None);
    assert_eq!(store.get(storage_keys::TOKEN).await.unwrap(), None);

    // Signing in again gives a fresh session
    assert_ok!(client.session().login("alice@x.com", "secret1").await);
    assert!(client.session().state().await.is_authenticated());
}

#[tokio::test]
async fn test_refresh_picks_up_server_role_change() {
    let api = FakeApi::spawn().await;
    let id = api.seed_user("Alice", "alice@x.com", "secret1", "user");
    let client = api.client();
    assert_ok!(client.session().login("alice@x.com", "secret1").await);
    assert!(!client.session().is_admin().await);

    api.set_role(&id, "admin");
    let refreshed = assert_ok!(client.session().refresh_profile().await);
    assert_eq!(refreshed.role, Role::Admin);
    assert!(client.session().is_admin().await);

    let cached = client.local().cached_user().await.unwrap().unwrap();
    assert_eq!(cached.role, Role::Admin);
}

#[tokio::test]
async fn test_unreachable_api_is_a_transport_error() {
    let mut config = ClientConfig::for_base_url("http://127.0.0.1:1/api");
    config.api.timeout_secs = 2;
    let client = ClientState::new(config, Arc::new(MemoryStore::new())).unwrap();

    let err = assert_err!(client.session().login("alice@x.com", "secret1").await);
    assert!(matches!(err, ClientError::Transport(_)));
    assert_eq!(err.user_message("x"), messages::CONNECTION);
}
