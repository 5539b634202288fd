mod common;

use auth_engine::Endpoints;
use blog_sync::{ProfileController, ProfileDraft};
use reqwest::Method;
use serde_json::json;

#[tokio::test]
async fn load_caches_profile() {
    let h = common::signed_in("fresh");
    h.transport.push(
        Method::GET,
        Endpoints::PROFILE,
        200,
        json!({"id": 1, "username": "ana", "email": "ana@example.com"}),
    );
    let controller = ProfileController::new(h.session.executor());

    let profile = controller.load().await.unwrap();

    assert_eq!(profile.username, "ana");
    assert_eq!(controller.profile(), Some(profile));
}

#[tokio::test]
async fn update_rejects_blank_email_locally() {
    let h = common::signed_in("fresh");
    let controller = ProfileController::new(h.session.executor());

    let err = controller
        .update(&ProfileDraft::new("ana", " "))
        .await
        .unwrap_err();

    assert!(err.is_validation());
    assert!(h.transport.requests().is_empty());
}

#[tokio::test]
async fn update_failure_keeps_cached_profile() {
    let h = common::signed_in("fresh");
    h.transport.push(
        Method::GET,
        Endpoints::PROFILE,
        200,
        json!({"id": 1, "username": "ana", "email": "ana@example.com"}),
    );
    h.transport
        .push(Method::PUT, Endpoints::PROFILE, 400, json!({"error": "Username already in use"}));
    let controller = ProfileController::new(h.session.executor());
    controller.load().await.unwrap();

    controller
        .update(&ProfileDraft::new("bob", "ana@example.com"))
        .await
        .unwrap_err();

    assert_eq!(controller.profile().map(|p| p.username), Some("ana".to_string()));
    assert_eq!(
        controller.state().last_error.as_deref(),
        Some("Failed to update profile: Username already in use")
    );
}

#[tokio::test]
async fn update_replaces_profile() {
    let h = common::signed_in("fresh");
    h.transport.push(
        Method::PUT,
        Endpoints::PROFILE,
        200,
        json!({"id": 1, "username": "bob", "email": "bob@example.com"}),
    );
    let controller = ProfileController::new(h.session.executor());

    controller
        .update(&ProfileDraft::new("bob", "bob@example.com"))
        .await
        .unwrap();

    assert_eq!(controller.profile().map(|p| p.email), Some("bob@example.com".to_string()));
    assert_eq!(
        h.transport.requests()[0].body,
        Some(json!({"username": "bob", "email": "bob@example.com"}))
    );
}
