mod common;

use auth_engine::testing::json_response;
use auth_engine::{Endpoints, SessionState};
use blog_sync::{PostDraft, PostId, PostsController, SyncError};
use reqwest::Method;
use serde_json::json;
use std::time::Duration;

fn titles(controller: &PostsController) -> Vec<String> {
    controller.posts().into_iter().map(|p| p.title).collect()
}

async fn loaded(h: &common::Harness) -> PostsController {
    h.transport.push(
        Method::GET,
        Endpoints::POSTS,
        200,
        json!([common::post(1, "A", "a"), common::post(2, "B", "b")]),
    );
    let controller = PostsController::new(h.session.executor());
    controller.list(None).await.expect("initial list");
    controller
}

#[tokio::test]
async fn list_replaces_collection_in_server_order() {
    let h = common::signed_in("fresh");
    let controller = loaded(&h).await;

    assert_eq!(titles(&controller), vec!["A", "B"]);
    let state = controller.state();
    assert!(!state.loading);
    assert_eq!(state.last_error, None);
}

#[tokio::test]
async fn search_uses_query_parameter() {
    let h = common::signed_in("fresh");
    h.transport
        .push(Method::GET, Endpoints::SEARCH, 200, json!([common::post(2, "Rust", "b")]));
    let controller = PostsController::new(h.session.executor());

    controller.list(Some("  rust ")).await.unwrap();

    let sent = h.transport.requests();
    assert_eq!(sent[0].query, vec![("q".to_string(), "rust".to_string())]);
    assert_eq!(titles(&controller), vec!["Rust"]);
}

#[tokio::test]
async fn blank_search_lists_all_posts() {
    let h = common::signed_in("fresh");
    h.transport.push(Method::GET, Endpoints::POSTS, 200, json!([]));
    let controller = PostsController::new(h.session.executor());

    controller.list(Some("   ")).await.unwrap();

    assert_eq!(h.transport.count(&Method::GET, Endpoints::POSTS), 1);
}

#[tokio::test]
async fn failed_list_keeps_posts_and_sets_error() {
    let h = common::signed_in("fresh");
    let controller = loaded(&h).await;
    h.transport
        .push(Method::GET, Endpoints::POSTS, 500, json!({"error": "database down"}));

    let err = controller.list(None).await.unwrap_err();

    assert!(matches!(err, SyncError::Api(_)));
    assert_eq!(titles(&controller), vec!["A", "B"]);
    assert_eq!(
        controller.state().last_error.as_deref(),
        Some("Failed to load posts: database down")
    );
}

#[tokio::test]
async fn create_with_blank_title_makes_no_request() {
    let h = common::signed_in("fresh");
    let controller = loaded(&h).await;
    let before = h.transport.requests().len();

    let err = controller.create(&PostDraft::new("", "x")).await.unwrap_err();

    assert!(err.is_validation());
    assert_eq!(h.transport.requests().len(), before);
    assert_eq!(titles(&controller), vec!["A", "B"]);
}

#[tokio::test]
async fn create_prepends_server_post() {
    let h = common::signed_in("fresh");
    let controller = loaded(&h).await;
    h.transport
        .push(Method::POST, Endpoints::POSTS, 201, common::post(3, "C", "c"));

    let created = controller.create(&PostDraft::new("C", "c")).await.unwrap();

    assert_eq!(created.id, PostId(3));
    assert_eq!(titles(&controller), vec!["C", "A", "B"]);
    let sent = h.transport.requests();
    assert_eq!(
        sent.last().and_then(|r| r.body.clone()),
        Some(json!({"title": "C", "content": "c"}))
    );
}

#[tokio::test]
async fn failed_create_inserts_nothing() {
    let h = common::signed_in("fresh");
    let controller = loaded(&h).await;
    h.transport
        .push(Method::POST, Endpoints::POSTS, 400, json!({"error": "Title and content are required"}));

    controller.create(&PostDraft::new("C", "c")).await.unwrap_err();

    assert_eq!(titles(&controller), vec!["A", "B"]);
}

#[tokio::test]
async fn update_replaces_entry_in_place() {
    let h = common::signed_in("fresh");
    let controller = loaded(&h).await;
    h.transport
        .push(Method::PUT, &Endpoints::post(2), 200, common::post(2, "B2", "b2"));

    controller
        .update(PostId(2), &PostDraft::new("B2", "b2"))
        .await
        .unwrap();

    assert_eq!(titles(&controller), vec!["A", "B2"]);
}

#[tokio::test]
async fn failed_update_leaves_collection_identical() {
    let h = common::signed_in("fresh");
    let controller = loaded(&h).await;
    let before = controller.posts();
    h.transport.push(
        Method::PUT,
        &Endpoints::post(2),
        404,
        json!({"error": "Post not found or unauthorized"}),
    );

    let err = controller
        .update(PostId(2), &PostDraft::new("B2", "b2"))
        .await
        .unwrap_err();

    assert!(matches!(err, SyncError::Api(ref e) if e.status() == Some(404)));
    assert_eq!(controller.posts(), before);
}

#[tokio::test]
async fn remove_twice_reports_missing_post() {
    let h = common::signed_in("fresh");
    let controller = loaded(&h).await;
    h.transport
        .push(Method::DELETE, &Endpoints::post(1), 200, json!({"message": "Deleted successfully"}));
    h.transport.push(
        Method::DELETE,
        &Endpoints::post(1),
        404,
        json!({"error": "Post not found or unauthorized"}),
    );

    controller.remove(PostId(1)).await.unwrap();
    assert_eq!(titles(&controller), vec!["B"]);

    let err = controller.remove(PostId(1)).await.unwrap_err();
    assert!(matches!(err, SyncError::Api(ref e) if e.status() == Some(404)));
    assert_eq!(titles(&controller), vec!["B"]);
}

#[tokio::test]
async fn expired_credential_update_renews_once_and_applies() {
    let h = common::signed_in("fresh");
    let controller = loaded(&h).await;
    h.store
        .set(&client_storage::Session::new("stale", "refresh-1"))
        .unwrap();
    h.transport.route(Method::PUT, &Endpoints::post(2), |request| {
        if request.bearer_token() == Some("renewed") {
            json_response(200, common::post(2, "C", "D"))
        } else {
            json_response(401, json!({"error": "Token has expired"}))
        }
    });
    h.transport
        .push(Method::POST, Endpoints::REFRESH, 200, json!({"access_token": "renewed"}));

    controller
        .update(PostId(2), &PostDraft::new("C", "D"))
        .await
        .unwrap();

    assert_eq!(titles(&controller), vec!["A", "C"]);
    assert_eq!(h.transport.count(&Method::POST, Endpoints::REFRESH), 1);
    let state = controller.state();
    assert!(!state.loading);
    assert_eq!(state.last_error, None);
    assert_eq!(h.session.state(), SessionState::Authenticated);
}

#[tokio::test]
async fn concurrent_operations_share_one_renewal() {
    let h = common::signed_in("stale");
    let posts_route = |request: &auth_engine::ApiRequest| {
        if request.bearer_token() == Some("renewed") {
            json_response(200, json!([common::post(1, "A", "a")]))
        } else {
            json_response(401, json!({"error": "Token has expired"}))
        }
    };
    h.transport.route(Method::GET, Endpoints::POSTS, posts_route);
    h.transport.push_delayed(
        Method::POST,
        Endpoints::REFRESH,
        200,
        json!({"access_token": "renewed"}),
        Duration::from_millis(50),
    );
    let first = PostsController::new(h.session.executor());
    let second = PostsController::new(h.session.executor());

    let (a, b) = tokio::join!(first.list(None), second.list(None));

    assert!(a.is_ok() && b.is_ok());
    assert_eq!(h.transport.count(&Method::POST, Endpoints::REFRESH), 1);
    let retried: Vec<_> = h
        .transport
        .bearers(&Method::GET, Endpoints::POSTS)
        .into_iter()
        .filter(|b| b.as_deref() == Some("renewed"))
        .collect();
    assert_eq!(retried.len(), 2);
    assert!(!first.state().loading && !second.state().loading);
}

#[tokio::test]
async fn failed_renewal_expires_session_without_retry() {
    let h = common::signed_in("fresh");
    let controller = loaded(&h).await;
    h.transport
        .push(Method::DELETE, &Endpoints::post(1), 401, json!({"error": "Token has expired"}));
    h.transport
        .push(Method::POST, Endpoints::REFRESH, 401, json!({"error": "Token has been revoked"}));

    let err = controller.remove(PostId(1)).await.unwrap_err();

    assert!(err.is_session_expired());
    assert_eq!(h.transport.count(&Method::DELETE, &Endpoints::post(1)), 1);
    assert!(h.store.get().unwrap().is_anonymous());
    assert_eq!(h.session.state(), SessionState::Anonymous);
    assert_eq!(titles(&controller), vec!["A", "B"]);
    assert_eq!(
        controller.state().last_error.as_deref(),
        Some("Session expired. Please log in again.")
    );
}

#[tokio::test]
async fn reset_clears_posts() {
    let h = common::signed_in("fresh");
    let controller = loaded(&h).await;

    controller.reset();

    assert!(controller.posts().is_empty());
}
