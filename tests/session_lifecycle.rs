//! Stream lifecycle integration tests
//!
//! Exercises creation, the pending -> active -> finished transitions and the
//! read projections against an in-memory SQLite database with migrations
//! applied.

use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use streamcast::{
    config::DatabaseConfig,
    database::{
        Database,
        repositories::{StreamSeaOrmRepository, StreamTagSeaOrmRepository},
    },
    errors::AppError,
    models::{StreamCreateRequest, StreamState},
    services::{SessionReconciler, TagAssociator},
    views::{ActiveStreamView, HistoryView},
};

async fn test_database() -> Database {
    let config = DatabaseConfig {
        url: "sqlite::memory:".to_string(),
        max_connections: Some(1),
    };
    let database = Database::new(&config).await.expect("failed to connect");
    database.migrate().await.expect("failed to run migrations");
    database
}

fn create_request(user_id: Uuid, stream_key: &str, title: &str) -> StreamCreateRequest {
    StreamCreateRequest {
        user_id,
        stream_key: stream_key.to_string(),
        title: title.to_string(),
        preview: Some("previews/cover.png".to_string()),
    }
}

#[tokio::test]
async fn create_rejects_missing_required_fields() {
    let database = test_database().await;
    let repo = StreamSeaOrmRepository::new(database.connection());

    let missing_key = repo
        .create(create_request(Uuid::new_v4(), "  ", "Title"))
        .await;
    assert!(matches!(missing_key, Err(AppError::Validation { .. })));

    let missing_title = repo
        .create(create_request(Uuid::new_v4(), "key", ""))
        .await;
    assert!(matches!(missing_title, Err(AppError::Validation { .. })));

    let missing_user = repo.create(create_request(Uuid::nil(), "key", "Title")).await;
    assert!(matches!(missing_user, Err(AppError::Validation { .. })));
}

#[tokio::test]
async fn full_lifecycle_happy_path() {
    let database = test_database().await;
    let repo = StreamSeaOrmRepository::new(database.connection());
    let reconciler = SessionReconciler::new(database.connection());

    let user_id = Uuid::new_v4();
    let stream = repo
        .create(create_request(user_id, "K", "T"))
        .await
        .unwrap();
    assert_eq!(stream.state(), StreamState::Pending);
    assert!(stream.broadcast_id.is_none());
    assert!(stream.start.is_none() && stream.end.is_none());

    let started = reconciler.start_stream("bc-1", stream.id).await.unwrap();
    assert_eq!(started.state(), StreamState::Active);
    assert!(started.start.is_some());
    assert_eq!(started.broadcast_id.as_deref(), Some("bc-1"));

    let closed = reconciler.end_stream("bc-1", "/rec/1.mp4").await.unwrap();
    assert_eq!(closed, 1);

    let finished = repo.find_by_id(stream.id).await.unwrap().unwrap();
    assert_eq!(finished.state(), StreamState::Finished);
    assert!(finished.end.is_some());
    assert_eq!(finished.path.as_deref(), Some("/rec/1.mp4"));

    // Core invariants: end implies start and path, broadcast id iff start
    assert!(finished.start.is_some());
    assert!(finished.end.unwrap() >= finished.start.unwrap());
    assert_eq!(finished.broadcast_id.is_some(), finished.start.is_some());
}

#[tokio::test]
async fn end_stream_twice_transitions_exactly_once() {
    let database = test_database().await;
    let repo = StreamSeaOrmRepository::new(database.connection());
    let reconciler = SessionReconciler::new(database.connection());

    let stream = repo
        .create(create_request(Uuid::new_v4(), "K", "T"))
        .await
        .unwrap();
    reconciler.start_stream("bc-1", stream.id).await.unwrap();

    assert_eq!(reconciler.end_stream("bc-1", "/rec/1.mp4").await.unwrap(), 1);
    let after_first = repo.find_by_id(stream.id).await.unwrap().unwrap();

    // The duplicate signal matches zero rows and is silently tolerated
    assert_eq!(reconciler.end_stream("bc-1", "/rec/other.mp4").await.unwrap(), 0);
    let after_second = repo.find_by_id(stream.id).await.unwrap().unwrap();

    assert_eq!(after_first, after_second);
    assert_eq!(after_second.path.as_deref(), Some("/rec/1.mp4"));
}

#[tokio::test]
async fn start_stream_on_bound_stream_is_a_conflict() {
    let database = test_database().await;
    let repo = StreamSeaOrmRepository::new(database.connection());
    let reconciler = SessionReconciler::new(database.connection());

    let stream = repo
        .create(create_request(Uuid::new_v4(), "K", "T"))
        .await
        .unwrap();
    let started = reconciler.start_stream("bc-1", stream.id).await.unwrap();

    let second = reconciler.start_stream("bc-2", stream.id).await;
    assert!(matches!(second, Err(AppError::Conflict { .. })));

    // The losing transition must leave the row unchanged
    let after = repo.find_by_id(stream.id).await.unwrap().unwrap();
    assert_eq!(after.broadcast_id.as_deref(), Some("bc-1"));
    assert_eq!(after.start, started.start);
}

#[tokio::test]
async fn start_stream_on_unknown_stream_is_not_found() {
    let database = test_database().await;
    let reconciler = SessionReconciler::new(database.connection());

    let result = reconciler.start_stream("bc-1", Uuid::new_v4()).await;
    assert!(matches!(result, Err(AppError::NotFound { .. })));
}

#[tokio::test]
async fn attach_with_empty_tag_set_is_a_noop() {
    let database = test_database().await;
    let repo = StreamSeaOrmRepository::new(database.connection());
    let tags = TagAssociator::new(database.connection());
    let tag_repo = StreamTagSeaOrmRepository::new(database.connection());

    let stream = repo
        .create(create_request(Uuid::new_v4(), "K", "T"))
        .await
        .unwrap();

    assert_eq!(tags.attach(stream.id, &[]).await.unwrap(), 0);
    assert_eq!(tag_repo.count_for_stream(stream.id).await.unwrap(), 0);
}

#[tokio::test]
async fn attach_skips_nil_tag_ids() {
    let database = test_database().await;
    let repo = StreamSeaOrmRepository::new(database.connection());
    let tags = TagAssociator::new(database.connection());
    let tag_repo = StreamTagSeaOrmRepository::new(database.connection());

    let stream = repo
        .create(create_request(Uuid::new_v4(), "K", "T"))
        .await
        .unwrap();

    let real_tag = Uuid::new_v4();
    let attached = tags.attach(stream.id, &[Uuid::nil(), real_tag]).await.unwrap();
    assert_eq!(attached, 1);

    let stored = tag_repo.find_tag_ids_for_stream(stream.id).await.unwrap();
    assert_eq!(stored, vec![real_tag]);
}

#[tokio::test]
async fn attach_links_every_tag() {
    let database = test_database().await;
    let repo = StreamSeaOrmRepository::new(database.connection());
    let tags = TagAssociator::new(database.connection());
    let tag_repo = StreamTagSeaOrmRepository::new(database.connection());

    let stream = repo
        .create(create_request(Uuid::new_v4(), "K", "T"))
        .await
        .unwrap();

    let tag_ids = [Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4()];
    assert_eq!(tags.attach(stream.id, &tag_ids).await.unwrap(), 3);

    let mut stored = tag_repo.find_tag_ids_for_stream(stream.id).await.unwrap();
    stored.sort();
    let mut expected = tag_ids.to_vec();
    expected.sort();
    assert_eq!(stored, expected);
}

#[tokio::test]
async fn active_listing_exposes_only_public_fields() {
    let database = test_database().await;
    let repo = StreamSeaOrmRepository::new(database.connection());
    let reconciler = SessionReconciler::new(database.connection());
    let view = ActiveStreamView::new(database.connection());

    let stream = repo
        .create(create_request(Uuid::new_v4(), "K", "T"))
        .await
        .unwrap();
    reconciler.start_stream("bc-1", stream.id).await.unwrap();

    let listing = view.list().await.unwrap();
    assert_eq!(listing.len(), 1);
    assert_eq!(listing[0].id, stream.id);
    assert_eq!(listing[0].broadcast_id.as_deref(), Some("bc-1"));

    // Serialized shape carries exactly the whitelisted fields
    let serialized = serde_json::to_value(&listing[0]).unwrap();
    let mut keys: Vec<&str> = serialized
        .as_object()
        .unwrap()
        .keys()
        .map(String::as_str)
        .collect();
    keys.sort_unstable();
    assert_eq!(
        keys,
        vec!["broadcast_id", "id", "preview", "start", "stream_key", "title"]
    );
}

#[tokio::test]
async fn active_listing_covers_pending_and_live_but_not_finished() {
    let database = test_database().await;
    let repo = StreamSeaOrmRepository::new(database.connection());
    let reconciler = SessionReconciler::new(database.connection());
    let view = ActiveStreamView::new(database.connection());

    let user_id = Uuid::new_v4();
    let pending = repo.create(create_request(user_id, "K1", "P")).await.unwrap();
    let live = repo.create(create_request(user_id, "K2", "L")).await.unwrap();
    let done = repo.create(create_request(user_id, "K3", "D")).await.unwrap();

    reconciler.start_stream("bc-live", live.id).await.unwrap();
    reconciler.start_stream("bc-done", done.id).await.unwrap();
    reconciler.end_stream("bc-done", "/rec/d.mp4").await.unwrap();

    let mut listed: Vec<Uuid> = view.list().await.unwrap().iter().map(|e| e.id).collect();
    listed.sort();
    let mut expected = vec![pending.id, live.id];
    expected.sort();
    assert_eq!(listed, expected);
}

#[tokio::test]
async fn user_history_is_finished_only_and_newest_first() {
    let database = test_database().await;
    let repo = StreamSeaOrmRepository::new(database.connection());
    let reconciler = SessionReconciler::new(database.connection());
    let view = HistoryView::new(database.connection());

    let user_id = Uuid::new_v4();
    let other_user = Uuid::new_v4();

    let first = repo.create(create_request(user_id, "K", "First")).await.unwrap();
    let second = repo.create(create_request(user_id, "K", "Second")).await.unwrap();
    let open = repo.create(create_request(user_id, "K", "Open")).await.unwrap();
    let foreign = repo
        .create(create_request(other_user, "K9", "Foreign"))
        .await
        .unwrap();

    reconciler.start_stream("bc-1", first.id).await.unwrap();
    reconciler.start_stream("bc-2", second.id).await.unwrap();
    reconciler.start_stream("bc-3", open.id).await.unwrap();
    reconciler.start_stream("bc-4", foreign.id).await.unwrap();

    reconciler.end_stream("bc-1", "/rec/1.mp4").await.unwrap();
    // Distinct update timestamps so the ordering is observable
    tokio::time::sleep(Duration::from_millis(20)).await;
    reconciler.end_stream("bc-2", "/rec/2.mp4").await.unwrap();
    reconciler.end_stream("bc-4", "/rec/9.mp4").await.unwrap();

    let history = view.for_user(user_id).await.unwrap();
    let ids: Vec<Uuid> = history.iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![second.id, first.id]);
    assert!(history.iter().all(|e| e.path.is_some()));
    assert!(history.iter().all(|e| e.user_id == user_id));
}

#[tokio::test]
async fn broadcasting_users_are_distinct_and_capped() {
    let database = test_database().await;
    let repo = StreamSeaOrmRepository::new(database.connection());
    let reconciler = SessionReconciler::new(database.connection());
    let view = HistoryView::new(database.connection());

    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();

    for (n, user_id) in [(1, alice), (2, alice), (3, bob)] {
        let stream = repo
            .create(create_request(user_id, &format!("K{n}"), "T"))
            .await
            .unwrap();
        reconciler
            .start_stream(&format!("bc-{n}"), stream.id)
            .await
            .unwrap();
        reconciler
            .end_stream(&format!("bc-{n}"), &format!("/rec/{n}.mp4"))
            .await
            .unwrap();
    }
    // A stream that never finished does not make its owner a broadcaster
    let never_finished = repo
        .create(create_request(Uuid::new_v4(), "K9", "T"))
        .await
        .unwrap();
    reconciler
        .start_stream("bc-9", never_finished.id)
        .await
        .unwrap();

    let mut users = view.broadcasting_users(10).await.unwrap();
    users.sort();
    let mut expected = vec![alice, bob];
    expected.sort();
    assert_eq!(users, expected);

    assert_eq!(view.broadcasting_users(1).await.unwrap().len(), 1);
}

#[tokio::test]
async fn find_by_stream_key_returns_the_newest_row() {
    let database = test_database().await;
    let repo = StreamSeaOrmRepository::new(database.connection());

    let user_id = Uuid::new_v4();
    let _older = repo.create(create_request(user_id, "K", "Old")).await.unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;
    let newer = repo.create(create_request(user_id, "K", "New")).await.unwrap();

    let found = repo.find_by_stream_key("K").await.unwrap().unwrap();
    assert_eq!(found.id, newer.id);

    assert!(repo.find_by_stream_key("missing").await.unwrap().is_none());
}

#[tokio::test]
async fn reconciler_is_shareable_across_tasks() {
    let database = test_database().await;
    let repo = StreamSeaOrmRepository::new(database.connection());
    let reconciler = Arc::new(SessionReconciler::new(database.connection()));

    let stream = repo
        .create(create_request(Uuid::new_v4(), "K", "T"))
        .await
        .unwrap();

    let task_reconciler = reconciler.clone();
    let handle =
        tokio::spawn(async move { task_reconciler.start_stream("bc-1", stream.id).await });
    let started = handle.await.unwrap().unwrap();
    assert_eq!(started.broadcast_id.as_deref(), Some("bc-1"));
}
