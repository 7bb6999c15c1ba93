//! Event lifecycle tests: create, update, delete and fingerprint uniqueness.

use bytes::Bytes;
use futures::future::join_all;

use eventsync_core::traits::AttachmentStore;
use eventsync_core::types::EventId;
use eventsync_database::EventRepository;
use eventsync_entity::{EventContent, EventPatch, MediaBody, TextFormat, fingerprint};
use eventsync_service::EventStoreError;

use crate::helpers::{TestApp, at, message};

#[tokio::test]
async fn test_created_event_round_trips_with_stable_fingerprint() {
    let app = TestApp::new();
    let event = app
        .store
        .create(message("alice", "bob", "hello world", TextFormat::PlainText))
        .await
        .unwrap();

    let found = app.store.find_by_id(event.id).await.unwrap();
    assert_eq!(found, event);
    assert_eq!(fingerprint(&found.content).as_deref(), Some(found.fingerprint.as_str()));
    assert_eq!(app.search("hello").await, vec![event.id.index_key()]);
}

#[test]
fn test_fingerprint_changes_with_each_component() {
    let base = fingerprint(&message("a", "b", "hi", TextFormat::PlainText)).unwrap();
    for variant in [
        message("a2", "b", "hi", TextFormat::PlainText),
        message("a", "b2", "hi", TextFormat::PlainText),
        message("a", "b", "hi2", TextFormat::PlainText),
    ] {
        assert_ne!(fingerprint(&variant).unwrap(), base);
    }
}

#[tokio::test]
async fn test_format_and_time_do_not_distinguish_messages() {
    let app = TestApp::new();
    app.store
        .create(message("a", "b", "hi", TextFormat::PlainText))
        .await
        .unwrap();

    let second = message("a", "b", "hi", TextFormat::Markdown).authored_on(at(17));
    let err = app.store.create(second).await.unwrap_err();
    assert!(matches!(err, EventStoreError::DuplicateContent { .. }));
    assert_eq!(app.indexed_ids().await.len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_duplicates_yield_exactly_one_success() {
    let app = TestApp::new();
    let attempts = (0..16).map(|_| {
        let store = app.store.clone();
        tokio::spawn(async move {
            store
                .create(message("carol", "dave", "race", TextFormat::Html))
                .await
        })
    });

    let results: Vec<_> = join_all(attempts)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    let successes = results.iter().filter(|r| r.is_ok()).count();
    let duplicates = results
        .iter()
        .filter(|r| matches!(r, Err(EventStoreError::DuplicateContent { .. })))
        .count();
    assert_eq!(successes, 1);
    assert_eq!(duplicates, 15);
    assert_eq!(app.indexed_ids().await.len(), 1);
}

#[tokio::test]
async fn test_update_rechecks_uniqueness_against_new_fingerprint() {
    let app = TestApp::new();
    let first = app
        .store
        .create(message("a", "b", "one", TextFormat::PlainText))
        .await
        .unwrap();
    let second = app
        .store
        .create(message("a", "b", "two", TextFormat::PlainText))
        .await
        .unwrap();

    let err = app
        .store
        .update(second.id, &EventPatch::new().text(Some("one")))
        .await
        .unwrap_err();
    match err {
        EventStoreError::DuplicateContent { existing, .. } => assert_eq!(existing, Some(first.id)),
        other => panic!("expected duplicate, got {other:?}"),
    }
    assert_eq!(app.store.find_by_id(second.id).await.unwrap(), second);

    let updated = app
        .store
        .update(second.id, &EventPatch::new().text(Some("three")))
        .await
        .unwrap();
    assert_ne!(updated.fingerprint, second.fingerprint);
    assert_eq!(app.search("three").await, vec![second.id.index_key()]);
    assert!(app.search("two").await.is_empty());
}

#[tokio::test]
async fn test_delete_then_lookup_and_query() {
    let app = TestApp::new();
    let event = app
        .store
        .create(message("a", "b", "ephemeral note", TextFormat::PlainText))
        .await
        .unwrap();
    assert_eq!(app.search("ephemeral").await.len(), 1);

    app.store.delete(event.id).await.unwrap();

    assert!(matches!(
        app.store.find_by_id(event.id).await,
        Err(EventStoreError::NotFound(id)) if id == event.id
    ));
    assert!(app.search("ephemeral").await.is_empty());

    // The fingerprint is free again.
    app.store
        .create(message("a", "b", "ephemeral note", TextFormat::PlainText))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_delete_unknown_id() {
    let app = TestApp::new();
    let id = EventId::new();
    assert!(matches!(
        app.store.delete(id).await,
        Err(EventStoreError::NotFound(missing)) if missing == id
    ));
    assert_eq!(app.store.synchronizer().stats().removals, 0);
}

#[tokio::test]
async fn test_media_uniqueness_follows_attachment_content() {
    let app = TestApp::new();
    let reference = app.attachments.put(Bytes::from_static(b"png bytes")).await.unwrap();

    let event = app
        .store
        .create(
            EventContent::media(MediaBody::new(reference.clone()).caption("sunset", TextFormat::PlainText))
                .authored_on(at(20)),
        )
        .await
        .unwrap();
    assert!(event.content.attachment().unwrap().is_resolved());

    let err = app
        .store
        .create(
            EventContent::media(MediaBody::new(reference).caption("sunset", TextFormat::Markdown))
                .authored_on(at(21)),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EventStoreError::DuplicateContent { .. }));
}

#[tokio::test]
async fn test_media_with_dangling_reference_is_rejected() {
    let app = TestApp::new();
    let err = app
        .store
        .create(EventContent::media(MediaBody::new("no-such-reference")).authored_on(at(8)))
        .await
        .unwrap_err();
    assert!(matches!(err, EventStoreError::Validation(_)));
    assert_eq!(app.store.repository().count().await.unwrap(), 0);
}
