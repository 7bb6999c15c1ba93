//! Index propagation under failure: offline index, retries and cancellation.

use std::time::Duration;

use eventsync_core::config::CommitPolicy;
use eventsync_entity::{EventPatch, TextFormat, fingerprint};
use eventsync_service::{EventStoreError, SyncOperation};

use crate::helpers::{FlakyIndex, TestApp, message};

#[tokio::test]
async fn test_offline_index_keeps_store_write_and_resync_repairs() {
    let app = TestApp::new();
    app.index.set_offline(true);

    let err = app
        .store
        .create(message("a", "b", "while offline", TextFormat::PlainText))
        .await
        .unwrap_err();
    assert!(err.is_warning());
    let id = match err {
        EventStoreError::IndexSyncFailed {
            event_id,
            operation,
            ..
        } => {
            assert_eq!(operation, SyncOperation::Upsert);
            event_id
        }
        other => panic!("expected IndexSyncFailed, got {other:?}"),
    };

    let stored = app.store.find_by_id(id).await.unwrap();
    assert_eq!(stored.content.field("text").and_then(|f| f.as_text()), Some("while offline"));
    assert!(app.store.synchronizer().pending().contains(id));
    assert!(app.indexed_ids().await.is_empty());

    // Still offline: the retry fails and the id stays queued.
    let report = app.store.resync_pending().await;
    assert_eq!((report.attempted, report.failed), (1, 1));

    app.index.set_offline(false);
    let report = app.store.resync_pending().await;
    assert_eq!((report.attempted, report.resolved), (1, 1));
    assert!(app.store.synchronizer().pending().is_empty());
    assert_eq!(app.search("offline").await, vec![id.index_key()]);
}

#[tokio::test]
async fn test_resync_uses_latest_store_state() {
    let app = TestApp::new();
    let event = app
        .store
        .create(message("a", "b", "first draft", TextFormat::PlainText))
        .await
        .unwrap();

    app.index.set_offline(true);
    let err = app
        .store
        .update(event.id, &EventPatch::new().text(Some("second draft")))
        .await
        .unwrap_err();
    assert_eq!(err.stored_event_id(), Some(event.id));

    let err = app.store.delete(event.id).await.unwrap_err();
    assert!(matches!(
        err,
        EventStoreError::IndexSyncFailed { operation: SyncOperation::Remove, .. }
    ));

    app.index.set_offline(false);
    let report = app.store.resync_pending().await;
    assert_eq!(report.resolved, 1);
    assert!(app.indexed_ids().await.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_dropped_caller_does_not_cancel_propagation() {
    let index = FlakyIndex::new().with_upsert_delay(Duration::from_millis(50));
    let app = TestApp::with_index(index, CommitPolicy::AfterEach);
    let content = message("a", "b", "fire and forget", TextFormat::PlainText);
    let fp = fingerprint(&content).unwrap();

    let result = tokio::time::timeout(Duration::from_millis(10), app.store.create(content)).await;
    assert!(result.is_err(), "caller should time out while the index is slow");

    let stored = app.store.find_by_fingerprint(&fp).await.unwrap().unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert_eq!(app.indexed_ids().await, vec![stored.id.index_key()]);
    assert!(app.store.synchronizer().pending().is_empty());
}

#[tokio::test]
async fn test_batched_policy_defers_visibility_until_flush() {
    let app = TestApp::with_index(
        FlakyIndex::new(),
        CommitPolicy::Batched {
            interval_ms: 60_000,
            max_pending: 3,
        },
    );

    for text in ["one", "two"] {
        app.store
            .create(message("a", "b", text, TextFormat::PlainText))
            .await
            .unwrap();
    }
    assert!(app.indexed_ids().await.is_empty());
    assert_eq!(app.store.synchronizer().stats().staged, 2);

    // Reaching the threshold commits early.
    app.store
        .create(message("a", "b", "three", TextFormat::PlainText))
        .await
        .unwrap();
    assert_eq!(app.indexed_ids().await.len(), 3);

    app.store
        .create(message("a", "b", "four", TextFormat::PlainText))
        .await
        .unwrap();
    assert!(app.store.synchronizer().flush().await.unwrap());
    assert_eq!(app.indexed_ids().await.len(), 4);
    assert!(!app.store.synchronizer().flush().await.unwrap());
}
