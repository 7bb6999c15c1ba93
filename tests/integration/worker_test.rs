//! Background worker tests: reconciliation sweep and runner shutdown.

use std::time::Duration;

use tokio::sync::watch;

use eventsync_core::config::{CommitPolicy, SyncConfig, WorkerConfig};
use eventsync_core::error::ErrorKind;
use eventsync_core::traits::SearchIndex;
use eventsync_core::types::{EventId, IndexDocument};
use eventsync_entity::TextFormat;
use eventsync_worker::{Reconciler, WorkerRunner};

use crate::helpers::{FlakyIndex, TestApp, message};

#[tokio::test]
async fn test_reconcile_repairs_missing_and_orphaned_documents() {
    let app = TestApp::new();
    let kept = app
        .store
        .create(message("a", "b", "kept", TextFormat::PlainText))
        .await
        .unwrap();
    let lost = app
        .store
        .create(message("a", "b", "lost", TextFormat::PlainText))
        .await
        .unwrap();

    let orphan = EventId::new().index_key();
    let inner = app.index.inner();
    inner.remove(&lost.id.index_key()).await.unwrap();
    inner
        .upsert(IndexDocument::new(orphan.clone(), "Message").with_text("text", "ghost"))
        .await
        .unwrap();
    inner.commit().await.unwrap();

    let report = Reconciler::new(app.store.clone()).run_once().await.unwrap();
    assert_eq!(report.stored, 2);
    assert_eq!(report.upserted, 1);
    assert_eq!(report.removed, 1);
    assert_eq!(report.failed, 0);

    let mut expected = vec![kept.id.index_key(), lost.id.index_key()];
    expected.sort();
    let mut indexed = app.indexed_ids().await;
    indexed.sort();
    assert_eq!(indexed, expected);
    assert!(app.search("ghost").await.is_empty());

    let again = Reconciler::new(app.store.clone()).run_once().await.unwrap();
    assert_eq!((again.upserted, again.removed), (0, 0));
}

#[tokio::test]
async fn test_reconcile_fails_fast_when_index_offline() {
    let app = TestApp::new();
    app.index.set_offline(true);
    assert!(Reconciler::new(app.store.clone()).run_once().await.is_err());
}

#[tokio::test(start_paused = true)]
async fn test_reconcile_gives_up_on_stalled_index_listing() {
    let app = TestApp::with_config(
        FlakyIndex::new(),
        SyncConfig {
            commit_policy: CommitPolicy::AfterEach,
            index_timeout_ms: 500,
            ..SyncConfig::default()
        },
    );
    app.store
        .create(message("a", "b", "listed", TextFormat::PlainText))
        .await
        .unwrap();
    app.index.set_stall_listing(true);

    let started = tokio::time::Instant::now();
    let err = Reconciler::new(app.store.clone()).run_once().await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Timeout);
    assert!(started.elapsed() < Duration::from_secs(1));

    app.index.set_stall_listing(false);
    let report = Reconciler::new(app.store.clone()).run_once().await.unwrap();
    assert_eq!((report.stored, report.indexed), (1, 1));
}

#[tokio::test(start_paused = true)]
async fn test_runner_flushes_batched_writes_and_retries_pending() {
    let app = TestApp::with_index(
        FlakyIndex::new(),
        CommitPolicy::Batched {
            interval_ms: 200,
            max_pending: 1000,
        },
    );
    let runner = WorkerRunner::new(
        app.store.clone(),
        WorkerConfig {
            resync_interval_seconds: 1,
            reconcile_enabled: false,
            ..WorkerConfig::default()
        },
    );
    let (tx, rx) = watch::channel(false);
    let handle = tokio::spawn(async move { runner.run(rx).await });

    let staged = app
        .store
        .create(message("a", "b", "batched", TextFormat::PlainText))
        .await
        .unwrap();
    assert!(app.indexed_ids().await.is_empty());

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(app.indexed_ids().await, vec![staged.id.index_key()]);

    app.index.set_offline(true);
    let err = app
        .store
        .create(message("a", "b", "queued", TextFormat::PlainText))
        .await
        .unwrap_err();
    let queued = err.stored_event_id().unwrap();
    app.index.set_offline(false);

    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert!(app.store.synchronizer().pending().is_empty());
    assert!(app.indexed_ids().await.contains(&queued.index_key()));

    tx.send(true).unwrap();
    handle.await.unwrap().unwrap();
}
