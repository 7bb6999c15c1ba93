//! Workspace integration tests for the event store and its index synchronization.

mod helpers;

mod event_test;
mod index_sync_test;
mod worker_test;
