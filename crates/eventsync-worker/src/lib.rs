//! Background tasks that keep the search index in line with the store.
//!
//! This crate provides:
//! - A commit flusher serving the batched commit policy
//! - A resync loop that retries pending propagations with backoff
//! - A reconciler that diffs store ids against index ids
//! - A cron scheduler that runs the reconciler periodically
//! - A runner tying the loops together under one shutdown signal

pub mod flusher;
pub mod reconcile;
pub mod resync;
pub mod runner;
pub mod scheduler;

pub use flusher::CommitFlusher;
pub use reconcile::{ReconcileReport, Reconciler};
pub use resync::ResyncLoop;
pub use runner::WorkerRunner;
pub use scheduler::CronScheduler;
