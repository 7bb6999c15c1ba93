//! # eventsync-database
//!
//! The primary document store boundary. [`EventRepository`] is the narrow
//! interface the orchestration layer talks to; this crate provides an
//! in-memory implementation and a PostgreSQL one, plus connection and
//! migration management for the latter.

pub mod connection;
pub mod migration;
pub mod provider;
pub mod repositories;

pub use connection::connect_pool;
pub use provider::build_repository;
pub use repositories::{EventRepository, MemoryEventRepository, PgEventRepository};
