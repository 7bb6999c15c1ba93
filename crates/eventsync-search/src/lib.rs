//! # eventsync-search
//!
//! Full-text index backends for EventSync. Supports two modes:
//!
//! - **memory**: in-process inverted index, staged writes become visible on commit
//! - **solr**: Apache Solr over its JSON update and select APIs
//!
//! The backend is selected at runtime based on configuration.

#[cfg(feature = "memory")]
pub mod memory;
pub mod provider;
#[cfg(feature = "solr")]
pub mod solr;

pub use provider::SearchManager;
