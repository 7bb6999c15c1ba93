//! # eventsync-core
//!
//! Core crate for EventSync. Contains the collaborator traits the
//! synchronization engine consumes (search index, attachment store),
//! configuration schemas, typed identifiers, the index document shape,
//! and the unified error system.
//!
//! This crate has **no** internal dependencies on other EventSync crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
