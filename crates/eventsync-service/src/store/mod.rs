//! Event store orchestration.

pub mod resync;
pub mod service;

pub use resync::ResyncReport;
pub use service::EventStore;
