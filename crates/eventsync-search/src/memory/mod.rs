//! In-process search index.

pub mod index;
pub mod tokenize;

pub use index::MemorySearchIndex;
