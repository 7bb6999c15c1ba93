//! Apache Solr index backend.

pub mod client;
pub mod document;

pub use client::SolrSearchIndex;
