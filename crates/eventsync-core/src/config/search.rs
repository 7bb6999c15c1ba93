//! Search index configuration.

use serde::{Deserialize, Serialize};

/// Top-level search index configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Index provider type: `"memory"` or `"solr"`.
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Solr-specific configuration.
    #[serde(default)]
    pub solr: SolrConfig,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            solr: SolrConfig::default(),
        }
    }
}

/// Solr backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolrConfig {
    /// Base URL of the Solr server (without the core name).
    #[serde(default = "default_solr_url")]
    pub url: String,
    /// Name of the Solr core (collection) holding event documents.
    #[serde(default = "default_core")]
    pub core: String,
    /// HTTP request timeout in milliseconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_ms: u64,
    /// Maximum number of ids fetched by a single listing request.
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl Default for SolrConfig {
    fn default() -> Self {
        Self {
            url: default_solr_url(),
            core: default_core(),
            request_timeout_ms: default_request_timeout(),
            page_size: default_page_size(),
        }
    }
}

fn default_provider() -> String {
    "memory".to_string()
}

fn default_solr_url() -> String {
    "http://localhost:8983/solr".to_string()
}

fn default_core() -> String {
    "events".to_string()
}

fn default_request_timeout() -> u64 {
    5000
}

fn default_page_size() -> usize {
    1000
}
