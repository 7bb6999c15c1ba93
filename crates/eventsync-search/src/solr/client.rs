//! Solr HTTP client implementing [`SearchIndex`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde_json::{Value, json};
use tracing::{debug, info};

use eventsync_core::config::SolrConfig;
use eventsync_core::error::{AppError, ErrorKind};
use eventsync_core::result::AppResult;
use eventsync_core::traits::SearchIndex;
use eventsync_core::types::IndexDocument;

use super::document::{ids_from_response, to_solr};

/// Search index backed by a Solr core.
///
/// Upserts and removals go through the JSON update handler without an
/// implicit commit; [`SearchIndex::commit`] issues an explicit hard commit.
#[derive(Debug, Clone)]
pub struct SolrSearchIndex {
    client: Client,
    core_url: String,
    page_size: usize,
}

impl SolrSearchIndex {
    /// Build a client for the configured core.
    pub fn new(config: &SolrConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(|e| AppError::with_source(ErrorKind::Configuration, "Failed to build Solr client", e))?;

        let core_url = format!("{}/{}", config.url.trim_end_matches('/'), config.core);
        info!(url = %core_url, "Using Solr search index");

        Ok(Self {
            client,
            core_url,
            page_size: config.page_size.max(1),
        })
    }

    fn url(&self, path: &str, params: &[(&str, &str)]) -> AppResult<Url> {
        Url::parse_with_params(&format!("{}/{path}", self.core_url), params)
            .map_err(|e| AppError::with_source(ErrorKind::Configuration, "Invalid Solr URL", e))
    }

    async fn post_update(&self, body: Value, params: &[(&str, &str)]) -> AppResult<()> {
        let url = self.url("update", params)?;
        let response = self
            .client
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(request_error)?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(AppError::search(format!(
                "Solr update failed with {status}: {detail}"
            )));
        }
        Ok(())
    }

    async fn select(&self, params: &[(&str, &str)]) -> AppResult<Value> {
        let url = self.url("select", params)?;
        let response = self.client.get(url).send().await.map_err(request_error)?;

        if !response.status().is_success() {
            return Err(AppError::search(format!(
                "Solr select failed with {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Search, "Malformed Solr response", e))
    }
}

fn request_error(e: reqwest::Error) -> AppError {
    let kind = if e.is_timeout() || e.is_connect() {
        ErrorKind::ServiceUnavailable
    } else {
        ErrorKind::Search
    };
    AppError::with_source(kind, format!("Solr request failed: {e}"), e)
}

#[async_trait]
impl SearchIndex for SolrSearchIndex {
    fn backend(&self) -> &str {
        "solr"
    }

    async fn upsert(&self, document: IndexDocument) -> AppResult<()> {
        debug!(doc_id = %document.id, "Solr upsert");
        self.post_update(json!([to_solr(&document)]), &[]).await
    }

    async fn remove(&self, id: &str) -> AppResult<()> {
        debug!(doc_id = %id, "Solr remove");
        self.post_update(json!({ "delete": { "id": id } }), &[]).await
    }

    async fn commit(&self) -> AppResult<()> {
        self.post_update(json!({ "commit": {} }), &[]).await
    }

    async fn query(&self, query: &str, limit: usize) -> AppResult<Vec<String>> {
        let q = if query.trim().is_empty() { "*:*" } else { query };
        let rows = limit.to_string();
        let body = self
            .select(&[
                ("q", q),
                ("df", "_text_"),
                ("fl", "id"),
                ("rows", &rows),
                ("wt", "json"),
            ])
            .await?;
        Ok(ids_from_response(&body))
    }

    async fn list_ids(&self) -> AppResult<Vec<String>> {
        let rows = self.page_size.to_string();
        let mut ids = Vec::new();
        let mut cursor = "*".to_string();

        loop {
            let body = self
                .select(&[
                    ("q", "*:*"),
                    ("fl", "id"),
                    ("rows", &rows),
                    ("sort", "id asc"),
                    ("cursorMark", &cursor),
                    ("wt", "json"),
                ])
                .await?;
            ids.extend(ids_from_response(&body));

            let next = body
                .get("nextCursorMark")
                .and_then(Value::as_str)
                .map(str::to_string);
            match next {
                Some(next) if next != cursor => cursor = next,
                _ => break,
            }
        }

        Ok(ids)
    }

    async fn health_check(&self) -> AppResult<bool> {
        let url = self.url("admin/ping", &[("wt", "json")])?;
        let response = self.client.get(url).send().await.map_err(request_error)?;
        Ok(response.status().is_success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_url_and_params() {
        let index = SolrSearchIndex::new(&SolrConfig {
            url: "http://solr:8983/solr/".into(),
            core: "events".into(),
            ..SolrConfig::default()
        })
        .unwrap();

        let url = index.url("select", &[("q", "hello world"), ("rows", "5")]).unwrap();
        assert_eq!(
            url.as_str(),
            "http://solr:8983/solr/events/select?q=hello+world&rows=5"
        );
    }

    #[tokio::test]
    async fn test_unreachable_server_is_service_unavailable() {
        let index = SolrSearchIndex::new(&SolrConfig {
            url: "http://127.0.0.1:9".into(),
            request_timeout_ms: 500,
            ..SolrConfig::default()
        })
        .unwrap();

        let err = index.commit().await.unwrap_err();
        assert!(err.kind.is_transient());
    }
}
