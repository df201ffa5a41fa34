//! Google Custom Search JSON API

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use super::{GroundingError, SearchProvider, SearchResult, check_http_response};
use crate::config::SearchConfig;

/// Custom Search 单次请求最多返回10条
const MAX_RESULTS_PER_REQUEST: usize = 10;

pub struct GoogleSearchProvider {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    engine_id: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    snippet: String,
}

impl GoogleSearchProvider {
    pub fn new(config: &SearchConfig) -> Result<Self, GroundingError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;
        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            engine_id: config.engine_id.clone(),
        })
    }
}

#[async_trait]
impl SearchProvider for GoogleSearchProvider {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>, GroundingError> {
        if limit == 0 || query.trim().is_empty() {
            return Ok(Vec::new());
        }
        let num = limit.min(MAX_RESULTS_PER_REQUEST).to_string();

        let response = self
            .http
            .get(&self.endpoint)
            .query(&[
                ("key", self.api_key.as_str()),
                ("cx", self.engine_id.as_str()),
                ("q", query),
                ("num", num.as_str()),
            ])
            .send()
            .await?;
        let body = check_http_response(response).await?;

        let parsed: SearchResponse =
            serde_json::from_str(&body).map_err(|e| GroundingError::Parse(e.to_string()))?;

        Ok(parsed
            .items
            .into_iter()
            .filter(|item| !item.link.is_empty())
            .take(limit)
            .map(|item| SearchResult {
                title: item.title,
                link: item.link,
                snippet: item.snippet.split_whitespace().collect::<Vec<_>>().join(" "),
            })
            .collect())
    }
}
