//! HTTP client for the results search endpoint

use crate::config::FeedConfig;
use crate::error::FeedError;
use crate::feed::{decode_entries, DrawFeed, RawDrawEntry};
use anyhow::Context;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, REFERER, USER_AGENT};
use std::time::Duration;
use tracing::{debug, warn};

/// Client for the public draw search service
pub struct HttpFeedClient {
    client: reqwest::Client,
    base_url: String,
    game_id: String,
}

impl HttpFeedClient {
    pub fn new(config: &FeedConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(default_headers(config))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            game_id: config.game_id.clone(),
        })
    }

    /// Query parameters for one calendar year
    pub fn year_query(&self, year: i32) -> Vec<(&'static str, String)> {
        vec![
            ("game_id", self.game_id.clone()),
            ("celebrados", "true".to_string()),
            ("fechaInicioInclusiva", format!("{:04}0101", year)),
            ("fechaFinInclusiva", format!("{:04}1231", year)),
        ]
    }
}

/// The endpoint only answers requests that look like they come from its own site
fn default_headers(config: &FeedConfig) -> HeaderMap {
    let mut headers = HeaderMap::new();
    if let Ok(value) = HeaderValue::from_str(&config.user_agent) {
        headers.insert(USER_AGENT, value);
    }
    if let Ok(value) = HeaderValue::from_str(&config.referer) {
        headers.insert(REFERER, value);
    }
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("application/json, text/plain, */*"),
    );
    headers.insert("sec-fetch-dest", HeaderValue::from_static("empty"));
    headers.insert("sec-fetch-mode", HeaderValue::from_static("cors"));
    headers.insert("sec-fetch-site", HeaderValue::from_static("same-origin"));
    headers.insert("x-requested-with", HeaderValue::from_static("XMLHttpRequest"));
    headers
}

#[async_trait]
impl DrawFeed for HttpFeedClient {
    fn name(&self) -> &'static str {
        "loterias-buscador"
    }

    async fn fetch_year(&self, year: i32) -> Result<Vec<RawDrawEntry>, FeedError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&self.year_query(year))
            .send()
            .await
            .map_err(|source| FeedError::Http { year, source })?;

        let status = response.status();
        if !status.is_success() {
            warn!(year, status = status.as_u16(), "Draw feed returned an error status");
            return Err(FeedError::Status {
                year,
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| FeedError::Http { year, source })?;

        let entries = decode_entries(year, &body)?;
        debug!(year, entries = entries.len(), "Fetched draw entries");
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_year_query_spans_whole_year() {
        let client = HttpFeedClient::new(&FeedConfig::default()).unwrap();
        let query = client.year_query(1985);

        assert!(query.contains(&("game_id", "LAPR".to_string())));
        assert!(query.contains(&("celebrados", "true".to_string())));
        assert!(query.contains(&("fechaInicioInclusiva", "19850101".to_string())));
        assert!(query.contains(&("fechaFinInclusiva", "19851231".to_string())));
    }

    #[test]
    fn test_client_builds_with_configured_timeout() {
        let config = FeedConfig {
            timeout_secs: 3,
            ..FeedConfig::default()
        };
        assert!(HttpFeedClient::new(&config).is_ok());
    }

    #[test]
    fn test_default_headers_include_browser_hints() {
        let headers = default_headers(&FeedConfig::default());
        assert!(headers.contains_key(USER_AGENT));
        assert!(headers.contains_key(REFERER));
        assert_eq!(
            headers.get("x-requested-with").unwrap(),
            "XMLHttpRequest"
        );
    }
}
