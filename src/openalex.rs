//! OpenAlex API Client
//!
//! Fetches single pages of `/works` results. Pagination, accumulation and
//! stop conditions live in [`crate::pipeline`].
//!
//! API Best Practices (per OpenAlex docs):
//! - Use `mailto:email` parameter for polite pool access
//! - Identify the client in the User-Agent as well

use crate::error::{LitSearchError, Result};
use crate::observer::SearchObserver;
use crate::query::ProviderQuery;
use reqwest::header::ACCEPT;
use reqwest::{Client, Response};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// OpenAlex API base URL
pub const OPENALEX_API_BASE: &str = "https://api.openalex.org";

/// Email for polite pool access
pub const POLITE_EMAIL: &str = "rustlitsearch@example.com";

/// Per-request timeout
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// One page of `/works` results. Items stay raw JSON so a malformed item
/// can be skipped on its own.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct WorksPage {
    pub meta: Option<PageMeta>,
    pub results: Option<Vec<serde_json::Value>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PageMeta {
    pub count: Option<u64>,
    pub per_page: Option<u32>,
}

impl WorksPage {
    /// Total pages reported by this response, ceil(count / per_page).
    ///
    /// `requested_per_page` stands in when the provider omits its page size.
    pub fn total_pages(&self, requested_per_page: u32) -> u64 {
        let meta = self.meta.as_ref();
        let count = meta.and_then(|m| m.count).unwrap_or(0);
        let per_page = meta
            .and_then(|m| m.per_page)
            .filter(|p| *p > 0)
            .unwrap_or(requested_per_page)
            .max(1) as u64;
        count.div_ceil(per_page)
    }

    pub fn into_items(self) -> Vec<serde_json::Value> {
        self.results.unwrap_or_default()
    }
}

/// HTTP client for the OpenAlex `/works` endpoint
pub struct OpenAlexClient {
    client: Client,
    works_url: Url,
    debug: bool,
}

impl OpenAlexClient {
    /// Create a client against `base_url` identifying itself with `mailto`
    pub fn new(base_url: &str, mailto: &str, timeout: Duration, debug: bool) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(format!("rustlitsearch/{} (mailto:{})", env!("CARGO_PKG_VERSION"), mailto))
            .build()
            .map_err(|e| LitSearchError::Config(format!("Failed to build HTTP client: {}", e)))?;

        let base = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{}/", base_url)
        };
        let works_url = Url::parse(&base)
            .and_then(|u| u.join("works"))
            .map_err(|e| LitSearchError::Config(format!("Invalid base URL {}: {}", base_url, e)))?;

        Ok(Self {
            client,
            works_url,
            debug,
        })
    }

    /// Endpoint this client queries
    pub fn works_url(&self) -> &Url {
        &self.works_url
    }

    /// Fetch one page.
    ///
    /// A non-success status is retried once with the minimal parameter set.
    /// Returns `Api` when the retry fails too, `Network` on transport
    /// failure and `Parse` when the body is not a works page.
    pub async fn fetch_page(
        &self,
        query: &ProviderQuery,
        page: u32,
        observer: &dyn SearchObserver,
    ) -> Result<WorksPage> {
        let mut response = self.send(&query.page_params(page)).await?;

        if !response.status().is_success() {
            let status = response.status();
            self.log_failure(response).await;
            warn!(page = page, status = status.as_u16(), "Request failed, retrying with minimal parameters");
            observer.on_warning(&format!(
                "Request for page {} failed. Trying simplified request...",
                page
            ));

            response = self.send(&query.minimal_params()).await?;

            if !response.status().is_success() {
                let status = response.status();
                self.log_failure(response).await;
                return Err(LitSearchError::Api {
                    code: status.as_u16(),
                    message: format!("OpenAlex API error: {}", status),
                });
            }
            info!(page = page, "Simplified request succeeded");
        }

        let body = response.text().await?;
        serde_json::from_str::<WorksPage>(&body)
            .map_err(|e| LitSearchError::Parse(format!("Failed to parse OpenAlex response: {}", e)))
    }

    async fn send(&self, params: &[(&'static str, String)]) -> Result<Response> {
        let mut url = self.works_url.clone();
        url.query_pairs_mut()
            .extend_pairs(params.iter().map(|(k, v)| (*k, v.as_str())));

        if self.debug {
            debug!(url = %url, "OpenAlex request");
        }

        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await?;
        Ok(response)
    }

    async fn log_failure(&self, response: Response) {
        if self.debug {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            debug!(status = status.as_u16(), body = %body, "OpenAlex error response");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages() -> Result<()> {
        let page: WorksPage =
            serde_json::from_str(r#"{"meta": {"count": 55, "per_page": 10}, "results": []}"#)?;
        assert_eq!(page.total_pages(100), 6);

        let no_per_page: WorksPage = serde_json::from_str(r#"{"meta": {"count": 250}}"#)?;
        assert_eq!(no_per_page.total_pages(100), 3);

        let zero_per_page: WorksPage =
            serde_json::from_str(r#"{"meta": {"count": 5, "per_page": 0}}"#)?;
        assert_eq!(zero_per_page.total_pages(20), 1);

        let empty: WorksPage = serde_json::from_str("{}")?;
        assert_eq!(empty.total_pages(100), 0);
        assert!(empty.into_items().is_empty());
        Ok(())
    }

    #[test]
    fn test_works_url() -> Result<()> {
        let client = OpenAlexClient::new("http://localhost:8080", POLITE_EMAIL, REQUEST_TIMEOUT, false)?;
        assert_eq!(client.works_url().as_str(), "http://localhost:8080/works");

        let nested = OpenAlexClient::new("http://proxy/openalex/", POLITE_EMAIL, REQUEST_TIMEOUT, false)?;
        assert_eq!(nested.works_url().as_str(), "http://proxy/openalex/works");

        assert!(OpenAlexClient::new("not a url", POLITE_EMAIL, REQUEST_TIMEOUT, false).is_err());
        Ok(())
    }
}
