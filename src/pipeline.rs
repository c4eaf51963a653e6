//! Search pipeline: paginated fetch, per-item normalization, local sort.
//!
//! Pages are fetched strictly one after another. Failures are contained to
//! the smallest scope: a bad item is skipped, a failing page ends
//! pagination, and whatever was collected so far is always returned.

use crate::error::{LitSearchError, Result};
use crate::model::{PublicationRecord, SearchRequest};
use crate::normalize::normalize_item;
use crate::observer::{NoopObserver, SearchObserver};
use crate::openalex::{OpenAlexClient, OPENALEX_API_BASE, POLITE_EMAIL, REQUEST_TIMEOUT};
use crate::query::ProviderQuery;
use crate::sort::apply_local_sort;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Pause between successive page requests
pub const PAGE_DELAY: Duration = Duration::from_millis(500);

/// Pipeline settings
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Provider base URL (without `/works`)
    pub base_url: String,
    /// Contact address sent per API etiquette
    pub mailto: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Delay between page requests
    pub page_delay: Duration,
    /// Smaller pages plus request URL and error body logging
    pub debug: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            base_url: OPENALEX_API_BASE.to_string(),
            mailto: POLITE_EMAIL.to_string(),
            timeout: REQUEST_TIMEOUT,
            page_delay: PAGE_DELAY,
            debug: false,
        }
    }
}

/// Why pagination ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StopReason {
    /// Requested maximum collected
    MaxResults,
    /// Provider returned an empty page
    NoMoreItems,
    /// Reported page count exhausted
    LastPage,
    /// Non-success status, also after the simplified retry
    ProviderError { status: u16 },
    /// Connection failure or timeout
    Transport { message: String },
    /// Body was not a works page
    MalformedResponse { message: String },
}

impl StopReason {
    /// Whether pagination ended on an error rather than running out of work
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            StopReason::ProviderError { .. }
                | StopReason::Transport { .. }
                | StopReason::MalformedResponse { .. }
        )
    }
}

/// Result of one pipeline run
#[derive(Debug, Clone, Serialize)]
pub struct SearchOutcome {
    /// Normalized, sorted records; never more than `max_results`
    pub records: Vec<PublicationRecord>,
    pub stop: StopReason,
    pub pages_fetched: u32,
    /// Items dropped during normalization
    pub skipped: usize,
}

/// Fetch-normalize-sort pipeline bound to one provider endpoint
pub struct Pipeline {
    client: OpenAlexClient,
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Result<Self> {
        let client = OpenAlexClient::new(&config.base_url, &config.mailto, config.timeout, config.debug)?;
        Ok(Self { client, config })
    }

    /// Run a search.
    ///
    /// Returns `Err` only for an invalid request. Provider and transport
    /// failures end pagination and are reported in [`SearchOutcome::stop`].
    pub async fn run(
        &self,
        request: &SearchRequest,
        observer: &dyn SearchObserver,
    ) -> Result<SearchOutcome> {
        request.validate()?;

        let query = ProviderQuery::build(request, &self.config.mailto, self.config.debug);
        let max_results = request.max_results;

        info!(
            keywords = %request.keywords,
            filter = ?query.filter,
            sort = ?query.sort,
            max_results = max_results,
            "Starting OpenAlex search"
        );
        observer.on_status("Search running...");

        let mut records: Vec<PublicationRecord> = Vec::new();
        let mut skipped = 0usize;
        let mut pages_fetched = 0u32;
        let mut page: u32 = 1;
        let mut total_pages: u64 = 1;

        let stop = loop {
            if records.len() >= max_results {
                break StopReason::MaxResults;
            }
            if u64::from(page) > total_pages {
                break StopReason::LastPage;
            }

            if page > 1 && !self.config.page_delay.is_zero() {
                tokio::time::sleep(self.config.page_delay).await;
            }

            observer.on_status(&format!("Loading page {} of estimated {}...", page, total_pages));
            debug!(page = page, total_pages = total_pages, "Fetching OpenAlex page");

            let works = match self.client.fetch_page(&query, page, observer).await {
                Ok(works) => works,
                Err(LitSearchError::Api { code, message }) => {
                    error!(page = page, status = code, message = %message, "Provider error, stopping");
                    observer.on_error(&format!("API error: Status {}", code));
                    break StopReason::ProviderError { status: code };
                }
                Err(LitSearchError::Network(e)) => {
                    error!(page = page, error = %e, "Network error, stopping");
                    observer.on_error(&format!("Network error on page {}: {}", page, e));
                    break StopReason::Transport {
                        message: e.to_string(),
                    };
                }
                Err(e) => {
                    error!(page = page, error = %e, "Unreadable response, stopping");
                    observer.on_error(&format!("Invalid response on page {}: {}", page, e));
                    break StopReason::MalformedResponse {
                        message: e.to_string(),
                    };
                }
            };

            pages_fetched += 1;
            total_pages = works.total_pages(query.per_page);

            let items = works.into_items();
            if items.is_empty() {
                break StopReason::NoMoreItems;
            }

            let received = items.len();
            for item in items {
                if records.len() >= max_results {
                    break;
                }
                match normalize_item(item) {
                    Ok(record) => {
                        records.push(record);
                        observer.on_progress((records.len() as f64 / max_results as f64).min(1.0));
                    }
                    Err(reason) if reason.is_warning() => {
                        skipped += 1;
                        warn!(page = page, reason = %reason, "Skipping item");
                        observer.on_warning(&reason.to_string());
                    }
                    Err(reason) => {
                        skipped += 1;
                        debug!(page = page, reason = %reason, "Skipping item");
                    }
                }
            }

            info!(
                page = page,
                received = received,
                collected = records.len(),
                total_pages = total_pages,
                "Processed OpenAlex page"
            );
            page += 1;
        };

        apply_local_sort(&mut records, &request.sort);

        if records.is_empty() {
            observer.on_status("No results found.");
        } else {
            observer.on_status(&format!(
                "Processing complete: {} publications found!",
                records.len()
            ));
        }
        info!(total = records.len(), skipped = skipped, stop = ?stop, "OpenAlex search complete");

        Ok(SearchOutcome {
            records,
            stop,
            pages_fetched,
            skipped,
        })
    }
}

/// Run `request` with `config` and no observer.
pub async fn search(request: &SearchRequest, config: PipelineConfig) -> Result<SearchOutcome> {
    Pipeline::new(config)?.run(request, &NoopObserver).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stop_reason_failure() {
        assert!(!StopReason::MaxResults.is_failure());
        assert!(!StopReason::LastPage.is_failure());
        assert!(StopReason::ProviderError { status: 500 }.is_failure());
        assert!(StopReason::Transport {
            message: "timeout".into()
        }
        .is_failure());
    }

    #[test]
    fn test_stop_reason_json() -> Result<()> {
        let json = serde_json::to_value(StopReason::ProviderError { status: 429 })?;
        assert_eq!(json, serde_json::json!({"kind": "provider_error", "status": 429}));
        Ok(())
    }

    #[tokio::test]
    async fn test_invalid_request_is_rejected_before_fetch() {
        let result = search(&SearchRequest::new(""), PipelineConfig::default()).await;
        assert!(matches!(result, Err(LitSearchError::Validation(_))));
    }
}
