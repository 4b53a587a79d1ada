//! Problem list and problem detail client
//!
//! Both lookups go through the response cache: a fresh cached response is
//! returned without touching the network, anything else is fetched from the
//! platform API and stored only when the fetch succeeds.

use futures::future::join_all;
use reqwest::Client;
use serde_json::Value;
use tracing::{info, warn};

use super::{endpoint, send_json, with_bearer, ApiError, ProblemDetail, ProblemPage, Session};
use crate::cache::{Collection, ResponseCache};

/// Cache key for one page of the problem list
///
/// The same page and page size always map to the same key.
pub fn list_cache_key(page: u32, page_size: u32) -> String {
    format!("problems-page-{}-size-{}", page, page_size)
}

/// Client for fetching problems from the platform API
#[derive(Debug, Clone)]
pub struct ProblemsClient {
    /// HTTP client for making requests
    http_client: Client,
    /// Cache shared with every other holder of the same store
    cache: ResponseCache,
    /// Base URL of the platform API
    base_url: String,
}

impl ProblemsClient {
    /// Creates a new ProblemsClient
    pub fn new(http_client: Client, base_url: impl Into<String>, cache: ResponseCache) -> Self {
        Self {
            http_client,
            cache,
            base_url: base_url.into(),
        }
    }

    /// Returns one page of the problem list
    ///
    /// # Arguments
    /// * `page` - 1-based page number
    /// * `page_size` - Number of problems per page
    ///
    /// # Returns
    /// * `Some(ProblemPage)` - From a fresh cache entry or a successful fetch
    /// * `None` - If the fetch failed for any reason (transport, status, or body)
    pub async fn get_list(&self, page: u32, page_size: u32) -> Option<ProblemPage> {
        if page == 0 || page_size == 0 {
            warn!(page, page_size, "page and page size must be positive");
            return None;
        }

        let key = list_cache_key(page, page_size);
        self.cache
            .get_or_fetch(Collection::ProblemList, &key, || self.fetch_list(page, page_size))
            .await
    }

    /// Returns the full record of one problem
    ///
    /// The session's token, when present, is sent as a bearer credential; a
    /// session without a token fetches anonymously.
    pub async fn get_detail(&self, slug: &str, session: &Session) -> Option<ProblemDetail> {
        if slug.is_empty() {
            warn!("problem slug must not be empty");
            return None;
        }

        self.cache
            .get_or_fetch(Collection::ProblemDetail, slug, || self.fetch_detail(slug, session))
            .await
    }

    /// Loads a list page and warms the detail cache for every problem on it
    ///
    /// Detail lookups run concurrently. Returns the page together with the
    /// number of details that are now available, or `None` if the page
    /// itself could not be loaded.
    pub async fn prefetch(&self, page: u32, page_size: u32, session: &Session) -> Option<(ProblemPage, usize)> {
        let listing = self.get_list(page, page_size).await?;

        let details = join_all(
            listing
                .results
                .iter()
                .map(|problem| self.get_detail(&problem.slug, session)),
        )
        .await;
        let loaded = details.iter().filter(|detail| detail.is_some()).count();

        info!(page, page_size, loaded, total = listing.results.len(), "prefetched problem details");
        Some((listing, loaded))
    }

    /// Fetches a list page directly from the API, as the raw response body
    async fn fetch_list(&self, page: u32, page_size: u32) -> Result<Value, ApiError> {
        let url = endpoint(&self.base_url, &["api", "problems", ""])?;
        let request = self
            .http_client
            .get(url)
            .query(&[("page", page), ("page_size", page_size)]);

        send_json(request).await
    }

    /// Fetches a problem record directly from the API, as the raw response body
    async fn fetch_detail(&self, slug: &str, session: &Session) -> Result<Value, ApiError> {
        let url = endpoint(&self.base_url, &["api", "problems", slug])?;
        let request = with_bearer(self.http_client.get(url), session);

        send_json(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_cache_key_is_deterministic() {
        assert_eq!(list_cache_key(2, 20), list_cache_key(2, 20));
        assert_eq!(list_cache_key(2, 20), "problems-page-2-size-20");
    }

    #[test]
    fn test_list_cache_key_distinguishes_pages_and_sizes() {
        assert_ne!(list_cache_key(2, 20), list_cache_key(3, 20));
        assert_ne!(list_cache_key(2, 20), list_cache_key(2, 10));
        assert_ne!(list_cache_key(1, 23), list_cache_key(12, 3));
    }

    #[test]
    fn test_endpoint_joins_without_double_slash() {
        assert_eq!(
            endpoint("http://api.test/", &["api", "problems", "two-sum"]).unwrap().as_str(),
            "http://api.test/api/problems/two-sum"
        );
        assert_eq!(
            endpoint("http://api.test", &["api", "problems", ""]).unwrap().as_str(),
            "http://api.test/api/problems/"
        );
    }
}
