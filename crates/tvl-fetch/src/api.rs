use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tracing::debug;

use crate::error::FetchFailure;
use crate::http_client::{HttpClient, HttpRequest, ReqwestHttpClient};
use crate::metrics::TreasuryMetrics;

/// Production metrics host.
pub const DEFAULT_BASE_URL: &str = "https://mint.meghamgarg.com";

/// Path of the treasury metrics resource.
pub const METRICS_PATH: &str = "/metrics/treasury";

/// Boxed future returned by [`MetricsFetcher::fetch`].
pub type FetchFuture<'a> =
    Pin<Box<dyn Future<Output = Result<TreasuryMetrics, FetchFailure>> + Send + 'a>>;

/// Source of treasury metrics.
///
/// Each call makes exactly one attempt: no retries, no timeout, no caching.
pub trait MetricsFetcher: Send + Sync {
    fn fetch(&self) -> FetchFuture<'_>;
}

/// Fetcher backed by the treasury HTTP API.
#[derive(Clone)]
pub struct TreasuryApi {
    http_client: Arc<dyn HttpClient>,
    endpoint: String,
}

impl std::fmt::Debug for TreasuryApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TreasuryApi")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl TreasuryApi {
    /// Fetcher for the production host using reqwest.
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Fetcher for `base_url` using reqwest.
    pub fn with_base_url(base_url: &str) -> Self {
        Self::with_http_client(Arc::new(ReqwestHttpClient::default()), base_url)
    }

    /// Fetcher with an explicit transport.
    pub fn with_http_client(http_client: Arc<dyn HttpClient>, base_url: &str) -> Self {
        Self {
            http_client,
            endpoint: format!("{}{METRICS_PATH}", base_url.trim_end_matches('/')),
        }
    }

    /// Full metrics URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn fetch_metrics(&self) -> Result<TreasuryMetrics, FetchFailure> {
        let request =
            HttpRequest::get(self.endpoint.as_str()).with_header("accept", "application/json");
        debug!(url = %self.endpoint, "fetching treasury metrics");

        let response = self.http_client.execute(request).await?;
        debug!(status = response.status, bytes = response.body.len(), "metrics response");

        if !response.is_success() {
            return Err(FetchFailure::http(response.status));
        }
        TreasuryMetrics::from_body(&response.body)
    }
}

impl Default for TreasuryApi {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsFetcher for TreasuryApi {
    fn fetch(&self) -> FetchFuture<'_> {
        Box::pin(self.fetch_metrics())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http_client::{HttpResponse, StubHttpClient};

    #[test]
    fn endpoint_joins_base_and_path() {
        let api = TreasuryApi::with_base_url("https://mint.meghamgarg.com/");
        assert_eq!(api.endpoint(), "https://mint.meghamgarg.com/metrics/treasury");
        assert_eq!(
            TreasuryApi::new().endpoint(),
            "https://mint.meghamgarg.com/metrics/treasury"
        );
    }

    #[tokio::test]
    async fn fetch_issues_one_get_with_json_accept() {
        let client = Arc::new(StubHttpClient::responding(HttpResponse::ok_json(
            r#"{"tvl": 1, "apy": 2}"#,
        )));
        let api = TreasuryApi::with_http_client(client.clone(), "http://localhost:8080");

        let metrics = api.fetch().await.expect("2xx");
        assert_eq!(metrics, TreasuryMetrics::new(1.0, 2.0));

        let requests = client.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].url, "http://localhost:8080/metrics/treasury");
        assert_eq!(
            requests[0].headers.get("accept").map(String::as_str),
            Some("application/json")
        );
        assert_eq!(requests[0].timeout, None);
    }
}
