#![forbid(unsafe_code)]

//! Treasury metrics fetcher.
//!
//! [`TreasuryApi`] performs one GET against the metrics endpoint, coerces the
//! untyped response fields to numbers, and normalizes every failure into a
//! [`FetchFailure`]. The transport is abstracted behind [`HttpClient`] so the
//! fetch contract can be exercised without a network.

pub mod api;
pub mod coerce;
pub mod error;
pub mod http_client;
pub mod metrics;

pub use api::{DEFAULT_BASE_URL, FetchFuture, METRICS_PATH, MetricsFetcher, TreasuryApi};
pub use error::{FailureKind, FetchFailure};
pub use http_client::{HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient};
pub use metrics::TreasuryMetrics;

#[cfg(feature = "test-helpers")]
pub use http_client::StubHttpClient;
