//! Fetch contract: status-carrying HTTP failures, string coercion, and NaN
//! pass-through for non-numeric fields.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use proptest::prelude::*;
use tvl_fetch::{
    FailureKind, HttpClient, HttpError, HttpRequest, HttpResponse, MetricsFetcher, TreasuryApi,
};

struct CannedHttpClient {
    response: Result<HttpResponse, HttpError>,
}

impl HttpClient for CannedHttpClient {
    fn execute<'a>(
        &'a self,
        _request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        let response = self.response.clone();
        Box::pin(async move { response })
    }
}

fn api_returning(response: Result<HttpResponse, HttpError>) -> TreasuryApi {
    TreasuryApi::with_http_client(
        Arc::new(CannedHttpClient { response }),
        "https://metrics.example.test",
    )
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("runtime")
}

#[tokio::test]
async fn string_fields_coerce_to_numbers() {
    let api = api_returning(Ok(HttpResponse::ok_json(r#"{"tvl": "1234", "apy": "5.6"}"#)));
    let metrics = api.fetch().await.expect("2xx resolves");
    assert_eq!(metrics.tvl, 1234.0);
    assert_eq!(metrics.apy, 5.6);
}

#[tokio::test]
async fn non_numeric_field_resolves_to_nan() {
    let api = api_returning(Ok(HttpResponse::ok_json(r#"{"tvl": "abc", "apy": 3}"#)));
    let metrics = api.fetch().await.expect("coercion never fails");
    assert!(metrics.tvl.is_nan());
    assert_eq!(metrics.apy, 3.0);

    // Same input, same outcome.
    let again = api.fetch().await.expect("coercion never fails");
    assert!(again.tvl.is_nan());
}

#[tokio::test]
async fn not_found_carries_status_and_reason() {
    let api = api_returning(Ok(HttpResponse::new(404, "missing")));
    let failure = api.fetch().await.expect_err("non-2xx fails");
    assert_eq!(failure.status, Some(404));
    assert_eq!(failure.message, "Failed to fetch treasury metrics: Not Found");
    assert_eq!(failure.kind(), FailureKind::Http);
}

#[tokio::test]
async fn network_failure_has_no_status() {
    let api = api_returning(Err(HttpError::new("connection failed: refused")));
    let failure = api.fetch().await.expect_err("transport fails");
    assert_eq!(failure.status, None);
    assert_eq!(failure.message, "connection failed: refused");
    assert_eq!(failure.kind(), FailureKind::Transport);
}

#[tokio::test]
async fn malformed_body_is_decode_failure_without_status() {
    let api = api_returning(Ok(HttpResponse::ok_json("<html>oops</html>")));
    let failure = api.fetch().await.expect_err("malformed body fails");
    assert_eq!(failure.status, None);
    assert_eq!(failure.kind(), FailureKind::Decode);
    assert!(!failure.message.is_empty());
}

#[tokio::test]
async fn error_body_is_ignored_for_non_2xx() {
    let api = api_returning(Ok(HttpResponse::new(500, r#"{"tvl": 1, "apy": 1}"#)));
    let failure = api.fetch().await.expect_err("500 fails despite parseable body");
    assert_eq!(failure.status, Some(500));
}

proptest! {
    #[test]
    fn every_non_2xx_status_fails_with_that_status(
        status in (100_u16..1000).prop_filter("outside 2xx", |s| !(200..300).contains(s))
    ) {
        let api = api_returning(Ok(HttpResponse::new(status, "")));
        let failure = runtime().block_on(api.fetch()).expect_err("non-2xx fails");
        prop_assert_eq!(failure.status, Some(status));
        prop_assert!(!failure.message.is_empty());
    }

    #[test]
    fn every_2xx_status_resolves(status in 200_u16..300) {
        let api = api_returning(Ok(HttpResponse::new(status, r#"{"tvl": "1234", "apy": "5.6"}"#)));
        let metrics = runtime().block_on(api.fetch()).expect("2xx resolves");
        prop_assert_eq!(metrics.tvl, 1234.0);
        prop_assert_eq!(metrics.apy, 5.6);
    }
}
