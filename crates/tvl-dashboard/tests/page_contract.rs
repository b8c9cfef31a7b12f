//! End-to-end behavior of the treasury page under the simulator.
//!
//! The page runs against the real `TreasuryApi` over an in-memory transport,
//! so these tests cover the path from HTTP response to rendered frame.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::runtime::Runtime;
use tvl_core::event::{Event, KeyCode, KeyEvent};
use tvl_dashboard::page::{FALLBACK_TEXT, FRAME_INTERVAL, PAGE_TITLE};
use tvl_dashboard::{FetchStatus, MemorySink, TreasuryCounter, TreasuryPage};
use tvl_fetch::{
    FetchFuture, HttpError, HttpResponse, MetricsFetcher, StubHttpClient, TreasuryApi,
};
use tvl_runtime::{CmdRecord, ProgramSimulator};

const BASE_URL: &str = "http://metrics.test";

fn runtime() -> Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("runtime")
}

/// Wraps a fetcher and counts calls.
struct Counting {
    inner: TreasuryApi,
    calls: AtomicUsize,
}

impl MetricsFetcher for Counting {
    fn fetch(&self) -> FetchFuture<'_> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.fetch()
    }
}

struct Harness {
    sim: ProgramSimulator<TreasuryPage>,
    fetcher: Arc<Counting>,
    transport: Arc<StubHttpClient>,
    sink: MemorySink,
    _runtime: Runtime,
}

fn harness(transport: StubHttpClient) -> Harness {
    let runtime = runtime();
    let transport = Arc::new(transport);
    let fetcher = Arc::new(Counting {
        inner: TreasuryApi::with_http_client(transport.clone(), BASE_URL),
        calls: AtomicUsize::new(0),
    });
    let sink = MemorySink::new();
    let counter = TreasuryCounter::new(
        fetcher.clone(),
        runtime.handle().clone(),
        Arc::new(sink.clone()),
    );
    let page = TreasuryPage::new(counter, Arc::new(sink.clone()));
    Harness {
        sim: ProgramSimulator::new(page),
        fetcher,
        transport,
        sink,
        _runtime: runtime,
    }
}

fn ok(body: &str) -> StubHttpClient {
    StubHttpClient::responding(HttpResponse::ok_json(body))
}

fn settle(sim: &mut ProgramSimulator<TreasuryPage>) {
    sim.advance(Duration::from_secs(3), FRAME_INTERVAL);
}

#[test]
fn successful_fetch_renders_formatted_metrics() {
    let mut h = harness(ok(r#"{"tvl": "1234", "apy": "5.6"}"#));
    h.sim.init();
    settle(&mut h.sim);

    let counter = h.sim.model().counter();
    assert_eq!(
        counter.history(),
        &[FetchStatus::Idle, FetchStatus::Loading, FetchStatus::Success]
    );
    let metrics = counter.metrics().expect("metrics");
    assert_eq!((metrics.tvl, metrics.apy), (1234.0, 5.6));

    let text = h.sim.capture_frame(80, 6).to_text();
    assert!(text.contains(PAGE_TITLE), "frame:\n{text}");
    assert!(text.contains("Total Value Locked"), "frame:\n{text}");
    assert!(text.contains("Annual Percentage Yield"), "frame:\n{text}");
    assert!(text.contains("$1,234"), "frame:\n{text}");
    assert!(text.contains("5.6 %"), "frame:\n{text}");
    assert!(h.sink.is_empty());
    assert_eq!(h.transport.requests()[0].url, "http://metrics.test/metrics/treasury");
}

#[test]
fn first_frames_animate_up_from_zero() {
    let mut h = harness(ok(r#"{"tvl": 1000000, "apy": 12.5}"#));
    h.sim.init();

    let text = h.sim.capture_frame(80, 6).to_text();
    assert!(text.contains("$0"), "frame:\n{text}");
    assert!(text.contains("0.0 %"), "frame:\n{text}");

    h.sim.tick(FRAME_INTERVAL);
    h.sim.tick(FRAME_INTERVAL);
    let (tvl, _) = h.sim.model().counter().displayed_values();
    assert!(tvl > 0.0 && tvl < 1_000_000.0);

    settle(&mut h.sim);
    let text = h.sim.capture_frame(80, 6).to_text();
    assert!(text.contains("$1,000,000"), "frame:\n{text}");
    assert!(text.contains("12.5 %"), "frame:\n{text}");
}

#[test]
fn http_failure_blanks_counter_and_logs_once() {
    let mut h = harness(StubHttpClient::responding(HttpResponse::new(404, "")));
    h.sim.init();
    settle(&mut h.sim);

    let counter = h.sim.model().counter();
    assert_eq!(
        counter.history(),
        &[FetchStatus::Idle, FetchStatus::Loading, FetchStatus::Error]
    );
    assert_eq!(counter.failure().and_then(|f| f.status), Some(404));

    let text = h.sim.capture_frame(80, 6).to_text();
    assert_eq!(text, format!("{:^80}", PAGE_TITLE).trim_end());

    let entries = h.sink.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].context, "Failed to fetch treasury data");
    assert!(entries[0].detail.contains("Not Found"));
}

#[test]
fn transport_failure_is_not_a_render_failure() {
    let mut h = harness(StubHttpClient::failing(HttpError::new("connection refused")));
    h.sim.init();
    for _ in 0..5 {
        h.sim.capture_frame(80, 6);
    }

    assert!(!h.sim.model().containment().is_failed());
    let text = h.sim.last_frame().expect("frame").to_text();
    assert!(!text.contains(FALLBACK_TEXT));
    assert_eq!(h.sink.len(), 1);
    assert_eq!(
        h.sim.model().counter().failure().and_then(|f| f.code.clone()),
        Some("network".to_owned())
    );
}

#[test]
fn rerenders_and_events_never_refetch() {
    let mut h = harness(ok(r#"{"tvl": 1, "apy": 1}"#));
    h.sim.init();
    settle(&mut h.sim);
    for _ in 0..10 {
        h.sim.capture_frame(80, 6);
    }
    h.sim.inject_event(Event::Resize {
        width: 100,
        height: 20,
    });
    h.sim.inject_event(Event::Focus(true));
    h.sim.capture_frame(100, 20);

    assert_eq!(h.fetcher.calls.load(Ordering::SeqCst), 1);
    assert_eq!(h.transport.requests().len(), 1);
    let tasks = h
        .sim
        .command_log()
        .iter()
        .filter(|record| matches!(record, CmdRecord::Task(Some(name)) if name == "treasury-metrics"))
        .count();
    assert_eq!(tasks, 1);
}

#[test]
fn quit_key_stops_the_program() {
    let mut h = harness(ok(r#"{"tvl": 1, "apy": 1}"#));
    h.sim.init();
    h.sim.inject_event(Event::Key(KeyEvent::new(KeyCode::Char('q'))));
    assert!(!h.sim.is_running());
    assert!(!h.sim.model().counter().is_alive());
}

#[test]
fn nan_metrics_render_as_zero() {
    let mut h = harness(ok(r#"{"tvl": "lots", "apy": {"value": 3}}"#));
    h.sim.init();
    settle(&mut h.sim);

    let metrics = h.sim.model().counter().metrics().expect("metrics");
    assert!(metrics.tvl.is_nan() && metrics.apy.is_nan());
    let text = h.sim.capture_frame(80, 6).to_text();
    assert!(text.contains("$0"), "frame:\n{text}");
    assert!(text.contains("0.0 %"), "frame:\n{text}");
}
