#![forbid(unsafe_code)]

//! Treasury counter: the animated TVL/APY display.
//!
//! # State machine
//!
//! ```text
//! Idle ──mount──▶ Loading ──Ok──▶ Success
//!                    │
//!                    └────Err───▶ Error
//! ```
//!
//! Mounting schedules exactly one fetch; later mounts and re-renders do not
//! fetch again. `Success` and `Error` are terminal. A failed fetch is
//! reported to the diagnostic sink before the transition and the counter
//! then renders nothing.
//!
//! The fetch runs as a background task that checks a shared liveness flag
//! before handing its result back. After [`TreasuryCounter::unmount`] the
//! result is discarded instead of applied.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::runtime::Handle;
use tracing::{debug, info};
use tvl_core::animation::{Animation, Spring, SpringConfig};
use tvl_core::geometry::Rect;
use tvl_fetch::{FetchFailure, MetricsFetcher, TreasuryMetrics};
use tvl_render::cell::PackedRgba;
use tvl_render::display_width;
use tvl_render::frame::Frame;
use tvl_render::style::Style;
use tvl_runtime::Cmd;
use tvl_widgets::Widget;
use tvl_widgets::block::{Alignment, Block};
use tvl_widgets::borders::BorderType;
use tvl_widgets::paragraph::Paragraph;

use crate::diagnostics::DiagnosticSink;
use crate::format::{NumberLocale, format_apy, format_tvl};

/// Diagnostic context for swallowed fetch failures.
pub const FETCH_FAILURE_CONTEXT: &str = "Failed to fetch treasury data";

pub const TVL_LABEL: &str = "Total Value Locked";
pub const APY_LABEL: &str = "Annual Percentage Yield";

/// Rows taken by one metric tile.
const TILE_HEIGHT: u16 = 3;
/// Columns between side-by-side tiles.
const TILE_GAP: u16 = 2;

/// Fetch lifecycle of one counter instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchStatus {
    #[default]
    Idle,
    Loading,
    Success,
    Error,
}

/// Messages produced by the counter's fetch task.
#[derive(Debug)]
pub enum CounterMsg {
    /// The fetch finished while the counter was alive.
    Loaded(Result<TreasuryMetrics, FetchFailure>),
    /// The fetch finished after the counter was torn down.
    Discarded,
}

/// Animated TVL/APY display.
pub struct TreasuryCounter {
    fetcher: Arc<dyn MetricsFetcher>,
    runtime: Handle,
    diagnostics: Arc<dyn DiagnosticSink>,
    locale: NumberLocale,
    status: FetchStatus,
    history: Vec<FetchStatus>,
    metrics: Option<TreasuryMetrics>,
    failure: Option<FetchFailure>,
    tvl: Spring,
    apy: Spring,
    fetch_scheduled: bool,
    alive: Arc<AtomicBool>,
}

impl std::fmt::Debug for TreasuryCounter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TreasuryCounter")
            .field("status", &self.status)
            .field("metrics", &self.metrics)
            .field("failure", &self.failure)
            .field("alive", &self.is_alive())
            .finish_non_exhaustive()
    }
}

impl TreasuryCounter {
    /// A counter in `Idle`. Nothing is fetched until [`mount`](Self::mount).
    ///
    /// `runtime` drives the fetch future from the task thread.
    pub fn new(
        fetcher: Arc<dyn MetricsFetcher>,
        runtime: Handle,
        diagnostics: Arc<dyn DiagnosticSink>,
    ) -> Self {
        Self {
            fetcher,
            runtime,
            diagnostics,
            locale: NumberLocale::default(),
            status: FetchStatus::Idle,
            history: vec![FetchStatus::Idle],
            metrics: None,
            failure: None,
            tvl: Spring::new(0.0).config(SpringConfig::DEFAULT),
            apy: Spring::new(0.0).config(SpringConfig::DEFAULT),
            fetch_scheduled: false,
            alive: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Use `locale` for TVL digit grouping.
    #[must_use]
    pub fn locale(mut self, locale: NumberLocale) -> Self {
        self.locale = locale;
        self
    }

    /// Start the one fetch of this instance.
    ///
    /// Returns the fetch task on the first call and `Cmd::None` on every
    /// later call, as well as after [`unmount`](Self::unmount).
    pub fn mount(&mut self) -> Cmd<CounterMsg> {
        if self.fetch_scheduled || !self.is_alive() {
            return Cmd::none();
        }
        self.fetch_scheduled = true;
        self.transition(FetchStatus::Loading);

        let fetcher = Arc::clone(&self.fetcher);
        let runtime = self.runtime.clone();
        let alive = Arc::clone(&self.alive);
        Cmd::task_named("treasury-metrics", move || {
            let result = runtime.block_on(fetcher.fetch());
            if alive.load(Ordering::Acquire) {
                CounterMsg::Loaded(result)
            } else {
                CounterMsg::Discarded
            }
        })
    }

    /// Apply a fetch result.
    ///
    /// Results are ignored unless the counter is alive and `Loading`.
    pub fn update(&mut self, msg: CounterMsg) {
        let result = match msg {
            CounterMsg::Loaded(result) => result,
            CounterMsg::Discarded => {
                debug!("treasury metrics arrived after unmount; discarded");
                return;
            }
        };
        if !self.is_alive() || self.status != FetchStatus::Loading {
            debug!(status = ?self.status, "ignoring treasury metrics result");
            return;
        }

        match result {
            Ok(metrics) => {
                info!(tvl = metrics.tvl, apy = metrics.apy, "treasury metrics loaded");
                self.tvl = Spring::new(0.0);
                self.tvl.animate_to(animation_target(metrics.tvl));
                self.apy = Spring::new(0.0);
                self.apy.animate_to(animation_target(metrics.apy));
                self.metrics = Some(metrics);
                self.transition(FetchStatus::Success);
            }
            Err(failure) => {
                self.diagnostics
                    .error(FETCH_FAILURE_CONTEXT, &describe_failure(&failure));
                self.failure = Some(failure);
                self.transition(FetchStatus::Error);
            }
        }
    }

    /// Advance the value animations by `dt`.
    pub fn tick(&mut self, dt: Duration) {
        if self.status == FetchStatus::Success {
            self.tvl.tick(dt);
            self.apy.tick(dt);
        }
    }

    /// Tear the instance down; an in-flight fetch result will be discarded.
    pub fn unmount(&mut self) {
        self.alive.store(false, Ordering::Release);
    }

    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    pub fn status(&self) -> FetchStatus {
        self.status
    }

    /// Every state entered, starting with `Idle`.
    pub fn history(&self) -> &[FetchStatus] {
        &self.history
    }

    pub fn metrics(&self) -> Option<TreasuryMetrics> {
        self.metrics
    }

    pub fn failure(&self) -> Option<&FetchFailure> {
        self.failure.as_ref()
    }

    /// Whether either value is still moving.
    pub fn is_animating(&self) -> bool {
        self.status == FetchStatus::Success && !(self.tvl.is_complete() && self.apy.is_complete())
    }

    /// Current animated values as `(tvl, apy)`.
    pub fn displayed_values(&self) -> (f64, f64) {
        (self.tvl.position(), self.apy.position())
    }

    /// Formatted `(tvl, apy)` strings, or `None` when nothing is shown.
    pub fn formatted(&self) -> Option<(String, String)> {
        if self.status != FetchStatus::Success {
            return None;
        }
        let (tvl, apy) = self.displayed_values();
        Some((format_tvl(tvl, &self.locale), format_apy(apy)))
    }

    /// Rows needed to show both tiles in `width` columns.
    pub fn preferred_height(width: u16) -> u16 {
        if stacks_vertically(width) {
            TILE_HEIGHT * 2
        } else {
            TILE_HEIGHT
        }
    }

    fn transition(&mut self, next: FetchStatus) {
        debug!(from = ?self.status, to = ?next, "treasury counter transition");
        self.status = next;
        self.history.push(next);
    }
}

impl Drop for TreasuryCounter {
    fn drop(&mut self) {
        self.unmount();
    }
}

/// Values the springs head toward. Zero and `NaN` both animate to zero, so a
/// non-numeric metric never reaches the screen.
fn animation_target(value: f64) -> f64 {
    if value.is_nan() { 0.0 } else { value }
}

fn describe_failure(failure: &FetchFailure) -> String {
    match (failure.status, failure.code.as_deref()) {
        (Some(status), _) => format!("{failure} (status {status})"),
        (None, Some(code)) => format!("{failure} ({code})"),
        (None, None) => failure.to_string(),
    }
}

fn stacks_vertically(width: u16) -> bool {
    let widest = display_width(APY_LABEL) as u16 + 4;
    width < widest * 2 + TILE_GAP
}

fn render_tile(frame: &mut Frame, area: Rect, label: &str, value: &str, accent: PackedRgba) {
    let block = Block::bordered()
        .border_type(BorderType::Rounded)
        .border_style(Style::new().fg(accent))
        .title(label)
        .title_alignment(Alignment::Center);
    Paragraph::new(value)
        .block(block)
        .alignment(Alignment::Center)
        .style(Style::new().bold())
        .render(area, frame);
}

impl Widget for TreasuryCounter {
    fn render(&self, area: Rect, frame: &mut Frame) {
        let Some((tvl, apy)) = self.formatted() else {
            return;
        };
        if area.is_empty() {
            return;
        }

        let tvl_accent = PackedRgba::rgb(94, 234, 212);
        let apy_accent = PackedRgba::rgb(250, 204, 21);

        if stacks_vertically(area.width) {
            let (top, rest) = area.split_top(TILE_HEIGHT);
            let (bottom, _) = rest.split_top(TILE_HEIGHT);
            render_tile(frame, top, TVL_LABEL, &tvl, tvl_accent);
            render_tile(frame, bottom, APY_LABEL, &apy, apy_accent);
        } else {
            let (row, _) = area.split_top(TILE_HEIGHT);
            let (left, right) = row.split_columns(TILE_GAP);
            render_tile(frame, left, TVL_LABEL, &tvl, tvl_accent);
            render_tile(frame, right, APY_LABEL, &apy, apy_accent);
        }
    }
}
