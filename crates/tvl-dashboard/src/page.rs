#![forbid(unsafe_code)]

//! Treasury page: the top-level [`Model`].
//!
//! Hosts the [`TreasuryCounter`] inside an [`ErrorBoundary`]. A render panic
//! in the counter swaps it for a fixed apology paragraph for the rest of the
//! session; a failed fetch only blanks the counter and never reaches the
//! boundary.

use std::cell::RefCell;
use std::sync::Arc;
use std::time::Duration;

use tracing::info;
use tvl_core::event::{Event, KeyCode};
use tvl_core::geometry::Rect;
use tvl_render::frame::Frame;
use tvl_render::style::Style;
use tvl_runtime::{Cmd, Model};
use tvl_widgets::block::Alignment;
use tvl_widgets::error_boundary::{CapturedError, ContainmentState, ErrorBoundary, RenderContext};
use tvl_widgets::paragraph::Paragraph;
use tvl_widgets::{StatefulWidget, Widget, draw_text_span};

use crate::counter::{CounterMsg, TreasuryCounter};
use crate::diagnostics::DiagnosticSink;

pub const PAGE_TITLE: &str = "Treasury Metrics";

/// Shown in place of the counter after a contained render failure.
pub const FALLBACK_TEXT: &str = "Unable to load treasury data. Please try again later.";

/// Diagnostic context for contained render failures.
pub const PAGE_ERROR_CONTEXT: &str = "Treasury page error";

/// Animation tick interval (~60 fps).
pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Widest the metric tiles get.
const MAX_BODY_WIDTH: u16 = 72;

/// Messages handled by [`TreasuryPage`].
#[derive(Debug)]
pub enum PageMsg {
    Counter(CounterMsg),
    Tick(Duration),
    Quit,
    Ignore,
}

impl From<Event> for PageMsg {
    fn from(event: Event) -> Self {
        match event {
            Event::Key(key) if key.is_char('q') || key.code == KeyCode::Escape => PageMsg::Quit,
            Event::Key(key) if key.ctrl() && key.is_char('c') => PageMsg::Quit,
            Event::Tick { elapsed } => PageMsg::Tick(elapsed),
            _ => PageMsg::Ignore,
        }
    }
}

pub struct TreasuryPage {
    counter: TreasuryCounter,
    containment: RefCell<ContainmentState>,
    diagnostics: Arc<dyn DiagnosticSink>,
    fallback: Paragraph<'static>,
    exit_after: Option<Duration>,
}

impl TreasuryPage {
    pub fn new(counter: TreasuryCounter, diagnostics: Arc<dyn DiagnosticSink>) -> Self {
        Self {
            counter,
            containment: RefCell::new(ContainmentState::default()),
            diagnostics,
            fallback: Paragraph::new(FALLBACK_TEXT)
                .wrap(true)
                .alignment(Alignment::Center),
            exit_after: None,
        }
    }

    /// Quit on its own after `duration`. Zero disables.
    #[must_use]
    pub fn exit_after(mut self, duration: Duration) -> Self {
        self.exit_after = (!duration.is_zero()).then_some(duration);
        self
    }

    pub fn counter(&self) -> &TreasuryCounter {
        &self.counter
    }

    /// Snapshot of the boundary state.
    pub fn containment(&self) -> ContainmentState {
        self.containment.borrow().clone()
    }

    pub fn is_animating(&self) -> bool {
        self.counter.is_animating()
    }

    /// Tear the counter down; an in-flight fetch result is dropped.
    pub fn unmount_counter(&mut self) {
        self.counter.unmount();
    }

    /// Rows the page wants at `width` columns.
    pub fn preferred_height(width: u16) -> u16 {
        2 + TreasuryCounter::preferred_height(width.min(MAX_BODY_WIDTH))
    }

    fn body_area(area: Rect) -> Rect {
        let (_, rest) = area.split_top(2);
        rest.centered_columns(MAX_BODY_WIDTH)
    }

    fn render_title(area: Rect, frame: &mut Frame) {
        let (row, _) = area.split_top(1);
        let x = Alignment::Center.start_x(row, tvl_render::display_width(PAGE_TITLE));
        draw_text_span(frame, x, row.y, PAGE_TITLE, Style::new().bold(), row.right());
    }

    /// Render `child` behind the page's boundary.
    fn render_contained<W: Widget>(&self, child: W, area: Rect, frame: &mut Frame) {
        let diagnostics = Arc::clone(&self.diagnostics);
        let observer = move |error: &CapturedError, ctx: &RenderContext| {
            diagnostics.error(
                PAGE_ERROR_CONTEXT,
                &format!("{} in {}: {}", error.widget_name, describe(ctx.area), error.message),
            );
        };
        let boundary = ErrorBoundary::new(child, "TreasuryCounter")
            .fallback(&self.fallback)
            .on_error(&observer);
        let mut state = self.containment.borrow_mut();
        boundary.render(area, frame, &mut state);
    }
}

fn describe(area: Rect) -> String {
    format!("{}x{}@{},{}", area.width, area.height, area.x, area.y)
}

impl Model for TreasuryPage {
    type Message = PageMsg;

    fn init(&mut self) -> Cmd<PageMsg> {
        let mut cmds = vec![
            self.counter.mount().map(PageMsg::Counter),
            Cmd::tick(FRAME_INTERVAL),
        ];
        if let Some(after) = self.exit_after {
            cmds.push(Cmd::task_named("exit-after", move || {
                std::thread::sleep(after);
                PageMsg::Quit
            }));
        }
        Cmd::batch(cmds)
    }

    fn update(&mut self, msg: PageMsg) -> Cmd<PageMsg> {
        match msg {
            PageMsg::Counter(msg) => {
                self.counter.update(msg);
                Cmd::none()
            }
            PageMsg::Tick(dt) => {
                self.counter.tick(dt);
                Cmd::none()
            }
            PageMsg::Quit => {
                info!("treasury page closing");
                self.unmount_counter();
                Cmd::quit()
            }
            PageMsg::Ignore => Cmd::none(),
        }
    }

    fn view(&self, frame: &mut Frame) {
        let area = frame.bounds();
        if area.is_empty() {
            return;
        }
        Self::render_title(area, frame);
        let body = Self::body_area(area);
        self.render_contained(&self.counter, body, frame);
    }
}
