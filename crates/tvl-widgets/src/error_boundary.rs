#![forbid(unsafe_code)]

//! Render error boundaries with panic containment.
//!
//! [`ErrorBoundary`] wraps a widget so that a panic raised while rendering it
//! is caught, recorded in a [`ContainmentState`], and replaced by a fallback
//! view. The state is monotonic: once `Failed`, it stays failed and the child
//! is never rendered again. Only render-time panics are contained; anything
//! the child reports through other channels passes through untouched.

use std::any::Any;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Instant;

use tvl_core::geometry::{Rect, Sides};
use tvl_core::unwind::ContainedScope;
use tvl_render::cell::PackedRgba;
use tvl_render::frame::Frame;
use tvl_render::style::Style;
use tvl_render::{display_width, grapheme_width};
use unicode_segmentation::UnicodeSegmentation;

use crate::block::Block;
use crate::{StatefulWidget, Widget, clear_area, draw_text_span, set_style_area};

/// Shown when the panic payload carries no message.
pub const UNKNOWN_ERROR_MESSAGE: &str = "An unexpected error occurred";

/// Heading of the default fallback view.
pub const DEFAULT_FALLBACK_HEADING: &str = "Something went wrong.";

/// Captured error from a widget panic.
#[derive(Debug, Clone)]
pub struct CapturedError {
    /// Error message extracted from the panic payload.
    pub message: String,
    /// Name of the widget that panicked.
    pub widget_name: &'static str,
    /// Area the widget was rendering into.
    pub area: Rect,
    /// When the error was captured.
    pub timestamp: Instant,
}

impl CapturedError {
    /// Build an error from a message.
    pub fn new(message: impl Into<String>, widget_name: &'static str, area: Rect) -> Self {
        Self {
            message: message.into(),
            widget_name,
            area,
            timestamp: Instant::now(),
        }
    }

    /// Build an error from a `catch_unwind` payload.
    pub fn from_panic(payload: Box<dyn Any + Send>, widget_name: &'static str, area: Rect) -> Self {
        let mut message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            String::new()
        };
        if let Some(stripped) = message.strip_prefix("internal error: entered unreachable code: ") {
            message = stripped.to_string();
        }
        if message.trim().is_empty() {
            message = UNKNOWN_ERROR_MESSAGE.to_string();
        }
        Self::new(message, widget_name, area)
    }
}

impl fmt::Display for CapturedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for CapturedError {}

/// Where a contained failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderContext {
    /// Name the boundary was given for its child.
    pub widget_name: &'static str,
    /// Area the child was rendering into.
    pub area: Rect,
}

/// State owned by whoever hosts an [`ErrorBoundary`].
///
/// Two states, `Ok` then `Failed`, with no way back.
#[derive(Debug, Clone, Default)]
pub enum ContainmentState {
    /// The child renders normally.
    #[default]
    Ok,
    /// The child panicked; the fallback is shown from now on.
    Failed(CapturedError),
}

impl ContainmentState {
    /// Transition on a render panic.
    ///
    /// `Ok` becomes `Failed(error)`. An already failed state keeps its first
    /// error.
    #[must_use]
    pub fn on_render_panic(self, error: CapturedError) -> Self {
        match self {
            Self::Ok => Self::Failed(error),
            failed @ Self::Failed(_) => failed,
        }
    }

    /// The captured error, if any.
    pub fn error(&self) -> Option<&CapturedError> {
        match self {
            Self::Ok => None,
            Self::Failed(e) => Some(e),
        }
    }

    /// Whether the boundary has tripped.
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Callback invoked once when a boundary enters `Failed`.
pub type ErrorObserver<'a> = &'a dyn Fn(&CapturedError, &RenderContext);

/// A widget wrapper that catches panics from an inner widget.
///
/// On the render that panics, the boundary clears the child's area, moves
/// the state to `Failed`, logs the failure, invokes the observer, and draws
/// the fallback. Later renders draw only the fallback.
///
/// Observer panics are not contained.
///
/// # Example
///
/// ```ignore
/// let boundary = ErrorBoundary::new(&counter, "TreasuryCounter")
///     .fallback(&fallback)
///     .on_error(&|error, ctx| eprintln!("{}: {error}", ctx.widget_name));
/// let mut state = ContainmentState::default();
/// boundary.render(area, &mut frame, &mut state);
/// ```
pub struct ErrorBoundary<'a, W> {
    inner: W,
    widget_name: &'static str,
    fallback: Option<&'a dyn Widget>,
    on_error: Option<ErrorObserver<'a>>,
}

impl<'a, W: Widget> ErrorBoundary<'a, W> {
    /// Create a new error boundary wrapping the given widget.
    pub fn new(inner: W, widget_name: &'static str) -> Self {
        Self {
            inner,
            widget_name,
            fallback: None,
            on_error: None,
        }
    }

    /// Render `fallback` instead of the default error view.
    #[must_use]
    pub fn fallback(mut self, fallback: &'a dyn Widget) -> Self {
        self.fallback = Some(fallback);
        self
    }

    /// Observe the transition to `Failed`.
    #[must_use]
    pub fn on_error(mut self, observer: ErrorObserver<'a>) -> Self {
        self.on_error = Some(observer);
        self
    }

    /// Get the widget name.
    pub fn widget_name(&self) -> &'static str {
        self.widget_name
    }

    fn render_fallback(&self, area: Rect, frame: &mut Frame, error: &CapturedError) {
        match self.fallback {
            Some(fallback) => fallback.render(area, frame),
            None => FallbackWidget::new(error.clone()).render(area, frame),
        }
    }
}

impl<W: Widget> StatefulWidget for ErrorBoundary<'_, W> {
    type State = ContainmentState;

    fn render(&self, area: Rect, frame: &mut Frame, state: &mut ContainmentState) {
        if area.is_empty() {
            return;
        }

        if let ContainmentState::Failed(error) = state {
            self.render_fallback(area, frame, error);
            return;
        }

        let result = {
            let _scope = ContainedScope::enter();
            catch_unwind(AssertUnwindSafe(|| self.inner.render(area, frame)))
        };

        let Err(payload) = result else {
            return;
        };

        let error = CapturedError::from_panic(payload, self.widget_name, area);
        let context = RenderContext {
            widget_name: self.widget_name,
            area,
        };
        *state = std::mem::take(state).on_render_panic(error.clone());

        tracing::error!(
            widget = self.widget_name,
            error = %error.message,
            x = area.x,
            y = area.y,
            width = area.width,
            height = area.height,
            "render panic contained; showing fallback"
        );

        if let Some(observer) = self.on_error {
            observer(&error, &context);
        }

        clear_area(frame, area);
        self.render_fallback(area, frame, &error);
    }
}

/// The default fallback view.
///
/// A red-bordered box with "Something went wrong." and the error message,
/// truncated to fit. Areas too small for a border show a single `!`.
#[derive(Debug, Clone)]
pub struct FallbackWidget {
    error: CapturedError,
}

impl FallbackWidget {
    /// Create a fallback for the given error.
    pub fn new(error: CapturedError) -> Self {
        Self { error }
    }

    /// Create a fallback with a simple message and widget name.
    pub fn from_message(message: impl Into<String>, widget_name: &'static str) -> Self {
        Self::new(CapturedError::new(message, widget_name, Rect::default()))
    }
}

const ERROR_FG: PackedRgba = PackedRgba::rgb(255, 60, 60);
const ERROR_BG: PackedRgba = PackedRgba::rgb(40, 0, 0);

impl Widget for FallbackWidget {
    fn render(&self, area: Rect, frame: &mut Frame) {
        if area.is_empty() {
            return;
        }

        let error_style = Style::new().fg(ERROR_FG).bg(ERROR_BG);
        set_style_area(&mut frame.buffer, area, Style::new().bg(ERROR_BG));

        if area.width < 3 || area.height < 3 {
            draw_text_span(frame, area.x, area.y, "!", error_style, area.right());
            return;
        }

        let block = Block::bordered()
            .title("[Error]")
            .border_style(Style::new().fg(ERROR_FG));
        block.render(area, frame);

        let inner = block.inner(area).inner(Sides::horizontal(1));
        if inner.is_empty() {
            return;
        }

        let width = inner.width as usize;
        draw_text_span(
            frame,
            inner.x,
            inner.y,
            &truncate(DEFAULT_FALLBACK_HEADING, width),
            error_style.bold(),
            inner.right(),
        );
        if inner.height >= 2 {
            draw_text_span(
                frame,
                inner.x,
                inner.y + 1,
                &truncate(&self.error.message, width),
                error_style,
                inner.right(),
            );
        }
    }
}

/// Truncate to `width` columns, marking the cut with an ellipsis.
fn truncate(text: &str, width: usize) -> String {
    if display_width(text) <= width {
        return text.to_string();
    }
    let limit = width.saturating_sub(1);
    let mut out = String::new();
    let mut used = 0;
    for grapheme in text.graphemes(true) {
        let gw = grapheme_width(grapheme);
        if used + gw > limit {
            break;
        }
        out.push_str(grapheme);
        used += gw;
    }
    if width > 0 {
        out.push('\u{2026}');
    }
    out
}
