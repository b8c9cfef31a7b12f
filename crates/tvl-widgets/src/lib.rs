#![forbid(unsafe_code)]

//! Widgets for the treasury dashboard.

pub mod block;
pub mod borders;
pub mod error_boundary;
pub mod paragraph;

use tvl_core::geometry::Rect;
use tvl_render::buffer::Buffer;
use tvl_render::cell::Cell;
use tvl_render::frame::Frame;
use tvl_render::style::Style;
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// A `Widget` is a renderable component.
///
/// Widgets render themselves into a [`Frame`] within a given [`Rect`] and
/// must not write outside it.
pub trait Widget {
    /// Render the widget into the frame at the given area.
    fn render(&self, area: Rect, frame: &mut Frame);
}

impl<W: Widget + ?Sized> Widget for &W {
    fn render(&self, area: Rect, frame: &mut Frame) {
        (**self).render(area, frame);
    }
}

impl<W: Widget + ?Sized> Widget for Box<W> {
    fn render(&self, area: Rect, frame: &mut Frame) {
        (**self).render(area, frame);
    }
}

/// A `StatefulWidget` is a widget that renders based on mutable state.
pub trait StatefulWidget {
    type State;

    /// Render the widget into the frame with mutable state.
    fn render(&self, area: Rect, frame: &mut Frame, state: &mut Self::State);
}

/// Apply a style to all cells in a rectangular area, preserving content.
pub fn set_style_area(buf: &mut Buffer, area: Rect, style: Style) {
    if style.is_empty() {
        return;
    }
    for y in area.y..area.bottom() {
        for x in area.x..area.right() {
            if let Some(cell) = buf.get_mut(x, y) {
                style.apply_to(cell);
            }
        }
    }
}

/// Draw a text span into the frame at the given position.
///
/// Returns the x position after the last drawn character. Stops before
/// `max_x` (exclusive); a wide grapheme that would straddle `max_x` is not
/// drawn.
pub fn draw_text_span(
    frame: &mut Frame,
    mut x: u16,
    y: u16,
    content: &str,
    style: Style,
    max_x: u16,
) -> u16 {
    for grapheme in content.graphemes(true) {
        if x >= max_x {
            break;
        }
        let w = UnicodeWidthStr::width(grapheme);
        if w == 0 {
            continue;
        }
        if x.saturating_add(w as u16) > max_x {
            break;
        }
        if let Some(c) = grapheme.chars().next() {
            let mut cell = Cell::from_char(c);
            style.apply_to(&mut cell);
            frame.buffer.set(x, y, cell);
        }
        x = x.saturating_add(w as u16);
    }
    x
}

/// Blank an area to spaces, keeping nothing of what was there.
pub(crate) fn clear_area(frame: &mut Frame, area: Rect) {
    frame.buffer.fill(area, Cell::from_char(' '));
}
