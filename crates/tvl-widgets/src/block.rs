#![forbid(unsafe_code)]

use crate::Widget;
use crate::borders::{BorderType, Borders};
use crate::{draw_text_span, set_style_area};
use tvl_core::geometry::Rect;
use tvl_render::cell::Cell;
use tvl_render::display_width;
use tvl_render::frame::Frame;
use tvl_render::style::Style;

/// A widget that draws a block with optional borders and a title.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Block<'a> {
    borders: Borders,
    border_style: Style,
    border_type: BorderType,
    title: Option<&'a str>,
    title_alignment: Alignment,
    style: Style,
}

/// Text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    #[default]
    /// Align text to the left.
    Left,
    /// Center text horizontally.
    Center,
    /// Align text to the right.
    Right,
}

impl Alignment {
    /// Starting x for content of `width` columns inside `area`.
    pub fn start_x(self, area: Rect, width: usize) -> u16 {
        let width = u16::try_from(width).unwrap_or(u16::MAX);
        match self {
            Self::Left => area.x,
            Self::Center => area.x.saturating_add(area.width.saturating_sub(width) / 2),
            Self::Right => area.x.saturating_add(area.width.saturating_sub(width)),
        }
    }
}

impl<'a> Block<'a> {
    /// Create a new block with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a block with all borders enabled.
    pub fn bordered() -> Self {
        Self::default().borders(Borders::ALL)
    }

    /// Set which borders to render.
    #[must_use]
    pub fn borders(mut self, borders: Borders) -> Self {
        self.borders = borders;
        self
    }

    /// Set the style applied to border characters and the title.
    #[must_use]
    pub fn border_style(mut self, style: Style) -> Self {
        self.border_style = style;
        self
    }

    /// Set the border character set.
    #[must_use]
    pub fn border_type(mut self, border_type: BorderType) -> Self {
        self.border_type = border_type;
        self
    }

    /// Set the block title displayed on the top border.
    #[must_use]
    pub fn title(mut self, title: &'a str) -> Self {
        self.title = Some(title);
        self
    }

    /// Set the horizontal alignment of the title.
    #[must_use]
    pub fn title_alignment(mut self, alignment: Alignment) -> Self {
        self.title_alignment = alignment;
        self
    }

    /// Set the style applied to the whole block area.
    #[must_use]
    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// Compute the inner area inside the block's borders.
    pub fn inner(&self, area: Rect) -> Rect {
        let mut inner = area;

        if self.borders.contains(Borders::LEFT) {
            inner.x = inner.x.saturating_add(1);
            inner.width = inner.width.saturating_sub(1);
        }
        if self.borders.contains(Borders::TOP) {
            inner.y = inner.y.saturating_add(1);
            inner.height = inner.height.saturating_sub(1);
        }
        if self.borders.contains(Borders::RIGHT) {
            inner.width = inner.width.saturating_sub(1);
        }
        if self.borders.contains(Borders::BOTTOM) {
            inner.height = inner.height.saturating_sub(1);
        }

        inner
    }

    fn border_cell(&self, c: char) -> Cell {
        let mut cell = Cell::from_char(c);
        self.border_style.apply_to(&mut cell);
        cell
    }

    fn render_borders(&self, area: Rect, frame: &mut Frame) {
        let set = self.border_type.to_border_set();
        let buf = &mut frame.buffer;
        let right = area.right() - 1;
        let bottom = area.bottom() - 1;

        if self.borders.contains(Borders::LEFT) {
            for y in area.y..area.bottom() {
                buf.set(area.x, y, self.border_cell(set.vertical));
            }
        }
        if self.borders.contains(Borders::RIGHT) {
            for y in area.y..area.bottom() {
                buf.set(right, y, self.border_cell(set.vertical));
            }
        }
        if self.borders.contains(Borders::TOP) {
            for x in area.x..area.right() {
                buf.set(x, area.y, self.border_cell(set.horizontal));
            }
        }
        if self.borders.contains(Borders::BOTTOM) {
            for x in area.x..area.right() {
                buf.set(x, bottom, self.border_cell(set.horizontal));
            }
        }

        // Corners overwrite the edge glyphs.
        if self.borders.contains(Borders::LEFT | Borders::TOP) {
            buf.set(area.x, area.y, self.border_cell(set.top_left));
        }
        if self.borders.contains(Borders::RIGHT | Borders::TOP) {
            buf.set(right, area.y, self.border_cell(set.top_right));
        }
        if self.borders.contains(Borders::LEFT | Borders::BOTTOM) {
            buf.set(area.x, bottom, self.border_cell(set.bottom_left));
        }
        if self.borders.contains(Borders::RIGHT | Borders::BOTTOM) {
            buf.set(right, bottom, self.border_cell(set.bottom_right));
        }
    }

    fn render_title(&self, area: Rect, frame: &mut Frame) {
        let Some(title) = self.title else {
            return;
        };
        if !self.borders.contains(Borders::TOP) || area.width < 3 {
            return;
        }

        let lane = Rect::new(area.x.saturating_add(1), area.y, area.width - 2, 1);
        let shown = display_width(title).min(lane.width as usize);
        let x = self.title_alignment.start_x(lane, shown);
        draw_text_span(frame, x, area.y, title, self.border_style, lane.right());
    }
}

impl Widget for Block<'_> {
    fn render(&self, area: Rect, frame: &mut Frame) {
        if area.is_empty() {
            return;
        }

        set_style_area(&mut frame.buffer, area, self.style);
        self.render_borders(area, frame);
        self.render_title(area, frame);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tvl_render::cell::PackedRgba;

    fn cell_char(frame: &Frame, x: u16, y: u16) -> Option<char> {
        frame.buffer.get(x, y).and_then(|c| c.content.as_char())
    }

    #[test]
    fn inner_with_all_borders() {
        let inner = Block::bordered().inner(Rect::new(0, 0, 10, 5));
        assert_eq!(inner, Rect::new(1, 1, 8, 3));
    }

    #[test]
    fn inner_with_no_borders() {
        let area = Rect::new(2, 3, 10, 5);
        assert_eq!(Block::new().inner(area), area);
    }

    #[test]
    fn inner_saturates_on_tiny_area() {
        let inner = Block::bordered().inner(Rect::new(0, 0, 1, 1));
        assert!(inner.is_empty());
    }

    #[test]
    fn render_square_borders() {
        let mut frame = Frame::new(4, 3);
        Block::bordered().render(Rect::new(0, 0, 4, 3), &mut frame);
        assert_eq!(frame.buffer.to_text(), "┌──┐\n│  │\n└──┘");
    }

    #[test]
    fn render_rounded_borders() {
        let mut frame = Frame::new(3, 2);
        Block::bordered()
            .border_type(BorderType::Rounded)
            .render(Rect::new(0, 0, 3, 2), &mut frame);
        assert_eq!(cell_char(&frame, 0, 0), Some('╭'));
        assert_eq!(cell_char(&frame, 2, 1), Some('╯'));
    }

    #[test]
    fn render_title_left_aligned() {
        let mut frame = Frame::new(12, 3);
        Block::bordered()
            .title("TVL")
            .render(Rect::new(0, 0, 12, 3), &mut frame);
        assert_eq!(frame.buffer.row_text(0), "┌TVL───────┐");
    }

    #[test]
    fn render_title_center_aligned() {
        let mut frame = Frame::new(9, 3);
        Block::bordered()
            .title("ab")
            .title_alignment(Alignment::Center)
            .render(Rect::new(0, 0, 9, 3), &mut frame);
        assert_eq!(frame.buffer.row_text(0), "┌──ab───┐");
    }

    #[test]
    fn title_clipped_to_border_lane() {
        let mut frame = Frame::new(5, 2);
        Block::bordered()
            .title("Treasury")
            .render(Rect::new(0, 0, 5, 2), &mut frame);
        assert_eq!(frame.buffer.row_text(0), "┌Tre┐");
    }

    #[test]
    fn title_not_rendered_without_top_border() {
        let mut frame = Frame::new(6, 2);
        Block::new()
            .borders(Borders::LEFT)
            .title("x")
            .render(Rect::new(0, 0, 6, 2), &mut frame);
        assert_eq!(frame.buffer.row_text(0), "│");
    }

    #[test]
    fn border_style_applied() {
        let mut frame = Frame::new(3, 3);
        Block::bordered()
            .border_style(Style::new().fg(PackedRgba::RED))
            .render(Rect::new(0, 0, 3, 3), &mut frame);
        assert_eq!(frame.buffer.get(0, 0).map(|c| c.fg), Some(PackedRgba::RED));
    }

    #[test]
    fn render_empty_area_is_noop() {
        let mut frame = Frame::new(3, 3);
        Block::bordered().render(Rect::new(0, 0, 0, 0), &mut frame);
        assert_eq!(frame.buffer.to_text(), "");
    }

    #[test]
    fn render_1x1_no_panic() {
        let mut frame = Frame::new(1, 1);
        Block::bordered().render(Rect::new(0, 0, 1, 1), &mut frame);
        assert_eq!(cell_char(&frame, 0, 0), Some('┘'));
    }

    #[test]
    fn alignment_start_x() {
        let area = Rect::new(2, 0, 10, 1);
        assert_eq!(Alignment::Left.start_x(area, 4), 2);
        assert_eq!(Alignment::Center.start_x(area, 4), 5);
        assert_eq!(Alignment::Right.start_x(area, 4), 8);
        assert_eq!(Alignment::Right.start_x(area, 40), 2);
    }
}
