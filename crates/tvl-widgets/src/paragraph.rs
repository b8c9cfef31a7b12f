#![forbid(unsafe_code)]

use std::borrow::Cow;

use crate::block::{Alignment, Block};
use crate::{Widget, draw_text_span, set_style_area};
use tvl_core::geometry::Rect;
use tvl_render::frame::Frame;
use tvl_render::style::Style;
use tvl_render::{display_width, grapheme_width};
use unicode_segmentation::UnicodeSegmentation;

/// A widget that renders multi-line text.
///
/// Lines are split on `\n`. With wrapping enabled, lines wider than the area
/// break at word boundaries, falling back to grapheme boundaries for words
/// that do not fit on a line of their own.
#[derive(Debug, Clone, Default)]
pub struct Paragraph<'a> {
    text: Cow<'a, str>,
    block: Option<Block<'a>>,
    style: Style,
    wrap: bool,
    alignment: Alignment,
}

impl<'a> Paragraph<'a> {
    pub fn new(text: impl Into<Cow<'a, str>>) -> Self {
        Self {
            text: text.into(),
            block: None,
            style: Style::default(),
            wrap: false,
            alignment: Alignment::Left,
        }
    }

    #[must_use]
    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    #[must_use]
    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    #[must_use]
    pub fn wrap(mut self, wrap: bool) -> Self {
        self.wrap = wrap;
        self
    }

    #[must_use]
    pub fn alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    /// The raw text.
    pub fn text(&self) -> &str {
        &self.text
    }
}

impl Widget for Paragraph<'_> {
    fn render(&self, area: Rect, frame: &mut Frame) {
        if area.is_empty() {
            return;
        }

        set_style_area(&mut frame.buffer, area, self.style);

        let text_area = match self.block {
            Some(ref b) => {
                b.render(area, frame);
                b.inner(area)
            }
            None => area,
        };

        if text_area.is_empty() {
            return;
        }

        let mut y = text_area.y;
        for line in self.text.split('\n') {
            let visual: Vec<Cow<'_, str>> = if self.wrap {
                wrap_words(line, text_area.width as usize)
            } else {
                vec![Cow::Borrowed(line)]
            };
            for visual_line in visual {
                if y >= text_area.bottom() {
                    return;
                }
                let x = self
                    .alignment
                    .start_x(text_area, display_width(&visual_line));
                draw_text_span(frame, x, y, &visual_line, self.style, text_area.right());
                y += 1;
            }
        }
    }
}

/// Greedy word wrap to `width` columns.
fn wrap_words(line: &str, width: usize) -> Vec<Cow<'_, str>> {
    if width == 0 || display_width(line) <= width {
        return vec![Cow::Borrowed(line)];
    }

    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_width = 0;

    for word in line.split_whitespace() {
        let word_width = display_width(word);
        let needed = if current.is_empty() {
            word_width
        } else {
            current_width + 1 + word_width
        };

        if needed <= width {
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
            current_width = needed;
            continue;
        }

        if !current.is_empty() {
            lines.push(Cow::Owned(std::mem::take(&mut current)));
            current_width = 0;
        }

        if word_width <= width {
            current.push_str(word);
            current_width = word_width;
            continue;
        }

        // Hard-break a word wider than the line.
        for grapheme in word.graphemes(true) {
            let gw = grapheme_width(grapheme);
            if current_width + gw > width && !current.is_empty() {
                lines.push(Cow::Owned(std::mem::take(&mut current)));
                current_width = 0;
            }
            current.push_str(grapheme);
            current_width += gw;
        }
    }

    if !current.is_empty() {
        lines.push(Cow::Owned(current));
    }
    lines
}
