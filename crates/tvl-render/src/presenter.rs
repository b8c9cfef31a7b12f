#![forbid(unsafe_code)]

//! Presenter: state-tracked ANSI emission.
//!
//! The presenter turns a [`BufferDiff`] into terminal output, remembering the
//! last emitted style and cursor position so redundant sequences are skipped.
//! Each frame is wrapped in a synchronized update and flushed once.
//!
//! ```ignore
//! let mut presenter = Presenter::new(std::io::stdout());
//! let diff = BufferDiff::compute(&previous, &next);
//! presenter.present(&next, &diff)?;
//! ```

use std::io::{self, BufWriter, Write};

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::queue;
use crossterm::style::{
    Attribute, Color, Print, SetAttribute, SetBackgroundColor, SetForegroundColor,
};
use crossterm::terminal::{BeginSynchronizedUpdate, EndSynchronizedUpdate};

use crate::buffer::Buffer;
use crate::cell::{Cell, CellContent, PackedRgba, StyleFlags};
use crate::diff::BufferDiff;

/// Size of the internal write buffer.
const BUFFER_CAPACITY: usize = 64 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CellStyle {
    fg: PackedRgba,
    bg: PackedRgba,
    flags: StyleFlags,
}

impl CellStyle {
    fn from_cell(cell: &Cell) -> Self {
        Self {
            fg: cell.fg,
            bg: cell.bg,
            flags: cell.flags,
        }
    }
}

fn to_color(color: PackedRgba) -> Color {
    Color::Rgb {
        r: color.r(),
        g: color.g(),
        b: color.b(),
    }
}

/// State-tracked ANSI presenter.
pub struct Presenter<W: Write> {
    writer: BufWriter<W>,
    current_style: Option<CellStyle>,
    cursor: Option<(u16, u16)>,
    origin_y: u16,
}

impl<W: Write> Presenter<W> {
    /// Create a presenter writing to `writer`.
    pub fn new(writer: W) -> Self {
        Self {
            writer: BufWriter::with_capacity(BUFFER_CAPACITY, writer),
            current_style: None,
            cursor: None,
            origin_y: 0,
        }
    }

    /// Offset every row by `origin_y` terminal rows (inline mode).
    pub fn set_origin(&mut self, origin_y: u16) {
        if self.origin_y != origin_y {
            self.origin_y = origin_y;
            self.invalidate();
        }
    }

    /// Forget tracked terminal state, e.g. after a resize.
    pub fn invalidate(&mut self) {
        self.current_style = None;
        self.cursor = None;
    }

    /// Present `buffer`, emitting only the cells listed in `diff`.
    pub fn present(&mut self, buffer: &Buffer, diff: &BufferDiff) -> io::Result<()> {
        self.present_with_cursor(buffer, diff, None)
    }

    /// Present and then show the cursor at `cursor` (or hide it).
    pub fn present_with_cursor(
        &mut self,
        buffer: &Buffer,
        diff: &BufferDiff,
        cursor: Option<(u16, u16)>,
    ) -> io::Result<()> {
        #[cfg(feature = "tracing")]
        let _span = tracing::info_span!(
            "present",
            width = buffer.width(),
            height = buffer.height(),
            changes = diff.len()
        )
        .entered();

        queue!(self.writer, BeginSynchronizedUpdate, Hide)?;

        for run in diff.runs() {
            self.move_cursor_to(run.x0, run.y)?;
            for x in run.x0..=run.x1 {
                if let Some(cell) = buffer.get(x, run.y) {
                    self.emit_cell(cell)?;
                }
            }
        }

        queue!(self.writer, SetAttribute(Attribute::Reset))?;
        self.current_style = None;

        if let Some((x, y)) = cursor {
            self.move_cursor_to(x, y)?;
            queue!(self.writer, Show)?;
        }

        queue!(self.writer, EndSynchronizedUpdate)?;

        #[cfg(feature = "tracing")]
        tracing::trace!("frame presented");
        self.writer.flush()
    }

    fn emit_cell(&mut self, cell: &Cell) -> io::Result<()> {
        if cell.is_continuation() {
            return Ok(());
        }

        self.emit_style_changes(cell)?;

        match cell.content {
            CellContent::Char(c) => queue!(self.writer, Print(c))?,
            _ => queue!(self.writer, Print(' '))?,
        }

        if let Some((x, y)) = self.cursor {
            self.cursor = Some((x.saturating_add(cell.content.width() as u16), y));
        }
        Ok(())
    }

    fn emit_style_changes(&mut self, cell: &Cell) -> io::Result<()> {
        let style = CellStyle::from_cell(cell);
        if self.current_style == Some(style) {
            return Ok(());
        }

        // Reset then apply; simpler than diffing attributes.
        queue!(self.writer, SetAttribute(Attribute::Reset))?;
        if !style.fg.is_transparent() {
            queue!(self.writer, SetForegroundColor(to_color(style.fg)))?;
        }
        if !style.bg.is_transparent() {
            queue!(self.writer, SetBackgroundColor(to_color(style.bg)))?;
        }
        for (flag, attribute) in [
            (StyleFlags::BOLD, Attribute::Bold),
            (StyleFlags::DIM, Attribute::Dim),
            (StyleFlags::ITALIC, Attribute::Italic),
            (StyleFlags::UNDERLINE, Attribute::Underlined),
            (StyleFlags::REVERSE, Attribute::Reverse),
        ] {
            if style.flags.contains(flag) {
                queue!(self.writer, SetAttribute(attribute))?;
            }
        }

        self.current_style = Some(style);
        Ok(())
    }

    fn move_cursor_to(&mut self, x: u16, y: u16) -> io::Result<()> {
        if self.cursor == Some((x, y)) {
            return Ok(());
        }
        queue!(self.writer, MoveTo(x, y.saturating_add(self.origin_y)))?;
        self.cursor = Some((x, y));
        Ok(())
    }

    /// Flush and return the underlying writer.
    pub fn into_inner(self) -> io::Result<W> {
        self.writer.into_inner().map_err(|err| err.into_error())
    }
}
