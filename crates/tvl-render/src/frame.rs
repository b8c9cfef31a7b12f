#![forbid(unsafe_code)]

//! Frame: the render target handed to widgets.

use tvl_core::geometry::Rect;

use crate::buffer::Buffer;

/// A frame being drawn.
///
/// Widgets write into [`Frame::buffer`]; the runtime diffs it against the
/// previous frame and presents the changes.
#[derive(Debug, Clone, Default)]
pub struct Frame {
    /// The cell grid for this frame.
    pub buffer: Buffer,
    /// Cursor position to show after presenting, if any.
    pub cursor_position: Option<(u16, u16)>,
}

impl Frame {
    /// Create a blank frame.
    pub fn new(width: u16, height: u16) -> Self {
        Self::from_buffer(Buffer::new(width, height))
    }

    /// Wrap an existing buffer.
    pub fn from_buffer(buffer: Buffer) -> Self {
        Self {
            buffer,
            cursor_position: None,
        }
    }

    /// Frame width in cells.
    #[inline]
    pub fn width(&self) -> u16 {
        self.buffer.width()
    }

    /// Frame height in cells.
    #[inline]
    pub fn height(&self) -> u16 {
        self.buffer.height()
    }

    /// The full frame area.
    #[inline]
    pub fn bounds(&self) -> Rect {
        self.buffer.bounds()
    }

    /// Blank every cell and hide the cursor.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.cursor_position = None;
    }

    /// Set or hide the cursor.
    pub fn set_cursor(&mut self, position: Option<(u16, u16)>) {
        self.cursor_position = position;
    }

    /// Consume the frame and return its buffer.
    pub fn into_buffer(self) -> Buffer {
        self.buffer
    }
}
