#![forbid(unsafe_code)]

//! Buffer grid storage.
//!
//! The `Buffer` is a 2D grid of [`Cell`]s in row-major order. Writes outside
//! the grid are ignored, and wide characters are written atomically: either
//! the head and its continuation cells all land, or nothing does.

use tvl_core::geometry::Rect;

use crate::cell::{Cell, CellContent};

/// A 2D grid of terminal cells.
///
/// # Example
///
/// ```
/// use tvl_render::buffer::Buffer;
/// use tvl_render::cell::Cell;
///
/// let mut buffer = Buffer::new(80, 24);
/// buffer.set(0, 0, Cell::from_char('H'));
/// buffer.set(1, 0, Cell::from_char('i'));
/// assert_eq!(buffer.to_text(), "Hi");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Buffer {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl Buffer {
    /// Create a new buffer with the given dimensions.
    ///
    /// Zero dimensions are raised to one so the grid is never empty.
    pub fn new(width: u16, height: u16) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        Self {
            width,
            height,
            cells: vec![Cell::default(); width as usize * height as usize],
        }
    }

    /// Buffer width in cells.
    #[inline]
    pub const fn width(&self) -> u16 {
        self.width
    }

    /// Buffer height in cells.
    #[inline]
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// The full buffer area.
    #[inline]
    pub const fn bounds(&self) -> Rect {
        Rect::from_size(self.width, self.height)
    }

    /// Total number of cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Always false; buffers hold at least one cell.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[inline]
    fn index(&self, x: u16, y: u16) -> Option<usize> {
        (x < self.width && y < self.height).then(|| y as usize * self.width as usize + x as usize)
    }

    /// Get the cell at (x, y).
    #[inline]
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        self.index(x, y).map(|idx| &self.cells[idx])
    }

    /// Get a mutable reference to the cell at (x, y).
    #[inline]
    pub fn get_mut(&mut self, x: u16, y: u16) -> Option<&mut Cell> {
        self.index(x, y).map(|idx| &mut self.cells[idx])
    }

    /// Cells of row `y`, or an empty slice when out of range.
    pub fn row_cells(&self, y: u16) -> &[Cell] {
        if y >= self.height {
            return &[];
        }
        let start = y as usize * self.width as usize;
        &self.cells[start..start + self.width as usize]
    }

    /// Set the cell at (x, y).
    ///
    /// Out-of-bounds writes are ignored. A transparent background keeps the
    /// background already in place. Wide characters also claim the cells to
    /// their right; if any of those fall outside the buffer nothing is written.
    pub fn set(&mut self, x: u16, y: u16, cell: Cell) {
        let width = cell.content.width().max(1);
        let Some(last_x) = x.checked_add(width as u16 - 1) else {
            return;
        };
        if last_x >= self.width || y >= self.height {
            return;
        }

        let Some(idx) = self.index(x, y) else {
            return;
        };
        self.orphan_wide_head(x, y);

        let existing_bg = self.cells[idx].bg;
        let mut cell = cell;
        if cell.bg.is_transparent() {
            cell.bg = existing_bg;
        }
        self.cells[idx] = cell;

        for offset in 1..width as u16 {
            if let Some(tail) = self.index(x + offset, y) {
                self.cells[tail] = Cell {
                    bg: cell.bg,
                    ..Cell::CONTINUATION
                };
            }
        }

        // Tails left over from a wider character previously written here.
        let mut next = last_x.saturating_add(1);
        while let Some(idx) = self.index(next, y) {
            if !self.cells[idx].is_continuation() {
                break;
            }
            self.cells[idx].content = CellContent::Empty;
            next += 1;
        }
    }

    /// Overwriting a continuation cell breaks the wide char that owns it.
    fn orphan_wide_head(&mut self, x: u16, y: u16) {
        let mut cx = x;
        while let Some(idx) = self.index(cx, y) {
            if !self.cells[idx].is_continuation() {
                break;
            }
            let Some(prev) = cx.checked_sub(1) else {
                break;
            };
            cx = prev;
        }
        if cx == x {
            return;
        }
        for clear_x in cx..x {
            if let Some(idx) = self.index(clear_x, y) {
                self.cells[idx].content = CellContent::Empty;
            }
        }
    }

    /// Fill a rectangular region with the given cell.
    pub fn fill(&mut self, rect: Rect, cell: Cell) {
        let clipped = self.bounds().intersection(&rect);
        for y in clipped.y..clipped.bottom() {
            for x in clipped.x..clipped.right() {
                if let Some(idx) = self.index(x, y) {
                    self.cells[idx] = cell;
                }
            }
        }
    }

    /// Reset every cell to the default.
    pub fn clear(&mut self) {
        self.cells.fill(Cell::default());
    }

    /// Text of row `y` with trailing blanks removed.
    pub fn row_text(&self, y: u16) -> String {
        let mut line = String::with_capacity(self.width as usize);
        for cell in self.row_cells(y) {
            match cell.content {
                CellContent::Char(c) => line.push(c),
                CellContent::Empty => line.push(' '),
                CellContent::Continuation => {}
            }
        }
        line.truncate(line.trim_end().len());
        line
    }

    /// Plain-text snapshot of the whole buffer.
    ///
    /// Trailing blanks on each row and trailing empty rows are dropped.
    pub fn to_text(&self) -> String {
        let mut lines: Vec<String> = (0..self.height).map(|y| self.row_text(y)).collect();
        while lines.last().is_some_and(String::is_empty) {
            lines.pop();
        }
        lines.join("\n")
    }
}

impl Default for Buffer {
    fn default() -> Self {
        Self::new(1, 1)
    }
}
