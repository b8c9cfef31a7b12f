#![forbid(unsafe_code)]

//! Geometric primitives.

/// A rectangle for layout bounds and clipping.
///
/// Uses terminal coordinates (0-indexed, origin at top-left).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    /// Left edge (inclusive).
    pub x: u16,
    /// Top edge (inclusive).
    pub y: u16,
    /// Width in cells.
    pub width: u16,
    /// Height in cells.
    pub height: u16,
}

impl Rect {
    /// Create a new rectangle.
    #[inline]
    pub const fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a rectangle from origin with given size.
    #[inline]
    pub const fn from_size(width: u16, height: u16) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Right edge (exclusive).
    #[inline]
    pub const fn right(&self) -> u16 {
        self.x.saturating_add(self.width)
    }

    /// Bottom edge (exclusive).
    #[inline]
    pub const fn bottom(&self) -> u16 {
        self.y.saturating_add(self.height)
    }

    /// Area in cells.
    #[inline]
    pub const fn area(&self) -> u32 {
        self.width as u32 * self.height as u32
    }

    /// Check if the rectangle has zero area.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Check if a point is inside the rectangle.
    #[inline]
    pub const fn contains(&self, x: u16, y: u16) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Compute the intersection with another rectangle.
    ///
    /// Returns an empty rectangle if the rectangles don't overlap.
    #[inline]
    pub fn intersection(&self, other: &Rect) -> Rect {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        if x < right && y < bottom {
            Rect::new(x, y, right - x, bottom - y)
        } else {
            Rect::default()
        }
    }

    /// Create a new rectangle inside the current one with the given margin.
    pub fn inner(&self, margin: Sides) -> Rect {
        Rect {
            x: self.x.saturating_add(margin.left),
            y: self.y.saturating_add(margin.top),
            width: self.width.saturating_sub(margin.horizontal_sum()),
            height: self.height.saturating_sub(margin.vertical_sum()),
        }
    }

    /// Split off the top `rows` rows.
    ///
    /// Returns `(top, rest)`. When `rows` exceeds the height, `rest` is empty.
    pub fn split_top(&self, rows: u16) -> (Rect, Rect) {
        let rows = rows.min(self.height);
        let top = Rect::new(self.x, self.y, self.width, rows);
        let rest = Rect::new(
            self.x,
            self.y.saturating_add(rows),
            self.width,
            self.height - rows,
        );
        (top, rest)
    }

    /// Split into two side-by-side columns separated by `gap` cells.
    ///
    /// The left column receives the extra cell when the width is odd.
    pub fn split_columns(&self, gap: u16) -> (Rect, Rect) {
        let usable = self.width.saturating_sub(gap);
        let right_width = usable / 2;
        let left_width = usable - right_width;
        let left = Rect::new(self.x, self.y, left_width, self.height);
        let right = Rect::new(
            self.x.saturating_add(left_width).saturating_add(gap),
            self.y,
            right_width,
            self.height,
        );
        (left, right)
    }

    /// A rectangle of at most `width` columns centered horizontally in `self`.
    pub fn centered_columns(&self, width: u16) -> Rect {
        let width = width.min(self.width);
        let offset = (self.width - width) / 2;
        Rect::new(self.x.saturating_add(offset), self.y, width, self.height)
    }
}

/// Sides for padding and margins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Sides {
    pub top: u16,
    pub right: u16,
    pub bottom: u16,
    pub left: u16,
}

impl Sides {
    /// Create new sides with equal values.
    pub const fn all(val: u16) -> Self {
        Self {
            top: val,
            right: val,
            bottom: val,
            left: val,
        }
    }

    /// Create new sides with horizontal values only.
    pub const fn horizontal(val: u16) -> Self {
        Self {
            top: 0,
            right: val,
            bottom: 0,
            left: val,
        }
    }

    /// Sum of left and right.
    #[inline]
    pub const fn horizontal_sum(&self) -> u16 {
        self.left.saturating_add(self.right)
    }

    /// Sum of top and bottom.
    #[inline]
    pub const fn vertical_sum(&self) -> u16 {
        self.top.saturating_add(self.bottom)
    }
}

#[cfg(test)]
mod tests {
    use super::{Rect, Sides};

    #[test]
    fn rect_contains_edges() {
        let rect = Rect::new(2, 3, 4, 5);
        assert!(rect.contains(2, 3));
        assert!(rect.contains(5, 7));
        assert!(!rect.contains(6, 3));
        assert!(!rect.contains(2, 8));
    }

    #[test]
    fn rect_intersection_overlaps() {
        let a = Rect::new(0, 0, 4, 4);
        let b = Rect::new(2, 2, 4, 4);
        assert_eq!(a.intersection(&b), Rect::new(2, 2, 2, 2));
    }

    #[test]
    fn rect_intersection_no_overlap_is_empty() {
        let a = Rect::new(0, 0, 2, 2);
        let b = Rect::new(3, 3, 2, 2);
        assert_eq!(a.intersection(&b), Rect::default());
    }

    #[test]
    fn rect_inner_reduces() {
        let rect = Rect::new(0, 0, 10, 10);
        let inner = rect.inner(Sides {
            top: 1,
            right: 2,
            bottom: 3,
            left: 4,
        });
        assert_eq!(inner, Rect::new(4, 1, 4, 6));
    }

    #[test]
    fn rect_inner_saturates_on_oversized_margin() {
        let inner = Rect::new(0, 0, 3, 3).inner(Sides::all(5));
        assert!(inner.is_empty());
    }

    #[test]
    fn split_top_clamps_to_height() {
        let (top, rest) = Rect::new(1, 1, 10, 4).split_top(6);
        assert_eq!(top, Rect::new(1, 1, 10, 4));
        assert!(rest.is_empty());
    }

    #[test]
    fn split_top_partitions_rows() {
        let (top, rest) = Rect::new(0, 2, 8, 10).split_top(3);
        assert_eq!(top, Rect::new(0, 2, 8, 3));
        assert_eq!(rest, Rect::new(0, 5, 8, 7));
    }

    #[test]
    fn split_columns_odd_width_favors_left() {
        let (left, right) = Rect::new(0, 0, 21, 5).split_columns(2);
        assert_eq!(left, Rect::new(0, 0, 10, 5));
        assert_eq!(right, Rect::new(12, 0, 9, 5));
    }

    #[test]
    fn centered_columns_narrower_than_area() {
        let centered = Rect::new(0, 0, 80, 10).centered_columns(60);
        assert_eq!(centered, Rect::new(10, 0, 60, 10));
    }

    #[test]
    fn centered_columns_wider_than_area_fills_it() {
        let area = Rect::new(4, 1, 30, 3);
        assert_eq!(area.centered_columns(100), area);
    }

    #[test]
    fn sides_sums() {
        let sides = Sides::horizontal(2);
        assert_eq!(sides.horizontal_sum(), 4);
        assert_eq!(sides.vertical_sum(), 0);
    }
}
