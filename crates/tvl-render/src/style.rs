#![forbid(unsafe_code)]

//! Optional style overlays applied to cells.

use crate::cell::{Cell, PackedRgba, StyleFlags};

/// A partial style: unset fields leave the underlying cell untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Style {
    /// Foreground color override.
    pub fg: Option<PackedRgba>,
    /// Background color override.
    pub bg: Option<PackedRgba>,
    /// Flags added to the cell.
    pub flags: StyleFlags,
}

impl Style {
    /// An empty style.
    pub const fn new() -> Self {
        Self {
            fg: None,
            bg: None,
            flags: StyleFlags::empty(),
        }
    }

    /// Set the foreground color.
    #[must_use]
    pub const fn fg(mut self, color: PackedRgba) -> Self {
        self.fg = Some(color);
        self
    }

    /// Set the background color.
    #[must_use]
    pub const fn bg(mut self, color: PackedRgba) -> Self {
        self.bg = Some(color);
        self
    }

    /// Add bold.
    #[must_use]
    pub fn bold(mut self) -> Self {
        self.flags |= StyleFlags::BOLD;
        self
    }

    /// Add dim.
    #[must_use]
    pub fn dim(mut self) -> Self {
        self.flags |= StyleFlags::DIM;
        self
    }

    /// Whether applying this style would change nothing.
    pub fn is_empty(&self) -> bool {
        self.fg.is_none() && self.bg.is_none() && self.flags.is_empty()
    }

    /// Layer `other` on top of `self`.
    #[must_use]
    pub fn patch(self, other: Style) -> Self {
        Self {
            fg: other.fg.or(self.fg),
            bg: other.bg.or(self.bg),
            flags: self.flags | other.flags,
        }
    }

    /// Apply this style to a cell in place.
    pub fn apply_to(&self, cell: &mut Cell) {
        if let Some(fg) = self.fg {
            cell.fg = fg;
        }
        if let Some(bg) = self.bg {
            cell.bg = bg;
        }
        cell.flags |= self.flags;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_style_leaves_cell_alone() {
        let mut cell = Cell::from_char('a').with_fg(PackedRgba::GREEN);
        Style::new().apply_to(&mut cell);
        assert_eq!(cell.fg, PackedRgba::GREEN);
        assert!(Style::new().is_empty());
    }

    #[test]
    fn patch_prefers_overlay() {
        let base = Style::new().fg(PackedRgba::WHITE).bold();
        let merged = base.patch(Style::new().fg(PackedRgba::RED).dim());
        assert_eq!(merged.fg, Some(PackedRgba::RED));
        assert!(merged.flags.contains(StyleFlags::BOLD | StyleFlags::DIM));
    }

    #[test]
    fn apply_sets_colors_and_flags() {
        let mut cell = Cell::from_char('a');
        Style::new()
            .bg(PackedRgba::BLACK)
            .bold()
            .apply_to(&mut cell);
        assert_eq!(cell.bg, PackedRgba::BLACK);
        assert!(cell.flags.contains(StyleFlags::BOLD));
    }
}
