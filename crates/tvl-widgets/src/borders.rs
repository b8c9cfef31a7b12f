#![forbid(unsafe_code)]

//! Border sides and glyph sets.

use bitflags::bitflags;

bitflags! {
    /// Which sides of a block draw a border.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Borders: u8 {
        const NONE   = 0b0000;
        const TOP    = 0b0001;
        const RIGHT  = 0b0010;
        const BOTTOM = 0b0100;
        const LEFT   = 0b1000;
        const ALL    = Self::TOP.bits() | Self::RIGHT.bits() | Self::BOTTOM.bits() | Self::LEFT.bits();
    }
}

/// Glyphs used to draw a border.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BorderSet {
    pub top_left: char,
    pub top_right: char,
    pub bottom_left: char,
    pub bottom_right: char,
    pub horizontal: char,
    pub vertical: char,
}

impl BorderSet {
    pub const SQUARE: Self = Self {
        top_left: '┌',
        top_right: '┐',
        bottom_left: '└',
        bottom_right: '┘',
        horizontal: '─',
        vertical: '│',
    };

    pub const ROUNDED: Self = Self {
        top_left: '╭',
        top_right: '╮',
        bottom_left: '╰',
        bottom_right: '╯',
        ..Self::SQUARE
    };

    pub const DOUBLE: Self = Self {
        top_left: '╔',
        top_right: '╗',
        bottom_left: '╚',
        bottom_right: '╝',
        horizontal: '═',
        vertical: '║',
    };

    pub const ASCII: Self = Self {
        top_left: '+',
        top_right: '+',
        bottom_left: '+',
        bottom_right: '+',
        horizontal: '-',
        vertical: '|',
    };
}

/// Named border styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BorderType {
    #[default]
    Square,
    Rounded,
    Double,
    Ascii,
}

impl BorderType {
    /// The glyph set for this style.
    pub const fn to_border_set(self) -> BorderSet {
        match self {
            Self::Square => BorderSet::SQUARE,
            Self::Rounded => BorderSet::ROUNDED,
            Self::Double => BorderSet::DOUBLE,
            Self::Ascii => BorderSet::ASCII,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_contains_every_side() {
        assert!(Borders::ALL.contains(Borders::TOP | Borders::RIGHT | Borders::BOTTOM | Borders::LEFT));
    }

    #[test]
    fn rounded_keeps_square_edges() {
        let set = BorderType::Rounded.to_border_set();
        assert_eq!(set.horizontal, '─');
        assert_eq!(set.top_left, '╭');
    }
}
