#![forbid(unsafe_code)]

//! Cell types: content, colors, and style flags.

use unicode_width::UnicodeWidthChar;

/// A compact RGBA color.
///
/// Layout is `0xRRGGBBAA`. Alpha is used only as a presence marker: zero means
/// "inherit", anything else is emitted as an opaque color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[repr(transparent)]
pub struct PackedRgba(pub u32);

impl PackedRgba {
    /// Fully transparent (alpha = 0).
    pub const TRANSPARENT: Self = Self(0);
    /// Opaque black.
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// Opaque white.
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    /// Opaque red.
    pub const RED: Self = Self::rgb(255, 0, 0);
    /// Opaque green.
    pub const GREEN: Self = Self::rgb(0, 255, 0);

    /// Create an opaque RGB color (alpha = 255).
    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    /// Create an RGBA color with explicit alpha.
    #[inline]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self(((r as u32) << 24) | ((g as u32) << 16) | ((b as u32) << 8) | (a as u32))
    }

    /// Red channel.
    #[inline]
    pub const fn r(self) -> u8 {
        (self.0 >> 24) as u8
    }

    /// Green channel.
    #[inline]
    pub const fn g(self) -> u8 {
        (self.0 >> 16) as u8
    }

    /// Blue channel.
    #[inline]
    pub const fn b(self) -> u8 {
        (self.0 >> 8) as u8
    }

    /// Alpha channel.
    #[inline]
    pub const fn a(self) -> u8 {
        self.0 as u8
    }

    /// Whether this color is set at all.
    #[inline]
    pub const fn is_transparent(self) -> bool {
        self.a() == 0
    }
}

bitflags::bitflags! {
    /// 8-bit cell style flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct StyleFlags: u8 {
        /// Bold / increased intensity.
        const BOLD          = 0b0000_0001;
        /// Dim / decreased intensity.
        const DIM           = 0b0000_0010;
        /// Italic text.
        const ITALIC        = 0b0000_0100;
        /// Underlined text.
        const UNDERLINE     = 0b0000_1000;
        /// Reverse video (swap fg/bg).
        const REVERSE       = 0b0010_0000;
    }
}

/// What a cell displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum CellContent {
    /// Nothing drawn; presented as a space.
    #[default]
    Empty,
    /// A single scalar value.
    Char(char),
    /// Tail of a wide character owned by the cell to the left.
    Continuation,
}

impl CellContent {
    /// The character, if this cell holds one.
    #[inline]
    pub const fn as_char(&self) -> Option<char> {
        match self {
            Self::Char(c) => Some(*c),
            _ => None,
        }
    }

    /// Display width in columns.
    #[inline]
    pub fn width(&self) -> usize {
        match self {
            Self::Empty => 1,
            Self::Char(c) => c.width().unwrap_or(0).clamp(1, 2),
            Self::Continuation => 0,
        }
    }
}

/// A single terminal cell.
///
/// The default cell is empty with a transparent background, white
/// foreground, and no style attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    /// Character content.
    pub content: CellContent,
    /// Foreground color.
    pub fg: PackedRgba,
    /// Background color.
    pub bg: PackedRgba,
    /// Style flags.
    pub flags: StyleFlags,
}

impl Default for Cell {
    fn default() -> Self {
        Self::new(CellContent::Empty)
    }
}

impl Cell {
    /// A continuation cell (placeholder for wide characters).
    pub const CONTINUATION: Self = Self {
        content: CellContent::Continuation,
        fg: PackedRgba::TRANSPARENT,
        bg: PackedRgba::TRANSPARENT,
        flags: StyleFlags::empty(),
    };

    /// Create a new cell with the given content and default colors.
    #[inline]
    pub const fn new(content: CellContent) -> Self {
        Self {
            content,
            fg: PackedRgba::WHITE,
            bg: PackedRgba::TRANSPARENT,
            flags: StyleFlags::empty(),
        }
    }

    /// Create a cell from a single character.
    #[inline]
    pub const fn from_char(c: char) -> Self {
        Self::new(CellContent::Char(c))
    }

    /// Whether this is the tail of a wide character.
    #[inline]
    pub const fn is_continuation(&self) -> bool {
        matches!(self.content, CellContent::Continuation)
    }

    /// Set the foreground color.
    #[must_use]
    pub const fn with_fg(mut self, fg: PackedRgba) -> Self {
        self.fg = fg;
        self
    }

    /// Set the background color.
    #[must_use]
    pub const fn with_bg(mut self, bg: PackedRgba) -> Self {
        self.bg = bg;
        self
    }

    /// Set the style flags.
    #[must_use]
    pub const fn with_flags(mut self, flags: StyleFlags) -> Self {
        self.flags = flags;
        self
    }
}
