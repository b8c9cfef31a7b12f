#![forbid(unsafe_code)]

//! Render kernel: cells, buffers, diffs, and ANSI presentation.

pub mod buffer;
pub mod cell;
pub mod diff;
pub mod frame;
pub mod presenter;
pub mod style;

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Display width of a single grapheme cluster, clamped to 0..=2.
#[inline]
pub fn grapheme_width(grapheme: &str) -> usize {
    if grapheme.len() == 1 {
        let b = grapheme.as_bytes()[0];
        return usize::from((0x20..=0x7E).contains(&b));
    }
    grapheme.width().min(2)
}

/// Display width of a string in terminal columns.
#[inline]
pub fn display_width(text: &str) -> usize {
    if text.bytes().all(|b| (0x20..=0x7E).contains(&b)) {
        return text.len();
    }
    text.graphemes(true).map(grapheme_width).sum()
}
