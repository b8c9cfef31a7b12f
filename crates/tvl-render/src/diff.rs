#![forbid(unsafe_code)]

//! Buffer diffing.
//!
//! A [`BufferDiff`] lists the cells that differ between two frames so the
//! presenter only touches what changed.

use crate::buffer::Buffer;

/// A contiguous run of changed cells on one row (inclusive on both ends).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeRun {
    /// Row.
    pub y: u16,
    /// First changed column.
    pub x0: u16,
    /// Last changed column.
    pub x1: u16,
}

impl ChangeRun {
    /// Create a run.
    #[inline]
    pub const fn new(y: u16, x0: u16, x1: u16) -> Self {
        Self { y, x0, x1 }
    }

    /// Number of cells covered.
    #[inline]
    pub const fn len(&self) -> u16 {
        self.x1 - self.x0 + 1
    }

    /// Runs always cover at least one cell.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        false
    }
}

/// Changed cell positions between two buffers, in row-major order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BufferDiff {
    changes: Vec<(u16, u16)>,
}

impl BufferDiff {
    /// Compute the diff between two buffers.
    ///
    /// Buffers of different sizes produce a full diff of `new`.
    pub fn compute(old: &Buffer, new: &Buffer) -> Self {
        #[cfg(feature = "tracing")]
        let _span =
            tracing::debug_span!("diff_compute", width = new.width(), height = new.height())
                .entered();

        if old.width() != new.width() || old.height() != new.height() {
            return Self::full(new);
        }

        let mut changes = Vec::new();
        for y in 0..new.height() {
            for (x, (a, b)) in old.row_cells(y).iter().zip(new.row_cells(y)).enumerate() {
                if a != b {
                    changes.push((x as u16, y));
                }
            }
        }

        #[cfg(feature = "tracing")]
        tracing::trace!(changes = changes.len(), "diff computed");

        Self { changes }
    }

    /// A diff covering every cell of `buffer`.
    pub fn full(buffer: &Buffer) -> Self {
        let mut changes = Vec::with_capacity(buffer.len());
        for y in 0..buffer.height() {
            for x in 0..buffer.width() {
                changes.push((x, y));
            }
        }
        Self { changes }
    }

    /// Number of changed cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Check if no cells changed.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Changed positions as `(x, y)`.
    #[inline]
    pub fn changes(&self) -> &[(u16, u16)] {
        &self.changes
    }

    /// Coalesce consecutive columns on the same row into runs.
    pub fn runs(&self) -> Vec<ChangeRun> {
        let mut runs: Vec<ChangeRun> = Vec::new();
        for &(x, y) in &self.changes {
            match runs.last_mut() {
                Some(run) if run.y == y && run.x1.checked_add(1) == Some(x) => run.x1 = x,
                _ => runs.push(ChangeRun::new(y, x, x)),
            }
        }
        runs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::Cell;

    #[test]
    fn identical_buffers_have_empty_diff() {
        let a = Buffer::new(4, 2);
        assert!(BufferDiff::compute(&a, &a.clone()).is_empty());
    }

    #[test]
    fn changed_cells_are_listed_row_major() {
        let old = Buffer::new(4, 2);
        let mut new = old.clone();
        new.set(3, 0, Cell::from_char('a'));
        new.set(0, 1, Cell::from_char('b'));
        let diff = BufferDiff::compute(&old, &new);
        assert_eq!(diff.changes(), &[(3, 0), (0, 1)]);
    }

    #[test]
    fn runs_coalesce_adjacent_columns() {
        let old = Buffer::new(6, 2);
        let mut new = old.clone();
        for x in 1..4 {
            new.set(x, 0, Cell::from_char('x'));
        }
        new.set(5, 0, Cell::from_char('y'));
        new.set(0, 1, Cell::from_char('z'));
        let runs = BufferDiff::compute(&old, &new).runs();
        assert_eq!(
            runs,
            vec![
                ChangeRun::new(0, 1, 3),
                ChangeRun::new(0, 5, 5),
                ChangeRun::new(1, 0, 0),
            ]
        );
        assert_eq!(runs[0].len(), 3);
    }

    #[test]
    fn size_change_yields_full_diff() {
        let diff = BufferDiff::compute(&Buffer::new(2, 2), &Buffer::new(3, 1));
        assert_eq!(diff.len(), 3);
        assert_eq!(diff.runs(), vec![ChangeRun::new(0, 0, 2)]);
    }
}
