//! Differential renderer: turns two grid snapshots (or a dirty-cell
//! tracker) into the minimal set of draw/scroll operations a host needs to
//! repaint.
//!
//! Hosts never receive synchronous render callbacks; instead `GridDiff`
//! produces a `Patch` value describing what changed, which the host applies
//! (or ignores) at its own pace.

use crate::cell::Cell;
use crate::grid::Grid;

/// A single cell that changed between two grid snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellUpdate {
    pub row: u16,
    pub col: u16,
    pub cell: Cell,
}

/// A maximal horizontal run of changed cells within one row, half-open
/// `[start_col, end_col)`. Produced by [`Patch::runs`] for hosts that want to
/// batch contiguous cell updates into a single draw call instead of
/// processing [`CellUpdate`]s one at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirtySpan {
    pub row: u16,
    pub start_col: u16,
    pub end_col: u16,
}

/// A detected scroll: `count` rows starting at `first_row` moved by `offset`
/// rows (negative = upward/scroll-up, positive = downward/scroll-down).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeRun {
    pub first_row: u16,
    pub count: u16,
    pub offset: i32,
}

/// The result of a diff: the cells that changed, any detected scroll blocks,
/// and an optional cursor-visibility toggle. Reusable across calls via
/// [`GridDiff::diff_into`] to avoid reallocating on every frame.
#[derive(Debug, Clone)]
pub struct Patch {
    pub updates: Vec<CellUpdate>,
    pub scrolls: Vec<ChangeRun>,
    pub cursor_visible: Option<bool>,
    cols: u16,
    rows: u16,
}

impl Patch {
    #[must_use]
    pub fn new(cols: u16, rows: u16) -> Self {
        Self {
            updates: Vec::new(),
            scrolls: Vec::new(),
            cursor_visible: None,
            cols,
            rows,
        }
    }

    /// Number of individual cell updates carried by this patch.
    #[must_use]
    pub fn len(&self) -> usize {
        self.updates.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.updates.is_empty() && self.scrolls.is_empty() && self.cursor_visible.is_none()
    }

    pub fn clear(&mut self) {
        self.updates.clear();
        self.scrolls.clear();
        self.cursor_visible = None;
    }

    #[must_use]
    pub fn cols(&self) -> u16 {
        self.cols
    }

    #[must_use]
    pub fn rows(&self) -> u16 {
        self.rows
    }

    /// Coalesce the per-cell updates into maximal contiguous runs per row,
    /// assuming `updates` is sorted by `(row, col)` (true for anything built
    /// by [`GridDiff::diff`]/[`GridDiff::diff_into`]).
    #[must_use]
    pub fn runs(&self) -> Vec<DirtySpan> {
        let mut spans: Vec<DirtySpan> = Vec::new();
        for update in &self.updates {
            if let Some(last) = spans.last_mut()
                && last.row == update.row
                && last.end_col == update.col
            {
                last.end_col = update.col + 1;
                continue;
            }
            spans.push(DirtySpan {
                row: update.row,
                start_col: update.col,
                end_col: update.col + 1,
            });
        }
        spans
    }
}

/// Governs whether a detected scroll run is reported to the host as a
/// [`ChangeRun`] (a cheap blit the host can implement with a memmove/scroll
/// primitive) or left for the plain cell diff to repaint row by row.
///
/// Blitting only pays off when a minority of the viewport moved; once most of
/// the screen scrolled, redrawing every row is no more expensive and skips
/// the blit-then-patch-the-remainder dance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollPolicy {
    /// Always report scroll runs as [`ChangeRun`]s, regardless of size.
    Always,
    /// Report a scroll run only when it covers at most half the viewport's
    /// rows; larger scrolls fall through to the ordinary cell diff.
    #[default]
    Sometimes,
    /// Never report scroll runs; every scroll is repainted as plain cell
    /// updates by the diff.
    Never,
}

/// Per-cell dirty bookkeeping between successive diffs. A cell that was
/// written since the tracker was last cleared is considered dirty and is a
/// candidate for [`GridDiff::diff_dirty`].
#[derive(Debug, Clone)]
pub struct DirtyTracker {
    cols: u16,
    rows: u16,
    dirty: Vec<bool>,
    scroll_policy: ScrollPolicy,
}

impl DirtyTracker {
    #[must_use]
    pub fn new(cols: u16, rows: u16) -> Self {
        Self {
            cols,
            rows,
            dirty: vec![false; (cols as usize) * (rows as usize)],
            scroll_policy: ScrollPolicy::default(),
        }
    }

    #[must_use]
    pub fn scroll_policy(&self) -> ScrollPolicy {
        self.scroll_policy
    }

    pub fn set_scroll_policy(&mut self, policy: ScrollPolicy) {
        self.scroll_policy = policy;
    }

    /// Whether a scroll of `count` rows should be reported as a
    /// [`ChangeRun`] under the tracker's current [`ScrollPolicy`].
    #[must_use]
    pub fn should_blit_scroll(&self, count: u16) -> bool {
        match self.scroll_policy {
            ScrollPolicy::Always => true,
            ScrollPolicy::Never => false,
            ScrollPolicy::Sometimes => (count as u32) * 2 <= self.rows as u32,
        }
    }

    #[must_use]
    pub fn cols(&self) -> u16 {
        self.cols
    }

    #[must_use]
    pub fn rows(&self) -> u16 {
        self.rows
    }

    fn index(&self, row: u16, col: u16) -> Option<usize> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        Some(row as usize * self.cols as usize + col as usize)
    }

    pub fn mark_cell(&mut self, row: u16, col: u16) {
        if let Some(idx) = self.index(row, col) {
            self.dirty[idx] = true;
        }
    }

    pub fn mark_row(&mut self, row: u16) {
        for col in 0..self.cols {
            self.mark_cell(row, col);
        }
    }

    pub fn mark_all(&mut self) {
        self.dirty.fill(true);
    }

    #[must_use]
    pub fn is_dirty(&self, row: u16, col: u16) -> bool {
        self.index(row, col).is_some_and(|idx| self.dirty[idx])
    }

    pub fn clear(&mut self) {
        self.dirty.fill(false);
    }

    /// Iterate over every cell position currently marked dirty, in
    /// row-major order.
    pub fn marked_cells(&self) -> impl Iterator<Item = (u16, u16)> + '_ {
        let cols = self.cols;
        self.dirty
            .iter()
            .enumerate()
            .filter(|(_, &d)| d)
            .map(move |(idx, _)| {
                let idx = idx as u16;
                (idx / cols, idx % cols)
            })
    }
}

/// Stateless diffing between two grid snapshots.
pub struct GridDiff;

impl GridDiff {
    /// Diff `old` against `new`, allocating a fresh [`Patch`].
    #[must_use]
    pub fn diff(old: &Grid, new: &Grid) -> Patch {
        let mut patch = Patch::new(new.cols(), new.rows());
        Self::diff_into(old, new, &mut patch);
        patch
    }

    /// Diff into a caller-owned `Patch`, reusing its backing storage.
    pub fn diff_into(old: &Grid, new: &Grid, patch: &mut Patch) {
        patch.clear();
        patch.cols = new.cols();
        patch.rows = new.rows();

        let rows = new.rows().min(old.rows());
        let cols = new.cols().min(old.cols());
        for row in 0..rows {
            for col in 0..cols {
                let (Some(prev), Some(next)) = (old.cell(row, col), new.cell(row, col)) else {
                    continue;
                };
                if prev != next {
                    patch.updates.push(CellUpdate {
                        row,
                        col,
                        cell: *next,
                    });
                }
            }
        }
    }

    /// Diff only the cells a [`DirtyTracker`] has marked, skipping the full
    /// `old` vs `new` scan. Cheaper than [`GridDiff::diff`] when a caller
    /// already knows which cells were touched (e.g. the parser's apply
    /// layer marking cells as it writes them).
    #[must_use]
    pub fn diff_dirty(old: &Grid, new: &Grid, tracker: &DirtyTracker) -> Patch {
        let mut patch = Patch::new(new.cols(), new.rows());
        for (row, col) in tracker.marked_cells() {
            if row >= new.rows() || col >= new.cols() {
                continue;
            }
            let (Some(prev), Some(next)) = (old.cell(row, col), new.cell(row, col)) else {
                continue;
            };
            if prev != next {
                patch.updates.push(CellUpdate {
                    row,
                    col,
                    cell: *next,
                });
            }
        }
        patch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::Cell;

    #[test]
    fn diff_empty_grids_produces_no_updates() {
        let a = Grid::new(10, 3);
        let b = Grid::new(10, 3);
        let patch = GridDiff::diff(&a, &b);
        assert!(patch.is_empty());
    }

    #[test]
    fn diff_detects_single_cell_change() {
        let a = Grid::new(5, 2);
        let mut b = a.clone();
        b.cell_mut(1, 2).unwrap().set_content('X', 1);

        let patch = GridDiff::diff(&a, &b);
        assert_eq!(patch.len(), 1);
        assert_eq!(patch.updates[0].row, 1);
        assert_eq!(patch.updates[0].col, 2);
        assert_eq!(patch.updates[0].cell.content(), 'X');
    }

    #[test]
    fn diff_into_reuses_patch_storage() {
        let a = Grid::new(5, 2);
        let mut b = a.clone();
        b.cell_mut(0, 0).unwrap().set_content('A', 1);

        let mut patch = Patch::new(5, 2);
        GridDiff::diff_into(&a, &b, &mut patch);
        assert_eq!(patch.len(), 1);

        // A second diff against identical grids should clear the old patch.
        GridDiff::diff_into(&a, &a, &mut patch);
        assert!(patch.is_empty());
    }

    #[test]
    fn diff_dirty_only_considers_marked_cells() {
        let a = Grid::new(5, 2);
        let mut b = a.clone();
        b.cell_mut(0, 0).unwrap().set_content('A', 1);
        b.cell_mut(1, 1).unwrap().set_content('B', 1);

        let mut tracker = DirtyTracker::new(5, 2);
        tracker.mark_cell(0, 0);

        let patch = GridDiff::diff_dirty(&a, &b, &tracker);
        assert_eq!(patch.len(), 1);
        assert_eq!(patch.updates[0].cell.content(), 'A');
    }

    #[test]
    fn runs_coalesce_contiguous_updates() {
        let a = Grid::new(6, 1);
        let mut b = a.clone();
        for col in [0u16, 1, 2, 4] {
            b.cell_mut(0, col).unwrap().set_content('X', 1);
        }
        let patch = GridDiff::diff(&a, &b);
        let runs = patch.runs();
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0], DirtySpan { row: 0, start_col: 0, end_col: 3 });
        assert_eq!(runs[1], DirtySpan { row: 0, start_col: 4, end_col: 5 });
    }

    #[test]
    fn dirty_tracker_mark_row_and_clear() {
        let mut tracker = DirtyTracker::new(4, 2);
        tracker.mark_row(0);
        assert!(tracker.is_dirty(0, 0));
        assert!(tracker.is_dirty(0, 3));
        assert!(!tracker.is_dirty(1, 0));

        tracker.clear();
        assert!(!tracker.is_dirty(0, 0));
    }

    #[test]
    fn scroll_policy_sometimes_blits_small_scrolls_only() {
        let mut tracker = DirtyTracker::new(10, 24);
        assert_eq!(tracker.scroll_policy(), ScrollPolicy::Sometimes);
        assert!(tracker.should_blit_scroll(1));
        assert!(tracker.should_blit_scroll(12));
        assert!(!tracker.should_blit_scroll(13));

        tracker.set_scroll_policy(ScrollPolicy::Always);
        assert!(tracker.should_blit_scroll(24));

        tracker.set_scroll_policy(ScrollPolicy::Never);
        assert!(!tracker.should_blit_scroll(1));
    }

    #[test]
    fn cell_update_survives_attribute_only_change() {
        let a = Grid::new(3, 1);
        let mut b = a.clone();
        let mut cell = Cell::new('a');
        cell.attrs.fg = crate::cell::Color::Named(1);
        *b.cell_mut(0, 1).unwrap() = cell;

        let patch = GridDiff::diff(&a, &b);
        assert_eq!(patch.len(), 1);
        assert_eq!(patch.updates[0].cell.attrs.fg, crate::cell::Color::Named(1));
    }
}
