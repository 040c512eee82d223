//! Scrollback buffer: lines that have scrolled off the visible viewport.
//!
//! Stores rows as `Vec<Cell>` so that SGR attributes, hyperlinks, and wide-char
//! flags are preserved through scrollback. Uses a `VecDeque` ring for O(1)
//! push/pop at both ends.

use std::collections::VecDeque;
use std::ops::Range;

use crate::cell::Cell;

/// A single line in the scrollback buffer.
///
/// Stores the cells that made up the row when it was evicted from the viewport.
/// The `wrapped` flag records whether the line was a soft-wrap continuation of
/// the previous line (used by reflow on resize).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrollbackLine {
    /// The cells of this line (may be shorter than the viewport width if
    /// trailing blanks were trimmed).
    pub cells: Vec<Cell>,
    /// Whether this line was a soft-wrap continuation (as opposed to a hard
    /// newline / CR+LF). Used by reflow policies.
    pub wrapped: bool,
}

impl ScrollbackLine {
    /// Create a new scrollback line from a cell slice.
    pub fn new(cells: &[Cell], wrapped: bool) -> Self {
        Self {
            cells: cells.to_vec(),
            wrapped,
        }
    }

    /// Number of cells in this line.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether this line has zero cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Scrollback buffer with configurable line capacity.
///
/// Uses a `VecDeque` for O(1) push/pop. When over capacity, the oldest line
/// (front of the deque) is evicted.
#[derive(Debug, Clone)]
pub struct Scrollback {
    lines: VecDeque<ScrollbackLine>,
    capacity: usize,
}

impl Scrollback {
    /// Create a new scrollback with the given line capacity.
    ///
    /// A capacity of `0` means scrollback is disabled (all pushes are dropped).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            lines: VecDeque::with_capacity(capacity.min(4096)),
            capacity,
        }
    }

    /// Maximum number of lines this scrollback can hold.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Change the scrollback capacity.
    ///
    /// If the new capacity is smaller than the current line count, the oldest
    /// lines are evicted.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
        while self.lines.len() > capacity {
            self.lines.pop_front();
        }
    }

    /// Current number of stored lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the scrollback is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Push a row (as a cell slice) into scrollback.
    ///
    /// `wrapped` indicates whether the row was a soft-wrap continuation.
    /// If over capacity, the oldest line is evicted.
    pub fn push_row(&mut self, cells: &[Cell], wrapped: bool) -> Option<ScrollbackLine> {
        if self.capacity == 0 {
            return None;
        }
        let evicted = if self.lines.len() == self.capacity {
            self.lines.pop_front()
        } else {
            None
        };
        self.lines.push_back(ScrollbackLine::new(cells, wrapped));
        evicted
    }

    /// Pop the most recent (newest) line from scrollback.
    ///
    /// Used when scrolling down to pull lines back into the viewport, or
    /// when the viewport grows taller and lines are reclaimed.
    pub fn pop_newest(&mut self) -> Option<ScrollbackLine> {
        self.lines.pop_back()
    }

    /// Peek at the most recent (newest) line without removing it.
    #[must_use]
    pub fn peek_newest(&self) -> Option<&ScrollbackLine> {
        self.lines.back()
    }

    /// Get a line by index (0 = oldest).
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&ScrollbackLine> {
        self.lines.get(index)
    }

    /// Iterate over stored lines from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &ScrollbackLine> {
        self.lines.iter()
    }

    /// Iterate over stored lines from newest to oldest.
    pub fn iter_rev(&self) -> impl Iterator<Item = &ScrollbackLine> {
        self.lines.iter().rev()
    }

    /// Clear all stored lines.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Iterate over the stored lines whose (oldest-to-newest) index falls in
    /// `range`, without materializing the whole buffer.
    pub fn iter_range(&self, range: Range<usize>) -> impl Iterator<Item = &ScrollbackLine> {
        let start = range.start.min(self.lines.len());
        let end = range.end.min(self.lines.len()).max(start);
        self.lines.iter().skip(start).take(end - start)
    }

    /// Compute the slice of scrollback that a viewport should render when
    /// scrolled back by `offset` lines, including `overscan_lines` of extra
    /// lines on either side for smooth-scroll prefetch.
    ///
    /// `offset` of `0` means scrolled all the way to the live viewport (the
    /// newest `viewport_lines` lines); larger offsets scroll further back
    /// into history. `offset` is clamped to the buffer's actual depth.
    #[must_use]
    pub fn virtualized_window(
        &self,
        offset: usize,
        viewport_lines: usize,
        overscan_lines: usize,
    ) -> VirtualizedWindow {
        let len = self.lines.len();
        let max_scroll_offset = len.saturating_sub(viewport_lines);
        let offset = offset.min(max_scroll_offset);
        let viewport_start = len.saturating_sub(viewport_lines + offset);
        let render_start = viewport_start.saturating_sub(overscan_lines);
        let render_end = (viewport_start + viewport_lines + overscan_lines).min(len);

        VirtualizedWindow {
            offset,
            viewport_start,
            render_start,
            render_end,
            max_scroll_offset,
        }
    }
}

/// The computed render window for a scrolled-back viewport, as returned by
/// [`Scrollback::virtualized_window`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VirtualizedWindow {
    /// The clamped scroll offset this window was computed for.
    pub offset: usize,
    /// Index (oldest-to-newest) of the first line actually in the viewport,
    /// not counting overscan.
    pub viewport_start: usize,
    /// Index of the first line that should be rendered, including overscan.
    pub render_start: usize,
    /// Index one past the last line that should be rendered, including
    /// overscan.
    pub render_end: usize,
    /// The largest offset this buffer supports for the requested viewport
    /// height.
    pub max_scroll_offset: usize,
}

impl VirtualizedWindow {
    /// Number of lines this window asks the host to render.
    #[must_use]
    pub fn render_len(&self) -> usize {
        self.render_end - self.render_start
    }

    /// The index range to pass to [`Scrollback::iter_range`].
    #[must_use]
    pub fn render_range(&self) -> Range<usize> {
        self.render_start..self.render_end
    }
}

impl Default for Scrollback {
    fn default() -> Self {
        Self::new(0)
    }
}
