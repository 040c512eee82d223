#![forbid(unsafe_code)]
//! Selection model + copy extraction for terminal grid + scrollback.
//!
//! This is a pure data/logic layer:
//! - no I/O
//! - deterministic output given the same buffer state
//!
//! Selection coordinates are defined over the *combined* buffer:
//! `0..scrollback.len()` are scrollback lines (oldest → newest), followed by
//! `grid.rows()` viewport lines (top → bottom).

use bitflags::bitflags;

use crate::cell::Cell;
use crate::grid::Grid;
use crate::scrollback::Scrollback;

/// A cell position in the combined buffer (scrollback + viewport).
///
/// - `line`: 0-indexed line index in the combined buffer.
/// - `col`:  0-indexed column in the current viewport coordinate space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferPos {
    pub line: u32,
    pub col: u16,
}

impl BufferPos {
    #[must_use]
    pub const fn new(line: u32, col: u16) -> Self {
        Self { line, col }
    }

    /// Convert a viewport (row, col) into a combined-buffer position.
    #[must_use]
    pub fn from_viewport(scrollback_lines: usize, row: u16, col: u16) -> Self {
        Self {
            line: scrollback_lines as u32 + row as u32,
            col,
        }
    }
}

/// Inclusive selection over the combined buffer.
///
/// Invariant: after normalization, `(start.line, start.col) <= (end.line, end.col)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub start: BufferPos,
    pub end: BufferPos,
}

impl Selection {
    #[must_use]
    pub const fn new(start: BufferPos, end: BufferPos) -> Self {
        Self { start, end }
    }

    /// Normalize start/end ordering.
    #[must_use]
    pub fn normalized(self) -> Self {
        if (self.start.line, self.start.col) <= (self.end.line, self.end.col) {
            self
        } else {
            Self {
                start: self.end,
                end: self.start,
            }
        }
    }

    /// Select exactly one character cell (wide chars expand to include both columns).
    #[must_use]
    pub fn char_at(pos: BufferPos, grid: &Grid, scrollback: &Scrollback) -> Self {
        let cols = grid.cols();
        if cols == 0 {
            return Self::new(pos, pos);
        }

        let line = pos.line;
        let col = pos.col.min(cols.saturating_sub(1));
        let lead_col = normalize_to_wide_lead(line, col, grid, scrollback);
        let end_col = wide_end_col(line, lead_col, grid, scrollback, cols);
        Self::new(
            BufferPos::new(line, lead_col),
            BufferPos::new(line, end_col),
        )
    }

    /// Select the whole logical line (all columns).
    #[must_use]
    pub fn line_at(line: u32, grid: &Grid, scrollback: &Scrollback) -> Self {
        let cols = grid.cols();
        if cols == 0 || total_lines(grid, scrollback) == 0 {
            let p = BufferPos::new(line, 0);
            return Self::new(p, p);
        }
        let max_line = total_lines(grid, scrollback).saturating_sub(1);
        let line = line.min(max_line);
        Self::new(
            BufferPos::new(line, 0),
            BufferPos::new(line, cols.saturating_sub(1)),
        )
    }

    /// Select a "word" at the given position.
    ///
    /// Heuristics: contiguous run of `is_word_char` characters, or contiguous
    /// whitespace if the clicked cell is whitespace.
    #[must_use]
    pub fn word_at(pos: BufferPos, grid: &Grid, scrollback: &Scrollback) -> Self {
        let cols = grid.cols();
        if cols == 0 || total_lines(grid, scrollback) == 0 {
            return Self::new(pos, pos);
        }

        let max_line = total_lines(grid, scrollback).saturating_sub(1);
        let line = pos.line.min(max_line);
        let col = pos.col.min(cols.saturating_sub(1));
        let col = normalize_to_wide_lead(line, col, grid, scrollback);

        let ch = cell_char(line, col, grid, scrollback).unwrap_or(' ');
        let target_class = classify_char(ch);

        // Seed selection with the current char span.
        let mut start_col = col;
        let mut end_col = wide_end_col(line, col, grid, scrollback, cols);

        // Expand left.
        while start_col > 0 {
            let probe = start_col - 1;
            let probe = normalize_to_wide_lead(line, probe, grid, scrollback);
            let ch = cell_char(line, probe, grid, scrollback).unwrap_or(' ');
            if classify_char(ch) != target_class {
                break;
            }
            start_col = probe;
        }

        // Expand right.
        loop {
            let next = end_col.saturating_add(1);
            if next >= cols {
                break;
            }
            let next = normalize_to_wide_lead(line, next, grid, scrollback);
            let ch = cell_char(line, next, grid, scrollback).unwrap_or(' ');
            if classify_char(ch) != target_class {
                break;
            }
            end_col = wide_end_col(line, next, grid, scrollback, cols);
            if end_col >= cols.saturating_sub(1) {
                break;
            }
        }

        Self::new(
            BufferPos::new(line, start_col),
            BufferPos::new(line, end_col),
        )
    }

    /// Extract selected text from the buffer (scrollback + viewport).
    ///
    /// - Wide continuation cells are skipped (wide chars appear once).
    /// - Trailing spaces on each emitted line are trimmed.
    /// - Soft-wrapped scrollback lines (where the *next* line has `wrapped=true`)
    ///   are joined without inserting a newline.
    #[must_use]
    pub fn extract_text(&self, grid: &Grid, scrollback: &Scrollback) -> String {
        let cols = grid.cols();
        if cols == 0 {
            return String::new();
        }

        let total = total_lines(grid, scrollback);
        if total == 0 {
            return String::new();
        }

        let sel = self.normalized();
        let start_line = sel.start.line.min(total.saturating_sub(1));
        let end_line = sel.end.line.min(total.saturating_sub(1));

        let mut out = String::new();

        for line in start_line..=end_line {
            let sc = if line == start_line {
                sel.start.col.min(cols.saturating_sub(1))
            } else {
                0
            };
            let ec = if line == end_line {
                sel.end.col.min(cols.saturating_sub(1))
            } else {
                cols.saturating_sub(1)
            };

            let mut line_buf = String::new();
            if sc <= ec {
                for col in sc..=ec {
                    if let Some(cell) = cell_at(line, col, grid, scrollback) {
                        if cell.is_wide_continuation() {
                            continue;
                        }
                        line_buf.push(cell.content());
                    } else {
                        line_buf.push(' ');
                    }
                }
            }
            trim_trailing_spaces(&mut line_buf);
            out.push_str(&line_buf);

            if line != end_line && should_insert_newline(line + 1, scrollback) {
                out.push('\n');
            }
        }

        out
    }
}

/// How far a selection extends around its anchor point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionGranularity {
    /// A single cell (wide chars still expand to both columns).
    #[default]
    Char,
    /// Extend through the current word class in both directions.
    Word,
    /// The whole logical line, column 0 through the last column.
    Line,
}

bitflags! {
    /// Drag-direction bits recorded alongside a selection's granularity.
    ///
    /// Independent of [`SelectionGranularity`]: a word selection dragged
    /// from its right edge is still `WORD`, just tagged `BYEND`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct SelectionModifiers: u8 {
        /// The drag is extending from the selection's start endpoint.
        const BYSTART = 1 << 0;
        /// The drag is extending from the selection's end endpoint.
        const BYEND   = 1 << 1;
        /// The pointer has moved since the selection was anchored.
        const MOVED   = 1 << 2;
    }
}

/// Granularity + drag modifiers for one selection gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SelectionKind {
    pub granularity: SelectionGranularity,
    pub modifiers: SelectionModifiers,
}

impl SelectionKind {
    #[must_use]
    pub const fn new(granularity: SelectionGranularity, modifiers: SelectionModifiers) -> Self {
        Self {
            granularity,
            modifiers,
        }
    }
}

/// A configurable set of characters treated as "word" characters by
/// [`SelectionGranularity::Word`] expansion.
///
/// Backed by a 256-bit set covering the Latin-1 range; any character above
/// `0xFF` is always considered in-class (matches how wide scripts behave
/// under word selection — there's no useful narrower class to tune for them).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordClass {
    bits: [u64; 4],
}

impl WordClass {
    /// An empty class: nothing in `0..=0xFF` is a word character.
    #[must_use]
    pub const fn empty() -> Self {
        Self { bits: [0; 4] }
    }

    /// ASCII alphanumerics plus `_`, matching the default original terminal
    /// word-selection class.
    #[must_use]
    pub fn default_alphanumeric() -> Self {
        let mut class = Self::empty();
        for ch in ('a'..='z').chain('A'..='Z').chain('0'..='9') {
            class.insert(ch);
        }
        class.insert('_');
        class
    }

    pub fn insert(&mut self, ch: char) {
        if let Ok(byte) = u8::try_from(ch as u32) {
            let idx = byte as usize;
            self.bits[idx / 64] |= 1 << (idx % 64);
        }
    }

    pub fn remove(&mut self, ch: char) {
        if let Ok(byte) = u8::try_from(ch as u32) {
            let idx = byte as usize;
            self.bits[idx / 64] &= !(1 << (idx % 64));
        }
    }

    #[must_use]
    pub fn contains(&self, ch: char) -> bool {
        match u8::try_from(ch as u32) {
            Ok(byte) => {
                let idx = byte as usize;
                self.bits[idx / 64] & (1 << (idx % 64)) != 0
            }
            Err(_) => true,
        }
    }
}

impl Default for WordClass {
    fn default() -> Self {
        Self::default_alphanumeric()
    }
}

impl Selection {
    /// Normalize and expand a raw drag endpoint pair into a well-formed
    /// selection: clamps both endpoints into the buffer, restores start/end
    /// order after computing on the normalized pair, then expands according
    /// to `kind.granularity`.
    ///
    /// `WORD` and `CHAR` both "compress" runs of NUL cells between tab stops
    /// (tabs are transparent to word-boundary detection); `CHAR` otherwise
    /// only expands to cover a wide character's trailing column.
    #[must_use]
    pub fn fix(
        start: BufferPos,
        end: BufferPos,
        kind: SelectionKind,
        grid: &Grid,
        scrollback: &Scrollback,
        word_class: &WordClass,
    ) -> Self {
        let total = total_lines(grid, scrollback);
        let cols = grid.cols();
        if total == 0 || cols == 0 {
            return Self::new(start, end);
        }
        let max_line = total.saturating_sub(1);
        let max_col = cols.saturating_sub(1);
        let clamp = |p: BufferPos| BufferPos::new(p.line.min(max_line), p.col.min(max_col));

        let backward = (start.line, start.col) > (end.line, end.col);
        let raw = Self::new(clamp(start), clamp(end)).normalized();

        let expanded = match kind.granularity {
            SelectionGranularity::Char => {
                let lead = normalize_to_wide_lead(raw.start.line, raw.start.col, grid, scrollback);
                let tail = normalize_to_wide_lead(raw.end.line, raw.end.col, grid, scrollback);
                let end_col = wide_end_col(raw.end.line, tail, grid, scrollback, cols);
                Self::new(
                    BufferPos::new(raw.start.line, lead),
                    BufferPos::new(raw.end.line, end_col),
                )
            }
            SelectionGranularity::Line => Self::new(
                BufferPos::new(raw.start.line, 0),
                BufferPos::new(raw.end.line, max_col),
            ),
            SelectionGranularity::Word => {
                let word_start = Self::word_boundary_left(raw.start, grid, scrollback, word_class);
                let word_end = Self::word_boundary_right(raw.end, grid, scrollback, word_class, cols);
                Self::new(word_start, word_end)
            }
        };

        if backward {
            Self::new(expanded.end, expanded.start)
        } else {
            expanded
        }
    }

    fn word_boundary_left(
        pos: BufferPos,
        grid: &Grid,
        scrollback: &Scrollback,
        word_class: &WordClass,
    ) -> BufferPos {
        let mut col = normalize_to_wide_lead(pos.line, pos.col, grid, scrollback);
        let ch = cell_char(pos.line, col, grid, scrollback).unwrap_or(' ');
        if ch == '\0' || ch == '\t' {
            return BufferPos::new(pos.line, col);
        }
        let in_class = word_class.contains(ch);
        while col > 0 {
            let probe = normalize_to_wide_lead(pos.line, col - 1, grid, scrollback);
            let probe_ch = cell_char(pos.line, probe, grid, scrollback).unwrap_or(' ');
            if probe_ch == '\0' || probe_ch == '\t' || word_class.contains(probe_ch) != in_class {
                break;
            }
            col = probe;
        }
        BufferPos::new(pos.line, col)
    }

    fn word_boundary_right(
        pos: BufferPos,
        grid: &Grid,
        scrollback: &Scrollback,
        word_class: &WordClass,
        cols: u16,
    ) -> BufferPos {
        let mut col = normalize_to_wide_lead(pos.line, pos.col, grid, scrollback);
        col = wide_end_col(pos.line, col, grid, scrollback, cols);
        let ch = cell_char(pos.line, pos.col, grid, scrollback).unwrap_or(' ');
        if ch == '\0' || ch == '\t' {
            return BufferPos::new(pos.line, col);
        }
        let in_class = word_class.contains(ch);
        loop {
            let next = col.saturating_add(1);
            if next >= cols {
                break;
            }
            let next = normalize_to_wide_lead(pos.line, next, grid, scrollback);
            let next_ch = cell_char(pos.line, next, grid, scrollback).unwrap_or(' ');
            if next_ch == '\0' || next_ch == '\t' || word_class.contains(next_ch) != in_class {
                break;
            }
            col = wide_end_col(pos.line, next, grid, scrollback, cols);
        }
        BufferPos::new(pos.line, col)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharClass {
    Word,
    Whitespace,
    Other,
}

fn classify_char(ch: char) -> CharClass {
    if ch.is_whitespace() {
        return CharClass::Whitespace;
    }
    if is_word_char(ch) {
        return CharClass::Word;
    }
    CharClass::Other
}

fn is_word_char(ch: char) -> bool {
    // Tuned for "code + paths" selection.
    //
    // - Identifiers: letters/digits/underscore
    // - Paths/URLs:  - . / \\ : @
    ch.is_ascii_alphanumeric() || matches!(ch, '_' | '-' | '.' | '/' | '\\' | ':' | '@')
}

fn trim_trailing_spaces(s: &mut String) {
    while s.ends_with(' ') {
        s.pop();
    }
}

fn total_lines(grid: &Grid, scrollback: &Scrollback) -> u32 {
    (scrollback.len() + grid.rows() as usize) as u32
}

fn should_insert_newline(next_line: u32, scrollback: &Scrollback) -> bool {
    let sb_len = scrollback.len() as u32;
    if next_line < sb_len {
        // wrapped=true means "this line continues the previous line".
        return !scrollback
            .get(next_line as usize)
            .map(|l| l.wrapped)
            .unwrap_or(false);
    }
    true
}

fn cell_at<'a>(
    line: u32,
    col: u16,
    grid: &'a Grid,
    scrollback: &'a Scrollback,
) -> Option<&'a Cell> {
    let sb_len = scrollback.len() as u32;
    if line < sb_len {
        scrollback
            .get(line as usize)
            .and_then(|l| l.cells.get(col as usize))
    } else {
        let row = (line - sb_len) as u16;
        grid.cell(row, col)
    }
}

fn cell_char(line: u32, col: u16, grid: &Grid, scrollback: &Scrollback) -> Option<char> {
    cell_at(line, col, grid, scrollback).map(Cell::content)
}

fn normalize_to_wide_lead(line: u32, col: u16, grid: &Grid, scrollback: &Scrollback) -> u16 {
    if col == 0 {
        return col;
    }
    let Some(cell) = cell_at(line, col, grid, scrollback) else {
        return col;
    };
    if cell.is_wide_continuation() {
        col - 1
    } else {
        col
    }
}

fn wide_end_col(line: u32, lead_col: u16, grid: &Grid, scrollback: &Scrollback, cols: u16) -> u16 {
    let Some(cell) = cell_at(line, lead_col, grid, scrollback) else {
        return lead_col;
    };
    if cell.is_wide() {
        // Include the continuation column when available.
        lead_col.saturating_add(1).min(cols.saturating_sub(1))
    } else {
        lead_col
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
