//! Regex-registered "active tag" highlighting over the rendered viewport.
//!
//! Hosts register POSIX-extended-ish regular expressions (via the `regex`
//! crate; see `DESIGN.md` for why this is the right dependency rather than a
//! hand-rolled ERE engine) along with a highlight mask. [`ActiveMatchEngine::get_matches`]
//! rescans whatever rows the host is currently displaying and returns the set
//! of matches found; [`ActiveMatchEngine::highlight`] toggles an overlay for
//! exactly one of them at a time, XOR'ing attribute bits in place or, when the
//! mask touches color, swapping in saved rows so the change is reversible.

use regex::Regex;

use crate::cell::{Cell, Color, SgrFlags};
use crate::grid::Grid;
use crate::patch::DirtyTracker;
use crate::scrollback::Scrollback;

/// Identifies either a registered pattern or a match produced from one scan.
pub type MatchId = u32;

/// What a highlight does to a matched cell's attributes.
///
/// `flags` is XOR'd into the cell's [`SgrFlags`] in place — reversible by
/// XOR-ing again. Setting `fg`/`bg` instead replaces the cell's colors,
/// which isn't its own inverse, so those cells are saved and restored
/// verbatim instead of re-XORed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HighlightMask {
    pub flags: SgrFlags,
    pub fg: Option<Color>,
    pub bg: Option<Color>,
}

impl HighlightMask {
    #[must_use]
    pub fn flags(flags: SgrFlags) -> Self {
        Self {
            flags,
            fg: None,
            bg: None,
        }
    }

    #[must_use]
    pub fn touches_color(&self) -> bool {
        self.fg.is_some() || self.bg.is_some()
    }
}

struct Pattern {
    id: MatchId,
    regex: Regex,
    mask: HighlightMask,
}

/// A contiguous run of matched columns within one physical row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchBlock {
    /// Row index into the row views passed to [`ActiveMatchEngine::get_matches`]
    /// (viewport row order, not a combined scrollback+viewport coordinate).
    pub row: usize,
    pub start_col: u16,
    /// Exclusive.
    pub end_col: u16,
}

/// One match found by [`ActiveMatchEngine::get_matches`], possibly spanning
/// several soft-wrapped physical rows.
#[derive(Debug, Clone)]
pub struct ActiveMatch {
    pub id: MatchId,
    pub pattern_id: MatchId,
    pub blocks: Vec<MatchBlock>,
}

impl ActiveMatch {
    #[must_use]
    pub fn covers(&self, row: usize, col: u16) -> bool {
        self.blocks
            .iter()
            .any(|b| b.row == row && col >= b.start_col && col < b.end_col)
    }
}

struct SavedRow {
    row: usize,
    cells: Vec<Cell>,
}

struct Highlighted {
    match_id: MatchId,
    /// `Some` when the mask touched color and whole rows were swapped in;
    /// `None` means the overlay was a pure flag XOR, undone by re-XORing.
    saved: Option<Vec<SavedRow>>,
}

/// Registered patterns + the matches from the most recent scan, plus at most
/// one active highlight overlay.
#[derive(Default)]
pub struct ActiveMatchEngine {
    patterns: Vec<Pattern>,
    next_pattern_id: MatchId,
    matches: Vec<ActiveMatch>,
    next_match_id: MatchId,
    highlighted: Option<Highlighted>,
}

/// A row as currently displayed, with blank-cell trimming already applied by
/// the caller — the engine never reaches past row boundaries the host gives
/// it (see `DESIGN.md` for why this replaces the original's whole-history
/// scan with a viewport-bounded one).
pub struct RowView<'a> {
    pub cells: &'a [Cell],
    /// Whether this row's content continues onto the next `RowView` (soft
    /// wrap) rather than ending a logical line.
    pub wrapped: bool,
}

fn is_blank(cell: &Cell) -> bool {
    matches!(cell.content(), '\0' | '\t' | ' ')
}

/// Map one cell's content to its match-image character: printable ASCII
/// passes through unchanged, blanks become space, everything else (wide
/// glyphs, box-drawing, combining marks) becomes `.` so byte offsets into
/// the image stay one-to-one with grid columns.
fn image_char(cell: &Cell) -> char {
    let ch = cell.content();
    if ch.is_ascii() && !ch.is_ascii_control() {
        ch
    } else if ch == ' ' || ch == '\0' {
        ' '
    } else {
        '.'
    }
}

impl ActiveMatchEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a pattern + highlight mask. Returns the pattern's id, stable
    /// across calls to [`ActiveMatchEngine::get_matches`] (matches reference
    /// it via [`ActiveMatch::pattern_id`]).
    pub fn register(&mut self, pattern: &str, mask: HighlightMask) -> Result<MatchId, regex::Error> {
        let regex = Regex::new(pattern)?;
        let id = self.next_pattern_id;
        self.next_pattern_id += 1;
        self.patterns.push(Pattern { id, regex, mask });
        Ok(id)
    }

    /// Drop a registered pattern. Matches already produced by a prior
    /// `get_matches` call are left alone until the next scan.
    pub fn unregister(&mut self, pattern_id: MatchId) {
        self.patterns.retain(|p| p.id != pattern_id);
    }

    #[must_use]
    pub fn patterns_len(&self) -> usize {
        self.patterns.len()
    }

    #[must_use]
    pub fn matches(&self) -> &[ActiveMatch] {
        &self.matches
    }

    #[must_use]
    pub fn is_highlighted(&self, match_id: MatchId) -> bool {
        self.highlighted
            .as_ref()
            .is_some_and(|h| h.match_id == match_id)
    }

    /// Rescan `rows` for every registered pattern, replacing the previous
    /// match list. Any active highlight is restored first (step 1 of the
    /// original algorithm discards "matches and overlay save-lines"; doing
    /// that without restoring first would leave swapped-in rows stuck on
    /// screen, so this restores before discarding).
    pub fn get_matches(&mut self, grid: &mut Grid, dirty: &mut DirtyTracker, rows: &[RowView<'_>]) {
        if let Some(highlighted) = self.highlighted.take() {
            self.restore(highlighted, grid, dirty);
        }
        self.matches.clear();

        if self.patterns.is_empty() || rows.is_empty() {
            return;
        }

        // offset_table[i] = (row, col) for image char i within the current
        // logical line.
        let mut logical_image = String::new();
        let mut offset_table: Vec<(usize, u16)> = Vec::new();

        let mut flush = |engine: &mut Self,
                          image: &str,
                          offsets: &[(usize, u16)]| {
            if image.is_empty() {
                return;
            }
            for pattern in &engine.patterns {
                for m in pattern.regex.find_iter(image) {
                    let span = &offsets[m.start()..m.end().max(m.start())];
                    if span.is_empty() {
                        continue;
                    }
                    let mut blocks: Vec<MatchBlock> = Vec::new();
                    for &(row, col) in span {
                        if let Some(last) = blocks.last_mut() {
                            if last.row == row && last.end_col == col {
                                last.end_col = col + 1;
                                continue;
                            }
                        }
                        blocks.push(MatchBlock {
                            row,
                            start_col: col,
                            end_col: col + 1,
                        });
                    }
                    let id = engine.next_match_id;
                    engine.next_match_id += 1;
                    engine.matches.push(ActiveMatch {
                        id,
                        pattern_id: pattern.id,
                        blocks,
                    });
                }
            }
        };

        for (idx, view) in rows.iter().enumerate() {
            for (col, cell) in view.cells.iter().enumerate() {
                if cell.is_wide_continuation() {
                    continue;
                }
                logical_image.push(image_char(cell));
                offset_table.push((idx, col as u16));
            }
            let continues = view.wrapped || (!view.cells.is_empty() && !is_blank(&view.cells[view.cells.len() - 1]));
            if !continues || idx + 1 == rows.len() {
                flush(self, &logical_image, &offset_table);
                logical_image.clear();
                offset_table.clear();
            }
        }
    }

    /// Find the match (if any) covering a live cell at `(row, col)`.
    #[must_use]
    pub fn match_check(&self, row: usize, col: u16) -> Option<&ActiveMatch> {
        self.matches.iter().find(|m| m.covers(row, col))
    }

    #[must_use]
    pub fn match_by_id(&self, match_id: MatchId) -> Option<&ActiveMatch> {
        self.matches.iter().find(|m| m.id == match_id)
    }

    /// Toggle the overlay for `match_id`: highlights it if nothing (or a
    /// different match) is currently highlighted, un-highlights if it's
    /// already the active one. At most one match is highlighted at a time.
    pub fn highlight(&mut self, match_id: MatchId, grid: &mut Grid, dirty: &mut DirtyTracker) {
        if let Some(current) = self.highlighted.take() {
            let was_same = current.match_id == match_id;
            self.restore(current, grid, dirty);
            if was_same {
                return;
            }
        }

        let Some(pattern_mask) = self.mask_for_match(match_id) else {
            return;
        };
        let Some(m) = self.match_by_id(match_id) else {
            return;
        };
        let blocks = m.blocks.clone();

        if pattern_mask.touches_color() {
            let mut saved = Vec::new();
            for block in &blocks {
                let Some(row_cells) = grid.row_cells(block.row as u16) else {
                    continue;
                };
                saved.push(SavedRow {
                    row: block.row,
                    cells: row_cells.to_vec(),
                });
            }
            for block in &blocks {
                for col in block.start_col..block.end_col {
                    if let Some(cell) = grid.cell_mut(block.row as u16, col) {
                        if let Some(fg) = pattern_mask.fg {
                            cell.attrs.fg = fg;
                        }
                        if let Some(bg) = pattern_mask.bg {
                            cell.attrs.bg = bg;
                        }
                        cell.attrs.flags ^= pattern_mask.flags;
                        dirty.mark_cell(block.row as u16, col);
                    }
                }
            }
            self.highlighted = Some(Highlighted {
                match_id,
                saved: Some(saved),
            });
        } else {
            for block in &blocks {
                for col in block.start_col..block.end_col {
                    if let Some(cell) = grid.cell_mut(block.row as u16, col) {
                        cell.attrs.flags ^= pattern_mask.flags;
                        dirty.mark_cell(block.row as u16, col);
                    }
                }
            }
            self.highlighted = Some(Highlighted {
                match_id,
                saved: None,
            });
        }
    }

    fn mask_for_match(&self, match_id: MatchId) -> Option<HighlightMask> {
        let m = self.match_by_id(match_id)?;
        self.patterns
            .iter()
            .find(|p| p.id == m.pattern_id)
            .map(|p| p.mask)
    }

    fn restore(&self, highlighted: Highlighted, grid: &mut Grid, dirty: &mut DirtyTracker) {
        match highlighted.saved {
            Some(rows) => {
                for saved in rows {
                    if let Some(dst) = grid.row_cells_mut(saved.row as u16) {
                        let len = dst.len().min(saved.cells.len());
                        dst[..len].copy_from_slice(&saved.cells[..len]);
                    }
                    dirty.mark_row(saved.row as u16);
                }
            }
            None => {
                if let Some(mask) = self.mask_for_match(highlighted.match_id)
                    && let Some(m) = self.match_by_id(highlighted.match_id)
                {
                    for block in &m.blocks {
                        for col in block.start_col..block.end_col {
                            if let Some(cell) = grid.cell_mut(block.row as u16, col) {
                                cell.attrs.flags ^= mask.flags;
                                dirty.mark_cell(block.row as u16, col);
                            }
                        }
                    }
                }
            }
        }
    }

    /// Force-clear any active overlay without a grid to restore into (e.g.
    /// the grid was just replaced by a full reset). Drops the saved rows.
    pub fn clear_highlight(&mut self) {
        self.highlighted = None;
    }
}
