//! Orchestrator binding grid + parser + cursor + modes + scrollback +
//! selection + active-match into one byte-stream-in, patch-out engine.
//!
//! `Terminal` owns every piece of screen state directly, with no internal
//! locking — callers that need cross-thread access wrap it in a `Mutex`
//! themselves (see `DESIGN.md`, Concurrency). It never touches a pty; bytes
//! arrive via [`Terminal::feed`] from wherever the host reads them.

use crate::active_match::{ActiveMatch, ActiveMatchEngine, HighlightMask, MatchId, RowView};
use crate::cell::{Cell, Color, HyperlinkRegistry, SgrFlags};
use crate::cursor::{Cursor, SavedCursor};
use crate::grid::Grid;
use crate::modes::{DecModes, Modes};
use crate::parser::{Action, Parser};
use crate::patch::{ChangeRun, DirtyTracker, GridDiff, Patch};
use crate::scrollback::Scrollback;
use crate::selection::{
    BufferPos, Selection, SelectionGranularity, SelectionKind, SelectionModifiers, WordClass,
};

/// Default scrollback depth for a freshly created terminal.
const DEFAULT_SCROLLBACK: usize = 10_000;

/// The host-agnostic terminal engine: grid(s), cursor, modes, scrollback,
/// selection, and active-match highlighting, driven by [`Action`]s from a
/// [`Parser`] and observed by the host through [`Terminal::diff`].
pub struct Terminal {
    parser: Parser,
    grid: Grid,
    alt_grid: Grid,
    last_rendered: Grid,
    cursor: Cursor,
    saved_cursor: SavedCursor,
    modes: Modes,
    scrollback: Scrollback,
    scrollback_offset: usize,
    cols: u16,
    rows: u16,
    dirty: DirtyTracker,
    pending_scrolls: Vec<ChangeRun>,
    /// Whether each live row ends in a soft autowrap continuation, used by
    /// the active-match engine to join logical lines across physical rows.
    row_wrapped: Vec<bool>,
    last_char: Option<char>,
    bell: bool,
    title: Option<String>,
    hyperlinks: HyperlinkRegistry,
    current_hyperlink: crate::cell::HyperlinkId,
    pending_replies: Vec<u8>,
    selection: Option<Selection>,
    selection_anchor: Option<BufferPos>,
    selection_kind: SelectionKind,
    word_class: WordClass,
    active_matches: ActiveMatchEngine,
}

impl Terminal {
    /// Create a new terminal at `cols x rows`, power-on defaults, and a
    /// 10,000-line scrollback.
    #[must_use]
    pub fn new(cols: u16, rows: u16) -> Self {
        let cols = cols.max(1);
        let rows = rows.max(1);
        Self {
            parser: Parser::new(),
            grid: Grid::new(cols, rows),
            alt_grid: Grid::new(cols, rows),
            last_rendered: Grid::new(cols, rows),
            cursor: Cursor::new(cols, rows),
            saved_cursor: SavedCursor::default(),
            modes: Modes::new(),
            scrollback: Scrollback::new(DEFAULT_SCROLLBACK),
            scrollback_offset: 0,
            cols,
            rows,
            dirty: DirtyTracker::new(cols, rows),
            pending_scrolls: Vec::new(),
            row_wrapped: vec![false; rows as usize],
            last_char: None,
            bell: false,
            title: None,
            hyperlinks: HyperlinkRegistry::new(),
            current_hyperlink: 0,
            pending_replies: Vec::new(),
            selection: None,
            selection_anchor: None,
            selection_kind: SelectionKind::default(),
            word_class: WordClass::default(),
            active_matches: ActiveMatchEngine::new(),
        }
    }

    // ── Byte stream in ───────────────────────────────────────────────

    /// Parse `bytes` and apply every resulting action. Convenience wrapper
    /// over [`Parser::feed`] + repeated [`Terminal::apply`].
    pub fn feed(&mut self, bytes: &[u8]) {
        let actions = self.parser.feed(bytes);
        for action in actions {
            self.apply(action);
        }
    }

    /// Apply a single parsed action to the screen model.
    pub fn apply(&mut self, action: Action) {
        match action {
            Action::Print(ch) => self.apply_print(ch),
            Action::Newline => self.apply_newline(),
            Action::CarriageReturn => self.cursor.carriage_return(),
            Action::Tab => {
                self.cursor.col = self.cursor.next_tab_stop(self.cols);
                self.cursor.pending_wrap = false;
            }
            Action::Backspace => self.cursor.move_left(1),
            Action::Bell => self.bell = true,
            Action::CursorUp(count) => self.cursor.move_up(count),
            Action::CursorDown(count) => self.cursor.move_down(count, self.rows),
            Action::CursorRight(count) => self.cursor.move_right(count, self.cols),
            Action::CursorLeft(count) => self.cursor.move_left(count),
            Action::CursorNextLine(count) => {
                self.cursor.move_down(count, self.rows);
                self.cursor.col = 0;
                self.cursor.pending_wrap = false;
            }
            Action::CursorPrevLine(count) => {
                self.cursor.move_up(count);
                self.cursor.col = 0;
                self.cursor.pending_wrap = false;
            }
            Action::CursorRow(row) => self.goto_row(row),
            Action::CursorColumn(col) => {
                self.cursor
                    .move_to(self.cursor.row, col, self.rows, self.cols);
            }
            Action::CursorPosition { row, col } => self.goto(row, col),
            Action::SetScrollRegion { top, bottom } => self.set_scroll_region(top, bottom),
            Action::ScrollUp(count) => {
                let (top, bottom) = (self.cursor.scroll_top(), self.cursor.scroll_bottom());
                self.record_scroll_up(top, bottom, count);
                let bg = self.cursor.attrs.bg;
                if self.modes.alt_screen() {
                    self.grid.scroll_up(top, bottom, count, bg);
                } else {
                    self.grid
                        .scroll_up_into(top, bottom, count, &mut self.scrollback, bg);
                }
            }
            Action::ScrollDown(count) => {
                let (top, bottom) = (self.cursor.scroll_top(), self.cursor.scroll_bottom());
                self.record_scroll_down(top, bottom, count);
                let bg = self.cursor.attrs.bg;
                self.grid.scroll_down(top, bottom, count, bg);
            }
            Action::InsertLines(count) => {
                let bottom = self.cursor.scroll_bottom();
                self.record_scroll_down(self.cursor.row, bottom, count);
                let bg = self.cursor.attrs.bg;
                self.grid.insert_lines(
                    self.cursor.row,
                    count,
                    self.cursor.scroll_top(),
                    bottom,
                    bg,
                );
                self.cursor.pending_wrap = false;
            }
            Action::DeleteLines(count) => {
                let bottom = self.cursor.scroll_bottom();
                self.record_scroll_up(self.cursor.row, bottom, count);
                let bg = self.cursor.attrs.bg;
                self.grid.delete_lines(
                    self.cursor.row,
                    count,
                    self.cursor.scroll_top(),
                    bottom,
                    bg,
                );
                self.cursor.pending_wrap = false;
            }
            Action::InsertChars(count) => {
                self.grid.insert_chars(
                    self.cursor.row,
                    self.cursor.col,
                    count,
                    self.cursor.attrs.bg,
                );
                self.dirty.mark_row(self.cursor.row);
                self.cursor.pending_wrap = false;
            }
            Action::DeleteChars(count) => {
                self.grid.delete_chars(
                    self.cursor.row,
                    self.cursor.col,
                    count,
                    self.cursor.attrs.bg,
                );
                self.dirty.mark_row(self.cursor.row);
                self.cursor.pending_wrap = false;
            }
            Action::EraseChars(count) => {
                self.grid.erase_chars(
                    self.cursor.row,
                    self.cursor.col,
                    count,
                    self.cursor.attrs.bg,
                );
                self.dirty.mark_row(self.cursor.row);
            }
            Action::InsertColumns(count) => {
                self.grid
                    .insert_columns(self.cursor.col, count, self.cursor.attrs.bg);
                self.dirty.mark_all();
            }
            Action::DeleteColumns(count) => {
                self.grid
                    .delete_columns(self.cursor.col, count, self.cursor.attrs.bg);
                self.dirty.mark_all();
            }
            Action::EraseInDisplay(mode) => self.erase_in_display(mode),
            Action::EraseInLine(mode) => self.erase_in_line(mode),
            Action::EraseScrollback => self.scrollback.clear(),
            Action::Sgr(params) => self.cursor.attrs.apply_sgr_params(&params),
            Action::DecSet(params) => self.apply_dec_modes(&params, true),
            Action::DecRst(params) => self.apply_dec_modes(&params, false),
            Action::AnsiSet(params) => {
                for &p in &params {
                    self.modes.set_ansi_mode(p, true);
                }
            }
            Action::AnsiRst(params) => {
                for &p in &params {
                    self.modes.set_ansi_mode(p, false);
                }
            }
            Action::SaveCursor => self.save_cursor(),
            Action::RestoreCursor => self.restore_cursor(),
            Action::Index => self.index(),
            Action::ReverseIndex => self.reverse_index(),
            Action::NextLine => {
                self.cursor.col = 0;
                self.cursor.pending_wrap = false;
                self.index();
            }
            Action::FullReset => self.full_reset(),
            Action::SoftReset => self.soft_reset(),
            Action::ScreenAlignment => self.screen_alignment(),
            Action::RepeatChar(count) => {
                if let Some(ch) = self.last_char {
                    for _ in 0..count {
                        self.apply_print(ch);
                    }
                }
            }
            Action::SetTitle(title) => self.title = Some(title),
            Action::HyperlinkStart { uri, .. } => {
                self.current_hyperlink = self.hyperlinks.acquire(&uri);
            }
            Action::HyperlinkEnd => {
                self.hyperlinks.release_id(self.current_hyperlink);
                self.current_hyperlink = 0;
            }
            Action::SetTabStop => self.cursor.set_tab_stop(),
            Action::ClearTabStop(mode) => match mode {
                0 => self.cursor.clear_tab_stop(),
                3 | 5 => self.cursor.clear_all_tab_stops(),
                _ => {}
            },
            Action::BackTab(count) => {
                for _ in 0..count {
                    self.cursor.col = self.cursor.prev_tab_stop();
                }
                self.cursor.pending_wrap = false;
            }
            Action::ApplicationKeypad | Action::NormalKeypad => {}
            Action::SetCursorShape(_) => {}
            Action::FocusIn | Action::FocusOut => {}
            Action::PasteStart | Action::PasteEnd => {}
            Action::DeviceAttributes => self.pending_replies.extend_from_slice(b"\x1b[?6c"),
            Action::DeviceAttributesSecondary => {
                self.pending_replies.extend_from_slice(b"\x1b[>1;0;0c")
            }
            Action::DeviceStatusReport => self.pending_replies.extend_from_slice(b"\x1b[0n"),
            Action::CursorPositionReport => {
                let reply = format!("\x1b[{};{}R", self.cursor.row + 1, self.cursor.col + 1);
                self.pending_replies.extend_from_slice(reply.as_bytes());
            }
            Action::DesignateCharset { slot, charset } => {
                self.cursor.designate_charset(slot, charset);
            }
            Action::SingleShift2 => self.cursor.single_shift = Some(2),
            Action::SingleShift3 => self.cursor.single_shift = Some(3),
            Action::MouseEvent { .. } => {}
            Action::Escape(_) => {}
        }
    }

    fn apply_print(&mut self, ch: char) {
        let charset = self.cursor.effective_charset();
        let ch = crate::cursor::translate_charset(ch, charset);
        self.cursor.consume_single_shift();
        self.last_char = Some(ch);

        if self.cursor.pending_wrap {
            if self.modes.autowrap() {
                self.wrap_to_next_line();
            } else {
                self.cursor.pending_wrap = false;
            }
        }

        let width = Cell::display_width(ch);
        if width == 0 {
            return;
        }

        if width == 2 && self.cursor.col + 1 >= self.cols {
            if self.modes.autowrap() {
                self.wrap_to_next_line();
            } else {
                self.cursor.pending_wrap = false;
                return;
            }
        }

        if self.modes.insert_mode() {
            self.grid.insert_chars(
                self.cursor.row,
                self.cursor.col,
                u16::from(width),
                self.cursor.attrs.bg,
            );
        }

        let written =
            self.grid
                .write_printable(self.cursor.row, self.cursor.col, ch, self.cursor.attrs);
        if written == 0 {
            return;
        }
        if let Some(cell) = self.grid.cell_mut(self.cursor.row, self.cursor.col) {
            cell.hyperlink = self.current_hyperlink;
        }
        if written == 2
            && let Some(cell) = self.grid.cell_mut(self.cursor.row, self.cursor.col + 1)
        {
            cell.hyperlink = self.current_hyperlink;
        }
        self.dirty.mark_row(self.cursor.row);

        if self.cursor.col + u16::from(written) >= self.cols {
            self.cursor.pending_wrap = true;
        } else {
            self.cursor.col += u16::from(written);
            self.cursor.pending_wrap = false;
        }
    }

    fn apply_newline(&mut self) {
        if self.modes.ansi.contains(crate::modes::AnsiModes::LINEFEED_NEWLINE) {
            self.cursor.col = 0;
        }
        self.index();
    }

    fn wrap_to_next_line(&mut self) {
        if let Some(w) = self.row_wrapped.get_mut(self.cursor.row as usize) {
            *w = true;
        }
        self.cursor.col = 0;
        self.index();
    }

    /// IND: move down one line, scrolling the region when already at its
    /// bottom margin.
    fn index(&mut self) {
        if self.cursor.row + 1 >= self.cursor.scroll_bottom() {
            let (top, bottom) = (self.cursor.scroll_top(), self.cursor.scroll_bottom());
            self.record_scroll_up(top, bottom, 1);
            let bg = self.cursor.attrs.bg;
            if self.modes.alt_screen() {
                self.grid.scroll_up(top, bottom, 1, bg);
            } else {
                self.grid
                    .scroll_up_into(top, bottom, 1, &mut self.scrollback, bg);
            }
        } else if self.cursor.row + 1 < self.rows {
            self.cursor.row += 1;
        }
        self.cursor.pending_wrap = false;
    }

    /// RI: move up one line, scrolling the region when already at its top
    /// margin.
    fn reverse_index(&mut self) {
        if self.cursor.row == self.cursor.scroll_top() {
            let (top, bottom) = (self.cursor.scroll_top(), self.cursor.scroll_bottom());
            self.record_scroll_down(top, bottom, 1);
            let bg = self.cursor.attrs.bg;
            self.grid.scroll_down(top, bottom, 1, bg);
        } else {
            self.cursor.move_up(1);
        }
        self.cursor.pending_wrap = false;
    }

    fn goto(&mut self, row: u16, col: u16) {
        if self.modes.origin_mode() {
            let abs_row = row.saturating_add(self.cursor.scroll_top());
            self.cursor.row = abs_row.min(self.cursor.scroll_bottom().saturating_sub(1));
            self.cursor.col = col.min(self.cols.saturating_sub(1));
            self.cursor.pending_wrap = false;
        } else {
            self.cursor.move_to(row, col, self.rows, self.cols);
        }
    }

    fn goto_row(&mut self, row: u16) {
        if self.modes.origin_mode() {
            let abs_row = row.saturating_add(self.cursor.scroll_top());
            self.cursor.row = abs_row.min(self.cursor.scroll_bottom().saturating_sub(1));
            self.cursor.pending_wrap = false;
        } else {
            self.cursor
                .move_to(row, self.cursor.col, self.rows, self.cols);
        }
    }

    fn set_scroll_region(&mut self, top: u16, bottom: u16) {
        let bottom = if bottom == 0 {
            self.rows
        } else {
            bottom.min(self.rows)
        };
        self.cursor.set_scroll_region(top, bottom, self.rows);
        if self.modes.origin_mode() {
            self.cursor.row = self.cursor.scroll_top();
            self.cursor.col = 0;
            self.cursor.pending_wrap = false;
        } else {
            self.cursor.move_to(0, 0, self.rows, self.cols);
        }
    }

    fn erase_in_display(&mut self, mode: u8) {
        let bg = self.cursor.attrs.bg;
        match mode {
            0 => {
                self.grid.erase_below(self.cursor.row, self.cursor.col, bg);
                for r in self.cursor.row..self.rows {
                    self.dirty.mark_row(r);
                }
            }
            1 => {
                self.grid.erase_above(self.cursor.row, self.cursor.col, bg);
                for r in 0..=self.cursor.row {
                    self.dirty.mark_row(r);
                }
            }
            2 => {
                self.grid.erase_all(bg);
                self.dirty.mark_all();
            }
            3 => {
                self.grid.erase_all(bg);
                self.scrollback.clear();
                self.dirty.mark_all();
            }
            _ => {}
        }
    }

    fn erase_in_line(&mut self, mode: u8) {
        let bg = self.cursor.attrs.bg;
        match mode {
            0 => self
                .grid
                .erase_line_right(self.cursor.row, self.cursor.col, bg),
            1 => self
                .grid
                .erase_line_left(self.cursor.row, self.cursor.col, bg),
            2 => self.grid.erase_line(self.cursor.row, bg),
            _ => return,
        }
        self.dirty.mark_row(self.cursor.row);
    }

    fn apply_dec_modes(&mut self, params: &[i64], enabled: bool) {
        for &p in params {
            match (p, enabled) {
                (47 | 1047, true) => {
                    if !self.modes.alt_screen() {
                        self.enter_alt_screen(false);
                    }
                }
                (47, false) => {
                    if self.modes.alt_screen() {
                        self.leave_alt_screen(false);
                    }
                }
                (1047, false) => {
                    if self.modes.alt_screen() {
                        self.leave_alt_screen(true);
                    }
                }
                (1048, true) => self.save_cursor(),
                (1048, false) => self.restore_cursor(),
                (1049, true) => {
                    self.save_cursor();
                    if !self.modes.alt_screen() {
                        self.enter_alt_screen(true);
                    }
                }
                (1049, false) => {
                    if self.modes.alt_screen() {
                        self.leave_alt_screen(true);
                    }
                    self.restore_cursor();
                }
                _ => {}
            }
            self.modes.set_dec_mode(p, enabled);
        }
    }

    fn enter_alt_screen(&mut self, clear_after: bool) {
        std::mem::swap(&mut self.grid, &mut self.alt_grid);
        if clear_after {
            let bg = self.cursor.attrs.bg;
            self.grid.erase_all(bg);
        }
        self.pending_scrolls.clear();
        self.dirty.mark_all();
    }

    fn leave_alt_screen(&mut self, clear_before: bool) {
        if clear_before {
            let bg = self.cursor.attrs.bg;
            self.grid.erase_all(bg);
        }
        std::mem::swap(&mut self.grid, &mut self.alt_grid);
        self.pending_scrolls.clear();
        self.dirty.mark_all();
    }

    fn save_cursor(&mut self) {
        self.saved_cursor = SavedCursor::save(&self.cursor, self.modes.origin_mode());
    }

    fn restore_cursor(&mut self) {
        self.saved_cursor.restore(&mut self.cursor);
    }

    fn full_reset(&mut self) {
        self.grid = Grid::new(self.cols, self.rows);
        self.alt_grid = Grid::new(self.cols, self.rows);
        self.cursor = Cursor::new(self.cols, self.rows);
        self.saved_cursor = SavedCursor::default();
        self.scrollback.clear();
        self.scrollback_offset = 0;
        self.modes.reset();
        self.row_wrapped = vec![false; self.rows as usize];
        self.hyperlinks.clear();
        self.current_hyperlink = 0;
        self.pending_scrolls.clear();
        self.dirty.mark_all();
    }

    fn soft_reset(&mut self) {
        // DECSTR: modes/SGR/scroll region/cursor visibility/charset reset;
        // screen contents and scrollback are untouched.
        self.modes = Modes::new();
        self.cursor.attrs = Default::default();
        self.cursor.set_scroll_region(0, self.rows, self.rows);
        self.cursor.pending_wrap = false;
        self.cursor.reset_charset();
    }

    fn screen_alignment(&mut self) {
        self.grid.fill_all('E');
        self.cursor.move_to(0, 0, self.rows, self.cols);
        self.pending_scrolls.clear();
        self.dirty.mark_all();
    }

    fn record_scroll_up(&mut self, top: u16, bottom: u16, count: u16) {
        let top = top.min(self.rows);
        let bottom = bottom.min(self.rows);
        if top >= bottom || count == 0 {
            return;
        }
        let count = count.min(bottom - top);
        let first_row = top + count;
        let run_len = bottom - first_row;
        if run_len > 0 {
            self.pending_scrolls.push(ChangeRun {
                first_row,
                count: run_len,
                offset: -(i32::from(count)),
            });
        }
        for r in top..bottom {
            self.dirty.mark_row(r);
        }
        self.shift_row_wrapped(top, bottom, count, true);
    }

    fn record_scroll_down(&mut self, top: u16, bottom: u16, count: u16) {
        let top = top.min(self.rows);
        let bottom = bottom.min(self.rows);
        if top >= bottom || count == 0 {
            return;
        }
        let count = count.min(bottom - top);
        let run_len = bottom - top - count;
        if run_len > 0 {
            self.pending_scrolls.push(ChangeRun {
                first_row: top,
                count: run_len,
                offset: i32::from(count),
            });
        }
        for r in top..bottom {
            self.dirty.mark_row(r);
        }
        self.shift_row_wrapped(top, bottom, count, false);
    }

    fn shift_row_wrapped(&mut self, top: u16, bottom: u16, count: u16, up: bool) {
        let top = top as usize;
        let bottom = (bottom as usize).min(self.row_wrapped.len());
        let count = (count as usize).min(bottom.saturating_sub(top));
        if top >= bottom || count == 0 {
            return;
        }
        let region = &mut self.row_wrapped[top..bottom];
        if up {
            region.rotate_left(count);
            let len = region.len();
            for w in &mut region[len - count..] {
                *w = false;
            }
        } else {
            region.rotate_right(count);
            for w in &mut region[..count] {
                *w = false;
            }
        }
    }

    // ── Differential rendering ───────────────────────────────────────

    /// Diff the live grid against the last-rendered snapshot and return the
    /// minimal set of changes the host needs to repaint: dirty cell runs,
    /// any scroll-blit opportunities the current [`crate::patch::ScrollPolicy`]
    /// approves, and the cursor's current visibility.
    pub fn diff(&mut self) -> Patch {
        let mut patch = GridDiff::diff_dirty(&self.last_rendered, &self.grid, &self.dirty);
        patch.scrolls = self
            .pending_scrolls
            .drain(..)
            .filter(|run| self.dirty.should_blit_scroll(run.count))
            .collect();
        patch.cursor_visible = Some(self.modes.cursor_visible());

        self.last_rendered = self.grid.clone();
        self.dirty.clear();
        patch
    }

    /// Repaint a single rectangle `[sx, ex) x [sy, ey)`, optionally stamping
    /// the back-buffer with `fill` first so the next [`Terminal::diff`]
    /// reports the whole rectangle as changed (used by hosts that just
    /// cleared the region themselves and need the model to catch up).
    pub fn update_rect(&mut self, fill: Option<Color>, sx: u16, sy: u16, ex: u16, ey: u16) {
        let ex = ex.min(self.cols);
        let ey = ey.min(self.rows);
        for row in sy..ey {
            for col in sx..ex {
                if let Some(color) = fill
                    && let Some(cell) = self.last_rendered.cell_mut(row, col)
                {
                    cell.clear();
                    cell.attrs.bg = color;
                }
                self.dirty.mark_cell(row, col);
            }
        }
    }

    /// Current cursor position `(row, col)`.
    #[must_use]
    pub fn cursor_position(&self) -> (u16, u16) {
        (self.cursor.row, self.cursor.col)
    }

    /// Whether the text cursor is currently visible (DECTCEM).
    #[must_use]
    pub fn cursor_visible(&self) -> bool {
        self.modes.cursor_visible()
    }

    /// Take (and clear) the pending-bell flag.
    pub fn take_bell(&mut self) -> bool {
        std::mem::take(&mut self.bell)
    }

    /// Take (and clear) a pending window/icon title change, if any.
    pub fn take_title(&mut self) -> Option<String> {
        self.title.take()
    }

    /// Take (and clear) bytes queued for the child by status/attribute
    /// queries (`DSR`, `DA1`/`DA2`, cursor position reports).
    pub fn take_replies(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.pending_replies)
    }

    /// Size, in columns and rows.
    #[must_use]
    pub fn size(&self) -> (u16, u16) {
        (self.cols, self.rows)
    }

    /// Resize the live screen. The primary buffer pushes/pulls scrollback on
    /// height changes (unless the alternate screen is currently active, in
    /// which case neither buffer touches scrollback); width changes never
    /// reflow existing rows, only truncate or pad them.
    pub fn resize(&mut self, cols: u16, rows: u16) {
        let cols = cols.max(1);
        let rows = rows.max(1);
        if cols == self.cols && rows == self.rows {
            return;
        }

        if self.modes.alt_screen() {
            self.grid.resize(cols, rows);
            self.alt_grid.resize(cols, rows);
        } else {
            let new_row =
                self.grid
                    .resize_with_scrollback(cols, rows, self.cursor.row, &mut self.scrollback);
            self.cursor.row = new_row;
            self.alt_grid.resize(cols, rows);
        }

        self.cursor.resize(cols, rows);
        self.row_wrapped.resize(rows as usize, false);
        self.cols = cols;
        self.rows = rows;
        self.last_rendered = Grid::new(cols, rows);
        self.dirty = DirtyTracker::new(cols, rows);
        self.dirty.mark_all();
        self.pending_scrolls.clear();
    }

    /// Change the scrollback's maximum retained lines, evicting the oldest
    /// lines first if the new capacity is smaller.
    pub fn set_scrollback_capacity(&mut self, max: usize) {
        self.scrollback.set_capacity(max);
    }

    /// Number of lines currently held in scrollback.
    #[must_use]
    pub fn scrollback_len(&self) -> usize {
        self.scrollback.len()
    }

    /// Adjust how far the viewport is scrolled back into history. `delta > 0`
    /// scrolls further back; `delta < 0` scrolls toward the live screen.
    /// Returns the new (clamped) offset.
    pub fn scroll_viewport(&mut self, delta: i32) -> usize {
        let current = self.scrollback_offset as i64;
        let requested = (current + i64::from(delta)).max(0) as usize;
        let window = self
            .scrollback
            .virtualized_window(requested, self.rows as usize, 0);
        self.scrollback_offset = window.offset;
        self.scrollback_offset
    }

    /// The current scrollback viewport offset (0 = live screen).
    #[must_use]
    pub fn scrollback_offset(&self) -> usize {
        self.scrollback_offset
    }

    // ── Mouse reporting ───────────────────────────────────────────────

    /// Build the byte sequence to send the child for a button event, or
    /// `None` when no mouse-reporting mode is active. `qual` carries the
    /// additive modifier bits (4 = shift, 8 = meta, 16 = ctrl).
    #[must_use]
    pub fn report_button(
        &self,
        down: bool,
        button: u8,
        qual: u8,
        col: u16,
        row: u16,
    ) -> Option<Vec<u8>> {
        let dec = self.modes.dec;
        let reporting = dec.contains(DecModes::SEND_MOUSE_PRESS)
            || dec.contains(DecModes::SEND_MOUSE_BOTH)
            || dec.contains(DecModes::SEND_MOUSE_ANY);
        if !reporting {
            return None;
        }

        if dec.contains(DecModes::SGR_MOUSE) {
            let btn = u32::from(button.saturating_sub(1)) + u32::from(qual);
            let suffix = if down { 'M' } else { 'm' };
            return Some(
                format!("\x1b[<{};{};{}{}", btn, col + 1, row + 1, suffix).into_bytes(),
            );
        }

        if !down && !dec.contains(DecModes::SEND_MOUSE_BOTH) && !dec.contains(DecModes::SEND_MOUSE_ANY)
        {
            // X10 (?9) only ever reports presses.
            return None;
        }

        const BUTTON_CHARS: [u8; 7] = [b' ', b'!', b'"', b'`', b'a', b'b', b'c'];
        let b = if down {
            BUTTON_CHARS
                .get(button.saturating_sub(1) as usize)
                .copied()
                .unwrap_or(b' ')
                | qual
        } else {
            b' ' + 3
        };
        let col_byte = (col.saturating_add(33)).min(255) as u8;
        let row_byte = (row.saturating_add(33)).min(255) as u8;
        Some(vec![0x1b, b'[', b'M', b, col_byte, row_byte])
    }

    // ── Selection ─────────────────────────────────────────────────────

    /// Begin a new selection gesture anchored at `pos`, expanded immediately
    /// to `granularity` (char/word/line).
    pub fn begin_selection(&mut self, pos: BufferPos, granularity: SelectionGranularity) {
        self.selection_kind = SelectionKind::new(granularity, SelectionModifiers::empty());
        self.selection_anchor = Some(pos);
        self.selection = Some(match granularity {
            SelectionGranularity::Char => Selection::char_at(pos, &self.grid, &self.scrollback),
            SelectionGranularity::Word => Selection::word_at(pos, &self.grid, &self.scrollback),
            SelectionGranularity::Line => Selection::line_at(pos.line, &self.grid, &self.scrollback),
        });
    }

    /// Extend the in-progress selection to `pos`, re-fixing it against the
    /// anchor with the drag-direction modifiers set.
    pub fn extend_selection(&mut self, pos: BufferPos) {
        let Some(anchor) = self.selection_anchor else {
            return;
        };
        let modifiers = if (pos.line, pos.col) < (anchor.line, anchor.col) {
            SelectionModifiers::BYSTART | SelectionModifiers::MOVED
        } else {
            SelectionModifiers::BYEND | SelectionModifiers::MOVED
        };
        self.selection_kind = SelectionKind::new(self.selection_kind.granularity, modifiers);
        self.selection = Some(Selection::fix(
            anchor,
            pos,
            self.selection_kind,
            &self.grid,
            &self.scrollback,
            &self.word_class,
        ));
    }

    /// Drop the current selection.
    pub fn clear_selection(&mut self) {
        self.selection = None;
        self.selection_anchor = None;
    }

    /// The current selection, if any.
    #[must_use]
    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }

    /// Extract the currently selected text, or an empty string if nothing is
    /// selected.
    #[must_use]
    pub fn selection_text(&self) -> String {
        self.selection
            .map(|s| s.extract_text(&self.grid, &self.scrollback))
            .unwrap_or_default()
    }

    /// Replace the word class used to expand `WORD`-granularity selections.
    pub fn set_word_class(&mut self, word_class: WordClass) {
        self.word_class = word_class;
    }

    // ── Active-match highlighting ─────────────────────────────────────

    /// Register a regex pattern with a highlight mask; returns its id.
    pub fn register_pattern(
        &mut self,
        pattern: &str,
        mask: HighlightMask,
    ) -> Result<MatchId, regex::Error> {
        self.active_matches.register(pattern, mask)
    }

    /// Drop a previously registered pattern.
    pub fn unregister_pattern(&mut self, pattern_id: MatchId) {
        self.active_matches.unregister(pattern_id);
    }

    /// Rescan the visible screen against every registered pattern, replacing
    /// the previous match list, and return the matches found.
    pub fn rescan_matches(&mut self) -> &[ActiveMatch] {
        let owned_rows: Vec<Vec<Cell>> = (0..self.rows)
            .map(|r| self.grid.row_cells(r).map(<[Cell]>::to_vec).unwrap_or_default())
            .collect();
        let views: Vec<RowView<'_>> = owned_rows
            .iter()
            .enumerate()
            .map(|(i, cells)| RowView {
                cells,
                wrapped: self.row_wrapped.get(i).copied().unwrap_or(false),
            })
            .collect();
        self.active_matches
            .get_matches(&mut self.grid, &mut self.dirty, &views);
        self.active_matches.matches()
    }

    /// Toggle the highlight overlay for `match_id` (on if nothing or a
    /// different match is highlighted, off if it's already active).
    pub fn highlight_match(&mut self, match_id: MatchId) {
        self.active_matches
            .highlight(match_id, &mut self.grid, &mut self.dirty);
    }

    /// The match (if any) covering a live cell.
    #[must_use]
    pub fn match_at(&self, row: usize, col: u16) -> Option<&ActiveMatch> {
        self.active_matches.match_check(row, col)
    }
}
