//! Cursor position, scroll region, tab stops, and character-set state.
//!
//! The cursor owns everything about "where the next write lands and how it's
//! shaped" that isn't part of the grid itself: position, pending-wrap state
//! (the deferred autowrap the DEC terminals are famous for), the active SGR
//! attributes new cells are stamped with, the scrolling region, tab stops,
//! and the four G0-G3 character-set slots used by `DesignateCharset`/SS2/SS3.

use crate::cell::SgrAttrs;

/// A designated character set, selected into one of the four G-slots via
/// `ESC ( ` / `ESC ) ` / `ESC * ` / `ESC + ` style designators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Charset {
    /// US-ASCII, the default.
    #[default]
    Ascii,
    /// DEC Special Graphics (VT100 line-drawing set): remaps `_` through `~`
    /// to box-drawing characters.
    DecSpecialGraphics,
    /// UK national set: identical to ASCII except `#` renders as `£`.
    Uk,
}

/// Translate a printed character through the given G-set mapping.
///
/// Only `DecSpecialGraphics` and `Uk` remap anything; all other scalars pass
/// through unchanged, matching how real terminals only special-case the 7-bit
/// range covered by the classic VT100 designators.
#[must_use]
pub fn translate_charset(ch: char, charset: Charset) -> char {
    match charset {
        Charset::Ascii => ch,
        Charset::Uk => {
            if ch == '#' {
                '\u{00A3}'
            } else {
                ch
            }
        }
        Charset::DecSpecialGraphics => dec_special_graphics(ch),
    }
}

/// VT100 DEC Special Graphics remap for the printable range `0x5F..=0x7E`.
fn dec_special_graphics(ch: char) -> char {
    match ch {
        '_' => '\u{00A0}', // blank
        '`' => '\u{2666}', // diamond
        'a' => '\u{2592}', // checkerboard
        'b' => '\u{2409}', // HT symbol
        'c' => '\u{240C}', // FF symbol
        'd' => '\u{240D}', // CR symbol
        'e' => '\u{240A}', // LF symbol
        'f' => '\u{00B0}', // degree
        'g' => '\u{00B1}', // plus/minus
        'h' => '\u{2424}', // NL symbol
        'i' => '\u{240B}', // VT symbol
        'j' => '\u{2518}', // bottom-right corner
        'k' => '\u{2510}', // top-right corner
        'l' => '\u{250C}', // top-left corner
        'm' => '\u{2514}', // bottom-left corner
        'n' => '\u{253C}', // crossing lines
        'o' => '\u{23BA}', // scan line 1
        'p' => '\u{23BB}', // scan line 3
        'q' => '\u{2500}', // horizontal line
        'r' => '\u{23BC}', // scan line 7
        's' => '\u{23BD}', // scan line 9
        't' => '\u{251C}', // left tee
        'u' => '\u{2524}', // right tee
        'v' => '\u{2534}', // bottom tee
        'w' => '\u{252C}', // top tee
        'x' => '\u{2502}', // vertical line
        'y' => '\u{2264}', // less-or-equal
        'z' => '\u{2265}', // greater-or-equal
        '{' => '\u{03C0}', // pi
        '|' => '\u{2260}', // not-equal
        '}' => '\u{00A3}', // pound sterling
        '~' => '\u{00B7}', // bullet
        other => other,
    }
}

fn default_stop(col: u16) -> bool {
    col != 0 && col % 8 == 0
}

/// Cursor position, pending-wrap flag, scroll region, tab stops, and the
/// active SGR/charset state that new cells are stamped with on write.
#[derive(Debug, Clone, PartialEq)]
pub struct Cursor {
    pub row: u16,
    pub col: u16,
    /// Set when the last write landed in the rightmost column; the next
    /// printable character wraps to the next line *before* being placed
    /// (deferred autowrap, matching xterm).
    pub pending_wrap: bool,
    /// Text cursor visibility (DECTCEM, `CSI ?25 h/l`).
    pub visible: bool,
    /// SGR attributes stamped onto newly written cells.
    pub attrs: SgrAttrs,
    /// Pending single-shift target (`SS2`/`SS3`): consumed by the next
    /// printable character only.
    pub single_shift: Option<u8>,
    scroll_top: u16,
    scroll_bottom: u16,
    tab_stops: Vec<bool>,
    default_stops_enabled: bool,
    charsets: [Charset; 4],
}

impl Cursor {
    /// Create a cursor homed at `(0, 0)` with a full-screen scroll region and
    /// default (every 8 columns) tab stops.
    #[must_use]
    pub fn new(cols: u16, rows: u16) -> Self {
        let cols = cols.max(1);
        Self {
            row: 0,
            col: 0,
            pending_wrap: false,
            visible: true,
            attrs: SgrAttrs::default(),
            single_shift: None,
            scroll_top: 0,
            scroll_bottom: rows.max(1),
            tab_stops: (0..cols).map(default_stop).collect(),
            default_stops_enabled: true,
            charsets: [Charset::Ascii; 4],
        }
    }

    /// Create a cursor at an arbitrary (possibly out-of-bounds) position, for
    /// tests that immediately call [`Cursor::clamp`].
    #[must_use]
    pub fn at(row: u16, col: u16) -> Self {
        let mut cursor = Self::new(1, 1);
        cursor.row = row;
        cursor.col = col;
        cursor
    }

    /// Clamp the cursor into `[0, rows) x [0, cols)`.
    pub fn clamp(&mut self, rows: u16, cols: u16) {
        self.row = self.row.min(rows.saturating_sub(1));
        self.col = self.col.min(cols.saturating_sub(1));
    }

    pub fn carriage_return(&mut self) {
        self.col = 0;
        self.pending_wrap = false;
    }

    pub fn move_up(&mut self, count: u16) {
        self.row = self.row.saturating_sub(count);
        self.pending_wrap = false;
    }

    pub fn move_down(&mut self, count: u16, rows: u16) {
        self.row = self.row.saturating_add(count).min(rows.saturating_sub(1));
        self.pending_wrap = false;
    }

    pub fn move_left(&mut self, count: u16) {
        self.col = self.col.saturating_sub(count);
        self.pending_wrap = false;
    }

    pub fn move_right(&mut self, count: u16, cols: u16) {
        self.col = self.col.saturating_add(count).min(cols.saturating_sub(1));
        self.pending_wrap = false;
    }

    /// Absolute cursor positioning (CUP/HVP), clamped into bounds.
    pub fn move_to(&mut self, row: u16, col: u16, rows: u16, cols: u16) {
        self.row = row.min(rows.saturating_sub(1));
        self.col = col.min(cols.saturating_sub(1));
        self.pending_wrap = false;
    }

    #[must_use]
    pub fn scroll_top(&self) -> u16 {
        self.scroll_top
    }

    #[must_use]
    pub fn scroll_bottom(&self) -> u16 {
        self.scroll_bottom
    }

    /// Set the scrolling region (DECSTBM). `bottom` is exclusive. Invalid
    /// bounds (`top >= bottom` or `bottom > rows`) leave the region
    /// unchanged rather than producing an invalid state.
    pub fn set_scroll_region(&mut self, top: u16, bottom: u16, rows: u16) {
        let bottom = bottom.min(rows);
        if top < bottom {
            self.scroll_top = top;
            self.scroll_bottom = bottom;
        }
    }

    pub fn reset_scroll_region(&mut self, rows: u16) {
        self.scroll_top = 0;
        self.scroll_bottom = rows.max(1);
    }

    fn is_tab_stop(&self, col: u16) -> bool {
        match self.tab_stops.get(col as usize) {
            Some(&explicit) => explicit,
            None => self.default_stops_enabled && default_stop(col),
        }
    }

    fn ensure_stops_len(&mut self, len: usize) {
        while self.tab_stops.len() < len {
            let col = self.tab_stops.len() as u16;
            self.tab_stops
                .push(self.default_stops_enabled && default_stop(col));
        }
    }

    /// Next tab stop strictly after the current column, clamped to `cols-1`.
    #[must_use]
    pub fn next_tab_stop(&self, cols: u16) -> u16 {
        let max_col = cols.saturating_sub(1);
        let mut col = self.col.saturating_add(1);
        while col <= max_col {
            if self.is_tab_stop(col) {
                return col;
            }
            col += 1;
        }
        max_col
    }

    /// Previous tab stop strictly before the current column, or `0`.
    #[must_use]
    pub fn prev_tab_stop(&self) -> u16 {
        let mut col = self.col;
        while col > 0 {
            col -= 1;
            if self.is_tab_stop(col) {
                return col;
            }
        }
        0
    }

    pub fn set_tab_stop(&mut self) {
        self.ensure_stops_len(self.col as usize + 1);
        self.tab_stops[self.col as usize] = true;
    }

    pub fn clear_tab_stop(&mut self) {
        self.ensure_stops_len(self.col as usize + 1);
        self.tab_stops[self.col as usize] = false;
    }

    pub fn clear_all_tab_stops(&mut self) {
        for stop in &mut self.tab_stops {
            *stop = false;
        }
        self.default_stops_enabled = false;
    }

    /// Resize notification: clamps position into bounds, resets the
    /// scrolling region to full-screen, and extends the tab-stop table.
    pub fn resize(&mut self, cols: u16, rows: u16) {
        self.clamp(rows, cols);
        self.reset_scroll_region(rows);
        self.ensure_stops_len(cols as usize);
    }

    pub fn designate_charset(&mut self, slot: u8, charset: Charset) {
        self.charsets[(slot as usize) % 4] = charset;
    }

    /// The charset that the next printed character should be translated
    /// through: the single-shift target if one is pending, else G0.
    #[must_use]
    pub fn effective_charset(&self) -> Charset {
        match self.single_shift {
            Some(slot) => self.charsets[(slot as usize) % 4],
            None => self.charsets[0],
        }
    }

    /// Consume any pending single shift. Called once per printed character,
    /// whether or not a shift was pending.
    pub fn consume_single_shift(&mut self) {
        self.single_shift = None;
    }

    pub fn reset_charset(&mut self) {
        self.charsets = [Charset::Ascii; 4];
        self.single_shift = None;
    }
}

/// Saved cursor state (DECSC/DECRC): position, attributes, origin mode, and
/// the charset table, restored verbatim by DECRC / `ESC 8`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SavedCursor {
    row: u16,
    col: u16,
    attrs: SgrAttrs,
    origin_mode: bool,
    charsets: [Charset; 4],
    single_shift: Option<u8>,
    pending_wrap: bool,
}

impl SavedCursor {
    #[must_use]
    pub fn save(cursor: &Cursor, origin_mode: bool) -> Self {
        Self {
            row: cursor.row,
            col: cursor.col,
            attrs: cursor.attrs,
            origin_mode,
            charsets: cursor.charsets,
            single_shift: cursor.single_shift,
            pending_wrap: cursor.pending_wrap,
        }
    }

    pub fn restore(&self, cursor: &mut Cursor) {
        cursor.row = self.row;
        cursor.col = self.col;
        cursor.attrs = self.attrs;
        cursor.charsets = self.charsets;
        cursor.single_shift = self.single_shift;
        cursor.pending_wrap = self.pending_wrap;
    }

    #[must_use]
    pub fn origin_mode(&self) -> bool {
        self.origin_mode
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_homes_at_origin_with_full_scroll_region() {
        let cursor = Cursor::new(80, 24);
        assert_eq!((cursor.row, cursor.col), (0, 0));
        assert_eq!(cursor.scroll_top(), 0);
        assert_eq!(cursor.scroll_bottom(), 24);
        assert!(cursor.visible);
        assert!(!cursor.pending_wrap);
    }

    #[test]
    fn move_to_clamps_and_clears_pending_wrap() {
        let mut cursor = Cursor::new(10, 5);
        cursor.pending_wrap = true;
        cursor.move_to(100, 100, 5, 10);
        assert_eq!((cursor.row, cursor.col), (4, 9));
        assert!(!cursor.pending_wrap);
    }

    #[test]
    fn move_left_right_saturate_at_margins() {
        let mut cursor = Cursor::new(10, 5);
        cursor.move_left(5);
        assert_eq!(cursor.col, 0);
        cursor.move_right(50, 10);
        assert_eq!(cursor.col, 9);
    }

    #[test]
    fn default_tab_stops_every_eight_columns() {
        let cursor = Cursor::new(40, 5);
        assert_eq!(cursor.next_tab_stop(40), 8);
        let mut cursor = cursor;
        cursor.col = 8;
        assert_eq!(cursor.next_tab_stop(40), 16);
        assert_eq!(cursor.prev_tab_stop(), 0);
    }

    #[test]
    fn custom_tab_stop_set_and_cleared() {
        let mut cursor = Cursor::new(40, 5);
        cursor.col = 5;
        cursor.set_tab_stop();
        cursor.col = 0;
        assert_eq!(cursor.next_tab_stop(40), 5);

        cursor.col = 5;
        cursor.clear_tab_stop();
        assert_eq!(cursor.next_tab_stop(40), 8);
    }

    #[test]
    fn clear_all_tab_stops_disables_default_grid() {
        let mut cursor = Cursor::new(40, 5);
        cursor.clear_all_tab_stops();
        assert_eq!(cursor.next_tab_stop(40), 39);
    }

    #[test]
    fn set_scroll_region_rejects_invalid_bounds() {
        let mut cursor = Cursor::new(80, 24);
        cursor.set_scroll_region(10, 5, 24);
        assert_eq!((cursor.scroll_top(), cursor.scroll_bottom()), (0, 24));

        cursor.set_scroll_region(2, 20, 24);
        assert_eq!((cursor.scroll_top(), cursor.scroll_bottom()), (2, 20));
    }

    #[test]
    fn resize_resets_scroll_region_and_clamps() {
        let mut cursor = Cursor::new(80, 24);
        cursor.set_scroll_region(2, 20, 24);
        cursor.row = 23;
        cursor.col = 79;
        cursor.resize(40, 10);
        assert_eq!((cursor.row, cursor.col), (9, 39));
        assert_eq!((cursor.scroll_top(), cursor.scroll_bottom()), (0, 10));
    }

    #[test]
    fn single_shift_is_consumed_once() {
        let mut cursor = Cursor::new(80, 24);
        cursor.designate_charset(2, Charset::DecSpecialGraphics);
        cursor.single_shift = Some(2);
        assert_eq!(cursor.effective_charset(), Charset::DecSpecialGraphics);
        cursor.consume_single_shift();
        assert_eq!(cursor.effective_charset(), Charset::Ascii);
    }

    #[test]
    fn save_and_restore_round_trips_state() {
        let mut cursor = Cursor::new(80, 24);
        cursor.row = 5;
        cursor.col = 7;
        cursor.attrs.fg = crate::cell::Color::Named(2);
        cursor.designate_charset(0, Charset::DecSpecialGraphics);

        let saved = SavedCursor::save(&cursor, true);
        assert!(saved.origin_mode());

        let mut restored = Cursor::new(80, 24);
        saved.restore(&mut restored);
        assert_eq!((restored.row, restored.col), (5, 7));
        assert_eq!(restored.attrs.fg, crate::cell::Color::Named(2));
        assert_eq!(restored.effective_charset(), Charset::DecSpecialGraphics);
    }

    #[test]
    fn dec_special_graphics_remaps_line_drawing() {
        assert_eq!(translate_charset('q', Charset::DecSpecialGraphics), '\u{2500}');
        assert_eq!(translate_charset('x', Charset::DecSpecialGraphics), '\u{2502}');
        assert_eq!(translate_charset('A', Charset::DecSpecialGraphics), 'A');
        assert_eq!(translate_charset('A', Charset::Ascii), 'A');
        assert_eq!(translate_charset('#', Charset::Uk), '\u{00A3}');
    }
}
