//! VT/ANSI parser.
//!
//! A byte-at-a-time state machine that turns an output stream from a pty
//! into a sequence of [`Action`]s. The parser never inspects terminal state
//! (grid, cursor, modes) — that's the job of whatever applies the actions —
//! so it can be fed bytes from any source (a real pty, a test fixture, a
//! recorded session) and reused across hosts.
//!
//! Covers C0 controls, 7-bit `ESC` sequences, `CSI` (with DEC private
//! markers and SGR mouse reporting), `OSC` (title + OSC 8 hyperlinks), and
//! UTF-8 decoding of printable text. `DCS`/`SOS`/`PM`/`APC` strings are
//! recognized and swallowed (their payloads — Sixel, DECRQSS, etc. — are out
//! of scope) rather than leaking into `Print`.
//!
//! 8-bit C1 control codes (0x80-0x9F) are not special-cased: in a UTF-8
//! stream those byte values only ever appear as continuation bytes, never as
//! standalone controls, so treating them as plain UTF-8 input is both
//! simpler and correct for a modern terminal.

use crate::cursor::Charset;

/// Parser output actions. Each variant maps to one piece of terminal
/// behavior; the split between e.g. `CursorRow`/`CursorColumn`/
/// `CursorPosition` mirrors the distinct VT escape sequences (VPA, HPA, CUP)
/// rather than collapsing them into one "move cursor" action, since origin
/// mode and default-parameter handling differ between them.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Print a single character (after UTF-8 decoding).
    Print(char),
    /// Line feed / newline (`\n`, `\x0b`, `\x0c`).
    Newline,
    /// Carriage return (`\r`).
    CarriageReturn,
    /// Horizontal tab (`\t`).
    Tab,
    /// Backspace (`\x08`).
    Backspace,
    /// Bell (`\x07`).
    Bell,

    /// CUU: move cursor up.
    CursorUp(u16),
    /// CUD: move cursor down.
    CursorDown(u16),
    /// CUF: move cursor right.
    CursorRight(u16),
    /// CUB: move cursor left.
    CursorLeft(u16),
    /// CNL: move cursor down and to column 0.
    CursorNextLine(u16),
    /// CPL: move cursor up and to column 0.
    CursorPrevLine(u16),
    /// VPA: move to an absolute row (0-based), same column.
    CursorRow(u16),
    /// HPA/CHA: move to an absolute column (0-based), same row.
    CursorColumn(u16),
    /// CUP/HVP: move to an absolute row and column (0-based).
    CursorPosition { row: u16, col: u16 },

    /// DECSTBM: set the scroll region. `bottom == 0` means "to the last row".
    SetScrollRegion { top: u16, bottom: u16 },
    /// SU: scroll the region up, revealing blank lines at the bottom.
    ScrollUp(u16),
    /// SD: scroll the region down, revealing blank lines at the top.
    ScrollDown(u16),
    /// IL: insert blank lines at the cursor row.
    InsertLines(u16),
    /// DL: delete lines at the cursor row.
    DeleteLines(u16),
    /// ICH: insert blank characters at the cursor column.
    InsertChars(u16),
    /// DCH: delete characters at the cursor column.
    DeleteChars(u16),
    /// ECH: erase characters at the cursor column (no shifting).
    EraseChars(u16),
    /// DECIC: insert `n` blank columns at the cursor column, across every row.
    InsertColumns(u16),
    /// DECDC: delete `n` columns at the cursor column, across every row.
    DeleteColumns(u16),
    /// CBT: move back `n` tab stops.
    BackTab(u16),
    /// REP: repeat the last printed character `n` times.
    RepeatChar(u16),

    /// ED: erase in display (0 = below, 1 = above, 2 = all, 3 = + scrollback).
    EraseInDisplay(u8),
    /// EL: erase in line (0 = right, 1 = left, 2 = whole line).
    EraseInLine(u8),
    /// DECSED/DECSET-driven full scrollback clear (`ED` mode 3).
    EraseScrollback,

    /// SGR: set graphic rendition parameters.
    Sgr(Vec<i64>),
    /// `CSI ? Pm h`: set DEC private modes.
    DecSet(Vec<i64>),
    /// `CSI ? Pm l`: reset DEC private modes.
    DecRst(Vec<i64>),
    /// `CSI Pm h`: set ANSI modes.
    AnsiSet(Vec<i64>),
    /// `CSI Pm l`: reset ANSI modes.
    AnsiRst(Vec<i64>),

    /// DECSC: save cursor position, attributes, and charset state.
    SaveCursor,
    /// DECRC: restore previously saved cursor state.
    RestoreCursor,
    /// IND: move down one line, scrolling if at the bottom margin.
    Index,
    /// RI: move up one line, scrolling if at the top margin.
    ReverseIndex,
    /// NEL: carriage return + index.
    NextLine,
    /// RIS: full reset (clears screen, scrollback, modes, cursor).
    FullReset,
    /// DECSTR: soft reset (modes/SGR/scroll region/cursor, screen untouched).
    SoftReset,
    /// DECALN: fill the screen with `E` for alignment testing.
    ScreenAlignment,

    /// OSC 0/1/2: set window/icon title.
    SetTitle(String),
    /// OSC 8 with a non-empty URI: begin a hyperlink span.
    HyperlinkStart { uri: String, id: Option<String> },
    /// OSC 8 with an empty URI: end the current hyperlink span.
    HyperlinkEnd,

    /// HTS: set a tab stop at the cursor column.
    SetTabStop,
    /// TBC: clear tab stop(s) (0 = current column, 3/5 = all).
    ClearTabStop(u8),

    /// DECKPAM: application keypad mode.
    ApplicationKeypad,
    /// DECKPNM: normal keypad mode.
    NormalKeypad,
    /// DECSCUSR: set the cursor's rendered shape.
    SetCursorShape(CursorShape),

    /// Focus-in event (reported when focus-tracking mode is enabled).
    FocusIn,
    /// Focus-out event.
    FocusOut,
    /// Bracketed-paste start marker.
    PasteStart,
    /// Bracketed-paste end marker.
    PasteEnd,

    /// DA1: primary device attributes query.
    DeviceAttributes,
    /// DA2: secondary device attributes query.
    DeviceAttributesSecondary,
    /// DSR: device status report query.
    DeviceStatusReport,
    /// DSR(6): cursor position report query.
    CursorPositionReport,

    /// Designate a G0-G3 charset slot (`slot` 0-3).
    DesignateCharset { slot: u8, charset: Charset },
    /// SS2: the next character only uses G2.
    SingleShift2,
    /// SS3: the next character only uses G3.
    SingleShift3,

    /// SGR-protocol mouse report (`CSI < Pb ; Px ; Py M/m`).
    MouseEvent {
        button: u8,
        col: u16,
        row: u16,
        pressed: bool,
    },

    /// A recognized-but-unhandled escape/CSI sequence, captured verbatim
    /// (including the leading `ESC`) for diagnostics.
    Escape(Vec<u8>),
}

/// Cursor rendering shape, set via DECSCUSR (`CSI Ps SP q`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorShape {
    BlinkingBlock,
    SteadyBlock,
    BlinkingUnderline,
    SteadyUnderline,
    BlinkingBar,
    SteadyBar,
}

impl CursorShape {
    fn from_param(param: i64) -> Self {
        match param {
            2 => CursorShape::SteadyBlock,
            3 => CursorShape::BlinkingUnderline,
            4 => CursorShape::SteadyUnderline,
            5 => CursorShape::BlinkingBar,
            6 => CursorShape::SteadyBar,
            _ => CursorShape::BlinkingBlock,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Ground,
    Escape,
    EscapeIntermediate,
    Csi,
    CsiIgnore,
    Osc,
    OscEsc,
    Dcs,
    DcsEsc,
    SosPmApc,
    SosPmApcEsc,
}

const MAX_PARAMS: usize = 32;
const MAX_OSC_LEN: usize = 4096;

/// VT/ANSI parser state machine.
#[derive(Debug, Clone)]
pub struct Parser {
    state: State,
    raw: Vec<u8>,
    params: Vec<i64>,
    param_acc: Option<i64>,
    intermediates: Vec<u8>,
    private_marker: Option<u8>,
    osc_buf: Vec<u8>,
    utf8_acc: u32,
    utf8_need: u8,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    /// Create a new parser in ground state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: State::Ground,
            raw: Vec::new(),
            params: Vec::new(),
            param_acc: None,
            intermediates: Vec::new(),
            private_marker: None,
            osc_buf: Vec::new(),
            utf8_acc: 0,
            utf8_need: 0,
        }
    }

    /// Feed a chunk of bytes and return parsed actions.
    #[must_use]
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<Action> {
        let mut out = Vec::new();
        for &b in bytes {
            if let Some(action) = self.advance(b) {
                out.push(action);
            }
        }
        out
    }

    /// Advance the parser by one byte.
    ///
    /// Returns an action when a complete token is recognized.
    pub fn advance(&mut self, b: u8) -> Option<Action> {
        // CAN/SUB abort any in-progress sequence unconditionally.
        if matches!(b, 0x18 | 0x1a) && self.state != State::Ground {
            self.reset_to_ground();
            return None;
        }
        // A bare ESC always restarts a new sequence, abandoning whatever was
        // in progress (xterm behavior).
        if b == 0x1b && !matches!(self.state, State::Ground) {
            self.enter_escape();
            return None;
        }

        match self.state {
            State::Ground => self.advance_ground(b),
            State::Escape => self.advance_escape(b),
            State::EscapeIntermediate => self.advance_escape_intermediate(b),
            State::Csi => self.advance_csi(b),
            State::CsiIgnore => self.advance_csi_ignore(b),
            State::Osc => self.advance_osc(b),
            State::OscEsc => self.advance_osc_esc(b),
            State::Dcs => self.advance_dcs(b),
            State::DcsEsc => self.advance_dcs_esc(b),
            State::SosPmApc => self.advance_sos_pm_apc(b),
            State::SosPmApcEsc => self.advance_sos_pm_apc_esc(b),
        }
    }

    fn reset_to_ground(&mut self) {
        self.state = State::Ground;
        self.raw.clear();
        self.params.clear();
        self.param_acc = None;
        self.intermediates.clear();
        self.private_marker = None;
        self.osc_buf.clear();
        self.utf8_need = 0;
    }

    fn enter_escape(&mut self) {
        self.state = State::Escape;
        self.raw.clear();
        self.raw.push(0x1b);
        self.params.clear();
        self.param_acc = None;
        self.intermediates.clear();
        self.private_marker = None;
        self.utf8_need = 0;
    }

    // ---- Ground / UTF-8 -------------------------------------------------

    fn advance_ground(&mut self, b: u8) -> Option<Action> {
        if self.utf8_need > 0 {
            return self.advance_utf8_continuation(b);
        }
        match b {
            0x07 => Some(Action::Bell),
            0x08 => Some(Action::Backspace),
            0x09 => Some(Action::Tab),
            0x0a | 0x0b | 0x0c => Some(Action::Newline),
            0x0d => Some(Action::CarriageReturn),
            0x1b => {
                self.enter_escape();
                None
            }
            0x00..=0x06 | 0x0e..=0x1a | 0x1c..=0x1f | 0x7f => None,
            0x20..=0x7e => Some(Action::Print(b as char)),
            0x80..=0xbf | 0xc0 | 0xc1 | 0xf5..=0xff => None,
            0xc2..=0xdf => {
                self.start_utf8(b, 1);
                None
            }
            0xe0..=0xef => {
                self.start_utf8(b, 2);
                None
            }
            0xf0..=0xf4 => {
                self.start_utf8(b, 3);
                None
            }
        }
    }

    fn start_utf8(&mut self, lead: u8, need: u8) {
        self.utf8_acc = match need {
            1 => (lead & 0x1f) as u32,
            2 => (lead & 0x0f) as u32,
            _ => (lead & 0x07) as u32,
        };
        self.utf8_need = need;
    }

    fn advance_utf8_continuation(&mut self, b: u8) -> Option<Action> {
        if b & 0xc0 != 0x80 {
            self.utf8_need = 0;
            return self.advance_ground(b);
        }
        self.utf8_acc = (self.utf8_acc << 6) | (b & 0x3f) as u32;
        self.utf8_need -= 1;
        if self.utf8_need == 0 {
            let ch = char::from_u32(self.utf8_acc).unwrap_or('\u{fffd}');
            Some(Action::Print(ch))
        } else {
            None
        }
    }

    // ---- ESC --------------------------------------------------------------

    fn advance_escape(&mut self, b: u8) -> Option<Action> {
        self.raw.push(b);
        match b {
            b'[' => {
                self.state = State::Csi;
                self.params.clear();
                self.param_acc = None;
                self.intermediates.clear();
                self.private_marker = None;
                None
            }
            b']' => {
                self.state = State::Osc;
                self.osc_buf.clear();
                None
            }
            b'P' => {
                self.state = State::Dcs;
                None
            }
            b'X' | b'^' | b'_' => {
                self.state = State::SosPmApc;
                None
            }
            0x20..=0x2f => {
                self.intermediates.push(b);
                self.state = State::EscapeIntermediate;
                None
            }
            _ => {
                self.state = State::Ground;
                self.esc_dispatch(b)
            }
        }
    }

    fn advance_escape_intermediate(&mut self, b: u8) -> Option<Action> {
        self.raw.push(b);
        match b {
            0x20..=0x2f => {
                self.intermediates.push(b);
                None
            }
            _ => {
                self.state = State::Ground;
                self.esc_dispatch(b)
            }
        }
    }

    fn esc_dispatch(&mut self, final_byte: u8) -> Option<Action> {
        let action = if self.intermediates.is_empty() {
            match final_byte {
                b'c' => Some(Action::FullReset),
                b'D' => Some(Action::Index),
                b'M' => Some(Action::ReverseIndex),
                b'E' => Some(Action::NextLine),
                b'H' => Some(Action::SetTabStop),
                b'7' => Some(Action::SaveCursor),
                b'8' => Some(Action::RestoreCursor),
                b'=' => Some(Action::ApplicationKeypad),
                b'>' => Some(Action::NormalKeypad),
                b'N' => Some(Action::SingleShift2),
                b'O' => Some(Action::SingleShift3),
                _ => None,
            }
        } else if self.intermediates.len() == 1 && self.intermediates[0] == b'#' {
            match final_byte {
                b'8' => Some(Action::ScreenAlignment),
                _ => None,
            }
        } else if self.intermediates.len() == 1 {
            let slot = match self.intermediates[0] {
                b'(' => Some(0u8),
                b')' => Some(1u8),
                b'*' => Some(2u8),
                b'+' => Some(3u8),
                _ => None,
            };
            slot.map(|slot| {
                let charset = match final_byte {
                    b'0' => Charset::DecSpecialGraphics,
                    b'A' => Charset::Uk,
                    _ => Charset::Ascii,
                };
                Action::DesignateCharset { slot, charset }
            })
        } else {
            None
        };
        self.intermediates.clear();
        action.or_else(|| Some(Action::Escape(self.take_raw())))
    }

    // ---- CSI ----------------------------------------------------------------

    fn advance_csi(&mut self, b: u8) -> Option<Action> {
        self.raw.push(b);
        match b {
            b'0'..=b'9' => {
                let digit = (b - b'0') as i64;
                self.param_acc = Some(self.param_acc.unwrap_or(0) * 10 + digit);
                None
            }
            b';' | b':' => {
                self.push_param();
                None
            }
            b'<' | b'=' | b'>' | b'?' if self.params.is_empty() && self.param_acc.is_none() => {
                self.private_marker = Some(b);
                None
            }
            0x20..=0x2f => {
                self.intermediates.push(b);
                None
            }
            0x40..=0x7e => {
                self.push_param();
                self.state = State::Ground;
                self.csi_dispatch(b)
            }
            _ => {
                self.state = State::CsiIgnore;
                None
            }
        }
    }

    fn advance_csi_ignore(&mut self, b: u8) -> Option<Action> {
        self.raw.push(b);
        if (0x40..=0x7e).contains(&b) {
            self.state = State::Ground;
            return Some(Action::Escape(self.take_raw()));
        }
        None
    }

    fn push_param(&mut self) {
        if self.params.len() < MAX_PARAMS {
            self.params.push(self.param_acc.unwrap_or(0));
        }
        self.param_acc = None;
    }

    fn param(&self, idx: usize) -> i64 {
        self.params.get(idx).copied().unwrap_or(0)
    }

    fn param_or(&self, idx: usize, default: i64) -> i64 {
        match self.params.get(idx) {
            Some(&0) | None => default,
            Some(&v) => v,
        }
    }

    fn count(&self, idx: usize) -> u16 {
        self.param_or(idx, 1).clamp(1, u16::MAX as i64) as u16
    }

    fn csi_dispatch(&mut self, final_byte: u8) -> Option<Action> {
        let private = self.private_marker;
        let action = match (private, final_byte) {
            (None, b'A') => Some(Action::CursorUp(self.count(0))),
            (None, b'B' | b'e') => Some(Action::CursorDown(self.count(0))),
            (None, b'C' | b'a') => Some(Action::CursorRight(self.count(0))),
            (None, b'D') => Some(Action::CursorLeft(self.count(0))),
            (None, b'E') => Some(Action::CursorNextLine(self.count(0))),
            (None, b'F') => Some(Action::CursorPrevLine(self.count(0))),
            (None, b'G' | b'`') => {
                Some(Action::CursorColumn(self.param_or(0, 1).saturating_sub(1) as u16))
            }
            (None, b'd') => Some(Action::CursorRow(self.param_or(0, 1).saturating_sub(1) as u16)),
            (None, b'H' | b'f') => Some(Action::CursorPosition {
                row: self.param_or(0, 1).saturating_sub(1) as u16,
                col: self.param_or(1, 1).saturating_sub(1) as u16,
            }),
            (None, b'J') => Some(Action::EraseInDisplay(self.param(0) as u8)),
            (None, b'K') => Some(Action::EraseInLine(self.param(0) as u8)),
            (None, b'L') => Some(Action::InsertLines(self.count(0))),
            (None, b'M') => Some(Action::DeleteLines(self.count(0))),
            (None, b'P') => Some(Action::DeleteChars(self.count(0))),
            (None, b'@') => Some(Action::InsertChars(self.count(0))),
            (None, b'X') => Some(Action::EraseChars(self.count(0))),
            (None, b'S') => Some(Action::ScrollUp(self.count(0))),
            (None, b'T') => Some(Action::ScrollDown(self.count(0))),
            (None, b'Z') => Some(Action::BackTab(self.count(0))),
            (None, b'b') => Some(Action::RepeatChar(self.count(0))),
            (None, b'g') => Some(Action::ClearTabStop(self.param(0) as u8)),
            (None, b'r') => Some(Action::SetScrollRegion {
                top: self.param_or(0, 1).saturating_sub(1).max(0) as u16,
                bottom: self.param(1) as u16,
            }),
            (None, b'm') => Some(Action::Sgr(self.params.clone())),
            (None, b'h') => Some(Action::AnsiSet(self.params.clone())),
            (None, b'l') => Some(Action::AnsiRst(self.params.clone())),
            (Some(b'?'), b'h') => Some(Action::DecSet(self.params.clone())),
            (Some(b'?'), b'l') => Some(Action::DecRst(self.params.clone())),
            (None, b'n') => match self.param(0) {
                5 => Some(Action::DeviceStatusReport),
                6 => Some(Action::CursorPositionReport),
                _ => None,
            },
            (None, b'c') => Some(Action::DeviceAttributes),
            (Some(b'>'), b'c') => Some(Action::DeviceAttributesSecondary),
            (None, b'q') if self.intermediates == [b' '] => {
                Some(Action::SetCursorShape(CursorShape::from_param(self.param(0))))
            }
            (None, b'p') if self.intermediates == [b'!'] => Some(Action::SoftReset),
            (None, b'}') => Some(Action::InsertColumns(self.count(0))),
            (None, b'~') if self.intermediates == [b'\''] => {
                Some(Action::DeleteColumns(self.count(0)))
            }
            (Some(b'<'), b'M' | b'm') => {
                let pressed = final_byte == b'M';
                let btn = self.param(0) as u8;
                Some(Action::MouseEvent {
                    button: btn & 0x03,
                    col: self.param_or(1, 1).saturating_sub(1).max(0) as u16,
                    row: self.param_or(2, 1).saturating_sub(1).max(0) as u16,
                    pressed,
                })
            }
            _ => None,
        };
        self.intermediates.clear();
        let marker = self.private_marker.take();
        self.params.clear();

        match action {
            Some(Action::EraseInDisplay(3)) => Some(Action::EraseScrollback),
            Some(action) => Some(action),
            None => {
                let _ = marker;
                Some(Action::Escape(self.take_raw()))
            }
        }
    }

    // ---- OSC ----------------------------------------------------------------

    fn advance_osc(&mut self, b: u8) -> Option<Action> {
        match b {
            0x07 => {
                self.state = State::Ground;
                self.osc_dispatch()
            }
            0x1b => {
                self.state = State::OscEsc;
                None
            }
            _ => {
                if self.osc_buf.len() < MAX_OSC_LEN {
                    self.osc_buf.push(b);
                }
                None
            }
        }
    }

    fn advance_osc_esc(&mut self, b: u8) -> Option<Action> {
        if b == b'\\' {
            self.state = State::Ground;
            return self.osc_dispatch();
        }
        // Not a genuine ST; the ESC began a fresh sequence instead.
        self.enter_escape();
        self.advance(b)
    }

    fn osc_dispatch(&mut self) -> Option<Action> {
        let buf = std::mem::take(&mut self.osc_buf);
        let text = String::from_utf8_lossy(&buf);
        let mut parts = text.splitn(2, ';');
        let ps = parts.next().unwrap_or("");
        let rest = parts.next().unwrap_or("");

        match ps {
            "0" | "1" | "2" => Some(Action::SetTitle(rest.to_string())),
            "8" => {
                let mut sub = rest.splitn(2, ';');
                let params = sub.next().unwrap_or("");
                let uri = sub.next().unwrap_or("");
                if uri.is_empty() {
                    Some(Action::HyperlinkEnd)
                } else {
                    let id = params
                        .split(':')
                        .find_map(|kv| kv.strip_prefix("id="))
                        .map(str::to_string);
                    Some(Action::HyperlinkStart {
                        uri: uri.to_string(),
                        id,
                    })
                }
            }
            "52" => None, // clipboard access: out of scope
            "1004" => None,
            _ => None,
        }
    }

    // ---- DCS / SOS / PM / APC (swallowed) ------------------------------------

    fn advance_dcs(&mut self, b: u8) -> Option<Action> {
        if b == 0x1b {
            self.state = State::DcsEsc;
        }
        None
    }

    fn advance_dcs_esc(&mut self, b: u8) -> Option<Action> {
        if b == b'\\' {
            self.state = State::Ground;
        } else {
            self.state = State::Dcs;
        }
        None
    }

    fn advance_sos_pm_apc(&mut self, b: u8) -> Option<Action> {
        if b == 0x1b {
            self.state = State::SosPmApcEsc;
        }
        None
    }

    fn advance_sos_pm_apc_esc(&mut self, b: u8) -> Option<Action> {
        if b == b'\\' {
            self.state = State::Ground;
        } else {
            self.state = State::SosPmApc;
        }
        None
    }

    fn take_raw(&mut self) -> Vec<u8> {
        let mut out = Vec::new();
        core::mem::swap(&mut out, &mut self.raw);
        out
    }
}
