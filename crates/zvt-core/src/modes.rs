//! Terminal mode bits: ANSI (`CSI h`/`CSI l`) and DEC-private (`CSI ? h`/`CSI
//! ? l`) mode sets.
//!
//! The wire protocol keeps these two parameter spaces disjoint (the `?`
//! prefix distinguishes them), so they're modeled as two separate
//! `bitflags` sets rather than one combined bitfield.

use bitflags::bitflags;

bitflags! {
    /// ANSI standard modes, set/reset via plain `CSI Pn h` / `CSI Pn l`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct AnsiModes: u32 {
        /// IRM (mode 4): insert mode — printable characters shift the rest
        /// of the row right instead of overwriting.
        const INSERT = 1 << 0;
        /// LNM (mode 20): linefeed also performs a carriage return.
        const LINEFEED_NEWLINE = 1 << 1;
    }
}

bitflags! {
    /// DEC private modes, set/reset via `CSI ? Pn h` / `CSI ? Pn l`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct DecModes: u32 {
        /// DECCKM (?1): cursor keys send application sequences.
        const APPLICATION_CURSOR = 1 << 0;
        /// DECOM (?6): cursor addressing is relative to the scroll region.
        const ORIGIN = 1 << 1;
        /// DECAWM (?7): autowrap at the right margin. On by default.
        const AUTOWRAP = 1 << 2;
        /// DECARM (?8): keyboard auto-repeat.
        const AUTO_REPEAT = 1 << 3;
        /// X10 mouse reporting (?9).
        const SEND_MOUSE_PRESS = 1 << 4;
        /// Button-event mouse tracking (?1002).
        const SEND_MOUSE_BOTH = 1 << 5;
        /// Any-event mouse tracking (?1003).
        const SEND_MOUSE_ANY = 1 << 6;
        /// SGR extended mouse coordinates (?1006).
        const SGR_MOUSE = 1 << 7;
        /// Cursor blink (?12).
        const CURSOR_BLINK = 1 << 8;
        /// DECTCEM (?25): text cursor visible. On by default.
        const CURSOR_VISIBLE = 1 << 9;
        /// Alternate screen buffer (?47 / ?1047 / ?1049).
        const ALT_SCREEN = 1 << 10;
        /// Bracketed paste mode (?2004).
        const BRACKETED_PASTE = 1 << 11;
        /// Focus in/out event reporting (?1004).
        const FOCUS_EVENTS = 1 << 12;
    }
}

impl Default for DecModes {
    fn default() -> Self {
        DecModes::AUTOWRAP | DecModes::CURSOR_VISIBLE | DecModes::AUTO_REPEAT
    }
}

/// Combined ANSI + DEC mode state for a terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Modes {
    pub ansi: AnsiModes,
    pub dec: DecModes,
}

impl Modes {
    #[must_use]
    pub fn new() -> Self {
        Self {
            ansi: AnsiModes::empty(),
            dec: DecModes::default(),
        }
    }

    /// Reset to power-on defaults (used by DECSTR soft reset and RIS).
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    #[must_use]
    pub fn origin_mode(&self) -> bool {
        self.dec.contains(DecModes::ORIGIN)
    }

    #[must_use]
    pub fn autowrap(&self) -> bool {
        self.dec.contains(DecModes::AUTOWRAP)
    }

    #[must_use]
    pub fn insert_mode(&self) -> bool {
        self.ansi.contains(AnsiModes::INSERT)
    }

    #[must_use]
    pub fn cursor_visible(&self) -> bool {
        self.dec.contains(DecModes::CURSOR_VISIBLE)
    }

    #[must_use]
    pub fn alt_screen(&self) -> bool {
        self.dec.contains(DecModes::ALT_SCREEN)
    }

    /// Apply a DEC private mode parameter from `CSI ? Pn h` / `CSI ? Pn l`.
    /// Unrecognized parameters are ignored, matching real terminals.
    pub fn set_dec_mode(&mut self, param: i64, enabled: bool) {
        if let Some(flag) = Self::dec_flag_for(param) {
            self.dec.set(flag, enabled);
        }
    }

    /// Apply an ANSI mode parameter from `CSI Pn h` / `CSI Pn l`.
    pub fn set_ansi_mode(&mut self, param: i64, enabled: bool) {
        if let Some(flag) = Self::ansi_flag_for(param) {
            self.ansi.set(flag, enabled);
        }
    }

    fn dec_flag_for(param: i64) -> Option<DecModes> {
        Some(match param {
            1 => DecModes::APPLICATION_CURSOR,
            6 => DecModes::ORIGIN,
            7 => DecModes::AUTOWRAP,
            8 => DecModes::AUTO_REPEAT,
            9 | 1000 => DecModes::SEND_MOUSE_PRESS,
            1002 => DecModes::SEND_MOUSE_BOTH,
            1003 => DecModes::SEND_MOUSE_ANY,
            1006 => DecModes::SGR_MOUSE,
            12 => DecModes::CURSOR_BLINK,
            25 => DecModes::CURSOR_VISIBLE,
            47 | 1047 | 1049 => DecModes::ALT_SCREEN,
            1004 => DecModes::FOCUS_EVENTS,
            2004 => DecModes::BRACKETED_PASTE,
            _ => return None,
        })
    }

    fn ansi_flag_for(param: i64) -> Option<AnsiModes> {
        Some(match param {
            4 => AnsiModes::INSERT,
            20 => AnsiModes::LINEFEED_NEWLINE,
            _ => return None,
        })
    }
}

impl Default for Modes {
    fn default() -> Self {
        Self::new()
    }
}
