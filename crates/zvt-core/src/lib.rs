#![forbid(unsafe_code)]

//! Host-agnostic VT/ANSI terminal engine.
//!
//! `zvt-core` is the platform-independent terminal model at the heart of
//! the workspace. It owns grid state, VT/ANSI parsing, cursor positioning,
//! scrollback, selection, active-match highlighting, and a `Terminal` that
//! wires all of these together — all without any host I/O dependencies.
//!
//! # Primary responsibilities
//!
//! - **Grid**: 2D cell matrix representing the visible terminal viewport.
//! - **Cell**: character content + SGR attributes (colors, bold, italic, etc.).
//! - **Parser**: VT/ANSI state machine (Paul Flo Williams model, 12 states).
//! - **Cursor**: position, visibility, and origin/autowrap mode tracking.
//! - **Modes**: DEC private modes and ANSI standard modes.
//! - **Patch**: minimal diff between two grid snapshots for efficient updates.
//! - **Scrollback**: ring buffer for lines scrolled off the top of the viewport.
//! - **Selection**: char/word/line text selection and extraction.
//! - **ActiveMatch**: regex-registered highlight regions over the viewport.
//! - **Terminal**: the orchestrator binding grid + parser + cursor + modes +
//!   scrollback + selection into one byte-stream-in, patch-out engine.
//!
//! # Design principles
//!
//! - **No I/O**: all types are pure data + logic; the host adapter supplies bytes.
//! - **Deterministic**: identical byte sequences always produce identical state.
//! - **`#![forbid(unsafe_code)]`**: safety enforced at compile time.

pub mod active_match;
pub mod cell;
pub mod cursor;
pub mod grid;
pub mod modes;
pub mod parser;
pub mod patch;
pub mod scrollback;
pub mod selection;
pub mod terminal;

pub use active_match::{ActiveMatch, ActiveMatchEngine, MatchBlock, MatchId};
pub use cell::{Cell, CellFlags, Color, HyperlinkId, HyperlinkRegistry, SgrAttrs, SgrFlags};
pub use cursor::{Charset, Cursor, SavedCursor, translate_charset};
pub use grid::Grid;
pub use modes::{AnsiModes, DecModes, Modes};
pub use parser::{Action, Parser};
pub use patch::{CellUpdate, ChangeRun, DirtySpan, DirtyTracker, GridDiff, Patch, ScrollPolicy};
pub use scrollback::{Scrollback, ScrollbackLine, VirtualizedWindow};
pub use selection::{
    BufferPos, Selection, SelectionGranularity, SelectionKind, SelectionModifiers, WordClass,
};
pub use terminal::Terminal;
