#![deny(unsafe_code)]

//! Pty bridge for zvt-core: spawns and drives a child shell over a
//! pseudo-terminal.
//!
//! # Why this exists
//! zvt-core's screen model and parser are byte-stream consumers; something
//! has to own the actual child process and pump bytes in both directions.
//! `PtySession` is that something, built on `portable-pty` for the
//! cross-platform pty allocation and `signal-hook` for child-death
//! notification.
//!
//! # Safety / policy
//! This crate denies unsafe code by default. The single exception is the
//! child-side pre-exec signal reset, which must call `libc::signal`
//! directly; that function carries its own narrow `#[allow(unsafe_code)]`.
//! See `DESIGN.md` for why this crate cannot carry zvt-core's
//! `#![forbid(unsafe_code)]`.

pub mod virtual_terminal;

use std::fmt;
use std::io::{self, Read, Write};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use portable_pty::{Child, CommandBuilder, ExitStatus, PtySize, native_pty_system};
use signal_hook::consts::signal::SIGCHLD;
use signal_hook::iterator::Signals;

bitflags::bitflags! {
    /// Which legacy login-accounting databases a session should be
    /// recorded in. Writes are best-effort and platform-specific; see
    /// [`PtySession::spawn`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct UtmpLogging: u8 {
        const UTMP    = 0b001;
        const WTMP    = 0b010;
        const LASTLOG = 0b100;
    }
}

impl Default for UtmpLogging {
    fn default() -> Self {
        UtmpLogging::empty()
    }
}

/// Pty dimensions in cells and (optionally) pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PtySize2 {
    pub cols: u16,
    pub rows: u16,
    pub pixel_width: u16,
    pub pixel_height: u16,
}

impl PtySize2 {
    #[must_use]
    pub const fn new(cols: u16, rows: u16) -> Self {
        Self {
            cols,
            rows,
            pixel_width: 0,
            pixel_height: 0,
        }
    }
}

impl From<PtySize2> for PtySize {
    fn from(size: PtySize2) -> Self {
        PtySize {
            rows: size.rows,
            cols: size.cols,
            pixel_width: size.pixel_width,
            pixel_height: size.pixel_height,
        }
    }
}

/// Errors produced by the pty bridge.
#[derive(Debug)]
pub enum PtyError {
    /// Failed to allocate a pty or spawn the child command.
    Spawn(io::Error),
    /// An I/O error occurred while reading from or writing to the pty.
    Io(io::Error),
    /// The session was already shut down.
    AlreadyShutDown,
}

impl fmt::Display for PtyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PtyError::Spawn(err) => write!(f, "failed to spawn pty child: {err}"),
            PtyError::Io(err) => write!(f, "pty I/O error: {err}"),
            PtyError::AlreadyShutDown => write!(f, "pty session was already shut down"),
        }
    }
}

impl std::error::Error for PtyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PtyError::Spawn(err) | PtyError::Io(err) => Some(err),
            PtyError::AlreadyShutDown => None,
        }
    }
}

fn portable_pty_error(err: impl fmt::Display) -> PtyError {
    PtyError::Spawn(io::Error::other(err.to_string()))
}

#[derive(Debug)]
enum ReaderMsg {
    Data(Vec<u8>),
    Eof,
    Err(io::Error),
}

/// Resets signal disposition in the child before exec, matching what a
/// login shell expects: SIGINT/SIGQUIT/SIGCHLD/SIGPIPE go back to default,
/// SIGTSTP/SIGTTIN/SIGTTOU are ignored so job control in the child shell
/// itself behaves normally rather than inheriting the parent's handlers.
#[cfg(unix)]
fn reset_child_signal_disposition() -> io::Result<()> {
    #[allow(unsafe_code)]
    unsafe fn set(signum: libc::c_int, handler: libc::sighandler_t) -> io::Result<()> {
        if libc::signal(signum, handler) == libc::SIG_ERR {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }

    #[allow(unsafe_code)]
    unsafe {
        set(libc::SIGINT, libc::SIG_DFL)?;
        set(libc::SIGQUIT, libc::SIG_DFL)?;
        set(libc::SIGCHLD, libc::SIG_DFL)?;
        set(libc::SIGPIPE, libc::SIG_DFL)?;
        set(libc::SIGTSTP, libc::SIG_IGN)?;
        set(libc::SIGTTIN, libc::SIG_IGN)?;
        set(libc::SIGTTOU, libc::SIG_IGN)?;
    }
    Ok(())
}

fn log_utmp_stub(log_mode: UtmpLogging) {
    if log_mode.is_empty() {
        return;
    }
    #[cfg(feature = "tracing")]
    tracing::warn!(
        ?log_mode,
        "utmp/wtmp/lastlog accounting requested but not wired up on this platform; skipping"
    );
    #[cfg(not(feature = "tracing"))]
    let _ = log_mode;
}

/// A live pty-backed child process.
///
/// `PtySession` owns the pty master, a dedicated reader thread that
/// forwards child output through an `mpsc` channel, and a SIGCHLD watcher
/// thread that observes child death independently of the reader.
pub struct PtySession {
    child: Box<dyn Child + Send + Sync>,
    writer: Box<dyn Write + Send>,
    master: Box<dyn portable_pty::MasterPty + Send>,
    data_rx: mpsc::Receiver<ReaderMsg>,
    reader_thread: Option<thread::JoinHandle<()>>,
    child_died_rx: mpsc::Receiver<()>,
    signal_thread: Option<thread::JoinHandle<()>>,
    signals_handle: Option<signal_hook::iterator::Handle>,
    shut_down: bool,
}

impl fmt::Debug for PtySession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PtySession")
            .field("child_pid", &self.child.process_id())
            .field("shut_down", &self.shut_down)
            .finish()
    }
}

impl PtySession {
    /// Spawn `command` into a new pty of `size`, recording `log_mode`
    /// login-accounting intent (best-effort, see module docs).
    pub fn spawn(
        mut command: CommandBuilder,
        size: PtySize2,
        log_mode: UtmpLogging,
    ) -> Result<Self, PtyError> {
        log_utmp_stub(log_mode);

        #[cfg(unix)]
        unsafe {
            command.pre_exec(|| reset_child_signal_disposition());
        }

        let pty_system = native_pty_system();
        let pair = pty_system
            .openpty(size.into())
            .map_err(portable_pty_error)?;

        let child = pair
            .slave
            .spawn_command(command)
            .map_err(portable_pty_error)?;
        let pid = child.process_id();

        let mut reader = pair
            .master
            .try_clone_reader()
            .map_err(portable_pty_error)?;
        let writer = pair.master.take_writer().map_err(portable_pty_error)?;

        let (data_tx, data_rx) = mpsc::channel::<ReaderMsg>();
        let reader_thread = thread::spawn(move || {
            let mut buf = [0u8; 8192];
            loop {
                match reader.read(&mut buf) {
                    Ok(0) => {
                        let _ = data_tx.send(ReaderMsg::Eof);
                        break;
                    }
                    Ok(n) => {
                        let _ = data_tx.send(ReaderMsg::Data(buf[..n].to_vec()));
                    }
                    Err(err) => {
                        let _ = data_tx.send(ReaderMsg::Err(err));
                        break;
                    }
                }
            }
        });

        let (died_tx, child_died_rx) = mpsc::channel::<()>();
        let (signal_thread, signals_handle) = match Signals::new([SIGCHLD]) {
            Ok(mut signals) => {
                let handle = signals.handle();
                let thread = thread::spawn(move || {
                    for _ in &mut signals {
                        if died_tx.send(()).is_err() {
                            break;
                        }
                    }
                });
                (Some(thread), Some(handle))
            }
            Err(_) => (None, None),
        };

        #[cfg(feature = "tracing")]
        tracing::debug!(?pid, cols = size.cols, rows = size.rows, "pty session spawned");
        #[cfg(not(feature = "tracing"))]
        let _ = pid;

        Ok(Self {
            child,
            writer,
            master: pair.master,
            data_rx,
            reader_thread: Some(reader_thread),
            child_died_rx,
            signal_thread,
            signals_handle,
            shut_down: false,
        })
    }

    /// Write raw bytes to the child's stdin.
    pub fn write_input(&mut self, buf: &[u8]) -> Result<(), PtyError> {
        self.writer.write_all(buf).map_err(PtyError::Io)?;
        self.writer.flush().map_err(PtyError::Io)
    }

    /// Drain any output the child has produced so far without blocking.
    pub fn read_output(&mut self) -> Result<Vec<u8>, PtyError> {
        let mut out = Vec::new();
        loop {
            match self.data_rx.try_recv() {
                Ok(ReaderMsg::Data(bytes)) => out.extend_from_slice(&bytes),
                Ok(ReaderMsg::Eof) => break,
                Ok(ReaderMsg::Err(err)) => return Err(PtyError::Io(err)),
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => break,
            }
        }
        Ok(out)
    }

    /// Block until output arrives or `timeout` elapses, returning whatever
    /// bytes were collected (possibly empty on timeout).
    pub fn read_output_timeout(&mut self, timeout: Duration) -> Result<Vec<u8>, PtyError> {
        let deadline = Instant::now() + timeout;
        let mut out = Vec::new();

        let first = self.data_rx.recv_timeout(timeout);
        match first {
            Ok(ReaderMsg::Data(bytes)) => out.extend_from_slice(&bytes),
            Ok(ReaderMsg::Eof) => return Ok(out),
            Ok(ReaderMsg::Err(err)) => return Err(PtyError::Io(err)),
            Err(_) => return Ok(out),
        }

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            match self.data_rx.recv_timeout(remaining) {
                Ok(ReaderMsg::Data(bytes)) => out.extend_from_slice(&bytes),
                Ok(ReaderMsg::Eof) => break,
                Ok(ReaderMsg::Err(err)) => return Err(PtyError::Io(err)),
                Err(_) => break,
            }
        }
        Ok(out)
    }

    /// True if the SIGCHLD watcher has observed the child exit. Does not
    /// block; drains at most one pending notification.
    pub fn child_exited(&self) -> bool {
        matches!(self.child_died_rx.try_recv(), Ok(()))
    }

    /// Resize the pty, delivering SIGWINCH to the child.
    pub fn resize(&self, size: PtySize2) -> Result<(), PtyError> {
        self.master.resize(size.into()).map_err(PtyError::Io)
    }

    /// Close the writer and block for the child to exit, returning its
    /// status. Idempotent: calling twice after the first returns
    /// `PtyError::AlreadyShutDown`.
    pub fn shutdown(&mut self) -> Result<ExitStatus, PtyError> {
        if self.shut_down {
            return Err(PtyError::AlreadyShutDown);
        }
        self.shut_down = true;

        drop(std::mem::replace(
            &mut self.writer,
            Box::new(io::sink()) as Box<dyn Write + Send>,
        ));

        let status = self.child.wait().map_err(PtyError::Io)?;

        if let Some(handle) = self.signals_handle.take() {
            handle.close();
        }
        if let Some(thread) = self.signal_thread.take() {
            let _ = thread.join();
        }
        if let Some(thread) = self.reader_thread.take() {
            let _ = thread.join();
        }

        Ok(status)
    }

    /// Kill the child process outright.
    pub fn kill(&mut self) -> Result<(), PtyError> {
        self.child.kill().map_err(PtyError::Io)
    }

    /// Child process id, if available on this platform.
    pub fn child_pid(&self) -> Option<u32> {
        self.child.process_id()
    }
}

impl Drop for PtySession {
    fn drop(&mut self) {
        if !self.shut_down {
            let _ = self.shutdown();
        }
    }
}

/// Configuration for PTY-backed test sessions (used by integration tests
/// that drive a real shell and assert on its output).
#[derive(Debug, Clone)]
pub struct PtyConfig {
    /// PTY width in columns.
    pub cols: u16,
    /// PTY height in rows.
    pub rows: u16,
    /// TERM to set in the child (defaults to xterm-256color).
    pub term: Option<String>,
    /// Extra environment variables to set in the child.
    pub env: Vec<(String, String)>,
    /// Optional test name for logging context.
    pub test_name: Option<String>,
    /// Enable structured PTY logging to stderr.
    pub log_events: bool,
}

impl Default for PtyConfig {
    fn default() -> Self {
        Self {
            cols: 80,
            rows: 24,
            term: Some("xterm-256color".to_string()),
            env: Vec::new(),
            test_name: None,
            log_events: true,
        }
    }
}

impl PtyConfig {
    /// Override PTY dimensions.
    pub fn with_size(mut self, cols: u16, rows: u16) -> Self {
        self.cols = cols;
        self.rows = rows;
        self
    }

    /// Override TERM in the child.
    pub fn with_term(mut self, term: impl Into<String>) -> Self {
        self.term = Some(term.into());
        self
    }

    /// Add an environment variable in the child.
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Attach a test name for logging context.
    pub fn with_test_name(mut self, name: impl Into<String>) -> Self {
        self.test_name = Some(name.into());
        self
    }

    /// Enable or disable log output.
    pub fn logging(mut self, enabled: bool) -> Self {
        self.log_events = enabled;
        self
    }
}

/// Expected cleanup sequences after a session ends.
#[derive(Debug, Clone)]
pub struct CleanupExpectations {
    pub sgr_reset: bool,
    pub show_cursor: bool,
    pub alt_screen: bool,
    pub mouse: bool,
    pub bracketed_paste: bool,
    pub focus_events: bool,
}

impl CleanupExpectations {
    /// Strict expectations for maximum cleanup validation.
    pub fn strict() -> Self {
        Self {
            sgr_reset: true,
            show_cursor: true,
            alt_screen: true,
            mouse: true,
            bracketed_paste: true,
            focus_events: true,
        }
    }
}

/// Spawn a plain command into a test pty, applying `config.term`/`config.env`
/// before launch, and capture its output for assertions.
pub fn spawn_command(
    mut config: PtyConfig,
    mut cmd: CommandBuilder,
) -> io::Result<PtyTestSession> {
    if let Some(name) = config.test_name.as_ref() {
        log_event(config.log_events, "PTY_TEST_START", name);
    }

    if let Some(term) = config.term.take() {
        cmd.env("TERM", term);
    }
    for (k, v) in config.env.drain(..) {
        cmd.env(k, v);
    }

    let pty_system = native_pty_system();
    let pair = pty_system
        .openpty(PtySize {
            rows: config.rows,
            cols: config.cols,
            pixel_width: 0,
            pixel_height: 0,
        })
        .map_err(|e| io::Error::other(e.to_string()))?;

    let child = pair
        .slave
        .spawn_command(cmd)
        .map_err(|e| io::Error::other(e.to_string()))?;
    let mut reader = pair
        .master
        .try_clone_reader()
        .map_err(|e| io::Error::other(e.to_string()))?;
    let writer = pair
        .master
        .take_writer()
        .map_err(|e| io::Error::other(e.to_string()))?;

    let (tx, rx) = mpsc::channel::<ReaderMsg>();
    let reader_thread = thread::spawn(move || {
        let mut buf = [0u8; 8192];
        loop {
            match reader.read(&mut buf) {
                Ok(0) => {
                    let _ = tx.send(ReaderMsg::Eof);
                    break;
                }
                Ok(n) => {
                    let _ = tx.send(ReaderMsg::Data(buf[..n].to_vec()));
                }
                Err(err) => {
                    let _ = tx.send(ReaderMsg::Err(err));
                    break;
                }
            }
        }
    });

    Ok(PtyTestSession {
        child,
        writer,
        rx,
        reader_thread: Some(reader_thread),
        captured: Vec::new(),
        eof: false,
        config,
    })
}

/// A spawned PTY test session with captured output, used by integration
/// tests that need to assert on a real shell's byte stream rather than
/// drive `PtySession`'s production read/write path.
pub struct PtyTestSession {
    child: Box<dyn Child + Send + Sync>,
    writer: Box<dyn Write + Send>,
    rx: mpsc::Receiver<ReaderMsg>,
    reader_thread: Option<thread::JoinHandle<()>>,
    captured: Vec<u8>,
    eof: bool,
    config: PtyConfig,
}

impl fmt::Debug for PtyTestSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PtyTestSession")
            .field("child_pid", &self.child.process_id())
            .field("captured_len", &self.captured.len())
            .field("eof", &self.eof)
            .field("config", &self.config)
            .finish()
    }
}

impl PtyTestSession {
    /// Read any available output without blocking.
    pub fn read_output(&mut self) -> Vec<u8> {
        match self.read_output_result() {
            Ok(output) => output,
            Err(err) => {
                log_event(
                    self.config.log_events,
                    "PTY_READ_ERROR",
                    format!("error={err}"),
                );
                self.captured.clone()
            }
        }
    }

    /// Read any available output without blocking (fallible).
    pub fn read_output_result(&mut self) -> io::Result<Vec<u8>> {
        let _ = self.read_available(Duration::from_millis(0))?;
        Ok(self.captured.clone())
    }

    /// Read output until a pattern is found or a timeout elapses.
    pub fn read_until(&mut self, pattern: &[u8], timeout: Duration) -> io::Result<Vec<u8>> {
        if pattern.is_empty() {
            return Ok(self.captured.clone());
        }

        let deadline = Instant::now() + timeout;

        loop {
            if find_subsequence(&self.captured, pattern).is_some() {
                log_event(
                    self.config.log_events,
                    "PTY_CHECK",
                    format!("pattern_found=0x{}", hex_preview(pattern, 16).trim()),
                );
                return Ok(self.captured.clone());
            }

            if self.eof || Instant::now() >= deadline {
                break;
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            let _ = self.read_available(remaining)?;
        }

        Err(io::Error::new(
            io::ErrorKind::TimedOut,
            "PTY read_until timed out",
        ))
    }

    /// Send input bytes to the child process.
    pub fn send_input(&mut self, bytes: &[u8]) -> io::Result<()> {
        if bytes.is_empty() {
            return Ok(());
        }

        self.writer.write_all(bytes)?;
        self.writer.flush()?;

        log_event(
            self.config.log_events,
            "PTY_INPUT",
            format!("sent_bytes={}", bytes.len()),
        );

        Ok(())
    }

    /// Wait for the child to exit and return its status.
    pub fn wait(&mut self) -> io::Result<ExitStatus> {
        self.child.wait()
    }

    /// Access all captured output so far.
    pub fn output(&self) -> &[u8] {
        &self.captured
    }

    /// Child process id (if available on this platform).
    pub fn child_pid(&self) -> Option<u32> {
        self.child.process_id()
    }

    fn read_available(&mut self, timeout: Duration) -> io::Result<usize> {
        if self.eof {
            return Ok(0);
        }

        let mut total = 0usize;

        let first = if timeout.is_zero() {
            self.rx.try_recv().ok()
        } else {
            self.rx.recv_timeout(timeout).ok()
        };

        let mut msg = match first {
            Some(m) => m,
            None => return Ok(0),
        };

        loop {
            match msg {
                ReaderMsg::Data(bytes) => {
                    total = total.saturating_add(bytes.len());
                    self.captured.extend_from_slice(&bytes);
                }
                ReaderMsg::Eof => {
                    self.eof = true;
                    break;
                }
                ReaderMsg::Err(err) => return Err(err),
            }

            match self.rx.try_recv() {
                Ok(next) => msg = next,
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => {
                    self.eof = true;
                    break;
                }
            }
        }

        if total > 0 {
            log_event(
                self.config.log_events,
                "PTY_OUTPUT",
                format!("captured_bytes={}", total),
            );
        }

        Ok(total)
    }
}

impl Drop for PtyTestSession {
    fn drop(&mut self) {
        let _ = self.writer.flush();
        let _ = self.child.kill();

        if let Some(handle) = self.reader_thread.take() {
            let _ = handle.join();
        }
    }
}

/// Assert that terminal cleanup sequences were emitted.
pub fn assert_terminal_restored(output: &[u8], expectations: &CleanupExpectations) {
    let mut failures = Vec::new();

    if expectations.sgr_reset && !contains_any(output, SGR_RESET_SEQS) {
        failures.push("Missing SGR reset (CSI 0 m)");
    }
    if expectations.show_cursor && !contains_any(output, CURSOR_SHOW_SEQS) {
        failures.push("Missing cursor show (CSI ? 25 h)");
    }
    if expectations.alt_screen && !contains_any(output, ALT_SCREEN_EXIT_SEQS) {
        failures.push("Missing alt-screen exit (CSI ? 1049 l)");
    }
    if expectations.mouse && !contains_any(output, MOUSE_DISABLE_SEQS) {
        failures.push("Missing mouse disable (CSI ? 1000... l)");
    }
    if expectations.bracketed_paste && !contains_any(output, BRACKETED_PASTE_DISABLE_SEQS) {
        failures.push("Missing bracketed paste disable (CSI ? 2004 l)");
    }
    if expectations.focus_events && !contains_any(output, FOCUS_DISABLE_SEQS) {
        failures.push("Missing focus disable (CSI ? 1004 l)");
    }

    if failures.is_empty() {
        log_event(true, "PTY_TEST_PASS", "terminal cleanup sequences verified");
        return;
    }

    for failure in &failures {
        log_event(true, "PTY_FAILURE_REASON", *failure);
    }

    log_event(true, "PTY_OUTPUT_DUMP", "hex:");
    for line in hex_dump(output, 4096).lines() {
        log_event(true, "PTY_OUTPUT_DUMP", line);
    }

    panic!("PTY cleanup assertions failed: {}", failures.join("; "));
}

fn log_event(enabled: bool, event: &str, detail: impl fmt::Display) {
    if !enabled {
        return;
    }

    let timestamp = timestamp_rfc3339();
    eprintln!("[{}] {}: {}", timestamp, event, detail);
}

fn timestamp_rfc3339() -> String {
    time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
}

fn hex_preview(bytes: &[u8], limit: usize) -> String {
    let mut out = String::new();
    for b in bytes.iter().take(limit) {
        out.push_str(&format!("{:02x}", b));
    }
    if bytes.len() > limit {
        out.push_str("..");
    }
    out
}

fn hex_dump(bytes: &[u8], limit: usize) -> String {
    let mut out = String::new();
    let slice = bytes.get(0..limit).unwrap_or(bytes);

    for (row, chunk) in slice.chunks(16).enumerate() {
        let offset = row * 16;
        out.push_str(&format!("{:04x}: ", offset));
        for b in chunk {
            out.push_str(&format!("{:02x} ", b));
        }
        out.push('\n');
    }

    if bytes.len() > limit {
        out.push_str("... (truncated)\n");
    }

    out
}

fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

fn contains_any(haystack: &[u8], needles: &[&[u8]]) -> bool {
    needles
        .iter()
        .any(|needle| find_subsequence(haystack, needle).is_some())
}

const SGR_RESET_SEQS: &[&[u8]] = &[b"\x1b[0m", b"\x1b[m"];
const CURSOR_SHOW_SEQS: &[&[u8]] = &[b"\x1b[?25h"];
const ALT_SCREEN_EXIT_SEQS: &[&[u8]] = &[b"\x1b[?1049l", b"\x1b[?1047l"];
const MOUSE_DISABLE_SEQS: &[&[u8]] = &[
    b"\x1b[?1000;1002;1006l",
    b"\x1b[?1000;1002l",
    b"\x1b[?1000l",
];
const BRACKETED_PASTE_DISABLE_SEQS: &[&[u8]] = &[b"\x1b[?2004l"];
const FOCUS_DISABLE_SEQS: &[&[u8]] = &[b"\x1b[?1004l"];
