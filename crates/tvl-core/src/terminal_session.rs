#![forbid(unsafe_code)]

//! Terminal session lifecycle guard.
//!
//! [`TerminalSession`] enters raw mode on creation and restores the terminal
//! when dropped, including while unwinding from a panic. A process-wide panic
//! hook and (on unix) a SIGINT/SIGTERM watcher perform the same best-effort
//! cleanup for exits that bypass `Drop`.
//!
//! Panics raised inside a [`ContainedScope`](crate::unwind::ContainedScope)
//! are left alone by the hook: they are caught by a render boundary and the
//! session stays active.
//!
//! # Cleanup Order
//!
//! 1. Disable focus events (if enabled)
//! 2. Show cursor (always)
//! 3. Leave alternate screen (if enabled)
//! 4. Exit raw mode (always)
//! 5. Flush stdout
//!
//! # Usage
//!
//! ```no_run
//! use tvl_core::terminal_session::{SessionOptions, TerminalSession};
//!
//! let session = TerminalSession::new(SessionOptions {
//!     alternate_screen: true,
//!     ..Default::default()
//! })?;
//! // ... draw ...
//! drop(session);
//! # Ok::<(), std::io::Error>(())
//! ```

use std::io::{self, Write};
use std::sync::OnceLock;
use std::time::Duration;

use crate::event::Event;
use crate::unwind::panic_is_contained;

#[cfg(unix)]
use signal_hook::consts::signal::{SIGINT, SIGTERM};
#[cfg(unix)]
use signal_hook::iterator::Signals;

/// Terminal session configuration options.
///
/// All options default to `false`; the default session is raw mode only,
/// suitable for inline rendering below the shell prompt.
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    /// Switch to the alternate screen buffer, restoring scrollback on exit.
    pub alternate_screen: bool,

    /// Report focus gained/lost events.
    pub focus_events: bool,
}

/// A terminal session that manages raw mode and cleanup.
///
/// Only one session should exist at a time.
#[derive(Debug)]
pub struct TerminalSession {
    options: SessionOptions,
    alternate_screen_enabled: bool,
    focus_events_enabled: bool,
    #[cfg(unix)]
    signal_guard: Option<SignalGuard>,
}

impl TerminalSession {
    /// Enter raw mode and enable the requested features.
    ///
    /// # Errors
    ///
    /// Returns an error if raw mode or any requested mode cannot be enabled.
    /// Modes enabled before the failure are rolled back by `Drop`.
    pub fn new(options: SessionOptions) -> io::Result<Self> {
        install_panic_hook();

        crossterm::terminal::enable_raw_mode()?;
        #[cfg(feature = "tracing")]
        tracing::info!("terminal raw mode enabled");

        let mut session = Self {
            options: options.clone(),
            alternate_screen_enabled: false,
            focus_events_enabled: false,
            #[cfg(unix)]
            signal_guard: None,
        };

        let mut stdout = io::stdout();

        if options.alternate_screen {
            crossterm::execute!(stdout, crossterm::terminal::EnterAlternateScreen)?;
            session.alternate_screen_enabled = true;
            #[cfg(feature = "tracing")]
            tracing::info!("alternate screen enabled");
        }

        if options.focus_events {
            crossterm::execute!(stdout, crossterm::event::EnableFocusChange)?;
            session.focus_events_enabled = true;
            #[cfg(feature = "tracing")]
            tracing::info!("focus events enabled");
        }

        #[cfg(unix)]
        {
            session.signal_guard = Some(SignalGuard::new()?);
        }

        Ok(session)
    }

    /// Current terminal size as (columns, rows).
    pub fn size(&self) -> io::Result<(u16, u16)> {
        crossterm::terminal::size()
    }

    /// Current cursor position as (column, row).
    pub fn cursor_position(&self) -> io::Result<(u16, u16)> {
        crossterm::cursor::position()
    }

    /// Poll for an event with a timeout.
    ///
    /// Returns `Ok(true)` if an event is available, `Ok(false)` on timeout.
    pub fn poll_event(&self, timeout: Duration) -> io::Result<bool> {
        crossterm::event::poll(timeout)
    }

    /// Read the next event, blocking until one is available.
    ///
    /// Returns `Ok(None)` for input that has no [`Event`] mapping.
    pub fn read_event(&self) -> io::Result<Option<Event>> {
        let event = crossterm::event::read()?;
        Ok(Event::from_crossterm(event))
    }

    /// The options this session was created with.
    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    fn cleanup(&mut self) {
        #[cfg(unix)]
        let _ = self.signal_guard.take();

        let mut stdout = io::stdout();

        if self.focus_events_enabled {
            let _ = crossterm::execute!(stdout, crossterm::event::DisableFocusChange);
            self.focus_events_enabled = false;
            #[cfg(feature = "tracing")]
            tracing::info!("focus events disabled");
        }

        let _ = crossterm::execute!(stdout, crossterm::cursor::Show);

        if self.alternate_screen_enabled {
            let _ = crossterm::execute!(stdout, crossterm::terminal::LeaveAlternateScreen);
            self.alternate_screen_enabled = false;
            #[cfg(feature = "tracing")]
            tracing::info!("alternate screen disabled");
        }

        let _ = crossterm::terminal::disable_raw_mode();
        #[cfg(feature = "tracing")]
        tracing::info!("terminal raw mode disabled");

        let _ = stdout.flush();
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        self.cleanup();
    }
}

fn install_panic_hook() {
    static HOOK: OnceLock<()> = OnceLock::new();
    HOOK.get_or_init(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            if panic_is_contained() {
                return;
            }
            best_effort_cleanup();
            previous(info);
        }));
    });
}

fn best_effort_cleanup() {
    let mut stdout = io::stdout();

    let _ = crossterm::execute!(stdout, crossterm::event::DisableFocusChange);
    let _ = crossterm::execute!(stdout, crossterm::cursor::Show);
    let _ = crossterm::execute!(stdout, crossterm::terminal::LeaveAlternateScreen);
    let _ = crossterm::terminal::disable_raw_mode();
    let _ = stdout.flush();
}

#[cfg(unix)]
#[derive(Debug)]
struct SignalGuard {
    handle: signal_hook::iterator::Handle,
    thread: Option<std::thread::JoinHandle<()>>,
}

#[cfg(unix)]
impl SignalGuard {
    fn new() -> io::Result<Self> {
        let mut signals = Signals::new([SIGINT, SIGTERM]).map_err(io::Error::other)?;
        let handle = signals.handle();
        let thread = std::thread::spawn(move || {
            if let Some(signal) = signals.forever().next() {
                #[cfg(feature = "tracing")]
                tracing::warn!(signal, "termination signal received, cleaning up");
                best_effort_cleanup();
                std::process::exit(128 + signal);
            }
        });
        Ok(Self {
            handle,
            thread: Some(thread),
        })
    }
}

#[cfg(unix)]
impl Drop for SignalGuard {
    fn drop(&mut self) {
        self.handle.close();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}
