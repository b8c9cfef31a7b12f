#![forbid(unsafe_code)]

//! Elm-style program runtime.
//!
//! The program runtime manages the update/view loop, handling events and
//! rendering frames. It separates state (Model) from rendering (View) and
//! provides a command pattern for side effects.
//!
//! # Example
//!
//! ```ignore
//! use tvl_core::event::Event;
//! use tvl_render::frame::Frame;
//! use tvl_runtime::program::{Cmd, Model};
//!
//! struct Clock {
//!     elapsed_ms: u128,
//! }
//!
//! enum Msg {
//!     Tick(std::time::Duration),
//!     Quit,
//!     Ignore,
//! }
//!
//! impl From<Event> for Msg {
//!     fn from(event: Event) -> Self {
//!         match event {
//!             Event::Key(k) if k.is_char('q') => Msg::Quit,
//!             Event::Tick { elapsed } => Msg::Tick(elapsed),
//!             _ => Msg::Ignore,
//!         }
//!     }
//! }
//!
//! impl Model for Clock {
//!     type Message = Msg;
//!
//!     fn init(&mut self) -> Cmd<Msg> {
//!         Cmd::tick(std::time::Duration::from_millis(16))
//!     }
//!
//!     fn update(&mut self, msg: Msg) -> Cmd<Msg> {
//!         match msg {
//!             Msg::Tick(dt) => { self.elapsed_ms += dt.as_millis(); Cmd::none() }
//!             Msg::Quit => Cmd::quit(),
//!             Msg::Ignore => Cmd::none(),
//!         }
//!     }
//!
//!     fn view(&self, frame: &mut Frame) {}
//! }
//! ```

use std::io::{self, Stdout, Write};
use std::sync::mpsc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, debug_span, info, info_span};
use tvl_core::event::Event;
use tvl_core::terminal_session::{SessionOptions, TerminalSession};
use tvl_render::buffer::Buffer;
use tvl_render::diff::BufferDiff;
use tvl_render::frame::Frame;
use tvl_render::presenter::Presenter;

/// The Model trait defines application state and behavior.
///
/// Implementations define how the application responds to events
/// and renders its current state.
pub trait Model: Sized {
    /// The message type for this model.
    ///
    /// Messages represent actions that update the model state.
    /// Must be convertible from terminal events.
    type Message: From<Event> + Send + 'static;

    /// Initialize the model with startup commands.
    ///
    /// Called once when the program starts. Return commands to execute
    /// initial side effects like loading data.
    fn init(&mut self) -> Cmd<Self::Message> {
        Cmd::none()
    }

    /// Update the model in response to a message.
    ///
    /// This is the core state transition function. Returns commands
    /// for any side effects that should be executed.
    fn update(&mut self, msg: Self::Message) -> Cmd<Self::Message>;

    /// Render the current state to a frame.
    ///
    /// Called after updates when the UI needs to be redrawn.
    fn view(&self, frame: &mut Frame);
}

/// Metadata attached to a background task.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskSpec {
    /// Optional name for logs and the simulator's command log.
    pub name: Option<String>,
}

impl TaskSpec {
    /// A task spec carrying `name`.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
        }
    }
}

/// Commands represent side effects to be executed by the runtime.
///
/// Commands are returned from `init()` and `update()` to trigger
/// actions like quitting or running background work.
#[derive(Default)]
pub enum Cmd<M> {
    /// No operation.
    #[default]
    None,
    /// Quit the application.
    Quit,
    /// Execute multiple commands in order, stopping at a quit.
    Batch(Vec<Cmd<M>>),
    /// Execute commands sequentially.
    Sequence(Vec<Cmd<M>>),
    /// Send a message to the model.
    Msg(M),
    /// Deliver `Event::Tick` every `Duration`.
    Tick(Duration),
    /// Run a closure off the UI thread; its return value comes back as a message.
    Task(TaskSpec, Box<dyn FnOnce() -> M + Send>),
}

impl<M: std::fmt::Debug> std::fmt::Debug for Cmd<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Quit => write!(f, "Quit"),
            Self::Batch(cmds) => f.debug_tuple("Batch").field(cmds).finish(),
            Self::Sequence(cmds) => f.debug_tuple("Sequence").field(cmds).finish(),
            Self::Msg(m) => f.debug_tuple("Msg").field(m).finish(),
            Self::Tick(d) => f.debug_tuple("Tick").field(d).finish(),
            Self::Task(spec, _) => f.debug_struct("Task").field("spec", spec).finish(),
        }
    }
}

impl<M> Cmd<M> {
    /// Create a no-op command.
    #[inline]
    pub fn none() -> Self {
        Self::None
    }

    /// Create a quit command.
    #[inline]
    pub fn quit() -> Self {
        Self::Quit
    }

    /// Create a message command.
    #[inline]
    pub fn msg(m: M) -> Self {
        Self::Msg(m)
    }

    /// Create a batch of commands.
    ///
    /// Empty batches collapse to `None` and single-element batches to
    /// the element itself.
    pub fn batch(cmds: Vec<Self>) -> Self {
        if cmds.is_empty() {
            Self::None
        } else if cmds.len() == 1 {
            cmds.into_iter().next().unwrap_or(Self::None)
        } else {
            Self::Batch(cmds)
        }
    }

    /// Create a sequence of commands.
    pub fn sequence(cmds: Vec<Self>) -> Self {
        if cmds.is_empty() {
            Self::None
        } else if cmds.len() == 1 {
            cmds.into_iter().next().unwrap_or(Self::None)
        } else {
            Self::Sequence(cmds)
        }
    }

    /// Return a stable name for telemetry and tracing.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Quit => "Quit",
            Self::Batch(_) => "Batch",
            Self::Sequence(_) => "Sequence",
            Self::Msg(_) => "Msg",
            Self::Tick(_) => "Tick",
            Self::Task(..) => "Task",
        }
    }

    /// Create a tick command.
    #[inline]
    pub fn tick(duration: Duration) -> Self {
        Self::Tick(duration)
    }

    /// Create a background task command.
    ///
    /// The closure runs on a spawned thread (or synchronously in the
    /// simulator). When it completes, the returned message is sent back to
    /// the model's `update()`.
    pub fn task<F>(f: F) -> Self
    where
        F: FnOnce() -> M + Send + 'static,
    {
        Self::Task(TaskSpec::default(), Box::new(f))
    }

    /// Create a named background task command.
    pub fn task_named<F>(name: impl Into<String>, f: F) -> Self
    where
        F: FnOnce() -> M + Send + 'static,
    {
        Self::Task(TaskSpec::named(name), Box::new(f))
    }

    /// Count the number of atomic commands in this command.
    ///
    /// Returns 0 for `None`, 1 for atomic commands, and recursive count for
    /// `Batch`/`Sequence`.
    pub fn count(&self) -> usize {
        match self {
            Self::None => 0,
            Self::Batch(cmds) | Self::Sequence(cmds) => cmds.iter().map(Self::count).sum(),
            _ => 1,
        }
    }
}

impl<M: Send + 'static> Cmd<M> {
    /// Convert the messages this command produces, e.g. to embed a child
    /// model's commands in a parent.
    pub fn map<N, F>(self, f: F) -> Cmd<N>
    where
        F: Fn(M) -> N + Clone + Send + 'static,
    {
        match self {
            Self::None => Cmd::None,
            Self::Quit => Cmd::Quit,
            Self::Batch(cmds) => Cmd::Batch(cmds.into_iter().map(|c| c.map(f.clone())).collect()),
            Self::Sequence(cmds) => {
                Cmd::Sequence(cmds.into_iter().map(|c| c.map(f.clone())).collect())
            }
            Self::Msg(m) => Cmd::Msg(f(m)),
            Self::Tick(d) => Cmd::Tick(d),
            Self::Task(spec, task) => Cmd::Task(spec, Box::new(move || f(task()))),
        }
    }
}

/// Where the UI is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScreenMode {
    /// Take over the alternate screen; scrollback is restored on exit.
    #[default]
    AltScreen,
    /// Draw a fixed-height region starting at the cursor row.
    Inline {
        /// Rows reserved for the UI.
        ui_height: u16,
    },
}

/// Configuration for a [`Program`].
#[derive(Debug, Clone)]
pub struct ProgramConfig {
    /// Screen mode.
    pub screen_mode: ScreenMode,
    /// Poll timeout when no tick is scheduled.
    pub poll_timeout: Duration,
    /// Report focus gained/lost events.
    pub focus_events: bool,
}

impl Default for ProgramConfig {
    fn default() -> Self {
        Self::fullscreen()
    }
}

impl ProgramConfig {
    /// Alternate-screen configuration.
    pub fn fullscreen() -> Self {
        Self {
            screen_mode: ScreenMode::AltScreen,
            poll_timeout: Duration::from_millis(100),
            focus_events: false,
        }
    }

    /// Inline configuration with `ui_height` rows.
    pub fn inline(ui_height: u16) -> Self {
        Self {
            screen_mode: ScreenMode::Inline {
                ui_height: ui_height.max(1),
            },
            ..Self::fullscreen()
        }
    }

    fn session_options(&self) -> SessionOptions {
        SessionOptions {
            alternate_screen: matches!(self.screen_mode, ScreenMode::AltScreen),
            focus_events: self.focus_events,
        }
    }
}

/// The program runtime that manages the update/view loop.
pub struct Program<M: Model> {
    model: M,
    config: ProgramConfig,
    session: TerminalSession,
    presenter: Presenter<Stdout>,
    previous: Option<Buffer>,
    width: u16,
    height: u16,
    origin_y: u16,
    running: bool,
    dirty: bool,
    tick_rate: Option<Duration>,
    last_tick: Instant,
    task_sender: mpsc::Sender<M::Message>,
    task_receiver: mpsc::Receiver<M::Message>,
    task_handles: Vec<JoinHandle<()>>,
}

impl<M: Model> Program<M> {
    /// Create a program in alternate-screen mode.
    pub fn new(model: M) -> io::Result<Self> {
        Self::with_config(model, ProgramConfig::default())
    }

    /// Create a program with an explicit configuration.
    ///
    /// Enters raw mode immediately; the terminal is restored when the
    /// program is dropped.
    pub fn with_config(model: M, config: ProgramConfig) -> io::Result<Self> {
        let session = TerminalSession::new(config.session_options())?;
        let (width, term_height) = session.size()?;
        let origin_y = match config.screen_mode {
            ScreenMode::AltScreen => 0,
            ScreenMode::Inline { .. } => session.cursor_position()?.1,
        };
        let (task_sender, task_receiver) = mpsc::channel();

        let mut program = Self {
            model,
            config,
            session,
            presenter: Presenter::new(io::stdout()),
            previous: None,
            width,
            height: term_height,
            origin_y,
            running: true,
            dirty: true,
            tick_rate: None,
            last_tick: Instant::now(),
            task_sender,
            task_receiver,
            task_handles: Vec::new(),
        };
        program.place_ui_region(term_height)?;
        Ok(program)
    }

    /// Run the main event loop until the model quits.
    pub fn run(&mut self) -> io::Result<()> {
        info!(
            width = self.width,
            height = self.height,
            mode = ?self.config.screen_mode,
            "program started"
        );

        let cmd = {
            let _span = info_span!("tvl.program.init").entered();
            self.model.init()
        };
        self.execute_cmd(cmd)?;
        self.render_frame()?;

        while self.running {
            if self.session.poll_event(self.effective_timeout())? {
                loop {
                    if let Some(event) = self.session.read_event()? {
                        self.handle_event(event)?;
                    }
                    if !self.running || !self.session.poll_event(Duration::ZERO)? {
                        break;
                    }
                }
            }

            self.process_task_results()?;
            self.reap_finished_tasks();

            if self.running
                && let Some(elapsed) = self.take_tick()
            {
                self.dispatch(Event::Tick { elapsed }.into(), "Tick")?;
            }

            if self.dirty && self.running {
                self.render_frame()?;
            }
        }

        self.finish()?;
        info!("program finished");
        Ok(())
    }

    /// Get a reference to the model.
    pub fn model(&self) -> &M {
        &self.model
    }

    /// Check if the program is running.
    pub fn is_running(&self) -> bool {
        self.running
    }

    fn handle_event(&mut self, event: Event) -> io::Result<()> {
        if let Event::Resize { width, height } = event {
            self.width = width;
            self.place_ui_region(height)?;
            self.previous = None;
            self.presenter.invalidate();
            if matches!(self.config.screen_mode, ScreenMode::AltScreen) {
                crossterm::execute!(
                    io::stdout(),
                    crossterm::terminal::Clear(crossterm::terminal::ClearType::All)
                )?;
            }
            debug!(width, height, "terminal resized");
        }
        self.dispatch(M::Message::from(event), "event")
    }

    fn dispatch(&mut self, msg: M::Message, msg_type: &'static str) -> io::Result<()> {
        let cmd = {
            let _span = debug_span!("tvl.program.update", msg_type).entered();
            self.model.update(msg)
        };
        self.dirty = true;
        self.execute_cmd(cmd)
    }

    /// Process results from background tasks.
    fn process_task_results(&mut self) -> io::Result<()> {
        while self.running {
            let Ok(msg) = self.task_receiver.try_recv() else {
                break;
            };
            self.dispatch(msg, "task")?;
        }
        Ok(())
    }

    /// Execute a command.
    fn execute_cmd(&mut self, cmd: Cmd<M::Message>) -> io::Result<()> {
        match cmd {
            Cmd::None => {}
            Cmd::Quit => self.running = false,
            Cmd::Msg(m) => self.dispatch(m, "cmd")?,
            Cmd::Batch(cmds) | Cmd::Sequence(cmds) => {
                for c in cmds {
                    self.execute_cmd(c)?;
                    if !self.running {
                        break;
                    }
                }
            }
            Cmd::Tick(duration) => {
                self.tick_rate = Some(duration);
                self.last_tick = Instant::now();
            }
            Cmd::Task(spec, f) => {
                debug!(task = spec.name.as_deref().unwrap_or("anonymous"), "spawning task");
                let sender = self.task_sender.clone();
                let handle = thread::spawn(move || {
                    let msg = f();
                    let _ = sender.send(msg);
                });
                self.task_handles.push(handle);
            }
        }
        Ok(())
    }

    fn reap_finished_tasks(&mut self) {
        if self.task_handles.is_empty() {
            return;
        }

        let mut remaining = Vec::with_capacity(self.task_handles.len());
        for handle in self.task_handles.drain(..) {
            if !handle.is_finished() {
                remaining.push(handle);
                continue;
            }
            if let Err(payload) = handle.join() {
                let msg = if let Some(s) = payload.downcast_ref::<&str>() {
                    (*s).to_owned()
                } else if let Some(s) = payload.downcast_ref::<String>() {
                    s.clone()
                } else {
                    "unknown panic payload".to_owned()
                };
                tracing::error!("spawned task panicked: {msg}");
            }
        }
        self.task_handles = remaining;
    }

    fn effective_timeout(&self) -> Duration {
        match self.tick_rate {
            Some(rate) => rate.saturating_sub(self.last_tick.elapsed()),
            None => self.config.poll_timeout,
        }
    }

    /// Elapsed time since the last tick, if a tick is due.
    fn take_tick(&mut self) -> Option<Duration> {
        let rate = self.tick_rate?;
        let elapsed = self.last_tick.elapsed();
        if elapsed < rate {
            return None;
        }
        self.last_tick = Instant::now();
        Some(elapsed)
    }

    fn render_frame(&mut self) -> io::Result<()> {
        let mut frame = Frame::new(self.width, self.height);
        {
            let _span = debug_span!("tvl.program.view", width = self.width, height = self.height)
                .entered();
            self.model.view(&mut frame);
        }

        let diff = match self.previous {
            Some(ref previous) => BufferDiff::compute(previous, &frame.buffer),
            None => BufferDiff::full(&frame.buffer),
        };
        self.presenter
            .present_with_cursor(&frame.buffer, &diff, frame.cursor_position)?;
        self.previous = Some(frame.into_buffer());
        self.dirty = false;
        Ok(())
    }

    /// Compute the UI height and origin for the current terminal height.
    ///
    /// Inline mode scrolls the terminal when the UI region would run past the
    /// bottom row.
    fn place_ui_region(&mut self, term_height: u16) -> io::Result<()> {
        match self.config.screen_mode {
            ScreenMode::AltScreen => {
                self.height = term_height;
                self.origin_y = 0;
            }
            ScreenMode::Inline { ui_height } => {
                let ui_height = ui_height.min(term_height).max(1);
                let row = self.origin_y;
                let overflow = row.saturating_add(ui_height).saturating_sub(term_height);
                if overflow > 0 {
                    crossterm::execute!(io::stdout(), crossterm::terminal::ScrollUp(overflow))?;
                }
                self.height = ui_height;
                self.origin_y = row.saturating_sub(overflow);
            }
        }
        self.presenter.set_origin(self.origin_y);
        Ok(())
    }

    /// Leave the cursor below an inline UI so the shell prompt lands cleanly.
    fn finish(&mut self) -> io::Result<()> {
        if let ScreenMode::Inline { .. } = self.config.screen_mode {
            let mut stdout = io::stdout();
            crossterm::execute!(
                stdout,
                crossterm::cursor::MoveTo(0, self.origin_y.saturating_add(self.height))
            )?;
            stdout.flush()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    enum Msg {
        Value(u32),
        Event,
    }

    impl From<Event> for Msg {
        fn from(_: Event) -> Self {
            Msg::Event
        }
    }

    #[test]
    fn batch_collapses_trivial_cases() {
        assert!(matches!(Cmd::<Msg>::batch(vec![]), Cmd::None));
        assert!(matches!(Cmd::<Msg>::batch(vec![Cmd::quit()]), Cmd::Quit));
        assert!(matches!(
            Cmd::<Msg>::batch(vec![Cmd::quit(), Cmd::none()]),
            Cmd::Batch(_)
        ));
    }

    #[test]
    fn sequence_collapses_trivial_cases() {
        assert!(matches!(Cmd::<Msg>::sequence(vec![]), Cmd::None));
        assert!(matches!(
            Cmd::sequence(vec![Cmd::msg(Msg::Value(1))]),
            Cmd::Msg(Msg::Value(1))
        ));
    }

    #[test]
    fn count_is_recursive() {
        let cmd: Cmd<Msg> = Cmd::Batch(vec![
            Cmd::none(),
            Cmd::quit(),
            Cmd::Sequence(vec![Cmd::tick(Duration::from_millis(1)), Cmd::msg(Msg::Event)]),
        ]);
        assert_eq!(cmd.count(), 3);
    }

    #[test]
    fn type_names() {
        assert_eq!(Cmd::<Msg>::none().type_name(), "None");
        assert_eq!(Cmd::<Msg>::task(|| Msg::Event).type_name(), "Task");
        assert_eq!(Cmd::<Msg>::tick(Duration::ZERO).type_name(), "Tick");
    }

    #[test]
    fn task_named_carries_name() {
        let cmd = Cmd::<Msg>::task_named("fetch", || Msg::Event);
        match cmd {
            Cmd::Task(spec, _) => assert_eq!(spec.name.as_deref(), Some("fetch")),
            other => panic!("expected task, got {other:?}"),
        }
    }

    #[test]
    fn map_converts_messages_and_tasks() {
        let cmd = Cmd::Batch(vec![
            Cmd::msg(2_u32),
            Cmd::task(|| 5_u32),
            Cmd::quit(),
        ])
        .map(Msg::Value);

        let Cmd::Batch(cmds) = cmd else {
            panic!("batch shape preserved");
        };
        let mut cmds = cmds.into_iter();
        assert!(matches!(cmds.next(), Some(Cmd::Msg(Msg::Value(2)))));
        match cmds.next() {
            Some(Cmd::Task(_, f)) => assert_eq!(f(), Msg::Value(5)),
            other => panic!("expected task, got {other:?}"),
        }
        assert!(matches!(cmds.next(), Some(Cmd::Quit)));
    }

    #[test]
    fn debug_hides_task_closure() {
        let cmd = Cmd::<Msg>::task_named("load", || Msg::Event);
        let text = format!("{cmd:?}");
        assert!(text.starts_with("Task"));
        assert!(text.contains("load"));
    }

    #[test]
    fn inline_config_clamps_height() {
        let config = ProgramConfig::inline(0);
        assert_eq!(config.screen_mode, ScreenMode::Inline { ui_height: 1 });
        assert!(!config.session_options().alternate_screen);
        assert!(ProgramConfig::fullscreen().session_options().alternate_screen);
    }
}
