#![forbid(unsafe_code)]

//! Deterministic program simulator for testing.
//!
//! `ProgramSimulator` runs a [`Model`] without a real terminal, enabling
//! deterministic snapshot testing, event injection, and frame capture.
//! Background tasks run synchronously on the calling thread, so a task's
//! message is applied before the call that produced it returns.
//!
//! # Example
//!
//! ```ignore
//! use tvl_runtime::simulator::ProgramSimulator;
//!
//! let mut sim = ProgramSimulator::new(Clock { elapsed_ms: 0 });
//! sim.init();
//! sim.tick(Duration::from_millis(16));
//! assert_eq!(sim.model().elapsed_ms, 16);
//!
//! let buf = sim.capture_frame(80, 24);
//! // Assert on buffer contents...
//! ```

use std::time::Duration;

use tvl_core::event::Event;
use tvl_render::buffer::Buffer;
use tvl_render::frame::Frame;

use crate::program::{Cmd, Model};

/// Record of a command that was executed during simulation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CmdRecord {
    /// No-op command.
    None,
    /// Quit command.
    Quit,
    /// Message sent to model (not stored, just noted).
    Msg,
    /// Batch of commands.
    Batch(usize),
    /// Sequence of commands.
    Sequence(usize),
    /// Tick scheduled.
    Tick(Duration),
    /// Background task executed synchronously.
    Task(Option<String>),
}

/// Deterministic simulator for [`Model`] testing.
///
/// Runs model logic without any terminal or IO dependencies. Events can be
/// injected, messages sent directly, and frames captured for snapshot testing.
pub struct ProgramSimulator<M: Model> {
    model: M,
    frames: Vec<Buffer>,
    command_log: Vec<CmdRecord>,
    running: bool,
    tick_rate: Option<Duration>,
}

impl<M: Model> ProgramSimulator<M> {
    /// Create a new simulator with the given model.
    ///
    /// The model is not initialized until [`init`](Self::init) is called.
    pub fn new(model: M) -> Self {
        Self {
            model,
            frames: Vec::new(),
            command_log: Vec::new(),
            running: true,
            tick_rate: None,
        }
    }

    /// Initialize the model by calling `Model::init()` and executing returned commands.
    pub fn init(&mut self) {
        let cmd = self.model.init();
        self.execute_cmd(cmd);
    }

    /// Inject terminal events into the model.
    ///
    /// Each event is converted to a message via `From<Event>` and dispatched
    /// through `Model::update()`. Commands returned from update are executed.
    pub fn inject_events(&mut self, events: &[Event]) {
        for event in events {
            if !self.running {
                break;
            }
            let msg = M::Message::from(event.clone());
            let cmd = self.model.update(msg);
            self.execute_cmd(cmd);
        }
    }

    /// Inject a single terminal event into the model.
    pub fn inject_event(&mut self, event: Event) {
        self.inject_events(&[event]);
    }

    /// Send a specific message to the model.
    pub fn send(&mut self, msg: M::Message) {
        if !self.running {
            return;
        }
        let cmd = self.model.update(msg);
        self.execute_cmd(cmd);
    }

    /// Deliver one `Event::Tick` carrying `elapsed`.
    ///
    /// Ticks are delivered whether or not the model scheduled a tick rate;
    /// tests drive time explicitly.
    pub fn tick(&mut self, elapsed: Duration) {
        self.inject_event(Event::Tick { elapsed });
    }

    /// Deliver ticks of `step` until `total` time has passed.
    pub fn advance(&mut self, total: Duration, step: Duration) {
        if step.is_zero() {
            return;
        }
        let mut remaining = total;
        while !remaining.is_zero() && self.running {
            let dt = step.min(remaining);
            self.tick(dt);
            remaining -= dt;
        }
    }

    /// Capture the current frame at the given dimensions.
    ///
    /// Calls `Model::view()` to render into a fresh buffer and stores the
    /// result. Returns a reference to the captured buffer.
    pub fn capture_frame(&mut self, width: u16, height: u16) -> &Buffer {
        let mut frame = Frame::new(width, height);
        self.model.view(&mut frame);
        self.frames.push(frame.into_buffer());
        &self.frames[self.frames.len() - 1]
    }

    /// Get all captured frame buffers.
    pub fn frames(&self) -> &[Buffer] {
        &self.frames
    }

    /// Get the most recently captured frame buffer, if any.
    pub fn last_frame(&self) -> Option<&Buffer> {
        self.frames.last()
    }

    /// Get the number of captured frames.
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Get a reference to the model.
    pub fn model(&self) -> &M {
        &self.model
    }

    /// Get a mutable reference to the model.
    pub fn model_mut(&mut self) -> &mut M {
        &mut self.model
    }

    /// Consume the simulator and return the model.
    pub fn into_model(self) -> M {
        self.model
    }

    /// Check if the simulated program is still running.
    ///
    /// Returns `false` after a `Cmd::Quit` has been executed.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Get the current tick rate (if any).
    pub fn tick_rate(&self) -> Option<Duration> {
        self.tick_rate
    }

    /// Get the command execution log.
    pub fn command_log(&self) -> &[CmdRecord] {
        &self.command_log
    }

    /// Clear all captured frames.
    pub fn clear_frames(&mut self) {
        self.frames.clear();
    }

    /// Execute a command without IO.
    fn execute_cmd(&mut self, cmd: Cmd<M::Message>) {
        match cmd {
            Cmd::None => {
                self.command_log.push(CmdRecord::None);
            }
            Cmd::Quit => {
                self.running = false;
                self.command_log.push(CmdRecord::Quit);
            }
            Cmd::Msg(m) => {
                self.command_log.push(CmdRecord::Msg);
                let cmd = self.model.update(m);
                self.execute_cmd(cmd);
            }
            Cmd::Batch(cmds) => {
                self.command_log.push(CmdRecord::Batch(cmds.len()));
                for c in cmds {
                    self.execute_cmd(c);
                    if !self.running {
                        break;
                    }
                }
            }
            Cmd::Sequence(cmds) => {
                self.command_log.push(CmdRecord::Sequence(cmds.len()));
                for c in cmds {
                    self.execute_cmd(c);
                    if !self.running {
                        break;
                    }
                }
            }
            Cmd::Tick(duration) => {
                self.tick_rate = Some(duration);
                self.command_log.push(CmdRecord::Tick(duration));
            }
            Cmd::Task(spec, f) => {
                self.command_log.push(CmdRecord::Task(spec.name));
                let msg = f();
                let cmd = self.model.update(msg);
                self.execute_cmd(cmd);
            }
        }
    }
}
