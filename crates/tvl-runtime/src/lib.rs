#![forbid(unsafe_code)]

//! Elm-style runtime for the treasury dashboard.
//!
//! A [`Model`](program::Model) owns application state, reacts to messages
//! with [`Cmd`](program::Cmd)s, and renders into a frame. [`Program`](program::Program)
//! drives a model against a real terminal; [`ProgramSimulator`](simulator::ProgramSimulator)
//! drives it deterministically for tests and headless snapshots.

pub mod program;
pub mod simulator;

pub use program::{Cmd, Model, Program, ProgramConfig, ScreenMode, TaskSpec};
pub use simulator::{CmdRecord, ProgramSimulator};
