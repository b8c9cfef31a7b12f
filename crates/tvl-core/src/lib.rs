#![forbid(unsafe_code)]

//! Terminal lifecycle, input events, geometry, and animation primitives.

pub mod animation;
pub mod event;
pub mod geometry;
pub mod terminal_session;
pub mod unwind;
