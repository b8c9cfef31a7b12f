#![forbid(unsafe_code)]

//! Treasury dashboard: an animated TVL/APY counter for the terminal.
//!
//! [`TreasuryPage`] is the top-level model. It hosts a [`TreasuryCounter`]
//! behind a render error boundary; the counter fetches metrics once when
//! mounted and animates them into place.

pub mod cli;
pub mod counter;
pub mod diagnostics;
pub mod error;
pub mod format;
pub mod headless;
pub mod logging;
pub mod page;

pub use counter::{CounterMsg, FetchStatus, TreasuryCounter};
pub use diagnostics::{DiagnosticEntry, DiagnosticSink, MemorySink, Severity, TracingSink};
pub use error::AppError;
pub use format::{NumberLocale, format_apy, format_tvl};
pub use page::{PageMsg, TreasuryPage};
