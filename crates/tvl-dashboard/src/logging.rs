#![forbid(unsafe_code)]

//! `tracing` subscriber setup for the binary.
//!
//! Filtering follows `RUST_LOG` (default [`DEFAULT_FILTER`]). Output is
//! plain text or JSON lines, written to a log file, straight to stderr, or
//! held in memory while the terminal UI owns the screen and replayed to
//! stderr once it is restored.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use clap::ValueEnum;
use thiserror::Error;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

/// Filter used when `RUST_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "info";

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    #[default]
    Plain,
    Json,
}

/// Where formatted log lines go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogDestination {
    File(PathBuf),
    Stderr,
    /// Buffered, then written to stderr when the [`LogGuard`] drops.
    Deferred,
}

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("cannot open log file {}: {source}", path.display())]
    OpenFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("a global tracing subscriber is already installed")]
    AlreadyInstalled(#[from] TryInitError),
}

/// In-memory log writer. Clones share the buffer.
#[derive(Debug, Clone, Default)]
pub struct DeferredLog {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl DeferredLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, as UTF-8 (lossy).
    pub fn contents(&self) -> String {
        self.buf
            .lock()
            .map(|buf| String::from_utf8_lossy(&buf).into_owned())
            .unwrap_or_default()
    }

    /// Move the buffered bytes into `out`.
    pub fn drain_to(&self, out: &mut impl Write) -> io::Result<()> {
        let bytes = match self.buf.lock() {
            Ok(mut buf) => std::mem::take(&mut *buf),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        };
        out.write_all(&bytes)?;
        out.flush()
    }
}

impl Write for DeferredLog {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        match self.buf.lock() {
            Ok(mut buf) => buf.extend_from_slice(data),
            Err(poisoned) => poisoned.into_inner().extend_from_slice(data),
        }
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for DeferredLog {
    type Writer = DeferredLog;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Keeps deferred output alive; replays it to stderr on drop.
///
/// Drop this after the terminal session is restored.
#[derive(Debug, Default)]
pub struct LogGuard {
    deferred: Option<DeferredLog>,
}

impl Drop for LogGuard {
    fn drop(&mut self) {
        if let Some(deferred) = self.deferred.take() {
            let _ = deferred.drain_to(&mut io::stderr().lock());
        }
    }
}

fn filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

fn format_layer<W>(format: LogFormat, writer: W, ansi: bool) -> BoxedLayer
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    match format {
        LogFormat::Plain => fmt::layer()
            .with_writer(writer)
            .with_ansi(ansi)
            .with_target(true)
            .boxed(),
        LogFormat::Json => fmt::layer().json().with_writer(writer).boxed(),
    }
}

fn open_log_file(path: &Path) -> Result<File, LoggingError> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| LoggingError::OpenFile {
            path: path.to_path_buf(),
            source,
        })
}

/// The formatting layer for `destination`, plus the buffer when deferred.
pub fn output_layer(
    format: LogFormat,
    destination: &LogDestination,
) -> Result<(BoxedLayer, Option<DeferredLog>), LoggingError> {
    Ok(match destination {
        LogDestination::File(path) => {
            let file = open_log_file(path)?;
            (format_layer(format, Mutex::new(file), false), None)
        }
        LogDestination::Stderr => (format_layer(format, io::stderr, true), None),
        LogDestination::Deferred => {
            let deferred = DeferredLog::new();
            (format_layer(format, deferred.clone(), false), Some(deferred))
        }
    })
}

/// Install the global subscriber.
pub fn init(format: LogFormat, destination: &LogDestination) -> Result<LogGuard, LoggingError> {
    let (layer, deferred) = output_layer(format, destination)?;
    tracing_subscriber::registry()
        .with(layer)
        .with(filter())
        .try_init()?;
    Ok(LogGuard { deferred })
}
