#![forbid(unsafe_code)]

//! Diagnostic channel.
//!
//! An append-only sink of `(context, detail)` pairs. The dashboard reports
//! swallowed fetch failures and contained render failures here; nothing is
//! ever read back at runtime.

use std::sync::{Arc, Mutex};

/// Severity of a diagnostic entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Info,
}

/// One diagnostic record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticEntry {
    pub severity: Severity,
    pub context: String,
    pub detail: String,
}

impl DiagnosticEntry {
    pub fn error(context: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            context: context.into(),
            detail: detail.into(),
        }
    }

    pub fn info(context: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            context: context.into(),
            detail: detail.into(),
        }
    }
}

/// Append-only diagnostic sink.
pub trait DiagnosticSink: Send + Sync {
    fn record(&self, entry: DiagnosticEntry);

    fn error(&self, context: &str, detail: &str) {
        self.record(DiagnosticEntry::error(context, detail));
    }

    fn info(&self, context: &str, detail: &str) {
        self.record(DiagnosticEntry::info(context, detail));
    }
}

/// Emits every entry as a `tracing` event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn record(&self, entry: DiagnosticEntry) {
        match entry.severity {
            Severity::Error => {
                tracing::error!(detail = %entry.detail, "{}", entry.context);
            }
            Severity::Info => {
                tracing::info!(detail = %entry.detail, "{}", entry.context);
            }
        }
    }
}

/// Keeps entries in memory. Clones share storage.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    entries: Arc<Mutex<Vec<DiagnosticEntry>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far.
    pub fn entries(&self) -> Vec<DiagnosticEntry> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DiagnosticSink for MemorySink {
    fn record(&self, entry: DiagnosticEntry) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(entry);
        }
    }
}
