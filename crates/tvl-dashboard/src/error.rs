#![forbid(unsafe_code)]

use std::io;

use thiserror::Error;

use crate::cli::ConfigError;
use crate::logging::LoggingError;

/// Top-level failures of the `treasury-counter` binary.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Logging(#[from] LoggingError),

    #[error("failed to start async runtime: {0}")]
    Runtime(#[source] io::Error),

    #[error("terminal error: {0}")]
    Terminal(#[source] io::Error),
}

impl AppError {
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 2,
            Self::Logging(_) => 3,
            Self::Runtime(_) | Self::Terminal(_) => 1,
        }
    }
}
