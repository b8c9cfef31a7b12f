#![forbid(unsafe_code)]

//! Command-line options for `treasury-counter`.
//!
//! Every option can also be set through a `TVL_*` environment variable;
//! flags win over the environment.
//!
//! | Option | Env | Default |
//! |--------|-----|---------|
//! | `--base-url` | `TVL_API_BASE_URL` | production host |
//! | `--locale` | `TVL_LOCALE` | `en-US` |
//! | `--screen-mode` | `TVL_SCREEN_MODE` | `alt` |
//! | `--ui-height` | `TVL_UI_HEIGHT` | `8` |
//! | `--exit-after-ms` | `TVL_EXIT_AFTER_MS` | `0` (never) |
//! | `--log-format` | `TVL_LOG_FORMAT` | `plain` |
//! | `--log-file` | `TVL_LOG_FILE` | none |

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use thiserror::Error;
use tvl_fetch::DEFAULT_BASE_URL;
use tvl_runtime::{ProgramConfig, ScreenMode};

use crate::format::NumberLocale;
use crate::logging::{LogDestination, LogFormat};

/// Locale value that selects the locale from `LC_ALL`/`LC_NUMERIC`/`LANG`.
pub const SYSTEM_LOCALE: &str = "system";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ScreenModeArg {
    /// Full screen on the alternate buffer.
    #[default]
    Alt,
    /// A fixed-height region below the prompt.
    Inline,
}

/// Treasury metrics in the terminal: total value locked and annual yield.
#[derive(Debug, Clone, Parser)]
#[command(name = "treasury-counter", version, about)]
pub struct Opts {
    /// Base URL of the metrics API.
    #[arg(long, env = "TVL_API_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Locale for TVL digit grouping, e.g. `en-US`, `de-DE`, or `system`.
    #[arg(long, env = "TVL_LOCALE", default_value = "en-US")]
    pub locale: String,

    #[arg(long, env = "TVL_SCREEN_MODE", value_enum, default_value_t = ScreenModeArg::Alt)]
    pub screen_mode: ScreenModeArg,

    /// Rows used in inline mode.
    #[arg(long, env = "TVL_UI_HEIGHT", default_value_t = 8)]
    pub ui_height: u16,

    /// Print one settled frame as text instead of opening the terminal UI.
    #[arg(long)]
    pub headless: bool,

    /// Headless frame width.
    #[arg(long, default_value_t = 80, requires = "headless")]
    pub width: u16,

    /// Quit automatically after this many milliseconds (0 = never).
    #[arg(long, env = "TVL_EXIT_AFTER_MS", default_value_t = 0)]
    pub exit_after_ms: u64,

    #[arg(long, env = "TVL_LOG_FORMAT", value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,

    /// Append logs to this file instead of stderr.
    #[arg(long, env = "TVL_LOG_FILE")]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("base URL must start with http:// or https://, got {0:?}")]
    InvalidBaseUrl(String),
    #[error("--ui-height must be at least 1")]
    ZeroUiHeight,
    #[error("--width must be at least 1")]
    ZeroWidth,
}

impl Opts {
    /// Reject option combinations that cannot work.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::InvalidBaseUrl(self.base_url.clone()));
        }
        if self.screen_mode == ScreenModeArg::Inline && self.ui_height == 0 {
            return Err(ConfigError::ZeroUiHeight);
        }
        if self.headless && self.width == 0 {
            return Err(ConfigError::ZeroWidth);
        }
        Ok(())
    }

    pub fn number_locale(&self) -> NumberLocale {
        if self.locale.eq_ignore_ascii_case(SYSTEM_LOCALE) {
            NumberLocale::from_env()
        } else {
            NumberLocale::from_tag(&self.locale)
        }
    }

    pub fn program_config(&self) -> ProgramConfig {
        match self.screen_mode {
            ScreenModeArg::Alt => ProgramConfig::fullscreen(),
            ScreenModeArg::Inline => ProgramConfig::inline(self.ui_height),
        }
    }

    pub fn screen_mode(&self) -> ScreenMode {
        self.program_config().screen_mode
    }

    pub fn exit_after(&self) -> Duration {
        Duration::from_millis(self.exit_after_ms)
    }

    /// A log file if given; otherwise stderr for headless runs, and a
    /// replay buffer while the terminal UI is up.
    pub fn log_destination(&self) -> LogDestination {
        match (&self.log_file, self.headless) {
            (Some(path), _) => LogDestination::File(path.clone()),
            (None, true) => LogDestination::Stderr,
            (None, false) => LogDestination::Deferred,
        }
    }
}
