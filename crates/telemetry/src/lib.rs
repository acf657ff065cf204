//! Logging setup and timing spans for droidcfg
//!
//! Library crates only emit `tracing` events; this crate installs the
//! subscriber for the binary:
//! - An `EnvFilter` seeded from the configured level (`RUST_LOG` wins)
//! - A compact fmt layer on stderr, so stdout stays clean for `--json`
//! - A per-process session id for correlating log lines

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use uuid::Uuid;

/// Global session ID for correlating logs
static SESSION_ID: Lazy<String> = Lazy::new(|| Uuid::new_v4().to_string());

/// Initialize with custom configuration
pub fn init_with_config(config: TelemetryConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .map_err(|e| anyhow::anyhow!("Invalid log level '{}': {}", config.log_level, e))?;

    let subscriber = tracing_subscriber::registry().with(filter).with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(config.ansi)
            .with_target(config.show_target)
            .with_file(config.show_file)
            .with_line_number(config.show_line_number)
            .compact(),
    );

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to set tracing subscriber: {}", e))?;

    tracing::debug!(
        session_id = %session_id(),
        version = env!("CARGO_PKG_VERSION"),
        "Telemetry initialized"
    );

    Ok(())
}

/// Get the current session ID
pub fn session_id() -> &'static str {
    &SESSION_ID
}

/// Telemetry configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub ansi: bool,
    pub show_target: bool,
    pub show_file: bool,
    pub show_line_number: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            ansi: true,
            show_target: false,
            show_file: false,
            show_line_number: false,
        }
    }
}

impl TelemetryConfig {
    /// Configuration for a settings-file level adjusted by `-v`/`-q` flags
    ///
    /// `-q` keeps errors only. Each `-v` raises the level one step from the
    /// configured one; two or more also show targets and source locations.
    pub fn from_verbosity(level: &str, verbose: u8, quiet: bool) -> Self {
        let log_level = if quiet {
            "error".to_string()
        } else if verbose == 0 {
            level.to_string()
        } else {
            raise_level(level, verbose).to_string()
        };
        let detailed = !quiet && verbose >= 2;

        Self {
            log_level,
            show_target: detailed,
            show_file: detailed,
            show_line_number: detailed,
            ..Self::default()
        }
    }

    /// Disable ANSI colors
    pub fn without_ansi(mut self) -> Self {
        self.ansi = false;
        self
    }
}

const LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];

fn raise_level(level: &str, steps: u8) -> &'static str {
    // Unrecognized directives (e.g. "droidcfg=debug") start from the default
    let base = LEVELS
        .iter()
        .position(|l| l.eq_ignore_ascii_case(level))
        .unwrap_or(1);
    LEVELS[(base + steps as usize).min(LEVELS.len() - 1)]
}

/// Timer for measuring operation duration
pub struct Timer {
    name: String,
    start: Instant,
    stopped: bool,
}

impl Timer {
    /// Start a new timer
    pub fn start(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            start: Instant::now(),
            stopped: false,
        }
    }

    /// Stop the timer and log the duration
    pub fn stop(mut self) -> Duration {
        self.stopped = true;
        self.record()
    }

    fn record(&self) -> Duration {
        let duration = self.start.elapsed();
        tracing::debug!(
            operation = %self.name,
            duration_ms = duration.as_millis() as u64,
            "Timer completed"
        );
        duration
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        if !self.stopped {
            self.record();
        }
    }
}

/// Span for tracing operations
#[macro_export]
macro_rules! timed_span {
    ($name:expr) => {
        let _timer = $crate::Timer::start($name);
        let _span = tracing::info_span!($name).entered();
    };
    ($name:expr, $($field:tt)*) => {
        let _timer = $crate::Timer::start($name);
        let _span = tracing::info_span!($name, $($field)*).entered();
    };
}
