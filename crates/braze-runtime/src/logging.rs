//! Logging utilities for the Braze runtime.
//!
//! This module provides a unified logging setup using `tracing` and
//! `tracing-subscriber`, driven either by configuration or by the builder
//! directly.
//!
//! # Configuration-Based Initialization
//!
//! ```rust,ignore
//! use braze_runtime::config::BrazeConfig;
//! use braze_runtime::logging;
//!
//! let config = BrazeConfig::load()?;
//! let _guard = logging::init_from_config(&config.logging);
//! ```
//!
//! # Manual Initialization
//!
//! ```rust,ignore
//! use braze_runtime::logging::LoggingBuilder;
//!
//! let _guard = LoggingBuilder::new()
//!     .directive("info,braze=debug")
//!     .try_init()?;
//! ```

use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::{LogFormat, LoggingConfig};

/// Builder for the global tracing subscriber.
#[derive(Debug, Clone)]
pub struct LoggingBuilder {
    directive: String,
    format: LogFormat,
    file: Option<PathBuf>,
}

impl Default for LoggingBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl LoggingBuilder {
    /// Creates a builder with the "info" directive and compact output.
    pub fn new() -> Self {
        Self {
            directive: "info".to_string(),
            format: LogFormat::default(),
            file: None,
        }
    }

    /// Sets the filter directive (same syntax as `RUST_LOG`).
    pub fn directive(mut self, directive: impl Into<String>) -> Self {
        self.directive = directive.into();
        self
    }

    /// Sets the output format.
    pub fn format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Writes logs to the given file instead of stdout.
    pub fn file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    /// Installs the global subscriber.
    ///
    /// Returns a [`WorkerGuard`] when logging to a file; the guard must be
    /// held for the lifetime of the program or buffered lines are lost.
    pub fn try_init(self) -> Result<Option<WorkerGuard>, TryInitError> {
        let filter =
            EnvFilter::try_new(&self.directive).unwrap_or_else(|_| EnvFilter::new("info"));
        let registry = tracing_subscriber::registry().with(filter);

        match &self.file {
            Some(path) => {
                let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
                let name = path
                    .file_name()
                    .map(Path::new)
                    .unwrap_or_else(|| Path::new("braze.log"));
                let appender =
                    tracing_appender::rolling::never(dir.unwrap_or(Path::new(".")), name);
                let (writer, guard) = tracing_appender::non_blocking(appender);
                let layer = fmt::layer().with_writer(writer).with_ansi(false);
                match self.format {
                    LogFormat::Pretty => registry.with(layer.pretty()).try_init()?,
                    LogFormat::Compact => registry.with(layer.compact()).try_init()?,
                    #[cfg(feature = "json-log")]
                    LogFormat::Json => registry.with(layer.json()).try_init()?,
                }
                Ok(Some(guard))
            }
            None => {
                let layer = fmt::layer();
                match self.format {
                    LogFormat::Pretty => registry.with(layer.pretty()).try_init()?,
                    LogFormat::Compact => registry.with(layer.compact()).try_init()?,
                    #[cfg(feature = "json-log")]
                    LogFormat::Json => registry.with(layer.json()).try_init()?,
                }
                Ok(None)
            }
        }
    }
}

/// Installs the global subscriber from a [`LoggingConfig`].
///
/// Initialization failures (usually a subscriber installed twice) are
/// reported to stderr rather than propagated; the process keeps running
/// with whatever subscriber is already in place.
pub fn init_from_config(config: &LoggingConfig) -> Option<WorkerGuard> {
    let mut builder = LoggingBuilder::new()
        .directive(config.level.clone())
        .format(config.format);
    if let Some(file) = &config.file {
        builder = builder.file(file.clone());
    }
    match builder.try_init() {
        Ok(guard) => guard,
        Err(err) => {
            eprintln!("braze: logging initialization failed: {err}");
            None
        }
    }
}
