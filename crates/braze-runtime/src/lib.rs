//! Braze Runtime - Orchestration layer for the Braze bot SDK.
//!
//! This crate provides:
//! - Runtime orchestration (`BrazeRuntime`): a queue-fed dispatch loop with
//!   per-dispatch cancellation and graceful shutdown
//! - Configuration loading (`BrazeConfig`) via figment (defaults → TOML
//!   file → `BRAZE_` environment variables)
//! - Logging setup (`LoggingBuilder`) over tracing-subscriber
//!
//! # Example
//!
//! ```rust,ignore
//! use braze_runtime::{BrazeConfig, BrazeRuntime, logging};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = BrazeConfig::load()?;
//!     let _guard = logging::init_from_config(&config.logging);
//!
//!     let app = build_app(); // register routes
//!     let runtime = BrazeRuntime::with_config(app, config.runtime);
//!
//!     // Hand the handle to the transport layer.
//!     let handle = runtime.handle();
//!     spawn_transport(handle);
//!
//!     // Run until ctrl-c.
//!     runtime.run().await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod runtime;

// Re-exports
pub use config::{BrazeConfig, LogFormat, LoggingConfig, RuntimeConfig};
pub use error::{ConfigError, ConfigResult, RuntimeError, RuntimeResult};
pub use logging::{LoggingBuilder, init_from_config};
pub use runtime::{BrazeRuntime, RuntimeHandle};
