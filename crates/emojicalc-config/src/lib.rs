//! Typed configuration for the Emojicalc server.
//!
//! Configuration is loaded in layers: built-in defaults or a preset, then an
//! optional TOML or JSON file, then `EMOJICALC__SECTION__KEY` environment
//! variables. Unknown fields are rejected.
//!
//! - [`ServerConfig`] - listener address, shutdown and request limits
//! - [`ViewsConfig`] - template directory and page template name
//! - [`TelemetryConfigSection`] - logging and metrics
//!
//! # Example
//!
//! ```no_run
//! use emojicalc_config::ConfigLoader;
//!
//! # fn main() -> Result<(), emojicalc_config::ConfigError> {
//! let config = ConfigLoader::new()
//!     .with_dotenv()?
//!     .with_optional_file("emojicalc.toml")?
//!     .with_env_prefix("EMOJICALC")
//!     .load()?;
//!
//! println!("Listening on: {}", config.server.http_addr);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration File Format
//!
//! ```toml
//! [server]
//! http_addr = "0.0.0.0:8080"
//! shutdown_timeout_secs = 30
//! request_timeout_ms = 30000
//! max_body_bytes = 1048576
//!
//! [views]
//! directory = "/srv/emojicalc/views"
//! page_template = "template"
//!
//! [telemetry]
//! service_name = "emojicalc"
//! environment = "production"
//!
//! [telemetry.metrics]
//! enabled = true
//! addr = "0.0.0.0:9090"
//!
//! [telemetry.logging]
//! enabled = true
//! level = "info"
//! format = "json"
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::EmojicalcConfig;
pub use error::ConfigError;
pub use loader::{ConfigLoader, ENV_PREFIX};
pub use schema::{
    LogFormat, LoggingConfig, MetricsConfig, ServerConfig, TelemetryConfigSection, ViewsConfig,
};
