//! Main configuration types.
//!
//! This module provides the top-level [`EmojicalcConfig`] struct and its presets.

use std::net::SocketAddr;

use serde::{Deserialize, Serialize};

use crate::{ConfigError, LogFormat, ServerConfig, TelemetryConfigSection, ViewsConfig};

/// Complete Emojicalc server configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to load configuration from files
/// and environment variables.
///
/// # Example
///
/// ```
/// use emojicalc_config::EmojicalcConfig;
///
/// let config = EmojicalcConfig::default();
/// assert_eq!(config.server.http_addr, "0.0.0.0:8080");
/// assert_eq!(config.views.page_template, "template");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct EmojicalcConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// View template configuration.
    #[serde(default)]
    pub views: ViewsConfig,

    /// Telemetry configuration (metrics and logging).
    #[serde(default)]
    pub telemetry: TelemetryConfigSection,
}

impl EmojicalcConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if:
    /// - Server address is invalid
    /// - Metrics address is invalid while metrics are enabled
    /// - The body limit or request timeout is zero
    /// - The page template name is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.http_addr.parse::<SocketAddr>().is_err() {
            return Err(ConfigError::invalid_value(
                "server.http_addr",
                format!("invalid socket address: {}", self.server.http_addr),
            ));
        }

        if self.telemetry.metrics.enabled
            && self.telemetry.metrics.addr.parse::<SocketAddr>().is_err()
        {
            return Err(ConfigError::invalid_value(
                "telemetry.metrics.addr",
                format!("invalid socket address: {}", self.telemetry.metrics.addr),
            ));
        }

        if self.server.max_body_bytes == 0 {
            return Err(ConfigError::invalid_value(
                "server.max_body_bytes",
                "must be greater than zero",
            ));
        }

        if self.server.request_timeout_ms == 0 {
            return Err(ConfigError::invalid_value(
                "server.request_timeout_ms",
                "must be greater than zero",
            ));
        }

        if self.views.page_template.trim().is_empty() {
            return Err(ConfigError::invalid_value(
                "views.page_template",
                "must not be empty",
            ));
        }

        Ok(())
    }

    /// Create a development configuration preset.
    ///
    /// Pretty, debug-level logs with source locations.
    ///
    /// # Example
    ///
    /// ```
    /// use emojicalc_config::EmojicalcConfig;
    ///
    /// let config = EmojicalcConfig::development();
    /// assert_eq!(config.telemetry.logging.level, "debug");
    /// ```
    #[must_use]
    pub fn development() -> Self {
        let mut config = Self::default();

        config.telemetry.logging.level = "debug".to_string();
        config.telemetry.logging.format = LogFormat::Pretty;
        config.telemetry.logging.include_location = true;
        config.telemetry.environment = "development".to_string();

        config
    }

    /// Create a production configuration preset.
    ///
    /// JSON, info-level logs.
    ///
    /// # Example
    ///
    /// ```
    /// use emojicalc_config::EmojicalcConfig;
    ///
    /// let config = EmojicalcConfig::production();
    /// assert_eq!(config.telemetry.logging.format, emojicalc_config::LogFormat::Json);
    /// ```
    #[must_use]
    pub fn production() -> Self {
        let mut config = Self::default();

        config.telemetry.logging.level = "info".to_string();
        config.telemetry.logging.format = LogFormat::Json;
        config.telemetry.logging.include_location = false;
        config.telemetry.environment = "production".to_string();

        config
    }
}
