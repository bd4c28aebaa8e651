//! Observability for Emojicalc.
//!
//! - **Logging**: structured logs through `tracing-subscriber`, JSON or pretty
//! - **Metrics**: Prometheus exposition through the `metrics` facade
//!
//! Both are process-global and installed once by [`init_telemetry`]. Library
//! crates only emit through `tracing` and `metrics` macros, so they stay
//! silent until a binary installs the subscriber and recorder.
//!
//! # Example
//!
//! ```rust,ignore
//! use emojicalc_telemetry::{init_telemetry, LogConfig, TelemetryConfig};
//!
//! let config = TelemetryConfig::builder()
//!     .service_name("emojicalc")
//!     .environment("production")
//!     .logging(LogConfig::production())
//!     .metrics_addr("0.0.0.0:9090")
//!     .build();
//!
//! init_telemetry(config)?;
//! ```
//!
//! # Metrics Endpoint
//!
//! ```text
//! # TYPE emojicalc_requests_total counter
//! emojicalc_requests_total{service="emojicalc",route="^/?$",status="200"} 12
//! emojicalc_requests_total{service="emojicalc",route="unmatched",status="404"} 3
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;

pub use config::{TelemetryConfig, TelemetryConfigBuilder};
pub use error::TelemetryError;
pub use logging::{init_logging, LogConfig};
pub use metrics::{init_metrics, InFlightGuard, MetricsConfig};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;

/// Initializes logging, then metrics.
///
/// # Errors
///
/// Returns `TelemetryError` if either subsystem fails to initialize.
pub fn init_telemetry(config: TelemetryConfig) -> TelemetryResult<()> {
    init_logging(&config.logging)?;
    init_metrics(&config.metrics)?;

    tracing::info!(
        service.name = %config.service_name,
        service.version = %config.service_version,
        environment = %config.environment,
        "Telemetry initialized"
    );
    Ok(())
}
