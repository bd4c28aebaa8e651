//! Prometheus metrics for Emojicalc.
//!
//! # Standard Metrics
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `emojicalc_requests_total` | Counter | `route`, `status` | Total requests |
//! | `emojicalc_request_duration_seconds` | Histogram | `route` | Request latency |
//! | `emojicalc_in_flight_requests` | Gauge | - | In-flight requests |
//! | `emojicalc_request_size_bytes` | Histogram | `route` | Request body size |
//! | `emojicalc_response_size_bytes` | Histogram | `route` | Response body size |
//! | `emojicalc_router_dispatch_total` | Counter | `status` | Router dispatch outcomes |
//!
//! Every series carries a `service` label set from [`MetricsConfig::service_name`].
//!
//! # Example
//!
//! ```rust,ignore
//! use emojicalc_telemetry::metrics::record_request;
//!
//! record_request("^/?$", 200, Duration::from_millis(3));
//! ```

use crate::error::TelemetryError;
use crate::TelemetryResult;
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::runtime::Handle;

/// Name of the request latency histogram.
pub const REQUEST_DURATION_METRIC: &str = "emojicalc_request_duration_seconds";

/// Metrics configuration.
#[derive(Debug, Clone)]
pub struct MetricsConfig {
    /// Whether metrics are enabled.
    pub enabled: bool,

    /// Address to expose metrics on (e.g., "0.0.0.0:9090").
    pub addr: String,

    /// Service name attached to every series.
    pub service_name: String,

    /// Histogram buckets for request duration.
    pub duration_buckets: Vec<f64>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            addr: "0.0.0.0:9090".to_string(),
            service_name: "emojicalc".to_string(),
            // 1ms up to 5s
            duration_buckets: vec![0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 5.0],
        }
    }
}

/// Initializes the metrics subsystem.
///
/// Installs a global Prometheus recorder and spawns its HTTP exporter on
/// `config.addr` onto the current Tokio runtime. The listener is bound before
/// this returns.
///
/// # Errors
///
/// Returns `TelemetryError::InvalidAddress` if the address does not parse and
/// `TelemetryError::MetricsInit` if there is no runtime, the listener cannot
/// bind, or a recorder is already installed.
pub fn init_metrics(config: &MetricsConfig) -> TelemetryResult<()> {
    if !config.enabled {
        return Ok(());
    }

    let addr: SocketAddr = config
        .addr
        .parse()
        .map_err(|e| TelemetryError::InvalidAddress(format!("{}: {e}", config.addr)))?;

    let builder = PrometheusBuilder::new()
        .add_global_label("service", config.service_name.clone())
        .set_buckets_for_metric(
            Matcher::Full(REQUEST_DURATION_METRIC.to_string()),
            &config.duration_buckets,
        )
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;

    let runtime = Handle::try_current().map_err(|_| {
        TelemetryError::MetricsInit("the metrics exporter needs a Tokio runtime".to_string())
    })?;

    let (recorder, exporter) = builder
        .with_http_listener(addr)
        .build()
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;

    metrics::set_global_recorder(recorder)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;

    runtime.spawn(async move {
        if exporter.await.is_err() {
            tracing::error!(%addr, "Metrics exporter stopped");
        }
    });

    register_metric_descriptions();

    tracing::info!(%addr, "Metrics exporter listening");
    Ok(())
}

fn register_metric_descriptions() {
    describe_counter!(
        "emojicalc_requests_total",
        "Total number of HTTP requests processed"
    );
    describe_histogram!(REQUEST_DURATION_METRIC, "HTTP request duration in seconds");
    describe_gauge!(
        "emojicalc_in_flight_requests",
        "Number of HTTP requests currently being processed"
    );
    describe_histogram!(
        "emojicalc_request_size_bytes",
        "HTTP request body size in bytes"
    );
    describe_histogram!(
        "emojicalc_response_size_bytes",
        "HTTP response body size in bytes"
    );
    describe_counter!(
        "emojicalc_router_dispatch_total",
        "Router dispatch outcomes by response status"
    );
}

// ============================================================================
// Metric Recording Functions
// ============================================================================

/// Records a completed request.
///
/// `route` is the matched route pattern, or `"unmatched"`. Using the pattern
/// rather than the raw path keeps label cardinality bounded.
pub fn record_request(route: &str, status_code: u16, duration: Duration) {
    counter!(
        "emojicalc_requests_total",
        "route" => route.to_string(),
        "status" => status_code.to_string()
    )
    .increment(1);

    histogram!(REQUEST_DURATION_METRIC, "route" => route.to_string())
        .record(duration.as_secs_f64());
}

/// Increments the in-flight requests gauge.
pub fn increment_in_flight() {
    gauge!("emojicalc_in_flight_requests").increment(1.0);
}

/// Decrements the in-flight requests gauge.
pub fn decrement_in_flight() {
    gauge!("emojicalc_in_flight_requests").decrement(1.0);
}

/// Records request body size.
pub fn record_request_size(route: &str, size_bytes: u64) {
    histogram!("emojicalc_request_size_bytes", "route" => route.to_string())
        .record(size_bytes as f64);
}

/// Records response body size.
pub fn record_response_size(route: &str, size_bytes: u64) {
    histogram!("emojicalc_response_size_bytes", "route" => route.to_string())
        .record(size_bytes as f64);
}

/// Guard that decrements in-flight requests on drop.
///
/// The counter is decremented even if the request handler panics.
pub struct InFlightGuard {
    _private: (),
}

impl InFlightGuard {
    /// Creates a new guard and increments the in-flight counter.
    #[must_use]
    pub fn new() -> Self {
        increment_in_flight();
        Self { _private: () }
    }
}

impl Default for InFlightGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        decrement_in_flight();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MetricsConfig::default();
        assert!(config.enabled);
        assert_eq!(config.addr, "0.0.0.0:9090");
        assert_eq!(config.service_name, "emojicalc");
        assert!(config.duration_buckets.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_disabled_metrics_is_noop() {
        let config = MetricsConfig {
            enabled: false,
            addr: "not an address".to_string(),
            ..MetricsConfig::default()
        };
        assert!(init_metrics(&config).is_ok());
    }

    #[test]
    fn test_invalid_address() {
        let config = MetricsConfig {
            addr: "not an address".to_string(),
            ..MetricsConfig::default()
        };
        let err = init_metrics(&config).unwrap_err();
        assert!(matches!(err, TelemetryError::InvalidAddress(_)));
        assert!(err.to_string().contains("not an address"));
    }

    #[test]
    fn test_empty_buckets_rejected() {
        let config = MetricsConfig {
            addr: "127.0.0.1:0".to_string(),
            duration_buckets: Vec::new(),
            ..MetricsConfig::default()
        };
        assert!(matches!(
            init_metrics(&config),
            Err(TelemetryError::MetricsInit(_))
        ));
    }

    #[test]
    fn test_in_flight_guard() {
        let guard = InFlightGuard::new();
        drop(guard);
    }

    #[test]
    fn test_record_functions_dont_panic() {
        // No recorder installed: the metrics facade discards these
        record_request("^/?$", 200, Duration::from_millis(10));
        record_request_size("^/?$", 64);
        record_response_size("^/?$", 2048);
    }

    #[test]
    fn test_requires_runtime() {
        let config = MetricsConfig {
            addr: "127.0.0.1:0".to_string(),
            ..MetricsConfig::default()
        };
        let err = init_metrics(&config).unwrap_err();
        assert!(matches!(err, TelemetryError::MetricsInit(_)));
        assert!(err.to_string().contains("Tokio runtime"));
    }
}
