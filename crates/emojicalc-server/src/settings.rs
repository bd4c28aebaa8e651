//! Maps the loaded [`EmojicalcConfig`] onto the settings of each component.

use emojicalc_app::AppConfig;
use emojicalc_config::{EmojicalcConfig, LogFormat};
use emojicalc_telemetry::{LogConfig, MetricsConfig, TelemetryConfig};

/// Application settings: views directory (bundled views when unset) and page
/// template.
#[must_use]
pub fn app_config(config: &EmojicalcConfig) -> AppConfig {
    let defaults = AppConfig::default();
    AppConfig {
        views_dir: config.views.directory.clone().unwrap_or(defaults.views_dir),
        page_template: config.views.page_template.clone(),
    }
}

/// Telemetry settings for logging and metrics.
#[must_use]
pub fn telemetry_config(config: &EmojicalcConfig) -> TelemetryConfig {
    let section = &config.telemetry;
    let json = section.logging.format == LogFormat::Json;

    let logging = LogConfig {
        enabled: section.logging.enabled,
        level: section.logging.level.clone(),
        json_format: json,
        span_events: !json,
        file_line_info: section.logging.include_location,
        ..LogConfig::default()
    };

    let metrics = MetricsConfig {
        enabled: section.metrics.enabled,
        addr: section.metrics.addr.clone(),
        ..MetricsConfig::default()
    };

    TelemetryConfig::builder()
        .service_name(&section.service_name)
        .service_version(crate::VERSION)
        .environment(&section.environment)
        .logging(logging)
        .metrics(metrics)
        .build()
}
