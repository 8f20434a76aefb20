//! Logging, Tracing & Metrics Config

use std::time::Duration;

use clap::{Args, ValueEnum};

/// How log lines are rendered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// One line per event, for terminals.
    Compact,

    /// One JSON object per event, for log shippers.
    Json,
}

/// Logging settings.
#[derive(Debug, Args)]
pub struct LoggingConfig {
    /// Filter directives, e.g. `info` or `larder_app=debug,info`
    #[arg(short, long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,

    /// Output format
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

/// Span export and request monitoring settings.
#[derive(Debug, Args)]
pub struct ObservabilityConfig {
    /// Export spans over OTLP.
    #[arg(long, env = "OTEL_ENABLED", default_value_t = false)]
    pub otel_enabled: bool,

    /// Continue traces started upstream (`traceparent`). Needs `OTEL_ENABLED`.
    #[arg(long, env = "OTEL_PARENT_PROPAGATION_ENABLED", default_value_t = false)]
    pub otel_parent_propagation_enabled: bool,

    /// OTLP gRPC collector endpoint.
    #[arg(
        long,
        env = "OTEL_EXPORTER_OTLP_ENDPOINT",
        default_value = "http://localhost:4317"
    )]
    pub otel_exporter_otlp_endpoint: String,

    /// Export timeout, in seconds.
    #[arg(long, env = "OTEL_EXPORTER_OTLP_TIMEOUT_SECONDS", default_value_t = 3)]
    pub otel_exporter_otlp_timeout_seconds: u64,

    /// `service.name` resource attribute.
    #[arg(long, env = "OTEL_SERVICE_NAME", default_value = "larder-json")]
    pub otel_service_name: String,

    /// `service.version` resource attribute.
    #[arg(long, env = "OTEL_SERVICE_VERSION", default_value = env!("CARGO_PKG_VERSION"))]
    pub otel_service_version: String,

    /// `deployment.environment.name` resource attribute.
    #[arg(long, env = "OTEL_DEPLOYMENT_ENVIRONMENT", default_value = "development")]
    pub otel_deployment_environment: String,

    /// Fraction of new traces to sample; clamped to `0.0..=1.0`.
    #[arg(long, env = "OTEL_TRACE_SAMPLE_RATIO", default_value_t = 1.0)]
    pub otel_trace_sample_ratio: f64,

    /// Requests slower than this many milliseconds are logged at `warn`.
    #[arg(long, env = "SLOW_REQUEST_THRESHOLD_MS", default_value_t = 1_000)]
    pub slow_request_threshold_ms: u64,
}

impl ObservabilityConfig {
    /// Upstream trace context is only honoured while spans are exported.
    #[must_use]
    pub fn propagates_parent(&self) -> bool {
        self.otel_enabled && self.otel_parent_propagation_enabled
    }

    #[must_use]
    pub fn otlp_timeout(&self) -> Duration {
        Duration::from_secs(self.otel_exporter_otlp_timeout_seconds)
    }

    #[must_use]
    pub fn sample_ratio(&self) -> f64 {
        self.otel_trace_sample_ratio.clamp(0.0, 1.0)
    }
}
