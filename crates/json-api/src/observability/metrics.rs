//! Prometheus metrics collection and exposition endpoint.

use std::sync::OnceLock;

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};
use salvo::{
    Request, Response, handler,
    http::{
        StatusCode,
        header::{CONTENT_TYPE, HeaderValue},
    },
};
use tracing::error;

/// How an order submission ended, as seen at the HTTP boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SubmissionResult {
    Submitted,
    Rejected,
    Unauthorized,
    Failed,
}

impl SubmissionResult {
    const fn label(self) -> &'static str {
        match self {
            Self::Submitted => "submitted",
            Self::Rejected => "rejected",
            Self::Unauthorized => "unauthorized",
            Self::Failed => "failed",
        }
    }
}

/// Outcome of rolling back a half-written order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CompensationEvent {
    /// The orphaned header was deleted.
    Compensated,

    /// The header could not be deleted and remains without items.
    Inconsistent,
}

impl CompensationEvent {
    const fn label(self) -> &'static str {
        match self {
            Self::Compensated => "compensated",
            Self::Inconsistent => "inconsistent",
        }
    }
}

#[derive(Debug)]
struct Metrics {
    registry: Registry,
    requests_total: IntCounterVec,
    request_duration_seconds: HistogramVec,
    requests_in_flight: IntGauge,
    order_submissions_total: IntCounterVec,
    order_compensations_total: IntCounterVec,
}

static METRICS: OnceLock<Option<Metrics>> = OnceLock::new();

#[derive(Debug)]
pub(super) struct InFlightRequestGuard {
    tracked: bool,
}

impl InFlightRequestGuard {
    pub(super) fn track() -> Self {
        let Some(metrics) = metrics() else {
            return Self { tracked: false };
        };

        metrics.requests_in_flight.inc();

        Self { tracked: true }
    }
}

impl Drop for InFlightRequestGuard {
    fn drop(&mut self) {
        if self.tracked
            && let Some(metrics) = metrics()
        {
            metrics.requests_in_flight.dec();
        }
    }
}

pub(super) fn observe_request(method: &str, route: &str, status_code: u16, duration_seconds: f64) {
    let Some(metrics) = metrics() else {
        return;
    };

    let status_code_label = status_code.to_string();

    metrics
        .requests_total
        .with_label_values(&[
            method,
            route,
            status_class(status_code),
            status_code_label.as_str(),
        ])
        .inc();

    metrics
        .request_duration_seconds
        .with_label_values(&[method, route])
        .observe(duration_seconds);
}

pub(crate) fn record_submission(channel: &str, result: SubmissionResult) {
    if let Some(metrics) = metrics() {
        metrics
            .order_submissions_total
            .with_label_values(&[channel, result.label()])
            .inc();
    }
}

pub(crate) fn record_compensation(event: CompensationEvent) {
    if let Some(metrics) = metrics() {
        metrics
            .order_compensations_total
            .with_label_values(&[event.label()])
            .inc();
    }
}

#[handler]
pub(crate) async fn metrics_handler(_req: &mut Request, res: &mut Response) {
    let Some(metrics) = metrics() else {
        res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
        return;
    };

    let encoder = TextEncoder::new();
    let mut encoded = Vec::new();

    if let Err(source) = encoder.encode(&metrics.registry.gather(), &mut encoded) {
        error!("failed to encode metrics response: {source}");
        res.status_code(StatusCode::INTERNAL_SERVER_ERROR);

        return;
    }

    match HeaderValue::from_str(encoder.format_type()) {
        Ok(content_type) => {
            res.headers_mut().insert(CONTENT_TYPE, content_type);
            res.render(String::from_utf8_lossy(&encoded).into_owned());
        }
        Err(source) => {
            error!("failed to encode metrics content type header: {source}");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
        }
    }
}

fn metrics() -> Option<&'static Metrics> {
    METRICS
        .get_or_init(|| match build_metrics() {
            Ok(metrics) => Some(metrics),
            Err(source) => {
                error!("failed to initialise metrics registry: {source}");
                None
            }
        })
        .as_ref()
}

fn build_metrics() -> Result<Metrics, prometheus::Error> {
    let registry = Registry::new();

    let requests_total = IntCounterVec::new(
        Opts::new(
            "larder_json_http_requests_total",
            "HTTP requests by method, route, status class and status code.",
        ),
        &["method", "route", "status_class", "status_code"],
    )?;

    let request_duration_seconds = HistogramVec::new(
        HistogramOpts::new(
            "larder_json_http_request_duration_seconds",
            "HTTP request duration in seconds by method and route.",
        )
        .buckets(vec![
            0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
        ]),
        &["method", "route"],
    )?;

    let requests_in_flight = IntGauge::with_opts(Opts::new(
        "larder_json_http_requests_in_flight",
        "HTTP requests currently being served.",
    ))?;

    let order_submissions_total = IntCounterVec::new(
        Opts::new(
            "larder_json_order_submissions_total",
            "Order submissions by channel (direct or checkout) and result.",
        ),
        &["channel", "result"],
    )?;

    let order_compensations_total = IntCounterVec::new(
        Opts::new(
            "larder_json_order_compensations_total",
            "Order headers rolled back after a failed item write, by outcome.",
        ),
        &["outcome"],
    )?;

    registry.register(Box::new(requests_total.clone()))?;
    registry.register(Box::new(request_duration_seconds.clone()))?;
    registry.register(Box::new(requests_in_flight.clone()))?;
    registry.register(Box::new(order_submissions_total.clone()))?;
    registry.register(Box::new(order_compensations_total.clone()))?;

    Ok(Metrics {
        registry,
        requests_total,
        request_duration_seconds,
        requests_in_flight,
        order_submissions_total,
        order_compensations_total,
    })
}

fn status_class(status_code: u16) -> &'static str {
    match status_code {
        100..=199 => "1xx",
        200..=299 => "2xx",
        300..=399 => "3xx",
        400..=499 => "4xx",
        500..=599 => "5xx",
        _ => "other",
    }
}
