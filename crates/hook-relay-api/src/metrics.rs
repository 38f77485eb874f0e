//! Metrics collection for the relay service.

use prometheus::{
    Encoder, Histogram, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry,
    TextEncoder,
};
use std::sync::Arc;
use std::time::Duration;

/// Service metrics for observability.
///
/// Each instance owns its registry, so several services (or tests) can live
/// in one process without name clashes.
#[derive(Debug)]
pub struct ServiceMetrics {
    registry: Registry,

    // HTTP request metrics
    pub http_requests_total: IntCounterVec,
    pub http_request_duration: Histogram,

    // Webhook processing metrics
    pub webhooks_total: IntCounterVec,
    pub webhook_duration_seconds: Histogram,

    // Delivery metrics
    pub dispatch_total: IntCounterVec,
    pub dispatch_failures_total: IntCounter,
    pub dispatch_duration_seconds: HistogramVec,

    // Bot metrics
    pub bot_commands_total: IntCounterVec,
}

impl ServiceMetrics {
    pub fn new() -> Result<Arc<Self>, prometheus::Error> {
        let registry = Registry::new();

        let http_requests_total = IntCounterVec::new(
            Opts::new("http_requests_total", "Total number of HTTP requests"),
            &["status_class"],
        )?;
        let http_request_duration = Histogram::with_opts(
            HistogramOpts::new(
                "http_request_duration_seconds",
                "HTTP request processing time",
            )
            .buckets(vec![0.001, 0.01, 0.1, 1.0, 10.0]),
        )?;
        let webhooks_total = IntCounterVec::new(
            Opts::new(
                "webhooks_total",
                "Webhook deliveries received, by event type and outcome",
            ),
            &["event_type", "outcome"],
        )?;
        let webhook_duration_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "webhook_duration_seconds",
                "Webhook processing time distribution",
            )
            .buckets(vec![0.001, 0.01, 0.1, 0.5, 1.0, 2.0, 5.0]),
        )?;
        let dispatch_total = IntCounterVec::new(
            Opts::new("dispatch_total", "Chat messages sent, by result"),
            &["result"],
        )?;
        let dispatch_failures_total = IntCounter::new(
            "dispatch_failures_total",
            "Chat messages that could not be delivered",
        )?;
        let dispatch_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "dispatch_duration_seconds",
                "Time spent sending a chat message",
            )
            .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
            &["result"],
        )?;
        let bot_commands_total = IntCounterVec::new(
            Opts::new("bot_commands_total", "Bot commands answered, by command"),
            &["command"],
        )?;

        registry.register(Box::new(http_requests_total.clone()))?;
        registry.register(Box::new(http_request_duration.clone()))?;
        registry.register(Box::new(webhooks_total.clone()))?;
        registry.register(Box::new(webhook_duration_seconds.clone()))?;
        registry.register(Box::new(dispatch_total.clone()))?;
        registry.register(Box::new(dispatch_failures_total.clone()))?;
        registry.register(Box::new(dispatch_duration_seconds.clone()))?;
        registry.register(Box::new(bot_commands_total.clone()))?;

        Ok(Arc::new(Self {
            registry,
            http_requests_total,
            http_request_duration,
            webhooks_total,
            webhook_duration_seconds,
            dispatch_total,
            dispatch_failures_total,
            dispatch_duration_seconds,
            bot_commands_total,
        }))
    }

    pub fn record_http_request(&self, duration: Duration, status: u16) {
        let class = match status {
            100..=199 => "1xx",
            200..=299 => "2xx",
            300..=399 => "3xx",
            400..=499 => "4xx",
            _ => "5xx",
        };
        self.http_requests_total.with_label_values(&[class]).inc();
        self.http_request_duration.observe(duration.as_secs_f64());
    }

    pub fn record_webhook(&self, event_type: &str, outcome: &str, duration: Duration) {
        self.webhooks_total
            .with_label_values(&[event_type, outcome])
            .inc();
        self.webhook_duration_seconds
            .observe(duration.as_secs_f64());
    }

    pub fn record_dispatch(&self, delivered: bool, duration: Duration) {
        let result = if delivered { "delivered" } else { "failed" };
        self.dispatch_total.with_label_values(&[result]).inc();
        self.dispatch_duration_seconds
            .with_label_values(&[result])
            .observe(duration.as_secs_f64());
        if !delivered {
            self.dispatch_failures_total.inc();
        }
    }

    pub fn record_bot_command(&self, command: &str) {
        self.bot_commands_total.with_label_values(&[command]).inc();
    }

    /// Render all metrics in the Prometheus text exposition format.
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

#[cfg(test)]
#[path = "metrics_tests.rs"]
mod tests;
