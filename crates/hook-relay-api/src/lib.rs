//! # Hook-Relay HTTP Service
//!
//! HTTP server that receives GitHub webhooks and relays them to Telegram chats.
//!
//! This service provides:
//! - The GitHub webhook endpoint (path configurable)
//! - The Telegram bot update endpoint answering `/get_chat_id`
//! - Health, readiness and Prometheus metrics endpoints

pub mod config;
pub mod errors;
pub mod metrics;
pub mod responses;

pub use config::{
    LoggingConfig, RouteConfig, RoutingConfig, ServerConfig, ServiceConfig, TelegramConfig,
};
pub use errors::{ConfigError, ServiceError, WebhookHandlerError};
pub use metrics::ServiceMetrics;
pub use responses::{AckResponse, HealthResponse, ReadinessResponse, WebhookResponse, WebhookStatus};

use axum::{
    error_handling::HandleErrorLayer,
    extract::{DefaultBodyLimit, State},
    http::{header, HeaderMap, StatusCode},
    middleware,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    BoxError, Router,
};
use bytes::Bytes;
use hook_relay_core::commands::CommandHandler;
use hook_relay_core::dispatch::MessageDispatcher;
use hook_relay_core::formatter::FormatterRegistry;
use hook_relay_core::routing::{EventRouter, RoutingDecision};
use hook_relay_core::webhook::{parse_payload, WebhookError, WebhookEvent, WebhookHeaders};
use hook_relay_core::Timestamp;
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use telegram_bot_sdk::Update;
use tower::timeout::{error::Elapsed, TimeoutLayer};
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer, compression::CompressionLayer, cors::CorsLayer,
    trace::TraceLayer,
};
use tracing::{error, info, instrument, warn};

/// Metric label for event types without a formatter, bounding label cardinality.
const OTHER_EVENT_LABEL: &str = "other";

/// Metric label used when the event type header is unusable.
const NO_EVENT_LABEL: &str = "none";

// ============================================================================
// Application State
// ============================================================================

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Configuration for the service
    pub config: Arc<ServiceConfig>,

    /// Formatter and destination lookup for incoming events
    pub router: Arc<EventRouter>,

    /// Outbound message delivery
    pub dispatcher: Arc<dyn MessageDispatcher>,

    /// Bot command handling for Telegram updates
    pub commands: Arc<CommandHandler>,

    /// Metrics collector for observability
    pub metrics: Arc<ServiceMetrics>,
}

impl AppState {
    /// Create new application state
    pub fn new(
        config: ServiceConfig,
        router: EventRouter,
        dispatcher: Arc<dyn MessageDispatcher>,
        commands: CommandHandler,
        metrics: Arc<ServiceMetrics>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            router: Arc::new(router),
            dispatcher,
            commands: Arc::new(commands),
            metrics,
        }
    }

    /// Build the router, command handler and metrics described by `config`.
    pub fn from_config(
        config: ServiceConfig,
        dispatcher: Arc<dyn MessageDispatcher>,
    ) -> Result<Self, ServiceError> {
        let formatters = FormatterRegistry::with_default_formatters()
            .with_unknown_event_forwarding(config.routing.forward_unknown_events);
        let router = EventRouter::new(formatters, config.destination_map()?);

        let commands = CommandHandler::new(dispatcher.clone(), config.telegram.bot_username.clone());

        let metrics = ServiceMetrics::new().map_err(|e| {
            ServiceError::Configuration(ConfigError::Invalid {
                message: format!("Failed to initialize metrics: {}", e),
            })
        })?;

        Ok(Self::new(config, router, dispatcher, commands, metrics))
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("router", &self.router)
            .field("commands", &self.commands)
            .finish()
    }
}

// ============================================================================
// HTTP Server
// ============================================================================

/// Create HTTP router with all endpoints
pub fn create_router(state: AppState) -> Router {
    let webhook_routes = Router::new()
        .route(&state.config.routing.endpoint_path, post(handle_webhook))
        .route("/telegram-webhook", post(handle_telegram_update));

    let health_routes = Router::new()
        .route("/health", get(handle_health_check))
        .route("/ready", get(handle_readiness_check));

    let observability_routes = Router::new().route("/metrics", get(metrics_endpoint));

    Router::new()
        .merge(webhook_routes)
        .merge(health_routes)
        .merge(observability_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(CorsLayer::permissive())
                .layer(middleware::from_fn(request_logging_middleware))
                .layer(middleware::from_fn_with_state(
                    state.clone(),
                    metrics_middleware,
                ))
                .layer(HandleErrorLayer::new(handle_middleware_error))
                .layer(TimeoutLayer::new(state.config.server.request_timeout()))
                .layer(CatchPanicLayer::custom(handle_panic))
                .layer(DefaultBodyLimit::max(state.config.server.max_body_size))
                .into_inner(),
        )
        .with_state(state)
}

/// Start HTTP server
pub async fn start_server(state: AppState) -> Result<(), ServiceError> {
    let address = state.config.server.bind_address();
    let shutdown_timeout = Duration::from_secs(state.config.server.shutdown_timeout_seconds);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .map_err(|e| ServiceError::BindFailed {
            address: address.clone(),
            message: e.to_string(),
        })?;

    info!(address = %address, "Starting HTTP server");

    let shutdown_signal = async move {
        let ctrl_c = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "Failed to listen for Ctrl+C");
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(mut signal) => {
                    signal.recv().await;
                }
                Err(e) => {
                    error!(error = %e, "Failed to listen for SIGTERM");
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {
                info!("Received SIGINT (Ctrl+C), initiating graceful shutdown with {}s timeout", shutdown_timeout.as_secs());
            },
            _ = terminate => {
                info!("Received SIGTERM, initiating graceful shutdown with {}s timeout", shutdown_timeout.as_secs());
            },
        }
    };

    // In-flight requests finish before the server stops; new connections are
    // refused as soon as the signal arrives.
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await
        .map_err(|e| ServiceError::ServerFailed {
            message: e.to_string(),
        })?;

    info!("HTTP server shutdown complete");
    Ok(())
}

// ============================================================================
// Webhook Handlers
// ============================================================================

/// Handle GitHub webhook requests
///
/// Parses the event, routes it and, when a message results, sends it with a
/// single delivery attempt. The response reports what was relayed; a failed
/// delivery still answers `success` so GitHub does not redeliver.
#[instrument(skip(state, headers, body), fields(event_type, delivery_id))]
pub async fn handle_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookResponse>, WebhookHandlerError> {
    let started = Instant::now();
    let header_map = header_map(&headers);

    let webhook_headers = match WebhookHeaders::from_http_headers(&header_map) {
        Ok(webhook_headers) => webhook_headers,
        Err(e) => {
            let e = WebhookHandlerError::from(WebhookError::from(e));
            state
                .metrics
                .record_webhook(NO_EVENT_LABEL, e.outcome_label(), started.elapsed());
            return Err(e);
        }
    };

    let span = tracing::Span::current();
    span.record("event_type", webhook_headers.event_type.as_str());
    if let Some(delivery_id) = &webhook_headers.delivery_id {
        span.record("delivery_id", delivery_id.as_str());
    }

    let event_label = if state.router.formatters().contains(&webhook_headers.event_type) {
        webhook_headers.event_type.as_str().to_string()
    } else {
        OTHER_EVENT_LABEL.to_string()
    };

    let payload = match parse_payload(&body) {
        Ok(payload) => payload,
        Err(e) => {
            let e = WebhookHandlerError::from(e);
            state
                .metrics
                .record_webhook(&event_label, e.outcome_label(), started.elapsed());
            return Err(e);
        }
    };

    let event = WebhookEvent::new(webhook_headers.event_type, payload)
        .with_delivery_id(webhook_headers.delivery_id);

    info!("Received webhook event");

    let response = match state.router.route(&event) {
        RoutingDecision::Ignored(reason) => {
            info!(reason = reason.as_str(), "Webhook event ignored");
            state
                .metrics
                .record_webhook(&event_label, reason.as_str(), started.elapsed());
            WebhookResponse::ignored(reason.to_string())
        }
        RoutingDecision::Deliver(delivery) => {
            let dispatch_started = Instant::now();
            let outcome = state
                .dispatcher
                .dispatch(&delivery.destination, &delivery.text)
                .await;
            state
                .metrics
                .record_dispatch(outcome.is_delivered(), dispatch_started.elapsed());

            if !outcome.is_delivered() {
                warn!(
                    destination = %delivery.destination,
                    outcome = ?outcome,
                    "Webhook event was not delivered"
                );
            }

            state
                .metrics
                .record_webhook(&event_label, "relayed", started.elapsed());
            WebhookResponse::success(delivery.text)
        }
    };

    Ok(Json(response))
}

/// Handle Telegram bot updates
///
/// Always acknowledged with 200 so the platform does not redeliver; bodies
/// that are not valid updates are logged and dropped.
#[instrument(skip(state, body))]
pub async fn handle_telegram_update(State(state): State<AppState>, body: Bytes) -> Json<AckResponse> {
    let update: Update = match serde_json::from_slice(&body) {
        Ok(update) => update,
        Err(e) => {
            warn!(error = %e, "Discarding malformed Telegram update");
            return Json(AckResponse::ok());
        }
    };

    process_update(&state, &update).await;
    Json(AckResponse::ok())
}

/// Run one bot update through the command handler and record its metrics.
///
/// Shared by the update webhook and the long-polling loop.
pub async fn process_update(state: &AppState, update: &Update) {
    let Some((command, _)) = state.commands.command_in(update) else {
        return;
    };

    let started = Instant::now();
    if let Some(outcome) = state.commands.handle_update(update).await {
        state
            .metrics
            .record_dispatch(outcome.is_delivered(), started.elapsed());
        state.metrics.record_bot_command(command.name());
    }
}

// ============================================================================
// Health Check Handlers
// ============================================================================

/// Basic health check endpoint
#[instrument(skip_all)]
async fn handle_health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: Timestamp::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Readiness check for container orchestration
#[instrument(skip_all)]
async fn handle_readiness_check() -> Json<ReadinessResponse> {
    Json(ReadinessResponse {
        ready: true,
        timestamp: Timestamp::now(),
    })
}

/// Prometheus metrics endpoint
#[instrument(skip_all)]
async fn metrics_endpoint(State(state): State<AppState>) -> Response {
    match state.metrics.encode() {
        Ok(body) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to encode metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

// ============================================================================
// Middleware
// ============================================================================

/// Turn a handler panic into a 500 JSON response.
fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else {
        "Unknown panic".to_string()
    };

    error!(panic = %message, "Request handler panicked");

    WebhookHandlerError::Internal { message }.into_response()
}

/// Errors raised by the layers below `HandleErrorLayer`, answered with the
/// same JSON envelope as handler errors.
async fn handle_middleware_error(error: BoxError) -> Response {
    if error.is::<Elapsed>() {
        WebhookHandlerError::Timeout.into_response()
    } else {
        WebhookHandlerError::Internal {
            message: error.to_string(),
        }
        .into_response()
    }
}

/// Request logging middleware
///
/// Reuses the caller's `x-correlation-id` or generates one, makes it available
/// to handlers through request extensions and echoes it on the response.
#[instrument(skip(request, next), fields(
    method = %request.method(),
    uri = %request.uri(),
    correlation_id
))]
async fn request_logging_middleware(
    mut request: axum::extract::Request,
    next: axum::middleware::Next,
) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let correlation_id = request
        .headers()
        .get("x-correlation-id")
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    tracing::Span::current().record("correlation_id", correlation_id.as_str());

    request.extensions_mut().insert(correlation_id.clone());

    info!(
        correlation_id = %correlation_id,
        method = %method,
        uri = %uri,
        "Request started"
    );

    let mut response = next.run(request).await;
    let duration = start.elapsed();

    if let Ok(header_value) = correlation_id.parse() {
        response
            .headers_mut()
            .insert("x-correlation-id", header_value);
    }

    let status = response.status();

    if status.is_server_error() {
        error!(
            correlation_id = %correlation_id,
            method = %method,
            uri = %uri,
            status = %status,
            duration_ms = %duration.as_millis(),
            "Request completed with server error"
        );
    } else if status.is_client_error() {
        warn!(
            correlation_id = %correlation_id,
            method = %method,
            uri = %uri,
            status = %status,
            duration_ms = %duration.as_millis(),
            "Request completed with client error"
        );
    } else {
        info!(
            correlation_id = %correlation_id,
            method = %method,
            uri = %uri,
            status = %status,
            duration_ms = %duration.as_millis(),
            "Request completed successfully"
        );
    }

    response
}

/// Records request count and latency by status class.
async fn metrics_middleware(
    State(state): State<AppState>,
    request: axum::extract::Request,
    next: axum::middleware::Next,
) -> Response {
    let start = Instant::now();
    let response = next.run(request).await;

    state
        .metrics
        .record_http_request(start.elapsed(), response.status().as_u16());

    response
}

/// Lower-cased header names to values; non-UTF-8 values become empty.
fn header_map(headers: &HeaderMap) -> HashMap<String, String> {
    headers
        .iter()
        .map(|(k, v)| {
            (
                k.as_str().to_lowercase(),
                v.to_str().unwrap_or("").to_string(),
            )
        })
        .collect()
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
