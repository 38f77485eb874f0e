//! # Hook-Relay Service
//!
//! Binary entry point for the Hook-Relay HTTP service.
//!
//! This executable:
//! - Loads configuration from `.env`, files and environment
//! - Initializes logging
//! - Connects to the Telegram Bot API and sets up bot update delivery
//! - Starts the HTTP server from hook-relay-api

mod bot_updates;
mod config_loader;

use bot_updates::{configure_update_mode, poll_request_timeout, verify_bot, UpdateMode, UpdatePoller};
use hook_relay_api::{start_server, AppState, LoggingConfig, ServiceError};
use hook_relay_core::dispatch::TelegramDispatcher;
use std::sync::Arc;
use telegram_bot_sdk::TelegramClient;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Exit code for configuration problems found before the server starts.
const CONFIG_EXIT_CODE: i32 = 3;

#[tokio::main]
async fn main() {
    // Missing .env is normal; the outcome is logged once tracing is up.
    let dotenv = dotenvy::dotenv();

    let service_config = match config_loader::load_service_config() {
        Ok(config) => config,
        Err(e) => {
            init_tracing(&LoggingConfig::default());
            error!(error = %e, "Service configuration is invalid; aborting");
            std::process::exit(CONFIG_EXIT_CODE);
        }
    };

    init_tracing(&service_config.logging);

    match dotenv {
        Ok(path) => info!(path = %path.display(), "Loaded environment from file"),
        Err(e) if e.not_found() => {}
        Err(e) => warn!(error = %e, "Failed to read .env file"),
    }

    info!(
        development_mode = service_config.development_mode,
        endpoint = %service_config.routing.endpoint_path,
        "Starting Hook-Relay Service"
    );

    if let Err(e) = run(service_config).await {
        error!(error = %e, "Service stopped with an error");
        std::process::exit(exit_code(&e));
    }
}

async fn run(service_config: hook_relay_api::ServiceConfig) -> Result<(), ServiceError> {
    let token = service_config.telegram.bot_token()?;
    let client_config = service_config.telegram.client_config();

    let client = TelegramClient::new(token.clone(), client_config.clone()).map_err(|e| {
        ServiceError::ClientSetup {
            message: e.to_string(),
        }
    })?;

    let dispatcher = Arc::new(TelegramDispatcher::new(
        client.clone(),
        service_config.telegram.dispatch_settings()?,
    ));

    let development_mode = service_config.development_mode;
    let state = AppState::from_config(service_config, dispatcher)?;

    info!(
        formatters = state.router.formatters().event_types().len(),
        routes = state.router.destinations().len(),
        forward_unknown_events = state.router.formatters().forwards_unknown_events(),
        "Event routing configured"
    );

    verify_bot(&client).await;

    let poller = match configure_update_mode(&client, &state.config.telegram, development_mode).await
    {
        UpdateMode::Polling => {
            let poll_client =
                TelegramClient::new(token, client_config.with_timeout(poll_request_timeout()))
                    .map_err(|e| ServiceError::ClientSetup {
                        message: e.to_string(),
                    })?;
            Some(tokio::spawn(
                UpdatePoller::new(poll_client, state.clone()).run(),
            ))
        }
        UpdateMode::Webhook { url } => {
            info!(url = %url, "Receiving bot updates by webhook");
            None
        }
        UpdateMode::Disabled => None,
    };

    let result = start_server(state).await;

    if let Some(poller) = poller {
        poller.abort();
    }

    result
}

fn init_tracing(logging: &LoggingConfig) {
    let level = &logging.level;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "hook_relay={level},hook_relay_api={level},hook_relay_core={level},telegram_bot_sdk={level},tower_http=info"
        )
        .into()
    });

    let json = logging.json_format;
    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json).then(tracing_subscriber::fmt::layer))
        .init();
}

fn exit_code(error: &ServiceError) -> i32 {
    match error {
        ServiceError::BindFailed { .. } => 1,
        ServiceError::ServerFailed { .. } => 2,
        ServiceError::Configuration(_) => CONFIG_EXIT_CODE,
        ServiceError::ClientSetup { .. } => 4,
    }
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
