//! Configuration loading.
//!
//! Sources, later ones overriding earlier ones:
//!  1. `/etc/hook-relay/service.yaml`: system-wide defaults
//!  2. `./config/service.yaml`: deployment-local override
//!  3. the file named by `HOOK_RELAY_CONFIG_FILE` (must exist when set)
//!  4. environment variables prefixed `RELAY__`, `__` separating sections,
//!     e.g. `RELAY__SERVER__PORT=9090` sets `server.port`
//!  5. the flat variables of earlier deployments (`TELEGRAM_BOT_TOKEN`,
//!     `TELEGRAM_DEFAULT_CHAT_ID`, `EVENT_CHAT_MAPPING`, ...)
//!
//! Every field has a serde default, so missing files are fine. A malformed
//! file or a value that cannot be coerced to its field type is an error.

use config::{Config, ConfigBuilder, Environment, File, FileFormat};
use hook_relay_api::ServiceConfig;
use std::path::PathBuf;
use tracing::info;

pub const SYSTEM_CONFIG_FILE: &str = "/etc/hook-relay/service";
pub const LOCAL_CONFIG_FILE: &str = "config/service";
pub const CONFIG_FILE_ENV: &str = "HOOK_RELAY_CONFIG_FILE";
pub const ENV_PREFIX: &str = "RELAY";

/// Flat environment variables and the configuration keys they set.
pub const LEGACY_ENV_KEYS: &[(&str, &str)] = &[
    ("TELEGRAM_BOT_TOKEN", "telegram.bot_token"),
    ("TELEGRAM_BOT_USERNAME", "telegram.bot_username"),
    ("TELEGRAM_DEFAULT_CHAT_ID", "telegram.default_chat_id"),
    ("EVENT_CHAT_MAPPING", "routing.event_chat_mapping"),
    ("DEVELOPMENT_MODE", "development_mode"),
    ("SERVER_PORT", "server.port"),
];

/// Configuration could not be assembled.
#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("Failed to build configuration: {0}")]
    Source(#[from] config::ConfigError),

    #[error(transparent)]
    Invalid(#[from] hook_relay_api::ConfigError),
}

/// Where configuration files are looked up.
#[derive(Debug, Clone)]
pub struct ConfigFiles {
    pub optional: Vec<PathBuf>,
    pub explicit: Option<PathBuf>,
}

impl ConfigFiles {
    /// The standard locations plus `HOOK_RELAY_CONFIG_FILE`, when set.
    pub fn standard() -> Self {
        let explicit = std::env::var(CONFIG_FILE_ENV)
            .ok()
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from);

        Self {
            optional: vec![
                PathBuf::from(SYSTEM_CONFIG_FILE),
                PathBuf::from(LOCAL_CONFIG_FILE),
            ],
            explicit,
        }
    }
}

/// Load and validate the service configuration from the standard sources.
pub fn load_service_config() -> Result<ServiceConfig, ConfigLoadError> {
    load_from(&ConfigFiles::standard())
}

/// Load and validate the service configuration from `files` and the
/// environment.
pub fn load_from(files: &ConfigFiles) -> Result<ServiceConfig, ConfigLoadError> {
    let mut builder = Config::builder();

    for path in &files.optional {
        builder = builder.add_source(
            File::from(path.as_path())
                .format(FileFormat::Yaml)
                .required(false),
        );
    }

    if let Some(path) = &files.explicit {
        info!(path = %path.display(), "Loading configuration from explicit path");
        builder = builder.add_source(
            File::from(path.as_path())
                .format(FileFormat::Yaml)
                .required(true),
        );
    }

    builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).separator("__"));
    builder = apply_legacy_env(builder)?;

    let service_config: ServiceConfig = builder.build()?.try_deserialize()?;
    service_config.validate()?;

    Ok(service_config)
}

/// Override keys from the flat variables. Empty values are skipped.
fn apply_legacy_env(
    mut builder: ConfigBuilder<config::builder::DefaultState>,
) -> Result<ConfigBuilder<config::builder::DefaultState>, config::ConfigError> {
    for (variable, key) in LEGACY_ENV_KEYS {
        let value = std::env::var(variable)
            .ok()
            .filter(|value| !value.trim().is_empty());
        if value.is_some() {
            info!(variable = *variable, key = *key, "Applying legacy environment variable");
        }
        builder = builder.set_override_option(*key, value)?;
    }
    Ok(builder)
}

#[cfg(test)]
#[path = "config_loader_tests.rs"]
mod tests;
