//! Application configuration module
//!
//! Type-safe configuration loaded from environment variables with the
//! `config` and `dotenvy` crates. Variables use the `WORKOUT_SESSIONS`
//! prefix and `__` between nested keys. Every value has a default, so an
//! empty environment yields a runnable in-memory server.
//!
//! # Example
//!
//! ```no_run
//! use workout_sessions::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod actor;
mod error;
mod server;
mod storage;

pub use actor::ActorSettings;
pub use error::{ConfigError, ValidationError};
pub use server::{Environment, ServerConfig};
pub use storage::{StorageBackend, StorageConfig};

use serde::Deserialize;

const ENV_PREFIX: &str = "WORKOUT_SESSIONS";

/// Root application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment, logging)
    #[serde(default)]
    pub server: ServerConfig,

    /// Session actor tuning
    #[serde(default)]
    pub actor: ActorSettings,

    /// Session store selection
    #[serde(default)]
    pub storage: StorageConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads variables with the `WORKOUT_SESSIONS` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    ///
    /// # Environment Variable Format
    ///
    /// - `WORKOUT_SESSIONS__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `WORKOUT_SESSIONS__ACTOR__HEARTBEAT_TIMEOUT_SECS=30`
    ///   -> `actor.heartbeat_timeout_secs = 30`
    /// - `WORKOUT_SESSIONS__STORAGE__BACKEND=file` -> `storage.backend = file`
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix(ENV_PREFIX)
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.actor.validate()?;
        self.storage.validate()?;
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Env vars are process-global.
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: &[&str] = &[
        "WORKOUT_SESSIONS__SERVER__PORT",
        "WORKOUT_SESSIONS__SERVER__ENVIRONMENT",
        "WORKOUT_SESSIONS__ACTOR__HEARTBEAT_TIMEOUT_SECS",
        "WORKOUT_SESSIONS__STORAGE__BACKEND",
        "WORKOUT_SESSIONS__STORAGE__DATA_DIR",
    ];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn empty_environment_gives_valid_defaults() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let config = AppConfig::load().unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.actor.heartbeat_timeout_secs, 60);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn nested_values_come_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("WORKOUT_SESSIONS__SERVER__PORT", "3000");
        env::set_var("WORKOUT_SESSIONS__ACTOR__HEARTBEAT_TIMEOUT_SECS", "30");
        env::set_var("WORKOUT_SESSIONS__STORAGE__BACKEND", "file");
        env::set_var("WORKOUT_SESSIONS__STORAGE__DATA_DIR", "/var/lib/sessions");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.actor.heartbeat_timeout_secs, 30);
        assert_eq!(config.storage.backend, StorageBackend::File);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn production_flag() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("WORKOUT_SESSIONS__SERVER__ENVIRONMENT", "production");
        let result = AppConfig::load();
        clear_env();

        assert!(result.unwrap().is_production());
    }

    #[test]
    fn file_backend_without_directory_fails_validation() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("WORKOUT_SESSIONS__STORAGE__BACKEND", "file");
        let result = AppConfig::load();
        clear_env();

        assert_eq!(
            result.unwrap().validate(),
            Err(ValidationError::MissingRequired("storage.data_dir"))
        );
    }
}
