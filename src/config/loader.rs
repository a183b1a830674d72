//! Configuration Loader
//!
//! Environment-aware configuration loading. Sources, lowest precedence first:
//!
//! 1. Built-in defaults (`CoordinatorConfig::default()`)
//! 2. Optional TOML file (`COORDINATOR_CONFIG` or an explicit path)
//! 3. Environment variables prefixed `COORDINATOR__`, nested with `__`
//!    (e.g. `COORDINATOR__QUEUE_DRAIN__LOCK_TTL_SECONDS=90`)

use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

use super::error::{ConfigResult, ConfigurationError};
use super::CoordinatorConfig;

const CONFIG_PATH_VAR: &str = "COORDINATOR_CONFIG";
const ENV_PREFIX: &str = "COORDINATOR";

/// Loaded, validated configuration plus the environment it was loaded for
#[derive(Debug)]
pub struct ConfigManager {
    config: CoordinatorConfig,
    environment: String,
    config_path: Option<PathBuf>,
}

impl ConfigManager {
    /// Load configuration with environment auto-detection
    pub fn load() -> ConfigResult<Arc<ConfigManager>> {
        let path = env::var(CONFIG_PATH_VAR).ok().map(PathBuf::from);
        Self::load_with_env(path.as_deref(), &Self::detect_environment())
    }

    /// Load configuration from a specific TOML file
    pub fn load_from_path(path: &Path) -> ConfigResult<Arc<ConfigManager>> {
        if !path.exists() {
            return Err(ConfigurationError::config_file_not_found(path));
        }
        Self::load_with_env(Some(path), &Self::detect_environment())
    }

    /// Load configuration with an explicit environment name.
    /// Useful in tests that must not depend on process-wide variables.
    pub fn load_with_env(path: Option<&Path>, environment: &str) -> ConfigResult<Arc<ConfigManager>> {
        let defaults = config::Config::try_from(&CoordinatorConfig::default())
            .map_err(|e| ConfigurationError::load_error("defaults", e))?;

        let mut builder = config::Config::builder().add_source(defaults);

        if let Some(path) = path {
            debug!(path = %path.display(), environment = environment, "Loading configuration file");
            builder = builder.add_source(
                config::File::from(path)
                    .format(config::FileFormat::Toml)
                    .required(true),
            );
        }

        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let source_name = path
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "environment".to_string());

        let config: CoordinatorConfig = builder
            .build()
            .and_then(|settings| settings.try_deserialize())
            .map_err(|e| ConfigurationError::load_error(source_name, e))?;

        config.validate()?;

        info!(
            environment = environment,
            lock_backend = ?config.lock.backend,
            drain_ttl_seconds = config.queue_drain.lock_ttl_seconds,
            stop_ttl_seconds = config.stop_task.lock_ttl_seconds,
            workers = config.consumer.worker_count,
            "⚙️ CONFIG: Configuration loaded successfully"
        );

        Ok(Arc::new(ConfigManager {
            config,
            environment: environment.to_string(),
            config_path: path.map(Path::to_path_buf),
        }))
    }

    /// Build a manager around an in-code configuration (tests, embedding)
    pub fn from_config(config: CoordinatorConfig, environment: &str) -> ConfigResult<Arc<ConfigManager>> {
        config.validate()?;
        Ok(Arc::new(ConfigManager {
            config,
            environment: environment.to_string(),
            config_path: None,
        }))
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Get current environment from environment variables
    pub fn detect_environment() -> String {
        env::var("COORDINATOR_ENV")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string())
    }
}
