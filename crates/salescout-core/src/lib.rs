mod app_config;
mod config;

pub use app_config::{
    AppConfig, Environment, DEFAULT_KASPI_CITY_ID, DEFAULT_KASPI_ZONE_ID, DEFAULT_MAX_PAGES,
};
pub use config::{load_app_config, load_app_config_from_env};

use thiserror::Error;

/// Startup configuration failure. Every variant names the offending variable.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
