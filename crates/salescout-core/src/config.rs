use crate::app_config::{
    AppConfig, Environment, DEFAULT_KASPI_CITY_ID, DEFAULT_KASPI_ZONE_ID, DEFAULT_MAX_PAGES,
};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can use a plain `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_positive_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let value = or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))?;
        if value == 0 {
            return Err(invalid(var, "must be greater than zero".to_string()));
        }
        Ok(value)
    };

    let parse_positive_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let value = or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))?;
        if value == 0 {
            return Err(invalid(var, "must be greater than zero".to_string()));
        }
        Ok(value)
    };

    let env = parse_environment(&or_default("SALESCOUT_ENV", "development"))?;

    let bind_addr = or_default("SALESCOUT_BIND_ADDR", "0.0.0.0:3000")
        .parse::<SocketAddr>()
        .map_err(|e| invalid("SALESCOUT_BIND_ADDR", e.to_string()))?;
    let log_level = or_default("SALESCOUT_LOG_LEVEL", "info");

    let proxy_urls = split_list(&or_default("PROXY_URLS", ""));

    let kaspi_city_id = or_default("SALESCOUT_KASPI_CITY_ID", DEFAULT_KASPI_CITY_ID)
        .trim()
        .to_string();
    if kaspi_city_id.is_empty() {
        return Err(invalid(
            "SALESCOUT_KASPI_CITY_ID",
            "must not be empty".to_string(),
        ));
    }
    let kaspi_zone_ids = split_list(&or_default(
        "SALESCOUT_KASPI_ZONE_IDS",
        DEFAULT_KASPI_ZONE_ID,
    ));

    let request_timeout_secs = parse_positive_u64("SALESCOUT_REQUEST_TIMEOUT_SECS", "30")?;
    let max_pages = parse_positive_u32("SALESCOUT_MAX_PAGES", &DEFAULT_MAX_PAGES.to_string())?;

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        proxy_urls,
        kaspi_city_id,
        kaspi_zone_ids,
        request_timeout_secs,
        max_pages,
    })
}

/// Splits a comma-separated value, trimming entries and skipping blanks.
fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "SALESCOUT_ENV".to_string(),
            reason: format!("expected development, test or production, got \"{other}\""),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
