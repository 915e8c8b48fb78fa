use crate::app_config::AppConfig;
use crate::ConfigError;

pub const DEFAULT_DIRECTORY_BASE_URL: &str = "https://100074.pythonanywhere.com";
pub const DEFAULT_PLACES_BASE_URL: &str = "https://100086.pythonanywhere.com";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
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
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so tests can drive it with a
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        match lookup(var) {
            Ok(value) if !value.trim().is_empty() => Ok(value),
            _ => Err(ConfigError::MissingEnvVar(var.to_string())),
        }
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let base_url = |var: &str, default: &str| -> Result<String, ConfigError> {
        let raw = or_default(var, default);
        if raw.starts_with("http://") || raw.starts_with("https://") {
            Ok(raw.trim_end_matches('/').to_string())
        } else {
            Err(ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: format!("expected an http(s) URL, got '{raw}'"),
            })
        }
    };

    let directory_api_key = require("OUTREACH_DIRECTORY_API_KEY")?;
    let places_api_key = require("OUTREACH_PLACES_API_KEY")?;

    let directory_base_url = base_url("OUTREACH_DIRECTORY_BASE_URL", DEFAULT_DIRECTORY_BASE_URL)?;
    let places_base_url = base_url("OUTREACH_PLACES_BASE_URL", DEFAULT_PLACES_BASE_URL)?;

    let request_timeout_secs = parse_u64("OUTREACH_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("OUTREACH_USER_AGENT", "outreach/0.1 (campaign-builder)");
    let log_level = or_default("OUTREACH_LOG_LEVEL", "info");

    Ok(AppConfig {
        directory_base_url,
        places_base_url,
        directory_api_key,
        places_api_key,
        request_timeout_secs,
        user_agent,
        log_level,
    })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
