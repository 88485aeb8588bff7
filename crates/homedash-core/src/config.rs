use crate::app_config::{AppConfig, CloudinaryCredentials, Environment};
use crate::ConfigError;

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
/// Decoupled from the real environment so it can be tested with a `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let database_url = require("DATABASE_URL")?;
    let env = parse_environment(&or_default("HOMEDASH_ENV", "development"));

    let bind_addr = or_default("HOMEDASH_BIND_ADDR", "0.0.0.0:3000")
        .parse::<SocketAddr>()
        .map_err(|e| invalid("HOMEDASH_BIND_ADDR", e.to_string()))?;
    let log_level = or_default("HOMEDASH_LOG_LEVEL", "info");

    let db_max_connections = parse_u32("HOMEDASH_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("HOMEDASH_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("HOMEDASH_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let http_timeout_secs = parse_u64("HOMEDASH_HTTP_TIMEOUT_SECS", "30")?;
    let http_user_agent = or_default("HOMEDASH_HTTP_USER_AGENT", "homedash/0.1 (personal-dashboard)");

    let schedule_user_id = match lookup("HOMEDASH_SCHEDULE_USER_ID") {
        Ok(raw) if !raw.trim().is_empty() => Some(
            raw.trim()
                .parse::<i64>()
                .map_err(|e| invalid("HOMEDASH_SCHEDULE_USER_ID", e.to_string()))?,
        ),
        _ => None,
    };

    let music_cron = parse_cron(&lookup, "HOMEDASH_MUSIC_CRON", "0 0 4 * * *")?;
    let trakt_cron = parse_cron(&lookup, "HOMEDASH_TRAKT_CRON", "0 15 4 * * *")?;
    let feedly_cron = parse_cron(&lookup, "HOMEDASH_FEEDLY_CRON", "0 30 4 * * *")?;
    let goodreads_cron = parse_cron(&lookup, "HOMEDASH_GOODREADS_CRON", "0 45 4 * * *")?;

    let cloudinary = match (
        lookup("CLOUDINARY_CLOUD_NAME").ok(),
        lookup("CLOUDINARY_API_KEY").ok(),
        lookup("CLOUDINARY_API_SECRET").ok(),
    ) {
        (Some(cloud_name), Some(api_key), Some(api_secret)) => Some(CloudinaryCredentials {
            cloud_name,
            api_key,
            api_secret,
        }),
        _ => None,
    };

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        http_timeout_secs,
        http_user_agent,
        schedule_user_id,
        music_cron,
        trakt_cron,
        feedly_cron,
        goodreads_cron,
        cloudinary,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

/// Read a cron expression and reject anything that is not the six-field
/// (seconds-first) form the job scheduler expects.
fn parse_cron<F>(lookup: &F, var: &str, default: &str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let raw = lookup(var).unwrap_or_else(|_| default.to_string());
    let fields = raw.split_whitespace().count();
    if fields != 6 {
        return Err(ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: format!("expected 6 cron fields, got {fields}"),
        });
    }
    Ok(raw.trim().to_string())
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
