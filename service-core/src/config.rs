use std::env;
use std::str::FromStr;

use anyhow::anyhow;

use crate::error::AppError;

/// Read an environment variable, falling back to `default` when unset.
///
/// Loads `.env` lazily on first use via dotenvy. Parse failures are
/// surfaced as `ConfigError` rather than silently falling back, so a typo
/// in deployment config is caught at startup.
pub fn env_or<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    dotenvy::dotenv().ok();

    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| AppError::ConfigError(anyhow!("invalid value for {}: {}", key, e))),
        Err(_) => Ok(default),
    }
}
