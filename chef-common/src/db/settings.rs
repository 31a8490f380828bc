//! Settings database access
//!
//! Read/write settings from the `configuration` table (key-value store).
//! All settings are global.

use crate::{Error, Result};
use sqlx::SqlitePool;
use std::time::Duration;
use tracing::{debug, warn};

/// Setting key holding the poll loop's sleep between cycles, in milliseconds
pub const POLLING_INTERVAL_KEY: &str = "ChefConsoleAppInterval";

/// Polling interval used when the setting is missing or unusable
pub const DEFAULT_POLLING_INTERVAL_MS: u64 = 1000;

/// Look up a setting by exact key
///
/// Returns None if the key doesn't exist or its value is NULL.
pub async fn get_setting_value(pool: &SqlitePool, key: &str) -> Result<Option<String>> {
    let value: Option<Option<String>> =
        sqlx::query_scalar("SELECT value FROM configuration WHERE key = ?")
            .bind(key)
            .fetch_optional(pool)
            .await?;

    Ok(value.flatten())
}

/// Look up a setting, falling back to `default` when it is missing
pub async fn get_setting_or(pool: &SqlitePool, key: &str, default: &str) -> Result<String> {
    Ok(get_setting_value(pool, key)
        .await?
        .unwrap_or_else(|| default.to_string()))
}

/// Generic setting setter
///
/// Inserts or updates setting in database.
pub async fn set_setting<T: ToString>(pool: &SqlitePool, key: &str, value: T) -> Result<()> {
    let value_str = value.to_string();

    sqlx::query(
        r#"
        INSERT INTO configuration (key, value)
        VALUES (?, ?)
        ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = CURRENT_TIMESTAMP
        "#,
    )
    .bind(key)
    .bind(value_str)
    .execute(pool)
    .await?;

    Ok(())
}

/// Parse a stored polling interval
///
/// Accepts a non-negative 32-bit integer, surrounding whitespace allowed.
pub fn parse_polling_interval(raw: &str) -> Result<Duration> {
    match raw.trim().parse::<i32>() {
        Ok(ms) if ms >= 0 => Ok(Duration::from_millis(ms as u64)),
        Ok(ms) => Err(Error::Config(format!("negative polling interval: {}", ms))),
        Err(e) => Err(Error::Config(format!("invalid polling interval '{}': {}", raw, e))),
    }
}

/// Load the polling interval from the settings table
///
/// Never fails: a missing, malformed or unreadable setting yields
/// [`DEFAULT_POLLING_INTERVAL_MS`].
///
/// # Returns
/// Interval between poll cycles (default: 1000ms)
pub async fn load_polling_interval(pool: &SqlitePool) -> Duration {
    let default = Duration::from_millis(DEFAULT_POLLING_INTERVAL_MS);

    let raw = match get_setting_value(pool, POLLING_INTERVAL_KEY).await {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            debug!("Setting '{}' not set, using default {:?}", POLLING_INTERVAL_KEY, default);
            return default;
        }
        Err(e) => {
            warn!("Failed to read setting '{}': {}, using default {:?}", POLLING_INTERVAL_KEY, e, default);
            return default;
        }
    };

    match parse_polling_interval(&raw) {
        Ok(interval) => interval,
        Err(e) => {
            warn!("{}, using default {:?}", e, default);
            default
        }
    }
}
