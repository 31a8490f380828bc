//! Database initialization
//!
//! Opens the store named by a connection string, creating the file and the
//! schema on first run. Every `CREATE` is idempotent, so opening an existing
//! database is safe.

use crate::db::settings::{DEFAULT_POLLING_INTERVAL_MS, POLLING_INTERVAL_KEY};
use crate::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

/// Open the database at `database_url` and make sure the schema exists
pub async fn open_database(database_url: &str) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .busy_timeout(Duration::from_millis(5000));

    let db_path = options.get_filename().to_path_buf();
    let in_memory = database_url.contains(":memory:") || database_url.contains("mode=memory");

    if !in_memory {
        // Create parent directory if it doesn't exist
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
    }

    let (options, max_connections) = if in_memory {
        // One connection keeps the in-memory database alive for the pool's lifetime
        (options, 1)
    } else {
        (options.journal_mode(SqliteJournalMode::Wal), 5)
    };

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .min_connections(if in_memory { 1 } else { 0 })
        .idle_timeout(if in_memory { None } else { Some(Duration::from_secs(60)) })
        .max_lifetime(if in_memory { None } else { Some(Duration::from_secs(30 * 60)) })
        .connect_with(options)
        .await?;

    if in_memory {
        info!("Opened in-memory database");
    } else {
        info!("Opened database: {}", db_path.display());
    }

    init_schema(&pool).await?;

    Ok(pool)
}

/// Create every table the console reads and seed the default settings
pub async fn init_schema(pool: &SqlitePool) -> Result<()> {
    create_configuration_table(pool).await?;
    create_menu_table(pool).await?;
    create_restaurant_order_table(pool).await?;
    create_order_notification_queue_table(pool).await?;

    init_default_settings(pool).await?;

    debug!("Database schema ready");
    Ok(())
}

/// Create the configuration table
///
/// Stores application settings as key-value pairs.
pub async fn create_configuration_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS configuration (
            key TEXT PRIMARY KEY,
            value TEXT,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_menu_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS menu (
            ItemId INTEGER PRIMARY KEY,
            Name TEXT NOT NULL,
            Price REAL NOT NULL CHECK (Price >= 0),
            Category TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_restaurant_order_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS restaurant_order (
            OrderId INTEGER PRIMARY KEY,
            Item TEXT NOT NULL,
            Timestamp TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the order notification queue
///
/// `message_body` is nullable; the poller skips rows without a body.
async fn create_order_notification_queue_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS order_notification_queue (
            message_id INTEGER PRIMARY KEY AUTOINCREMENT,
            message_body BLOB,
            enqueued_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Insert defaults for missing settings, leaving operator values alone
async fn init_default_settings(pool: &SqlitePool) -> Result<()> {
    ensure_setting(pool, POLLING_INTERVAL_KEY, &DEFAULT_POLLING_INTERVAL_MS.to_string()).await?;
    Ok(())
}

async fn ensure_setting(pool: &SqlitePool, key: &str, default_value: &str) -> Result<()> {
    let inserted = sqlx::query("INSERT OR IGNORE INTO configuration (key, value) VALUES (?, ?)")
        .bind(key)
        .bind(default_value)
        .execute(pool)
        .await?
        .rows_affected();

    if inserted > 0 {
        info!("Initialized setting '{}' = '{}'", key, default_value);
    }

    Ok(())
}
