//! Database connection and schema management.

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::{debug, info};

use crate::{Result, StoreConfig};

/// Schema statements, run in order on every open. Each is idempotent.
///
/// No `ON DELETE CASCADE`: composite deletes are ordered explicitly inside one
/// transaction by the email service.
const SCHEMA: &[&str] = &[
    r"
    CREATE TABLE IF NOT EXISTS accounts (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        email TEXT NOT NULL UNIQUE,
        account_type TEXT NOT NULL
            CHECK (account_type IN ('Microsoft', 'Google'))
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS messages (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        account_id INTEGER NOT NULL REFERENCES accounts(id),
        subject TEXT,
        body TEXT,
        body_preview TEXT,
        sender_email TEXT NOT NULL,
        sender_name TEXT,
        received_datetime TEXT,
        sent_datetime TEXT,
        is_draft INTEGER NOT NULL DEFAULT 0,
        is_read INTEGER NOT NULL DEFAULT 0,
        importance TEXT NOT NULL DEFAULT 'Normal'
            CHECK (importance IN ('Low', 'Normal', 'High')),
        conversation_id TEXT
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS recipients (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        message_id INTEGER NOT NULL REFERENCES messages(id),
        email TEXT NOT NULL,
        name TEXT,
        recipient_type TEXT NOT NULL
            CHECK (recipient_type IN ('To', 'Cc', 'Bcc'))
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS attachments (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        message_id INTEGER NOT NULL REFERENCES messages(id),
        filename TEXT NOT NULL,
        mime_type TEXT NOT NULL,
        size INTEGER NOT NULL CHECK (size >= 0),
        local_path TEXT
    )
    ",
    r"
    CREATE INDEX IF NOT EXISTS idx_messages_account_received
    ON messages(account_id, received_datetime DESC)
    ",
    "CREATE INDEX IF NOT EXISTS idx_recipients_message ON recipients(message_id)",
    "CREATE INDEX IF NOT EXISTS idx_attachments_message ON attachments(message_id)",
];

/// Shared handle to the `SQLite` store.
///
/// Foreign keys are enforced on every pooled connection.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (creating if needed) the database file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails or schema creation fails.
    pub async fn open(path: &Path) -> Result<Self> {
        Self::open_with(path, 5, Duration::from_secs(5)).await
    }

    /// Create a private in-memory database for testing.
    ///
    /// The pool holds exactly one connection that is never recycled, so every
    /// repository built on this handle sees the same data.
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails or schema creation fails.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.initialize().await?;
        Ok(db)
    }

    /// Open the database described by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, the parent directory
    /// cannot be created, or connecting fails.
    pub async fn from_config(config: &StoreConfig) -> Result<Self> {
        config.validate()?;
        match &config.database_path {
            None => Self::in_memory().await,
            Some(path) => {
                if let Some(parent) = path.parent() {
                    tokio::fs::create_dir_all(parent).await?;
                }
                Self::open_with(
                    path,
                    config.max_connections,
                    Duration::from_secs(config.busy_timeout_secs),
                )
                .await
            }
        }
    }

    async fn open_with(path: &Path, max_connections: u32, busy_timeout: Duration) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(busy_timeout);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        info!(path = %path.display(), max_connections, "Opened database");

        let db = Self { pool };
        db.initialize().await?;
        Ok(db)
    }

    /// Initialize database schema.
    async fn initialize(&self) -> Result<()> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        debug!("Database schema ready");
        Ok(())
    }

    /// The underlying connection pool.
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close all pooled connections.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
