//! SQLite backends for history and customers.
//!
//! Both stores share one database file and one pool:
//! - `messages` : append-only session log, ordered by `(timestamp_us, seq)`
//! - `customers`: records created by the create agent, unique by email

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use concierge_core::customer::{Customer, CustomerStore, NewCustomer};
use concierge_core::error::StorageError;
use concierge_core::history::HistoryStore;
use concierge_core::message::{Message, Role, SessionId};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use tracing::{debug, info};

/// Open (creating if needed) the database at `path`.
///
/// Accepts a plain file path or a `sqlite:` URL.
pub async fn open_pool(path: &str) -> Result<SqlitePool, StorageError> {
    let url = if path.starts_with("sqlite:") {
        path.to_string()
    } else {
        format!("sqlite://{path}")
    };

    let options = SqliteConnectOptions::from_str(&url)
        .map_err(|e| StorageError::Storage(format!("Invalid SQLite path: {e}")))?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal);

    let pool = SqlitePoolOptions::new()
        .max_connections(4)
        .connect_with(options)
        .await
        .map_err(|e| StorageError::Storage(format!("Failed to open SQLite: {e}")))?;

    info!("SQLite database opened at {path}");
    Ok(pool)
}

fn query_failed(context: &str, e: sqlx::Error) -> StorageError {
    StorageError::QueryFailed(format!("{context}: {e}"))
}

/// Durable session history.
pub struct SqliteHistory {
    pool: SqlitePool,
}

impl SqliteHistory {
    /// Open the database at `path` and make sure the schema exists.
    pub async fn new(path: &str) -> Result<Self, StorageError> {
        Self::from_pool(open_pool(path).await?).await
    }

    /// Create from an existing pool (shared with `SqliteCustomers`).
    pub async fn from_pool(pool: SqlitePool) -> Result<Self, StorageError> {
        let store = Self { pool };
        store.run_migrations().await?;
        Ok(store)
    }

    async fn run_migrations(&self) -> Result<(), StorageError> {
        // `seq` breaks ties and doubles as insertion order
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS messages (
                seq          INTEGER PRIMARY KEY AUTOINCREMENT,
                session_id   TEXT NOT NULL,
                role         TEXT NOT NULL CHECK (role IN ('user', 'assistant')),
                content      TEXT NOT NULL,
                timestamp_us INTEGER NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::MigrationFailed(format!("messages table: {e}")))?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_messages_session ON messages(session_id, timestamp_us, seq)",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::MigrationFailed(format!("session index: {e}")))?;

        debug!("History migrations complete");
        Ok(())
    }

    fn row_to_message(row: &sqlx::sqlite::SqliteRow) -> Result<Message, StorageError> {
        let session_id: String = row
            .try_get("session_id")
            .map_err(|e| query_failed("session_id column", e))?;
        let role: String = row
            .try_get("role")
            .map_err(|e| query_failed("role column", e))?;
        let content: String = row
            .try_get("content")
            .map_err(|e| query_failed("content column", e))?;
        let timestamp_us: i64 = row
            .try_get("timestamp_us")
            .map_err(|e| query_failed("timestamp_us column", e))?;

        Ok(Message {
            session_id: SessionId(session_id),
            role: Role::from_str(&role).map_err(StorageError::QueryFailed)?,
            content,
            timestamp: micros_to_datetime(timestamp_us)?,
        })
    }
}

fn micros_to_datetime(us: i64) -> Result<DateTime<Utc>, StorageError> {
    DateTime::from_timestamp_micros(us)
        .ok_or_else(|| StorageError::QueryFailed(format!("timestamp out of range: {us}")))
}

#[async_trait]
impl HistoryStore for SqliteHistory {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn append(&self, session_id: &str, role: Role, content: &str) -> Result<Message, StorageError> {
        let now_us = Utc::now().timestamp_micros();

        // One statement, so reading the session's latest timestamp and
        // inserting the bumped one cannot interleave with another writer.
        let row = sqlx::query(
            r#"
            INSERT INTO messages (session_id, role, content, timestamp_us)
            SELECT ?1, ?2, ?3, MAX(?4, COALESCE(
                (SELECT MAX(timestamp_us) FROM messages WHERE session_id = ?1), 0) + 1)
            RETURNING timestamp_us
            "#,
        )
        .bind(session_id)
        .bind(role.as_str())
        .bind(content)
        .bind(now_us)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| query_failed("append message", e))?;

        let timestamp_us: i64 = row
            .try_get("timestamp_us")
            .map_err(|e| query_failed("timestamp_us column", e))?;

        debug!(session_id, role = role.as_str(), "Message appended");
        Ok(Message {
            session_id: SessionId::from(session_id),
            role,
            content: content.to_string(),
            timestamp: micros_to_datetime(timestamp_us)?,
        })
    }

    async fn list(&self, session_id: &str) -> Result<Vec<Message>, StorageError> {
        let rows = sqlx::query(
            r#"
            SELECT session_id, role, content, timestamp_us
            FROM messages
            WHERE session_id = ?1
            ORDER BY timestamp_us ASC, seq ASC
            "#,
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| query_failed("list messages", e))?;

        rows.iter().map(Self::row_to_message).collect()
    }

    async fn clear(&self, session_id: &str) -> Result<usize, StorageError> {
        let result = sqlx::query("DELETE FROM messages WHERE session_id = ?1")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(|e| query_failed("clear session", e))?;

        let deleted = result.rows_affected() as usize;
        info!(session_id, deleted, "Session history cleared");
        Ok(deleted)
    }
}

/// Customer table used by the create and list tools.
pub struct SqliteCustomers {
    pool: SqlitePool,
}

impl SqliteCustomers {
    pub async fn new(path: &str) -> Result<Self, StorageError> {
        Self::from_pool(open_pool(path).await?).await
    }

    pub async fn from_pool(pool: SqlitePool) -> Result<Self, StorageError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS customers (
                id    INTEGER PRIMARY KEY AUTOINCREMENT,
                name  TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE
            )
            "#,
        )
        .execute(&pool)
        .await
        .map_err(|e| StorageError::MigrationFailed(format!("customers table: {e}")))?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl CustomerStore for SqliteCustomers {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn create(&self, customer: NewCustomer) -> Result<Customer, StorageError> {
        let row = sqlx::query("INSERT INTO customers (name, email) VALUES (?1, ?2) RETURNING id")
            .bind(&customer.name)
            .bind(&customer.email)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(db) if db.is_unique_violation() => {
                    StorageError::Constraint(db.message().to_string())
                }
                other => query_failed("insert customer", other),
            })?;

        let id: i64 = row.try_get("id").map_err(|e| query_failed("id column", e))?;
        info!(id, email = %customer.email, "Customer created");
        Ok(Customer {
            id,
            name: customer.name,
            email: customer.email,
        })
    }

    async fn list(&self) -> Result<Vec<Customer>, StorageError> {
        let rows = sqlx::query("SELECT id, name, email FROM customers ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| query_failed("list customers", e))?;

        rows.iter()
            .map(|row| {
                Ok(Customer {
                    id: row.try_get("id").map_err(|e| query_failed("id column", e))?,
                    name: row.try_get("name").map_err(|e| query_failed("name column", e))?,
                    email: row.try_get("email").map_err(|e| query_failed("email column", e))?,
                })
            })
            .collect()
    }
}
