//! SQLite connection pool for the appointment store.

use std::time::Duration;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{Connection, OpenFlags};
use thiserror::Error;

/// Path that selects a private in-memory database.
pub const IN_MEMORY: &str = ":memory:";

/// Pool and connection tunables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DbRuntimeSettings {
    /// How long a connection waits on a locked database, in milliseconds.
    pub busy_timeout_ms: u64,

    /// Upper bound on pooled connections. Ignored for [`IN_MEMORY`].
    pub pool_max_size: u32,

    /// How long pool creation and checkout wait for a usable connection,
    /// in milliseconds.
    pub connect_timeout_ms: u64,
}

impl Default for DbRuntimeSettings {
    fn default() -> Self {
        Self {
            busy_timeout_ms: 5_000,
            pool_max_size: 4,
            connect_timeout_ms: 5_000,
        }
    }
}

/// Pool of SQLite connections to one appointments database.
pub type DbPool = Pool<SqliteConnectionManager>;

/// Errors that can occur when opening the database.
#[derive(Debug, Error)]
pub enum PoolError {
    /// No connection could be established within the connect timeout.
    #[error("failed to open appointment database: {0}")]
    PoolInit(#[from] r2d2::Error),
}

/// Every connection to `:memory:` opens its own empty database, so an
/// in-memory store only works through a single shared connection.
fn effective_max_size(db_path: &str, requested: u32) -> u32 {
    if db_path == IN_MEMORY {
        1
    } else {
        requested.max(1)
    }
}

/// Applied to each new connection: WAL for file databases, plus the busy
/// timeout.
fn prepare_connection(conn: &mut Connection, busy_timeout: Duration) -> rusqlite::Result<()> {
    let journal_mode: String =
        conn.query_row("PRAGMA journal_mode = WAL;", [], |row| row.get(0))?;
    if journal_mode != "wal" && journal_mode != "memory" {
        return Err(rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_ERROR),
            Some(format!("journal_mode stayed '{journal_mode}', expected wal")),
        ));
    }
    conn.busy_timeout(busy_timeout)
}

/// Opens a connection pool for the database at `db_path`.
///
/// `db_path` is a file path, created if missing, or [`IN_MEMORY`]. For an
/// in-memory database the pool is capped at one connection so every
/// caller sees the same data.
///
/// # Errors
///
/// Returns `PoolError::PoolInit` if no connection can be opened within
/// `settings.connect_timeout_ms`.
pub fn create_pool(db_path: &str, settings: DbRuntimeSettings) -> Result<DbPool, PoolError> {
    let busy_timeout = Duration::from_millis(settings.busy_timeout_ms);
    let manager = SqliteConnectionManager::file(db_path)
        .with_flags(
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_FULL_MUTEX,
        )
        .with_init(move |conn| prepare_connection(conn, busy_timeout));

    let max_size = effective_max_size(db_path, settings.pool_max_size);
    let pool = Pool::builder()
        .max_size(max_size)
        .connection_timeout(Duration::from_millis(settings.connect_timeout_ms))
        .build(manager)?;

    tracing::debug!(path = db_path, max_size, "database pool ready");
    Ok(pool)
}
