//! Embedded SQL migration runner.
//!
//! Migrations are SQL files embedded at compile time. They run sequentially
//! on startup, tracked by the `_sched_migrations` table. Each migration
//! runs exactly once; if it has already been applied, it is skipped.

use rusqlite::Connection;
use thiserror::Error;

/// A single embedded migration.
struct Migration {
    name: &'static str,
    sql: &'static str,
}

/// All migrations in order. New migrations are appended here.
const MIGRATIONS: &[Migration] = &[
    Migration {
        name: "000_init",
        sql: include_str!("migrations/000_init.sql"),
    },
    Migration {
        name: "001_appointments",
        sql: include_str!("migrations/001_appointments.sql"),
    },
];

/// Tables owned by a migration, dropped by [`reset_schema`] so the
/// migration can be replayed. Listed in drop order.
const RESETTABLE: &[(&str, &str)] = &[("appointments", "001_appointments")];

/// Errors that can occur during migration execution.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// A SQL statement within a migration failed.
    #[error("migration '{name}' failed: {source}")]
    ExecutionFailed {
        /// The name of the migration that failed.
        name: String,
        /// The underlying SQLite error.
        source: rusqlite::Error,
    },

    /// Failed to query migration state.
    #[error("failed to check migration state: {0}")]
    StateQuery(rusqlite::Error),

    /// Dropping tables during a schema reset failed.
    #[error("schema reset failed: {0}")]
    Reset(rusqlite::Error),
}

/// Runs all pending migrations against the given connection.
///
/// Migrations that have already been applied (tracked in `_sched_migrations`)
/// are skipped. New migrations are applied in order and recorded.
///
/// # Errors
///
/// Returns `MigrationError` if any migration fails to execute or if the
/// migration tracking table cannot be queried.
pub fn run_migrations(conn: &Connection) -> Result<usize, MigrationError> {
    run_migrations_from_list(conn, MIGRATIONS)
}

/// Drops every migration-owned table and re-applies the migrations that
/// created them, leaving empty tables behind.
///
/// This destroys all stored appointments. It is meant for demo and
/// bootstrap use only and is never invoked by [`run_migrations`].
///
/// Returns the number of migrations re-applied.
///
/// # Errors
///
/// Returns `MigrationError::Reset` if the drop fails, or any error
/// [`run_migrations`] can produce.
pub fn reset_schema(conn: &Connection) -> Result<usize, MigrationError> {
    bootstrap_tracking_table(conn)?;

    let tx = conn.unchecked_transaction().map_err(MigrationError::Reset)?;
    for &(table, migration) in RESETTABLE {
        tracing::warn!(table, "dropping table for schema reset");
        tx.execute_batch(&format!("DROP TABLE IF EXISTS {table};"))
            .map_err(MigrationError::Reset)?;
        tx.execute("DELETE FROM _sched_migrations WHERE name = ?1", [migration])
            .map_err(MigrationError::Reset)?;
    }
    tx.commit().map_err(MigrationError::Reset)?;

    run_migrations(conn)
}

fn bootstrap_tracking_table(conn: &Connection) -> Result<(), MigrationError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS _sched_migrations (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );",
    )
    .map_err(|e| MigrationError::ExecutionFailed {
        name: "_sched_migrations_bootstrap".to_string(),
        source: e,
    })
}

fn run_migrations_from_list(
    conn: &Connection,
    migrations: &[Migration],
) -> Result<usize, MigrationError> {
    // The tracking table has to exist before we can ask what has been applied.
    bootstrap_tracking_table(conn)?;

    let mut applied = 0;

    for migration in migrations {
        let already_applied: bool = conn
            .query_row(
                "SELECT COUNT(*) > 0 FROM _sched_migrations WHERE name = ?1",
                [migration.name],
                |row| row.get(0),
            )
            .map_err(MigrationError::StateQuery)?;

        if already_applied {
            tracing::debug!(
                migration = migration.name,
                "migration already applied, skipping"
            );
            continue;
        }

        tracing::info!(migration = migration.name, "applying migration");

        let failed = |e| MigrationError::ExecutionFailed {
            name: migration.name.to_string(),
            source: e,
        };

        let tx = conn.unchecked_transaction().map_err(failed)?;
        tx.execute_batch(migration.sql).map_err(failed)?;
        tx.execute(
            "INSERT INTO _sched_migrations (name) VALUES (?1)",
            [migration.name],
        )
        .map_err(failed)?;
        tx.commit().map_err(failed)?;

        applied += 1;
    }

    Ok(applied)
}
