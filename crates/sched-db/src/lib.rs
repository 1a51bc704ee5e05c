//! Database layer for the appointment scheduler.
//!
//! Provides SQLite connection pooling (via `r2d2`), WAL-mode initialization,
//! and embedded SQL migrations. The `appointments` table is created through
//! a versioned migration managed by this crate; [`reset_schema`] is the only
//! destructive path and is never taken implicitly.

mod migrations;
mod pool;

pub use migrations::{reset_schema, run_migrations, MigrationError};
pub use pool::{create_pool, DbPool, DbRuntimeSettings, PoolError, IN_MEMORY};
