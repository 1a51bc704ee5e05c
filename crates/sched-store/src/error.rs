//! Error types for the appointment store.

/// Errors that can occur during appointment store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No connection could be checked out of the pool.
    #[error("store connection unavailable: {0}")]
    Pool(#[from] r2d2::Error),

    /// A database operation failed.
    #[error("store database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A stored timestamp could not be decoded.
    #[error("store data error: {0}")]
    Timestamp(#[from] sched_types::TimestampError),

    /// Applying or resetting the schema failed.
    #[error("store schema error: {0}")]
    Migration(#[from] sched_db::MigrationError),
}
