//! Appointment scheduler application.
//!
//! Wires configuration, the database pool and the appointment store
//! together: prepare the schema, schedule the configured seed
//! appointments, list everything in the upcoming window.

pub mod config;
pub mod output;

use std::io::Write;

use chrono::{DateTime, Utc};
use sched_store::{AppointmentStore, StoreError};
use thiserror::Error;

use crate::config::Config;

/// Fatal application errors. Each one terminates the process.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    #[error("error loading configuration: {0}")]
    Config(#[from] config::ConfigError),

    /// The database could not be opened.
    #[error("error connecting to database: {0}")]
    Connect(#[from] sched_db::PoolError),

    /// The schema could not be prepared.
    #[error("error migrating database schema: {0}")]
    Migrate(#[source] StoreError),

    /// A seed appointment could not be stored.
    #[error("error scheduling appointment for '{client}': {source}")]
    Schedule {
        client: String,
        #[source]
        source: StoreError,
    },

    /// The range query failed.
    #[error("error getting appointments: {0}")]
    Query(#[source] StoreError),

    /// The listing could not be written.
    #[error("error writing output: {0}")]
    Output(#[from] std::io::Error),
}

/// Opens the store described by `config`, applies migrations (or a full
/// reset when `database.reset_on_start` is set) and returns it.
///
/// # Errors
///
/// Returns `AppError::Connect` or `AppError::Migrate`.
pub fn open_store(config: &Config) -> Result<AppointmentStore, AppError> {
    tracing::info!(dsn = %config.database.redacted_dsn(), "connecting to database");

    let pool = sched_db::create_pool(
        &config.database.database,
        config.database.runtime_settings(),
    )?;
    let store = AppointmentStore::new(pool);

    if config.database.reset_on_start {
        store.reset_schema().map_err(AppError::Migrate)?;
    } else {
        let applied = store.migrate().map_err(AppError::Migrate)?;
        if applied > 0 {
            tracing::info!(count = applied, "applied database migrations");
        }
    }

    Ok(store)
}

/// Runs the whole program against `now`, writing the listing to `out`.
///
/// Returns the number of appointments listed.
///
/// # Errors
///
/// Any failure is returned as the first `AppError` hit; nothing is retried.
/// Time settings are checked before the database is opened, so an
/// out-of-range offset or window leaves the store untouched.
pub fn run<W: Write>(config: &Config, now: DateTime<Utc>, out: &mut W) -> Result<usize, AppError> {
    let end = config.query.window_end(now)?;
    let appointments = config
        .seed
        .iter()
        .map(|seed| seed.resolve(now))
        .collect::<Result<Vec<_>, _>>()?;

    let store = open_store(config)?;

    for appointment in appointments {
        let client = appointment.client_name.clone();
        store
            .insert(appointment)
            .map_err(|source| AppError::Schedule { client, source })?;
    }
    if !config.seed.is_empty() {
        tracing::info!(count = config.seed.len(), "scheduled seed appointments");
    }

    let appointments = store.list_in_range(now, end).map_err(AppError::Query)?;

    output::write_listing(out, &appointments)?;
    Ok(appointments.len())
}
