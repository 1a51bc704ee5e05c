//! Persistence operations for appointments.
//!
//! Writes go through [`AppointmentStore::schedule`], which inserts a single
//! row and returns the identity SQLite assigns. Reads return rows in
//! primary-key order, which is also insertion order.

use chrono::{DateTime, Utc};
use r2d2::PooledConnection;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, OptionalExtension, Row};
use sched_db::DbPool;
use sched_types::{decode_timestamp, encode_timestamp, Appointment, NewAppointment};

use crate::error::StoreError;

const SELECT_COLUMNS: &str = "SELECT id, client_name, date_time, description, confirmed
     FROM appointments";

/// Column values as read from SQLite, before the timestamp is decoded.
type RawRow = (i64, String, i64, String, bool);

fn read_row(row: &Row<'_>) -> rusqlite::Result<RawRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
    ))
}

fn into_appointment(raw: RawRow) -> Result<Appointment, StoreError> {
    let (id, client_name, date_time, description, confirmed) = raw;
    Ok(Appointment {
        id,
        client_name,
        date_time: decode_timestamp(date_time)?,
        description,
        confirmed,
    })
}

/// Appointment store backed by a SQLite connection pool.
///
/// Cloning is cheap; clones share the same pool.
#[derive(Clone)]
pub struct AppointmentStore {
    pool: DbPool,
}

impl AppointmentStore {
    /// Wraps an existing pool. The schema is not touched; call
    /// [`migrate`](Self::migrate) before the first write.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Returns the underlying pool.
    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    fn conn(&self) -> Result<PooledConnection<SqliteConnectionManager>, StoreError> {
        Ok(self.pool.get()?)
    }

    /// Applies pending schema migrations. Safe to call on every start.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Migration` if a migration fails.
    pub fn migrate(&self) -> Result<usize, StoreError> {
        let conn = self.conn()?;
        Ok(sched_db::run_migrations(&conn)?)
    }

    /// Drops and recreates the appointments table, discarding every row.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Migration` if the drop or the re-creation fails.
    pub fn reset_schema(&self) -> Result<(), StoreError> {
        let conn = self.conn()?;
        sched_db::reset_schema(&conn)?;
        tracing::warn!("appointment table reset, all prior rows discarded");
        Ok(())
    }

    /// Schedules a new appointment and returns its identity.
    ///
    /// No validation is applied: empty strings, past timestamps and
    /// appointments sharing a time slot are all accepted.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if a connection cannot be obtained or the
    /// insert fails.
    pub fn schedule(
        &self,
        client_name: &str,
        date_time: DateTime<Utc>,
        description: &str,
        confirmed: bool,
    ) -> Result<i64, StoreError> {
        let conn = self.conn()?;
        let id: i64 = conn.query_row(
            "INSERT INTO appointments (client_name, date_time, description, confirmed)
             VALUES (?1, ?2, ?3, ?4)
             RETURNING id",
            params![
                client_name,
                encode_timestamp(&date_time),
                description,
                confirmed
            ],
            |row| row.get(0),
        )?;

        tracing::debug!(id, client = client_name, %date_time, confirmed, "appointment scheduled");
        Ok(id)
    }

    /// Schedules an appointment that is not yet confirmed.
    ///
    /// # Errors
    ///
    /// Same as [`schedule`](Self::schedule).
    pub fn schedule_unconfirmed(
        &self,
        client_name: &str,
        date_time: DateTime<Utc>,
        description: &str,
    ) -> Result<i64, StoreError> {
        self.schedule(client_name, date_time, description, false)
    }

    /// Stores a [`NewAppointment`] and returns the persisted record.
    ///
    /// # Errors
    ///
    /// Same as [`schedule`](Self::schedule).
    pub fn insert(&self, appointment: NewAppointment) -> Result<Appointment, StoreError> {
        let id = self.schedule(
            &appointment.client_name,
            appointment.date_time,
            &appointment.description,
            appointment.confirmed,
        )?;
        Ok(appointment.into_appointment(id))
    }

    /// Returns every appointment with `start <= date_time <= end`, in
    /// primary-key order.
    ///
    /// Both bounds are inclusive. A reversed range matches nothing and is
    /// not an error.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the query fails or a stored timestamp is
    /// malformed.
    pub fn list_in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Appointment>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "{SELECT_COLUMNS}
             WHERE date_time BETWEEN ?1 AND ?2
             ORDER BY id ASC"
        ))?;
        let rows = stmt.query_map(
            params![encode_timestamp(&start), encode_timestamp(&end)],
            read_row,
        )?;

        let mut appointments = Vec::new();
        for row in rows {
            appointments.push(into_appointment(row?)?);
        }

        tracing::debug!(%start, %end, count = appointments.len(), "range query");
        Ok(appointments)
    }

    /// Returns the full contents of the store in primary-key order.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the query fails or a stored timestamp is
    /// malformed.
    pub fn list_all(&self) -> Result<Vec<Appointment>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!("{SELECT_COLUMNS} ORDER BY id ASC"))?;
        let rows = stmt.query_map([], read_row)?;

        let mut appointments = Vec::new();
        for row in rows {
            appointments.push(into_appointment(row?)?);
        }
        Ok(appointments)
    }

    /// Looks up a single appointment by identity.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the query fails or the stored timestamp is
    /// malformed.
    pub fn get(&self, id: i64) -> Result<Option<Appointment>, StoreError> {
        let conn = self.conn()?;
        let raw = conn
            .query_row(
                &format!("{SELECT_COLUMNS} WHERE id = ?1"),
                params![id],
                read_row,
            )
            .optional()?;

        raw.map(into_appointment).transpose()
    }
}
