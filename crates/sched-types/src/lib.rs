//! Shared types for the appointment scheduler.
//!
//! This crate holds the appointment entity, its insert shape, and the
//! timestamp encoding used by the storage layer. It has no database
//! dependency so the binary and the store can share it freely.

use chrono::{DateTime, SubsecRound, Utc};
use thiserror::Error;

/// A persisted appointment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Appointment {
    /// Surrogate identity assigned by the store. Never reused.
    pub id: i64,
    /// Name of the client the appointment is booked for.
    pub client_name: String,
    /// When the appointment takes place.
    pub date_time: DateTime<Utc>,
    /// Free-text description.
    pub description: String,
    /// Whether the appointment has been confirmed.
    pub confirmed: bool,
}

/// An appointment that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAppointment {
    pub client_name: String,
    pub date_time: DateTime<Utc>,
    pub description: String,
    pub confirmed: bool,
}

impl NewAppointment {
    /// Creates an unconfirmed appointment.
    pub fn new(
        client_name: impl Into<String>,
        date_time: DateTime<Utc>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            client_name: client_name.into(),
            date_time,
            description: description.into(),
            confirmed: false,
        }
    }

    /// Sets the confirmation flag.
    pub fn confirmed(mut self, confirmed: bool) -> Self {
        self.confirmed = confirmed;
        self
    }

    /// Attaches a store-assigned id, producing the persisted form.
    ///
    /// The timestamp is truncated to storage precision so the result
    /// compares equal to what a later read returns.
    pub fn into_appointment(self, id: i64) -> Appointment {
        Appointment {
            id,
            client_name: self.client_name,
            date_time: to_storage_precision(self.date_time),
            description: self.description,
            confirmed: self.confirmed,
        }
    }
}

/// Error returned when a stored timestamp lies outside the representable
/// range.
#[derive(Debug, Error)]
#[error("stored timestamp {value} is out of range")]
pub struct TimestampError {
    /// The raw microsecond count read from storage.
    pub value: i64,
}

/// Number of fractional-second digits kept in storage.
pub const STORAGE_SUBSEC_DIGITS: u16 = 6;

/// Truncates a timestamp to the precision the store keeps.
pub fn to_storage_precision(value: DateTime<Utc>) -> DateTime<Utc> {
    value.trunc_subsecs(STORAGE_SUBSEC_DIGITS)
}

/// Encodes a timestamp as microseconds since the Unix epoch.
///
/// Integer order matches chronological order over chrono's whole range,
/// including years before 0 and after 9999.
pub fn encode_timestamp(value: &DateTime<Utc>) -> i64 {
    value.timestamp_micros()
}

/// Decodes a value written by [`encode_timestamp`].
///
/// # Errors
///
/// Returns [`TimestampError`] if the value does not fit in a `DateTime<Utc>`.
pub fn decode_timestamp(value: i64) -> Result<DateTime<Utc>, TimestampError> {
    DateTime::from_timestamp_micros(value).ok_or(TimestampError { value })
}
