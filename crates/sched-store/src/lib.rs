//! Appointment persistence.
//!
//! [`AppointmentStore`] owns a connection pool and exposes the scheduling
//! and range-query operations. Every call checks a connection out of the
//! pool for its own duration; the connection returns to the pool when the
//! call ends, whether it succeeded or not.
//!
//! # Usage
//!
//! ```rust,ignore
//! use sched_store::AppointmentStore;
//!
//! let store = AppointmentStore::new(pool);
//! store.migrate()?;
//! let id = store.schedule("John Doe", at, "Meeting with client", true)?;
//! let week = store.list_in_range(now, now + chrono::Duration::days(7))?;
//! ```

mod error;
mod store;

pub use error::StoreError;
pub use store::AppointmentStore;
