//! Plain-text rendering of appointment listings.

use std::fmt::Display;
use std::io::{self, Write};

use chrono::{Local, SecondsFormat, TimeZone};
use sched_types::Appointment;

/// Header printed above the listing.
pub const HEADER: &str = "Scheduled Appointments:";

/// Formats one appointment, rendering its time in `tz`.
pub fn format_line_in<Tz>(appointment: &Appointment, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    format!(
        "ID: {} | Client: {} | Date & Time: {} | Description: {} | Confirmed: {}",
        appointment.id,
        appointment.client_name,
        appointment
            .date_time
            .with_timezone(tz)
            .to_rfc3339_opts(SecondsFormat::Secs, true),
        appointment.description,
        appointment.confirmed,
    )
}

/// Formats one appointment in the host's local time zone.
pub fn format_line(appointment: &Appointment) -> String {
    format_line_in(appointment, &Local)
}

/// Writes the header and one line per appointment.
pub fn write_listing<W: Write>(out: &mut W, appointments: &[Appointment]) -> io::Result<()> {
    writeln!(out, "{HEADER}")?;
    for appointment in appointments {
        writeln!(out, "{}", format_line(appointment))?;
    }
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    fn sample() -> Appointment {
        Appointment {
            id: 1,
            client_name: "John Doe".into(),
            date_time: Utc.with_ymd_and_hms(2026, 3, 8, 9, 30, 0).unwrap(),
            description: "Meeting with client".into(),
            confirmed: true,
        }
    }

    #[test]
    fn utc_line_uses_z_suffix() {
        assert_eq!(
            format_line_in(&sample(), &Utc),
            "ID: 1 | Client: John Doe | Date & Time: 2026-03-08T09:30:00Z | Description: Meeting with client | Confirmed: true"
        );
    }

    #[test]
    fn offset_line_uses_numeric_offset() {
        let lagos = FixedOffset::east_opt(3600).unwrap();
        let line = format_line_in(&sample(), &lagos);
        assert!(line.contains("Date & Time: 2026-03-08T10:30:00+01:00"), "{line}");
    }

    #[test]
    fn listing_starts_with_header() {
        let mut buf = Vec::new();
        write_listing(&mut buf, &[sample()]).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<_> = text.lines().collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], HEADER);
        assert!(lines[1].starts_with("ID: 1 | Client: John Doe | Date & Time: "));
        assert!(lines[1].ends_with(" | Description: Meeting with client | Confirmed: true"));
    }

    #[test]
    fn empty_listing_is_header_only() {
        let mut buf = Vec::new();
        write_listing(&mut buf, &[]).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), format!("{HEADER}\n"));
    }
}
