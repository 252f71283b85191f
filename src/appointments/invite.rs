use chrono::{ Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc };
use thiserror::Error;

use crate::models::appointment::Appointment;

pub const APPOINTMENT_MINUTES: i64 = 30;
const PRODID: &str = "-//Appointment Scheduler//EN";
const MAX_LINE_OCTETS: usize = 75;

#[derive(Debug, Error, PartialEq)]
pub enum InviteError {
    #[error("invalid appointment date/time '{date} {time}'")]
    InvalidDateTime {
        date: String,
        time: String,
    },
}

fn start_of(appointment: &Appointment) -> Result<NaiveDateTime, InviteError> {
    let invalid = || InviteError::InvalidDateTime {
        date: appointment.date.clone(),
        time: appointment.time.clone(),
    };
    let date = NaiveDate::parse_from_str(&appointment.date, "%Y-%m-%d").map_err(|_| invalid())?;
    let time = NaiveTime::parse_from_str(&appointment.time, "%H:%M").map_err(|_| invalid())?;
    Ok(date.and_time(time))
}

/// TEXT value escaping (RFC 5545 3.3.11).
fn escape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            ';' => out.push_str("\\;"),
            ',' => out.push_str("\\,"),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            _ => out.push(c),
        }
    }
    out
}

/// Appends one content line, folded at 75 octets without splitting a
/// UTF-8 sequence.
fn push_line(out: &mut String, line: &str) {
    let mut budget = MAX_LINE_OCTETS;
    let mut used = 0;
    for c in line.chars() {
        if used + c.len_utf8() > budget {
            out.push_str("\r\n ");
            // the leading space counts against the next line
            budget = MAX_LINE_OCTETS - 1;
            used = 0;
        }
        out.push(c);
        used += c.len_utf8();
    }
    out.push_str("\r\n");
}

/// Renders a single-event iCalendar file. The event starts at the
/// appointment's local date and time, lasts 30 minutes, and uses the
/// appointment id as UID.
pub fn generate_invite(appointment: &Appointment) -> Result<Vec<u8>, InviteError> {
    let start = start_of(appointment)?;
    let end = start + Duration::minutes(APPOINTMENT_MINUTES);

    let mut description = format!(
        "Patient: {}\nProvider: {}\n",
        appointment.patient_name,
        appointment.provider_name
    );
    if let Some(reason) = appointment.reason.as_deref().filter(|r| !r.is_empty()) {
        description.push_str(&format!("Reason: {}\n", reason));
    }

    let mut out = String::new();
    push_line(&mut out, "BEGIN:VCALENDAR");
    push_line(&mut out, "VERSION:2.0");
    push_line(&mut out, &format!("PRODID:{}", PRODID));
    push_line(&mut out, "BEGIN:VEVENT");
    push_line(&mut out, &format!("SUMMARY:{}", escape_text(&format!("Appointment with {}", appointment.provider_name))));
    push_line(&mut out, &format!("LOCATION:{}", escape_text(&appointment.location)));
    push_line(&mut out, &format!("DTSTART:{}", start.format("%Y%m%dT%H%M%S")));
    push_line(&mut out, &format!("DTEND:{}", end.format("%Y%m%dT%H%M%S")));
    push_line(&mut out, &format!("DTSTAMP:{}", Utc::now().format("%Y%m%dT%H%M%SZ")));
    push_line(&mut out, &format!("DESCRIPTION:{}", escape_text(&description)));
    push_line(&mut out, &format!("UID:{}", appointment.id));
    push_line(&mut out, "END:VEVENT");
    push_line(&mut out, "END:VCALENDAR");
    Ok(out.into_bytes())
}
