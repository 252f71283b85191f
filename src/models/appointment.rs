use chrono::{ DateTime, Utc };
use serde::{ Deserialize, Serialize };

/// Booking request, as received over HTTP or assembled from a tool call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentDraft {
    pub patient_name: String,
    pub provider_id: String,
    pub date: String,
    pub time: String,
    #[serde(default)]
    pub reason: Option<String>,
}

/// A booked appointment. `provider_name` and `location` are copied from the
/// provider at booking time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: String,
    pub patient_name: String,
    pub provider_id: String,
    pub provider_name: String,
    pub date: String,
    pub time: String,
    pub location: String,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentConfirmation {
    pub appointment_id: String,
    pub patient_name: String,
    pub provider_name: String,
    pub date: String,
    pub time: String,
    pub location: String,
    /// Base64 of the iCalendar invite.
    pub invite_payload: String,
}
