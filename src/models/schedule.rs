use serde::{ Deserialize, Serialize };

/// Open slots for one provider on one date. Slots are "HH:MM" strings kept in
/// chronological order; booking removes them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub provider_id: String,
    pub date: String,
    pub available_slots: Vec<String>,
}

pub const STANDARD_TIME_SLOTS: [&str; 14] = [
    "09:00", "09:30", "10:00", "10:30", "11:00", "11:30",
    "13:00", "13:30", "14:00", "14:30", "15:00", "15:30",
    "16:00", "16:30",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TimePreference {
    Morning,
    Afternoon,
    #[default]
    Any,
}

impl TimePreference {
    /// Morning is strictly before noon; everything from 12:00 on is afternoon.
    /// Slots with an unreadable hour only pass `Any`.
    pub fn accepts(&self, slot: &str) -> bool {
        let hour = slot_hour(slot);
        match self {
            TimePreference::Any => true,
            TimePreference::Morning => matches!(hour, Some(h) if h < 12),
            TimePreference::Afternoon => matches!(hour, Some(h) if h >= 12),
        }
    }
}

pub(crate) fn slot_hour(slot: &str) -> Option<u32> {
    slot.split(':').next().and_then(|h| h.trim().parse::<u32>().ok())
}
