use chrono::{ Days, NaiveDate };
use std::collections::BTreeMap;

use crate::models::schedule::{ slot_hour, TimePreference };
use crate::schedule::ScheduleStore;

/// Date ("YYYY-MM-DD") to open slots, ordered by date.
pub type Availability = BTreeMap<String, Vec<String>>;

/// Open slots for dates in `[from, from + num_days)`. Dates with nothing open
/// and dates that do not parse are left out. A window reaching past the last
/// representable date is open-ended.
pub async fn availability_summary(
    store: &dyn ScheduleStore,
    provider_id: &str,
    from: NaiveDate,
    num_days: u32
) -> Availability {
    let until = from.checked_add_days(Days::new(num_days.into())).unwrap_or(NaiveDate::MAX);
    store.get_schedule(provider_id).await
        .into_iter()
        .filter(|entry| !entry.available_slots.is_empty())
        .filter(|entry| {
            NaiveDate::parse_from_str(&entry.date, "%Y-%m-%d")
                .map(|d| d >= from && d < until)
                .unwrap_or(false)
        })
        .map(|entry| (entry.date, entry.available_slots))
        .collect()
}

pub async fn next_available_dates(
    store: &dyn ScheduleStore,
    provider_id: &str,
    num_dates: usize
) -> Vec<String> {
    store.get_schedule(provider_id).await
        .into_iter()
        .filter(|entry| !entry.available_slots.is_empty())
        .map(|entry| entry.date)
        .take(num_dates)
        .collect()
}

/// Slots on the preferred dates, optionally narrowed to the preferred times.
pub async fn common_availability(
    store: &dyn ScheduleStore,
    provider_id: &str,
    preferred_dates: &[String],
    preferred_times: Option<&[String]>
) -> Availability {
    let mut result = Availability::new();
    for date in preferred_dates {
        let slots: Vec<String> = store.get_slots(provider_id, date).await
            .into_iter()
            .filter(|slot| preferred_times.map_or(true, |times| times.contains(slot)))
            .collect();
        if !slots.is_empty() {
            result.insert(date.clone(), slots);
        }
    }
    result
}

pub async fn earliest_available_slot(
    store: &dyn ScheduleStore,
    provider_id: &str
) -> Option<(String, String)> {
    store.get_schedule(provider_id).await
        .into_iter()
        .find_map(|entry| {
            let first = entry.available_slots.first()?.clone();
            Some((entry.date, first))
        })
}

pub fn filter_by_time_preference(availability: Availability, preference: TimePreference) -> Availability {
    if preference == TimePreference::Any {
        return availability;
    }
    availability
        .into_iter()
        .filter_map(|(date, slots)| {
            let kept: Vec<String> = slots.into_iter().filter(|s| preference.accepts(s)).collect();
            if kept.is_empty() { None } else { Some((date, kept)) }
        })
        .collect()
}

pub fn format_availability_message(availability: &Availability) -> String {
    if availability.is_empty() {
        return "No available slots found.".to_string();
    }

    let mut lines = Vec::with_capacity(availability.len());
    for (date, slots) in availability {
        let label = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map(|d| d.format("%A, %B %d, %Y").to_string())
            .unwrap_or_else(|_| date.clone());

        let morning: Vec<&str> = slots
            .iter()
            .filter(|s| matches!(slot_hour(s), Some(h) if h < 12))
            .map(String::as_str)
            .collect();
        let afternoon: Vec<&str> = slots
            .iter()
            .filter(|s| matches!(slot_hour(s), Some(h) if h >= 12))
            .map(String::as_str)
            .collect();

        let mut parts = Vec::new();
        if !morning.is_empty() {
            parts.push(format!("Morning: {}", morning.join(", ")));
        }
        if !afternoon.is_empty() {
            parts.push(format!("Afternoon: {}", afternoon.join(", ")));
        }
        lines.push(format!("{}: {}", label, parts.join(" | ")));
    }
    lines.join("\n")
}
