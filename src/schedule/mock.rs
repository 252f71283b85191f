use chrono::{ Datelike, Days, NaiveDate, Weekday };

use crate::models::schedule::{ ScheduleEntry, STANDARD_TIME_SLOTS };

/// Weekday schedules for `days` days starting at `start`. Roughly one slot
/// in five is left out, varying by provider and day, so calendars differ.
pub fn generate_schedules(provider_ids: &[String], start: NaiveDate, days: u32) -> Vec<ScheduleEntry> {
    let mut entries = Vec::new();
    for (p_idx, provider_id) in provider_ids.iter().enumerate() {
        for offset in 0..days {
            let Some(date) = start.checked_add_days(Days::new(offset.into())) else {
                break;
            };
            if matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
                continue;
            }
            let available_slots = STANDARD_TIME_SLOTS.iter()
                .enumerate()
                .filter(|(s_idx, _)| (p_idx * 7 + (offset as usize) * 3 + s_idx) % 5 != 0)
                .map(|(_, slot)| slot.to_string())
                .collect();
            entries.push(ScheduleEntry {
                provider_id: provider_id.clone(),
                date: date.format("%Y-%m-%d").to_string(),
                available_slots,
            });
        }
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_weekends_and_keeps_slots_ordered() {
        // 2026-01-12 is a Monday
        let start = NaiveDate::from_ymd_opt(2026, 1, 12).unwrap();
        let entries = generate_schedules(&["p001".to_string()], start, 7);
        let dates: Vec<_> = entries.iter().map(|e| e.date.as_str()).collect();
        assert_eq!(dates, ["2026-01-12", "2026-01-13", "2026-01-14", "2026-01-15", "2026-01-16"]);

        for entry in &entries {
            assert!(!entry.available_slots.is_empty());
            assert!(entry.available_slots.len() < STANDARD_TIME_SLOTS.len());
            let mut sorted = entry.available_slots.clone();
            sorted.sort();
            assert_eq!(sorted, entry.available_slots);
        }
    }

    #[test]
    fn stops_at_the_last_representable_date() {
        let start = NaiveDate::MAX - Days::new(3);
        let entries = generate_schedules(&["p001".to_string()], start, u32::MAX);
        assert!(entries.len() <= 4);
    }
}
