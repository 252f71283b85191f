use csv::{ ReaderBuilder, Writer };
use serde::{ Deserialize, Serialize };
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::LoadError;
use crate::models::schedule::ScheduleEntry;

#[derive(Serialize, Deserialize)]
struct ScheduleRow {
    provider_id: String,
    date: String,
    time_slots: String,
    #[serde(default)]
    is_available: Option<String>,
}

pub fn read_schedules<P: AsRef<Path>>(path: P) -> Result<Vec<ScheduleEntry>, LoadError> {
    let path_str = path.as_ref().display().to_string();
    let mut reader = ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path.as_ref())
        .map_err(|source| LoadError::Csv { path: path_str.clone(), source })?;

    let mut entries = Vec::new();
    for row in reader.deserialize::<ScheduleRow>() {
        let row = row.map_err(|source| LoadError::Csv { path: path_str.clone(), source })?;
        let available_slots = row.time_slots
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        entries.push(ScheduleEntry {
            provider_id: row.provider_id,
            date: row.date,
            available_slots,
        });
    }
    Ok(entries)
}

/// Rewrites the whole file from the in-memory entries, providers in id order
/// and dates ascending.
pub fn write_schedules<P: AsRef<Path>>(
    path: P,
    entries: &BTreeMap<String, Vec<ScheduleEntry>>
) -> Result<(), LoadError> {
    let path_str = path.as_ref().display().to_string();
    let csv_err = |source| LoadError::Csv { path: path_str.clone(), source };

    let mut wtr = Writer::from_path(path.as_ref()).map_err(csv_err)?;
    for schedules in entries.values() {
        for entry in schedules {
            wtr.serialize(ScheduleRow {
                provider_id: entry.provider_id.clone(),
                date: entry.date.clone(),
                time_slots: entry.available_slots.join(","),
                is_available: Some("1".to_string()),
            }).map_err(csv_err)?;
        }
    }
    wtr.flush().map_err(|source| LoadError::Io { path: path_str.clone(), source })?;
    Ok(())
}
