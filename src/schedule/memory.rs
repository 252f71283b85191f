use async_trait::async_trait;
use chrono::{ Local, NaiveDate };
use log::{ debug, info, warn };
use std::collections::BTreeMap;
use std::path::PathBuf;
use tokio::sync::{ Mutex, RwLock };

use crate::error::LoadError;
use crate::models::schedule::ScheduleEntry;
use crate::schedule::file::{ read_schedules, write_schedules };
use crate::schedule::mock::generate_schedules;
use crate::schedule::ScheduleStore;

/// Where schedule data comes from, and where `reset` reloads it from.
#[derive(Debug, Clone)]
pub enum ScheduleSource {
    /// A fixed entry list, restored verbatim on reset.
    Fixed(Vec<ScheduleEntry>),
    /// Generated weekday slots for the given providers.
    Mock {
        provider_ids: Vec<String>,
        days: u32,
    },
    /// A CSV file. Missing files are seeded from a generated mock.
    Csv {
        path: PathBuf,
        persist: bool,
        provider_ids: Vec<String>,
        days: u32,
    },
}

type ScheduleMap = BTreeMap<String, Vec<ScheduleEntry>>;

pub struct InMemoryScheduleStore {
    source: ScheduleSource,
    entries: RwLock<ScheduleMap>,
    // Held across a booking and its file write so snapshots land in order.
    persist_lock: Mutex<()>,
}

impl InMemoryScheduleStore {
    pub fn new(source: ScheduleSource) -> Result<Self, LoadError> {
        let entries = Self::load(&source)?;
        Ok(Self { source, entries: RwLock::new(entries), persist_lock: Mutex::new(()) })
    }

    pub fn from_entries(entries: Vec<ScheduleEntry>) -> Self {
        let source = ScheduleSource::Fixed(entries.clone());
        Self { source, entries: RwLock::new(group(entries)), persist_lock: Mutex::new(()) }
    }

    fn load(source: &ScheduleSource) -> Result<ScheduleMap, LoadError> {
        let today = Local::now().date_naive();
        let map = match source {
            ScheduleSource::Fixed(entries) => group(entries.clone()),
            ScheduleSource::Mock { provider_ids, days } => {
                group(generate_schedules(provider_ids, today, *days))
            }
            ScheduleSource::Csv { path, persist, provider_ids, days } => {
                if path.exists() {
                    group(read_schedules(path)?)
                } else {
                    warn!(
                        "Schedule file '{}' not found. Generating {} days of mock availability.",
                        path.display(),
                        days
                    );
                    let map = group(generate_schedules(provider_ids, today, *days));
                    if *persist {
                        write_schedules(path, &map)?;
                        info!("Seeded schedule file '{}'", path.display());
                    }
                    map
                }
            }
        };
        let total: usize = map.values().map(Vec::len).sum();
        info!("Schedule store holds {} entries for {} providers", total, map.len());
        Ok(map)
    }

    fn persist_path(&self) -> Option<&PathBuf> {
        match &self.source {
            ScheduleSource::Csv { path, persist: true, .. } => Some(path),
            _ => None,
        }
    }

    /// Writes a snapshot off the async workers. Failures are logged only; the
    /// in-memory booking stands.
    async fn persist(path: PathBuf, snapshot: ScheduleMap) {
        let target = path.clone();
        match tokio::task::spawn_blocking(move || write_schedules(&target, &snapshot)).await {
            Ok(Ok(())) => debug!("Booking persisted to {}", path.display()),
            Ok(Err(e)) => warn!("Failed to persist booking: {}", e),
            Err(e) => warn!("Schedule write task failed for {}: {}", path.display(), e),
        }
    }
}

fn group(entries: Vec<ScheduleEntry>) -> ScheduleMap {
    let mut map: ScheduleMap = BTreeMap::new();
    for entry in entries {
        map.entry(entry.provider_id.clone()).or_default().push(entry);
    }
    for schedules in map.values_mut() {
        schedules.sort_by(|a, b| date_key(&a.date).cmp(&date_key(&b.date)));
    }
    map
}

fn date_key(date: &str) -> (Option<NaiveDate>, String) {
    (NaiveDate::parse_from_str(date, "%Y-%m-%d").ok(), date.to_string())
}

#[async_trait]
impl ScheduleStore for InMemoryScheduleStore {
    async fn get_schedule(&self, provider_id: &str) -> Vec<ScheduleEntry> {
        let entries = self.entries.read().await;
        match entries.get(provider_id) {
            Some(schedules) => schedules.clone(),
            None => {
                debug!("No schedules found for provider: {}", provider_id);
                Vec::new()
            }
        }
    }

    async fn get_slots(&self, provider_id: &str, date: &str) -> Vec<String> {
        let entries = self.entries.read().await;
        entries
            .get(provider_id)
            .and_then(|schedules| schedules.iter().find(|s| s.date == date))
            .map(|s| s.available_slots.clone())
            .unwrap_or_default()
    }

    async fn book(&self, provider_id: &str, date: &str, time: &str) -> bool {
        let _persist_guard = self.persist_lock.lock().await;
        let mut entries = self.entries.write().await;
        let booked = entries
            .get_mut(provider_id)
            .and_then(|schedules| schedules.iter_mut().find(|s| s.date == date))
            .and_then(|entry| {
                let pos = entry.available_slots.iter().position(|slot| slot == time)?;
                entry.available_slots.remove(pos);
                Some(())
            })
            .is_some();

        if !booked {
            warn!("Slot not available for provider {}: {} at {}", provider_id, date, time);
            return false;
        }
        info!("Slot booked for provider {}: {} at {}", provider_id, date, time);

        if let Some(path) = self.persist_path() {
            let snapshot = entries.clone();
            drop(entries);
            Self::persist(path.clone(), snapshot).await;
        }
        true
    }

    async fn reset(&self) -> Result<(), LoadError> {
        info!("Reloading schedules from source");
        let fresh = Self::load(&self.source)?;
        *self.entries.write().await = fresh;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> InMemoryScheduleStore {
        InMemoryScheduleStore::from_entries(vec![
            ScheduleEntry {
                provider_id: "p001".into(),
                date: "2026-01-16".into(),
                available_slots: vec!["13:00".into()],
            },
            ScheduleEntry {
                provider_id: "p001".into(),
                date: "2026-01-15".into(),
                available_slots: vec!["09:00".into(), "10:00".into(), "14:00".into()],
            },
        ])
    }

    #[tokio::test]
    async fn schedule_is_sorted_by_date() {
        let store = fixture();
        let dates: Vec<_> = store.get_schedule("p001").await.into_iter().map(|e| e.date).collect();
        assert_eq!(dates, ["2026-01-15", "2026-01-16"]);
        assert!(store.get_schedule("nobody").await.is_empty());
    }

    #[tokio::test]
    async fn booking_removes_exactly_one_slot() {
        let store = fixture();
        assert!(store.book("p001", "2026-01-15", "10:00").await);
        assert_eq!(store.get_slots("p001", "2026-01-15").await, vec!["09:00", "14:00"]);
        assert_eq!(store.get_slots("p001", "2026-01-16").await, vec!["13:00"]);
    }

    #[tokio::test]
    async fn failed_bookings_leave_availability_unchanged() {
        let store = fixture();
        assert!(!store.book("p001", "2026-01-15", "11:00").await);
        assert!(!store.book("p001", "2026-01-20", "09:00").await);
        assert!(!store.book("p999", "2026-01-15", "09:00").await);
        assert!(store.book("p001", "2026-01-15", "09:00").await);
        assert!(!store.book("p001", "2026-01-15", "09:00").await);
        assert_eq!(store.get_slots("p001", "2026-01-15").await, vec!["10:00", "14:00"]);
    }

    #[tokio::test]
    async fn reset_restores_fixture() {
        let store = fixture();
        assert!(store.book("p001", "2026-01-16", "13:00").await);
        assert!(store.get_slots("p001", "2026-01-16").await.is_empty());
        store.reset().await.unwrap();
        assert_eq!(store.get_slots("p001", "2026-01-16").await, vec!["13:00"]);
    }

    #[tokio::test]
    async fn csv_source_seeds_missing_file_and_persists_bookings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schedules.csv");
        let store = InMemoryScheduleStore::new(ScheduleSource::Csv {
            path: path.clone(),
            persist: true,
            provider_ids: vec!["p001".into()],
            days: 14,
        }).unwrap();
        assert!(path.exists());

        let entry = store.get_schedule("p001").await.into_iter().next().unwrap();
        let slot = entry.available_slots[0].clone();
        assert!(store.book("p001", &entry.date, &slot).await);

        let on_disk = read_schedules(&path).unwrap();
        let saved = on_disk.iter().find(|e| e.date == entry.date).unwrap();
        assert!(!saved.available_slots.contains(&slot));
    }

    #[tokio::test]
    async fn failed_write_keeps_the_booking() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schedules.csv");
        let store = InMemoryScheduleStore::new(ScheduleSource::Csv {
            path: path.clone(),
            persist: true,
            provider_ids: vec!["p001".into()],
            days: 14,
        }).unwrap();

        // a directory where the file was makes every write fail
        std::fs::remove_file(&path).unwrap();
        std::fs::create_dir(&path).unwrap();

        let entry = store.get_schedule("p001").await.into_iter().next().unwrap();
        let slot = entry.available_slots[0].clone();
        assert!(store.book("p001", &entry.date, &slot).await);
        assert!(!store.get_slots("p001", &entry.date).await.contains(&slot));
        assert!(!store.book("p001", &entry.date, &slot).await);
    }
}
