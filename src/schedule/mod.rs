pub mod availability;
mod file;
mod memory;
mod mock;

use async_trait::async_trait;
use log::info;
use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use crate::cli::Args;
use crate::error::LoadError;
use crate::models::provider::Provider;
use crate::models::schedule::ScheduleEntry;

pub use file::{ read_schedules, write_schedules };
pub use memory::{ InMemoryScheduleStore, ScheduleSource };
pub use mock::generate_schedules;

#[async_trait]
pub trait ScheduleStore: Send + Sync {
    /// All entries for a provider, dates ascending. Empty for unknown providers.
    async fn get_schedule(&self, provider_id: &str) -> Vec<ScheduleEntry>;

    async fn get_slots(&self, provider_id: &str, date: &str) -> Vec<String>;

    /// Removes `time` from the provider's entry for `date`. Returns false when
    /// the provider, the date or the slot is missing; callers cannot tell
    /// which.
    async fn book(&self, provider_id: &str, date: &str, time: &str) -> bool;

    /// Drops in-memory bookings and reloads from the backing source.
    async fn reset(&self) -> Result<(), LoadError>;
}

pub fn create_schedule_store(
    args: &Args,
    providers: &[Provider]
) -> Result<Arc<dyn ScheduleStore>, Box<dyn Error + Send + Sync>> {
    let provider_ids: Vec<String> = providers.iter().map(|p| p.id.clone()).collect();
    let source = match &args.schedules_path {
        Some(path) => {
            info!(
                "Schedules backed by {} (persist bookings: {})",
                path,
                args.persist_bookings
            );
            ScheduleSource::Csv {
                path: PathBuf::from(path),
                persist: args.persist_bookings,
                provider_ids,
                days: args.mock_schedule_days,
            }
        }
        None => {
            info!("Schedules generated for the next {} days", args.mock_schedule_days);
            ScheduleSource::Mock { provider_ids, days: args.mock_schedule_days }
        }
    };
    Ok(Arc::new(InMemoryScheduleStore::new(source)?))
}
