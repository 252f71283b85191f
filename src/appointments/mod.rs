pub mod invite;
mod memory;

use async_trait::async_trait;
use base64::{ engine::general_purpose::STANDARD, Engine as _ };
use chrono::Utc;
use log::{ info, warn };
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::directory::ProviderDirectory;
use crate::models::appointment::{ Appointment, AppointmentConfirmation, AppointmentDraft };
use crate::schedule::ScheduleStore;

pub use invite::{ generate_invite, InviteError };
pub use memory::InMemoryAppointmentRepository;

#[derive(Debug, Error, PartialEq)]
pub enum AppointmentError {
    #[error("Provider {0} not found")]
    ProviderNotFound(String),

    #[error("Slot {date} {time} is not available for provider {provider_id}")]
    SlotUnavailable {
        provider_id: String,
        date: String,
        time: String,
    },

    #[error(transparent)]
    Invite(#[from] InviteError),
}

#[async_trait]
pub trait AppointmentRepository: Send + Sync {
    async fn get(&self, appointment_id: &str) -> Option<Appointment>;

    /// All appointments, oldest first.
    async fn list(&self) -> Vec<Appointment>;

    async fn put(&self, appointment: Appointment);
}

#[derive(Clone)]
pub struct AppointmentService {
    directory: Arc<dyn ProviderDirectory>,
    schedules: Arc<dyn ScheduleStore>,
    repository: Arc<dyn AppointmentRepository>,
}

impl AppointmentService {
    pub fn new(
        directory: Arc<dyn ProviderDirectory>,
        schedules: Arc<dyn ScheduleStore>,
        repository: Arc<dyn AppointmentRepository>
    ) -> Self {
        Self { directory, schedules, repository }
    }

    /// Books the slot and records the appointment. Provider name and location
    /// are copied at booking time.
    pub async fn create(&self, draft: AppointmentDraft) -> Result<Appointment, AppointmentError> {
        let provider = self.directory
            .get(&draft.provider_id).await
            .ok_or_else(|| AppointmentError::ProviderNotFound(draft.provider_id.clone()))?;

        if !self.schedules.book(&draft.provider_id, &draft.date, &draft.time).await {
            return Err(AppointmentError::SlotUnavailable {
                provider_id: draft.provider_id,
                date: draft.date,
                time: draft.time,
            });
        }

        let appointment = Appointment {
            id: Uuid::new_v4().to_string(),
            patient_name: draft.patient_name,
            provider_id: draft.provider_id,
            provider_name: provider.name,
            date: draft.date,
            time: draft.time,
            location: provider.location,
            reason: draft.reason,
            created_at: Utc::now(),
        };
        self.repository.put(appointment.clone()).await;
        info!(
            "Appointment {} booked: {} with {} on {} at {}",
            appointment.id,
            appointment.patient_name,
            appointment.provider_name,
            appointment.date,
            appointment.time
        );
        Ok(appointment)
    }

    pub async fn create_with_invite(
        &self,
        draft: AppointmentDraft
    ) -> Result<AppointmentConfirmation, AppointmentError> {
        let appointment = self.create(draft).await?;
        let invite = generate_invite(&appointment).map_err(|e| {
            warn!("Appointment {} booked but invite failed: {}", appointment.id, e);
            e
        })?;

        Ok(AppointmentConfirmation {
            appointment_id: appointment.id,
            patient_name: appointment.patient_name,
            provider_name: appointment.provider_name,
            date: appointment.date,
            time: appointment.time,
            location: appointment.location,
            invite_payload: STANDARD.encode(invite),
        })
    }

    pub async fn get(&self, appointment_id: &str) -> Option<Appointment> {
        self.repository.get(appointment_id).await
    }

    pub async fn list(&self) -> Vec<Appointment> {
        self.repository.list().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::{ default_providers, InMemoryProviderDirectory };
    use crate::models::schedule::ScheduleEntry;
    use crate::schedule::InMemoryScheduleStore;

    fn service() -> AppointmentService {
        let schedules = InMemoryScheduleStore::from_entries(vec![ScheduleEntry {
            provider_id: "p004".into(),
            date: "2026-01-15".into(),
            available_slots: vec!["09:00".into(), "09:30".into()],
        }]);
        AppointmentService::new(
            Arc::new(InMemoryProviderDirectory::new(default_providers())),
            Arc::new(schedules),
            Arc::new(InMemoryAppointmentRepository::new())
        )
    }

    fn draft(provider_id: &str, time: &str) -> AppointmentDraft {
        AppointmentDraft {
            patient_name: "John Doe".into(),
            provider_id: provider_id.into(),
            date: "2026-01-15".into(),
            time: time.into(),
            reason: Some("Rash".into()),
        }
    }

    #[tokio::test]
    async fn appointment_snapshots_provider_details() {
        let service = service();
        let appointment = service.create(draft("p004", "09:00")).await.unwrap();
        assert_eq!(appointment.provider_name, "Dr. James Wilson");
        assert_eq!(appointment.location, "Downtown Medical Center, Suite 310");
        assert_eq!(service.get(&appointment.id).await, Some(appointment));
    }

    #[tokio::test]
    async fn unknown_provider_is_rejected_before_booking() {
        let err = service().create(draft("p999", "09:00")).await.unwrap_err();
        assert_eq!(err, AppointmentError::ProviderNotFound("p999".into()));
    }

    #[tokio::test]
    async fn a_slot_cannot_be_booked_twice() {
        let service = service();
        service.create(draft("p004", "09:00")).await.unwrap();
        let err = service.create(draft("p004", "09:00")).await.unwrap_err();
        assert!(matches!(err, AppointmentError::SlotUnavailable { ref time, .. } if time == "09:00"));
        assert_eq!(service.list().await.len(), 1);
    }

    #[tokio::test]
    async fn confirmation_carries_base64_invite() {
        let service = service();
        let confirmation = service.create_with_invite(draft("p004", "09:30")).await.unwrap();
        let ics = String::from_utf8(STANDARD.decode(&confirmation.invite_payload).unwrap()).unwrap();
        assert!(ics.contains("BEGIN:VCALENDAR"));
        assert!(ics.contains("BEGIN:VEVENT"));
        assert!(ics.contains("John Doe"));
        assert!(ics.contains("Dr. James Wilson"));
        assert!(ics.contains(&format!("UID:{}", confirmation.appointment_id)));
    }

    #[tokio::test]
    async fn list_is_ordered_by_creation() {
        let service = service();
        let first = service.create(draft("p004", "09:30")).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        let second = service.create(draft("p004", "09:00")).await.unwrap();
        let ids: Vec<_> = service.list().await.into_iter().map(|a| a.id).collect();
        assert_eq!(ids, [first.id, second.id]);
    }
}
