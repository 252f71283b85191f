use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::appointments::AppointmentRepository;
use crate::models::appointment::Appointment;

#[derive(Default)]
pub struct InMemoryAppointmentRepository {
    appointments: RwLock<HashMap<String, Appointment>>,
}

impl InMemoryAppointmentRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AppointmentRepository for InMemoryAppointmentRepository {
    async fn get(&self, appointment_id: &str) -> Option<Appointment> {
        self.appointments.read().await.get(appointment_id).cloned()
    }

    async fn list(&self) -> Vec<Appointment> {
        let mut all: Vec<Appointment> = self.appointments.read().await.values().cloned().collect();
        all.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        all
    }

    async fn put(&self, appointment: Appointment) {
        self.appointments.write().await.insert(appointment.id.clone(), appointment);
    }
}
