pub mod api;

use crate::agent::AppointmentAgent;
use crate::appointments::AppointmentService;
use crate::directory::ProviderDirectory;
use log::info;
use std::error::Error;
use std::sync::Arc;

/// Shared handler state. Everything inside is cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub agent: Arc<AppointmentAgent>,
    pub directory: Arc<dyn ProviderDirectory>,
    pub appointments: AppointmentService,
}

pub struct Server {
    addr: String,
    state: AppState,
}

impl Server {
    pub fn new(addr: String, state: AppState) -> Self {
        Self { addr, state }
    }

    pub async fn run(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        let app = api::build_router(self.state.clone());
        let listener = tokio::net::TcpListener
            ::bind(&self.addr).await
            .map_err(|e| format!("Failed to bind HTTP server to {}: {}", self.addr, e))?;
        info!("HTTP server listening on http://{}", self.addr);
        axum::serve(listener, app.into_make_service()).await?;
        Ok(())
    }
}
