use async_trait::async_trait;
use log::{ debug, warn };

use crate::directory::ProviderDirectory;
use crate::models::provider::{ Provider, Specialty };

/// Read-only directory over a provider list fixed at construction.
pub struct InMemoryProviderDirectory {
    providers: Vec<Provider>,
}

impl InMemoryProviderDirectory {
    pub fn new(providers: Vec<Provider>) -> Self {
        Self { providers }
    }
}

#[async_trait]
impl ProviderDirectory for InMemoryProviderDirectory {
    async fn get(&self, provider_id: &str) -> Option<Provider> {
        let found = self.providers.iter().find(|p| p.id == provider_id).cloned();
        if found.is_none() {
            warn!("Provider not found: {}", provider_id);
        }
        found
    }

    async fn list(&self) -> Vec<Provider> {
        self.providers.clone()
    }

    async fn by_specialty(&self, specialty: Specialty) -> Vec<Provider> {
        let providers: Vec<Provider> = self.providers
            .iter()
            .filter(|p| p.specialty == specialty)
            .cloned()
            .collect();
        debug!("Found {} providers with specialty {}", providers.len(), specialty);
        providers
    }
}
