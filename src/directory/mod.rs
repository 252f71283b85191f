mod memory;
mod roster;

use async_trait::async_trait;
use csv::ReaderBuilder;
use log::{ info, warn };
use serde::Deserialize;
use std::error::Error;
use std::path::Path;
use std::sync::Arc;

use crate::cli::Args;
use crate::error::LoadError;
use crate::models::provider::{ Provider, Specialty };

pub use memory::InMemoryProviderDirectory;
pub use roster::default_providers;

#[async_trait]
pub trait ProviderDirectory: Send + Sync {
    async fn get(&self, provider_id: &str) -> Option<Provider>;

    async fn list(&self) -> Vec<Provider>;

    async fn by_specialty(&self, specialty: Specialty) -> Vec<Provider>;
}

#[derive(Deserialize)]
struct ProviderRecord {
    id: String,
    name: String,
    specialty: String,
    experience_years: u32,
    rating: f32,
    location: String,
}

pub fn load_providers_csv<P: AsRef<Path>>(path: P) -> Result<Vec<Provider>, LoadError> {
    let path_str = path.as_ref().display().to_string();
    let mut reader = ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path.as_ref())
        .map_err(|source| LoadError::Csv { path: path_str.clone(), source })?;

    let mut providers = Vec::new();
    for row in reader.deserialize::<ProviderRecord>() {
        let record = row.map_err(|source| LoadError::Csv { path: path_str.clone(), source })?;
        let specialty = record.specialty
            .parse::<Specialty>()
            .map_err(|e| LoadError::Record { path: path_str.clone(), message: e.to_string() })?;
        if !(0.0..=5.0).contains(&record.rating) {
            return Err(LoadError::Record {
                path: path_str,
                message: format!("rating {} for '{}' is outside 0-5", record.rating, record.id),
            });
        }
        providers.push(Provider {
            id: record.id,
            name: record.name,
            specialty,
            experience_years: record.experience_years,
            rating: record.rating,
            location: record.location,
        });
    }

    info!("Loaded {} providers from {}", providers.len(), path_str);
    Ok(providers)
}

pub fn create_provider_directory(
    args: &Args
) -> Result<Arc<dyn ProviderDirectory>, Box<dyn Error + Send + Sync>> {
    let providers = match &args.providers_path {
        Some(path) if Path::new(path).exists() => load_providers_csv(path)?,
        Some(path) => {
            warn!("Provider file '{}' not found. Using built-in roster.", path);
            default_providers()
        }
        None => {
            info!("No provider file configured. Using built-in roster.");
            default_providers()
        }
    };
    Ok(Arc::new(InMemoryProviderDirectory::new(providers)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_providers_from_csv() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "id,name,specialty,experience_years,rating,location").unwrap();
        writeln!(file, "p100,Dr. Ada Lane,Dermatologist,12,4.7,\"Suite 4, Main St\"").unwrap();
        writeln!(file, "p101,Dr. Ben Ortiz,ENT Specialist,3,4.1,Clinic B").unwrap();

        let providers = load_providers_csv(file.path()).unwrap();
        assert_eq!(providers.len(), 2);
        assert_eq!(providers[0].specialty, Specialty::Dermatologist);
        assert_eq!(providers[0].location, "Suite 4, Main St");
        assert_eq!(providers[1].specialty, Specialty::EntSpecialist);
    }

    #[test]
    fn rejects_unknown_specialty() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "id,name,specialty,experience_years,rating,location").unwrap();
        writeln!(file, "p100,Dr. Ada Lane,Herbalist,12,4.7,Clinic A").unwrap();

        let err = load_providers_csv(file.path()).unwrap_err();
        assert!(matches!(err, LoadError::Record { .. }));
    }
}
