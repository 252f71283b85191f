use log::{ info, warn };
use std::sync::Arc;
use thiserror::Error;

use crate::directory::ProviderDirectory;
use crate::models::provider::{ Provider, ProviderMatch, Specialty };

pub const KEYWORD_CONFIDENCE: f32 = 0.9;
pub const FALLBACK_CONFIDENCE: f32 = 0.6;

/// Keyword to specialty, scanned in order; the first keyword contained in the
/// lower-cased issue wins, so more specific phrases sit before generic ones.
pub const ISSUE_TO_SPECIALTY: &[(&str, Specialty)] = &[
    ("rash", Specialty::Dermatologist),
    ("acne", Specialty::Dermatologist),
    ("eczema", Specialty::Dermatologist),
    ("psoriasis", Specialty::Dermatologist),
    ("skin", Specialty::Dermatologist),
    ("mole", Specialty::Dermatologist),
    ("chest pain", Specialty::Cardiologist),
    ("heart", Specialty::Cardiologist),
    ("palpitations", Specialty::Cardiologist),
    ("blood pressure", Specialty::Cardiologist),
    ("headache", Specialty::Neurologist),
    ("migraine", Specialty::Neurologist),
    ("seizure", Specialty::Neurologist),
    ("dizziness", Specialty::Neurologist),
    ("numbness", Specialty::Neurologist),
    ("back pain", Specialty::Orthopedist),
    ("back", Specialty::Orthopedist),
    ("joint pain", Specialty::Orthopedist),
    ("joint", Specialty::Orthopedist),
    ("fracture", Specialty::Orthopedist),
    ("arthritis", Specialty::Orthopedist),
    ("sprain", Specialty::Orthopedist),
    ("knee", Specialty::Orthopedist),
    ("shoulder", Specialty::Orthopedist),
    ("child", Specialty::Pediatrician),
    ("baby", Specialty::Pediatrician),
    ("infant", Specialty::Pediatrician),
    ("depression", Specialty::Psychiatrist),
    ("anxiety", Specialty::Psychiatrist),
    ("panic", Specialty::Psychiatrist),
    ("stress", Specialty::Psychiatrist),
    ("vision", Specialty::Ophthalmologist),
    ("eye", Specialty::Ophthalmologist),
    ("blurry", Specialty::Ophthalmologist),
    ("ear", Specialty::EntSpecialist),
    ("throat", Specialty::EntSpecialist),
    ("nose", Specialty::EntSpecialist),
    ("sinus", Specialty::EntSpecialist),
    ("hearing", Specialty::EntSpecialist),
];

#[derive(Debug, Error, PartialEq)]
pub enum MatchError {
    #[error("no provider available for specialty {0}")]
    NoProviderForSpecialty(Specialty),
}

/// The specialty an issue maps to, plus the keyword that decided it.
pub fn resolve_specialty(health_issue: &str) -> (Specialty, Option<&'static str>) {
    let issue = health_issue.to_lowercase();
    ISSUE_TO_SPECIALTY.iter()
        .find(|(keyword, _)| issue.contains(keyword))
        .map(|(keyword, specialty)| (*specialty, Some(*keyword)))
        .unwrap_or((Specialty::GeneralPractitioner, None))
}

/// Highest rating wins; ties go to the more experienced provider.
pub fn best_provider(providers: &[Provider]) -> Option<&Provider> {
    providers.iter().max_by(|a, b| a.rank_cmp(b))
}

#[derive(Clone)]
pub struct ProviderMatcher {
    directory: Arc<dyn ProviderDirectory>,
}

impl ProviderMatcher {
    pub fn new(directory: Arc<dyn ProviderDirectory>) -> Self {
        Self { directory }
    }

    pub async fn match_provider_for_issue(&self, health_issue: &str) -> Result<ProviderMatch, MatchError> {
        let (specialty, keyword) = resolve_specialty(health_issue);
        let (match_reason, confidence) = match keyword {
            Some(kw) =>
                (
                    format!("Identified '{}' in health issue, recommending {}", kw, specialty),
                    KEYWORD_CONFIDENCE,
                ),
            None =>
                (
                    "No specific specialty identified, recommending general practitioner for initial evaluation".to_string(),
                    FALLBACK_CONFIDENCE,
                ),
        };

        let providers = self.directory.by_specialty(specialty).await;
        let provider = best_provider(&providers).ok_or_else(|| {
            warn!("No providers found for specialty: {}", specialty);
            MatchError::NoProviderForSpecialty(specialty)
        })?;
        info!(
            "Matched '{}' to {} ({}, rating {})",
            health_issue,
            provider.name,
            specialty,
            provider.rating
        );

        Ok(ProviderMatch {
            provider_id: provider.id.clone(),
            provider_name: provider.name.clone(),
            specialty: provider.specialty,
            match_reason,
            confidence,
        })
    }

    /// Up to `max_results` providers of a specialty, best first, each rank
    /// 0.1 less confident than the one before.
    pub async fn candidates_for_specialty(
        &self,
        specialty: Specialty,
        max_results: usize
    ) -> Vec<ProviderMatch> {
        let mut providers = self.directory.by_specialty(specialty).await;
        providers.sort_by(|a, b| b.rank_cmp(a));

        providers
            .into_iter()
            .take(max_results)
            .enumerate()
            .map(|(rank, provider)| ProviderMatch {
                provider_id: provider.id,
                provider_name: provider.name,
                specialty: provider.specialty,
                match_reason: format!("Specialty match for {}", specialty),
                confidence: (KEYWORD_CONFIDENCE - 0.1 * rank as f32).max(0.0),
            })
            .collect()
    }

    pub async fn provider_options_for_issue(
        &self,
        health_issue: &str,
        max_results: usize
    ) -> Vec<ProviderMatch> {
        let (specialty, _) = resolve_specialty(health_issue);
        self.candidates_for_specialty(specialty, max_results).await
    }
}
