use serde::{ Deserialize, Serialize };
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum Specialty {
    #[serde(rename = "General Practitioner")]
    GeneralPractitioner,
    #[serde(rename = "Dermatologist")]
    Dermatologist,
    #[serde(rename = "Cardiologist")]
    Cardiologist,
    #[serde(rename = "Neurologist")]
    Neurologist,
    #[serde(rename = "Orthopedist")]
    Orthopedist,
    #[serde(rename = "Pediatrician")]
    Pediatrician,
    #[serde(rename = "Psychiatrist")]
    Psychiatrist,
    #[serde(rename = "Ophthalmologist")]
    Ophthalmologist,
    #[serde(rename = "ENT Specialist")]
    EntSpecialist,
}

impl Specialty {
    pub const ALL: [Specialty; 9] = [
        Specialty::GeneralPractitioner,
        Specialty::Dermatologist,
        Specialty::Cardiologist,
        Specialty::Neurologist,
        Specialty::Orthopedist,
        Specialty::Pediatrician,
        Specialty::Psychiatrist,
        Specialty::Ophthalmologist,
        Specialty::EntSpecialist,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Specialty::GeneralPractitioner => "General Practitioner",
            Specialty::Dermatologist => "Dermatologist",
            Specialty::Cardiologist => "Cardiologist",
            Specialty::Neurologist => "Neurologist",
            Specialty::Orthopedist => "Orthopedist",
            Specialty::Pediatrician => "Pediatrician",
            Specialty::Psychiatrist => "Psychiatrist",
            Specialty::Ophthalmologist => "Ophthalmologist",
            Specialty::EntSpecialist => "ENT Specialist",
        }
    }
}

impl fmt::Display for Specialty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct ParseSpecialtyError {
    message: String,
}

impl fmt::Display for ParseSpecialtyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ParseSpecialtyError {}

impl FromStr for Specialty {
    type Err = ParseSpecialtyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Specialty::ALL
            .iter()
            .find(|specialty| specialty.as_str().eq_ignore_ascii_case(wanted))
            .copied()
            .ok_or_else(|| ParseSpecialtyError {
                message: format!("Unknown specialty: '{}'", s),
            })
    }
}

/// A healthcare provider. Loaded once at startup and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provider {
    pub id: String,
    pub name: String,
    pub specialty: Specialty,
    pub experience_years: u32,
    pub rating: f32,
    pub location: String,
}

impl Provider {
    /// Ranking key used everywhere a "best" provider is picked: rating first,
    /// then years of experience.
    pub fn rank_cmp(&self, other: &Provider) -> std::cmp::Ordering {
        self.rating
            .total_cmp(&other.rating)
            .then_with(|| self.experience_years.cmp(&other.experience_years))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderMatch {
    pub provider_id: String,
    pub provider_name: String,
    pub specialty: Specialty,
    pub match_reason: String,
    pub confidence: f32,
}
