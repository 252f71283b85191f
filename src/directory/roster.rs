use crate::models::provider::{ Provider, Specialty };

const ROSTER: &[(&str, &str, Specialty, u32, f32, &str)] = &[
    ("p001", "Dr. Sarah Johnson", Specialty::GeneralPractitioner, 15, 4.8, "Downtown Medical Center, Suite 201"),
    ("p002", "Dr. Michael Chen", Specialty::GeneralPractitioner, 8, 4.5, "Westside Family Clinic"),
    ("p003", "Dr. Emily Rodriguez", Specialty::Dermatologist, 12, 4.9, "Skin Health Institute, Floor 3"),
    ("p004", "Dr. James Wilson", Specialty::Dermatologist, 20, 4.9, "Downtown Medical Center, Suite 310"),
    ("p005", "Dr. Priya Patel", Specialty::Dermatologist, 6, 4.4, "Northgate Dermatology"),
    ("p006", "Dr. Robert Kim", Specialty::Cardiologist, 22, 4.7, "Heart & Vascular Center"),
    ("p007", "Dr. Lisa Thompson", Specialty::Cardiologist, 10, 4.6, "Riverside Hospital, Cardiology Wing"),
    ("p008", "Dr. David Martinez", Specialty::Neurologist, 18, 4.8, "Neuroscience Associates"),
    ("p009", "Dr. Amanda Foster", Specialty::Neurologist, 9, 4.5, "Riverside Hospital, Neurology Wing"),
    ("p010", "Dr. Kevin O'Brien", Specialty::Orthopedist, 14, 4.7, "Sports Medicine & Orthopedics"),
    ("p011", "Dr. Rachel Green", Specialty::Orthopedist, 7, 4.3, "Westside Bone & Joint"),
    ("p012", "Dr. Thomas Anderson", Specialty::Pediatrician, 16, 4.9, "Children's Health Center"),
    ("p013", "Dr. Maria Santos", Specialty::Psychiatrist, 11, 4.6, "Mindful Health Partners"),
    ("p014", "Dr. William Lee", Specialty::Ophthalmologist, 19, 4.8, "Clear Vision Eye Center"),
    ("p015", "Dr. Jennifer Brown", Specialty::EntSpecialist, 13, 4.6, "ENT Associates, Building B"),
];

/// Built-in provider roster used when no provider file is configured.
pub fn default_providers() -> Vec<Provider> {
    ROSTER.iter()
        .map(|(id, name, specialty, experience_years, rating, location)| Provider {
            id: id.to_string(),
            name: name.to_string(),
            specialty: *specialty,
            experience_years: *experience_years,
            rating: *rating,
            location: location.to_string(),
        })
        .collect()
}
