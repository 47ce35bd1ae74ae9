//! Doctor (bookable resource) models.

use serde::{Deserialize, Serialize};

/// A doctor that appointments can be booked against.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Doctor {
    /// Local UUID
    pub id: String,
    /// Display name (e.g., "Dr. Maria Santos")
    pub name: String,
    /// Free-text specialty (e.g., "Pediatric Dentistry")
    pub specialty: String,
    /// Phone or email
    pub contact: Option<String>,
    /// Whether new bookings may be made against this doctor
    pub is_available: bool,
    /// Creation timestamp
    pub created_at: String,
    /// Last update timestamp
    pub updated_at: String,
}

impl Doctor {
    /// Create a new, available doctor.
    pub fn new(name: String, specialty: String) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            specialty,
            contact: None,
            is_available: true,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// Case-insensitive substring match against the specialty tag.
    pub fn has_specialty(&self, specialty: &str) -> bool {
        self.specialty
            .to_lowercase()
            .contains(&specialty.to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_doctor_is_available() {
        let doctor = Doctor::new("Dr. Jose Cruz".into(), "General Dentistry".into());
        assert!(doctor.is_available);
        assert_eq!(doctor.id.len(), 36);
    }

    #[test]
    fn test_has_specialty() {
        let doctor = Doctor::new(
            "Dr. Maria Santos".into(),
            "Pediatric Dentistry, Orthodontics".into(),
        );
        assert!(doctor.has_specialty("pediatric dentistry"));
        assert!(doctor.has_specialty("Orthodontics"));
        assert!(!doctor.has_specialty("Oral Surgery"));
    }
}
