//! Specialty-based doctor assignment.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::models::Doctor;

/// Specialty used when no keyword rule matches.
pub const GENERAL_DENTISTRY: &str = "General Dentistry";

/// Ordered keyword rules; the first rule with a keyword contained in the
/// service name wins.
const SPECIALTY_RULES: &[(&[&str], &str)] = &[
    (&["pediatric", "child", "kids"], "Pediatric Dentistry"),
    (&["braces", "orthodontic", "orthodontics"], "Orthodontics"),
    (&["surgery", "extraction", "wisdom"], "Oral Surgery"),
    (&["periodontics", "gum"], "Periodontics"),
];

/// Specialty a service name calls for (case-insensitive keyword match).
pub fn specialty_for_service(service_name: &str) -> &'static str {
    let name = service_name.to_lowercase();
    SPECIALTY_RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| name.contains(k)))
        .map(|(_, specialty)| *specialty)
        .unwrap_or(GENERAL_DENTISTRY)
}

/// Pick one available doctor with `specialty`, uniformly at random.
pub fn choose_doctor<'d, R>(doctors: &'d [Doctor], specialty: &str, rng: &mut R) -> Option<&'d Doctor>
where
    R: Rng + ?Sized,
{
    let candidates: Vec<&Doctor> = doctors
        .iter()
        .filter(|d| d.is_available && d.has_specialty(specialty))
        .collect();
    candidates.choose(rng).copied()
}
