//! Service catalog models.

use serde::{Deserialize, Serialize};

/// A billable service offered by the clinic.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Service {
    /// Local UUID
    pub id: String,
    /// Service name (e.g., "Pediatric Checkup"), also used for doctor auto-assignment
    pub name: String,
    /// Longer description
    pub description: Option<String>,
    /// Current list price; copied onto each booking at booking time
    pub price: f64,
    /// Creation timestamp
    pub created_at: String,
    /// Last update timestamp
    pub updated_at: String,
}

impl Service {
    /// Create a new service with required fields.
    pub fn new(name: String, price: f64) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            description: None,
            price,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// Prices must be finite and non-negative.
    pub fn has_valid_price(&self) -> bool {
        is_valid_amount(self.price)
    }
}

/// Money amounts (prices, payments) must be finite and non-negative.
pub fn is_valid_amount(amount: f64) -> bool {
    amount.is_finite() && amount >= 0.0
}
