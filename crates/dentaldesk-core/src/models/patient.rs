//! Patient models.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::chart::Chart;
use crate::chart::create_chart;

/// Caller-supplied patient category. Independent of the chart's age bracket.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PatientCategory {
    Adult,
    Pediatric,
}

impl PatientCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            PatientCategory::Adult => "adult",
            PatientCategory::Pediatric => "pediatric",
        }
    }
}

impl fmt::Display for PatientCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PatientCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "adult" => Ok(PatientCategory::Adult),
            "pediatric" => Ok(PatientCategory::Pediatric),
            _ => Err(format!("Unknown patient category: {}", s)),
        }
    }
}

/// A patient record with its tooth chart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Patient {
    /// Local UUID
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    /// Age in whole years; drives which teeth are charted
    pub age: u32,
    pub category: PatientCategory,
    /// Phone or email
    pub contact: Option<String>,
    /// Free-text notes
    pub notes: Option<String>,
    /// Tooth chart; key set always matches the expected set for `age`
    pub chart: Chart,
    /// Creation timestamp
    pub created_at: String,
    /// Last update timestamp
    pub updated_at: String,
}

impl Patient {
    /// Create a new patient with a fresh chart for their age.
    pub fn new(first_name: String, last_name: String, age: u32, category: PatientCategory) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            first_name,
            last_name,
            age,
            category,
            contact: None,
            notes: None,
            chart: create_chart(age),
            created_at: now.clone(),
            updated_at: now,
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Touch the updated_at timestamp.
    pub fn touch(&mut self) {
        self.updated_at = chrono::Utc::now().to_rfc3339();
    }
}
