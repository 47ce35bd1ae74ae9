//! Chart lifecycle manager.
//!
//! Derives the set of charted teeth from a patient's age and keeps stored
//! charts in step with it: age changes that cross a bracket boundary migrate
//! the chart, keeping records for teeth that stay charted.

mod brackets;
mod lifecycle;

pub use brackets::*;
pub use lifecycle::*;

use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::context::RequestContext;
use crate::models::{Chart, Patient, PatientCategory, SiteStatus};
use crate::store::{PatientStore, StoreError};

/// Chart lifecycle errors.
#[derive(Error, Debug)]
pub enum ChartError {
    #[error("Site {0} is not charted for this patient's age")]
    UnknownSite(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Patient not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}

pub type ChartResult<T> = Result<T, ChartError>;

/// Fields for a new patient.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPatient {
    pub first_name: String,
    pub last_name: String,
    pub age: u32,
    pub category: PatientCategory,
    pub contact: Option<String>,
    pub notes: Option<String>,
}

/// Partial patient update. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatientUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub age: Option<u32>,
    pub category: Option<PatientCategory>,
    pub contact: Option<String>,
    pub notes: Option<String>,
}

fn require_name(field: &str, value: &str) -> ChartResult<()> {
    if value.trim().is_empty() {
        return Err(ChartError::ValidationError(format!("{} is required", field)));
    }
    Ok(())
}

/// Patient-level chart operations on top of a [`PatientStore`].
pub struct ChartManager<'a, S> {
    store: &'a S,
}

impl<'a, S: PatientStore> ChartManager<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Create and store a patient.
    ///
    /// The chart is derived from the initial age. An imported chart is
    /// reconciled against that age so only charted sites survive.
    #[instrument(skip_all, fields(actor = %ctx.actor, request_id = %ctx.request_id))]
    pub fn create_patient(
        &self,
        ctx: &RequestContext,
        new_patient: NewPatient,
        imported_chart: Option<Chart>,
    ) -> ChartResult<Patient> {
        require_name("first_name", &new_patient.first_name)?;
        require_name("last_name", &new_patient.last_name)?;

        let mut patient = Patient::new(
            new_patient.first_name,
            new_patient.last_name,
            new_patient.age,
            new_patient.category,
        );
        patient.contact = new_patient.contact;
        patient.notes = new_patient.notes;
        if let Some(chart) = imported_chart {
            patient.chart = migrate_chart(&chart, patient.age);
        }

        self.store.insert_patient(&patient)?;
        info!(
            patient_id = %patient.id,
            age = patient.age,
            sites = patient.chart.len(),
            "Created patient"
        );
        Ok(patient)
    }

    /// Get a patient by ID.
    pub fn get_patient(&self, patient_id: &str) -> ChartResult<Patient> {
        self.store
            .get_patient(patient_id)?
            .ok_or_else(|| ChartError::NotFound(patient_id.to_string()))
    }

    /// Apply `update` to a stored patient.
    ///
    /// The chart is migrated only when the age change crosses a bracket
    /// boundary. Read, migrate, and write happen as one atomic unit.
    #[instrument(skip_all, fields(actor = %ctx.actor, request_id = %ctx.request_id, patient_id = %patient_id))]
    pub fn update_patient(
        &self,
        ctx: &RequestContext,
        patient_id: &str,
        update: PatientUpdate,
    ) -> ChartResult<Patient> {
        if let Some(name) = &update.first_name {
            require_name("first_name", name)?;
        }
        if let Some(name) = &update.last_name {
            require_name("last_name", name)?;
        }

        let updated = self
            .store
            .modify_patient(patient_id, |patient| {
                let old_age = patient.age;

                if let Some(first_name) = update.first_name {
                    patient.first_name = first_name;
                }
                if let Some(last_name) = update.last_name {
                    patient.last_name = last_name;
                }
                if let Some(category) = update.category {
                    patient.category = category;
                }
                if let Some(contact) = update.contact {
                    patient.contact = Some(contact);
                }
                if let Some(notes) = update.notes {
                    patient.notes = Some(notes);
                }
                if let Some(age) = update.age {
                    patient.age = age;
                    if crosses_bracket(old_age, age) {
                        patient.chart = migrate_chart(&patient.chart, age);
                        info!(
                            old_age,
                            new_age = age,
                            sites = patient.chart.len(),
                            "Migrated chart to new age bracket"
                        );
                    } else {
                        debug!(old_age, new_age = age, "Age change within bracket");
                    }
                }
                Ok::<(), ChartError>(())
            })?
            .ok_or_else(|| ChartError::NotFound(patient_id.to_string()))?;

        Ok(updated)
    }

    /// Record one site on a stored patient's chart.
    #[instrument(skip_all, fields(actor = %ctx.actor, request_id = %ctx.request_id, patient_id = %patient_id, site_id = %site_id))]
    pub fn set_patient_site(
        &self,
        ctx: &RequestContext,
        patient_id: &str,
        site_id: &str,
        status: SiteStatus,
        notes: String,
        present: bool,
    ) -> ChartResult<Patient> {
        let updated = self
            .store
            .modify_patient(patient_id, |patient| {
                patient.chart =
                    set_site_record(&patient.chart, patient.age, site_id, status, notes, present)?;
                Ok::<(), ChartError>(())
            })?
            .ok_or_else(|| ChartError::NotFound(patient_id.to_string()))?;

        debug!(%status, "Updated chart site");
        Ok(updated)
    }

    /// A stored patient's chart in display order.
    pub fn chart_grid(&self, patient_id: &str) -> ChartResult<Vec<ChartGridEntry>> {
        let patient = self.get_patient(patient_id)?;
        Ok(chart_grid(&patient))
    }
}
