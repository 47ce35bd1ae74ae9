//! Collaborator interfaces the scheduler and chart manager consume.
//!
//! The core never talks to a storage engine directly. [`crate::db::Database`]
//! implements every trait here on top of SQLite.

use chrono::NaiveDateTime;
use thiserror::Error;

use crate::models::{Appointment, AppointmentStatus, Doctor, Patient, Service};

/// Failure inside the storage collaborator. Not interpreted by the core.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Storage backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),

    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Doctor lookup.
pub trait ResourceDirectory {
    fn get_doctor(&self, doctor_id: &str) -> StoreResult<Option<Doctor>>;

    /// Doctors whose availability flag is set, in name order.
    fn list_available_doctors(&self) -> StoreResult<Vec<Doctor>>;
}

/// Service price lookup.
pub trait ServiceCatalog {
    fn get_service(&self, service_id: &str) -> StoreResult<Option<Service>>;
}

/// Appointment query filter. Every field is optional; unset fields match all.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppointmentFilter {
    pub doctor_id: Option<String>,
    /// Inclusive lower bound on the appointment start
    pub from: Option<NaiveDateTime>,
    /// Exclusive upper bound on the appointment start
    pub to: Option<NaiveDateTime>,
    pub status: Option<AppointmentStatus>,
    pub is_completed: Option<bool>,
}

impl AppointmentFilter {
    pub fn for_doctor(doctor_id: impl Into<String>) -> Self {
        Self {
            doctor_id: Some(doctor_id.into()),
            ..Self::default()
        }
    }
}

/// Result of a conflict-checked appointment write.
#[derive(Debug, Clone, PartialEq)]
pub enum SlotWrite {
    Saved(Appointment),
    /// Nothing was written; this active appointment holds the slot.
    Conflict(Appointment),
}

/// Appointment persistence.
pub trait AppointmentStore {
    /// Insert or replace `appointment` unless another active appointment of the
    /// same doctor overlaps its slot. The check and the write are one atomic
    /// unit. Returns the conflicting appointment when nothing was written.
    fn save_if_free(&self, appointment: &Appointment) -> StoreResult<Option<Appointment>>;

    fn get_appointment(&self, appointment_id: &str) -> StoreResult<Option<Appointment>>;

    /// Read, mutate, and write back one appointment atomically. Returns
    /// `Ok(None)` if it does not exist; nothing is written if `f` fails.
    fn modify_appointment<F, E>(&self, appointment_id: &str, f: F) -> Result<Option<Appointment>, E>
    where
        F: FnOnce(&mut Appointment) -> Result<(), E>,
        E: From<StoreError>;

    /// Like [`Self::modify_appointment`], but the mutated appointment is only
    /// written if it is free of overlaps with other active appointments of
    /// its doctor. Read, mutation, overlap check and write are one atomic
    /// unit.
    fn modify_appointment_if_free<F, E>(
        &self,
        appointment_id: &str,
        f: F,
    ) -> Result<Option<SlotWrite>, E>
    where
        F: FnOnce(&mut Appointment) -> Result<(), E>,
        E: From<StoreError>;

    /// Apply `f` to each of a patient's appointments in one atomic unit and
    /// write back those for which it returns `true`. Nothing is written if
    /// `f` fails for any of them. Returns the written appointments.
    fn modify_patient_appointments<F, E>(&self, patient_id: &str, f: F) -> Result<Vec<Appointment>, E>
    where
        F: FnMut(&mut Appointment) -> Result<bool, E>,
        E: From<StoreError>;

    fn delete_appointment(&self, appointment_id: &str) -> StoreResult<bool>;

    /// Matching appointments ordered by start time.
    fn query_appointments(&self, filter: &AppointmentFilter) -> StoreResult<Vec<Appointment>>;

    /// A patient's appointments, newest first.
    fn list_appointments_for_patient(&self, patient_id: &str) -> StoreResult<Vec<Appointment>>;

    fn count_appointments_for_doctor(&self, doctor_id: &str) -> StoreResult<u64>;
}

/// Patient persistence.
pub trait PatientStore {
    fn insert_patient(&self, patient: &Patient) -> StoreResult<()>;

    fn get_patient(&self, patient_id: &str) -> StoreResult<Option<Patient>>;

    /// Read, mutate, and write back one patient atomically. Returns `Ok(None)`
    /// if it does not exist; nothing is written if `f` fails.
    fn modify_patient<F, E>(&self, patient_id: &str, f: F) -> Result<Option<Patient>, E>
    where
        F: FnOnce(&mut Patient) -> Result<(), E>,
        E: From<StoreError>;
}
