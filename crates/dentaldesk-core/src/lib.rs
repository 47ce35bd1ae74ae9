//! DentalDesk Core Library
//!
//! Local-first scheduling and tooth charting for a small dental practice.
//!
//! # Architecture
//!
//! ```text
//!        Booking request                      Patient create / update
//!              │                                        │
//!      ┌───────▼────────┐                     ┌─────────▼─────────┐
//!      │   Scheduler    │                     │   ChartManager    │
//!      │ availability → │                     │ age → bracket →   │
//!      │ price → overlap│                     │ expected sites    │
//!      └───────┬────────┘                     └─────────┬─────────┘
//!              │        store traits (ResourceDirectory,│
//!              │        ServiceCatalog, AppointmentStore, PatientStore)
//!              └──────────────────┬─────────────────────┘
//!                                 ▼
//!                        SQLite (Database)
//! ```
//!
//! # Core Principle
//!
//! **A doctor is never double-booked.** The overlap check and the write of a
//! booking happen in one immediate SQLite transaction.
//!
//! # Modules
//!
//! - [`anatomy`]: Primary and permanent tooth catalogs
//! - [`chart`]: Age brackets and chart lifecycle
//! - [`scheduler`]: Booking, status, payments, and doctor auto-assignment
//! - [`store`]: Storage traits the core is written against
//! - [`db`]: SQLite implementation of the storage traits
//! - [`models`]: Domain types (Doctor, Service, Appointment, Patient, Chart)
//! - [`config`]: Runtime configuration
//! - [`context`]: Per-request actor and request id

pub mod anatomy;
pub mod chart;
pub mod config;
pub mod context;
pub mod db;
pub mod models;
pub mod scheduler;
pub mod store;

// Re-export commonly used types
pub use chart::{ChartError, ChartManager, NewPatient, PatientUpdate};
pub use config::ClinicConfig;
pub use context::RequestContext;
pub use db::Database;
pub use models::{
    Appointment, AppointmentStatus, Chart, Doctor, Patient, PatientCategory, PaymentStatus,
    Service, SiteRecord, SiteStatus, TimeSlot,
};
pub use scheduler::{
    BookingWarning, NewAppointment, PaymentOutcome, Scheduler, SchedulerError,
};
pub use store::{AppointmentFilter, SlotWrite, StoreError};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::str::FromStr;
use std::sync::{Arc, Mutex};

use chrono::NaiveDateTime;

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum ClinicError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Doctor unavailable: {0}")]
    ResourceUnavailable(String),

    #[error("Slot overlaps appointment {0}")]
    SchedulingConflict(String),

    #[error("Unknown site: {0}")]
    UnknownSite(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<db::DbError> for ClinicError {
    fn from(e: db::DbError) -> Self {
        match e {
            db::DbError::NotFound(what) => ClinicError::NotFound(what),
            db::DbError::Constraint(msg) => ClinicError::InvalidInput(msg),
            other => ClinicError::DatabaseError(other.to_string()),
        }
    }
}

impl From<StoreError> for ClinicError {
    fn from(e: StoreError) -> Self {
        ClinicError::DatabaseError(e.to_string())
    }
}

impl From<SchedulerError> for ClinicError {
    fn from(e: SchedulerError) -> Self {
        match e {
            SchedulerError::ResourceUnavailable(msg) => ClinicError::ResourceUnavailable(msg),
            SchedulerError::SchedulingConflict { conflicting_id } => {
                ClinicError::SchedulingConflict(conflicting_id)
            }
            SchedulerError::ValidationError(msg) => ClinicError::InvalidInput(msg),
            SchedulerError::NotFound(what) => ClinicError::NotFound(what),
            SchedulerError::Storage(e) => e.into(),
        }
    }
}

impl From<ChartError> for ClinicError {
    fn from(e: ChartError) -> Self {
        match e {
            ChartError::UnknownSite(site) => ClinicError::UnknownSite(site),
            ChartError::ValidationError(msg) => ClinicError::InvalidInput(msg),
            ChartError::NotFound(what) => ClinicError::NotFound(what),
            ChartError::Storage(e) => e.into(),
        }
    }
}

impl From<anyhow::Error> for ClinicError {
    fn from(e: anyhow::Error) -> Self {
        ClinicError::ConfigError(format!("{:#}", e))
    }
}

impl<T> From<std::sync::PoisonError<T>> for ClinicError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        ClinicError::DatabaseError(format!("Lock poisoned: {}", e))
    }
}

fn parse_field<T: FromStr<Err = String>>(value: &str) -> Result<T, ClinicError> {
    value.parse().map_err(ClinicError::InvalidInput)
}

/// Accepts ISO 8601 (`2025-06-02T09:00:00`) and the space-separated form
/// (`2025-06-02 09:00:00`), each with optional fractional seconds.
fn parse_time(value: &str) -> Result<NaiveDateTime, ClinicError> {
    value
        .parse::<NaiveDateTime>()
        .or_else(|e| NaiveDateTime::parse_from_str(value, SPACED_TIME_FORMAT).map_err(|_| e))
        .map_err(|e| ClinicError::InvalidInput(format!("Invalid time {:?}: {}", value, e)))
}

const SPACED_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

fn format_time(value: NaiveDateTime) -> String {
    value.format(db::TIME_FORMAT).to_string()
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open or create a database at the given path with default settings.
#[uniffi::export]
pub fn open_clinic(path: String) -> Result<Arc<ClinicCore>, ClinicError> {
    let config = ClinicConfig {
        database_path: path.into(),
        ..ClinicConfig::default()
    };
    ClinicCore::open(config)
}

/// Open the database described by a JSON config file.
#[uniffi::export]
pub fn open_clinic_with_config(config_path: String) -> Result<Arc<ClinicCore>, ClinicError> {
    let config = ClinicConfig::from_json_file(&config_path)?;
    ClinicCore::open(config)
}

/// Create an in-memory database (for testing).
#[uniffi::export]
pub fn open_clinic_in_memory() -> Result<Arc<ClinicCore>, ClinicError> {
    let db = Database::open_in_memory()?;
    Ok(Arc::new(ClinicCore {
        db: Arc::new(Mutex::new(db)),
        config: ClinicConfig::default(),
    }))
}

/// Site ids charted at `age`, in chart order.
#[uniffi::export]
pub fn expected_site_set(age: u32) -> Vec<String> {
    chart::expected_site_set(age)
        .into_iter()
        .map(String::from)
        .collect()
}

/// Display label of a tooth, if the id is known.
#[uniffi::export]
pub fn site_label(site_id: String) -> Option<String> {
    anatomy::site_label(&site_id).map(String::from)
}

/// Specialty a service name is routed to.
#[uniffi::export]
pub fn specialty_for_service(service_name: String) -> String {
    scheduler::specialty_for_service(&service_name).to_string()
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe database wrapper for FFI.
#[derive(uniffi::Object)]
pub struct ClinicCore {
    db: Arc<Mutex<Database>>,
    config: ClinicConfig,
}

impl ClinicCore {
    fn open(config: ClinicConfig) -> Result<Arc<Self>, ClinicError> {
        let db = Database::open_with_config(&config)?;
        Ok(Arc::new(Self {
            db: Arc::new(Mutex::new(db)),
            config,
        }))
    }

    fn scheduler<'a>(&self, db: &'a Database) -> Scheduler<'a, Database> {
        Scheduler::with_config(db, &self.config)
    }
}

#[uniffi::export]
impl ClinicCore {
    // =========================================================================
    // Doctor Operations
    // =========================================================================

    /// Add a new, available doctor.
    pub fn add_doctor(
        &self,
        name: String,
        specialty: String,
        contact: Option<String>,
    ) -> Result<FfiDoctor, ClinicError> {
        let db = self.db.lock()?;
        let mut doctor = Doctor::new(name, specialty);
        doctor.contact = contact;
        db.insert_doctor(&doctor)?;
        Ok(doctor.into())
    }

    /// List all doctors.
    pub fn list_doctors(&self) -> Result<Vec<FfiDoctor>, ClinicError> {
        let db = self.db.lock()?;
        let doctors = db.list_doctors()?;
        Ok(doctors.into_iter().map(|d| d.into()).collect())
    }

    /// Edit a doctor's details and availability.
    pub fn update_doctor(&self, doctor: FfiDoctor) -> Result<FfiDoctor, ClinicError> {
        let db = self.db.lock()?;
        let mut record = db
            .get_doctor(&doctor.id)?
            .ok_or_else(|| ClinicError::NotFound(format!("doctor {}", doctor.id)))?;
        record.name = doctor.name;
        record.specialty = doctor.specialty;
        record.contact = doctor.contact;
        record.is_available = doctor.is_available;
        db.update_doctor(&record)?;
        Ok(record.into())
    }

    /// Toggle whether a doctor takes new bookings.
    pub fn set_doctor_availability(
        &self,
        doctor_id: String,
        is_available: bool,
    ) -> Result<bool, ClinicError> {
        let db = self.db.lock()?;
        Ok(db.set_doctor_availability(&doctor_id, is_available)?)
    }

    /// Remove a doctor; with bookings, only if `delete_appointments` is set.
    pub fn remove_doctor(
        &self,
        doctor_id: String,
        delete_appointments: bool,
    ) -> Result<bool, ClinicError> {
        let db = self.db.lock()?;
        Ok(db.remove_doctor(&doctor_id, delete_appointments)?)
    }

    /// Number of appointments booked against a doctor.
    pub fn doctor_appointment_count(&self, doctor_id: String) -> Result<u64, ClinicError> {
        let db = self.db.lock()?;
        Ok(Scheduler::new(&*db).doctor_appointment_count(&doctor_id)?)
    }

    // =========================================================================
    // Service Operations
    // =========================================================================

    /// Add or update a service. An empty id creates a new one.
    pub fn upsert_service(&self, service: FfiService) -> Result<FfiService, ClinicError> {
        let db = self.db.lock()?;
        let mut record = Service::new(service.name, service.price);
        if !service.id.is_empty() {
            record.id = service.id;
        }
        record.description = service.description;
        db.upsert_service(&record)?;
        Ok(record.into())
    }

    /// List all services.
    pub fn list_services(&self) -> Result<Vec<FfiService>, ClinicError> {
        let db = self.db.lock()?;
        let services = db.list_services()?;
        Ok(services.into_iter().map(|s| s.into()).collect())
    }

    /// Delete a service and its appointments.
    pub fn delete_service(&self, service_id: String) -> Result<bool, ClinicError> {
        let db = self.db.lock()?;
        Ok(db.delete_service(&service_id)?)
    }

    // =========================================================================
    // Patient Operations
    // =========================================================================

    /// Create a new patient with a chart for their age.
    pub fn create_patient(
        &self,
        actor: String,
        patient: FfiNewPatient,
    ) -> Result<FfiPatient, ClinicError> {
        let db = self.db.lock()?;
        let imported_chart = patient
            .chart_json
            .as_deref()
            .map(Chart::from_json)
            .transpose()
            .map_err(|e| ClinicError::InvalidInput(format!("Invalid chart JSON: {}", e)))?;
        let new_patient = NewPatient {
            first_name: patient.first_name,
            last_name: patient.last_name,
            age: patient.age,
            category: parse_field(&patient.category)?,
            contact: patient.contact,
            notes: patient.notes,
        };

        let created = ChartManager::new(&*db).create_patient(
            &RequestContext::new(actor),
            new_patient,
            imported_chart,
        )?;
        Ok(created.into())
    }

    /// Get a patient by ID.
    pub fn get_patient(&self, patient_id: String) -> Result<Option<FfiPatient>, ClinicError> {
        let db = self.db.lock()?;
        let patient = db.get_patient(&patient_id)?;
        Ok(patient.map(|p| p.into()))
    }

    /// List all patients by last name, then first name.
    pub fn list_patients(&self) -> Result<Vec<FfiPatient>, ClinicError> {
        let db = self.db.lock()?;
        let patients = db.list_patients()?;
        Ok(patients.into_iter().map(|p| p.into()).collect())
    }

    /// Search patients by name.
    pub fn search_patients(&self, query: String, limit: u32) -> Result<Vec<FfiPatient>, ClinicError> {
        let db = self.db.lock()?;
        let patients = db.search_patients(&query, limit as usize)?;
        Ok(patients.into_iter().map(|p| p.into()).collect())
    }

    /// Update a patient, migrating the chart if the age crosses a bracket.
    pub fn update_patient(
        &self,
        actor: String,
        patient_id: String,
        update: FfiPatientUpdate,
    ) -> Result<FfiPatient, ClinicError> {
        let db = self.db.lock()?;
        let update = PatientUpdate {
            first_name: update.first_name,
            last_name: update.last_name,
            age: update.age,
            category: update.category.as_deref().map(parse_field).transpose()?,
            contact: update.contact,
            notes: update.notes,
        };
        let patient =
            ChartManager::new(&*db).update_patient(&RequestContext::new(actor), &patient_id, update)?;
        Ok(patient.into())
    }

    /// Record one tooth on a patient's chart.
    pub fn set_patient_site(
        &self,
        actor: String,
        patient_id: String,
        site_id: String,
        status: String,
        notes: String,
        present: bool,
    ) -> Result<FfiPatient, ClinicError> {
        let db = self.db.lock()?;
        let status: SiteStatus = parse_field(&status)?;
        let patient = ChartManager::new(&*db).set_patient_site(
            &RequestContext::new(actor),
            &patient_id,
            &site_id,
            status,
            notes,
            present,
        )?;
        Ok(patient.into())
    }

    /// Delete a patient and their appointments.
    pub fn delete_patient(&self, patient_id: String) -> Result<bool, ClinicError> {
        let db = self.db.lock()?;
        Ok(db.delete_patient(&patient_id)?)
    }

    // =========================================================================
    // Scheduling Operations
    // =========================================================================

    /// Book an appointment.
    pub fn create_appointment(
        &self,
        actor: String,
        request: FfiNewAppointment,
    ) -> Result<FfiAppointment, ClinicError> {
        let db = self.db.lock()?;
        let mut new_appointment = NewAppointment::new(
            request.patient_id,
            request.doctor_id,
            request.service_id,
            parse_time(&request.start)?,
            parse_time(&request.end)?,
        );
        if let Some(status) = request.status {
            new_appointment.status = parse_field(&status)?;
        }
        new_appointment.notes = request.notes.unwrap_or_default();

        let appointment = self
            .scheduler(&db)
            .create_appointment(&RequestContext::new(actor), new_appointment)?;
        Ok(appointment.into())
    }

    /// Get an appointment by ID.
    pub fn get_appointment(&self, appointment_id: String) -> Result<Option<FfiAppointment>, ClinicError> {
        let db = self.db.lock()?;
        let appointment = db.get_appointment(&appointment_id)?;
        Ok(appointment.map(|a| a.into()))
    }

    /// List appointments matching a filter, ordered by start time.
    pub fn list_appointments(
        &self,
        filter: FfiAppointmentFilter,
    ) -> Result<Vec<FfiAppointment>, ClinicError> {
        let db = self.db.lock()?;
        let filter = AppointmentFilter {
            doctor_id: filter.doctor_id,
            from: filter.from.as_deref().map(parse_time).transpose()?,
            to: filter.to.as_deref().map(parse_time).transpose()?,
            status: filter.status.as_deref().map(parse_field).transpose()?,
            is_completed: filter.is_completed,
        };
        let appointments = self.scheduler(&db).list_appointments(&filter)?;
        Ok(appointments.into_iter().map(|a| a.into()).collect())
    }

    /// A patient's appointments, newest first.
    pub fn list_patient_appointments(
        &self,
        patient_id: String,
    ) -> Result<Vec<FfiAppointment>, ClinicError> {
        let db = self.db.lock()?;
        let appointments = self.scheduler(&db).list_patient_appointments(&patient_id)?;
        Ok(appointments.into_iter().map(|a| a.into()).collect())
    }

    /// Suggest an available doctor for a service name.
    pub fn suggest_doctor(
        &self,
        actor: String,
        service_name: String,
    ) -> Result<Option<FfiDoctor>, ClinicError> {
        let db = self.db.lock()?;
        let doctor = self
            .scheduler(&db)
            .auto_assign_resource(&RequestContext::new(actor), &service_name)?;
        Ok(doctor.map(|d| d.into()))
    }

    /// Suggest an available doctor for a catalog service.
    pub fn suggest_doctor_for_service(
        &self,
        actor: String,
        service_id: String,
    ) -> Result<Option<FfiDoctor>, ClinicError> {
        let db = self.db.lock()?;
        let doctor = self
            .scheduler(&db)
            .auto_assign_for_service(&RequestContext::new(actor), &service_id)?;
        Ok(doctor.map(|d| d.into()))
    }

    /// Change an appointment's status.
    pub fn set_appointment_status(
        &self,
        actor: String,
        appointment_id: String,
        status: String,
    ) -> Result<FfiAppointment, ClinicError> {
        let db = self.db.lock()?;
        let appointment = self.scheduler(&db).set_status(
            &RequestContext::new(actor),
            &appointment_id,
            parse_field(&status)?,
        )?;
        Ok(appointment.into())
    }

    /// Move an appointment to a new slot and optionally a new doctor.
    pub fn reschedule_appointment(
        &self,
        actor: String,
        appointment_id: String,
        doctor_id: Option<String>,
        start: String,
        end: String,
    ) -> Result<FfiAppointment, ClinicError> {
        let db = self.db.lock()?;
        let appointment = self.scheduler(&db).reschedule_appointment(
            &RequestContext::new(actor),
            &appointment_id,
            doctor_id.as_deref(),
            parse_time(&start)?,
            parse_time(&end)?,
        )?;
        Ok(appointment.into())
    }

    /// Mark an appointment completed and record its payment.
    pub fn complete_appointment(
        &self,
        actor: String,
        appointment_id: String,
        payment_status: String,
        amount_paid: f64,
    ) -> Result<FfiPaymentOutcome, ClinicError> {
        let db = self.db.lock()?;
        let outcome = self.scheduler(&db).complete_appointment(
            &RequestContext::new(actor),
            &appointment_id,
            parse_field(&payment_status)?,
            amount_paid,
        )?;
        Ok(outcome.into())
    }

    /// Record a payment.
    pub fn update_payment(
        &self,
        actor: String,
        appointment_id: String,
        payment_status: String,
        amount_paid: f64,
    ) -> Result<FfiPaymentOutcome, ClinicError> {
        let db = self.db.lock()?;
        let outcome = self.scheduler(&db).update_payment(
            &RequestContext::new(actor),
            &appointment_id,
            parse_field(&payment_status)?,
            amount_paid,
        )?;
        Ok(outcome.into())
    }

    /// Complete every pending appointment of a patient as paid.
    pub fn finish_treatment(&self, actor: String, patient_id: String) -> Result<u32, ClinicError> {
        let db = self.db.lock()?;
        Ok(self
            .scheduler(&db)
            .finish_treatment(&RequestContext::new(actor), &patient_id)?)
    }

    /// Hard-delete an appointment.
    pub fn delete_appointment(
        &self,
        actor: String,
        appointment_id: String,
    ) -> Result<bool, ClinicError> {
        let db = self.db.lock()?;
        Ok(self
            .scheduler(&db)
            .delete_appointment(&RequestContext::new(actor), &appointment_id)?)
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe doctor.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiDoctor {
    pub id: String,
    pub name: String,
    pub specialty: String,
    pub contact: Option<String>,
    pub is_available: bool,
}

impl From<Doctor> for FfiDoctor {
    fn from(doctor: Doctor) -> Self {
        Self {
            id: doctor.id,
            name: doctor.name,
            specialty: doctor.specialty,
            contact: doctor.contact,
            is_available: doctor.is_available,
        }
    }
}

/// FFI-safe service.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiService {
    /// Empty for a new service
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
}

impl From<Service> for FfiService {
    fn from(service: Service) -> Self {
        Self {
            id: service.id,
            name: service.name,
            description: service.description,
            price: service.price,
        }
    }
}

/// FFI-safe new patient.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiNewPatient {
    pub first_name: String,
    pub last_name: String,
    pub age: u32,
    /// "adult" or "pediatric"
    pub category: String,
    pub contact: Option<String>,
    pub notes: Option<String>,
    /// Chart carried over from another system, as JSON
    pub chart_json: Option<String>,
}

/// FFI-safe partial patient update.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPatientUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub age: Option<u32>,
    pub category: Option<String>,
    pub contact: Option<String>,
    pub notes: Option<String>,
}

/// FFI-safe chart cell.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiChartEntry {
    pub site_id: String,
    pub label: String,
    /// "primary" or "permanent"
    pub dentition: String,
    pub status: String,
    pub notes: String,
    pub present: bool,
}

impl From<chart::ChartGridEntry> for FfiChartEntry {
    fn from(entry: chart::ChartGridEntry) -> Self {
        let dentition = match entry.dentition {
            anatomy::Dentition::Primary => "primary",
            anatomy::Dentition::Permanent => "permanent",
        };
        Self {
            site_id: entry.site_id.to_string(),
            label: entry.label.to_string(),
            dentition: dentition.to_string(),
            status: entry.record.status.to_string(),
            notes: entry.record.notes,
            present: entry.record.present,
        }
    }
}

/// FFI-safe patient.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPatient {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub age: u32,
    pub category: String,
    pub contact: Option<String>,
    pub notes: Option<String>,
    /// Chart in display order
    pub chart: Vec<FfiChartEntry>,
}

impl From<Patient> for FfiPatient {
    fn from(patient: Patient) -> Self {
        let chart = chart::chart_grid(&patient)
            .into_iter()
            .map(|e| e.into())
            .collect();
        Self {
            id: patient.id,
            first_name: patient.first_name,
            last_name: patient.last_name,
            age: patient.age,
            category: patient.category.to_string(),
            contact: patient.contact,
            notes: patient.notes,
            chart,
        }
    }
}

/// FFI-safe booking request. Times are ISO 8601 local date-times.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiNewAppointment {
    pub patient_id: String,
    pub doctor_id: String,
    pub service_id: String,
    pub start: String,
    pub end: String,
    /// "scheduled" (default) or "confirmed"
    pub status: Option<String>,
    pub notes: Option<String>,
}

/// FFI-safe appointment filter.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiAppointmentFilter {
    pub doctor_id: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub status: Option<String>,
    pub is_completed: Option<bool>,
}

/// FFI-safe appointment.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiAppointment {
    pub id: String,
    pub patient_id: String,
    pub doctor_id: String,
    pub service_id: String,
    pub start: String,
    pub end: String,
    pub status: String,
    pub notes: String,
    pub is_completed: bool,
    pub payment_status: String,
    pub amount_paid: f64,
    pub total_amount: f64,
    pub balance_due: f64,
}

impl From<Appointment> for FfiAppointment {
    fn from(appointment: Appointment) -> Self {
        Self {
            balance_due: appointment.balance_due(),
            start: format_time(appointment.slot.start()),
            end: format_time(appointment.slot.end()),
            id: appointment.id,
            patient_id: appointment.patient_id,
            doctor_id: appointment.doctor_id,
            service_id: appointment.service_id,
            status: appointment.status.to_string(),
            notes: appointment.notes,
            is_completed: appointment.is_completed,
            payment_status: appointment.payment_status.to_string(),
            amount_paid: appointment.amount_paid,
            total_amount: appointment.total_amount,
        }
    }
}

/// FFI-safe payment result.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPaymentOutcome {
    pub appointment: FfiAppointment,
    /// Amount paid beyond the booked total, if any
    pub overpaid_by: Option<f64>,
}

impl From<PaymentOutcome> for FfiPaymentOutcome {
    fn from(outcome: PaymentOutcome) -> Self {
        let overpaid_by = outcome.warnings.iter().find_map(|w| match w {
            BookingWarning::Overpayment {
                amount_paid,
                total_amount,
            } => Some(amount_paid - total_amount),
        });
        Self {
            appointment: outcome.appointment.into(),
            overpaid_by,
        }
    }
}
