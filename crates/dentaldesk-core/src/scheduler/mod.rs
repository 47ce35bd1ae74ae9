//! Appointment scheduler.
//!
//! Books service appointments against doctors without double-booking:
//!
//! ```text
//! request → interval check → availability gate → price lookup
//!                                                     │
//!                              [atomic: overlap check + write]
//!                                                     │
//!                                         booking (price frozen)
//! ```
//!
//! Also owns the status state machine, rescheduling, payments, and
//! specialty-based auto-assignment.

mod assignment;
mod payment;

pub use assignment::*;
pub use payment::*;

use chrono::{Datelike, NaiveDateTime};
use rand::Rng;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::config::ClinicConfig;
use crate::context::RequestContext;
use crate::models::{Appointment, AppointmentStatus, Doctor, TimeSlot};
use crate::store::{
    AppointmentFilter, AppointmentStore, PatientStore, ResourceDirectory, ServiceCatalog,
    SlotWrite, StoreError,
};

/// Scheduler errors.
#[derive(Error, Debug)]
pub enum SchedulerError {
    #[error("Doctor unavailable: {0}")]
    ResourceUnavailable(String),

    #[error("Slot overlaps appointment {conflicting_id}")]
    SchedulingConflict { conflicting_id: String },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}

pub type SchedulerResult<T> = Result<T, SchedulerError>;

/// Everything the scheduler reads and writes.
pub trait ClinicStore: ResourceDirectory + ServiceCatalog + AppointmentStore + PatientStore {}

impl<T> ClinicStore for T where T: ResourceDirectory + ServiceCatalog + AppointmentStore + PatientStore
{}

/// A booking request.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAppointment {
    pub patient_id: String,
    pub doctor_id: String,
    pub service_id: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    /// `Scheduled` or `Confirmed`
    pub status: AppointmentStatus,
    pub notes: String,
}

impl NewAppointment {
    /// A scheduled booking with no notes.
    pub fn new(
        patient_id: impl Into<String>,
        doctor_id: impl Into<String>,
        service_id: impl Into<String>,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Self {
        Self {
            patient_id: patient_id.into(),
            doctor_id: doctor_id.into(),
            service_id: service_id.into(),
            start,
            end,
            status: AppointmentStatus::Scheduled,
            notes: String::new(),
        }
    }
}

/// Years that store as fixed-width text, so stored order is time order.
const STORABLE_YEARS: std::ops::RangeInclusive<i32> = 0..=9999;

fn slot(start: NaiveDateTime, end: NaiveDateTime) -> SchedulerResult<TimeSlot> {
    for instant in [start, end] {
        if !STORABLE_YEARS.contains(&instant.year()) {
            return Err(SchedulerError::ValidationError(format!(
                "{} is outside years 0000-9999",
                instant
            )));
        }
    }
    TimeSlot::new(start, end).ok_or_else(|| {
        SchedulerError::ValidationError(format!("Start {} must be before end {}", start, end))
    })
}

fn slot_taken(conflict: Appointment) -> SchedulerError {
    warn!(
        conflicting_id = %conflict.id,
        doctor_id = %conflict.doctor_id,
        "Slot already booked"
    );
    SchedulerError::SchedulingConflict {
        conflicting_id: conflict.id,
    }
}

/// Scheduler over a [`ClinicStore`].
pub struct Scheduler<'a, S> {
    store: &'a S,
    unify_completion_status: bool,
}

impl<'a, S: ClinicStore> Scheduler<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            unify_completion_status: false,
        }
    }

    pub fn with_config(store: &'a S, config: &ClinicConfig) -> Self {
        Self {
            store,
            unify_completion_status: config.unify_completion_status,
        }
    }

    /// Book an appointment.
    ///
    /// The doctor must exist and be available now. The service's current
    /// price becomes the booking's total. The overlap check and the insert
    /// are atomic in the store.
    #[instrument(skip_all, fields(actor = %ctx.actor, request_id = %ctx.request_id, doctor_id = %request.doctor_id))]
    pub fn create_appointment(
        &self,
        ctx: &RequestContext,
        request: NewAppointment,
    ) -> SchedulerResult<Appointment> {
        let slot = slot(request.start, request.end)?;
        if !request.status.is_active() {
            return Err(SchedulerError::ValidationError(format!(
                "New appointments cannot be {}",
                request.status
            )));
        }

        if self.store.get_patient(&request.patient_id)?.is_none() {
            return Err(SchedulerError::NotFound(format!(
                "patient {}",
                request.patient_id
            )));
        }

        let doctor = self.available_doctor(&request.doctor_id)?;

        let service = self
            .store
            .get_service(&request.service_id)?
            .ok_or_else(|| {
                SchedulerError::ValidationError(format!("Unknown service {}", request.service_id))
            })?;

        let mut appointment = Appointment::new(
            request.patient_id,
            doctor.id,
            service.id,
            slot,
            service.price,
        );
        appointment.status = request.status;
        appointment.notes = request.notes;

        self.save_or_conflict(&appointment)?;
        info!(
            appointment_id = %appointment.id,
            start = %appointment.slot.start(),
            end = %appointment.slot.end(),
            total = appointment.total_amount,
            "Booked appointment"
        );
        Ok(appointment)
    }

    /// Get an appointment by ID.
    pub fn get_appointment(&self, appointment_id: &str) -> SchedulerResult<Appointment> {
        self.store
            .get_appointment(appointment_id)?
            .ok_or_else(|| SchedulerError::NotFound(format!("appointment {}", appointment_id)))
    }

    /// Appointments matching `filter`, ordered by start time.
    pub fn list_appointments(&self, filter: &AppointmentFilter) -> SchedulerResult<Vec<Appointment>> {
        Ok(self.store.query_appointments(filter)?)
    }

    /// A patient's appointments, newest first.
    pub fn list_patient_appointments(&self, patient_id: &str) -> SchedulerResult<Vec<Appointment>> {
        Ok(self.store.list_appointments_for_patient(patient_id)?)
    }

    /// Number of appointments (any status) booked against a doctor.
    pub fn doctor_appointment_count(&self, doctor_id: &str) -> SchedulerResult<u64> {
        Ok(self.store.count_appointments_for_doctor(doctor_id)?)
    }

    /// Suggest an available doctor for a service name. Advisory only.
    #[instrument(skip_all, fields(actor = %ctx.actor, request_id = %ctx.request_id, service = %service_name))]
    pub fn auto_assign_resource(
        &self,
        ctx: &RequestContext,
        service_name: &str,
    ) -> SchedulerResult<Option<Doctor>> {
        self.auto_assign_resource_with(service_name, &mut rand::thread_rng())
    }

    /// [`Self::auto_assign_resource`] with a caller-supplied random source.
    pub fn auto_assign_resource_with<R: Rng + ?Sized>(
        &self,
        service_name: &str,
        rng: &mut R,
    ) -> SchedulerResult<Option<Doctor>> {
        let specialty = specialty_for_service(service_name);
        let doctors = self.store.list_available_doctors()?;
        let chosen = choose_doctor(&doctors, specialty, rng).cloned();

        match &chosen {
            Some(doctor) => debug!(specialty, doctor_id = %doctor.id, "Suggested doctor"),
            None => debug!(specialty, "No available doctor for specialty"),
        }
        Ok(chosen)
    }

    /// Suggest a doctor for a catalog service by ID.
    pub fn auto_assign_for_service(
        &self,
        ctx: &RequestContext,
        service_id: &str,
    ) -> SchedulerResult<Option<Doctor>> {
        let service = self
            .store
            .get_service(service_id)?
            .ok_or_else(|| SchedulerError::ValidationError(format!("Unknown service {}", service_id)))?;
        self.auto_assign_resource(ctx, &service.name)
    }

    /// Change an appointment's lifecycle status.
    ///
    /// `Scheduled` and `Confirmed` switch freely and anything can be
    /// cancelled. Cancelled appointments stay cancelled, and `Completed` is
    /// never set here.
    #[instrument(skip_all, fields(actor = %ctx.actor, request_id = %ctx.request_id, appointment_id = %appointment_id))]
    pub fn set_status(
        &self,
        ctx: &RequestContext,
        appointment_id: &str,
        status: AppointmentStatus,
    ) -> SchedulerResult<Appointment> {
        if status == AppointmentStatus::Completed {
            return Err(SchedulerError::ValidationError(
                "Use complete_appointment to complete an appointment".into(),
            ));
        }

        let updated = self
            .store
            .modify_appointment(appointment_id, |appointment| {
                if !appointment.status.can_transition_to(status) {
                    return Err(SchedulerError::ValidationError(format!(
                        "Cannot change status from {} to {}",
                        appointment.status, status
                    )));
                }
                appointment.status = status;
                Ok(())
            })?
            .ok_or_else(|| SchedulerError::NotFound(format!("appointment {}", appointment_id)))?;

        info!(%status, "Changed appointment status");
        Ok(updated)
    }

    /// Move an active appointment to a new slot and, optionally, a new
    /// doctor. The price stays frozen.
    #[instrument(skip_all, fields(actor = %ctx.actor, request_id = %ctx.request_id, appointment_id = %appointment_id))]
    pub fn reschedule_appointment(
        &self,
        ctx: &RequestContext,
        appointment_id: &str,
        doctor_id: Option<&str>,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> SchedulerResult<Appointment> {
        let slot = slot(start, end)?;

        let outcome = self
            .store
            .modify_appointment_if_free(appointment_id, |appointment| {
                if !appointment.is_active() {
                    return Err(SchedulerError::ValidationError(format!(
                        "Cannot reschedule a {} appointment",
                        appointment.status
                    )));
                }
                let doctor =
                    self.available_doctor(doctor_id.unwrap_or(appointment.doctor_id.as_str()))?;
                appointment.doctor_id = doctor.id;
                appointment.slot = slot;
                Ok(())
            })?
            .ok_or_else(|| SchedulerError::NotFound(format!("appointment {}", appointment_id)))?;

        let appointment = match outcome {
            SlotWrite::Saved(appointment) => appointment,
            SlotWrite::Conflict(conflict) => return Err(slot_taken(conflict)),
        };
        info!(
            doctor_id = %appointment.doctor_id,
            start = %appointment.slot.start(),
            end = %appointment.slot.end(),
            "Rescheduled appointment"
        );
        Ok(appointment)
    }

    /// Hard-delete an appointment. Returns whether one was removed.
    #[instrument(skip_all, fields(actor = %ctx.actor, request_id = %ctx.request_id, appointment_id = %appointment_id))]
    pub fn delete_appointment(
        &self,
        ctx: &RequestContext,
        appointment_id: &str,
    ) -> SchedulerResult<bool> {
        let removed = self.store.delete_appointment(appointment_id)?;
        if removed {
            info!("Deleted appointment");
        }
        Ok(removed)
    }

    fn available_doctor(&self, doctor_id: &str) -> SchedulerResult<Doctor> {
        match self.store.get_doctor(doctor_id)? {
            Some(doctor) if doctor.is_available => Ok(doctor),
            Some(_) => Err(SchedulerError::ResourceUnavailable(format!(
                "{} is not taking appointments",
                doctor_id
            ))),
            None => Err(SchedulerError::ResourceUnavailable(format!(
                "{} does not exist",
                doctor_id
            ))),
        }
    }

    fn save_or_conflict(&self, appointment: &Appointment) -> SchedulerResult<()> {
        match self.store.save_if_free(appointment)? {
            Some(conflict) => Err(slot_taken(conflict)),
            None => Ok(()),
        }
    }

}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::{NaiveDate, NaiveDateTime};

    use crate::db::Database;
    use crate::models::{Doctor, Patient, PatientCategory, Service};

    pub fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 10)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    pub struct Fixture {
        pub db: Database,
        pub patient: Patient,
        pub doctor: Doctor,
        pub service: Service,
    }

    pub fn fixture() -> Fixture {
        let db = Database::open_in_memory().unwrap();

        let patient = Patient::new("Carlo".into(), "Mendoza".into(), 34, PatientCategory::Adult);
        let doctor = Doctor::new("Dr. Jose Cruz".into(), "General Dentistry".into());
        let service = Service::new("Cleaning".into(), 800.0);

        db.insert_patient(&patient).unwrap();
        db.insert_doctor(&doctor).unwrap();
        db.upsert_service(&service).unwrap();

        Fixture {
            db,
            patient,
            doctor,
            service,
        }
    }
}
