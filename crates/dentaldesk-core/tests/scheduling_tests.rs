//! Scheduler integration tests.

use std::cell::RefCell;
use std::sync::{Arc, Barrier};
use std::thread;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use dentaldesk_core::db::Database;
use dentaldesk_core::models::{
    Appointment, AppointmentStatus, Doctor, Patient, PatientCategory, PaymentStatus, Service,
};
use dentaldesk_core::store::{
    AppointmentFilter, AppointmentStore, PatientStore, ResourceDirectory, ServiceCatalog,
    SlotWrite, StoreError, StoreResult,
};
use dentaldesk_core::{
    BookingWarning, ClinicConfig, NewAppointment, RequestContext, Scheduler, SchedulerError,
};
use proptest::prelude::*;

fn at(hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 6, 2)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

struct Clinic {
    patient: Patient,
    doctor: Doctor,
    service: Service,
}

fn seed(db: &Database) -> Clinic {
    let patient = Patient::new("Rosa".into(), "Villanueva".into(), 41, PatientCategory::Adult);
    let doctor = Doctor::new("Dr. Maria Santos".into(), "General Dentistry".into());
    let service = Service::new("Dental Cleaning".into(), 1000.0);
    db.insert_patient(&patient).unwrap();
    db.insert_doctor(&doctor).unwrap();
    db.upsert_service(&service).unwrap();
    Clinic {
        patient,
        doctor,
        service,
    }
}

fn request(clinic: &Clinic, start: NaiveDateTime, end: NaiveDateTime) -> NewAppointment {
    NewAppointment::new(
        &clinic.patient.id,
        &clinic.doctor.id,
        &clinic.service.id,
        start,
        end,
    )
}

#[test]
fn test_half_hour_overlap_scenario() {
    let db = Database::open_in_memory().unwrap();
    let clinic = seed(&db);
    let scheduler = Scheduler::new(&db);
    let ctx = RequestContext::new("front-desk");

    let first = scheduler
        .create_appointment(&ctx, request(&clinic, at(9, 0), at(9, 30)))
        .unwrap();

    let err = scheduler
        .create_appointment(&ctx, request(&clinic, at(9, 15), at(9, 45)))
        .unwrap_err();
    assert!(
        matches!(&err, SchedulerError::SchedulingConflict { conflicting_id } if *conflicting_id == first.id)
    );

    scheduler
        .create_appointment(&ctx, request(&clinic, at(9, 30), at(10, 0)))
        .unwrap();

    let booked = scheduler
        .list_appointments(&AppointmentFilter::for_doctor(&clinic.doctor.id))
        .unwrap();
    assert_eq!(booked.len(), 2);
    assert_eq!(booked[0].slot.start(), at(9, 0));
    assert_eq!(booked[1].slot.start(), at(9, 30));
}

#[test]
fn test_other_doctor_same_slot() {
    let db = Database::open_in_memory().unwrap();
    let clinic = seed(&db);
    let scheduler = Scheduler::new(&db);
    let ctx = RequestContext::system();

    let other = Doctor::new("Dr. Paolo Lim".into(), "General Dentistry".into());
    db.insert_doctor(&other).unwrap();

    scheduler
        .create_appointment(&ctx, request(&clinic, at(9, 0), at(9, 30)))
        .unwrap();

    let mut same_slot = request(&clinic, at(9, 0), at(9, 30));
    same_slot.doctor_id = other.id.clone();
    assert!(scheduler.create_appointment(&ctx, same_slot).is_ok());
}

#[test]
fn test_availability_checked_only_at_booking() {
    let db = Database::open_in_memory().unwrap();
    let clinic = seed(&db);
    let scheduler = Scheduler::new(&db);
    let ctx = RequestContext::system();

    let booked = scheduler
        .create_appointment(&ctx, request(&clinic, at(9, 0), at(9, 30)))
        .unwrap();
    db.set_doctor_availability(&clinic.doctor.id, false).unwrap();

    // Existing booking survives and can still be paid
    let outcome = scheduler
        .update_payment(&ctx, &booked.id, PaymentStatus::Partial, 500.0)
        .unwrap();
    assert_eq!(outcome.appointment.amount_paid, 500.0);

    assert!(matches!(
        scheduler.create_appointment(&ctx, request(&clinic, at(11, 0), at(11, 30))),
        Err(SchedulerError::ResourceUnavailable(_))
    ));
}

#[test]
fn test_pediatric_checkup_assignment() {
    let db = Database::open_in_memory().unwrap();
    seed(&db);
    let scheduler = Scheduler::new(&db);
    let ctx = RequestContext::system();

    assert!(scheduler
        .auto_assign_resource(&ctx, "Pediatric Checkup")
        .unwrap()
        .is_none());

    let kids_a = Doctor::new("Dr. Ana Reyes".into(), "Pediatric Dentistry".into());
    let kids_b = Doctor::new("Dr. Ben Torres".into(), "Pediatric Dentistry".into());
    let mut kids_away = Doctor::new("Dr. Cora Dizon".into(), "Pediatric Dentistry".into());
    kids_away.is_available = false;
    for doctor in [&kids_a, &kids_b, &kids_away] {
        db.insert_doctor(doctor).unwrap();
    }

    for _ in 0..25 {
        let chosen = scheduler
            .auto_assign_resource(&ctx, "Pediatric Checkup")
            .unwrap()
            .unwrap();
        assert!(chosen.id == kids_a.id || chosen.id == kids_b.id);
        assert!(chosen.specialty.contains("Pediatric"));
    }
}

#[test]
fn test_price_frozen_and_overpayment() {
    let db = Database::open_in_memory().unwrap();
    let clinic = seed(&db);
    let scheduler = Scheduler::new(&db);
    let ctx = RequestContext::system();

    let booked = scheduler
        .create_appointment(&ctx, request(&clinic, at(14, 0), at(15, 0)))
        .unwrap();

    let mut repriced = clinic.service.clone();
    repriced.price = 1500.0;
    db.upsert_service(&repriced).unwrap();

    let outcome = scheduler
        .complete_appointment(&ctx, &booked.id, PaymentStatus::Paid, 1200.0)
        .unwrap();
    assert_eq!(outcome.appointment.total_amount, 1000.0);
    assert_eq!(
        outcome.warnings,
        vec![BookingWarning::Overpayment {
            amount_paid: 1200.0,
            total_amount: 1000.0,
        }]
    );
}

#[test]
fn test_unified_completion_frees_slot_filter() {
    let db = Database::open_in_memory().unwrap();
    let clinic = seed(&db);
    let config = ClinicConfig {
        unify_completion_status: true,
        ..ClinicConfig::default()
    };
    let scheduler = Scheduler::with_config(&db, &config);
    let ctx = RequestContext::system();

    let booked = scheduler
        .create_appointment(&ctx, request(&clinic, at(9, 0), at(9, 30)))
        .unwrap();
    scheduler
        .complete_appointment(&ctx, &booked.id, PaymentStatus::Paid, 1000.0)
        .unwrap();

    let done = scheduler
        .list_appointments(&AppointmentFilter {
            is_completed: Some(true),
            ..AppointmentFilter::default()
        })
        .unwrap();
    assert_eq!(done.len(), 1);
    assert_eq!(done[0].status.as_str(), "completed");
}

#[test]
fn test_concurrent_booking_single_winner() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clinic.db");

    let setup = Database::open(&path).unwrap();
    let clinic = seed(&setup);
    drop(setup);

    let barrier = Arc::new(Barrier::new(2));
    let handles: Vec<_> = (0..2)
        .map(|_| {
            let db = Database::open(&path).unwrap();
            let barrier = Arc::clone(&barrier);
            let booking = request(&clinic, at(9, 0), at(9, 30));
            thread::spawn(move || {
                let scheduler = Scheduler::new(&db);
                barrier.wait();
                scheduler.create_appointment(&RequestContext::system(), booking)
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let wins = results.iter().filter(|r| r.is_ok()).count();
    let conflicts = results
        .iter()
        .filter(|r| matches!(r, Err(SchedulerError::SchedulingConflict { .. })))
        .count();
    assert_eq!(wins, 1);
    assert_eq!(conflicts, 1);

    let db = Database::open(&path).unwrap();
    let stored = db
        .list_appointments(&AppointmentFilter::for_doctor(&clinic.doctor.id))
        .unwrap();
    assert_eq!(stored.len(), 1);
}

/// Store that lets another connection write just before its first
/// appointment access, or right after a plain read.
struct RacingStore<'a> {
    db: &'a Database,
    other_writer: RefCell<Option<Box<dyn FnOnce() + 'a>>>,
}

impl<'a> RacingStore<'a> {
    fn new(db: &'a Database, other_writer: impl FnOnce() + 'a) -> Self {
        Self {
            db,
            other_writer: RefCell::new(Some(Box::new(other_writer))),
        }
    }

    fn race(&self) {
        let write = self.other_writer.borrow_mut().take();
        if let Some(write) = write {
            write();
        }
    }
}

impl ResourceDirectory for RacingStore<'_> {
    fn get_doctor(&self, doctor_id: &str) -> StoreResult<Option<Doctor>> {
        ResourceDirectory::get_doctor(self.db, doctor_id)
    }

    fn list_available_doctors(&self) -> StoreResult<Vec<Doctor>> {
        ResourceDirectory::list_available_doctors(self.db)
    }
}

impl ServiceCatalog for RacingStore<'_> {
    fn get_service(&self, service_id: &str) -> StoreResult<Option<Service>> {
        ServiceCatalog::get_service(self.db, service_id)
    }
}

impl PatientStore for RacingStore<'_> {
    fn insert_patient(&self, patient: &Patient) -> StoreResult<()> {
        PatientStore::insert_patient(self.db, patient)
    }

    fn get_patient(&self, patient_id: &str) -> StoreResult<Option<Patient>> {
        PatientStore::get_patient(self.db, patient_id)
    }

    fn modify_patient<F, E>(&self, patient_id: &str, f: F) -> Result<Option<Patient>, E>
    where
        F: FnOnce(&mut Patient) -> Result<(), E>,
        E: From<StoreError>,
    {
        PatientStore::modify_patient(self.db, patient_id, f)
    }
}

impl AppointmentStore for RacingStore<'_> {
    fn save_if_free(&self, appointment: &Appointment) -> StoreResult<Option<Appointment>> {
        self.race();
        AppointmentStore::save_if_free(self.db, appointment)
    }

    fn get_appointment(&self, appointment_id: &str) -> StoreResult<Option<Appointment>> {
        let read = AppointmentStore::get_appointment(self.db, appointment_id);
        self.race();
        read
    }

    fn modify_appointment<F, E>(&self, appointment_id: &str, f: F) -> Result<Option<Appointment>, E>
    where
        F: FnOnce(&mut Appointment) -> Result<(), E>,
        E: From<StoreError>,
    {
        self.race();
        AppointmentStore::modify_appointment(self.db, appointment_id, f)
    }

    fn modify_appointment_if_free<F, E>(
        &self,
        appointment_id: &str,
        f: F,
    ) -> Result<Option<SlotWrite>, E>
    where
        F: FnOnce(&mut Appointment) -> Result<(), E>,
        E: From<StoreError>,
    {
        self.race();
        AppointmentStore::modify_appointment_if_free(self.db, appointment_id, f)
    }

    fn modify_patient_appointments<F, E>(&self, patient_id: &str, f: F) -> Result<Vec<Appointment>, E>
    where
        F: FnMut(&mut Appointment) -> Result<bool, E>,
        E: From<StoreError>,
    {
        self.race();
        AppointmentStore::modify_patient_appointments(self.db, patient_id, f)
    }

    fn delete_appointment(&self, appointment_id: &str) -> StoreResult<bool> {
        AppointmentStore::delete_appointment(self.db, appointment_id)
    }

    fn query_appointments(&self, filter: &AppointmentFilter) -> StoreResult<Vec<Appointment>> {
        AppointmentStore::query_appointments(self.db, filter)
    }

    fn list_appointments_for_patient(&self, patient_id: &str) -> StoreResult<Vec<Appointment>> {
        let read = AppointmentStore::list_appointments_for_patient(self.db, patient_id);
        self.race();
        read
    }

    fn count_appointments_for_doctor(&self, doctor_id: &str) -> StoreResult<u64> {
        AppointmentStore::count_appointments_for_doctor(self.db, doctor_id)
    }
}

#[test]
fn test_reschedule_does_not_revive_concurrent_cancel() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clinic.db");
    let front_desk = Database::open(&path).unwrap();
    let cashier = Database::open(&path).unwrap();
    let clinic = seed(&front_desk);
    let ctx = RequestContext::new("front-desk");

    let booked = Scheduler::new(&front_desk)
        .create_appointment(&ctx, request(&clinic, at(9, 0), at(9, 30)))
        .unwrap();

    let store = RacingStore::new(&front_desk, || {
        let cashier_desk = Scheduler::new(&cashier);
        let ctx = RequestContext::new("cashier");
        cashier_desk
            .set_status(&ctx, &booked.id, AppointmentStatus::Cancelled)
            .unwrap();
        cashier_desk
            .update_payment(&ctx, &booked.id, PaymentStatus::Paid, 1000.0)
            .unwrap();
    });

    let result =
        Scheduler::new(&store).reschedule_appointment(&ctx, &booked.id, None, at(11, 0), at(11, 30));
    assert!(matches!(result, Err(SchedulerError::ValidationError(_))));

    let stored = cashier.get_appointment(&booked.id).unwrap().unwrap();
    assert_eq!(stored.status, AppointmentStatus::Cancelled);
    assert_eq!(stored.payment_status, PaymentStatus::Paid);
    assert_eq!(stored.amount_paid, 1000.0);
    assert_eq!(stored.slot.start(), at(9, 0));
}

#[test]
fn test_finish_treatment_skips_concurrent_cancel() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clinic.db");
    let front_desk = Database::open(&path).unwrap();
    let reception = Database::open(&path).unwrap();
    let clinic = seed(&front_desk);
    let ctx = RequestContext::new("front-desk");
    let scheduler = Scheduler::new(&front_desk);

    let kept = scheduler
        .create_appointment(&ctx, request(&clinic, at(9, 0), at(9, 30)))
        .unwrap();
    let dropped = scheduler
        .create_appointment(&ctx, request(&clinic, at(10, 0), at(10, 30)))
        .unwrap();

    let store = RacingStore::new(&front_desk, || {
        Scheduler::new(&reception)
            .set_status(&RequestContext::new("reception"), &dropped.id, AppointmentStatus::Cancelled)
            .unwrap();
    });

    let completed = Scheduler::new(&store)
        .finish_treatment(&ctx, &clinic.patient.id)
        .unwrap();
    assert_eq!(completed, 1);

    let kept = reception.get_appointment(&kept.id).unwrap().unwrap();
    assert!(kept.is_completed);
    assert_eq!(kept.amount_paid, 1000.0);

    let dropped = reception.get_appointment(&dropped.id).unwrap().unwrap();
    assert_eq!(dropped.status, AppointmentStatus::Cancelled);
    assert!(!dropped.is_completed);
    assert_eq!(dropped.payment_status, PaymentStatus::Pending);
    assert_eq!(dropped.amount_paid, 0.0);
}

fn interval() -> impl Strategy<Value = (NaiveDateTime, NaiveDateTime)> {
    (0i64..480, 1i64..90).prop_map(|(offset, len)| {
        let start = at(8, 0) + Duration::minutes(offset);
        (start, start + Duration::minutes(len))
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn second_booking_succeeds_iff_disjoint(a in interval(), b in interval()) {
        let db = Database::open_in_memory().unwrap();
        let clinic = seed(&db);
        let scheduler = Scheduler::new(&db);
        let ctx = RequestContext::system();

        scheduler.create_appointment(&ctx, request(&clinic, a.0, a.1)).unwrap();
        let second = scheduler.create_appointment(&ctx, request(&clinic, b.0, b.1));

        let disjoint = b.1 <= a.0 || b.0 >= a.1;
        prop_assert_eq!(second.is_ok(), disjoint);
        if !disjoint {
            let is_conflict = matches!(second, Err(SchedulerError::SchedulingConflict { .. }));
            prop_assert!(is_conflict);
        }
    }
}
