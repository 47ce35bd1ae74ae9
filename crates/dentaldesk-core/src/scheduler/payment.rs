//! Completion and payment tracking.

use serde::Serialize;
use tracing::{info, instrument, warn};

use super::{ClinicStore, Scheduler, SchedulerError, SchedulerResult};
use crate::context::RequestContext;
use crate::models::{is_valid_amount, Appointment, AppointmentStatus, PaymentStatus};

/// Non-fatal condition attached to a successful payment update.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BookingWarning {
    /// More was paid than the booking's frozen total.
    Overpayment { amount_paid: f64, total_amount: f64 },
}

/// Result of a completion or payment update.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentOutcome {
    pub appointment: Appointment,
    pub warnings: Vec<BookingWarning>,
}

impl PaymentOutcome {
    fn from_appointment(appointment: Appointment) -> Self {
        let warnings = match appointment.overpayment() {
            Some(excess) => {
                warn!(
                    appointment_id = %appointment.id,
                    amount_paid = appointment.amount_paid,
                    total_amount = appointment.total_amount,
                    excess,
                    "Payment exceeds appointment total"
                );
                vec![BookingWarning::Overpayment {
                    amount_paid: appointment.amount_paid,
                    total_amount: appointment.total_amount,
                }]
            }
            None => Vec::new(),
        };
        Self {
            appointment,
            warnings,
        }
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

fn validate_amount(amount_paid: f64) -> SchedulerResult<()> {
    if !is_valid_amount(amount_paid) {
        return Err(SchedulerError::ValidationError(format!(
            "Amount paid must be a non-negative number, got {}",
            amount_paid
        )));
    }
    Ok(())
}

impl<'a, S: ClinicStore> Scheduler<'a, S> {
    /// Mark an appointment completed and record its payment.
    ///
    /// Status is left alone unless completion status is unified in the
    /// config, in which case a non-cancelled appointment becomes
    /// `Completed`.
    #[instrument(skip_all, fields(actor = %ctx.actor, request_id = %ctx.request_id, appointment_id = %appointment_id))]
    pub fn complete_appointment(
        &self,
        ctx: &RequestContext,
        appointment_id: &str,
        payment_status: PaymentStatus,
        amount_paid: f64,
    ) -> SchedulerResult<PaymentOutcome> {
        validate_amount(amount_paid)?;
        let unify = self.unify_completion_status;

        let updated = self
            .store
            .modify_appointment(appointment_id, |appointment| {
                appointment.is_completed = true;
                appointment.payment_status = payment_status;
                appointment.amount_paid = amount_paid;
                if unify && appointment.status != AppointmentStatus::Cancelled {
                    appointment.status = AppointmentStatus::Completed;
                }
                Ok::<(), SchedulerError>(())
            })?
            .ok_or_else(|| SchedulerError::NotFound(format!("appointment {}", appointment_id)))?;

        info!(%payment_status, amount_paid, "Completed appointment");
        Ok(PaymentOutcome::from_appointment(updated))
    }

    /// Record a payment without touching completion.
    #[instrument(skip_all, fields(actor = %ctx.actor, request_id = %ctx.request_id, appointment_id = %appointment_id))]
    pub fn update_payment(
        &self,
        ctx: &RequestContext,
        appointment_id: &str,
        payment_status: PaymentStatus,
        amount_paid: f64,
    ) -> SchedulerResult<PaymentOutcome> {
        validate_amount(amount_paid)?;

        let updated = self
            .store
            .modify_appointment(appointment_id, |appointment| {
                appointment.payment_status = payment_status;
                appointment.amount_paid = amount_paid;
                Ok::<(), SchedulerError>(())
            })?
            .ok_or_else(|| SchedulerError::NotFound(format!("appointment {}", appointment_id)))?;

        info!(%payment_status, amount_paid, "Updated payment");
        Ok(PaymentOutcome::from_appointment(updated))
    }

    /// Close out a patient's treatment.
    ///
    /// Every pending, non-cancelled appointment is completed as paid in
    /// full, all in one atomic store update. With nothing pending, a dated
    /// completion marker is appended to the patient's notes instead. Returns
    /// the number of appointments completed.
    #[instrument(skip_all, fields(actor = %ctx.actor, request_id = %ctx.request_id, patient_id = %patient_id))]
    pub fn finish_treatment(&self, ctx: &RequestContext, patient_id: &str) -> SchedulerResult<u32> {
        if self.store.get_patient(patient_id)?.is_none() {
            return Err(SchedulerError::NotFound(format!("patient {}", patient_id)));
        }

        let unify = self.unify_completion_status;
        let completed = self
            .store
            .modify_patient_appointments(patient_id, |appointment| {
                if appointment.is_completed || appointment.status == AppointmentStatus::Cancelled {
                    return Ok(false);
                }
                appointment.is_completed = true;
                appointment.payment_status = PaymentStatus::Paid;
                appointment.amount_paid = appointment.total_amount;
                if unify {
                    appointment.status = AppointmentStatus::Completed;
                }
                Ok::<bool, SchedulerError>(true)
            })?
            .len() as u32;

        if completed == 0 {
            let marker = format!(
                "[TREATMENT COMPLETED on {}]",
                chrono::Local::now().format("%Y-%m-%d")
            );
            self.store
                .modify_patient(patient_id, |patient| {
                    patient.notes = Some(match patient.notes.take() {
                        Some(notes) if !notes.is_empty() => format!("{}\n\n{}", notes, marker),
                        _ => marker,
                    });
                    Ok::<(), SchedulerError>(())
                })?;
            info!("Marked treatment completed with no pending appointments");
            return Ok(0);
        }

        info!(completed, "Finished treatment");
        Ok(completed)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::super::NewAppointment;
    use super::*;
    use crate::config::ClinicConfig;

    fn book(f: &Fixture, hour: u32) -> Appointment {
        Scheduler::new(&f.db)
            .create_appointment(
                &RequestContext::system(),
                NewAppointment::new(&f.patient.id, &f.doctor.id, &f.service.id, at(hour, 0), at(hour, 30)),
            )
            .unwrap()
    }

    #[test]
    fn test_complete_keeps_status_by_default() {
        let f = fixture();
        let appointment = book(&f, 9);

        let outcome = Scheduler::new(&f.db)
            .complete_appointment(&RequestContext::system(), &appointment.id, PaymentStatus::Paid, 800.0)
            .unwrap();

        assert!(!outcome.has_warnings());
        assert!(outcome.appointment.is_completed);
        assert_eq!(outcome.appointment.payment_status, PaymentStatus::Paid);
        assert_eq!(outcome.appointment.status, AppointmentStatus::Scheduled);

        let stored = f.db.get_appointment(&appointment.id).unwrap().unwrap();
        assert!(stored.is_completed);
        assert_eq!(stored.amount_paid, 800.0);
    }

    #[test]
    fn test_complete_with_unified_status() {
        let f = fixture();
        let appointment = book(&f, 9);
        let config = ClinicConfig {
            unify_completion_status: true,
            ..ClinicConfig::default()
        };

        let outcome = Scheduler::with_config(&f.db, &config)
            .complete_appointment(&RequestContext::system(), &appointment.id, PaymentStatus::Partial, 300.0)
            .unwrap();
        assert_eq!(outcome.appointment.status, AppointmentStatus::Completed);

        // Completed bookings free the slot
        assert_eq!(book(&f, 9).slot, appointment.slot);
    }

    #[test]
    fn test_overpayment_is_a_warning() {
        let f = fixture();
        let appointment = book(&f, 9);

        let outcome = Scheduler::new(&f.db)
            .update_payment(&RequestContext::system(), &appointment.id, PaymentStatus::Paid, 1000.0)
            .unwrap();

        assert_eq!(
            outcome.warnings,
            vec![BookingWarning::Overpayment {
                amount_paid: 1000.0,
                total_amount: 800.0
            }]
        );
        assert!(!outcome.appointment.is_completed);
        assert_eq!(outcome.appointment.amount_paid, 1000.0);
    }

    #[test]
    fn test_invalid_amounts_rejected() {
        let f = fixture();
        let appointment = book(&f, 9);
        let scheduler = Scheduler::new(&f.db);
        let ctx = RequestContext::system();

        for amount in [-1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                scheduler.update_payment(&ctx, &appointment.id, PaymentStatus::Partial, amount),
                Err(SchedulerError::ValidationError(_))
            ));
        }

        let stored = f.db.get_appointment(&appointment.id).unwrap().unwrap();
        assert_eq!(stored.amount_paid, 0.0);
    }

    #[test]
    fn test_payment_on_missing_appointment() {
        let f = fixture();
        let result = Scheduler::new(&f.db).complete_appointment(
            &RequestContext::system(),
            "missing",
            PaymentStatus::Paid,
            0.0,
        );
        assert!(matches!(result, Err(SchedulerError::NotFound(_))));
    }

    #[test]
    fn test_finish_treatment_completes_pending() {
        let f = fixture();
        let scheduler = Scheduler::new(&f.db);
        let ctx = RequestContext::system();

        let a = book(&f, 9);
        let b = book(&f, 10);
        let c = book(&f, 11);
        scheduler
            .complete_appointment(&ctx, &a.id, PaymentStatus::Partial, 100.0)
            .unwrap();
        scheduler
            .set_status(&ctx, &c.id, AppointmentStatus::Cancelled)
            .unwrap();

        assert_eq!(scheduler.finish_treatment(&ctx, &f.patient.id).unwrap(), 1);

        let b = f.db.get_appointment(&b.id).unwrap().unwrap();
        assert!(b.is_completed);
        assert_eq!(b.payment_status, PaymentStatus::Paid);
        assert_eq!(b.amount_paid, b.total_amount);

        // Already completed ones keep their payment
        let a = f.db.get_appointment(&a.id).unwrap().unwrap();
        assert_eq!(a.amount_paid, 100.0);
    }

    #[test]
    fn test_finish_treatment_with_unified_status() {
        let f = fixture();
        let config = ClinicConfig {
            unify_completion_status: true,
            ..ClinicConfig::default()
        };
        let scheduler = Scheduler::with_config(&f.db, &config);
        let ctx = RequestContext::system();

        let a = book(&f, 9);
        let b = book(&f, 10);
        assert_eq!(scheduler.finish_treatment(&ctx, &f.patient.id).unwrap(), 2);

        for id in [&a.id, &b.id] {
            let stored = f.db.get_appointment(id).unwrap().unwrap();
            assert_eq!(stored.status, AppointmentStatus::Completed);
            assert_eq!(stored.amount_paid, 800.0);
        }

        // Nothing left pending, so the second call only adds the note
        assert_eq!(scheduler.finish_treatment(&ctx, &f.patient.id).unwrap(), 0);
        let notes = f.db.get_patient(&f.patient.id).unwrap().unwrap().notes;
        assert!(notes.unwrap().contains("[TREATMENT COMPLETED on "));
    }

    #[test]
    fn test_finish_treatment_without_pending_adds_note() {
        let f = fixture();
        let scheduler = Scheduler::new(&f.db);
        let ctx = RequestContext::system();

        assert_eq!(scheduler.finish_treatment(&ctx, &f.patient.id).unwrap(), 0);
        let notes = f.db.get_patient(&f.patient.id).unwrap().unwrap().notes.unwrap();
        assert!(notes.starts_with("[TREATMENT COMPLETED on "));

        scheduler.finish_treatment(&ctx, &f.patient.id).unwrap();
        let notes = f.db.get_patient(&f.patient.id).unwrap().unwrap().notes.unwrap();
        assert_eq!(notes.matches("[TREATMENT COMPLETED on ").count(), 2);
        assert!(notes.contains("]\n\n["));

        assert!(matches!(
            scheduler.finish_treatment(&ctx, "missing"),
            Err(SchedulerError::NotFound(_))
        ));
    }
}
