//! Appointment database operations.

use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{Database, DbError, DbResult};
use crate::models::{Appointment, TimeSlot};
use crate::store::{AppointmentFilter, AppointmentStore, SlotWrite, StoreError, StoreResult};

/// Storage format for appointment instants. Fixed width, so SQLite's text
/// comparison agrees with chronological order.
pub const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

const APPOINTMENT_COLUMNS: &str = "id, patient_id, doctor_id, service_id, start_time, end_time, \
                                   status, notes, is_completed, payment_status, amount_paid, \
                                   total_amount, created_at, updated_at";

fn format_time(t: NaiveDateTime) -> String {
    t.format(TIME_FORMAT).to_string()
}

fn parse_time(s: &str) -> Result<NaiveDateTime, DbError> {
    NaiveDateTime::parse_from_str(s, TIME_FORMAT)
        .map_err(|e| DbError::Constraint(format!("Invalid timestamp {:?}: {}", s, e)))
}

/// Intermediate row struct for database mapping.
struct AppointmentRow {
    id: String,
    patient_id: String,
    doctor_id: String,
    service_id: String,
    start_time: String,
    end_time: String,
    status: String,
    notes: String,
    is_completed: bool,
    payment_status: String,
    amount_paid: f64,
    total_amount: f64,
    created_at: String,
    updated_at: String,
}

impl AppointmentRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(AppointmentRow {
            id: row.get(0)?,
            patient_id: row.get(1)?,
            doctor_id: row.get(2)?,
            service_id: row.get(3)?,
            start_time: row.get(4)?,
            end_time: row.get(5)?,
            status: row.get(6)?,
            notes: row.get(7)?,
            is_completed: row.get(8)?,
            payment_status: row.get(9)?,
            amount_paid: row.get(10)?,
            total_amount: row.get(11)?,
            created_at: row.get(12)?,
            updated_at: row.get(13)?,
        })
    }
}

impl TryFrom<AppointmentRow> for Appointment {
    type Error = DbError;

    fn try_from(row: AppointmentRow) -> Result<Self, Self::Error> {
        let start = parse_time(&row.start_time)?;
        let end = parse_time(&row.end_time)?;
        let slot = TimeSlot::new(start, end).ok_or_else(|| {
            DbError::Constraint(format!("Appointment {} has an empty interval", row.id))
        })?;

        Ok(Appointment {
            id: row.id,
            patient_id: row.patient_id,
            doctor_id: row.doctor_id,
            service_id: row.service_id,
            slot,
            status: row.status.parse().map_err(DbError::Constraint)?,
            notes: row.notes,
            is_completed: row.is_completed,
            payment_status: row.payment_status.parse().map_err(DbError::Constraint)?,
            amount_paid: row.amount_paid,
            total_amount: row.total_amount,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn collect_rows(
    rows: impl Iterator<Item = rusqlite::Result<AppointmentRow>>,
) -> DbResult<Vec<Appointment>> {
    let mut appointments = Vec::new();
    for row in rows {
        appointments.push(row?.try_into()?);
    }
    Ok(appointments)
}

fn read_appointment(conn: &Connection, appointment_id: &str) -> DbResult<Option<Appointment>> {
    conn.query_row(
        &format!("SELECT {} FROM appointments WHERE id = ?", APPOINTMENT_COLUMNS),
        [appointment_id],
        AppointmentRow::from_row,
    )
    .optional()?
    .map(|row| row.try_into())
    .transpose()
}

fn read_patient_appointments(conn: &Connection, patient_id: &str) -> DbResult<Vec<Appointment>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM appointments WHERE patient_id = ? ORDER BY start_time DESC",
        APPOINTMENT_COLUMNS
    ))?;
    let rows = stmt.query_map([patient_id], AppointmentRow::from_row)?;
    collect_rows(rows)
}

/// First active appointment of `doctor_id` whose slot intersects `slot`,
/// ignoring `exclude_id`.
fn find_conflict(
    conn: &Connection,
    doctor_id: &str,
    slot: &TimeSlot,
    exclude_id: Option<&str>,
) -> DbResult<Option<Appointment>> {
    conn.query_row(
        &format!(
            r#"
            SELECT {}
            FROM appointments
            WHERE doctor_id = ?1
              AND (?2 IS NULL OR id != ?2)
              AND status IN ('scheduled', 'confirmed')
              AND NOT (end_time <= ?3 OR start_time >= ?4)
            ORDER BY start_time
            LIMIT 1
            "#,
            APPOINTMENT_COLUMNS
        ),
        params![
            doctor_id,
            exclude_id,
            format_time(slot.start()),
            format_time(slot.end()),
        ],
        AppointmentRow::from_row,
    )
    .optional()?
    .map(|row| row.try_into())
    .transpose()
}

fn write_appointment(conn: &Connection, appointment: &Appointment) -> DbResult<()> {
    conn.execute(
        r#"
        INSERT INTO appointments (
            id, patient_id, doctor_id, service_id, start_time, end_time,
            status, notes, is_completed, payment_status, amount_paid,
            total_amount, created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
        ON CONFLICT(id) DO UPDATE SET
            doctor_id = excluded.doctor_id,
            start_time = excluded.start_time,
            end_time = excluded.end_time,
            status = excluded.status,
            notes = excluded.notes,
            is_completed = excluded.is_completed,
            payment_status = excluded.payment_status,
            amount_paid = excluded.amount_paid,
            updated_at = excluded.updated_at
        "#,
        params![
            appointment.id,
            appointment.patient_id,
            appointment.doctor_id,
            appointment.service_id,
            format_time(appointment.slot.start()),
            format_time(appointment.slot.end()),
            appointment.status.as_str(),
            appointment.notes,
            appointment.is_completed,
            appointment.payment_status.as_str(),
            appointment.amount_paid,
            appointment.total_amount,
            appointment.created_at,
            appointment.updated_at,
        ],
    )?;
    Ok(())
}

impl Database {
    /// Get an appointment by ID.
    pub fn get_appointment(&self, appointment_id: &str) -> DbResult<Option<Appointment>> {
        read_appointment(&self.conn, appointment_id)
    }

    /// Write `appointment` unless it would double-book its doctor.
    ///
    /// Runs the conflict check and the write in one immediate transaction.
    /// The total amount and the patient/service references of an existing
    /// record are never rewritten.
    pub fn save_appointment_if_free(
        &self,
        appointment: &Appointment,
    ) -> DbResult<Option<Appointment>> {
        let tx = self.immediate_transaction()?;

        if appointment.is_active() {
            let conflict = find_conflict(
                &tx,
                &appointment.doctor_id,
                &appointment.slot,
                Some(appointment.id.as_str()),
            )?;
            if conflict.is_some() {
                return Ok(conflict);
            }
        }

        write_appointment(&tx, appointment)?;
        tx.commit()?;
        Ok(None)
    }

    /// List appointments matching a filter, ordered by start time.
    pub fn list_appointments(&self, filter: &AppointmentFilter) -> DbResult<Vec<Appointment>> {
        let mut stmt = self.conn.prepare(&format!(
            r#"
            SELECT {}
            FROM appointments
            WHERE (?1 IS NULL OR doctor_id = ?1)
              AND (?2 IS NULL OR start_time >= ?2)
              AND (?3 IS NULL OR start_time < ?3)
              AND (?4 IS NULL OR status = ?4)
              AND (?5 IS NULL OR is_completed = ?5)
            ORDER BY start_time
            "#,
            APPOINTMENT_COLUMNS
        ))?;

        let rows = stmt.query_map(
            params![
                filter.doctor_id,
                filter.from.map(format_time),
                filter.to.map(format_time),
                filter.status.map(|s| s.as_str()),
                filter.is_completed,
            ],
            AppointmentRow::from_row,
        )?;

        collect_rows(rows)
    }

    /// A patient's appointments, newest first.
    pub fn list_appointments_for_patient(&self, patient_id: &str) -> DbResult<Vec<Appointment>> {
        read_patient_appointments(&self.conn, patient_id)
    }

    /// Delete an appointment.
    pub fn delete_appointment(&self, appointment_id: &str) -> DbResult<bool> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM appointments WHERE id = ?", [appointment_id])?;
        Ok(rows_affected > 0)
    }
}

impl AppointmentStore for Database {
    fn save_if_free(&self, appointment: &Appointment) -> StoreResult<Option<Appointment>> {
        Ok(self.save_appointment_if_free(appointment)?)
    }

    fn get_appointment(&self, appointment_id: &str) -> StoreResult<Option<Appointment>> {
        Ok(Database::get_appointment(self, appointment_id)?)
    }

    fn modify_appointment<F, E>(&self, appointment_id: &str, f: F) -> Result<Option<Appointment>, E>
    where
        F: FnOnce(&mut Appointment) -> Result<(), E>,
        E: From<StoreError>,
    {
        let tx = self.immediate_transaction().map_err(StoreError::from)?;

        let Some(mut appointment) =
            read_appointment(&tx, appointment_id).map_err(StoreError::from)?
        else {
            return Ok(None);
        };

        f(&mut appointment)?;
        appointment.touch();

        write_appointment(&tx, &appointment).map_err(StoreError::from)?;
        tx.commit().map_err(StoreError::from)?;
        Ok(Some(appointment))
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
        let tx = self.immediate_transaction().map_err(StoreError::from)?;

        let Some(mut appointment) =
            read_appointment(&tx, appointment_id).map_err(StoreError::from)?
        else {
            return Ok(None);
        };

        f(&mut appointment)?;
        appointment.touch();

        if appointment.is_active() {
            let conflict = find_conflict(
                &tx,
                &appointment.doctor_id,
                &appointment.slot,
                Some(appointment.id.as_str()),
            )
            .map_err(StoreError::from)?;
            if let Some(conflict) = conflict {
                return Ok(Some(SlotWrite::Conflict(conflict)));
            }
        }

        write_appointment(&tx, &appointment).map_err(StoreError::from)?;
        tx.commit().map_err(StoreError::from)?;
        Ok(Some(SlotWrite::Saved(appointment)))
    }

    fn modify_patient_appointments<F, E>(
        &self,
        patient_id: &str,
        mut f: F,
    ) -> Result<Vec<Appointment>, E>
    where
        F: FnMut(&mut Appointment) -> Result<bool, E>,
        E: From<StoreError>,
    {
        let tx = self.immediate_transaction().map_err(StoreError::from)?;

        let mut written = Vec::new();
        for mut appointment in
            read_patient_appointments(&tx, patient_id).map_err(StoreError::from)?
        {
            if f(&mut appointment)? {
                appointment.touch();
                write_appointment(&tx, &appointment).map_err(StoreError::from)?;
                written.push(appointment);
            }
        }

        tx.commit().map_err(StoreError::from)?;
        Ok(written)
    }

    fn delete_appointment(&self, appointment_id: &str) -> StoreResult<bool> {
        Ok(Database::delete_appointment(self, appointment_id)?)
    }

    fn query_appointments(&self, filter: &AppointmentFilter) -> StoreResult<Vec<Appointment>> {
        Ok(self.list_appointments(filter)?)
    }

    fn list_appointments_for_patient(&self, patient_id: &str) -> StoreResult<Vec<Appointment>> {
        Ok(Database::list_appointments_for_patient(self, patient_id)?)
    }

    fn count_appointments_for_doctor(&self, doctor_id: &str) -> StoreResult<u64> {
        Ok(Database::count_appointments_for_doctor(self, doctor_id)?)
    }
}
