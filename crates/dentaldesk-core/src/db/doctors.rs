//! Doctor database operations.

use rusqlite::{params, OptionalExtension, Row};

use super::{Database, DbError, DbResult};
use crate::models::Doctor;
use crate::store::{ResourceDirectory, StoreResult};

const DOCTOR_COLUMNS: &str =
    "id, name, specialty, contact, is_available, created_at, updated_at";

fn doctor_from_row(row: &Row<'_>) -> rusqlite::Result<Doctor> {
    Ok(Doctor {
        id: row.get(0)?,
        name: row.get(1)?,
        specialty: row.get(2)?,
        contact: row.get(3)?,
        is_available: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

impl Database {
    /// Insert a new doctor.
    pub fn insert_doctor(&self, doctor: &Doctor) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO doctors (
                id, name, specialty, contact, is_available, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                doctor.id,
                doctor.name,
                doctor.specialty,
                doctor.contact,
                doctor.is_available,
                doctor.created_at,
                doctor.updated_at,
            ],
        )?;
        Ok(())
    }

    /// Update an existing doctor.
    pub fn update_doctor(&self, doctor: &Doctor) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            r#"
            UPDATE doctors SET
                name = ?2,
                specialty = ?3,
                contact = ?4,
                is_available = ?5,
                updated_at = datetime('now')
            WHERE id = ?1
            "#,
            params![
                doctor.id,
                doctor.name,
                doctor.specialty,
                doctor.contact,
                doctor.is_available,
            ],
        )?;
        Ok(rows_affected > 0)
    }

    /// Flip a doctor's availability flag. Existing bookings are untouched.
    pub fn set_doctor_availability(&self, doctor_id: &str, is_available: bool) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            "UPDATE doctors SET is_available = ?, updated_at = datetime('now') WHERE id = ?",
            params![is_available, doctor_id],
        )?;
        Ok(rows_affected > 0)
    }

    /// Get a doctor by ID.
    pub fn get_doctor(&self, doctor_id: &str) -> DbResult<Option<Doctor>> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM doctors WHERE id = ?", DOCTOR_COLUMNS),
                [doctor_id],
                doctor_from_row,
            )
            .optional()
            .map_err(Into::into)
    }

    /// List all doctors by name.
    pub fn list_doctors(&self) -> DbResult<Vec<Doctor>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM doctors ORDER BY name",
            DOCTOR_COLUMNS
        ))?;
        let rows = stmt.query_map([], doctor_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// List available doctors by name.
    pub fn list_available_doctors(&self) -> DbResult<Vec<Doctor>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM doctors WHERE is_available = 1 ORDER BY name",
            DOCTOR_COLUMNS
        ))?;
        let rows = stmt.query_map([], doctor_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Number of appointments (any status) booked against a doctor.
    pub fn count_appointments_for_doctor(&self, doctor_id: &str) -> DbResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM appointments WHERE doctor_id = ?",
            [doctor_id],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    /// Remove a doctor.
    ///
    /// A doctor with appointments is only removed when `delete_appointments`
    /// is set, in which case their appointments go with them.
    pub fn remove_doctor(&self, doctor_id: &str, delete_appointments: bool) -> DbResult<bool> {
        let tx = self.immediate_transaction()?;

        let booked: i64 = tx.query_row(
            "SELECT COUNT(*) FROM appointments WHERE doctor_id = ?",
            [doctor_id],
            |row| row.get(0),
        )?;
        if booked > 0 && !delete_appointments {
            return Err(DbError::Constraint(format!(
                "Doctor {} has {} appointment(s)",
                doctor_id, booked
            )));
        }

        tx.execute("DELETE FROM appointments WHERE doctor_id = ?", [doctor_id])?;
        let rows_affected = tx.execute("DELETE FROM doctors WHERE id = ?", [doctor_id])?;
        tx.commit()?;
        Ok(rows_affected > 0)
    }
}

impl ResourceDirectory for Database {
    fn get_doctor(&self, doctor_id: &str) -> StoreResult<Option<Doctor>> {
        Ok(Database::get_doctor(self, doctor_id)?)
    }

    fn list_available_doctors(&self) -> StoreResult<Vec<Doctor>> {
        Ok(Database::list_available_doctors(self)?)
    }
}
