//! Patient database operations.

use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{Database, DbError, DbResult};
use crate::models::{Chart, Patient};
use crate::store::{PatientStore, StoreError, StoreResult};

const PATIENT_COLUMNS: &str = "id, first_name, last_name, age, category, contact, notes, \
                               chart, created_at, updated_at";

/// Intermediate row struct for database mapping.
struct PatientRow {
    id: String,
    first_name: String,
    last_name: String,
    age: u32,
    category: String,
    contact: Option<String>,
    notes: Option<String>,
    chart: String,
    created_at: String,
    updated_at: String,
}

impl PatientRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(PatientRow {
            id: row.get(0)?,
            first_name: row.get(1)?,
            last_name: row.get(2)?,
            age: row.get(3)?,
            category: row.get(4)?,
            contact: row.get(5)?,
            notes: row.get(6)?,
            chart: row.get(7)?,
            created_at: row.get(8)?,
            updated_at: row.get(9)?,
        })
    }
}

impl TryFrom<PatientRow> for Patient {
    type Error = DbError;

    fn try_from(row: PatientRow) -> Result<Self, Self::Error> {
        let chart = Chart::from_json(&row.chart)?;
        let category = row.category.parse().map_err(DbError::Constraint)?;

        Ok(Patient {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            age: row.age,
            category,
            contact: row.contact,
            notes: row.notes,
            chart,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn read_patient(conn: &Connection, patient_id: &str) -> DbResult<Option<Patient>> {
    conn.query_row(
        &format!("SELECT {} FROM patients WHERE id = ?", PATIENT_COLUMNS),
        [patient_id],
        PatientRow::from_row,
    )
    .optional()?
    .map(|row| row.try_into())
    .transpose()
}

fn write_patient(conn: &Connection, patient: &Patient) -> DbResult<bool> {
    let chart_json = patient.chart.to_json()?;
    let rows_affected = conn.execute(
        r#"
        UPDATE patients SET
            first_name = ?2,
            last_name = ?3,
            age = ?4,
            category = ?5,
            contact = ?6,
            notes = ?7,
            chart = ?8,
            updated_at = ?9
        WHERE id = ?1
        "#,
        params![
            patient.id,
            patient.first_name,
            patient.last_name,
            patient.age,
            patient.category.as_str(),
            patient.contact,
            patient.notes,
            chart_json,
            patient.updated_at,
        ],
    )?;
    Ok(rows_affected > 0)
}

impl Database {
    /// Insert a new patient.
    pub fn insert_patient(&self, patient: &Patient) -> DbResult<()> {
        let chart_json = patient.chart.to_json()?;
        self.conn.execute(
            r#"
            INSERT INTO patients (
                id, first_name, last_name, age, category, contact, notes,
                chart, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
            params![
                patient.id,
                patient.first_name,
                patient.last_name,
                patient.age,
                patient.category.as_str(),
                patient.contact,
                patient.notes,
                chart_json,
                patient.created_at,
                patient.updated_at,
            ],
        )?;
        Ok(())
    }

    /// Get a patient by ID.
    pub fn get_patient(&self, patient_id: &str) -> DbResult<Option<Patient>> {
        read_patient(&self.conn, patient_id)
    }

    /// Search patients by first or last name (prefix match).
    pub fn search_patients(&self, query: &str, limit: usize) -> DbResult<Vec<Patient>> {
        let pattern = format!("{}%", query);
        let mut stmt = self.conn.prepare(&format!(
            r#"
            SELECT {}
            FROM patients
            WHERE first_name LIKE ?1 OR last_name LIKE ?1
            ORDER BY last_name, first_name
            LIMIT ?2
            "#,
            PATIENT_COLUMNS
        ))?;

        let rows = stmt.query_map(params![pattern, limit as i64], PatientRow::from_row)?;

        let mut patients = Vec::new();
        for row in rows {
            patients.push(row?.try_into()?);
        }
        Ok(patients)
    }

    /// List all patients by last name, then first name.
    pub fn list_patients(&self) -> DbResult<Vec<Patient>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM patients ORDER BY last_name, first_name",
            PATIENT_COLUMNS
        ))?;

        let rows = stmt.query_map([], PatientRow::from_row)?;

        let mut patients = Vec::new();
        for row in rows {
            patients.push(row?.try_into()?);
        }
        Ok(patients)
    }

    /// Delete a patient and their appointments.
    pub fn delete_patient(&self, patient_id: &str) -> DbResult<bool> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM patients WHERE id = ?", [patient_id])?;
        Ok(rows_affected > 0)
    }
}

impl PatientStore for Database {
    fn insert_patient(&self, patient: &Patient) -> StoreResult<()> {
        Ok(Database::insert_patient(self, patient)?)
    }

    fn get_patient(&self, patient_id: &str) -> StoreResult<Option<Patient>> {
        Ok(Database::get_patient(self, patient_id)?)
    }

    fn modify_patient<F, E>(&self, patient_id: &str, f: F) -> Result<Option<Patient>, E>
    where
        F: FnOnce(&mut Patient) -> Result<(), E>,
        E: From<StoreError>,
    {
        let tx = self.immediate_transaction().map_err(StoreError::from)?;

        let Some(mut patient) = read_patient(&tx, patient_id).map_err(StoreError::from)? else {
            return Ok(None);
        };

        f(&mut patient)?;
        patient.touch();

        write_patient(&tx, &patient).map_err(StoreError::from)?;
        tx.commit().map_err(StoreError::from)?;
        Ok(Some(patient))
    }
}
