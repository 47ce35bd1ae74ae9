//! SQLite schema definition.

/// Complete database schema for dentaldesk.
pub const SCHEMA: &str = r#"
-- Enable foreign keys
PRAGMA foreign_keys = ON;

-- ============================================================================
-- Doctors (bookable resources)
-- ============================================================================

CREATE TABLE IF NOT EXISTS doctors (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    specialty TEXT NOT NULL DEFAULT '',
    contact TEXT,
    is_available INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_doctors_name ON doctors(name);

-- ============================================================================
-- Service Catalog
-- ============================================================================

CREATE TABLE IF NOT EXISTS services (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    description TEXT,
    price REAL NOT NULL CHECK (price >= 0),
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_services_name ON services(name);

-- ============================================================================
-- Patients
-- ============================================================================

CREATE TABLE IF NOT EXISTS patients (
    id TEXT PRIMARY KEY,
    first_name TEXT NOT NULL,
    last_name TEXT NOT NULL,
    age INTEGER NOT NULL CHECK (age >= 0),
    category TEXT NOT NULL CHECK (category IN ('adult', 'pediatric')),
    contact TEXT,
    notes TEXT,
    chart TEXT NOT NULL DEFAULT '{}',            -- JSON object {site_id: {status, notes, present}}
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_patients_name ON patients(last_name, first_name);

-- ============================================================================
-- Appointments
-- ============================================================================

-- start_time/end_time use a fixed-width format so text comparison orders
-- them chronologically.
CREATE TABLE IF NOT EXISTS appointments (
    id TEXT PRIMARY KEY,
    patient_id TEXT NOT NULL REFERENCES patients(id) ON DELETE CASCADE,
    doctor_id TEXT NOT NULL REFERENCES doctors(id) ON DELETE CASCADE,
    service_id TEXT NOT NULL REFERENCES services(id) ON DELETE CASCADE,
    start_time TEXT NOT NULL,
    end_time TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'scheduled'
        CHECK (status IN ('scheduled', 'confirmed', 'cancelled', 'completed')),
    notes TEXT NOT NULL DEFAULT '',
    is_completed INTEGER NOT NULL DEFAULT 0,
    payment_status TEXT NOT NULL DEFAULT 'pending'
        CHECK (payment_status IN ('pending', 'partial', 'paid')),
    amount_paid REAL NOT NULL DEFAULT 0.0 CHECK (amount_paid >= 0),
    total_amount REAL NOT NULL DEFAULT 0.0 CHECK (total_amount >= 0),
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now')),
    CHECK (start_time < end_time)
);

CREATE INDEX IF NOT EXISTS idx_appointments_doctor_time ON appointments(doctor_id, start_time);
CREATE INDEX IF NOT EXISTS idx_appointments_patient ON appointments(patient_id);
CREATE INDEX IF NOT EXISTS idx_appointments_status ON appointments(status);
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    fn seeded() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();
        conn.execute_batch(
            r#"
            INSERT INTO doctors (id, name, specialty) VALUES ('d1', 'Dr. Cruz', 'General Dentistry');
            INSERT INTO services (id, name, price) VALUES ('s1', 'Checkup', 500.0);
            INSERT INTO patients (id, first_name, last_name, age, category)
                VALUES ('p1', 'Juan', 'Dela Cruz', 8, 'pediatric');
            "#,
        )
        .unwrap();
        conn
    }

    #[test]
    fn test_schema_valid() {
        let conn = Connection::open_in_memory().unwrap();
        let result = conn.execute_batch(SCHEMA);
        assert!(result.is_ok(), "Schema should be valid SQL: {:?}", result);
    }

    #[test]
    fn test_schema_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();
        assert!(conn.execute_batch(SCHEMA).is_ok());
    }

    #[test]
    fn test_interval_constraint() {
        let conn = seeded();

        let result = conn.execute(
            "INSERT INTO appointments (id, patient_id, doctor_id, service_id, start_time, end_time)
             VALUES ('a1', 'p1', 'd1', 's1', '2025-01-01T10:00:00.000000', '2025-01-01T09:00:00.000000')",
            [],
        );
        assert!(result.is_err());

        let result = conn.execute(
            "INSERT INTO appointments (id, patient_id, doctor_id, service_id, start_time, end_time)
             VALUES ('a1', 'p1', 'd1', 's1', '2025-01-01T09:00:00.000000', '2025-01-01T10:00:00.000000')",
            [],
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_status_constraint() {
        let conn = seeded();

        let result = conn.execute(
            "INSERT INTO appointments (id, patient_id, doctor_id, service_id, start_time, end_time, status)
             VALUES ('a1', 'p1', 'd1', 's1', '2025-01-01T09:00:00.000000', '2025-01-01T10:00:00.000000', 'done')",
            [],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_doctor_delete_cascades() {
        let conn = seeded();
        conn.execute(
            "INSERT INTO appointments (id, patient_id, doctor_id, service_id, start_time, end_time)
             VALUES ('a1', 'p1', 'd1', 's1', '2025-01-01T09:00:00.000000', '2025-01-01T10:00:00.000000')",
            [],
        )
        .unwrap();

        conn.execute("DELETE FROM doctors WHERE id = 'd1'", []).unwrap();

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM appointments", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }
}
