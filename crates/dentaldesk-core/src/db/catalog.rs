//! Service catalog database operations.

use rusqlite::{params, OptionalExtension, Row};

use super::{Database, DbError, DbResult};
use crate::models::Service;
use crate::store::{ServiceCatalog, StoreResult};

fn service_from_row(row: &Row<'_>) -> rusqlite::Result<Service> {
    Ok(Service {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        price: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

impl Database {
    /// Insert or update a service.
    ///
    /// Price changes only affect bookings made afterwards; booked totals are
    /// stored on the appointment.
    pub fn upsert_service(&self, service: &Service) -> DbResult<()> {
        if !service.has_valid_price() {
            return Err(DbError::Constraint(format!(
                "Invalid price for service {}: {}",
                service.name, service.price
            )));
        }

        self.conn.execute(
            r#"
            INSERT INTO services (
                id, name, description, price, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, datetime('now'))
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                description = excluded.description,
                price = excluded.price,
                updated_at = datetime('now')
            "#,
            params![
                service.id,
                service.name,
                service.description,
                service.price,
                service.created_at,
            ],
        )?;
        Ok(())
    }

    /// Get a service by ID.
    pub fn get_service(&self, service_id: &str) -> DbResult<Option<Service>> {
        self.conn
            .query_row(
                r#"
                SELECT id, name, description, price, created_at, updated_at
                FROM services
                WHERE id = ?
                "#,
                [service_id],
                service_from_row,
            )
            .optional()
            .map_err(Into::into)
    }

    /// List all services by name.
    pub fn list_services(&self) -> DbResult<Vec<Service>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, name, description, price, created_at, updated_at
            FROM services
            ORDER BY name
            "#,
        )?;
        let rows = stmt.query_map([], service_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Delete a service. Its appointments are removed with it.
    pub fn delete_service(&self, service_id: &str) -> DbResult<bool> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM services WHERE id = ?", [service_id])?;
        Ok(rows_affected > 0)
    }
}

impl ServiceCatalog for Database {
    fn get_service(&self, service_id: &str) -> StoreResult<Option<Service>> {
        Ok(Database::get_service(self, service_id)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_db() -> Database {
        Database::open_in_memory().unwrap()
    }

    #[test]
    fn test_upsert_and_get() {
        let db = setup_db();

        let mut service = Service::new("Root Canal".into(), 3500.0);
        service.description = Some("Root canal treatment".into());
        db.upsert_service(&service).unwrap();

        let retrieved = db.get_service(&service.id).unwrap().unwrap();
        assert_eq!(retrieved.name, "Root Canal");
        assert_eq!(retrieved.price, 3500.0);

        service.price = 4000.0;
        db.upsert_service(&service).unwrap();

        let retrieved = db.get_service(&service.id).unwrap().unwrap();
        assert_eq!(retrieved.price, 4000.0);
        assert_eq!(db.list_services().unwrap().len(), 1);
    }

    #[test]
    fn test_negative_price_rejected() {
        let db = setup_db();

        let service = Service::new("Refund".into(), -10.0);
        let result = db.upsert_service(&service);
        assert!(matches!(result, Err(DbError::Constraint(_))));
    }

    #[test]
    fn test_delete_service() {
        let db = setup_db();

        let service = Service::new("Whitening".into(), 3000.0);
        db.upsert_service(&service).unwrap();

        assert!(db.delete_service(&service.id).unwrap());
        assert!(db.get_service(&service.id).unwrap().is_none());
    }
}
