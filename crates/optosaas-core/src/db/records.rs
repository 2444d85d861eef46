//! Patient record database operations.
//!
//! The full record is stored as a JSON body with scalar index columns for
//! date and staff filtering, so list queries never deserialize rows that a
//! dashboard filter would drop anyway.

use chrono::NaiveDate;
use rusqlite::{params, OptionalExtension};

use super::{Database, DbResult};
use crate::models::PatientRecord;

impl Database {
    /// Insert a new patient record.
    pub fn insert_record(&self, record: &PatientRecord) -> DbResult<()> {
        let body = serde_json::to_string(record)?;
        self.conn.execute(
            r#"
            INSERT INTO patient_records (
                record_id, franchise_id, patient_ref, appointment_date,
                appointment_type, optometrist, dispenser, body,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
            params![
                record.record_id,
                record.franchise_id,
                record.patient_ref,
                record.appointment_date.to_string(),
                record.appointment_type.label(),
                record.optometrist,
                record.dispenser,
                body,
                record.created_at,
                record.updated_at,
            ],
        )?;
        Ok(())
    }

    /// Update an existing record.
    pub fn update_record(&self, record: &PatientRecord) -> DbResult<bool> {
        let body = serde_json::to_string(record)?;
        let rows_affected = self.conn.execute(
            r#"
            UPDATE patient_records SET
                patient_ref = ?2,
                appointment_date = ?3,
                appointment_type = ?4,
                optometrist = ?5,
                dispenser = ?6,
                body = ?7,
                updated_at = datetime('now')
            WHERE record_id = ?1
            "#,
            params![
                record.record_id,
                record.patient_ref,
                record.appointment_date.to_string(),
                record.appointment_type.label(),
                record.optometrist,
                record.dispenser,
                body,
            ],
        )?;
        Ok(rows_affected > 0)
    }

    /// Get a record by id.
    pub fn get_record(&self, record_id: &str) -> DbResult<Option<PatientRecord>> {
        let body: Option<String> = self
            .conn
            .query_row(
                "SELECT body FROM patient_records WHERE record_id = ?",
                [record_id],
                |row| row.get(0),
            )
            .optional()?;
        body.map(|b| serde_json::from_str(&b).map_err(Into::into))
            .transpose()
    }

    /// List all records of a franchise, newest appointment first.
    pub fn list_records(&self, franchise_id: i64) -> DbResult<Vec<PatientRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT body FROM patient_records
            WHERE franchise_id = ?
            ORDER BY appointment_date DESC, created_at DESC
            "#,
        )?;
        let rows = stmt.query_map([franchise_id], |row| row.get::<_, String>(0))?;

        let mut records = Vec::new();
        for body in rows {
            records.push(serde_json::from_str(&body?)?);
        }
        Ok(records)
    }

    /// List records of a franchise whose appointment date falls within
    /// [from, to] inclusive, in insertion order.
    pub fn list_records_in_range(
        &self,
        franchise_id: i64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> DbResult<Vec<PatientRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT body FROM patient_records
            WHERE franchise_id = ?1
              AND appointment_date >= ?2
              AND appointment_date <= ?3
            ORDER BY rowid
            "#,
        )?;
        let rows = stmt.query_map(
            params![franchise_id, from.to_string(), to.to_string()],
            |row| row.get::<_, String>(0),
        )?;

        let mut records = Vec::new();
        for body in rows {
            records.push(serde_json::from_str(&body?)?);
        }
        Ok(records)
    }

    /// Delete a record.
    pub fn delete_record(&self, record_id: &str) -> DbResult<bool> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM patient_records WHERE record_id = ?", [record_id])?;
        Ok(rows_affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AppointmentType, Franchise};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn setup_db() -> (Database, i64) {
        let db = Database::open_in_memory().unwrap();
        let franchise = db
            .insert_franchise(&Franchise::new("VisionCare".into()))
            .unwrap();
        (db, franchise.id)
    }

    fn make_record(franchise_id: i64, patient_ref: &str, d: NaiveDate) -> PatientRecord {
        PatientRecord::new(
            franchise_id,
            patient_ref.into(),
            d,
            AppointmentType::EyeCheckNhs,
        )
    }

    #[test]
    fn test_insert_and_get_round_trip() {
        let (db, fid) = setup_db();

        let mut record = make_record(fid, "OPS-1001", date(2025, 6, 1));
        record.outcome = Some("Stable Rx".into());
        record.optometrist = Some(7);
        db.insert_record(&record).unwrap();

        let retrieved = db.get_record(&record.record_id).unwrap().unwrap();
        assert_eq!(retrieved, record);
    }

    #[test]
    fn test_update_record() {
        let (db, fid) = setup_db();

        let mut record = make_record(fid, "OPS-1001", date(2025, 6, 1));
        db.insert_record(&record).unwrap();

        record.dispensed = true;
        record.dispense_date = Some(date(2025, 6, 1));
        assert!(db.update_record(&record).unwrap());

        let retrieved = db.get_record(&record.record_id).unwrap().unwrap();
        assert!(retrieved.dispensed_same_day());
    }

    #[test]
    fn test_range_query_is_inclusive() {
        let (db, fid) = setup_db();

        db.insert_record(&make_record(fid, "OPS-1", date(2025, 5, 31))).unwrap();
        db.insert_record(&make_record(fid, "OPS-2", date(2025, 6, 1))).unwrap();
        db.insert_record(&make_record(fid, "OPS-3", date(2025, 6, 2))).unwrap();
        db.insert_record(&make_record(fid, "OPS-4", date(2025, 6, 3))).unwrap();

        let records = db
            .list_records_in_range(fid, date(2025, 6, 1), date(2025, 6, 2))
            .unwrap();
        let refs: Vec<&str> = records.iter().map(|r| r.patient_ref.as_str()).collect();
        assert_eq!(refs, vec!["OPS-2", "OPS-3"]);
    }

    #[test]
    fn test_records_scoped_to_franchise() {
        let (db, fid) = setup_db();
        let other = db.insert_franchise(&Franchise::new("EyeCare Plus".into())).unwrap();

        db.insert_record(&make_record(fid, "OPS-1", date(2025, 6, 1))).unwrap();
        db.insert_record(&make_record(other.id, "OPS-2", date(2025, 6, 1))).unwrap();

        assert_eq!(db.list_records(fid).unwrap().len(), 1);
        assert_eq!(db.list_records(other.id).unwrap().len(), 1);
    }

    #[test]
    fn test_delete_record() {
        let (db, fid) = setup_db();

        let record = make_record(fid, "OPS-1", date(2025, 6, 1));
        db.insert_record(&record).unwrap();

        assert!(db.delete_record(&record.record_id).unwrap());
        assert!(db.get_record(&record.record_id).unwrap().is_none());
        assert!(!db.delete_record(&record.record_id).unwrap());
    }
}
