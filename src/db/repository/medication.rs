use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::{fmt_instant, parse_instant, DatabaseError};
use crate::models::Medication;

pub fn insert_medication(conn: &Connection, med: &Medication) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO medications (id, patient_id, name, dosage, frequency, instructions,
         prescriber, start_date, next_dose_time, is_active)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            med.id.to_string(),
            med.patient_id.to_string(),
            med.name,
            med.dosage,
            med.frequency,
            med.instructions,
            med.prescriber,
            med.start_date.map(|d| d.to_string()),
            fmt_instant(med.next_dose_time),
            med.is_active as i32,
        ],
    )?;
    Ok(())
}

pub fn find_medication(
    conn: &Connection,
    med_id: &Uuid,
) -> Result<Option<Medication>, DatabaseError> {
    let result = conn.query_row(
        "SELECT id, patient_id, name, dosage, frequency, instructions,
                prescriber, start_date, next_dose_time, is_active
         FROM medications WHERE id = ?1",
        params![med_id.to_string()],
        medication_row,
    );

    match result {
        Ok(row) => Ok(Some(medication_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(DatabaseError::from(e)),
    }
}

/// Look up a medication only if it is still on the active schedule.
pub fn find_active_medication(
    conn: &Connection,
    med_id: &Uuid,
) -> Result<Option<Medication>, DatabaseError> {
    Ok(find_medication(conn, med_id)?.filter(|m| m.is_active))
}

/// Advance (or rewind) a medication's next-dose instant.
pub fn update_next_dose(
    conn: &Connection,
    med_id: &Uuid,
    next_dose: DateTime<Utc>,
) -> Result<(), DatabaseError> {
    let rows = conn.execute(
        "UPDATE medications SET next_dose_time = ?1 WHERE id = ?2",
        params![fmt_instant(next_dose), med_id.to_string()],
    )?;
    if rows == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Medication".into(),
            id: med_id.to_string(),
        });
    }
    Ok(())
}

/// Soft delete: the medication drops out of every dosing view but its
/// log history stays intact.
pub fn set_medication_active(
    conn: &Connection,
    med_id: &Uuid,
    active: bool,
) -> Result<(), DatabaseError> {
    let rows = conn.execute(
        "UPDATE medications SET is_active = ?1 WHERE id = ?2",
        params![active as i32, med_id.to_string()],
    )?;
    if rows == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Medication".into(),
            id: med_id.to_string(),
        });
    }
    Ok(())
}

struct MedicationRow {
    id: String,
    patient_id: String,
    name: String,
    dosage: String,
    frequency: String,
    instructions: Option<String>,
    prescriber: Option<String>,
    start_date: Option<String>,
    next_dose_time: String,
    is_active: i32,
}

fn medication_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<MedicationRow> {
    Ok(MedicationRow {
        id: row.get(0)?,
        patient_id: row.get(1)?,
        name: row.get(2)?,
        dosage: row.get(3)?,
        frequency: row.get(4)?,
        instructions: row.get(5)?,
        prescriber: row.get(6)?,
        start_date: row.get(7)?,
        next_dose_time: row.get(8)?,
        is_active: row.get(9)?,
    })
}

fn medication_from_row(row: MedicationRow) -> Result<Medication, DatabaseError> {
    Ok(Medication {
        id: row.id.parse().unwrap_or_else(|_| Uuid::nil()),
        patient_id: row.patient_id.parse().unwrap_or_else(|_| Uuid::nil()),
        name: row.name,
        dosage: row.dosage,
        frequency: row.frequency,
        instructions: row.instructions,
        prescriber: row.prescriber,
        start_date: row
            .start_date
            .as_deref()
            .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()),
        next_dose_time: parse_instant("medications.next_dose_time", &row.next_dose_time)?,
        is_active: row.is_active != 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::patient::insert_patient;
    use crate::db::sqlite::open_memory_database;
    use crate::models::enums::PatientStatus;
    use crate::models::Patient;
    use chrono::TimeZone;

    fn seed_patient(conn: &Connection) -> Uuid {
        let patient = Patient {
            id: Uuid::new_v4(),
            full_name: "Margaret Okafor".into(),
            status: PatientStatus::Active,
            date_of_birth: None,
        };
        insert_patient(conn, &patient).unwrap();
        patient.id
    }

    fn sample_medication(patient_id: Uuid, next_dose: DateTime<Utc>) -> Medication {
        Medication {
            id: Uuid::new_v4(),
            patient_id,
            name: "Metformin".into(),
            dosage: "500mg".into(),
            frequency: "twice daily".into(),
            instructions: Some("Take with food".into()),
            prescriber: Some("Dr. Chen".into()),
            start_date: NaiveDate::from_ymd_opt(2026, 1, 15),
            next_dose_time: next_dose,
            is_active: true,
        }
    }

    #[test]
    fn insert_and_find_round_trip() {
        let conn = open_memory_database().unwrap();
        let patient_id = seed_patient(&conn);
        let next_dose = Utc.timestamp_opt(1_770_000_000, 500_000_000).unwrap();
        let med = sample_medication(patient_id, next_dose);

        insert_medication(&conn, &med).unwrap();
        let found = find_medication(&conn, &med.id).unwrap().unwrap();

        assert_eq!(found.name, "Metformin");
        assert_eq!(found.frequency, "twice daily");
        assert_eq!(found.next_dose_time, next_dose);
        assert_eq!(found.start_date, NaiveDate::from_ymd_opt(2026, 1, 15));
        assert!(found.is_active);
    }

    #[test]
    fn find_missing_medication_is_none() {
        let conn = open_memory_database().unwrap();
        assert!(find_medication(&conn, &Uuid::new_v4()).unwrap().is_none());
    }

    #[test]
    fn find_active_skips_deactivated() {
        let conn = open_memory_database().unwrap();
        let patient_id = seed_patient(&conn);
        let med = sample_medication(patient_id, Utc::now());
        insert_medication(&conn, &med).unwrap();

        assert!(find_active_medication(&conn, &med.id).unwrap().is_some());

        set_medication_active(&conn, &med.id, false).unwrap();
        assert!(find_active_medication(&conn, &med.id).unwrap().is_none());
        // still reachable through the unfiltered lookup
        assert!(find_medication(&conn, &med.id).unwrap().is_some());
    }

    #[test]
    fn update_next_dose_persists() {
        let conn = open_memory_database().unwrap();
        let patient_id = seed_patient(&conn);
        let med = sample_medication(patient_id, Utc.with_ymd_and_hms(2026, 8, 1, 8, 0, 0).unwrap());
        insert_medication(&conn, &med).unwrap();

        let new_time = Utc.with_ymd_and_hms(2026, 8, 1, 20, 0, 0).unwrap();
        update_next_dose(&conn, &med.id, new_time).unwrap();

        let found = find_medication(&conn, &med.id).unwrap().unwrap();
        assert_eq!(found.next_dose_time, new_time);
    }

    #[test]
    fn update_next_dose_unknown_id_is_not_found() {
        let conn = open_memory_database().unwrap();
        let err = update_next_dose(&conn, &Uuid::new_v4(), Utc::now()).unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound { .. }));
    }
}
