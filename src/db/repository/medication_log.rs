use std::str::FromStr;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::{fmt_instant, parse_instant, DatabaseError};
use crate::models::enums::DoseLogStatus;
use crate::models::MedicationLogEntry;

/// Append one log entry. The log is write-once: nothing in the crate
/// updates or deletes rows in `medication_logs`.
pub fn insert_log_entry(
    conn: &Connection,
    entry: &MedicationLogEntry,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO medication_logs (id, medication_id, status, logged_at, logged_by)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            entry.id.to_string(),
            entry.medication_id.to_string(),
            entry.status.as_str(),
            fmt_instant(entry.logged_at),
            entry.logged_by.to_string(),
        ],
    )?;
    Ok(())
}

/// Dose history for one medication, newest first.
pub fn fetch_logs_for_medication(
    conn: &Connection,
    med_id: &Uuid,
) -> Result<Vec<MedicationLogEntry>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, medication_id, status, logged_at, logged_by
         FROM medication_logs
         WHERE medication_id = ?1
         ORDER BY logged_at DESC",
    )?;

    let rows = stmt.query_map(params![med_id.to_string()], log_row)?;

    let mut entries = Vec::new();
    for row in rows {
        entries.push(log_entry_from_row(row?)?);
    }
    Ok(entries)
}

/// Count log entries in a half-open window `[from, to)`.
pub fn count_logs_between(
    conn: &Connection,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Result<u32, DatabaseError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM medication_logs WHERE logged_at >= ?1 AND logged_at < ?2",
        params![fmt_instant(from), fmt_instant(to)],
        |row| row.get(0),
    )?;
    Ok(count)
}

struct LogRow {
    id: String,
    medication_id: String,
    status: String,
    logged_at: String,
    logged_by: String,
}

fn log_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<LogRow> {
    Ok(LogRow {
        id: row.get(0)?,
        medication_id: row.get(1)?,
        status: row.get(2)?,
        logged_at: row.get(3)?,
        logged_by: row.get(4)?,
    })
}

fn log_entry_from_row(row: LogRow) -> Result<MedicationLogEntry, DatabaseError> {
    Ok(MedicationLogEntry {
        id: row.id.parse().unwrap_or_else(|_| Uuid::nil()),
        medication_id: row.medication_id.parse().unwrap_or_else(|_| Uuid::nil()),
        status: DoseLogStatus::from_str(&row.status)?,
        logged_at: parse_instant("medication_logs.logged_at", &row.logged_at)?,
        logged_by: row.logged_by.parse().unwrap_or_else(|_| Uuid::nil()),
    })
}
