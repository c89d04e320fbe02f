//! Dashboard — header stats and the recent-activity feed.
//!
//! Stat rules reuse the dosing classifier so the dashboard and the
//! medications screen can never disagree about what counts as overdue.
//! `now` is injected by the caller, same as everywhere else in the crate.

use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::repository::{count_active_patients, count_logs_between};
use crate::db::{parse_instant, DatabaseError};
use crate::dosing::{classify, is_pending, DoseStatus};
use crate::models::enums::DoseLogStatus;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Aggregated stats for the dashboard header cards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    /// Active medications whose dose came due within the last 24 hours.
    pub pending_medications: u32,
    pub due_soon_medications: u32,
    pub overdue_medications: u32,
    pub active_patients: u32,
    pub doses_logged_today: u32,
}

/// One row of the recent-activity feed: who logged what, for whom, when.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub id: Uuid,
    pub medication_name: String,
    pub patient_name: String,
    pub caregiver_name: String,
    pub status: DoseLogStatus,
    pub logged_at: DateTime<Utc>,
}

/// Dashboard screen data — single fetch for all dashboard content.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardData {
    pub stats: DashboardStats,
    pub recent_activity: Vec<ActivityEntry>,
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Compute the header stats as of `now`.
pub fn fetch_dashboard_stats(
    conn: &Connection,
    now: DateTime<Utc>,
) -> Result<DashboardStats, DatabaseError> {
    let mut stmt = conn.prepare("SELECT next_dose_time FROM medications WHERE is_active = 1")?;
    let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

    let mut pending = 0;
    let mut due_soon = 0;
    let mut overdue = 0;
    for row in rows {
        let next_dose = parse_instant("medications.next_dose_time", &row?)?;
        if is_pending(next_dose, now) {
            pending += 1;
        }
        match classify(next_dose, now) {
            DoseStatus::DueSoon => due_soon += 1,
            DoseStatus::Overdue => overdue += 1,
            DoseStatus::Normal => {}
        }
    }

    let day_start = now
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .unwrap_or_default()
        .and_utc();
    let doses_logged_today = count_logs_between(conn, day_start, day_start + Duration::days(1))?;

    Ok(DashboardStats {
        pending_medications: pending,
        due_soon_medications: due_soon,
        overdue_medications: overdue,
        active_patients: count_active_patients(conn)?,
        doses_logged_today,
    })
}

/// Latest log entries with medication, patient, and caregiver names.
pub fn fetch_recent_activity(
    conn: &Connection,
    limit: u32,
) -> Result<Vec<ActivityEntry>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT l.id, m.name, p.full_name, c.full_name, l.status, l.logged_at
         FROM medication_logs l
         INNER JOIN medications m ON l.medication_id = m.id
         INNER JOIN patients p ON m.patient_id = p.id
         INNER JOIN caregivers c ON l.logged_by = c.id
         ORDER BY l.logged_at DESC
         LIMIT ?1",
    )?;

    let rows = stmt.query_map(params![limit], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, String>(4)?,
            row.get::<_, String>(5)?,
        ))
    })?;

    let mut entries = Vec::new();
    for row in rows {
        let (id, medication_name, patient_name, caregiver_name, status, logged_at) = row?;
        entries.push(ActivityEntry {
            id: id.parse().unwrap_or_else(|_| Uuid::nil()),
            medication_name,
            patient_name,
            caregiver_name,
            status: DoseLogStatus::from_str(&status)?,
            logged_at: parse_instant("medication_logs.logged_at", &logged_at)?,
        });
    }
    Ok(entries)
}

/// One call for the whole dashboard.
pub fn load_dashboard(
    conn: &Connection,
    now: DateTime<Utc>,
) -> Result<DashboardData, DatabaseError> {
    Ok(DashboardData {
        stats: fetch_dashboard_stats(conn, now)?,
        recent_activity: fetch_recent_activity(conn, 10)?,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
