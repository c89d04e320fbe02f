//! Medication list — view types, projection, and the queries behind the
//! medications screen.
//!
//! The projection is a pure function of the fetched rows, an injected `now`,
//! and the selected filter tab. Counts are always computed over the whole
//! active set so the tab badges hold still while the visible list narrows.

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::db::repository::{find_patient, insert_medication, set_medication_active};
use crate::db::{parse_instant, DatabaseError};
use crate::dosing::{classify, next_dose_after, DoseStatus};
use crate::models::Medication;

// ---------------------------------------------------------------------------
// View types
// ---------------------------------------------------------------------------

/// A medication as fetched for the list screen: the record joined with the
/// patient it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicationCard {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub patient_name: String,
    pub name: String,
    pub dosage: String,
    pub frequency: String,
    pub instructions: Option<String>,
    pub prescriber: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub next_dose_time: DateTime<Utc>,
    pub is_active: bool,
}

/// A card decorated with its alert classification for rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MedicationDisplayItem {
    pub medication: MedicationCard,
    pub status: DoseStatus,
    /// "Overdue" / "Due soon" suffix next to the next-dose time, if any.
    pub status_suffix: Option<&'static str>,
}

/// Tab badge counts, always over the full active set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MedicationCounts {
    pub all: u32,
    pub due: u32,
    pub overdue: u32,
}

/// Which filter tab is selected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DoseFilter {
    #[default]
    All,
    Due,
    Overdue,
}

/// Everything the medications screen needs from one projection pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MedicationListView {
    pub items: Vec<MedicationDisplayItem>,
    pub counts: MedicationCounts,
}

// ---------------------------------------------------------------------------
// Projection
// ---------------------------------------------------------------------------

/// Project fetched medications into the list view.
///
/// Inactive medications are dropped before classification. Input order is
/// preserved — the fetch already sorts by `next_dose_time` ascending, and
/// re-sorting here would fight the upstream contract. Pure: identical
/// inputs always produce an identical view.
pub fn project(
    cards: &[MedicationCard],
    now: DateTime<Utc>,
    filter: DoseFilter,
) -> MedicationListView {
    let mut counts = MedicationCounts {
        all: 0,
        due: 0,
        overdue: 0,
    };
    let mut items = Vec::new();

    for card in cards.iter().filter(|c| c.is_active) {
        counts.all += 1;

        let status = classify(card.next_dose_time, now);
        match status {
            DoseStatus::DueSoon => counts.due += 1,
            DoseStatus::Overdue => counts.overdue += 1,
            DoseStatus::Normal => {}
        }

        let visible = match filter {
            DoseFilter::All => true,
            DoseFilter::Due => status == DoseStatus::DueSoon,
            DoseFilter::Overdue => status == DoseStatus::Overdue,
        };
        if visible {
            items.push(MedicationDisplayItem {
                medication: card.clone(),
                status,
                status_suffix: status.suffix(),
            });
        }
    }

    MedicationListView { items, counts }
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Active medications joined with their patient, ordered by next dose.
pub fn fetch_active_medication_cards(
    conn: &Connection,
) -> Result<Vec<MedicationCard>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT m.id, m.patient_id, p.full_name, m.name, m.dosage, m.frequency,
                m.instructions, m.prescriber, m.start_date, m.next_dose_time, m.is_active
         FROM medications m
         INNER JOIN patients p ON m.patient_id = p.id
         WHERE m.is_active = 1
         ORDER BY m.next_dose_time ASC",
    )?;

    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, String>(4)?,
            row.get::<_, String>(5)?,
            row.get::<_, Option<String>>(6)?,
            row.get::<_, Option<String>>(7)?,
            row.get::<_, Option<String>>(8)?,
            row.get::<_, String>(9)?,
            row.get::<_, i32>(10)?,
        ))
    })?;

    let mut cards = Vec::new();
    for row in rows {
        let (
            id,
            patient_id,
            patient_name,
            name,
            dosage,
            frequency,
            instructions,
            prescriber,
            start_date,
            next_dose_time,
            is_active,
        ) = row?;
        cards.push(MedicationCard {
            id: id.parse().unwrap_or_else(|_| Uuid::nil()),
            patient_id: patient_id.parse().unwrap_or_else(|_| Uuid::nil()),
            patient_name,
            name,
            dosage,
            frequency,
            instructions,
            prescriber,
            start_date: start_date
                .as_deref()
                .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()),
            next_dose_time: parse_instant("medications.next_dose_time", &next_dose_time)?,
            is_active: is_active != 0,
        });
    }
    Ok(cards)
}

/// Fetch and project in one call — what a screen refresh runs.
pub fn load_medication_list(
    conn: &Connection,
    now: DateTime<Utc>,
    filter: DoseFilter,
) -> Result<MedicationListView, DatabaseError> {
    let cards = fetch_active_medication_cards(conn)?;
    Ok(project(&cards, now, filter))
}

// ---------------------------------------------------------------------------
// Medication entry
// ---------------------------------------------------------------------------

/// Form input for adding a medication to a patient's schedule.
#[derive(Debug, Clone, Deserialize)]
pub struct NewMedicationInput {
    pub patient_id: Uuid,
    pub name: String,
    pub dosage: String,
    pub frequency: String,
    pub instructions: Option<String>,
    pub prescriber: Option<String>,
    pub start_date: Option<NaiveDate>,
}

#[derive(Debug, Error)]
pub enum MedicationFormError {
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Add a medication. The first dose is scheduled one full interval from
/// `now`, so the active-medication invariant (`next_dose_time` always set)
/// holds from the moment the row exists.
pub fn add_medication(
    conn: &Connection,
    input: &NewMedicationInput,
    now: DateTime<Utc>,
) -> Result<Uuid, MedicationFormError> {
    let name = input.name.trim();
    if name.is_empty() {
        return Err(MedicationFormError::Validation(
            "Medication name is required".into(),
        ));
    }
    if name.len() > 200 {
        return Err(MedicationFormError::Validation(
            "Medication name is too long (max 200 characters)".into(),
        ));
    }
    let dosage = input.dosage.trim();
    if dosage.is_empty() {
        return Err(MedicationFormError::Validation("Dosage is required".into()));
    }
    if dosage.len() > 100 {
        return Err(MedicationFormError::Validation(
            "Dosage is too long (max 100 characters)".into(),
        ));
    }
    let frequency = input.frequency.trim();
    if frequency.is_empty() {
        return Err(MedicationFormError::Validation(
            "Frequency is required".into(),
        ));
    }
    if frequency.len() > 200 {
        return Err(MedicationFormError::Validation(
            "Frequency is too long (max 200 characters)".into(),
        ));
    }

    if find_patient(conn, &input.patient_id)?.is_none() {
        return Err(MedicationFormError::Validation(format!(
            "No patient with id {}",
            input.patient_id
        )));
    }

    let med = Medication {
        id: Uuid::new_v4(),
        patient_id: input.patient_id,
        name: name.into(),
        dosage: dosage.into(),
        frequency: frequency.into(),
        instructions: input.instructions.as_deref().map(str::trim).map(String::from),
        prescriber: input.prescriber.as_deref().map(str::trim).map(String::from),
        start_date: input.start_date,
        next_dose_time: next_dose_after(now, frequency),
        is_active: true,
    };
    insert_medication(conn, &med)?;

    tracing::info!(
        medication_id = %med.id,
        patient_id = %med.patient_id,
        name = %med.name,
        "Medication added to schedule"
    );

    Ok(med.id)
}

/// Take a medication off the schedule. History stays; dosing views drop it.
pub fn deactivate_medication(conn: &Connection, med_id: &Uuid) -> Result<(), DatabaseError> {
    set_medication_active(conn, med_id, false)?;
    tracing::info!(medication_id = %med_id, "Medication deactivated");
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
