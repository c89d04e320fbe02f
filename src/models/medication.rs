use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::DoseLogStatus;

/// A prescribed (or over-the-counter) medication on a patient's schedule.
///
/// `next_dose_time` is the single source of truth for when the next dose is
/// due. It is always set for an active medication and only moves forward when
/// a caregiver logs the dose as taken.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Medication {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub name: String,
    pub dosage: String,
    pub frequency: String,
    pub instructions: Option<String>,
    pub prescriber: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub next_dose_time: DateTime<Utc>,
    pub is_active: bool,
}

/// One caregiver action against a medication. Append-only: entries are
/// never updated or deleted once written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MedicationLogEntry {
    pub id: Uuid,
    pub medication_id: Uuid,
    pub status: DoseLogStatus,
    pub logged_at: DateTime<Utc>,
    pub logged_by: Uuid,
}

impl MedicationLogEntry {
    pub fn new(
        medication_id: Uuid,
        status: DoseLogStatus,
        logged_by: Uuid,
        logged_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            medication_id,
            status,
            logged_at,
            logged_by,
        }
    }
}
