use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::PatientStatus;

/// A person receiving care. Medications belong to exactly one patient.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    pub id: Uuid,
    pub full_name: String,
    pub status: PatientStatus,
    pub date_of_birth: Option<NaiveDate>,
}
