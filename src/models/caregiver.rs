use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::CareRole;

/// A member of the care team. Identity (passwords, sessions) lives with the
/// auth collaborator; this record carries only what the coordination core
/// needs: who the person is, their role, and whether the account is active.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaregiverAccount {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub role: CareRole,
    pub phone: Option<String>,
    pub is_active: bool,
}
