//! Role capability checks.
//!
//! The dashboard used to gate admin screens by conditionally rendering
//! them; here the gate is an explicit check at the operation boundary.
//! Default-deny: a capability is granted only when the role's table says
//! so, and an inactive account holds no capabilities at all.

use thiserror::Error;

use crate::models::enums::CareRole;
use crate::models::CaregiverAccount;

// ═══════════════════════════════════════════════════════════
// Types
// ═══════════════════════════════════════════════════════════

/// What an operation requires of the acting account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    ViewDashboard,
    ViewMedications,
    LogDoses,
    ManageMedications,
    ManageUsers,
}

impl CareRole {
    /// The capability table. Admins hold everything; caregivers everything
    /// but user administration; family members are read-only.
    pub fn allows(self, capability: Capability) -> bool {
        match self {
            CareRole::Admin => true,
            CareRole::Caregiver => capability != Capability::ManageUsers,
            CareRole::Family => matches!(
                capability,
                Capability::ViewDashboard | Capability::ViewMedications
            ),
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Error type
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthorizationError {
    #[error("Account {account} ({role:?}) lacks the {capability:?} capability")]
    Forbidden {
        account: String,
        role: CareRole,
        capability: Capability,
    },

    #[error("Account {account} is deactivated")]
    AccountInactive { account: String },
}

// ═══════════════════════════════════════════════════════════
// Check
// ═══════════════════════════════════════════════════════════

/// Require `capability` of the acting account, or say exactly why not.
pub fn require(
    account: &CaregiverAccount,
    capability: Capability,
) -> Result<(), AuthorizationError> {
    if !account.is_active {
        return Err(AuthorizationError::AccountInactive {
            account: account.email.clone(),
        });
    }
    if !account.role.allows(capability) {
        return Err(AuthorizationError::Forbidden {
            account: account.email.clone(),
            role: account.role,
            capability,
        });
    }
    Ok(())
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════
