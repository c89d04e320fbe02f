//! Care-team administration: listing, inviting, updating, and deactivating
//! accounts. Every entry point checks the `ManageUsers` capability before
//! touching the store — the whole screen is admin-only.
//!
//! Accounts are soft-deleted. The one hard rule is that the team can never
//! be left without an active admin.

use rusqlite::Connection;
use thiserror::Error;
use uuid::Uuid;

use crate::authorization::{require, AuthorizationError, Capability};
use crate::db::repository::{
    count_active_admins, fetch_caregivers, find_caregiver, find_caregiver_by_email,
    insert_caregiver, set_caregiver_active, update_caregiver,
};
use crate::db::DatabaseError;
use crate::models::enums::CareRole;
use crate::models::CaregiverAccount;

#[derive(Debug, Error)]
pub enum AdminError {
    #[error(transparent)]
    Forbidden(#[from] AuthorizationError),

    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Invitation form for a new care-team member.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct NewAccountInput {
    pub email: String,
    pub full_name: String,
    pub role: CareRole,
    pub phone: Option<String>,
}

/// Shallow shape check; deliverability is the mail system's problem.
fn validate_email(email: &str) -> Result<(), AdminError> {
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
        }
        None => false,
    };
    if !valid || email.len() > 254 {
        return Err(AdminError::Validation(format!("Invalid email: {email}")));
    }
    Ok(())
}

/// All accounts, active and deactivated, sorted by name.
pub fn list_accounts(
    conn: &Connection,
    acting: &CaregiverAccount,
) -> Result<Vec<CaregiverAccount>, AdminError> {
    require(acting, Capability::ManageUsers)?;
    Ok(fetch_caregivers(conn)?)
}

/// Create an account for a new team member.
pub fn create_account(
    conn: &Connection,
    acting: &CaregiverAccount,
    input: &NewAccountInput,
) -> Result<Uuid, AdminError> {
    require(acting, Capability::ManageUsers)?;

    let email = input.email.trim();
    validate_email(email)?;
    let full_name = input.full_name.trim();
    if full_name.is_empty() {
        return Err(AdminError::Validation("Full name is required".into()));
    }
    if find_caregiver_by_email(conn, email)?.is_some() {
        return Err(AdminError::Validation(format!(
            "An account already exists for {email}"
        )));
    }

    let account = CaregiverAccount {
        id: Uuid::new_v4(),
        email: email.into(),
        full_name: full_name.into(),
        role: input.role,
        phone: input.phone.as_deref().map(str::trim).map(String::from),
        is_active: true,
    };
    insert_caregiver(conn, &account)?;

    tracing::info!(
        account_id = %account.id,
        role = account.role.as_str(),
        created_by = %acting.id,
        "Care-team account created"
    );

    Ok(account.id)
}

/// Update an account in place (email, name, role, phone, active flag).
pub fn update_account(
    conn: &Connection,
    acting: &CaregiverAccount,
    updated: &CaregiverAccount,
) -> Result<(), AdminError> {
    require(acting, Capability::ManageUsers)?;

    let existing = find_caregiver(conn, &updated.id)?.ok_or_else(|| {
        AdminError::Validation(format!("No account with id {}", updated.id))
    })?;

    let email = updated.email.trim();
    validate_email(email)?;
    if let Some(other) = find_caregiver_by_email(conn, email)? {
        if other.id != updated.id {
            return Err(AdminError::Validation(format!(
                "An account already exists for {email}"
            )));
        }
    }
    if updated.full_name.trim().is_empty() {
        return Err(AdminError::Validation("Full name is required".into()));
    }

    let loses_admin = existing.role == CareRole::Admin
        && existing.is_active
        && (updated.role != CareRole::Admin || !updated.is_active);
    if loses_admin && count_active_admins(conn)? <= 1 {
        return Err(AdminError::Validation(
            "Cannot remove the last active admin".into(),
        ));
    }

    update_caregiver(conn, updated)?;

    tracing::info!(
        account_id = %updated.id,
        updated_by = %acting.id,
        "Care-team account updated"
    );

    Ok(())
}

/// Soft-delete an account. Its log history keeps pointing at it.
pub fn deactivate_account(
    conn: &Connection,
    acting: &CaregiverAccount,
    account_id: &Uuid,
) -> Result<(), AdminError> {
    require(acting, Capability::ManageUsers)?;

    let target = find_caregiver(conn, account_id)?.ok_or_else(|| {
        AdminError::Validation(format!("No account with id {account_id}"))
    })?;

    if target.role == CareRole::Admin && target.is_active && count_active_admins(conn)? <= 1 {
        return Err(AdminError::Validation(
            "Cannot remove the last active admin".into(),
        ));
    }

    set_caregiver_active(conn, account_id, false)?;

    tracing::info!(
        account_id = %account_id,
        deactivated_by = %acting.id,
        "Care-team account deactivated"
    );

    Ok(())
}
