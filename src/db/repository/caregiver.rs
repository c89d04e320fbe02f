use std::str::FromStr;

use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::enums::CareRole;
use crate::models::CaregiverAccount;

pub fn insert_caregiver(
    conn: &Connection,
    account: &CaregiverAccount,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO caregivers (id, email, full_name, role, phone, is_active)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            account.id.to_string(),
            account.email,
            account.full_name,
            account.role.as_str(),
            account.phone,
            account.is_active as i32,
        ],
    )?;
    Ok(())
}

pub fn find_caregiver(
    conn: &Connection,
    account_id: &Uuid,
) -> Result<Option<CaregiverAccount>, DatabaseError> {
    let result = conn.query_row(
        "SELECT id, email, full_name, role, phone, is_active
         FROM caregivers WHERE id = ?1",
        params![account_id.to_string()],
        caregiver_row,
    );

    match result {
        Ok(row) => Ok(Some(caregiver_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(DatabaseError::from(e)),
    }
}

pub fn find_caregiver_by_email(
    conn: &Connection,
    email: &str,
) -> Result<Option<CaregiverAccount>, DatabaseError> {
    let result = conn.query_row(
        "SELECT id, email, full_name, role, phone, is_active
         FROM caregivers WHERE email = ?1 COLLATE NOCASE",
        params![email],
        caregiver_row,
    );

    match result {
        Ok(row) => Ok(Some(caregiver_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(DatabaseError::from(e)),
    }
}

pub fn fetch_caregivers(conn: &Connection) -> Result<Vec<CaregiverAccount>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, email, full_name, role, phone, is_active
         FROM caregivers ORDER BY full_name ASC",
    )?;

    let rows = stmt.query_map([], caregiver_row)?;

    let mut accounts = Vec::new();
    for row in rows {
        accounts.push(caregiver_from_row(row?)?);
    }
    Ok(accounts)
}

/// Full-row update by id.
pub fn update_caregiver(
    conn: &Connection,
    account: &CaregiverAccount,
) -> Result<(), DatabaseError> {
    let rows = conn.execute(
        "UPDATE caregivers SET email = ?1, full_name = ?2, role = ?3, phone = ?4, is_active = ?5
         WHERE id = ?6",
        params![
            account.email,
            account.full_name,
            account.role.as_str(),
            account.phone,
            account.is_active as i32,
            account.id.to_string(),
        ],
    )?;
    if rows == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "CaregiverAccount".into(),
            id: account.id.to_string(),
        });
    }
    Ok(())
}

pub fn set_caregiver_active(
    conn: &Connection,
    account_id: &Uuid,
    active: bool,
) -> Result<(), DatabaseError> {
    let rows = conn.execute(
        "UPDATE caregivers SET is_active = ?1 WHERE id = ?2",
        params![active as i32, account_id.to_string()],
    )?;
    if rows == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "CaregiverAccount".into(),
            id: account_id.to_string(),
        });
    }
    Ok(())
}

pub fn count_active_admins(conn: &Connection) -> Result<u32, DatabaseError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM caregivers WHERE role = 'admin' AND is_active = 1",
        [],
        |row| row.get(0),
    )?;
    Ok(count)
}

struct CaregiverRow {
    id: String,
    email: String,
    full_name: String,
    role: String,
    phone: Option<String>,
    is_active: i32,
}

fn caregiver_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<CaregiverRow> {
    Ok(CaregiverRow {
        id: row.get(0)?,
        email: row.get(1)?,
        full_name: row.get(2)?,
        role: row.get(3)?,
        phone: row.get(4)?,
        is_active: row.get(5)?,
    })
}

fn caregiver_from_row(row: CaregiverRow) -> Result<CaregiverAccount, DatabaseError> {
    Ok(CaregiverAccount {
        id: row.id.parse().unwrap_or_else(|_| Uuid::nil()),
        email: row.email,
        full_name: row.full_name,
        role: CareRole::from_str(&row.role)?,
        phone: row.phone,
        is_active: row.is_active != 0,
    })
}
