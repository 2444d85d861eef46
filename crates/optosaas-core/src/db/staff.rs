//! Staff database operations.

use rusqlite::{params, OptionalExtension};

use super::{Database, DbError, DbResult};
use crate::models::{Staff, StaffRole, StaffStatus};

fn role_to_string(role: &StaffRole) -> &'static str {
    match role {
        StaffRole::SuperAdmin => "super_admin",
        StaffRole::Owner => "owner",
        StaffRole::Manager => "manager",
        StaffRole::Staff => "staff",
    }
}

fn role_from_string(s: &str) -> DbResult<StaffRole> {
    match s {
        "super_admin" => Ok(StaffRole::SuperAdmin),
        "owner" => Ok(StaffRole::Owner),
        "manager" => Ok(StaffRole::Manager),
        "staff" => Ok(StaffRole::Staff),
        other => Err(DbError::Constraint(format!("unknown role: {other}"))),
    }
}

fn status_to_string(status: &StaffStatus) -> &'static str {
    match status {
        StaffStatus::Active => "active",
        StaffStatus::Inactive => "inactive",
    }
}

fn status_from_string(s: &str) -> DbResult<StaffStatus> {
    match s {
        "active" => Ok(StaffStatus::Active),
        "inactive" => Ok(StaffStatus::Inactive),
        other => Err(DbError::Constraint(format!("unknown status: {other}"))),
    }
}

impl Database {
    /// Insert a new staff member, returning them with their assigned id.
    pub fn insert_staff(&self, staff: &Staff) -> DbResult<Staff> {
        let branch_access_json = serde_json::to_string(&staff.branch_access)?;
        self.conn.execute(
            r#"
            INSERT INTO staff (
                franchise_id, name, email, role, branch_access,
                is_dispenser, is_optometrist, status, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
            params![
                staff.franchise_id,
                staff.name,
                staff.email,
                role_to_string(&staff.role),
                branch_access_json,
                staff.is_dispenser,
                staff.is_optometrist,
                status_to_string(&staff.status),
                staff.created_at,
                staff.updated_at,
            ],
        )?;
        let mut inserted = staff.clone();
        inserted.id = self.conn.last_insert_rowid();
        Ok(inserted)
    }

    /// Update an existing staff member.
    pub fn update_staff(&self, staff: &Staff) -> DbResult<bool> {
        let branch_access_json = serde_json::to_string(&staff.branch_access)?;
        let rows_affected = self.conn.execute(
            r#"
            UPDATE staff SET
                franchise_id = ?2,
                name = ?3,
                email = ?4,
                role = ?5,
                branch_access = ?6,
                is_dispenser = ?7,
                is_optometrist = ?8,
                status = ?9,
                updated_at = datetime('now')
            WHERE id = ?1
            "#,
            params![
                staff.id,
                staff.franchise_id,
                staff.name,
                staff.email,
                role_to_string(&staff.role),
                branch_access_json,
                staff.is_dispenser,
                staff.is_optometrist,
                status_to_string(&staff.status),
            ],
        )?;
        Ok(rows_affected > 0)
    }

    /// Get a staff member by id.
    pub fn get_staff(&self, id: i64) -> DbResult<Option<Staff>> {
        let result = self
            .conn
            .query_row(
                r#"
                SELECT id, franchise_id, name, email, role, branch_access,
                       is_dispenser, is_optometrist, status, created_at, updated_at
                FROM staff
                WHERE id = ?
                "#,
                [id],
                map_staff_row,
            )
            .optional()?;
        result.map(|row| row.try_into()).transpose()
    }

    /// List staff of a franchise.
    pub fn list_staff(&self, franchise_id: i64) -> DbResult<Vec<Staff>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, franchise_id, name, email, role, branch_access,
                   is_dispenser, is_optometrist, status, created_at, updated_at
            FROM staff
            WHERE franchise_id = ?
            ORDER BY id
            "#,
        )?;
        let rows = stmt.query_map([franchise_id], map_staff_row)?;

        let mut staff = Vec::new();
        for row in rows {
            staff.push(row?.try_into()?);
        }
        Ok(staff)
    }

    /// List franchise owners across all franchises (super-admin view).
    pub fn list_owners(&self) -> DbResult<Vec<Staff>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, franchise_id, name, email, role, branch_access,
                   is_dispenser, is_optometrist, status, created_at, updated_at
            FROM staff
            WHERE role = 'owner'
            ORDER BY id
            "#,
        )?;
        let rows = stmt.query_map([], map_staff_row)?;

        let mut staff = Vec::new();
        for row in rows {
            staff.push(row?.try_into()?);
        }
        Ok(staff)
    }

    /// Delete a staff member.
    pub fn delete_staff(&self, id: i64) -> DbResult<bool> {
        let rows_affected = self.conn.execute("DELETE FROM staff WHERE id = ?", [id])?;
        Ok(rows_affected > 0)
    }

    /// Mark a staff member inactive (soft delete).
    pub fn deactivate_staff(&self, id: i64) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            "UPDATE staff SET status = 'inactive', updated_at = datetime('now') WHERE id = ?",
            [id],
        )?;
        Ok(rows_affected > 0)
    }
}

/// Intermediate row struct for database mapping.
struct StaffRow {
    id: i64,
    franchise_id: Option<i64>,
    name: String,
    email: String,
    role: String,
    branch_access: String,
    is_dispenser: bool,
    is_optometrist: bool,
    status: String,
    created_at: String,
    updated_at: String,
}

fn map_staff_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<StaffRow> {
    Ok(StaffRow {
        id: row.get(0)?,
        franchise_id: row.get(1)?,
        name: row.get(2)?,
        email: row.get(3)?,
        role: row.get(4)?,
        branch_access: row.get(5)?,
        is_dispenser: row.get(6)?,
        is_optometrist: row.get(7)?,
        status: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

impl TryFrom<StaffRow> for Staff {
    type Error = DbError;

    fn try_from(row: StaffRow) -> Result<Self, Self::Error> {
        Ok(Staff {
            id: row.id,
            franchise_id: row.franchise_id,
            name: row.name,
            email: row.email,
            role: role_from_string(&row.role)?,
            branch_access: serde_json::from_str(&row.branch_access)?,
            is_dispenser: row.is_dispenser,
            is_optometrist: row.is_optometrist,
            status: status_from_string(&row.status)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
