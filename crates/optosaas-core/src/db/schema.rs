//! SQLite schema definition.

/// Complete database schema for optosaas.
pub const SCHEMA: &str = r#"
-- Enable foreign keys
PRAGMA foreign_keys = ON;

-- ============================================================================
-- Franchises (tenants)
-- ============================================================================

CREATE TABLE IF NOT EXISTS franchises (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- ============================================================================
-- Branches
-- ============================================================================

CREATE TABLE IF NOT EXISTS branches (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    franchise_id INTEGER NOT NULL REFERENCES franchises(id),
    name TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_branches_franchise ON branches(franchise_id);

-- ============================================================================
-- Staff
-- ============================================================================

CREATE TABLE IF NOT EXISTS staff (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    franchise_id INTEGER REFERENCES franchises(id),  -- NULL for super admins
    name TEXT NOT NULL,
    email TEXT NOT NULL,
    role TEXT NOT NULL CHECK (role IN ('super_admin', 'owner', 'manager', 'staff')),
    branch_access TEXT NOT NULL DEFAULT '[]',        -- JSON array of branch ids
    is_dispenser INTEGER NOT NULL DEFAULT 0,
    is_optometrist INTEGER NOT NULL DEFAULT 0,
    status TEXT NOT NULL DEFAULT 'active' CHECK (status IN ('active', 'inactive')),
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_staff_franchise ON staff(franchise_id);
CREATE INDEX IF NOT EXISTS idx_staff_email ON staff(email);

-- ============================================================================
-- Patient Records
-- ============================================================================

-- The full record is stored as a JSON body; the scalar columns exist for
-- filtering without deserializing every row.
CREATE TABLE IF NOT EXISTS patient_records (
    record_id TEXT PRIMARY KEY,
    franchise_id INTEGER NOT NULL REFERENCES franchises(id),
    patient_ref TEXT NOT NULL,
    appointment_date TEXT NOT NULL,                  -- ISO calendar date
    appointment_type TEXT NOT NULL,
    optometrist INTEGER REFERENCES staff(id),
    dispenser INTEGER REFERENCES staff(id),
    body TEXT NOT NULL,                              -- JSON PatientRecord
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_records_franchise ON patient_records(franchise_id);
CREATE INDEX IF NOT EXISTS idx_records_date ON patient_records(appointment_date);
CREATE INDEX IF NOT EXISTS idx_records_optometrist ON patient_records(optometrist);
CREATE INDEX IF NOT EXISTS idx_records_dispenser ON patient_records(dispenser);
"#;
