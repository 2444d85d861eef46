//! Franchise and branch database operations.

use rusqlite::{params, OptionalExtension};

use super::{Database, DbResult};
use crate::models::{Branch, Franchise};

impl Database {
    /// Insert a new franchise, returning it with its assigned id.
    pub fn insert_franchise(&self, franchise: &Franchise) -> DbResult<Franchise> {
        self.conn.execute(
            r#"
            INSERT INTO franchises (name, created_at, updated_at)
            VALUES (?1, ?2, ?3)
            "#,
            params![franchise.name, franchise.created_at, franchise.updated_at],
        )?;
        let mut inserted = franchise.clone();
        inserted.id = self.conn.last_insert_rowid();
        Ok(inserted)
    }

    /// Get a franchise by id.
    pub fn get_franchise(&self, id: i64) -> DbResult<Option<Franchise>> {
        self.conn
            .query_row(
                "SELECT id, name, created_at, updated_at FROM franchises WHERE id = ?",
                [id],
                |row| {
                    Ok(Franchise {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        created_at: row.get(2)?,
                        updated_at: row.get(3)?,
                    })
                },
            )
            .optional()
            .map_err(Into::into)
    }

    /// List all franchises (super-admin view).
    pub fn list_franchises(&self) -> DbResult<Vec<Franchise>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, created_at, updated_at FROM franchises ORDER BY name",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(Franchise {
                id: row.get(0)?,
                name: row.get(1)?,
                created_at: row.get(2)?,
                updated_at: row.get(3)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Rename a franchise.
    pub fn update_franchise(&self, franchise: &Franchise) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            "UPDATE franchises SET name = ?2, updated_at = datetime('now') WHERE id = ?1",
            params![franchise.id, franchise.name],
        )?;
        Ok(rows_affected > 0)
    }

    /// Insert a new branch, returning it with its assigned id.
    pub fn insert_branch(&self, branch: &Branch) -> DbResult<Branch> {
        self.conn.execute(
            r#"
            INSERT INTO branches (franchise_id, name, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![
                branch.franchise_id,
                branch.name,
                branch.created_at,
                branch.updated_at
            ],
        )?;
        let mut inserted = branch.clone();
        inserted.id = self.conn.last_insert_rowid();
        Ok(inserted)
    }

    /// Get a branch by id.
    pub fn get_branch(&self, id: i64) -> DbResult<Option<Branch>> {
        self.conn
            .query_row(
                r#"
                SELECT id, franchise_id, name, created_at, updated_at
                FROM branches
                WHERE id = ?
                "#,
                [id],
                |row| {
                    Ok(Branch {
                        id: row.get(0)?,
                        franchise_id: row.get(1)?,
                        name: row.get(2)?,
                        created_at: row.get(3)?,
                        updated_at: row.get(4)?,
                    })
                },
            )
            .optional()
            .map_err(Into::into)
    }

    /// List branches of a franchise.
    pub fn list_branches(&self, franchise_id: i64) -> DbResult<Vec<Branch>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, franchise_id, name, created_at, updated_at
            FROM branches
            WHERE franchise_id = ?
            ORDER BY name
            "#,
        )?;
        let rows = stmt.query_map([franchise_id], |row| {
            Ok(Branch {
                id: row.get(0)?,
                franchise_id: row.get(1)?,
                name: row.get(2)?,
                created_at: row.get(3)?,
                updated_at: row.get(4)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Rename a branch.
    pub fn update_branch(&self, branch: &Branch) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            "UPDATE branches SET name = ?2, updated_at = datetime('now') WHERE id = ?1",
            params![branch.id, branch.name],
        )?;
        Ok(rows_affected > 0)
    }

    /// Delete a branch.
    pub fn delete_branch(&self, id: i64) -> DbResult<bool> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM branches WHERE id = ?", [id])?;
        Ok(rows_affected > 0)
    }

    /// Display names for a set of branch ids, in input order. Unknown ids
    /// are skipped.
    pub fn branch_names(&self, branch_ids: &[i64]) -> DbResult<Vec<String>> {
        let mut names = Vec::new();
        for id in branch_ids {
            if let Some(branch) = self.get_branch(*id)? {
                names.push(branch.name);
            }
        }
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_db() -> Database {
        Database::open_in_memory().unwrap()
    }

    #[test]
    fn test_insert_and_get_franchise() {
        let db = setup_db();
        let franchise = db
            .insert_franchise(&Franchise::new("VisionCare Opticians".into()))
            .unwrap();
        assert!(franchise.id > 0);

        let retrieved = db.get_franchise(franchise.id).unwrap().unwrap();
        assert_eq!(retrieved.name, "VisionCare Opticians");
    }

    #[test]
    fn test_list_branches_scoped_to_franchise() {
        let db = setup_db();
        let f1 = db.insert_franchise(&Franchise::new("VisionCare".into())).unwrap();
        let f2 = db.insert_franchise(&Franchise::new("EyeCare Plus".into())).unwrap();

        db.insert_branch(&Branch::new(f1.id, "Downtown Branch".into())).unwrap();
        db.insert_branch(&Branch::new(f1.id, "Mall Branch".into())).unwrap();
        db.insert_branch(&Branch::new(f2.id, "High Street".into())).unwrap();

        let branches = db.list_branches(f1.id).unwrap();
        assert_eq!(branches.len(), 2);
        assert!(branches.iter().all(|b| b.franchise_id == f1.id));
    }

    #[test]
    fn test_update_and_delete_branch() {
        let db = setup_db();
        let f = db.insert_franchise(&Franchise::new("VisionCare".into())).unwrap();
        let mut branch = db
            .insert_branch(&Branch::new(f.id, "North Side".into()))
            .unwrap();

        branch.name = "North Side Branch".into();
        assert!(db.update_branch(&branch).unwrap());
        assert_eq!(
            db.get_branch(branch.id).unwrap().unwrap().name,
            "North Side Branch"
        );

        assert!(db.delete_branch(branch.id).unwrap());
        assert!(db.get_branch(branch.id).unwrap().is_none());
    }

    #[test]
    fn test_branch_names_skips_unknown() {
        let db = setup_db();
        let f = db.insert_franchise(&Franchise::new("VisionCare".into())).unwrap();
        let b1 = db.insert_branch(&Branch::new(f.id, "Downtown Branch".into())).unwrap();
        let b2 = db.insert_branch(&Branch::new(f.id, "Mall Branch".into())).unwrap();

        let names = db.branch_names(&[b1.id, 999, b2.id]).unwrap();
        assert_eq!(names, vec!["Downtown Branch", "Mall Branch"]);
    }
}
