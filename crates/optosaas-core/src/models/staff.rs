//! Staff models.

use serde::{Deserialize, Serialize};

/// Staff role within the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StaffRole {
    /// Platform administrator with visibility over all franchises
    SuperAdmin,
    /// Franchise owner
    Owner,
    /// Branch manager
    Manager,
    /// Store staff
    Staff,
}

/// Account status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StaffStatus {
    Active,
    Inactive,
}

/// A staff member of a franchise.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Staff {
    /// Database id (0 until inserted)
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: StaffRole,
    /// Franchise this member belongs to (None for super admins)
    pub franchise_id: Option<i64>,
    /// Branches this member may act in
    pub branch_access: Vec<i64>,
    /// May record dispenses
    pub is_dispenser: bool,
    /// May record clinical outcomes
    pub is_optometrist: bool,
    pub status: StaffStatus,
    pub created_at: String,
    pub updated_at: String,
}

impl Staff {
    /// Create a new active staff member for a franchise.
    pub fn new(name: String, email: String, role: StaffRole, franchise_id: i64) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: 0,
            name,
            email,
            role,
            franchise_id: Some(franchise_id),
            branch_access: Vec::new(),
            is_dispenser: false,
            is_optometrist: false,
            status: StaffStatus::Active,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// Whether this member may act in the given branch.
    pub fn has_branch_access(&self, branch_id: i64) -> bool {
        self.branch_access.contains(&branch_id)
    }

    /// Whether this member participates in clinical or dispensing
    /// aggregation at all.
    pub fn is_clinical(&self) -> bool {
        self.is_dispenser || self.is_optometrist
    }

    pub fn is_active(&self) -> bool {
        self.status == StaffStatus::Active
    }

    /// Touch the updated_at timestamp.
    pub fn touch(&mut self) {
        self.updated_at = chrono::Utc::now().to_rfc3339();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_staff_defaults() {
        let s = Staff::new(
            "Lisa Chen".into(),
            "lisa@visioncare.com".into(),
            StaffRole::Staff,
            1,
        );
        assert_eq!(s.franchise_id, Some(1));
        assert!(s.is_active());
        assert!(!s.is_clinical());
        assert!(s.branch_access.is_empty());
    }

    #[test]
    fn test_branch_access() {
        let mut s = Staff::new("a".into(), "a@x.com".into(), StaffRole::Staff, 1);
        s.branch_access = vec![1, 3];
        assert!(s.has_branch_access(1));
        assert!(!s.has_branch_access(2));
        assert!(s.has_branch_access(3));
    }

    #[test]
    fn test_clinical_flags() {
        let mut s = Staff::new("a".into(), "a@x.com".into(), StaffRole::Staff, 1);
        s.is_optometrist = true;
        assert!(s.is_clinical());
        s.is_optometrist = false;
        s.is_dispenser = true;
        assert!(s.is_clinical());
    }
}
