//! Franchise and branch reference data.

use serde::{Deserialize, Serialize};

/// A franchise (tenant).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Franchise {
    /// Database id (0 until inserted)
    pub id: i64,
    pub name: String,
    pub created_at: String,
    pub updated_at: String,
}

impl Franchise {
    pub fn new(name: String) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: 0,
            name,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

/// A branch (store location) belonging to a franchise.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Branch {
    /// Database id (0 until inserted)
    pub id: i64,
    pub franchise_id: i64,
    pub name: String,
    pub created_at: String,
    pub updated_at: String,
}

impl Branch {
    pub fn new(franchise_id: i64, name: String) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: 0,
            franchise_id,
            name,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_branch_belongs_to_franchise() {
        let b = Branch::new(1, "Downtown Branch".into());
        assert_eq!(b.franchise_id, 1);
        assert_eq!(b.id, 0);
    }
}
