//! Record filtering contract for dashboards.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{PatientRecord, Staff};

/// Which staff-role field of a record a staff filter applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StaffRoleField {
    PreScreener,
    Optometrist,
    Dispenser,
    HandoverStaff,
}

impl StaffRoleField {
    /// The staff id a record carries in this role field.
    pub fn of(&self, record: &PatientRecord) -> Option<i64> {
        match self {
            StaffRoleField::PreScreener => record.pre_screener,
            StaffRoleField::Optometrist => record.optometrist,
            StaffRoleField::Dispenser => record.dispenser,
            StaffRoleField::HandoverStaff => record.handover_staff,
        }
    }
}

/// A staff filter: which member, acting in which role field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffSelector {
    pub field: StaffRoleField,
    pub id: i64,
}

/// Dashboard filter over records.
///
/// Both date bounds are inclusive, at calendar-day granularity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordFilter {
    pub branch_id: Option<i64>,
    pub staff: Option<StaffSelector>,
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
}

impl RecordFilter {
    /// Filter covering a period, with no branch or staff restriction.
    pub fn for_period(date_from: NaiveDate, date_to: NaiveDate) -> Self {
        Self {
            branch_id: None,
            staff: None,
            date_from,
            date_to,
        }
    }

    /// Restrict to one branch.
    pub fn with_branch(mut self, branch_id: i64) -> Self {
        self.branch_id = Some(branch_id);
        self
    }

    /// Restrict to one staff member acting in the given role field.
    pub fn with_staff(mut self, field: StaffRoleField, id: i64) -> Self {
        self.staff = Some(StaffSelector { field, id });
        self
    }

    /// Whether a record matches this filter.
    ///
    /// Records carry no branch of their own; a branch filter matches when
    /// any staff member referenced by the record has that branch in their
    /// access set.
    pub fn matches(&self, record: &PatientRecord, staff: &StaffDirectory<'_>) -> bool {
        if record.appointment_date < self.date_from || record.appointment_date > self.date_to {
            return false;
        }

        if let Some(branch_id) = self.branch_id {
            let any_access = [
                record.pre_screener,
                record.optometrist,
                record.dispenser,
                record.handover_staff,
            ]
            .iter()
            .flatten()
            .any(|id| {
                staff
                    .get(*id)
                    .map(|s| s.has_branch_access(branch_id))
                    .unwrap_or(false)
            });
            if !any_access {
                return false;
            }
        }

        if let Some(selector) = &self.staff {
            if selector.field.of(record) != Some(selector.id) {
                return false;
            }
        }

        true
    }
}

/// Id-indexed view over a staff slice, used for branch-access lookups
/// during filtering.
pub struct StaffDirectory<'a> {
    by_id: HashMap<i64, &'a Staff>,
}

impl<'a> StaffDirectory<'a> {
    pub fn new(staff: &'a [Staff]) -> Self {
        Self {
            by_id: staff.iter().map(|s| (s.id, s)).collect(),
        }
    }

    pub fn get(&self, id: i64) -> Option<&'a Staff> {
        self.by_id.get(&id).copied()
    }
}
