//! Staff leaderboard ranking.

use serde::{Deserialize, Serialize};

use super::{aggregate, RecordFilter, StaffRoleField};
use crate::models::{PatientRecord, Staff};

/// Metric a leaderboard ranks by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LeaderboardMetric {
    SameDayConversion,
    OverallConversion,
    OctConversion,
    RevenuePerTest,
}

impl LeaderboardMetric {
    /// Display name for report headers.
    pub fn label(&self) -> &'static str {
        match self {
            LeaderboardMetric::SameDayConversion => "Same Day Conversion",
            LeaderboardMetric::OverallConversion => "Overall Conversion",
            LeaderboardMetric::OctConversion => "OCT CR%",
            LeaderboardMetric::RevenuePerTest => "RPT",
        }
    }
}

/// One ranked staff member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub staff_id: i64,
    pub name: String,
    pub value: f64,
}

/// A ranked staff table plus the team average of the metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Leaderboard {
    pub metric: LeaderboardMetric,
    /// Descending by value; ties break by ascending staff id so rankings
    /// are deterministic
    pub entries: Vec<LeaderboardEntry>,
    /// Arithmetic mean of the metric across entries, 0 when empty
    pub team_average: f64,
}

/// Rank the staff members eligible for the given role field.
///
/// Eligibility follows capability flags: the optometrist field ranks
/// optometrists, the dispenser and handover fields rank dispensers, and the
/// pre-screener field ranks anyone clinical. A branch filter also excludes
/// staff without access to that branch. Each member's figure is computed by
/// re-aggregating the record set with the filter narrowed to them.
pub fn rank(
    records: &[PatientRecord],
    staff: &[Staff],
    filter: &RecordFilter,
    field: StaffRoleField,
    metric: LeaderboardMetric,
) -> Leaderboard {
    let eligible = staff.iter().filter(|s| {
        let capable = match field {
            StaffRoleField::Optometrist => s.is_optometrist,
            StaffRoleField::Dispenser | StaffRoleField::HandoverStaff => s.is_dispenser,
            StaffRoleField::PreScreener => s.is_clinical(),
        };
        let in_branch = filter
            .branch_id
            .map(|b| s.has_branch_access(b))
            .unwrap_or(true);
        capable && in_branch
    });

    let mut entries: Vec<LeaderboardEntry> = eligible
        .map(|member| {
            let member_filter = filter.clone().with_staff(field, member.id);
            let metrics = aggregate(records, staff, &member_filter);
            let value = match metric {
                LeaderboardMetric::SameDayConversion => metrics.conversion.same_day,
                LeaderboardMetric::OverallConversion => metrics.conversion.overall,
                LeaderboardMetric::OctConversion => metrics.services.oct_booked,
                LeaderboardMetric::RevenuePerTest => metrics.revenue.rpt,
            };
            LeaderboardEntry {
                staff_id: member.id,
                name: member.name.clone(),
                value,
            }
        })
        .collect();

    entries.sort_by(|a, b| {
        b.value
            .partial_cmp(&a.value)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.staff_id.cmp(&b.staff_id))
    });

    let team_average = if entries.is_empty() {
        0.0
    } else {
        entries.iter().map(|e| e.value).sum::<f64>() / entries.len() as f64
    };

    Leaderboard {
        metric,
        entries,
        team_average,
    }
}
