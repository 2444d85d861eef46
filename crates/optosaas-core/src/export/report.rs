//! Metrics and leaderboard reports, serializable to JSON and CSV.

use serde::{Deserialize, Serialize};

use crate::metrics::{round1, DashboardMetrics, Leaderboard, ProductCount, RecordFilter};

/// A dashboard metrics snapshot for one filter period.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsReport {
    /// Export timestamp
    pub generated_at: String,
    /// Period start (ISO calendar date)
    pub date_from: String,
    /// Period end (ISO calendar date)
    pub date_to: String,
    pub branch_id: Option<i64>,
    pub metrics: DashboardMetrics,
}

impl MetricsReport {
    /// Build a report from aggregator output and the filter it came from.
    pub fn new(filter: &RecordFilter, metrics: DashboardMetrics) -> Self {
        Self {
            generated_at: chrono::Utc::now().to_rfc3339(),
            date_from: filter.date_from.to_string(),
            date_to: filter.date_to.to_string(),
            branch_id: filter.branch_id,
            metrics,
        }
    }

    /// Export to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Export to CSV, one metric per row. Percentages are rounded to the
    /// one-decimal display precision.
    pub fn to_csv(&self) -> String {
        let mut csv = String::new();
        csv.push_str("metric,value\n");

        let m = &self.metrics;
        let rows: Vec<(&str, String)> = vec![
            ("records", m.record_count.to_string()),
            ("qualifying_appointments", m.qualifying_appointments.to_string()),
            ("dispenses", m.dispense_count.to_string()),
            ("dispense_line_items", m.line_item_count.to_string()),
            ("same_day_conversion_pct", format!("{:.1}", round1(m.conversion.same_day))),
            ("internal_conversion_pct", format!("{:.1}", round1(m.conversion.internal))),
            ("overall_conversion_pct", format!("{:.1}", round1(m.conversion.overall))),
            ("discussed_cls_pct", format!("{:.1}", round1(m.conversion.discussed_cls))),
            ("booked_trial_pct", format!("{:.1}", round1(m.conversion.booked_trial))),
            ("dispense_revenue", format!("{:.2}", m.revenue.dispense_revenue)),
            ("per_dispense", format!("{:.2}", m.revenue.per_dispense)),
            ("total_revenue", format!("{:.2}", m.revenue.total_revenue)),
            ("rpt", format!("{:.2}", m.revenue.rpt)),
            ("handovers_taken_pct", format!("{:.1}", round1(m.services.handovers_taken))),
            ("glasses_cover_pct", format!("{:.1}", round1(m.services.glasses_cover))),
            ("oct_booked_pct", format!("{:.1}", round1(m.services.oct_booked))),
            ("extra_pairs_pct", format!("{:.1}", round1(m.services.extra_pairs))),
        ];
        for (name, value) in rows {
            csv.push_str(&format!("{},{}\n", escape_csv(name), escape_csv(&value)));
        }

        for breakdown in &m.outcome_breakdowns {
            for outcome in &breakdown.outcomes {
                csv.push_str(&format!(
                    "{},{}\n",
                    escape_csv(&format!(
                        "outcome:{}:{}",
                        breakdown.appointment_type.label(),
                        outcome.label
                    )),
                    outcome.count,
                ));
            }
        }

        let product_sections: [(&str, &[ProductCount]); 5] = [
            ("lens_brand", &m.products.lens_brand),
            ("lens_index", &m.products.lens_index),
            ("vision_type", &m.products.vision_type),
            ("finish_upgrade", &m.products.finish_upgrades),
            ("sun_upgrade", &m.products.sun_upgrades),
        ];
        for (section, counts) in product_sections {
            for product in counts {
                csv.push_str(&format!(
                    "{},{}\n",
                    escape_csv(&format!("product:{}:{}", section, product.label)),
                    product.count,
                ));
            }
        }

        csv
    }
}

/// A ranked leaderboard for one filter period.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardReport {
    /// Export timestamp
    pub generated_at: String,
    pub date_from: String,
    pub date_to: String,
    pub leaderboard: Leaderboard,
}

impl LeaderboardReport {
    pub fn new(filter: &RecordFilter, leaderboard: Leaderboard) -> Self {
        Self {
            generated_at: chrono::Utc::now().to_rfc3339(),
            date_from: filter.date_from.to_string(),
            date_to: filter.date_to.to_string(),
            leaderboard,
        }
    }

    /// Export to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Export to CSV: rank, staff, value.
    pub fn to_csv(&self) -> String {
        let mut csv = String::new();
        csv.push_str("rank,staff_id,name,value\n");
        for (index, entry) in self.leaderboard.entries.iter().enumerate() {
            csv.push_str(&format!(
                "{},{},{},{:.1}\n",
                index + 1,
                entry.staff_id,
                escape_csv(&entry.name),
                round1(entry.value),
            ));
        }
        csv
    }
}

/// Escape a string for CSV output.
fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
