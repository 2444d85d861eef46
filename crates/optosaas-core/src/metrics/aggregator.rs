//! The metrics aggregator: filtered records in, dashboard figures out.

use serde::{Deserialize, Serialize};

use super::{RecordFilter, StaffDirectory};
use crate::models::{
    AppointmentType, ArrivalStatus, DispenseLineItem, LensFinish, LensIndex, LensManufacturer,
    LensTint, LensType, PatientRecord, Staff,
};

/// Count and whole-percent share of one outcome label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeCount {
    pub label: String,
    pub count: usize,
    /// Rounded to the nearest whole percent. Because each label rounds
    /// independently, a type's percentages need not sum to exactly 100.
    pub percentage: u32,
}

/// Outcome breakdown for one appointment type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeBreakdown {
    pub appointment_type: AppointmentType,
    /// Records of this type carrying a valid outcome label
    pub total: usize,
    pub outcomes: Vec<OutcomeCount>,
}

/// Conversion percentages. Raw values, uncapped; a dispense-heavy period can
/// legitimately exceed 100%.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversionMetrics {
    pub same_day: f64,
    pub overall: f64,
    /// Share of qualifying appointments that themselves dispensed. Walk-in
    /// dispenses count toward overall but not here, so internal never
    /// exceeds 100%.
    pub internal: f64,
    /// Discussed contact lenses at the eye exam
    pub discussed_cls: f64,
    /// Booked a CL trial after the eye exam
    pub booked_trial: f64,
}

/// Revenue figures in pounds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RevenueMetrics {
    /// Sum of dispense line-item values
    pub dispense_revenue: f64,
    /// Average value per dispense line item
    pub per_dispense: f64,
    /// Sum of total transaction values
    pub total_revenue: f64,
    /// Revenue per test: total revenue over qualifying appointments
    pub rpt: f64,
}

/// Service uptake percentages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceUptake {
    pub handovers_taken: f64,
    pub glasses_cover: f64,
    pub oct_booked: f64,
    pub extra_pairs: f64,
}

/// Count and whole-percent share of one product attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductCount {
    pub label: String,
    pub count: usize,
    pub percentage: u32,
}

/// Product mix across dispense line items, for the dispenser analysis grid.
///
/// Brand, index and vision-type shares are over all line items; finish and
/// sun upgrade shares are within the upgraded items, so a single Protect
/// Plus pair reads as 100% of finish upgrades.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductMix {
    pub lens_brand: Vec<ProductCount>,
    pub lens_index: Vec<ProductCount>,
    pub vision_type: Vec<ProductCount>,
    pub finish_upgrades: Vec<ProductCount>,
    pub sun_upgrades: Vec<ProductCount>,
}

/// Everything a dashboard needs for one filtered set of records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardMetrics {
    /// Records matching the filter
    pub record_count: usize,
    /// Attended test-type appointments (conversion/RPT denominator)
    pub qualifying_appointments: usize,
    /// Records that resulted in a dispense
    pub dispense_count: usize,
    /// Dispense line items across all records
    pub line_item_count: usize,
    pub outcome_breakdowns: Vec<OutcomeBreakdown>,
    pub conversion: ConversionMetrics,
    pub revenue: RevenueMetrics,
    pub services: ServiceUptake,
    pub products: ProductMix,
}

impl DashboardMetrics {
    /// Metrics of an empty record set: every figure zero, nothing NaN.
    pub fn empty() -> Self {
        Self {
            record_count: 0,
            qualifying_appointments: 0,
            dispense_count: 0,
            line_item_count: 0,
            outcome_breakdowns: Vec::new(),
            conversion: ConversionMetrics::default(),
            revenue: RevenueMetrics::default(),
            services: ServiceUptake::default(),
            products: ProductMix::default(),
        }
    }
}

/// Percentage with a zero-denominator guard: 0, never NaN.
fn pct(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64 * 100.0
    }
}

/// Division with a zero-denominator guard.
fn per(total: f64, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        total / count as f64
    }
}

/// Round to one decimal place, the display precision for conversion and
/// uptake percentages.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Aggregate a record set under a filter into dashboard metrics.
///
/// Pure function: same inputs, same output, no ambient reads. Empty or
/// all-filtered-out inputs produce [`DashboardMetrics::empty`].
pub fn aggregate(
    records: &[PatientRecord],
    staff: &[Staff],
    filter: &RecordFilter,
) -> DashboardMetrics {
    let directory = StaffDirectory::new(staff);
    let filtered: Vec<&PatientRecord> = records
        .iter()
        .filter(|r| filter.matches(r, &directory))
        .collect();

    log::debug!(
        "aggregating {} of {} records for {} to {}",
        filtered.len(),
        records.len(),
        filter.date_from,
        filter.date_to
    );

    if filtered.is_empty() {
        return DashboardMetrics::empty();
    }

    let is_attended_test = |r: &PatientRecord| {
        r.appointment_type.is_qualifying() && r.arrival_status == ArrivalStatus::Arrived
    };
    let qualifying = filtered.iter().filter(|r| is_attended_test(r)).count();
    let dispensed: Vec<&&PatientRecord> = filtered.iter().filter(|r| r.has_dispense()).collect();
    let same_day = filtered.iter().filter(|r| r.dispensed_same_day()).count();
    let internal = filtered
        .iter()
        .filter(|r| is_attended_test(r) && r.has_dispense())
        .count();

    let line_item_count: usize = filtered.iter().map(|r| r.line_items.len()).sum();
    let dispense_revenue: f64 = filtered.iter().map(|r| r.total_dispense_value()).sum();
    let total_revenue: f64 = filtered.iter().map(|r| r.total_transaction_value()).sum();

    let conversion = ConversionMetrics {
        same_day: pct(same_day, qualifying),
        overall: pct(dispensed.len(), qualifying),
        internal: pct(internal, qualifying),
        discussed_cls: uptake(
            &filtered,
            |r| r.appointment_type.is_eye_exam() && r.discussed_cls.is_applicable(),
            |r| r.discussed_cls.is_yes(),
        ),
        booked_trial: uptake(
            &filtered,
            |r| r.appointment_type.is_eye_exam() && r.booked_cl_trial.is_applicable(),
            |r| r.booked_cl_trial.is_yes(),
        ),
    };

    let revenue = RevenueMetrics {
        dispense_revenue,
        per_dispense: per(dispense_revenue, line_item_count),
        total_revenue,
        rpt: per(total_revenue, qualifying),
    };

    let services = ServiceUptake {
        handovers_taken: uptake(&filtered, |r| r.handover.is_applicable(), |r| {
            r.handover.is_yes()
        }),
        glasses_cover: uptake(&filtered, |r| r.has_dispense(), |r| {
            r.line_items.iter().any(|li| li.glasses_cover)
        }),
        oct_booked: uptake(&filtered, |r| r.oct.is_applicable(), |r| r.oct.was_taken()),
        extra_pairs: uptake(&filtered, |r| r.has_dispense(), |r| {
            r.line_items.len() > 1 || r.appointment_type == AppointmentType::ExtraPair
        }),
    };

    DashboardMetrics {
        record_count: filtered.len(),
        qualifying_appointments: qualifying,
        dispense_count: dispensed.len(),
        line_item_count,
        outcome_breakdowns: outcome_breakdowns(&filtered),
        conversion,
        revenue,
        services,
        products: product_mix(&filtered),
    }
}

/// Uptake percentage: yes-count over applicable-count.
fn uptake(
    records: &[&PatientRecord],
    applicable: impl Fn(&PatientRecord) -> bool,
    yes: impl Fn(&PatientRecord) -> bool,
) -> f64 {
    let denominator = records.iter().filter(|r| applicable(r)).count();
    let numerator = records.iter().filter(|r| applicable(r) && yes(r)).count();
    pct(numerator, denominator)
}

/// Per-type outcome breakdowns, in entry-form type order and catalog label
/// order. Only records carrying a valid outcome for their type contribute,
/// so counts always sum to the breakdown total.
fn outcome_breakdowns(records: &[&PatientRecord]) -> Vec<OutcomeBreakdown> {
    let mut breakdowns = Vec::new();

    for appointment_type in AppointmentType::ALL {
        let labels = appointment_type.outcome_labels();
        if labels.is_empty() {
            continue;
        }

        let with_outcome: Vec<&str> = records
            .iter()
            .filter(|r| r.appointment_type == *appointment_type)
            .filter_map(|r| r.outcome.as_deref())
            .filter(|o| appointment_type.is_valid_outcome(o))
            .collect();
        if with_outcome.is_empty() {
            continue;
        }

        let total = with_outcome.len();
        let outcomes = labels
            .iter()
            .map(|label| {
                let count = with_outcome.iter().filter(|o| *o == label).count();
                OutcomeCount {
                    label: (*label).to_string(),
                    count,
                    percentage: (pct(count, total)).round() as u32,
                }
            })
            .collect();

        breakdowns.push(OutcomeBreakdown {
            appointment_type: *appointment_type,
            total,
            outcomes,
        });
    }

    breakdowns
}

/// Count each catalog value's line items and its whole-percent share of
/// the denominator.
fn product_counts<T: Copy>(
    items: &[&DispenseLineItem],
    catalog: &[T],
    label: impl Fn(T) -> &'static str,
    matches: impl Fn(T, &DispenseLineItem) -> bool,
    denominator: usize,
) -> Vec<ProductCount> {
    catalog
        .iter()
        .map(|value| {
            let count = items.iter().filter(|li| matches(*value, li)).count();
            ProductCount {
                label: label(*value).to_string(),
                count,
                percentage: pct(count, denominator).round() as u32,
            }
        })
        .collect()
}

/// Product mix over every line item in the filtered set. Upgrade shares use
/// the upgraded-item count as their denominator, matching the dispenser
/// analysis grid.
fn product_mix(records: &[&PatientRecord]) -> ProductMix {
    let items: Vec<&DispenseLineItem> = records.iter().flat_map(|r| &r.line_items).collect();
    let finish_upgraded = items.iter().filter(|li| li.finish.is_upgrade()).count();
    let sun_upgraded = items.iter().filter(|li| li.tint.is_sun_upgrade()).count();

    ProductMix {
        lens_brand: product_counts(
            &items,
            LensManufacturer::ALL,
            |m| m.label(),
            |m, li| li.manufacturer == m,
            items.len(),
        ),
        lens_index: product_counts(
            &items,
            LensIndex::ALL,
            |i| i.label(),
            |i, li| li.lens_index == i,
            items.len(),
        ),
        vision_type: product_counts(
            &items,
            LensType::ALL,
            |t| t.label(),
            |t, li| li.lens_type == t,
            items.len(),
        ),
        finish_upgrades: product_counts(
            &items,
            &[LensFinish::ProtectPlus, LensFinish::UvBlue],
            |f| f.label(),
            |f, li| li.finish == f,
            finish_upgraded,
        ),
        sun_upgrades: product_counts(
            &items,
            &[LensTint::Transitions, LensTint::Polarised],
            |t| t.label(),
            |t, li| li.tint == t,
            sun_upgraded,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        ArrivalStatus, DispenseLineItem, LensFinish, LensIndex, LensManufacturer, LensTint,
        LensType, OctAnswer, ServiceAnswer,
    };
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn june_filter() -> RecordFilter {
        RecordFilter::for_period(date(2025, 6, 1), date(2025, 6, 30))
    }

    fn record(appointment_type: AppointmentType) -> PatientRecord {
        PatientRecord::new(1, "OPS-1".into(), date(2025, 6, 1), appointment_type)
    }

    fn line_item(value: f64, glasses_cover: bool) -> DispenseLineItem {
        DispenseLineItem {
            manufacturer: LensManufacturer::Boots,
            lens_type: LensType::SingleVision,
            lens_index: LensIndex::Standard,
            finish: LensFinish::Standard,
            tint: LensTint::None,
            glasses_cover,
            dispense_value: value,
        }
    }

    #[test]
    fn test_empty_input_is_all_zero() {
        let metrics = aggregate(&[], &[], &june_filter());
        assert_eq!(metrics, DashboardMetrics::empty());
        assert_eq!(metrics.conversion.same_day, 0.0);
        assert_eq!(metrics.revenue.rpt, 0.0);
    }

    #[test]
    fn test_outcome_breakdown_two_records() {
        let mut r1 = record(AppointmentType::EyeCheckNhs);
        r1.outcome = Some("No Rx".into());
        let mut r2 = record(AppointmentType::EyeCheckNhs);
        r2.outcome = Some("Stable Rx".into());

        let metrics = aggregate(&[r1, r2], &[], &june_filter());

        assert_eq!(metrics.outcome_breakdowns.len(), 1);
        let breakdown = &metrics.outcome_breakdowns[0];
        assert_eq!(breakdown.appointment_type, AppointmentType::EyeCheckNhs);
        assert_eq!(breakdown.total, 2);

        let no_rx = breakdown.outcomes.iter().find(|o| o.label == "No Rx").unwrap();
        assert_eq!((no_rx.count, no_rx.percentage), (1, 50));
        let stable = breakdown.outcomes.iter().find(|o| o.label == "Stable Rx").unwrap();
        assert_eq!((stable.count, stable.percentage), (1, 50));
    }

    #[test]
    fn test_outcome_counts_sum_to_total() {
        let outcomes = ["No Rx", "Stable Rx", "Change in Rx", "Stable Rx", "Referred"];
        let records: Vec<PatientRecord> = outcomes
            .iter()
            .map(|o| {
                let mut r = record(AppointmentType::EyeCheckPrivate);
                r.outcome = Some((*o).into());
                r
            })
            .collect();

        let metrics = aggregate(&records, &[], &june_filter());
        let breakdown = &metrics.outcome_breakdowns[0];
        let count_sum: usize = breakdown.outcomes.iter().map(|o| o.count).sum();
        assert_eq!(count_sum, breakdown.total);
        assert_eq!(breakdown.total, 5);
    }

    #[test]
    fn test_same_day_and_overall_conversion() {
        // Two attended eye checks; one dispensed same day, one three days on.
        let mut r1 = record(AppointmentType::EyeCheckPrivate);
        r1.dispensed = true;
        r1.dispense_date = Some(date(2025, 6, 1));
        let mut r2 = record(AppointmentType::EyeCheckPrivate);
        r2.dispensed = true;
        r2.dispense_date = Some(date(2025, 6, 4));

        let metrics = aggregate(&[r1, r2], &[], &june_filter());
        assert_eq!(metrics.qualifying_appointments, 2);
        assert_eq!(metrics.conversion.same_day, 50.0);
        assert_eq!(metrics.conversion.overall, 100.0);
    }

    #[test]
    fn test_overall_conversion_exceeds_100_with_walk_in_dispenses() {
        // One attended test, dispensed, plus an extra-pair walk-in dispense:
        // 2 dispenses over 1 qualifying appointment.
        let mut test = record(AppointmentType::EyeCheckPrivate);
        test.dispensed = true;
        test.dispense_date = Some(date(2025, 6, 1));
        let mut walk_in = record(AppointmentType::ExtraPair);
        walk_in.dispensed = true;
        walk_in.dispense_date = Some(date(2025, 6, 1));

        let metrics = aggregate(&[test, walk_in], &[], &june_filter());
        assert_eq!(metrics.qualifying_appointments, 1);
        assert_eq!(metrics.conversion.overall, 200.0);
        assert_eq!(metrics.conversion.same_day, 200.0);
        // The walk-in is not an internal dispense
        assert_eq!(metrics.conversion.internal, 100.0);
    }

    #[test]
    fn test_internal_conversion_counts_qualifying_dispenses_only() {
        let mut converted = record(AppointmentType::EyeCheckPrivate);
        converted.dispensed = true;
        converted.dispense_date = Some(date(2025, 6, 3));
        let browsed = record(AppointmentType::EyeCheckPrivate);
        let mut walk_in = record(AppointmentType::NoRxSunglasses);
        walk_in.dispensed = true;
        walk_in.dispense_date = Some(date(2025, 6, 1));

        let metrics = aggregate(&[converted, browsed, walk_in], &[], &june_filter());
        assert_eq!(metrics.qualifying_appointments, 2);
        assert_eq!(metrics.dispense_count, 2);
        assert_eq!(metrics.conversion.internal, 50.0);
        assert_eq!(metrics.conversion.overall, 100.0);
    }

    #[test]
    fn test_product_mix_shares_over_line_items() {
        let mut r1 = record(AppointmentType::EyeCheckPrivate);
        r1.line_items.push(line_item(180.0, false));
        let mut zeiss = line_item(240.0, false);
        zeiss.manufacturer = LensManufacturer::Zeiss;
        zeiss.lens_index = LensIndex::Ultrathin;
        r1.line_items.push(zeiss);

        let metrics = aggregate(&[r1], &[], &june_filter());
        let mix = &metrics.products;

        let brand = |label: &str| mix.lens_brand.iter().find(|c| c.label == label).unwrap();
        assert_eq!((brand("Boots").count, brand("Boots").percentage), (1, 50));
        assert_eq!((brand("Zeiss").count, brand("Zeiss").percentage), (1, 50));
        assert_eq!(brand("Essilor").count, 0);

        let index = |label: &str| mix.lens_index.iter().find(|c| c.label == label).unwrap();
        assert_eq!(index("Standard").count, 1);
        assert_eq!(index("Ultrathin").count, 1);

        let vision = |label: &str| mix.vision_type.iter().find(|c| c.label == label).unwrap();
        assert_eq!((vision("Single Vision").count, vision("Single Vision").percentage), (2, 100));
    }

    #[test]
    fn test_upgrade_shares_within_upgraded_items() {
        // Two pairs, one Protect Plus: that upgrade is 100% of upgrades
        let mut r = record(AppointmentType::EyeCheckPrivate);
        let mut upgraded = line_item(200.0, false);
        upgraded.finish = LensFinish::ProtectPlus;
        r.line_items.push(upgraded);
        r.line_items.push(line_item(120.0, false));

        let metrics = aggregate(&[r], &[], &june_filter());
        let mix = &metrics.products;

        let protect = mix
            .finish_upgrades
            .iter()
            .find(|c| c.label == "Protect Plus")
            .unwrap();
        assert_eq!((protect.count, protect.percentage), (1, 100));
        let uv = mix.finish_upgrades.iter().find(|c| c.label == "UV Blue").unwrap();
        assert_eq!((uv.count, uv.percentage), (0, 0));

        // No premium tints sold: zero counts, zero percent, no NaN
        assert!(mix.sun_upgrades.iter().all(|c| c.count == 0 && c.percentage == 0));
    }

    #[test]
    fn test_unattended_appointments_do_not_qualify() {
        let mut r = record(AppointmentType::EyeCheckNhs);
        r.arrival_status = ArrivalStatus::FailedToAttend;

        let metrics = aggregate(&[r], &[], &june_filter());
        assert_eq!(metrics.record_count, 1);
        assert_eq!(metrics.qualifying_appointments, 0);
        assert_eq!(metrics.revenue.rpt, 0.0);
    }

    #[test]
    fn test_revenue_metrics() {
        let mut r = record(AppointmentType::EyeCheckPrivate);
        r.dispensed = true;
        r.dispense_date = Some(date(2025, 6, 1));
        r.line_items.push(line_item(180.0, false));
        r.line_items.push(line_item(240.0, false));
        r.payments.appointment_fee_paid = 30.0;
        r.payments.oct_fee_paid = 10.0;

        let metrics = aggregate(&[r], &[], &june_filter());
        assert_eq!(metrics.line_item_count, 2);
        assert_eq!(metrics.revenue.dispense_revenue, 420.0);
        assert_eq!(metrics.revenue.per_dispense, 210.0);
        assert_eq!(metrics.revenue.total_revenue, 460.0);
        assert_eq!(metrics.revenue.rpt, 460.0);
    }

    #[test]
    fn test_per_dispense_times_count_equals_revenue() {
        let mut r = record(AppointmentType::EyeCheckPrivate);
        r.line_items.push(line_item(99.5, false));
        r.line_items.push(line_item(150.25, false));
        r.line_items.push(line_item(310.0, false));

        let metrics = aggregate(&[r], &[], &june_filter());
        let reconstructed = metrics.revenue.per_dispense * metrics.line_item_count as f64;
        assert!((reconstructed - metrics.revenue.dispense_revenue).abs() < 1e-9);
    }

    #[test]
    fn test_service_uptake_excludes_not_applicable() {
        let mut r1 = record(AppointmentType::EyeCheckNhs);
        r1.handover = ServiceAnswer::Yes;
        r1.oct = OctAnswer::Yes;
        let mut r2 = record(AppointmentType::EyeCheckNhs);
        r2.handover = ServiceAnswer::No;
        r2.oct = OctAnswer::No;
        let mut r3 = record(AppointmentType::EyeCheckNhs);
        r3.handover = ServiceAnswer::NotApplicable;
        r3.oct = OctAnswer::NotApplicable;

        let metrics = aggregate(&[r1, r2, r3], &[], &june_filter());
        // N/A records drop out of the denominator: 1 of 2, not 1 of 3
        assert_eq!(metrics.services.handovers_taken, 50.0);
        assert_eq!(metrics.services.oct_booked, 50.0);
    }

    #[test]
    fn test_glasses_cover_uptake_over_dispensing_records() {
        let mut covered = record(AppointmentType::EyeCheckPrivate);
        covered.line_items.push(line_item(120.0, true));
        let mut uncovered = record(AppointmentType::EyeCheckPrivate);
        uncovered.line_items.push(line_item(90.0, false));
        let no_dispense = record(AppointmentType::EyeCheckPrivate);

        let metrics = aggregate(&[covered, uncovered, no_dispense], &[], &june_filter());
        assert_eq!(metrics.services.glasses_cover, 50.0);
    }

    #[test]
    fn test_aggregation_is_idempotent() {
        let mut r = record(AppointmentType::ClTrial);
        r.outcome = Some("Signed Up".into());
        r.dispensed = true;
        r.dispense_date = Some(date(2025, 6, 1));
        r.line_items.push(line_item(75.0, false));
        let records = vec![r];

        let first = aggregate(&records, &[], &june_filter());
        let second = aggregate(&records, &[], &june_filter());
        assert_eq!(first, second);
    }

    #[test]
    fn test_round1() {
        assert_eq!(round1(33.333333), 33.3);
        assert_eq!(round1(66.666666), 66.7);
        assert_eq!(round1(0.0), 0.0);
    }
}
