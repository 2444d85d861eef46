//! Patient visit records and dispense line items.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::appointment::AppointmentType;

/// Arrival status for an appointment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArrivalStatus {
    Arrived,
    FailedToAttend,
    Cancelled,
    Rescheduled,
}

/// Yes/No/Not-applicable answer for a tracked service.
///
/// "Not applicable" answers are excluded from uptake denominators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServiceAnswer {
    Yes,
    No,
    NotApplicable,
}

impl ServiceAnswer {
    pub fn is_yes(&self) -> bool {
        matches!(self, ServiceAnswer::Yes)
    }

    pub fn is_applicable(&self) -> bool {
        !matches!(self, ServiceAnswer::NotApplicable)
    }
}

/// OCT scan answer. Clinical, free and staff scans were performed without a
/// retail charge but still count as taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OctAnswer {
    Yes,
    No,
    NotApplicable,
    Clinical,
    Free,
    Staff,
}

impl OctAnswer {
    pub fn is_applicable(&self) -> bool {
        !matches!(self, OctAnswer::NotApplicable)
    }

    pub fn was_taken(&self) -> bool {
        matches!(
            self,
            OctAnswer::Yes | OctAnswer::Clinical | OctAnswer::Free | OctAnswer::Staff
        )
    }
}

/// Where an OCT scan was booked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OctChannel {
    InStore,
    ByCallsHub,
}

/// NHS eligibility reason for an NHS-funded appointment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NhsReason {
    Under16,
    Over60,
    FullTimeEducation16To18,
    Diabetic,
    FamilyHistoryGlaucoma,
    FinancialHelp,
}

/// NHS optical voucher band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NhsVoucherType {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    /// HES voucher
    I,
    J,
}

/// Lens manufacturer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LensManufacturer {
    Boots,
    Essilor,
    Zeiss,
    Norville,
    Bolle,
    Mcr,
    Corporate,
}

impl LensManufacturer {
    /// All manufacturers, in product-grid order.
    pub const ALL: &'static [LensManufacturer] = &[
        LensManufacturer::Boots,
        LensManufacturer::Essilor,
        LensManufacturer::Zeiss,
        LensManufacturer::Norville,
        LensManufacturer::Bolle,
        LensManufacturer::Mcr,
        LensManufacturer::Corporate,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            LensManufacturer::Boots => "Boots",
            LensManufacturer::Essilor => "Essilor",
            LensManufacturer::Zeiss => "Zeiss",
            LensManufacturer::Norville => "Norville",
            LensManufacturer::Bolle => "Bolle",
            LensManufacturer::Mcr => "MCR",
            LensManufacturer::Corporate => "Corporate",
        }
    }
}

/// Vision type of a lens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LensType {
    SingleVision,
    Bifocal,
    Varifocal,
    Office,
}

impl LensType {
    /// All vision types, in product-grid order.
    pub const ALL: &'static [LensType] = &[
        LensType::SingleVision,
        LensType::Bifocal,
        LensType::Varifocal,
        LensType::Office,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            LensType::SingleVision => "Single Vision",
            LensType::Bifocal => "Bifocal",
            LensType::Varifocal => "Varifocal",
            LensType::Office => "Office",
        }
    }
}

/// Lens index (thickness tier).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LensIndex {
    Standard,
    Thin,
    Ultrathin,
    UltrathinPlus,
}

impl LensIndex {
    /// All index tiers, in product-grid order.
    pub const ALL: &'static [LensIndex] = &[
        LensIndex::Standard,
        LensIndex::Thin,
        LensIndex::Ultrathin,
        LensIndex::UltrathinPlus,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            LensIndex::Standard => "Standard",
            LensIndex::Thin => "Thin",
            LensIndex::Ultrathin => "Ultrathin",
            LensIndex::UltrathinPlus => "Ultrathin Plus",
        }
    }
}

/// Lens finish / coating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LensFinish {
    Standard,
    ScratchResistant,
    Protect,
    ProtectPlus,
    UvBlue,
    Eyedrive,
}

impl LensFinish {
    /// Premium finishes tracked as upgrades on the dispenser analysis grid.
    pub fn is_upgrade(&self) -> bool {
        matches!(self, LensFinish::ProtectPlus | LensFinish::UvBlue)
    }

    pub fn label(&self) -> &'static str {
        match self {
            LensFinish::Standard => "Standard",
            LensFinish::ScratchResistant => "Scratch Resistant",
            LensFinish::Protect => "Protect",
            LensFinish::ProtectPlus => "Protect Plus",
            LensFinish::UvBlue => "UV Blue",
            LensFinish::Eyedrive => "Eyedrive",
        }
    }
}

/// Lens tint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LensTint {
    None,
    Sun,
    Transitions,
    Polarised,
}

impl LensTint {
    /// Premium tints tracked as sun upgrades (a plain sun tint is not).
    pub fn is_sun_upgrade(&self) -> bool {
        matches!(self, LensTint::Transitions | LensTint::Polarised)
    }

    pub fn label(&self) -> &'static str {
        match self {
            LensTint::None => "None",
            LensTint::Sun => "Sun",
            LensTint::Transitions => "Transitions",
            LensTint::Polarised => "Polarised",
        }
    }
}

/// One pair/product dispensed within a record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DispenseLineItem {
    pub manufacturer: LensManufacturer,
    pub lens_type: LensType,
    pub lens_index: LensIndex,
    pub finish: LensFinish,
    pub tint: LensTint,
    /// Glasses cover sold with this pair
    pub glasses_cover: bool,
    /// Dispense value in pounds, >= 0
    pub dispense_value: f64,
}

/// Independent payment amounts taken against a record, in pounds.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Payments {
    pub glasses_cover_paid: f64,
    pub oct_fee_paid: f64,
    pub appointment_fee_paid: f64,
    pub accessories_paid: f64,
    pub dispense_amount_paid: f64,
    pub nhs_voucher_value: f64,
}

impl Payments {
    /// Sum of all payment fields.
    pub fn total(&self) -> f64 {
        self.glasses_cover_paid
            + self.oct_fee_paid
            + self.appointment_fee_paid
            + self.accessories_paid
            + self.dispense_amount_paid
            + self.nhs_voucher_value
    }
}

/// One patient visit/appointment event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PatientRecord {
    /// Unique record id
    pub record_id: String,
    /// Franchise this record belongs to
    pub franchise_id: i64,
    /// OPS patient identifier, unique per visit
    pub patient_ref: String,
    pub appointment_date: NaiveDate,
    pub appointment_type: AppointmentType,
    pub nhs_reason: Option<NhsReason>,
    pub arrival_status: ArrivalStatus,

    /// Staff references, each optional
    pub pre_screener: Option<i64>,
    pub optometrist: Option<i64>,
    pub dispenser: Option<i64>,
    pub handover_staff: Option<i64>,

    pub oct: OctAnswer,
    pub oct_booked_via: Option<OctChannel>,
    /// Clinical outcome; valid labels depend on the appointment type
    pub outcome: Option<String>,
    /// Did the optometrist advise new glasses
    pub advised_new_glasses: Option<bool>,
    /// Discussed contact lenses at the eye exam
    pub discussed_cls: ServiceAnswer,
    /// Booked a CL trial after the eye exam
    pub booked_cl_trial: ServiceAnswer,

    /// Did the patient dispense
    pub dispensed: bool,
    /// Calendar day the dispense happened, when it did
    pub dispense_date: Option<NaiveDate>,
    /// Handover from clinical to dispensing staff taken
    pub handover: ServiceAnswer,
    pub line_items: Vec<DispenseLineItem>,

    pub payments: Payments,
    pub nhs_voucher_type: Option<NhsVoucherType>,
    pub ops_transaction_id: Option<String>,

    pub collection_booked: ServiceAnswer,
    pub pcse_completed: ServiceAnswer,

    pub created_at: String,
    pub updated_at: String,
}

impl PatientRecord {
    /// Create a new record with empty dispense and payment data.
    pub fn new(
        franchise_id: i64,
        patient_ref: String,
        appointment_date: NaiveDate,
        appointment_type: AppointmentType,
    ) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            record_id: uuid::Uuid::new_v4().to_string(),
            franchise_id,
            patient_ref,
            appointment_date,
            appointment_type,
            nhs_reason: None,
            arrival_status: ArrivalStatus::Arrived,
            pre_screener: None,
            optometrist: None,
            dispenser: None,
            handover_staff: None,
            oct: OctAnswer::NotApplicable,
            oct_booked_via: None,
            outcome: None,
            advised_new_glasses: None,
            discussed_cls: ServiceAnswer::NotApplicable,
            booked_cl_trial: ServiceAnswer::NotApplicable,
            dispensed: false,
            dispense_date: None,
            handover: ServiceAnswer::NotApplicable,
            line_items: Vec::new(),
            payments: Payments::default(),
            nhs_voucher_type: None,
            ops_transaction_id: None,
            collection_booked: ServiceAnswer::NotApplicable,
            pcse_completed: ServiceAnswer::NotApplicable,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// Total dispense value, derived from line items (never stored).
    pub fn total_dispense_value(&self) -> f64 {
        self.line_items.iter().map(|li| li.dispense_value).sum()
    }

    /// Total transaction value: all payment fields plus the dispense total.
    /// Derived, never stored, so the two cannot drift.
    pub fn total_transaction_value(&self) -> f64 {
        self.payments.total() + self.total_dispense_value()
    }

    /// Whether this record ever resulted in a dispense.
    pub fn has_dispense(&self) -> bool {
        self.dispensed || !self.line_items.is_empty()
    }

    /// Whether the dispense happened on the appointment's calendar day.
    pub fn dispensed_same_day(&self) -> bool {
        self.has_dispense()
            && self
                .dispense_date
                .map(|d| d == self.appointment_date)
                .unwrap_or(false)
    }

    /// Whether the recorded outcome label is valid for the appointment type.
    /// A missing outcome is always acceptable.
    pub fn outcome_is_valid(&self) -> bool {
        match &self.outcome {
            None => true,
            Some(label) => self.appointment_type.is_valid_outcome(label),
        }
    }

    /// Touch the updated_at timestamp.
    pub fn touch(&mut self) {
        self.updated_at = chrono::Utc::now().to_rfc3339();
    }
}
