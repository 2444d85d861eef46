//! Appointment types and their clinical outcome catalog.
//!
//! Each appointment type carries an ordered list of valid outcome labels.
//! The mapping lives here, in one place, so dashboards and validation agree
//! on the label set for every type.

use serde::{Deserialize, Serialize};

/// Clinic appointment type as selected on the patient entry form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AppointmentType {
    EyeCheckPrivate,
    EyeCheckNhs,
    EyeCheckClrs,
    EyeCheckClrsNhs,
    ClCheckPrivate,
    ClCheckClrs,
    ClTrial,
    ClTrialReturn,
    MedicalEmergency,
    Recheck,
    PostCatCheck,
    CallBack,
    CallBackNhs,
    ExternalRx,
    ExternalRxNhs,
    ExtraPair,
    NoRxSunglasses,
    GcOnCollection,
}

/// Outcome labels for eye-check style appointments.
const EYE_CHECK_OUTCOMES: &[&str] = &[
    "No Rx",
    "Stable Rx",
    "Change in Rx",
    "Referred",
    "Needs Dilation",
];

/// Outcome labels for contact lens aftercare checks.
const CL_CHECK_OUTCOMES: &[&str] = &[
    "All OK",
    "Try New",
    "Upgrade",
    "Cash Sale",
    "Further Apt",
    "Sight Test",
    "Change in Rx",
];

/// Outcome labels for contact lens trials and trial returns.
const CL_TRIAL_OUTCOMES: &[&str] = &[
    "Signed Up",
    "Trial Return",
    "Cash Sale",
    "Unsuitable",
    "Joined Care Plan",
];

const RECHECK_OUTCOMES: &[&str] = &["All OK", "Remake"];

const EMERGENCY_OUTCOMES: &[&str] = &["Referred", "Needs Dilation", "Discharged"];

impl AppointmentType {
    /// All appointment types, in entry-form order.
    pub const ALL: &'static [AppointmentType] = &[
        AppointmentType::EyeCheckPrivate,
        AppointmentType::EyeCheckNhs,
        AppointmentType::EyeCheckClrs,
        AppointmentType::EyeCheckClrsNhs,
        AppointmentType::ClCheckPrivate,
        AppointmentType::ClCheckClrs,
        AppointmentType::ClTrial,
        AppointmentType::ClTrialReturn,
        AppointmentType::MedicalEmergency,
        AppointmentType::Recheck,
        AppointmentType::PostCatCheck,
        AppointmentType::CallBack,
        AppointmentType::CallBackNhs,
        AppointmentType::ExternalRx,
        AppointmentType::ExternalRxNhs,
        AppointmentType::ExtraPair,
        AppointmentType::NoRxSunglasses,
        AppointmentType::GcOnCollection,
    ];

    /// Human-readable label as shown on the entry form and dashboards.
    pub fn label(&self) -> &'static str {
        match self {
            AppointmentType::EyeCheckPrivate => "Eye Check Private",
            AppointmentType::EyeCheckNhs => "Eye Check NHS",
            AppointmentType::EyeCheckClrs => "Eye Check CLRS",
            AppointmentType::EyeCheckClrsNhs => "Eye Check CLRS NHS",
            AppointmentType::ClCheckPrivate => "CL Check Private",
            AppointmentType::ClCheckClrs => "CL Check CLRS",
            AppointmentType::ClTrial => "CL Trial",
            AppointmentType::ClTrialReturn => "CL Trial Return",
            AppointmentType::MedicalEmergency => "Medical Emergency",
            AppointmentType::Recheck => "Recheck",
            AppointmentType::PostCatCheck => "Post Cat Check",
            AppointmentType::CallBack => "Call Back",
            AppointmentType::CallBackNhs => "Call Back NHS",
            AppointmentType::ExternalRx => "External Rx",
            AppointmentType::ExternalRxNhs => "External Rx NHS",
            AppointmentType::ExtraPair => "Extra Pair",
            AppointmentType::NoRxSunglasses => "No Rx Sunglasses",
            AppointmentType::GcOnCollection => "GC on Collection",
        }
    }

    /// Parse an entry-form label back into a type.
    pub fn from_label(label: &str) -> Option<AppointmentType> {
        AppointmentType::ALL.iter().copied().find(|t| t.label() == label)
    }

    /// Ordered valid outcome labels for this appointment type.
    ///
    /// Dispense-only walk-in types have no clinical outcome and return an
    /// empty slice.
    pub fn outcome_labels(&self) -> &'static [&'static str] {
        match self {
            AppointmentType::EyeCheckPrivate
            | AppointmentType::EyeCheckNhs
            | AppointmentType::EyeCheckClrs
            | AppointmentType::EyeCheckClrsNhs
            | AppointmentType::PostCatCheck
            | AppointmentType::CallBack
            | AppointmentType::CallBackNhs => EYE_CHECK_OUTCOMES,
            AppointmentType::ClCheckPrivate | AppointmentType::ClCheckClrs => CL_CHECK_OUTCOMES,
            AppointmentType::ClTrial | AppointmentType::ClTrialReturn => CL_TRIAL_OUTCOMES,
            AppointmentType::Recheck => RECHECK_OUTCOMES,
            AppointmentType::MedicalEmergency => EMERGENCY_OUTCOMES,
            AppointmentType::ExternalRx
            | AppointmentType::ExternalRxNhs
            | AppointmentType::ExtraPair
            | AppointmentType::NoRxSunglasses
            | AppointmentType::GcOnCollection => &[],
        }
    }

    /// Whether an outcome label is valid for this type.
    pub fn is_valid_outcome(&self, label: &str) -> bool {
        self.outcome_labels().contains(&label)
    }

    /// Whether this type counts as a qualifying appointment in conversion
    /// denominators.
    ///
    /// Walk-in dispense types (Extra Pair, External Rx, No Rx Sunglasses,
    /// GC on Collection) contribute dispenses without qualifying, so
    /// conversion rates are not clamped at 100%.
    pub fn is_qualifying(&self) -> bool {
        !matches!(
            self,
            AppointmentType::ExternalRx
                | AppointmentType::ExternalRxNhs
                | AppointmentType::ExtraPair
                | AppointmentType::NoRxSunglasses
                | AppointmentType::GcOnCollection
        )
    }

    /// Whether this type is an eye examination (used for the CL discussion
    /// and trial-booking uptake denominators).
    pub fn is_eye_exam(&self) -> bool {
        matches!(
            self,
            AppointmentType::EyeCheckPrivate
                | AppointmentType::EyeCheckNhs
                | AppointmentType::EyeCheckClrs
                | AppointmentType::EyeCheckClrsNhs
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_round_trip() {
        for t in AppointmentType::ALL {
            assert_eq!(AppointmentType::from_label(t.label()), Some(*t));
        }
    }

    #[test]
    fn test_outcome_catalog() {
        assert!(AppointmentType::EyeCheckNhs.is_valid_outcome("No Rx"));
        assert!(AppointmentType::EyeCheckNhs.is_valid_outcome("Stable Rx"));
        assert!(!AppointmentType::EyeCheckNhs.is_valid_outcome("All OK"));

        assert!(AppointmentType::ClTrial.is_valid_outcome("Signed Up"));
        assert!(AppointmentType::Recheck.is_valid_outcome("Remake"));
        assert!(AppointmentType::MedicalEmergency.is_valid_outcome("Discharged"));
    }

    #[test]
    fn test_dispense_only_types_have_no_outcomes() {
        assert!(AppointmentType::ExtraPair.outcome_labels().is_empty());
        assert!(AppointmentType::GcOnCollection.outcome_labels().is_empty());
    }

    #[test]
    fn test_qualifying_types() {
        assert!(AppointmentType::EyeCheckPrivate.is_qualifying());
        assert!(AppointmentType::ClTrial.is_qualifying());
        assert!(!AppointmentType::ExtraPair.is_qualifying());
        assert!(!AppointmentType::ExternalRxNhs.is_qualifying());
    }
}
