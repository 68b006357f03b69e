//! Demo document contracts.
//!
//! The wizard consumes two static JSON documents per scenario: an assessment
//! (`scenario_{A|B}.json`) and an incentive offer (`incentive_{A|B}.json`).
//! Both are decoded into the types below and validated before the wizard
//! accepts them. The wizard never mutates a loaded document.

pub mod assessment;
pub mod incentive;
pub mod scenario;

#[cfg(test)]
pub(crate) mod fixtures;

use serde::{Deserialize, Serialize};

use crate::error::ContractError;

pub use assessment::{
    AssessmentResult, DecisionSummary, Device, EstimatedImpacts, InputsEcho, OptionScores,
    Priority, Recommendation, RecommendationCategory, RecommendationUi, RulEstimate, Signals,
    Triggers, UserPreferences,
};
pub use incentive::{IncentivePackage, IncentiveResult, PackageUi, PackageValue, Perk};
pub use scenario::Scenario;

/// Advisory footer carried by both documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Disclaimer {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: String,
}

/// A document that can check its own invariants after decoding.
pub trait Validate {
    fn validate(&self) -> Result<(), ContractError>;
}

impl Validate for AssessmentResult {
    fn validate(&self) -> Result<(), ContractError> {
        AssessmentResult::validate(self)
    }
}

impl Validate for IncentiveResult {
    fn validate(&self) -> Result<(), ContractError> {
        IncentiveResult::validate(self)
    }
}

pub(crate) fn check_unit_range(field: &str, value: f64) -> Result<(), ContractError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ContractError::OutOfRange {
            field: field.to_string(),
            value,
            min: 0.0,
            max: 1.0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_range_bounds_are_inclusive() {
        assert!(check_unit_range("x", 0.0).is_ok());
        assert!(check_unit_range("x", 1.0).is_ok());
        assert!(check_unit_range("x", 1.0001).is_err());
        assert!(check_unit_range("x", f64::NAN).is_err());
    }

    #[test]
    fn disclaimer_uses_type_key() {
        let d: Disclaimer =
            serde_json::from_str(r#"{"type": "advisory", "text": "hi"}"#).unwrap();
        assert_eq!(d.kind, "advisory");
    }

    #[test]
    fn every_shipped_document_validates() {
        for scenario in Scenario::ALL {
            let assessment = fixtures::assessment(scenario);
            let incentive = fixtures::incentive(scenario);
            assert!(Validate::validate(&assessment).is_ok(), "scenario {scenario}");
            assert!(Validate::validate(&incentive).is_ok(), "incentive {scenario}");
        }
    }
}
