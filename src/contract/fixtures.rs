//! Shipped demo documents, embedded for unit tests.

use super::{AssessmentResult, IncentiveResult, Scenario};

pub const SCENARIO_A: &str = include_str!("../../fixtures/demo_outputs/scenario_A.json");
pub const SCENARIO_B: &str = include_str!("../../fixtures/demo_outputs/scenario_B.json");
pub const INCENTIVE_A: &str = include_str!("../../fixtures/demo_outputs/incentive_A.json");
pub const INCENTIVE_B: &str = include_str!("../../fixtures/demo_outputs/incentive_B.json");

pub fn assessment(scenario: Scenario) -> AssessmentResult {
    let raw = match scenario {
        Scenario::A => SCENARIO_A,
        Scenario::B => SCENARIO_B,
    };
    serde_json::from_str(raw).expect("shipped assessment fixture must parse")
}

pub fn incentive(scenario: Scenario) -> IncentiveResult {
    let raw = match scenario {
        Scenario::A => INCENTIVE_A,
        Scenario::B => INCENTIVE_B,
    };
    serde_json::from_str(raw).expect("shipped incentive fixture must parse")
}

pub fn assessment_a() -> AssessmentResult {
    assessment(Scenario::A)
}

pub fn incentive_a() -> IncentiveResult {
    incentive(Scenario::A)
}
