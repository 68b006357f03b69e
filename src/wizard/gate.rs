//! Step 3 gating rule.

use crate::contract::{AssessmentResult, Recommendation};

/// Option id that always opens the incentive flow, whatever its trigger flag
/// says.
pub const TRADE_IN_OPTION_ID: &str = "tradein_new";

/// Whether choosing `rec` leads into the incentive step.
pub fn opens_incentive_flow(rec: &Recommendation) -> bool {
    rec.triggers.open_incentive_flow || rec.option_id == TRADE_IN_OPTION_ID
}

/// True iff the recommendation matching `selected` opens the incentive flow.
///
/// False when nothing is selected, nothing is loaded, or the id is not part
/// of the loaded assessment.
pub fn step3_gate(assessment: Option<&AssessmentResult>, selected: Option<&str>) -> bool {
    match (assessment, selected) {
        (Some(result), Some(id)) => result.recommendation(id).is_some_and(opens_incentive_flow),
        _ => false,
    }
}
