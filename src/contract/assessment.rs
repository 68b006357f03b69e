//! Assessment document model: RUL estimate, decision summary, and ranked
//! recommendation cards.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Disclaimer, check_unit_range};
use crate::error::ContractError;

/// Priority level for a user preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Default for Priority {
    fn default() -> Self {
        Self::Medium
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

impl std::str::FromStr for Priority {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(format!("Unknown priority: {s}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub brand: String,
    pub model: String,
    pub age_months: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signals {
    pub battery_health_percent: u8,
    pub charge_cycles: u32,
    pub frame_drop_rate: f64,
    pub repair_history_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPreferences {
    pub budget_priority: Priority,
    pub sustainability_priority: Priority,
    pub performance_priority: Priority,
    pub prefers_financing: bool,
}

/// Echo of the profile the assessment was produced for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputsEcho {
    pub device: Device,
    pub signals: Signals,
    pub user_preferences: UserPreferences,
}

/// Remaining-useful-life estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RulEstimate {
    pub rul_months_min: u32,
    pub rul_months_max: u32,
    /// Free-text analyst context. Never used for UI classification; see
    /// [`ConfidenceLabel`](crate::views::ConfidenceLabel).
    pub confidence: String,
    pub confidence_score: f64,
    /// Feature names, most influential first.
    #[serde(default)]
    pub key_drivers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionSummary {
    pub recommended_primary_option_id: String,
    pub rationale: String,
    #[serde(default)]
    pub pareto_note: String,
}

/// Kind of action a recommendation proposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationCategory {
    Repair,
    Refurb,
    TradeIn,
}

impl std::fmt::Display for RecommendationCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repair => write!(f, "repair"),
            Self::Refurb => write!(f, "refurb"),
            Self::TradeIn => write!(f, "trade_in"),
        }
    }
}

/// Comparative scores, each in [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionScores {
    pub cost_score: f64,
    pub sustainability_score: f64,
    pub performance_score: f64,
    pub overall_score: f64,
}

impl OptionScores {
    fn validate(&self, option_id: &str) -> Result<(), ContractError> {
        let field = |name: &str| format!("recommendations[{option_id}].scores.{name}");
        check_unit_range(&field("cost_score"), self.cost_score)?;
        check_unit_range(&field("sustainability_score"), self.sustainability_score)?;
        check_unit_range(&field("performance_score"), self.performance_score)?;
        check_unit_range(&field("overall_score"), self.overall_score)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimatedImpacts {
    pub rul_gain_months_min: u32,
    pub rul_gain_months_max: u32,
    pub co2_impact_score: f64,
    pub ewaste_reduction_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationUi {
    pub cta_label: String,
    pub badge: String,
    #[serde(default)]
    pub icon: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Triggers {
    #[serde(default)]
    pub open_incentive_flow: bool,
}

/// One candidate action with its comparative scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub option_id: String,
    pub title: String,
    #[serde(default)]
    pub tagline: String,
    pub category: RecommendationCategory,
    #[serde(default)]
    pub why_this: Vec<String>,
    pub scores: OptionScores,
    pub estimated_impacts: EstimatedImpacts,
    #[serde(default)]
    pub assumptions: Vec<String>,
    #[serde(default)]
    pub next_steps: Vec<String>,
    pub ui: RecommendationUi,
    #[serde(default)]
    pub triggers: Triggers,
}

/// One scenario's assessment output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentResult {
    pub request_id: String,
    pub timestamp_utc: DateTime<Utc>,
    pub model_version: String,
    pub inputs_echo: InputsEcho,
    pub rul_estimate: RulEstimate,
    pub decision_summary: DecisionSummary,
    pub recommendations: Vec<Recommendation>,
    pub disclaimer: Disclaimer,
}

impl AssessmentResult {
    /// Look up a recommendation by option id.
    pub fn recommendation(&self, option_id: &str) -> Option<&Recommendation> {
        self.recommendations.iter().find(|r| r.option_id == option_id)
    }

    /// The recommendation the decision summary marks as primary.
    pub fn primary(&self) -> Option<&Recommendation> {
        self.recommendation(&self.decision_summary.recommended_primary_option_id)
    }

    /// Check the document-level invariants.
    pub fn validate(&self) -> Result<(), ContractError> {
        if self.recommendations.is_empty() {
            return Err(ContractError::Empty {
                field: "recommendations".into(),
            });
        }

        let rul = &self.rul_estimate;
        if rul.rul_months_min > rul.rul_months_max {
            return Err(ContractError::InvertedRange {
                min: rul.rul_months_min,
                max: rul.rul_months_max,
            });
        }
        check_unit_range("rul_estimate.confidence_score", rul.confidence_score)?;

        let signals = &self.inputs_echo.signals;
        if signals.battery_health_percent > 100 {
            return Err(ContractError::OutOfRange {
                field: "inputs_echo.signals.battery_health_percent".into(),
                value: f64::from(signals.battery_health_percent),
                min: 0.0,
                max: 100.0,
            });
        }
        check_unit_range(
            "inputs_echo.signals.frame_drop_rate",
            signals.frame_drop_rate,
        )?;

        let mut seen = HashSet::new();
        for rec in &self.recommendations {
            if rec.option_id.is_empty() {
                return Err(ContractError::Empty {
                    field: "recommendations[].option_id".into(),
                });
            }
            if !seen.insert(rec.option_id.as_str()) {
                return Err(ContractError::DuplicateId {
                    field: "option_id".into(),
                    id: rec.option_id.clone(),
                });
            }
            rec.scores.validate(&rec.option_id)?;
            let impacts = &rec.estimated_impacts;
            check_unit_range(
                &format!("recommendations[{}].estimated_impacts.co2_impact_score", rec.option_id),
                impacts.co2_impact_score,
            )?;
            check_unit_range(
                &format!(
                    "recommendations[{}].estimated_impacts.ewaste_reduction_score",
                    rec.option_id
                ),
                impacts.ewaste_reduction_score,
            )?;
        }

        let primary = &self.decision_summary.recommended_primary_option_id;
        if !seen.contains(primary.as_str()) {
            return Err(ContractError::UnknownPrimaryOption {
                id: primary.clone(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::fixtures;

    #[test]
    fn parses_fixture_document() {
        let result = fixtures::assessment_a();
        assert_eq!(result.recommendations.len(), 3);
        assert_eq!(
            result.decision_summary.recommended_primary_option_id,
            "repair_battery"
        );
        assert_eq!(result.inputs_echo.user_preferences.sustainability_priority, Priority::High);
        assert!(result.validate().is_ok());
    }

    #[test]
    fn primary_resolves_to_recommendation() {
        let result = fixtures::assessment_a();
        let primary = result.primary().unwrap();
        assert_eq!(primary.option_id, "repair_battery");
        assert_eq!(primary.category, RecommendationCategory::Repair);
    }

    #[test]
    fn rejects_empty_recommendations() {
        let mut result = fixtures::assessment_a();
        result.recommendations.clear();
        assert_eq!(
            result.validate(),
            Err(ContractError::Empty {
                field: "recommendations".into()
            })
        );
    }

    #[test]
    fn rejects_unknown_primary() {
        let mut result = fixtures::assessment_a();
        result.decision_summary.recommended_primary_option_id = "teleport".into();
        assert!(matches!(
            result.validate(),
            Err(ContractError::UnknownPrimaryOption { id }) if id == "teleport"
        ));
    }

    #[test]
    fn rejects_duplicate_option_ids() {
        let mut result = fixtures::assessment_a();
        let dup = result.recommendations[0].clone();
        result.recommendations.push(dup);
        assert!(matches!(
            result.validate(),
            Err(ContractError::DuplicateId { .. })
        ));
    }

    #[test]
    fn rejects_score_outside_unit_range() {
        let mut result = fixtures::assessment_a();
        result.recommendations[1].scores.performance_score = 1.2;
        assert!(matches!(
            result.validate(),
            Err(ContractError::OutOfRange { field, .. }) if field.ends_with("performance_score")
        ));
    }

    #[test]
    fn rejects_inverted_rul_range() {
        let mut result = fixtures::assessment_a();
        result.rul_estimate.rul_months_min = 20;
        result.rul_estimate.rul_months_max = 10;
        assert_eq!(
            result.validate(),
            Err(ContractError::InvertedRange { min: 20, max: 10 })
        );
    }

    #[test]
    fn missing_triggers_default_to_closed() {
        let json = serde_json::json!({
            "option_id": "refurb_buy",
            "title": "Refurb",
            "category": "refurb",
            "scores": {
                "cost_score": 0.7,
                "sustainability_score": 0.7,
                "performance_score": 0.8,
                "overall_score": 0.73
            },
            "estimated_impacts": {
                "rul_gain_months_min": 16,
                "rul_gain_months_max": 24,
                "co2_impact_score": 0.7,
                "ewaste_reduction_score": 0.65
            },
            "ui": { "cta_label": "See", "badge": "Balanced" }
        });
        let rec: Recommendation = serde_json::from_value(json).unwrap();
        assert!(!rec.triggers.open_incentive_flow);
        assert!(rec.why_this.is_empty());
    }
}
