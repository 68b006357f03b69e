//! Step 2 view: RUL estimate, decision summary, ranked recommendation
//! cards, and the comparison chart.

use std::fmt::Write;

use crate::contract::{AssessmentResult, Recommendation};
use crate::wizard::{WizardState, opens_incentive_flow};

/// Badge shown next to the RUL estimate.
///
/// Derived only from `confidence_score`; the free-text `confidence` field is
/// analyst context and never feeds this.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfidenceLabel {
    High,
    MediumHigh,
    Medium,
}

impl ConfidenceLabel {
    pub fn from_score(score: f64) -> Self {
        if score >= 0.8 {
            Self::High
        } else if score >= 0.6 {
            Self::MediumHigh
        } else {
            Self::Medium
        }
    }
}

impl std::fmt::Display for ConfidenceLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::High => write!(f, "High"),
            Self::MediumHigh => write!(f, "Medium-High"),
            Self::Medium => write!(f, "Medium"),
        }
    }
}

/// Label for the continue button given the current gate.
pub fn continue_label(gate_open: bool) -> &'static str {
    if gate_open {
        "Teşviklere devam et"
    } else {
        "Bu seçenekle tamamla"
    }
}

const BAR_WIDTH: usize = 20;

fn bar(score: f64) -> String {
    let filled = (score.clamp(0.0, 1.0) * BAR_WIDTH as f64).round() as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled))
}

/// Comparison chart: one block per recommendation, primary option starred.
pub fn render_chart(result: &AssessmentResult) -> String {
    let primary = result.primary().map(|rec| rec.option_id.as_str());
    let mut out = String::new();
    let _ = writeln!(out, "Karşılaştırma");
    for rec in &result.recommendations {
        let marker = if primary == Some(rec.option_id.as_str()) {
            "*"
        } else {
            " "
        };
        let _ = writeln!(out, " {marker} {}", rec.option_id);
        let scores = &rec.scores;
        for (label, value) in [
            ("maliyet", scores.cost_score),
            ("sürdürülebilirlik", scores.sustainability_score),
            ("performans", scores.performance_score),
            ("genel", scores.overall_score),
        ] {
            let _ = writeln!(out, "     {label:<18} {} {value:.2}", bar(value));
        }
    }
    out
}

fn render_card(out: &mut String, rec: &Recommendation, rank: usize, selected: bool) {
    let pick = if selected { "(x)" } else { "( )" };
    let _ = writeln!(
        out,
        "{pick} {rank}. {} [{}]  ({})",
        rec.title, rec.ui.badge, rec.option_id
    );
    if !rec.tagline.is_empty() {
        let _ = writeln!(out, "      {}", rec.tagline);
    }
    let impacts = &rec.estimated_impacts;
    let _ = writeln!(
        out,
        "      RUL kazancı: {}-{} ay | CO₂: {:.2} | e-atık: {:.2}",
        impacts.rul_gain_months_min,
        impacts.rul_gain_months_max,
        impacts.co2_impact_score,
        impacts.ewaste_reduction_score
    );
    if selected {
        for line in &rec.why_this {
            let _ = writeln!(out, "      + {line}");
        }
        for line in &rec.assumptions {
            let _ = writeln!(out, "      ~ {line}");
        }
        for (i, line) in rec.next_steps.iter().enumerate() {
            let _ = writeln!(out, "      {}. {line}", i + 1);
        }
    }
}

/// Render the results step. Expects a loaded assessment.
pub fn render_results(state: &WizardState) -> String {
    let Some(result) = state.assessment.data() else {
        return String::new();
    };
    let mut out = String::new();

    let rul = &result.rul_estimate;
    let _ = writeln!(
        out,
        "Tahmini kalan ömür (RUL): {}-{} ay  [Güven: {}]",
        rul.rul_months_min,
        rul.rul_months_max,
        ConfidenceLabel::from_score(rul.confidence_score)
    );
    if !rul.key_drivers.is_empty() {
        let _ = writeln!(out, "Etkenler: {}", rul.key_drivers.join(", "));
    }

    let summary = &result.decision_summary;
    match result.primary() {
        Some(rec) => {
            let _ = writeln!(out, "\nÖnerilen: {} ({})", rec.title, rec.option_id);
        }
        None => {
            let _ = writeln!(out, "\nÖnerilen: {}", summary.recommended_primary_option_id);
        }
    }
    let _ = writeln!(out, "{}", summary.rationale);
    if !summary.pareto_note.is_empty() {
        let _ = writeln!(out, "{}", summary.pareto_note);
    }
    out.push('\n');

    let selected = state.selected_option_id.as_deref();
    for (i, rec) in result.recommendations.iter().enumerate() {
        render_card(&mut out, rec, i + 1, selected == Some(rec.option_id.as_str()));
    }
    out.push('\n');
    out.push_str(&render_chart(result));
    out.push('\n');

    match selected.and_then(|id| result.recommendation(id)) {
        None => {
            let _ = writeln!(out, "  > select <option_id>");
        }
        Some(rec) if state.completion_visible() => {
            let _ = writeln!(
                out,
                "[✓] Akış tamamlandı: {} için teşvik adımı yok. Sonraki adımlar yukarıda.",
                rec.option_id
            );
        }
        Some(rec) => {
            let _ = writeln!(
                out,
                "  > continue  ({})",
                continue_label(opens_incentive_flow(rec))
            );
        }
    }

    let _ = writeln!(out, "\n{}", result.disclaimer.text);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::{Scenario, fixtures};

    fn results_state(scenario: Scenario) -> WizardState {
        let mut state = WizardState::new(scenario);
        state.apply_assessment(Ok(fixtures::assessment(scenario)));
        state.evaluate().unwrap();
        state
    }

    #[test]
    fn confidence_thresholds() {
        assert_eq!(ConfidenceLabel::from_score(0.95), ConfidenceLabel::High);
        assert_eq!(ConfidenceLabel::from_score(0.8), ConfidenceLabel::High);
        assert_eq!(ConfidenceLabel::from_score(0.7999), ConfidenceLabel::MediumHigh);
        assert_eq!(ConfidenceLabel::from_score(0.6), ConfidenceLabel::MediumHigh);
        assert_eq!(ConfidenceLabel::from_score(0.5999), ConfidenceLabel::Medium);
        assert_eq!(ConfidenceLabel::from_score(0.0), ConfidenceLabel::Medium);
    }

    #[test]
    fn confidence_sweep_matches_rule() {
        for i in 0..=100 {
            let s = f64::from(i) / 100.0;
            let expected = if s >= 0.8 {
                "High"
            } else if s >= 0.6 {
                "Medium-High"
            } else {
                "Medium"
            };
            assert_eq!(ConfidenceLabel::from_score(s).to_string(), expected, "score {s}");
        }
    }

    #[test]
    fn label_ignores_free_text_confidence() {
        let mut state = results_state(Scenario::A);
        let mut result = fixtures::assessment(Scenario::A);
        result.rul_estimate.confidence = "high".into();
        result.rul_estimate.confidence_score = 0.5;
        state.apply_assessment(Ok(result));
        let out = render_results(&state);
        assert!(out.contains("[Güven: Medium]"));
    }

    #[test]
    fn continue_label_follows_gate() {
        let mut state = results_state(Scenario::A);
        state.select_option("repair_battery").unwrap();
        assert!(render_results(&state).contains(continue_label(true)));

        state.select_option("refurb_buy").unwrap();
        assert!(render_results(&state).contains(continue_label(false)));
    }

    #[test]
    fn completion_panel_is_scoped_to_option() {
        let mut state = results_state(Scenario::B);
        state.select_option("refurb_buy").unwrap();
        state.continue_from_results().unwrap();
        assert!(render_results(&state).contains("Akış tamamlandı: refurb_buy"));

        state.select_option("repair_battery").unwrap();
        assert!(!render_results(&state).contains("Akış tamamlandı"));
    }

    #[test]
    fn chart_marks_primary_option() {
        let result = fixtures::assessment(Scenario::B);
        let chart = render_chart(&result);
        assert!(chart.contains(" * refurb_buy"));
        assert!(chart.contains("   tradein_new"));
    }

    #[test]
    fn summary_names_primary_by_title() {
        let state = results_state(Scenario::A);
        assert!(render_results(&state).contains("Önerilen: Batarya Değişimi (repair_battery)"));
    }

    #[test]
    fn bar_is_clamped() {
        assert_eq!(bar(1.7).chars().filter(|c| *c == '█').count(), BAR_WIDTH);
        assert_eq!(bar(-0.3).chars().filter(|c| *c == '█').count(), 0);
    }
}
