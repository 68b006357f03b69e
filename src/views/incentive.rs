//! Step 3 view: incentive packages and the offer confirmation dialog.

use std::fmt::Write;

use crate::contract::IncentivePackage;
use crate::wizard::{ConfirmationSummary, WizardState};

/// Keyboard activation on a focused package card. Enter and Space toggle the
/// package exactly like a click does; every other key is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyActivation {
    Enter,
    Space,
}

impl KeyActivation {
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "Enter" | "enter" => Some(Self::Enter),
            " " | "Space" | "space" | "Spacebar" => Some(Self::Space),
            _ => None,
        }
    }
}

fn format_try(amount: u32) -> String {
    let digits = amount.to_string();
    let mut out = String::new();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    format!("{out} TL")
}

/// One-line value description, e.g. `9.100 TL + 9300 puan + Bağış`.
pub fn describe_value(pkg: &IncentivePackage) -> String {
    let mut parts = Vec::new();
    if let Some(cash) = pkg.value.cash_amount_try {
        parts.push(format_try(cash));
    }
    if let Some(points) = pkg.value.carbon_points {
        parts.push(format!("{points} puan"));
    }
    if pkg.value.perk.is_present() {
        parts.push(pkg.value.perk.label().to_string());
    }
    parts.join(" + ")
}

/// Render the incentive step. Expects a loaded incentive document.
pub fn render_incentive(state: &WizardState) -> String {
    let Some(incentive) = state.incentive.data() else {
        return String::new();
    };
    let mut out = String::new();

    let option_title = state
        .assessment
        .data()
        .zip(state.selected_option_id.as_deref())
        .and_then(|(result, id)| result.recommendation(id))
        .map(|rec| rec.title.as_str())
        .unwrap_or("-");
    let _ = writeln!(out, "Teşvik paketleri: {option_title}");
    let _ = writeln!(
        out,
        "Kabul skoru: {:.2} | Etki skoru: {:.2}\n",
        incentive.accept_score, incentive.impact_score
    );

    let selected = state.selected_package_id.as_deref();
    for pkg in &incentive.packages {
        let pick = if selected == Some(pkg.package_id.as_str()) {
            "(x)"
        } else {
            "( )"
        };
        let _ = writeln!(out, "{pick} {} [{}]  ({})", pkg.title, pkg.ui.badge, pkg.package_id);
        if !pkg.description.is_empty() {
            let _ = writeln!(out, "      {}", pkg.description);
        }
        let _ = writeln!(out, "      {}", describe_value(pkg));
    }

    if !incentive.notes.is_empty() {
        out.push('\n');
        for note in &incentive.notes {
            let _ = writeln!(out, "  • {note}");
        }
    }

    out.push('\n');
    match state.confirmation_summary() {
        Some(summary) => {
            let _ = writeln!(out, "Seçim: {} + {}", summary.option_title, summary.package_title);
            let _ = writeln!(out, "  > offer  (Teklif oluştur)");
        }
        None => {
            let _ = writeln!(out, "  > package <package_id>");
            let _ = writeln!(out, "  [Teklif oluştur] (önce bir paket seçin)");
        }
    }

    let _ = writeln!(out, "\n{}", incentive.disclaimer.text);
    out
}

/// Render the confirmation dialog.
pub fn render_confirmation(summary: &ConfirmationSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "┌─ Teklif Özeti ─────────────────────");
    let _ = writeln!(out, "│ Öneri : {} ({})", summary.option_title, summary.option_id);
    let _ = writeln!(out, "│ Paket : {} ({})", summary.package_title, summary.package_id);
    let _ = writeln!(out, "│ Kabul : {:.2}", summary.accept_score);
    let _ = writeln!(out, "│ Etki  : {:.2}", summary.impact_score);
    let _ = writeln!(out, "│ > confirm | close");
    let _ = writeln!(out, "└────────────────────────────────────");
    out
}
