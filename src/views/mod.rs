//! Text views for the three wizard steps.
//!
//! Views are pure functions of a [`WizardState`] snapshot (plus the step 1
//! form, which is view-local). They never mutate state; the driver feeds user
//! input back through the controller.

pub mod incentive;
pub mod profile;
pub mod results;

use std::fmt::Write;

use crate::contract::Scenario;
use crate::error::FetchError;
use crate::wizard::{LoadState, WizardState, WizardStep};

pub use incentive::{KeyActivation, render_confirmation, render_incentive};
pub use profile::{ProfileForm, render_profile};
pub use results::{ConfidenceLabel, continue_label, render_results};

/// Shell presentation. `?shot=1` selects the chrome-less screenshot mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PresentationMode {
    #[default]
    Standard,
    Screenshot,
}

impl PresentationMode {
    /// Parse a page query string (with or without the leading `?`).
    pub fn from_query(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let shot = query
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .any(|(key, value)| key == "shot" && value == "1");
        if shot { Self::Screenshot } else { Self::Standard }
    }

    pub fn shows_chrome(&self) -> bool {
        matches!(self, Self::Standard)
    }
}

const STEP_TITLES: [&str; 3] = ["Profil", "Sonuçlar", "Teşvik"];

/// Render the whole page: shell chrome plus the active step.
pub fn render_page(state: &WizardState, form: &ProfileForm, mode: PresentationMode) -> String {
    let mut out = String::new();

    if mode.shows_chrome() {
        let _ = writeln!(out, "=== Cihaz Yaşam Döngüsü Asistanı ===");
        let _ = writeln!(out, "Senaryo: {}", scenario_toggle(state.scenario));
    }
    let _ = writeln!(out, "{}", progress(state.step));
    out.push('\n');

    let body = match state.step {
        WizardStep::Profile => render_profile(form),
        WizardStep::Results => match &state.assessment {
            LoadState::Failed(err) => render_error(err),
            LoadState::Ready(_) => render_results(state),
            LoadState::Idle | LoadState::Loading => "Yükleniyor...\n".to_string(),
        },
        WizardStep::Incentive => match &state.incentive {
            LoadState::Failed(err) => render_error(err),
            LoadState::Ready(_) => render_incentive(state),
            LoadState::Idle | LoadState::Loading => "Teşvikler yükleniyor...\n".to_string(),
        },
    };
    out.push_str(&body);

    if state.confirmation_open {
        if let Some(summary) = state.confirmation_summary() {
            out.push('\n');
            out.push_str(&render_confirmation(&summary));
        }
    }

    out
}

/// Error panel shown in place of a view whose fetch failed.
pub fn render_error(err: &FetchError) -> String {
    format!(
        "[!] {}\n    ({})\n    > retry (tekrar dene)\n",
        err.user_message(),
        err.url()
    )
}

fn scenario_toggle(active: Scenario) -> String {
    Scenario::ALL
        .iter()
        .map(|s| {
            if *s == active {
                format!("[{s}]")
            } else {
                format!(" {s} ")
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn progress(step: WizardStep) -> String {
    STEP_TITLES
        .iter()
        .enumerate()
        .map(|(i, title)| {
            let n = i as u8 + 1;
            if n == step.number() {
                format!("({n}) {title}")
            } else {
                format!(" {n}  {title}")
            }
        })
        .collect::<Vec<_>>()
        .join("  ›  ")
}
