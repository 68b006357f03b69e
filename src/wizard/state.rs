//! Wizard state machine — tracks which step the user is on, what is loaded,
//! and what the user picked.
//!
//! Every transition is a plain method on [`WizardState`] so the whole flow can
//! be exercised without rendering or fetching anything.

use std::sync::Arc;

use serde::Serialize;

use super::gate;
use crate::contract::{AssessmentResult, IncentiveResult, Scenario};
use crate::error::{FetchError, TransitionError};

/// The three wizard steps.
///
/// Forward: Profile → Results → Incentive. Back moves one step at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    Profile,
    Results,
    Incentive,
}

impl WizardStep {
    /// 1-based step number as shown in the progress bar.
    pub fn number(&self) -> u8 {
        match self {
            Self::Profile => 1,
            Self::Results => 2,
            Self::Incentive => 3,
        }
    }

    /// Check if a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: WizardStep) -> bool {
        use WizardStep::*;
        matches!(
            (self, target),
            (Profile, Results) | (Results, Incentive) | (Results, Profile) | (Incentive, Results)
        )
    }

    fn transition_to(&mut self, target: WizardStep) -> Result<(), TransitionError> {
        if !self.can_transition_to(target) {
            return Err(TransitionError::InvalidStep {
                from: self.number(),
                to: target.number(),
            });
        }
        *self = target;
        Ok(())
    }
}

impl Default for WizardStep {
    fn default() -> Self {
        Self::Profile
    }
}

impl std::fmt::Display for WizardStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Profile => "profile",
            Self::Results => "results",
            Self::Incentive => "incentive",
        };
        write!(f, "{s}")
    }
}

/// Load status of one fetched document.
///
/// A failed load never keeps the previous data around.
#[derive(Debug, Clone)]
pub enum LoadState<T> {
    Idle,
    Loading,
    Ready(Arc<T>),
    Failed(FetchError),
}

impl<T> Default for LoadState<T> {
    fn default() -> Self {
        Self::Idle
    }
}

impl<T> LoadState<T> {
    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Ready(data) => Some(data.as_ref()),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&FetchError> {
        match self {
            Self::Failed(err) => Some(err),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }
}

impl<T> From<Result<T, FetchError>> for LoadState<T> {
    fn from(result: Result<T, FetchError>) -> Self {
        match result {
            Ok(data) => Self::Ready(Arc::new(data)),
            Err(err) => Self::Failed(err),
        }
    }
}

/// A document the controller must (re)fetch after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fetch {
    Assessment(Scenario),
    Incentive(Scenario),
}

/// What the continue button on the results step did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContinueOutcome {
    /// Moved to the incentive step; the incentive document must be fetched.
    Incentive(Fetch),
    /// The selection does not open the incentive flow; the flow ends here for
    /// this option.
    Completed { option_id: String },
}

/// Non-persistent summary shown in the "Create Offer" dialog.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfirmationSummary {
    pub option_id: String,
    pub option_title: String,
    pub package_id: String,
    pub package_title: String,
    pub accept_score: f64,
    pub impact_score: f64,
}

/// Transient session state for the wizard. Never persisted.
#[derive(Debug, Clone, Default)]
pub struct WizardState {
    pub scenario: Scenario,
    pub step: WizardStep,
    pub assessment: LoadState<AssessmentResult>,
    pub incentive: LoadState<IncentiveResult>,
    pub selected_option_id: Option<String>,
    pub selected_package_id: Option<String>,
    /// Option id the "flow complete" panel is showing for, if any.
    pub completed_option_id: Option<String>,
    pub confirmation_open: bool,
}

impl WizardState {
    /// Fresh state for `scenario` with its assessment marked as loading.
    pub fn new(scenario: Scenario) -> Self {
        Self {
            scenario,
            assessment: LoadState::Loading,
            ..Self::default()
        }
    }

    /// Switch scenario. Clears every selection, reloads the assessment, and
    /// pulls the user back to the results step if they were past step 1.
    pub fn set_scenario(&mut self, scenario: Scenario) -> Fetch {
        self.scenario = scenario;
        self.selected_option_id = None;
        self.selected_package_id = None;
        self.completed_option_id = None;
        self.confirmation_open = false;
        self.assessment = LoadState::Loading;
        self.incentive = LoadState::Idle;
        if self.step > WizardStep::Profile {
            self.step = WizardStep::Results;
        }
        Fetch::Assessment(scenario)
    }

    /// Submit the profile form: step 1 → 2. Uses whatever assessment is
    /// already loaded for the active scenario.
    pub fn evaluate(&mut self) -> Result<(), TransitionError> {
        self.step.transition_to(WizardStep::Results)
    }

    /// Record the chosen recommendation. Only the results step offers a
    /// choice. Re-selecting the same id is a no-op; switching to another id
    /// clears the completion panel.
    pub fn select_option(&mut self, option_id: &str) -> Result<(), TransitionError> {
        if self.step != WizardStep::Results {
            return Err(TransitionError::WrongStep {
                action: "select an option".into(),
                expected: WizardStep::Results.number(),
                actual: self.step.number(),
            });
        }
        let assessment = self.assessment.data().ok_or_else(|| TransitionError::NotLoaded {
            scenario: self.scenario.to_string(),
        })?;
        if assessment.recommendation(option_id).is_none() {
            return Err(TransitionError::UnknownOption {
                id: option_id.to_string(),
            });
        }
        if self.completed_option_id.as_deref() != Some(option_id) {
            self.completed_option_id = None;
        }
        self.selected_option_id = Some(option_id.to_string());
        Ok(())
    }

    /// Whether the current selection may proceed to the incentive step.
    pub fn step3_gate(&self) -> bool {
        gate::step3_gate(self.assessment.data(), self.selected_option_id.as_deref())
    }

    /// Step 2 → 3. The gate is the caller's responsibility.
    pub fn continue_to_step3(&mut self) -> Result<Fetch, TransitionError> {
        self.step.transition_to(WizardStep::Incentive)?;
        self.completed_option_id = None;
        Ok(self.mount_incentive())
    }

    /// The results step's continue button: enters step 3 when the gate is
    /// open, otherwise shows the completion panel for the selected option.
    pub fn continue_from_results(&mut self) -> Result<ContinueOutcome, TransitionError> {
        if self.step != WizardStep::Results {
            return Err(TransitionError::InvalidStep {
                from: self.step.number(),
                to: WizardStep::Incentive.number(),
            });
        }
        let Some(option_id) = self.selected_option_id.clone() else {
            return Err(TransitionError::NothingSelected {
                what: "recommendation".into(),
            });
        };
        if self.step3_gate() {
            Ok(ContinueOutcome::Incentive(self.continue_to_step3()?))
        } else {
            self.completed_option_id = Some(option_id.clone());
            Ok(ContinueOutcome::Completed { option_id })
        }
    }

    /// Whether the completion panel is showing for the current selection.
    pub fn completion_visible(&self) -> bool {
        self.completed_option_id.is_some()
            && self.completed_option_id == self.selected_option_id
    }

    /// Move back one step. Leaving step 3 drops the incentive data.
    pub fn back(&mut self) -> Result<WizardStep, TransitionError> {
        let target = match self.step {
            WizardStep::Profile => {
                return Err(TransitionError::InvalidStep { from: 1, to: 0 });
            }
            WizardStep::Results => WizardStep::Profile,
            WizardStep::Incentive => WizardStep::Results,
        };
        self.step.transition_to(target)?;
        if target == WizardStep::Results {
            self.unmount_incentive();
        }
        Ok(target)
    }

    /// Toggle a package. Picking the selected package again clears it.
    pub fn toggle_package(&mut self, package_id: &str) -> Result<Option<&str>, TransitionError> {
        let incentive = self.incentive.data().ok_or_else(|| TransitionError::NotLoaded {
            scenario: self.scenario.to_string(),
        })?;
        if incentive.package(package_id).is_none() {
            return Err(TransitionError::UnknownPackage {
                id: package_id.to_string(),
            });
        }
        if self.selected_package_id.as_deref() == Some(package_id) {
            self.selected_package_id = None;
            self.confirmation_open = false;
        } else {
            self.selected_package_id = Some(package_id.to_string());
        }
        Ok(self.selected_package_id.as_deref())
    }

    /// Whether "Create Offer" is enabled.
    pub fn can_create_offer(&self) -> bool {
        self.step == WizardStep::Incentive && self.confirmation_summary().is_some()
    }

    /// Open the confirmation dialog for the current selections.
    pub fn open_confirmation(&mut self) -> Result<ConfirmationSummary, TransitionError> {
        let summary = self
            .confirmation_summary()
            .ok_or_else(|| TransitionError::NothingSelected {
                what: "package".into(),
            })?;
        if self.step != WizardStep::Incentive {
            return Err(TransitionError::InvalidStep {
                from: self.step.number(),
                to: WizardStep::Incentive.number(),
            });
        }
        self.confirmation_open = true;
        Ok(summary)
    }

    /// Close the dialog. Confirming and closing behave the same; nothing is
    /// written anywhere.
    pub fn close_confirmation(&mut self) {
        self.confirmation_open = false;
    }

    /// Summary of the current recommendation and package, if both resolve.
    pub fn confirmation_summary(&self) -> Option<ConfirmationSummary> {
        let assessment = self.assessment.data()?;
        let incentive = self.incentive.data()?;
        let option = assessment.recommendation(self.selected_option_id.as_deref()?)?;
        let package = incentive.package(self.selected_package_id.as_deref()?)?;
        Some(ConfirmationSummary {
            option_id: option.option_id.clone(),
            option_title: option.title.clone(),
            package_id: package.package_id.clone(),
            package_title: package.title.clone(),
            accept_score: incentive.accept_score,
            impact_score: incentive.impact_score,
        })
    }

    /// Which fetch the retry control should re-run, if any.
    ///
    /// On step 3 a failed incentive load takes precedence.
    pub fn retry(&mut self) -> Result<Fetch, TransitionError> {
        if self.step == WizardStep::Incentive && self.incentive.error().is_some() {
            return Ok(self.mount_incentive());
        }
        if self.assessment.error().is_some() {
            self.assessment = LoadState::Loading;
            return Ok(Fetch::Assessment(self.scenario));
        }
        Err(TransitionError::NothingToRetry)
    }

    /// Store the outcome of an assessment fetch.
    pub fn apply_assessment(&mut self, result: Result<AssessmentResult, FetchError>) {
        self.assessment = result.into();
    }

    /// Store the outcome of an incentive fetch.
    pub fn apply_incentive(&mut self, result: Result<IncentiveResult, FetchError>) {
        self.incentive = result.into();
    }

    fn mount_incentive(&mut self) -> Fetch {
        self.selected_package_id = None;
        self.confirmation_open = false;
        self.incentive = LoadState::Loading;
        Fetch::Incentive(self.scenario)
    }

    fn unmount_incentive(&mut self) {
        self.selected_package_id = None;
        self.confirmation_open = false;
        self.incentive = LoadState::Idle;
    }
}
