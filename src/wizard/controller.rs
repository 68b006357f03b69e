//! Controller owning one wizard session: it runs fetches and applies
//! their results.
//!
//! Each transition takes the write lock, runs one [`WizardState`] method, and
//! releases it, so observers only ever see whole states. Fetches run on
//! spawned tasks; every mounted load carries a [`CancellationToken`] and a
//! load whose view was torn down (or superseded) drops its result instead of
//! applying it.

use std::sync::Arc;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::state::{ConfirmationSummary, ContinueOutcome, Fetch, WizardState, WizardStep};
use crate::contract::{AssessmentResult, IncentiveResult, Scenario};
use crate::error::TransitionError;
use crate::source::{DocumentSource, load_document};

struct Session {
    state: WizardState,
    assessment_load: CancellationToken,
    incentive_load: CancellationToken,
}

impl Session {
    /// Cancel whatever load was running for `fetch`'s slot and hand out a
    /// fresh token for the new one.
    fn remount(&mut self, fetch: Fetch) -> CancellationToken {
        let slot = match fetch {
            Fetch::Assessment(_) => &mut self.assessment_load,
            Fetch::Incentive(_) => &mut self.incentive_load,
        };
        slot.cancel();
        *slot = CancellationToken::new();
        slot.clone()
    }
}

struct Inner {
    session_id: Uuid,
    source: Arc<dyn DocumentSource>,
    session: RwLock<Session>,
}

/// Drives one wizard session.
#[derive(Clone)]
pub struct WizardController {
    inner: Arc<Inner>,
}

impl WizardController {
    /// Create a controller on step 1 for scenario A. Nothing is fetched until
    /// [`start`](Self::start).
    pub fn new(source: Arc<dyn DocumentSource>) -> Self {
        Self {
            inner: Arc::new(Inner {
                session_id: Uuid::new_v4(),
                source,
                session: RwLock::new(Session {
                    state: WizardState::new(Scenario::default()),
                    assessment_load: CancellationToken::new(),
                    incentive_load: CancellationToken::new(),
                }),
            }),
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.inner.session_id
    }

    /// Kick off the initial assessment fetch for the current scenario.
    pub async fn start(&self) -> JoinHandle<()> {
        let mut session = self.inner.session.write().await;
        let fetch = Fetch::Assessment(session.state.scenario);
        let token = session.remount(fetch);
        info!(session = %self.inner.session_id, scenario = %session.state.scenario, "Wizard started");
        self.spawn_fetch(fetch, token)
    }

    /// Snapshot of the current state.
    pub async fn snapshot(&self) -> WizardState {
        self.inner.session.read().await.state.clone()
    }

    /// Switch scenario. Any mounted incentive view is torn down.
    pub async fn set_scenario(&self, scenario: Scenario) -> JoinHandle<()> {
        let mut session = self.inner.session.write().await;
        session.incentive_load.cancel();
        let previous = session.state.scenario;
        let fetch = session.state.set_scenario(scenario);
        let token = session.remount(fetch);
        info!(
            session = %self.inner.session_id,
            from = %previous,
            to = %scenario,
            step = %session.state.step,
            "Scenario changed"
        );
        self.spawn_fetch(fetch, token)
    }

    /// Step 1 → 2.
    pub async fn evaluate(&self) -> Result<(), TransitionError> {
        self.apply(|state| state.evaluate()).await?;
        info!(session = %self.inner.session_id, "Profile submitted, showing results");
        Ok(())
    }

    /// Record the chosen recommendation.
    pub async fn select_option(&self, option_id: &str) -> Result<(), TransitionError> {
        self.apply(|state| state.select_option(option_id)).await?;
        debug!(session = %self.inner.session_id, option_id, "Option selected");
        Ok(())
    }

    /// Whether the current selection opens the incentive step.
    pub async fn step3_gate(&self) -> bool {
        self.inner.session.read().await.state.step3_gate()
    }

    /// Step 2 → 3 and mount the incentive view. Does not re-check the gate.
    pub async fn continue_to_step3(&self) -> Result<JoinHandle<()>, TransitionError> {
        let (fetch, token) = self.apply_and_mount(|state| state.continue_to_step3()).await?;
        info!(session = %self.inner.session_id, "Entered incentive step");
        Ok(self.spawn_fetch(fetch, token))
    }

    /// The continue button on the results step. Returns the incentive load
    /// handle when the step changed.
    pub async fn continue_action(
        &self,
    ) -> Result<(ContinueOutcome, Option<JoinHandle<()>>), TransitionError> {
        let mut session = self.inner.session.write().await;
        let outcome = session.state.continue_from_results().inspect_err(|e| {
            debug!(session = %self.inner.session_id, error = %e, "Transition rejected");
        })?;
        match &outcome {
            ContinueOutcome::Incentive(fetch) => {
                let token = session.remount(*fetch);
                info!(session = %self.inner.session_id, "Entered incentive step");
                let handle = self.spawn_fetch(*fetch, token);
                Ok((outcome, Some(handle)))
            }
            ContinueOutcome::Completed { option_id } => {
                info!(
                    session = %self.inner.session_id,
                    option_id = %option_id,
                    "Flow complete for option without incentive"
                );
                Ok((outcome, None))
            }
        }
    }

    /// Move back one step, tearing down the incentive view if it was mounted.
    pub async fn back(&self) -> Result<WizardStep, TransitionError> {
        let mut session = self.inner.session.write().await;
        let leaving_incentive = session.state.step == WizardStep::Incentive;
        let step = session.state.back()?;
        if leaving_incentive {
            session.incentive_load.cancel();
        }
        debug!(session = %self.inner.session_id, step = %step, "Moved back");
        Ok(step)
    }

    /// Toggle a package on the incentive step.
    pub async fn toggle_package(&self, package_id: &str) -> Result<Option<String>, TransitionError> {
        let selected = self
            .apply(|state| {
                state
                    .toggle_package(package_id)
                    .map(|selected| selected.map(str::to_string))
            })
            .await?;
        debug!(session = %self.inner.session_id, package_id, selected = ?selected, "Package toggled");
        Ok(selected)
    }

    /// Open the "Create Offer" confirmation dialog.
    pub async fn open_confirmation(&self) -> Result<ConfirmationSummary, TransitionError> {
        let summary = self.apply(|state| state.open_confirmation()).await?;
        info!(
            session = %self.inner.session_id,
            option_id = %summary.option_id,
            package_id = %summary.package_id,
            "Offer summary opened"
        );
        Ok(summary)
    }

    /// Close the dialog. `confirmed` only changes what gets logged.
    pub async fn close_confirmation(&self, confirmed: bool) {
        let mut session = self.inner.session.write().await;
        if session.state.confirmation_open && confirmed {
            info!(
                session = %self.inner.session_id,
                package_id = ?session.state.selected_package_id,
                "Offer confirmed (demo only, nothing is submitted)"
            );
        }
        session.state.close_confirmation();
    }

    /// Re-run the fetch that last failed.
    pub async fn retry(&self) -> Result<JoinHandle<()>, TransitionError> {
        let (fetch, token) = self.apply_and_mount(|state| state.retry()).await?;
        info!(session = %self.inner.session_id, fetch = ?fetch, "Retrying fetch");
        Ok(self.spawn_fetch(fetch, token))
    }

    /// Tear the whole session down; in-flight loads are discarded.
    pub async fn shutdown(&self) {
        let session = self.inner.session.read().await;
        session.assessment_load.cancel();
        session.incentive_load.cancel();
        debug!(session = %self.inner.session_id, "Wizard shut down");
    }

    async fn apply<T>(
        &self,
        f: impl FnOnce(&mut WizardState) -> Result<T, TransitionError>,
    ) -> Result<T, TransitionError> {
        let mut session = self.inner.session.write().await;
        let result = f(&mut session.state);
        if let Err(e) = &result {
            debug!(session = %self.inner.session_id, error = %e, "Transition rejected");
        }
        result
    }

    /// Like [`apply`](Self::apply) for transitions that mount a load; the
    /// load's token is issued under the same lock.
    async fn apply_and_mount(
        &self,
        f: impl FnOnce(&mut WizardState) -> Result<Fetch, TransitionError>,
    ) -> Result<(Fetch, CancellationToken), TransitionError> {
        let mut session = self.inner.session.write().await;
        let fetch = f(&mut session.state).inspect_err(|e| {
            debug!(session = %self.inner.session_id, error = %e, "Transition rejected");
        })?;
        let token = session.remount(fetch);
        Ok((fetch, token))
    }

    fn spawn_fetch(&self, fetch: Fetch, token: CancellationToken) -> JoinHandle<()> {
        let inner = Arc::clone(&self.inner);

        tokio::spawn(async move {
            match fetch {
                Fetch::Assessment(scenario) => {
                    let path = scenario.assessment_path();
                    let loaded = tokio::select! {
                        _ = token.cancelled() => None,
                        result = load_document::<AssessmentResult>(inner.source.as_ref(), &path) => Some(result),
                    };
                    let Some(result) = loaded else {
                        debug!(session = %inner.session_id, path = %path, "Load cancelled");
                        return;
                    };
                    let mut session = inner.session.write().await;
                    if token.is_cancelled() || session.state.scenario != scenario {
                        debug!(session = %inner.session_id, path = %path, "Discarding stale result");
                        return;
                    }
                    log_outcome(inner.session_id, &path, result.as_ref().err());
                    session.state.apply_assessment(result);
                }
                Fetch::Incentive(scenario) => {
                    let path = scenario.incentive_path();
                    let loaded = tokio::select! {
                        _ = token.cancelled() => None,
                        result = load_document::<IncentiveResult>(inner.source.as_ref(), &path) => Some(result),
                    };
                    let Some(result) = loaded else {
                        debug!(session = %inner.session_id, path = %path, "Load cancelled");
                        return;
                    };
                    let mut session = inner.session.write().await;
                    if token.is_cancelled()
                        || session.state.scenario != scenario
                        || session.state.step != WizardStep::Incentive
                    {
                        debug!(session = %inner.session_id, path = %path, "Discarding stale result");
                        return;
                    }
                    log_outcome(inner.session_id, &path, result.as_ref().err());
                    session.state.apply_incentive(result);
                }
            }
        })
    }
}

fn log_outcome(session_id: Uuid, path: &str, error: Option<&crate::error::FetchError>) {
    match error {
        None => debug!(session = %session_id, path, "Document loaded"),
        Some(e) => warn!(session = %session_id, path, error = %e, "Document load failed"),
    }
}
