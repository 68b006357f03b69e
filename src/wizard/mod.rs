//! Three-step wizard: profile, results, incentive.

pub mod controller;
pub mod gate;
pub mod state;

pub use controller::WizardController;
pub use gate::{TRADE_IN_OPTION_ID, opens_incentive_flow, step3_gate};
pub use state::{ConfirmationSummary, ContinueOutcome, Fetch, LoadState, WizardState, WizardStep};
