//! Demo scenarios and the documents they map to.

use serde::{Deserialize, Serialize};

/// Path prefix the demo documents are served under.
pub const DEMO_OUTPUTS_PREFIX: &str = "/demo_outputs";

/// A named fixture profile selecting which static dataset to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scenario {
    A,
    B,
}

impl Default for Scenario {
    fn default() -> Self {
        Self::A
    }
}

impl Scenario {
    pub const ALL: [Scenario; 2] = [Scenario::A, Scenario::B];

    /// File name of the assessment document, e.g. `scenario_A.json`.
    pub fn assessment_file(&self) -> String {
        format!("scenario_{self}.json")
    }

    /// File name of the incentive document, e.g. `incentive_A.json`.
    pub fn incentive_file(&self) -> String {
        format!("incentive_{self}.json")
    }

    /// Request path of the assessment document.
    pub fn assessment_path(&self) -> String {
        format!("{DEMO_OUTPUTS_PREFIX}/{}", self.assessment_file())
    }

    /// Request path of the incentive document.
    pub fn incentive_path(&self) -> String {
        format!("{DEMO_OUTPUTS_PREFIX}/{}", self.incentive_file())
    }
}

impl std::fmt::Display for Scenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::A => write!(f, "A"),
            Self::B => write!(f, "B"),
        }
    }
}

impl std::str::FromStr for Scenario {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "A" | "a" => Ok(Self::A),
            "B" | "b" => Ok(Self::B),
            other => Err(format!("Unknown scenario: {other}")),
        }
    }
}
