//! Error types for the lifecycle wizard.

/// Top-level error for user-driven wizard actions.
///
/// Load failures are not part of it: a [`FetchError`] is kept in the wizard
/// state and shown in place of the view. [`ConfigError`] is reported once at
/// startup.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Transition error: {0}")]
    Transition(#[from] TransitionError),

    #[error("Form error: {0}")]
    Form(#[from] FormError),

    #[error("Command error: {0}")]
    Command(#[from] CommandError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while loading a demo document.
///
/// Every variant is retryable; the wizard turns them into a message shown in
/// place of the affected view.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FetchError {
    #[error("Request for {url} failed: {reason}")]
    Network { url: String, reason: String },

    #[error("Request for {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("Malformed document at {url}: {reason}")]
    Malformed { url: String, reason: String },

    #[error("Document at {url} violates its contract: {source}")]
    Contract {
        url: String,
        #[source]
        source: ContractError,
    },
}

impl FetchError {
    /// Short text suitable for display in an error panel.
    pub fn user_message(&self) -> String {
        match self {
            Self::Status { status, .. } => format!("Veri yüklenemedi (HTTP {status})."),
            Self::Network { .. } | Self::Malformed { .. } | Self::Contract { .. } => {
                "Veri yüklenemedi. Lütfen tekrar deneyin.".to_string()
            }
        }
    }

    /// The URL the failed request targeted.
    pub fn url(&self) -> &str {
        match self {
            Self::Network { url, .. }
            | Self::Status { url, .. }
            | Self::Malformed { url, .. }
            | Self::Contract { url, .. } => url,
        }
    }
}

/// Violations of the assessment/incentive document contract.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ContractError {
    #[error("{field} must not be empty")]
    Empty { field: String },

    #[error("{field} = {value} is outside [{min}, {max}]")]
    OutOfRange {
        field: String,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Duplicate {field} '{id}'")]
    DuplicateId { field: String, id: String },

    #[error("recommended_primary_option_id '{id}' does not match any recommendation")]
    UnknownPrimaryOption { id: String },

    #[error("Package '{id}' carries no cash amount, points, or perk")]
    EmptyPackage { id: String },

    #[error("rul_months_min {min} exceeds rul_months_max {max}")]
    InvertedRange { min: u32, max: u32 },
}

/// Rejected wizard transitions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("Cannot transition from step {from} to step {to}")]
    InvalidStep { from: u8, to: u8 },

    #[error("Option '{id}' is not part of the loaded assessment")]
    UnknownOption { id: String },

    #[error("Package '{id}' is not part of the loaded incentive offer")]
    UnknownPackage { id: String },

    #[error("Cannot {action} on step {actual}; only on step {expected}")]
    WrongStep {
        action: String,
        expected: u8,
        actual: u8,
    },

    #[error("No {what} selected")]
    NothingSelected { what: String },

    #[error("No assessment loaded for scenario {scenario}")]
    NotLoaded { scenario: String },

    #[error("Nothing to retry")]
    NothingToRetry,
}

/// Step 1 profile form validation errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("{field} is required")]
    Missing { field: String },

    #[error("Invalid value for {field}: {message}")]
    Invalid { field: String, message: String },
}

/// Terminal driver input errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("Unknown command: {0} (type 'help')")]
    Unknown(String),

    #[error("'{command}' needs {argument}")]
    MissingArgument { command: String, argument: String },

    #[error("Invalid argument for '{command}': {message}")]
    InvalidArgument { command: String, message: String },
}

/// Result type alias for the wizard.
pub type Result<T, E = Error> = std::result::Result<T, E>;
