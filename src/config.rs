//! Configuration types.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use crate::error::ConfigError;

/// Default port for the fixture server.
pub const DEFAULT_PORT: u16 = 8080;

/// Wizard configuration.
#[derive(Debug, Clone)]
pub struct WizardConfig {
    /// Address the fixture server binds to.
    pub bind: IpAddr,
    /// Port the fixture server listens on.
    pub port: u16,
    /// Directory holding `scenario_*.json` and `incentive_*.json`.
    pub fixtures_dir: PathBuf,
    /// Base URL the wizard fetches documents from. `None` means the local
    /// fixture server.
    pub base_url: Option<String>,
    /// Page query string, e.g. `shot=1`.
    pub query: String,
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            bind: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: DEFAULT_PORT,
            fixtures_dir: PathBuf::from("./fixtures/demo_outputs"),
            base_url: None,
            query: String::new(),
        }
    }
}

impl WizardConfig {
    /// Build the configuration from `WIZARD_*` environment variables,
    /// falling back to defaults for anything unset. Set but unparsable values
    /// are rejected.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env), reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let bind = match lookup("WIZARD_BIND") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: "WIZARD_BIND".into(),
                message: format!("'{raw}' is not an IP address"),
            })?,
            None => defaults.bind,
        };

        let port = match lookup("WIZARD_PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: "WIZARD_PORT".into(),
                message: format!("'{raw}' is not a port number"),
            })?,
            None => defaults.port,
        };

        let fixtures_dir = lookup("WIZARD_FIXTURES_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.fixtures_dir);

        let base_url = lookup("WIZARD_BASE_URL")
            .map(|s| s.trim().trim_end_matches('/').to_string())
            .filter(|s| !s.is_empty());

        let query = lookup("WIZARD_QUERY").unwrap_or_default();

        Ok(Self {
            bind,
            port,
            fixtures_dir,
            base_url,
            query,
        })
    }

    /// Socket address for the fixture server.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }

    /// Base URL the wizard should fetch from.
    pub fn effective_base_url(&self) -> String {
        match &self.base_url {
            Some(url) => url.clone(),
            None => format!("http://{}", self.socket_addr()),
        }
    }

    /// Check that the fixture directory exists.
    pub fn ensure_fixtures_dir(&self) -> Result<(), ConfigError> {
        let meta = std::fs::metadata(&self.fixtures_dir)?;
        if !meta.is_dir() {
            return Err(ConfigError::InvalidValue {
                key: "WIZARD_FIXTURES_DIR".into(),
                message: format!("{} is not a directory", self.fixtures_dir.display()),
            });
        }
        Ok(())
    }
}
