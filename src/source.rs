//! Document sources — where the wizard loads its static JSON from.
//!
//! [`HttpSource`] is what a browser session does: plain `GET`s against the
//! fixture server. [`DirSource`] reads the same documents straight from disk.

use std::path::PathBuf;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::contract::Validate;
use crate::error::FetchError;

/// Raw access to demo documents by request path (e.g.
/// `/demo_outputs/scenario_A.json`).
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Human-readable location for `path`, used in error messages.
    fn locate(&self, path: &str) -> String;

    /// Fetch the document body.
    async fn get(&self, path: &str) -> Result<String, FetchError>;
}

/// Fetch, decode, and validate one document. Any failure yields no data.
pub async fn load_document<T>(source: &dyn DocumentSource, path: &str) -> Result<T, FetchError>
where
    T: DeserializeOwned + Validate,
{
    let body = source.get(path).await?;
    let url = source.locate(path);

    let document: T = serde_json::from_str(&body).map_err(|e| FetchError::Malformed {
        url: url.clone(),
        reason: e.to_string(),
    })?;

    document.validate().map_err(|err| {
        warn!(url = %url, error = %err, "Document failed contract validation");
        FetchError::Contract { url, source: err }
    })?;

    Ok(document)
}

/// Loads documents over HTTP.
pub struct HttpSource {
    base_url: String,
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl DocumentSource for HttpSource {
    fn locate(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn get(&self, path: &str) -> Result<String, FetchError> {
        let url = self.locate(path);
        debug!(url = %url, "GET");

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| FetchError::Network {
                url: url.clone(),
                reason: e.to_string(),
            })?;

        if !resp.status().is_success() {
            return Err(FetchError::Status {
                url,
                status: resp.status().as_u16(),
            });
        }

        resp.text().await.map_err(|e| FetchError::Network {
            url,
            reason: e.to_string(),
        })
    }
}

/// Loads documents from a local directory, keyed by file name.
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn file_path(&self, path: &str) -> Option<PathBuf> {
        // Only the final segment is honoured; nothing outside `root` is reachable.
        let name = path.rsplit('/').next()?;
        if name.is_empty() || name.starts_with('.') {
            return None;
        }
        Some(self.root.join(name))
    }
}

#[async_trait]
impl DocumentSource for DirSource {
    fn locate(&self, path: &str) -> String {
        match self.file_path(path) {
            Some(file) => format!("file://{}", file.display()),
            None => format!("file://{}{path}", self.root.display()),
        }
    }

    async fn get(&self, path: &str) -> Result<String, FetchError> {
        let url = self.locate(path);
        let Some(file) = self.file_path(path) else {
            return Err(FetchError::Status { url, status: 404 });
        };

        match tokio::fs::read_to_string(&file).await {
            Ok(body) => Ok(body),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(FetchError::Status { url, status: 404 })
            }
            Err(e) => Err(FetchError::Network {
                url,
                reason: e.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::fixtures;
    use crate::contract::{AssessmentResult, IncentiveResult, Scenario};

    fn fixture_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("scenario_A.json"), fixtures::SCENARIO_A).unwrap();
        std::fs::write(dir.path().join("incentive_A.json"), fixtures::INCENTIVE_A).unwrap();
        dir
    }

    #[tokio::test]
    async fn dir_source_loads_and_validates() {
        let dir = fixture_dir();
        let source = DirSource::new(dir.path());

        let result: AssessmentResult =
            load_document(&source, &Scenario::A.assessment_path()).await.unwrap();
        assert_eq!(result.recommendations.len(), 3);

        let incentive: IncentiveResult =
            load_document(&source, &Scenario::A.incentive_path()).await.unwrap();
        assert_eq!(incentive.packages.len(), 3);
    }

    #[tokio::test]
    async fn missing_file_maps_to_404() {
        let dir = fixture_dir();
        let source = DirSource::new(dir.path());

        let err = load_document::<AssessmentResult>(&source, &Scenario::B.assessment_path())
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 404, .. }));
    }

    #[tokio::test]
    async fn malformed_json_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("scenario_A.json"), "{ not json").unwrap();
        let source = DirSource::new(dir.path());

        let err = load_document::<AssessmentResult>(&source, &Scenario::A.assessment_path())
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Malformed { .. }));
    }

    #[tokio::test]
    async fn contract_violation_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let mut doc: serde_json::Value = serde_json::from_str(fixtures::INCENTIVE_A).unwrap();
        doc["packages"] = serde_json::json!([]);
        std::fs::write(dir.path().join("incentive_A.json"), doc.to_string()).unwrap();
        let source = DirSource::new(dir.path());

        let err = load_document::<IncentiveResult>(&source, &Scenario::A.incentive_path())
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Contract { .. }));
    }

    #[test]
    fn dir_source_ignores_parent_segments() {
        let source = DirSource::new("/srv/fixtures");
        assert_eq!(
            source.file_path("/demo_outputs/../../etc/passwd"),
            Some(PathBuf::from("/srv/fixtures/passwd"))
        );
        assert_eq!(source.file_path("/demo_outputs/.."), None);
    }

    #[test]
    fn http_source_joins_base_url() {
        let source = HttpSource::new("http://localhost:8080/");
        assert_eq!(
            source.locate("/demo_outputs/scenario_A.json"),
            "http://localhost:8080/demo_outputs/scenario_A.json"
        );
    }
}
