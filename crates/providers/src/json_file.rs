//! Work source backed by a JSON file.
//!
//! The file holds a bare array of the source's item type (issues, pull
//! requests, or project statuses). Missing or malformed files surface as
//! [`SourceError`]s, which population treats as a skipped source.

use async_trait::async_trait;
use dailybrief_core::error::SourceError;
use dailybrief_core::source::{SourceData, SourceKind, WorkSource};
use std::path::PathBuf;

pub struct JsonFileSource {
    name: String,
    kind: SourceKind,
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(kind: SourceKind, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            name: format!("{kind}:{}", path.display()),
            kind,
            path,
        }
    }

    fn parse(&self, content: &str) -> Result<SourceData, serde_json::Error> {
        Ok(match self.kind {
            SourceKind::Issues => SourceData::Issues(serde_json::from_str(content)?),
            SourceKind::PullRequests => SourceData::PullRequests(serde_json::from_str(content)?),
            SourceKind::Projects => SourceData::Projects(serde_json::from_str(content)?),
        })
    }
}

#[async_trait]
impl WorkSource for JsonFileSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> SourceKind {
        self.kind
    }

    async fn fetch(&self) -> Result<SourceData, SourceError> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| SourceError::Read {
                path: self.path.display().to_string(),
                reason: e.to_string(),
            })?;

        self.parse(&content).map_err(|e| SourceError::Parse {
            path: self.path.display().to_string(),
            reason: e.to_string(),
        })
    }
}
