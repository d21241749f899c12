//! WorkSource trait: an upstream producer of work data.
//!
//! Each source fails independently: a source that errors simply
//! contributes nothing to the assembled briefing.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::SourceError;
use crate::work::{ProjectStatus, PullRequest, WorkItem};

/// Which kind of data a source produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Issues,
    PullRequests,
    Projects,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Issues => write!(f, "issues"),
            Self::PullRequests => write!(f, "pull_requests"),
            Self::Projects => write!(f, "projects"),
        }
    }
}

/// The payload produced by one source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "items", rename_all = "snake_case")]
pub enum SourceData {
    Issues(Vec<WorkItem>),
    PullRequests(Vec<PullRequest>),
    Projects(Vec<ProjectStatus>),
}

impl SourceData {
    pub fn kind(&self) -> SourceKind {
        match self {
            Self::Issues(_) => SourceKind::Issues,
            Self::PullRequests(_) => SourceKind::PullRequests,
            Self::Projects(_) => SourceKind::Projects,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Issues(v) => v.is_empty(),
            Self::PullRequests(v) => v.is_empty(),
            Self::Projects(v) => v.is_empty(),
        }
    }
}

#[async_trait]
pub trait WorkSource: Send + Sync {
    /// A human-readable name for this source (used in logs).
    fn name(&self) -> &str;

    /// Which section this source feeds.
    fn kind(&self) -> SourceKind;

    /// Produce the source's current data.
    async fn fetch(&self) -> Result<SourceData, SourceError>;
}
