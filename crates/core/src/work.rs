//! Work-tracking domain types.
//!
//! These are the value objects that upstream producers hand to the
//! assembler: scored issues, open pull requests, project progress
//! summaries, and the fully-fetched "enriched" form of a ranked issue.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A scored issue from the work tracker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkItem {
    /// Repository in `owner/name` form.
    pub repo: String,

    /// Issue number within the repository.
    pub number: u64,

    pub title: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,

    /// Triage score assigned upstream (higher = more urgent).
    #[serde(default)]
    pub score: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl WorkItem {
    pub fn new(repo: impl Into<String>, number: u64, title: impl Into<String>) -> Self {
        Self {
            repo: repo.into(),
            number,
            title: title.into(),
            labels: Vec::new(),
            score: 0.0,
            url: None,
            updated_at: None,
        }
    }

    /// Stable identity used for caching: `owner/name#number`.
    pub fn key(&self) -> String {
        format!("{}#{}", self.repo, self.number)
    }
}

/// Review status of a pull request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewState {
    #[default]
    Pending,
    Approved,
    ChangesRequested,
}

impl std::fmt::Display for ReviewState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "review pending"),
            Self::Approved => write!(f, "approved"),
            Self::ChangesRequested => write!(f, "changes requested"),
        }
    }
}

/// An open pull request awaiting attention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PullRequest {
    pub repo: String,
    pub number: u64,
    pub title: String,
    pub author: String,

    #[serde(default)]
    pub draft: bool,

    #[serde(default)]
    pub review_state: ReviewState,
}

/// Progress summary of a locally planned project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectStatus {
    pub name: String,

    /// Current phase label (e.g. "Phase 2: storage").
    pub phase: String,

    /// Completed fraction in percent (0–100).
    #[serde(default)]
    pub progress_pct: u8,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub next_steps: Vec<String>,
}

/// A timestamped note attached to an issue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub author: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// A ranked issue carrying its heavy text fields.
///
/// Field importance, most to least: `body` (primary narrative),
/// `comments` (timestamped notes), `references` (cross-reference metadata).
/// Rank is the position in the list handed to the degradation pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedItem {
    pub item: WorkItem,

    #[serde(default)]
    pub body: String,

    #[serde(default)]
    pub comments: Vec<Comment>,

    /// Linked issues / pull requests, rendered as short strings.
    #[serde(default)]
    pub references: Vec<String>,
}

impl EnrichedItem {
    pub fn new(item: WorkItem, body: impl Into<String>) -> Self {
        Self {
            item,
            body: body.into(),
            comments: Vec::new(),
            references: Vec::new(),
        }
    }
}
