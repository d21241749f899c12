//! Error types for the dailybrief domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error enum.

use thiserror::Error;

/// Failures raised while admitting priced content into a fixed capacity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BudgetError {
    /// The candidate could not be admitted even after evicting every
    /// strictly lower-priority entry. `shortfall` is the capacity that
    /// would still be missing after that maximal eviction.
    #[error("Cannot fit '{name}': {shortfall} tokens short after evicting all lower-priority entries")]
    Overflow { name: String, shortfall: usize },

    #[error("Section already admitted: {0}")]
    DuplicateSection(String),
}

impl BudgetError {
    /// Name of the rejected candidate.
    pub fn name(&self) -> &str {
        match self {
            Self::Overflow { name, .. } => name,
            Self::DuplicateSection(name) => name,
        }
    }
}

/// Failures from external services (token counting).
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError {
        status_code: u16,
        message: String,
    },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

/// Failures from upstream work-data producers.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Source unavailable: {source_name} — {reason}")]
    Unavailable { source_name: String, reason: String },

    #[error("Failed to read {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("Failed to parse {path}: {reason}")]
    Parse { path: String, reason: String },

    #[error("Enrichment failed for {key}: {reason}")]
    Enrichment { key: String, reason: String },
}
