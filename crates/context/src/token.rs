//! Token cost estimation.
//!
//! The primary path asks an external [`TokenCounter`] for an exact count.
//! Any failure falls back, without retry, to a character heuristic:
//! ~4 characters per token, rounded up. Callers never learn which path
//! priced a given text, but the estimator keeps counters so the split is
//! auditable after a run.

use dailybrief_core::TokenCounter;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};

const CHARS_PER_TOKEN: usize = 4;

/// Approximate the token cost of `text`.
///
/// Heuristic: 1 token ≈ 4 characters (Unicode scalar values). Rounds up.
/// Empty and whitespace-only text costs nothing.
pub fn approximate_tokens(text: &str) -> usize {
    if text.trim().is_empty() {
        return 0;
    }
    text.chars().count().div_ceil(CHARS_PER_TOKEN)
}

/// Number of characters that fit in `tokens` under the approximation.
pub fn chars_for_tokens(tokens: usize) -> usize {
    tokens.saturating_mul(CHARS_PER_TOKEN)
}

/// Snapshot of how an estimator priced its inputs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EstimatorStats {
    /// Texts priced by the external counter.
    pub exact: u64,
    /// Texts priced by the approximation after a counter failure.
    pub fallback: u64,
    /// Empty or whitespace-only texts (never sent anywhere).
    pub skipped_empty: u64,
}

impl EstimatorStats {
    /// Whether any estimate in this run used the fallback path.
    pub fn fell_back(&self) -> bool {
        self.fallback > 0
    }
}

/// Converts text into a token cost.
pub struct CostEstimator {
    counter: Option<Arc<dyn TokenCounter>>,
    model: String,
    exact: AtomicU64,
    fallback: AtomicU64,
    skipped_empty: AtomicU64,
}

impl CostEstimator {
    /// An estimator with no external counter; every estimate is approximate.
    pub fn approximate() -> Self {
        Self {
            counter: None,
            model: String::new(),
            exact: AtomicU64::new(0),
            fallback: AtomicU64::new(0),
            skipped_empty: AtomicU64::new(0),
        }
    }

    /// An estimator that prefers `counter`'s exact count for `model`.
    pub fn with_counter(counter: Arc<dyn TokenCounter>, model: impl Into<String>) -> Self {
        Self {
            counter: Some(counter),
            model: model.into(),
            ..Self::approximate()
        }
    }

    /// Build from an optional counter (e.g. the result of provider setup).
    pub fn from_optional(counter: Option<Arc<dyn TokenCounter>>, model: impl Into<String>) -> Self {
        match counter {
            Some(counter) => Self::with_counter(counter, model),
            None => Self::approximate(),
        }
    }

    /// Whether an external counter is configured.
    pub fn has_counter(&self) -> bool {
        self.counter.is_some()
    }

    /// Estimate the token cost of `text`.
    pub async fn estimate(&self, text: &str) -> usize {
        if text.trim().is_empty() {
            self.skipped_empty.fetch_add(1, Ordering::Relaxed);
            return 0;
        }

        let Some(counter) = &self.counter else {
            return approximate_tokens(text);
        };

        match counter.count_tokens(&self.model, text).await {
            Ok(tokens) => {
                self.exact.fetch_add(1, Ordering::Relaxed);
                debug!(counter = counter.name(), tokens, "Exact token count");
                tokens
            }
            Err(e) => {
                self.fallback.fetch_add(1, Ordering::Relaxed);
                let tokens = approximate_tokens(text);
                warn!(
                    counter = counter.name(),
                    error = %e,
                    tokens,
                    "Token counter failed, using approximation"
                );
                tokens
            }
        }
    }

    pub fn stats(&self) -> EstimatorStats {
        EstimatorStats {
            exact: self.exact.load(Ordering::Relaxed),
            fallback: self.fallback.load(Ordering::Relaxed),
            skipped_empty: self.skipped_empty.load(Ordering::Relaxed),
        }
    }
}

impl Default for CostEstimator {
    fn default() -> Self {
        Self::approximate()
    }
}
